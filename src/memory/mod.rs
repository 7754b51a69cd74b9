// Tue Jan 13 2026 - Alex

pub mod address;
pub mod error;
pub mod traits;
pub mod session;
pub mod sparse;
pub mod local;
pub mod registry;
#[cfg(feature = "dma")]
pub mod dma;

pub use address::Address;
pub use error::MemoryError;
pub use traits::{Decode, MemoryBackend, MemoryReader, MemoryReaderExt, ModuleInfo};
pub use session::Session;
pub use sparse::SparseMemory;
pub use local::LocalProcess;
pub use registry::{BackendFactory, BackendRegistry};
#[cfg(feature = "dma")]
pub use dma::DmaBackend;
