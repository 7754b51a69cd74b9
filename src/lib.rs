// Tue Jan 15 2026 - Alex

pub mod cache;
pub mod config;
pub mod diff;
pub mod inspector;
pub mod memory;
pub mod model;
pub mod mono;
pub mod output;
pub mod pe;
pub mod query;
pub mod ui;
pub mod utils;

pub use cache::{load_cache, save_cache, CacheError, CacheStore};
pub use config::Config;
pub use diff::{diff, DiffResult};
pub use inspector::{DumpError, Inspector, Progress};
pub use memory::{BackendRegistry, MemoryBackend, MemoryError};
pub use model::{TypeDatabase, TypeDefinition};
