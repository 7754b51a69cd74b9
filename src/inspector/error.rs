// Thu Jan 29 2026 - Alex

use crate::memory::MemoryError;
use crate::model::ReconstructionError;
use crate::mono::{ProfileError, WalkError};
use crate::pe::PeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DumpError {
    #[error("Failed to attach to '{process}': {source}")]
    Attach {
        process: String,
        #[source]
        source: MemoryError,
    },
    #[error("Module '{module}' not found: {source}")]
    ModuleNotFound {
        module: String,
        #[source]
        source: MemoryError,
    },
    #[error("Export '{0}' not found")]
    ExportNotFound(String),
    #[error("Assembly '{0}' not found")]
    AssemblyNotFound(String),
    #[error("Malformed image: {0}")]
    MalformedImage(String),
    #[error("Runtime structure error: {0}")]
    Structure(String),
    #[error("Memory access failed: {0}")]
    Memory(#[from] MemoryError),
    #[error(transparent)]
    Reconstruction(#[from] ReconstructionError),
    #[error("Offsets profile error: {0}")]
    Profile(#[from] ProfileError),
    #[error("Failed to build thread pool: {0}")]
    ThreadPool(String),
}

impl From<PeError> for DumpError {
    fn from(err: PeError) -> Self {
        match err {
            PeError::ExportNotFound(symbol) => Self::ExportNotFound(symbol),
            other => Self::MalformedImage(other.to_string()),
        }
    }
}

impl From<WalkError> for DumpError {
    fn from(err: WalkError) -> Self {
        match err {
            WalkError::Memory(e) => Self::Memory(e),
            WalkError::AssemblyNotFound { name, .. } => Self::AssemblyNotFound(name),
            other => Self::Structure(other.to_string()),
        }
    }
}
