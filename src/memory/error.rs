// Tue Jan 13 2026 - Alex

use crate::memory::Address;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Read of {len} bytes at {address} failed: {reason}")]
    ReadFailed {
        address: Address,
        len: usize,
        reason: String,
    },
    #[error("Short read at {address}: wanted {len} bytes, got {got}")]
    ShortRead {
        address: Address,
        len: usize,
        got: usize,
    },
    #[error("Process not found: {0}")]
    ProcessNotFound(String),
    #[error("Failed to attach to '{process}': {reason}")]
    AttachFailed { process: String, reason: String },
    #[error("Module not found: {0}")]
    ModuleNotFound(String),
    #[error("No process attached")]
    NotAttached,
    #[error("Unknown memory backend '{0}'")]
    UnknownBackend(String),
    #[error("Not supported: {0}")]
    NotSupported(String),
}

impl MemoryError {
    pub fn read_failed(address: Address, len: usize, reason: impl Into<String>) -> Self {
        Self::ReadFailed {
            address,
            len,
            reason: reason.into(),
        }
    }

    /// Address of the failing access, when the error came from a read.
    pub fn address(&self) -> Option<Address> {
        match self {
            Self::ReadFailed { address, .. } | Self::ShortRead { address, .. } => Some(*address),
            _ => None,
        }
    }
}
