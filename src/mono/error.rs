// Thu Jan 22 2026 - Alex

use crate::memory::{Address, MemoryError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalkError {
    #[error(transparent)]
    Memory(#[from] MemoryError),
    #[error("Root domain pointer is null")]
    NullDomain,
    #[error("Unexpected null {0} pointer")]
    NullPointer(&'static str),
    #[error("Assembly '{name}' not found after {visited} entries")]
    AssemblyNotFound { name: String, visited: usize },
    #[error("Field offset {offset:#x} cannot drop a {header:#x} byte value type header")]
    FieldOffset { offset: i32, header: i32 },
    #[error("Class hash table at {address} has implausible size {size}")]
    InvalidHashTable { address: Address, size: u32 },
}
