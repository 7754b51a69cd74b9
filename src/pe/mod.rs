// Thu Jan 22 2026 - Alex

pub mod exports;
pub mod image;

pub use exports::find_export;
pub use image::ModuleImage;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PeError {
    #[error("Offset 0x{offset:x} (+{len}) lies outside the {size} byte image")]
    OutOfBounds { offset: u64, len: usize, size: usize },
    #[error("Malformed PE image: {0}")]
    Malformed(String),
    #[error("Export '{0}' not found")]
    ExportNotFound(String),
}
