// Fri Jan 30 2026 - Alex

pub mod store;

pub use store::{CacheInfo, CacheStore, CacheValidation};

use crate::model::{TypeDatabase, TypeDefinition};
use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const CACHE_EXTENSION: &str = "utd";

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Cache file is empty")]
    Empty,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CacheFile {
    #[serde(default)]
    raw_class_count: i64,
    #[serde(default)]
    type_definitions: Option<Vec<TypeDefinition>>,
}

/// Parses a cache document: either `{RawClassCount, TypeDefinitions}` or a
/// bare array of type definitions from older versions.
pub fn parse_cache(text: &str) -> Result<TypeDatabase, CacheError> {
    let first = text.chars().find(|c| !c.is_whitespace()).ok_or(CacheError::Empty)?;

    if first == '[' {
        let types: Vec<TypeDefinition> = serde_json::from_str(text)?;
        let count = types.len();
        return Ok(TypeDatabase::new(types, count));
    }

    let file: CacheFile = serde_json::from_str(text)?;
    let types = file.type_definitions.unwrap_or_default();
    let count = if file.raw_class_count > 0 {
        file.raw_class_count as usize
    } else {
        types.len()
    };
    Ok(TypeDatabase::new(types, count))
}

pub fn load_cache(path: &Path) -> Result<TypeDatabase, CacheError> {
    debug!("Loading cache {}", path.display());
    let text = fs::read_to_string(path)?;
    parse_cache(&text)
}

/// Writes `db` as indented JSON, creating the parent directory if needed.
pub fn save_cache(path: &Path, db: &TypeDatabase) -> Result<(), CacheError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(db)?;
    fs::write(path, json)?;
    debug!("Saved {} types to {}", db.len(), path.display());
    Ok(())
}
