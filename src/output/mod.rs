// Mon Feb 02 2026 - Alex

pub mod csharp;
pub mod json;
pub mod stats;
pub mod text;

pub use csharp::{simple_keyword, PointerType, StructWriter};
pub use json::JsonExport;
pub use stats::TypeStatistics;
pub use text::TreeWriter;

use crate::cache::{save_cache, CacheError};
use crate::model::TypeDatabase;
use log::info;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

pub const GENERATOR: &str = concat!("mono-type-dumper v", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("Unknown export format '{0}' (expected text, json, utd, csharp-intptr or csharp-ulong)")]
    UnknownFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Text,
    Json,
    TypeDatabase,
    CSharp(PointerType),
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Json => "json",
            Self::TypeDatabase => "utd",
            Self::CSharp(_) => "cs",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "utd" => Ok(Self::TypeDatabase),
            "csharp-intptr" => Ok(Self::CSharp(PointerType::IntPtr)),
            "csharp-ulong" | "csharp" => Ok(Self::CSharp(PointerType::ULong)),
            _ => Err(OutputError::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
            Self::TypeDatabase => write!(f, "utd"),
            Self::CSharp(PointerType::IntPtr) => write!(f, "csharp-intptr"),
            Self::CSharp(PointerType::ULong) => write!(f, "csharp-ulong"),
        }
    }
}

/// Renders `db` in `format`. `verbose` adds class kinds, parents and
/// constant fields where the format supports them.
pub fn render(db: &TypeDatabase, format: ExportFormat, verbose: bool) -> Result<String, OutputError> {
    Ok(match format {
        ExportFormat::Text => TreeWriter::new().with_verbose(verbose).render(db),
        ExportFormat::Json => JsonExport::from_database(db).to_json()?,
        ExportFormat::TypeDatabase => serde_json::to_string_pretty(db)?,
        ExportFormat::CSharp(ptr) => StructWriter::new(ptr).with_constants(verbose).render(db),
    })
}

pub fn write_export(path: &Path, db: &TypeDatabase, format: ExportFormat, verbose: bool) -> Result<(), OutputError> {
    if format == ExportFormat::TypeDatabase {
        save_cache(path, db)?;
    } else {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, render(db, format, verbose)?)?;
    }
    info!("Exported {} types as {} to {}", db.len(), format, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::load_cache;
    use crate::utils::testing::type_def;

    #[test]
    fn test_parse_formats() {
        assert_eq!("TEXT".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert_eq!(
            "csharp-intptr".parse::<ExportFormat>().unwrap(),
            ExportFormat::CSharp(PointerType::IntPtr)
        );
        assert_eq!(ExportFormat::CSharp(PointerType::ULong).to_string(), "csharp-ulong");
        assert!(matches!("xml".parse::<ExportFormat>(), Err(OutputError::UnknownFormat(_))));
    }

    #[test]
    fn test_utd_export_is_a_cache() {
        let db = TypeDatabase::new(vec![type_def("Foo", &[("a", 0x10)])], 3);
        let path = std::env::temp_dir()
            .join(format!("mono-type-dumper-export-{}", std::process::id()))
            .join("dump.utd");

        write_export(&path, &db, ExportFormat::TypeDatabase, true).unwrap();
        assert_eq!(load_cache(&path).unwrap(), db);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
