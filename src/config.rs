// Tue Jan 13 2026 - Alex

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_MODULE: &str = "mono-2.0-bdwgc.dll";
pub const DEFAULT_ASSEMBLY: &str = "Assembly-CSharp";
pub const DEFAULT_EXPORT: &str = "mono_get_root_domain";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: String,
    pub module_name: String,
    pub target_assembly: String,
    pub export_symbol: String,
    pub offsets_profile: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub max_threads: usize,
    pub dma_memmap: Option<PathBuf>,
    pub enable_progress_bars: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: "local".to_string(),
            module_name: DEFAULT_MODULE.to_string(),
            target_assembly: DEFAULT_ASSEMBLY.to_string(),
            export_symbol: DEFAULT_EXPORT.to_string(),
            offsets_profile: None,
            cache_dir: None,
            max_threads: num_cpus::get(),
            dma_memmap: Some(PathBuf::from("mmap.txt")),
            enable_progress_bars: true,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a JSON config file. Keys left out keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_backend(mut self, backend: &str) -> Self {
        self.backend = backend.to_string();
        self
    }

    pub fn with_module_name(mut self, module: &str) -> Self {
        self.module_name = module.to_string();
        self
    }

    pub fn with_target_assembly(mut self, assembly: &str) -> Self {
        self.target_assembly = assembly.to_string();
        self
    }

    pub fn with_offsets_profile(mut self, path: PathBuf) -> Self {
        self.offsets_profile = Some(path);
        self
    }

    pub fn with_cache_dir(mut self, dir: PathBuf) -> Self {
        self.cache_dir = Some(dir);
        self
    }

    pub fn with_max_threads(mut self, threads: usize) -> Self {
        self.max_threads = threads;
        self
    }

    pub fn with_dma_memmap(mut self, path: PathBuf) -> Self {
        self.dma_memmap = Some(path);
        self
    }

    pub fn with_progress_bars(mut self, enabled: bool) -> Self {
        self.enable_progress_bars = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.trim().is_empty() {
            return Err(ConfigError::Invalid("backend must not be empty".to_string()));
        }
        if self.module_name.trim().is_empty() {
            return Err(ConfigError::Invalid("module_name must not be empty".to_string()));
        }
        if self.target_assembly.is_empty() {
            return Err(ConfigError::Invalid("target_assembly must not be empty".to_string()));
        }
        if self.export_symbol.is_empty() {
            return Err(ConfigError::Invalid("export_symbol must not be empty".to_string()));
        }
        if self.max_threads == 0 {
            return Err(ConfigError::Invalid("max_threads must be greater than 0".to_string()));
        }
        Ok(())
    }
}
