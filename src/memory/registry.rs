// Wed Jan 21 2026 - Alex

use crate::config::Config;
use crate::memory::{LocalProcess, MemoryBackend, MemoryError};
use indexmap::IndexMap;

pub type BackendFactory = fn(&Config) -> Result<Box<dyn MemoryBackend>, MemoryError>;

/// Named constructors for the available memory backends.
pub struct BackendRegistry {
    factories: IndexMap<String, BackendFactory>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self {
            factories: IndexMap::new(),
        }
    }

    /// Registry holding `local` and, when built with the `dma` feature, `dma`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("local", |_| Ok(Box::new(LocalProcess::new()) as Box<dyn MemoryBackend>));
        #[cfg(feature = "dma")]
        registry.register("dma", |config| {
            let backend = crate::memory::DmaBackend::new(config.dma_memmap.clone());
            Ok(Box::new(backend) as Box<dyn MemoryBackend>)
        });
        registry
    }

    pub fn register(&mut self, name: &str, factory: BackendFactory) {
        self.factories.insert(name.to_ascii_lowercase(), factory);
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(|k| k.as_str()).collect()
    }

    /// Exact name first, then the first registered name containing `name`.
    pub fn find(&self, name: &str) -> Option<(&str, BackendFactory)> {
        let wanted = name.to_ascii_lowercase();
        self.factories
            .get_key_value(&wanted)
            .or_else(|| self.factories.iter().find(|(k, _)| k.contains(&wanted)))
            .map(|(k, f)| (k.as_str(), *f))
    }

    pub fn create(&self, name: &str, config: &Config) -> Result<Box<dyn MemoryBackend>, MemoryError> {
        let (_, factory) = self
            .find(name)
            .ok_or_else(|| MemoryError::UnknownBackend(name.to_string()))?;
        factory(config)
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
