// Mon Jan 19 2026 - Alex

use crate::memory::{Address, MemoryBackend, MemoryError, MemoryReader, ModuleInfo};
use log::debug;

/// An attached backend. Releases the target when dropped, on every exit path.
pub struct Session {
    backend: Box<dyn MemoryBackend>,
    process: String,
}

impl Session {
    /// Attaches `backend` to `process`. The backend is released even when the
    /// attach itself fails.
    pub fn attach(backend: Box<dyn MemoryBackend>, process: &str) -> Result<Self, MemoryError> {
        let mut session = Self {
            backend,
            process: process.to_string(),
        };
        debug!("Attaching '{}' backend to {}", session.backend.name(), process);
        session.backend.attach(process)?;
        Ok(session)
    }

    pub fn process(&self) -> &str {
        &self.process
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn resolve_module(&self, name: &str) -> Result<ModuleInfo, MemoryError> {
        self.backend.resolve_module(name)
    }

    pub fn release(&mut self) {
        self.backend.release();
    }
}

impl MemoryReader for Session {
    fn read_bytes(&self, addr: Address, len: usize) -> Result<Vec<u8>, MemoryError> {
        self.backend.read_bytes(addr, len)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        debug!("Releasing '{}' backend", self.backend.name());
        self.backend.release();
    }
}
