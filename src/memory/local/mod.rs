// Tue Jan 20 2026 - Alex

#[cfg(target_os = "linux")]
mod linux;
#[cfg(windows)]
mod windows;

#[cfg(target_os = "linux")]
pub use linux::LocalProcess;
#[cfg(windows)]
pub use windows::LocalProcess;

#[cfg(not(any(target_os = "linux", windows)))]
mod unsupported {
    use crate::memory::{Address, MemoryBackend, MemoryError, MemoryReader, ModuleInfo};

    #[derive(Debug, Default)]
    pub struct LocalProcess;

    impl LocalProcess {
        pub fn new() -> Self {
            Self
        }
    }

    impl MemoryReader for LocalProcess {
        fn read_bytes(&self, _addr: Address, _len: usize) -> Result<Vec<u8>, MemoryError> {
            Err(MemoryError::NotAttached)
        }
    }

    impl MemoryBackend for LocalProcess {
        fn name(&self) -> &'static str {
            "local"
        }

        fn attach(&mut self, _process: &str) -> Result<(), MemoryError> {
            Err(MemoryError::NotSupported(format!(
                "local process access on {}",
                std::env::consts::OS
            )))
        }

        fn resolve_module(&self, name: &str) -> Result<ModuleInfo, MemoryError> {
            Err(MemoryError::ModuleNotFound(name.to_string()))
        }

        fn release(&mut self) {}
    }
}

#[cfg(not(any(target_os = "linux", windows)))]
pub use unsupported::LocalProcess;

/// Compares a process or module name the way users type it: case-insensitive,
/// with the `.exe` suffix optional on either side.
pub(crate) fn names_match(candidate: &str, wanted: &str) -> bool {
    fn trim(name: &str) -> &str {
        match name.len().checked_sub(4) {
            Some(idx) if name.get(idx..).is_some_and(|ext| ext.eq_ignore_ascii_case(".exe")) => {
                &name[..idx]
            }
            _ => name,
        }
    }

    trim(candidate).eq_ignore_ascii_case(trim(wanted))
}
