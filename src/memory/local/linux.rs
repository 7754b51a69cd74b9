// Tue Jan 20 2026 - Alex

use super::names_match;
use crate::memory::{Address, MemoryBackend, MemoryError, MemoryReader, ModuleInfo};
use libc::{c_void, iovec, pid_t};
use log::{debug, trace};
use std::fs;
use std::io;
use std::path::Path;

/// Reads another process on the same machine through `process_vm_readv`.
#[derive(Debug, Default)]
pub struct LocalProcess {
    pid: Option<pid_t>,
}

impl LocalProcess {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pid(&self) -> Option<pid_t> {
        self.pid
    }

    /// Accepts a numeric pid or a process name.
    pub fn find_process(process: &str) -> Result<pid_t, MemoryError> {
        if let Ok(pid) = process.parse::<pid_t>() {
            if Path::new(&format!("/proc/{}", pid)).exists() {
                return Ok(pid);
            }
            return Err(MemoryError::ProcessNotFound(process.to_string()));
        }

        for entry in fs::read_dir("/proc")?.flatten() {
            let pid = match entry.file_name().to_str().and_then(|s| s.parse::<pid_t>().ok()) {
                Some(pid) => pid,
                None => continue,
            };

            if Self::process_names(pid).iter().any(|n| names_match(n, process)) {
                return Ok(pid);
            }
        }

        Err(MemoryError::ProcessNotFound(process.to_string()))
    }

    fn process_names(pid: pid_t) -> Vec<String> {
        let mut names = Vec::new();

        if let Ok(comm) = fs::read_to_string(format!("/proc/{}/comm", pid)) {
            names.push(comm.trim_end().to_string());
        }

        // Wine and Proton keep the Windows image path in argv[0].
        if let Ok(cmdline) = fs::read(format!("/proc/{}/cmdline", pid)) {
            if let Some(argv0) = cmdline.split(|&b| b == 0).next() {
                let argv0 = String::from_utf8_lossy(argv0);
                if let Some(base) = file_name(&argv0) {
                    names.push(base.to_string());
                }
            }
        }

        names
    }

    fn maps(&self) -> Result<String, MemoryError> {
        let pid = self.pid.ok_or(MemoryError::NotAttached)?;
        Ok(fs::read_to_string(format!("/proc/{}/maps", pid))?)
    }
}

fn file_name(path: &str) -> Option<&str> {
    path.rsplit(['/', '\\']).next().filter(|s| !s.is_empty())
}

/// Finds the span covering every mapping of `module` in a `/proc/<pid>/maps` listing.
pub(crate) fn module_span(maps: &str, module: &str) -> Option<(u64, u64)> {
    let mut span: Option<(u64, u64)> = None;

    for line in maps.lines() {
        let mut parts = line.split_whitespace();
        let range = match parts.next() {
            Some(range) => range,
            None => continue,
        };
        let path = match parts.nth(4) {
            Some(path) => path,
            None => continue,
        };

        if !file_name(path).is_some_and(|name| names_match(name, module)) {
            continue;
        }

        let (start, end) = match range.split_once('-') {
            Some((s, e)) => match (u64::from_str_radix(s, 16), u64::from_str_radix(e, 16)) {
                (Ok(s), Ok(e)) => (s, e),
                _ => continue,
            },
            None => continue,
        };

        span = Some(match span {
            Some((lo, hi)) => (lo.min(start), hi.max(end)),
            None => (start, end),
        });
    }

    span
}

impl MemoryReader for LocalProcess {
    fn read_bytes(&self, addr: Address, len: usize) -> Result<Vec<u8>, MemoryError> {
        let pid = self.pid.ok_or(MemoryError::NotAttached)?;
        let mut buffer = vec![0u8; len];
        if len == 0 {
            return Ok(buffer);
        }

        let local = iovec {
            iov_base: buffer.as_mut_ptr() as *mut c_void,
            iov_len: len,
        };
        let remote = iovec {
            iov_base: addr.as_u64() as *mut c_void,
            iov_len: len,
        };

        let read = unsafe { libc::process_vm_readv(pid, &local, 1, &remote, 1, 0) };
        if read < 0 {
            return Err(MemoryError::read_failed(
                addr,
                len,
                io::Error::last_os_error().to_string(),
            ));
        }
        if read as usize != len {
            return Err(MemoryError::ShortRead {
                address: addr,
                len,
                got: read as usize,
            });
        }

        trace!("Read {} bytes at {}", len, addr);
        Ok(buffer)
    }
}

impl MemoryBackend for LocalProcess {
    fn name(&self) -> &'static str {
        "local"
    }

    fn attach(&mut self, process: &str) -> Result<(), MemoryError> {
        let pid = Self::find_process(process)?;
        fs::metadata(format!("/proc/{}/maps", pid)).map_err(|e| MemoryError::AttachFailed {
            process: process.to_string(),
            reason: e.to_string(),
        })?;

        debug!("Attached to {} (pid {})", process, pid);
        self.pid = Some(pid);
        Ok(())
    }

    fn resolve_module(&self, name: &str) -> Result<ModuleInfo, MemoryError> {
        let maps = self.maps()?;
        let (start, end) =
            module_span(&maps, name).ok_or_else(|| MemoryError::ModuleNotFound(name.to_string()))?;
        Ok(ModuleInfo::new(name, Address::new(start), (end - start) as usize))
    }

    fn release(&mut self) {
        self.pid = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAPS: &str = "\
7f0000000000-7f0000001000 r--p 00000000 08:01 1234 /games/data/Mono/mono-2.0-bdwgc.dll
7f0000001000-7f0000400000 r-xp 00001000 08:01 1234 /games/data/Mono/mono-2.0-bdwgc.dll
7f0000400000-7f0000500000 rw-p 00000000 00:00 0
7f0000500000-7f0000600000 r--p 00400000 08:01 1234 /games/data/Mono/mono-2.0-bdwgc.dll
7f1000000000-7f1000100000 r-xp 00000000 08:01 99 /usr/lib/libc.so.6
";

    #[test]
    fn test_module_span_merges_mappings() {
        let span = module_span(MAPS, "MONO-2.0-BDWGC.DLL").unwrap();
        assert_eq!(span, (0x7f0000000000, 0x7f0000600000));
    }

    #[test]
    fn test_module_span_missing() {
        assert!(module_span(MAPS, "UnityPlayer.dll").is_none());
    }

    #[test]
    fn test_file_name_handles_windows_paths() {
        assert_eq!(file_name("C:\\Games\\Tarkov.exe"), Some("Tarkov.exe"));
        assert_eq!(file_name("/usr/bin/game"), Some("game"));
    }

    #[test]
    fn test_read_without_attach() {
        let process = LocalProcess::new();
        assert!(matches!(
            process.read_bytes(Address::new(0x1000), 4),
            Err(MemoryError::NotAttached)
        ));
    }
}
