// Tue Jan 20 2026 - Alex

use super::names_match;
use crate::memory::{Address, MemoryBackend, MemoryError, MemoryReader, ModuleInfo};
use log::{debug, trace};
use std::ffi::c_void;
use windows::Win32::Foundation::{CloseHandle, HANDLE, HMODULE};
use windows::Win32::System::Diagnostics::Debug::ReadProcessMemory;
use windows::Win32::System::ProcessStatus::{
    EnumProcessModulesEx, EnumProcesses, GetModuleBaseNameW, GetModuleInformation, LIST_MODULES_ALL,
    MODULEINFO,
};
use windows::Win32::System::Threading::{OpenProcess, PROCESS_QUERY_INFORMATION, PROCESS_VM_READ};

/// Reads another process through `OpenProcess` and `ReadProcessMemory`.
///
/// The handle is kept as a raw integer because `HANDLE` is not `Send`.
#[derive(Debug, Default)]
pub struct LocalProcess {
    handle: Option<usize>,
    pid: Option<u32>,
}

impl LocalProcess {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    fn handle(&self) -> Result<HANDLE, MemoryError> {
        self.handle
            .map(|h| HANDLE(h as *mut c_void))
            .ok_or(MemoryError::NotAttached)
    }

    fn process_ids() -> Result<Vec<u32>, MemoryError> {
        let mut pids = vec![0u32; 4096];
        let mut needed = 0u32;
        unsafe {
            EnumProcesses(
                pids.as_mut_ptr(),
                (pids.len() * std::mem::size_of::<u32>()) as u32,
                &mut needed,
            )
        }
        .map_err(|e| MemoryError::NotSupported(format!("EnumProcesses failed: {}", e)))?;

        pids.truncate(needed as usize / std::mem::size_of::<u32>());
        Ok(pids)
    }

    fn open(pid: u32) -> Option<HANDLE> {
        unsafe { OpenProcess(PROCESS_QUERY_INFORMATION | PROCESS_VM_READ, false, pid) }.ok()
    }

    fn base_name(handle: HANDLE, module: Option<HMODULE>) -> Option<String> {
        let mut buffer = [0u16; 260];
        let len = unsafe { GetModuleBaseNameW(handle, module, &mut buffer) };
        if len == 0 {
            return None;
        }
        Some(String::from_utf16_lossy(&buffer[..len as usize]))
    }

    /// Accepts a numeric pid or a process name.
    pub fn find_process(process: &str) -> Result<u32, MemoryError> {
        if let Ok(pid) = process.parse::<u32>() {
            return Ok(pid);
        }

        for pid in Self::process_ids()? {
            if pid == 0 {
                continue;
            }
            let handle = match Self::open(pid) {
                Some(handle) => handle,
                None => continue,
            };
            let name = Self::base_name(handle, None);
            unsafe {
                let _ = CloseHandle(handle);
            }

            if name.is_some_and(|n| names_match(&n, process)) {
                return Ok(pid);
            }
        }

        Err(MemoryError::ProcessNotFound(process.to_string()))
    }

    fn modules(&self) -> Result<Vec<HMODULE>, MemoryError> {
        let handle = self.handle()?;
        let mut modules = vec![HMODULE::default(); 1024];
        let mut needed = 0u32;
        unsafe {
            EnumProcessModulesEx(
                handle,
                modules.as_mut_ptr(),
                (modules.len() * std::mem::size_of::<HMODULE>()) as u32,
                &mut needed,
                LIST_MODULES_ALL,
            )
        }
        .map_err(|e| MemoryError::NotSupported(format!("EnumProcessModulesEx failed: {}", e)))?;

        modules.truncate((needed as usize / std::mem::size_of::<HMODULE>()).min(1024));
        Ok(modules)
    }
}

impl MemoryReader for LocalProcess {
    fn read_bytes(&self, addr: Address, len: usize) -> Result<Vec<u8>, MemoryError> {
        let handle = self.handle()?;
        let mut buffer = vec![0u8; len];
        if len == 0 {
            return Ok(buffer);
        }

        let mut read = 0usize;
        unsafe {
            ReadProcessMemory(
                handle,
                addr.as_u64() as *const c_void,
                buffer.as_mut_ptr() as *mut c_void,
                len,
                Some(&mut read),
            )
        }
        .map_err(|e| MemoryError::read_failed(addr, len, e.to_string()))?;

        if read != len {
            return Err(MemoryError::ShortRead {
                address: addr,
                len,
                got: read,
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
        self.release();
        let pid = Self::find_process(process)?;
        let handle = unsafe { OpenProcess(PROCESS_QUERY_INFORMATION | PROCESS_VM_READ, false, pid) }
            .map_err(|e| MemoryError::AttachFailed {
                process: process.to_string(),
                reason: e.to_string(),
            })?;

        debug!("Attached to {} (pid {})", process, pid);
        self.handle = Some(handle.0 as usize);
        self.pid = Some(pid);
        Ok(())
    }

    fn resolve_module(&self, name: &str) -> Result<ModuleInfo, MemoryError> {
        let handle = self.handle()?;

        for module in self.modules()? {
            let module_name = match Self::base_name(handle, Some(module)) {
                Some(n) => n,
                None => continue,
            };
            if !names_match(&module_name, name) {
                continue;
            }

            let mut info = MODULEINFO::default();
            unsafe {
                GetModuleInformation(
                    handle,
                    module,
                    &mut info,
                    std::mem::size_of::<MODULEINFO>() as u32,
                )
            }
            .map_err(|e| MemoryError::NotSupported(format!("GetModuleInformation failed: {}", e)))?;

            return Ok(ModuleInfo::new(
                &module_name,
                Address::new(info.lpBaseOfDll as u64),
                info.SizeOfImage as usize,
            ));
        }

        Err(MemoryError::ModuleNotFound(name.to_string()))
    }

    fn release(&mut self) {
        if let Some(raw) = self.handle.take() {
            unsafe {
                let _ = CloseHandle(HANDLE(raw as *mut c_void));
            }
        }
        self.pid = None;
    }
}

impl Drop for LocalProcess {
    fn drop(&mut self) {
        self.release();
    }
}
