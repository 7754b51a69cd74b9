// Mon Jan 19 2026 - Alex

use crate::memory::{Address, MemoryBackend, MemoryError, MemoryReader, ModuleInfo};
use std::collections::BTreeMap;

/// An address space made of byte regions held in local memory.
///
/// Used for offline snapshots of a target and for driving the walkers in
/// tests. Reads spanning two regions succeed only when the regions are
/// contiguous.
#[derive(Debug, Default, Clone)]
pub struct SparseMemory {
    regions: BTreeMap<u64, Vec<u8>>,
    modules: Vec<ModuleInfo>,
    processes: Vec<String>,
    attached: Option<String>,
}

impl SparseMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `bytes` at `addr`, replacing any region that starts at the same address.
    pub fn map(&mut self, addr: Address, bytes: Vec<u8>) {
        self.regions.insert(addr.as_u64(), bytes);
    }

    /// Overwrites bytes inside an already mapped region.
    pub fn write(&mut self, addr: Address, bytes: &[u8]) -> Result<(), MemoryError> {
        let (start, region) = self
            .regions
            .range_mut(..=addr.as_u64())
            .next_back()
            .ok_or_else(|| MemoryError::read_failed(addr, bytes.len(), "address not mapped"))?;

        let offset = (addr.as_u64() - *start) as usize;
        let end = offset + bytes.len();
        if end > region.len() {
            return Err(MemoryError::read_failed(addr, bytes.len(), "write crosses region end"));
        }
        region[offset..end].copy_from_slice(bytes);
        Ok(())
    }

    pub fn add_module(&mut self, module: ModuleInfo) {
        self.modules.push(module);
    }

    /// Restricts `attach` to the given process names. With none registered any name is accepted.
    pub fn add_process(&mut self, name: &str) {
        self.processes.push(name.to_string());
    }

    pub fn attached_process(&self) -> Option<&str> {
        self.attached.as_deref()
    }
}

impl MemoryReader for SparseMemory {
    fn read_bytes(&self, addr: Address, len: usize) -> Result<Vec<u8>, MemoryError> {
        let mut out = Vec::with_capacity(len);
        let mut current = addr.as_u64();

        while out.len() < len {
            let (start, region) = self
                .regions
                .range(..=current)
                .next_back()
                .ok_or_else(|| MemoryError::read_failed(addr, len, "address not mapped"))?;

            let offset = (current - start) as usize;
            if offset >= region.len() {
                return Err(MemoryError::read_failed(addr, len, "address not mapped"));
            }

            let take = (region.len() - offset).min(len - out.len());
            out.extend_from_slice(&region[offset..offset + take]);
            current += take as u64;
        }

        Ok(out)
    }
}

impl MemoryBackend for SparseMemory {
    fn name(&self) -> &'static str {
        "sparse"
    }

    fn attach(&mut self, process: &str) -> Result<(), MemoryError> {
        if !self.processes.is_empty()
            && !self.processes.iter().any(|p| p.eq_ignore_ascii_case(process))
        {
            return Err(MemoryError::ProcessNotFound(process.to_string()));
        }
        self.attached = Some(process.to_string());
        Ok(())
    }

    fn resolve_module(&self, name: &str) -> Result<ModuleInfo, MemoryError> {
        if self.attached.is_none() {
            return Err(MemoryError::NotAttached);
        }
        self.modules
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| MemoryError::ModuleNotFound(name.to_string()))
    }

    fn release(&mut self) {
        self.attached = None;
    }
}
