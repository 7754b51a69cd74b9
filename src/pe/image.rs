// Thu Jan 22 2026 - Alex

use super::PeError;
use crate::memory::{Address, MemoryError, MemoryReader, ModuleInfo};
use goblin::pe::header::{Header, COFF_MACHINE_X86_64};
use log::{debug, warn};

const PAGE_SIZE: usize = 0x1000;

/// A local copy of a module's mapped image.
#[derive(Debug, Clone)]
pub struct ModuleImage {
    base: Address,
    data: Vec<u8>,
    failed_pages: usize,
}

impl ModuleImage {
    pub fn from_bytes(base: Address, data: Vec<u8>) -> Self {
        Self {
            base,
            data,
            failed_pages: 0,
        }
    }

    /// Copies the whole module out of the target. Falls back to page reads
    /// when the bulk read fails; unreadable pages are left zeroed.
    pub fn copy<R: MemoryReader + ?Sized>(reader: &R, module: &ModuleInfo) -> Result<Self, MemoryError> {
        debug!("Copying {} ({} bytes)", module.name, module.size);

        let image = match reader.read_bytes(module.base, module.size) {
            Ok(data) if data.len() == module.size => Self::from_bytes(module.base, data),
            _ => Self::copy_pages(reader, module)?,
        };

        image.check_header();
        Ok(image)
    }

    fn copy_pages<R: MemoryReader + ?Sized>(reader: &R, module: &ModuleInfo) -> Result<Self, MemoryError> {
        let mut data = vec![0u8; module.size];
        let mut failed = 0;
        let mut pages = 0;

        for (index, chunk) in data.chunks_mut(PAGE_SIZE).enumerate() {
            pages += 1;
            let addr = module.base + (index * PAGE_SIZE) as u64;
            match reader.read_bytes(addr, chunk.len()) {
                Ok(bytes) if bytes.len() == chunk.len() => chunk.copy_from_slice(&bytes),
                _ => failed += 1,
            }
        }

        if failed == pages {
            return Err(MemoryError::read_failed(
                module.base,
                module.size,
                "no page of the module was readable",
            ));
        }
        if failed > 0 {
            warn!("{} of {} pages of {} were unreadable", failed, pages, module.name);
        }

        Ok(Self {
            base: module.base,
            data,
            failed_pages: failed,
        })
    }

    fn check_header(&self) {
        match Header::parse(&self.data) {
            Ok(header) if header.coff_header.machine != COFF_MACHINE_X86_64 => {
                warn!("Module is not x86-64 (machine 0x{:x})", header.coff_header.machine);
            }
            Ok(_) => {}
            Err(e) => warn!("Could not parse PE header: {}", e),
        }
    }

    pub fn base(&self) -> Address {
        self.base
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn failed_pages(&self) -> usize {
        self.failed_pages
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn slice(&self, offset: u64, len: usize) -> Result<&[u8], PeError> {
        let out_of_bounds = || PeError::OutOfBounds {
            offset,
            len,
            size: self.data.len(),
        };
        let start = usize::try_from(offset).map_err(|_| out_of_bounds())?;
        let end = start.checked_add(len).ok_or_else(out_of_bounds)?;
        self.data.get(start..end).ok_or_else(out_of_bounds)
    }

    pub fn u16_at(&self, offset: u64) -> Result<u16, PeError> {
        let bytes = self.slice(offset, 2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn u32_at(&self, offset: u64) -> Result<u32, PeError> {
        let bytes = self.slice(offset, 4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// NUL-terminated bytes starting at `offset`, without the terminator.
    pub fn c_str_at(&self, offset: u64) -> Result<&[u8], PeError> {
        let rest = self.slice(offset, 0).map(|_| &self.data[offset as usize..])?;
        let end = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| PeError::Malformed(format!("unterminated string at 0x{:x}", offset)))?;
        Ok(&rest[..end])
    }
}
