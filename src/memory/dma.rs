// Wed Jan 21 2026 - Alex

use crate::memory::{Address, MemoryBackend, MemoryError, MemoryReader, ModuleInfo};
use log::{debug, info, warn};
use memflow::prelude::v1::{
    ConnectorArgs, Inventory, IntoProcessInstanceArcBox, MemoryView, Os, Process, PartialResultExt,
};
use parking_lot::Mutex;
use std::path::PathBuf;

const CONNECTOR: &str = "pcileech";
const OS_LAYER: &str = "win32";

/// Physical memory access over a PCIe DMA card through memflow's pcileech connector.
pub struct DmaBackend {
    memmap: Option<PathBuf>,
    process: Mutex<Option<IntoProcessInstanceArcBox<'static>>>,
}

impl DmaBackend {
    pub fn new(memmap: Option<PathBuf>) -> Self {
        Self {
            memmap,
            process: Mutex::new(None),
        }
    }

    fn connector_args(&self) -> String {
        match &self.memmap {
            Some(path) if path.is_file() => {
                info!("Using memory map {}", path.display());
                format!(":device=FPGA,memmap={}", path.display())
            }
            Some(path) => {
                warn!("Memory map {} not found, continuing without it", path.display());
                ":device=FPGA".to_string()
            }
            None => ":device=FPGA".to_string(),
        }
    }
}

impl MemoryReader for DmaBackend {
    fn read_bytes(&self, addr: Address, len: usize) -> Result<Vec<u8>, MemoryError> {
        let mut guard = self.process.lock();
        let process = guard.as_mut().ok_or(MemoryError::NotAttached)?;

        let mut buffer = vec![0u8; len];
        process
            .read_raw_into(addr.as_u64().into(), &mut buffer)
            .data_part()
            .map_err(|e| MemoryError::read_failed(addr, len, e.to_string()))?;
        Ok(buffer)
    }
}

impl MemoryBackend for DmaBackend {
    fn name(&self) -> &'static str {
        "dma"
    }

    fn attach(&mut self, process: &str) -> Result<(), MemoryError> {
        let args: ConnectorArgs = self
            .connector_args()
            .parse()
            .map_err(|e: memflow::error::Error| MemoryError::AttachFailed {
                process: process.to_string(),
                reason: e.to_string(),
            })?;

        let os = Inventory::scan()
            .builder()
            .connector(CONNECTOR)
            .args(args)
            .os(OS_LAYER)
            .build()
            .map_err(|e| MemoryError::AttachFailed {
                process: process.to_string(),
                reason: e.to_string(),
            })?;

        let instance = os
            .into_process_by_name(process)
            .map_err(|_| MemoryError::ProcessNotFound(process.to_string()))?;

        debug!("Attached to {} over {}", process, CONNECTOR);
        *self.process.lock() = Some(instance);
        Ok(())
    }

    fn resolve_module(&self, name: &str) -> Result<ModuleInfo, MemoryError> {
        let mut guard = self.process.lock();
        let process = guard.as_mut().ok_or(MemoryError::NotAttached)?;

        let module = process
            .module_by_name(name)
            .map_err(|_| MemoryError::ModuleNotFound(name.to_string()))?;

        Ok(ModuleInfo::new(
            name,
            Address::new(module.base.to_umem()),
            module.size as usize,
        ))
    }

    fn release(&mut self) {
        self.process.lock().take();
    }
}
