// Thu Jan 29 2026 - Alex

pub mod error;
pub mod progress;

pub use error::DumpError;
pub use progress::Progress;

use crate::config::Config;
use crate::memory::{MemoryBackend, Session};
use crate::model::{TypeBuilder, TypeDatabase};
use crate::mono::{find_assembly_image, root_domain, walk_class_table, OffsetsProfile};
use crate::pe::{find_export, ModuleImage};
use crate::utils::logging::StageTimer;
use log::{info, warn};
use rayon::ThreadPoolBuilder;

const STEP_SHARE: f32 = 0.05;
const TABLE_SHARE: f32 = 0.35;
const BUILD_SHARE: f32 = 0.35;

/// Runs one dump: attach, locate the runtime, walk its class table and
/// reconstruct every type.
pub struct Inspector {
    config: Config,
    profile: OffsetsProfile,
    progress: Progress,
}

impl Inspector {
    pub fn new(config: Config, profile: OffsetsProfile) -> Self {
        Self {
            config,
            profile,
            progress: Progress::new(),
        }
    }

    /// Loads the offsets profile named by `config`, or uses the built-in one.
    pub fn from_config(config: Config) -> Result<Self, DumpError> {
        let profile = OffsetsProfile::load_or_default(config.offsets_profile.as_deref())?;
        Ok(Self::new(config, profile))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn profile(&self) -> &OffsetsProfile {
        &self.profile
    }

    /// Shared handle on this inspector's progress.
    pub fn progress(&self) -> Progress {
        self.progress.clone()
    }

    pub fn dump(
        &self,
        process: &str,
        backend: Box<dyn MemoryBackend>,
        module_name: &str,
    ) -> Result<TypeDatabase, DumpError> {
        let progress = &self.progress;
        let profile = &self.profile;
        progress.reset();

        let session = Session::attach(backend, process).map_err(|source| DumpError::Attach {
            process: process.to_string(),
            source,
        })?;
        info!("Attached to {} with the '{}' backend", session.process(), session.backend_name());
        progress.advance(STEP_SHARE);

        let module = session
            .resolve_module(module_name)
            .map_err(|source| DumpError::ModuleNotFound {
                module: module_name.to_string(),
                source,
            })?;
        info!("Found {}", module);
        progress.advance(STEP_SHARE);

        info!("Copying {} to local memory ({:.2} MB)", module.name, module.size as f64 / 1_048_576.0);
        let image = ModuleImage::copy(&session, &module)?;
        progress.advance(STEP_SHARE);

        let function = find_export(&image, profile, &self.config.export_symbol)?;
        progress.advance(STEP_SHARE);

        let domain = root_domain(&session, profile, function)?;
        let assembly = find_assembly_image(&session, profile, domain, &self.config.target_assembly)?;
        info!(
            "{} image at {} ({} assemblies checked)",
            self.config.target_assembly, assembly.image, assembly.visited
        );
        progress.advance(STEP_SHARE);

        let table_start = progress.get();
        let table = {
            let _timer = StageTimer::start("Class table walk");
            walk_class_table(&session, profile, assembly.image, |done, total| {
                progress.advance_to(table_start + TABLE_SHARE * done as f32 / total as f32);
            })?
        };
        progress.advance_to(table_start + TABLE_SHARE);

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.config.max_threads)
            .build()
            .map_err(|e| DumpError::ThreadPool(e.to_string()))?;

        info!("Reconstructing {} classes on {} threads", table.records.len(), self.config.max_threads);
        let per_type = BUILD_SHARE / table.records.len().max(1) as f32;
        let result = {
            let _timer = StageTimer::start("Reconstruction");
            TypeBuilder::new(&session, profile).build_all(&table.records, &pool, || {
                progress.advance(per_type);
            })?
        };

        if !result.diagnostics.is_empty() {
            warn!("Skipped {} fields or interfaces that could not be read", result.diagnostics.len());
        }
        progress.advance_to(1.0);

        info!("Dumped {} types ({} raw classes)", result.types.len(), table.raw_class_count);
        Ok(TypeDatabase::new(result.types, table.raw_class_count))
    }
}
