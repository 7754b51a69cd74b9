// Wed Jan 15 2026 - Alex

use super::args::{
    Args, CacheCommand, Command, CompareArgs, DumpArgs, QueryArgs, QueryCommand, SearchArgs, StatsArgs,
};
use crate::cache::{load_cache, CacheStore, CACHE_EXTENSION};
use crate::config::Config;
use crate::diff::diff;
use crate::inspector::Inspector;
use crate::memory::BackendRegistry;
use crate::model::TypeDatabase;
use crate::output::{write_export, ExportFormat, TypeStatistics};
use crate::query::{parse_offset_range, TypeFilter, TypeQuery};
use crate::ui::banner::Banner;
use crate::ui::display::DisplayRenderer;
use crate::ui::progress::DumpProgress;
use crate::utils::logging::LoggingUtils;
use crate::utils::{format_bytes, format_duration, measure_time};
use anyhow::{anyhow, bail, Context};
use colored::Colorize;
use log::{debug, warn};
use std::fs;
use std::path::Path;

pub struct CommandHandler {
    config: Config,
    quiet: bool,
}

impl CommandHandler {
    pub fn new(config: Config) -> Self {
        Self { config, quiet: false }
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Sets up logging and configuration from `args`, then runs the command.
    pub fn run(args: Args) -> anyhow::Result<()> {
        Self::setup_logging(&args)?;
        if args.no_color {
            colored::control::set_override(false);
        }
        if !args.quiet {
            Banner::print();
        }

        let mut config = match &args.config {
            Some(path) => Config::load(path).with_context(|| format!("loading config {}", path.display()))?,
            None => Config::default(),
        };
        if let Some(dir) = &args.cache_dir {
            config = config.with_cache_dir(dir.clone());
        }
        if let Some(assembly) = &args.assembly {
            config = config.with_target_assembly(assembly);
        }
        config.validate()?;
        debug!("Configuration: {:?}", config);

        Self::new(config).with_quiet(args.quiet).execute(args.command)
    }

    fn setup_logging(args: &Args) -> anyhow::Result<()> {
        let level = LoggingUtils::level_from_verbosity(args.verbose);
        match &args.log_file {
            Some(path) => LoggingUtils::init_logger_with_file(level, path)
                .with_context(|| format!("opening log file {}", path.display()))?,
            None => LoggingUtils::init_logger(level),
        }
        Ok(())
    }

    pub fn execute(&self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Dump(args) => self.handle_dump(args),
            Command::Compare(args) => self.handle_compare(args),
            Command::Search(args) => self.handle_search(args),
            Command::Query(args) => self.handle_query(args),
            Command::Stats(args) => self.handle_stats(args),
            Command::Cache(command) => self.handle_cache(command),
            Command::Backends => self.handle_backends(),
        }
    }

    fn store(&self) -> CacheStore {
        CacheStore::from_config(&self.config)
    }

    /// A `.utd` path is read directly; anything else is a cached process.
    fn load_database(&self, source: &str) -> anyhow::Result<TypeDatabase> {
        let path = Path::new(source);
        if path.is_file() && path.extension().is_some_and(|e| e == CACHE_EXTENSION) {
            return load_cache(path).with_context(|| format!("reading {}", path.display()));
        }
        self.store()
            .load(source, &self.config.target_assembly)
            .ok_or_else(|| anyhow!("No cached dump for '{}'. Run `dump {}` first.", source, source))
    }

    fn handle_dump(&self, args: DumpArgs) -> anyhow::Result<()> {
        let mut config = self.config.clone();
        if let Some(backend) = &args.backend {
            config = config.with_backend(backend);
        }
        if let Some(module) = &args.module {
            config = config.with_module_name(module);
        }
        if let Some(profile) = &args.profile {
            config = config.with_offsets_profile(profile.clone());
        }
        if let Some(threads) = args.threads {
            config = config.with_max_threads(threads);
        }
        if let Some(memmap) = &args.memmap {
            config = config.with_dma_memmap(memmap.clone());
        }
        if args.no_progress || self.quiet {
            config = config.with_progress_bars(false);
        }
        config.validate()?;

        let format: ExportFormat = args.format.parse()?;
        let store = CacheStore::from_config(&config);
        let cached = if args.refresh {
            None
        } else {
            store.load(&args.process, &config.target_assembly)
        };

        let db = match cached {
            Some(db) => {
                println!("{} Loaded {} types from cache", "[+]".green(), db.len());
                db
            }
            None => {
                let db = self.fresh_dump(&config, &args)?;
                let path = store.save(&args.process, &config.target_assembly, &db)?;
                println!("{} Cache saved to {}", "[+]".green(), path.display());
                db
            }
        };

        match &args.output {
            Some(output) => {
                write_export(output, &db, format, !args.compact)?;
                println!("{} Exported {} to {}", "[+]".green(), format, output.display());
            }
            None => println!(
                "{} {} types cached for future queries",
                "[*]".blue(),
                db.len()
            ),
        }
        Ok(())
    }

    fn fresh_dump(&self, config: &Config, args: &DumpArgs) -> anyhow::Result<TypeDatabase> {
        let registry = BackendRegistry::with_defaults();
        let backend = registry.create(&config.backend, config).with_context(|| {
            format!("available backends: {}", registry.names().join(", "))
        })?;
        println!(
            "{} Dumping {} from {} via '{}'",
            "[*]".blue(),
            config.target_assembly,
            args.process,
            backend.name()
        );

        let inspector = Inspector::from_config(config.clone())?;
        let show_bar = config.enable_progress_bars;
        let bar = DumpProgress::attach(&inspector.progress(), show_bar, "Dumping types");

        let (result, elapsed) = measure_time(|| inspector.dump(&args.process, backend, &config.module_name));
        match result {
            Ok(db) => {
                bar.finish("Done");
                println!(
                    "{} Dumped {} types ({} raw classes) in {}",
                    "[+]".green(),
                    db.len(),
                    db.raw_class_count,
                    format_duration(elapsed)
                );
                Ok(db)
            }
            Err(e) => {
                bar.abandon("Failed");
                warn!("Dump of {} failed after {}", args.process, format_duration(elapsed));
                Err(e).with_context(|| format!("dumping {}", args.process))
            }
        }
    }

    fn handle_compare(&self, args: CompareArgs) -> anyhow::Result<()> {
        let first = self.load_database(&args.first)?;
        let second = self.load_database(&args.second)?;
        let result = diff(&first, &second);

        let renderer = DisplayRenderer::new().with_max_items(args.limit);
        println!("{}", renderer.diff(&result, &args.first, &args.second));

        if let Some(output) = &args.output {
            result
                .write_json(output, &args.first, &args.second)
                .with_context(|| format!("writing {}", output.display()))?;
            println!("{} Diff written to {}", "[+]".green(), output.display());
        }
        Ok(())
    }

    fn handle_search(&self, args: SearchArgs) -> anyhow::Result<()> {
        let db = self.load_database(&args.process)?;
        let query = TypeQuery::new(&db);
        let renderer = DisplayRenderer::new().with_max_items(args.limit);
        println!(
            "{}",
            renderer.header(&format!("Searching '{}' in {} types", args.pattern, db.len()))
        );

        if !args.fields {
            let filter = TypeFilter::default()
                .with_exclude_system(args.exclude_system)
                .with_field_range(args.min_fields, args.max_fields);
            let types = query.search_types_filtered(Some(&args.pattern), args.regex, &filter)?;
            println!("{} {} types", "[+]".green(), types.len());
            if !types.is_empty() {
                println!("{}", renderer.type_list(types));
            }
        }

        if !args.types_only {
            let mut fields = query.search_fields(&args.pattern, args.regex)?;
            if args.exclude_system {
                fields.retain(|m| !crate::query::is_system_type(&m.declaring.full_name));
            }
            println!("{} {} fields", "[+]".green(), fields.len());
            if !fields.is_empty() {
                println!("{}", renderer.field_list(&fields));
            }
        }
        Ok(())
    }

    fn handle_query(&self, args: QueryArgs) -> anyhow::Result<()> {
        let db = self.load_database(&args.process)?;
        let query = TypeQuery::new(&db);

        match args.query {
            QueryCommand::Type { name } => {
                let ty = query.find_type(&name).ok_or_else(|| anyhow!("Type not found: {}", name))?;
                println!("{}", DisplayRenderer::new().type_layout(ty));
            }
            QueryCommand::Field { type_name, field } => {
                let hit = query
                    .find_field(&type_name, &field)
                    .ok_or_else(|| anyhow!("Field not found: {}.{}", type_name, field))?;
                println!("{}", DisplayRenderer::new().field_match(&hit));
            }
            QueryCommand::Kind { kind, limit } => {
                let types = query.by_kind_name(&kind)?;
                println!("{} {} types of kind {}", "[+]".green(), types.len(), kind);
                println!("{}", DisplayRenderer::new().with_max_items(limit).type_list(types));
            }
            QueryCommand::Offsets { range, limit } => {
                let (min, max) = parse_offset_range(&range)?;
                let hits = query.fields_in_range(min, max);
                println!("{} {} fields in 0x{:X}-0x{:X}", "[+]".green(), hits.len(), min, max);
                println!("{}", DisplayRenderer::new().with_max_items(limit).field_list(&hits));
            }
        }
        Ok(())
    }

    fn handle_stats(&self, args: StatsArgs) -> anyhow::Result<()> {
        let db = self.load_database(&args.process)?;
        let stats = TypeStatistics::collect(&db);
        let renderer = DisplayRenderer::new();

        println!("{}", renderer.header(&format!("Statistics for '{}'", args.process)));
        println!("{}", renderer.stats(&stats, args.detailed));

        if let Some(output) = &args.output {
            if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)?;
            }
            fs::write(output, serde_json::to_string_pretty(&stats)?)
                .with_context(|| format!("writing {}", output.display()))?;
            println!("{} Statistics written to {}", "[+]".green(), output.display());
        }
        Ok(())
    }

    fn handle_cache(&self, command: CacheCommand) -> anyhow::Result<()> {
        let store = self.store();
        let renderer = DisplayRenderer::new();
        let assembly = &self.config.target_assembly;

        match command {
            CacheCommand::List => {
                let infos = store.list()?;
                println!("{}", renderer.header(&format!("Cache: {}", store.dir().display())));
                println!("{}", renderer.cache_list(&infos, format_bytes(store.total_size()?)));
            }
            CacheCommand::Info { process } => {
                let path = store.path_for(&process, assembly);
                let info = store
                    .list()?
                    .into_iter()
                    .find(|i| i.path == path)
                    .ok_or_else(|| anyhow!("No cached dump for '{}'", process))?;
                println!("{}", renderer.cache_info(&info));
                if let Some(db) = store.load(&process, assembly) {
                    println!("  {:<28} {}", "Types:", db.len());
                    println!("  {:<28} {}", "Raw class count:", db.raw_class_count);
                }
            }
            CacheCommand::Delete { process } => {
                if store.delete(&process, assembly)? {
                    println!("{} Deleted cache for '{}'", "[+]".green(), process);
                } else {
                    println!("{} No cache for '{}'", "[*]".blue(), process);
                }
            }
            CacheCommand::Clear => {
                let count = store.delete_all()?;
                println!("{} Deleted {} cache files", "[+]".green(), count);
            }
            CacheCommand::Validate { process } => {
                let result = store.validate(&process, assembly);
                println!("{}", renderer.validation(&result));
                if !result.is_valid() {
                    bail!("Cache for '{}' is not usable", process);
                }
            }
        }
        Ok(())
    }

    fn handle_backends(&self) -> anyhow::Result<()> {
        let registry = BackendRegistry::with_defaults();
        for name in registry.names() {
            let marker = if name == self.config.backend { "*" } else { " " };
            println!("{} {}", marker.green(), name);
        }
        Ok(())
    }
}
