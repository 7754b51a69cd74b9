// Wed Jan 15 2026 - Alex

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mono-type-dumper")]
#[command(author = "Alex")]
#[command(version)]
#[command(about = "Dumps Mono type layouts from a running Unity process", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// -v info, -vv debug, -vvv trace. RUST_LOG wins when set.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[arg(long, global = true)]
    pub no_color: bool,

    /// JSON configuration file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Assembly whose classes are dumped and cached.
    #[arg(long, global = true)]
    pub assembly: Option<String>,

    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Dump type definitions from a process (cached unless --refresh)
    Dump(DumpArgs),
    /// Compare two cached dumps
    Compare(CompareArgs),
    /// Search cached type and field names
    Search(SearchArgs),
    /// Look up a type, field, kind or offset range
    Query(QueryArgs),
    /// Statistics about a cached dump
    Stats(StatsArgs),
    /// Manage cached dumps
    #[command(subcommand)]
    Cache(CacheCommand),
    /// List memory backends
    Backends,
}

#[derive(ClapArgs, Debug)]
pub struct DumpArgs {
    pub process: String,

    #[arg(short, long)]
    pub backend: Option<String>,

    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// text, json, utd, csharp-intptr or csharp-ulong
    #[arg(short, long, default_value = "text")]
    pub format: String,

    #[arg(long)]
    pub refresh: bool,

    /// Leave constants and class headers out of the export.
    #[arg(long)]
    pub compact: bool,

    #[arg(long)]
    pub module: Option<String>,

    #[arg(long)]
    pub profile: Option<PathBuf>,

    #[arg(long)]
    pub threads: Option<usize>,

    #[arg(long)]
    pub memmap: Option<PathBuf>,

    #[arg(long)]
    pub no_progress: bool,
}

#[derive(ClapArgs, Debug)]
pub struct CompareArgs {
    /// Process name or path to a .utd file
    pub first: String,

    /// Process name or path to a .utd file
    pub second: String,

    /// Write the diff as JSON
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(long, default_value = "50")]
    pub limit: usize,
}

#[derive(ClapArgs, Debug)]
pub struct SearchArgs {
    pub process: String,

    pub pattern: String,

    #[arg(long)]
    pub regex: bool,

    /// Search field names instead of type names
    #[arg(long, conflicts_with = "types_only")]
    pub fields: bool,

    #[arg(long)]
    pub types_only: bool,

    #[arg(long)]
    pub exclude_system: bool,

    #[arg(long)]
    pub min_fields: Option<usize>,

    #[arg(long)]
    pub max_fields: Option<usize>,

    #[arg(long, default_value = "50")]
    pub limit: usize,
}

#[derive(ClapArgs, Debug)]
pub struct QueryArgs {
    pub process: String,

    #[command(subcommand)]
    pub query: QueryCommand,
}

#[derive(Subcommand, Debug)]
pub enum QueryCommand {
    /// Full layout of one type
    Type { name: String },
    /// One field of a type
    Field { type_name: String, field: String },
    /// Every type of a kind (class, struct, interface, enum)
    Kind {
        kind: String,
        #[arg(long, default_value = "50")]
        limit: usize,
    },
    /// Fields whose offset lies in an inclusive hex range such as 0x10-0x50
    Offsets {
        range: String,
        #[arg(long, default_value = "50")]
        limit: usize,
    },
}

#[derive(ClapArgs, Debug)]
pub struct StatsArgs {
    pub process: String,

    #[arg(long)]
    pub detailed: bool,

    /// Write the statistics as JSON
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    List,
    Info { process: String },
    Delete { process: String },
    /// Delete every cached dump
    Clear,
    Validate { process: String },
}
