// Wed Jan 15 2026 - Alex

pub mod args;
pub mod handler;

pub use args::{Args, CacheCommand, Command, QueryCommand};
pub use handler::CommandHandler;

use clap::Parser;

pub fn parse_args() -> Args {
    Args::parse()
}

pub fn run() -> anyhow::Result<()> {
    CommandHandler::run(parse_args())
}
