// Tue Jan 13 2026 - Alex

use colored::*;
use env_logger::{Builder, Target};
use log::{Level, LevelFilter};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

use super::format_duration;

pub struct LoggingUtils;

impl LoggingUtils {
    /// Colored stderr logger. `RUST_LOG` overrides `level` when set.
    pub fn init_logger(level: LevelFilter) {
        let mut builder = Self::builder(level, true);
        builder.target(Target::Stderr);
        builder.try_init().ok();
    }

    pub fn init_logger_with_file(level: LevelFilter, file_path: &Path) -> std::io::Result<()> {
        let file = OpenOptions::new().create(true).append(true).open(file_path)?;
        let mut builder = Self::builder(level, false);
        builder.target(Target::Pipe(Box::new(file)));
        builder.try_init().ok();
        Ok(())
    }

    fn builder(level: LevelFilter, use_color: bool) -> Builder {
        let mut builder = Builder::new();
        builder.filter_level(level);
        builder.parse_default_env();
        builder.format(move |buf, record| {
            let level = if use_color {
                Self::format_level(record.level()).to_string()
            } else {
                format!("{:5}", record.level())
            };
            let target = format!("[{}]", record.target());
            if use_color {
                writeln!(buf, "{} {} {}", level, target.dimmed(), record.args())
            } else {
                writeln!(buf, "{} {} {}", level, target, record.args())
            }
        });
        builder
    }

    fn format_level(level: Level) -> ColoredString {
        match level {
            Level::Error => "ERROR".red().bold(),
            Level::Warn => "WARN ".yellow().bold(),
            Level::Info => "INFO ".green().bold(),
            Level::Debug => "DEBUG".blue().bold(),
            Level::Trace => "TRACE".magenta().bold(),
        }
    }

    pub fn level_from_str(s: &str) -> LevelFilter {
        match s.to_lowercase().as_str() {
            "error" => LevelFilter::Error,
            "warn" | "warning" => LevelFilter::Warn,
            "info" => LevelFilter::Info,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            "off" => LevelFilter::Off,
            _ => LevelFilter::Info,
        }
    }

    pub fn level_from_verbosity(verbosity: u8) -> LevelFilter {
        match verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Logs how long one stage of a dump took when it goes out of scope.
pub struct StageTimer {
    stage: &'static str,
    start: Instant,
}

impl StageTimer {
    pub fn start(stage: &'static str) -> Self {
        log::debug!("{} started", stage);
        Self { stage, start: Instant::now() }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for StageTimer {
    fn drop(&mut self) {
        log::debug!("{} finished in {}", self.stage, format_duration(self.elapsed()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        assert_eq!(LoggingUtils::level_from_verbosity(0), LevelFilter::Warn);
        assert_eq!(LoggingUtils::level_from_verbosity(2), LevelFilter::Debug);
        assert_eq!(LoggingUtils::level_from_verbosity(9), LevelFilter::Trace);
        assert_eq!(LoggingUtils::level_from_str("WARNING"), LevelFilter::Warn);
        assert_eq!(LoggingUtils::level_from_str("bogus"), LevelFilter::Info);
    }

    #[test]
    fn test_stage_timer_counts_up() {
        let timer = StageTimer::start("walk");
        let first = timer.elapsed();
        std::thread::sleep(Duration::from_millis(2));
        assert!(timer.elapsed() > first);
    }
}
