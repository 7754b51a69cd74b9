// Tue Feb 03 2026 - Alex

use crate::inspector::Progress;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const SCALE: u64 = 1000;
const TEMPLATE: &str = "{spinner:.cyan} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent}% {msg}";

/// Terminal bar that mirrors an inspector's progress until dropped.
pub struct DumpProgress {
    bar: ProgressBar,
    source: Progress,
}

impl DumpProgress {
    pub fn attach(source: &Progress, enabled: bool, message: &str) -> Self {
        let bar = if enabled {
            ProgressBar::new(SCALE)
        } else {
            ProgressBar::hidden()
        };
        let style = ProgressStyle::with_template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░ ");
        bar.set_style(style);
        bar.set_message(message.to_string());
        if enabled {
            bar.enable_steady_tick(Duration::from_millis(100));
        }

        let sink = bar.clone();
        source.set_observer(move |value| sink.set_position((value * SCALE as f32).round() as u64));

        Self {
            bar,
            source: source.clone(),
        }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self, message: &str) {
        self.bar.set_position(SCALE);
        self.bar.finish_with_message(message.to_string());
    }

    pub fn abandon(&self, message: &str) {
        self.bar.abandon_with_message(message.to_string());
    }
}

impl Drop for DumpProgress {
    fn drop(&mut self) {
        self.source.clear_observer();
        if !self.bar.is_finished() {
            self.bar.abandon();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_follows_progress() {
        let progress = Progress::new();
        let bar = DumpProgress::attach(&progress, false, "Dumping");

        progress.advance_to(0.25);
        assert_eq!(bar.position(), 250);
        progress.advance(0.5);
        assert_eq!(bar.position(), 750);
    }

    #[test]
    fn test_drop_detaches() {
        let progress = Progress::new();
        {
            let _bar = DumpProgress::attach(&progress, false, "Dumping");
        }
        progress.advance_to(0.5);
        assert_eq!(progress.get(), 0.5);
    }
}
