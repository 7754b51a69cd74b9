// Tue Jan 13 2026 - Alex

use colored::*;

pub struct Banner;

impl Banner {
    pub fn print() {
        let title = format!("mono-type-dumper v{}", env!("CARGO_PKG_VERSION"));
        let width = title.len() + 4;
        eprintln!("{}", "=".repeat(width).cyan());
        eprintln!("  {}", title.cyan().bold());
        eprintln!("{}", "=".repeat(width).cyan());
        eprintln!();
    }
}
