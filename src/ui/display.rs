// Tue Jan 13 2026 - Alex

use crate::cache::{CacheInfo, CacheValidation};
use crate::diff::{DiffResult, FieldChange};
use crate::model::{ClassKind, TypeDefinition};
use crate::output::TypeStatistics;
use crate::query::FieldMatch;
use crate::utils::truncate_string;
use colored::*;
use std::fmt::Write;

pub struct DisplayRenderer {
    max_items: usize,
}

impl DisplayRenderer {
    pub fn new() -> Self {
        Self { max_items: 50 }
    }

    pub fn with_max_items(mut self, max: usize) -> Self {
        self.max_items = max;
        self
    }

    pub fn header(&self, title: &str) -> String {
        format!("{}\n{}", title.cyan().bold(), "=".repeat(title.chars().count()).cyan())
    }

    fn sub_header(&self, title: &str) -> String {
        format!("\n{}", title.yellow().bold())
    }

    fn property(&self, name: &str, value: impl std::fmt::Display) -> String {
        format!("  {:<28} {}", format!("{}:", name), value.to_string().white().bold())
    }

    fn kind(&self, kind: ClassKind) -> ColoredString {
        let text = format!("[{}]", kind);
        match kind {
            ClassKind::Class => text.blue(),
            ClassKind::Struct => text.green(),
            ClassKind::Interface => text.magenta(),
            ClassKind::Enum => text.yellow(),
            ClassKind::Unknown => text.dimmed(),
        }
    }

    pub fn type_summary(&self, ty: &TypeDefinition) -> String {
        let mut line = format!("{} {}", self.kind(ty.class_kind), ty.full_name.bold());
        if let Some(parent) = ty.parent_name() {
            let _ = write!(line, " : {}", parent.dimmed());
        }
        let _ = write!(line, " {}", format!("({} fields)", ty.fields.len()).dimmed());
        line
    }

    pub fn type_layout(&self, ty: &TypeDefinition) -> String {
        let mut out = self.type_summary(ty);
        for iface in &ty.interfaces {
            let _ = write!(out, "\n    {} {}", "implements".dimmed(), iface.full_name);
        }
        for field in &ty.fields {
            let _ = write!(
                out,
                "\n    {} {} : {}",
                format!("[{:02X}]", field.offset).red(),
                field.name.cyan(),
                field.field_type
            );
            if let Some(kind) = &field.constant_value_type {
                let _ = write!(out, " {}", format!("({})", kind).dimmed());
            }
        }
        out
    }

    pub fn field_match(&self, hit: &FieldMatch<'_>) -> String {
        format!(
            "{} {}.{} : {}",
            format!("[{:04X}]", hit.field.offset).red(),
            truncate_string(&hit.declaring.full_name, 60),
            hit.field.name.cyan(),
            hit.field.field_type
        )
    }

    pub fn type_list<'a>(&self, types: impl IntoIterator<Item = &'a TypeDefinition>) -> String {
        let mut lines = Vec::new();
        let mut total = 0;
        for ty in types {
            if total < self.max_items {
                lines.push(self.type_summary(ty));
            }
            total += 1;
        }
        self.with_overflow(lines, total)
    }

    pub fn field_list(&self, hits: &[FieldMatch<'_>]) -> String {
        let lines = hits.iter().take(self.max_items).map(|h| self.field_match(h)).collect();
        self.with_overflow(lines, hits.len())
    }

    fn with_overflow(&self, mut lines: Vec<String>, total: usize) -> String {
        if total > lines.len() {
            lines.push(format!("  ... and {} more", total - lines.len()).dimmed().to_string());
        }
        lines.join("\n")
    }

    pub fn diff(&self, result: &DiffResult, first: &str, second: &str) -> String {
        let summary = result.summary();
        let mut out = vec![
            self.header(&format!("{} -> {}", first, second)),
            self.property("Types only in first", summary.removed_types),
            self.property("Types only in second", summary.added_types),
            self.property("Modified types", summary.modified_types),
            self.property("Unchanged types", summary.unchanged_types),
            self.property("Changed fields", summary.changed_fields),
        ];

        if !result.only_in_first.is_empty() {
            out.push(self.sub_header("Removed"));
            for name in result.only_in_first.iter().take(self.max_items) {
                out.push(format!("  {} {}", "-".red(), name));
            }
        }
        if !result.only_in_second.is_empty() {
            out.push(self.sub_header("Added"));
            for name in result.only_in_second.iter().take(self.max_items) {
                out.push(format!("  {} {}", "+".green(), name));
            }
        }
        if !result.modified.is_empty() {
            out.push(self.sub_header("Modified"));
            for ty in result.modified.iter().take(self.max_items) {
                let mut line = format!("  {} {}", "~".yellow(), ty.full_name.bold());
                if ty.field_count_changed() {
                    let _ = write!(line, " (fields {} -> {})", ty.first_field_count, ty.second_field_count);
                }
                out.push(line);
                for field in &ty.fields {
                    let marker = match field.change {
                        FieldChange::OnlyInFirst { .. } => "-".red(),
                        FieldChange::OnlyInSecond { .. } => "+".green(),
                        FieldChange::Changed { .. } => "~".yellow(),
                    };
                    out.push(format!("      {} {}: {}", marker, field.name, field.change));
                }
            }
        }
        out.join("\n")
    }

    pub fn stats(&self, stats: &TypeStatistics, detailed: bool) -> String {
        let mut out = vec![
            self.sub_header("Overview"),
            self.property("Total types", stats.total_types),
            self.property("Raw class count", stats.raw_class_count),
            self.property("Total fields", stats.total_fields),
            self.sub_header("Type breakdown"),
        ];
        for (kind, count) in &stats.kinds {
            out.push(self.property(kind.as_str(), count));
        }

        out.push(self.sub_header("Fields"));
        out.push(self.property("Static fields", stats.static_fields));
        out.push(self.property("Constant fields", stats.constant_fields));
        out.push(self.property("Average fields/type", format!("{:.1}", stats.average_fields)));
        if let Some((name, count)) = &stats.largest_type {
            out.push(self.property("Largest type", format!("{} ({} fields)", name, count)));
        }

        if detailed {
            out.push(self.sub_header("System vs user types"));
            out.push(self.property("System types", stats.system_types));
            out.push(self.property("User types", stats.user_types));
            out.push(self.property("System %", format!("{:.1}%", stats.system_percentage())));

            let sections = [
                ("Top namespaces", &stats.top_namespaces),
                ("Common field types", &stats.top_field_types),
                ("Complex types (>50 fields)", &stats.complex_types),
            ];
            for (title, entries) in sections {
                if entries.is_empty() {
                    continue;
                }
                out.push(self.sub_header(title));
                for (name, count) in entries.iter().take(10) {
                    out.push(self.property(&truncate_string(name, 40), count));
                }
            }
            if !stats.empty_types.is_empty() {
                out.push(self.sub_header(&format!("Empty types ({} total)", stats.empty_types.len())));
                for name in stats.empty_types.iter().take(10) {
                    out.push(format!("  {}", name));
                }
            }
        }
        out.join("\n")
    }

    pub fn cache_list(&self, infos: &[CacheInfo], total_size: String) -> String {
        if infos.is_empty() {
            return "No cached dumps".dimmed().to_string();
        }
        let mut out = vec![format!(
            "  {:<24} {:<24} {:>10}  {}",
            "PROCESS".bold(),
            "MODULE".bold(),
            "SIZE".bold(),
            "AGE".bold()
        )];
        for info in infos {
            out.push(format!(
                "  {:<24} {:<24} {:>10}  {}",
                info.process.cyan(),
                info.module,
                info.formatted_size(),
                info.formatted_age().dimmed()
            ));
        }
        out.push(format!("\n  {} files, {} total", infos.len(), total_size));
        out.join("\n")
    }

    pub fn cache_info(&self, info: &CacheInfo) -> String {
        [
            self.property("Process", &info.process),
            self.property("Module", &info.module),
            self.property("Path", info.path.display()),
            self.property("Size", info.formatted_size()),
            self.property("Age", info.formatted_age()),
        ]
        .join("\n")
    }

    pub fn validation(&self, result: &CacheValidation) -> String {
        let check = |ok: bool| if ok { "yes".green() } else { "no".red() };
        let mut out = vec![
            self.property("Path", result.path.display()),
            self.property("Exists", check(result.exists)),
            self.property("Non-empty", check(result.non_empty)),
            self.property("Parses", check(result.parses)),
            self.property("Types", result.type_count),
            self.property("Fields", result.field_count),
        ];
        match &result.error {
            Some(error) => out.push(format!("  {} {}", "Invalid:".red().bold(), error)),
            None => out.push(format!("  {}", "Cache is valid".green().bold())),
        }
        out.join("\n")
    }
}

impl Default for DisplayRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::type_def;
    use crate::diff::diff;
    use crate::model::TypeDatabase;

    #[test]
    fn test_type_list_overflow() {
        let types: Vec<_> = (0..5).map(|i| type_def(&format!("T{}", i), &[])).collect();
        let text = DisplayRenderer::new().with_max_items(2).type_list(&types);
        assert!(text.contains("T1"));
        assert!(!text.contains("T2"));
        assert!(text.contains("and 3 more"));
    }

    #[test]
    fn test_layout_lists_fields() {
        let text = DisplayRenderer::new().type_layout(&type_def("Game.Player", &[("health", 0x10)]));
        assert!(text.contains("Game.Player"));
        assert!(text.contains("[10]"));
        assert!(text.contains("health"));
    }

    #[test]
    fn test_diff_view() {
        let a = TypeDatabase::new(vec![type_def("Foo", &[("a", 0), ("b", 4)])], 1);
        let b = TypeDatabase::new(vec![type_def("Foo", &[("a", 0), ("b", 8)])], 1);
        let text = DisplayRenderer::new().diff(&diff(&a, &b), "old", "new");
        assert!(text.contains("Foo"));
        assert!(text.contains("offset 0x4 -> 0x8"));
    }
}
