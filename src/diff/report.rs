// Sat Jan 31 2026 - Alex

use super::compare::{DiffResult, FieldChange, TypeDifference};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DiffSummary {
    pub added_types: usize,
    pub removed_types: usize,
    pub modified_types: usize,
    pub unchanged_types: usize,
    pub changed_fields: usize,
}

impl fmt::Display for DiffSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "+{} types, -{} types, ~{} modified ({} field changes), {} unchanged",
            self.added_types, self.removed_types, self.modified_types, self.changed_fields, self.unchanged_types
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct DiffDocument<'a> {
    first: &'a str,
    second: &'a str,
    summary: DiffSummary,
    #[serde(flatten)]
    result: &'a DiffResult,
}

impl DiffResult {
    pub fn summary(&self) -> DiffSummary {
        DiffSummary {
            added_types: self.only_in_second.len(),
            removed_types: self.only_in_first.len(),
            modified_types: self.modified.len(),
            unchanged_types: self.unchanged,
            changed_fields: self.modified.iter().map(|t| t.fields.len()).sum(),
        }
    }

    /// Pretty JSON with both sides labelled.
    pub fn to_json(&self, first: &str, second: &str) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&DiffDocument {
            first,
            second,
            summary: self.summary(),
            result: self,
        })
    }

    pub fn write_json(&self, path: &Path, first: &str, second: &str) -> std::io::Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let json = self.to_json(first, second).map_err(std::io::Error::other)?;
        fs::write(path, json)
    }
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldChange::OnlyInFirst { offset, field_type } => write!(f, "removed [{:02X}] {}", offset, field_type),
            FieldChange::OnlyInSecond { offset, field_type } => write!(f, "added [{:02X}] {}", offset, field_type),
            FieldChange::Changed { old_offset, new_offset, old_type, new_type } => {
                if old_offset != new_offset {
                    write!(f, "offset {:#X} -> {:#X}", old_offset, new_offset)?;
                }
                if old_type != new_type {
                    if old_offset != new_offset {
                        write!(f, ", ")?;
                    }
                    write!(f, "type {} -> {}", old_type, new_type)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for TypeDifference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "~ {}", self.full_name)?;
        if self.field_count_changed() {
            write!(f, " (fields {} -> {})", self.first_field_count, self.second_field_count)?;
        }
        for field in &self.fields {
            write!(f, "\n    {}: {}", field.name, field.change)?;
        }
        Ok(())
    }
}

impl fmt::Display for DiffResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary())?;
        for name in &self.only_in_first {
            writeln!(f, "- {}", name)?;
        }
        for name in &self.only_in_second {
            writeln!(f, "+ {}", name)?;
        }
        for ty in &self.modified {
            writeln!(f, "{}", ty)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::type_def;
    use crate::diff::diff;
    use crate::model::TypeDatabase;

    fn sample() -> DiffResult {
        let a = TypeDatabase::new(vec![type_def("Foo", &[("a", 0), ("b", 4)]), type_def("Old", &[])], 2);
        let b = TypeDatabase::new(vec![type_def("Foo", &[("a", 0), ("b", 8), ("c", 12)])], 1);
        diff(&a, &b)
    }

    #[test]
    fn test_summary() {
        let summary = sample().summary();
        assert_eq!(summary.removed_types, 1);
        assert_eq!(summary.modified_types, 1);
        assert_eq!(summary.changed_fields, 2);
    }

    #[test]
    fn test_text_report() {
        let text = sample().to_string();
        assert!(text.contains("- Old"));
        assert!(text.contains("~ Foo (fields 2 -> 3)"));
        assert!(text.contains("b: offset 0x4 -> 0x8"));
        assert!(text.contains("c: added [0C] Int32"));
    }

    #[test]
    fn test_json_report() {
        let json = sample().to_json("game_a", "game_b").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["First"], "game_a");
        assert_eq!(value["Summary"]["ModifiedTypes"], 1);
        assert_eq!(value["OnlyInFirst"][0], "Old");
        assert_eq!(value["Modified"][0]["Fields"][0]["Change"]["Kind"], "Changed");
    }
}
