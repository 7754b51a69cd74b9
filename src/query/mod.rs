// Sun Feb 01 2026 - Alex

pub mod pattern;

pub use pattern::{parse_offset, parse_offset_range, NamePattern};

use crate::model::{ClassKind, FieldDefinition, TypeDatabase, TypeDefinition};
use log::debug;
use thiserror::Error;

const SYSTEM_PREFIXES: [&str; 4] = ["System.", "UnityEngine.", "Microsoft.", "Mono."];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("Invalid offset '{0}', expected hex such as 0x10 or 0x10-0x50")]
    InvalidOffset(String),
    #[error("Unknown type kind '{0}'")]
    UnknownKind(String),
}

/// A field together with the type it was found in.
#[derive(Debug, Clone, Copy)]
pub struct FieldMatch<'a> {
    pub declaring: &'a TypeDefinition,
    pub field: &'a FieldDefinition,
}

/// Post-search filters for type results.
#[derive(Debug, Clone, Default)]
pub struct TypeFilter {
    pub exclude_system: bool,
    pub min_fields: Option<usize>,
    pub max_fields: Option<usize>,
}

impl TypeFilter {
    pub fn with_exclude_system(mut self, exclude: bool) -> Self {
        self.exclude_system = exclude;
        self
    }

    pub fn with_field_range(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_fields = min;
        self.max_fields = max;
        self
    }

    pub fn accepts(&self, ty: &TypeDefinition) -> bool {
        if self.exclude_system && is_system_type(&ty.full_name) {
            return false;
        }
        let count = ty.fields.len();
        self.min_fields.map_or(true, |min| count >= min) && self.max_fields.map_or(true, |max| count <= max)
    }
}

pub fn is_system_type(full_name: &str) -> bool {
    SYSTEM_PREFIXES.iter().any(|p| full_name.starts_with(p))
}

/// Read-only lookups over a loaded database.
pub struct TypeQuery<'a> {
    db: &'a TypeDatabase,
}

impl<'a> TypeQuery<'a> {
    pub fn new(db: &'a TypeDatabase) -> Self {
        Self { db }
    }

    pub fn search_types(&self, pattern: &str, use_regex: bool) -> Result<Vec<&'a TypeDefinition>, QueryError> {
        let matcher = NamePattern::new(pattern, use_regex)?;
        let found: Vec<_> = self.db.iter().filter(|t| matcher.is_match(&t.full_name)).collect();
        debug!("{} types match '{}'", found.len(), pattern);
        Ok(found)
    }

    pub fn search_types_filtered(
        &self,
        pattern: Option<&str>,
        use_regex: bool,
        filter: &TypeFilter,
    ) -> Result<Vec<&'a TypeDefinition>, QueryError> {
        let candidates = match pattern.filter(|p| !p.is_empty()) {
            Some(p) => self.search_types(p, use_regex)?,
            None => self.db.iter().collect(),
        };
        Ok(candidates.into_iter().filter(|t| filter.accepts(t)).collect())
    }

    pub fn search_fields(&self, pattern: &str, use_regex: bool) -> Result<Vec<FieldMatch<'a>>, QueryError> {
        let matcher = NamePattern::new(pattern, use_regex)?;
        let found: Vec<_> = self
            .all_fields()
            .filter(|m| matcher.is_match(&m.field.name))
            .collect();
        debug!("{} fields match '{}'", found.len(), pattern);
        Ok(found)
    }

    /// Fields with `min <= offset <= max`, ordered by offset.
    pub fn fields_in_range(&self, min: u32, max: u32) -> Vec<FieldMatch<'a>> {
        let mut found: Vec<_> = self
            .all_fields()
            .filter(|m| m.field.offset >= 0 && (min..=max).contains(&(m.field.offset as u32)))
            .collect();
        found.sort_by_key(|m| m.field.offset);
        found
    }

    /// Exact, case-insensitive; the first match wins.
    pub fn find_type(&self, full_name: &str) -> Option<&'a TypeDefinition> {
        self.db.iter().find(|t| t.full_name.eq_ignore_ascii_case(full_name))
    }

    pub fn find_field(&self, type_name: &str, field_name: &str) -> Option<FieldMatch<'a>> {
        let declaring = self.find_type(type_name)?;
        let field = declaring.fields.iter().find(|f| f.name.eq_ignore_ascii_case(field_name))?;
        Some(FieldMatch { declaring, field })
    }

    pub fn by_kind(&self, kind: ClassKind) -> Vec<&'a TypeDefinition> {
        self.db.iter().filter(|t| t.class_kind == kind).collect()
    }

    pub fn by_kind_name(&self, kind: &str) -> Result<Vec<&'a TypeDefinition>, QueryError> {
        let kind: ClassKind = kind.parse().map_err(|_| QueryError::UnknownKind(kind.to_string()))?;
        Ok(self.by_kind(kind))
    }

    fn all_fields(&self) -> impl Iterator<Item = FieldMatch<'a>> + 'a {
        self.db
            .iter()
            .flat_map(|declaring| declaring.fields.iter().map(move |field| FieldMatch { declaring, field }))
    }
}
