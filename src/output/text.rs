// Mon Feb 02 2026 - Alex

use super::GENERATOR;
use crate::model::{TypeDatabase, TypeDefinition};
use std::fmt::Write;

/// Fields past this offset are runtime noise in full dumps.
pub const MAX_DUMP_OFFSET: i32 = 0x2000;

/// Indented `[offset] name : type` tree of every type.
#[derive(Debug, Clone)]
pub struct TreeWriter {
    verbose: bool,
    max_offset: Option<i32>,
}

impl TreeWriter {
    pub fn new() -> Self {
        Self {
            verbose: true,
            max_offset: Some(MAX_DUMP_OFFSET),
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_max_offset(mut self, max: Option<i32>) -> Self {
        self.max_offset = max;
        self
    }

    pub fn render(&self, db: &TypeDatabase) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Generated by {}", GENERATOR);
        out.push('\n');
        out.push_str("    [<offset>] <name> : <type>\n");
        out.push_str("S = Static\nC = Constant\n\n");

        for ty in db.iter() {
            self.write_type(&mut out, ty);
            out.push('\n');
        }
        out
    }

    /// One type: header line then its fields.
    pub fn type_string(&self, ty: &TypeDefinition) -> String {
        let mut out = String::new();
        self.write_type(&mut out, ty);
        out
    }

    fn write_type(&self, out: &mut String, ty: &TypeDefinition) {
        if self.verbose {
            let _ = write!(out, "[{}] ", ty.class_kind);
        }
        out.push_str(&ty.full_name);

        if self.verbose {
            if let Some(parent) = &ty.parent {
                let _ = write!(out, " : {}", parent.name);
                for iface in &ty.interfaces {
                    let _ = write!(out, ", {}", iface.name);
                }
            }
        }
        out.push('\n');

        for field in &ty.fields {
            if self.max_offset.is_some_and(|max| field.offset > max) {
                continue;
            }
            if !self.verbose && field.has_value {
                continue;
            }
            let _ = writeln!(out, "    {}", field);
        }
    }
}

impl Default for TreeWriter {
    fn default() -> Self {
        Self::new()
    }
}
