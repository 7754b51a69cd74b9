// Mon Feb 02 2026 - Alex

use super::GENERATOR;
use crate::model::{TypeDatabase, TypeDefinition};
use std::borrow::Cow;
use std::fmt::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerType {
    IntPtr,
    ULong,
}

impl PointerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IntPtr => "IntPtr",
            Self::ULong => "ulong",
        }
    }
}

impl fmt::Display for PointerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// C# keyword for a runtime type name, `System.` prefix ignored.
pub fn simple_keyword(type_name: &str) -> Cow<'_, str> {
    let bare = type_name.strip_prefix("System.").unwrap_or(type_name);
    let keyword = match bare {
        "Void" => "void",
        "Object" => "object",
        "String" => "string",
        "Boolean" => "bool",
        "Single" => "float",
        "Double" => "double",
        "Byte" => "byte",
        "SByte" => "sbyte",
        "Int16" => "short",
        "Int32" => "int",
        "Int64" => "long",
        "UInt16" => "ushort",
        "UInt32" => "uint",
        "UInt64" => "ulong",
        "Char" => "char",
        _ => return Cow::Borrowed(bare),
    };
    Cow::Borrowed(keyword)
}

/// Explicit-layout structs, pointers rendered as one chosen integer type.
#[derive(Debug, Clone)]
pub struct StructWriter {
    pointer: PointerType,
    include_constants: bool,
}

impl StructWriter {
    pub fn new(pointer: PointerType) -> Self {
        Self {
            pointer,
            include_constants: false,
        }
    }

    pub fn with_constants(mut self, include: bool) -> Self {
        self.include_constants = include;
        self
    }

    pub fn render(&self, db: &TypeDatabase) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "// Generated by {}", GENERATOR);
        let _ = writeln!(out, "// Pointer type: {}", self.pointer);
        out.push('\n');
        out.push_str("using System;\nusing System.Runtime.InteropServices;\n\n");

        for ty in db.iter() {
            out.push_str(&self.struct_string(ty));
            out.push('\n');
        }
        out
    }

    pub fn struct_string(&self, ty: &TypeDefinition) -> String {
        let mut out = String::new();
        let _ = write!(out, "public struct {}", ty.name);
        if let Some(parent) = &ty.parent {
            let _ = write!(out, " // {} : {}", ty.full_name, parent.name);
            for iface in &ty.interfaces {
                let _ = write!(out, ", {}", iface.name);
            }
        }
        out.push_str("\n{\n");

        for field in &ty.fields {
            if field.has_value && !self.include_constants {
                continue;
            }
            let keyword = simple_keyword(&field.field_type);
            if field.is_pointer || field.field_type == "String" {
                let _ = writeln!(
                    out,
                    "    [FieldOffset(0x{:02X})] public {} {}; // {}",
                    field.offset, self.pointer, field.name, keyword
                );
            } else {
                let _ = writeln!(
                    out,
                    "    [FieldOffset(0x{:02X})] public {} {};",
                    field.offset, keyword, field.name
                );
            }
        }

        out.push_str("}\n");
        out
    }
}
