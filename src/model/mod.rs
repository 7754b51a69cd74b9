// Wed Jan 28 2026 - Alex

pub mod build;

pub use build::{BuiltType, FieldReconstructionError, Reconstruction, ReconstructionError, TypeBuilder};

use crate::mono::{FieldRecord, RawClassRecord, WalkError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClassKind {
    Class,
    Struct,
    Interface,
    Enum,
    #[serde(other)]
    Unknown,
}

impl ClassKind {
    pub fn from_record(record: &RawClassRecord) -> Self {
        if record.is_enum() {
            Self::Enum
        } else if record.is_value_type() {
            Self::Struct
        } else if record.is_interface() {
            Self::Interface
        } else {
            Self::Class
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class => "Class",
            Self::Struct => "Struct",
            Self::Interface => "Interface",
            Self::Enum => "Enum",
            Self::Unknown => "Unknown",
        }
    }

    pub fn all() -> [ClassKind; 4] {
        [Self::Class, Self::Struct, Self::Interface, Self::Enum]
    }
}

impl fmt::Display for ClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "class" => Ok(Self::Class),
            "struct" | "valuetype" => Ok(Self::Struct),
            "interface" => Ok(Self::Interface),
            "enum" => Ok(Self::Enum),
            other => Err(format!("unknown class kind '{}'", other)),
        }
    }
}

/// One-level reference to a type: names only, never fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TypeReference {
    pub full_name: String,
    pub name: String,
    pub namespace: String,
    #[serde(alias = "ClassType")]
    pub class_kind: ClassKind,
    #[serde(default)]
    pub parent_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FieldDefinition {
    pub name: String,
    pub field_type: String,
    pub offset: i32,
    #[serde(default)]
    pub is_pointer: bool,
    #[serde(default)]
    pub is_value_type: bool,
    #[serde(default)]
    pub has_value: bool,
    #[serde(default)]
    pub constant_value_type: Option<String>,
    #[serde(default)]
    pub declaring_type: String,
}

impl FieldDefinition {
    /// Builds the field as declared by `declaring_type`. Instance fields of a
    /// value type lose the `value_type_header` the runtime counts in.
    pub fn from_record(
        field: &FieldRecord,
        declaring_type: &str,
        declaring_is_value_type: bool,
        value_type_header: i32,
    ) -> Result<Self, WalkError> {
        let constant = field.constant();
        let offset = if declaring_is_value_type && constant.is_none() {
            field
                .offset
                .checked_sub(value_type_header)
                .ok_or(WalkError::FieldOffset {
                    offset: field.offset,
                    header: value_type_header,
                })?
        } else {
            field.offset
        };

        Ok(Self {
            name: field.name.clone(),
            field_type: field.type_name.clone(),
            offset,
            is_pointer: field.is_pointer(),
            is_value_type: field.is_value_type(),
            has_value: constant.is_some(),
            constant_value_type: constant.map(|c| c.as_str().to_string()),
            declaring_type: declaring_type.to_string(),
        })
    }

    /// `S` for static fields, `C` for literals.
    pub fn constant_short(&self) -> Option<char> {
        self.constant_value_type.as_deref().and_then(|c| c.chars().next())
    }
}

impl fmt::Display for FieldDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.constant_short() {
            Some(tag) => write!(f, "[{:02X}][{}] {} : {}", self.offset, tag, self.name, self.field_type),
            None => write!(f, "[{:02X}] {} : {}", self.offset, self.name, self.field_type),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TypeDefinition {
    pub full_name: String,
    pub name: String,
    pub namespace: String,
    #[serde(alias = "ClassType")]
    pub class_kind: ClassKind,
    #[serde(default)]
    pub parent: Option<TypeReference>,
    #[serde(default)]
    pub interfaces: Vec<TypeReference>,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl TypeDefinition {
    pub fn parent_name(&self) -> Option<&str> {
        self.parent.as_ref().map(|p| p.name.as_str())
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Every reconstructed type of one dump.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TypeDatabase {
    pub raw_class_count: usize,
    pub type_definitions: Vec<TypeDefinition>,
}

impl TypeDatabase {
    pub fn new(type_definitions: Vec<TypeDefinition>, raw_class_count: usize) -> Self {
        Self {
            raw_class_count,
            type_definitions,
        }
    }

    pub fn len(&self) -> usize {
        self.type_definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.type_definitions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TypeDefinition> {
        self.type_definitions.iter()
    }

    /// First type with this exact full name.
    pub fn find(&self, full_name: &str) -> Option<&TypeDefinition> {
        self.type_definitions.iter().find(|t| t.full_name == full_name)
    }

    pub fn field_count(&self) -> usize {
        self.type_definitions.iter().map(|t| t.fields.len()).sum()
    }
}

impl<'a> IntoIterator for &'a TypeDatabase {
    type Item = &'a TypeDefinition;
    type IntoIter = std::slice::Iter<'a, TypeDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.type_definitions.iter()
    }
}
