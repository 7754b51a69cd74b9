// Thu Jan 22 2026 - Alex

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid offsets profile: {0}")]
    Json(#[from] serde_json::Error),
}

/// Every structural offset the walkers use.
///
/// Loaded from a JSON object of named offsets; keys the file leaves out keep
/// the Unity 2021 `mono-2.0-bdwgc` values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffsetsProfile {
    pub name: String,
    pub version: u32,

    // PE headers and the export directory
    pub pe_e_lfanew: u32,
    pub pe_export_directory: u32,
    pub export_number_of_functions: u32,
    pub export_number_of_names: u32,
    pub export_address_of_functions: u32,
    pub export_address_of_names: u32,
    pub export_address_of_name_ordinals: u32,

    // `mov rax, [rip + disp32]` inside mono_get_root_domain
    pub root_domain_displacement: u32,
    pub root_domain_instruction_length: u32,

    pub domain_assemblies: u32,
    pub assembly_list_data: u32,
    pub assembly_list_next: u32,
    pub assembly_name: u32,
    pub assembly_image: u32,

    pub image_class_cache: u32,
    pub hash_table_size: u32,
    pub hash_table_table: u32,

    pub class_record_size: u32,
    pub class_bit_fields: u32,
    pub class_parent: u32,
    pub class_name: u32,
    pub class_namespace: u32,
    pub class_type_token: u32,
    pub class_interface_count: u32,
    pub class_interfaces: u32,
    pub class_fields: u32,
    pub class_flags: u32,
    pub class_field_count: u32,
    pub class_next_class_cache: u32,

    pub field_stride: u32,
    pub field_type: u32,
    pub field_name: u32,
    pub field_offset: u32,

    pub type_data: u32,
    pub type_attrs: u32,
    pub type_code: u32,

    pub generic_class_container: u32,
    pub generic_class_inst: u32,
    pub generic_inst_argc: u32,
    pub generic_inst_argv: u32,
    pub generic_param_num: u32,

    pub value_type_header: u32,
    pub max_name_length: u32,
    /// Field counts above this are treated as a corrupt record.
    pub max_field_count: u32,
}

impl Default for OffsetsProfile {
    fn default() -> Self {
        Self::unity_2021()
    }
}

impl OffsetsProfile {
    pub fn unity_2021() -> Self {
        Self {
            name: "unity-2021-mono-2.0-bdwgc".to_string(),
            version: 1,

            pe_e_lfanew: 0x3C,
            pe_export_directory: 0x88,
            export_number_of_functions: 0x14,
            export_number_of_names: 0x18,
            export_address_of_functions: 0x1C,
            export_address_of_names: 0x20,
            export_address_of_name_ordinals: 0x24,

            root_domain_displacement: 3,
            root_domain_instruction_length: 7,

            domain_assemblies: 0xA0,
            assembly_list_data: 0x0,
            assembly_list_next: 0x8,
            assembly_name: 0x10,
            assembly_image: 0x60,

            image_class_cache: 0x4D0,
            hash_table_size: 0x18,
            hash_table_table: 0x20,

            class_record_size: 0x110,
            class_bit_fields: 0x20,
            class_parent: 0x30,
            class_name: 0x48,
            class_namespace: 0x50,
            class_type_token: 0x58,
            class_interface_count: 0x60,
            class_interfaces: 0x88,
            class_fields: 0x98,
            class_flags: 0xF0,
            class_field_count: 0x100,
            class_next_class_cache: 0x108,

            field_stride: 0x20,
            field_type: 0x0,
            field_name: 0x8,
            field_offset: 0x18,

            type_data: 0x0,
            type_attrs: 0x8,
            type_code: 0xA,

            generic_class_container: 0x0,
            generic_class_inst: 0x8,
            generic_inst_argc: 0x4,
            generic_inst_argv: 0x8,
            generic_param_num: 0x8,

            value_type_header: 0x10,
            max_name_length: 1024,
            max_field_count: 0x4000,
        }
    }

    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// The profile at `path`, or the built-in one when no path is given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ProfileError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Bytes of a class record that must be readable in one go.
    pub fn class_read_len(&self) -> usize {
        let last = [
            self.class_bit_fields + 1,
            self.class_parent + 8,
            self.class_name + 8,
            self.class_namespace + 8,
            self.class_type_token + 4,
            self.class_interface_count + 2,
            self.class_interfaces + 8,
            self.class_fields + 8,
            self.class_flags + 4,
            self.class_field_count + 4,
            self.class_next_class_cache + 8,
        ]
        .into_iter()
        .max()
        .unwrap_or(0);

        last.max(self.class_record_size) as usize
    }
}
