// Wed Jan 28 2026 - Alex

use super::{ClassKind, FieldDefinition, TypeDefinition, TypeReference};
use crate::memory::{Address, MemoryReader, MemoryReaderExt};
use crate::mono::{FieldRecord, OffsetsProfile, RawClassRecord, WalkError};
use indexmap::IndexMap;
use log::{debug, warn};
use rayon::prelude::*;
use rayon::ThreadPool;
use thiserror::Error;

/// A recovered per-item failure; the item is skipped and the type kept.
#[derive(Error, Debug)]
pub enum FieldReconstructionError {
    #[error("{type_name}: field slot {slot}: {source}")]
    Field {
        type_name: String,
        slot: Address,
        source: WalkError,
    },
    #[error("{type_name}: interfaces: {source}")]
    Interface { type_name: String, source: WalkError },
    #[error("{type_name}: implausible field count {count} (limit {limit}), fields skipped")]
    FieldCount { type_name: String, count: u32, limit: u32 },
}

/// A type that could not be reconstructed at all.
#[derive(Error, Debug)]
#[error("Failed to reconstruct {type_name} at {address}: {source}")]
pub struct ReconstructionError {
    pub address: Address,
    pub type_name: String,
    #[source]
    pub source: WalkError,
}

#[derive(Debug)]
pub struct BuiltType {
    pub definition: TypeDefinition,
    pub diagnostics: Vec<FieldReconstructionError>,
}

#[derive(Debug, Default)]
pub struct Reconstruction {
    pub types: Vec<TypeDefinition>,
    pub diagnostics: Vec<FieldReconstructionError>,
}

/// Turns raw class records into [`TypeDefinition`]s.
pub struct TypeBuilder<'a, R: MemoryReader + ?Sized> {
    reader: &'a R,
    profile: &'a OffsetsProfile,
}

impl<'a, R: MemoryReader + ?Sized> TypeBuilder<'a, R> {
    pub fn new(reader: &'a R, profile: &'a OffsetsProfile) -> Self {
        Self { reader, profile }
    }

    /// Names of the class at `address` and of its direct parent. No fields.
    pub fn build_shallow(&self, address: Address) -> Result<TypeReference, WalkError> {
        let record = RawClassRecord::read(self.reader, self.profile, address)?;
        let parent_name = match record.parent {
            Some(parent) => Some(self.class_name(parent)?),
            None => None,
        };

        Ok(TypeReference {
            full_name: record.full_name(),
            name: record.name.clone(),
            namespace: record.namespace.clone(),
            class_kind: ClassKind::from_record(&record),
            parent_name,
        })
    }

    fn class_name(&self, class: Address) -> Result<String, WalkError> {
        let name = self.reader.read_ptr(class + self.profile.class_name)?;
        match name.non_null() {
            Some(name) => Ok(self.reader.read_c_string(name, self.profile.max_name_length as usize)?),
            None => Ok(String::new()),
        }
    }

    /// The complete definition of `record`. Only a parent failure is an error;
    /// interface and field failures come back as diagnostics.
    pub fn build_full(&self, record: &RawClassRecord) -> Result<BuiltType, ReconstructionError> {
        let full_name = record.full_name();
        let parent = record
            .parent
            .map(|parent| self.build_shallow(parent))
            .transpose()
            .map_err(|source| ReconstructionError {
                address: record.address,
                type_name: full_name.clone(),
                source,
            })?;

        let mut diagnostics = Vec::new();

        let mut interfaces = Vec::new();
        match record.interface_addresses(self.reader) {
            Ok(addresses) => {
                for address in addresses {
                    match self.build_shallow(address) {
                        Ok(interface) => interfaces.push(interface),
                        Err(source) => diagnostics.push(FieldReconstructionError::Interface {
                            type_name: full_name.clone(),
                            source,
                        }),
                    }
                }
            }
            Err(source) => diagnostics.push(FieldReconstructionError::Interface {
                type_name: full_name.clone(),
                source,
            }),
        }

        let mut fields = Vec::new();
        if record.has_plausible_field_count(self.profile) {
            fields.reserve(record.field_count as usize);
            for slot in record.field_slots(self.profile) {
                match self.build_field(record, &full_name, slot) {
                    Ok(field) => fields.push(field),
                    Err(source) => diagnostics.push(FieldReconstructionError::Field {
                        type_name: full_name.clone(),
                        slot,
                        source,
                    }),
                }
            }
        } else {
            diagnostics.push(FieldReconstructionError::FieldCount {
                type_name: full_name.clone(),
                count: record.field_count,
                limit: self.profile.max_field_count,
            });
        }

        Ok(BuiltType {
            definition: TypeDefinition {
                full_name,
                name: record.name.clone(),
                namespace: record.namespace.clone(),
                class_kind: ClassKind::from_record(record),
                parent,
                interfaces,
                fields,
            },
            diagnostics,
        })
    }

    fn build_field(&self, record: &RawClassRecord, full_name: &str, slot: Address) -> Result<FieldDefinition, WalkError> {
        let field = FieldRecord::read(self.reader, self.profile, slot)?;
        FieldDefinition::from_record(
            &field,
            full_name,
            record.is_value_type(),
            self.profile.value_type_header as i32,
        )
    }
}

impl<'a, R: MemoryReader + ?Sized> TypeBuilder<'a, R> {
    /// Builds every record on `pool`, then sorts by full name. The sort is
    /// stable so duplicates keep walk order. `on_done` runs once per record.
    pub fn build_all<F>(
        &self,
        records: &IndexMap<Address, RawClassRecord>,
        pool: &ThreadPool,
        on_done: F,
    ) -> Result<Reconstruction, ReconstructionError>
    where
        F: Fn() + Sync,
    {
        let records: Vec<&RawClassRecord> = records.values().collect();

        let built: Vec<BuiltType> = pool.install(|| {
            records
                .par_iter()
                .map(|record| {
                    let built = self.build_full(record);
                    on_done();
                    built
                })
                .collect::<Result<Vec<_>, _>>()
        })?;

        let mut reconstruction = Reconstruction::default();
        for item in built {
            for diagnostic in &item.diagnostics {
                warn!("{}", diagnostic);
            }
            reconstruction.diagnostics.extend(item.diagnostics);
            reconstruction.types.push(item.definition);
        }
        reconstruction.types.sort_by(|a, b| a.full_name.cmp(&b.full_name));

        debug!(
            "Reconstructed {} types with {} diagnostics",
            reconstruction.types.len(),
            reconstruction.diagnostics.len()
        );
        Ok(reconstruction)
    }
}
