// Fri Jan 23 2026 - Alex

use super::{ClassBits, FieldAttributes, MonoType, OffsetsProfile, TypeAttributes, TypeCode, WalkError};
use crate::memory::{Address, MemoryReader, MemoryReaderExt};
use bytes::Buf;
use std::fmt;

/// A class node decoded straight from the runtime's memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawClassRecord {
    pub address: Address,
    pub name: String,
    pub namespace: String,
    pub parent: Option<Address>,
    pub interfaces: Address,
    pub interface_count: u16,
    pub fields: Address,
    pub field_count: u32,
    pub bits: ClassBits,
    pub flags: TypeAttributes,
    pub token: u32,
    pub next: Address,
}

struct RecordBytes<'a> {
    raw: &'a [u8],
}

impl RecordBytes<'_> {
    fn at(&self, offset: u32) -> &[u8] {
        self.raw.get(offset as usize..).unwrap_or(&[])
    }

    fn u8(&self, offset: u32) -> u8 {
        let mut buf = self.at(offset);
        if buf.remaining() < 1 { 0 } else { buf.get_u8() }
    }

    fn u16(&self, offset: u32) -> u16 {
        let mut buf = self.at(offset);
        if buf.remaining() < 2 { 0 } else { buf.get_u16_le() }
    }

    fn u32(&self, offset: u32) -> u32 {
        let mut buf = self.at(offset);
        if buf.remaining() < 4 { 0 } else { buf.get_u32_le() }
    }

    fn ptr(&self, offset: u32) -> Address {
        let mut buf = self.at(offset);
        if buf.remaining() < 8 {
            Address::NULL
        } else {
            Address::new(buf.get_u64_le())
        }
    }
}

impl RawClassRecord {
    /// Reads the class record at `address` in one call, then its name and namespace.
    pub fn read<R: MemoryReader + ?Sized>(
        reader: &R,
        profile: &OffsetsProfile,
        address: Address,
    ) -> Result<Self, WalkError> {
        if address.is_null() {
            return Err(WalkError::NullPointer("MonoClass"));
        }

        let raw = reader.read_exact(address, profile.class_read_len())?;
        let record = RecordBytes { raw: &raw };

        let max_len = profile.max_name_length as usize;
        let read_name = |ptr: Address| -> Result<String, WalkError> {
            match ptr.non_null() {
                Some(ptr) => Ok(reader.read_c_string(ptr, max_len)?),
                None => Ok(String::new()),
            }
        };

        Ok(Self {
            address,
            name: read_name(record.ptr(profile.class_name))?,
            namespace: read_name(record.ptr(profile.class_namespace))?,
            parent: record.ptr(profile.class_parent).non_null(),
            interfaces: record.ptr(profile.class_interfaces),
            interface_count: record.u16(profile.class_interface_count),
            fields: record.ptr(profile.class_fields),
            field_count: record.u32(profile.class_field_count),
            bits: ClassBits::from_bits_retain(record.u8(profile.class_bit_fields)),
            flags: TypeAttributes::from_bits_retain(record.u32(profile.class_flags)),
            token: record.u32(profile.class_type_token),
            next: record.ptr(profile.class_next_class_cache),
        })
    }

    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    pub fn is_value_type(&self) -> bool {
        self.bits.contains(ClassBits::VALUETYPE)
    }

    pub fn is_enum(&self) -> bool {
        self.bits.contains(ClassBits::ENUMTYPE)
    }

    pub fn is_interface(&self) -> bool {
        self.flags.contains(TypeAttributes::INTERFACE)
    }

    /// Addresses of the declared interfaces, nulls skipped.
    pub fn interface_addresses<R: MemoryReader + ?Sized>(&self, reader: &R) -> Result<Vec<Address>, WalkError> {
        if self.interfaces.is_null() || self.interface_count == 0 {
            return Ok(Vec::new());
        }

        let raw = reader.read_exact(self.interfaces, self.interface_count as usize * 8)?;
        Ok(raw
            .chunks_exact(8)
            .map(|mut chunk| Address::new(chunk.get_u64_le()))
            .filter(|a| !a.is_null())
            .collect())
    }

    pub fn has_plausible_field_count(&self, profile: &OffsetsProfile) -> bool {
        self.field_count <= profile.max_field_count
    }

    /// Addresses of each slot in the field array, never more than
    /// `max_field_count` of them.
    pub fn field_slots<'p>(&self, profile: &'p OffsetsProfile) -> impl Iterator<Item = Address> + 'p {
        let count = if self.fields.is_null() {
            0
        } else {
            self.field_count.min(profile.max_field_count) as u64
        };
        let base = self.fields;
        (0..count).map(move |i| base + i * profile.field_stride as u64)
    }
}

impl fmt::Display for RawClassRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.full_name(), self.address)
    }
}

/// Whether a field stores a value outside the instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantKind {
    Static,
    Constant,
}

impl ConstantKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Static => "Static",
            Self::Constant => "Constant",
        }
    }
}

/// One decoded field slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRecord {
    pub address: Address,
    pub name: String,
    pub type_name: String,
    pub offset: i32,
    pub code: TypeCode,
    pub attrs: FieldAttributes,
}

impl FieldRecord {
    pub fn read<R: MemoryReader + ?Sized>(
        reader: &R,
        profile: &OffsetsProfile,
        slot: Address,
    ) -> Result<Self, WalkError> {
        let type_ptr = reader.read_ptr(slot + profile.field_type)?;
        let name_ptr = reader.read_ptr(slot + profile.field_name)?;
        let offset = reader.read_i32(slot + profile.field_offset)?;

        let name = match name_ptr.non_null() {
            Some(ptr) => reader.read_c_string(ptr, profile.max_name_length as usize)?,
            None => return Err(WalkError::NullPointer("field name")),
        };

        let mono_type = MonoType::read(reader, profile, type_ptr)?;
        let type_name = mono_type.render(reader, profile)?;

        Ok(Self {
            address: slot,
            name,
            type_name,
            offset,
            code: mono_type.code,
            attrs: mono_type.attrs,
        })
    }

    pub fn constant(&self) -> Option<ConstantKind> {
        if self.attrs.contains(FieldAttributes::LITERAL) {
            Some(ConstantKind::Constant)
        } else if self.attrs.contains(FieldAttributes::STATIC) {
            Some(ConstantKind::Static)
        } else {
            None
        }
    }

    pub fn has_value(&self) -> bool {
        self.constant().is_some()
    }

    pub fn is_pointer(&self) -> bool {
        self.code.is_pointer()
    }

    pub fn is_value_type(&self) -> bool {
        self.code.is_value_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::MonoBuilder;

    #[test]
    fn test_read_class_record() {
        let mut mono = MonoBuilder::new();
        let base = mono.class("Object").namespace("System").finish();
        let class = mono.class("Vector3").namespace("UnityEngine").parent(base).value_type().finish();
        let memory = mono.memory();

        let record = RawClassRecord::read(&memory, &OffsetsProfile::default(), class).unwrap();
        assert_eq!(record.full_name(), "UnityEngine.Vector3");
        assert_eq!(record.parent, Some(base));
        assert!(record.is_value_type());
        assert!(!record.is_enum());
    }

    #[test]
    fn test_read_fields_and_constants() {
        let mut mono = MonoBuilder::new();
        let int32 = mono.mono_type(TypeCode::I4, Address::NULL, FieldAttributes::empty());
        let literal = mono.mono_type(
            TypeCode::I4,
            Address::NULL,
            FieldAttributes::STATIC | FieldAttributes::LITERAL | FieldAttributes::HAS_DEFAULT,
        );
        let class = mono
            .class("Player")
            .field("health", int32, 0x10)
            .field("MaxHealth", literal, 0)
            .finish();
        let memory = mono.memory();
        let profile = OffsetsProfile::default();

        let record = RawClassRecord::read(&memory, &profile, class).unwrap();
        let fields: Vec<FieldRecord> = record
            .field_slots(&profile)
            .into_iter()
            .map(|slot| FieldRecord::read(&memory, &profile, slot).unwrap())
            .collect();

        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "health");
        assert_eq!(fields[0].type_name, "Int32");
        assert_eq!(fields[0].offset, 0x10);
        assert_eq!(fields[0].constant(), None);
        assert_eq!(fields[1].constant(), Some(ConstantKind::Constant));
    }

    #[test]
    fn test_interfaces_skip_nulls() {
        let mut mono = MonoBuilder::new();
        let disposable = mono.class("IDisposable").interface().finish();
        let class = mono.class("Stream").implements(disposable).implements(Address::NULL).finish();
        let memory = mono.memory();

        let record = RawClassRecord::read(&memory, &OffsetsProfile::default(), class).unwrap();
        assert_eq!(record.interface_addresses(&memory).unwrap(), vec![disposable]);
    }

    #[test]
    fn test_field_slots_are_capped() {
        let mut mono = MonoBuilder::new();
        let int32 = mono.mono_type(TypeCode::I4, Address::NULL, FieldAttributes::empty());
        let class = mono.class("Huge").field("a", int32, 0x10).finish();
        mono.set_field_count(class, u32::MAX);
        let memory = mono.memory();
        let profile = OffsetsProfile::default();

        let record = RawClassRecord::read(&memory, &profile, class).unwrap();
        assert!(!record.has_plausible_field_count(&profile));
        assert_eq!(record.field_slots(&profile).count(), profile.max_field_count as usize);
    }
}
