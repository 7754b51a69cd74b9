// Fri Jan 23 2026 - Alex

use super::{OffsetsProfile, WalkError};
use crate::memory::{Address, MemoryReader, MemoryReaderExt};
use bitflags::bitflags;
use std::fmt;

const MAX_TYPE_DEPTH: usize = 4;

bitflags! {
    /// Bit-field byte of a class record.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ClassBits: u8 {
        const INITED = 0x01;
        const SIZE_INITED = 0x02;
        const VALUETYPE = 0x04;
        const ENUMTYPE = 0x08;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TypeAttributes: u32 {
        const VISIBILITY_MASK = 0x07;
        const PUBLIC = 0x01;
        const INTERFACE = 0x20;
        const ABSTRACT = 0x80;
        const SEALED = 0x100;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FieldAttributes: u16 {
        const ACCESS_MASK = 0x07;
        const STATIC = 0x10;
        const INIT_ONLY = 0x20;
        const LITERAL = 0x40;
        const HAS_DEFAULT = 0x8000;
    }
}

/// Element type code of a `MonoType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeCode(pub u8);

impl TypeCode {
    pub const END: TypeCode = TypeCode(0x00);
    pub const VOID: TypeCode = TypeCode(0x01);
    pub const BOOLEAN: TypeCode = TypeCode(0x02);
    pub const CHAR: TypeCode = TypeCode(0x03);
    pub const I1: TypeCode = TypeCode(0x04);
    pub const U1: TypeCode = TypeCode(0x05);
    pub const I2: TypeCode = TypeCode(0x06);
    pub const U2: TypeCode = TypeCode(0x07);
    pub const I4: TypeCode = TypeCode(0x08);
    pub const U4: TypeCode = TypeCode(0x09);
    pub const I8: TypeCode = TypeCode(0x0a);
    pub const U8: TypeCode = TypeCode(0x0b);
    pub const R4: TypeCode = TypeCode(0x0c);
    pub const R8: TypeCode = TypeCode(0x0d);
    pub const STRING: TypeCode = TypeCode(0x0e);
    pub const PTR: TypeCode = TypeCode(0x0f);
    pub const BYREF: TypeCode = TypeCode(0x10);
    pub const VALUETYPE: TypeCode = TypeCode(0x11);
    pub const CLASS: TypeCode = TypeCode(0x12);
    pub const VAR: TypeCode = TypeCode(0x13);
    pub const ARRAY: TypeCode = TypeCode(0x14);
    pub const GENERICINST: TypeCode = TypeCode(0x15);
    pub const TYPEDBYREF: TypeCode = TypeCode(0x16);
    pub const I: TypeCode = TypeCode(0x18);
    pub const U: TypeCode = TypeCode(0x19);
    pub const FNPTR: TypeCode = TypeCode(0x1b);
    pub const OBJECT: TypeCode = TypeCode(0x1c);
    pub const SZARRAY: TypeCode = TypeCode(0x1d);
    pub const MVAR: TypeCode = TypeCode(0x1e);

    /// Codes whose field slot holds a managed reference.
    pub fn is_pointer(self) -> bool {
        matches!(self, Self::CLASS | Self::SZARRAY | Self::GENERICINST)
    }

    pub fn is_value_type(self) -> bool {
        self == Self::VALUETYPE
    }

    pub fn primitive_name(self) -> Option<&'static str> {
        let name = match self {
            Self::VOID => "Void",
            Self::BOOLEAN => "Boolean",
            Self::CHAR => "Char",
            Self::I1 => "SByte",
            Self::U1 => "Byte",
            Self::I2 => "Int16",
            Self::U2 => "UInt16",
            Self::I4 => "Int32",
            Self::U4 => "UInt32",
            Self::I8 => "Int64",
            Self::U8 => "UInt64",
            Self::R4 => "Single",
            Self::R8 => "Double",
            Self::STRING => "String",
            Self::TYPEDBYREF => "TypedReference",
            Self::I => "IntPtr",
            Self::U => "UIntPtr",
            Self::OBJECT => "Object",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02x}", self.0)
    }
}

/// Decoded `MonoType` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonoType {
    pub address: Address,
    pub data: Address,
    pub attrs: FieldAttributes,
    pub code: TypeCode,
}

impl MonoType {
    pub fn read<R: MemoryReader + ?Sized>(
        reader: &R,
        profile: &OffsetsProfile,
        address: Address,
    ) -> Result<Self, WalkError> {
        if address.is_null() {
            return Err(WalkError::NullPointer("MonoType"));
        }

        Ok(Self {
            address,
            data: reader.read_ptr(address + profile.type_data)?,
            attrs: FieldAttributes::from_bits_retain(reader.read_u16(address + profile.type_attrs)?),
            code: TypeCode(reader.read_u8(address + profile.type_code)?),
        })
    }

    /// Renders the type the way it reads in C#: `Int32`, `Player[]`,
    /// `List<String>`, `T0`, `Byte*`.
    pub fn render<R: MemoryReader + ?Sized>(&self, reader: &R, profile: &OffsetsProfile) -> Result<String, WalkError> {
        self.render_depth(reader, profile, 0)
    }

    fn render_depth<R: MemoryReader + ?Sized>(
        &self,
        reader: &R,
        profile: &OffsetsProfile,
        depth: usize,
    ) -> Result<String, WalkError> {
        if depth > MAX_TYPE_DEPTH {
            return Ok("?".to_string());
        }
        if let Some(name) = self.code.primitive_name() {
            return Ok(name.to_string());
        }

        match self.code {
            TypeCode::CLASS | TypeCode::VALUETYPE => class_name(reader, profile, self.data),
            TypeCode::SZARRAY => Ok(format!("{}[]", class_name(reader, profile, self.data)?)),
            TypeCode::ARRAY => {
                // MonoArrayType starts with the element class.
                let element = reader.read_ptr(self.data)?;
                Ok(format!("{}[]", class_name(reader, profile, element)?))
            }
            TypeCode::GENERICINST => {
                let container = reader.read_ptr(self.data + profile.generic_class_container)?;
                let inst = reader.read_ptr(self.data + profile.generic_class_inst)?;
                let base = class_name(reader, profile, container)?;
                let base = base.split('`').next().unwrap_or(&base).to_string();
                if inst.is_null() {
                    return Ok(base);
                }

                let argc = reader.read_u32(inst + profile.generic_inst_argc)? & 0x3F_FFFF;
                let mut args = Vec::with_capacity(argc.min(16) as usize);
                for i in 0..argc.min(16) {
                    let arg = reader.read_ptr(inst + profile.generic_inst_argv + i * 8)?;
                    let arg = MonoType::read(reader, profile, arg)?;
                    args.push(arg.render_depth(reader, profile, depth + 1)?);
                }
                Ok(format!("{}<{}>", base, args.join(", ")))
            }
            TypeCode::VAR | TypeCode::MVAR => {
                let num = reader.read_u16(self.data + profile.generic_param_num)?;
                Ok(format!("T{}", num))
            }
            TypeCode::PTR | TypeCode::BYREF => {
                let inner = MonoType::read(reader, profile, self.data)?;
                Ok(format!("{}*", inner.render_depth(reader, profile, depth + 1)?))
            }
            TypeCode::FNPTR => Ok("IntPtr".to_string()),
            other => Ok(format!("<type {}>", other)),
        }
    }
}

fn class_name<R: MemoryReader + ?Sized>(
    reader: &R,
    profile: &OffsetsProfile,
    class: Address,
) -> Result<String, WalkError> {
    if class.is_null() {
        return Err(WalkError::NullPointer("MonoClass"));
    }
    let name = reader.read_ptr(class + profile.class_name)?;
    if name.is_null() {
        return Ok(String::new());
    }
    Ok(reader.read_c_string(name, profile.max_name_length as usize)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::MonoBuilder;

    #[test]
    fn test_pointer_codes() {
        assert!(TypeCode::CLASS.is_pointer());
        assert!(TypeCode::SZARRAY.is_pointer());
        assert!(TypeCode::GENERICINST.is_pointer());
        assert!(!TypeCode::VALUETYPE.is_pointer());
        assert!(!TypeCode::STRING.is_pointer());
    }

    #[test]
    fn test_render_types() {
        let mut mono = MonoBuilder::new();
        let player = mono.class("Player").namespace("Game").finish();
        let int32 = mono.mono_type(TypeCode::I4, Address::NULL, FieldAttributes::empty());
        let array = mono.mono_type(TypeCode::SZARRAY, player, FieldAttributes::empty());
        let list_class = mono.class("List`1").namespace("System.Collections.Generic").finish();
        let list = mono.generic_type(list_class, &[int32]);
        let ptr = mono.mono_type(TypeCode::PTR, int32, FieldAttributes::empty());
        let memory = mono.memory();
        let profile = OffsetsProfile::default();

        let render = |t: Address| MonoType::read(&memory, &profile, t).unwrap().render(&memory, &profile).unwrap();
        assert_eq!(render(int32), "Int32");
        assert_eq!(render(array), "Player[]");
        assert_eq!(render(list), "List<Int32>");
        assert_eq!(render(ptr), "Int32*");
    }

    #[test]
    fn test_null_type_is_an_error() {
        let memory = crate::memory::SparseMemory::new();
        assert!(MonoType::read(&memory, &OffsetsProfile::default(), Address::NULL).is_err());
    }
}
