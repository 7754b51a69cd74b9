// Tue Jan 27 2026 - Alex

//! Builders for synthetic PE images and Mono runtime structures laid out in
//! a [`SparseMemory`] address space.

use crate::memory::{Address, ModuleInfo, SparseMemory};
use crate::model::{ClassKind, FieldDefinition, TypeDefinition};
use crate::mono::{ClassBits, FieldAttributes, OffsetsProfile, TypeAttributes, TypeCode};

pub const ARENA_BASE: u64 = 0x1_4000_0000;
pub const MODULE_BASE: u64 = 0x1_8000_0000;
pub const ROOT_DOMAIN_RVA: u32 = 0x1200;

const E_LFANEW: usize = 0x80;
const EXPORT_DIRECTORY: usize = 0x200;
const FUNCTIONS: usize = 0x300;
const NAMES: usize = 0x400;
const ORDINALS: usize = 0x500;
const STRINGS: usize = 0x600;

/// Minimal PE32+ image with an export table.
///
/// Function slots are stored in reverse name order so lookups have to go
/// through the name-ordinal table.
#[derive(Debug, Default)]
pub struct PeBuilder {
    exports: Vec<(String, u32)>,
    code: Vec<(u32, Vec<u8>)>,
    name_rvas: Vec<(usize, u32)>,
}

impl PeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn export(mut self, name: &str, rva: u32) -> Self {
        self.exports.push((name.to_string(), rva));
        self
    }

    /// Points the name of export `index` at `rva` instead of its string.
    pub fn name_rva(mut self, index: usize, rva: u32) -> Self {
        self.name_rvas.push((index, rva));
        self
    }

    pub fn code(mut self, rva: u32, bytes: Vec<u8>) -> Self {
        self.code.push((rva, bytes));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let code_end = self
            .code
            .iter()
            .map(|(rva, bytes)| *rva as usize + bytes.len())
            .max()
            .unwrap_or(0);
        let mut image = vec![0u8; code_end.max(0x2000).next_multiple_of(0x1000)];

        image[0..2].copy_from_slice(b"MZ");
        put_u32(&mut image, 0x3C, E_LFANEW as u32);
        image[E_LFANEW..E_LFANEW + 4].copy_from_slice(b"PE\0\0");
        put_u16(&mut image, E_LFANEW + 4, 0x8664);
        put_u16(&mut image, E_LFANEW + 0x14, 0xF0);
        put_u16(&mut image, E_LFANEW + 0x18, 0x20B);
        put_u32(&mut image, E_LFANEW + 0x88, EXPORT_DIRECTORY as u32);
        put_u32(&mut image, E_LFANEW + 0x8C, 0x100);

        let count = self.exports.len() as u32;
        put_u32(&mut image, EXPORT_DIRECTORY + 0x14, count);
        put_u32(&mut image, EXPORT_DIRECTORY + 0x18, count);
        put_u32(&mut image, EXPORT_DIRECTORY + 0x1C, FUNCTIONS as u32);
        put_u32(&mut image, EXPORT_DIRECTORY + 0x20, NAMES as u32);
        put_u32(&mut image, EXPORT_DIRECTORY + 0x24, ORDINALS as u32);

        let mut string_at = STRINGS;
        for (index, (name, rva)) in self.exports.iter().enumerate() {
            let ordinal = self.exports.len() - 1 - index;
            put_u32(&mut image, FUNCTIONS + ordinal * 4, *rva);
            put_u16(&mut image, ORDINALS + index * 2, ordinal as u16);
            put_u32(&mut image, NAMES + index * 4, string_at as u32);
            image[string_at..string_at + name.len()].copy_from_slice(name.as_bytes());
            string_at += name.len() + 1;
        }

        for (index, rva) in &self.name_rvas {
            put_u32(&mut image, NAMES + index * 4, *rva);
        }

        for (rva, bytes) in &self.code {
            let start = *rva as usize;
            image[start..start + bytes.len()].copy_from_slice(bytes);
        }

        image
    }
}

fn put_u16(buf: &mut [u8], at: usize, value: u16) {
    buf[at..at + 2].copy_from_slice(&value.to_le_bytes());
}

fn put_u32(buf: &mut [u8], at: usize, value: u32) {
    buf[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

/// Lays out domains, assemblies, images, classes and fields in one
/// contiguous arena using the offsets of a profile.
pub struct MonoBuilder {
    profile: OffsetsProfile,
    data: Vec<u8>,
    next_token: u32,
}

impl MonoBuilder {
    pub fn new() -> Self {
        Self::with_profile(OffsetsProfile::default())
    }

    pub fn with_profile(profile: OffsetsProfile) -> Self {
        Self {
            profile,
            data: Vec::new(),
            next_token: 0x0200_0001,
        }
    }

    pub fn profile(&self) -> &OffsetsProfile {
        &self.profile
    }

    pub fn alloc(&mut self, len: usize) -> Address {
        let start = self.data.len().next_multiple_of(16);
        self.data.resize(start + len.max(1), 0);
        Address::new(ARENA_BASE + start as u64)
    }

    pub fn write(&mut self, addr: Address, bytes: &[u8]) {
        let at = (addr.as_u64() - ARENA_BASE) as usize;
        self.data[at..at + bytes.len()].copy_from_slice(bytes);
    }

    fn write_ptr(&mut self, addr: Address, value: Address) {
        self.write(addr, &value.as_u64().to_le_bytes());
    }

    fn read_ptr(&self, addr: Address) -> Address {
        let at = (addr.as_u64() - ARENA_BASE) as usize;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&self.data[at..at + 8]);
        Address::new(u64::from_le_bytes(raw))
    }

    pub fn string(&mut self, value: &str) -> Address {
        let addr = self.alloc(value.len() + 1);
        self.write(addr, value.as_bytes());
        addr
    }

    pub fn mono_type(&mut self, code: TypeCode, data: Address, attrs: FieldAttributes) -> Address {
        let p = self.profile.clone();
        let addr = self.alloc(0x10);
        self.write_ptr(addr + p.type_data, data);
        self.write(addr + p.type_attrs, &attrs.bits().to_le_bytes());
        self.write(addr + p.type_code, &[code.0]);
        addr
    }

    pub fn generic_type(&mut self, container: Address, args: &[Address]) -> Address {
        let p = self.profile.clone();
        let inst = self.alloc(p.generic_inst_argv as usize + args.len() * 8);
        self.write(inst + p.generic_inst_argc, &(args.len() as u32).to_le_bytes());
        for (i, arg) in args.iter().enumerate() {
            self.write_ptr(inst + p.generic_inst_argv + (i * 8) as u64, *arg);
        }

        let generic_class = self.alloc(0x10);
        self.write_ptr(generic_class + p.generic_class_container, container);
        self.write_ptr(generic_class + p.generic_class_inst, inst);
        self.mono_type(TypeCode::GENERICINST, generic_class, FieldAttributes::empty())
    }

    pub fn class(&mut self, name: &str) -> ClassSpec<'_> {
        ClassSpec {
            builder: self,
            name: name.to_string(),
            namespace: String::new(),
            parent: Address::NULL,
            bits: ClassBits::INITED,
            flags: TypeAttributes::PUBLIC,
            fields: Vec::new(),
            interfaces: Vec::new(),
        }
    }

    pub fn set_next_class(&mut self, class: Address, next: Address) {
        let offset = self.profile.class_next_class_cache;
        self.write_ptr(class + offset, next);
    }

    /// Overwrites the field count of `class` without touching its field array.
    pub fn set_field_count(&mut self, class: Address, count: u32) {
        let offset = self.profile.class_field_count;
        self.write(class + offset, &count.to_le_bytes());
    }

    /// Overwrites the parent pointer of `class`.
    pub fn set_parent(&mut self, class: Address, parent: Address) {
        let offset = self.profile.class_parent;
        self.write_ptr(class + offset, parent);
    }

    /// Replaces the interface list of `class`.
    pub fn set_interfaces(&mut self, class: Address, interfaces: &[Address]) {
        let p = self.profile.clone();
        let array = self.alloc(interfaces.len() * 8);
        for (index, interface) in interfaces.iter().enumerate() {
            self.write_ptr(array + (index * 8) as u64, *interface);
        }
        self.write_ptr(class + p.class_interfaces, array);
        self.write(class + p.class_interface_count, &(interfaces.len() as u16).to_le_bytes());
    }

    /// An image whose class cache holds `buckets`; each bucket is chained in order.
    pub fn image(&mut self, buckets: &[Vec<Address>]) -> Address {
        let p = self.profile.clone();
        let image = self.alloc(p.image_class_cache as usize + 0x40);
        let table = self.alloc(buckets.len() * 8);

        for (index, chain) in buckets.iter().enumerate() {
            if let Some(head) = chain.first() {
                self.write_ptr(table + (index * 8) as u64, *head);
            }
            for pair in chain.windows(2) {
                self.set_next_class(pair[0], pair[1]);
            }
        }

        let cache = image + p.image_class_cache;
        self.write(cache + p.hash_table_size, &(buckets.len() as u32).to_le_bytes());
        self.write_ptr(cache + p.hash_table_table, table);
        image
    }

    pub fn assembly(&mut self, name: &str, image: Address) -> Address {
        let p = self.profile.clone();
        let assembly = self.alloc(p.assembly_image as usize + 8);
        let name = self.string(name);
        self.write_ptr(assembly + p.assembly_name, name);
        self.write_ptr(assembly + p.assembly_image, image);
        assembly
    }

    pub fn domain(&mut self, assemblies: &[Address]) -> Address {
        let p = self.profile.clone();
        let domain = self.alloc(p.domain_assemblies as usize + 8);

        let mut head = Address::NULL;
        for assembly in assemblies.iter().rev() {
            let node = self.alloc(0x10);
            self.write_ptr(node + p.assembly_list_data, *assembly);
            self.write_ptr(node + p.assembly_list_next, head);
            head = node;
        }
        self.write_ptr(domain + p.domain_assemblies, head);
        domain
    }

    /// Points the last assembly list node back at the first.
    pub fn loop_assembly_list(&mut self, domain: Address) {
        let p = self.profile.clone();
        let head = self.read_ptr(domain + p.domain_assemblies);
        let mut node = head;
        while !node.is_null() {
            let next = self.read_ptr(node + p.assembly_list_next);
            if next.is_null() {
                self.write_ptr(node + p.assembly_list_next, head);
                return;
            }
            node = next;
        }
    }

    pub fn root_domain_global(&mut self, domain: Address) -> Address {
        let global = self.alloc(8);
        self.write_ptr(global, domain);
        global
    }

    /// `mov rax, [rip + disp32]; ret` loading `global`, as placed at `function`.
    pub fn accessor_code(&self, function: Address, global: Address) -> Vec<u8> {
        let p = &self.profile;
        let end = function + p.root_domain_instruction_length;
        let displacement = (global.as_u64() as i64 - end.as_u64() as i64) as i32;

        let mut code = vec![0x48, 0x8B, 0x05];
        code.resize(p.root_domain_instruction_length as usize, 0);
        let at = p.root_domain_displacement as usize;
        code[at..at + 4].copy_from_slice(&displacement.to_le_bytes());
        code.push(0xC3);
        code
    }

    /// An accessor function inside the arena that loads the domain.
    pub fn root_domain_accessor(&mut self, domain: Address) -> Address {
        let global = self.root_domain_global(domain);
        let function = self.alloc(0x10);
        let code = self.accessor_code(function, global);
        self.write(function, &code);
        function
    }

    pub fn memory(&self) -> SparseMemory {
        // Whole pages, so page-bounded string reads never run past the arena.
        let mut data = self.data.clone();
        data.resize(data.len().next_multiple_of(0x1000).max(0x1000), 0);

        let mut memory = SparseMemory::new();
        memory.map(Address::new(ARENA_BASE), data);
        memory
    }

    /// A whole target: the arena plus a runtime module at [`MODULE_BASE`]
    /// exporting `mono_get_root_domain` for `domain`.
    pub fn process(mut self, module_name: &str, domain: Address) -> SparseMemory {
        let global = self.root_domain_global(domain);
        let function = Address::new(MODULE_BASE) + ROOT_DOMAIN_RVA;
        let code = self.accessor_code(function, global);

        let image = PeBuilder::new()
            .export("mono_thread_attach", 0x1100)
            .export("mono_get_root_domain", ROOT_DOMAIN_RVA)
            .export("mono_class_get_name", 0x1300)
            .code(ROOT_DOMAIN_RVA, code)
            .build();

        let mut memory = self.memory();
        memory.add_module(ModuleInfo::new(module_name, Address::new(MODULE_BASE), image.len()));
        memory.map(Address::new(MODULE_BASE), image);
        memory
    }
}

impl Default for MonoBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ClassSpec<'a> {
    builder: &'a mut MonoBuilder,
    name: String,
    namespace: String,
    parent: Address,
    bits: ClassBits,
    flags: TypeAttributes,
    fields: Vec<(String, Address, i32)>,
    interfaces: Vec<Address>,
}

impl ClassSpec<'_> {
    pub fn namespace(mut self, namespace: &str) -> Self {
        self.namespace = namespace.to_string();
        self
    }

    pub fn parent(mut self, parent: Address) -> Self {
        self.parent = parent;
        self
    }

    pub fn value_type(mut self) -> Self {
        self.bits |= ClassBits::VALUETYPE;
        self
    }

    pub fn enum_type(mut self) -> Self {
        self.bits |= ClassBits::VALUETYPE | ClassBits::ENUMTYPE;
        self
    }

    pub fn interface(mut self) -> Self {
        self.flags |= TypeAttributes::INTERFACE | TypeAttributes::ABSTRACT;
        self
    }

    pub fn field(mut self, name: &str, mono_type: Address, offset: i32) -> Self {
        self.fields.push((name.to_string(), mono_type, offset));
        self
    }

    pub fn implements(mut self, interface: Address) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn finish(self) -> Address {
        let b = self.builder;
        let p = b.profile.clone();

        let class = b.alloc(p.class_read_len());
        let name = b.string(&self.name);
        b.write_ptr(class + p.class_name, name);
        if !self.namespace.is_empty() {
            let namespace = b.string(&self.namespace);
            b.write_ptr(class + p.class_namespace, namespace);
        }
        b.write_ptr(class + p.class_parent, self.parent);
        b.write(class + p.class_bit_fields, &[self.bits.bits()]);
        b.write(class + p.class_flags, &self.flags.bits().to_le_bytes());

        let token = b.next_token;
        b.next_token += 1;
        b.write(class + p.class_type_token, &token.to_le_bytes());

        if !self.fields.is_empty() {
            let array = b.alloc(self.fields.len() * p.field_stride as usize);
            for (index, (field_name, mono_type, offset)) in self.fields.iter().enumerate() {
                let slot = array + (index as u64 * p.field_stride as u64);
                let field_name = b.string(field_name);
                b.write_ptr(slot + p.field_type, *mono_type);
                b.write_ptr(slot + p.field_name, field_name);
                b.write(slot + p.field_offset, &offset.to_le_bytes());
            }
            b.write_ptr(class + p.class_fields, array);
            b.write(class + p.class_field_count, &(self.fields.len() as u32).to_le_bytes());
        }

        if !self.interfaces.is_empty() {
            let array = b.alloc(self.interfaces.len() * 8);
            for (index, interface) in self.interfaces.iter().enumerate() {
                b.write_ptr(array + (index * 8) as u64, *interface);
            }
            b.write_ptr(class + p.class_interfaces, array);
            b.write(class + p.class_interface_count, &(self.interfaces.len() as u16).to_le_bytes());
        }

        class
    }
}

/// A class named `name` with `Int32` fields at the given offsets.
pub fn type_def(name: &str, fields: &[(&str, i32)]) -> TypeDefinition {
    TypeDefinition {
        full_name: name.to_string(),
        name: name.to_string(),
        namespace: String::new(),
        class_kind: ClassKind::Class,
        parent: None,
        interfaces: Vec::new(),
        fields: fields
            .iter()
            .map(|(field, offset)| FieldDefinition {
                name: field.to_string(),
                field_type: "Int32".to_string(),
                offset: *offset,
                is_pointer: false,
                is_value_type: false,
                has_value: false,
                constant_value_type: None,
                declaring_type: name.to_string(),
            })
            .collect(),
    }
}
