// Wed Jan 15 2026 - Alex

use crate::memory::{Address, MemoryError};
use std::fmt;

const PAGE_SIZE: u64 = 0x1000;

/// Raw read access to a target address space.
///
/// Implementations return exactly `len` bytes or an error naming the address
/// and length. A partial buffer is never handed back.
pub trait MemoryReader: Send + Sync {
    fn read_bytes(&self, addr: Address, len: usize) -> Result<Vec<u8>, MemoryError>;
}

/// A fixed-layout little-endian value that can be decoded from raw bytes.
pub trait Decode: Sized {
    const SIZE: usize;

    fn decode(bytes: &[u8]) -> Self;
}

macro_rules! impl_decode {
    ($($ty:ty),*) => {
        $(
            impl Decode for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                fn decode(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(&bytes[..Self::SIZE]);
                    <$ty>::from_le_bytes(raw)
                }
            }
        )*
    };
}

impl_decode!(u8, u16, u32, u64, i8, i16, i32, i64);

impl Decode for Address {
    const SIZE: usize = 8;

    fn decode(bytes: &[u8]) -> Self {
        Address::new(u64::decode(bytes))
    }
}

/// Typed helpers layered over [`MemoryReader::read_bytes`].
pub trait MemoryReaderExt: MemoryReader {
    fn read_exact(&self, addr: Address, len: usize) -> Result<Vec<u8>, MemoryError> {
        let bytes = self.read_bytes(addr, len)?;
        if bytes.len() != len {
            return Err(MemoryError::ShortRead {
                address: addr,
                len,
                got: bytes.len(),
            });
        }
        Ok(bytes)
    }

    fn read_typed<T: Decode>(&self, addr: Address) -> Result<T, MemoryError> {
        let bytes = self.read_exact(addr, T::SIZE)?;
        Ok(T::decode(&bytes))
    }

    fn read_u8(&self, addr: Address) -> Result<u8, MemoryError> {
        self.read_typed(addr)
    }

    fn read_u16(&self, addr: Address) -> Result<u16, MemoryError> {
        self.read_typed(addr)
    }

    fn read_u32(&self, addr: Address) -> Result<u32, MemoryError> {
        self.read_typed(addr)
    }

    fn read_i32(&self, addr: Address) -> Result<i32, MemoryError> {
        self.read_typed(addr)
    }

    fn read_u64(&self, addr: Address) -> Result<u64, MemoryError> {
        self.read_typed(addr)
    }

    fn read_ptr(&self, addr: Address) -> Result<Address, MemoryError> {
        self.read_typed(addr)
    }

    /// Reads a NUL-terminated string of at most `max_len` bytes.
    ///
    /// Reads are split at page boundaries so a short string sitting at the
    /// end of a mapping does not fault on the page after it.
    fn read_c_string(&self, addr: Address, max_len: usize) -> Result<String, MemoryError> {
        let mut bytes = Vec::new();
        let mut current = addr;

        while bytes.len() < max_len {
            let chunk = (current.distance_to_boundary(PAGE_SIZE) as usize).min(max_len - bytes.len());
            let data = self.read_exact(current, chunk)?;
            if let Some(end) = data.iter().position(|&b| b == 0) {
                bytes.extend_from_slice(&data[..end]);
                return Ok(String::from_utf8_lossy(&bytes).into_owned());
            }
            bytes.extend_from_slice(&data);
            current = current + chunk as u64;
        }

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl<R: MemoryReader + ?Sized> MemoryReaderExt for R {}

/// A loaded module inside the target process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    pub name: String,
    pub base: Address,
    pub size: usize,
}

impl ModuleInfo {
    pub fn new(name: &str, base: Address, size: usize) -> Self {
        Self {
            name: name.to_string(),
            base,
            size,
        }
    }
}

impl fmt::Display for ModuleInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (base: {}, size: 0x{:x})", self.name, self.base, self.size)
    }
}

/// A memory-access backend: something that can attach to a process, locate
/// its modules and read its memory.
pub trait MemoryBackend: MemoryReader {
    fn name(&self) -> &'static str;

    fn attach(&mut self, process: &str) -> Result<(), MemoryError>;

    fn resolve_module(&self, name: &str) -> Result<ModuleInfo, MemoryError>;

    /// Drops whatever the backend holds on the target. Must be idempotent.
    fn release(&mut self);
}
