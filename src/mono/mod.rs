// Thu Jan 22 2026 - Alex

pub mod class;
pub mod class_table;
pub mod domain;
pub mod error;
pub mod offsets;
pub mod types;

pub use class::{ConstantKind, FieldRecord, RawClassRecord};
pub use class_table::{walk_class_table, ClassTable};
pub use domain::{find_assembly_image, root_domain, AssemblyMatch};
pub use error::WalkError;
pub use offsets::{OffsetsProfile, ProfileError};
pub use types::{ClassBits, FieldAttributes, MonoType, TypeAttributes, TypeCode};
