// Sat Jan 31 2026 - Alex

pub mod compare;
pub mod report;

pub use compare::{diff, DiffResult, FieldChange, FieldDifference, TypeDifference};
pub use report::DiffSummary;
