// Sat Jan 31 2026 - Alex

use crate::model::{FieldDefinition, TypeDatabase, TypeDefinition};
use itertools::{EitherOrBoth, Itertools};
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "Kind", rename_all = "PascalCase")]
pub enum FieldChange {
    #[serde(rename_all = "PascalCase")]
    OnlyInFirst { offset: i32, field_type: String },
    #[serde(rename_all = "PascalCase")]
    OnlyInSecond { offset: i32, field_type: String },
    #[serde(rename_all = "PascalCase")]
    Changed {
        old_offset: i32,
        new_offset: i32,
        old_type: String,
        new_type: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FieldDifference {
    pub name: String,
    pub change: FieldChange,
}

impl FieldDifference {
    pub fn offset_changed(&self) -> bool {
        matches!(self.change, FieldChange::Changed { old_offset, new_offset, .. } if old_offset != new_offset)
    }

    pub fn type_changed(&self) -> bool {
        matches!(&self.change, FieldChange::Changed { old_type, new_type, .. } if old_type != new_type)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TypeDifference {
    pub full_name: String,
    pub first_field_count: usize,
    pub second_field_count: usize,
    pub fields: Vec<FieldDifference>,
}

impl TypeDifference {
    pub fn field_count_changed(&self) -> bool {
        self.first_field_count != self.second_field_count
    }

    pub fn is_modified(&self) -> bool {
        self.field_count_changed() || !self.fields.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDifference> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Outcome of comparing two databases. Names are in ordinal order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DiffResult {
    pub only_in_first: Vec<String>,
    pub only_in_second: Vec<String>,
    pub modified: Vec<TypeDifference>,
    pub unchanged: usize,
}

impl DiffResult {
    pub fn is_identical(&self) -> bool {
        self.only_in_first.is_empty() && self.only_in_second.is_empty() && self.modified.is_empty()
    }

    pub fn modified_type(&self, full_name: &str) -> Option<&TypeDifference> {
        self.modified.iter().find(|t| t.full_name == full_name)
    }
}

/// Duplicate full names keep the variant with the most fields; the earlier
/// one wins a tie.
fn collapse_types(db: &TypeDatabase) -> BTreeMap<&str, &TypeDefinition> {
    let mut map: BTreeMap<&str, &TypeDefinition> = BTreeMap::new();
    for def in db.iter() {
        map.entry(def.full_name.as_str())
            .and_modify(|kept| {
                if def.fields.len() > kept.fields.len() {
                    *kept = def;
                }
            })
            .or_insert(def);
    }
    map
}

/// Duplicate field names keep the lowest offset; the earlier one wins a tie.
fn collapse_fields(def: &TypeDefinition) -> BTreeMap<&str, &FieldDefinition> {
    let mut map: BTreeMap<&str, &FieldDefinition> = BTreeMap::new();
    for field in &def.fields {
        map.entry(field.name.as_str())
            .and_modify(|kept| {
                if field.offset < kept.offset {
                    *kept = field;
                }
            })
            .or_insert(field);
    }
    map
}

fn diff_fields(first: &TypeDefinition, second: &TypeDefinition) -> TypeDifference {
    let a = collapse_fields(first);
    let b = collapse_fields(second);

    let fields = a
        .iter()
        .merge_join_by(b.iter(), |(x, _), (y, _)| x.cmp(y))
        .filter_map(|pair| {
            let (name, change) = match pair {
                EitherOrBoth::Left((name, old)) => (
                    name,
                    FieldChange::OnlyInFirst {
                        offset: old.offset,
                        field_type: old.field_type.clone(),
                    },
                ),
                EitherOrBoth::Right((name, new)) => (
                    name,
                    FieldChange::OnlyInSecond {
                        offset: new.offset,
                        field_type: new.field_type.clone(),
                    },
                ),
                EitherOrBoth::Both((name, old), (_, new)) => {
                    if old.offset == new.offset && old.field_type == new.field_type {
                        return None;
                    }
                    (
                        name,
                        FieldChange::Changed {
                            old_offset: old.offset,
                            new_offset: new.offset,
                            old_type: old.field_type.clone(),
                            new_type: new.field_type.clone(),
                        },
                    )
                }
            };
            Some(FieldDifference {
                name: name.to_string(),
                change,
            })
        })
        .collect();

    TypeDifference {
        full_name: first.full_name.clone(),
        first_field_count: first.fields.len(),
        second_field_count: second.fields.len(),
        fields,
    }
}

pub fn diff(first: &TypeDatabase, second: &TypeDatabase) -> DiffResult {
    let a = collapse_types(first);
    let b = collapse_types(second);
    let mut result = DiffResult::default();

    for pair in a.iter().merge_join_by(b.iter(), |(x, _), (y, _)| x.cmp(y)) {
        match pair {
            EitherOrBoth::Left((name, _)) => result.only_in_first.push(name.to_string()),
            EitherOrBoth::Right((name, _)) => result.only_in_second.push(name.to_string()),
            EitherOrBoth::Both((_, old), (_, new)) => {
                let difference = diff_fields(old, new);
                if difference.is_modified() {
                    result.modified.push(difference);
                } else {
                    result.unchanged += 1;
                }
            }
        }
    }

    debug!(
        "Diff: {} removed, {} added, {} modified, {} unchanged",
        result.only_in_first.len(),
        result.only_in_second.len(),
        result.modified.len(),
        result.unchanged
    );
    result
}
