// Tue Feb 03 2026 - Alex

use crate::model::{ClassKind, TypeDatabase};
use crate::query::is_system_type;
use ahash::AHashMap;
use indexmap::IndexMap;
use serde::Serialize;

const TOP_ENTRIES: usize = 20;
const COMPLEX_FIELD_COUNT: usize = 50;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TypeStatistics {
    pub total_types: usize,
    pub raw_class_count: usize,
    pub kinds: IndexMap<ClassKind, usize>,
    pub total_fields: usize,
    pub static_fields: usize,
    pub constant_fields: usize,
    pub largest_type: Option<(String, usize)>,
    pub average_fields: f64,
    pub system_types: usize,
    pub user_types: usize,
    pub top_namespaces: Vec<(String, usize)>,
    pub top_field_types: Vec<(String, usize)>,
    /// Over fifty fields, duplicates collapsed to their largest variant.
    pub complex_types: Vec<(String, usize)>,
    pub empty_types: Vec<String>,
}

impl TypeStatistics {
    pub fn collect(db: &TypeDatabase) -> Self {
        let mut stats = Self {
            total_types: db.len(),
            raw_class_count: db.raw_class_count,
            ..Default::default()
        };

        for kind in ClassKind::all() {
            stats.kinds.insert(kind, 0);
        }

        let mut namespaces: AHashMap<&str, usize> = AHashMap::new();
        let mut field_types: AHashMap<&str, usize> = AHashMap::new();
        let mut complex: AHashMap<&str, usize> = AHashMap::new();

        for ty in db.iter() {
            *stats.kinds.entry(ty.class_kind).or_insert(0) += 1;

            let count = ty.fields.len();
            stats.total_fields += count;
            if stats.largest_type.as_ref().map_or(true, |(_, max)| count > *max) {
                stats.largest_type = Some((ty.full_name.clone(), count));
            }
            if count == 0 {
                stats.empty_types.push(ty.full_name.clone());
            }
            if count > COMPLEX_FIELD_COUNT {
                let entry = complex.entry(ty.full_name.as_str()).or_insert(0);
                *entry = (*entry).max(count);
            }

            if is_system_type(&ty.full_name) {
                stats.system_types += 1;
            }

            let namespace = match ty.full_name.rfind('.') {
                Some(idx) => &ty.full_name[..idx],
                None => "<global>",
            };
            *namespaces.entry(namespace).or_insert(0) += 1;

            for field in &ty.fields {
                match field.constant_value_type.as_deref() {
                    Some("Static") => stats.static_fields += 1,
                    Some(_) => stats.constant_fields += 1,
                    None => {}
                }
                *field_types.entry(field.field_type.as_str()).or_insert(0) += 1;
            }
        }

        stats.user_types = stats.total_types - stats.system_types;
        if stats.total_types > 0 {
            stats.average_fields = stats.total_fields as f64 / stats.total_types as f64;
        }
        stats.top_namespaces = top(namespaces, TOP_ENTRIES);
        stats.top_field_types = top(field_types, TOP_ENTRIES);
        stats.complex_types = top(complex, usize::MAX);
        stats
    }

    pub fn count(&self, kind: ClassKind) -> usize {
        self.kinds.get(&kind).copied().unwrap_or(0)
    }

    pub fn system_percentage(&self) -> f64 {
        if self.total_types == 0 {
            0.0
        } else {
            self.system_types as f64 / self.total_types as f64 * 100.0
        }
    }
}

/// Highest counts first, names ascending on ties.
fn top(counts: AHashMap<&str, usize>, limit: usize) -> Vec<(String, usize)> {
    let mut entries: Vec<_> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    entries
        .into_iter()
        .take(limit)
        .map(|(name, count)| (name.to_string(), count))
        .collect()
}
