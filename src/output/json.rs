// Mon Feb 02 2026 - Alex

use super::GENERATOR;
use crate::model::{ClassKind, TypeDatabase};
use serde::Serialize;

/// Flattened JSON view for external tools; not a cache format.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct JsonExport<'a> {
    pub generated_by: &'static str,
    pub type_count: usize,
    pub raw_class_count: usize,
    pub types: Vec<JsonType<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct JsonType<'a> {
    pub name: &'a str,
    pub kind: ClassKind,
    pub parent: Option<&'a str>,
    pub is_value_type: bool,
    pub fields: Vec<JsonField<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct JsonField<'a> {
    pub name: &'a str,
    #[serde(rename = "Type")]
    pub field_type: &'a str,
    pub offset: i32,
}

impl<'a> JsonExport<'a> {
    pub fn from_database(db: &'a TypeDatabase) -> Self {
        let types = db
            .iter()
            .map(|ty| JsonType {
                name: &ty.full_name,
                kind: ty.class_kind,
                parent: ty.parent.as_ref().map(|p| p.full_name.as_str()),
                is_value_type: matches!(ty.class_kind, ClassKind::Struct | ClassKind::Enum),
                fields: ty
                    .fields
                    .iter()
                    .map(|f| JsonField {
                        name: &f.name,
                        field_type: &f.field_type,
                        offset: f.offset,
                    })
                    .collect(),
            })
            .collect();

        Self {
            generated_by: GENERATOR,
            type_count: db.len(),
            raw_class_count: db.raw_class_count,
            types,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::type_def;

    #[test]
    fn test_json_shape() {
        let mut vector = type_def("UnityEngine.Vector3", &[("x", 0), ("y", 4)]);
        vector.class_kind = ClassKind::Struct;
        let db = TypeDatabase::new(vec![vector], 5);

        let json = JsonExport::from_database(&db).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["TypeCount"], 1);
        assert_eq!(value["RawClassCount"], 5);
        assert_eq!(value["Types"][0]["Name"], "UnityEngine.Vector3");
        assert_eq!(value["Types"][0]["IsValueType"], true);
        assert_eq!(value["Types"][0]["Fields"][1]["Type"], "Int32");
        assert_eq!(value["Types"][0]["Fields"][1]["Offset"], 4);
    }
}
