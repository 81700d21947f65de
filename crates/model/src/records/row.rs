use crate::core::value::{FieldValue, Value};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RowData {
    pub entity: String,
    pub field_values: Vec<FieldValue>,
}

impl RowData {
    pub fn new(entity: &str, field_values: Vec<FieldValue>) -> Self {
        RowData {
            entity: entity.to_string(),
            field_values,
        }
    }

    /// Builds a row from a flat JSON object. Keys become field names.
    pub fn from_json_object(entity: &str, object: &serde_json::Map<String, serde_json::Value>) -> Self {
        let field_values = object
            .iter()
            .map(|(name, value)| FieldValue::new(name, Value::from_json(value)))
            .collect();
        RowData::new(entity, field_values)
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.field_values
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(field))
    }

    /// Looks up `qualifier.field` first, then the bare field name.
    pub fn get_qualified(&self, qualifier: Option<&str>, field: &str) -> Option<&FieldValue> {
        qualifier
            .and_then(|q| self.get(&format!("{q}.{field}")))
            .or_else(|| self.get(field))
    }

    pub fn get_value(&self, field: &str) -> Value {
        self.get(field)
            .and_then(|f| f.value.clone())
            .unwrap_or(Value::Null)
    }
}
