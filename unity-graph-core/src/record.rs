//! Raw records
//!
//! One [`RawRecord`] per `--- !u!<classID> &<fileID>` block of a document,
//! holding the decoded fields in the order they were written.

use crate::constants::classify;
use crate::decoded_value::{DecodedValue, FileId};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// A single document block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawRecord {
    /// Class ID from the `!u!` tag
    pub class_id: u32,
    /// Identity from the `&` anchor
    pub file_id: FileId,
    /// Top-level key under the header (`GameObject`, `Transform`, ...)
    pub class_name: Option<String>,
    /// Header carried the ` stripped` suffix
    pub stripped: bool,
    /// Decoded fields, in document order
    pub fields: IndexMap<String, DecodedValue>,
}

impl RawRecord {
    /// Create an empty record
    pub fn new(class_id: u32, file_id: FileId) -> Self {
        Self {
            class_id,
            file_id,
            class_name: None,
            stripped: false,
            fields: IndexMap::new(),
        }
    }

    /// Get a field value
    pub fn get(&self, key: &str) -> Option<&DecodedValue> {
        self.fields.get(key)
    }

    /// Set a field value. A repeated key replaces the earlier value.
    pub fn set<V: Into<DecodedValue>>(&mut self, key: String, value: V) {
        self.fields.insert(key, value.into());
    }

    /// Check if a field exists
    pub fn has_field(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Get the object name (`m_Name`), if it is a string
    pub fn name(&self) -> Option<&str> {
        self.get("m_Name").and_then(DecodedValue::as_str)
    }

    /// Semantic type name from the class ID table
    pub fn type_name(&self) -> String {
        classify(self.class_id)
    }
}

impl fmt::Display for RawRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.class_name {
            Some(name) => write!(f, "{}({}) &{}", name, self.class_id, self.file_id),
            None => write!(f, "!u!{} &{}", self.class_id, self.file_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_fields() {
        let mut record = RawRecord::new(1, 100);
        record.set("m_Name".to_string(), "Player");
        record.set("m_Layer".to_string(), 0);
        record.set("m_Layer".to_string(), 5);

        assert_eq!(record.name(), Some("Player"));
        assert_eq!(record.get("m_Layer"), Some(&DecodedValue::Integer(5)));
        assert_eq!(record.fields.len(), 2);
        assert_eq!(record.type_name(), "GameObject");
    }

    #[test]
    fn test_record_display() {
        let mut record = RawRecord::new(4, 400);
        assert_eq!(record.to_string(), "!u!4 &400");
        record.class_name = Some("Transform".to_string());
        assert_eq!(record.to_string(), "Transform(4) &400");
    }
}
