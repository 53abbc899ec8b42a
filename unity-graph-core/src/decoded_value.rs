//! Decoded scalar and flow values
//!
//! Every `key: value` line of a Unity document decodes into a [`DecodedValue`].
//! The set of shapes is closed, so consumers match exhaustively instead of
//! probing dynamic types.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Document-local object identity (`&<fileID>` in a document header)
pub type FileId = i64;

/// A weak pointer to another object, by identity.
///
/// `file_id` names an object in the current document (or in the document
/// named by `guid`). Nothing guarantees the target exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Reference {
    #[serde(rename = "fileID")]
    pub file_id: FileId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<i64>,
}

impl Reference {
    /// A reference into the current document
    pub fn local(file_id: FileId) -> Self {
        Self {
            file_id,
            guid: None,
            asset_type: None,
        }
    }

    /// A reference into another asset
    pub fn external<S: Into<String>>(file_id: FileId, guid: S) -> Self {
        Self {
            file_id,
            guid: Some(guid.into()),
            asset_type: None,
        }
    }

    /// `{fileID: 0}` is Unity's spelling of "no object"
    pub fn is_null(&self) -> bool {
        self.file_id == 0 && self.guid.is_none()
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{fileID: {}", self.file_id)?;
        if let Some(guid) = &self.guid {
            write!(f, ", guid: {}", guid)?;
        }
        if let Some(asset_type) = self.asset_type {
            write!(f, ", type: {}", asset_type)?;
        }
        write!(f, "}}")
    }
}

/// A decoded Unity value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DecodedValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Reference(Reference),
    FlowMap(IndexMap<String, DecodedValue>),
    FlowSeq(Vec<DecodedValue>),
}

impl DecodedValue {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, DecodedValue::Null)
    }

    /// Get as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DecodedValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DecodedValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as float
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DecodedValue::Float(f) => Some(*f),
            DecodedValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DecodedValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as reference
    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            DecodedValue::Reference(r) => Some(r),
            _ => None,
        }
    }

    /// Get as flow map (block mappings decode to the same shape)
    pub fn as_map(&self) -> Option<&IndexMap<String, DecodedValue>> {
        match self {
            DecodedValue::FlowMap(map) => Some(map),
            _ => None,
        }
    }

    /// Get as flow sequence (block sequences decode to the same shape)
    pub fn as_seq(&self) -> Option<&[DecodedValue]> {
        match self {
            DecodedValue::FlowSeq(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a key when this value is a map
    pub fn get(&self, key: &str) -> Option<&DecodedValue> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Unity writes booleans as `0`/`1`; both spellings count here
    pub fn is_truthy(&self) -> bool {
        match self {
            DecodedValue::Null => false,
            DecodedValue::Bool(b) => *b,
            DecodedValue::Integer(i) => *i != 0,
            DecodedValue::Float(f) => *f != 0.0,
            DecodedValue::String(s) => !s.is_empty(),
            DecodedValue::Reference(_) | DecodedValue::FlowMap(_) | DecodedValue::FlowSeq(_) => {
                true
            }
        }
    }

    /// The `fileID` carried by a reference, or by a map with a numeric `fileID` key
    pub fn file_id(&self) -> Option<FileId> {
        match self {
            DecodedValue::Reference(r) => Some(r.file_id),
            DecodedValue::FlowMap(map) => map.get("fileID").and_then(DecodedValue::as_i64),
            _ => None,
        }
    }

    /// Name of the variant, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            DecodedValue::Null => "null",
            DecodedValue::Bool(_) => "bool",
            DecodedValue::Integer(_) => "integer",
            DecodedValue::Float(_) => "float",
            DecodedValue::String(_) => "string",
            DecodedValue::Reference(_) => "reference",
            DecodedValue::FlowMap(_) => "map",
            DecodedValue::FlowSeq(_) => "sequence",
        }
    }
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedValue::Null => write!(f, "~"),
            DecodedValue::Bool(b) => write!(f, "{}", b),
            DecodedValue::Integer(i) => write!(f, "{}", i),
            // keep a fractional part so the text decodes back to a float
            DecodedValue::Float(fl) if fl.is_finite() && fl.fract() == 0.0 && fl.abs() < 1e15 => {
                write!(f, "{:.1}", fl)
            }
            DecodedValue::Float(fl) => write!(f, "{}", fl),
            DecodedValue::String(s) => write!(f, "{}", s),
            DecodedValue::Reference(r) => write!(f, "{}", r),
            DecodedValue::FlowSeq(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            DecodedValue::FlowMap(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for DecodedValue {
    fn from(b: bool) -> Self {
        DecodedValue::Bool(b)
    }
}

impl From<i32> for DecodedValue {
    fn from(i: i32) -> Self {
        DecodedValue::Integer(i as i64)
    }
}

impl From<i64> for DecodedValue {
    fn from(i: i64) -> Self {
        DecodedValue::Integer(i)
    }
}

impl From<f64> for DecodedValue {
    fn from(f: f64) -> Self {
        DecodedValue::Float(f)
    }
}

impl From<String> for DecodedValue {
    fn from(s: String) -> Self {
        DecodedValue::String(s)
    }
}

impl From<&str> for DecodedValue {
    fn from(s: &str) -> Self {
        DecodedValue::String(s.to_string())
    }
}

impl From<Reference> for DecodedValue {
    fn from(r: Reference) -> Self {
        DecodedValue::Reference(r)
    }
}

impl From<Vec<DecodedValue>> for DecodedValue {
    fn from(items: Vec<DecodedValue>) -> Self {
        DecodedValue::FlowSeq(items)
    }
}

impl From<IndexMap<String, DecodedValue>> for DecodedValue {
    fn from(map: IndexMap<String, DecodedValue>) -> Self {
        DecodedValue::FlowMap(map)
    }
}
