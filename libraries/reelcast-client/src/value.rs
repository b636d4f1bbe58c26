//! Dynamic JSON tree for structured responses.

use crate::error::MediaError;

static NULL: DynamicValue = DynamicValue::Null;

/// A decoded JSON value.
///
/// This is the decoded form returned by structured-data requests when no
/// explicit serialization format was requested: JSON objects become
/// key/value entry lists accessible by key, arrays map element-wise, and
/// scalars pass through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicValue {
    /// JSON `null`
    Null,
    /// JSON boolean
    Bool(bool),
    /// JSON number, kept exact
    Number(serde_json::Number),
    /// JSON string
    String(String),
    /// JSON array
    Array(Vec<DynamicValue>),
    /// JSON object
    Object(Vec<(String, DynamicValue)>),
}

impl DynamicValue {
    /// Parses a JSON document into a dynamic tree.
    pub fn from_json(json: &str) -> Result<Self, MediaError> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| MediaError::Parse(format!("invalid JSON payload: {}", e)))?;
        Ok(Self::from(value))
    }

    /// The value stored under the given object key.
    pub fn get(&self, key: &str) -> Option<&DynamicValue> {
        match self {
            DynamicValue::Object(entries) => {
                entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
            }
            _ => None,
        }
    }

    /// The array element at the given index.
    pub fn at(&self, index: usize) -> Option<&DynamicValue> {
        self.as_array().and_then(|items| items.get(index))
    }

    /// The string payload, for string values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DynamicValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// The integer payload, for numbers representable as `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DynamicValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// The floating-point payload, for numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DynamicValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// The boolean payload, for booleans.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DynamicValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The elements, for arrays.
    pub fn as_array(&self) -> Option<&[DynamicValue]> {
        match self {
            DynamicValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// The entries, for objects.
    pub fn as_object(&self) -> Option<&[(String, DynamicValue)]> {
        match self {
            DynamicValue::Object(entries) => Some(entries),
            _ => None,
        }
    }

    /// Whether this value is JSON `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, DynamicValue::Null)
    }

    /// Array elements, or an empty iterator for non-arrays.
    pub fn members(&self) -> std::slice::Iter<'_, DynamicValue> {
        self.as_array().unwrap_or(&[]).iter()
    }

    /// Object entries, or an empty iterator for non-objects.
    pub fn entries(&self) -> std::slice::Iter<'_, (String, DynamicValue)> {
        self.as_object().unwrap_or(&[]).iter()
    }
}

impl From<serde_json::Value> for DynamicValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => DynamicValue::Null,
            serde_json::Value::Bool(b) => DynamicValue::Bool(b),
            serde_json::Value::Number(n) => DynamicValue::Number(n),
            serde_json::Value::String(s) => DynamicValue::String(s),
            serde_json::Value::Array(items) => {
                DynamicValue::Array(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => DynamicValue::Object(
                map.into_iter().map(|(k, v)| (k, Self::from(v))).collect(),
            ),
        }
    }
}

impl std::ops::Index<&str> for DynamicValue {
    type Output = DynamicValue;

    /// Key access, yielding `Null` for missing keys and non-objects.
    fn index(&self, key: &str) -> &DynamicValue {
        self.get(key).unwrap_or(&NULL)
    }
}

impl std::ops::Index<usize> for DynamicValue {
    type Output = DynamicValue;

    /// Element access, yielding `Null` for out-of-range indexes and
    /// non-arrays.
    fn index(&self, index: usize) -> &DynamicValue {
        self.at(index).unwrap_or(&NULL)
    }
}

/// Result of a structured-data request: raw serialized text when an
/// explicit format was requested, otherwise a decoded dynamic tree.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredData {
    /// The response body exactly as the server sent it
    Raw(String),
    /// The response decoded from JSON
    Decoded(DynamicValue),
}

impl StructuredData {
    /// The raw response text, when an explicit format was requested.
    pub fn raw(&self) -> Option<&str> {
        match self {
            StructuredData::Raw(text) => Some(text),
            StructuredData::Decoded(_) => None,
        }
    }

    /// Consumes the response, yielding the raw text.
    pub fn into_raw(self) -> Option<String> {
        match self {
            StructuredData::Raw(text) => Some(text),
            StructuredData::Decoded(_) => None,
        }
    }

    /// The decoded tree, when no explicit format was requested.
    pub fn decoded(&self) -> Option<&DynamicValue> {
        match self {
            StructuredData::Decoded(value) => Some(value),
            StructuredData::Raw(_) => None,
        }
    }

    /// Consumes the response, yielding the decoded tree.
    pub fn into_decoded(self) -> Option<DynamicValue> {
        match self {
            StructuredData::Decoded(value) => Some(value),
            StructuredData::Raw(_) => None,
        }
    }
}
