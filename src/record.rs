//! Record types - employee rows and their attribute values

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute values keyed by attribute name, as supplied by callers.
pub type RecordInput = BTreeMap<String, Value>;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Number(f64),
    Text(String),
}

impl Value {
    /// True for null and for text that is empty after trimming
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.trim().is_empty(),
            Value::Number(_) => false,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Convert to a storage value for parameter binding
    pub(crate) fn to_sql(&self) -> rusqlite::types::Value {
        match self {
            Value::Null => rusqlite::types::Value::Null,
            Value::Number(n) => rusqlite::types::Value::Real(*n),
            Value::Text(s) => rusqlite::types::Value::Text(s.clone()),
        }
    }

    /// Convert from a value read out of a row
    pub(crate) fn from_sql(value: rusqlite::types::Value) -> Self {
        match value {
            rusqlite::types::Value::Null => Value::Null,
            rusqlite::types::Value::Integer(i) => Value::Number(i as f64),
            rusqlite::types::Value::Real(f) => Value::Number(f),
            rusqlite::types::Value::Text(s) => Value::Text(s),
            rusqlite::types::Value::Blob(b) => Value::Text(String::from_utf8_lossy(&b).into_owned()),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => Ok(()),
            // f64 Display already drops a trailing ".0"
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One employee entry: a store-assigned id plus its attribute values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    #[serde(flatten)]
    pub values: RecordInput,
}

impl Record {
    pub fn new(id: i64, values: RecordInput) -> Self {
        Self { id, values }
    }

    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.values.get(attribute)
    }

    pub fn salary(&self) -> Option<f64> {
        self.get("salary").and_then(Value::as_f64)
    }

    /// Values in the given attribute order, missing ones as null
    pub fn values_in<'a>(&'a self, attributes: &'a [String]) -> impl Iterator<Item = &'a Value> + 'a {
        attributes
            .iter()
            .map(|a| self.values.get(a).unwrap_or(&Value::Null))
    }
}
