//! Attribute descriptors - the columns of an employee record
//!
//! Every record carries three built-in attributes:
//! - `name`: required text
//! - `department`: required text
//! - `salary`: optional number
//!
//! Further attributes are added at runtime and are always free text.

use crate::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Longest attribute name accepted by [`validate_name`].
pub const MAX_NAME_LEN: usize = 64;

/// Column names owned by the storage engine or by the store itself.
pub const RESERVED_NAMES: &[&str] = &["id", "rowid", "oid", "_rowid_"];

static NAME_PATTERN: OnceLock<Regex> = OnceLock::new();

fn name_pattern() -> &'static Regex {
    NAME_PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("attribute name pattern is valid")
    })
}

/// Storage semantics of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    /// Stored as REAL, may be null
    Numeric,
    /// Stored as TEXT
    Text,
}

impl AttributeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeKind::Numeric => "numeric",
            AttributeKind::Text => "text",
        }
    }

    /// SQL column type used when the column is created
    pub fn sql_type(&self) -> &'static str {
        match self {
            AttributeKind::Numeric => "REAL",
            AttributeKind::Text => "TEXT",
        }
    }

    /// Map a declared SQLite column type back to a kind.
    ///
    /// Follows SQLite's affinity rules loosely: anything that would get
    /// REAL, INTEGER or NUMERIC affinity is numeric.
    pub fn from_declared_type(declared: &str) -> Self {
        let upper = declared.to_ascii_uppercase();
        if upper.contains("INT")
            || upper.contains("REAL")
            || upper.contains("FLOA")
            || upper.contains("DOUB")
            || upper.contains("NUM")
            || upper.contains("DEC")
        {
            AttributeKind::Numeric
        } else {
            AttributeKind::Text
        }
    }
}

impl std::fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named field of an employee record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub kind: AttributeKind,
    /// Whether a record must carry a non-null value for this attribute
    pub required: bool,
}

impl Attribute {
    /// A dynamically added, optional text attribute
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Text,
            required: false,
        }
    }

    /// The attributes every employee table starts with
    pub fn builtin() -> Vec<Attribute> {
        vec![
            Attribute {
                name: "name".to_string(),
                kind: AttributeKind::Text,
                required: true,
            },
            Attribute {
                name: "department".to_string(),
                kind: AttributeKind::Text,
                required: true,
            },
            Attribute {
                name: "salary".to_string(),
                kind: AttributeKind::Numeric,
                required: false,
            },
        ]
    }

    pub fn is_numeric(&self) -> bool {
        self.kind == AttributeKind::Numeric
    }

    /// Human label for forms and table headers ("department" -> "Department")
    pub fn label(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Check a caller-supplied attribute name against the identifier allow-list.
///
/// Only names that pass here are ever spliced into SQL.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Schema("Attribute name is empty".to_string()));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(Error::Schema(format!(
            "Attribute name '{}' is longer than {} characters",
            name, MAX_NAME_LEN
        )));
    }
    if !name_pattern().is_match(name) {
        return Err(Error::Schema(format!(
            "Attribute name '{}' may only contain letters, digits and underscores, and must not start with a digit",
            name
        )));
    }
    if is_reserved(name) {
        return Err(Error::Schema(format!("Attribute name '{}' is reserved", name)));
    }
    Ok(())
}

/// Reserved names, compared case-insensitively like SQLite does.
pub fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.iter().any(|r| r.eq_ignore_ascii_case(name))
        || name.to_ascii_lowercase().starts_with("sqlite_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(validate_name("bonus").is_ok());
        assert!(validate_name("start_date").is_ok());
        assert!(validate_name("_internal2").is_ok());
    }

    #[test]
    fn test_unsafe_names_rejected() {
        assert!(matches!(validate_name(""), Err(Error::Schema(_))));
        assert!(matches!(validate_name("2fast"), Err(Error::Schema(_))));
        assert!(matches!(validate_name("nick name"), Err(Error::Schema(_))));
        assert!(matches!(validate_name("x; DROP TABLE employees"), Err(Error::Schema(_))));
        assert!(matches!(validate_name("a\"b"), Err(Error::Schema(_))));
        assert!(validate_name(&"a".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_reserved_names_rejected() {
        assert!(validate_name("id").is_err());
        assert!(validate_name("ID").is_err());
        assert!(validate_name("rowid").is_err());
        assert!(validate_name("sqlite_master").is_err());
    }

    #[test]
    fn test_kind_from_declared_type() {
        assert_eq!(AttributeKind::from_declared_type("real"), AttributeKind::Numeric);
        assert_eq!(AttributeKind::from_declared_type("INTEGER"), AttributeKind::Numeric);
        assert_eq!(AttributeKind::from_declared_type("TEXT"), AttributeKind::Text);
        assert_eq!(AttributeKind::from_declared_type(""), AttributeKind::Text);
    }

    #[test]
    fn test_label() {
        assert_eq!(Attribute::text("nickname").label(), "Nickname");
        assert_eq!(Attribute::builtin()[2].label(), "Salary");
    }
}
