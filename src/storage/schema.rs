//! Database schema definitions and the in-memory schema registry

use crate::attribute::{self, Attribute};
use crate::{Error, Result};

/// Name of the single backing table
pub const EMPLOYEES_TABLE: &str = "employees";

/// SQL to create the employees table with its built-in columns
pub const CREATE_EMPLOYEES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS employees (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    department TEXT NOT NULL,
    salary REAL
)
"#;

/// SQL to list the columns of the employees table
pub const TABLE_INFO: &str = "PRAGMA table_info(employees)";

/// Quote an identifier for splicing into SQL.
///
/// Callers must have passed the name through [`attribute::validate_name`]
/// or taken it from the registry; quoting is the second line, not the first.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `ALTER TABLE` statement adding one attribute column
pub fn add_column_statement(attribute: &Attribute) -> String {
    format!(
        "ALTER TABLE {} ADD COLUMN {} {}",
        EMPLOYEES_TABLE,
        quote_ident(&attribute.name),
        attribute.kind.sql_type()
    )
}

/// Ordered attribute descriptors of the employees table, identifier excluded.
///
/// Loaded once from the database when the store opens and kept in step with
/// every schema change the store makes afterwards.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    attributes: Vec<Attribute>,
}

impl SchemaRegistry {
    /// Build from `(column name, declared type)` pairs as reported by the engine
    pub fn from_columns<I>(columns: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let builtin = Attribute::builtin();
        let attributes = columns
            .into_iter()
            .filter(|(name, _)| !name.eq_ignore_ascii_case("id"))
            .map(|(name, declared)| {
                builtin
                    .iter()
                    .find(|b| b.name == name)
                    .cloned()
                    .unwrap_or_else(|| Attribute {
                        kind: attribute::AttributeKind::from_declared_type(&declared),
                        name,
                        required: false,
                    })
            })
            .collect();
        Self { attributes }
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn names(&self) -> Vec<String> {
        self.attributes.iter().map(|a| a.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Exact-name lookup
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Membership as the engine sees it (column names are case-insensitive)
    pub fn contains(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.name.eq_ignore_ascii_case(name))
    }

    /// Work out which of `names` would be new columns.
    ///
    /// Every name is validated first; a single bad name rejects the whole
    /// batch. Names already present, and repeats within the batch, are dropped.
    pub fn plan_additions<'a, I>(&self, names: I) -> Result<Vec<Attribute>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut planned: Vec<Attribute> = Vec::new();
        for name in names {
            attribute::validate_name(name)?;
            if self.contains(name) || planned.iter().any(|a| a.name.eq_ignore_ascii_case(name)) {
                tracing::warn!("Attribute '{}' already exists, skipping", name);
                continue;
            }
            planned.push(Attribute::text(name));
        }
        Ok(planned)
    }

    /// Record attributes that have been committed to the database
    pub(crate) fn extend(&mut self, added: &[Attribute]) {
        self.attributes.extend(added.iter().cloned());
    }

    /// Ensure the built-in attributes are present after loading
    pub fn check_builtin(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::StorageUnavailable(format!(
                "table '{}' has no attribute columns",
                EMPLOYEES_TABLE
            )));
        }
        for builtin in Attribute::builtin() {
            if self.get(&builtin.name).is_none() {
                return Err(Error::StorageUnavailable(format!(
                    "table '{}' is missing the '{}' column",
                    EMPLOYEES_TABLE, builtin.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::AttributeKind;

    fn base_registry() -> SchemaRegistry {
        SchemaRegistry::from_columns(vec![
            ("id".to_string(), "INTEGER".to_string()),
            ("name".to_string(), "TEXT".to_string()),
            ("department".to_string(), "TEXT".to_string()),
            ("salary".to_string(), "REAL".to_string()),
            ("bonus".to_string(), "TEXT".to_string()),
        ])
    }

    #[test]
    fn test_from_columns_skips_id() {
        let registry = base_registry();
        assert_eq!(registry.names(), vec!["name", "department", "salary", "bonus"]);
        assert!(registry.get("name").unwrap().required);
        assert_eq!(registry.get("salary").unwrap().kind, AttributeKind::Numeric);
        assert_eq!(registry.get("bonus").unwrap().kind, AttributeKind::Text);
        assert!(registry.check_builtin().is_ok());
    }

    #[test]
    fn test_check_builtin_rejects_bare_table() {
        let registry = SchemaRegistry::from_columns(vec![("id".to_string(), "INTEGER".to_string())]);
        assert!(registry.is_empty());
        assert!(matches!(registry.check_builtin(), Err(Error::StorageUnavailable(_))));

        let partial = SchemaRegistry::from_columns(vec![("name".to_string(), "TEXT".to_string())]);
        assert!(matches!(partial.check_builtin(), Err(Error::StorageUnavailable(_))));
    }

    #[test]
    fn test_plan_additions_skips_existing_and_repeats() {
        let registry = base_registry();
        let planned = registry
            .plan_additions(["nickname", "bonus", "Nickname", "SALARY", "office"])
            .unwrap();
        let names: Vec<_> = planned.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["nickname", "office"]);
    }

    #[test]
    fn test_plan_additions_rejects_whole_batch() {
        let registry = base_registry();
        let result = registry.plan_additions(["nickname", "bad name"]);
        assert!(matches!(result, Err(Error::Schema(_))));
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("bonus"), "\"bonus\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
        assert_eq!(
            add_column_statement(&Attribute::text("bonus")),
            "ALTER TABLE employees ADD COLUMN \"bonus\" TEXT"
        );
    }
}
