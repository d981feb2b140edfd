//! SQLite storage implementation

use std::path::Path;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use crate::attribute::{Attribute, AttributeKind};
use crate::query::RecordFilter;
use crate::record::{Record, RecordInput, Value};
use crate::{Error, Result};
use super::schema::{self, SchemaRegistry};

/// SQLite-backed store for employee records.
///
/// Owns its connection for the lifetime of the store; the schema registry
/// mirrors the columns of the employees table.
pub struct RecordStore {
    conn: Connection,
    schema: SchemaRegistry,
    location: String,
}

impl RecordStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| {
            Error::StorageUnavailable(format!("cannot open {}: {}", path.display(), e))
        })?;
        let mut store = Self {
            conn,
            schema: SchemaRegistry::default(),
            location: path.display().to_string(),
        };
        store.initialize()?;
        tracing::info!("Opened record store at {}", store.location);
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::StorageUnavailable(format!("cannot open in-memory database: {}", e)))?;
        let mut store = Self {
            conn,
            schema: SchemaRegistry::default(),
            location: ":memory:".to_string(),
        };
        store.initialize()?;
        Ok(store)
    }

    /// Create the employees table if absent and load the schema registry.
    ///
    /// Safe to call repeatedly; an existing table is reused as-is.
    pub fn initialize(&mut self) -> Result<()> {
        self.conn
            .execute(schema::CREATE_EMPLOYEES_TABLE, [])
            .map_err(|e| Error::StorageUnavailable(format!("cannot create table: {}", e)))?;

        let registry = self
            .load_schema()
            .map_err(|e| Error::StorageUnavailable(format!("cannot read table schema: {}", e)))?;
        registry.check_builtin()?;

        tracing::debug!("Loaded schema with {} attributes", registry.len());
        self.schema = registry;
        Ok(())
    }

    fn load_schema(&self) -> rusqlite::Result<SchemaRegistry> {
        let mut stmt = self.conn.prepare(schema::TABLE_INFO)?;
        let columns = stmt
            .query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, String>(2)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(SchemaRegistry::from_columns(columns))
    }

    /// Close the connection, surfacing any error SQLite reports on shutdown
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| Error::Storage(e))
    }

    /// Where the database lives (a file path or `:memory:`)
    pub fn location(&self) -> &str {
        &self.location
    }

    // ========== Schema Operations ==========

    pub fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    /// Ordered names of all non-identifier columns
    pub fn current_attributes(&self) -> Vec<String> {
        self.schema.names()
    }

    /// Add a text column for each name not already present.
    ///
    /// Existing names are skipped. If any name is invalid nothing is
    /// changed. All columns are added in one transaction. Returns the
    /// attributes that were actually added.
    pub fn add_attributes<I, S>(&mut self, names: I) -> Result<Vec<Attribute>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = names.into_iter().map(|n| n.as_ref().to_string()).collect();
        let planned = self.schema.plan_additions(names.iter().map(String::as_str))?;
        if planned.is_empty() {
            return Ok(planned);
        }

        let tx = self.conn.transaction()?;
        for attribute in &planned {
            let sql = schema::add_column_statement(attribute);
            tracing::debug!("{}", sql);
            tx.execute(&sql, [])?;
        }
        tx.commit()?;

        self.schema.extend(&planned);
        tracing::info!(
            "Added attributes: {}",
            planned.iter().map(|a| a.name.as_str()).collect::<Vec<_>>().join(", ")
        );
        Ok(planned)
    }

    // ========== Record Operations ==========

    /// Insert a record carrying a value for every current attribute.
    ///
    /// Returns the id assigned by the store.
    pub fn insert(&self, record: &RecordInput) -> Result<i64> {
        self.validate(record, true)?;

        let attributes = self.schema.attributes();
        let columns: Vec<String> = attributes.iter().map(|a| schema::quote_ident(&a.name)).collect();
        let placeholders: Vec<String> = (1..=attributes.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            schema::EMPLOYEES_TABLE,
            columns.join(", "),
            placeholders.join(", ")
        );
        let values: Vec<rusqlite::types::Value> = attributes
            .iter()
            .map(|a| record.get(&a.name).unwrap_or(&Value::Null).to_sql())
            .collect();

        tracing::debug!("{}", sql);
        self.conn.execute(&sql, params_from_iter(values))?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!("Inserted record {}", id);
        Ok(id)
    }

    /// Overwrite the given attributes of an existing record
    pub fn update(&self, id: i64, record: &RecordInput) -> Result<()> {
        self.validate(record, false)?;

        // Schema order keeps the statement text stable for a given key set
        let touched: Vec<&Attribute> = self
            .schema
            .attributes()
            .iter()
            .filter(|a| record.contains_key(&a.name))
            .collect();
        let assignments: Vec<String> = touched
            .iter()
            .enumerate()
            .map(|(i, a)| format!("{} = ?{}", schema::quote_ident(&a.name), i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            schema::EMPLOYEES_TABLE,
            assignments.join(", "),
            touched.len() + 1
        );
        let mut values: Vec<rusqlite::types::Value> = touched
            .iter()
            .map(|a| record[&a.name].to_sql())
            .collect();
        values.push(rusqlite::types::Value::Integer(id));

        tracing::debug!("{}", sql);
        let changed = self.conn.execute(&sql, params_from_iter(values))?;
        if changed == 0 {
            return Err(Error::NotFound(id));
        }
        Ok(())
    }

    /// Delete a record. Returns whether a row was removed; deleting an
    /// absent id is not an error.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let changed = self.conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", schema::EMPLOYEES_TABLE),
            params![id],
        )?;
        if changed == 0 {
            tracing::debug!("Delete of record {} affected no rows", id);
        }
        Ok(changed > 0)
    }

    /// Get a record by id
    pub fn get_by_id(&self, id: i64) -> Result<Option<Record>> {
        let sql = format!("{} WHERE id = ?1", self.select_clause());
        self.conn
            .query_row(&sql, params![id], |row| self.row_to_record(row))
            .optional()
            .map_err(Into::into)
    }

    /// Every record, ordered by id
    pub fn query_all(&self) -> Result<Vec<Record>> {
        self.query_filtered(&RecordFilter::default())
    }

    /// Records matching every predicate of the filter, ordered by id
    pub fn query_filtered(&self, filter: &RecordFilter) -> Result<Vec<Record>> {
        filter.validate()?;

        let mut sql = self.select_clause();
        let mut conditions: Vec<String> = Vec::new();
        let mut values: Vec<rusqlite::types::Value> = Vec::new();

        if let Some(department) = filter.department_predicate() {
            values.push(rusqlite::types::Value::Text(department.to_string()));
            conditions.push(format!("department = ?{}", values.len()));
        }
        if let Some(min) = filter.min_salary {
            values.push(rusqlite::types::Value::Real(min));
            conditions.push(format!("salary >= ?{}", values.len()));
        }
        if let Some(max) = filter.max_salary {
            values.push(rusqlite::types::Value::Real(max));
            conditions.push(format!("salary <= ?{}", values.len()));
        }

        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY id");

        tracing::debug!("{} [filter: {}]", sql, filter);
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(values), |row| self.row_to_record(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// Count all records
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", schema::EMPLOYEES_TABLE),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Get store statistics
    pub fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            records: self.count()?,
            attributes: self.schema.len(),
            location: self.location.clone(),
        })
    }

    /// `SELECT id, <attributes> FROM employees`
    fn select_clause(&self) -> String {
        let mut columns = vec!["id".to_string()];
        columns.extend(self.schema.attributes().iter().map(|a| schema::quote_ident(&a.name)));
        format!("SELECT {} FROM {}", columns.join(", "), schema::EMPLOYEES_TABLE)
    }

    /// Helper to convert a row to a Record
    fn row_to_record(&self, row: &rusqlite::Row) -> rusqlite::Result<Record> {
        let id: i64 = row.get(0)?;
        let mut values = RecordInput::new();
        for (i, attribute) in self.schema.attributes().iter().enumerate() {
            let raw: rusqlite::types::Value = row.get(i + 1)?;
            values.insert(attribute.name.clone(), Value::from_sql(raw));
        }
        Ok(Record::new(id, values))
    }

    /// Check a caller-supplied record against the schema.
    ///
    /// With `complete`, the key set must equal the schema; otherwise it must
    /// be a non-empty subset of it.
    fn validate(&self, record: &RecordInput, complete: bool) -> Result<()> {
        if let Some(unknown) = record.keys().find(|k| self.schema.get(k).is_none()) {
            return Err(Error::Validation(format!("unknown attribute '{}'", unknown)));
        }
        if complete {
            if let Some(missing) = self
                .schema
                .attributes()
                .iter()
                .find(|a| !record.contains_key(&a.name))
            {
                return Err(Error::Validation(format!(
                    "missing value for attribute '{}'",
                    missing.name
                )));
            }
        } else if record.is_empty() {
            return Err(Error::Validation("no attributes to update".to_string()));
        }

        for (name, value) in record {
            let Some(attribute) = self.schema.get(name) else { continue };
            let ok = match (attribute.kind, value) {
                (_, Value::Null) => !attribute.required,
                (AttributeKind::Numeric, Value::Number(n)) => n.is_finite(),
                (AttributeKind::Text, Value::Text(_)) => true,
                _ => false,
            };
            if !ok {
                return Err(Error::Validation(format!(
                    "value {:?} is not valid for {} attribute '{}'{}",
                    value,
                    attribute.kind,
                    name,
                    if attribute.required { " (required)" } else { "" }
                )));
            }
        }
        Ok(())
    }
}

/// Store statistics
#[derive(Debug, Clone)]
pub struct StoreStats {
    pub records: usize,
    pub attributes: usize,
    pub location: String,
}
