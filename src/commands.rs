use std::path::Path;
use crate::{OutputMode, emit_json};
use roster::config::{self, RosterConfig};
use roster::export;
use roster::storage::RecordStore;
use roster::ui::{self, Icons};
use roster::{Error, RecordFilter, RecordInput, Value};

pub fn run_init(
    store: &RecordStore,
    output_mode: OutputMode,
    config_path: Option<&Path>,
    force: bool,
) -> anyhow::Result<()> {
    if let Some(path) = config_path {
        let config = RosterConfig {
            database: Some(store.location().to_string()),
        };
        config::write_config(path, &config, force)?;
    }

    if output_mode.is_human() {
        ui::success("Record store ready");
        ui::status(Icons::DATABASE, "Database", store.location());
        if let Some(path) = config_path {
            ui::status(Icons::FILE, "Config", &path.display().to_string());
        }
    } else {
        emit_json(&serde_json::json!({
            "database": store.location(),
            "attributes": store.current_attributes(),
        }))?;
    }
    Ok(())
}

pub fn run_columns(store: &RecordStore, output_mode: OutputMode) -> anyhow::Result<()> {
    let attributes = store.schema().attributes();
    if output_mode.is_human() {
        println!("{}", ui::attributes_table(attributes));
    } else {
        emit_json(&attributes)?;
    }
    Ok(())
}

/// Names come from a comma-separated list as typed by the user
pub fn run_add_columns(store: &mut RecordStore, output_mode: OutputMode, names: &str) -> anyhow::Result<()> {
    let names = split_names(names);
    if names.is_empty() {
        ui::warn("No column names given.");
        return Ok(());
    }

    let added = store.add_attributes(&names)?;

    if output_mode.is_human() {
        if added.is_empty() {
            ui::warn("All columns already exist.");
        } else {
            let list: Vec<&str> = added.iter().map(|a| a.name.as_str()).collect();
            ui::status(Icons::COLUMNS, "Columns added successfully", &list.join(", "));
        }
    } else {
        emit_json(&serde_json::json!({ "added": added, "attributes": store.current_attributes() }))?;
    }
    Ok(())
}

pub fn run_add(store: &RecordStore, output_mode: OutputMode, assignments: &[String]) -> anyhow::Result<()> {
    let record = parse_assignments(store, assignments)?;
    ensure_filled(store, &record)?;

    let id = store.insert(&record)?;

    if output_mode.is_human() {
        ui::success(&format!("Employee added successfully (ID {})", ui::number(&id.to_string())));
    } else {
        emit_json(&serde_json::json!({ "id": id }))?;
    }
    Ok(())
}

pub fn run_update(store: &RecordStore, output_mode: OutputMode, id: i64, assignments: &[String]) -> anyhow::Result<()> {
    if store.get_by_id(id)?.is_none() {
        return Err(Error::NotFound(id).into());
    }

    let record = parse_assignments(store, assignments)?;
    ensure_filled(store, &record)?;

    store.update(id, &record)?;

    if output_mode.is_human() {
        ui::success(&format!("Employee {} updated successfully", id));
    } else {
        emit_json(&store.get_by_id(id)?)?;
    }
    Ok(())
}

pub fn run_delete(store: &RecordStore, output_mode: OutputMode, id: i64) -> anyhow::Result<()> {
    let removed = store.delete(id)?;

    if output_mode.is_human() {
        if removed {
            ui::status(Icons::DELETE, "Employee deleted", &ui::number(&id.to_string()));
        } else {
            ui::warn(&format!("No employee with ID {}", id));
        }
    } else {
        emit_json(&serde_json::json!({ "id": id, "deleted": removed }))?;
    }
    Ok(())
}

pub fn run_get(store: &RecordStore, output_mode: OutputMode, id: i64) -> anyhow::Result<()> {
    let record = store.get_by_id(id)?.ok_or(Error::NotFound(id))?;

    if output_mode.is_human() {
        ui::header(&format!("Employee {}", id));
        for attribute in store.schema().attributes() {
            let value = record.get(&attribute.name).cloned().unwrap_or(Value::Null);
            ui::summary_row(&format!("{}:", attribute.label()), &value.to_string());
        }
    } else {
        emit_json(&record)?;
    }
    Ok(())
}

pub fn run_view(
    store: &RecordStore,
    output_mode: OutputMode,
    filter: &RecordFilter,
    csv: Option<&Path>,
) -> anyhow::Result<()> {
    let records = if filter.is_empty() {
        store.query_all()?
    } else {
        store.query_filtered(filter)?
    };

    if let Some(path) = csv {
        export::export_to_file(path, &store.current_attributes(), &records)?;
    }

    if output_mode.is_human() {
        if records.is_empty() {
            ui::warn("No employees found.");
        } else {
            if !filter.is_empty() {
                ui::info("Filter", &filter.to_string());
            }
            println!("{}", ui::records_table(store.schema().attributes(), &records));
            ui::summary_row("Total:", &ui::number(&records.len().to_string()));
        }
        if let Some(path) = csv {
            ui::status(Icons::FILE, "CSV written to", &path.display().to_string());
        }
    } else {
        emit_json(&records)?;
    }
    Ok(())
}

pub fn run_stats(store: &RecordStore, output_mode: OutputMode) -> anyhow::Result<()> {
    let stats = store.stats()?;

    if output_mode.is_human() {
        ui::header("Roster Statistics");
        let records = stats.records.to_string();
        let attributes = stats.attributes.to_string();
        println!(
            "{}",
            ui::stats_table(&[
                ("Records", records.as_str()),
                ("Attributes", attributes.as_str()),
                ("Database", stats.location.as_str()),
            ])
        );
    } else {
        emit_json(&serde_json::json!({
            "records": stats.records,
            "attributes": stats.attributes,
            "database": stats.location,
        }))?;
    }
    Ok(())
}

fn split_names(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `FIELD=VALUE` pairs, typing each value by its attribute's kind.
///
/// Unknown fields are kept as text so the store reports them.
fn parse_assignments(store: &RecordStore, assignments: &[String]) -> roster::Result<RecordInput> {
    let mut record = RecordInput::new();
    for assignment in assignments {
        let (field, raw) = assignment.split_once('=').ok_or_else(|| {
            Error::Validation(format!("expected FIELD=VALUE, got '{}'", assignment))
        })?;
        let field = field.trim();

        let numeric = store.schema().get(field).is_some_and(|a| a.is_numeric());
        let value = if numeric {
            let raw = raw.trim();
            if raw.is_empty() {
                Value::Null
            } else {
                let n: f64 = raw.parse().map_err(|_| {
                    Error::Validation(format!("'{}' is not a number for attribute '{}'", raw, field))
                })?;
                Value::Number(n)
            }
        } else {
            Value::Text(raw.to_string())
        };
        record.insert(field.to_string(), value);
    }
    Ok(record)
}

/// Refuse records with blank text fields
fn ensure_filled(store: &RecordStore, record: &RecordInput) -> roster::Result<()> {
    if has_blank_fields(store, record) {
        return Err(Error::Validation("Please fill out all fields.".to_string()));
    }
    Ok(())
}

/// Every supplied text field must be non-empty
fn has_blank_fields(store: &RecordStore, record: &RecordInput) -> bool {
    record.iter().any(|(name, value)| {
        let numeric = store.schema().get(name).is_some_and(|a| a.is_numeric());
        !numeric && value.is_blank()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_names() {
        assert_eq!(split_names(" bonus, nickname ,,office"), vec!["bonus", "nickname", "office"]);
        assert!(split_names(" , ").is_empty());
    }

    #[test]
    fn test_parse_assignments_types_values() {
        let store = RecordStore::open_in_memory().unwrap();
        let record = parse_assignments(
            &store,
            &["name=Ana".to_string(), "salary=70000".to_string(), "department=R&D=1".to_string()],
        )
        .unwrap();

        assert_eq!(record["name"], Value::from("Ana"));
        assert_eq!(record["salary"], Value::Number(70000.0));
        assert_eq!(record["department"], Value::from("R&D=1"));
    }

    #[test]
    fn test_parse_assignments_errors() {
        let store = RecordStore::open_in_memory().unwrap();
        assert!(matches!(
            parse_assignments(&store, &["name".to_string()]),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            parse_assignments(&store, &["salary=lots".to_string()]),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_blank_fields() {
        let store = RecordStore::open_in_memory().unwrap();
        let record = parse_assignments(&store, &["name= ".to_string(), "salary=".to_string()]).unwrap();
        assert!(has_blank_fields(&store, &record));

        let record = parse_assignments(&store, &["name=Ana".to_string(), "salary=".to_string()]).unwrap();
        assert!(!has_blank_fields(&store, &record));
    }

    #[test]
    fn test_blank_fields_fail_add_and_update() {
        let store = RecordStore::open_in_memory().unwrap();
        let blank = vec!["name=".to_string(), "department=Eng".to_string(), "salary=1".to_string()];

        let err = run_add(&store, OutputMode::Json, &blank).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Validation(_))));
        assert_eq!(store.count().unwrap(), 0);

        let full = vec!["name=Ana".to_string(), "department=Eng".to_string(), "salary=1".to_string()];
        run_add(&store, OutputMode::Json, &full).unwrap();

        let err = run_update(&store, OutputMode::Json, 1, &["department= ".to_string()]).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Validation(_))));
        let record = store.get_by_id(1).unwrap().unwrap();
        assert_eq!(record.get("department"), Some(&Value::from("Eng")));
    }
}
