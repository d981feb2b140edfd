//! CSV export of query results
//!
//! Header is `id` followed by the attribute names in schema order; one row
//! per record in result order.

use std::io::Write;
use std::path::Path;
use crate::record::Record;
use crate::Result;

/// Render records as CSV
pub fn to_csv(attributes: &[String], records: &[Record]) -> String {
    let mut output = String::from("id");
    for attribute in attributes {
        output.push(',');
        output.push_str(&escape_field(attribute));
    }
    output.push('\n');

    for record in records {
        output.push_str(&record.id.to_string());
        for value in record.values_in(attributes) {
            output.push(',');
            output.push_str(&escape_field(&value.to_string()));
        }
        output.push('\n');
    }
    output
}

/// Write records as UTF-8 CSV to any writer
pub fn write_csv<W: Write>(writer: &mut W, attributes: &[String], records: &[Record]) -> Result<()> {
    writer.write_all(to_csv(attributes, records).as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Write records as CSV to a file, replacing it if present
pub fn export_to_file(path: &Path, attributes: &[String], records: &[Record]) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_csv(&mut file, attributes, records)?;
    tracing::info!("Exported {} records to {}", records.len(), path.display());
    Ok(())
}

/// Quote a field if it contains a delimiter, quote or line break
fn escape_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
