use tabled::{builder::Builder, settings::Style, Table, Tabled};
use crate::attribute::Attribute;
use crate::record::Record;

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn stats_table(stats: &[(&str, &str)]) -> String {
    let mut builder = TableBuilder::default();
    for (label, value) in stats {
        builder.add_row(label, value);
    }
    builder.build()
}

/// Records as a table; columns are `ID` plus the attribute labels in schema order
pub fn records_table(attributes: &[Attribute], records: &[Record]) -> String {
    let mut builder = Builder::default();

    let mut header = vec!["ID".to_string()];
    header.extend(attributes.iter().map(Attribute::label));
    builder.push_record(header);

    let names: Vec<String> = attributes.iter().map(|a| a.name.clone()).collect();
    for record in records {
        let mut row = vec![record.id.to_string()];
        row.extend(record.values_in(&names).map(|v| v.to_string()));
        builder.push_record(row);
    }

    builder.build().with(Style::rounded()).to_string()
}

/// The schema, one row per attribute
pub fn attributes_table(attributes: &[Attribute]) -> String {
    let mut builder = Builder::default();
    builder.push_record(vec!["Attribute".to_string(), "Kind".to_string(), "Required".to_string()]);
    for attribute in attributes {
        builder.push_record(vec![
            attribute.name.clone(),
            attribute.kind.to_string(),
            if attribute.required { "yes" } else { "no" }.to_string(),
        ]);
    }
    builder.build().with(Style::rounded()).to_string()
}
