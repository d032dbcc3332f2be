//! Export a [`FeatureTable`] as JSON.
//!
//! The output object has a `columns` array (with the leading `file_name`)
//! and one `rows` entry per document, `[file_name, v0, v1, ...]`, so the
//! file loads directly as a data frame downstream.

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

use crate::models::FeatureTable;

#[derive(Serialize)]
struct ExportData<'a> {
    columns: Vec<&'a str>,
    rows: Vec<Vec<Value>>,
}

fn to_export(table: &FeatureTable) -> ExportData<'_> {
    let rows = table
        .rows
        .iter()
        .map(|row| {
            std::iter::once(Value::from(row.file_name.as_str()))
                .chain(row.values.iter().map(|&v| Value::from(v)))
                .collect()
        })
        .collect();
    ExportData {
        columns: table.header(),
        rows,
    }
}

/// Render the table as pretty-printed JSON.
pub fn render_table(table: &FeatureTable) -> Result<String> {
    Ok(serde_json::to_string_pretty(&to_export(table))?)
}

/// Write the table to `output`, or to stdout when `None`.
pub fn export_table(table: &FeatureTable, output: Option<&Path>) -> Result<()> {
    let json = render_table(table)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &json)?;
            eprintln!(
                "Exported {} rows, {} columns to {}",
                table.rows.len(),
                table.columns.len() + 1,
                path.display()
            );
        }
        None => {
            println!("{}", json);
        }
    }
    Ok(())
}
