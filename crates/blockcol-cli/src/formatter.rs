//! Output formatting for scan results.
//!
//! Supports table, JSON, and CSV output formats.

use std::str::FromStr;

use blockcol_common::types::{Row, ScalarValue};
use comfy_table::{Cell, ContentArrangement, Table};
use serde_json::{json, Value as JsonValue};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Formatted table output.
    Table,
    /// JSON output.
    Json,
    /// CSV output.
    Csv,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(anyhow::anyhow!("unknown output format '{other}'")),
        }
    }
}

/// Rows produced by a scan, with their column names.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// Column names, in row order.
    pub columns: Vec<String>,
    /// Rows.
    pub rows: Vec<Row>,
}

/// Formats a result set according to the specified format.
pub fn format_result(result: &ResultSet, format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => format_table(result),
        OutputFormat::Json => format_json(result),
        OutputFormat::Csv => format_csv(result),
    }
}

/// Creates a table with the CLI's standard styling.
pub fn styled_table() -> Table {
    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

fn format_table(result: &ResultSet) -> String {
    let mut table = styled_table();

    if !result.columns.is_empty() {
        table.set_header(result.columns.iter().map(Cell::new));
    }

    for row in &result.rows {
        let cells: Vec<Cell> = row.iter().map(|v| Cell::new(v.to_string())).collect();
        table.add_row(cells);
    }

    table.to_string()
}

fn format_json(result: &ResultSet) -> String {
    let rows: Vec<JsonValue> = result
        .rows
        .iter()
        .map(|row| {
            let mut obj = serde_json::Map::new();
            for (i, value) in row.iter().enumerate() {
                let col_name = result
                    .columns
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| format!("column_{i}"));
                obj.insert(col_name, value_to_json(value));
            }
            JsonValue::Object(obj)
        })
        .collect();

    serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".to_string())
}

/// Converts a scalar to a JSON value. Non-finite floats become `null`.
fn value_to_json(value: &ScalarValue) -> JsonValue {
    match value {
        ScalarValue::Int32(i) => json!(*i),
        ScalarValue::Float32(f) => json!(f64::from(*f)),
        ScalarValue::Text(s) => json!(s),
    }
}

fn format_csv(result: &ResultSet) -> String {
    let mut output = String::new();

    if !result.columns.is_empty() {
        let header: Vec<String> = result.columns.iter().map(|c| escape_csv(c)).collect();
        output.push_str(&header.join(","));
        output.push('\n');
    }

    for row in &result.rows {
        let values: Vec<String> = row.iter().map(|v| escape_csv(&v.to_string())).collect();
        output.push_str(&values.join(","));
        output.push('\n');
    }

    output
}

/// Escapes a value for CSV output.
fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
