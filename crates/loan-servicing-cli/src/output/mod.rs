pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Arrays rendered as row tables, in lookup order.
pub(crate) const ROW_KEYS: [&str; 5] = ["installments", "schedule", "lines", "transactions", "reasons"];

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The `result` payload of a command envelope, or the value itself.
pub(crate) fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// First array of row objects found under `ROW_KEYS`, descending one level
/// into nested objects such as `allocation`.
pub(crate) fn find_rows(map: &Map<String, Value>) -> Option<(&'static str, &Vec<Value>)> {
    for key in ROW_KEYS {
        if let Some(Value::Array(rows)) = map.get(key) {
            if rows.first().map(Value::is_object).unwrap_or(false) {
                return Some((key, rows));
            }
        }
    }
    map.values()
        .filter_map(Value::as_object)
        .find_map(find_rows)
}

pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
