use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{find_rows, result_of, scalar_text};

/// Summary fields as a two-column table, then any schedule or allocation rows.
pub fn print_table(value: &Value) {
    let result = result_of(value);
    match result {
        Value::Object(map) => {
            print_summary(map);
            if let Some((key, rows)) = find_rows(map) {
                println!("\n{}:", key);
                print_rows(rows);
            }
        }
        Value::Array(rows) => print_rows(rows),
        other => println!("{}", scalar_text(other)),
    }

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }
}

fn print_summary(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        match val {
            Value::Object(nested) => {
                // One level of nesting (e.g. allocation totals) is flattened.
                for (inner, v) in nested.iter().filter(|(_, v)| !v.is_array()) {
                    builder.push_record([format!("{key}.{inner}"), scalar_text(v)]);
                }
            }
            Value::Array(items) if items.iter().all(|i| !i.is_object()) => {
                let joined: Vec<String> = items.iter().map(scalar_text).collect();
                builder.push_record([key.clone(), joined.join("; ")]);
            }
            Value::Array(_) => {}
            _ => builder.push_record([key.clone(), scalar_text(val)]),
        }
    }
    println!("{}", Table::from(builder));
}

fn print_rows(rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        println!("(none)");
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);
    for row in rows.iter().filter_map(Value::as_object) {
        builder.push_record(
            headers
                .iter()
                .map(|h| row.get(h).map(scalar_text).unwrap_or_default()),
        );
    }
    println!("{}", Table::from(builder));
}
