use serde_json::Value;

use super::{result_of, scalar_text};

/// The single figure a caller usually wants from each command.
const HEADLINE_KEYS: [&str; 7] = [
    "periodic_payment",
    "monthly_payment",
    "is_eligible",
    "transaction_ref",
    "total_outstanding",
    "unallocated",
    "outstanding_balance",
];

pub fn print_minimal(value: &Value) {
    let result = result_of(value);
    let Value::Object(map) = result else {
        println!("{}", scalar_text(result));
        return;
    };

    let headline = HEADLINE_KEYS.iter().find_map(|key| {
        map.get(*key)
            .or_else(|| map.get("allocation").and_then(|a| a.get(*key)))
            .filter(|v| !v.is_null())
    });
    match headline {
        Some(val) => println!("{}", scalar_text(val)),
        None => {
            if let Some((key, val)) = map.iter().next() {
                println!("{}: {}", key, scalar_text(val));
            }
        }
    }
}
