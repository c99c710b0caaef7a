use serde_json::Value;

use super::plan_object;

/// Print just the key answer value from the output.
///
/// Plans print their total interest; other results fall back to the first
/// well-known field, then to the first field of the result object.
pub fn print_minimal(value: &Value) {
    if let Some(plan) = plan_object(value) {
        if let Some(total) = plan.get("objective_value") {
            println!("{}", format_minimal(total));
            return;
        }
    }

    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    // Priority list of key output fields
    let priority_keys = [
        "objective_value",
        "summary",
        "allocations",
        "period_count",
        "input",
    ];

    if let Value::Object(map) = result_obj {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
