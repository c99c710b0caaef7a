pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Column order for per-period plan records.
pub const RECORD_COLUMNS: [&str; 15] = [
    "period",
    "opening_balance",
    "contributions",
    "expenditures",
    "interest",
    "closing_balance",
    "bank_balance",
    "current_investments",
    "maturities",
    "term_1",
    "term_2",
    "term_3",
    "term_4",
    "term_5",
    "total_investments",
];

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The solved plan object inside an envelope, whether the result is the
/// plan itself or a study plan wrapping it.
pub fn plan_object(value: &Value) -> Option<&serde_json::Map<String, Value>> {
    let result = value.get("result")?;
    let plan = result.get("plan").unwrap_or(result);
    plan.as_object().filter(|m| m.contains_key("records"))
}

/// Per-period records of a solved plan, if the output carries one.
pub fn plan_records(value: &Value) -> Option<&Vec<Value>> {
    plan_object(value)?.get("records")?.as_array()
}
