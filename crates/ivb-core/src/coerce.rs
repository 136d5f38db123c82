//! Lenient readers for untyped JSON records.
//!
//! Only the import boundary (catalog normalization, ledger import, state
//! reconciliation) looks at raw values; everything past it is typed.

use serde_json::Value;

/// Reads a field as text. Strings are taken verbatim and numbers use their
/// JSON rendering; anything else reads as empty.
pub(crate) fn text_field(record: &Value, field: &str) -> String {
    match record.get(field) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        _ => String::new(),
    }
}

/// Reads a field as a number. Accepts JSON numbers and numeric strings.
pub(crate) fn number_field(record: &Value, field: &str) -> Option<f64> {
    record.get(field).and_then(number)
}

pub(crate) fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    }
}
