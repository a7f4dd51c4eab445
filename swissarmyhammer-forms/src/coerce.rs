//! Coercion of raw presentation-layer input into a field's primitive type.
//!
//! Coercion is total. Unparsable numeric input becomes empty text instead of
//! an error, so the required/validator stage reports it on the same channel
//! as every other field problem.

use crate::definition::{FieldDefinition, FieldKind};
use crate::value::FieldValue;

/// Convert `raw` into the primitive type declared by `definition`.
pub fn coerce(raw: FieldValue, definition: &FieldDefinition) -> FieldValue {
    match definition.kind {
        FieldKind::Number => coerce_number(raw),
        FieldKind::Boolean => coerce_boolean(raw),
        _ => raw,
    }
}

fn coerce_number(raw: FieldValue) -> FieldValue {
    let parsed = match raw {
        FieldValue::Number(n) => Some(n),
        FieldValue::Bool(b) => Some(if b { 1.0 } else { 0.0 }),
        FieldValue::Text(s) => parse_number(&s),
        FieldValue::List(items) => parse_number(&items.join(",")),
    };
    parsed
        .filter(|n| n.is_finite())
        .map_or_else(FieldValue::empty, FieldValue::Number)
}

/// Blank and non-numeric input fail.
fn parse_number(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

fn coerce_boolean(raw: FieldValue) -> FieldValue {
    match raw {
        FieldValue::Bool(b) => FieldValue::Bool(b),
        FieldValue::Text(s) => FieldValue::Bool(s == "true"),
        _ => FieldValue::Bool(false),
    }
}
