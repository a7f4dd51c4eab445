//! Validation pipeline that judges every runtime field and aggregates the result.
//!
//! Per field, in runtime order:
//! 1. snapshot the current value into `values`
//! 2. skip read-only fields entirely
//! 3. a required field that is empty gets its "required" message, nothing else runs
//! 4. validators run in declaration order until the first failure
//!
//! Errors are collected for every invalid field, not just the first one.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::trace;

use crate::resolver::RuntimeField;
use crate::state::FormState;
use crate::value::FieldValue;

/// Message used when a failing validator gives none.
pub const DEFAULT_INVALID_MESSAGE: &str = "Invalid value, please review your input.";

/// Aggregated result of one validation pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ValidationOutcome {
    /// Every runtime field's value, read-only fields included.
    pub values: IndexMap<String, FieldValue>,
    /// One message per invalid field.
    pub errors: IndexMap<String, String>,
    /// True iff `errors` is empty.
    pub is_valid: bool,
}

/// Run the pipeline over `state` for `runtime_fields`.
pub fn validate(state: &FormState, runtime_fields: &[RuntimeField]) -> ValidationOutcome {
    let mut values = IndexMap::with_capacity(runtime_fields.len());
    let mut errors = IndexMap::new();

    for field in runtime_fields {
        // A field without a state entry counts as empty.
        let value = state.get(&field.name).map(|s| &s.value);
        values.insert(
            field.name.clone(),
            value.cloned().unwrap_or_else(FieldValue::empty),
        );

        if field.read_only {
            continue;
        }

        if let Some(message) = check_field(field, value) {
            trace!(field = %field.name, %message, "field failed validation");
            errors.insert(field.name.clone(), message);
        }
    }

    let is_valid = errors.is_empty();
    ValidationOutcome {
        values,
        errors,
        is_valid,
    }
}

/// The first error for one field, if any.
fn check_field(field: &RuntimeField, value: Option<&FieldValue>) -> Option<String> {
    if field.definition.required && value.is_none_or(FieldValue::is_empty) {
        return Some(required_message(field));
    }

    let empty = FieldValue::empty();
    run_validators(field, value.unwrap_or(&empty))
}

fn run_validators(field: &RuntimeField, value: &FieldValue) -> Option<String> {
    field
        .definition
        .validators
        .iter()
        .map(|validator| validator.check(value))
        .find(|verdict| !verdict.valid)
        .map(|verdict| {
            verdict
                .message
                .unwrap_or_else(|| DEFAULT_INVALID_MESSAGE.to_string())
        })
}

fn required_message(field: &RuntimeField) -> String {
    let definition = &field.definition;
    definition
        .required_message
        .clone()
        .unwrap_or_else(|| format!("{} is required.", definition.label_or(&field.name)))
}
