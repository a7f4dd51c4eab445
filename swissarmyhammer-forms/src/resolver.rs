//! Field definition resolution and runtime schema construction.
//!
//! Resolution is deterministic and side-effect free: the same inputs always
//! produce an equal [`FormSchema`], which is what lets the controller skip a
//! reset when it is reconfigured with unchanged inputs.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::debug;

use crate::definition::{FieldDefinition, FieldKind, TypeDefaults};
use crate::error::{FormsError, Result};
use crate::label::to_display_label;
use crate::state::{FieldState, FormState};
use crate::value::FieldValue;

/// Ordered field name → definition map.
pub type FieldMap = IndexMap<String, FieldDefinition>;

/// Ordered field name → value map.
pub type ValueMap = IndexMap<String, FieldValue>;

/// Produce the definition map for a form.
///
/// Non-empty explicit definitions win entirely. Otherwise one definition is
/// inferred per seed value. With neither, construction fails.
pub fn resolve_definitions(
    definitions: Option<&FieldMap>,
    seed_values: Option<&ValueMap>,
    locale: &str,
) -> Result<FieldMap> {
    if let Some(definitions) = definitions.filter(|d| !d.is_empty()) {
        return Ok(definitions.clone());
    }

    let seed_values = seed_values.ok_or_else(FormsError::missing_field_source)?;
    debug!(fields = seed_values.len(), "inferring field definitions from seed values");

    Ok(seed_values
        .iter()
        .map(|(name, value)| {
            let definition = infer_definition(value)
                .with_display(to_display_label(name, locale))
                .with_default(value.clone());
            (name.clone(), definition)
        })
        .collect())
}

/// Pick a field kind from a value's runtime shape.
pub fn infer_definition(value: &FieldValue) -> FieldDefinition {
    match value {
        FieldValue::Number(_) => FieldDefinition::new(FieldKind::Number),
        FieldValue::Bool(_) => FieldDefinition::new(FieldKind::Boolean),
        FieldValue::Text(_) | FieldValue::List(_) => FieldDefinition::new(FieldKind::Text),
    }
}

/// A definition resolved against the caller's overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeField {
    pub name: String,
    pub definition: FieldDefinition,
    /// Definition flag OR'd with the caller's read-only override.
    pub read_only: bool,
}

/// Runtime fields plus the state a fresh form starts from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormSchema {
    pub runtime_fields: Vec<RuntimeField>,
    pub initial_state: FormState,
}

impl FormSchema {
    pub fn field(&self, name: &str) -> Option<&RuntimeField> {
        self.runtime_fields.iter().find(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.runtime_fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runtime_fields.is_empty()
    }
}

/// Build runtime fields and initial state.
///
/// Excluded names never appear, even when also listed as read-only. The
/// initial value is the definition default, then the seed value, then the
/// type default.
pub fn build_schema(
    fields: &FieldMap,
    seed_values: Option<&ValueMap>,
    exclude: &HashSet<String>,
    read_only: &HashSet<String>,
    type_defaults: &TypeDefaults,
) -> FormSchema {
    let mut schema = FormSchema::default();

    for (name, definition) in fields {
        if exclude.contains(name) {
            continue;
        }

        let initial = definition
            .default_value
            .clone()
            .or_else(|| seed_values.and_then(|seed| seed.get(name).cloned()))
            .unwrap_or_else(|| type_defaults.get(&definition.kind));

        schema.runtime_fields.push(RuntimeField {
            name: name.clone(),
            definition: definition.clone(),
            read_only: definition.read_only || read_only.contains(name),
        });
        schema
            .initial_state
            .insert(name.clone(), FieldState::new(initial));
    }

    schema
}
