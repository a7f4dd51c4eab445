//! Form state store: a pure reducer over per-field `{value, error}` pairs.
//!
//! The store never reads anything but its previous state and the action it
//! is given. [`reduce`] is the whole state machine; [`FormStore`] is a thin
//! owner that applies actions in delivery order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::value::FieldValue;

/// Runtime state of a single field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldState {
    pub value: FieldValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FieldState {
    pub fn new(value: impl Into<FieldValue>) -> Self {
        Self {
            value: value.into(),
            error: None,
        }
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Field name → state, in runtime field order.
pub type FormState = IndexMap<String, FieldState>;

/// What happens to an existing error when a field is edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EditPolicy {
    /// Drop the error optimistically; the field is re-judged on next submit.
    #[default]
    ClearError,
    /// Keep the error until the next submit or error assignment.
    KeepError,
}

/// Actions understood by [`reduce`].
#[derive(Debug, Clone, PartialEq)]
pub enum FormAction {
    /// Replace one field's value. Does not check that `name` is a known field.
    Update {
        name: String,
        value: FieldValue,
        policy: EditPolicy,
    },
    /// Set errors for the named fields and clear every other error.
    SetErrors(IndexMap<String, String>),
    /// Replace the whole state.
    Reset(FormState),
}

/// Compute the next state from the previous state and an action.
pub fn reduce(state: &FormState, action: FormAction) -> FormState {
    match action {
        FormAction::Update {
            name,
            value,
            policy,
        } => {
            let mut next = state.clone();
            let error = match policy {
                EditPolicy::ClearError => None,
                EditPolicy::KeepError => state.get(&name).and_then(|s| s.error.clone()),
            };
            next.insert(name, FieldState { value, error });
            next
        }
        FormAction::SetErrors(errors) => {
            let mut next: FormState = state
                .iter()
                .map(|(name, field)| {
                    let cleared = FieldState {
                        value: field.value.clone(),
                        error: errors.get(name).cloned(),
                    };
                    (name.clone(), cleared)
                })
                .collect();
            // Names the state does not know yet still receive their message.
            for (name, message) in errors {
                next.entry(name).or_insert_with(|| FieldState {
                    value: FieldValue::empty(),
                    error: Some(message),
                });
            }
            next
        }
        FormAction::Reset(next) => next,
    }
}

/// Owner of a form's state; the only writer.
#[derive(Debug, Clone, Default)]
pub struct FormStore {
    state: FormState,
}

impl FormStore {
    pub fn new(initial: FormState) -> Self {
        Self { state: initial }
    }

    pub fn dispatch(&mut self, action: FormAction) {
        self.state = reduce(&self.state, action);
    }

    pub fn update(&mut self, name: impl Into<String>, value: FieldValue, policy: EditPolicy) {
        self.dispatch(FormAction::Update {
            name: name.into(),
            value,
            policy,
        });
    }

    pub fn set_errors(&mut self, errors: IndexMap<String, String>) {
        self.dispatch(FormAction::SetErrors(errors));
    }

    pub fn reset(&mut self, next: FormState) {
        self.dispatch(FormAction::Reset(next));
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn get(&self, name: &str) -> Option<&FieldState> {
        self.state.get(name)
    }

    /// Fields currently carrying an error, in state order.
    pub fn errors(&self) -> IndexMap<String, String> {
        self.state
            .iter()
            .filter_map(|(name, field)| field.error.clone().map(|e| (name.clone(), e)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> FormState {
        let mut state = FormState::new();
        state.insert("name".into(), FieldState::new("Ada"));
        state.insert(
            "age".into(),
            FieldState {
                value: FieldValue::Number(12.0),
                error: Some("Too young.".into()),
            },
        );
        state.insert("subscribed".into(), FieldState::new(false));
        state
    }

    fn errors(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn update_replaces_value_and_clears_error() {
        let next = reduce(
            &sample_state(),
            FormAction::Update {
                name: "age".into(),
                value: FieldValue::Number(30.0),
                policy: EditPolicy::ClearError,
            },
        );
        assert_eq!(next["age"], FieldState::new(30.0));
        assert_eq!(next["name"], FieldState::new("Ada"));
    }

    #[test]
    fn update_with_keep_policy_preserves_error() {
        let next = reduce(
            &sample_state(),
            FormAction::Update {
                name: "age".into(),
                value: FieldValue::Number(13.0),
                policy: EditPolicy::KeepError,
            },
        );
        assert_eq!(next["age"].value, FieldValue::Number(13.0));
        assert_eq!(next["age"].error.as_deref(), Some("Too young."));
    }

    #[test]
    fn update_does_not_check_known_names() {
        let next = reduce(
            &sample_state(),
            FormAction::Update {
                name: "unknown".into(),
                value: FieldValue::from("x"),
                policy: EditPolicy::ClearError,
            },
        );
        assert_eq!(next.len(), 4);
        assert_eq!(next["unknown"], FieldState::new("x"));
    }

    #[test]
    fn set_errors_clears_stale_errors() {
        let next = reduce(
            &sample_state(),
            FormAction::SetErrors(errors(&[("name", "Name is required.")])),
        );
        assert_eq!(next["name"].error.as_deref(), Some("Name is required."));
        assert_eq!(next["name"].value, FieldValue::from("Ada"));
        assert!(next["age"].error.is_none());
        assert_eq!(next["age"].value, FieldValue::Number(12.0));
        assert!(next["subscribed"].error.is_none());
    }

    #[test]
    fn empty_error_map_clears_everything() {
        let next = reduce(&sample_state(), FormAction::SetErrors(IndexMap::new()));
        assert!(next.values().all(|f| f.error.is_none()));
        assert_eq!(next.len(), 3);
    }

    #[test]
    fn set_errors_for_unknown_name_inserts_empty_value() {
        let next = reduce(&sample_state(), FormAction::SetErrors(errors(&[("ghost", "Boo.")])));
        assert_eq!(next["ghost"].value, FieldValue::empty());
        assert_eq!(next["ghost"].error.as_deref(), Some("Boo."));
    }

    #[test]
    fn reset_replaces_state() {
        let mut replacement = FormState::new();
        replacement.insert("only".into(), FieldState::new(1));
        let next = reduce(&sample_state(), FormAction::Reset(replacement.clone()));
        assert_eq!(next, replacement);
    }

    #[test]
    fn reduce_leaves_previous_state_untouched() {
        let before = sample_state();
        let _ = reduce(&before, FormAction::SetErrors(IndexMap::new()));
        assert_eq!(before, sample_state());
    }

    #[test]
    fn store_applies_actions_in_order() {
        let mut store = FormStore::new(sample_state());
        store.set_errors(errors(&[("name", "Bad."), ("age", "Worse.")]));
        assert_eq!(store.errors().len(), 2);

        store.update("name", FieldValue::from("Grace"), EditPolicy::ClearError);
        assert_eq!(store.errors(), errors(&[("age", "Worse.")]));
        assert_eq!(store.get("name").unwrap().value, FieldValue::from("Grace"));
    }
}
