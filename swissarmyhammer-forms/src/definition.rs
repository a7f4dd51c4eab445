//! Field definitions, the declared contract of a single form field.
//!
//! A definition says what kind of value a field holds, how it is labelled,
//! whether it is required or read-only, and which validators judge it.
//! Definitions are plain data plus shared validator closures, so cloning a
//! definition is cheap and two clones compare equal.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::value::FieldValue;

/// The kind of a field. Selects coercion and widget behaviour.
///
/// Unknown tags are preserved as `Custom` and handled like text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldKind {
    Text,
    Number,
    Password,
    Boolean,
    Select,
    Timezone,
    Custom(String),
}

impl FieldKind {
    pub fn as_str(&self) -> &str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::Password => "password",
            FieldKind::Boolean => "boolean",
            FieldKind::Select => "select",
            FieldKind::Timezone => "timezone",
            FieldKind::Custom(tag) => tag,
        }
    }

    /// Built-in kinds, in declaration order.
    pub fn builtin() -> [FieldKind; 6] {
        [
            FieldKind::Text,
            FieldKind::Number,
            FieldKind::Password,
            FieldKind::Boolean,
            FieldKind::Select,
            FieldKind::Timezone,
        ]
    }
}

impl From<&str> for FieldKind {
    fn from(tag: &str) -> Self {
        match tag {
            "text" => FieldKind::Text,
            "number" => FieldKind::Number,
            "password" => FieldKind::Password,
            "boolean" => FieldKind::Boolean,
            "select" => FieldKind::Select,
            "timezone" => FieldKind::Timezone,
            other => FieldKind::Custom(other.to_string()),
        }
    }
}

impl From<String> for FieldKind {
    fn from(tag: String) -> Self {
        FieldKind::from(tag.as_str())
    }
}

impl From<FieldKind> for String {
    fn from(kind: FieldKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single option in a select-style field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub value: String,
    pub label: String,
}

impl FieldOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Structured verdict of a validator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationResult {
    pub fn pass() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
        }
    }

    /// `valid` with a message that is only reported when `valid` is false.
    pub fn check(valid: bool, message: impl Into<String>) -> Self {
        Self {
            valid,
            message: Some(message.into()),
        }
    }
}

impl From<bool> for ValidationResult {
    fn from(valid: bool) -> Self {
        Self {
            valid,
            message: None,
        }
    }
}

type ValidatorFn = dyn Fn(&FieldValue) -> ValidationResult + Send + Sync;

/// A pure function judging one field value.
///
/// Validators compare by identity: two handles are equal only when they
/// share the same underlying closure.
#[derive(Clone)]
pub struct Validator(Arc<ValidatorFn>);

impl Validator {
    /// Wrap a closure returning either `bool` or [`ValidationResult`].
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn(&FieldValue) -> R + Send + Sync + 'static,
        R: Into<ValidationResult>,
    {
        Self(Arc::new(move |value| f(value).into()))
    }

    pub fn check(&self, value: &FieldValue) -> ValidationResult {
        (self.0)(value)
    }
}

impl PartialEq for Validator {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validator({:p})", Arc::as_ptr(&self.0))
    }
}

/// The complete declared contract of one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    pub kind: FieldKind,
    /// Human label; derived from the field name when absent.
    pub display: Option<String>,
    pub description: Option<String>,
    pub placeholder: Option<String>,
    pub helper_text: Option<String>,
    /// Seed value; wins over incoming seed values and type defaults.
    pub default_value: Option<FieldValue>,
    pub options: Option<Vec<FieldOption>>,
    pub required: bool,
    /// Replaces the generated "<label> is required." message.
    pub required_message: Option<String>,
    pub read_only: bool,
    pub validators: Vec<Validator>,
}

impl FieldDefinition {
    pub fn new(kind: impl Into<FieldKind>) -> Self {
        Self {
            kind: kind.into(),
            display: None,
            description: None,
            placeholder: None,
            helper_text: None,
            default_value: None,
            options: None,
            required: false,
            required_message: None,
            read_only: false,
            validators: Vec::new(),
        }
    }

    pub fn text() -> Self {
        Self::new(FieldKind::Text)
    }

    pub fn number() -> Self {
        Self::new(FieldKind::Number)
    }

    pub fn boolean() -> Self {
        Self::new(FieldKind::Boolean)
    }

    pub fn password() -> Self {
        Self::new(FieldKind::Password)
    }

    pub fn select(options: Vec<FieldOption>) -> Self {
        Self::new(FieldKind::Select).with_options(options)
    }

    pub fn timezone() -> Self {
        Self::new(FieldKind::Timezone)
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_helper_text(mut self, helper_text: impl Into<String>) -> Self {
        self.helper_text = Some(helper_text.into());
        self
    }

    pub fn with_default(mut self, value: impl Into<FieldValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = Some(options);
        self
    }

    pub fn with_required_message(mut self, message: impl Into<String>) -> Self {
        self.required_message = Some(message.into());
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Convenience for `with_validator(Validator::new(f))`.
    pub fn validate<F, R>(self, f: F) -> Self
    where
        F: Fn(&FieldValue) -> R + Send + Sync + 'static,
        R: Into<ValidationResult>,
    {
        self.with_validator(Validator::new(f))
    }

    /// Label shown for this field, falling back to `name` verbatim.
    pub fn label_or<'a>(&'a self, name: &'a str) -> &'a str {
        self.display.as_deref().unwrap_or(name)
    }
}

/// Per-kind default values used when neither the definition nor the seed
/// values provide one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeDefaults(HashMap<FieldKind, FieldValue>);

impl TypeDefaults {
    /// A table with no entries; every kind falls back to empty text.
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    pub fn with(mut self, kind: impl Into<FieldKind>, value: impl Into<FieldValue>) -> Self {
        self.0.insert(kind.into(), value.into());
        self
    }

    pub fn get(&self, kind: &FieldKind) -> FieldValue {
        self.0.get(kind).cloned().unwrap_or_else(FieldValue::empty)
    }

    /// Overlay `other` on top of `self`.
    pub fn merged(mut self, other: &TypeDefaults) -> Self {
        for (kind, value) in &other.0 {
            self.0.insert(kind.clone(), value.clone());
        }
        self
    }
}

impl Default for TypeDefaults {
    fn default() -> Self {
        Self::empty()
            .with(FieldKind::Text, "")
            .with(FieldKind::Password, "")
            .with(FieldKind::Number, 0.0)
            .with(FieldKind::Boolean, false)
            .with(FieldKind::Select, "")
            .with(FieldKind::Timezone, "")
    }
}
