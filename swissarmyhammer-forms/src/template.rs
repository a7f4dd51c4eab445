//! Declarative form templates loaded from YAML or JSON.
//!
//! A template describes fields as data. Declarative [`ValidationRules`]
//! compile into ordinary [`Validator`]s, so a template-built form runs through
//! exactly the same pipeline as one built in code.

use std::path::Path;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::controller::FormInputs;
use crate::definition::{FieldDefinition, FieldKind, FieldOption, ValidationResult, Validator};
use crate::error::{FormsError, Result};
use crate::resolver::{FieldMap, ValueMap};
use crate::value::FieldValue;

/// Data-only validation rules for a field.
///
/// Rules only judge values of the shape they apply to, and never judge an
/// empty value; emptiness is the `required` flag's job.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    /// Minimum text length in characters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Maximum text length in characters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Regex the whole text must match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Minimum numeric value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Maximum numeric value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Minimum number of selections
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_selections: Option<usize>,
    /// Maximum number of selections
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_selections: Option<usize>,
    /// Replaces every generated failure message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_length_range(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_numeric_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn with_selection_range(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_selections = min;
        self.max_selections = max;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Compile into validators, one per rule, in a fixed order: length,
    /// pattern, numeric range, selection count.
    pub fn compile(&self, field: &str, label: &str) -> Result<Vec<Validator>> {
        let mut validators = Vec::new();
        let label = label.to_string();
        let custom = self.message.clone();
        let message = move |generated: String| custom.clone().unwrap_or(generated);

        if self.min_length.is_some() || self.max_length.is_some() {
            let (min, max) = (self.min_length, self.max_length);
            let (label, message) = (label.clone(), message.clone());
            validators.push(Validator::new(move |value: &FieldValue| {
                let Some(text) = value.as_str().filter(|s| !s.is_empty()) else {
                    return ValidationResult::pass();
                };
                let len = text.chars().count();
                if let Some(min) = min.filter(|&min| len < min) {
                    return ValidationResult::fail(message(format!(
                        "{label} must be at least {min} characters."
                    )));
                }
                if let Some(max) = max.filter(|&max| len > max) {
                    return ValidationResult::fail(message(format!(
                        "{label} must be at most {max} characters."
                    )));
                }
                ValidationResult::pass()
            }));
        }

        if let Some(pattern) = &self.pattern {
            let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|source| {
                FormsError::InvalidPattern {
                    field: field.to_string(),
                    source,
                }
            })?;
            let (label, message) = (label.clone(), message.clone());
            validators.push(Validator::new(move |value: &FieldValue| match value.as_str() {
                Some(text) if !text.is_empty() && !regex.is_match(text) => ValidationResult::fail(
                    message(format!("{label} does not match the expected format.")),
                ),
                _ => ValidationResult::pass(),
            }));
        }

        if self.min.is_some() || self.max.is_some() {
            let (min, max) = (self.min, self.max);
            let (label, message) = (label.clone(), message.clone());
            validators.push(Validator::new(move |value: &FieldValue| {
                let Some(n) = value.as_f64() else {
                    return ValidationResult::pass();
                };
                if let Some(min) = min.filter(|&min| n < min) {
                    return ValidationResult::fail(message(format!(
                        "{label} must be at least {}.",
                        FieldValue::Number(min)
                    )));
                }
                if let Some(max) = max.filter(|&max| n > max) {
                    return ValidationResult::fail(message(format!(
                        "{label} must be at most {}.",
                        FieldValue::Number(max)
                    )));
                }
                ValidationResult::pass()
            }));
        }

        if self.min_selections.is_some() || self.max_selections.is_some() {
            let (min, max) = (self.min_selections, self.max_selections);
            validators.push(Validator::new(move |value: &FieldValue| {
                let Some(count) = value.as_list().map(<[String]>::len).filter(|&c| c > 0) else {
                    return ValidationResult::pass();
                };
                if let Some(min) = min.filter(|&min| count < min) {
                    return ValidationResult::fail(message(format!(
                        "Select at least {min} options for {label}."
                    )));
                }
                if let Some(max) = max.filter(|&max| count > max) {
                    return ValidationResult::fail(message(format!(
                        "Select at most {max} options for {label}."
                    )));
                }
                ValidationResult::pass()
            }));
        }

        Ok(validators)
    }
}

/// One field as written in a template file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldTemplate {
    #[serde(rename = "type", default = "default_kind")]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helper_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_message: Option<String>,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<ValidationRules>,
}

fn default_kind() -> FieldKind {
    FieldKind::Text
}

impl FieldTemplate {
    /// Build the runtime definition, compiling any rules into validators.
    pub fn to_definition(&self, name: &str) -> Result<FieldDefinition> {
        let validators = match &self.rules {
            Some(rules) => rules.compile(name, self.display.as_deref().unwrap_or(name))?,
            None => Vec::new(),
        };

        Ok(FieldDefinition {
            kind: self.kind.clone(),
            display: self.display.clone(),
            description: self.description.clone(),
            placeholder: self.placeholder.clone(),
            helper_text: self.helper_text.clone(),
            default_value: self.default.clone(),
            options: self.options.clone(),
            required: self.required,
            required_message: self.required_message.clone(),
            read_only: self.read_only,
            validators,
        })
    }
}

/// A whole form as written in a template file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormTemplate {
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub fields: IndexMap<String, FieldTemplate>,
    /// Current values, used as seeds and for inference when `fields` is empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<ValueMap>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude_fields: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub read_only_fields: Vec<String>,
    /// Overrides the builder's locale when the template is applied with
    /// [`FormControllerBuilder::template`](crate::controller::FormControllerBuilder::template).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl FormTemplate {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a `.yaml`, `.yml` or `.json` template.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let template = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content)?,
            Some("json") => Self::from_json_str(&content)?,
            _ => {
                return Err(FormsError::UnsupportedFormat {
                    path: path.to_path_buf(),
                })
            }
        };
        debug!(?path, fields = template.fields.len(), "loaded form template");
        Ok(template)
    }

    /// Runtime definitions for every templated field, in file order.
    pub fn definitions(&self) -> Result<FieldMap> {
        self.fields
            .iter()
            .map(|(name, field)| Ok((name.clone(), field.to_definition(name)?)))
            .collect()
    }

    /// Controller inputs equivalent to this template.
    pub fn to_inputs(&self) -> Result<FormInputs> {
        let fields = self.definitions()?;
        Ok(FormInputs {
            fields: (!fields.is_empty()).then_some(fields),
            seed_values: self.values.clone(),
            exclude_fields: self.exclude_fields.iter().cloned().collect(),
            read_only_fields: self.read_only_fields.iter().cloned().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SIGNUP: &str = r#"
fields:
  username:
    type: text
    display: Username
    required: true
    rules:
      min_length: 3
      max_length: 12
      pattern: "[a-z0-9_]+"
  age:
    type: number
    display: Age
    rules:
      min: 18
  interests:
    type: select
    options:
      - value: rust
        label: Rust
      - value: go
        label: Go
    rules:
      max_selections: 1
      message: Pick one.
  role:
    type: badge
    read_only: true
    default: member
exclude_fields: [internal]
read_only_fields: [age]
locale: en
"#;

    fn check(validators: &[Validator], value: FieldValue) -> Option<String> {
        validators
            .iter()
            .map(|v| v.check(&value))
            .find(|r| !r.valid)
            .and_then(|r| r.message)
    }

    #[test]
    fn yaml_template_parses_in_order() {
        let template = FormTemplate::from_yaml_str(SIGNUP).unwrap();
        let names: Vec<_> = template.fields.keys().cloned().collect();
        assert_eq!(names, vec!["username", "age", "interests", "role"]);
        assert_eq!(template.fields["role"].kind, FieldKind::Custom("badge".into()));
        assert_eq!(template.exclude_fields, vec!["internal"]);
        assert_eq!(template.locale.as_deref(), Some("en"));
    }

    #[test]
    fn rules_compile_into_validators() {
        let template = FormTemplate::from_yaml_str(SIGNUP).unwrap();
        let defs = template.definitions().unwrap();

        let username = &defs["username"].validators;
        assert_eq!(username.len(), 2);
        assert_eq!(
            check(username, "ab".into()).as_deref(),
            Some("Username must be at least 3 characters.")
        );
        assert_eq!(
            check(username, "Ada!".into()).as_deref(),
            Some("Username does not match the expected format.")
        );
        assert_eq!(check(username, "ada_l".into()), None);
        assert_eq!(check(username, "".into()), None);

        let age = &defs["age"].validators;
        assert_eq!(check(age, FieldValue::Number(17.0)).as_deref(), Some("Age must be at least 18."));
        assert_eq!(check(age, FieldValue::Number(18.0)), None);

        let interests = &defs["interests"].validators;
        let both = FieldValue::List(vec!["rust".into(), "go".into()]);
        assert_eq!(check(interests, both).as_deref(), Some("Pick one."));
    }

    #[test]
    fn default_and_read_only_flags_carry_over() {
        let template = FormTemplate::from_yaml_str(SIGNUP).unwrap();
        let defs = template.definitions().unwrap();
        assert!(defs["role"].read_only);
        assert_eq!(defs["role"].default_value, Some(FieldValue::from("member")));
        assert_eq!(defs["interests"].options.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn rule_and_required_messages_name_the_field_alike() {
        let template = FormTemplate::from_yaml_str(
            "fields:\n  nickname:\n    required: true\n    rules:\n      min_length: 3\n",
        )
        .unwrap();
        let definition = template.definitions().unwrap().shift_remove("nickname").unwrap();
        assert_eq!(
            check(&definition.validators, "ab".into()).as_deref(),
            Some("nickname must be at least 3 characters.")
        );
        assert_eq!(definition.label_or("nickname"), "nickname");
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let template = FormTemplate::from_yaml_str(
            "fields:\n  code:\n    rules:\n      pattern: \"([a-z\"\n",
        )
        .unwrap();
        let err = template.definitions().unwrap_err();
        assert!(matches!(err, FormsError::InvalidPattern { ref field, .. } if field == "code"));
    }

    #[test]
    fn inputs_from_values_only() {
        let template = FormTemplate::from_json_str(
            r#"{"values": {"display_name": "Ada", "age": 36}, "exclude_fields": ["age"]}"#,
        )
        .unwrap();
        let inputs = template.to_inputs().unwrap();
        assert!(inputs.fields.is_none());
        assert_eq!(inputs.seed_values.as_ref().unwrap().len(), 2);
        assert!(inputs.exclude_fields.contains("age"));
    }

    #[test]
    fn load_by_extension() {
        let mut yaml = NamedTempFile::with_suffix(".yaml").unwrap();
        yaml.write_all(SIGNUP.as_bytes()).unwrap();
        let template = FormTemplate::load(yaml.path()).unwrap();
        assert_eq!(template.fields.len(), 4);

        let mut toml = NamedTempFile::with_suffix(".ini").unwrap();
        toml.write_all(b"x = 1").unwrap();
        let err = FormTemplate::load(toml.path()).unwrap_err();
        assert!(matches!(err, FormsError::UnsupportedFormat { .. }));
    }
}
