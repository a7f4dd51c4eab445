//! Form controller: the composition point of the engine.
//!
//! The controller resolves definitions once, owns the [`FormStore`], coerces
//! edits and runs the validation pipeline on submit. On success the coerced
//! values go to the confirm callback; on failure errors are written back into
//! the store and handed to the validation-error callback. The form stays
//! usable either way.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::coerce::coerce;
use crate::definition::TypeDefaults;
use crate::error::{FormsError, Result};
use crate::layout::{build_layout, FormLayout, TimezoneLayout};
use crate::resolver::{build_schema, resolve_definitions, FieldMap, FormSchema, RuntimeField, ValueMap};
use crate::settings::FormSettings;
use crate::state::{EditPolicy, FieldState, FormState, FormStore};
use crate::template::FormTemplate;
use crate::timezone::{default_label_formatter, BuiltinTimezones, TimezoneLabelFormatter, TimezoneSource};
use crate::validation::validate;
use crate::value::FieldValue;

/// Field name → error message.
pub type ErrorMap = IndexMap<String, String>;

/// Receives the validated values of a successful submit.
pub type ConfirmCallback = Box<dyn FnMut(&ValueMap) + Send>;

/// Receives the error map of a blocked submit.
pub type ValidationErrorCallback = Box<dyn FnMut(&ErrorMap) + Send>;

/// Everything that determines a form's runtime field set.
///
/// Two equal inputs always resolve to equal schemas.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormInputs {
    pub fields: Option<FieldMap>,
    pub seed_values: Option<ValueMap>,
    pub exclude_fields: HashSet<String>,
    pub read_only_fields: HashSet<String>,
}

impl FormInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fields(mut self, fields: FieldMap) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn with_seed_values(mut self, values: ValueMap) -> Self {
        self.seed_values = Some(values);
        self
    }

    pub fn with_excluded<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_fields.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_read_only<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.read_only_fields.extend(names.into_iter().map(Into::into));
        self
    }
}

/// Where the form is in its submission lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Submitting,
    /// The last submit was confirmed. Cleared by the next edit.
    Valid,
    /// The last submit was rejected. Cleared by the next edit.
    Invalid,
}

/// Result of [`FormController::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Confirmed(ValueMap),
    Rejected(ErrorMap),
}

impl SubmitOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, SubmitOutcome::Confirmed(_))
    }
}

/// Builder for [`FormController`].
pub struct FormControllerBuilder {
    inputs: FormInputs,
    locale: String,
    type_defaults: TypeDefaults,
    edit_policy: EditPolicy,
    timezone_source: Arc<dyn TimezoneSource>,
    timezone_label_formatter: TimezoneLabelFormatter,
    on_confirm: Option<ConfirmCallback>,
    on_validation_error: Option<ValidationErrorCallback>,
}

impl Default for FormControllerBuilder {
    fn default() -> Self {
        Self::from_settings(&FormSettings::default())
    }
}

impl FormControllerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from loaded [`FormSettings`] instead of the built-in defaults.
    pub fn from_settings(settings: &FormSettings) -> Self {
        Self {
            inputs: FormInputs::default(),
            locale: settings.locale.clone(),
            type_defaults: settings.effective_type_defaults(),
            edit_policy: settings.edit_policy,
            timezone_source: Arc::new(BuiltinTimezones),
            timezone_label_formatter: default_label_formatter(),
            on_confirm: None,
            on_validation_error: None,
        }
    }

    pub fn inputs(mut self, inputs: FormInputs) -> Self {
        self.inputs = inputs;
        self
    }

    /// Take the field set, and the locale when one is given, from a template.
    pub fn template(mut self, template: &FormTemplate) -> Result<Self> {
        self.inputs = template.to_inputs()?;
        if let Some(locale) = &template.locale {
            self.locale = locale.clone();
        }
        Ok(self)
    }

    pub fn fields(mut self, fields: FieldMap) -> Self {
        self.inputs.fields = Some(fields);
        self
    }

    pub fn seed_values(mut self, values: ValueMap) -> Self {
        self.inputs.seed_values = Some(values);
        self
    }

    pub fn exclude_fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs = self.inputs.with_excluded(names);
        self
    }

    pub fn read_only_fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs = self.inputs.with_read_only(names);
        self
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Replace the whole type default table.
    pub fn type_defaults(mut self, type_defaults: TypeDefaults) -> Self {
        self.type_defaults = type_defaults;
        self
    }

    pub fn edit_policy(mut self, policy: EditPolicy) -> Self {
        self.edit_policy = policy;
        self
    }

    pub fn timezone_source(mut self, source: impl TimezoneSource + 'static) -> Self {
        self.timezone_source = Arc::new(source);
        self
    }

    pub fn timezone_label_formatter(mut self, formatter: TimezoneLabelFormatter) -> Self {
        self.timezone_label_formatter = formatter;
        self
    }

    pub fn on_confirm(mut self, callback: impl FnMut(&ValueMap) + Send + 'static) -> Self {
        self.on_confirm = Some(Box::new(callback));
        self
    }

    pub fn on_validation_error(mut self, callback: impl FnMut(&ErrorMap) + Send + 'static) -> Self {
        self.on_validation_error = Some(Box::new(callback));
        self
    }

    /// Resolve the field set and build the controller.
    ///
    /// Fails with a configuration error when there is no confirm callback or
    /// when neither field definitions nor seed values were given.
    pub fn build(self) -> Result<FormController> {
        let on_confirm = self.on_confirm.ok_or_else(|| FormsError::Configuration {
            message: "an on_confirm callback is required".into(),
        })?;

        let schema = resolve_schema(&self.inputs, &self.locale, &self.type_defaults)?;
        debug!(
            fields = schema.len(),
            locale = %self.locale,
            "built form controller"
        );

        Ok(FormController {
            store: FormStore::new(schema.initial_state.clone()),
            schema,
            inputs: self.inputs,
            locale: self.locale,
            type_defaults: self.type_defaults,
            edit_policy: self.edit_policy,
            phase: SubmissionPhase::Idle,
            timezone_source: self.timezone_source,
            timezone_label_formatter: self.timezone_label_formatter,
            on_confirm,
            on_validation_error: self.on_validation_error,
        })
    }
}

fn resolve_schema(inputs: &FormInputs, locale: &str, type_defaults: &TypeDefaults) -> Result<FormSchema> {
    let definitions = resolve_definitions(inputs.fields.as_ref(), inputs.seed_values.as_ref(), locale)?;
    Ok(build_schema(
        &definitions,
        inputs.seed_values.as_ref(),
        &inputs.exclude_fields,
        &inputs.read_only_fields,
        type_defaults,
    ))
}

/// A single in-memory form.
pub struct FormController {
    inputs: FormInputs,
    locale: String,
    type_defaults: TypeDefaults,
    edit_policy: EditPolicy,
    schema: FormSchema,
    store: FormStore,
    phase: SubmissionPhase,
    timezone_source: Arc<dyn TimezoneSource>,
    timezone_label_formatter: TimezoneLabelFormatter,
    on_confirm: ConfirmCallback,
    on_validation_error: Option<ValidationErrorCallback>,
}

impl FormController {
    pub fn builder() -> FormControllerBuilder {
        FormControllerBuilder::new()
    }

    /// Apply a raw edit to one field.
    ///
    /// The value is coerced to the field's type and replaces the stored value.
    /// Unknown and excluded fields are rejected, as are read-only fields.
    pub fn edit(&mut self, name: &str, raw: impl Into<FieldValue>) -> Result<()> {
        let field = self
            .schema
            .field(name)
            .ok_or_else(|| FormsError::FieldNotFound { name: name.to_string() })?;
        if field.read_only {
            return Err(FormsError::ReadOnlyField { name: name.to_string() });
        }

        let value = coerce(raw.into(), &field.definition);
        trace!(field = %name, kind = value.type_name(), "field edited");
        self.store.update(name, value, self.edit_policy);
        self.phase = SubmissionPhase::Idle;
        Ok(())
    }

    /// Validate the current state and either confirm or reject it.
    pub fn submit(&mut self) -> SubmitOutcome {
        self.phase = SubmissionPhase::Submitting;
        let outcome = validate(self.store.state(), &self.schema.runtime_fields);

        if outcome.is_valid {
            self.store.set_errors(ErrorMap::new());
            debug!(fields = outcome.values.len(), "form submission confirmed");
            (self.on_confirm)(&outcome.values);
            self.phase = SubmissionPhase::Valid;
            return SubmitOutcome::Confirmed(outcome.values);
        }

        let failing: Vec<&str> = outcome.errors.keys().map(String::as_str).collect();
        warn!(fields = ?failing, "form submission blocked by validation errors");
        self.store.set_errors(outcome.errors.clone());
        if let Some(callback) = self.on_validation_error.as_mut() {
            callback(&outcome.errors);
        }
        self.phase = SubmissionPhase::Invalid;
        SubmitOutcome::Rejected(outcome.errors)
    }

    /// Swap in new inputs.
    ///
    /// Returns `true` when the resolved schema changed, in which case all
    /// edits and errors are discarded and the store restarts from the new
    /// initial state. Unchanged schemas leave the store alone.
    pub fn reconfigure(&mut self, inputs: FormInputs) -> Result<bool> {
        let schema = resolve_schema(&inputs, &self.locale, &self.type_defaults)?;
        self.inputs = inputs;

        if schema == self.schema {
            trace!("form inputs changed without changing the schema");
            return Ok(false);
        }

        debug!(
            previous = self.schema.len(),
            fields = schema.len(),
            "field set changed, resetting form state"
        );
        self.store.reset(schema.initial_state.clone());
        self.schema = schema;
        self.phase = SubmissionPhase::Idle;
        Ok(true)
    }

    /// Render descriptors for the current state.
    pub fn layout(&self) -> Result<FormLayout> {
        build_layout(
            &self.schema,
            self.store.state(),
            &self.locale,
            TimezoneLayout {
                source: self.timezone_source.as_ref(),
                formatter: &self.timezone_label_formatter,
            },
        )
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    pub fn state(&self) -> &FormState {
        self.store.state()
    }

    pub fn field_state(&self, name: &str) -> Option<&FieldState> {
        self.store.get(name)
    }

    /// Current errors, in field order.
    pub fn errors(&self) -> ErrorMap {
        self.store.errors()
    }

    pub fn runtime_fields(&self) -> &[RuntimeField] {
        &self.schema.runtime_fields
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn inputs(&self) -> &FormInputs {
        &self.inputs
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }
}

impl fmt::Debug for FormController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormController")
            .field("locale", &self.locale)
            .field("edit_policy", &self.edit_policy)
            .field("phase", &self.phase)
            .field("fields", &self.schema.len())
            .field("state", self.store.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::FieldDefinition;
    use std::sync::Mutex;

    fn profile_fields() -> FieldMap {
        let mut fields = FieldMap::new();
        fields.insert("name".into(), FieldDefinition::text().required(true).with_display("Name"));
        fields.insert("age".into(), FieldDefinition::number());
        fields.insert("id".into(), FieldDefinition::text().read_only(true).with_default("u-1"));
        fields
    }

    fn controller() -> FormController {
        FormController::builder()
            .fields(profile_fields())
            .on_confirm(|_| {})
            .build()
            .unwrap()
    }

    #[test]
    fn build_requires_on_confirm() {
        let err = FormController::builder()
            .fields(profile_fields())
            .build()
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn build_requires_a_field_source() {
        let err = FormController::builder().on_confirm(|_| {}).build().unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn edit_coerces_and_updates() {
        let mut form = controller();
        form.edit("age", "41").unwrap();
        assert_eq!(form.field_state("age").unwrap().value, FieldValue::Number(41.0));
    }

    #[test]
    fn edit_rejects_unknown_and_read_only_fields() {
        let mut form = controller();
        assert!(matches!(
            form.edit("nope", "x"),
            Err(FormsError::FieldNotFound { .. })
        ));
        assert!(matches!(
            form.edit("id", "u-2"),
            Err(FormsError::ReadOnlyField { .. })
        ));
        assert_eq!(form.field_state("id").unwrap().value, FieldValue::from("u-1"));
    }

    #[test]
    fn edit_rejects_excluded_fields() {
        let mut form = FormController::builder()
            .fields(profile_fields())
            .exclude_fields(["age"])
            .on_confirm(|_| {})
            .build()
            .unwrap();
        assert!(form.field_state("age").is_none());
        assert!(matches!(
            form.edit("age", "3"),
            Err(FormsError::FieldNotFound { .. })
        ));
    }

    #[test]
    fn phase_follows_submit_and_edit() {
        let mut form = controller();
        assert_eq!(form.phase(), SubmissionPhase::Idle);

        assert!(!form.submit().is_confirmed());
        assert_eq!(form.phase(), SubmissionPhase::Invalid);

        form.edit("name", "Ada").unwrap();
        assert_eq!(form.phase(), SubmissionPhase::Idle);

        assert!(form.submit().is_confirmed());
        assert_eq!(form.phase(), SubmissionPhase::Valid);
    }

    #[test]
    fn rejected_submit_writes_errors_back() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut form = FormController::builder()
            .fields(profile_fields())
            .on_confirm(|_| panic!("must not confirm"))
            .on_validation_error(move |errors| sink.lock().unwrap().push(errors.clone()))
            .build()
            .unwrap();

        let outcome = form.submit();
        let SubmitOutcome::Rejected(errors) = outcome else {
            panic!("expected rejection");
        };
        assert_eq!(errors["name"], "Name is required.");
        assert_eq!(form.errors(), errors);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn keep_error_policy_retains_message_until_next_submit() {
        let mut form = FormController::builder()
            .fields(profile_fields())
            .edit_policy(EditPolicy::KeepError)
            .on_confirm(|_| {})
            .build()
            .unwrap();

        form.submit();
        form.edit("name", "Ada").unwrap();
        assert!(form.field_state("name").unwrap().has_error());

        form.submit();
        assert!(form.errors().is_empty());
    }

    #[test]
    fn reconfigure_resets_only_on_schema_change() {
        let mut form = controller();
        form.edit("name", "Ada").unwrap();

        let same = FormInputs::new().with_fields(profile_fields());
        assert!(!form.reconfigure(same).unwrap());
        assert_eq!(form.field_state("name").unwrap().value, FieldValue::from("Ada"));

        let mut fields = profile_fields();
        fields.insert("email".into(), FieldDefinition::text());
        assert!(form.reconfigure(FormInputs::new().with_fields(fields)).unwrap());
        assert_eq!(form.field_state("name").unwrap().value, FieldValue::empty());
        assert_eq!(form.runtime_fields().len(), 4);
    }

    #[test]
    fn reconfigure_failure_keeps_current_form() {
        let mut form = controller();
        form.edit("name", "Ada").unwrap();
        assert!(form.reconfigure(FormInputs::new()).unwrap_err().is_configuration());
        assert_eq!(form.field_state("name").unwrap().value, FieldValue::from("Ada"));
        assert!(form.inputs().fields.is_some());
    }

    #[test]
    fn settings_feed_the_builder() {
        let settings = FormSettings {
            locale: String::new(),
            edit_policy: EditPolicy::KeepError,
            type_defaults: TypeDefaults::empty().with("number", 10),
        };
        let form = FormControllerBuilder::from_settings(&settings)
            .fields(profile_fields())
            .on_confirm(|_| {})
            .build()
            .unwrap();
        assert_eq!(form.field_state("age").unwrap().value, FieldValue::Number(10.0));
        assert_eq!(form.locale(), "");
    }
}
