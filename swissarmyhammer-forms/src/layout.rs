//! Render descriptors handed to a presentation layer.
//!
//! The engine never draws anything. It describes each runtime field (widget,
//! label, current value, error, options) and splits the list into editable and
//! read-only groups; turning that into markup is the caller's business.

use serde::Serialize;

use crate::definition::{FieldKind, FieldOption};
use crate::error::Result;
use crate::label::to_display_label;
use crate::resolver::{FormSchema, RuntimeField};
use crate::state::FormState;
use crate::timezone::{timezone_options, TimezoneLabelFormatter, TimezoneSource};
use crate::value::FieldValue;

/// Widget a presentation layer should render for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    Text,
    Password,
    Select,
    Checkbox,
}

impl WidgetKind {
    /// Pick a widget from the field kind, with a few name-based fallbacks.
    pub fn for_field(name: &str, kind: &FieldKind) -> Self {
        if *kind == FieldKind::Boolean {
            WidgetKind::Checkbox
        } else if *kind == FieldKind::Password || name.to_lowercase().contains("password") {
            WidgetKind::Password
        } else if is_timezone(name, kind) || *kind == FieldKind::Select {
            WidgetKind::Select
        } else {
            WidgetKind::Text
        }
    }
}

fn is_timezone(name: &str, kind: &FieldKind) -> bool {
    *kind == FieldKind::Timezone || matches!(name.to_lowercase().as_str(), "tz" | "timezone")
}

/// Current value in the shape its widget expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DisplayValue {
    Bool(bool),
    Text(String),
    List(Vec<String>),
}

impl DisplayValue {
    fn for_widget(widget: WidgetKind, value: &FieldValue) -> Self {
        match (widget, value) {
            (WidgetKind::Checkbox, value) => DisplayValue::Bool(value.is_truthy()),
            (_, FieldValue::List(items)) => DisplayValue::List(items.clone()),
            (_, value) => DisplayValue::Text(value.to_string()),
        }
    }
}

/// Everything a presentation layer needs to draw one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub widget: WidgetKind,
    pub value: DisplayValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub helper_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    /// Read-only fields render disabled.
    pub disabled: bool,
}

/// Descriptors split into the two groups a form lays out separately.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FormLayout {
    pub editable: Vec<FieldDescriptor>,
    pub read_only: Vec<FieldDescriptor>,
}

impl FormLayout {
    /// All descriptors, editable first.
    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.editable.iter().chain(self.read_only.iter())
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.iter().find(|d| d.name == name)
    }
}

/// Timezone collaborators used when laying out timezone selects.
pub struct TimezoneLayout<'a> {
    pub source: &'a dyn TimezoneSource,
    pub formatter: &'a TimezoneLabelFormatter,
}

/// Describe every runtime field of `schema` against the current `state`.
pub fn build_layout(
    schema: &FormSchema,
    state: &FormState,
    locale: &str,
    timezones: TimezoneLayout<'_>,
) -> Result<FormLayout> {
    let mut layout = FormLayout::default();
    let mut timezone_list: Option<Vec<FieldOption>> = None;

    for field in &schema.runtime_fields {
        let widget = WidgetKind::for_field(&field.name, &field.definition.kind);

        let options = if widget == WidgetKind::Select
            && is_timezone(&field.name, &field.definition.kind)
        {
            if timezone_list.is_none() {
                timezone_list = Some(timezone_options(
                    timezones.source,
                    timezones.formatter,
                    locale,
                )?);
            }
            timezone_list.clone().unwrap_or_default()
        } else {
            field.definition.options.clone().unwrap_or_default()
        };

        let descriptor = describe(field, state, widget, options, locale);
        if field.read_only {
            layout.read_only.push(descriptor);
        } else {
            layout.editable.push(descriptor);
        }
    }

    Ok(layout)
}

fn describe(
    field: &RuntimeField,
    state: &FormState,
    widget: WidgetKind,
    options: Vec<FieldOption>,
    locale: &str,
) -> FieldDescriptor {
    let definition = &field.definition;
    let current = state.get(&field.name);
    let empty = FieldValue::empty();

    FieldDescriptor {
        name: field.name.clone(),
        label: definition
            .display
            .clone()
            .unwrap_or_else(|| to_display_label(&field.name, locale)),
        kind: definition.kind.clone(),
        widget,
        value: DisplayValue::for_widget(widget, current.map_or(&empty, |s| &s.value)),
        error: current.and_then(|s| s.error.clone()),
        helper_text: definition.helper_text.clone(),
        placeholder: definition.placeholder.clone(),
        description: definition.description.clone(),
        options,
        disabled: field.read_only,
    }
}
