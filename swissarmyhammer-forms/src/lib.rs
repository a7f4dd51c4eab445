//! Dynamic form state and validation engine
//!
//! `swissarmyhammer-forms` takes a declarative description of fields (explicit
//! definitions, or a record of current values to infer them from), tracks each
//! field's value and error, coerces raw input into typed values and validates
//! on submit. Rendering is left to the caller; the engine hands out
//! [`FieldDescriptor`]s describing what to draw.
//!
//! # Architecture
//!
//! - **Resolver**: explicit definitions win; otherwise one definition is inferred per seed value
//! - **Store**: a pure reducer over `{value, error}` pairs, reset whenever the field set changes
//! - **Coercion**: total conversion of raw input; bad numbers become empty, never an error
//! - **Validation**: required check, then validators in order until the first failure
//! - **Controller**: wires the above together and reports to confirm / error callbacks
//!
//! ```
//! use swissarmyhammer_forms::{FieldDefinition, FieldMap, FormController, SubmitOutcome};
//!
//! let mut fields = FieldMap::new();
//! fields.insert("name".into(), FieldDefinition::text().required(true));
//!
//! let mut form = FormController::builder()
//!     .fields(fields)
//!     .on_confirm(|values| println!("saved {values:?}"))
//!     .build()?;
//!
//! form.edit("name", "Ada")?;
//! assert!(matches!(form.submit(), SubmitOutcome::Confirmed(_)));
//! # Ok::<(), swissarmyhammer_forms::FormsError>(())
//! ```

pub mod coerce;
pub mod controller;
pub mod definition;
pub mod error;
pub mod label;
pub mod layout;
pub mod resolver;
pub mod settings;
pub mod state;
pub mod template;
pub mod timezone;
pub mod validation;
pub mod value;

pub use coerce::coerce;
pub use controller::{
    ErrorMap, FormController, FormControllerBuilder, FormInputs, SubmissionPhase, SubmitOutcome,
};
pub use definition::{
    FieldDefinition, FieldKind, FieldOption, TypeDefaults, ValidationResult, Validator,
};
pub use error::{FormsError, Result};
pub use label::{to_display_label, to_display_label_simple};
pub use layout::{DisplayValue, FieldDescriptor, FormLayout, WidgetKind};
pub use resolver::{FieldMap, FormSchema, RuntimeField, ValueMap};
pub use settings::FormSettings;
pub use state::{EditPolicy, FieldState, FormAction, FormState, FormStore};
pub use template::{FieldTemplate, FormTemplate, ValidationRules};
pub use timezone::{BuiltinTimezones, Timezone, TimezoneLabelFormatter, TimezoneSource};
pub use validation::{validate, ValidationOutcome};
pub use value::FieldValue;
