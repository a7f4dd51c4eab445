//! Timezone options for timezone fields.
//!
//! The list itself comes from a [`TimezoneSource`]. The engine only relies on
//! the sort order (UTC offset string, then timezone code) and on a label
//! formatter the caller may override.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::definition::FieldOption;
use crate::error::Result;

const BUILTIN_TIMEZONES: &str = include_str!("../data/timezones.yaml");

/// One timezone entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timezone {
    pub tz_code: String,
    pub label: String,
    /// Offset string such as `+05:30`.
    pub utc: String,
}

/// Renders a timezone label for a locale.
pub type TimezoneLabelFormatter = Arc<dyn Fn(&Timezone, &str) -> String + Send + Sync>;

/// `"{label} ({utc})"`, ignoring the locale.
pub fn default_label_formatter() -> TimezoneLabelFormatter {
    Arc::new(|tz: &Timezone, _locale: &str| format!("{} ({})", tz.label, tz.utc))
}

/// Supplies the unsorted timezone list.
pub trait TimezoneSource: Send + Sync {
    fn timezones(&self) -> Result<Vec<Timezone>>;
}

/// The list bundled with this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTimezones;

impl TimezoneSource for BuiltinTimezones {
    fn timezones(&self) -> Result<Vec<Timezone>> {
        Ok(serde_yaml_ng::from_str(BUILTIN_TIMEZONES)?)
    }
}

/// A fixed, caller-provided list.
impl TimezoneSource for Vec<Timezone> {
    fn timezones(&self) -> Result<Vec<Timezone>> {
        Ok(self.clone())
    }
}

/// Sort ascending by UTC offset string, ties broken by timezone code.
pub fn sort_timezones(mut timezones: Vec<Timezone>) -> Vec<Timezone> {
    timezones.sort_by(|a, b| a.utc.cmp(&b.utc).then_with(|| a.tz_code.cmp(&b.tz_code)));
    timezones
}

/// Sorted select options: value is the timezone code, label comes from `formatter`.
pub fn timezone_options(
    source: &dyn TimezoneSource,
    formatter: &TimezoneLabelFormatter,
    locale: &str,
) -> Result<Vec<FieldOption>> {
    Ok(sort_timezones(source.timezones()?)
        .iter()
        .map(|tz| FieldOption::new(tz.tz_code.clone(), formatter(tz, locale)))
        .collect())
}
