//! Engine-wide settings loaded with figment.
//!
//! Sources in precedence order (later sources override earlier ones):
//! 1. Built-in defaults
//! 2. An optional settings file (`.toml`, `.yaml`, `.yml` or `.json`)
//! 3. Environment variables prefixed with `SAH_FORMS_`; nested keys use `__`,
//!    e.g. `SAH_FORMS_TYPE_DEFAULTS__NUMBER=1`

use std::path::Path;

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::definition::TypeDefaults;
use crate::error::{FormsError, Result};
use crate::state::EditPolicy;

/// Environment variable prefix for settings overrides.
pub const ENV_PREFIX: &str = "SAH_FORMS_";

/// Defaults applied to every form built from these settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSettings {
    /// Locale for derived labels and timezone labels.
    pub locale: String,
    pub edit_policy: EditPolicy,
    /// Overrides layered over the built-in type default table.
    pub type_defaults: TypeDefaults,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            locale: "en".to_string(),
            edit_policy: EditPolicy::default(),
            type_defaults: TypeDefaults::empty(),
        }
    }
}

impl FormSettings {
    /// Load from defaults and the environment only.
    pub fn load() -> Result<Self> {
        Self::from_figment(Self::figment(None)?)
    }

    /// Load from defaults, `path`, then the environment.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_figment(Self::figment(Some(path.as_ref()))?)
    }

    /// Build the layered figment without extracting it.
    pub fn figment(path: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(FormSettings::default()));

        if let Some(path) = path {
            trace!("Loading form settings file: {}", path.display());
            figment = match path.extension().and_then(|e| e.to_str()) {
                Some("toml") => figment.merge(Toml::file(path)),
                Some("yaml") | Some("yml") => figment.merge(Yaml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                _ => {
                    return Err(FormsError::UnsupportedFormat {
                        path: path.to_path_buf(),
                    })
                }
            };
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let settings: FormSettings = figment.extract()?;
        debug!(
            locale = %settings.locale,
            edit_policy = ?settings.edit_policy,
            "loaded form settings"
        );
        Ok(settings)
    }

    /// The built-in type defaults with this table's overrides applied.
    pub fn effective_type_defaults(&self) -> TypeDefaults {
        TypeDefaults::default().merged(&self.type_defaults)
    }
}
