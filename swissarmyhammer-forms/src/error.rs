//! Error types for the forms engine
//!
//! Only configuration and loading problems are errors. A field that fails
//! validation is reported through the error map of a
//! [`ValidationOutcome`](crate::validation::ValidationOutcome), never here.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for forms operations
pub type Result<T> = std::result::Result<T, FormsError>;

/// Errors that can occur while building or driving a form
#[derive(Debug, Error)]
pub enum FormsError {
    /// The form cannot be constructed from the supplied configuration
    #[error("form configuration error: {message}")]
    Configuration { message: String },

    /// An edit targeted a field that is not part of the runtime field set
    #[error("field not found: {name}")]
    FieldNotFound { name: String },

    /// An edit targeted a read-only field
    #[error("field is read-only: {name}")]
    ReadOnlyField { name: String },

    /// A declarative `pattern` rule does not compile
    #[error("invalid pattern for field '{field}': {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    /// Form template file has an extension we cannot parse
    #[error("unsupported form template format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Settings could not be extracted from their sources
    #[error("failed to load form settings: {0}")]
    Settings(#[from] Box<figment::Error>),
}

impl FormsError {
    /// Neither explicit definitions nor seed values were supplied.
    pub fn missing_field_source() -> Self {
        Self::Configuration {
            message: "either fields or seed values must be provided".into(),
        }
    }

    /// Whether this error aborts form construction.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

impl From<figment::Error> for FormsError {
    fn from(error: figment::Error) -> Self {
        Self::Settings(Box::new(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FormsError::FieldNotFound {
            name: "status".into(),
        };
        assert_eq!(err.to_string(), "field not found: status");
    }

    #[test]
    fn test_missing_field_source() {
        let err = FormsError::missing_field_source();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("seed values"));
    }

    #[test]
    fn test_read_only_is_not_configuration() {
        let err = FormsError::ReadOnlyField { name: "id".into() };
        assert!(!err.is_configuration());
        assert!(err.to_string().contains("id"));
    }
}
