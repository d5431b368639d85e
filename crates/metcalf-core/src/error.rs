//! Error types for Metcalf

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using MetcalfError
pub type Result<T> = std::result::Result<T, MetcalfError>;

/// Main error type for Metcalf operations
#[derive(Debug, Error)]
pub enum MetcalfError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Configuration-related errors.
///
/// Every variant is fatal: they are raised while the queue is being built,
/// before a single job has been admitted.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("No configuration file found in {0}.")]
    NotFound(PathBuf),

    /// Missing required field
    #[error("No {0} defined in configuration.")]
    MissingField(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// A task references a set that is neither local nor global
    #[error("Set \"{set}\" not found for task ID \"{task}\".")]
    SetNotFound { set: String, task: String },

    /// A set resolved to something other than an array
    #[error("Set \"{set}\" for task ID \"{task}\" is not an array.")]
    SetNotArray { set: String, task: String },

    /// A set member is not a string, number or boolean
    #[error("Set \"{set}\" for task ID \"{task}\" contains a value that is not a string or number.")]
    NonScalarValue { set: String, task: String },

    /// Values requested for a set are not part of its configured values
    #[error(
        "Value{} \"{}\" for set \"{set}\" for task ID \"{task}\" {} not configured.",
        plural_suffix(.values),
        .values.join(", "),
        plural_verb(.values)
    )]
    InvalidSetValues {
        values: Vec<String>,
        set: String,
        task: String,
    },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Whether the error points at the contents of an existing config file,
    /// as opposed to the file being absent or unreadable.
    pub fn concerns_contents(&self) -> bool {
        !matches!(self, Self::NotFound(_) | Self::Io(_))
    }
}

fn plural_suffix(values: &[String]) -> &'static str {
    if values.len() > 1 {
        "s"
    } else {
        ""
    }
}

fn plural_verb(values: &[String]) -> &'static str {
    if values.len() > 1 {
        "are"
    } else {
        "is"
    }
}

impl MetcalfError {
    /// The configuration error behind this error
    pub fn as_config(&self) -> &ConfigError {
        match self {
            Self::Config(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_single_value_message() {
        let err = ConfigError::InvalidSetValues {
            values: vec!["qa".to_string()],
            set: "env".to_string(),
            task: "build".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Value \"qa\" for set \"env\" for task ID \"build\" is not configured."
        );
    }

    #[test]
    fn test_invalid_multiple_values_message() {
        let err = ConfigError::InvalidSetValues {
            values: vec!["qa".to_string(), "uat".to_string()],
            set: "env".to_string(),
            task: "build".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Values \"qa, uat\" for set \"env\" for task ID \"build\" are not configured."
        );
    }

    #[test]
    fn test_concerns_contents() {
        assert!(!ConfigError::NotFound(PathBuf::from(".")).concerns_contents());
        assert!(ConfigError::MissingField("tasks".to_string()).concerns_contents());
    }

    #[test]
    fn test_as_config() {
        let err: MetcalfError = ConfigError::MissingField("command".to_string()).into();
        assert!(matches!(err.as_config(), ConfigError::MissingField(f) if f == "command"));
        assert_eq!(err.to_string(), "No command defined in configuration.");
    }
}
