//! Domain-specific error types for the writing feature extractor

use thiserror::Error;

/// Main error type for feature extraction
#[derive(Error, Debug)]
pub enum FeatureExtractorError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Configuration error: no features provided for schema creation")]
    NoFeatures,

    #[error("Configuration error: unknown built-in feature '{name}'")]
    UnknownFeature { name: String },

    #[error("Configuration error: custom feature '{name}' has no levels configured")]
    MissingLevels { name: String },

    #[error("Configuration error: feature identity '{identity}' is configured more than once")]
    DuplicateFeature { identity: String },

    #[error("Configuration error: feature '{feature}' lists level '{level}' more than once")]
    DuplicateLevel { feature: String, level: String },

    #[error("File operation error: {message}")]
    FileOperation { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Model error: {message}")]
    Model { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl FeatureExtractorError {
    pub fn config(message: impl Into<String>) -> Self {
        FeatureExtractorError::Configuration {
            message: message.into(),
        }
    }

    pub fn file(message: impl Into<String>) -> Self {
        FeatureExtractorError::FileOperation {
            message: message.into(),
        }
    }

    /// Configuration errors abort a run before any model call is made.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            FeatureExtractorError::Configuration { .. }
                | FeatureExtractorError::NoFeatures
                | FeatureExtractorError::UnknownFeature { .. }
                | FeatureExtractorError::MissingLevels { .. }
                | FeatureExtractorError::DuplicateFeature { .. }
                | FeatureExtractorError::DuplicateLevel { .. }
        )
    }
}

impl From<anyhow::Error> for FeatureExtractorError {
    fn from(err: anyhow::Error) -> Self {
        FeatureExtractorError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for FeatureExtractorError {
    fn from(err: serde_json::Error) -> Self {
        FeatureExtractorError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for FeatureExtractorError {
    fn from(err: toml::de::Error) -> Self {
        FeatureExtractorError::Configuration {
            message: format!("invalid TOML: {}", err),
        }
    }
}

impl From<std::io::Error> for FeatureExtractorError {
    fn from(err: std::io::Error) -> Self {
        FeatureExtractorError::FileOperation {
            message: err.to_string(),
        }
    }
}

impl From<csv::Error> for FeatureExtractorError {
    fn from(err: csv::Error) -> Self {
        FeatureExtractorError::FileOperation {
            message: format!("CSV write failed: {}", err),
        }
    }
}

impl From<crate::clients::ModelError> for FeatureExtractorError {
    fn from(err: crate::clients::ModelError) -> Self {
        FeatureExtractorError::Model {
            message: err.to_string(),
        }
    }
}

/// Result type alias for feature extractor operations
pub type Result<T> = std::result::Result<T, FeatureExtractorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_variants_are_classified() {
        assert!(FeatureExtractorError::NoFeatures.is_configuration());
        assert!(
            FeatureExtractorError::MissingLevels {
                name: "Tension".into()
            }
            .is_configuration()
        );
        assert!(!FeatureExtractorError::file("disk full").is_configuration());
    }

    #[test]
    fn toml_errors_become_configuration_errors() {
        let err: FeatureExtractorError = toml::from_str::<toml::Value>("features = [")
            .unwrap_err()
            .into();
        assert!(err.is_configuration());
    }
}
