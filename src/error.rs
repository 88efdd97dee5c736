//! Error types for Educador IA
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Educador IA operations
///
/// Covers configuration loading, the remote text and image generation
/// calls, local history persistence and file export.
#[derive(Error, Debug)]
pub enum EducadorError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Text stream failed (network, endpoint status, aborted stream)
    #[error("Generation error: {0}")]
    Generation(String),

    /// Image call failed, or succeeded without an image payload
    #[error("Image generation error: {0}")]
    ImageGeneration(String),

    /// Persisted history read/write failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Missing API key for the generation endpoint
    #[error("Missing credentials for provider: {0}")]
    MissingCredentials(String),

    /// Writing an exported file failed
    #[error("Export error: {0}")]
    Export(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Image decoding/encoding errors
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type alias for Educador IA operations
///
/// Uses `anyhow::Error` as the error type so callers can attach context
/// and still downcast to [`EducadorError`] where the variant matters.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = EducadorError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_generation_error_display() {
        let error = EducadorError::Generation("stream aborted".to_string());
        assert_eq!(error.to_string(), "Generation error: stream aborted");
    }

    #[test]
    fn test_image_generation_error_display() {
        let error = EducadorError::ImageGeneration("Nenhuma imagem foi gerada.".to_string());
        assert_eq!(
            error.to_string(),
            "Image generation error: Nenhuma imagem foi gerada."
        );
    }

    #[test]
    fn test_storage_error_display() {
        let error = EducadorError::Storage("database locked".to_string());
        assert_eq!(error.to_string(), "Storage error: database locked");
    }

    #[test]
    fn test_missing_credentials_error_display() {
        let error = EducadorError::MissingCredentials("gemini".to_string());
        assert_eq!(error.to_string(), "Missing credentials for provider: gemini");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: EducadorError = io_error.into();
        assert!(matches!(error, EducadorError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let error: EducadorError = json_error.into();
        assert!(matches!(error, EducadorError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: : yaml").unwrap_err();
        let error: EducadorError = yaml_error.into();
        assert!(matches!(error, EducadorError::Yaml(_)));
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let err: anyhow::Error = EducadorError::Generation("boom".to_string()).into();
        assert!(matches!(
            err.downcast_ref::<EducadorError>(),
            Some(EducadorError::Generation(_))
        ));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EducadorError>();
    }
}
