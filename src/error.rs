//! Error types for the garment_query library

use thiserror::Error;

/// Result type alias for garment_query operations
pub type Result<T> = std::result::Result<T, QueryError>;

/// Errors surfaced by the decoder, the history stores and configuration loading.
///
/// The derivation pipeline itself never returns these: decode failures are
/// absorbed into a blank result and classifier/swatch failures degrade to defaults.
#[derive(Error, Debug)]
pub enum QueryError {
    /// Image could not be read or decoded
    #[error("Failed to load image: {message}")]
    ImageLoadError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Image reference points at a format we cannot decode
    #[error("Unsupported image format: {image_ref}")]
    UnsupportedFormat { image_ref: String },

    /// History store operation failed
    #[error("History store error: {operation}")]
    StoreError {
        operation: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    /// Configuration could not be read, parsed or written
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    /// Background task failed to complete
    #[error("Processing error: {message}")]
    ProcessingError { message: String },
}

impl QueryError {
    /// Create an image load error with context
    pub fn image_load<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ImageLoadError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a store error wrapping a SQLite failure
    pub fn store(operation: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::StoreError {
            operation: operation.into(),
            source: Some(source),
        }
    }

    /// Create a configuration error with context
    pub fn config<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ConfigError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid(parameter: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }

    /// Check if this error indicates a condition the user can retry past
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            QueryError::ImageLoadError { .. }
                | QueryError::UnsupportedFormat { .. }
                | QueryError::ProcessingError { .. }
        )
    }

    /// Get user-friendly error description for application display
    pub fn user_message(&self) -> String {
        match self {
            QueryError::ImageLoadError { .. } => {
                "Could not load the photo. Please try taking or choosing another one.".to_string()
            }
            QueryError::UnsupportedFormat { .. } => {
                "This image format is not supported. Please use a JPEG or PNG photo.".to_string()
            }
            QueryError::StoreError { .. } => {
                "Could not access saved searches. Please try again.".to_string()
            }
            QueryError::ConfigError { .. } | QueryError::InvalidParameter { .. } => {
                "The application settings are invalid.".to_string()
            }
            QueryError::ProcessingError { .. } => {
                "Something went wrong while processing. Please try again.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QueryError::invalid("sample_stride", 0);
        assert_eq!(err.to_string(), "Invalid parameter: sample_stride = 0");

        let err = QueryError::UnsupportedFormat {
            image_ref: "photo.xyz".into(),
        };
        assert_eq!(err.to_string(), "Unsupported image format: photo.xyz");
    }

    #[test]
    fn test_recoverable_classification() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert!(QueryError::image_load("open", io).is_recoverable());
        assert!(!QueryError::invalid("region_start", 0.9).is_recoverable());
        assert!(!QueryError::store("insert", rusqlite::Error::InvalidQuery).is_recoverable());
    }

    #[test]
    fn test_source_is_preserved() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = QueryError::image_load("open", io);
        assert!(err.source().is_some());
        assert!(err.user_message().contains("photo"));
    }
}
