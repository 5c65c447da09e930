//! Custom error types for the sweeping pipeline.
//!
//! This module provides the error hierarchy using `thiserror` for every
//! fallible step of the pipeline: decoding, projection, cleaning and encoding.
//!
//! Errors are serializable so a presentation shell can forward them to a
//! frontend as `{ code, message }` pairs.

use crate::types::FileFormat;
use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// Boxed cause carried by decode failures.
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The main error type for the sweeping pipeline.
#[derive(Error, Debug)]
pub enum SweepError {
    /// File extension is not one of the recognized tabular formats.
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    /// Content does not conform to the claimed format.
    #[error("Failed to parse {format} content: {source}")]
    ParseFailed {
        format: FileFormat,
        #[source]
        source: BoxedCause,
    },

    /// Projection requested a column that does not exist.
    #[error("Column '{0}' not found in table")]
    UnknownColumn(String),

    /// Projection requested the same column more than once.
    #[error("Invalid column selection: {0}")]
    InvalidSelection(String),

    /// Unexpected internal fault during cleaning or encoding.
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<SweepError>,
    },
}

impl SweepError {
    /// Build a parse failure for `format` from any error type.
    pub fn parse_failed<E>(format: FileFormat, source: E) -> Self
    where
        E: Into<BoxedCause>,
    {
        SweepError::ParseFailed {
            format,
            source: source.into(),
        }
    }

    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        SweepError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::ParseFailed { .. } => "PARSE_ERROR",
            Self::UnknownColumn(_) => "UNKNOWN_COLUMN",
            Self::InvalidSelection(_) => "INVALID_SELECTION",
            Self::ProcessingFailed(_) => "PROCESSING_FAILURE",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// The innermost error, skipping any context wrappers.
    pub fn root(&self) -> &SweepError {
        match self {
            Self::WithContext { source, .. } => source.root(),
            other => other,
        }
    }

    /// Check if this error was raised while reading the input file.
    pub fn is_decode_failure(&self) -> bool {
        matches!(
            self.root(),
            Self::UnsupportedFormat(_) | Self::ParseFailed { .. }
        )
    }
}

/// Serialize implementation for frontend compatibility.
///
/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for SweepError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("SweepError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, SweepError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_code() {
        assert_eq!(
            SweepError::UnsupportedFormat(".txt".to_string()).error_code(),
            "UNSUPPORTED_FORMAT"
        );
        assert_eq!(
            SweepError::UnknownColumn("Z".to_string()).error_code(),
            "UNKNOWN_COLUMN"
        );
    }

    #[test]
    fn test_parse_failed_keeps_cause() {
        let cause = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad row 3");
        let error = SweepError::parse_failed(FileFormat::Csv, cause);

        assert_eq!(error.error_code(), "PARSE_ERROR");
        assert!(error.to_string().contains("bad row 3"));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_is_decode_failure() {
        assert!(SweepError::UnsupportedFormat(".txt".to_string()).is_decode_failure());
        assert!(
            SweepError::UnsupportedFormat(".txt".to_string())
                .with_context("Error reading data.txt")
                .is_decode_failure()
        );
        assert!(!SweepError::UnknownColumn("Z".to_string()).is_decode_failure());
    }

    #[test]
    fn test_error_serialization() {
        let error = SweepError::UnknownColumn("Age".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("UNKNOWN_COLUMN"));
        assert!(json.contains("Age"));
    }

    #[test]
    fn test_with_context() {
        let error = SweepError::ProcessingFailed("boom".to_string())
            .with_context("Error processing sales.csv");
        assert!(error.to_string().contains("sales.csv"));
        assert_eq!(error.error_code(), "PROCESSING_FAILURE");
    }
}
