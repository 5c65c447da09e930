//! Configuration types for the sweeping pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup.

use crate::error::{Result as SweepResult, SweepError};
use crate::types::FileFormat;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Default number of rows shown in a file preview.
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Configuration for the sweeping pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use datasweep::{FileFormat, PipelineConfig};
///
/// let config = PipelineConfig::builder()
///     .remove_duplicates(true)
///     .fill_missing_numeric(true)
///     .convert_to(FileFormat::Xlsx)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Drop rows that repeat an earlier row.
    /// Default: false
    pub remove_duplicates: bool,

    /// Fill missing numeric cells with the column mean.
    /// Default: false
    pub fill_missing_numeric: bool,

    /// Columns to keep, in output order. `None` keeps every column.
    pub columns: Option<Vec<String>>,

    /// Produce a chart summary of the first two numeric columns.
    /// Default: false
    pub chart: bool,

    /// Target format for export. `None` skips export.
    pub convert_to: Option<FileFormat>,

    /// Number of rows included in each file preview (at least 1).
    /// Default: 5
    pub preview_rows: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            remove_duplicates: false,
            fill_missing_numeric: false,
            columns: None,
            chart: false,
            convert_to: None,
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.preview_rows == 0 {
            return Err(ConfigValidationError::InvalidPreviewRows(self.preview_rows));
        }

        if let Some(columns) = &self.columns {
            let mut seen = HashSet::with_capacity(columns.len());
            for name in columns {
                if name.trim().is_empty() {
                    return Err(ConfigValidationError::BlankColumnName);
                }
                if !seen.insert(name.as_str()) {
                    return Err(ConfigValidationError::DuplicateColumn(name.clone()));
                }
            }
        }

        Ok(())
    }

    /// Parse a configuration from JSON and validate it.
    ///
    /// Missing keys take their default values.
    pub fn from_json(json: &str) -> SweepResult<Self> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> SweepResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Per-file choices derived from this configuration.
    pub fn file_options(&self) -> FileOptions {
        FileOptions::from(self)
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid preview rows: {0} (must be at least 1)")]
    InvalidPreviewRows(usize),

    #[error("Column '{0}' is selected more than once")]
    DuplicateColumn(String),

    #[error("Column selection contains a blank name")]
    BlankColumnName,
}

impl From<ConfigValidationError> for SweepError {
    fn from(err: ConfigValidationError) -> Self {
        SweepError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    remove_duplicates: Option<bool>,
    fill_missing_numeric: Option<bool>,
    columns: Option<Vec<String>>,
    chart: Option<bool>,
    convert_to: Option<FileFormat>,
    preview_rows: Option<usize>,
}

impl PipelineConfigBuilder {
    /// Enable or disable duplicate row removal.
    pub fn remove_duplicates(mut self, remove: bool) -> Self {
        self.remove_duplicates = Some(remove);
        self
    }

    /// Enable or disable mean imputation of numeric columns.
    pub fn fill_missing_numeric(mut self, fill: bool) -> Self {
        self.fill_missing_numeric = Some(fill);
        self
    }

    /// Keep only these columns, in this order.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Enable or disable the chart summary.
    pub fn chart(mut self, chart: bool) -> Self {
        self.chart = Some(chart);
        self
    }

    /// Export every processed file in this format.
    pub fn convert_to(mut self, format: FileFormat) -> Self {
        self.convert_to = Some(format);
        self
    }

    /// Set the number of preview rows.
    pub fn preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = Some(rows);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let config = PipelineConfig {
            remove_duplicates: self.remove_duplicates.unwrap_or(false),
            fill_missing_numeric: self.fill_missing_numeric.unwrap_or(false),
            columns: self.columns,
            chart: self.chart.unwrap_or(false),
            convert_to: self.convert_to,
            preview_rows: self.preview_rows.unwrap_or(DEFAULT_PREVIEW_ROWS),
        };

        config.validate()?;
        Ok(config)
    }
}

/// Choices the user made for one uploaded file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOptions {
    pub remove_duplicates: bool,
    pub fill_missing_numeric: bool,
    pub columns: Option<Vec<String>>,
    pub chart: bool,
    pub convert_to: Option<FileFormat>,
}

impl From<&PipelineConfig> for FileOptions {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            remove_duplicates: config.remove_duplicates,
            fill_missing_numeric: config.fill_missing_numeric,
            columns: config.columns.clone(),
            chart: config.chart,
            convert_to: config.convert_to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert!(!config.remove_duplicates);
        assert!(!config.fill_missing_numeric);
        assert!(!config.chart);
        assert_eq!(config.columns, None);
        assert_eq!(config.convert_to, None);
        assert_eq!(config.preview_rows, 5);
    }

    #[test]
    fn test_builder_defaults() {
        let config = PipelineConfig::builder().build().unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = PipelineConfig::builder()
            .remove_duplicates(true)
            .fill_missing_numeric(true)
            .columns(["B", "A"])
            .chart(true)
            .convert_to(FileFormat::Xlsx)
            .preview_rows(10)
            .build()
            .unwrap();

        assert!(config.remove_duplicates);
        assert!(config.fill_missing_numeric);
        assert_eq!(config.columns, Some(vec!["B".to_string(), "A".to_string()]));
        assert!(config.chart);
        assert_eq!(config.convert_to, Some(FileFormat::Xlsx));
        assert_eq!(config.preview_rows, 10);
    }

    #[test]
    fn test_validation_invalid_preview_rows() {
        let result = PipelineConfig::builder().preview_rows(0).build();

        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidPreviewRows(0)
        ));
    }

    #[test]
    fn test_validation_duplicate_column() {
        let result = PipelineConfig::builder().columns(["A", "B", "A"]).build();

        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::DuplicateColumn(ref name) if name == "A"
        ));
    }

    #[test]
    fn test_validation_blank_column() {
        let result = PipelineConfig::builder().columns(["A", " "]).build();
        assert!(matches!(result.unwrap_err(), ConfigValidationError::BlankColumnName));
    }

    #[test]
    fn test_validation_error_converts() {
        let err: SweepError = ConfigValidationError::InvalidPreviewRows(0).into();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_file_options_from_config() {
        let config = PipelineConfig::builder()
            .fill_missing_numeric(true)
            .convert_to(FileFormat::Csv)
            .build()
            .unwrap();
        let options = config.file_options();

        assert!(!options.remove_duplicates);
        assert!(options.fill_missing_numeric);
        assert_eq!(options.convert_to, Some(FileFormat::Csv));
    }

    #[test]
    fn test_pipeline_config_from_json() {
        // Simulate JSON that might come from a frontend
        let json = r#"{
            "remove_duplicates": true,
            "columns": ["region", "total"],
            "convert_to": "xlsx"
        }"#;

        let config = PipelineConfig::from_json(json).expect("Should deserialize from frontend JSON");

        assert!(config.remove_duplicates);
        assert!(!config.fill_missing_numeric);
        assert_eq!(
            config.columns,
            Some(vec!["region".to_string(), "total".to_string()])
        );
        assert_eq!(config.convert_to, Some(FileFormat::Xlsx));
        assert_eq!(config.preview_rows, 5);
    }

    #[test]
    fn test_from_json_rejects_malformed_input() {
        let err = PipelineConfig::from_json(r#"{"chart": "yes"}"#).unwrap_err();
        assert_eq!(err.error_code(), "JSON_ERROR");
    }

    #[test]
    fn test_from_json_validates() {
        let err = PipelineConfig::from_json(r#"{"preview_rows": 0}"#).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_from_json_file_missing() {
        let err = PipelineConfig::from_json_file("/nonexistent/datasweep.json").unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }
}
