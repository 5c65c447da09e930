use crate::error::{Result, SweepError};
use crate::pipeline::StatusMessage;
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

// ============================================================================
// File Formats
// ============================================================================

/// Tabular file formats understood by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    /// Comma-separated values.
    Csv,
    /// Office Open XML spreadsheet (first sheet only).
    Xlsx,
}

impl FileFormat {
    /// Media type for the Office Open XML spreadsheet format.
    pub const XLSX_MEDIA_TYPE: &'static str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

    /// Detect the format from a file name suffix (case-insensitive).
    ///
    /// Fails with [`SweepError::UnsupportedFormat`] naming the suffix.
    pub fn from_file_name(name: &str) -> Result<Self> {
        let extension = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("csv") => Ok(FileFormat::Csv),
            Some("xlsx") => Ok(FileFormat::Xlsx),
            Some(other) => Err(SweepError::UnsupportedFormat(format!(".{}", other))),
            None => Err(SweepError::UnsupportedFormat("(none)".to_string())),
        }
    }

    /// Canonical file extension, without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
        }
    }

    /// Standard media type label for download responses.
    pub fn media_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Xlsx => Self::XLSX_MEDIA_TYPE,
        }
    }

    /// Human-readable label used in status messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Xlsx => "Excel",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for FileFormat {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(FileFormat::Csv),
            "xlsx" | "excel" => Ok(FileFormat::Xlsx),
            other => Err(SweepError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Replace everything after the last `.` of `source_name` with the
/// canonical extension of `format`.
///
/// A name without a dot gets the extension appended.
pub fn output_file_name(source_name: &str, format: FileFormat) -> String {
    let stem = match source_name.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => source_name,
    };
    format!("{}.{}", stem, format.extension())
}

// ============================================================================
// Uploaded Files
// ============================================================================

/// A single uploaded file: its name and raw content.
///
/// Read once by the pipeline and never mutated.
#[derive(Debug, Clone)]
pub struct SourceFile {
    name: String,
    bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Detected format, derived from the name suffix.
    pub fn format(&self) -> Result<FileFormat> {
        FileFormat::from_file_name(&self.name)
    }
}

// ============================================================================
// Column Metadata
// ============================================================================

/// Inferred type tag of a column, decided once at decode time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Integer or floating point values (with optional missing cells).
    Numeric,
    /// Anything that did not parse as a number.
    Text,
}

/// Preview metadata for one column of a [`Table`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub kind: ColumnKind,
    /// Underlying storage type (e.g. `i64`, `f64`, `str`).
    pub dtype: String,
    pub missing_count: usize,
}

// ============================================================================
// Chart Summary
// ============================================================================

/// Full ordered values of one numeric column, for charting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Values of up to two numeric columns, aligned by row index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub series: Vec<ChartSeries>,
}

impl ChartData {
    /// Names of the charted columns, in table order.
    pub fn column_names(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.name.as_str()).collect()
    }

    /// Number of rows covered by the chart.
    pub fn len(&self) -> usize {
        self.series.first().map_or(0, |s| s.values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate rows as `(row_index, values)` with one value per series.
    pub fn rows(&self) -> impl Iterator<Item = (usize, Vec<Option<f64>>)> + '_ {
        (0..self.len()).map(move |idx| {
            let values = self
                .series
                .iter()
                .map(|s| s.values.get(idx).copied().flatten())
                .collect();
            (idx, values)
        })
    }
}

/// Result of summarizing a table for visualization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ChartOutcome {
    Chart(ChartData),
    /// No numeric column is available.
    Empty,
}

impl ChartOutcome {
    pub fn is_empty(&self) -> bool {
        matches!(self, ChartOutcome::Empty)
    }

    pub fn data(&self) -> Option<&ChartData> {
        match self {
            ChartOutcome::Chart(data) => Some(data),
            ChartOutcome::Empty => None,
        }
    }
}

// ============================================================================
// Export
// ============================================================================

/// Encoded output ready for a download response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedFile {
    pub file_name: String,
    pub media_type: &'static str,
    pub format: FileFormat,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub size_bytes: usize,
}

impl ExportedFile {
    pub fn new(source_name: &str, format: FileFormat, bytes: Vec<u8>) -> Self {
        Self {
            file_name: output_file_name(source_name, format),
            media_type: format.media_type(),
            format,
            size_bytes: bytes.len(),
            bytes,
        }
    }
}

// ============================================================================
// Pipeline Results
// ============================================================================

/// Per-file output of a pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub file_name: String,
    /// Position of the file in the uploaded batch.
    pub index: usize,
    /// Cleaned and projected table.
    #[serde(skip)]
    pub table: Table,
    pub row_count: usize,
    pub columns: Vec<ColumnInfo>,
    /// First rows of the table, one JSON value per cell.
    pub preview: Vec<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportedFile>,
    pub statuses: Vec<StatusMessage>,
}

/// Outcome of processing one file of a batch.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Processed(PipelineResult),
    Failed {
        file_name: String,
        index: usize,
        error: SweepError,
        statuses: Vec<StatusMessage>,
    },
}

impl FileOutcome {
    pub fn file_name(&self) -> &str {
        match self {
            FileOutcome::Processed(result) => &result.file_name,
            FileOutcome::Failed { file_name, .. } => file_name,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FileOutcome::Processed(_))
    }

    pub fn result(&self) -> Option<&PipelineResult> {
        match self {
            FileOutcome::Processed(result) => Some(result),
            FileOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&SweepError> {
        match self {
            FileOutcome::Processed(_) => None,
            FileOutcome::Failed { error, .. } => Some(error),
        }
    }

    pub fn statuses(&self) -> &[StatusMessage] {
        match self {
            FileOutcome::Processed(result) => &result.statuses,
            FileOutcome::Failed { statuses, .. } => statuses,
        }
    }
}

/// Outcomes of a batch of uploads, in upload order.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub files: Vec<FileOutcome>,
    pub succeeded: usize,
    pub failed: usize,
    pub duration_ms: u64,
    /// Closing batch-level message.
    pub status: StatusMessage,
}

impl BatchReport {
    pub fn new(files: Vec<FileOutcome>, duration_ms: u64) -> Self {
        let succeeded = files.iter().filter(|f| f.is_success()).count();
        let failed = files.len() - succeeded;
        let status = if files.is_empty() {
            StatusMessage::info("", "No files to process")
        } else if failed == 0 {
            StatusMessage::success("", "All files processed")
        } else {
            StatusMessage::warning(
                "",
                format!("All files processed ({} of {} failed)", failed, files.len()),
            )
        };

        Self {
            files,
            succeeded,
            failed,
            duration_ms,
            status,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Successfully processed files, in upload order.
    pub fn results(&self) -> impl Iterator<Item = &PipelineResult> {
        self.files.iter().filter_map(FileOutcome::result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_file_name() {
        assert_eq!(FileFormat::from_file_name("data.csv").unwrap(), FileFormat::Csv);
        assert_eq!(FileFormat::from_file_name("DATA.XLSX").unwrap(), FileFormat::Xlsx);
        assert_eq!(
            FileFormat::from_file_name("archive.tar.csv").unwrap(),
            FileFormat::Csv
        );
    }

    #[test]
    fn test_format_unsupported_extension() {
        let err = FileFormat::from_file_name("data.txt").unwrap_err();
        assert!(matches!(err, SweepError::UnsupportedFormat(ref ext) if ext == ".txt"));

        let err = FileFormat::from_file_name("README").unwrap_err();
        assert!(matches!(err, SweepError::UnsupportedFormat(ref ext) if ext == "(none)"));
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("CSV".parse::<FileFormat>().unwrap(), FileFormat::Csv);
        assert_eq!("Excel".parse::<FileFormat>().unwrap(), FileFormat::Xlsx);
        assert_eq!("xlsx".parse::<FileFormat>().unwrap(), FileFormat::Xlsx);
        assert!("parquet".parse::<FileFormat>().is_err());
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("sales.xlsx", FileFormat::Csv), "sales.csv");
        assert_eq!(output_file_name("sales.v2.csv", FileFormat::Xlsx), "sales.v2.xlsx");
        assert_eq!(output_file_name("sales", FileFormat::Csv), "sales.csv");
    }

    #[test]
    fn test_media_types() {
        assert_eq!(FileFormat::Csv.media_type(), "text/csv");
        assert_eq!(
            FileFormat::Xlsx.media_type(),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
    }

    #[test]
    fn test_chart_rows_align_by_index() {
        let chart = ChartData {
            series: vec![
                ChartSeries {
                    name: "A".to_string(),
                    values: vec![Some(1.0), Some(3.0)],
                },
                ChartSeries {
                    name: "B".to_string(),
                    values: vec![Some(2.0), None],
                },
            ],
        };

        let rows: Vec<_> = chart.rows().collect();
        assert_eq!(rows, vec![(0, vec![Some(1.0), Some(2.0)]), (1, vec![Some(3.0), None])]);
        assert_eq!(chart.column_names(), vec!["A", "B"]);
    }

    #[test]
    fn test_chart_outcome_serialization() {
        let json = serde_json::to_string(&ChartOutcome::Empty).unwrap();
        assert_eq!(json, r#"{"kind":"empty"}"#);
    }
}
