//! Tabular Data Sweeping Library
//!
//! Upload CSV or XLSX files, clean them, keep the columns you care about,
//! summarize numeric columns for a chart, and convert between the two formats.
//! Built with Rust and Polars.
//!
//! # Overview
//!
//! Each uploaded file goes through the same fixed order of steps:
//!
//! - **Decode**: CSV or XLSX bytes into a typed [`Table`] (numeric or text columns)
//! - **Clean**: optional duplicate-row removal and mean imputation of numeric columns
//! - **Select**: keep a chosen subset of columns in a chosen order
//! - **Chart**: values of the first two numeric columns, aligned by row
//! - **Export**: re-encode the result as CSV or XLSX
//!
//! Files are independent of each other. A file that fails at any step is
//! reported on its own and the rest of the batch still runs.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use datasweep::{FileFormat, Pipeline, PipelineConfig, SourceFile};
//!
//! let config = PipelineConfig::builder()
//!     .remove_duplicates(true)
//!     .fill_missing_numeric(true)
//!     .columns(["region", "total"])
//!     .chart(true)
//!     .convert_to(FileFormat::Xlsx)
//!     .build()?;
//!
//! let report = Pipeline::builder()
//!     .config(config)
//!     .on_status(|status| println!("{}", status))
//!     .build()?
//!     .process_batch(vec![SourceFile::new("sales.csv", std::fs::read("sales.csv")?)]);
//!
//! for result in report.results() {
//!     if let Some(export) = &result.export {
//!         std::fs::write(&export.file_name, &export.bytes)?;
//!     }
//! }
//! ```
//!
//! # Step by Step
//!
//! A [`FileSession`] exposes the same steps individually, for hosts that
//! let the user decide when to run each one:
//!
//! ```rust,ignore
//! use datasweep::{FileFormat, FileSession, SourceFile};
//!
//! let mut session = FileSession::open(SourceFile::new("sales.xlsx", bytes))?;
//! session.remove_duplicates()?;
//! session.select_columns(Some(&["total".to_string()]))?;
//! let preview = session.preview(5);
//! let csv = session.export(FileFormat::Csv)?;
//! ```

pub mod chart;
pub mod cleaner;
pub mod codec;
pub mod config;
pub mod error;
pub mod imputers;
pub mod pipeline;
pub mod projector;
pub mod table;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{Cleaned, CleaningOutcome, DataCleaner};
pub use codec::{CsvCodec, TableCodec, XlsxCodec};
pub use config::{ConfigValidationError, FileOptions, PipelineConfig, PipelineConfigBuilder};
pub use error::{Result as SweepResult, ResultExt, SweepError};
pub use imputers::{ImputedColumn, StatisticalImputer};
pub use pipeline::{
    ClosureStatusReporter, FileSession, Pipeline, PipelineBuilder, StatusLevel, StatusMessage,
    StatusReporter,
};
pub use projector::ColumnProjector;
pub use table::Table;
pub use types::{
    BatchReport, ChartData, ChartOutcome, ChartSeries, ColumnInfo, ColumnKind, ExportedFile,
    FileFormat, FileOutcome, PipelineResult, SourceFile, output_file_name,
};
