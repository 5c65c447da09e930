//! Main sweeping pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! running a batch of uploaded files through the fixed step order:
//! decode, remove duplicates, fill missing values, select columns, chart
//! and export.

use crate::config::{ConfigValidationError, FileOptions, PipelineConfig};
use crate::error::{Result, ResultExt};
use crate::pipeline::session::FileSession;
use crate::pipeline::status::{ClosureStatusReporter, StatusLevel, StatusMessage, StatusReporter};
use crate::types::{BatchReport, ChartOutcome, FileOutcome, PipelineResult, SourceFile};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// The main sweeping pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// Files are processed one after another and independently: a failure in
/// one file is recorded against that file and the batch carries on.
///
/// # Example
///
/// ```rust,ignore
/// use datasweep::{FileFormat, Pipeline, PipelineConfig, SourceFile};
///
/// let config = PipelineConfig::builder()
///     .remove_duplicates(true)
///     .convert_to(FileFormat::Csv)
///     .build()?;
///
/// let report = Pipeline::builder()
///     .config(config)
///     .on_status(|status| println!("{}", status))
///     .build()?
///     .process_batch(vec![SourceFile::new("sales.xlsx", bytes)]);
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    status_reporter: Option<Arc<dyn StatusReporter>>,
}

// Ensure Pipeline is Send (can be moved to another thread)
static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// The configuration this pipeline was built with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process every file with the choices from the pipeline configuration.
    pub fn process_batch(&self, files: Vec<SourceFile>) -> BatchReport {
        let options = self.config.file_options();
        self.process_batch_with(
            files
                .into_iter()
                .map(|file| (file, options.clone()))
                .collect(),
        )
    }

    /// Process every file with its own choices, in upload order.
    pub fn process_batch_with(&self, files: Vec<(SourceFile, FileOptions)>) -> BatchReport {
        let start_time = Instant::now();
        info!("Processing batch of {} files", files.len());

        let outcomes: Vec<FileOutcome> = files
            .into_iter()
            .enumerate()
            .map(|(index, (file, options))| self.process_file(index, file, &options))
            .collect();

        let report = BatchReport::new(outcomes, start_time.elapsed().as_millis() as u64);
        self.report_status(&report.status);
        info!(
            "Batch complete: {} succeeded, {} failed in {}ms",
            report.succeeded, report.failed, report.duration_ms
        );
        report
    }

    /// Process one file, capturing any failure as a [`FileOutcome::Failed`].
    pub fn process_file(&self, index: usize, file: SourceFile, options: &FileOptions) -> FileOutcome {
        let file_name = file.name().to_string();
        let mut statuses = Vec::new();

        match self.run_file(index, file, options, &mut statuses) {
            Ok(mut result) => {
                result.statuses = statuses;
                FileOutcome::Processed(result)
            }
            Err(e) => {
                error!("Error processing {}: {}", file_name, e);
                let message = format!("Error processing {}: {}", file_name, e.root());
                self.push_status(&mut statuses, StatusMessage::error(&file_name, message));
                FileOutcome::Failed {
                    file_name,
                    index,
                    error: e,
                    statuses,
                }
            }
        }
    }

    fn run_file(
        &self,
        index: usize,
        file: SourceFile,
        options: &FileOptions,
        statuses: &mut Vec<StatusMessage>,
    ) -> Result<PipelineResult> {
        let file_name = file.name().to_string();

        // Step 1: Decode
        let mut session = FileSession::open(file)?;
        let (rows, cols) = session.table().shape();
        self.push_status(
            statuses,
            StatusMessage::info(
                &file_name,
                format!("Loaded {}: {} rows x {} columns", file_name, rows, cols),
            ),
        );

        // Step 2: Remove duplicates
        if options.remove_duplicates {
            let outcome = session
                .remove_duplicates()
                .context(format!("Error removing duplicates from {}", file_name))?;
            let status = if outcome.rows_removed > 0 {
                StatusMessage::success(
                    &file_name,
                    format!(
                        "Duplicates removed from {}: {} rows",
                        file_name, outcome.rows_removed
                    ),
                )
            } else {
                StatusMessage::info(&file_name, format!("No duplicate rows found in {}", file_name))
            };
            self.push_status(statuses, status);
        }

        // Step 3: Fill missing numeric values
        if options.fill_missing_numeric {
            let outcome = session
                .fill_missing_numeric()
                .context(format!("Error filling missing values in {}", file_name))?;
            let status = if outcome.cells_filled > 0 {
                StatusMessage::success(
                    &file_name,
                    format!(
                        "Missing values filled in {}: {} cells",
                        file_name, outcome.cells_filled
                    ),
                )
            } else {
                StatusMessage::info(
                    &file_name,
                    format!("No missing numeric values found in {}", file_name),
                )
            };
            self.push_status(statuses, status);
        }

        // Step 4: Column selection
        if let Some(columns) = options.columns.as_deref() {
            session
                .select_columns(Some(columns))
                .context(format!("Error selecting columns in {}", file_name))?;
            self.push_status(
                statuses,
                StatusMessage::info(
                    &file_name,
                    format!("Selected {} columns from {}", columns.len(), file_name),
                ),
            );
        }

        // Step 5: Chart summary
        let chart = if options.chart {
            let outcome = session.chart()?;
            match &outcome {
                ChartOutcome::Empty => self.push_status(
                    statuses,
                    StatusMessage::warning(
                        &file_name,
                        format!("No numeric data available for visualization in {}.", file_name),
                    ),
                ),
                ChartOutcome::Chart(data) => {
                    debug!("Chart for {}: {:?}", file_name, data.column_names());
                }
            }
            Some(outcome)
        } else {
            None
        };

        // Step 6: Export
        let export = match options.convert_to {
            Some(format) => {
                let exported = session.export(format)?;
                self.push_status(
                    statuses,
                    StatusMessage::success(
                        &file_name,
                        format!(
                            "Converted {} to {} as {}",
                            file_name,
                            format.display_name(),
                            exported.file_name
                        ),
                    ),
                );
                Some(exported)
            }
            None => None,
        };

        let table = session.into_table();
        Ok(PipelineResult {
            file_name,
            index,
            row_count: table.height(),
            columns: table.columns(),
            preview: table.preview_rows(self.config.preview_rows),
            table,
            chart,
            export,
            statuses: Vec::new(),
        })
    }

    /// Record a status message and forward it to the reporter, if any.
    fn push_status(&self, statuses: &mut Vec<StatusMessage>, status: StatusMessage) {
        match status.level {
            StatusLevel::Warning => warn!("{}", status.message),
            StatusLevel::Error => {}
            _ => debug!("{}", status.message),
        }
        self.report_status(&status);
        statuses.push(status);
    }

    /// Report a status if a reporter is configured.
    fn report_status(&self, status: &StatusMessage) {
        if let Some(reporter) = &self.status_reporter {
            reporter.report(status);
        }
    }
}

/// Builder for creating a [`Pipeline`] with custom configuration.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    status_reporter: Option<Arc<dyn StatusReporter>>,
}

// Ensure PipelineBuilder is Send (can be moved to another thread during construction)
static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a status reporter for receiving messages during processing.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use datasweep::{StatusMessage, StatusReporter};
    /// use std::sync::Arc;
    ///
    /// struct StderrReporter;
    ///
    /// impl StatusReporter for StderrReporter {
    ///     fn report(&self, status: &StatusMessage) {
    ///         eprintln!("{}", status);
    ///     }
    /// }
    ///
    /// let pipeline = Pipeline::builder()
    ///     .status_reporter(Arc::new(StderrReporter))
    ///     .build()?;
    /// ```
    pub fn status_reporter(mut self, reporter: Arc<dyn StatusReporter>) -> Self {
        self.status_reporter = Some(reporter);
        self
    }

    /// Set a status callback closure.
    ///
    /// This is a convenience method for simple status handling.
    /// For more complex scenarios, use [`status_reporter`](Self::status_reporter).
    pub fn on_status<F>(mut self, callback: F) -> Self
    where
        F: Fn(&StatusMessage) + Send + Sync + 'static,
    {
        self.status_reporter = Some(Arc::new(ClosureStatusReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline {
            config,
            status_reporter: self.status_reporter,
        })
    }
}
