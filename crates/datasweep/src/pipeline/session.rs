//! Per-file processing context.

use crate::chart;
use crate::cleaner::{CleaningOutcome, DataCleaner};
use crate::codec;
use crate::error::{Result, ResultExt};
use crate::projector::ColumnProjector;
use crate::table::Table;
use crate::types::{ChartOutcome, ExportedFile, FileFormat, SourceFile};
use serde_json::Value;
use tracing::debug;

/// One uploaded file and the table derived from it.
///
/// The session owns its table exclusively. Every step replaces the table
/// with its result, and a failed step leaves the previous table in place.
#[derive(Debug)]
pub struct FileSession {
    source: SourceFile,
    format: FileFormat,
    table: Table,
    cleaner: DataCleaner,
    projector: ColumnProjector,
}

static_assertions::assert_impl_all!(FileSession: Send);

impl FileSession {
    /// Decode `source` and start a session on the resulting table.
    pub fn open(source: SourceFile) -> Result<Self> {
        let format = source.format()?;
        let table = codec::decode(source.bytes(), format)
            .context(format!("Error reading {}", source.name()))?;

        debug!(
            "Opened session for {} ({} rows x {} columns)",
            source.name(),
            table.height(),
            table.width()
        );

        Ok(Self {
            source,
            format,
            table,
            cleaner: DataCleaner,
            projector: ColumnProjector,
        })
    }

    /// Name of the uploaded file.
    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Format the file was decoded from.
    pub fn source_format(&self) -> FileFormat {
        self.format
    }

    /// The current table.
    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn into_table(self) -> Table {
        self.table
    }

    /// Drop duplicate rows from the current table.
    pub fn remove_duplicates(&mut self) -> Result<CleaningOutcome> {
        let cleaned = self.cleaner.remove_duplicates(&self.table)?;
        self.table = cleaned.table;
        Ok(cleaned.outcome)
    }

    /// Fill missing numeric cells with their column mean.
    pub fn fill_missing_numeric(&mut self) -> Result<CleaningOutcome> {
        let cleaned = self.cleaner.fill_missing_numeric(&self.table)?;
        self.table = cleaned.table;
        Ok(cleaned.outcome)
    }

    /// Keep only the named columns; `None` keeps all of them.
    pub fn select_columns(&mut self, names: Option<&[String]>) -> Result<()> {
        self.table = self.projector.project_default(&self.table, names)?;
        Ok(())
    }

    /// Chart summary of the current table.
    pub fn chart(&self) -> Result<ChartOutcome> {
        chart::summarize(&self.table)
    }

    /// Encode the current table in `format`, named after the source file.
    pub fn export(&self, format: FileFormat) -> Result<ExportedFile> {
        codec::export(&self.table, self.source.name(), format)
    }

    /// The first `n` rows of the current table.
    pub fn preview(&self, n: usize) -> Vec<Vec<Value>> {
        self.table.preview_rows(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SweepError;
    use pretty_assertions::assert_eq;

    fn session(csv: &str) -> FileSession {
        FileSession::open(SourceFile::new("data.csv", csv.as_bytes().to_vec())).unwrap()
    }

    #[test]
    fn test_open_rejects_unknown_format() {
        let err = FileSession::open(SourceFile::new("notes.txt", b"A\n1\n".to_vec())).unwrap_err();
        assert!(matches!(err, SweepError::UnsupportedFormat(ref ext) if ext == ".txt"));
    }

    #[test]
    fn test_open_reports_parse_failure_with_file_name() {
        let err = FileSession::open(SourceFile::new("broken.xlsx", b"nope".to_vec())).unwrap_err();
        assert_eq!(err.error_code(), "PARSE_ERROR");
        assert!(err.to_string().contains("broken.xlsx"));
    }

    #[test]
    fn test_steps_replace_table() {
        let mut session = session("A,B\n1,2\n1,2\n3,\n");

        let dedupe = session.remove_duplicates().unwrap();
        assert_eq!(dedupe.rows_removed, 1);
        assert_eq!(session.table().height(), 2);

        let fill = session.fill_missing_numeric().unwrap();
        assert_eq!(fill.cells_filled, 1);
        assert_eq!(session.table().missing_count(), 0);

        session.select_columns(Some(&["B".to_string()])).unwrap();
        assert_eq!(session.table().column_names(), vec!["B"]);
        assert_eq!(session.preview(5), vec![vec![serde_json::json!(2.0)], vec![serde_json::json!(2.0)]]);
    }

    #[test]
    fn test_failed_selection_keeps_table() {
        let mut session = session("A,B\n1,2\n");
        let err = session.select_columns(Some(&["Z".to_string()])).unwrap_err();

        assert!(matches!(err, SweepError::UnknownColumn(ref name) if name == "Z"));
        assert_eq!(session.table().column_names(), vec!["A", "B"]);
    }

    #[test]
    fn test_export_uses_source_name() {
        let session = session("A\n1\n");
        let exported = session.export(FileFormat::Xlsx).unwrap();

        assert_eq!(exported.file_name, "data.xlsx");
        assert_eq!(session.source_format(), FileFormat::Csv);
    }
}
