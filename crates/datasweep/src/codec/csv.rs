//! Comma-separated values codec.

use super::TableCodec;
use super::infer::{RawCell, build_table};
use crate::error::{Result, SweepError};
use crate::table::Table;
use crate::types::FileFormat;
use crate::utils::is_missing_marker;
use polars::prelude::*;
use std::io::Cursor;
use tracing::debug;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Reads and writes comma-separated text with a header row.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvCodec;

impl TableCodec for CsvCodec {
    fn format(&self) -> FileFormat {
        FileFormat::Csv
    }

    fn decode(&self, bytes: &[u8]) -> Result<Table> {
        decode(bytes)
    }

    fn encode(&self, table: &Table) -> Result<Vec<u8>> {
        encode(table)
    }
}

/// Decode CSV bytes into a [`Table`].
///
/// The first record supplies column names. Every field is read as text and
/// typed afterwards, so numeric detection does not depend on a sample size.
pub fn decode(bytes: &[u8]) -> Result<Table> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let bytes = drop_blank_lines(bytes);

    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(SweepError::parse_failed(
            FileFormat::Csv,
            "No columns to parse from file",
        ));
    }

    // Everything as text, header handled manually below.
    let frame = CsvReadOptions::default()
        .with_has_header(false)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .map_err(|e| SweepError::parse_failed(FileFormat::Csv, e))?;

    let height = frame.height().saturating_sub(1);
    let mut header = Vec::with_capacity(frame.width());
    let mut columns = Vec::with_capacity(frame.width());

    for column in frame.get_columns() {
        let fields = column
            .as_materialized_series()
            .str()
            .map_err(|e| SweepError::parse_failed(FileFormat::Csv, e))?;

        let mut fields = fields.into_iter();
        header.push(fields.next().flatten().unwrap_or_default().to_string());

        let cells: Vec<RawCell> = fields
            .map(|field| match field {
                Some(text) if !is_missing_marker(text) => RawCell::Text(text.to_string()),
                _ => RawCell::Missing,
            })
            .collect();
        columns.push(cells);
    }

    debug!("Read CSV with {} columns and {} data rows", header.len(), height);
    build_table(header, columns, height)
}

/// Remove empty lines outside quoted fields.
///
/// The reader would otherwise turn each one into a row of missing cells.
/// Lines holding only separators (`,,`) are real rows and stay.
fn drop_blank_lines(bytes: &[u8]) -> Vec<u8> {
    let mut kept = Vec::with_capacity(bytes.len());
    let mut in_quotes = false;
    let mut start = 0;

    for (idx, &byte) in bytes.iter().enumerate() {
        match byte {
            b'"' => in_quotes = !in_quotes,
            b'\n' if !in_quotes => {
                let line = &bytes[start..=idx];
                if !is_blank_line(line) {
                    kept.extend_from_slice(line);
                }
                start = idx + 1;
            }
            _ => {}
        }
    }

    let rest = &bytes[start..];
    if !is_blank_line(rest) {
        kept.extend_from_slice(rest);
    }
    kept
}

fn is_blank_line(line: &[u8]) -> bool {
    line.iter().all(|&b| b == b'\n' || b == b'\r')
}

/// Encode a [`Table`] as CSV bytes: header row, then one line per row.
///
/// Missing cells are written as empty fields. A table without columns
/// encodes to no bytes at all.
pub fn encode(table: &Table) -> Result<Vec<u8>> {
    if table.width() == 0 {
        return Ok(Vec::new());
    }

    let mut frame = table.frame().clone();
    let mut buffer: Vec<u8> = Vec::new();

    CsvWriter::new(&mut buffer)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(&mut frame)
        .map_err(|e| SweepError::ProcessingFailed(format!("CSV encoding failed: {}", e)))?;

    Ok(buffer)
}
