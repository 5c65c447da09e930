//! Office Open XML spreadsheet codec.
//!
//! Reading goes through `calamine` and only looks at the first worksheet.
//! Writing produces a minimal package by hand: content types, relationships,
//! a workbook with a single `Sheet1`, default styles and the worksheet itself.
//! Text is stored as inline strings so no shared string table is needed.

use super::TableCodec;
use super::infer::{RawCell, build_table};
use crate::error::{Result, SweepError};
use crate::table::Table;
use crate::types::FileFormat;
use crate::utils::is_missing_marker;
use calamine::{Data, DataType as _, Reader, Xlsx, open_workbook_from_rs};
use chrono::NaiveDateTime;
use polars::prelude::*;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::{Cursor, Write};
use tracing::debug;
use ::zip::write::SimpleFileOptions;
use ::zip::{CompressionMethod, ZipWriter};

const SPREADSHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const RELATIONSHIPS_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#;

const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Reads the first worksheet of a workbook and writes single-sheet workbooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxCodec;

impl TableCodec for XlsxCodec {
    fn format(&self) -> FileFormat {
        FileFormat::Xlsx
    }

    fn decode(&self, bytes: &[u8]) -> Result<Table> {
        decode(bytes)
    }

    fn encode(&self, table: &Table) -> Result<Vec<u8>> {
        encode(table)
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode the first worksheet of an XLSX workbook into a [`Table`].
///
/// The first row supplies column names. An empty sheet gives an empty table.
pub fn decode(bytes: &[u8]) -> Result<Table> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| SweepError::parse_failed(FileFormat::Xlsx, e))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SweepError::parse_failed(FileFormat::Xlsx, "Workbook has no worksheets"))?
        .map_err(|e| SweepError::parse_failed(FileFormat::Xlsx, e))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        debug!("First worksheet is empty");
        return Ok(Table::default());
    };

    let width = header_row.len();
    let header: Vec<String> = header_row.iter().map(header_text).collect();
    let mut columns: Vec<Vec<RawCell>> = vec![Vec::new(); width];
    let mut height = 0;

    for row in rows {
        for (idx, column) in columns.iter_mut().enumerate() {
            column.push(row.get(idx).map_or(RawCell::Missing, raw_cell));
        }
        height += 1;
    }

    debug!("Read worksheet with {} columns and {} data rows", width, height);
    build_table(header, columns, height)
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.clone(),
        other => match raw_cell(other) {
            RawCell::Text(text) => text,
            _ => other.to_string(),
        },
    }
}

fn raw_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Empty | Data::Error(_) => RawCell::Missing,
        Data::Int(value) => RawCell::Number(*value as f64),
        Data::Float(value) => RawCell::Number(*value),
        Data::String(text) if is_missing_marker(text) => RawCell::Missing,
        Data::String(text) => RawCell::Text(text.clone()),
        Data::Bool(flag) => RawCell::Text(if *flag { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_datetime() {
            Some(datetime) => RawCell::Text(format_datetime(datetime)),
            None => RawCell::Text(cell.to_string()),
        },
        other => RawCell::Text(other.to_string()),
    }
}

fn format_datetime(datetime: NaiveDateTime) -> String {
    datetime.format(DATETIME_FORMAT).to_string()
}

// ============================================================================
// Encoding
// ============================================================================

/// One output cell.
enum SheetCell {
    Number(String),
    Text(String),
}

/// Encode a [`Table`] as a single-sheet XLSX workbook.
pub fn encode(table: &Table) -> Result<Vec<u8>> {
    let sheet = worksheet_xml(table)?;

    let parts: [(&str, &[u8]); 6] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.as_bytes()),
        ("_rels/.rels", ROOT_RELS_XML.as_bytes()),
        ("xl/workbook.xml", WORKBOOK_XML.as_bytes()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS_XML.as_bytes()),
        ("xl/styles.xml", STYLES_XML.as_bytes()),
        ("xl/worksheets/sheet1.xml", &sheet),
    ];

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (path, content) in parts {
        zip.start_file(path, options).map_err(package_error)?;
        zip.write_all(content).map_err(package_error)?;
    }

    let cursor = zip.finish().map_err(package_error)?;
    Ok(cursor.into_inner())
}

fn package_error(e: impl std::fmt::Display) -> SweepError {
    SweepError::ProcessingFailed(format!("XLSX encoding failed: {}", e))
}

fn worksheet_xml(table: &Table) -> Result<Vec<u8>> {
    let names = table.column_names();
    let columns = table
        .frame()
        .get_columns()
        .iter()
        .map(|column| sheet_cells(column.as_materialized_series()))
        .collect::<Result<Vec<_>>>()?;

    let mut writer = Writer::new(Vec::new());
    emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))),
    )?;

    let mut worksheet = BytesStart::new("worksheet");
    worksheet.push_attribute(("xmlns", SPREADSHEET_NS));
    worksheet.push_attribute(("xmlns:r", RELATIONSHIPS_NS));
    emit(&mut writer, Event::Start(worksheet))?;
    emit(&mut writer, Event::Start(BytesStart::new("sheetData")))?;

    if !names.is_empty() {
        let header: Vec<Option<SheetCell>> = names
            .into_iter()
            .map(|name| Some(SheetCell::Text(name)))
            .collect();
        write_row(&mut writer, 1, header.iter().map(Option::as_ref))?;

        for row_idx in 0..table.height() {
            let cells = columns
                .iter()
                .map(|column| column.get(row_idx).and_then(Option::as_ref));
            write_row(&mut writer, row_idx + 2, cells)?;
        }
    }

    emit(&mut writer, Event::End(BytesEnd::new("sheetData")))?;
    emit(&mut writer, Event::End(BytesEnd::new("worksheet")))?;

    Ok(writer.into_inner())
}

fn sheet_cells(series: &Series) -> Result<Vec<Option<SheetCell>>> {
    let cells = match series.dtype() {
        DataType::Int64 => series
            .i64()?
            .into_iter()
            .map(|value| value.map(|v| SheetCell::Number(v.to_string())))
            .collect(),
        DataType::Float64 => series
            .f64()?
            .into_iter()
            .map(|value| value.map(float_cell))
            .collect(),
        _ => series
            .cast(&DataType::String)?
            .str()?
            .into_iter()
            .map(|value| value.map(|v| SheetCell::Text(v.to_string())))
            .collect(),
    };
    Ok(cells)
}

/// Infinite values have no numeric cell form; they are kept as text.
fn float_cell(value: f64) -> SheetCell {
    if value.is_finite() {
        SheetCell::Number(value.to_string())
    } else {
        SheetCell::Text(value.to_string())
    }
}

fn write_row<'a>(
    writer: &mut Writer<Vec<u8>>,
    row_number: usize,
    cells: impl Iterator<Item = Option<&'a SheetCell>>,
) -> Result<()> {
    let row_ref = row_number.to_string();
    let mut row = BytesStart::new("row");
    row.push_attribute(("r", row_ref.as_str()));
    emit(writer, Event::Start(row))?;

    for (col_idx, cell) in cells.enumerate() {
        let Some(cell) = cell else {
            continue;
        };
        let cell_ref = format!("{}{}", column_letter(col_idx), row_number);
        let mut element = BytesStart::new("c");
        element.push_attribute(("r", cell_ref.as_str()));

        match cell {
            SheetCell::Number(value) => {
                emit(writer, Event::Start(element))?;
                emit(writer, Event::Start(BytesStart::new("v")))?;
                emit(writer, Event::Text(BytesText::new(value)))?;
                emit(writer, Event::End(BytesEnd::new("v")))?;
            }
            SheetCell::Text(value) => {
                element.push_attribute(("t", "inlineStr"));
                emit(writer, Event::Start(element))?;
                emit(writer, Event::Start(BytesStart::new("is")))?;
                let mut text = BytesStart::new("t");
                text.push_attribute(("xml:space", "preserve"));
                emit(writer, Event::Start(text))?;
                emit(writer, Event::Text(BytesText::new(value)))?;
                emit(writer, Event::End(BytesEnd::new("t")))?;
                emit(writer, Event::End(BytesEnd::new("is")))?;
            }
        }
        emit(writer, Event::End(BytesEnd::new("c")))?;
    }

    emit(writer, Event::End(BytesEnd::new("row")))
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer.write_event(event).map_err(package_error)
}

/// Spreadsheet column letters for a zero-based index: 0 -> A, 26 -> AA.
fn column_letter(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}
