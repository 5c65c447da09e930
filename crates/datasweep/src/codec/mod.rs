//! Conversion between file bytes and [`Table`]s.
//!
//! Each supported [`FileFormat`] has a [`TableCodec`]; [`decode_file`] picks
//! the codec from the uploaded file's name.
//!
//! # Example
//!
//! ```rust,ignore
//! use datasweep::codec;
//! use datasweep::{FileFormat, SourceFile};
//!
//! let file = SourceFile::new("sales.csv", b"region,total\nnorth,10\n".to_vec());
//! let table = codec::decode_file(&file)?;
//! let bytes = codec::encode(&table, FileFormat::Xlsx)?;
//! ```

pub mod csv;
pub(crate) mod infer;
pub mod xlsx;

pub use csv::CsvCodec;
pub use xlsx::XlsxCodec;

use crate::error::{Result, ResultExt};
use crate::table::Table;
use crate::types::{ExportedFile, FileFormat, SourceFile};
use tracing::{debug, info};

/// A decode/encode pair for one file format.
pub trait TableCodec: Send + Sync {
    /// The format this codec reads and writes.
    fn format(&self) -> FileFormat;

    /// Parse raw file content into a table.
    fn decode(&self, bytes: &[u8]) -> Result<Table>;

    /// Serialize a table, header row first, no index column.
    fn encode(&self, table: &Table) -> Result<Vec<u8>>;
}

/// The codec responsible for `format`.
pub fn codec_for(format: FileFormat) -> &'static dyn TableCodec {
    match format {
        FileFormat::Csv => &CsvCodec,
        FileFormat::Xlsx => &XlsxCodec,
    }
}

/// Decode `bytes` as `format`.
pub fn decode(bytes: &[u8], format: FileFormat) -> Result<Table> {
    codec_for(format).decode(bytes)
}

/// Decode an uploaded file, detecting the format from its name.
pub fn decode_file(file: &SourceFile) -> Result<Table> {
    let format = file.format()?;
    debug!("Decoding {} as {}", file.name(), format);

    let table = decode(file.bytes(), format)?;
    info!(
        "Decoded {}: {} rows x {} columns",
        file.name(),
        table.height(),
        table.width()
    );
    Ok(table)
}

/// Encode `table` as `format`.
pub fn encode(table: &Table, format: FileFormat) -> Result<Vec<u8>> {
    codec_for(format).encode(table)
}

/// Encode `table` and name the output after `source_name`.
pub fn export(table: &Table, source_name: &str, format: FileFormat) -> Result<ExportedFile> {
    let bytes = encode(table, format).context(format!("Error converting {}", source_name))?;
    let exported = ExportedFile::new(source_name, format, bytes);
    info!(
        "Encoded {} as {} ({} bytes)",
        exported.file_name, format, exported.size_bytes
    );
    Ok(exported)
}
