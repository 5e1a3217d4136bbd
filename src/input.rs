//! Reading raw location records from a headerless CSV source.

use anyhow::{Context, Result};
use csv::{ByteRecord, Reader, ReaderBuilder};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::parser::RawRecord;

fn reader_builder() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    // Field counts are checked per record by the validator.
    builder.has_headers(false).flexible(true);
    builder
}

/// Opens the input file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened. This is the only fatal
/// input condition; malformed records are left to the validator.
pub fn open_input(path: &Path) -> Result<Reader<File>> {
    reader_builder()
        .from_path(path)
        .with_context(|| format!("Failed to open input file {}", path.display()))
}

/// Wraps any byte source in the same CSV reader configuration as [`open_input`].
pub fn reader_from<R: Read>(source: R) -> Reader<R> {
    reader_builder().from_reader(source)
}

/// Reads every record to the end of the source.
///
/// Fields that are not valid UTF-8 are decoded lossily. Blank lines are not
/// records: the CSV reader skips them, so they are neither validated nor
/// rejected.
pub fn read_records<R: Read>(reader: &mut Reader<R>) -> Result<Vec<RawRecord>> {
    let mut records = Vec::new();
    let mut record = ByteRecord::new();

    while reader
        .read_byte_record(&mut record)
        .context("Failed to read input record")?
    {
        let line = record
            .position()
            .map(|pos| pos.line())
            .unwrap_or(records.len() as u64 + 1);
        let fields = record
            .iter()
            .map(|field| String::from_utf8_lossy(field).into_owned())
            .collect();
        records.push(RawRecord::new(line, fields));
    }

    debug!(records = records.len(), "Input read");
    Ok(records)
}
