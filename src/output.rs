//! Output persistence: the rejects log and the GeoJSON document.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

use crate::parser::RawRecord;

/// Line sink for rejected records, one comma-joined record per line.
pub struct RejectSink<W: Write> {
    writer: W,
    count: usize,
}

impl RejectSink<BufWriter<File>> {
    /// Creates (or truncates) the rejects file at `path`.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create rejects log {}", path.display()))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> RejectSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, count: 0 }
    }

    /// Appends the record's fields verbatim, joined with commas.
    pub fn append(&mut self, record: &RawRecord) -> Result<()> {
        writeln!(self.writer, "{}", record.joined())?;
        self.count += 1;
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Flushes and returns the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Serializes `value` as JSON indented with four spaces.
pub fn to_pretty_json(value: &impl Serialize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut ser)?;
    Ok(buf)
}

/// Writes `value` as formatted JSON to `path`, replacing any existing file.
pub fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let body = to_pretty_json(value)?;
    debug!(path = %path.display(), bytes = body.len(), "Writing JSON output");

    std::fs::write(path, body)
        .with_context(|| format!("Failed to write output file {}", path.display()))?;

    Ok(())
}
