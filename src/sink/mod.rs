//! Delimited-row output of assembled records.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::app::{Result, ScrapeError};
use crate::domain::{Record, COLUMNS};

/// Destination for the records of a run
pub trait Sink {
    /// Write every record in order; returns how many rows were written
    fn write_all(&mut self, records: &[Record]) -> Result<usize>;
}

// The header is written explicitly so an empty run still gets one
fn writer<W: Write>(inner: W) -> csv::Writer<W> {
    csv::WriterBuilder::new().has_headers(false).from_writer(inner)
}

/// CSV writer with the fixed `Nom, Spécialité, ...` header.
///
/// The header is written by the first `write_all`, even when it has no
/// record; later calls append rows only.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
    location: Option<PathBuf>,
    header_written: bool,
}

impl CsvSink<File> {
    /// Create (or truncate) the file at `path`
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        Ok(Self {
            writer: writer(file),
            location: Some(path.to_path_buf()),
            header_written: false,
        })
    }
}

impl<W: Write> CsvSink<W> {
    pub fn from_writer(writer: W) -> Self {
        Self {
            writer: self::writer(writer),
            location: None,
            header_written: false,
        }
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| ScrapeError::Other(format!("Failed to flush CSV writer: {}", e)))
    }
}

impl<W: Write> Sink for CsvSink<W> {
    fn write_all(&mut self, records: &[Record]) -> Result<usize> {
        if !self.header_written {
            self.writer.write_record(COLUMNS)?;
            self.header_written = true;
        }
        for r in records {
            self.writer.write_record([
                r.name.as_str(),
                r.specialty.as_str(),
                r.address.as_str(),
                r.insurance.as_str(),
                r.availability.as_str(),
                r.consultation.as_str(),
                r.fees.as_str(),
            ])?;
        }
        self.writer.flush()?;

        match &self.location {
            Some(path) => info!(rows = records.len(), path = %path.display(), "Records written"),
            None => debug!(rows = records.len(), "Records written"),
        }
        Ok(records.len())
    }
}

/// Read a file previously written by [`CsvSink`]. Malformed rows are skipped.
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;

    let mut records = Vec::new();
    for (i, row) in reader.deserialize::<Record>().enumerate() {
        match row {
            Ok(record) => records.push(record),
            Err(e) => warn!("Row {} in {:?}: {}", i + 1, path, e),
        }
    }

    debug!(rows = records.len(), "Loaded records from {:?}", path);
    Ok(records)
}
