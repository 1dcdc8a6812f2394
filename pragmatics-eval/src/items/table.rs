//! Raw CSV tables with a header row

use std::fs::File;
use std::io;
use std::path::Path;

use crate::error::{EvalError, EvalResult};

/// A header row plus string records, with no interpretation of the columns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table with the given headers
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Read a CSV file. An unreadable path is reported as `MissingFile`.
    pub fn read(path: impl AsRef<Path>) -> EvalResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| EvalError::MissingFile {
            path: path.to_path_buf(),
            source,
        })?;
        // Opening a directory succeeds on Linux; the failure shows up on first read.
        let table = Self::from_reader(file).map_err(|e| match e {
            EvalError::Csv(err) if err.is_io_error() => EvalError::MissingFile {
                path: path.to_path_buf(),
                source: match err.into_kind() {
                    csv::ErrorKind::Io(source) => source,
                    kind => io::Error::other(format!("{:?}", kind)),
                },
            },
            other => other,
        })?;
        tracing::debug!("Read {} rows from {}", table.len(), path.display());
        Ok(table)
    }

    /// Parse CSV from any reader
    pub fn from_reader<R: io::Read>(reader: R) -> EvalResult<Self> {
        let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

        let headers = rdr.headers()?.iter().map(String::from).collect();
        let mut rows = Vec::new();
        for record in rdr.records() {
            rows.push(record?.iter().map(String::from).collect());
        }

        Ok(Self { headers, rows })
    }

    /// Write the table as CSV, replacing any existing file
    pub fn write(&self, path: impl AsRef<Path>) -> EvalResult<()> {
        let file = File::create(path.as_ref())?;
        self.to_writer(file)
    }

    /// Serialize the table to any writer
    pub fn to_writer<W: io::Write>(&self, writer: W) -> EvalResult<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
