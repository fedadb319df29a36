//! Raw tabular input: the header row plus untyped data rows.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use log::info;

use crate::io_utils;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Splits off the first row as the header row. No rows means no headers.
    pub fn from_rows(mut rows: Vec<Vec<String>>) -> Self {
        if rows.is_empty() {
            return Self::default();
        }
        let headers = rows.remove(0);
        Self { headers, rows }
    }
}

/// Anything that can hand the pipeline a [`RawTable`], e.g. a file export or a
/// spreadsheet API client. A failed fetch is terminal for the request.
pub trait TabularSource {
    fn fetch(&self) -> Result<RawTable>;
}

#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
    delimiter: u8,
    encoding: &'static Encoding,
}

impl CsvFileSource {
    pub fn new(path: &Path, delimiter: Option<u8>, encoding: &'static Encoding) -> Self {
        Self {
            path: path.to_path_buf(),
            delimiter: io_utils::resolve_input_delimiter(path, delimiter),
            encoding,
        }
    }
}

impl TabularSource for CsvFileSource {
    fn fetch(&self) -> Result<RawTable> {
        let mut reader = io_utils::open_csv_reader_from_path(&self.path, self.delimiter)?;
        let rows = io_utils::read_all_records(&mut reader, self.encoding)
            .with_context(|| format!("Reading responses from {:?}", self.path))?;
        let table = RawTable::from_rows(rows);
        info!(
            "Read {} response row(s) with {} header(s) from {:?}",
            table.rows.len(),
            table.headers.len(),
            self.path
        );
        Ok(table)
    }
}
