//! CSV output for extracted rows.
//!
//! The first line is the header; every following line is one [`Row`] with its
//! values in header order. Quoting follows RFC 4180 via the `csv` crate, so
//! values containing commas, quotes or newlines survive intact.
//!
//! # API Patterns
//!
//! - **Streaming**: [`CsvRowWriter`] implements [`RowSink`] over any `io::Write`
//! - **In memory**: [`rows_to_csv`] renders a header and rows to a `String`
//!
//! # Examples
//!
//! ```
//! use marc_miner::csv::rows_to_csv;
//! use marc_miner::Row;
//!
//! let mut row = Row::new();
//! row.set("bib_cnum", "b1");
//! row.set("245_a", "Tom, Dick and Harry");
//!
//! let columns = vec!["bib_cnum".to_string(), "245_a".to_string()];
//! let csv = rows_to_csv(&columns, &[row])?;
//! assert_eq!(csv, "bib_cnum,245_a\nb1,\"Tom, Dick and Harry\"\n");
//! # Ok::<(), marc_miner::MinerError>(())
//! ```

use std::fmt;
use std::io::Write;

use crate::error::{MinerError, Result};
use crate::formats::RowSink;
use crate::row::Row;

/// Writes rows as CSV to any `io::Write`.
pub struct CsvRowWriter<W: Write> {
    writer: csv::Writer<W>,
    columns: Vec<String>,
    rows_written: usize,
}

impl<W: Write> fmt::Debug for CsvRowWriter<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsvRowWriter")
            .field("columns", &self.columns)
            .field("rows_written", &self.rows_written)
            .finish_non_exhaustive()
    }
}

impl<W: Write> CsvRowWriter<W> {
    /// Create a comma-delimited writer.
    pub fn new(output: W) -> Self {
        Self::with_delimiter(output, b',')
    }

    /// Create a writer with a custom single-byte delimiter.
    pub fn with_delimiter(output: W, delimiter: u8) -> Self {
        let writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .from_writer(output);
        Self {
            writer,
            columns: Vec::new(),
            rows_written: 0,
        }
    }

    /// Rows written so far
    #[must_use]
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush and return the underlying output.
    ///
    /// # Errors
    ///
    /// Returns an error if the final flush fails.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| MinerError::IoError(e.into_error()))
    }
}

impl<W: Write> RowSink for CsvRowWriter<W> {
    fn write_header(&mut self, columns: &[String]) -> Result<()> {
        self.columns = columns.to_vec();
        self.writer.write_record(columns)?;
        Ok(())
    }

    fn write_row(&mut self, row: &Row) -> Result<()> {
        // Header order, not insertion order; missing columns become empty cells.
        let record = self
            .columns
            .iter()
            .map(|column| row.get(column).unwrap_or_default());
        self.writer.write_record(record)?;
        self.rows_written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Render a header and rows as a CSV string.
///
/// # Errors
///
/// Returns an error if the CSV cannot be written.
pub fn rows_to_csv(columns: &[String], rows: &[Row]) -> Result<String> {
    let mut writer = CsvRowWriter::new(Vec::new());
    writer.write_header(columns)?;
    writer.write_rows(rows)?;
    let bytes = writer.into_inner()?;
    String::from_utf8(bytes).map_err(|e| MinerError::ParseError(e.to_string()))
}
