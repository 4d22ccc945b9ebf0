//! Record source and row sink traits.
//!
//! The driver pulls records from a [`RecordSource`] and pushes rows into a
//! [`RowSink`]. Neither side knows about selectors, so tokenizers and writers can be
//! swapped freely.
//!
//! # Example
//!
//! ```
//! use marc_miner::formats::{RecordSource, RowSink};
//!
//! fn copy_all<S: RecordSource, W: RowSink>(
//!     source: &mut S,
//!     sink: &mut W,
//!     columns: &[String],
//!     assembler: &marc_miner::RowAssembler,
//! ) -> marc_miner::Result<usize> {
//!     sink.write_header(columns)?;
//!     let mut rows = 0;
//!     while let Some(record) = source.read_record()? {
//!         for row in assembler.assemble(&record) {
//!             sink.write_row(&row)?;
//!             rows += 1;
//!         }
//!     }
//!     sink.finish()?;
//!     Ok(rows)
//! }
//! ```

use crate::error::Result;
use crate::record::Record;
use crate::row::Row;

/// Something that yields records one at a time.
///
/// # Implementation Notes
///
/// Implementations should:
/// - Return `Ok(None)` when the source is exhausted (not an error)
/// - Preserve field and subfield order exactly as in the source
/// - Report a blank or missing indicator as `' '`
pub trait RecordSource: std::fmt::Debug {
    /// Read the next record.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is malformed or I/O fails.
    fn read_record(&mut self) -> Result<Option<Record>>;

    /// Read up to `limit` records.
    ///
    /// Returns fewer than `limit` only when the source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns the first read error; records already read are discarded.
    fn read_batch(&mut self, limit: usize) -> Result<Vec<Record>> {
        let mut records = Vec::with_capacity(limit);
        while records.len() < limit {
            match self.read_record()? {
                Some(record) => records.push(record),
                None => break,
            }
        }
        Ok(records)
    }

    /// Number of records read so far, when tracked.
    fn records_read(&self) -> Option<usize> {
        None
    }
}

/// Something that accepts rows.
///
/// Writers follow a fixed pattern: one [`write_header`](Self::write_header), any
/// number of [`write_row`](Self::write_row) calls, then [`finish`](Self::finish).
/// Dropping a sink without calling `finish` may lose buffered rows.
pub trait RowSink: std::fmt::Debug {
    /// Announce the output columns before any row.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the underlying output fails.
    fn write_header(&mut self, columns: &[String]) -> Result<()>;

    /// Write one row; its columns match the header.
    ///
    /// # Errors
    ///
    /// Returns an error if the row cannot be serialized or written.
    fn write_row(&mut self, row: &Row) -> Result<()>;

    /// Write several rows in order.
    ///
    /// # Errors
    ///
    /// Returns the first write error.
    fn write_rows(&mut self, rows: &[Row]) -> Result<()> {
        for row in rows {
            self.write_row(row)?;
        }
        Ok(())
    }

    /// Flush buffered output.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    fn finish(&mut self) -> Result<()>;
}

/// Records held in memory, yielded in order.
#[derive(Debug, Default)]
pub struct VecSource {
    records: std::vec::IntoIter<Record>,
    read: usize,
}

impl VecSource {
    /// Wrap a vector of records
    #[must_use]
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: records.into_iter(),
            read: 0,
        }
    }
}

impl RecordSource for VecSource {
    fn read_record(&mut self) -> Result<Option<Record>> {
        let next = self.records.next();
        if next.is_some() {
            self.read += 1;
        }
        Ok(next)
    }

    fn records_read(&self) -> Option<usize> {
        Some(self.read)
    }
}

/// Sink that collects rows in memory.
#[derive(Debug, Default, Clone)]
pub struct VecSink {
    /// Columns from the header call
    pub columns: Vec<String>,
    /// Rows in write order
    pub rows: Vec<Row>,
    /// Whether `finish` was called
    pub finished: bool,
}

impl VecSink {
    /// Create an empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RowSink for VecSink {
    fn write_header(&mut self, columns: &[String]) -> Result<()> {
        self.columns = columns.to_vec();
        Ok(())
    }

    fn write_row(&mut self, row: &Row) -> Result<()> {
        self.rows.push(row.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}
