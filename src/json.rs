//! JSON Lines output for extracted rows.
//!
//! Each row becomes one JSON object on its own line, keys in column order. The
//! header is not written; every object carries its column names. The writer is
//! used as given, so wrap files in a [`std::io::BufWriter`].
//!
//! # Examples
//!
//! ```
//! use marc_miner::formats::RowSink;
//! use marc_miner::json::JsonLinesWriter;
//! use marc_miner::Row;
//!
//! let mut row = Row::new();
//! row.set("bib_cnum", "b1");
//! row.set("008_6", "s");
//!
//! let mut writer = JsonLinesWriter::new(Vec::new());
//! writer.write_header(&["bib_cnum".to_string(), "008_6".to_string()])?;
//! writer.write_row(&row)?;
//! writer.finish()?;
//!
//! let out = String::from_utf8(writer.into_inner()).unwrap();
//! assert_eq!(out, "{\"bib_cnum\":\"b1\",\"008_6\":\"s\"}\n");
//! # Ok::<(), marc_miner::MinerError>(())
//! ```

use std::fmt;
use std::io::Write;

use crate::error::Result;
use crate::formats::RowSink;
use crate::row::Row;

/// Writes rows as JSON Lines.
pub struct JsonLinesWriter<W: Write> {
    output: W,
    columns: Vec<String>,
}

impl<W: Write> fmt::Debug for JsonLinesWriter<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonLinesWriter")
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}

impl<W: Write> JsonLinesWriter<W> {
    /// Create a writer.
    pub fn new(output: W) -> Self {
        Self {
            output,
            columns: Vec::new(),
        }
    }

    /// Return the underlying output.
    pub fn into_inner(self) -> W {
        self.output
    }
}

impl<W: Write> RowSink for JsonLinesWriter<W> {
    fn write_header(&mut self, columns: &[String]) -> Result<()> {
        self.columns = columns.to_vec();
        Ok(())
    }

    fn write_row(&mut self, row: &Row) -> Result<()> {
        if self.columns.is_empty() {
            serde_json::to_writer(&mut self.output, row)?;
        } else {
            serde_json::to_writer(&mut self.output, &in_column_order(&self.columns, row))?;
        }
        self.output.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.output.flush()?;
        Ok(())
    }
}

/// Rebuild a row with exactly `columns`, in that order.
///
/// Columns the row lacks become empty strings.
fn in_column_order(columns: &[String], row: &Row) -> Row {
    let mut ordered = Row::new();
    for column in columns {
        ordered.set(column.as_str(), row.get(column).unwrap_or_default());
    }
    ordered
}
