//! Record stream driver.
//!
//! A [`Miner`] pulls records from a [`RecordSource`], assembles rows, and pushes
//! them into a [`RowSink`] in record order. The sink receives the header before
//! the first record is read, so an empty source still yields a header-only output.
//!
//! Two scheduling modes share the same output:
//!
//! - **Sequential** (default): each record is fully processed before the next is read.
//! - **Parallel batches**: up to `batch_size` records are read, their rows are
//!   assembled on the rayon pool, then written in input order.
//!
//! # Examples
//!
//! ```
//! use marc_miner::formats::{VecSink, VecSource};
//! use marc_miner::{Miner, MinerConfig, Record};
//!
//! let records = vec![
//!     Record::builder("").control_field_str("001", "b1").build(),
//!     Record::builder("").control_field_str("001", "b2").build(),
//! ];
//!
//! let miner = Miner::from_features("001", MinerConfig::default())?;
//! let mut sink = VecSink::new();
//! let summary = miner.run(&mut VecSource::new(records), &mut sink)?;
//!
//! assert_eq!(summary.records, 2);
//! assert_eq!(sink.columns, vec!["bib_cnum", "001"]);
//! assert_eq!(sink.rows[1].get("001"), Some("b2"));
//! # Ok::<(), marc_miner::MinerError>(())
//! ```

use std::time::Instant;

use rayon::prelude::*;

use crate::config::MinerConfig;
use crate::error::Result;
use crate::formats::{RecordSource, RowSink};
use crate::record::Record;
use crate::row::{Row, RowAssembler};
use crate::selector::{parse_selectors, Selector};

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Records read from the source
    pub records: usize,
    /// Rows written to the sink
    pub rows: usize,
}

/// Drives an extraction run.
#[derive(Debug, Clone)]
pub struct Miner {
    assembler: RowAssembler,
}

impl Miner {
    /// Create a miner from compiled selectors.
    #[must_use]
    pub fn new(selectors: Vec<Selector>, config: MinerConfig) -> Self {
        Self {
            assembler: RowAssembler::new(selectors, config),
        }
    }

    /// Compile a feature string and create a miner.
    ///
    /// # Errors
    ///
    /// Returns [`MinerError::MalformedSelector`](crate::MinerError::MalformedSelector)
    /// for the first token that fails to compile.
    pub fn from_features(features: &str, config: MinerConfig) -> Result<Self> {
        Ok(Self::new(parse_selectors(features)?, config))
    }

    /// Output columns in order
    #[must_use]
    pub fn columns(&self) -> &[String] {
        self.assembler.columns()
    }

    /// The row assembler used for each record
    #[must_use]
    pub fn assembler(&self) -> &RowAssembler {
        &self.assembler
    }

    /// Run over every record in `source`.
    ///
    /// # Errors
    ///
    /// Returns the first source or sink error. Rows already handed to the sink stay
    /// written; `finish` is not called on error.
    pub fn run<S, W>(&self, source: &mut S, sink: &mut W) -> Result<RunSummary>
    where
        S: RecordSource + ?Sized,
        W: RowSink + ?Sized,
    {
        self.run_with_progress(source, sink, |_| {})
    }

    /// Run over every record, calling `progress` with the running record count after
    /// each record (or each batch in parallel mode).
    ///
    /// # Errors
    ///
    /// Same as [`run`](Self::run).
    pub fn run_with_progress<S, W, F>(
        &self,
        source: &mut S,
        sink: &mut W,
        mut progress: F,
    ) -> Result<RunSummary>
    where
        S: RecordSource + ?Sized,
        W: RowSink + ?Sized,
        F: FnMut(usize),
    {
        let started = Instant::now();
        sink.write_header(self.assembler.columns())?;

        let summary = if self.assembler.config().parallel {
            self.run_batches(source, sink, &mut progress)?
        } else {
            self.run_sequential(source, sink, &mut progress)?
        };

        sink.finish()?;
        tracing::info!(
            records = summary.records,
            rows = summary.rows,
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "extraction finished"
        );
        Ok(summary)
    }

    fn run_sequential<S, W, F>(
        &self,
        source: &mut S,
        sink: &mut W,
        progress: &mut F,
    ) -> Result<RunSummary>
    where
        S: RecordSource + ?Sized,
        W: RowSink + ?Sized,
        F: FnMut(usize),
    {
        let mut summary = RunSummary::default();
        while let Some(record) = source.read_record()? {
            let rows = self.assemble(&record);
            sink.write_rows(&rows)?;
            summary.records += 1;
            summary.rows += rows.len();
            progress(summary.records);
        }
        Ok(summary)
    }

    fn run_batches<S, W, F>(
        &self,
        source: &mut S,
        sink: &mut W,
        progress: &mut F,
    ) -> Result<RunSummary>
    where
        S: RecordSource + ?Sized,
        W: RowSink + ?Sized,
        F: FnMut(usize),
    {
        let batch_size = self.assembler.config().batch_size.max(1);
        let mut summary = RunSummary::default();

        loop {
            let batch = source.read_batch(batch_size)?;
            if batch.is_empty() {
                break;
            }

            // Indexed collect keeps input order.
            let rows: Vec<Vec<Row>> = batch.par_iter().map(|record| self.assemble(record)).collect();
            for record_rows in &rows {
                sink.write_rows(record_rows)?;
                summary.rows += record_rows.len();
            }
            summary.records += batch.len();
            tracing::debug!(batch = batch.len(), total = summary.records, "batch written");
            progress(summary.records);
        }
        Ok(summary)
    }

    fn assemble(&self, record: &Record) -> Vec<Row> {
        let rows = self.assembler.assemble(record);
        tracing::trace!(
            bib_cnum = record.control_number().unwrap_or_default(),
            rows = rows.len(),
            "record assembled"
        );
        rows
    }
}
