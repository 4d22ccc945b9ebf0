//! Run configuration.
//!
//! [`MinerConfig`] controls which structural counters are emitted, whether records
//! are exploded into one row per holdings instance, and how the driver schedules
//! work.

use std::fmt;

/// What split mode does with a record that has no `852` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyHoldingsPolicy {
    /// Emit no row for the record
    #[default]
    Drop,
    /// Emit the base row once with an empty `hol_cnum`
    EmitUnheld,
}

impl fmt::Display for EmptyHoldingsPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Drop => write!(f, "drop"),
            Self::EmitUnheld => write!(f, "emit-unheld"),
        }
    }
}

/// Default number of records assembled per parallel batch.
pub const DEFAULT_BATCH_SIZE: usize = 1024;

/// Configuration for an extraction run.
///
/// # Examples
///
/// ```
/// use marc_miner::config::{EmptyHoldingsPolicy, MinerConfig};
///
/// let config = MinerConfig::default()
///     .with_count_ploc(true)
///     .with_split_by_holdings(true)
///     .with_empty_holdings(EmptyHoldingsPolicy::EmitUnheld);
///
/// assert!(config.count_ploc);
/// assert!(!config.count_eloc);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct MinerConfig {
    // === Counters ===
    /// Emit `n_ploc`: number of physical locations (field 852).
    pub count_ploc: bool,

    /// Emit `n_eloc`: number of electronic locations (field 856).
    pub count_eloc: bool,

    /// Emit `n_local_ext`: number of `$9 LOCAL` subfields.
    pub count_local_ext: bool,

    // === Row shape ===
    /// Write one row per holdings instance, with a `hol_cnum` column.
    pub split_by_holdings: bool,

    /// Split-mode handling of records without holdings.
    pub empty_holdings: EmptyHoldingsPolicy,

    // === Scheduling ===
    /// Assemble rows for a batch of records in parallel.
    ///
    /// Output order is unchanged: rows are written in record order.
    pub parallel: bool,

    /// Records per batch in parallel mode.
    pub batch_size: usize,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            count_ploc: false,
            count_eloc: false,
            count_local_ext: false,
            split_by_holdings: false,
            empty_holdings: EmptyHoldingsPolicy::default(),
            parallel: false,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl MinerConfig {
    /// Create a configuration with every option off.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle the `n_ploc` counter.
    #[must_use]
    pub fn with_count_ploc(mut self, enabled: bool) -> Self {
        self.count_ploc = enabled;
        self
    }

    /// Toggle the `n_eloc` counter.
    #[must_use]
    pub fn with_count_eloc(mut self, enabled: bool) -> Self {
        self.count_eloc = enabled;
        self
    }

    /// Toggle the `n_local_ext` counter.
    #[must_use]
    pub fn with_count_local_ext(mut self, enabled: bool) -> Self {
        self.count_local_ext = enabled;
        self
    }

    /// Toggle holdings split mode.
    #[must_use]
    pub fn with_split_by_holdings(mut self, enabled: bool) -> Self {
        self.split_by_holdings = enabled;
        self
    }

    /// Set the split-mode policy for records without holdings.
    #[must_use]
    pub fn with_empty_holdings(mut self, policy: EmptyHoldingsPolicy) -> Self {
        self.empty_holdings = policy;
        self
    }

    /// Toggle parallel batch assembly.
    #[must_use]
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Set the parallel batch size; zero is raised to one.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}
