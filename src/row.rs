//! Row assembly: one record in, zero or more flat rows out.
//!
//! A [`RowAssembler`] owns the compiled selectors and the run configuration. For
//! each record it builds a base row (`bib_cnum`, enabled counters, selector
//! columns) and, in holdings-split mode, clones it once per `852` field with the
//! holdings-band columns narrowed to that holdings instance.
//!
//! # Examples
//!
//! ```
//! use marc_miner::{Field, MinerConfig, Record, RowAssembler};
//! use marc_miner::selector::parse_selectors;
//!
//! let record = Record::builder("")
//!     .control_field_str("001", "b1")
//!     .field(Field::builder("852".to_string(), ' ', ' ')
//!         .subfield_str('8', "H1").subfield_str('h', "QA76").build())
//!     .field(Field::builder("852".to_string(), ' ', ' ')
//!         .subfield_str('8', "H2").subfield_str('h', "Z699").build())
//!     .build();
//!
//! let assembler = RowAssembler::new(
//!     parse_selectors("852$h")?,
//!     MinerConfig::default().with_split_by_holdings(true),
//! );
//! let rows = assembler.assemble(&record);
//!
//! assert_eq!(rows.len(), 2);
//! assert_eq!(rows[1].get("hol_cnum"), Some("H2"));
//! assert_eq!(rows[1].get("852_h"), Some("Z699"));
//! # Ok::<(), marc_miner::MinerError>(())
//! ```

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::accessor::RecordAccessor;
use crate::config::{EmptyHoldingsPolicy, MinerConfig};
use crate::extractor::{self, Extracted};
use crate::record::Field;
use crate::selector::Selector;

/// Column holding the record control number (`001`).
pub const BIB_CNUM: &str = "bib_cnum";
/// Column holding the holdings identifier in split mode.
pub const HOL_CNUM: &str = "hol_cnum";
/// Column counting physical locations.
pub const N_PLOC: &str = "n_ploc";
/// Column counting electronic locations.
pub const N_ELOC: &str = "n_eloc";
/// Column counting `$9 LOCAL` extensions.
pub const N_LOCAL_EXT: &str = "n_local_ext";

const HOLDINGS_TAG: &str = "852";
const ELECTRONIC_LOCATION_TAG: &str = "856";
const HOLDINGS_ID_CODE: char = '8';
const LOCAL_EXT_CODE: char = '9';
const LOCAL_EXT_VALUE: &str = "local";

/// One output row: column name to value, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Row {
    values: IndexMap<String, String>,
}

impl Row {
    /// Create an empty row
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a column
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    /// Set a column value.
    ///
    /// New columns are appended; existing ones keep their position.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.values.insert(column.into(), value.into());
    }

    /// Number of columns
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the row has no columns
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Column names in order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Values in column order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.values.values().map(String::as_str)
    }

    /// (column, value) pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Builds rows for records from a fixed selector list.
#[derive(Debug, Clone)]
pub struct RowAssembler {
    selectors: Vec<Selector>,
    config: MinerConfig,
    columns: Vec<String>,
}

impl RowAssembler {
    /// Create an assembler.
    ///
    /// Selectors sharing a column name overwrite each other's values (the later one
    /// wins); a warning is logged for each duplicate.
    #[must_use]
    pub fn new(selectors: Vec<Selector>, config: MinerConfig) -> Self {
        let mut columns: IndexSet<String> = IndexSet::new();
        columns.insert(BIB_CNUM.to_string());
        if config.count_ploc {
            columns.insert(N_PLOC.to_string());
        }
        if config.count_eloc {
            columns.insert(N_ELOC.to_string());
        }
        if config.count_local_ext {
            columns.insert(N_LOCAL_EXT.to_string());
        }
        if config.split_by_holdings {
            columns.insert(HOL_CNUM.to_string());
        }
        for selector in &selectors {
            if !columns.insert(selector.column_name().to_string()) {
                tracing::warn!(
                    column = selector.column_name(),
                    "duplicate selector column; later values overwrite earlier ones"
                );
            }
        }

        Self {
            selectors,
            config,
            columns: columns.into_iter().collect(),
        }
    }

    /// Output columns in order; every row has exactly these keys.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Compiled selectors in request order
    #[must_use]
    pub fn selectors(&self) -> &[Selector] {
        &self.selectors
    }

    /// Run configuration
    #[must_use]
    pub fn config(&self) -> &MinerConfig {
        &self.config
    }

    /// Build every row a record contributes.
    pub fn assemble<R>(&self, record: &R) -> Vec<Row>
    where
        R: RecordAccessor + ?Sized,
    {
        let extractions: Vec<Vec<Extracted>> = self
            .selectors
            .iter()
            .map(|selector| extractor::extract(selector, record))
            .collect();

        let base = self.base_row(record, &extractions);
        if !self.config.split_by_holdings {
            return vec![base];
        }

        let holdings: Vec<&Field> = record
            .data_fields()
            .iter()
            .filter(|field| field.tag == HOLDINGS_TAG)
            .collect();

        if holdings.is_empty() {
            return match self.config.empty_holdings {
                EmptyHoldingsPolicy::Drop => {
                    tracing::trace!(
                        bib_cnum = base.get(BIB_CNUM).unwrap_or_default(),
                        "record without holdings dropped in split mode"
                    );
                    Vec::new()
                },
                EmptyHoldingsPolicy::EmitUnheld => vec![base],
            };
        }

        holdings
            .iter()
            .enumerate()
            .map(|(index, holding)| self.holdings_row(&base, &extractions, index, holding))
            .collect()
    }

    fn base_row<R>(&self, record: &R, extractions: &[Vec<Extracted>]) -> Row
    where
        R: RecordAccessor + ?Sized,
    {
        let mut row = Row::new();
        row.set(BIB_CNUM, record.control_number().unwrap_or_default());
        if self.config.count_ploc {
            row.set(N_PLOC, record.count_data_fields(HOLDINGS_TAG).to_string());
        }
        if self.config.count_eloc {
            row.set(
                N_ELOC,
                record.count_data_fields(ELECTRONIC_LOCATION_TAG).to_string(),
            );
        }
        if self.config.count_local_ext {
            row.set(N_LOCAL_EXT, count_local_extensions(record).to_string());
        }
        if self.config.split_by_holdings {
            row.set(HOL_CNUM, "");
        }
        for (selector, extracted) in self.selectors.iter().zip(extractions) {
            row.set(selector.column_name(), extractor::join_values(extracted));
        }
        row
    }

    fn holdings_row(
        &self,
        base: &Row,
        extractions: &[Vec<Extracted>],
        index: usize,
        holding: &Field,
    ) -> Row {
        let mut row = base.clone();
        row.set(
            HOL_CNUM,
            holding.get_subfield(HOLDINGS_ID_CODE).unwrap_or_default(),
        );

        for (selector, extracted) in self.selectors.iter().zip(extractions) {
            if selector.in_holdings_band() {
                let value = extracted
                    .iter()
                    .find(|e| e.occurrence == index)
                    .map(|e| e.value.clone())
                    .unwrap_or_default();
                row.set(selector.column_name(), value);
            }
        }
        row
    }
}

/// Count `$9` subfields whose whole text is `local`, ignoring case.
pub fn count_local_extensions<R>(record: &R) -> usize
where
    R: RecordAccessor + ?Sized,
{
    record
        .data_fields()
        .iter()
        .flat_map(|field| field.subfields_by_code(LOCAL_EXT_CODE))
        .filter(|value| value.eq_ignore_ascii_case(LOCAL_EXT_VALUE))
        .count()
}
