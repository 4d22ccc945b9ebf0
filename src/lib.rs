#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # marc-miner: MARC feature extraction
//!
//! Turns MARC bibliographic records into flat rows. Each requested feature is a
//! small selector expression (`245$a`, `008_35`, `264ind2=4_b`, `ldr/06`) compiled
//! once and run against every record.
//!
//! ## Quick Start
//!
//! ```
//! use marc_miner::formats::VecSink;
//! use marc_miner::marcxml::MarcXmlReader;
//! use marc_miner::{Miner, MinerConfig};
//!
//! let xml = r#"<collection>
//!   <record>
//!     <leader>00000nam a2200000 a 4500</leader>
//!     <controlfield tag="001">b1</controlfield>
//!     <controlfield tag="008">210101s</controlfield>
//!     <datafield tag="650" ind1=" " ind2="0">
//!       <subfield code="a">Jazz</subfield>
//!     </datafield>
//!   </record>
//! </collection>"#;
//!
//! let miner = Miner::from_features("ldr/06,008_6,650$a", MinerConfig::default())?;
//! let mut sink = VecSink::new();
//! miner.run(&mut MarcXmlReader::new(xml.as_bytes()), &mut sink)?;
//!
//! let row = &sink.rows[0];
//! assert_eq!(row.get("bib_cnum"), Some("b1"));
//! assert_eq!(row.get("leader_6"), Some("a"));
//! assert_eq!(row.get("008_6"), Some("s"));
//! assert_eq!(row.get("650_a"), Some("Jazz"));
//! # Ok::<(), marc_miner::MinerError>(())
//! ```
//!
//! ## Modules
//!
//! - [`record`] — Core MARC record structures (`Record`, `Field`, `Subfield`)
//! - [`accessor`] — Read-only record view used by extraction
//! - [`selector`] — Feature token cleaning and selector compilation
//! - [`extractor`] — Running one selector against one record
//! - [`row`] — Row assembly, counters and holdings split
//! - [`pipeline`] — Record stream driver
//! - [`formats`] — Record source and row sink traits
//! - [`marcxml`] — Streaming MARCXML reader
//! - [`csv`] — CSV row writer
//! - [`json`] — JSON Lines row writer
//! - [`config`] — Run configuration
//! - [`cli`] — Command-line front end
//! - [`error`] — Error types and result type

pub mod accessor;
pub mod cli;
pub mod config;
pub mod csv;
pub mod error;
pub mod extractor;
/// Record sources and row sinks.
///
/// See the [`formats`] module documentation for the available implementations.
pub mod formats;
pub mod json;
pub mod marcxml;
pub mod pipeline;
/// Core MARC record structures (`Record`, `Field`, `Subfield`)
pub mod record;
pub mod row;
pub mod selector;

pub use accessor::RecordAccessor;
pub use config::{EmptyHoldingsPolicy, MinerConfig};
pub use error::{MinerError, Result};
pub use extractor::Extracted;
pub use formats::{RecordSource, RowSink};
pub use marcxml::MarcXmlReader;
pub use pipeline::{Miner, RunSummary};
pub use record::{ControlField, Field, FieldBuilder, Record, RecordBuilder, Subfield};
pub use row::{Row, RowAssembler};
pub use selector::{IndicatorFilter, IndicatorValue, Selector, SelectorParam, TagKind};
