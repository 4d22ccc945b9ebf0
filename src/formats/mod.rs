//! Record sources and row sinks.
//!
//! | Side | Type | Module |
//! |------|------|--------|
//! | source | MARCXML stream | [`marcxml`](crate::marcxml) |
//! | source | in-memory records | [`VecSource`] |
//! | sink | CSV | [`csv`](crate::csv) |
//! | sink | JSON Lines | [`json`](crate::json) |
//! | sink | in-memory rows | [`VecSink`] |

pub mod traits;

pub use traits::{RecordSource, RowSink, VecSink, VecSource};
