//! Read-only record view consumed by the extraction engine.
//!
//! The extractor and row assembler never look at markup. They see a record through
//! [`RecordAccessor`], so any tokenizer (the bundled MARCXML reader, a binary
//! reader, a test fixture) can feed them as long as it keeps fields and subfields
//! in source order.

use crate::record::{ControlField, Field, Record};

/// Read-only access to one record's leader, control fields and data fields.
///
/// # Examples
///
/// ```
/// use marc_miner::{Record, RecordAccessor};
///
/// fn describe<R: RecordAccessor + ?Sized>(record: &R) -> String {
///     format!(
///         "{} ({} data fields)",
///         record.control_number().unwrap_or("?"),
///         record.data_fields().len()
///     )
/// }
///
/// let record = Record::builder("").control_field_str("001", "b1").build();
/// assert_eq!(describe(&record), "b1 (0 data fields)");
/// ```
pub trait RecordAccessor {
    /// Leader text; empty when the record carried none.
    fn leader(&self) -> &str;

    /// Control fields in source order.
    fn control_fields(&self) -> &[ControlField];

    /// Data fields in source order.
    fn data_fields(&self) -> &[Field];

    /// Text of the first `001` control field, without surrounding whitespace.
    fn control_number(&self) -> Option<&str> {
        self.control_fields()
            .iter()
            .find(|cf| cf.tag == "001")
            .map(|cf| cf.value.trim())
    }

    /// Number of data fields carrying `tag`.
    fn count_data_fields(&self, tag: &str) -> usize {
        self.data_fields()
            .iter()
            .filter(|field| field.tag.eq_ignore_ascii_case(tag))
            .count()
    }
}

impl RecordAccessor for Record {
    fn leader(&self) -> &str {
        &self.leader
    }

    fn control_fields(&self) -> &[ControlField] {
        &self.control_fields
    }

    fn data_fields(&self) -> &[Field] {
        &self.fields
    }
}
