//! Field extraction: run one [`Selector`] against one record.
//!
//! Extraction happens in four steps:
//!
//! 1. Collect candidate fields: the leader, or every control/data field with the
//!    selector's tag, in source order.
//! 2. Discard data fields that fail an indicator filter.
//! 3. Turn each surviving field into one string according to the parameter.
//! 4. Optionally prefix the string with the field's indicators.
//!
//! Every value remembers the occurrence index of the field it came from, counted
//! among the record's fields with the same tag. Holdings splitting joins on that
//! index instead of re-splitting a `|`-joined column.
//!
//! # Examples
//!
//! ```
//! use marc_miner::{extractor, Field, Record, Selector};
//!
//! let record = Record::builder("")
//!     .field(Field::builder("264".to_string(), ' ', '1').subfield_str('b', "Pub A").build())
//!     .field(Field::builder("264".to_string(), ' ', '4').subfield_str('b', "Pub B").build())
//!     .build();
//!
//! let selector = Selector::parse("264ind2=4_b")?;
//! assert_eq!(extractor::extract_joined(&selector, &record), "Pub B");
//! # Ok::<(), marc_miner::MinerError>(())
//! ```

use crate::accessor::RecordAccessor;
use crate::record::Field;
use crate::selector::{Selector, SelectorParam, TagKind};

/// Separator between values extracted from repeated field instances.
pub const VALUE_SEPARATOR: &str = "|";

/// Separator between subfield texts within one field.
pub const SUBFIELD_SEPARATOR: &str = " ";

/// One value extracted from one field instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    /// Index of the source field among the record's fields with the same tag
    pub occurrence: usize,
    /// Extracted text, possibly empty
    pub value: String,
}

/// Run a selector against a record.
///
/// Returns one entry per surviving field instance in source order; an empty vector
/// means the selector matched nothing.
pub fn extract<R>(selector: &Selector, record: &R) -> Vec<Extracted>
where
    R: RecordAccessor + ?Sized,
{
    if selector.kind() == TagKind::Leader {
        let leader = record.leader();
        if leader.is_empty() {
            return Vec::new();
        }
        return vec![Extracted {
            occurrence: 0,
            value: text_value(leader, selector.param()),
        }];
    }

    let tag = selector.tag();
    let control = record
        .control_fields()
        .iter()
        .filter(|cf| cf.tag.eq_ignore_ascii_case(tag))
        .map(|cf| text_value(&cf.value, selector.param()));

    let data = record
        .data_fields()
        .iter()
        .filter(|field| field.tag.eq_ignore_ascii_case(tag))
        .map(|field| {
            selector
                .accepts(field)
                .then(|| data_value(selector, field))
        });

    control
        .map(Some)
        .chain(data)
        .enumerate()
        .filter_map(|(occurrence, value)| value.map(|value| Extracted { occurrence, value }))
        .collect()
}

/// Run a selector and keep only the strings.
pub fn extract_values<R>(selector: &Selector, record: &R) -> Vec<String>
where
    R: RecordAccessor + ?Sized,
{
    extract(selector, record)
        .into_iter()
        .map(|extracted| extracted.value)
        .collect()
}

/// Run a selector and join its values with [`VALUE_SEPARATOR`].
pub fn extract_joined<R>(selector: &Selector, record: &R) -> String
where
    R: RecordAccessor + ?Sized,
{
    join_values(&extract(selector, record))
}

/// Join extracted values with [`VALUE_SEPARATOR`].
#[must_use]
pub fn join_values(values: &[Extracted]) -> String {
    values
        .iter()
        .map(|extracted| extracted.value.as_str())
        .collect::<Vec<_>>()
        .join(VALUE_SEPARATOR)
}

/// Value of a leader or control field.
fn text_value(text: &str, param: &SelectorParam) -> String {
    match *param {
        SelectorParam::All => text.to_string(),
        SelectorParam::Offset(offset) => char_at(text, offset),
        // Plain-text fields have no subfields.
        SelectorParam::Code(_) => String::new(),
    }
}

/// Value of a data field, with the optional indicator prefix.
fn data_value(selector: &Selector, field: &Field) -> String {
    let value = match *selector.param() {
        SelectorParam::All => field.value(),
        SelectorParam::Code(code) => field
            .subfields_by_code(code)
            .collect::<Vec<_>>()
            .join(SUBFIELD_SEPARATOR),
        SelectorParam::Offset(offset) => char_at(&field.value(), offset),
    };

    if selector.show_indicators() && !field.has_blank_indicators() {
        format!("{{{}{}}}{value}", field.indicator1, field.indicator2)
    } else {
        value
    }
}

/// Character at a 0-based char offset, or empty when out of range.
fn char_at(text: &str, offset: usize) -> String {
    text.chars().nth(offset).map(String::from).unwrap_or_default()
}
