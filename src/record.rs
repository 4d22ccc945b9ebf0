//! MARC bibliographic record structures.
//!
//! This module provides the record types the extractor reads from:
//! - [`Record`] — Leader text, control fields and data fields in source order
//! - [`ControlField`] — Tagged plain-text fields (`00x`)
//! - [`Field`] — Variable data fields with two indicators and coded subfields
//! - [`Subfield`] — Named data elements within fields
//!
//! Unlike a tag-keyed map, both field lists are plain vectors: the position of a
//! field among its same-tag siblings drives holdings alignment, so source order is
//! kept exactly as encountered.
//!
//! # Examples
//!
//! ```
//! use marc_miner::{Field, Record};
//!
//! let record = Record::builder("00000nam a2200000 a 4500")
//!     .control_field_str("001", "12345")
//!     .field(
//!         Field::builder("245".to_string(), '1', '0')
//!             .subfield_str('a', "Title")
//!             .build(),
//!     )
//!     .build();
//!
//! assert_eq!(record.control_number(), Some("12345"));
//! assert_eq!(record.fields_by_tag("245").count(), 1);
//! ```

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Blank indicator value.
///
/// MARCXML writes an unset indicator as a single space; readers map a missing
/// attribute to the same value.
pub const BLANK_INDICATOR: char = ' ';

/// A MARC bibliographic record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Leader text (empty when the source record carried none)
    pub leader: String,
    /// Control fields (001-009) in source order
    pub control_fields: Vec<ControlField>,
    /// Data fields (010+) in source order
    pub fields: Vec<Field>,
}

/// A control field: a tag with plain text, no indicators or subfields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlField {
    /// Field tag (3 characters, usually "00x")
    pub tag: String,
    /// Field text
    pub value: String,
}

/// A data field in a MARC record (fields 010 and higher)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field tag (3 digits)
    pub tag: String,
    /// First indicator
    pub indicator1: char,
    /// Second indicator
    pub indicator2: char,
    /// Subfields (stored in `SmallVec` to avoid allocation for typical fields with 4 or fewer subfields)
    pub subfields: SmallVec<[Subfield; 4]>,
}

/// A subfield within a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subfield {
    /// Subfield code (single character)
    pub code: char,
    /// Subfield value
    pub value: String,
}

impl Record {
    /// Create a new record with the given leader text
    #[must_use]
    pub fn new(leader: impl Into<String>) -> Self {
        Record {
            leader: leader.into(),
            control_fields: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Create a builder for fluently constructing records
    ///
    /// # Examples
    ///
    /// ```
    /// use marc_miner::{Field, Record};
    ///
    /// let record = Record::builder("00000nam a2200000 a 4500")
    ///     .control_field_str("001", "12345")
    ///     .field(Field::builder("852".to_string(), ' ', ' ')
    ///         .subfield_str('8', "H1")
    ///         .build())
    ///     .build();
    /// assert_eq!(record.fields.len(), 1);
    /// ```
    #[must_use]
    pub fn builder(leader: impl Into<String>) -> RecordBuilder {
        RecordBuilder {
            record: Record::new(leader),
        }
    }

    /// Append a control field (000-009)
    ///
    /// Repeated tags are kept; lookups return the first occurrence.
    pub fn add_control_field(&mut self, tag: String, value: String) {
        self.control_fields.push(ControlField { tag, value });
    }

    /// Append a control field using string slices
    pub fn add_control_field_str(&mut self, tag: &str, value: &str) {
        self.add_control_field(tag.to_string(), value.to_string());
    }

    /// Get the first control field value with a given tag
    #[must_use]
    pub fn get_control_field(&self, tag: &str) -> Option<&str> {
        self.control_fields
            .iter()
            .find(|cf| cf.tag == tag)
            .map(|cf| cf.value.as_str())
    }

    /// Append a data field
    pub fn add_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Get first data field with a given tag
    #[must_use]
    pub fn get_field(&self, tag: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.tag.eq_ignore_ascii_case(tag))
    }

    /// Iterate over data fields matching a specific tag, in source order
    ///
    /// # Examples
    ///
    /// ```ignore
    /// for field in record.fields_by_tag("650") {
    ///     if let Some(subject) = field.get_subfield('a') {
    ///         println!("Subject: {}", subject);
    ///     }
    /// }
    /// ```
    pub fn fields_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Field> + 'a {
        self.fields
            .iter()
            .filter(move |field| field.tag.eq_ignore_ascii_case(tag))
    }

    /// Get the control number (system number) from field 001, trimmed
    #[must_use]
    pub fn control_number(&self) -> Option<&str> {
        self.get_control_field("001").map(str::trim)
    }
}

/// Builder for fluently constructing records
#[derive(Debug)]
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    /// Add a control field to the record being built
    #[must_use]
    pub fn control_field(mut self, tag: String, value: String) -> Self {
        self.record.add_control_field(tag, value);
        self
    }

    /// Add a control field using string slices
    #[must_use]
    pub fn control_field_str(mut self, tag: &str, value: &str) -> Self {
        self.record.add_control_field_str(tag, value);
        self
    }

    /// Add a data field to the record being built
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.record.add_field(field);
        self
    }

    /// Build the record
    #[must_use]
    pub fn build(self) -> Record {
        self.record
    }
}

impl Field {
    /// Create a new data field
    #[must_use]
    pub fn new(tag: String, indicator1: char, indicator2: char) -> Self {
        Field {
            tag,
            indicator1,
            indicator2,
            subfields: SmallVec::new(),
        }
    }

    /// Create a builder for constructing fields fluently
    ///
    /// # Examples
    ///
    /// ```
    /// use marc_miner::Field;
    ///
    /// let field = Field::builder("245".to_string(), '1', '0')
    ///     .subfield_str('a', "The Great Gatsby")
    ///     .subfield_str('c', "F. Scott Fitzgerald")
    ///     .build();
    /// assert_eq!(field.value(), "The Great Gatsby F. Scott Fitzgerald");
    /// ```
    #[must_use]
    pub fn builder(tag: String, indicator1: char, indicator2: char) -> FieldBuilder {
        FieldBuilder {
            field: Field::new(tag, indicator1, indicator2),
        }
    }

    /// Add a subfield
    pub fn add_subfield(&mut self, code: char, value: String) {
        self.subfields.push(Subfield { code, value });
    }

    /// Add a subfield using a string slice
    pub fn add_subfield_str(&mut self, code: char, value: &str) {
        self.add_subfield(code, value.to_string());
    }

    /// Get first value for a subfield code
    #[must_use]
    pub fn get_subfield(&self, code: char) -> Option<&str> {
        self.subfields
            .iter()
            .find(|sf| sf.code == code)
            .map(|sf| sf.value.as_str())
    }

    /// Iterate over subfield values with a specific code
    pub fn subfields_by_code(&self, code: char) -> impl Iterator<Item = &str> {
        self.subfields
            .iter()
            .filter(move |sf| sf.code == code)
            .map(|sf| sf.value.as_str())
    }

    /// Get an indicator by its 1-based position.
    ///
    /// Returns `None` for any position other than 1 or 2.
    #[must_use]
    pub fn indicator(&self, position: u8) -> Option<char> {
        match position {
            1 => Some(self.indicator1),
            2 => Some(self.indicator2),
            _ => None,
        }
    }

    /// True when both indicators are blank
    #[must_use]
    pub fn has_blank_indicators(&self) -> bool {
        self.indicator1 == BLANK_INDICATOR && self.indicator2 == BLANK_INDICATOR
    }

    /// Concatenate all subfield values with single spaces, in source order
    #[must_use]
    pub fn value(&self) -> String {
        self.subfields
            .iter()
            .map(|sf| sf.value.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Builder for fluently constructing MARC fields
#[derive(Debug)]
pub struct FieldBuilder {
    field: Field,
}

impl FieldBuilder {
    /// Add a subfield to the field being built
    #[must_use]
    pub fn subfield_str(mut self, code: char, value: &str) -> Self {
        self.field.add_subfield_str(code, value);
        self
    }

    /// Build the field
    #[must_use]
    pub fn build(self) -> Field {
        self.field
    }
}
