//! Streaming MARCXML reader.
//!
//! Reads `<record>` elements one at a time from any buffered source, so a
//! multi-gigabyte `<collection>` never has to fit in memory. Both default-namespace
//! (`<record xmlns="...">`) and prefix-namespace (`<marc:record>`) forms are
//! accepted: elements and attributes are matched on their local name.
//!
//! The reader is lenient about content and strict about structure:
//!
//! - a missing or empty `ind1`/`ind2` is read as a blank indicator
//! - a missing subfield `code` is read as `' '`
//! - unknown elements are skipped
//! - a document that ends inside a `<record>` is an error
//!
//! # Examples
//!
//! ```
//! use marc_miner::marcxml::MarcXmlReader;
//! use marc_miner::formats::RecordSource;
//!
//! let xml = r#"<collection xmlns="http://www.loc.gov/MARC21/slim">
//!   <record>
//!     <leader>00000nam a2200000 a 4500</leader>
//!     <controlfield tag="001">b1</controlfield>
//!     <datafield tag="245" ind1="1" ind2="0">
//!       <subfield code="a">Title</subfield>
//!     </datafield>
//!   </record>
//! </collection>"#;
//!
//! let mut reader = MarcXmlReader::new(xml.as_bytes());
//! let record = reader.read_record()?.expect("one record");
//! assert_eq!(record.get_control_field("001"), Some("b1"));
//! assert!(reader.read_record()?.is_none());
//! # Ok::<(), marc_miner::MinerError>(())
//! ```

use std::fmt;
use std::io::BufRead;
use std::mem;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{MinerError, Result};
use crate::formats::RecordSource;
use crate::record::{Field, Record, BLANK_INDICATOR};

/// The MARCXML namespace URI.
pub const MARCXML_NS: &str = "http://www.loc.gov/MARC21/slim";

/// Reads MARCXML records from a buffered source.
pub struct MarcXmlReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    records_read: usize,
}

impl<R: BufRead> fmt::Debug for MarcXmlReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarcXmlReader")
            .field("records_read", &self.records_read)
            .finish_non_exhaustive()
    }
}

impl<R: BufRead> MarcXmlReader<R> {
    /// Wrap a buffered source.
    pub fn new(source: R) -> Self {
        Self {
            reader: Reader::from_reader(source),
            buf: Vec::new(),
            records_read: 0,
        }
    }

    /// Byte offset the tokenizer has reached
    #[must_use]
    pub fn position(&self) -> usize {
        self.reader.buffer_position()
    }

    fn next_record(&mut self) -> Result<Option<Record>> {
        let mut state = RecordState::default();

        loop {
            self.buf.clear();
            let event = match self.reader.read_event_into(&mut self.buf) {
                Ok(event) => event,
                Err(e) => {
                    return Err(MinerError::ParseError(format!(
                        "Failed to parse MARCXML at byte {}: {e}",
                        self.reader.buffer_position()
                    )))
                },
            };

            match event {
                Event::Start(start) => state.open(&start)?,
                Event::Empty(start) => {
                    state.open(&start)?;
                    if let Some(record) = state.close(start.local_name().as_ref()) {
                        self.records_read += 1;
                        return Ok(Some(record));
                    }
                },
                Event::End(end) => {
                    if let Some(record) = state.close(end.local_name().as_ref()) {
                        self.records_read += 1;
                        return Ok(Some(record));
                    }
                },
                Event::Text(text) if state.capturing() => {
                    let text = text.unescape().map_err(xml_error)?;
                    state.text.push_str(&text);
                },
                Event::CData(data) if state.capturing() => {
                    state.text.push_str(&String::from_utf8_lossy(&data));
                },
                Event::Eof => {
                    if state.record.is_some() {
                        return Err(MinerError::ParseError(
                            "Failed to parse MARCXML: input ended inside <record>".to_string(),
                        ));
                    }
                    return Ok(None);
                },
                _ => {},
            }
        }
    }
}

impl<R: BufRead> RecordSource for MarcXmlReader<R> {
    fn read_record(&mut self) -> Result<Option<Record>> {
        self.next_record()
    }

    fn records_read(&self) -> Option<usize> {
        Some(self.records_read)
    }
}

impl<R: BufRead> Iterator for MarcXmlReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// Parse every record in a MARCXML string.
///
/// # Errors
///
/// Returns an error if the XML is malformed.
pub fn marcxml_to_records(xml: &str) -> Result<Vec<Record>> {
    MarcXmlReader::new(xml.as_bytes()).collect()
}

/// Parse the first record in a MARCXML string.
///
/// # Errors
///
/// Returns an error if the XML is malformed or holds no `<record>`.
pub fn marcxml_to_record(xml: &str) -> Result<Record> {
    MarcXmlReader::new(xml.as_bytes())
        .next_record()?
        .ok_or_else(|| MinerError::ParseError("No <record> element in MARCXML".to_string()))
}

#[derive(Debug, Default)]
enum Capture {
    #[default]
    Nothing,
    Leader,
    Control(String),
    Subfield(char),
}

/// Partially built record between `<record>` and `</record>`.
#[derive(Debug, Default)]
struct RecordState {
    record: Option<Record>,
    field: Option<Field>,
    capture: Capture,
    text: String,
}

impl RecordState {
    fn capturing(&self) -> bool {
        !matches!(self.capture, Capture::Nothing)
    }

    fn open(&mut self, start: &BytesStart<'_>) -> Result<()> {
        let name = start.local_name();
        if name.as_ref() == b"record" {
            self.record = Some(Record::default());
            return Ok(());
        }
        if self.record.is_none() {
            return Ok(());
        }

        match name.as_ref() {
            b"leader" => self.begin_text(Capture::Leader),
            b"controlfield" => {
                let tag = attribute(start, b"tag")?.unwrap_or_default();
                self.begin_text(Capture::Control(tag));
            },
            b"datafield" => {
                let tag = attribute(start, b"tag")?.unwrap_or_default();
                let ind1 = indicator(attribute(start, b"ind1")?);
                let ind2 = indicator(attribute(start, b"ind2")?);
                self.field = Some(Field::new(tag, ind1, ind2));
            },
            b"subfield" if self.field.is_some() => {
                let code = attribute(start, b"code")?
                    .and_then(|code| code.chars().next())
                    .unwrap_or(' ');
                self.begin_text(Capture::Subfield(code));
            },
            _ => {},
        }
        Ok(())
    }

    /// Handle a closing element; returns the record when `</record>` closes it.
    fn close(&mut self, name: &[u8]) -> Option<Record> {
        let record = self.record.as_mut()?;

        match (name, mem::take(&mut self.capture)) {
            (b"record", _) => {
                if let Some(field) = self.field.take() {
                    record.add_field(field);
                }
                return self.record.take();
            },
            (b"leader", Capture::Leader) => {
                record.leader = mem::take(&mut self.text);
            },
            (b"controlfield", Capture::Control(tag)) => {
                record.add_control_field(tag, mem::take(&mut self.text));
            },
            (b"subfield", Capture::Subfield(code)) => {
                if let Some(field) = self.field.as_mut() {
                    field.add_subfield(code, mem::take(&mut self.text));
                }
            },
            (b"datafield", _) => {
                if let Some(field) = self.field.take() {
                    record.add_field(field);
                }
            },
            (_, capture) => self.capture = capture,
        }
        None
    }

    fn begin_text(&mut self, capture: Capture) {
        self.capture = capture;
        self.text.clear();
    }
}

fn indicator(value: Option<String>) -> char {
    value
        .and_then(|value| value.chars().next())
        .unwrap_or(BLANK_INDICATOR)
}

fn attribute(start: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>> {
    for attr in start.attributes() {
        let attr = attr
            .map_err(|e| MinerError::ParseError(format!("Malformed MARCXML attribute: {e}")))?;
        if attr.key.local_name().as_ref() == name {
            let value = attr.unescape_value().map_err(xml_error)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn xml_error(e: quick_xml::Error) -> MinerError {
    MinerError::ParseError(format!("Failed to parse MARCXML: {e}"))
}
