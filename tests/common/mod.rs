//! Common test helpers shared across the integration test suite.

#![allow(dead_code)]

use marc_miner::{Field, Record};

/// Leader used by most test records.
pub const TEST_LEADER: &str = "01142cam  2200301 a 4500";

/// Build a data field from `(code, value)` pairs.
pub fn field(tag: &str, ind1: char, ind2: char, subfields: &[(char, &str)]) -> Field {
    let mut field = Field::new(tag.to_string(), ind1, ind2);
    for (code, value) in subfields {
        field.add_subfield_str(*code, value);
    }
    field
}

/// Creates a simple record with a leader and a control number.
pub fn create_test_record(bib_cnum: &str) -> Record {
    Record::builder(TEST_LEADER)
        .control_field_str("001", bib_cnum)
        .control_field_str("008", "210101s2021    nyu           000 0 eng d")
        .build()
}

/// Creates a realistic bibliographic record with two holdings instances.
///
/// Includes a title, two LCSH subjects, a local subject, two publication
/// statements (ind2 `1` and `4`), two 852 holdings and one 856 link.
pub fn create_realistic_record() -> Record {
    let mut record = create_test_record("b1000001");
    record.add_field(field("020", ' ', ' ', &[('a', "9780000000001"), ('q', "pbk")]));
    record.add_field(field(
        "245",
        '1',
        '0',
        &[('a', "Jazz :"), ('b', "a history /"), ('c', "by A. Writer.")],
    ));
    record.add_field(field(
        "264",
        ' ',
        '1',
        &[('a', "New York :"), ('b', "Publisher,"), ('c', "2021.")],
    ));
    record.add_field(field("264", ' ', '4', &[('c', "©2021")]));
    record.add_field(field(
        "650",
        ' ',
        '0',
        &[('a', "Jazz"), ('x', "History"), ('y', "20th century")],
    ));
    record.add_field(field(
        "650",
        ' ',
        '0',
        &[('a', "Blues"), ('x', "History"), ('v', "Sources")],
    ));
    record.add_field(field("690", ' ', ' ', &[('a', "Local jazz"), ('9', "LOCAL")]));
    record.add_field(field(
        "852",
        '0',
        ' ',
        &[('8', "H1"), ('b', "MAIN"), ('h', "A")],
    ));
    record.add_field(field(
        "852",
        '0',
        ' ',
        &[('8', "H2"), ('b', "ANNEX"), ('h', "B")],
    ));
    record.add_field(field("856", '4', '0', &[('u', "http://example.org/jazz")]));
    record
}

/// Wrap record bodies in a namespaced MARCXML collection.
pub fn marcxml_collection(records: &[&str]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <collection xmlns=\"http://www.loc.gov/MARC21/slim\">\n",
    );
    for record in records {
        xml.push_str("<record>");
        xml.push_str(record);
        xml.push_str("</record>\n");
    }
    xml.push_str("</collection>\n");
    xml
}

/// MARCXML body equivalent to [`create_realistic_record`] minus the 008.
pub const REALISTIC_RECORD_XML: &str = r#"
  <leader>01142cam  2200301 a 4500</leader>
  <controlfield tag="001">b1000001</controlfield>
  <datafield tag="245" ind1="1" ind2="0">
    <subfield code="a">Jazz :</subfield>
    <subfield code="b">a history /</subfield>
  </datafield>
  <datafield tag="650" ind1=" " ind2="0">
    <subfield code="a">Jazz</subfield>
  </datafield>
  <datafield tag="690" ind1=" " ind2=" ">
    <subfield code="a">Local jazz</subfield>
    <subfield code="9">local</subfield>
  </datafield>
  <datafield tag="852" ind1="0" ind2=" ">
    <subfield code="8">H1</subfield>
    <subfield code="h">A</subfield>
  </datafield>
  <datafield tag="852" ind1="0" ind2=" ">
    <subfield code="8">H2</subfield>
    <subfield code="h">B</subfield>
  </datafield>
  <datafield tag="856" ind1="4" ind2="0">
    <subfield code="u">http://example.org/jazz</subfield>
  </datafield>
"#;
