//! Feature selector language.
//!
//! A selector names what to pull out of each record: a tag, optional indicator
//! constraints, an optional parameter and an optional indicator-echo flag.
//!
//! ```text
//! token     := head [ "_" param ]
//! head      := tag { ws* fragment }
//! tag       := "leader" | 3 x alphanumeric
//! fragment  := "ind" [ ("1" | "2") "=" [ value ] ]
//! param     := offset | subfield-code | "all" | "full"
//! ```
//!
//! Raw tokens are normalized by [`clean_feature`] before parsing, so `LDR/07`,
//! `008/06`, `856$u` and `264ind2=4.b` all become valid tokens.
//!
//! # Examples
//!
//! ```
//! use marc_miner::selector::{IndicatorValue, Selector, SelectorParam};
//!
//! let selector: Selector = "264ind1= ind2=4$b".parse()?;
//! assert_eq!(selector.tag(), "264");
//! assert_eq!(selector.param(), &SelectorParam::Code('b'));
//! assert_eq!(selector.indicator_filters().len(), 2);
//! assert_eq!(selector.indicator_filters()[0].value, IndicatorValue::Blank);
//! assert_eq!(selector.column_name(), "264ind1= ind2=4_b");
//! # Ok::<(), marc_miner::MinerError>(())
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::error::{MinerError, Result};
use crate::record::{Field, BLANK_INDICATOR};

/// Tag used for selectors that read the record leader.
pub const LEADER_TAG: &str = "leader";

/// Holdings-band tags: one value per holdings instance in split mode.
const HOLDINGS_BAND: std::ops::RangeInclusive<u16> = 840..=879;

/// Electronic-location tags inside the band that are not per-holdings.
const ELECTRONIC_LOCATION_TAGS: [u16; 2] = [856, 857];

/// Which part of the record a selector reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// The record leader
    Leader,
    /// A control field (`00x`)
    Control,
    /// A data field with indicators and subfields
    Data,
}

/// Required indicator value in an indicator filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorValue {
    /// Indicator must be blank (`ind1=`, `ind1=#`)
    Blank,
    /// Indicator must equal this character
    Char(char),
}

impl IndicatorValue {
    /// Check an indicator character against this requirement.
    #[must_use]
    pub fn matches(self, indicator: char) -> bool {
        match self {
            IndicatorValue::Blank => indicator == BLANK_INDICATOR,
            IndicatorValue::Char(c) => indicator == c,
        }
    }
}

/// One `ind<position>=<value>` constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorFilter {
    /// Indicator position (1 or 2)
    pub position: u8,
    /// Required value
    pub value: IndicatorValue,
}

impl IndicatorFilter {
    /// Check a data field against this filter.
    ///
    /// A position the field cannot supply never matches.
    #[must_use]
    pub fn matches(&self, field: &Field) -> bool {
        field
            .indicator(self.position)
            .is_some_and(|indicator| self.value.matches(indicator))
    }
}

/// What to take from each matching field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorParam {
    /// The whole field (all subfields for data fields)
    All,
    /// A single character at a 0-based offset (leader and control fields)
    Offset(usize),
    /// Every subfield with this code (data fields)
    Code(char),
}

/// A compiled feature selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    tag: String,
    kind: TagKind,
    indicator_filters: Vec<IndicatorFilter>,
    param: SelectorParam,
    show_indicators: bool,
    column_name: String,
}

impl Selector {
    /// Clean and compile one raw selector token.
    ///
    /// # Errors
    ///
    /// Returns [`MinerError::MalformedSelector`] naming the cleaned token when the
    /// tag is missing, an indicator fragment is malformed, or the parameter does not
    /// suit the tag.
    pub fn parse(raw: &str) -> Result<Self> {
        let token = clean_feature(raw);
        SelectorParser::new(&token).parse()
    }

    /// Field tag, or [`LEADER_TAG`].
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Which part of the record the selector reads.
    #[must_use]
    pub fn kind(&self) -> TagKind {
        self.kind
    }

    /// Indicator constraints; empty means no filtering.
    #[must_use]
    pub fn indicator_filters(&self) -> &[IndicatorFilter] {
        &self.indicator_filters
    }

    /// Parameter applied to every matching field.
    #[must_use]
    pub fn param(&self) -> &SelectorParam {
        &self.param
    }

    /// Whether extracted values are prefixed with `{ind1ind2}`.
    #[must_use]
    pub fn show_indicators(&self) -> bool {
        self.show_indicators
    }

    /// Output column name: the cleaned token exactly as written.
    #[must_use]
    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    /// True for tags 840-879 other than the electronic-location tags 856/857.
    ///
    /// These columns hold one value per holdings instance and are realigned when a
    /// record is split by holdings.
    #[must_use]
    pub fn in_holdings_band(&self) -> bool {
        self.tag.parse::<u16>().is_ok_and(|tag| {
            HOLDINGS_BAND.contains(&tag) && !ELECTRONIC_LOCATION_TAGS.contains(&tag)
        })
    }

    /// Check whether a data field passes every indicator filter.
    #[must_use]
    pub fn accepts(&self, field: &Field) -> bool {
        self.indicator_filters
            .iter()
            .all(|filter| filter.matches(field))
    }
}

impl FromStr for Selector {
    type Err = MinerError;

    fn from_str(s: &str) -> Result<Self> {
        Selector::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.column_name)
    }
}

/// Normalize a raw feature token.
///
/// Lower-cases the token, rewrites `ldr` to `leader` and folds each separator in
/// `$ / . : - _` to an underscore. A zero directly after a separator is dropped when
/// another digit follows it, so `008/06` and `008_6` name the same column.
///
/// One of `/ . : -` directly after `=` is an indicator value and is kept as is.
/// `$` and `_` there still start the parameter, so `264ind1=$c` reads a blank
/// first indicator.
///
/// # Examples
///
/// ```
/// use marc_miner::selector::clean_feature;
///
/// assert_eq!(clean_feature("LDR/07"), "leader_7");
/// assert_eq!(clean_feature("856$u"), "856_u");
/// assert_eq!(clean_feature("650$0"), "650_0");
/// assert_eq!(clean_feature("245ind1=.$a"), "245ind1=._a");
/// ```
#[must_use]
pub fn clean_feature(raw: &str) -> String {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    let separator = SEPARATOR.get_or_init(|| {
        Regex::new(r"=[/.:\-]|[$/.:\-_](?:0(\d))?").expect("separator pattern is valid")
    });

    let lowered = raw.trim().to_lowercase().replace("ldr", LEADER_TAG);
    separator
        .replace_all(&lowered, |caps: &Captures<'_>| {
            let matched = &caps[0];
            if matched.starts_with('=') {
                matched.to_string()
            } else {
                format!("_{}", caps.get(1).map_or("", |digit| digit.as_str()))
            }
        })
        .into_owned()
}

/// Split a feature list on `,`, `;` or `+`, trimming each token.
pub fn split_features(features: &str) -> impl Iterator<Item = &str> {
    features
        .split(|c: char| matches!(c, ',' | ';' | '+'))
        .map(str::trim)
}

/// Compile every token of a feature list, failing on the first malformed one.
///
/// # Errors
///
/// Returns [`MinerError::MalformedSelector`] for the first token that does not
/// compile, including empty tokens.
///
/// # Examples
///
/// ```
/// use marc_miner::selector::parse_selectors;
///
/// let selectors = parse_selectors("LDR/7;008;856$u")?;
/// let columns: Vec<_> = selectors.iter().map(|s| s.column_name()).collect();
/// assert_eq!(columns, vec!["leader_7", "008", "856_u"]);
/// # Ok::<(), marc_miner::MinerError>(())
/// ```
pub fn parse_selectors(features: &str) -> Result<Vec<Selector>> {
    split_features(features)
        .map(|token| {
            let selector = Selector::parse(token)?;
            tracing::debug!(
                column = selector.column_name(),
                tag = selector.tag(),
                param = ?selector.param(),
                "compiled selector"
            );
            Ok(selector)
        })
        .collect()
}

/// Recursive-descent parser over one cleaned token.
struct SelectorParser<'a> {
    token: &'a str,
    rest: &'a str,
}

impl<'a> SelectorParser<'a> {
    fn new(token: &'a str) -> Self {
        SelectorParser { token, rest: token }
    }

    fn error(&self, reason: impl Into<String>) -> MinerError {
        MinerError::malformed(self.token, reason)
    }

    fn parse(mut self) -> Result<Selector> {
        let mut segments = self.token.split('_');
        let head = segments.next().unwrap_or_default();
        let param = segments.next();
        if segments.next().is_some() {
            return Err(self.error("more than one parameter separator"));
        }

        self.rest = head;
        let (tag, kind) = self.parse_tag()?;

        let mut indicator_filters = Vec::new();
        let mut show_indicators = false;
        loop {
            self.rest = self.rest.trim_start();
            if self.rest.is_empty() {
                break;
            }
            match self.parse_fragment()? {
                Some(filter) => indicator_filters.push(filter),
                None => show_indicators = true,
            }
        }

        let param = self.parse_param(kind, param)?;

        Ok(Selector {
            tag,
            kind,
            indicator_filters,
            param,
            show_indicators,
            column_name: self.token.to_string(),
        })
    }

    fn parse_tag(&mut self) -> Result<(String, TagKind)> {
        if let Some(rest) = self.rest.strip_prefix(LEADER_TAG) {
            self.rest = rest;
            return Ok((LEADER_TAG.to_string(), TagKind::Leader));
        }

        let tag: String = self.rest.chars().take(3).collect();
        if tag.is_empty() {
            return Err(self.error("missing tag"));
        }
        if tag.chars().count() < 3 || !tag.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(self.error(format!("'{tag}' is not a 3-character field tag")));
        }
        self.rest = &self.rest[tag.len()..];

        let kind = if tag.starts_with("00") {
            TagKind::Control
        } else {
            TagKind::Data
        };
        Ok((tag, kind))
    }

    /// Parse one `ind...` fragment; `None` is the bare indicator-echo flag.
    fn parse_fragment(&mut self) -> Result<Option<IndicatorFilter>> {
        let Some(rest) = self.rest.strip_prefix("ind") else {
            return Err(self.error(format!("unexpected '{}' after tag", self.rest)));
        };
        self.rest = rest;

        let mut chars = self.rest.chars();
        let position = match chars.next() {
            None => return Ok(None),
            Some(c) if c.is_whitespace() => return Ok(None),
            Some(_) if self.rest.starts_with("ind") => return Ok(None),
            Some(c @ ('1' | '2')) => c,
            Some(c) if c.is_ascii_digit() => {
                return Err(self.error(format!("indicator position must be 1 or 2, got {c}")));
            },
            Some(c) => return Err(self.error(format!("unexpected '{c}' in indicator fragment"))),
        };
        if chars.next() != Some('=') {
            return Err(self.error(format!("expected '=' after ind{position}")));
        }
        self.rest = chars.as_str();

        let value = self.parse_indicator_value();
        Ok(Some(IndicatorFilter {
            position: if position == '1' { 1 } else { 2 },
            value,
        }))
    }

    fn parse_indicator_value(&mut self) -> IndicatorValue {
        if self.rest.starts_with("ind") {
            return IndicatorValue::Blank;
        }
        let mut chars = self.rest.chars();
        match chars.next() {
            None => IndicatorValue::Blank,
            Some(c) if c.is_whitespace() => IndicatorValue::Blank,
            Some('#') => {
                self.rest = chars.as_str();
                IndicatorValue::Blank
            },
            Some(c) => {
                self.rest = chars.as_str();
                IndicatorValue::Char(c)
            },
        }
    }

    fn parse_param(&self, kind: TagKind, param: Option<&str>) -> Result<SelectorParam> {
        let param = match param.map(str::trim) {
            None | Some("" | "all" | "full") => return Ok(SelectorParam::All),
            Some(param) => param,
        };

        match kind {
            TagKind::Leader | TagKind::Control => param
                .parse::<usize>()
                .map(SelectorParam::Offset)
                .map_err(|_| {
                    self.error(format!(
                        "offset '{param}' must be a non-negative integer"
                    ))
                }),
            TagKind::Data => {
                let mut chars = param.chars();
                match (chars.next(), chars.next()) {
                    (Some(code), None) => Ok(SelectorParam::Code(code)),
                    _ => Err(self.error(format!(
                        "subfield code '{param}' must be a single character"
                    ))),
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(raw: &str) -> String {
        match Selector::parse(raw) {
            Err(MinerError::MalformedSelector { reason, .. }) => reason,
            other => panic!("expected MalformedSelector for {raw}, got {other:?}"),
        }
    }

    #[test]
    fn test_clean_feature_normalizes_separators() {
        assert_eq!(clean_feature("LDR/07"), "leader_7");
        assert_eq!(clean_feature("ldr.6"), "leader_6");
        assert_eq!(clean_feature("008/06"), "008_6");
        assert_eq!(clean_feature("008:35"), "008_35");
        assert_eq!(clean_feature("856$U"), "856_u");
        assert_eq!(clean_feature("245-a"), "245_a");
        assert_eq!(clean_feature("008/00"), "008_0");
        assert_eq!(clean_feature("  245  "), "245");
    }

    #[test]
    fn test_separator_as_indicator_value() {
        assert_eq!(clean_feature("245IND1=."), "245ind1=.");
        assert_eq!(clean_feature("245ind2=-$a"), "245ind2=-_a");
        assert_eq!(clean_feature("264ind1=$c"), "264ind1=_c");

        let dotted = Selector::parse("245ind1=.").unwrap();
        assert_eq!(
            dotted.indicator_filters(),
            [IndicatorFilter {
                position: 1,
                value: IndicatorValue::Char('.'),
            }]
        );
        assert_eq!(dotted.param(), &SelectorParam::All);

        let blank = Selector::parse("264ind1=$c").unwrap();
        assert_eq!(blank.indicator_filters()[0].value, IndicatorValue::Blank);
        assert_eq!(blank.param(), &SelectorParam::Code('c'));
    }

    #[test]
    fn test_parse_plain_data_tag() {
        let selector = Selector::parse("245").unwrap();
        assert_eq!(selector.tag(), "245");
        assert_eq!(selector.kind(), TagKind::Data);
        assert_eq!(selector.param(), &SelectorParam::All);
        assert!(selector.indicator_filters().is_empty());
        assert!(!selector.show_indicators());
    }

    #[test]
    fn test_parse_leader_offset() {
        let selector = Selector::parse("LDR/07").unwrap();
        assert_eq!(selector.tag(), LEADER_TAG);
        assert_eq!(selector.kind(), TagKind::Leader);
        assert_eq!(selector.param(), &SelectorParam::Offset(7));
        assert_eq!(selector.column_name(), "leader_7");
    }

    #[test]
    fn test_parse_control_offset() {
        let selector = Selector::parse("008_6").unwrap();
        assert_eq!(selector.kind(), TagKind::Control);
        assert_eq!(selector.param(), &SelectorParam::Offset(6));
    }

    #[test]
    fn test_parse_all_and_full_params() {
        for raw in ["008_all", "008_full", "245_all", "leader_full"] {
            let selector = Selector::parse(raw).unwrap();
            assert_eq!(selector.param(), &SelectorParam::All, "{raw}");
        }
    }

    #[test]
    fn test_parse_indicator_filters() {
        let selector = Selector::parse("264ind1= ind2=4_b").unwrap();
        assert_eq!(selector.tag(), "264");
        assert_eq!(selector.param(), &SelectorParam::Code('b'));
        assert_eq!(
            selector.indicator_filters(),
            &[
                IndicatorFilter {
                    position: 1,
                    value: IndicatorValue::Blank
                },
                IndicatorFilter {
                    position: 2,
                    value: IndicatorValue::Char('4')
                },
            ]
        );
        assert_eq!(selector.column_name(), "264ind1= ind2=4_b");
    }

    #[test]
    fn test_parse_adjacent_indicator_fragments() {
        let selector = Selector::parse("264ind1=ind2=4").unwrap();
        assert_eq!(selector.indicator_filters()[0].value, IndicatorValue::Blank);
        assert_eq!(
            selector.indicator_filters()[1].value,
            IndicatorValue::Char('4')
        );

        let selector = Selector::parse("264ind1=#ind2=1").unwrap();
        assert_eq!(selector.indicator_filters()[0].value, IndicatorValue::Blank);
    }

    #[test]
    fn test_parse_indicator_echo_flag() {
        let selector = Selector::parse("650ind_a").unwrap();
        assert!(selector.show_indicators());
        assert!(selector.indicator_filters().is_empty());

        let selector = Selector::parse("650ind ind2=0").unwrap();
        assert!(selector.show_indicators());
        assert_eq!(selector.indicator_filters().len(), 1);
    }

    #[test]
    fn test_malformed_tokens() {
        assert_eq!(reason(""), "missing tag");
        assert_eq!(reason("_a"), "missing tag");
        assert!(reason("24").contains("not a 3-character field tag"));
        assert!(reason("264ind3=4").contains("must be 1 or 2"));
        assert!(reason("264indx").contains("unexpected 'x'"));
        assert!(reason("264ind1x").contains("expected '='"));
        assert!(reason("264ind2").contains("expected '='"));
        assert!(reason("245x").contains("unexpected 'x'"));
        assert!(reason("008_ab").contains("non-negative integer"));
        assert!(reason("leader_-1").contains("more than one parameter"));
        assert!(reason("245_ab").contains("single character"));
        assert!(reason("245_a_b").contains("more than one parameter"));
    }

    #[test]
    fn test_error_names_cleaned_token() {
        let err = Selector::parse("264IND3=4").unwrap_err();
        assert!(err.to_string().contains("'264ind3=4'"));
    }

    #[test]
    fn test_holdings_band() {
        let band = |raw: &str| Selector::parse(raw).unwrap().in_holdings_band();
        assert!(band("852_h"));
        assert!(band("840"));
        assert!(band("879"));
        assert!(band("863_a"));
        assert!(!band("856_u"));
        assert!(!band("857_u"));
        assert!(!band("839"));
        assert!(!band("880"));
        assert!(!band("leader"));
    }

    #[test]
    fn test_parse_selectors_fails_fast() {
        let selectors = parse_selectors("LDR/7;008,856$u+852$h").unwrap();
        let columns: Vec<_> = selectors.iter().map(Selector::column_name).collect();
        assert_eq!(columns, vec!["leader_7", "008", "856_u", "852_h"]);

        assert!(parse_selectors("245;24").is_err());
        assert!(parse_selectors("245,").is_err());
    }

    #[test]
    fn test_differently_spelled_tokens_keep_their_own_columns() {
        let a = Selector::parse("245$a").unwrap();
        let b = Selector::parse("245_a").unwrap();
        let c = Selector::parse("245ind_a").unwrap();
        assert_eq!(a.column_name(), b.column_name());
        assert_ne!(a.column_name(), c.column_name());
        assert_eq!(a.tag(), c.tag());
    }
}
