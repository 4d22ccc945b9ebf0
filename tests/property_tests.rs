//! Property tests for row shape, determinism and offset extraction

use marc_miner::extractor::extract_values;
use marc_miner::selector::{clean_feature, parse_selectors};
use marc_miner::{EmptyHoldingsPolicy, Field, MinerConfig, Record, RowAssembler, Selector};
use proptest::prelude::*;

const FEATURES: &str = "ldr/06;008_6;245$a;650;650ind_a;690$9;852$h;852ind1=0_8;856$u;866$a";

fn field_strategy() -> impl Strategy<Value = Field> {
    let tag = prop::sample::select(vec!["245", "650", "690", "852", "856", "866"]);
    let indicator = prop::sample::select(vec![' ', '0', '1', '4']);
    let subfield = (
        prop::sample::select(vec!['a', 'b', 'h', 'u', '8', '9']),
        "[a-zA-Z |]{0,8}",
    );

    (tag, indicator.clone(), indicator, prop::collection::vec(subfield, 0..4)).prop_map(
        |(tag, ind1, ind2, subfields)| {
            let mut field = Field::new(tag.to_string(), ind1, ind2);
            for (code, value) in subfields {
                field.add_subfield(code, value);
            }
            field
        },
    )
}

fn record_strategy() -> impl Strategy<Value = Record> {
    (
        prop::option::of("[a-z0-9]{1,8}"),
        "[ -~]{0,24}",
        "[ -~]{0,40}",
        prop::collection::vec(field_strategy(), 0..8),
    )
        .prop_map(|(bib_cnum, leader, fixed, fields)| {
            let mut record = Record::new(leader);
            if let Some(bib_cnum) = bib_cnum {
                record.add_control_field("001".to_string(), bib_cnum);
            }
            record.add_control_field("008".to_string(), fixed);
            for field in fields {
                record.add_field(field);
            }
            record
        })
}

fn config_strategy() -> impl Strategy<Value = MinerConfig> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(ploc, eloc, local, split, keep)| {
            let policy = if keep {
                EmptyHoldingsPolicy::EmitUnheld
            } else {
                EmptyHoldingsPolicy::Drop
            };
            MinerConfig::default()
                .with_count_ploc(ploc)
                .with_count_eloc(eloc)
                .with_count_local_ext(local)
                .with_split_by_holdings(split)
                .with_empty_holdings(policy)
        },
    )
}

proptest! {
    #[test]
    fn test_rows_always_match_schema(record in record_strategy(), config in config_strategy()) {
        let assembler = RowAssembler::new(parse_selectors(FEATURES).unwrap(), config);
        for row in assembler.assemble(&record) {
            let columns: Vec<_> = row.columns().collect();
            prop_assert_eq!(columns, assembler.columns());
        }
    }

    #[test]
    fn test_assembly_is_deterministic(record in record_strategy(), config in config_strategy()) {
        let assembler = RowAssembler::new(parse_selectors(FEATURES).unwrap(), config);
        prop_assert_eq!(assembler.assemble(&record), assembler.assemble(&record));
    }

    #[test]
    fn test_split_row_count_follows_holdings(record in record_strategy(), keep in any::<bool>()) {
        let policy = if keep { EmptyHoldingsPolicy::EmitUnheld } else { EmptyHoldingsPolicy::Drop };
        let config = MinerConfig::default()
            .with_split_by_holdings(true)
            .with_empty_holdings(policy);
        let assembler = RowAssembler::new(parse_selectors(FEATURES).unwrap(), config);

        let holdings = record.fields_by_tag("852").count();
        let expected = match (holdings, keep) {
            (0, true) => 1,
            (n, _) => n,
        };
        prop_assert_eq!(assembler.assemble(&record).len(), expected);
    }

    #[test]
    fn test_offset_yields_at_most_one_char(text in "\\PC{0,50}", offset in 0usize..60) {
        let record = Record::builder("").control_field_str("008", &text).build();
        let selector = Selector::parse(&format!("008_{offset}")).unwrap();

        let values = extract_values(&selector, &record);
        prop_assert_eq!(values.len(), 1);
        let expected = text.chars().nth(offset).map(String::from).unwrap_or_default();
        prop_assert_eq!(&values[0], &expected);
    }

    #[test]
    fn test_cleaned_tokens_fold_separators_outside_indicator_values(raw in "[ -~]{0,20}") {
        let cleaned = clean_feature(&raw);
        let mut previous = None;
        for c in cleaned.chars() {
            if c == '$' {
                prop_assert!(false, "unfolded '$' in {}", cleaned);
            }
            if matches!(c, '/' | '.' | ':' | '-') {
                prop_assert_eq!(previous, Some('='), "unfolded '{}' in {}", c, cleaned);
            }
            previous = Some(c);
        }
        prop_assert_eq!(cleaned.to_lowercase(), cleaned.clone());
    }
}
