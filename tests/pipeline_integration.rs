//! End-to-end tests: MARCXML file in, CSV or JSON Lines file out

mod common;

use std::fs;
use std::io::Write;
use std::path::Path;

use clap::Parser;
use common::{marcxml_collection, REALISTIC_RECORD_XML};
use flate2::write::GzEncoder;
use flate2::Compression;
use marc_miner::cli::{execute, Cli};
use marc_miner::csv::CsvRowWriter;
use marc_miner::formats::VecSink;
use marc_miner::marcxml::MarcXmlReader;
use marc_miner::{Miner, MinerConfig, MinerError};
use tempfile::TempDir;

const SECOND_RECORD_XML: &str = r#"
  <leader>00321nam a2200121 a 4500</leader>
  <controlfield tag="001">b1000002</controlfield>
  <datafield tag="245" ind1="0" ind2="0">
    <subfield code="a">Blues, "early" years</subfield>
  </datafield>
"#;

fn write_input(dir: &TempDir, name: &str, xml: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, xml).unwrap();
    path
}

fn run_cli(input: &Path, output: &Path, features: &str, flags: &[&str]) -> marc_miner::RunSummary {
    let mut args = vec![
        "marc-miner".to_string(),
        input.display().to_string(),
        output.display().to_string(),
        features.to_string(),
        "--quiet".to_string(),
    ];
    args.extend(flags.iter().map(ToString::to_string));
    execute(&Cli::parse_from(args)).unwrap()
}

#[test]
fn test_csv_output_end_to_end() {
    let dir = TempDir::new().unwrap();
    let xml = marcxml_collection(&[REALISTIC_RECORD_XML, SECOND_RECORD_XML]);
    let input = write_input(&dir, "bibs.xml", &xml);
    let output = dir.path().join("out.csv");

    let summary = run_cli(&input, &output, "ldr/06,245$a,852$h", &["-p", "-e", "-l"]);
    assert_eq!(summary.records, 2);
    assert_eq!(summary.rows, 2);

    let csv = fs::read_to_string(&output).unwrap();
    assert_eq!(
        csv,
        "bib_cnum,n_ploc,n_eloc,n_local_ext,leader_6,245_a,852_h\n\
         b1000001,2,1,1,a,Jazz :,A|B\n\
         b1000002,0,0,0,a,\"Blues, \"\"early\"\" years\",\n"
    );
}

#[test]
fn test_split_by_holdings_end_to_end() {
    let dir = TempDir::new().unwrap();
    let xml = marcxml_collection(&[REALISTIC_RECORD_XML, SECOND_RECORD_XML]);
    let input = write_input(&dir, "bibs.xml", &xml);
    let output = dir.path().join("split.csv");

    let summary = run_cli(&input, &output, "852$h;245$a", &["-s"]);
    assert_eq!(summary.records, 2);
    assert_eq!(summary.rows, 2);

    let csv = fs::read_to_string(&output).unwrap();
    assert_eq!(
        csv,
        "bib_cnum,hol_cnum,852_h,245_a\n\
         b1000001,H1,A,Jazz :\n\
         b1000001,H2,B,Jazz :\n"
    );
}

#[test]
fn test_keep_unheld_end_to_end() {
    let dir = TempDir::new().unwrap();
    let xml = marcxml_collection(&[SECOND_RECORD_XML]);
    let input = write_input(&dir, "bibs.xml", &xml);
    let output = dir.path().join("unheld.csv");

    run_cli(&input, &output, "852$h", &["-s", "--keep-unheld"]);
    let csv = fs::read_to_string(&output).unwrap();
    assert_eq!(csv, "bib_cnum,hol_cnum,852_h\nb1000002,,\n");
}

#[test]
fn test_jsonl_output_end_to_end() {
    let dir = TempDir::new().unwrap();
    let xml = marcxml_collection(&[REALISTIC_RECORD_XML]);
    let input = write_input(&dir, "bibs.xml", &xml);
    let output = dir.path().join("out.jsonl");

    run_cli(&input, &output, "650$a", &["--format", "jsonl"]);
    let jsonl = fs::read_to_string(&output).unwrap();
    assert_eq!(jsonl, "{\"bib_cnum\":\"b1000001\",\"650_a\":\"Jazz\"}\n");
}

#[test]
fn test_gzip_input() {
    let dir = TempDir::new().unwrap();
    let xml = marcxml_collection(&[REALISTIC_RECORD_XML, SECOND_RECORD_XML]);
    let input = dir.path().join("bibs.xml.gz");
    let mut encoder = GzEncoder::new(fs::File::create(&input).unwrap(), Compression::default());
    encoder.write_all(xml.as_bytes()).unwrap();
    encoder.finish().unwrap();
    let output = dir.path().join("out.csv");

    let summary = run_cli(&input, &output, "001", &[]);
    assert_eq!(summary.records, 2);
    let csv = fs::read_to_string(&output).unwrap();
    assert_eq!(csv, "bib_cnum,001\nb1000001,b1000001\nb1000002,b1000002\n");
}

#[test]
fn test_empty_collection_yields_header_only() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "empty.xml", &marcxml_collection(&[]));
    let output = dir.path().join("out.csv");

    let summary = run_cli(&input, &output, "245$a", &[]);
    assert_eq!(summary.records, 0);
    assert_eq!(summary.rows, 0);
    assert_eq!(fs::read_to_string(&output).unwrap(), "bib_cnum,245_a\n");
}

#[test]
fn test_runs_are_idempotent() {
    let dir = TempDir::new().unwrap();
    let xml = marcxml_collection(&[REALISTIC_RECORD_XML, SECOND_RECORD_XML]);
    let input = write_input(&dir, "bibs.xml", &xml);
    let first = dir.path().join("first.csv");
    let second = dir.path().join("second.csv");
    let parallel = dir.path().join("parallel.csv");

    let features = "ldr;008_6;245;650ind_a;852$h;856$u";
    run_cli(&input, &first, features, &["-p", "-e", "-l", "-s"]);
    run_cli(&input, &second, features, &["-p", "-e", "-l", "-s"]);
    run_cli(
        &input,
        &parallel,
        features,
        &["-p", "-e", "-l", "-s", "--parallel", "--batch-size", "1"],
    );

    let first = fs::read(first).unwrap();
    assert_eq!(first, fs::read(second).unwrap());
    assert_eq!(first, fs::read(parallel).unwrap());
}

#[test]
fn test_malformed_selector_fails_before_output_is_created() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "bibs.xml", &marcxml_collection(&[REALISTIC_RECORD_XML]));
    let output = dir.path().join("never.csv");

    let cli = Cli::parse_from([
        "marc-miner".to_string(),
        input.display().to_string(),
        output.display().to_string(),
        "245$a,264ind3=4".to_string(),
        "--quiet".to_string(),
    ]);
    let err = execute(&cli).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<MinerError>(),
        Some(MinerError::MalformedSelector { .. })
    ));
    assert!(!output.exists());
}

#[test]
fn test_missing_input_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let cli = Cli::parse_from([
        "marc-miner".to_string(),
        dir.path().join("missing.xml").display().to_string(),
        dir.path().join("out.csv").display().to_string(),
        "245".to_string(),
        "--quiet".to_string(),
    ]);

    let err = execute(&cli).unwrap_err();
    assert!(err.to_string().contains("Failed to open input file"));
}

#[test]
fn test_library_pipeline_over_reader_and_csv_writer() {
    let xml = marcxml_collection(&[REALISTIC_RECORD_XML]);
    let miner = Miner::from_features("264ind2=4_c;690$9", MinerConfig::default()).unwrap();

    let mut writer = CsvRowWriter::new(Vec::new());
    miner
        .run(&mut MarcXmlReader::new(xml.as_bytes()), &mut writer)
        .unwrap();
    let csv = String::from_utf8(writer.into_inner().unwrap()).unwrap();

    assert_eq!(csv, "bib_cnum,264ind2=4_c,690_9\nb1000001,,local\n");
}

#[test]
fn test_truncated_input_is_fatal_but_keeps_earlier_rows() {
    let xml = format!(
        "<collection><record>{REALISTIC_RECORD_XML}</record><record><controlfield tag=\"001\">x"
    );
    let miner = Miner::from_features("001", MinerConfig::default()).unwrap();
    let mut sink = VecSink::new();

    let result = miner.run(&mut MarcXmlReader::new(xml.as_bytes()), &mut sink);
    assert!(matches!(result, Err(MinerError::ParseError(_))));
    assert_eq!(sink.rows.len(), 1);
    assert!(!sink.finished);
}
