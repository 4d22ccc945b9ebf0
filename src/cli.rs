//! Command-line interface for marc-miner.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use flate2::read::GzDecoder;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{EmptyHoldingsPolicy, MinerConfig, DEFAULT_BATCH_SIZE};
use crate::csv::CsvRowWriter;
use crate::formats::RowSink;
use crate::json::JsonLinesWriter;
use crate::marcxml::MarcXmlReader;
use crate::pipeline::{Miner, RunSummary};

/// Records between progress updates.
pub const PROGRESS_INTERVAL: usize = 100;

/// Output table format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Comma-separated values with a header row
    #[default]
    Csv,
    /// One JSON object per line
    Jsonl,
}

/// marc-miner - Extract MARC features from MARCXML into a flat table.
#[derive(Debug, Parser)]
#[command(name = "marc-miner")]
#[command(version, about, long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// MARCXML input file (a `.gz` suffix is decompressed on the fly)
    pub input: PathBuf,

    /// Output file
    pub output: PathBuf,

    /// Feature selectors separated by `,`, `;` or `+` (e.g. "ldr/06,008_35,245$a,852$h")
    pub features: String,

    /// Add `n_ploc`: number of physical locations (852)
    #[arg(short = 'p', long)]
    pub count_ploc: bool,

    /// Add `n_eloc`: number of electronic locations (856)
    #[arg(short = 'e', long)]
    pub count_eloc: bool,

    /// Add `n_local_ext`: number of `$9 LOCAL` subfields
    #[arg(short = 'l', long)]
    pub count_local_ext: bool,

    /// Write one row per holdings instance (852), with a `hol_cnum` column
    #[arg(short = 's', long)]
    pub split_by_holdings: bool,

    /// In split mode, keep records without holdings as one row
    #[arg(long, requires = "split_by_holdings")]
    pub keep_unheld: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// Assemble rows for batches of records in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Records per parallel batch
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Hide the progress spinner and the summary line
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Run configuration selected by the flags
    #[must_use]
    pub fn config(&self) -> MinerConfig {
        let empty_holdings = if self.keep_unheld {
            EmptyHoldingsPolicy::EmitUnheld
        } else {
            EmptyHoldingsPolicy::Drop
        };

        MinerConfig::new()
            .with_count_ploc(self.count_ploc)
            .with_count_eloc(self.count_eloc)
            .with_count_local_ext(self.count_local_ext)
            .with_split_by_holdings(self.split_by_holdings)
            .with_empty_holdings(empty_holdings)
            .with_parallel(self.parallel)
            .with_batch_size(self.batch_size)
    }
}

/// Run the CLI.
///
/// # Errors
///
/// Returns an error if a selector is malformed, a file cannot be opened, or the run
/// fails.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    execute(&cli).map(|_| ())
}

/// Execute an already-parsed command line.
///
/// # Errors
///
/// Same as [`run`].
pub fn execute(cli: &Cli) -> Result<RunSummary> {
    let started = Instant::now();

    // Selectors are compiled before any file is touched.
    let miner = Miner::from_features(&cli.features, cli.config())?;
    tracing::debug!(columns = ?miner.columns(), "output schema");

    let mut source = MarcXmlReader::new(open_input(&cli.input)?);
    let output = File::create(&cli.output)
        .with_context(|| format!("Failed to create output file: {}", cli.output.display()))?;
    let mut sink = open_sink(cli.format, BufWriter::new(output));

    let pb = spinner(cli.quiet);
    let mut reported = 0;
    let result = miner.run_with_progress(&mut source, sink.as_mut(), |count| {
        if count == 1 || count / PROGRESS_INTERVAL > reported / PROGRESS_INTERVAL {
            pb.set_message(format!("{count} records"));
            reported = count;
        }
    });

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e).with_context(|| format!("Failed to process {}", cli.input.display()));
        },
    };

    pb.finish_with_message(format!(
        "{} records, {} rows",
        summary.records, summary.rows
    ));

    if !cli.quiet {
        println!(
            "Wrote {} rows from {} records to {} in {:.2}s",
            summary.rows,
            summary.records,
            cli.output.display(),
            started.elapsed().as_secs_f64()
        );
    }
    Ok(summary)
}

/// Open the input, decompressing `.gz` files.
fn open_input(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open input file: {}", path.display()))?;

    let gzipped = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
    if gzipped {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

fn open_sink<W: Write + 'static>(format: OutputFormat, output: W) -> Box<dyn RowSink> {
    match format {
        OutputFormat::Csv => Box::new(CsvRowWriter::new(output)),
        OutputFormat::Jsonl => Box::new(JsonLinesWriter::new(output)),
    }
}

fn spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("Reading records...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
