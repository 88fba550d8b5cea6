//! Command-line interface for the extractor.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::batch::{outputs_exist, run_batch_with_progress, BatchOptions, BatchProgress};
use crate::concordance::{download_concordance, Concordance, ConcordanceMaps, FieldGroup};
use crate::config::{object_id_from_path, ExtractorConfig};
use crate::error::{ExtractorError, Result};
use crate::filing::FilingExtractor;
use crate::http::create_client;
use crate::schedule::extract_schedule;
use crate::types::{FilingRecord, ScheduleRecord};

/// IRS 990 Extractor - Turn Form 990 e-file XML into flat JSON records.
#[derive(Parser)]
#[command(name = "irs990-extractor")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract every XML filing into filings.jsonl and schedule_m.jsonl.
    Parse {
        /// Directory with XML filings (default: $DATA_DIR/xml)
        #[arg(long)]
        xml_dir: Option<PathBuf>,

        /// Output directory (default: $DATA_DIR/parsed)
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Concordance CSV to use instead of the cached download
        #[arg(short, long)]
        concordance: Option<PathBuf>,

        /// Worker threads (default: $PARSE_WORKERS or CPUs - 1)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Re-parse even if output files exist
        #[arg(short, long)]
        force: bool,
    },

    /// Download the concordance and show how output columns map onto it.
    Concordance {
        /// Concordance CSV to inspect instead of the cached download
        #[arg(long)]
        file: Option<PathBuf>,

        /// Download again even if a cached copy exists
        #[arg(short, long)]
        force: bool,
    },

    /// Extract a single XML filing and print it as JSON.
    Extract {
        /// Path to the XML filing
        file: PathBuf,

        /// Concordance CSV to use instead of the cached download
        #[arg(short, long)]
        concordance: Option<PathBuf>,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = ExtractorConfig::from_env();

    match cli.command {
        Commands::Parse {
            xml_dir,
            out_dir,
            concordance,
            workers,
            force,
        } => {
            let config = match workers {
                Some(n) => config.with_workers(n),
                None => config.with_workers_from_env()?,
            };
            let xml_dir = xml_dir.unwrap_or_else(|| config.xml_dir());
            let out_dir = out_dir.unwrap_or_else(|| config.parsed_dir());
            parse_command(&config, &xml_dir, &out_dir, concordance.as_deref(), force)
        }
        Commands::Concordance { file, force } => {
            concordance_command(&config, file.as_deref(), force)
        }
        Commands::Extract { file, concordance } => {
            extract_command(&config, &file, concordance.as_deref())
        }
    }
}

/// Load an explicit concordance file, or the cached download (fetching it
/// when missing or when `force` is set).
fn load_concordance(
    config: &ExtractorConfig,
    explicit: Option<&Path>,
    force: bool,
) -> Result<Concordance> {
    if let Some(path) = explicit {
        return Concordance::from_path(path);
    }

    let client = create_client()?;
    let path = download_concordance(
        &client,
        &config.concordance_url,
        &config.concordance_path(),
        force,
    )?;
    Concordance::from_path(&path)
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Execute the parse command.
fn parse_command(
    config: &ExtractorConfig,
    xml_dir: &Path,
    out_dir: &Path,
    concordance: Option<&Path>,
    force: bool,
) -> Result<()> {
    // Validate the input directory before fetching the concordance
    if !xml_dir.is_dir() {
        return Err(ExtractorError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("XML directory does not exist: {}", xml_dir.display()),
        )));
    }

    if outputs_exist(out_dir) && !force {
        print_skipped(out_dir);
        return Ok(());
    }

    println!(
        "{} {} into {}",
        style("Parsing").bold(),
        style(xml_dir.display()).cyan(),
        style(out_dir.display()).green()
    );
    println!();

    let pb = spinner("Loading concordance...");
    let concordance = match load_concordance(config, concordance, false) {
        Ok(c) => c,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };
    let maps = ConcordanceMaps::build(&concordance);
    pb.finish_and_clear();

    let mut bar = ProgressBar::new(0);
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("valid template"),
    );
    bar.set_message("Parsing XMLs");

    let options = BatchOptions::default()
        .with_workers(config.workers)
        .with_force(force);
    let result = run_batch_with_progress(xml_dir, out_dir, &maps, &options, &mut bar);
    bar.finish_and_clear();
    let summary = result?;

    if summary.skipped {
        print_skipped(out_dir);
        return Ok(());
    }

    println!("  Documents: {}", summary.documents);
    println!("  Filings: {}", style(summary.filings).green());
    println!("  With Schedule M: {}", style(summary.schedules).green());
    if summary.failures > 0 {
        println!("  Failures: {}", style(summary.failures).yellow().bold());
    }

    println!();
    println!("{} {}", style("Saved to:").green().bold(), out_dir.display());

    Ok(())
}

fn print_skipped(out_dir: &Path) {
    println!(
        "{} parsed files already exist in {} (use --force to re-parse)",
        style("Skipped:").yellow().bold(),
        out_dir.display()
    );
}

impl BatchProgress for ProgressBar {
    fn start(&mut self, total: usize) {
        self.set_length(total as u64);
    }

    fn advance(&mut self, done: usize) {
        self.inc(done as u64);
    }
}

/// Execute the concordance command.
fn concordance_command(config: &ExtractorConfig, file: Option<&Path>, force: bool) -> Result<()> {
    let pb = spinner("Loading concordance...");
    let concordance = match load_concordance(config, file, force) {
        Ok(c) => c,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };
    let maps = ConcordanceMaps::build(&concordance);
    pb.finish_and_clear();

    println!(
        "{} {} variables",
        style("Concordance:").bold(),
        style(concordance.len()).cyan()
    );

    for group in FieldGroup::ALL {
        let map = maps.group(group);
        println!();
        println!("{} ({} fields)", style(group.as_str()).bold(), map.len());
        for (column, candidates) in map.iter() {
            if candidates.is_empty() {
                println!("  {column:<32} {}", style("not in concordance").yellow());
            } else {
                println!("  {column:<32} {} xpaths", candidates.len());
            }
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct ExtractOutput<'a> {
    filing: &'a FilingRecord,
    schedule_m: Option<&'a ScheduleRecord>,
}

/// Execute the extract command.
fn extract_command(config: &ExtractorConfig, file: &Path, concordance: Option<&Path>) -> Result<()> {
    let bytes = std::fs::read(file)?;
    let text = String::from_utf8_lossy(&bytes);
    let doc = roxmltree::Document::parse(&text)?;

    let concordance = load_concordance(config, concordance, false)?;
    let maps = ConcordanceMaps::build(&concordance);

    let object_id = object_id_from_path(file).unwrap_or_else(|| file.display().to_string());
    let filing = FilingExtractor::new(&maps).extract_document(&doc, &object_id);
    let schedule = extract_schedule(&doc, &object_id, filing.ein(), filing.tax_year());

    let output = ExtractOutput {
        filing: &filing,
        schedule_m: schedule.as_ref(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
