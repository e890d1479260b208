//! Command-line interface for reportcard.

use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::check::{default_checks, CHECK_NAMES};
use crate::config::Config;
use crate::discover::{discover_files, exclude_temporarily};
use crate::engine::Engine;
use crate::error::ReportCardError;
use crate::report::{self, ReportOptions};
use crate::threshold::ThresholdMap;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Go report card gate.
///
/// Runs gofmt, go vet, golint, gocyclo, ineffassign, a license check and a
/// spell check over a Go project, prints the score of each check and exits
/// non-zero when any check is below its threshold.
#[derive(Parser)]
#[command(name = "reportcard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score a Go project against per-check thresholds
    #[command(visible_alias = "check")]
    Run(RunArgs),
    /// List the checks, their weights and descriptions
    List,
}

/// Arguments for the run command.
#[derive(Parser)]
pub struct RunArgs {
    /// Project root to analyze
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Minimum percentage for a check, e.g. --check gofmt=90 (repeatable)
    #[arg(short = 'c', long = "check", value_name = "NAME=PERCENT")]
    pub checks: Vec<String>,

    /// Path to a config file (default: reportcard.yaml in the project root)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Give up on a check after this many seconds
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Never color the output
    #[arg(long)]
    pub no_color: bool,
}

/// Install the stderr log subscriber.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Resolve thresholds from the config file and `--check` flags; flags win.
fn resolve_thresholds(config: &Config, specs: &[String]) -> anyhow::Result<ThresholdMap> {
    let mut thresholds = config.threshold_map(CHECK_NAMES)?;
    thresholds.merge(ThresholdMap::parse(specs, CHECK_NAMES)?);
    Ok(thresholds)
}

fn resolve_dir(path: &Path) -> anyhow::Result<PathBuf> {
    let dir = path
        .canonicalize()
        .map_err(|e| anyhow::anyhow!("cannot access path {:?}: {}", path, e))?;
    if !dir.is_dir() {
        anyhow::bail!("{} is not a directory", dir.display());
    }
    Ok(dir)
}

/// Run the report card.
pub fn run(args: &RunArgs) -> anyhow::Result<i32> {
    let dir = resolve_dir(&args.path)?;

    let config = Config::load(args.config.as_deref(), &dir)?;
    config.validate(CHECK_NAMES)?;
    let thresholds = resolve_thresholds(&config, &args.checks)?;

    let discovery = discover_files(&dir, &config.exclude_set()?)?;
    if discovery.files.is_empty() {
        return Err(ReportCardError::NoFiles(dir).into());
    }
    tracing::debug!(
        files = discovery.files.len(),
        skipped = discovery.skipped.len(),
        "discovered files"
    );

    let timeout = args.timeout.map(Duration::from_secs).or(config.timeout());
    let engine = Engine::new(default_checks(&dir))?.with_timeout(timeout);

    let exclusion = exclude_temporarily(&dir, &discovery.skipped);
    let files: Arc<[PathBuf]> = discovery.files.into();

    let runtime = tokio::runtime::Runtime::new()?;
    let outcome = runtime.block_on(engine.evaluate(files, &thresholds));
    // A timed-out check may still be running on the blocking pool.
    runtime.shutdown_background();

    if let Err(e) = exclusion.restore() {
        tracing::warn!(error = %e, "could not restore excluded files");
    }

    let outcome = outcome?;
    let color = !args.no_color && std::io::stdout().is_terminal();
    let mut stdout = std::io::stdout().lock();
    report::write_report(&mut stdout, &outcome, ReportOptions { color })?;
    stdout.flush()?;

    if outcome.aggregate.passed {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

/// List the available checks.
pub fn run_list() -> anyhow::Result<i32> {
    let checks = default_checks(Path::new("."));

    println!("Available checks:");
    println!();
    for check in &checks {
        let (name, weight) = (check.name(), check.weight());
        println!("  {:<12} {:>5.2}  {}", name, weight, check.description());
    }
    println!();
    println!("Usage:");
    println!("  reportcard run --check <name>=<percent>");

    Ok(EXIT_SUCCESS)
}
