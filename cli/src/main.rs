//! segmatch CLI: driving adapter for the segmatch template engine.
//!
//! Subcommands:
//! - `apply <config> <name>...`: decompose names
//! - `explain <config> <name>`: show how the template was chosen
//! - `check <config>`: validate config builds an engine
//! - `graphite|statsd|dropwizard <config> [input]`: parse a payload

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use segmatch::{Decomposed, Engine, EngineConfig};
use segmatch_dropwizard::{DropwizardConfig, DropwizardParser};
use segmatch_graphite::{GraphiteConfig, GraphiteParser};
use segmatch_statsd::{StatsdConfig, StatsdParser};
use serde::de::DeserializeOwned;
use tracing_subscriber::EnvFilter;

/// Decomposes metric names with Graphite-style templates.
#[derive(Debug, Parser)]
#[command(name = "segmatch", version)]
struct Cli {
    /// Log at debug level (overrides SEGMATCH_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decompose names into measurement, tags and field.
    Apply {
        /// Engine config (.yaml, .yml or .json).
        config: PathBuf,
        /// Metric names.
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Show the filter search and template chosen for a name.
    Explain { config: PathBuf, name: String },
    /// Validate an engine config.
    Check { config: PathBuf },
    /// Parse Graphite plaintext lines.
    Graphite {
        config: PathBuf,
        /// Input file; stdin when omitted.
        input: Option<PathBuf>,
    },
    /// Parse StatsD lines.
    Statsd {
        config: PathBuf,
        input: Option<PathBuf>,
    },
    /// Parse a Dropwizard registry document.
    Dropwizard {
        config: PathBuf,
        input: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(error) = run(cli.command) {
        print_error(&error);
        process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Apply { config, names } => cmd_apply(&config, &names),
        Command::Explain { config, name } => cmd_explain(&config, &name),
        Command::Check { config } => cmd_check(&config),
        Command::Graphite { config, input } => cmd_graphite(&config, input.as_deref()),
        Command::Statsd { config, input } => cmd_statsd(&config, input.as_deref()),
        Command::Dropwizard { config, input } => cmd_dropwizard(&config, input.as_deref()),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_apply(config: &Path, names: &[String]) -> Result<()> {
    let engine = load_engine(config)?;

    let mut failed = 0;
    for name in names {
        match engine.apply(name) {
            Ok(out) => println!("{name} -> {}", render(&out)),
            Err(error) => {
                println!("{name} -> error: {error}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} names failed", names.len());
    }
    Ok(())
}

fn cmd_explain(config: &Path, name: &str) -> Result<()> {
    let engine = load_engine(config)?;
    print!("{}", engine.apply_with_trace(name));
    Ok(())
}

fn cmd_check(config: &Path) -> Result<()> {
    let engine = load_engine(config)?;
    println!(
        "Config valid ({} filtered templates, default {:?})",
        engine.matcher().tree().len(),
        engine.matcher().default_template().pattern()
    );
    Ok(())
}

fn cmd_graphite(config: &Path, input: Option<&Path>) -> Result<()> {
    let config: GraphiteConfig = load_config(config)?;
    let parser = GraphiteParser::from_config(&config).context("invalid graphite config")?;

    let (metrics, errors) = parser.parse_lossy(&read_input(input)?);
    for metric in &metrics {
        println!("{metric}");
    }
    report_errors(&errors)
}

fn cmd_statsd(config: &Path, input: Option<&Path>) -> Result<()> {
    let config: StatsdConfig = load_config(config)?;
    let parser = StatsdParser::from_config(&config).context("invalid statsd config")?;

    let (samples, errors) = parser.parse(&read_input(input)?);
    for sample in &samples {
        println!("{}", sample.to_metric());
    }
    report_errors(&errors)
}

fn cmd_dropwizard(config: &Path, input: Option<&Path>) -> Result<()> {
    let config: DropwizardConfig = load_config(config)?;
    let parser = DropwizardParser::from_config(&config).context("invalid dropwizard config")?;

    for metric in parser.parse(read_input(input)?.as_bytes())? {
        println!("{metric}");
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Output
// ═══════════════════════════════════════════════════════════════════════════════

/// `measurement,k=v field=f`, the field part only when set.
fn render(out: &Decomposed) -> String {
    let mut line = out.measurement.clone();
    for (key, value) in &out.tags {
        line.push_str(&format!(",{key}={value}"));
    }
    if !out.field.is_empty() {
        line.push_str(&format!(" field={}", out.field));
    }
    line
}

fn report_errors<E: std::fmt::Display>(errors: &[E]) -> Result<()> {
    for error in errors {
        eprintln!("skipped: {error}");
    }
    if !errors.is_empty() {
        bail!("{} lines failed to parse", errors.len());
    }
    Ok(())
}

fn print_error(error: &anyhow::Error) {
    eprintln!("error: {error}");

    let mut cause = error.source();
    while let Some(e) = cause {
        eprintln!("  caused by: {e}");
        cause = e.source();
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Config loading
// ═══════════════════════════════════════════════════════════════════════════════

fn load_engine(path: &Path) -> Result<Engine> {
    let config: EngineConfig = load_config(path)?;
    Engine::from_config(&config).context("config invalid")
}

fn load_config<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {:?}", path.display().to_string()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    tracing::debug!(path = %path.display(), is_json, "loading config");

    if is_json {
        serde_json::from_str(&content).context("JSON parse error")
    } else {
        // Default to YAML (handles .yaml and .yml)
        serde_yaml::from_str(&content).context("YAML parse error")
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {:?}", path.display().to_string())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("SEGMATCH_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
