// Headless CLI for statute-list reconciliation

mod exit_codes;
mod extract;
mod fetch;
mod recon;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

use exit_codes::*;
use lawlist_config::Settings;

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  lawlist-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  lawlist-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

#[derive(Parser)]
#[command(name = "lawlist")]
#[command(about = "Reconcile the public statute book against the legal-data catalogue")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Settings file (default: <config dir>/lawlist/settings.json)
    #[arg(long, global = true, env = "LAWLIST_SETTINGS")]
    settings: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug). LAWLIST_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract statute titles from the wiki index page
    #[command(after_help = "\
Examples:
  lawlist extract
  lawlist extract --file page.html --limit 20
  lawlist extract --all --output titles.csv")]
    Extract(extract::ExtractArgs),

    /// Compare wiki titles against the catalogue and write the report
    #[command(after_help = "\
Examples:
  lawlist compare names
  lawlist compare rules --format csv --out reports/
  lawlist compare names --wiki-file page.html --catalogue-file names.txt --json
  lawlist compare --config names.recon.toml --mode exact")]
    Compare(recon::CompareArgs),

    /// Show the canonical keys produced for one or more titles
    #[command(after_help = "\
Examples:
  lawlist normalize 'חוק החוזים (חלק כללי), התשל\"ג-1973'
  lawlist normalize 'פקודת מס הכנסה [נוסח חדש]' --json")]
    Normalize {
        /// Titles to normalize
        #[arg(required = true)]
        titles: Vec<String>,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Validate a run config without fetching anything
    #[command(after_help = "\
Examples:
  lawlist validate names.recon.toml")]
    Validate {
        /// Path to the .recon.toml config file
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = match &cli.settings {
        Some(path) if !path.exists() => {
            return report(Err(CliError::usage(format!(
                "settings file not found: {}",
                path.display()
            ))));
        }
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };

    let result = match cli.command {
        Commands::Extract(args) => extract::cmd_extract(args, &settings),
        Commands::Compare(args) => recon::cmd_compare(args, &settings),
        Commands::Normalize { titles, json } => cmd_normalize(titles, json),
        Commands::Validate { config } => recon::cmd_validate(config),
    };

    report(result)
}

fn report(result: Result<(), CliError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

/// Install the stderr subscriber. `log` records from the library crates are
/// forwarded into it.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("LAWLIST_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("warning: cannot forward log records: {e}");
    }
    let subscriber = Registry::default().with(filter).with(fmt_layer);
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: cannot install log subscriber: {e}");
    }
}

// ============================================================================
// normalize
// ============================================================================

#[derive(serde::Serialize)]
struct NormalizedTitle {
    input: String,
    primary: String,
    variant: Option<String>,
    diverges: bool,
}

fn cmd_normalize(titles: Vec<String>, json: bool) -> Result<(), CliError> {
    let config = lawlist_recon::config::NormalizeConfig::default();
    let normalizer = lawlist_recon::AuditedNormalizer::new(&config)
        .map_err(|e| CliError::config(e.to_string()))?;

    let rows: Vec<NormalizedTitle> = titles
        .into_iter()
        .map(|input| {
            let key = normalizer.normalize(&input);
            NormalizedTitle {
                diverges: key.diverges(),
                primary: key.primary,
                variant: key.variant,
                input,
            }
        })
        .collect();

    if json {
        let out = serde_json::to_string_pretty(&rows)
            .map_err(|e| CliError::general(format!("cannot serialize output: {e}")))?;
        println!("{out}");
        return Ok(());
    }

    for row in &rows {
        println!("{}", row.input);
        println!("  primary: {}", row.primary);
        if let Some(variant) = &row.variant {
            let marker = if row.diverges { "  (differs)" } else { "" };
            println!("  variant: {variant}{marker}");
        }
    }
    Ok(())
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self { code: EXIT_INVALID_CONFIG, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_INPUT_PARSE, message: msg.into(), hint: None }
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self { code: EXIT_EXPORT_IO, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
