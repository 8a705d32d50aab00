// welltag - tag analyst well lists against the canonical well registry

mod batch;
mod exit_codes;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use env_logger::Env;
use serde::Serialize;
use welltag_recon::model::PropertyTokens;
use welltag_recon::tokenize::tokenize_property;

use exit_codes::{EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "welltag")]
#[command(about = "Reconcile analyst well lists against a canonical well registry")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tag input files (.csv or .xlsx) against the registry
    #[command(after_help = "\
Examples:
  welltag run --registry wells.db --out tagged/ january.xlsx february.xlsx
  welltag run --registry wells.csv --config welltag.toml --out tagged/ input.csv
  welltag run --registry wells.db --out tagged/ --report run.json *.xlsx

Each input produces <out>/<prefix><name> in the same format. Files are
processed one after another; a failing file does not stop the batch.")]
    Run {
        /// Registry database (SQLite) or registry export (.csv)
        #[arg(long)]
        registry: PathBuf,

        /// TOML config file (defaults are used when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output directory (created if missing)
        #[arg(long)]
        out: PathBuf,

        /// Input files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Write a JSON batch report to this path
        #[arg(long)]
        report: Option<PathBuf>,

        /// Only log warnings and errors
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Show how property descriptions are split into well name and numbers
    #[command(after_help = "\
Examples:
  welltag tokenize 'SMITH GAS UNIT #1, 2, 3'
  welltag tokenize 'Wayne State (WS #2) 1/3/4/5' --json")]
    Tokenize {
        /// Property descriptions
        #[arg(required = true)]
        text: Vec<String>,

        /// Output JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Validate a config file without running
    #[command(after_help = "\
Examples:
  welltag validate welltag.toml")]
    Validate {
        /// Path to the TOML config file
        config: PathBuf,
    },
}

fn init_logging(quiet: bool) {
    let default_filter = if quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let quiet = matches!(cli.command, Commands::Run { quiet: true, .. });
    init_logging(quiet);

    let result = match cli.command {
        Commands::Run {
            registry,
            config,
            out,
            files,
            report,
            quiet,
        } => batch::cmd_run(registry, config, out, files, report, quiet),
        Commands::Tokenize { text, json } => cmd_tokenize(text, json),
        Commands::Validate { config } => cmd_validate(config),
    };

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

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// tokenize
// ============================================================================

#[derive(Serialize)]
struct TokenizeOutput<'a> {
    text: &'a str,
    #[serde(flatten)]
    tokens: PropertyTokens,
}

fn cmd_tokenize(texts: Vec<String>, json: bool) -> Result<(), CliError> {
    if texts.iter().all(|t| t.trim().is_empty()) {
        return Err(CliError::args("nothing to tokenize").with_hint("pass at least one non-empty description"));
    }

    let outputs: Vec<TokenizeOutput> = texts
        .iter()
        .map(|text| TokenizeOutput {
            text,
            tokens: tokenize_property(Some(text.as_str())),
        })
        .collect();

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    if json {
        let s = serde_json::to_string_pretty(&outputs)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        writeln!(handle, "{s}").map_err(|e| CliError::io(e.to_string()))?;
        return Ok(());
    }

    for out in &outputs {
        let join = |numbers: &welltag_recon::model::WellNumbers| numbers.iter().collect::<Vec<_>>().join(", ");
        writeln!(
            handle,
            "{}\n  well name:    {}\n  well numbers: {}\n  recursive:    {}",
            out.text,
            out.tokens.well_name.as_deref().unwrap_or("-"),
            join(&out.tokens.well_numbers),
            join(&out.tokens.recursive_well_numbers),
        )
        .map_err(|e| CliError::io(e.to_string()))?;
    }
    Ok(())
}

// ============================================================================
// validate
// ============================================================================

fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = batch::load_config(Some(&config_path))?;
    eprintln!(
        "{}: valid (operator close >= {}, exact >= {}, metric {:?}, prefix {:?})",
        config_path.display(),
        config.operator.close_threshold,
        config.operator.exact_threshold,
        config.operator.metric,
        config.output.file_prefix,
    );
    Ok(())
}
