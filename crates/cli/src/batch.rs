//! `welltag run`: tag a batch of input files against one registry snapshot.

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use welltag_io::{open_registry, read_table, write_table, TableFormat};
use welltag_recon::{process_table, CanonicalIndex, ReconConfig, ReconError, ReconSummary};

use crate::exit_codes::{recon_exit_code, EXIT_ERROR, EXIT_RUN_FILE_FAILED, EXIT_RUN_INVALID_CONFIG};
use crate::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Ok,
    Error,
}

/// Outcome of one input file, as written to the JSON report.
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub input: String,
    pub status: FileStatus,
    pub output: Option<String>,
    pub error: Option<String>,
    pub duration_ms: u64,
    pub summary: Option<ReconSummary>,
}

#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub engine_version: String,
    pub run_at: String,
    pub registry: String,
    pub registry_wells: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub files: Vec<FileReport>,
}

fn run_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

/// Load and validate a config file; no path means the built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<ReconConfig, CliError> {
    let Some(path) = path else {
        return Ok(ReconConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|e| {
        run_err(EXIT_RUN_INVALID_CONFIG, format!("cannot read config {}: {e}", path.display()))
    })?;
    ReconConfig::from_toml(&text).map_err(|e| run_err(EXIT_RUN_INVALID_CONFIG, e.to_string()))
}

/// `<out_dir>/<prefix><input file name>`.
pub fn output_path(out_dir: &Path, input: &Path, prefix: &str) -> Result<PathBuf, ReconError> {
    let name = input
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ReconError::Io(format!("{}: not a file name", input.display())))?;
    Ok(out_dir.join(format!("{prefix}{name}")))
}

/// Tag one file and write its output. A failed write leaves no partial file.
pub fn process_file(
    config: &ReconConfig,
    index: &CanonicalIndex,
    input: &Path,
    out_dir: &Path,
) -> Result<(PathBuf, ReconSummary), ReconError> {
    let label = input.display().to_string();

    if TableFormat::from_path(input).is_none() {
        return Err(ReconError::Io("unsupported file type (expected .csv or .xlsx)".into()).for_file(label));
    }
    let out_path = output_path(out_dir, input, &config.output.file_prefix).map_err(|e| e.for_file(&label))?;
    if same_file(input, &out_path) {
        return Err(ReconError::Io(format!("output {} would overwrite the input", out_path.display())).for_file(label));
    }

    let table = read_table(input).map_err(|e| e.for_file(&label))?;
    let (output, result) = process_table(config, index, &table).map_err(|e| e.for_file(&label))?;

    if let Err(e) = write_table(&output, &out_path) {
        if out_path.exists() {
            if let Err(rm) = std::fs::remove_file(&out_path) {
                log::warn!("could not remove partial output {}: {rm}", out_path.display());
            }
        }
        return Err(e.for_file(label));
    }

    Ok((out_path, result.summary))
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

pub fn cmd_run(
    registry: PathBuf,
    config_path: Option<PathBuf>,
    out_dir: PathBuf,
    files: Vec<PathBuf>,
    report: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let config = load_config(config_path.as_deref())?;

    let source = open_registry(&registry);
    let index = CanonicalIndex::build(&*source, &config).map_err(|e| {
        run_err(recon_exit_code(&e), e.to_string())
            .with_hint("check the --registry path and the [registry] table and column names")
    })?;
    if index.is_empty() {
        log::warn!("registry {} contains no wells; every record will be unmatched", source.describe());
    }

    std::fs::create_dir_all(&out_dir)
        .map_err(|e| run_err(EXIT_ERROR, format!("cannot create {}: {e}", out_dir.display())))?;

    let mut reports: Vec<FileReport> = Vec::with_capacity(files.len());
    for input in &files {
        let start = Instant::now();
        let outcome = process_file(&config, &index, input, &out_dir);
        let duration_ms = start.elapsed().as_millis() as u64;

        let file_report = match outcome {
            Ok((out_path, summary)) => {
                if !quiet {
                    eprintln!(
                        "  {}: {} records, {} precise, {} coarse, {} unmatched -> {} ({duration_ms}ms)",
                        input.display(),
                        summary.total_records,
                        summary.precise_matches,
                        summary.coarse_matches,
                        summary.unmatched,
                        out_path.display(),
                    );
                }
                FileReport {
                    input: input.display().to_string(),
                    status: FileStatus::Ok,
                    output: Some(out_path.display().to_string()),
                    error: None,
                    duration_ms,
                    summary: Some(summary),
                }
            }
            Err(e) => {
                log::warn!("{e}");
                FileReport {
                    input: input.display().to_string(),
                    status: FileStatus::Error,
                    output: None,
                    error: Some(e.to_string()),
                    duration_ms,
                    summary: None,
                }
            }
        };
        reports.push(file_report);
    }

    let failed = reports.iter().filter(|r| r.status == FileStatus::Error).count();
    let batch = BatchReport {
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        run_at: chrono::Utc::now().to_rfc3339(),
        registry: source.describe(),
        registry_wells: index.len(),
        succeeded: reports.len() - failed,
        failed,
        files: reports,
    };

    if let Some(ref path) = report {
        let json = serde_json::to_string_pretty(&batch)
            .map_err(|e| run_err(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
        std::fs::write(path, json)
            .map_err(|e| run_err(EXIT_ERROR, format!("cannot write report: {e}")))?;
        if !quiet {
            eprintln!("wrote {}", path.display());
        }
    }

    if !quiet {
        eprintln!("tagged {} of {} files", batch.succeeded, files.len());
    }

    if failed > 0 {
        return Err(run_err(EXIT_RUN_FILE_FAILED, format!("{failed} of {} files failed", files.len())));
    }
    Ok(())
}
