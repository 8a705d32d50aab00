//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: batch scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain    | Description                              |
//! |---------|-----------|------------------------------------------|
//! | 0       | Universal | Success                                  |
//! | 1       | Universal | General error (unspecified)              |
//! | 2       | Universal | CLI usage error (bad args, missing file) |
//! | 3-9     | run       | Tagging batch codes                      |

use welltag_recon::ReconError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - every input file was tagged.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure (e.g. report could not be written).
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
/// clap uses the same value for its own parse errors.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Run (3-9)
// =============================================================================

/// At least one input file failed; the others were still processed.
pub const EXIT_RUN_FILE_FAILED: u8 = 3;

/// The canonical registry could not be read. No file was processed.
pub const EXIT_RUN_REGISTRY_UNAVAILABLE: u8 = 4;

/// Config file unreadable, unparsable, or failed validation.
pub const EXIT_RUN_INVALID_CONFIG: u8 = 5;

/// Exit code for an engine error that aborts the whole command.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_RUN_INVALID_CONFIG,
        ReconError::SourceUnavailable(_) => EXIT_RUN_REGISTRY_UNAVAILABLE,
        ReconError::MissingColumn { .. } | ReconError::Processing { .. } => EXIT_RUN_FILE_FAILED,
        ReconError::Io(_) => EXIT_ERROR,
    }
}
