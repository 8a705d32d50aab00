use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (bad threshold range, empty column name, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// The canonical registry could not be read. Fatal for the whole run.
    #[error("registry source unavailable: {0}")]
    SourceUnavailable(String),
    /// Missing required column in a loaded table.
    #[error("{source_name}: missing column '{column}'")]
    MissingColumn { source_name: String, column: String },
    /// IO error (file read/write, unsupported format).
    #[error("IO error: {0}")]
    Io(String),
    /// Any other failure while processing one input file.
    #[error("processing '{file}' failed: {reason}")]
    Processing { file: String, reason: String },
}

impl ReconError {
    /// Wrap an error as a per-file processing failure, keeping the file name.
    pub fn for_file(self, file: impl Into<String>) -> Self {
        match self {
            Self::Processing { .. } | Self::SourceUnavailable(_) => self,
            other => Self::Processing {
                file: file.into(),
                reason: other.to_string(),
            },
        }
    }
}
