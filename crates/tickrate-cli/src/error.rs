//! Error types for tickctl CLI

use thiserror::Error;
use tickrate_profiler::ProfilerError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Window not found: {0}")]
    WindowNotFound(String),

    #[error("Not enough data: {0}")]
    InsufficientData(String),

    #[error("Invalid trace record on line {line}: {reason}")]
    InvalidTrace { line: usize, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::WindowNotFound(_) => 2,
            CliError::InsufficientData(_) => 3,
            CliError::InvalidTrace { .. }
            | CliError::InvalidConfiguration(_)
            | CliError::JsonError(_)
            | CliError::YamlError(_) => 4,
            CliError::IoError(_) => 5,
        }
    }
}

impl From<ProfilerError> for CliError {
    fn from(err: ProfilerError) -> Self {
        match err {
            ProfilerError::WindowNotFound(name) => CliError::WindowNotFound(name),
            err @ ProfilerError::ReportUnavailable { .. } => {
                CliError::InsufficientData(err.to_string())
            }
            ProfilerError::InvalidInterval(interval) => {
                CliError::InvalidConfiguration(format!("invalid time interval '{interval}'"))
            }
            ProfilerError::InvalidConfiguration(reason) | ProfilerError::ConfigLoad(reason) => {
                CliError::InvalidConfiguration(reason)
            }
        }
    }
}
