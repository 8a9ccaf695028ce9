//! CLI error types

use driftguard_core::DriftError;
use thiserror::Error;

/// CLI error type
#[derive(Error, Debug)]
pub enum CliError {
    #[error("line {line}: malformed observation: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("line {line}: {source}")]
    Rejected {
        line: usize,
        #[source]
        source: DriftError,
    },
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
