use thiserror::Error;

/// Errors from the drift detection engine.
///
/// Every variant is raised before any detector state is touched, so a
/// rejected call leaves the monitor exactly as it was.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DriftError {
    #[error("invalid configuration: {parameter} = {value} ({reason})")]
    Config {
        parameter: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration parse error: {0}")]
    ConfigParse(String),

    #[error("configuration io error: {0}")]
    Io(String),
}

impl DriftError {
    pub(crate) fn config(
        parameter: &'static str,
        value: impl ToString,
        reason: &'static str,
    ) -> Self {
        DriftError::Config {
            parameter,
            value: value.to_string(),
            reason,
        }
    }
}

impl From<std::io::Error> for DriftError {
    fn from(e: std::io::Error) -> Self {
        DriftError::Io(e.to_string())
    }
}

impl From<toml::de::Error> for DriftError {
    fn from(e: toml::de::Error) -> Self {
        DriftError::ConfigParse(e.to_string())
    }
}

/// Convenience type alias for drift engine results.
pub type DriftResult<T> = Result<T, DriftError>;
