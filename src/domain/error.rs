//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for swingtest.
#[derive(Debug, thiserror::Error)]
pub enum SwingtestError {
    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("price series dates not strictly ascending at bar {index}: {date} follows {previous}")]
    UnorderedDates {
        index: usize,
        previous: NaiveDate,
        date: NaiveDate,
    },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SwingtestError {
    pub fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        SwingtestError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn missing(section: &str, key: &str) -> Self {
        SwingtestError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }
    }
}

impl From<&SwingtestError> for std::process::ExitCode {
    fn from(err: &SwingtestError) -> Self {
        let code: u8 = match err {
            SwingtestError::Io(_) | SwingtestError::Report { .. } => 1,
            SwingtestError::ConfigParse { .. }
            | SwingtestError::ConfigMissing { .. }
            | SwingtestError::ConfigInvalid { .. } => 2,
            SwingtestError::Data { .. } => 3,
            SwingtestError::UnorderedDates { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
