//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for barlab.
#[derive(Debug, thiserror::Error)]
pub enum BarlabError {
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("no bars for {symbol} between {start} and {end}")]
    NotFound {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

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

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl BarlabError {
    pub(crate) fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        BarlabError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        BarlabError::InvalidInput {
            reason: reason.into(),
        }
    }
}

impl From<&BarlabError> for std::process::ExitCode {
    fn from(err: &BarlabError) -> Self {
        let code: u8 = match err {
            BarlabError::Io(_) | BarlabError::Json(_) => 1,
            BarlabError::ConfigParse { .. }
            | BarlabError::ConfigMissing { .. }
            | BarlabError::ConfigInvalid { .. } => 2,
            BarlabError::Data { .. } => 3,
            BarlabError::InvalidParameter { .. } | BarlabError::InvalidInput { .. } => 4,
            BarlabError::NotFound { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
