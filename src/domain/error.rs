//! Domain error types.

/// Top-level error type for swingscan.
///
/// Signal rejections are not errors; see [`crate::domain::signal::Rejection`].
#[derive(Debug, thiserror::Error)]
pub enum SwingscanError {
    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no price history for {ticker}")]
    NoData { ticker: String },

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

    #[error("{file}: no column matching {column}")]
    MissingColumn { file: String, column: String },

    #[error("notification failed: {reason}")]
    Notify { reason: String },

    #[error("ledger error: {reason}")]
    Ledger { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&SwingscanError> for std::process::ExitCode {
    fn from(err: &SwingscanError) -> Self {
        let code: u8 = match err {
            SwingscanError::Io(_) | SwingscanError::Notify { .. } => 1,
            SwingscanError::ConfigParse { .. }
            | SwingscanError::ConfigMissing { .. }
            | SwingscanError::ConfigInvalid { .. } => 2,
            SwingscanError::Data { .. }
            | SwingscanError::NoData { .. }
            | SwingscanError::Ledger { .. } => 3,
            SwingscanError::MissingColumn { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
