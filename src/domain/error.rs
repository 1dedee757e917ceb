//! Domain error types.
//!
//! The numeric core never fails; these errors belong to configuration,
//! data loading and report writing.

/// Top-level error type for lwtrend.
#[derive(Debug, thiserror::Error)]
pub enum LwtrendError {
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

    #[error("failed to read bars from {path}: {reason}")]
    DataRead { path: String, reason: String },

    #[error("no bars loaded from {path}")]
    NoData { path: String },

    #[error("failed to write {path}: {reason}")]
    ReportWrite { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&LwtrendError> for std::process::ExitCode {
    fn from(err: &LwtrendError) -> Self {
        let code: u8 = match err {
            LwtrendError::Io(_) => 1,
            LwtrendError::ConfigParse { .. }
            | LwtrendError::ConfigMissing { .. }
            | LwtrendError::ConfigInvalid { .. } => 2,
            LwtrendError::DataRead { .. } | LwtrendError::NoData { .. } => 5,
            LwtrendError::ReportWrite { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
