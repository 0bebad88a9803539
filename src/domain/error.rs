//! Domain error types.

/// Top-level error type for stratsearch.
#[derive(Debug, thiserror::Error)]
pub enum StratsearchError {
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("cannot compute {indicator}: {reason}")]
    IndicatorComputation { indicator: String, reason: String },

    #[error("price series from {source_name} has no usable rows")]
    EmptySeries { source_name: String },

    #[error("invalid price series from {source_name}: {reason}")]
    InvalidSeries { source_name: String, reason: String },

    #[error("no strategy completed a single trial")]
    NoViableStrategy,

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

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StratsearchError {
    /// True for errors that only invalidate a single optimizer trial.
    pub fn is_trial_local(&self) -> bool {
        matches!(
            self,
            StratsearchError::InvalidParameter { .. } | StratsearchError::IndicatorComputation { .. }
        )
    }
}

impl From<&StratsearchError> for std::process::ExitCode {
    fn from(err: &StratsearchError) -> Self {
        let code: u8 = match err {
            StratsearchError::Io(_) | StratsearchError::Report { .. } => 1,
            StratsearchError::ConfigParse { .. }
            | StratsearchError::ConfigMissing { .. }
            | StratsearchError::ConfigInvalid { .. } => 2,
            StratsearchError::InvalidParameter { .. }
            | StratsearchError::IndicatorComputation { .. } => 4,
            StratsearchError::EmptySeries { .. }
            | StratsearchError::InvalidSeries { .. }
            | StratsearchError::NoViableStrategy
            | StratsearchError::Data { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
