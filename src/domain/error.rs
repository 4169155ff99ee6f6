//! Error types for configuration, data and reporting.
//!
//! The simulation itself has no failure modes; these cover the layers that
//! feed it and render its results.

#[derive(Debug, thiserror::Error)]
pub enum SimtraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SimtraderError {
    pub fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        SimtraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn data(reason: impl Into<String>) -> Self {
        SimtraderError::Data {
            reason: reason.into(),
        }
    }
}

impl From<&SimtraderError> for std::process::ExitCode {
    fn from(err: &SimtraderError) -> Self {
        let code: u8 = match err {
            SimtraderError::Io(_) | SimtraderError::Report { .. } => 1,
            SimtraderError::ConfigParse { .. } | SimtraderError::ConfigInvalid { .. } => 2,
            SimtraderError::Data { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
