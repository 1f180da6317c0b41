//! Error types for the forecast view
//!
//! Errors are classified by where they stop:
//! - Fetch-level: the request failed, prior display state is kept
//! - Row-level: one observation is dropped, the rest of the dataset survives
//! - Display-level: the record is flagged but still rendered from raw values

use thiserror::Error;

/// Error types for fetching, aligning and summarizing forecast data
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewError {
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("Invalid timestamp {raw:?}: {reason}")]
    InvalidTimestamp { raw: String, reason: String },

    #[error(
        "Confidence interval [{lower}, {upper}] does not contain consensus probability {probability}"
    )]
    InvariantViolation {
        lower: f64,
        probability: f64,
        upper: f64,
    },

    #[error("No forecast data for the selected event")]
    NoData,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ViewError {
    /// Get a user-friendly recovery suggestion
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ViewError::NetworkFailure(_) => {
                "Showing the last data received. Select an event again to retry."
            }
            ViewError::InvalidTimestamp { .. } => {
                "The observation was left out of the chart. Check the forecast service output."
            }
            ViewError::InvariantViolation { .. } => {
                "Values are shown as received. Check the consensus service output."
            }
            ViewError::NoData => "Forecasts appear once sources report for this event.",
            ViewError::Configuration(_) => {
                "Check your configuration in ~/.consensus-view/config.json"
            }
        }
    }
}

/// Serializable error representation for the status line
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub message: String,
    pub kind: ErrorKind,
    pub recovery_suggestion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Fetch,
    Data,
    Startup,
}

impl From<&ViewError> for ErrorReport {
    fn from(err: &ViewError) -> Self {
        let kind = match err {
            ViewError::NetworkFailure(_) => ErrorKind::Fetch,
            ViewError::Configuration(_) => ErrorKind::Startup,
            _ => ErrorKind::Data,
        };

        ErrorReport {
            message: err.to_string(),
            kind,
            recovery_suggestion: err.recovery_suggestion().to_string(),
        }
    }
}
