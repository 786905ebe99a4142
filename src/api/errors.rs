use thiserror::Error;

use crate::models::BuildingStatus;

/// Errors surfaced by the register API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The register rejected the request. `field_errors` carries the
    /// per-field validation messages the form renders next to its inputs.
    #[error("register API returned HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        field_errors: Vec<String>,
    },

    #[error("network error talking to the register API: {0}")]
    Network(String),

    #[error("could not decode register API response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no transition from status {from} to status {to}")]
    InvalidTransition {
        from: BuildingStatus,
        to: BuildingStatus,
    },

    #[error("building has no EGID assigned yet")]
    MissingEgid,

    #[error("the form has not loaded a record yet")]
    NotLoaded,
}

impl ApiError {
    /// Validation messages attached to the failure, if the server sent any.
    pub fn field_errors(&self) -> &[String] {
        match self {
            ApiError::Http { field_errors, .. } => field_errors,
            _ => &[],
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}
