//! Error types for fetching and normalizing availability.

use shared::ViewMode;
use std::time::Duration;
use thiserror::Error;

/// Generic message shown for every genuine failure
pub const FETCH_FAILED_MESSAGE: &str = "No se pudo cargar la disponibilidad";

/// The response arrived but does not match the availability contract
#[derive(Debug, Error)]
pub enum NormalizationError {
    #[error("response body is not a JSON object")]
    NotAnObject,

    #[error("response body is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("{view} response is missing '{field}'")]
    MissingField { view: ViewMode, field: &'static str },

    #[error("{view} response has an unexpected shape: {source}")]
    InvalidShape {
        view: ViewMode,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum FetchError {
    /// Superseded by a newer request; never shown to the user
    #[error("request cancelled")]
    Cancelled,

    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("server responded with {status}: {body}")]
    Http { status: u16, body: String },

    #[error("invalid availability response: {0}")]
    Normalization(#[from] NormalizationError),
}

impl FetchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }

    /// Contract drift rather than a transient outage
    pub fn is_contract_drift(&self) -> bool {
        matches!(self, FetchError::Normalization(_))
    }
}

/// Error state exposed by the controller to renderers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AvailabilityError {
    #[error("{message}")]
    FetchFailed {
        message: String,
        detail: String,
        /// The response did not match the availability contract
        contract_drift: bool,
    },
}

impl AvailabilityError {
    pub fn message(&self) -> &str {
        match self {
            AvailabilityError::FetchFailed { message, .. } => message,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            AvailabilityError::FetchFailed { detail, .. } => detail,
        }
    }

    pub fn is_contract_drift(&self) -> bool {
        match self {
            AvailabilityError::FetchFailed { contract_drift, .. } => *contract_drift,
        }
    }
}

impl From<&FetchError> for AvailabilityError {
    fn from(error: &FetchError) -> Self {
        AvailabilityError::FetchFailed {
            message: FETCH_FAILED_MESSAGE.to_string(),
            detail: error.to_string(),
            contract_drift: error.is_contract_drift(),
        }
    }
}
