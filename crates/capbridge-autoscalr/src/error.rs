//! AutoScalr bridge error types

use thiserror::Error;

/// Status reported for calls that never produced an HTTP response
pub const TRANSPORT_FAILURE_STATUS: u16 = 500;

#[derive(Error, Debug)]
pub enum BridgeError {
    /// No response was obtained (connect failure, timeout, unreadable body)
    #[error("AutoScalr API request failed: {message}")]
    Transport { status: u16, message: String },

    /// A response arrived with an unexpected HTTP status
    #[error("{message}")]
    HttpStatus { status: u16, message: String },

    /// HTTP 200 whose body carried an error envelope
    #[error("Error response: {message}")]
    Remote { message: String, code: String },

    #[error("Unknown instance type: {0:?}")]
    UnknownInstanceType(String),

    #[error("Malformed provider id: {0:?}")]
    MalformedProviderId(String),

    #[error("Size delta must be positive, got {0}")]
    InvalidDelta(i64),

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cloud error: {0}")]
    Cloud(#[from] capbridge_cloud::CloudError),
}

impl BridgeError {
    pub(crate) fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport {
            status: TRANSPORT_FAILURE_STATUS,
            message: err.to_string(),
        }
    }

    /// Status code attached by response classification, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } | Self::HttpStatus { status, .. } => Some(*status),
            Self::Remote { .. } => Some(200),
            _ => None,
        }
    }

    /// Whether the error came from talking to the remote service
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::HttpStatus { .. } | Self::Remote { .. }
        )
    }
}

impl From<BridgeError> for capbridge_cloud::CloudError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::Cloud(inner) => inner,
            other => capbridge_cloud::CloudError::provider(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
