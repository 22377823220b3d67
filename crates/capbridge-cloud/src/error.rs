//! Cloud provider error types

use thiserror::Error;

/// Errors returned through the node group and cloud provider contract
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Node group not found: {0}")]
    NodeGroupNotFound(String),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Invalid size: {0}")]
    InvalidSize(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("API error: {0}")]
    ApiError(String),

    /// Error raised by a concrete provider implementation.
    ///
    /// The original error is kept as the source so callers can downcast it.
    #[error("{0}")]
    Provider(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    /// Wrap a provider-specific error
    pub fn provider<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Provider(Box::new(err))
    }

    /// Downcast the wrapped provider error, if any
    pub fn provider_error<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Self::Provider(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
