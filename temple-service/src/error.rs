//! Domain error taxonomy for the temple portal.

use service_core::error::AppError;
use thiserror::Error;

/// Errors returned by every domain operation.
///
/// No operation that returns an error leaves a partial state change behind.
#[derive(Debug, Error)]
pub enum TempleError {
    /// Malformed or out-of-range field, e.g. a non-positive amount.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unknown payment id, receipt number or directory entry.
    #[error("{0} not found")]
    NotFound(String),

    /// Operation not permitted in the current lifecycle state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Caller lacks the required role.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Storage error: {0}")]
    Storage(anyhow::Error),
}

impl TempleError {
    /// Short label used for the error counter.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::NotFound(_) => "not_found",
            Self::InvalidState(_) => "invalid_state",
            Self::Unauthorized(_) => "unauthorized",
            Self::Storage(_) => "storage",
        }
    }
}

impl From<sqlx::Error> for TempleError {
    fn from(err: sqlx::Error) -> Self {
        TempleError::Storage(anyhow::Error::new(err))
    }
}

impl From<sqlx::migrate::MigrateError> for TempleError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        TempleError::Storage(anyhow::Error::new(err))
    }
}

impl From<TempleError> for AppError {
    fn from(err: TempleError) -> Self {
        match err {
            TempleError::InvalidInput(msg) => AppError::BadRequest(anyhow::anyhow!(msg)),
            TempleError::NotFound(what) => {
                AppError::NotFound(anyhow::anyhow!("{} not found", what))
            }
            TempleError::InvalidState(msg) => AppError::Conflict(anyhow::anyhow!(msg)),
            TempleError::Unauthorized(msg) => AppError::Unauthorized(anyhow::anyhow!(msg)),
            TempleError::Storage(e) => AppError::DatabaseError(e),
        }
    }
}
