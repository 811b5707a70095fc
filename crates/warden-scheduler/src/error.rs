//! Error types for the scheduler crate.

use thiserror::Error;
use warden_core::CoreError;

/// Errors that can occur during scheduling operations.
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// Shared core error (agent/pod not found, internal invariant).
    #[error("{0}")]
    Core(#[from] CoreError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl SchedulerError {
    /// Get the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Core(CoreError::AgentNotFound(_) | CoreError::PodNotFound(_)) => 404,
            Self::Config(_) => 400,
            Self::Core(CoreError::Internal(_)) => 500,
        }
    }
}

/// A specialized Result type for scheduler operations.
pub type Result<T> = std::result::Result<T, SchedulerError>;
