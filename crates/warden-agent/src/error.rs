//! Error types for the agent crate.

use thiserror::Error;
use warden_core::CoreError;

/// Errors that can occur during pod-manager operations.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Shared core error (pod not found, internal invariant).
    #[error("{0}")]
    Core(#[from] CoreError),

    /// `Fork` (or its stand-in, the process launcher) failed.
    #[error("process launch failed: {0}")]
    ProcessLaunchFailure(String),

    /// Filesystem error other than "already exists", which is non-fatal.
    #[error("filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),
}

impl AgentError {
    /// Get the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Core(CoreError::PodNotFound(_) | CoreError::AgentNotFound(_)) => 404,
            Self::ProcessLaunchFailure(_) | Self::Filesystem(_) | Self::Core(CoreError::Internal(_)) => 500,
        }
    }
}

/// A specialized Result type for agent operations.
pub type Result<T> = std::result::Result<T, AgentError>;
