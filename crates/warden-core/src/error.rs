//! Common error types shared by `warden-scheduler` and `warden-agent`.

use crate::ids::{Endpoint, PodId};
use thiserror::Error;

/// A result type using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors shared across the placement engine and the pod manager.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An agent with the given endpoint is not present in the current snapshot.
    #[error("agent not found: {0}")]
    AgentNotFound(Endpoint),

    /// A pod with the given id is not tracked by the caller.
    #[error("pod not found: {0}")]
    PodNotFound(PodId),

    /// An internal invariant was violated.
    #[error("internal error: {0}")]
    Internal(String),
}
