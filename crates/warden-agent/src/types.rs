//! Agent-side pod types (§3, §4.6): the state a single pod manager tracks
//! for a pod across its lifetime.

use serde::{Deserialize, Serialize};
use warden_core::PodDescriptor;

/// Lifecycle state of a pod as tracked by the pod manager.
///
/// `Running` and `Terminated` are reserved for the task manager's feedback
/// path, out of scope for this crate; only `Pending`/`Deploy` transitions
/// are driven here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PodState {
    /// Initd has been forked but has not yet reported healthy, or has
    /// reported healthy but task creation has not completed.
    Pending,
    /// All of the pod's tasks have been created via the task manager.
    Deploy,
    /// Reserved for the task manager's feedback path.
    Running,
    /// Reserved for the task manager's feedback path.
    Terminated,
}

/// Whether transitioning from `from` to `to` is permitted by the state
/// machine in §4.6.
#[must_use]
pub const fn is_valid_transition(from: PodState, to: PodState) -> bool {
    use PodState::{Deploy, Pending, Running, Terminated};

    matches!(
        (from, to),
        (Pending, Deploy) | (Deploy, Running) | (Running, Terminated)
    )
}

/// The pod manager's record of a single pod.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodInfo {
    /// Identifier of the pod.
    pub pod_id: String,
    /// The pod's descriptor, as supplied to `Run`.
    pub desc: PodDescriptor,
    /// TCP port initd was launched on.
    pub port: u16,
    /// Current lifecycle state.
    pub state: PodState,
    /// Task ids returned by the task manager, in creation order.
    pub tasks_id: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_advances_to_deploy_only() {
        assert!(is_valid_transition(PodState::Pending, PodState::Deploy));
        assert!(!is_valid_transition(PodState::Pending, PodState::Running));
        assert!(!is_valid_transition(PodState::Deploy, PodState::Pending));
    }
}
