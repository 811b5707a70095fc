//! Job-level types (§3): the master's view of what a pod belongs to, used
//! by the placement engine's scale-up/scale-down/overload passes.

use crate::ids::{Endpoint, JobId, PodId};
use crate::resource::PodDescriptor;
use serde::{Deserialize, Serialize};

/// Whether a job is production (reserves capacity, exempt from preemption)
/// or best-effort (opportunistic, first in line for overload preemption).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    /// Long-running production service. Reserves capacity via `unassigned`.
    LongRun,
    /// System-level production workload. Reserves capacity via `unassigned`.
    System,
    /// Best-effort batch workload. Uses `free` capacity, preemptible.
    Batch,
}

impl JobType {
    /// `LongRun` and `System` are production; only `Batch` is best-effort.
    #[must_use]
    pub fn is_production(self) -> bool {
        matches!(self, JobType::LongRun | JobType::System)
    }
}

/// A job's template: priority, desired replica count, type, and pod shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDesc {
    /// Scheduling priority; higher sorts first in scale-up.
    pub priority: i32,
    /// Desired number of pod replicas.
    pub replica: i32,
    /// Production or best-effort classification.
    pub job_type: JobType,
    /// Shape of each pod replica.
    pub pod: PodDescriptor,
}

/// A pod belonging to a job, with its placement if known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodRef {
    /// Identifier of the pod.
    pub pod_id: PodId,
    /// Endpoint the pod is placed on, if already scheduled.
    pub endpoint: Option<Endpoint>,
}

/// A job's full record as tracked by the master and pushed to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInfo {
    /// Identifier of the job.
    pub job_id: JobId,
    /// The job's template.
    pub desc: JobDesc,
    /// Known pods belonging to this job.
    pub pods: Vec<PodRef>,
}

impl JobInfo {
    /// Number of pods currently tracked for this job, per §4.4's
    /// `pods_size > desc.replica` scale-down trigger.
    #[must_use]
    pub fn pods_size(&self) -> usize {
        self.pods.len()
    }
}

/// Lightweight view of a job used solely to classify an agent's pods during
/// overload scans (§4.5); carries only what that classification needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOverview {
    /// Identifier of the job.
    pub job_id: JobId,
    /// Production or best-effort classification.
    pub job_type: JobType,
}

/// A scheduling decision: pair a pod-id with an agent endpoint and an
/// action. The caller owns the returned sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleAction {
    /// Launch the pod on the paired endpoint.
    Launch,
    /// Terminate the pod on the paired endpoint.
    Terminate,
}

/// A single placement-engine proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleInfo {
    /// Endpoint the proposal applies to.
    pub endpoint: Endpoint,
    /// Pod the proposal applies to.
    pub pod_id: PodId,
    /// Job the pod belongs to.
    pub job_id: JobId,
    /// Launch or terminate.
    pub action: ScheduleAction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_batch_jobs_are_best_effort() {
        assert!(JobType::LongRun.is_production());
        assert!(JobType::System.is_production());
        assert!(!JobType::Batch.is_production());
    }
}
