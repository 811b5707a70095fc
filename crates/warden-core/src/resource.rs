//! Resource value objects (§3): the typed inputs to feasibility checking and
//! load scoring.

use crate::ids::{Endpoint, JobId, PodId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A storage volume with a quota, used for disk/ssd best-fit matching.
///
/// `id` is an opaque label (mount point, device path) carried through
/// unchanged; it plays no part in feasibility matching, which only compares
/// quotas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Volume {
    /// Capacity this volume reserves, in bytes.
    pub quota: i64,
    /// Optional mount point or device identifier.
    pub id: Option<String>,
}

impl Volume {
    /// Build a volume with the given quota and no identifier.
    #[must_use]
    pub fn with_quota(quota: i64) -> Self {
        Self { quota, id: None }
    }
}

/// A multi-dimensional resource vector: CPU, memory, ports, and volumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Resource {
    /// CPU share in millicores.
    pub millicores: i32,
    /// Memory in bytes.
    pub memory: i64,
    /// Reserved or required TCP ports.
    pub ports: BTreeSet<i32>,
    /// Disk volumes, matched by best-fit over quota.
    pub disks: Vec<Volume>,
    /// SSD volumes, matched by best-fit over quota, independent of `disks`.
    pub ssds: Vec<Volume>,
}

impl Resource {
    /// Sum `self` and `other` componentwise: millicores and memory add,
    /// `ports` is unioned (it's a set), and `disks`/`ssds` are concatenated,
    /// since a pod's aggregate requirement sums task requirements rather
    /// than deduplicating volumes.
    #[must_use]
    pub fn add(&self, other: &Resource) -> Resource {
        let mut ports = self.ports.clone();
        ports.extend(&other.ports);
        let mut disks = self.disks.clone();
        disks.extend(other.disks.iter().cloned());
        let mut ssds = self.ssds.clone();
        ssds.extend(other.ssds.iter().cloned());
        Resource {
            millicores: self.millicores + other.millicores,
            memory: self.memory + other.memory,
            ports,
            disks,
            ssds,
        }
    }
}

/// A pod currently placed on an agent, as tracked by the resource snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodOnAgent {
    /// Identifier of the pod.
    pub pod_id: PodId,
    /// Identifier of the job the pod belongs to.
    pub job_id: JobId,
    /// Resources this pod currently holds on the agent.
    pub resource_used: Resource,
}

/// A single agent's capacity and usage, as pushed by the master.
///
/// Invariants (not enforced by the type, since snapshots are taken on faith
/// from the master): `used + free == total` per scalar dimension;
/// `unassigned <= free`; `used.ports` is a subset of `total.ports`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentInfo {
    /// Unique network endpoint (`host:port`), used as the map key.
    pub endpoint: Endpoint,
    /// Total physical capacity.
    pub total: Resource,
    /// Resources currently in use by placed pods.
    pub used: Resource,
    /// Physical remainder: `total - used`.
    pub free: Resource,
    /// Remainder after accounting for production reservations; always
    /// `<= free`.
    pub unassigned: Resource,
    /// Pods currently placed on this agent.
    pub pods: Vec<PodOnAgent>,
}

/// A single task's launch requirements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    /// Resources this task requires.
    pub requirement: Resource,
    /// Opaque launch command passed through to initd/task creation.
    pub launch_command: String,
}

/// A pod's full descriptor: the ordered set of tasks it is composed of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PodDescriptor {
    /// Tasks that make up this pod.
    pub tasks: Vec<TaskDescriptor>,
}

impl PodDescriptor {
    /// Aggregate resource requirement across all tasks, per §4.1.
    #[must_use]
    pub fn aggregate_requirement(&self) -> Resource {
        self.tasks
            .iter()
            .fold(Resource::default(), |acc, task| acc.add(&task.requirement))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_requirement_sums_task_resources() {
        let pod = PodDescriptor {
            tasks: vec![
                TaskDescriptor {
                    requirement: Resource {
                        millicores: 100,
                        memory: 256,
                        ..Default::default()
                    },
                    launch_command: "true".into(),
                },
                TaskDescriptor {
                    requirement: Resource {
                        millicores: 200,
                        memory: 512,
                        ..Default::default()
                    },
                    launch_command: "true".into(),
                },
            ],
        };
        let agg = pod.aggregate_requirement();
        assert_eq!(agg.millicores, 300);
        assert_eq!(agg.memory, 768);
    }
}
