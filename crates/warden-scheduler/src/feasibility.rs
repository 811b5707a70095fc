//! Feasibility checking (C2): a pure predicate over one agent's free or
//! unassigned resources.

use warden_core::{AgentInfo, JobType, Resource, Volume};

/// Check whether `requirement` can be placed on `agent`, given the job's
/// classification.
///
/// Production jobs (`LongRun`/`System`) are checked against the agent's
/// `unassigned` bucket; best-effort (`Batch`) jobs are checked against
/// `free`. This is a pure function: it never mutates `agent` and never
/// logs on its own — callers decide what to do with a `false` result.
#[must_use]
pub fn is_feasible(agent: &AgentInfo, job_type: JobType, requirement: &Resource) -> bool {
    let bucket = match job_type {
        JobType::LongRun | JobType::System => &agent.unassigned,
        JobType::Batch => &agent.free,
    };

    if bucket.millicores < requirement.millicores {
        return false;
    }
    if bucket.memory < requirement.memory {
        return false;
    }
    if requirement
        .ports
        .iter()
        .any(|port| agent.used.ports.contains(port))
    {
        return false;
    }

    volume_fits(&bucket.disks, &requirement.disks) && volume_fits(&bucket.ssds, &requirement.ssds)
}

/// Best-fit sweep: sort both sequences ascending by quota, then walk the
/// unassigned volumes with a pointer into required volumes, advancing the
/// required pointer whenever its current quota fits under the unassigned
/// volume in hand. Succeeds when every required volume has been consumed.
fn volume_fits(unassigned: &[Volume], required: &[Volume]) -> bool {
    if required.is_empty() {
        return true;
    }

    let mut unassigned_sorted: Vec<i64> = unassigned.iter().map(|v| v.quota).collect();
    unassigned_sorted.sort_unstable();
    let mut required_sorted: Vec<i64> = required.iter().map(|v| v.quota).collect();
    required_sorted.sort_unstable();

    let mut fit_index = 0usize;
    for &quota in &unassigned_sorted {
        if fit_index >= required_sorted.len() {
            break;
        }
        if required_sorted[fit_index] <= quota {
            fit_index += 1;
        }
    }

    fit_index >= required_sorted.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use warden_core::Endpoint;

    fn agent_with(free: Resource, unassigned: Resource) -> AgentInfo {
        AgentInfo {
            endpoint: Endpoint::from("a1:9527"),
            total: Resource::default(),
            used: Resource::default(),
            free,
            unassigned,
            pods: Vec::new(),
        }
    }

    #[test]
    fn production_job_checks_unassigned_not_free() {
        let agent = agent_with(
            Resource {
                millicores: 1000,
                ..Default::default()
            },
            Resource {
                millicores: 100,
                ..Default::default()
            },
        );
        let requirement = Resource {
            millicores: 500,
            ..Default::default()
        };
        assert!(!is_feasible(&agent, JobType::LongRun, &requirement));
        assert!(is_feasible(&agent, JobType::Batch, &requirement));
    }

    #[test]
    fn rejects_when_required_port_already_used() {
        let mut agent = agent_with(
            Resource {
                millicores: 1000,
                memory: 1 << 30,
                ..Default::default()
            },
            Resource {
                millicores: 1000,
                memory: 1 << 30,
                ..Default::default()
            },
        );
        agent.used.ports = BTreeSet::from([8080]);
        let requirement = Resource {
            ports: BTreeSet::from([8080]),
            ..Default::default()
        };
        assert!(!is_feasible(&agent, JobType::Batch, &requirement));
    }

    #[test]
    fn best_fit_disks_scenario_s4() {
        let unassigned = vec![8, 40, 60, 100].into_iter().map(Volume::with_quota).collect::<Vec<_>>();
        let required = vec![10, 50].into_iter().map(Volume::with_quota).collect::<Vec<_>>();
        assert!(volume_fits(&unassigned, &required));

        let unassigned_short = vec![8, 40, 49].into_iter().map(Volume::with_quota).collect::<Vec<_>>();
        assert!(!volume_fits(&unassigned_short, &required));
    }

    #[test]
    fn empty_required_volumes_always_fit() {
        assert!(volume_fits(&[], &[]));
        assert!(volume_fits(&[Volume::with_quota(5)], &[]));
    }
}
