//! Placement engine (C4): scale-up, scale-down, and overload-preemption
//! rounds over a mutable view of agent resources and job overviews.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use parking_lot::Mutex;
use warden_core::{AgentInfo, Endpoint, JobId, JobInfo, JobOverview, JobType, PodId, Resource, ScheduleAction, ScheduleInfo};

use crate::config::SchedulerConfig;
use crate::feasibility::is_feasible;
use crate::load::{is_overloaded, load, AgentHistory};

#[derive(Debug, Default)]
struct Snapshot {
    resources: BTreeMap<Endpoint, AgentInfo>,
    job_overview: BTreeMap<JobId, JobOverview>,
}

/// Owns the master's pushed view of agent resources and job overviews, and
/// drives the three scheduling passes over it.
///
/// `resources` and `job_overview` are replaced wholesale by `sync_resources`/
/// `sync_job_overview`; no scheduling turn observes a partial snapshot,
/// since both live behind the same mutex as every other call.
pub struct PlacementEngine {
    snapshot: Mutex<Snapshot>,
    history: Mutex<AgentHistory>,
    config: SchedulerConfig,
}

struct ScaleUpCell<'a> {
    job_id: &'a JobId,
    job_type: JobType,
    requirement: Resource,
    pod_ids: Vec<PodId>,
    feasible_limit: usize,
    candidates: Vec<Endpoint>,
}

impl PlacementEngine {
    /// Build an engine with the given configuration and an empty snapshot.
    #[must_use]
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            snapshot: Mutex::new(Snapshot::default()),
            history: Mutex::new(AgentHistory::new()),
            config,
        }
    }

    /// Replace the entire resource snapshot.
    pub fn sync_resources(&self, agents: Vec<AgentInfo>) {
        let mut snapshot = self.snapshot.lock();
        snapshot.resources = agents.into_iter().map(|a| (a.endpoint.clone(), a)).collect();
    }

    /// Replace the entire job-overview table.
    pub fn sync_job_overview(&self, overview: Vec<JobOverview>) {
        let mut snapshot = self.snapshot.lock();
        snapshot.job_overview = overview.into_iter().map(|o| (o.job_id.clone(), o)).collect();
    }

    /// Replace a single agent's record. Returns `true` if the endpoint was
    /// already known (and thus replaced), `false` if it is new.
    pub fn update_agent(&self, agent: AgentInfo) -> bool {
        let mut snapshot = self.snapshot.lock();
        snapshot
            .resources
            .insert(agent.endpoint.clone(), agent)
            .is_some()
    }

    /// Scale-up pass (§4.3): prioritize pending jobs, build per-job cells
    /// capped at `2 * pending_pods`, run feasibility against every agent,
    /// then score and pair candidates with pod-ids in ascending-load order.
    pub fn schedule_scale_up(&self, jobs: &[JobInfo]) -> Vec<ScheduleInfo> {
        let snapshot = self.snapshot.lock();

        let mut ordered: Vec<&JobInfo> = jobs.iter().collect();
        ordered.sort_by_key(|job| Reverse(job.desc.priority));

        let mut cells: Vec<ScaleUpCell> = ordered
            .iter()
            .filter_map(|job| {
                let pod_ids: Vec<PodId> = job
                    .pods
                    .iter()
                    .filter(|p| p.endpoint.is_none())
                    .map(|p| p.pod_id.clone())
                    .collect();
                if pod_ids.is_empty() {
                    return None;
                }
                Some(ScaleUpCell {
                    job_id: &job.job_id,
                    job_type: job.desc.job_type,
                    requirement: job.desc.pod.aggregate_requirement(),
                    feasible_limit: self.config.feasibility_factor * pod_ids.len(),
                    pod_ids,
                    candidates: Vec::new(),
                })
            })
            .collect();

        let total_feasible_limit: usize = cells.iter().map(|c| c.feasible_limit).sum();
        let mut cur_feasible_count = 0usize;

        'agents: for agent in snapshot.resources.values() {
            for cell in &mut cells {
                if cell.candidates.len() >= cell.feasible_limit {
                    continue;
                }
                if is_feasible(agent, cell.job_type, &cell.requirement) {
                    cell.candidates.push(agent.endpoint.clone());
                    cur_feasible_count += 1;
                }
            }
            if cur_feasible_count >= total_feasible_limit {
                break 'agents;
            }
        }

        let mut proposals = Vec::new();
        for cell in cells {
            let mut scored: Vec<(f64, Endpoint)> = cell
                .candidates
                .into_iter()
                .filter_map(|endpoint| {
                    snapshot
                        .resources
                        .get(&endpoint)
                        .map(|agent| (load(agent, &self.config), endpoint))
                })
                .collect();
            scored.sort_by(|a, b| a.0.total_cmp(&b.0));

            for (pod_id, (_, endpoint)) in cell.pod_ids.into_iter().zip(scored) {
                proposals.push(ScheduleInfo {
                    endpoint,
                    pod_id,
                    job_id: cell.job_id.clone(),
                    action: ScheduleAction::Launch,
                });
            }
        }
        proposals
    }

    /// Scale-down pass (§4.4): propose terminating the highest-loaded pods
    /// first, up to `pods_size - replica` per job.
    pub fn schedule_scale_down(&self, jobs: &[JobInfo]) -> Vec<ScheduleInfo> {
        let snapshot = self.snapshot.lock();
        let mut proposals = Vec::new();

        for job in jobs {
            let pods_size = job.pods_size();
            let replica = usize::try_from(job.desc.replica.max(0)).unwrap_or(0);
            if pods_size <= replica {
                continue;
            }
            let scale_down_count = pods_size - replica;

            let mut scored: Vec<(f64, Endpoint, PodId)> = Vec::new();
            for pod_ref in &job.pods {
                let Some(endpoint) = &pod_ref.endpoint else {
                    tracing::info!(pod_id = %pod_ref.pod_id, "skipping scale-down candidate with no known endpoint");
                    continue;
                };
                if let Some(agent) = snapshot.resources.get(endpoint) {
                    scored.push((-load(agent, &self.config), endpoint.clone(), pod_ref.pod_id.clone()));
                } else {
                    tracing::info!(pod_id = %pod_ref.pod_id, %endpoint, "dropping scale-down candidate: endpoint not in resource snapshot");
                }
            }
            scored.sort_by(|a, b| a.0.total_cmp(&b.0));

            for (_, endpoint, pod_id) in scored.into_iter().take(scale_down_count) {
                proposals.push(ScheduleInfo {
                    endpoint,
                    pod_id,
                    job_id: job.job_id.clone(),
                    action: ScheduleAction::Terminate,
                });
            }
        }
        proposals
    }

    /// Overload-preemption pass (§4.5): debounce on consecutive overloaded
    /// turns, then preempt at most one best-effort pod per overloaded agent.
    pub fn schedule_agent_overload(&self) -> Vec<ScheduleInfo> {
        let snapshot = self.snapshot.lock();
        let mut history = self.history.lock();
        let mut proposals = Vec::new();

        for agent in snapshot.resources.values() {
            if !is_overloaded(agent, self.config.cpu_overload_threshold) {
                history.clean(&agent.endpoint);
                continue;
            }

            let turns = history.push(&agent.endpoint);
            if turns <= self.config.agent_overload_turns_threshold {
                continue;
            }

            let usage_ratio = f64::from(agent.used.millicores) / f64::from(agent.total.millicores);
            let cpu_to_be_free = (usage_ratio - self.config.cpu_overload_threshold) * f64::from(agent.total.millicores);
            if cpu_to_be_free <= 0.0 {
                continue;
            }

            let mut candidates: Vec<(i32, JobId, PodId)> = agent
                .pods
                .iter()
                .filter_map(|pod| {
                    let overview = snapshot.job_overview.get(&pod.job_id)?;
                    (overview.job_type == JobType::Batch)
                        .then(|| (pod.resource_used.millicores, pod.job_id.clone(), pod.pod_id.clone()))
                })
                .collect();
            candidates.sort_by_key(|(cpu_used, _, _)| *cpu_used);

            if let Some((_, job_id, pod_id)) = candidates
                .into_iter()
                .find(|(cpu_used, _, _)| f64::from(*cpu_used) > cpu_to_be_free)
            {
                proposals.push(ScheduleInfo {
                    endpoint: agent.endpoint.clone(),
                    pod_id,
                    job_id,
                    action: ScheduleAction::Terminate,
                });
            }
        }
        proposals
    }
}
