//! Load scoring and overload history (C3).

use std::collections::HashMap;
use warden_core::{AgentInfo, Endpoint};

use crate::config::SchedulerConfig;

/// CPU weight in the load score.
pub const CPU_USED_FACTOR: f64 = 10.0;
/// Memory weight in the load score.
pub const MEM_USED_FACTOR: f64 = 1.0;
/// Pod-count weight in the load score.
pub const PROD_COUNT_FACTOR: f64 = 32.0;
/// CPU usage ratio above which an agent is considered overloaded.
pub const CPU_OVERLOAD_THRESHOLD: f64 = 0.9;
/// Consecutive overloaded turns required before preemption is proposed.
pub const AGENT_OVERLOAD_TURNS_THRESHOLD: u32 = 3;

/// Scalar load score: lower means less loaded. Combines CPU, memory, and
/// pod-count pressure, each exponentiated so pressure near saturation
/// dominates the score. Weights come from `config` rather than the module
/// constants, so a deployment can retune them via `SchedulerConfig`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn load(agent: &AgentInfo, config: &SchedulerConfig) -> f64 {
    let cpu_load = if agent.total.millicores == 0 {
        0.0
    } else {
        f64::from(agent.used.millicores) * config.cpu_used_factor / f64::from(agent.total.millicores)
    };
    let mem_load = if agent.total.memory == 0 {
        0.0
    } else {
        agent.used.memory as f64 * config.mem_used_factor / agent.total.memory as f64
    };
    let prod_load = agent.pods.len() as f64 / config.prod_count_factor;

    cpu_load.exp() + mem_load.exp() + prod_load.exp()
}

/// Whether an agent's CPU usage exceeds `threshold`. Takes the threshold
/// explicitly (rather than the module constant) so callers always consult
/// `SchedulerConfig::cpu_overload_threshold`, keeping this gate consistent
/// with any deficit math computed from the same configured threshold.
#[must_use]
pub fn is_overloaded(agent: &AgentInfo, threshold: f64) -> bool {
    if agent.total.millicores == 0 {
        return false;
    }
    f64::from(agent.used.millicores) / f64::from(agent.total.millicores) > threshold
}

/// Sliding per-agent counter of consecutive overload observations.
#[derive(Debug, Default)]
pub struct AgentHistory {
    turns: HashMap<Endpoint, u32>,
}

impl AgentHistory {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an overload observation for `endpoint`, returning the new
    /// consecutive count.
    pub fn push(&mut self, endpoint: &Endpoint) -> u32 {
        let count = self.turns.entry(endpoint.clone()).or_insert(0);
        *count += 1;
        *count
    }

    /// Clear the history for an agent that is no longer overloaded.
    pub fn clean(&mut self, endpoint: &Endpoint) {
        self.turns.remove(endpoint);
    }

    /// Current consecutive overload count, or 0 if never observed.
    #[must_use]
    pub fn check(&self, endpoint: &Endpoint) -> u32 {
        self.turns.get(endpoint).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(used_cpu: i32, total_cpu: i32) -> AgentInfo {
        AgentInfo {
            endpoint: Endpoint::from("a1:1"),
            total: warden_core::Resource {
                millicores: total_cpu,
                memory: 2 << 30,
                ..Default::default()
            },
            used: warden_core::Resource {
                millicores: used_cpu,
                memory: 256 << 20,
                ..Default::default()
            },
            free: warden_core::Resource::default(),
            unassigned: warden_core::Resource::default(),
            pods: Vec::new(),
        }
    }

    #[test]
    fn lower_usage_scores_lower() {
        let config = SchedulerConfig::default();
        let light = agent(100, 1000);
        let heavy = agent(800, 1000);
        assert!(load(&light, &config) < load(&heavy, &config));
    }

    #[test]
    fn overload_requires_ratio_above_point_nine() {
        assert!(!is_overloaded(&agent(899, 1000), CPU_OVERLOAD_THRESHOLD));
        assert!(is_overloaded(&agent(901, 1000), CPU_OVERLOAD_THRESHOLD));
    }

    #[test]
    fn overload_threshold_is_configurable() {
        // A 70% threshold should flag usage that the default 90% would not.
        assert!(!is_overloaded(&agent(750, 1000), CPU_OVERLOAD_THRESHOLD));
        assert!(is_overloaded(&agent(750, 1000), 0.7));
    }

    #[test]
    fn history_tracks_consecutive_turns_until_cleaned() {
        let mut history = AgentHistory::new();
        let endpoint = Endpoint::from("a1:1");
        assert_eq!(history.push(&endpoint), 1);
        assert_eq!(history.push(&endpoint), 2);
        assert_eq!(history.check(&endpoint), 2);
        history.clean(&endpoint);
        assert_eq!(history.check(&endpoint), 0);
    }

    #[test]
    fn preemption_fires_only_after_fourth_observation() {
        let mut history = AgentHistory::new();
        let endpoint = Endpoint::from("a1:1");
        for turn in 1..=3 {
            let count = history.push(&endpoint);
            assert!(count <= AGENT_OVERLOAD_TURNS_THRESHOLD, "turn {turn}");
        }
        let fourth = history.push(&endpoint);
        assert!(fourth > AGENT_OVERLOAD_TURNS_THRESHOLD);
    }
}
