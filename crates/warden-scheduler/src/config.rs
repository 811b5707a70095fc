//! Scheduler configuration: the constants from §6, overridable via
//! environment variables the way `SchedulerConfig::from_env` does for the
//! Kubernetes scheduler this crate is descended from.

/// Tunables for the placement engine.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    /// How many candidate agents a scale-up cell collects per pending pod
    /// before scoring (§4.3 step 2).
    pub feasibility_factor: usize,
    /// CPU weight in the load score.
    pub cpu_used_factor: f64,
    /// CPU usage ratio above which an agent is considered overloaded.
    pub cpu_overload_threshold: f64,
    /// Consecutive overloaded turns required before preemption is proposed.
    pub agent_overload_turns_threshold: u32,
    /// Memory weight in the load score.
    pub mem_used_factor: f64,
    /// Pod-count weight in the load score.
    pub prod_count_factor: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            feasibility_factor: 2,
            cpu_used_factor: crate::load::CPU_USED_FACTOR,
            cpu_overload_threshold: crate::load::CPU_OVERLOAD_THRESHOLD,
            agent_overload_turns_threshold: crate::load::AGENT_OVERLOAD_TURNS_THRESHOLD,
            mem_used_factor: crate::load::MEM_USED_FACTOR,
            prod_count_factor: crate::load::PROD_COUNT_FACTOR,
        }
    }
}

impl SchedulerConfig {
    /// Load configuration from the environment, falling back to spec
    /// defaults for any variable that is unset or fails to parse.
    #[must_use]
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            feasibility_factor: env_parse("SCHEDULER_FEASIBILITY_FACTOR", default.feasibility_factor),
            cpu_used_factor: env_parse("SCHEDULER_CPU_USED_FACTOR", default.cpu_used_factor),
            cpu_overload_threshold: env_parse(
                "SCHEDULER_CPU_OVERLOAD_THRESHOLD",
                default.cpu_overload_threshold,
            ),
            agent_overload_turns_threshold: env_parse(
                "SCHEDULER_AGENT_OVERLOAD_TURNS_THRESHOLD",
                default.agent_overload_turns_threshold,
            ),
            mem_used_factor: env_parse("SCHEDULER_MEM_USED_FACTOR", default.mem_used_factor),
            prod_count_factor: env_parse("SCHEDULER_PROD_COUNT_FACTOR", default.prod_count_factor),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_spec_constants() {
        let config = SchedulerConfig::default();
        assert_eq!(config.feasibility_factor, 2);
        assert!((config.cpu_overload_threshold - 0.9).abs() < f64::EPSILON);
        assert_eq!(config.agent_overload_turns_threshold, 3);
    }
}
