//! Agent configuration (§6 flags), loaded from the environment the way
//! `SchedulerConfig::from_env` does for the placement engine.

/// Tunables for the pod manager and process launcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    /// Root directory under which per-pod work directories are created.
    pub gce_work_dir: String,
    /// Path to the initd executable.
    pub agent_initd_bin: String,
    /// RPC deadline for heartbeat calls, in milliseconds.
    pub agent_rpc_initd_timeout_ms: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            gce_work_dir: "/tmp/warden-agent".to_string(),
            agent_initd_bin: "/usr/local/bin/initd".to_string(),
            agent_rpc_initd_timeout_ms: 1000,
        }
    }
}

impl AgentConfig {
    /// Load configuration from the environment, falling back to defaults
    /// for any variable that is unset.
    #[must_use]
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            gce_work_dir: std::env::var("GCE_WORK_DIR").unwrap_or(default.gce_work_dir),
            agent_initd_bin: std::env::var("AGENT_INITD_BIN").unwrap_or(default.agent_initd_bin),
            agent_rpc_initd_timeout_ms: std::env::var("AGENT_RPC_INITD_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.agent_rpc_initd_timeout_ms),
        }
    }
}
