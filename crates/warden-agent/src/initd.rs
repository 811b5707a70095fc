//! Initd handler (C5): async RPC stub to the per-pod supervisor, with a
//! single atomic `status` state machine.

use std::path::Path;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use crate::config::AgentConfig;
use crate::error::Result;
use crate::launcher::ProcessLauncher;

/// Lower bound (inclusive) of the port range initd is launched on.
pub const PORT_RANGE_START: u16 = 5000;
/// Upper bound (exclusive) of the port range initd is launched on.
pub const PORT_RANGE_END: u16 = 8000;

/// Status has never been observed healthy.
pub const STATUS_UNKNOWN: i32 = -1;
/// Status observed healthy at least once.
pub const STATUS_HEALTHY: i32 = 0;

/// Client for a single pod's initd supervisor.
///
/// `status` is a monotonic health promotion: once a heartbeat succeeds, the
/// handler reports healthy forever after, regardless of later heartbeat
/// failures, matching the "leave `status_` unchanged on failure" contract
/// in §4.7. Concurrent readers observe it through an atomic cell rather
/// than a lock.
pub struct InitdHandler {
    port: u16,
    status: Arc<AtomicI32>,
    http: reqwest::Client,
    timeout: Duration,
}

impl InitdHandler {
    /// Pick a random port in `[5000, 8000)` and set status to unknown.
    /// Does not launch initd; call `create` to do that.
    #[must_use]
    pub fn new(config: &AgentConfig) -> Self {
        let port = rand::thread_rng().gen_range(PORT_RANGE_START..PORT_RANGE_END);
        Self {
            port,
            status: Arc::new(AtomicI32::new(STATUS_UNKNOWN)),
            http: reqwest::Client::new(),
            timeout: Duration::from_millis(config.agent_rpc_initd_timeout_ms),
        }
    }

    /// The port initd was assigned.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Fork initd via `launcher`, with command `sh -c "<initd_bin>
    /// --port=<port>"` and cwd `work_dir`. Returns `Ok(())` on successful
    /// fork.
    ///
    /// # Errors
    ///
    /// Returns an error if the launcher fails to spawn the process.
    pub fn create(
        &self,
        launcher: &dyn ProcessLauncher,
        initd_bin: &str,
        work_dir: &Path,
    ) -> Result<()> {
        let command = format!("{initd_bin} --port={}", self.port);
        launcher.launch(work_dir, &command)
    }

    /// Send an async `HeartBeat` RPC to `localhost:<port>` and update
    /// `status` on success; on failure or timeout, leave it unchanged.
    /// Returns immediately with the status observed *before* this call's
    /// result lands — the caller is meant to poll, not await settlement.
    #[must_use]
    pub fn poll_status(&self) -> i32 {
        let status = Arc::clone(&self.status);
        let url = format!("http://127.0.0.1:{}/heartbeat", self.port);
        let client = self.http.clone();
        let timeout = self.timeout;

        tokio::spawn(async move {
            let result = client.get(&url).timeout(timeout).send().await;
            match result {
                Ok(response) if response.status().is_success() => {
                    status.store(STATUS_HEALTHY, Ordering::SeqCst);
                }
                Ok(_) | Err(_) => {
                    // RPC failure or non-2xx: monotonic health means we
                    // never regress an already-healthy status.
                }
            }
        });

        self.status.load(Ordering::SeqCst)
    }

    /// Current status without issuing a new heartbeat.
    #[must_use]
    pub fn status(&self) -> i32 {
        self.status.load(Ordering::SeqCst)
    }

    /// `true` once a heartbeat has ever succeeded.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status() == STATUS_HEALTHY
    }

    /// Force the status cell directly, for tests that need a healthy
    /// handler without standing up a mock heartbeat server.
    #[cfg(test)]
    pub(crate) fn force_status_for_test(&self, value: i32) {
        self.status.store(value, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering as AtomicOrdering;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn new_handler_picks_port_in_range_and_starts_unknown() {
        let handler = InitdHandler::new(&AgentConfig::default());
        assert!(handler.port() >= PORT_RANGE_START && handler.port() < PORT_RANGE_END);
        assert_eq!(handler.status(), STATUS_UNKNOWN);
        assert!(!handler.is_healthy());
    }

    #[tokio::test]
    async fn heartbeat_promotes_status_monotonically() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/heartbeat"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let addr: std::net::SocketAddr = server.uri().trim_start_matches("http://").parse().unwrap();
        let handler = InitdHandler {
            port: addr.port(),
            status: Arc::new(AtomicI32::new(STATUS_UNKNOWN)),
            http: reqwest::Client::new(),
            timeout: Duration::from_millis(500),
        };

        let _ = handler.poll_status();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(handler.status.load(AtomicOrdering::SeqCst), STATUS_HEALTHY);
    }
}
