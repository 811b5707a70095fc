//! Pod manager (C6): accepts pods, forks initd, tracks per-pod state, and
//! periodically advances that state via the initd handler and a task
//! manager facade.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use warden_core::{CoreError, PodDescriptor, TaskDescriptor};

use crate::config::AgentConfig;
use crate::error::{AgentError, Result};
use crate::initd::InitdHandler;
use crate::launcher::ProcessLauncher;
use crate::types::{is_valid_transition, PodInfo, PodState};

/// Context passed to the task manager for a single task-creation call.
pub struct CreateTaskRequest<'a> {
    /// The task being created.
    pub task: &'a TaskDescriptor,
    /// Port the pod's initd is listening on.
    pub initd_port: u16,
    /// Identifier of the owning pod.
    pub pod_id: &'a str,
}

/// Facade over task creation inside initd; the detail of what happens on
/// the other side is out of scope for this crate.
#[async_trait]
pub trait TaskManager: Send + Sync {
    /// Create one task, returning its task id on success.
    async fn create_task(&self, request: CreateTaskRequest<'_>) -> Result<String>;
}

/// A task manager that always succeeds, for tests that only need the
/// `Pending -> Deploy` transition to happen.
#[derive(Debug, Default)]
pub struct NoopTaskManager;

#[async_trait]
impl TaskManager for NoopTaskManager {
    async fn create_task(&self, request: CreateTaskRequest<'_>) -> Result<String> {
        Ok(format!("{}-task-{}", request.pod_id, request.initd_port))
    }
}

/// A task manager that fails every call, for the "first failure stops
/// iteration" test.
#[derive(Debug, Default)]
pub struct FailingTaskManager;

#[async_trait]
impl TaskManager for FailingTaskManager {
    async fn create_task(&self, _request: CreateTaskRequest<'_>) -> Result<String> {
        Err(AgentError::ProcessLaunchFailure("task creation always fails in this double".into()))
    }
}

/// Accepts pods, forks initd, and tracks per-pod lifecycle.
///
/// `infos` and `handlers` are independent mutexes (§5): a lookup into one
/// can proceed while the other is held. Whenever both are needed, the lock
/// order is `infos` before `handlers`.
pub struct PodManager {
    infos: Mutex<HashMap<String, PodInfo>>,
    handlers: Mutex<HashMap<String, Arc<InitdHandler>>>,
    launcher: Arc<dyn ProcessLauncher>,
    config: AgentConfig,
}

impl PodManager {
    /// Build a pod manager with the given launcher and configuration.
    #[must_use]
    pub fn new(launcher: Arc<dyn ProcessLauncher>, config: AgentConfig) -> Self {
        Self {
            infos: Mutex::new(HashMap::new()),
            handlers: Mutex::new(HashMap::new()),
            launcher,
            config,
        }
    }

    /// Accept a pod descriptor, create its work directory, fork initd, and
    /// record `PodInfo{state: Pending}`. Idempotent on `pod_id`: a second
    /// call for the same id is a no-op that returns the existing record.
    ///
    /// # Errors
    ///
    /// Returns an error if forking initd fails.
    pub fn run(&self, pod_id: &str, desc: PodDescriptor) -> Result<()> {
        let infos = self.infos.lock();
        if infos.contains_key(pod_id) {
            return Ok(());
        }
        drop(infos);

        let handler = Arc::new(InitdHandler::new(&self.config));
        let work_dir = PathBuf::from(&self.config.gce_work_dir).join(pod_id);

        if let Err(e) = handler.create(self.launcher.as_ref(), &self.config.agent_initd_bin, &work_dir) {
            tracing::warn!(pod_id, error = %e, "failed to fork initd");
            return Err(e);
        }

        let mut infos = self.infos.lock();
        infos.entry(pod_id.to_string()).or_insert(PodInfo {
            pod_id: pod_id.to_string(),
            desc,
            port: handler.port(),
            state: PodState::Pending,
            tasks_id: Vec::new(),
        });
        drop(infos);

        self.handlers
            .lock()
            .entry(pod_id.to_string())
            .or_insert(handler);

        tracing::info!(pod_id, "pod accepted");
        Ok(())
    }

    /// Reserved for a terminate operation; currently a stub.
    pub fn kill(&self, _pod_id: &str) {}

    /// Snapshot a pod's current info.
    ///
    /// # Errors
    ///
    /// Returns an error if `pod_id` is not known.
    pub fn query(&self, pod_id: &str) -> Result<PodInfo> {
        self.infos
            .lock()
            .get(pod_id)
            .cloned()
            .ok_or_else(|| AgentError::Core(CoreError::PodNotFound(pod_id.into())))
    }

    /// List every known pod id.
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        self.infos.lock().keys().cloned().collect()
    }

    /// Run one tick of the background monitor loop: for each known pod,
    /// poll its handler and advance `Pending -> Deploy` once initd is
    /// healthy and every task has been created.
    pub async fn tick(&self, task_manager: &dyn TaskManager) {
        let pod_ids = self.list();
        for pod_id in pod_ids {
            self.tick_one(&pod_id, task_manager).await;
        }
    }

    /// Move `info` to `to`, consulting the state machine (§4.6). A
    /// same-state write (the unhealthy no-op case) is always permitted;
    /// anything else must be a transition `is_valid_transition` allows.
    fn assign_state(info: &mut PodInfo, to: PodState) {
        if info.state == to || is_valid_transition(info.state, to) {
            info.state = to;
        } else {
            tracing::warn!(
                pod_id = %info.pod_id,
                from = ?info.state,
                to = ?to,
                "ignoring invalid pod state transition"
            );
        }
    }

    async fn tick_one(&self, pod_id: &str, task_manager: &dyn TaskManager) {
        let Some(handler) = self.handlers.lock().get(pod_id).cloned() else {
            return;
        };

        let status = handler.poll_status();
        if status != crate::initd::STATUS_HEALTHY {
            let mut infos = self.infos.lock();
            if let Some(info) = infos.get_mut(pod_id) {
                Self::assign_state(info, PodState::Pending);
            }
            return;
        }

        let should_create_tasks = matches!(
            self.infos.lock().get(pod_id).map(|i| i.state),
            Some(PodState::Pending)
        );
        if !should_create_tasks {
            return;
        }

        let tasks = match self.infos.lock().get(pod_id) {
            Some(info) => info.desc.tasks.clone(),
            None => return,
        };

        let mut created = Vec::new();
        let mut failed = false;
        for task in &tasks {
            let request = CreateTaskRequest {
                task,
                initd_port: handler.port(),
                pod_id,
            };
            match task_manager.create_task(request).await {
                Ok(task_id) => created.push(task_id),
                Err(e) => {
                    tracing::warn!(pod_id, error = %e, "task creation failed, stopping iteration for this pod");
                    failed = true;
                    break;
                }
            }
        }

        let mut infos = self.infos.lock();
        if let Some(info) = infos.get_mut(pod_id) {
            info.tasks_id.extend(created);
            if !failed {
                Self::assign_state(info, PodState::Deploy);
            }
        }
    }
}

/// Spawn the background monitor loop, ticking once per second forever, as
/// `main.rs` does for the placement engine's own reconciler.
pub fn spawn_monitor_loop(
    manager: Arc<PodManager>,
    task_manager: Arc<dyn TaskManager>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        loop {
            interval.tick().await;
            manager.tick(task_manager.as_ref()).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launcher::mock::MockProcessLauncher;
    use warden_core::{Resource, TaskDescriptor};

    fn pod_with_tasks(n: usize) -> PodDescriptor {
        PodDescriptor {
            tasks: (0..n)
                .map(|_| TaskDescriptor {
                    requirement: Resource::default(),
                    launch_command: "true".into(),
                })
                .collect(),
        }
    }

    fn manager() -> PodManager {
        PodManager::new(Arc::new(MockProcessLauncher::new()), AgentConfig::default())
    }

    #[test]
    fn run_is_idempotent() {
        let manager = manager();
        manager.run("pod-1", pod_with_tasks(1)).unwrap();
        manager.run("pod-1", pod_with_tasks(1)).unwrap();
        assert_eq!(manager.list(), vec!["pod-1".to_string()]);
        assert_eq!(manager.handlers.lock().len(), 1);
    }

    #[test]
    fn run_starts_pod_pending() {
        let manager = manager();
        manager.run("pod-1", pod_with_tasks(2)).unwrap();
        let info = manager.query("pod-1").unwrap();
        assert_eq!(info.state, PodState::Pending);
        assert!(info.tasks_id.is_empty());
    }

    #[test]
    fn query_unknown_pod_fails() {
        let manager = manager();
        assert!(manager.query("ghost").is_err());
    }

    #[tokio::test]
    async fn s6_unhealthy_initd_keeps_pod_pending() {
        let manager = manager();
        manager.run("pod-1", pod_with_tasks(2)).unwrap();
        // handler's heartbeat never succeeds in this test (no mock server),
        // so status stays unknown and the pod must remain Pending.
        manager.tick(&NoopTaskManager).await;
        assert_eq!(manager.query("pod-1").unwrap().state, PodState::Pending);
        assert!(manager.query("pod-1").unwrap().tasks_id.is_empty());
    }

    #[tokio::test]
    async fn failing_task_manager_stops_at_first_failure() {
        let manager = manager();
        manager.run("pod-1", pod_with_tasks(2)).unwrap();

        {
            let handlers = manager.handlers.lock();
            let handler = handlers.get("pod-1").unwrap();
            handler.force_status_for_test(crate::initd::STATUS_HEALTHY);
        }

        manager.tick(&FailingTaskManager).await;
        let info = manager.query("pod-1").unwrap();
        assert_eq!(info.state, PodState::Pending);
        assert!(info.tasks_id.is_empty());
    }
}
