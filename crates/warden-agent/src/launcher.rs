//! Process launcher (C7): prepares a pod's working directory and stdio,
//! then hands off to a detached child process.
//!
//! The source models this as `fork()` + `execve()` with careful fd
//! hygiene. `std::process::Command` gives the same guarantee without raw
//! syscalls: a spawned child only inherits the three descriptors `Command`
//! wires up (stdin/stdout/stderr) plus whatever the platform reserves, so
//! the "close every other inherited fd" step falls out of using it instead
//! of raw `fork`.

use std::fs::File;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{AgentError, Result};

/// Abstract child-process capability, so `InitdHandler`/`PodManager` tests
/// can run without touching the filesystem or spawning a real shell.
pub trait ProcessLauncher: Send + Sync {
    /// Launch `command` via `sh -c` with `work_dir` as its cwd, stdout and
    /// stderr redirected to files under `work_dir`, and an empty
    /// environment. Returns `Ok(())` on a successful fork; the caller does
    /// not wait for the child.
    ///
    /// # Errors
    ///
    /// Returns an error if `work_dir` or its stdio files cannot be created,
    /// or if spawning the child process fails.
    fn launch(&self, work_dir: &Path, command: &str) -> Result<()>;
}

/// Launches children via `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealProcessLauncher;

impl ProcessLauncher for RealProcessLauncher {
    fn launch(&self, work_dir: &Path, command: &str) -> Result<()> {
        std::fs::create_dir_all(work_dir)?;

        let stdout = File::create(work_dir.join("stdout"))
            .map_err(|e| AgentError::ProcessLaunchFailure(format!("open stdout: {e}")))?;
        let stderr = File::create(work_dir.join("stderr"))
            .map_err(|e| AgentError::ProcessLaunchFailure(format!("open stderr: {e}")))?;

        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .current_dir(work_dir)
            .env_clear()
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .process_group(0);

        cmd.spawn()
            .map(|_child| ())
            .map_err(|e| AgentError::ProcessLaunchFailure(format!("spawn: {e}")))
    }
}

/// Test doubles for [`ProcessLauncher`].
#[cfg(test)]
pub mod mock {
    use super::{ProcessLauncher, Result};
    use parking_lot::Mutex;
    use std::path::{Path, PathBuf};

    /// Records every launch request instead of spawning a real process.
    #[derive(Debug, Default)]
    pub struct MockProcessLauncher {
        launches: Mutex<Vec<(PathBuf, String)>>,
    }

    impl MockProcessLauncher {
        /// Build an empty recorder.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of launches recorded so far.
        #[must_use]
        pub fn launch_count(&self) -> usize {
            self.launches.lock().len()
        }
    }

    impl ProcessLauncher for MockProcessLauncher {
        fn launch(&self, work_dir: &Path, command: &str) -> Result<()> {
            self.launches
                .lock()
                .push((work_dir.to_path_buf(), command.to_string()));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockProcessLauncher;
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn real_launcher_creates_work_dir_and_stdio_files() {
        let dir = tempdir().unwrap();
        let work_dir = dir.path().join("pod-1");
        let launcher = RealProcessLauncher;
        launcher.launch(&work_dir, "true").unwrap();
        assert!(work_dir.join("stdout").exists());
        assert!(work_dir.join("stderr").exists());
    }

    #[test]
    fn mock_launcher_records_without_touching_disk() {
        let launcher = MockProcessLauncher::new();
        launcher
            .launch(Path::new("/tmp/does-not-exist"), "sh -c true")
            .unwrap();
        assert_eq!(launcher.launch_count(), 1);
    }
}
