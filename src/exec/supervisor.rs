// src/exec/supervisor.rs

use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tracing::{debug, error, info, warn};

use crate::errors::{DevloopError, Result};
use crate::launch::LaunchCommand;

/// Lifecycle of a supervised process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    NotStarted,
    Running,
    /// Exited after a graceful stop request.
    Stopped,
    /// Force-killed after the graceful stop timed out.
    Killed,
    /// Exited without being asked to, with its exit code if it had one.
    ExitedNaturally(Option<i32>),
}

/// Spawns application processes.
///
/// Output of the child is inherited so it shows up in the developer's
/// terminal as is.
#[derive(Debug, Default, Clone)]
pub struct ProcessSupervisor;

impl ProcessSupervisor {
    pub fn new() -> Self {
        Self
    }

    /// Spawn `command` and return a handle in the `Running` state.
    pub fn start(&self, command: &LaunchCommand) -> Result<SupervisedProcess> {
        let mut process = SupervisedProcess::new(command.clone());
        process.spawn()?;
        Ok(process)
    }

    /// Non-blocking liveness check; see [`SupervisedProcess::is_alive`].
    pub fn is_alive(&self, process: &mut SupervisedProcess) -> bool {
        process.is_alive()
    }

    /// Graceful-then-forced stop; see [`SupervisedProcess::stop`].
    pub async fn stop(&self, process: &mut SupervisedProcess, timeout: Duration) -> bool {
        process.stop(timeout).await
    }
}

/// One spawned instance of the application.
#[derive(Debug)]
pub struct SupervisedProcess {
    command: LaunchCommand,
    child: Option<Child>,
    state: ProcessState,
}

impl SupervisedProcess {
    pub fn new(command: LaunchCommand) -> Self {
        Self {
            command,
            child: None,
            state: ProcessState::NotStarted,
        }
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn command(&self) -> &LaunchCommand {
        &self.command
    }

    /// OS process id while the child is running.
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().and_then(|c| c.id())
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self.state {
            ProcessState::ExitedNaturally(code) => code,
            _ => None,
        }
    }

    fn spawn(&mut self) -> Result<()> {
        let mut cmd = Command::new(&self.command.program);
        cmd.args(&self.command.args)
            .envs(&self.command.env)
            .current_dir(&self.command.working_dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|source| DevloopError::ProcessLaunch {
            command: self.command.to_string(),
            source,
        })?;

        info!(pid = ?child.id(), cmd = %self.command, "application started");
        self.child = Some(child);
        self.state = ProcessState::Running;
        Ok(())
    }

    /// Whether the process is still running. Never blocks.
    ///
    /// Once the process is seen to have exited, its status is recorded and
    /// every later call returns `false`.
    pub fn is_alive(&mut self) -> bool {
        let Some(child) = self.child.as_mut() else {
            return false;
        };

        match child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                info!(status = %status, "application exited");
                self.child = None;
                self.state = ProcessState::ExitedNaturally(status.code());
                false
            }
            Err(err) => {
                warn!(error = %err, "failed to query application status; treating it as exited");
                self.child = None;
                self.state = ProcessState::ExitedNaturally(None);
                false
            }
        }
    }

    /// Ask the process to terminate, then force-kill it if it is still
    /// running after `timeout`.
    ///
    /// Returns `true` when the process exited after the termination request (or was
    /// already gone), `false` when it had to be killed. In both cases the
    /// process has terminated when this returns.
    pub async fn stop(&mut self, timeout: Duration) -> bool {
        let Some(child) = self.child.as_mut() else {
            return true;
        };

        if let Ok(Some(status)) = child.try_wait() {
            debug!(status = %status, "application already exited before stop");
            self.child = None;
            self.state = ProcessState::ExitedNaturally(status.code());
            return true;
        }

        if request_termination(child) {
            let waited = tokio::time::timeout(timeout, child.wait()).await;
            match waited {
                Ok(Ok(status)) => {
                    info!(status = %status, "application stopped");
                    self.child = None;
                    self.state = ProcessState::Stopped;
                    return true;
                }
                Ok(Err(err)) => {
                    warn!(error = %err, "failed waiting for application to stop");
                }
                Err(_) => {
                    error!(
                        timeout = ?timeout,
                        "application did not stop in time; killing it"
                    );
                }
            }
        }

        if let Err(err) = child.kill().await {
            warn!(error = %err, "failed to kill application process");
        }
        self.child = None;
        self.state = ProcessState::Killed;
        false
    }
}

/// Send the platform's polite termination request.
///
/// Returns `false` when no graceful request could be made, in which case
/// the caller kills the process right away.
#[cfg(unix)]
fn request_termination(child: &Child) -> bool {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let Some(pid) = child.id() else {
        return false;
    };
    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };

    match kill(Pid::from_raw(raw), Signal::SIGTERM) {
        Ok(()) => {
            debug!(pid, "sent SIGTERM to application");
            true
        }
        Err(err) => {
            warn!(pid, error = %err, "failed to send SIGTERM");
            false
        }
    }
}

#[cfg(not(unix))]
fn request_termination(_child: &Child) -> bool {
    false
}
