// src/engine/runtime.rs

use std::fmt;

use tracing::{debug, error, info, warn};

use crate::build::{BuildInvoker, BuildStepChain};
use crate::errors::Result;
use crate::exec::ProcessBackend;
use crate::launch::LaunchCommand;
use crate::watch::ChangeSource;

use super::core::{decide, LoopDecision, Observation};
use super::{LoopExit, LoopOptions, LoopSummary, RedeployState, ShutdownSignal};

/// Produces the launch command. Called before every start, so conf files
/// converted on the way are refreshed on each restart.
pub type CommandFactory = Box<dyn FnMut() -> Result<LaunchCommand> + Send>;

/// Keeps the application running and redeploys it when sources change.
///
/// This is the IO shell around [`decide`]: it starts and stops processes
/// through a [`ProcessBackend`], polls a [`ChangeSource`], and rebuilds with
/// a [`BuildStepChain`] driven by a [`BuildInvoker`].
pub struct RedeployLoop<P: ProcessBackend, D: ChangeSource, I: BuildInvoker> {
    backend: P,
    detector: Option<D>,
    invoker: I,
    chain: BuildStepChain,
    command: CommandFactory,
    last_command: Option<LaunchCommand>,
    options: LoopOptions,
    state: RedeployState<P::Handle>,
}

impl<P: ProcessBackend, D: ChangeSource, I: BuildInvoker> fmt::Debug for RedeployLoop<P, D, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedeployLoop")
            .field("chain", &self.chain)
            .field("last_command", &self.last_command)
            .field("options", &self.options)
            .field("restarts", &self.state.restarts)
            .finish_non_exhaustive()
    }
}

impl<P: ProcessBackend, D: ChangeSource, I: BuildInvoker> RedeployLoop<P, D, I> {
    /// `detector` may be `None` when redeploy is disabled. `command` is
    /// re-evaluated before each start.
    pub fn new<F>(
        backend: P,
        detector: Option<D>,
        invoker: I,
        chain: BuildStepChain,
        command: F,
        options: LoopOptions,
        shutdown: ShutdownSignal,
    ) -> Self
    where
        F: FnMut() -> Result<LaunchCommand> + Send + 'static,
    {
        Self {
            backend,
            detector,
            invoker,
            chain,
            command: Box::new(command),
            last_command: None,
            options,
            state: RedeployState::new(shutdown),
        }
    }

    /// Run until the application exits on its own or shutdown is requested.
    ///
    /// - A failed application start, including a launch command that can no
    ///   longer be computed, is returned as an error.
    /// - A detector failure stops the application, then is returned.
    /// - Build step failures are logged and the application is restarted
    ///   anyway.
    pub async fn run(mut self) -> Result<LoopSummary> {
        info!(
            redeploy = self.options.redeploy_enabled,
            steps = self.chain.len(),
            "devloop started"
        );

        self.start_process().await?;

        let summary = loop {
            let alive = match self.state.process.as_mut() {
                Some(handle) => self.backend.is_alive(handle),
                None => false,
            };
            let stop_requested = self.state.stop_requested.is_requested();

            let changed = if alive && !stop_requested && self.options.redeploy_enabled {
                match self.poll_changes() {
                    Ok(changed) => changed,
                    Err(err) => {
                        error!(error = %err, "change detection failed; stopping application");
                        self.stop_process().await;
                        self.close_detector();
                        return Err(err);
                    }
                }
            } else {
                false
            };

            let decision = decide(Observation {
                alive,
                stop_requested,
                redeploy_enabled: self.options.redeploy_enabled,
                changed,
            });

            match decision {
                LoopDecision::Exit => {
                    let code = self
                        .state
                        .process
                        .as_ref()
                        .and_then(|handle| self.backend.exit_code(handle));
                    info!(exit_code = ?code, "application exited; not restarting");
                    self.state.process = None;
                    break LoopSummary {
                        restarts: self.state.restarts,
                        exit: LoopExit::ProcessExited(code),
                    };
                }
                LoopDecision::ShutDown => {
                    info!("shutdown requested; stopping application");
                    self.stop_process().await;
                    break LoopSummary {
                        restarts: self.state.restarts,
                        exit: LoopExit::ShutdownRequested,
                    };
                }
                LoopDecision::Rebuild => {
                    if let Err(err) = self.redeploy().await {
                        self.close_detector();
                        return Err(err);
                    }
                }
                LoopDecision::KeepWatching => {
                    tokio::time::sleep(self.options.scan_period).await;
                }
            }
        };

        self.close_detector();
        info!(restarts = summary.restarts, exit = ?summary.exit, "devloop finished");
        Ok(summary)
    }

    fn poll_changes(&mut self) -> Result<bool> {
        let Some(detector) = self.detector.as_mut() else {
            return Ok(false);
        };
        let changed = detector.poll_for_changes()?;
        debug!(changed, "polled for changes");
        Ok(changed)
    }

    async fn redeploy(&mut self) -> Result<()> {
        info!(restart = self.state.restarts + 1, "change detected; redeploying");

        self.stop_process().await;

        info!(steps = self.chain.len(), "rebuild started");
        let report = self.chain.run(&mut self.invoker).await;
        if !report.is_success() {
            warn!(
                failed = report.failures.len(),
                executed = report.executed,
                "rebuild finished with failures; restarting anyway"
            );
        }

        self.start_process().await?;
        self.state.restarts += 1;
        Ok(())
    }

    /// Start a new instance. Only called when no instance is running.
    async fn start_process(&mut self) -> Result<()> {
        debug_assert!(self.state.process.is_none());

        let command = (self.command)()?;
        if self.last_command.as_ref().is_some_and(|last| *last != command) {
            info!(cmd = %command, "launch command changed");
        }
        let handle = self.backend.start(&command)?;
        self.state.process = Some(handle);
        self.last_command = Some(command);

        if self.options.redeploy_enabled && !self.options.grace_period.is_zero() {
            debug!(grace = ?self.options.grace_period, "waiting for application to settle");
            tokio::time::sleep(self.options.grace_period).await;
        }
        Ok(())
    }

    /// Best-effort stop of the current instance, if any.
    async fn stop_process(&mut self) {
        let Some(mut handle) = self.state.process.take() else {
            return;
        };
        let graceful = self
            .backend
            .stop(&mut handle, self.options.stop_timeout)
            .await;
        if !graceful {
            error!(
                timeout = ?self.options.stop_timeout,
                "application did not stop gracefully and was killed"
            );
        }
    }

    fn close_detector(&mut self) {
        if let Some(detector) = self.detector.as_mut() {
            detector.close();
        }
    }
}
