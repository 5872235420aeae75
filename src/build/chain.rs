// src/build/chain.rs

use tracing::{error, info};

use crate::build::{is_replayable_phase, BuildInvoker, BuildStep, DefaultPhase, RecordedStep};
use crate::errors::{DevloopError, Result};

/// A step that failed during [`BuildStepChain::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub step: String,
    pub message: String,
}

/// Outcome of one chain run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainReport {
    /// Number of steps executed (successful or not).
    pub executed: usize,
    pub failures: Vec<StepFailure>,
}

impl ChainReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Ordered rebuild actions run before each restart.
///
/// Built once at startup and never mutated. A failing step does not stop
/// the chain: the remaining steps still run and the loop restarts with
/// whatever output resulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStepChain {
    steps: Vec<BuildStep>,
    recorded: Vec<RecordedStep>,
}

impl BuildStepChain {
    /// Compile, then copy resources.
    pub fn defaults() -> Self {
        Self {
            steps: vec![BuildStep::Compile, BuildStep::CopyResources],
            recorded: Vec::new(),
        }
    }

    /// Replay the recorded steps whose phase is replayable, in recording
    /// order. Falls back to [`BuildStepChain::defaults`] when nothing usable
    /// was recorded.
    pub fn from_recording(recorded: Option<Vec<RecordedStep>>) -> Self {
        let recorded: Vec<RecordedStep> = recorded
            .unwrap_or_default()
            .into_iter()
            .filter(|s| is_replayable_phase(&s.phase))
            .collect();

        if recorded.is_empty() {
            info!("no recorded build steps; rebuilding with compile + copy-resources");
            return Self::defaults();
        }

        let steps = (0..recorded.len()).map(BuildStep::ReplayRecorded).collect();
        Self { steps, recorded }
    }

    pub fn steps(&self) -> &[BuildStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Human-readable name of a step in this chain.
    pub fn step_name(&self, step: BuildStep) -> String {
        match step {
            BuildStep::Compile => DefaultPhase::Compile.to_string(),
            BuildStep::CopyResources => DefaultPhase::CopyResources.to_string(),
            BuildStep::ReplayRecorded(idx) => match self.recorded.get(idx) {
                Some(rec) => rec.label(),
                None => format!("recorded step #{idx}"),
            },
        }
    }

    /// Execute a single step.
    pub async fn execute<I: BuildInvoker>(&self, step: BuildStep, invoker: &mut I) -> Result<()> {
        match step {
            BuildStep::Compile => invoker.invoke_phase(DefaultPhase::Compile).await,
            BuildStep::CopyResources => invoker.invoke_phase(DefaultPhase::CopyResources).await,
            BuildStep::ReplayRecorded(idx) => {
                let rec = self.recorded.get(idx).ok_or_else(|| DevloopError::BuildStep {
                    step: format!("recorded step #{idx}"),
                    message: "no such recorded step".to_string(),
                })?;
                info!(
                    ">>> {}:{} ({}) @{}",
                    rec.plugin, rec.goal, rec.execution_id, rec.phase
                );
                invoker.replay(rec).await
            }
        }
    }

    /// Run every step in order, logging and collecting failures.
    pub async fn run<I: BuildInvoker>(&self, invoker: &mut I) -> ChainReport {
        let mut report = ChainReport::default();

        for &step in &self.steps {
            let name = self.step_name(step);
            report.executed += 1;

            if let Err(err) = self.execute(step, invoker).await {
                error!(step = %name, error = %err, "build step failed; continuing");
                report.failures.push(StepFailure {
                    step: name,
                    message: err.to_string(),
                });
            }
        }

        if report.is_success() {
            info!(steps = report.executed, "rebuild finished");
        } else {
            error!(
                steps = report.executed,
                failed = report.failures.len(),
                "rebuild finished with failures"
            );
        }

        report
    }
}
