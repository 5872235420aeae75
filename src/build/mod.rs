// src/build/mod.rs

//! Rebuild steps executed before every restart.
//!
//! - [`chain`] holds the ordered [`BuildStepChain`] and its continue-on-error
//!   policy.
//! - [`invoker`] abstracts how a step actually runs ([`BuildInvoker`]) and
//!   provides the command-based implementation.
//! - [`recorder`] observes the initial build and captures the replay list.
//! - [`initial`] runs the initial build at startup.

use std::fmt;

use serde::Deserialize;

use crate::config::StepConfig;

pub mod chain;
pub mod initial;
pub mod invoker;
pub mod recorder;

pub use chain::{BuildStepChain, ChainReport, StepFailure};
pub use initial::{compile_if_needed, initial_build};
pub use invoker::{BuildInvoker, CommandInvoker};
pub use recorder::{BuildEventBus, BuildListener, LogListener, StepRecorder};

/// Lifecycle phases whose recorded steps may be replayed on redeploy.
///
/// Packaging, testing, installing etc. are deliberately absent.
pub const REPLAY_PHASES: &[&str] = &[
    "generate-sources",
    "process-sources",
    "generate-resources",
    "process-resources",
    "compile",
    "process-classes",
];

/// Whether steps bound to `phase` are safe to replay.
pub fn is_replayable_phase(phase: &str) -> bool {
    REPLAY_PHASES.contains(&phase.trim())
}

/// The two phases used when nothing was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefaultPhase {
    Compile,
    CopyResources,
}

impl fmt::Display for DefaultPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultPhase::Compile => f.write_str("compile"),
            DefaultPhase::CopyResources => f.write_str("copy-resources"),
        }
    }
}

/// One build-tool invocation observed during the initial build.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecordedStep {
    /// Artifact id of the plugin, e.g. `maven-compiler-plugin`.
    pub plugin: String,
    pub goal: String,
    pub execution_id: String,
    pub phase: String,
    /// argv that re-runs this step.
    pub command: Vec<String>,
}

impl RecordedStep {
    /// Two recordings denote the same invocation when plugin and execution
    /// id agree.
    pub fn same_invocation(&self, other: &RecordedStep) -> bool {
        self.plugin == other.plugin && self.execution_id == other.execution_id
    }

    pub fn label(&self) -> String {
        format!("{}:{} ({})", self.plugin, self.goal, self.execution_id)
    }
}

impl From<&StepConfig> for RecordedStep {
    fn from(cfg: &StepConfig) -> Self {
        Self {
            plugin: cfg.plugin.clone(),
            goal: cfg.goal.clone(),
            execution_id: cfg.execution_id.clone(),
            phase: cfg.phase.clone(),
            command: cfg.command.clone(),
        }
    }
}

/// A single rebuild action.
///
/// `ReplayRecorded` indexes into the chain's recorded steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStep {
    Compile,
    CopyResources,
    ReplayRecorded(usize),
}
