// src/build/recorder.rs

//! Observing build steps.
//!
//! The initial build publishes every step it runs on a [`BuildEventBus`].
//! Subscribers are plain [`BuildListener`]s; the [`StepRecorder`] is just one
//! of them and captures the replay list for the redeploy chain.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, error, info};

use crate::build::{is_replayable_phase, RecordedStep};
use crate::errors::DevloopError;

/// Callbacks fired around each build step.
pub trait BuildListener: Send {
    fn on_step_started(&mut self, _step: &RecordedStep) {}
    fn on_step_succeeded(&mut self, _step: &RecordedStep) {}
    fn on_step_failed(&mut self, _step: &RecordedStep, _error: &DevloopError) {}
}

/// Fans build events out to every subscriber, in subscription order.
#[derive(Default)]
pub struct BuildEventBus {
    listeners: Vec<Box<dyn BuildListener>>,
}

impl std::fmt::Debug for BuildEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildEventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl BuildEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Box<dyn BuildListener>) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn step_started(&mut self, step: &RecordedStep) {
        for l in self.listeners.iter_mut() {
            l.on_step_started(step);
        }
    }

    pub fn step_succeeded(&mut self, step: &RecordedStep) {
        for l in self.listeners.iter_mut() {
            l.on_step_succeeded(step);
        }
    }

    pub fn step_failed(&mut self, step: &RecordedStep, error: &DevloopError) {
        for l in self.listeners.iter_mut() {
            l.on_step_failed(step, error);
        }
    }
}

/// Records the steps the build ran in replayable phases.
///
/// Failed steps are kept too: a compile that fails at startup must still be
/// replayed once the sources are fixed.
///
/// Cloning shares the underlying list, so the caller can keep a handle while
/// the bus owns another.
#[derive(Debug, Clone, Default)]
pub struct StepRecorder {
    recorded: Arc<Mutex<Vec<RecordedStep>>>,
}

impl StepRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RecordedStep>> {
        self.recorded.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record `step` unless its phase is not replayable or the same
    /// invocation is already recorded. Returns whether it was added.
    pub fn record(&self, step: &RecordedStep) -> bool {
        if !is_replayable_phase(&step.phase) {
            debug!(step = %step.label(), phase = %step.phase, "not recording step outside replayable phases");
            return false;
        }

        let mut recorded = self.lock();
        if recorded.iter().any(|r| r.same_invocation(step)) {
            return false;
        }
        debug!(step = %step.label(), "recorded build step");
        recorded.push(step.clone());
        true
    }

    /// The replay list, or `None` if nothing was recorded.
    pub fn recording(&self) -> Option<Vec<RecordedStep>> {
        let recorded = self.lock();
        if recorded.is_empty() {
            None
        } else {
            Some(recorded.clone())
        }
    }
}

impl BuildListener for StepRecorder {
    fn on_step_succeeded(&mut self, step: &RecordedStep) {
        self.record(step);
    }

    fn on_step_failed(&mut self, step: &RecordedStep, _error: &DevloopError) {
        self.record(step);
    }
}

/// Reports build steps through `tracing`.
#[derive(Debug, Clone)]
pub struct LogListener {
    project: String,
}

impl LogListener {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
        }
    }
}

impl BuildListener for LogListener {
    fn on_step_started(&mut self, step: &RecordedStep) {
        info!(
            ">>> {}:{} ({}) @{}",
            step.plugin, step.goal, step.execution_id, self.project
        );
    }

    fn on_step_failed(&mut self, step: &RecordedStep, error: &DevloopError) {
        error!(step = %step.label(), error = %error, "initial build step failed");
    }
}
