use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use devloop::engine::ShutdownSignal;
use devloop::errors::{DevloopError, Result};
use devloop::watch::ChangeSource;

/// One scripted answer to `poll_for_changes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    Quiet,
    Changed,
    Fail,
}

/// Observable side of a [`ScriptedChanges`], kept by the test.
#[derive(Debug, Clone, Default)]
pub struct ChangeProbe {
    polls: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
}

impl ChangeProbe {
    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// A change source that answers from a script.
///
/// Once the script is exhausted it keeps answering `false`, and requests
/// shutdown if a signal was attached with [`ScriptedChanges::then_shutdown`].
#[derive(Debug, Default)]
pub struct ScriptedChanges {
    script: VecDeque<Poll>,
    shutdown: Option<ShutdownSignal>,
    probe: ChangeProbe,
}

impl ScriptedChanges {
    pub fn new(script: impl IntoIterator<Item = Poll>) -> Self {
        Self {
            script: script.into_iter().collect(),
            shutdown: None,
            probe: ChangeProbe::default(),
        }
    }

    pub fn then_shutdown(mut self, signal: ShutdownSignal) -> Self {
        self.shutdown = Some(signal);
        self
    }

    pub fn probe(&self) -> ChangeProbe {
        self.probe.clone()
    }
}

impl ChangeSource for ScriptedChanges {
    fn poll_for_changes(&mut self) -> Result<bool> {
        self.probe.polls.fetch_add(1, Ordering::SeqCst);
        match self.script.pop_front() {
            Some(Poll::Quiet) => Ok(false),
            Some(Poll::Changed) => Ok(true),
            Some(Poll::Fail) => Err(DevloopError::ChangeDetection(
                "scripted detector failure".to_string(),
            )),
            None => {
                if let Some(signal) = &self.shutdown {
                    signal.request();
                }
                Ok(false)
            }
        }
    }

    fn close(&mut self) {
        self.probe.closed.store(true, Ordering::SeqCst);
    }
}
