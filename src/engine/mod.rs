// src/engine/mod.rs

//! Redeploy engine for devloop.
//!
//! This module ties together:
//! - the change detector (is there anything to rebuild?)
//! - the build step chain (bring compiled output up to date)
//! - the process backend (stop the old instance, start a new one)
//! - the shutdown flag set from SIGINT / SIGTERM
//!
//! The pure decision function lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::ConfigFile;

pub mod core;
pub mod runtime;
pub mod signals;

pub use core::{decide, LoopDecision, Observation};
pub use runtime::{CommandFactory, RedeployLoop};
pub use signals::listen_for_shutdown;

/// Cooperative shutdown flag shared between the signal listener and the loop.
///
/// The loop only looks at it at the top of an iteration; in-flight rebuilds
/// and stops are never interrupted.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal(Arc<AtomicBool>);

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Timing and mode knobs for the redeploy loop.
#[derive(Debug, Clone, Copy)]
pub struct LoopOptions {
    pub redeploy_enabled: bool,
    /// Pause between iterations.
    pub scan_period: Duration,
    /// Pause after each start, before change polling resumes.
    pub grace_period: Duration,
    /// Budget for a graceful stop before the process is killed.
    pub stop_timeout: Duration,
}

impl LoopOptions {
    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self {
            redeploy_enabled: cfg.redeploy.enabled,
            scan_period: cfg.redeploy.scan_period,
            grace_period: cfg.redeploy.grace_period,
            stop_timeout: cfg.redeploy.stop_timeout,
        }
    }
}

/// Mutable state of one loop run.
///
/// `process` is replaced on every restart; there is never more than one.
#[derive(Debug)]
pub struct RedeployState<H> {
    pub stop_requested: ShutdownSignal,
    pub process: Option<H>,
    pub restarts: u32,
}

impl<H> RedeployState<H> {
    pub fn new(stop_requested: ShutdownSignal) -> Self {
        Self {
            stop_requested,
            process: None,
            restarts: 0,
        }
    }
}

/// Why the loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The application exited on its own, with its exit code if known.
    ProcessExited(Option<i32>),
    /// Shutdown was requested and the application was stopped.
    ShutdownRequested,
}

/// Result of a completed loop run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSummary {
    pub restarts: u32,
    pub exit: LoopExit,
}
