// src/exec/backend.rs

//! Pluggable process backend abstraction.
//!
//! The redeploy loop talks to a `ProcessBackend` instead of spawning
//! processes itself.
//!
//! - [`ProcessSupervisor`] is the production implementation backed by
//!   `tokio::process`.
//! - Tests provide their own backend that tracks how many "processes" are
//!   alive at once and lets them decide when one exits.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::errors::Result;
use crate::launch::LaunchCommand;

use super::supervisor::{ProcessSupervisor, SupervisedProcess};

/// Trait abstracting how the application process is run.
pub trait ProcessBackend: Send {
    /// Handle to one started process.
    type Handle: Send;

    /// Spawn a new process for `command`.
    fn start(&mut self, command: &LaunchCommand) -> Result<Self::Handle>;

    /// Non-blocking liveness check.
    fn is_alive(&mut self, handle: &mut Self::Handle) -> bool;

    /// Stop the process, waiting up to `timeout` for a graceful exit before
    /// killing it. Returns `true` when no force-kill was needed.
    fn stop<'a>(
        &'a mut self,
        handle: &'a mut Self::Handle,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>>;

    /// Exit code of a process that has terminated, if known.
    fn exit_code(&self, handle: &Self::Handle) -> Option<i32>;
}

impl ProcessBackend for ProcessSupervisor {
    type Handle = SupervisedProcess;

    fn start(&mut self, command: &LaunchCommand) -> Result<Self::Handle> {
        ProcessSupervisor::start(self, command)
    }

    fn is_alive(&mut self, handle: &mut Self::Handle) -> bool {
        handle.is_alive()
    }

    fn stop<'a>(
        &'a mut self,
        handle: &'a mut Self::Handle,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        Box::pin(handle.stop(timeout))
    }

    fn exit_code(&self, handle: &Self::Handle) -> Option<i32> {
        handle.exit_code()
    }
}
