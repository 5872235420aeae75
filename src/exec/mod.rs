// src/exec/mod.rs

//! Application process management.
//!
//! - [`supervisor`] owns the spawned application process: start, liveness
//!   checks and the graceful-then-forced stop.
//! - [`backend`] provides the `ProcessBackend` trait the redeploy loop talks
//!   to, so tests can swap in a fake that never spawns anything.

pub mod backend;
pub mod supervisor;

pub use backend::ProcessBackend;
pub use supervisor::{ProcessState, ProcessSupervisor, SupervisedProcess};
