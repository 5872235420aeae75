// src/launch/mod.rs

//! Computing the command line that starts the application.
//!
//! - [`builder`] assembles JVM flags, the main class and application
//!   arguments into a [`LaunchCommand`].
//! - [`java`] locates the `java` executable.
//! - [`args`] splits `run_args` entries shell-style.
//! - [`conf`] finds (and converts) the `-conf` / `-options` files.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

pub mod args;
pub mod builder;
pub mod conf;
pub mod java;

pub use args::split_args;
pub use builder::{command_from_config, AppCommandBuilder};
pub use java::find_java;

/// Name of the environment variable that selects the Vert.x Web environment.
pub const WEB_ENVIRONMENT_VAR: &str = "VERTXWEB_ENVIRONMENT";

/// Everything needed to spawn the application process.
///
/// Computed once at startup and reused for every restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Added on top of the inherited environment.
    pub env: BTreeMap<String, String>,
    pub working_dir: PathBuf,
}

impl LaunchCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
            working_dir: PathBuf::from("."),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }
}

impl fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
