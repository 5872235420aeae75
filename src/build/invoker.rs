// src/build/invoker.rs

//! Pluggable build invocation.
//!
//! The chain talks to a `BuildInvoker` instead of spawning commands itself,
//! so tests can swap in an invoker that records calls or fails on demand.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use crate::build::{DefaultPhase, RecordedStep};
use crate::config::ConfigFile;
use crate::errors::{DevloopError, Result};

/// Trait abstracting how build steps are executed.
pub trait BuildInvoker: Send {
    /// Run one of the default phases (compile, copy resources).
    fn invoke_phase(
        &mut self,
        phase: DefaultPhase,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Re-run a recorded invocation.
    fn replay<'a>(
        &'a mut self,
        step: &'a RecordedStep,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

/// Runs build steps as external commands in the project directory.
///
/// Output is inherited so compiler errors show up on the console as they
/// happen.
#[derive(Debug, Clone)]
pub struct CommandInvoker {
    project_dir: PathBuf,
    compile: Vec<String>,
    copy_resources: Vec<String>,
}

impl CommandInvoker {
    pub fn new(project_dir: impl Into<PathBuf>, compile: Vec<String>, copy_resources: Vec<String>) -> Self {
        Self {
            project_dir: project_dir.into(),
            compile,
            copy_resources,
        }
    }

    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self::new(
            cfg.project_dir.clone(),
            cfg.build.compile.clone(),
            cfg.build.copy_resources.clone(),
        )
    }

    fn argv_for(&self, phase: DefaultPhase) -> &[String] {
        match phase {
            DefaultPhase::Compile => &self.compile,
            DefaultPhase::CopyResources => &self.copy_resources,
        }
    }
}

impl BuildInvoker for CommandInvoker {
    fn invoke_phase(
        &mut self,
        phase: DefaultPhase,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let argv = self.argv_for(phase).to_vec();
            run_build_command(&phase.to_string(), &argv, &self.project_dir).await
        })
    }

    fn replay<'a>(
        &'a mut self,
        step: &'a RecordedStep,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move { run_build_command(&step.label(), &step.command, &self.project_dir).await })
    }
}

/// Run `argv` to completion with inherited stdio.
async fn run_build_command(label: &str, argv: &[String], dir: &Path) -> Result<()> {
    let Some((program, args)) = argv.split_first() else {
        return Err(DevloopError::BuildStep {
            step: label.to_string(),
            message: "empty command".to_string(),
        });
    };

    info!(step = %label, cmd = %argv.join(" "), "running build step");

    let status = Command::new(program)
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .status()
        .await
        .map_err(|e| DevloopError::BuildStep {
            step: label.to_string(),
            message: format!("could not run `{}`: {e}", argv.join(" ")),
        })?;

    debug!(step = %label, code = ?status.code(), "build step exited");

    if status.success() {
        Ok(())
    } else {
        Err(DevloopError::BuildStep {
            step: label.to_string(),
            message: match status.code() {
                Some(code) => format!("exited with code {code}"),
                None => "terminated by a signal".to_string(),
            },
        })
    }
}
