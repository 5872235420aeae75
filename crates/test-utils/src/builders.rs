#![allow(dead_code)]

use std::path::Path;

use devloop::build::RecordedStep;
use devloop::config::{validate_config, ConfigFile, RawConfigFile, StepConfig};
use devloop::errors::Result;
use devloop::types::LauncherKind;

/// Builder for `ConfigFile` to simplify test setup.
///
/// Starts from the defaults with `main_class = "demo.Main"` so the result
/// validates unless a test breaks it on purpose.
pub struct ConfigBuilder {
    config: RawConfigFile,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        let mut config = RawConfigFile::default();
        config.app.main_class = "demo.Main".to_string();
        Self { config }
    }

    pub fn main_class(mut self, class: &str) -> Self {
        self.config.app.main_class = class.to_string();
        self
    }

    pub fn vertx(mut self, verticle: &str) -> Self {
        self.config.app.launcher = LauncherKind::Vertx;
        self.config.app.main_verticle = Some(verticle.to_string());
        self
    }

    pub fn java(mut self, path: &str) -> Self {
        self.config.app.java = Some(path.to_string());
        self
    }

    pub fn classpath(mut self, entry: &str) -> Self {
        self.config.app.classpath.push(entry.to_string());
        self
    }

    pub fn run_arg(mut self, arg: &str) -> Self {
        self.config.app.run_args.push(arg.to_string());
        self
    }

    pub fn jvm_arg(mut self, arg: &str) -> Self {
        self.config.app.jvm_args.push(arg.to_string());
        self
    }

    pub fn watch_root(mut self, root: &str) -> Self {
        self.config.redeploy.root = root.to_string();
        self
    }

    pub fn include(mut self, pattern: &str) -> Self {
        self.config.redeploy.includes.push(pattern.to_string());
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.config.redeploy.excludes.push(pattern.to_string());
        self
    }

    pub fn redeploy(mut self, enabled: bool) -> Self {
        self.config.redeploy.enabled = enabled;
        self
    }

    pub fn step(mut self, plugin: &str, goal: &str, execution_id: &str, phase: &str) -> Self {
        self.config.build.step.push(StepConfig {
            plugin: plugin.to_string(),
            goal: goal.to_string(),
            execution_id: execution_id.to_string(),
            phase: phase.to_string(),
            command: vec!["true".to_string()],
        });
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    /// Validate against `project_dir`.
    pub fn try_build(self, project_dir: &Path) -> Result<ConfigFile> {
        validate_config(self.config, project_dir)
    }

    pub fn build(self, project_dir: &Path) -> ConfigFile {
        self.try_build(project_dir)
            .expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A recorded step whose command is irrelevant to the test.
pub fn recorded_step(plugin: &str, goal: &str, execution_id: &str, phase: &str) -> RecordedStep {
    RecordedStep {
        plugin: plugin.to_string(),
        goal: goal.to_string(),
        execution_id: execution_id.to_string(),
        phase: phase.to_string(),
        command: vec![format!("{plugin}:{goal}")],
    }
}
