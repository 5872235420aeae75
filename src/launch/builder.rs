// src/launch/builder.rs

use std::env;
use std::path::PathBuf;

use tracing::debug;

use crate::config::ConfigFile;
use crate::errors::{DevloopError, Result};
use crate::launch::conf::locate_conf;
use crate::launch::{find_java, split_args, LaunchCommand, WEB_ENVIRONMENT_VAR};
use crate::types::LauncherKind;

const MAX_EXECUTE_TIME_FLAGS: [&str; 2] = [
    "-Dvertx.options.maxEventLoopExecuteTime",
    "-Dvertx.options.maxWorkerExecuteTime",
];

/// Assembles a [`LaunchCommand`] piece by piece.
///
/// Paths to the java executable and conf files are supplied already
/// resolved; [`command_from_config`] does the lookups.
#[derive(Debug, Clone)]
pub struct AppCommandBuilder {
    java: PathBuf,
    main_class: String,
    launcher: LauncherKind,
    main_verticle: Option<String>,
    classpath: Vec<PathBuf>,
    jvm_args: Vec<String>,
    run_args: Vec<String>,
    debug: Option<(u16, bool)>,
    disable_blocked_thread_checker: bool,
    conf: Option<PathBuf>,
    options: Option<PathBuf>,
    web_environment: Option<String>,
    env: Vec<(String, String)>,
    working_dir: PathBuf,
}

impl AppCommandBuilder {
    pub fn new(java: impl Into<PathBuf>, main_class: impl Into<String>) -> Self {
        Self {
            java: java.into(),
            main_class: main_class.into(),
            launcher: LauncherKind::Plain,
            main_verticle: None,
            classpath: Vec::new(),
            jvm_args: Vec::new(),
            run_args: Vec::new(),
            debug: None,
            disable_blocked_thread_checker: false,
            conf: None,
            options: None,
            web_environment: None,
            env: Vec::new(),
            working_dir: PathBuf::from("."),
        }
    }

    pub fn launcher(mut self, launcher: LauncherKind, verticle: Option<String>) -> Self {
        self.launcher = launcher;
        self.main_verticle = verticle;
        self
    }

    pub fn classpath(mut self, entries: impl IntoIterator<Item = PathBuf>) -> Self {
        self.classpath.extend(entries);
        self
    }

    pub fn jvm_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.jvm_args.extend(args);
        self
    }

    pub fn run_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.run_args.extend(args);
        self
    }

    /// Attach a JDWP agent on `port`.
    pub fn debug(mut self, port: u16, suspend: bool) -> Self {
        self.debug = Some((port, suspend));
        self
    }

    pub fn disable_blocked_thread_checker(mut self, disable: bool) -> Self {
        self.disable_blocked_thread_checker = disable;
        self
    }

    pub fn conf(mut self, path: Option<PathBuf>) -> Self {
        self.conf = path;
        self
    }

    pub fn options(mut self, path: Option<PathBuf>) -> Self {
        self.options = path;
        self
    }

    pub fn web_environment(mut self, value: Option<String>) -> Self {
        self.web_environment = value;
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    pub fn build(self) -> Result<LaunchCommand> {
        let mut cmd = LaunchCommand::new(&self.java).working_dir(&self.working_dir);

        if self.disable_blocked_thread_checker || self.debug.is_some() {
            for flag in MAX_EXECUTE_TIME_FLAGS {
                cmd = cmd.arg(format!("{flag}={}", i64::MAX));
            }
        }

        if let Some((port, suspend)) = self.debug {
            let suspend = if suspend { "y" } else { "n" };
            cmd = cmd.arg(format!(
                "-agentlib:jdwp=transport=dt_socket,server=y,suspend={suspend},address={port}"
            ));
        }

        for arg in &self.jvm_args {
            let arg = arg.trim();
            if !arg.is_empty() {
                cmd = cmd.arg(arg);
            }
        }

        cmd = cmd.arg(&self.main_class);

        if self.launcher.is_vertx() {
            if self.launcher == LauncherKind::LegacyVertx {
                cmd = cmd.arg("run");
            }
            let verticle = self.main_verticle.as_deref().unwrap_or("").trim();
            if verticle.is_empty() {
                return Err(DevloopError::Config(
                    "a main verticle is required for the vertx launcher".to_string(),
                ));
            }
            cmd = cmd.arg(verticle);

            if let Some(options) = &self.options {
                cmd = cmd.arg("-options").arg(options.display().to_string());
            }
            if let Some(conf) = &self.conf {
                cmd = cmd.arg("-conf").arg(conf.display().to_string());
            }
        }

        for entry in &self.run_args {
            if entry.trim().is_empty() {
                continue;
            }
            for arg in split_args(entry)? {
                cmd = cmd.arg(arg);
            }
        }

        if !self.classpath.is_empty() {
            let joined = env::join_paths(&self.classpath).map_err(|e| {
                DevloopError::Config(format!("invalid classpath entry: {e}"))
            })?;
            cmd = cmd.env("CLASSPATH", joined.to_string_lossy());
        }

        let web_env = self
            .web_environment
            .or_else(|| env::var(WEB_ENVIRONMENT_VAR).ok())
            .unwrap_or_else(|| "dev".to_string());
        cmd = cmd.env(WEB_ENVIRONMENT_VAR, web_env);

        for (key, value) in self.env {
            cmd = cmd.env(key, value);
        }

        Ok(cmd)
    }
}

/// Compute the launch command for a validated config.
///
/// Looks up the java executable and the conf/options files, then feeds
/// everything through [`AppCommandBuilder`].
pub fn command_from_config(cfg: &ConfigFile) -> Result<LaunchCommand> {
    let app = &cfg.app;
    let java = find_java(app.java.as_deref())?;
    debug!(java = ?java, "using java executable");

    let (conf, options) = if app.launcher.is_vertx() {
        (
            locate_conf(&cfg.project_dir, app.config.as_deref(), "application")?,
            locate_conf(&cfg.project_dir, app.options.as_deref(), "options")?,
        )
    } else {
        (None, None)
    };

    let mut builder = AppCommandBuilder::new(java, app.main_class.trim())
        .launcher(app.launcher, app.main_verticle.clone())
        .classpath(app.classpath.iter().map(|entry| cfg.resolve(entry)))
        .jvm_args(app.jvm_args.iter().cloned())
        .run_args(app.run_args.iter().cloned())
        .disable_blocked_thread_checker(app.disable_blocked_thread_checker)
        .conf(conf)
        .options(options)
        .web_environment(app.web_environment.clone())
        .working_dir(cfg.work_dir());

    if app.debug {
        builder = builder.debug(app.debug_port, app.debug_suspend);
    }
    for (key, value) in &app.env {
        builder = builder.env(key, value);
    }

    builder.build()
}
