// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::types::LauncherKind;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [redeploy]
/// root = "src/main"
/// includes = ["**/*.java"]
/// scan_period = "250ms"
///
/// [app]
/// main_class = "io.vertx.core.Launcher"
/// main_verticle = "demo.MainVerticle"
/// launcher = "vertx"
/// classpath = ["target/classes"]
///
/// [build]
/// compile = ["mvn", "-q", "compiler:compile"]
/// ```
///
/// All sections are optional, but `[app].main_class` must be set for the
/// config to validate.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub redeploy: RedeploySection,

    #[serde(default)]
    pub app: AppSection,

    #[serde(default)]
    pub build: BuildSection,
}

/// `[redeploy]` section: what to watch and how often.
#[derive(Debug, Clone, Deserialize)]
pub struct RedeploySection {
    /// Whether source changes trigger a rebuild + restart.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Directory scanned for changes, relative to the project directory.
    #[serde(default = "default_watch_root")]
    pub root: String,

    /// Ant-style patterns, relative to `root`. Empty means "everything".
    #[serde(default)]
    pub includes: Vec<String>,

    /// Ant-style patterns, relative to `root`. Always win over `includes`.
    #[serde(default)]
    pub excludes: Vec<String>,

    /// How often the watch root is re-scanned (e.g. `"250ms"`).
    #[serde(default = "default_scan_period")]
    pub scan_period: String,

    /// Pause after each (re)start before change polling resumes.
    #[serde(default = "default_grace_period")]
    pub grace_period: String,

    /// How long a graceful stop may take before the process is killed.
    #[serde(default = "default_stop_timeout")]
    pub stop_timeout: String,

    /// Compare file contents instead of timestamps only.
    #[serde(default)]
    pub use_hash: bool,
}

fn default_true() -> bool {
    true
}

fn default_watch_root() -> String {
    "src/main".to_string()
}

fn default_scan_period() -> String {
    "250ms".to_string()
}

fn default_grace_period() -> String {
    "1s".to_string()
}

fn default_stop_timeout() -> String {
    "30s".to_string()
}

impl Default for RedeploySection {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            root: default_watch_root(),
            includes: Vec::new(),
            excludes: Vec::new(),
            scan_period: default_scan_period(),
            grace_period: default_grace_period(),
            stop_timeout: default_stop_timeout(),
            use_hash: false,
        }
    }
}

/// `[app]` section: how the application is launched.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    /// Fully qualified main class passed to `java`.
    #[serde(default)]
    pub main_class: String,

    /// Verticle deployed by the Vert.x launcher.
    #[serde(default)]
    pub main_verticle: Option<String>,

    /// `"plain"` (default), `"vertx"` or `"legacy-vertx"`.
    #[serde(default)]
    pub launcher: LauncherKind,

    /// Explicit java executable; otherwise `JAVA_HOME` then `PATH`.
    #[serde(default)]
    pub java: Option<String>,

    /// Classpath entries, relative to the project directory.
    #[serde(default)]
    pub classpath: Vec<String>,

    #[serde(default)]
    pub jvm_args: Vec<String>,

    /// Extra application arguments; each entry is split shell-style.
    #[serde(default)]
    pub run_args: Vec<String>,

    /// Working directory of the application (default: project directory).
    #[serde(default)]
    pub work_dir: Option<String>,

    /// Value for `VERTXWEB_ENVIRONMENT`.
    #[serde(default)]
    pub web_environment: Option<String>,

    /// Attach a JDWP agent.
    #[serde(default)]
    pub debug: bool,

    #[serde(default)]
    pub debug_suspend: bool,

    #[serde(default = "default_debug_port")]
    pub debug_port: u16,

    /// Effectively disable Vert.x blocked-thread warnings.
    #[serde(default = "default_true")]
    pub disable_blocked_thread_checker: bool,

    /// Application configuration file passed with `-conf`.
    #[serde(default)]
    pub config: Option<String>,

    /// Vert.x options file passed with `-options`.
    #[serde(default)]
    pub options: Option<String>,

    /// Extra environment variables for the application.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

fn default_debug_port() -> u16 {
    5005
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            main_class: String::new(),
            main_verticle: None,
            launcher: LauncherKind::default(),
            java: None,
            classpath: Vec::new(),
            jvm_args: Vec::new(),
            run_args: Vec::new(),
            work_dir: None,
            web_environment: None,
            debug: false,
            debug_suspend: false,
            debug_port: default_debug_port(),
            disable_blocked_thread_checker: default_true(),
            config: None,
            options: None,
            env: BTreeMap::new(),
        }
    }
}

/// `[build]` section: commands used to bring compiled output up to date.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildSection {
    /// Compiled output; if it is missing at startup, `compile` runs once.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Command (argv) that recompiles sources.
    #[serde(default = "default_compile")]
    pub compile: Vec<String>,

    /// Command (argv) that recopies resources.
    #[serde(default = "default_copy_resources")]
    pub copy_resources: Vec<String>,

    /// Build steps of the initial build, in order. `[[build.step]]`.
    #[serde(default)]
    pub step: Vec<StepConfig>,
}

fn default_output_dir() -> String {
    "target/classes".to_string()
}

fn default_compile() -> Vec<String> {
    vec!["mvn".into(), "-q".into(), "compiler:compile".into()]
}

fn default_copy_resources() -> Vec<String> {
    vec!["mvn".into(), "-q".into(), "resources:resources".into()]
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            compile: default_compile(),
            copy_resources: default_copy_resources(),
            step: Vec::new(),
        }
    }
}

/// One `[[build.step]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct StepConfig {
    pub plugin: String,
    pub goal: String,
    #[serde(default = "default_execution_id")]
    pub execution_id: String,
    pub phase: String,
    pub command: Vec<String>,
}

fn default_execution_id() -> String {
    "default".to_string()
}

/// Validated configuration.
///
/// Durations are parsed, paths are absolute (resolved against
/// `project_dir`), and the cross-field rules in `validate.rs` hold.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    /// Directory containing the config file.
    pub project_dir: PathBuf,
    pub redeploy: RedeployConfig,
    pub app: AppSection,
    pub build: BuildSection,
}

/// Typed view of `[redeploy]`.
#[derive(Debug, Clone)]
pub struct RedeployConfig {
    pub enabled: bool,
    pub root: PathBuf,
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
    pub scan_period: Duration,
    pub grace_period: Duration,
    pub stop_timeout: Duration,
    pub use_hash: bool,
}

impl ConfigFile {
    /// Resolve a config-relative path against the project directory.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let p = PathBuf::from(path);
        if p.is_absolute() {
            p
        } else {
            self.project_dir.join(p)
        }
    }

    /// Absolute compiled-output directory.
    pub fn output_dir(&self) -> PathBuf {
        self.resolve(&self.build.output_dir)
    }

    /// Absolute working directory of the application.
    pub fn work_dir(&self) -> PathBuf {
        match &self.app.work_dir {
            Some(dir) => self.resolve(dir),
            None => self.project_dir.clone(),
        }
    }
}
