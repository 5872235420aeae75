mod common;

use std::time::Duration;

use common::{write_file, TestResult};
use devloop::config::{load_and_validate, load_from_path};
use devloop::errors::DevloopError;
use devloop::types::LauncherKind;
use devloop_test_utils::builders::ConfigBuilder;

const FULL_CONFIG: &str = r#"
[redeploy]
root = "src/main"
includes = ["**/*.java", "resources/"]
excludes = ["**/*.log"]
scan_period = "100ms"
grace_period = "2s"
stop_timeout = "1m"
use_hash = true

[app]
main_class = "io.vertx.core.Launcher"
main_verticle = "demo.MainVerticle"
launcher = "vertx"
classpath = ["target/classes", "lib/dep.jar"]
jvm_args = ["-Xmx256m"]
run_args = ["--instances 2"]
debug = true
debug_port = 8000
env = { GREETING = "hello" }

[build]
output_dir = "out"
compile = ["mvn", "compile"]

[[build.step]]
plugin = "maven-compiler-plugin"
goal = "compile"
execution_id = "default-compile"
phase = "compile"
command = ["mvn", "compiler:compile@default-compile"]

[[build.step]]
plugin = "maven-resources-plugin"
goal = "resources"
phase = "process-resources"
command = ["mvn", "resources:resources"]
"#;

#[test]
fn full_config_loads_and_resolves_paths() -> TestResult {
    let dir = tempfile::tempdir()?;
    std::fs::create_dir_all(dir.path().join("src/main"))?;
    let path = write_file(dir.path(), "Devloop.toml", FULL_CONFIG)?;

    let cfg = load_and_validate(&path)?;

    assert_eq!(cfg.project_dir, dir.path());
    assert!(cfg.redeploy.enabled);
    assert_eq!(cfg.redeploy.root, dir.path().join("src/main"));
    assert_eq!(cfg.redeploy.includes, vec!["**/*.java", "resources/"]);
    assert_eq!(cfg.redeploy.scan_period, Duration::from_millis(100));
    assert_eq!(cfg.redeploy.grace_period, Duration::from_secs(2));
    assert_eq!(cfg.redeploy.stop_timeout, Duration::from_secs(60));
    assert!(cfg.redeploy.use_hash);

    assert_eq!(cfg.app.launcher, LauncherKind::Vertx);
    assert!(cfg.app.debug);
    assert_eq!(cfg.app.debug_port, 8000);
    assert!(cfg.app.disable_blocked_thread_checker);
    assert_eq!(cfg.app.env.get("GREETING").map(String::as_str), Some("hello"));
    assert_eq!(cfg.work_dir(), dir.path());

    assert_eq!(cfg.output_dir(), dir.path().join("out"));
    assert_eq!(cfg.build.compile, vec!["mvn", "compile"]);
    assert_eq!(cfg.build.copy_resources, vec!["mvn", "-q", "resources:resources"]);
    assert_eq!(cfg.build.step.len(), 2);
    assert_eq!(cfg.build.step[1].execution_id, "default");
    Ok(())
}

#[test]
fn defaults_apply_to_a_minimal_config() -> TestResult {
    let dir = tempfile::tempdir()?;
    std::fs::create_dir_all(dir.path().join("src/main"))?;
    let path = write_file(dir.path(), "Devloop.toml", "[app]\nmain_class = \"demo.Main\"\n")?;

    let cfg = load_and_validate(&path)?;

    assert_eq!(cfg.redeploy.scan_period, Duration::from_millis(250));
    assert_eq!(cfg.redeploy.grace_period, Duration::from_secs(1));
    assert_eq!(cfg.redeploy.stop_timeout, Duration::from_secs(30));
    assert!(!cfg.redeploy.use_hash);
    assert_eq!(cfg.app.launcher, LauncherKind::Plain);
    assert!(!cfg.app.debug);
    assert_eq!(cfg.app.debug_port, 5005);
    assert_eq!(cfg.output_dir(), dir.path().join("target/classes"));
    Ok(())
}

#[test]
fn missing_main_class_is_rejected() -> TestResult {
    let dir = tempfile::tempdir()?;
    std::fs::create_dir_all(dir.path().join("src/main"))?;

    let result = ConfigBuilder::new().main_class("  ").try_build(dir.path());
    assert!(matches!(result, Err(DevloopError::Config(_))));
    Ok(())
}

#[test]
fn vertx_launcher_requires_a_verticle() -> TestResult {
    let dir = tempfile::tempdir()?;
    std::fs::create_dir_all(dir.path().join("src/main"))?;

    let mut raw = ConfigBuilder::new().raw();
    raw.app.launcher = LauncherKind::LegacyVertx;
    let result = devloop::config::validate_config(raw, dir.path());
    assert!(matches!(result, Err(DevloopError::Config(_))));

    let ok = ConfigBuilder::new().vertx("demo.MainVerticle").try_build(dir.path());
    assert!(ok.is_ok());
    Ok(())
}

#[test]
fn missing_watch_root_depends_on_redeploy() -> TestResult {
    let dir = tempfile::tempdir()?;

    let enabled = ConfigBuilder::new().watch_root("nope").try_build(dir.path());
    match enabled {
        Err(DevloopError::Config(msg)) => assert!(msg.contains("nope")),
        other => panic!("expected a config error, got {other:?}"),
    }

    let disabled = ConfigBuilder::new()
        .watch_root("nope")
        .redeploy(false)
        .try_build(dir.path());
    assert!(disabled.is_ok());
    Ok(())
}

#[test]
fn invalid_durations_and_patterns_are_rejected() -> TestResult {
    let dir = tempfile::tempdir()?;
    std::fs::create_dir_all(dir.path().join("src/main"))?;

    let mut raw = ConfigBuilder::new().raw();
    raw.redeploy.scan_period = "0ms".to_string();
    assert!(matches!(
        devloop::config::validate_config(raw, dir.path()),
        Err(DevloopError::Config(_))
    ));

    let mut raw = ConfigBuilder::new().raw();
    raw.redeploy.stop_timeout = "soon".to_string();
    assert!(matches!(
        devloop::config::validate_config(raw, dir.path()),
        Err(DevloopError::Config(_))
    ));

    let result = ConfigBuilder::new().include("src/[oops").try_build(dir.path());
    assert!(matches!(result, Err(DevloopError::Config(_))));
    Ok(())
}

#[test]
fn empty_build_commands_are_rejected() -> TestResult {
    let dir = tempfile::tempdir()?;
    std::fs::create_dir_all(dir.path().join("src/main"))?;

    let mut raw = ConfigBuilder::new().raw();
    raw.build.compile.clear();
    assert!(matches!(
        devloop::config::validate_config(raw, dir.path()),
        Err(DevloopError::Config(_))
    ));

    let mut raw = ConfigBuilder::new()
        .step("maven-compiler-plugin", "compile", "default-compile", "compile")
        .raw();
    raw.build.step[0].command.clear();
    assert!(matches!(
        devloop::config::validate_config(raw, dir.path()),
        Err(DevloopError::Config(_))
    ));
    Ok(())
}

#[test]
fn malformed_toml_is_a_parse_error() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = write_file(dir.path(), "Devloop.toml", "[app\nmain_class = ")?;

    assert!(matches!(load_from_path(&path), Err(DevloopError::Toml(_))));
    Ok(())
}

#[test]
fn unknown_launcher_is_a_parse_error() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = write_file(
        dir.path(),
        "Devloop.toml",
        "[app]\nmain_class = \"demo.Main\"\nlauncher = \"spring\"\n",
    )?;

    assert!(matches!(load_from_path(&path), Err(DevloopError::Toml(_))));
    Ok(())
}

#[test]
fn missing_file_is_an_io_error() {
    assert!(matches!(
        load_from_path("/definitely/not/here/Devloop.toml"),
        Err(DevloopError::Io(_))
    ));
}

#[test]
fn demo_configs_parse() -> TestResult {
    let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    for rel in ["demos/vertx-app/Devloop.toml", "demos/plain-app/Devloop.toml"] {
        let raw = load_from_path(manifest.join(rel))?;
        assert!(!raw.app.main_class.is_empty(), "{rel} has no main class");
    }
    Ok(())
}
