mod common;

use common::{init_tracing, TestResult};
use devloop::build::{BuildStep, BuildStepChain};
use devloop_test_utils::builders::recorded_step;
use devloop_test_utils::fake_invoker::FakeInvoker;

#[tokio::test]
async fn failing_compile_still_copies_resources() {
    init_tracing();
    let chain = BuildStepChain::defaults();
    let mut invoker = FakeInvoker::new().failing("compile");

    let report = chain.run(&mut invoker).await;

    assert_eq!(invoker.calls(), vec!["compile", "copy-resources"]);
    assert_eq!(report.executed, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].step, "compile");
    assert!(!report.is_success());
}

#[tokio::test]
async fn every_step_runs_even_when_all_fail() {
    let chain = BuildStepChain::defaults();
    let mut invoker = FakeInvoker::new()
        .failing("compile")
        .failing("copy-resources");

    let report = chain.run(&mut invoker).await;

    assert_eq!(report.executed, 2);
    assert_eq!(report.failures.len(), 2);
}

#[test]
fn missing_recording_falls_back_to_defaults() {
    let defaults = vec![BuildStep::Compile, BuildStep::CopyResources];
    assert_eq!(BuildStepChain::from_recording(None).steps(), defaults.as_slice());
    assert_eq!(
        BuildStepChain::from_recording(Some(Vec::new())).steps(),
        defaults.as_slice()
    );

    // Nothing replayable is the same as nothing recorded.
    let packaging = vec![recorded_step("maven-jar-plugin", "jar", "default-jar", "package")];
    assert_eq!(
        BuildStepChain::from_recording(Some(packaging)).steps(),
        defaults.as_slice()
    );
}

#[tokio::test]
async fn recording_is_replayed_in_order_without_unsafe_phases() {
    let recorded = vec![
        recorded_step("maven-resources-plugin", "resources", "default-resources", "process-resources"),
        recorded_step("maven-surefire-plugin", "test", "default-test", "test"),
        recorded_step("maven-compiler-plugin", "compile", "default-compile", "compile"),
        recorded_step("maven-jar-plugin", "jar", "default-jar", "package"),
    ];
    let chain = BuildStepChain::from_recording(Some(recorded));

    assert_eq!(
        chain.steps(),
        &[BuildStep::ReplayRecorded(0), BuildStep::ReplayRecorded(1)]
    );

    let mut invoker = FakeInvoker::new();
    let report = chain.run(&mut invoker).await;

    assert!(report.is_success());
    assert_eq!(
        invoker.calls(),
        vec![
            "maven-resources-plugin:resources (default-resources)",
            "maven-compiler-plugin:compile (default-compile)",
        ]
    );
}

#[test]
fn step_names_are_readable() {
    let chain = BuildStepChain::from_recording(Some(vec![recorded_step(
        "maven-compiler-plugin",
        "compile",
        "default-compile",
        "compile",
    )]));
    assert_eq!(
        chain.step_name(BuildStep::ReplayRecorded(0)),
        "maven-compiler-plugin:compile (default-compile)"
    );
    assert_eq!(chain.step_name(BuildStep::Compile), "compile");
    assert_eq!(chain.step_name(BuildStep::CopyResources), "copy-resources");
}

#[cfg(unix)]
mod real_commands {
    use std::path::Path;

    use crate::common::{init_tracing, write_file, TestResult};
    use devloop::build::{BuildStepChain, CommandInvoker};
    use devloop::fs::RealFileSystem;
    use devloop::watch::compute_tree_hash;

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    fn invoker(project: &Path) -> CommandInvoker {
        CommandInvoker::new(
            project,
            sh("mkdir -p out/classes && for f in src/*.java; do tr a-z A-Z < \"$f\" > \"out/classes/$(basename \"$f\" .java).class\"; done"),
            sh("mkdir -p out/classes && cp -R res/. out/classes/"),
        )
    }

    #[tokio::test]
    async fn rebuilding_twice_yields_identical_output() -> TestResult {
        init_tracing();
        let dir = tempfile::tempdir()?;
        write_file(dir.path(), "src/Main.java", "class main {}")?;
        write_file(dir.path(), "src/Util.java", "class util {}")?;
        write_file(dir.path(), "res/app.properties", "port=8080")?;

        let chain = BuildStepChain::defaults();
        let mut invoker = invoker(dir.path());
        let out = dir.path().join("out/classes");

        assert!(chain.run(&mut invoker).await.is_success());
        let first = compute_tree_hash(&RealFileSystem, &out)?;

        assert!(chain.run(&mut invoker).await.is_success());
        let second = compute_tree_hash(&RealFileSystem, &out)?;

        assert_eq!(first, second);
        assert_eq!(
            std::fs::read_to_string(out.join("Main.class"))?,
            "CLASS MAIN {}"
        );
        Ok(())
    }

    #[tokio::test]
    async fn failing_command_is_reported_not_fatal() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut invoker = CommandInvoker::new(dir.path(), sh("exit 2"), sh("touch copied"));

        let report = BuildStepChain::defaults().run(&mut invoker).await;

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].step, "compile");
        assert!(dir.path().join("copied").exists());
        Ok(())
    }

    #[tokio::test]
    async fn missing_build_tool_is_a_step_failure() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut invoker = CommandInvoker::new(
            dir.path(),
            vec!["/no/such/build-tool".to_string()],
            sh("true"),
        );

        let report = BuildStepChain::defaults().run(&mut invoker).await;

        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].message.contains("/no/such/build-tool"));
        Ok(())
    }
}
