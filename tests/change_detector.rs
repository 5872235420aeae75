mod common;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use common::{init_tracing, write_file, TestResult};
use devloop::errors::DevloopError;
use devloop::fs::mock::MockFileSystem;
use devloop::watch::{ChangeDetector, ChangeSource, WatchSpec};

fn detector(fs: &MockFileSystem, spec: WatchSpec) -> ChangeDetector {
    ChangeDetector::with_fs(spec, Arc::new(fs.clone())).expect("detector should initialise")
}

#[test]
fn new_java_file_is_reported_once() -> TestResult {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.create_dir("proj/src/main");

    let spec = WatchSpec::new("proj/src/main")
        .include("**/*.java")
        .scan_interval(Duration::from_millis(250));
    let mut det = detector(&fs, spec);

    fs.add_file("proj/src/main/Foo.java", "class Foo {}");
    assert!(det.poll_for_changes()?);
    assert!(!det.poll_for_changes()?, "second poll without changes must be quiet");
    Ok(())
}

#[test]
fn excluded_files_never_count() -> TestResult {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("proj/src/app.log", "start");
    fs.add_file("proj/src/app.txt", "hello");

    let spec = WatchSpec::new("proj").include("src/**").exclude("**/*.log");
    let mut det = detector(&fs, spec);

    fs.add_file("proj/src/app.log", "start\nmore");
    assert!(!det.poll_for_changes()?);

    fs.add_file("proj/src/app.txt", "hello again");
    assert!(det.poll_for_changes()?);
    Ok(())
}

#[test]
fn paths_outside_includes_are_ignored() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("proj/src/Main.java", "class Main {}");
    fs.add_file("proj/README.md", "# readme");

    let mut det = detector(&fs, WatchSpec::new("proj").include("src/**"));

    fs.add_file("proj/README.md", "# changed");
    assert!(!det.poll_for_changes()?);

    fs.add_file("proj/src/Main.java", "class Main { }");
    assert!(det.poll_for_changes()?);
    Ok(())
}

#[test]
fn deletions_and_new_directories_count() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("root/a/One.java", "1");
    fs.add_file("root/b/Two.java", "2");

    let mut det = detector(&fs, WatchSpec::new("root"));

    fs.remove("root/a/One.java");
    assert!(det.poll_for_changes()?);
    assert!(!det.poll_for_changes()?);

    fs.create_dir("root/c");
    assert!(det.poll_for_changes()?);

    fs.remove("root/b");
    assert!(det.poll_for_changes()?);
    assert!(!det.poll_for_changes()?);
    Ok(())
}

#[test]
fn hash_mode_ignores_touch_without_content_change() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("root/Main.java", "class Main {}");

    let mut det = detector(&fs, WatchSpec::new("root").use_hash(true));

    fs.touch("root/Main.java");
    assert!(!det.poll_for_changes()?);

    fs.add_file("root/Main.java", "class Main { int x; }");
    assert!(det.poll_for_changes()?);

    // Rewriting identical content only moves the timestamp.
    fs.add_file("root/Main.java", "class Main { int x; }");
    assert!(!det.poll_for_changes()?);
    Ok(())
}

#[test]
fn timestamp_mode_reports_touch() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("root/Main.java", "class Main {}");

    let mut det = detector(&fs, WatchSpec::new("root"));

    fs.touch("root/Main.java");
    assert!(det.poll_for_changes()?);
    Ok(())
}

#[test]
fn missing_root_fails_initialisation() {
    let fs = MockFileSystem::new();
    let result = ChangeDetector::with_fs(WatchSpec::new("nope"), Arc::new(fs));
    assert!(matches!(result, Err(DevloopError::ChangeDetection(_))));
}

#[test]
fn root_removed_while_watching_is_an_error() {
    let fs = MockFileSystem::new();
    fs.add_file("root/Main.java", "class Main {}");
    let mut det = detector(&fs, WatchSpec::new("root"));

    fs.remove("root");
    let result = det.poll_for_changes();
    assert!(matches!(result, Err(DevloopError::ChangeDetection(_))));
}

#[test]
fn invalid_pattern_is_a_config_error() {
    let fs = MockFileSystem::new();
    fs.create_dir("root");
    let result = ChangeDetector::with_fs(WatchSpec::new("root").include("src/[a"), Arc::new(fs));
    assert!(matches!(result, Err(DevloopError::Config(_))));
}

#[test]
fn closed_detector_reports_nothing() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("root/Main.java", "class Main {}");
    let mut det = detector(&fs, WatchSpec::new("root"));

    ChangeSource::close(&mut det);
    det.close();

    fs.add_file("root/Other.java", "class Other {}");
    assert!(!det.poll_for_changes()?);
    Ok(())
}

#[test]
fn real_filesystem_changes_are_detected() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let root: PathBuf = dir.path().join("src/main");
    write_file(&root, "java/demo/Main.java", "class Main {}")?;
    write_file(&root, "resources/app.log", "x")?;

    let spec = WatchSpec::new(&root).exclude("**/*.log");
    let mut det = ChangeDetector::initialize(spec)?;
    assert!(!det.poll_for_changes()?);

    write_file(&root, "java/demo/Other.java", "class Other {}")?;
    assert!(det.poll_for_changes()?);
    assert!(!det.poll_for_changes()?);

    // Longer content, so the change shows even within one mtime tick.
    write_file(&root, "java/demo/Main.java", "class Main { void run() {} }")?;
    assert!(det.poll_for_changes()?);

    std::fs::remove_file(root.join("java/demo/Other.java"))?;
    assert!(det.poll_for_changes()?);
    Ok(())
}
