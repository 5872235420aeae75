use std::collections::BTreeMap;
use std::sync::Arc;

use proptest::prelude::*;
use devloop::fs::mock::MockFileSystem;
use devloop::watch::{ChangeDetector, PathFilter, WatchSpec};

fn segment() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

// Relative paths like `ab/cde/f.java`.
fn rel_path() -> impl Strategy<Value = String> {
    (
        proptest::collection::vec(segment(), 0..4),
        segment(),
        prop_oneof![Just("java"), Just("log"), Just("txt")],
    )
        .prop_map(|(dirs, stem, ext)| {
            let mut parts = dirs;
            parts.push(format!("{stem}.{ext}"));
            parts.join("/")
        })
}

#[derive(Debug, Clone)]
enum Op {
    Write(usize, bool),
    Delete(usize, bool),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..4usize, any::<bool>()).prop_map(|(i, java)| Op::Write(i, java)),
        (0..4usize, any::<bool>()).prop_map(|(i, java)| Op::Delete(i, java)),
    ]
}

fn file_name(i: usize, java: bool) -> String {
    if java {
        format!("F{i}.java")
    } else {
        format!("F{i}.log")
    }
}

proptest! {
    #[test]
    fn exclude_always_wins(path in rel_path()) {
        let filter = PathFilter::new(&["**".to_string()], &["**/*.log".to_string()]).unwrap();
        prop_assert_eq!(filter.matches(&path), !path.ends_with(".log"));
    }

    #[test]
    fn identical_include_and_exclude_match_nothing(path in rel_path()) {
        let pats = vec!["**/*.java".to_string(), "**/*.txt".to_string()];
        let filter = PathFilter::new(&pats, &pats).unwrap();
        prop_assert!(!filter.matches(&path));
    }

    #[test]
    fn star_never_crosses_a_separator(dirs in proptest::collection::vec(segment(), 1..4), stem in segment()) {
        let filter = PathFilter::new(&["*.java".to_string()], &[]).unwrap();
        let nested = format!("{}/{stem}.java", dirs.join("/"));
        prop_assert!(!filter.matches(&nested));
        let top_level = format!("{stem}.java");
        prop_assert!(filter.matches(&top_level));
    }

    #[test]
    fn backslashes_match_like_slashes(path in rel_path()) {
        let filter = PathFilter::new(&["**/*.java".to_string()], &[]).unwrap();
        let windows = path.replace('/', "\\");
        prop_assert_eq!(filter.matches(&path), filter.matches(&windows));
    }

    // Files live directly under the root, so only the files themselves are
    // tracked. A poll reports a change iff the set of watched files or any
    // watched file's version differs from the previous poll.
    #[test]
    fn poll_reports_exactly_the_watched_changes(
        setup in proptest::collection::vec((0..4usize, any::<bool>()), 0..6),
        rounds in proptest::collection::vec(proptest::collection::vec(op(), 0..5), 1..4),
    ) {
        let fs = MockFileSystem::new();
        fs.create_dir("root");

        let mut version: u64 = 0;
        let mut model: BTreeMap<String, u64> = BTreeMap::new();

        for (i, java) in setup {
            let name = file_name(i, java);
            version += 1;
            fs.add_file(format!("root/{name}"), format!("v{version}"));
            model.insert(name, version);
        }

        let spec = WatchSpec::new("root").exclude("*.log");
        let mut det = ChangeDetector::with_fs(spec, Arc::new(fs.clone())).unwrap();

        for ops in rounds {
            let watched_before: BTreeMap<String, u64> = model
                .iter()
                .filter(|(k, _)| k.ends_with(".java"))
                .map(|(k, v)| (k.clone(), *v))
                .collect();

            for op in ops {
                match op {
                    Op::Write(i, java) => {
                        let name = file_name(i, java);
                        version += 1;
                        fs.add_file(format!("root/{name}"), format!("v{version}"));
                        model.insert(name, version);
                    }
                    Op::Delete(i, java) => {
                        let name = file_name(i, java);
                        if model.remove(&name).is_some() {
                            fs.remove(format!("root/{name}"));
                        }
                    }
                }
            }

            let watched_after: BTreeMap<String, u64> = model
                .iter()
                .filter(|(k, _)| k.ends_with(".java"))
                .map(|(k, v)| (k.clone(), *v))
                .collect();

            let changed = det.poll_for_changes().unwrap();
            prop_assert_eq!(changed, watched_before != watched_after);
        }
    }
}
