//! Session lifecycle and failure policy of the task runner.

mod common;

use docdrop_core::{Config, FailurePolicy, PatternSpec};
use docdrop_delivery::{run_all, run_task, DeliveryError, RunOptions};
use tempfile::TempDir;

use common::{mapping, p, task, write_files, FakeConnector};

const LIVE: RunOptions = RunOptions { dry_run: false };

fn two_mapping_tree(root: &TempDir) -> (std::path::PathBuf, std::path::PathBuf) {
    let first = root.path().join("first");
    let second = root.path().join("second");
    write_files(&first, &["job/go.trigger", "job/one.pdf"]);
    write_files(&second, &["job/go.trigger", "job/two.pdf"]);
    (first, second)
}

#[test]
fn connection_failure_stops_before_any_work() {
    let root = TempDir::new().unwrap();
    let (first, _) = two_mapping_tree(&root);
    let connector = FakeConnector {
        refuse_connect: true,
        ..FakeConnector::new()
    };
    let t = task(
        vec![mapping("/A", &first, "*/*.trigger", &["*.pdf"], &[], false)],
        FailurePolicy::Continue,
    );

    let err = run_task(&t, "test", &connector, LIVE).expect_err("must fail");
    assert!(matches!(err, DeliveryError::Connection(_)));
    assert_eq!(connector.journal.borrow().closes, 0, "nothing to close");
    assert!(p(&first, "job/go.trigger").exists());
}

#[test]
fn abort_policy_stops_at_first_failing_mapping() {
    let root = TempDir::new().unwrap();
    let (first, second) = two_mapping_tree(&root);
    let connector = FakeConnector {
        missing_folders: vec!["/Missing".into()],
        ..FakeConnector::new()
    };
    let t = task(
        vec![
            mapping("/Missing", &first, "*/*.trigger", &["*.pdf"], &[], false),
            mapping("/B", &second, "*/*.trigger", &["*.pdf"], &[], false),
        ],
        FailurePolicy::Abort,
    );

    let err = run_task(&t, "test", &connector, LIVE).expect_err("must fail");
    assert!(matches!(err, DeliveryError::FolderLookup { .. }), "{err}");
    assert_eq!(connector.upload_count(), 0);
    assert!(p(&second, "job/go.trigger").exists(), "later mapping must not run");
    assert_eq!(connector.journal.borrow().closes, 1);
}

#[test]
fn continue_policy_runs_remaining_mappings() {
    let root = TempDir::new().unwrap();
    let (first, second) = two_mapping_tree(&root);
    let connector = FakeConnector {
        missing_folders: vec!["/Missing".into()],
        ..FakeConnector::new()
    };
    let t = task(
        vec![
            mapping("/Missing", &first, "*/*.trigger", &["*.pdf"], &[], false),
            mapping("/B", &second, "*/*.trigger", &["*.pdf"], &[], false),
        ],
        FailurePolicy::Continue,
    );

    let report = run_task(&t, "test", &connector, LIVE).expect("report");
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].remote.0, "/Missing");
    assert_eq!(connector.uploaded_names(), vec!["two.pdf"]);
    assert!(p(&first, "job/go.trigger").exists());
    assert!(!p(&second, "job/go.trigger").exists());
    assert_eq!(connector.journal.borrow().closes, 1);
}

#[test]
fn mappings_run_in_config_order() {
    let root = TempDir::new().unwrap();
    let (first, second) = two_mapping_tree(&root);
    let connector = FakeConnector::new();
    let t = task(
        vec![
            mapping("/B", &second, "*/*.trigger", &["*.pdf"], &[], false),
            mapping("/A", &first, "*/*.trigger", &["*.pdf"], &[], false),
        ],
        FailurePolicy::Abort,
    );

    let report = run_task(&t, "test", &connector, LIVE).expect("run");
    assert_eq!(report.files_delivered(), 2);
    assert_eq!(connector.uploaded_names(), vec!["two.pdf", "one.pdf"]);
    let journal = connector.journal.borrow();
    assert_eq!(journal.uploads[0].folder_id, "id:/B");
    assert_eq!(journal.uploads[1].folder_id, "id:/A");
    assert_eq!(journal.connects, 1, "one session per task");
    assert_eq!(journal.closes, 1);
}

#[test]
fn close_failure_does_not_change_outcome() {
    let root = TempDir::new().unwrap();
    let (first, _) = two_mapping_tree(&root);
    let connector = FakeConnector {
        fail_close: true,
        ..FakeConnector::new()
    };
    let t = task(
        vec![mapping("/A", &first, "*/*.trigger", &["*.pdf"], &[], false)],
        FailurePolicy::Abort,
    );

    let report = run_task(&t, "test", &connector, LIVE).expect("still a success");
    assert_eq!(report.files_delivered(), 1);
    assert_eq!(connector.journal.borrow().closes, 1);
}

#[test]
fn malformed_trigger_fails_only_its_mapping_under_continue() {
    let root = TempDir::new().unwrap();
    let (first, second) = two_mapping_tree(&root);
    let mut broken = mapping("/A", &first, "*/*.trigger", &["*.pdf"], &[], false);
    broken.trigger = PatternSpec::Malformed(Default::default());
    let connector = FakeConnector::new();
    let t = task(
        vec![
            broken,
            mapping("/B", &second, "*/*.trigger", &["*.pdf"], &[], false),
        ],
        FailurePolicy::Continue,
    );

    let report = run_task(&t, "test", &connector, LIVE).expect("report");
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].error.contains("trigger"));
    assert_eq!(connector.uploaded_names(), vec!["two.pdf"]);
}

#[test]
fn unreadable_local_root_is_a_mapping_failure() {
    let root = TempDir::new().unwrap();
    let connector = FakeConnector::new();
    let t = task(
        vec![mapping(
            "/A",
            &root.path().join("does-not-exist"),
            "*.trigger",
            &["*.pdf"],
            &[],
            false,
        )],
        FailurePolicy::Abort,
    );

    let err = run_task(&t, "test", &connector, LIVE).expect_err("must fail");
    assert!(matches!(err, DeliveryError::Unreadable { .. }), "{err}");
    assert_eq!(connector.journal.borrow().closes, 1);
}

#[test]
fn run_all_keeps_going_after_a_failed_task() {
    let root = TempDir::new().unwrap();
    let (first, second) = two_mapping_tree(&root);
    let connector = FakeConnector {
        missing_folders: vec!["/Missing".into()],
        ..FakeConnector::new()
    };
    let mut failing = task(
        vec![mapping("/Missing", &first, "*/*.trigger", &["*.pdf"], &[], false)],
        FailurePolicy::Abort,
    );
    failing.name = None;
    let healthy = task(
        vec![mapping("/B", &second, "*/*.trigger", &["*.pdf"], &[], false)],
        FailurePolicy::Abort,
    );
    let config = Config {
        tasks: vec![failing, healthy],
    };

    let summary = run_all(&config, &connector, LIVE);
    assert!(!summary.is_success());
    assert_eq!(summary.tasks.len(), 2);
    assert_eq!(summary.tasks[0].task, "task #1");
    assert!(summary.tasks[0].error.is_some());
    assert!(summary.tasks[1].report.is_some());
    assert!(summary
        .first_error()
        .expect("first error")
        .contains("/Missing"));
    assert_eq!(connector.uploaded_names(), vec!["two.pdf"]);
}

#[test]
fn run_all_json_summary_is_serializable() {
    let root = TempDir::new().unwrap();
    let (first, _) = two_mapping_tree(&root);
    let connector = FakeConnector::new();
    let config = Config {
        tasks: vec![task(
            vec![mapping("/A", &first, "*/*.trigger", &["*.pdf"], &[], false)],
            FailurePolicy::Abort,
        )],
    };

    let summary = run_all(&config, &connector, RunOptions { dry_run: true });
    assert!(summary.is_success());
    let json = serde_json::to_value(&summary).expect("json");
    let delivery = &json["tasks"][0]["report"]["mappings"][0]["deliveries"][0];
    assert_eq!(delivery["status"], "would_deliver");
}
