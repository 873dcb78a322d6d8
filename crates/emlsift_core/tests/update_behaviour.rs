use std::path::PathBuf;
use std::sync::Once;

use emlsift_core::{
    update, BatchPhase, BatchState, Effect, EmailRecord, JobStatus, Msg, RecordFields,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn record(subject: &str) -> EmailRecord {
    EmailRecord::new(RecordFields {
        subject: subject.to_string(),
        ..Default::default()
    })
}

fn dispatched(paths: &[&str]) -> (BatchState, Vec<Effect>) {
    let paths = paths.iter().map(PathBuf::from).collect();
    update(BatchState::new(), Msg::PathsCollected(paths))
}

#[test]
fn collecting_paths_enqueues_each_then_closes_queue() {
    init_logging();
    let (state, effects) = dispatched(&["a.eml", "b.eml"]);

    assert_eq!(state.phase(), BatchPhase::Dispatching);
    assert_eq!(
        effects,
        vec![
            Effect::Enqueue {
                job_id: 0,
                path: PathBuf::from("a.eml"),
            },
            Effect::Enqueue {
                job_id: 1,
                path: PathBuf::from("b.eml"),
            },
            Effect::CloseQueue,
        ]
    );
    assert_eq!(state.job_status(1), Some(JobStatus::Queued));
}

#[test]
fn empty_batch_still_closes_queue() {
    let (state, effects) = dispatched(&[]);
    assert_eq!(effects, vec![Effect::CloseQueue]);

    let (state, _) = update(state, Msg::QueueClosed);
    let (state, effects) = update(state, Msg::WorkersJoined);
    assert_eq!(state.phase(), BatchPhase::Done);
    assert!(effects.is_empty());
    assert!(state.into_records(true).is_empty());
}

#[test]
fn second_path_collection_is_ignored() {
    let (state, _) = dispatched(&["a.eml"]);
    let (state, effects) = update(state, Msg::PathsCollected(vec![PathBuf::from("x.eml")]));

    assert!(effects.is_empty());
    assert_eq!(state.summary().total, 1);
}

#[test]
fn full_lifecycle_reaches_done_with_counts() {
    init_logging();
    let (state, _) = dispatched(&["a.eml", "bad.eml", "c.eml"]);
    let (state, _) = update(
        state,
        Msg::FileSucceeded {
            job_id: 2,
            record: record("c"),
        },
    );
    let (state, _) = update(state, Msg::QueueClosed);
    assert_eq!(state.phase(), BatchPhase::Draining);

    let (state, effects) = update(
        state,
        Msg::FileFailed {
            job_id: 1,
            reason: "not a message".into(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::ReportFailure {
            job_id: 1,
            path: PathBuf::from("bad.eml"),
            reason: "not a message".into(),
        }]
    );

    let (state, _) = update(
        state,
        Msg::FileSucceeded {
            job_id: 0,
            record: record("a"),
        },
    );
    let (state, effects) = update(state, Msg::WorkersJoined);
    assert!(effects.is_empty());

    let summary = state.summary();
    assert_eq!(summary.phase, BatchPhase::Done);
    assert_eq!(summary.total, 3);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.pending, 0);
}

#[test]
fn records_sorted_by_input_index_or_left_in_arrival_order() {
    let (state, _) = dispatched(&["a.eml", "b.eml"]);
    let (state, _) = update(
        state,
        Msg::FileSucceeded {
            job_id: 1,
            record: record("b"),
        },
    );
    let (state, _) = update(
        state,
        Msg::FileSucceeded {
            job_id: 0,
            record: record("a"),
        },
    );

    let arrival: Vec<_> = state
        .records_in_arrival_order()
        .map(|r| r.subject().to_string())
        .collect();
    assert_eq!(arrival, vec!["b", "a"]);

    let ordered: Vec<_> = state
        .clone()
        .into_records(true)
        .iter()
        .map(|r| r.subject().to_string())
        .collect();
    assert_eq!(ordered, vec!["a", "b"]);

    let unordered: Vec<_> = state
        .into_records(false)
        .iter()
        .map(|r| r.subject().to_string())
        .collect();
    assert_eq!(unordered, vec!["b", "a"]);
}

#[test]
fn duplicate_or_unknown_results_are_ignored() {
    let (state, _) = dispatched(&["a.eml"]);
    let (state, _) = update(
        state,
        Msg::FileSucceeded {
            job_id: 0,
            record: record("a"),
        },
    );
    let (state, effects) = update(
        state,
        Msg::FileFailed {
            job_id: 0,
            reason: "late".into(),
        },
    );
    assert!(effects.is_empty());

    let (state, effects) = update(
        state,
        Msg::FileFailed {
            job_id: 9,
            reason: "unknown".into(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.job_status(0), Some(JobStatus::Succeeded));
    assert_eq!(state.records_in_arrival_order().count(), 1);
}

#[test]
fn unreported_jobs_fail_when_workers_join() {
    let (state, _) = dispatched(&["a.eml", "lost.eml"]);
    let (state, _) = update(
        state,
        Msg::FileSucceeded {
            job_id: 0,
            record: record("a"),
        },
    );
    let (state, _) = update(state, Msg::QueueClosed);
    let (state, effects) = update(state, Msg::WorkersJoined);

    assert_eq!(effects.len(), 1);
    assert!(matches!(
        &effects[0],
        Effect::ReportFailure { job_id: 1, path, .. } if path == &PathBuf::from("lost.eml")
    ));
    assert_eq!(state.job_status(1), Some(JobStatus::Failed));
}

#[test]
fn workers_joined_before_queue_closed_is_ignored() {
    let (state, _) = dispatched(&["a.eml"]);
    let (state, effects) = update(state, Msg::WorkersJoined);

    assert!(effects.is_empty());
    assert_eq!(state.phase(), BatchPhase::Dispatching);
}

#[test]
fn results_before_dispatch_are_ignored() {
    let state = BatchState::new();
    let (state, effects) = update(
        state.clone(),
        Msg::FileFailed {
            job_id: 0,
            reason: "early".into(),
        },
    );

    assert_eq!(state, BatchState::new());
    assert!(effects.is_empty());
}
