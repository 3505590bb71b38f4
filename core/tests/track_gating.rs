use resume_core::error::CoreError;
use resume_core::journal::log::{read_all, verify_chain, Journal};
use resume_core::storage::file::FileStore;
use resume_core::track::manager::{TrackManager, MANUAL_OVERRIDE_SENTINEL};
use resume_core::track::steps::StepAdvance;
use std::path::Path;

fn open_manager(dir: &Path) -> TrackManager<FileStore> {
    TrackManager::open(
        FileStore::open(dir.join("store")).unwrap(),
        Journal::open_or_create(dir.join("track_journal.ndjson")).unwrap(),
    )
    .unwrap()
}

#[test]
fn next_step_stays_locked_until_artifact_and_checks() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = open_manager(dir.path());

    assert!(!manager.next_unlocked(1).unwrap());
    assert_eq!(manager.advance_target(1).unwrap(), None);

    manager
        .set_artifact(1, "data:image/png;base64,abc")
        .unwrap();
    assert!(!manager.next_unlocked(1).unwrap());

    let verification_count = manager.catalog()[0].verification.len();
    for i in 0..verification_count {
        assert!(manager.toggle_verification(1, i).unwrap());
    }
    assert!(manager.next_unlocked(1).unwrap());
    assert_eq!(
        manager.advance_target(1).unwrap(),
        Some(StepAdvance::Step(2))
    );
}

#[test]
fn break_tests_do_not_gate_advancement() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = open_manager(dir.path());

    manager.force_set_artifact(2).unwrap();
    let verification_count = manager.catalog()[1].verification.len();
    for i in 0..verification_count {
        manager.toggle_verification(2, i).unwrap();
    }
    // break tests stay untouched
    assert!(manager.progress(2).unwrap().checked_break_tests.is_empty());
    assert_eq!(
        manager.advance_target(2).unwrap(),
        Some(StepAdvance::Step(3))
    );
}

#[test]
fn step_eight_advances_to_proof() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = open_manager(dir.path());

    manager.force_set_artifact(8).unwrap();
    let verification_count = manager.catalog()[7].verification.len();
    for i in 0..verification_count {
        manager.toggle_verification(8, i).unwrap();
    }
    assert_eq!(manager.advance_target(8).unwrap(), Some(StepAdvance::Proof));
}

#[test]
fn toggles_flip_and_persist_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut manager = open_manager(dir.path());
        assert!(manager.toggle_verification(3, 0).unwrap());
        assert!(!manager.toggle_verification(3, 0).unwrap());
        assert!(manager.toggle_verification(3, 1).unwrap());
        assert!(manager.toggle_break_test(3, 0).unwrap());
    }

    let manager = open_manager(dir.path());
    let progress = manager.progress(3).unwrap();
    assert_eq!(progress.checked_verification.get(&0), Some(&false));
    assert_eq!(progress.checked_verification.get(&1), Some(&true));
    assert_eq!(progress.checked_break_tests.get(&0), Some(&true));
}

#[test]
fn check_index_and_step_id_are_validated() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = open_manager(dir.path());

    let err = manager.toggle_verification(2, 99).unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput(_)));

    let err = manager.toggle_verification(42, 0).unwrap_err();
    assert!(matches!(err, CoreError::UnknownStep(42)));
}

#[test]
fn override_artifact_sets_sentinel_and_clear_removes_it() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = open_manager(dir.path());

    manager.force_set_artifact(5).unwrap();
    let progress = manager.progress(5).unwrap();
    assert!(progress.is_override());
    assert_eq!(progress.artifact.as_deref(), Some(MANUAL_OVERRIDE_SENTINEL));

    manager
        .set_artifact(5, "data:application/pdf;base64,JVBERi0x")
        .unwrap();
    assert!(!manager.progress(5).unwrap().is_override());

    manager.force_clear_artifact(5).unwrap();
    assert!(!manager.progress(5).unwrap().artifact_present());

    let events = read_all(dir.path().join("track_journal.ndjson")).unwrap();
    assert!(events
        .iter()
        .any(|e| e.event_type == "STEP_ARTIFACT_CLEARED"));
    let set_events: Vec<_> = events
        .iter()
        .filter(|e| e.event_type == "STEP_ARTIFACT_SET")
        .collect();
    assert_eq!(set_events.len(), 2);
    assert_eq!(
        set_events[0].details.get("override").and_then(|v| v.as_bool()),
        Some(true)
    );
    assert_eq!(
        set_events[1].details.get("override").and_then(|v| v.as_bool()),
        Some(false)
    );
    verify_chain(dir.path().join("track_journal.ndjson")).unwrap();
}

#[test]
fn empty_artifact_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = open_manager(dir.path());
    let err = manager.set_artifact(1, "").unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput(_)));
}
