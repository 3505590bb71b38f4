use resume_core::journal::log::{read_all, Journal};
use resume_core::storage::file::FileStore;
use resume_core::track::manager::TrackManager;
use resume_core::track::steps::STEP_COUNT;
use resume_core::track::submission::{proof_checklist_items, LinkField, ShipBlockReason};
use std::path::Path;

fn open_manager(dir: &Path) -> TrackManager<FileStore> {
    TrackManager::open(
        FileStore::open(dir.join("store")).unwrap(),
        Journal::open_or_create(dir.join("track_journal.ndjson")).unwrap(),
    )
    .unwrap()
}

fn complete_steps(manager: &mut TrackManager<FileStore>) {
    for id in 1..=STEP_COUNT {
        manager.force_set_artifact(id).unwrap();
    }
}

fn confirm_checklist(manager: &mut TrackManager<FileStore>) {
    for item in proof_checklist_items() {
        assert!(manager.toggle_checklist_item(&item.key).unwrap());
    }
}

fn set_valid_links(manager: &mut TrackManager<FileStore>) {
    assert!(manager
        .set_link(LinkField::Lovable, "https://lovable.dev/projects/resume")
        .unwrap());
    assert!(manager
        .set_link(LinkField::Github, "https://github.com/user/resume-builder")
        .unwrap());
    assert!(manager
        .set_link(LinkField::Deploy, "https://resume.example.app")
        .unwrap());
}

#[test]
fn gate_blocks_in_category_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = open_manager(dir.path());

    // nothing done yet: steps block first even though links are also invalid
    let status = manager.evaluate_ship().unwrap();
    assert!(!status.shipped);
    assert_eq!(status.block_reason, Some(ShipBlockReason::STEPS_INCOMPLETE));

    complete_steps(&mut manager);
    let status = manager.evaluate_ship().unwrap();
    assert_eq!(
        status.block_reason,
        Some(ShipBlockReason::CHECKLIST_INCOMPLETE)
    );

    confirm_checklist(&mut manager);
    let status = manager.evaluate_ship().unwrap();
    assert_eq!(status.block_reason, Some(ShipBlockReason::LINKS_INVALID));

    set_valid_links(&mut manager);
    let status = manager.evaluate_ship().unwrap();
    assert!(status.shipped);
    assert_eq!(status.block_reason, None);
}

#[test]
fn one_cleared_step_blocks_shipping_again() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = open_manager(dir.path());
    complete_steps(&mut manager);
    confirm_checklist(&mut manager);
    set_valid_links(&mut manager);
    assert!(manager.evaluate_ship().unwrap().shipped);

    manager.force_clear_artifact(4).unwrap();
    let status = manager.evaluate_ship().unwrap();
    assert!(!status.shipped);
    assert_eq!(status.block_reason, Some(ShipBlockReason::STEPS_INCOMPLETE));
}

#[test]
fn invalid_link_shapes_block_shipping() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = open_manager(dir.path());
    complete_steps(&mut manager);
    confirm_checklist(&mut manager);

    // scheme-less and authority-less values both fail validation
    assert!(!manager
        .set_link(LinkField::Lovable, "lovable.dev/projects/resume")
        .unwrap());
    assert!(!manager
        .set_link(LinkField::Github, "mailto:user@example.com")
        .unwrap());
    assert!(manager
        .set_link(LinkField::Deploy, "https://resume.example.app")
        .unwrap());

    let status = manager.evaluate_ship().unwrap();
    assert_eq!(status.block_reason, Some(ShipBlockReason::LINKS_INVALID));
    assert!(!status.link_validity.lovable);
    assert!(!status.link_validity.github);
    assert!(status.link_validity.deploy);
}

#[test]
fn shipped_state_produces_submission_text_and_journal_trail() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = open_manager(dir.path());
    complete_steps(&mut manager);
    confirm_checklist(&mut manager);
    set_valid_links(&mut manager);

    let status = manager.evaluate_ship().unwrap();
    assert!(status.shipped);

    let text = manager.submission_text().unwrap();
    assert!(text.starts_with("AI Resume Builder"));
    assert!(text.contains("https://github.com/user/resume-builder"));
    assert!(text.contains("Deterministic ATS scoring"));

    let events = read_all(dir.path().join("track_journal.ndjson")).unwrap();
    let gate = events
        .iter()
        .rev()
        .find(|e| e.event_type == "SHIP_GATE_EVALUATED")
        .unwrap();
    assert_eq!(
        gate.details.get("shipped").and_then(|v| v.as_bool()),
        Some(true)
    );
    assert!(events
        .iter()
        .any(|e| e.event_type == "SUBMISSION_LINK_SET"));
    assert!(events
        .iter()
        .any(|e| e.event_type == "PROOF_CHECKLIST_TOGGLED"));
}
