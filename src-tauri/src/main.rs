#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use resume_core::error::CoreResult;
use resume_core::journal::log::Journal;
use resume_core::resume::ats::{check_bullet, AtsReport};
use resume_core::resume::model::{
    EducationEntry, ExperienceEntry, PersonalInfo, ProjectEntry, ResumeRecord, SkillCategory,
    SocialLinks,
};
use resume_core::resume::session::BuilderSession;
use resume_core::resume::suggest::SuggestionTicket;
use resume_core::storage::file::FileStore;
use resume_core::track::manager::{CheckKind, ShipStatus, StepProgress, TrackManager};
use resume_core::track::steps::{StepAdvance, StepDefinition};
use resume_core::track::submission::{
    link_validity, proof_checklist_items, ChecklistItemDefinition, LinkField, LinkValidity,
    ProofChecklist, SubmissionLinks,
};
use serde::Serialize;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tauri::Manager;

struct AppState {
    builder: Mutex<BuilderSession<FileStore>>,
    track: Mutex<TrackManager<FileStore>>,
}

impl AppState {
    fn open(data_dir: &Path) -> CoreResult<Self> {
        std::fs::create_dir_all(data_dir)?;
        let store_dir = data_dir.join("store");
        let builder = BuilderSession::open(
            FileStore::open(&store_dir)?,
            Journal::open_or_create(data_dir.join("builder_journal.ndjson"))?,
        )?;
        let track = TrackManager::open(
            FileStore::open(&store_dir)?,
            Journal::open_or_create(data_dir.join("track_journal.ndjson"))?,
        )?;
        Ok(AppState {
            builder: Mutex::new(builder),
            track: Mutex::new(track),
        })
    }
}

fn lock_builder<'a>(
    state: &tauri::State<'a, AppState>,
) -> Result<MutexGuard<'a, BuilderSession<FileStore>>, String> {
    state
        .inner()
        .builder
        .lock()
        .map_err(|_| "builder session lock poisoned".to_string())
}

fn lock_track<'a>(
    state: &tauri::State<'a, AppState>,
) -> Result<MutexGuard<'a, TrackManager<FileStore>>, String> {
    state
        .inner()
        .track
        .lock()
        .map_err(|_| "track manager lock poisoned".to_string())
}

/// Everything the builder pages render from. Mutation commands return a fresh
/// snapshot so the preview and score update in the same payload.
#[derive(Debug, Serialize)]
struct BuilderSnapshot {
    record: ResumeRecord,
    report: AtsReport,
    template: String,
    theme_color: String,
    warnings: Vec<String>,
}

fn snapshot(session: &BuilderSession<FileStore>) -> BuilderSnapshot {
    BuilderSnapshot {
        record: session.record().clone(),
        report: session.report().clone(),
        template: session.template().to_string(),
        theme_color: session.theme_color().to_string(),
        warnings: session.warnings(),
    }
}

#[derive(Debug, Serialize)]
struct SkillUpdate {
    changed: bool,
    snapshot: BuilderSnapshot,
}

#[derive(Debug, Serialize)]
struct SuggestionMerge {
    added: usize,
    snapshot: BuilderSnapshot,
}

#[derive(Debug, Serialize)]
struct SubmissionState {
    links: SubmissionLinks,
    validity: LinkValidity,
    checklist: ProofChecklist,
    checklist_items: Vec<ChecklistItemDefinition>,
}

fn submission_state(track: &TrackManager<FileStore>) -> Result<SubmissionState, String> {
    let links = track.links().map_err(|e| e.to_string())?;
    let validity = link_validity(&links);
    let checklist = track.checklist().map_err(|e| e.to_string())?;
    Ok(SubmissionState {
        links,
        validity,
        checklist,
        checklist_items: proof_checklist_items(),
    })
}

#[tauri::command]
fn load_builder(state: tauri::State<'_, AppState>) -> Result<BuilderSnapshot, String> {
    let session = lock_builder(&state)?;
    Ok(snapshot(&session))
}

#[tauri::command]
fn update_personal(
    state: tauri::State<'_, AppState>,
    personal: PersonalInfo,
) -> Result<BuilderSnapshot, String> {
    let mut session = lock_builder(&state)?;
    session.update_personal(personal).map_err(|e| e.to_string())?;
    Ok(snapshot(&session))
}

#[tauri::command]
fn update_summary(
    state: tauri::State<'_, AppState>,
    summary: String,
) -> Result<BuilderSnapshot, String> {
    let mut session = lock_builder(&state)?;
    session.update_summary(summary).map_err(|e| e.to_string())?;
    Ok(snapshot(&session))
}

#[tauri::command]
fn update_social_links(
    state: tauri::State<'_, AppState>,
    links: SocialLinks,
) -> Result<BuilderSnapshot, String> {
    let mut session = lock_builder(&state)?;
    session.update_links(links).map_err(|e| e.to_string())?;
    Ok(snapshot(&session))
}

#[tauri::command]
fn add_education(
    state: tauri::State<'_, AppState>,
    entry: EducationEntry,
) -> Result<BuilderSnapshot, String> {
    let mut session = lock_builder(&state)?;
    session.add_education(entry).map_err(|e| e.to_string())?;
    Ok(snapshot(&session))
}

#[tauri::command]
fn update_education(
    state: tauri::State<'_, AppState>,
    index: usize,
    entry: EducationEntry,
) -> Result<BuilderSnapshot, String> {
    let mut session = lock_builder(&state)?;
    session
        .update_education(index, entry)
        .map_err(|e| e.to_string())?;
    Ok(snapshot(&session))
}

#[tauri::command]
fn remove_education(
    state: tauri::State<'_, AppState>,
    index: usize,
) -> Result<BuilderSnapshot, String> {
    let mut session = lock_builder(&state)?;
    session.remove_education(index).map_err(|e| e.to_string())?;
    Ok(snapshot(&session))
}

#[tauri::command]
fn add_experience(
    state: tauri::State<'_, AppState>,
    entry: ExperienceEntry,
) -> Result<BuilderSnapshot, String> {
    let mut session = lock_builder(&state)?;
    session.add_experience(entry).map_err(|e| e.to_string())?;
    Ok(snapshot(&session))
}

#[tauri::command]
fn update_experience(
    state: tauri::State<'_, AppState>,
    index: usize,
    entry: ExperienceEntry,
) -> Result<BuilderSnapshot, String> {
    let mut session = lock_builder(&state)?;
    session
        .update_experience(index, entry)
        .map_err(|e| e.to_string())?;
    Ok(snapshot(&session))
}

#[tauri::command]
fn remove_experience(
    state: tauri::State<'_, AppState>,
    index: usize,
) -> Result<BuilderSnapshot, String> {
    let mut session = lock_builder(&state)?;
    session.remove_experience(index).map_err(|e| e.to_string())?;
    Ok(snapshot(&session))
}

#[tauri::command]
fn add_project(
    state: tauri::State<'_, AppState>,
    entry: ProjectEntry,
) -> Result<BuilderSnapshot, String> {
    let mut session = lock_builder(&state)?;
    session.add_project(entry).map_err(|e| e.to_string())?;
    Ok(snapshot(&session))
}

#[tauri::command]
fn update_project(
    state: tauri::State<'_, AppState>,
    index: usize,
    entry: ProjectEntry,
) -> Result<BuilderSnapshot, String> {
    let mut session = lock_builder(&state)?;
    session
        .update_project(index, entry)
        .map_err(|e| e.to_string())?;
    Ok(snapshot(&session))
}

#[tauri::command]
fn remove_project(
    state: tauri::State<'_, AppState>,
    index: usize,
) -> Result<BuilderSnapshot, String> {
    let mut session = lock_builder(&state)?;
    session.remove_project(index).map_err(|e| e.to_string())?;
    Ok(snapshot(&session))
}

#[tauri::command]
fn add_skill(
    state: tauri::State<'_, AppState>,
    category: String,
    skill: String,
) -> Result<SkillUpdate, String> {
    let category = SkillCategory::from_str(&category).map_err(|e| e.to_string())?;
    let mut session = lock_builder(&state)?;
    let changed = session
        .add_skill(category, &skill)
        .map_err(|e| e.to_string())?;
    Ok(SkillUpdate {
        changed,
        snapshot: snapshot(&session),
    })
}

#[tauri::command]
fn remove_skill(
    state: tauri::State<'_, AppState>,
    category: String,
    skill: String,
) -> Result<SkillUpdate, String> {
    let category = SkillCategory::from_str(&category).map_err(|e| e.to_string())?;
    let mut session = lock_builder(&state)?;
    let changed = session
        .remove_skill(category, &skill)
        .map_err(|e| e.to_string())?;
    Ok(SkillUpdate {
        changed,
        snapshot: snapshot(&session),
    })
}

#[tauri::command]
fn set_template(
    state: tauri::State<'_, AppState>,
    template: String,
) -> Result<BuilderSnapshot, String> {
    let mut session = lock_builder(&state)?;
    session.set_template(&template).map_err(|e| e.to_string())?;
    Ok(snapshot(&session))
}

#[tauri::command]
fn set_theme_color(
    state: tauri::State<'_, AppState>,
    color: String,
) -> Result<BuilderSnapshot, String> {
    let mut session = lock_builder(&state)?;
    session.set_theme_color(&color).map_err(|e| e.to_string())?;
    Ok(snapshot(&session))
}

/// Starts a suggestion round. The frontend waits `delay_ms` and then calls
/// `apply_skill_suggestions` with the ticket; a newer round in between makes
/// the older ticket fail as stale.
#[tauri::command]
fn begin_skill_suggestions(state: tauri::State<'_, AppState>) -> Result<SuggestionTicket, String> {
    let mut session = lock_builder(&state)?;
    session.begin_skill_suggestion().map_err(|e| e.to_string())
}

#[tauri::command]
fn apply_skill_suggestions(
    state: tauri::State<'_, AppState>,
    ticket: SuggestionTicket,
) -> Result<SuggestionMerge, String> {
    let mut session = lock_builder(&state)?;
    let added = session
        .apply_skill_suggestion(ticket)
        .map_err(|e| e.to_string())?;
    Ok(SuggestionMerge {
        added,
        snapshot: snapshot(&session),
    })
}

#[tauri::command]
fn render_resume_text(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let session = lock_builder(&state)?;
    Ok(session.render_text())
}

#[tauri::command]
fn check_bullet_text(text: String) -> Option<String> {
    check_bullet(&text).and_then(|findings| findings.advisory().map(|s| s.to_string()))
}

#[tauri::command]
fn list_build_steps(state: tauri::State<'_, AppState>) -> Result<Vec<StepDefinition>, String> {
    let track = lock_track(&state)?;
    Ok(track.catalog().to_vec())
}

#[tauri::command]
fn get_step_progress(
    state: tauri::State<'_, AppState>,
    step_id: u8,
) -> Result<StepProgress, String> {
    let track = lock_track(&state)?;
    track.progress(step_id).map_err(|e| e.to_string())
}

#[tauri::command]
fn set_step_artifact(
    state: tauri::State<'_, AppState>,
    step_id: u8,
    artifact: String,
) -> Result<StepProgress, String> {
    let mut track = lock_track(&state)?;
    track
        .set_artifact(step_id, &artifact)
        .map_err(|e| e.to_string())?;
    track.progress(step_id).map_err(|e| e.to_string())
}

#[tauri::command]
fn override_step_artifact(
    state: tauri::State<'_, AppState>,
    step_id: u8,
) -> Result<StepProgress, String> {
    let mut track = lock_track(&state)?;
    track.force_set_artifact(step_id).map_err(|e| e.to_string())?;
    track.progress(step_id).map_err(|e| e.to_string())
}

#[tauri::command]
fn clear_step_artifact(
    state: tauri::State<'_, AppState>,
    step_id: u8,
) -> Result<StepProgress, String> {
    let mut track = lock_track(&state)?;
    track
        .force_clear_artifact(step_id)
        .map_err(|e| e.to_string())?;
    track.progress(step_id).map_err(|e| e.to_string())
}

#[tauri::command]
fn toggle_step_check(
    state: tauri::State<'_, AppState>,
    step_id: u8,
    kind: CheckKind,
    item_index: usize,
) -> Result<StepProgress, String> {
    let mut track = lock_track(&state)?;
    match kind {
        CheckKind::Verification => track.toggle_verification(step_id, item_index),
        CheckKind::BreakTest => track.toggle_break_test(step_id, item_index),
    }
    .map_err(|e| e.to_string())?;
    track.progress(step_id).map_err(|e| e.to_string())
}

#[tauri::command]
fn get_advance_target(
    state: tauri::State<'_, AppState>,
    step_id: u8,
) -> Result<Option<StepAdvance>, String> {
    let track = lock_track(&state)?;
    track.advance_target(step_id).map_err(|e| e.to_string())
}

#[tauri::command]
fn get_submission_state(state: tauri::State<'_, AppState>) -> Result<SubmissionState, String> {
    let track = lock_track(&state)?;
    submission_state(&track)
}

#[tauri::command]
fn set_submission_link(
    state: tauri::State<'_, AppState>,
    field: String,
    value: String,
) -> Result<SubmissionState, String> {
    let field = LinkField::from_str(&field).map_err(|e| e.to_string())?;
    let mut track = lock_track(&state)?;
    track.set_link(field, &value).map_err(|e| e.to_string())?;
    submission_state(&track)
}

#[tauri::command]
fn toggle_proof_item(
    state: tauri::State<'_, AppState>,
    key: String,
) -> Result<SubmissionState, String> {
    let mut track = lock_track(&state)?;
    track
        .toggle_checklist_item(&key)
        .map_err(|e| e.to_string())?;
    submission_state(&track)
}

#[tauri::command]
fn evaluate_ship(state: tauri::State<'_, AppState>) -> Result<ShipStatus, String> {
    let mut track = lock_track(&state)?;
    track.evaluate_ship().map_err(|e| e.to_string())
}

#[tauri::command]
fn get_submission_text(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let track = lock_track(&state)?;
    track.submission_text().map_err(|e| e.to_string())
}

fn main() {
    tauri::Builder::default()
        .setup(|app| {
            let data_dir = app.path().app_data_dir()?;
            let state = AppState::open(&data_dir)?;
            app.manage(state);
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            load_builder,
            update_personal,
            update_summary,
            update_social_links,
            add_education,
            update_education,
            remove_education,
            add_experience,
            update_experience,
            remove_experience,
            add_project,
            update_project,
            remove_project,
            add_skill,
            remove_skill,
            set_template,
            set_theme_color,
            begin_skill_suggestions,
            apply_skill_suggestions,
            render_resume_text,
            check_bullet_text,
            list_build_steps,
            get_step_progress,
            set_step_artifact,
            override_step_artifact,
            clear_step_artifact,
            toggle_step_check,
            get_advance_target,
            get_submission_state,
            set_submission_link,
            toggle_proof_item,
            evaluate_ship,
            get_submission_text
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
