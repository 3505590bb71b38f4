use crate::error::{CoreError, CoreResult};
use crate::journal::event::{now_rfc3339_utc, session_id_ulid, Actor, JournalEvent};
use crate::journal::log::Journal;
use crate::storage::keys;
use crate::storage::store::StoreAdapter;
use crate::track::steps::{
    load_step_catalog, next_target, step_by_id, StepAdvance, StepDefinition,
};
use crate::track::submission::{
    evaluate_ship_gate, final_submission_text, is_valid_submission_url, link_validity,
    load_checklist, load_links, LinkField, LinkValidity, ProofChecklist, ShipBlockReason,
    ShipGateInputs, SubmissionLinks,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Artifact value written by the proof page's direct toggle, as opposed to a
/// real upload payload.
pub const MANUAL_OVERRIDE_SENTINEL: &str = "manual_override";

/// Per-step state assembled from the three persisted keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StepProgress {
    pub artifact: Option<String>,
    pub checked_verification: BTreeMap<usize, bool>,
    pub checked_break_tests: BTreeMap<usize, bool>,
}

impl StepProgress {
    pub fn artifact_present(&self) -> bool {
        self.artifact.is_some()
    }

    pub fn is_override(&self) -> bool {
        self.artifact.as_deref() == Some(MANUAL_OVERRIDE_SENTINEL)
    }

    pub fn all_verification_checked(&self, item_count: usize) -> bool {
        (0..item_count).all(|i| self.checked_verification.get(&i).copied().unwrap_or(false))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    Verification,
    BreakTest,
}

impl CheckKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckKind::Verification => "verification",
            CheckKind::BreakTest => "break_test",
        }
    }

    fn key_for(&self, step_id: u8) -> String {
        match self {
            CheckKind::Verification => keys::step_checks_key(step_id),
            CheckKind::BreakTest => keys::step_breaks_key(step_id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipStatus {
    pub shipped: bool,
    pub block_reason: Option<ShipBlockReason>,
    pub link_validity: LinkValidity,
}

pub fn load_step_artifacts<S: StoreAdapter>(
    store: &S,
    catalog: &[StepDefinition],
) -> CoreResult<BTreeMap<u8, bool>> {
    let mut map = BTreeMap::new();
    for step in catalog {
        let present = store.get(&keys::step_artifact_key(step.id))?.is_some();
        map.insert(step.id, present);
    }
    Ok(map)
}

/// Drives the build track: per-step artifact and toggle state, the next-step
/// gate, and the submission/proof aggregation.
pub struct TrackManager<S: StoreAdapter> {
    store: S,
    journal: Journal,
    session_id: String,
    catalog: Vec<StepDefinition>,
}

impl<S: StoreAdapter> TrackManager<S> {
    pub fn open(store: S, journal: Journal) -> CoreResult<Self> {
        let catalog = load_step_catalog()?;
        let mut manager = Self {
            store,
            journal,
            session_id: session_id_ulid(),
            catalog,
        };
        manager.journal_event(Actor::System, "SESSION_STARTED", serde_json::json!({}))?;
        Ok(manager)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn catalog(&self) -> &[StepDefinition] {
        &self.catalog
    }

    pub fn progress(&self, step_id: u8) -> CoreResult<StepProgress> {
        step_by_id(&self.catalog, step_id)?;
        Ok(StepProgress {
            artifact: self.store.get(&keys::step_artifact_key(step_id))?,
            checked_verification: self.load_checks(&keys::step_checks_key(step_id))?,
            checked_break_tests: self.load_checks(&keys::step_breaks_key(step_id))?,
        })
    }

    /// Stores an uploaded artifact. Replacing an existing artifact never
    /// regresses presence; only the explicit clear does.
    pub fn set_artifact(&mut self, step_id: u8, artifact: &str) -> CoreResult<()> {
        step_by_id(&self.catalog, step_id)?;
        if artifact.is_empty() {
            return Err(CoreError::InvalidInput(
                "artifact must not be empty".to_string(),
            ));
        }
        self.store.set(&keys::step_artifact_key(step_id), artifact)?;
        self.journal_event(
            Actor::User,
            "STEP_ARTIFACT_SET",
            serde_json::json!({
                "step_id": step_id,
                "override": artifact == MANUAL_OVERRIDE_SENTINEL
            }),
        )
    }

    /// Marks the step complete without an upload, from the proof page.
    pub fn force_set_artifact(&mut self, step_id: u8) -> CoreResult<()> {
        self.set_artifact(step_id, MANUAL_OVERRIDE_SENTINEL)
    }

    pub fn force_clear_artifact(&mut self, step_id: u8) -> CoreResult<()> {
        step_by_id(&self.catalog, step_id)?;
        self.store.remove(&keys::step_artifact_key(step_id))?;
        self.journal_event(
            Actor::User,
            "STEP_ARTIFACT_CLEARED",
            serde_json::json!({"step_id": step_id}),
        )
    }

    pub fn toggle_verification(&mut self, step_id: u8, item_index: usize) -> CoreResult<bool> {
        self.toggle_check(step_id, CheckKind::Verification, item_index)
    }

    pub fn toggle_break_test(&mut self, step_id: u8, item_index: usize) -> CoreResult<bool> {
        self.toggle_check(step_id, CheckKind::BreakTest, item_index)
    }

    fn toggle_check(
        &mut self,
        step_id: u8,
        kind: CheckKind,
        item_index: usize,
    ) -> CoreResult<bool> {
        let step = step_by_id(&self.catalog, step_id)?;
        let item_count = match kind {
            CheckKind::Verification => step.verification.len(),
            CheckKind::BreakTest => step.break_tests.len(),
        };
        if item_index >= item_count {
            return Err(CoreError::InvalidInput(format!(
                "{} item {} out of range for step {}",
                kind.as_str(),
                item_index,
                step_id
            )));
        }
        let key = kind.key_for(step_id);
        let mut checks = self.load_checks(&key)?;
        let next = !checks.get(&item_index).copied().unwrap_or(false);
        checks.insert(item_index, next);
        self.store.set(&key, &serde_json::to_string(&checks)?)?;
        self.journal_event(
            Actor::User,
            "STEP_CHECK_TOGGLED",
            serde_json::json!({
                "step_id": step_id,
                "kind": kind.as_str(),
                "item_index": item_index,
                "checked": next
            }),
        )?;
        Ok(next)
    }

    /// The next-step gate: artifact present and every verification item
    /// checked. Break tests never factor in.
    pub fn next_unlocked(&self, step_id: u8) -> CoreResult<bool> {
        let step = step_by_id(&self.catalog, step_id)?;
        let verification_count = step.verification.len();
        let progress = self.progress(step_id)?;
        Ok(progress.artifact_present() && progress.all_verification_checked(verification_count))
    }

    /// None while the gate is locked; otherwise the next numbered step or
    /// the proof view after step 8.
    pub fn advance_target(&self, step_id: u8) -> CoreResult<Option<StepAdvance>> {
        if !self.next_unlocked(step_id)? {
            return Ok(None);
        }
        Ok(Some(next_target(step_id)?))
    }

    pub fn step_artifacts(&self) -> CoreResult<BTreeMap<u8, bool>> {
        load_step_artifacts(&self.store, &self.catalog)
    }

    pub fn links(&self) -> CoreResult<SubmissionLinks> {
        load_links(&self.store)
    }

    /// Persists the link and reports its validity.
    pub fn set_link(&mut self, field: LinkField, value: &str) -> CoreResult<bool> {
        let mut links = load_links(&self.store)?;
        links.set(field, value.to_string());
        self.store
            .set(keys::FINAL_SUBMISSION, &serde_json::to_string(&links)?)?;
        let valid = is_valid_submission_url(value);
        self.journal_event(
            Actor::User,
            "SUBMISSION_LINK_SET",
            serde_json::json!({"field": field.as_str(), "valid": valid}),
        )?;
        Ok(valid)
    }

    pub fn checklist(&self) -> CoreResult<ProofChecklist> {
        load_checklist(&self.store)
    }

    pub fn toggle_checklist_item(&mut self, key: &str) -> CoreResult<bool> {
        let mut checklist = load_checklist(&self.store)?;
        let next = checklist.toggle(key)?;
        self.store
            .set(keys::PROOF_CHECKLIST, &serde_json::to_string(&checklist)?)?;
        self.journal_event(
            Actor::User,
            "PROOF_CHECKLIST_TOGGLED",
            serde_json::json!({"key": key, "checked": next}),
        )?;
        Ok(next)
    }

    pub fn ship_gate_inputs(&self) -> CoreResult<ShipGateInputs> {
        Ok(ShipGateInputs {
            step_artifacts: self.step_artifacts()?,
            checklist: self.checklist()?,
            links: self.links()?,
        })
    }

    pub fn evaluate_ship(&mut self) -> CoreResult<ShipStatus> {
        let inputs = self.ship_gate_inputs()?;
        let outcome = evaluate_ship_gate(&inputs);
        let status = ShipStatus {
            shipped: outcome.is_ok(),
            block_reason: outcome.err(),
            link_validity: link_validity(&inputs.links),
        };
        let reason = status.block_reason.map(|r| format!("{:?}", r));
        self.journal_event(
            Actor::System,
            "SHIP_GATE_EVALUATED",
            serde_json::json!({"shipped": status.shipped, "block_reason": reason}),
        )?;
        Ok(status)
    }

    pub fn submission_text(&self) -> CoreResult<String> {
        Ok(final_submission_text(&self.links()?))
    }

    fn load_checks(&self, key: &str) -> CoreResult<BTreeMap<usize, bool>> {
        match self.store.get(key)? {
            None => Ok(BTreeMap::new()),
            Some(raw) => Ok(serde_json::from_str(&raw)?),
        }
    }

    fn journal_event(
        &mut self,
        actor: Actor,
        event_type: &str,
        details: serde_json::Value,
    ) -> CoreResult<()> {
        self.journal.append(JournalEvent {
            ts_utc: now_rfc3339_utc(),
            event_type: event_type.to_string(),
            session_id: self.session_id.clone(),
            actor,
            details,
            prev_event_hash: String::new(),
            event_hash: String::new(),
        })?;
        Ok(())
    }
}
