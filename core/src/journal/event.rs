use crate::error::{CoreError, CoreResult};
use crate::journal::canonical;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use ulid::Ulid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    System,
    User,
}

/// One line of the session journal. Events chain through `prev_event_hash`
/// so a journal edited after the fact fails verification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JournalEvent {
    pub ts_utc: String, // RFC3339 UTC string
    pub event_type: String,
    pub session_id: String,
    pub actor: Actor,
    pub details: serde_json::Value,
    pub prev_event_hash: String, // hex 64
    pub event_hash: String,      // hex 64
}

pub const ZERO_HASH_64: &str = "0000000000000000000000000000000000000000000000000000000000000000";

// event_hash = SHA-256 over the canonical bytes of the full envelope with
// event_hash forced to ZERO_HASH_64 during hashing, so the field itself never
// feeds its own digest.
pub fn compute_event_hash(event: &JournalEvent) -> CoreResult<String> {
    let mut e = event.clone();
    e.event_hash = ZERO_HASH_64.to_string();
    let bytes = canonical::to_canonical_bytes(&e)?;
    let mut h = Sha256::new();
    h.update(bytes);
    Ok(hex::encode(h.finalize()))
}

pub fn finalize_event(mut event: JournalEvent) -> CoreResult<JournalEvent> {
    if event.prev_event_hash.len() != 64
        || !event.prev_event_hash.chars().all(|c| c.is_ascii_hexdigit())
    {
        return Err(CoreError::InvalidInput(
            "prev_event_hash must be 64 hex chars".to_string(),
        ));
    }
    validate_event_taxonomy(&event)?;
    let eh = compute_event_hash(&event)?;
    event.event_hash = eh;
    Ok(event)
}

fn validate_event_taxonomy(event: &JournalEvent) -> CoreResult<()> {
    let allowed = [
        "SESSION_STARTED",
        "RESUME_LOADED",
        "RESUME_LOAD_FALLBACK",
        "RESUME_SAVED",
        "TEMPLATE_CHANGED",
        "THEME_CHANGED",
        "SKILL_SUGGESTIONS_REQUESTED",
        "SKILL_SUGGESTIONS_APPLIED",
        "SKILL_SUGGESTIONS_STALE",
        "STEP_ARTIFACT_SET",
        "STEP_ARTIFACT_CLEARED",
        "STEP_CHECK_TOGGLED",
        "SUBMISSION_LINK_SET",
        "PROOF_CHECKLIST_TOGGLED",
        "SHIP_GATE_EVALUATED",
    ];
    if !allowed.contains(&event.event_type.as_str()) {
        return Err(CoreError::InvalidInput(format!(
            "unknown event_type {}",
            event.event_type
        )));
    }
    let required = required_detail_keys(&event.event_type);
    for k in required {
        if event.details.get(k).is_none() {
            return Err(CoreError::InvalidInput(format!(
                "event {} missing details.{}",
                event.event_type, k
            )));
        }
    }
    Ok(())
}

fn required_detail_keys(event_type: &str) -> &'static [&'static str] {
    match event_type {
        "RESUME_LOADED" => &["score", "migrated"],
        "RESUME_LOAD_FALLBACK" => &["error"],
        "RESUME_SAVED" => &["field", "score"],
        "TEMPLATE_CHANGED" => &["template"],
        "THEME_CHANGED" => &["color"],
        "SKILL_SUGGESTIONS_REQUESTED" => &["generation", "delay_ms"],
        "SKILL_SUGGESTIONS_APPLIED" => &["generation", "added"],
        "SKILL_SUGGESTIONS_STALE" => &["generation", "current"],
        "STEP_ARTIFACT_SET" => &["step_id", "override"],
        "STEP_ARTIFACT_CLEARED" => &["step_id"],
        "STEP_CHECK_TOGGLED" => &["step_id", "kind", "item_index", "checked"],
        "SUBMISSION_LINK_SET" => &["field", "valid"],
        "PROOF_CHECKLIST_TOGGLED" => &["key", "checked"],
        "SHIP_GATE_EVALUATED" => &["shipped"],
        _ => &[],
    }
}

pub fn session_id_ulid() -> String {
    format!("s_{}", Ulid::new())
}

pub fn now_rfc3339_utc() -> String {
    // Rfc3339 formatting of a UTC timestamp does not fail; the epoch string
    // keeps this total without an unwrap.
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(event_type: &str, details: serde_json::Value) -> JournalEvent {
        JournalEvent {
            ts_utc: "2025-01-01T00:00:00Z".to_string(),
            event_type: event_type.to_string(),
            session_id: "s_TEST".to_string(),
            actor: Actor::User,
            details,
            prev_event_hash: ZERO_HASH_64.to_string(),
            event_hash: String::new(),
        }
    }

    #[test]
    fn finalize_sets_stable_hash() {
        let e = sample("RESUME_SAVED", serde_json::json!({"field": "summary", "score": 40}));
        let a = finalize_event(e.clone()).expect("finalize");
        let b = finalize_event(e).expect("finalize");
        assert_eq!(a.event_hash, b.event_hash);
        assert_eq!(a.event_hash.len(), 64);
    }

    #[test]
    fn rejects_unknown_event_type() {
        let e = sample("RESUME_DELETED", serde_json::json!({}));
        assert!(finalize_event(e).is_err());
    }

    #[test]
    fn rejects_missing_required_detail() {
        let e = sample("RESUME_SAVED", serde_json::json!({"field": "summary"}));
        assert!(finalize_event(e).is_err());
    }

    #[test]
    fn timestamps_parse_back_as_rfc3339() {
        let ts = now_rfc3339_utc();
        time::OffsetDateTime::parse(&ts, &time::format_description::well_known::Rfc3339)
            .expect("rfc3339");
    }

    #[test]
    fn session_ids_carry_prefix() {
        let id = session_id_ulid();
        assert!(id.starts_with("s_"));
        assert_eq!(id.len(), 2 + 26);
    }
}
