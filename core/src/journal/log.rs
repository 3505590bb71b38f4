use crate::error::{CoreError, CoreResult};
use crate::journal::event::{compute_event_hash, finalize_event, JournalEvent, ZERO_HASH_64};
use serde_json::Value;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Append-only NDJSON journal. One file per session store; the writer keeps
/// the running chain head so appends stay O(1).
pub struct Journal {
    path: PathBuf,
    last_hash: String,
}

impl Journal {
    pub fn open_or_create(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            File::create(&path)?;
            return Ok(Self {
                path,
                last_hash: ZERO_HASH_64.to_string(),
            });
        }

        let file = File::open(&path)?;
        let reader = BufReader::new(file);
        let mut last_hash = ZERO_HASH_64.to_string();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let v: Value = serde_json::from_str(&line)?;
            let eh = v
                .get("event_hash")
                .and_then(|x| x.as_str())
                .ok_or_else(|| {
                    CoreError::JournalCorrupt("journal line missing event_hash".to_string())
                })?;
            last_hash = eh.to_string();
        }
        Ok(Self { path, last_hash })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, mut event: JournalEvent) -> CoreResult<JournalEvent> {
        event.prev_event_hash = self.last_hash.clone();
        let event = finalize_event(event)?;
        // hashing already ran over canonical bytes; the stored line can be compact JSON
        let line = serde_json::to_string(&event)?;
        let mut f = OpenOptions::new().append(true).open(&self.path)?;
        f.write_all(line.as_bytes())?;
        f.write_all(b"\n")?;
        self.last_hash = event.event_hash.clone();
        Ok(event)
    }
}

pub fn read_all(path: impl AsRef<Path>) -> CoreResult<Vec<JournalEvent>> {
    let file = File::open(path.as_ref())?;
    let reader = BufReader::new(file);
    let mut events = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        events.push(serde_json::from_str::<JournalEvent>(&line)?);
    }
    Ok(events)
}

/// Replays the chain: every prev hash must match the prior event hash and
/// every stored hash must recompute. Returns the event count.
pub fn verify_chain(path: impl AsRef<Path>) -> CoreResult<usize> {
    let events = read_all(path)?;
    let mut expected_prev = ZERO_HASH_64.to_string();
    for (idx, event) in events.iter().enumerate() {
        if event.prev_event_hash != expected_prev {
            return Err(CoreError::JournalCorrupt(format!(
                "event {} prev_event_hash broke the chain",
                idx
            )));
        }
        let recomputed = compute_event_hash(event)?;
        if recomputed != event.event_hash {
            return Err(CoreError::JournalCorrupt(format!(
                "event {} hash does not recompute",
                idx
            )));
        }
        expected_prev = event.event_hash.clone();
    }
    Ok(events.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::event::Actor;

    fn event(event_type: &str, details: serde_json::Value) -> JournalEvent {
        JournalEvent {
            ts_utc: "2025-01-01T00:00:00Z".to_string(),
            event_type: event_type.to_string(),
            session_id: "s_TEST".to_string(),
            actor: Actor::System,
            details,
            prev_event_hash: String::new(),
            event_hash: String::new(),
        }
    }

    #[test]
    fn append_chains_and_verifies() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("journal.ndjson");
        let mut journal = Journal::open_or_create(&path).expect("open");

        let first = journal
            .append(event("SESSION_STARTED", serde_json::json!({})))
            .expect("append");
        assert_eq!(first.prev_event_hash, ZERO_HASH_64);

        let second = journal
            .append(event(
                "RESUME_SAVED",
                serde_json::json!({"field": "summary", "score": 10}),
            ))
            .expect("append");
        assert_eq!(second.prev_event_hash, first.event_hash);

        assert_eq!(verify_chain(&path).expect("verify"), 2);
    }

    #[test]
    fn reopen_resumes_chain_head() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("journal.ndjson");
        {
            let mut journal = Journal::open_or_create(&path).expect("open");
            journal
                .append(event("SESSION_STARTED", serde_json::json!({})))
                .expect("append");
        }
        let mut journal = Journal::open_or_create(&path).expect("reopen");
        journal
            .append(event(
                "TEMPLATE_CHANGED",
                serde_json::json!({"template": "Modern"}),
            ))
            .expect("append");
        assert_eq!(verify_chain(&path).expect("verify"), 2);
    }

    #[test]
    fn tampered_line_fails_verification() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("journal.ndjson");
        let mut journal = Journal::open_or_create(&path).expect("open");
        journal
            .append(event("SESSION_STARTED", serde_json::json!({})))
            .expect("append");

        let tampered = fs::read_to_string(&path)
            .expect("read")
            .replace("SESSION_STARTED", "THEME_CHANGED");
        fs::write(&path, tampered).expect("write");
        assert!(verify_chain(&path).is_err());
    }
}
