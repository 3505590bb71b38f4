use crate::error::{CoreError, CoreResult};
use crate::storage::keys;
use crate::storage::store::StoreAdapter;
use crate::track::steps::STEP_COUNT;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SubmissionLinks {
    pub lovable: String,
    pub github: String,
    pub deploy: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LinkField {
    Lovable,
    Github,
    Deploy,
}

impl LinkField {
    pub fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "lovable" => Ok(LinkField::Lovable),
            "github" => Ok(LinkField::Github),
            "deploy" => Ok(LinkField::Deploy),
            _ => Err(CoreError::InvalidInput(format!(
                "unknown submission link field: {}",
                s
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkField::Lovable => "lovable",
            LinkField::Github => "github",
            LinkField::Deploy => "deploy",
        }
    }
}

impl SubmissionLinks {
    pub fn get(&self, field: LinkField) -> &str {
        match field {
            LinkField::Lovable => &self.lovable,
            LinkField::Github => &self.github,
            LinkField::Deploy => &self.deploy,
        }
    }

    pub fn set(&mut self, field: LinkField, value: String) {
        match field {
            LinkField::Lovable => self.lovable = value,
            LinkField::Github => self.github = value,
            LinkField::Deploy => self.deploy = value,
        }
    }
}

/// The ten confirmation keys on the proof page. Stored as one JSON object.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProofChecklist {
    pub storage: bool,
    pub preview: bool,
    pub template: bool,
    pub theme: bool,
    pub ats: bool,
    pub updates: bool,
    pub export: bool,
    pub empty: bool,
    pub mobile: bool,
    pub console: bool,
}

impl ProofChecklist {
    pub fn get(&self, key: &str) -> CoreResult<bool> {
        Ok(match key {
            "storage" => self.storage,
            "preview" => self.preview,
            "template" => self.template,
            "theme" => self.theme,
            "ats" => self.ats,
            "updates" => self.updates,
            "export" => self.export,
            "empty" => self.empty,
            "mobile" => self.mobile,
            "console" => self.console,
            _ => {
                return Err(CoreError::InvalidInput(format!(
                    "unknown checklist key: {}",
                    key
                )))
            }
        })
    }

    pub fn set(&mut self, key: &str, value: bool) -> CoreResult<()> {
        match key {
            "storage" => self.storage = value,
            "preview" => self.preview = value,
            "template" => self.template = value,
            "theme" => self.theme = value,
            "ats" => self.ats = value,
            "updates" => self.updates = value,
            "export" => self.export = value,
            "empty" => self.empty = value,
            "mobile" => self.mobile = value,
            "console" => self.console = value,
            _ => {
                return Err(CoreError::InvalidInput(format!(
                    "unknown checklist key: {}",
                    key
                )))
            }
        }
        Ok(())
    }

    pub fn toggle(&mut self, key: &str) -> CoreResult<bool> {
        let next = !self.get(key)?;
        self.set(key, next)?;
        Ok(next)
    }

    pub fn all_confirmed(&self) -> bool {
        self.storage
            && self.preview
            && self.template
            && self.theme
            && self.ats
            && self.updates
            && self.export
            && self.empty
            && self.mobile
            && self.console
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChecklistItemDefinition {
    pub key: String,
    pub label: String,
}

/// Display catalog for the proof checklist, ordered as rendered.
pub fn proof_checklist_items() -> Vec<ChecklistItemDefinition> {
    let items = [
        ("storage", "All form sections save to local storage"),
        ("preview", "Live preview updates in real-time"),
        ("template", "Template switching preserves data"),
        ("theme", "Color theme persists after refresh"),
        ("ats", "ATS score calculates correctly"),
        ("updates", "Score updates live on edit"),
        ("export", "Export buttons work (copy/download)"),
        ("empty", "Empty states handled gracefully"),
        ("mobile", "Mobile responsive layout works"),
        ("console", "No console errors on any page"),
    ];
    items
        .iter()
        .map(|(key, label)| ChecklistItemDefinition {
            key: key.to_string(),
            label: label.to_string(),
        })
        .collect()
}

/// Valid means an absolute URL with a scheme and an authority; anything that
/// fails to parse is invalid, never an error.
pub fn is_valid_submission_url(raw: &str) -> bool {
    if raw.is_empty() {
        return false;
    }
    match Url::parse(raw) {
        Ok(url) => url.has_authority(),
        Err(_) => false,
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkValidity {
    pub lovable: bool,
    pub github: bool,
    pub deploy: bool,
}

pub fn link_validity(links: &SubmissionLinks) -> LinkValidity {
    LinkValidity {
        lovable: is_valid_submission_url(&links.lovable),
        github: is_valid_submission_url(&links.github),
        deploy: is_valid_submission_url(&links.deploy),
    }
}

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ShipBlockReason {
    STEPS_INCOMPLETE,
    CHECKLIST_INCOMPLETE,
    LINKS_INVALID,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipGateInputs {
    pub step_artifacts: BTreeMap<u8, bool>,
    pub checklist: ProofChecklist,
    pub links: SubmissionLinks,
}

/// Shipped iff all 8 step artifacts are present, all 10 checklist keys are
/// confirmed, and all three links hold valid URLs. The first failing
/// category is the block reason.
pub fn evaluate_ship_gate(i: &ShipGateInputs) -> Result<(), ShipBlockReason> {
    let steps_complete = i.step_artifacts.len() == STEP_COUNT as usize
        && (1..=STEP_COUNT).all(|id| i.step_artifacts.get(&id).copied().unwrap_or(false));
    if !steps_complete {
        return Err(ShipBlockReason::STEPS_INCOMPLETE);
    }
    if !i.checklist.all_confirmed() {
        return Err(ShipBlockReason::CHECKLIST_INCOMPLETE);
    }
    let validity = link_validity(&i.links);
    if !(validity.lovable && validity.github && validity.deploy) {
        return Err(ShipBlockReason::LINKS_INVALID);
    }
    Ok(())
}

pub fn is_shipped(i: &ShipGateInputs) -> bool {
    evaluate_ship_gate(i).is_ok()
}

pub fn final_submission_text(links: &SubmissionLinks) -> String {
    format!(
        "AI Resume Builder — Final Submission\n\n\
         Lovable Project: {}\n\
         GitHub Repository: {}\n\
         Live Deployment: {}\n\n\
         Core Capabilities:\n\
         - Structured resume builder\n\
         - Deterministic ATS scoring\n\
         - Template switching\n\
         - PDF export with clean formatting\n\
         - Persistence + validation checklist",
        links.lovable, links.github, links.deploy
    )
}

pub fn load_links<S: StoreAdapter>(store: &S) -> CoreResult<SubmissionLinks> {
    match store.get(keys::FINAL_SUBMISSION)? {
        None => Ok(SubmissionLinks::default()),
        Some(raw) => Ok(serde_json::from_str(&raw)?),
    }
}

pub fn load_checklist<S: StoreAdapter>(store: &S) -> CoreResult<ProofChecklist> {
    match store.get(keys::PROOF_CHECKLIST)? {
        None => Ok(ProofChecklist::default()),
        Some(raw) => Ok(serde_json::from_str(&raw)?),
    }
}
