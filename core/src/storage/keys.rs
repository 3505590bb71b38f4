//! Persisted-key schema. A record written under these keys by one version
//! must stay readable by later versions (after migration).

pub const RESUME_DATA: &str = "resumeBuilderData";
pub const RESUME_TEMPLATE: &str = "resumeBuilderTemplate";
pub const RESUME_COLOR: &str = "resumeBuilderColor";
pub const FINAL_SUBMISSION: &str = "rb_final_submission";
pub const PROOF_CHECKLIST: &str = "rb_proof_checklist";

pub fn step_artifact_key(step_id: u8) -> String {
    format!("rb_step_{}_artifact", step_id)
}

pub fn step_checks_key(step_id: u8) -> String {
    format!("rb_step_{}_checks", step_id)
}

pub fn step_breaks_key(step_id: u8) -> String {
    format!("rb_step_{}_breaks", step_id)
}
