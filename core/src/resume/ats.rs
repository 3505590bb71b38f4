use crate::resume::model::ResumeRecord;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const MAX_SCORE: u32 = 100;

const ACTION_VERBS: &[&str] = &[
    "built",
    "led",
    "designed",
    "improved",
    "developed",
    "managed",
    "created",
    "initiated",
    "engineered",
    "implemented",
    "orchestrated",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AtsReport {
    pub score: u32,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleOutcome {
    pub rule_id: String,
    pub points: u32,
    pub satisfied: bool,
    pub suggestion: String,
}

fn rule(rule_id: &str, points: u32, satisfied: bool, suggestion: &str) -> RuleOutcome {
    RuleOutcome {
        rule_id: rule_id.to_string(),
        points,
        satisfied,
        suggestion: suggestion.to_string(),
    }
}

/// The eleven readiness rules in evaluation order. Suggestion order on a
/// failing record is exactly this order.
pub fn evaluate_rules(record: &ResumeRecord) -> Vec<RuleOutcome> {
    let summary_lower = record.summary.to_lowercase();
    vec![
        rule(
            "name",
            10,
            !record.personal.name.trim().is_empty(),
            "Add your full name (+10)",
        ),
        rule(
            "email",
            10,
            email_looks_valid(&record.personal.email),
            "Add a valid email (+10)",
        ),
        rule(
            "summary_length",
            10,
            record.summary.chars().count() > 50,
            "Expand summary > 50 chars (+10)",
        ),
        rule(
            "experience_detail",
            15,
            record
                .experience
                .iter()
                .any(|e| e.description.trim().chars().count() > 10),
            "Add experience with details (+15)",
        ),
        rule(
            "education",
            10,
            !record.education.is_empty(),
            "Add education (+10)",
        ),
        rule(
            "skills",
            10,
            record.skills.total_count() >= 5,
            "Add at least 5 skills (+10)",
        ),
        rule(
            "projects",
            10,
            !record.projects.is_empty(),
            "Add a project (+10)",
        ),
        rule(
            "phone",
            5,
            !record.personal.phone.is_empty(),
            "Add phone number (+5)",
        ),
        rule(
            "linkedin",
            5,
            !record.links.linkedin.is_empty(),
            "Add LinkedIn profile (+5)",
        ),
        rule(
            "github",
            5,
            !record.links.github.is_empty(),
            "Add GitHub profile (+5)",
        ),
        rule(
            "action_verbs",
            10,
            ACTION_VERBS.iter().any(|v| summary_lower.contains(v)),
            "Use action verbs in summary (+10)",
        ),
    ]
}

/// Total function: absent fields count as failed rules, never as errors.
/// Raw points top out at 105; the reported score is capped at 100.
pub fn score_resume(record: &ResumeRecord) -> AtsReport {
    let rules = evaluate_rules(record);
    let raw: u32 = rules
        .iter()
        .filter(|r| r.satisfied)
        .map(|r| r.points)
        .sum();
    let suggestions = rules
        .iter()
        .filter(|r| !r.satisfied)
        .map(|r| r.suggestion.clone())
        .collect();
    AtsReport {
        score: raw.min(MAX_SCORE),
        suggestions,
    }
}

fn email_looks_valid(email: &str) -> bool {
    if email.is_empty() {
        return false;
    }
    let re = Regex::new(r"\S+@\S+\.\S+").unwrap_or_else(|_| Regex::new("^$").unwrap());
    re.is_match(email)
}

/// Per-bullet advisory findings, separate from the 0-100 score. Both flags
/// are computed independently and can fire together.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BulletFindings {
    pub weak_verb: bool,
    pub no_impact: bool,
}

impl BulletFindings {
    /// The single message surfaced at a time; weak verb wins when both fire.
    pub fn advisory(&self) -> Option<&'static str> {
        if self.weak_verb {
            return Some("Start with a strong action verb.");
        }
        if self.no_impact {
            return Some("Add measurable impact (numbers).");
        }
        None
    }
}

pub fn check_bullet(text: &str) -> Option<BulletFindings> {
    if text.is_empty() {
        return None;
    }
    let trimmed = text.trim();
    let strong_verb = Regex::new(
        r"(?i)^(Built|Developed|Designed|Implemented|Led|Improved|Created|Optimized|Automated)",
    )
    .unwrap_or_else(|_| Regex::new("^$").unwrap());
    let impact = Regex::new(r"(?i)\d+|%|k\b").unwrap_or_else(|_| Regex::new("^$").unwrap());
    Some(BulletFindings {
        weak_verb: !strong_verb.is_match(trimmed),
        no_impact: !impact.is_match(trimmed),
    })
}

/// Read-only surface warnings shown above the rendered resume.
pub fn preview_warnings(record: &ResumeRecord) -> Vec<String> {
    let mut warnings = Vec::new();
    if record.personal.name.is_empty() {
        warnings.push("Missing Name".to_string());
    }
    if record.projects.is_empty() && record.experience.is_empty() {
        warnings.push("No Experience or Projects listed".to_string());
    }
    warnings
}
