use crate::resume::model::SkillGroups;
use serde::{Deserialize, Serialize};

/// Observable latency of the simulated suggestion source. The shell sleeps
/// this long between issuing a ticket and applying its result.
pub const SUGGEST_SKILLS_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkillSuggestions {
    pub technical: Vec<String>,
    pub soft: Vec<String>,
    pub tools: Vec<String>,
}

/// Fixed catalog the suggestion source returns; there is no model call
/// behind it.
pub fn canned_suggestions() -> SkillSuggestions {
    SkillSuggestions {
        technical: vec![
            "TypeScript".to_string(),
            "React".to_string(),
            "Node.js".to_string(),
            "PostgreSQL".to_string(),
            "GraphQL".to_string(),
        ],
        soft: vec!["Team Leadership".to_string(), "Problem Solving".to_string()],
        tools: vec!["Git".to_string(), "Docker".to_string(), "AWS".to_string()],
    }
}

/// Handle for one in-flight suggestion request. The generation stamp lets
/// the session reject results that another request has superseded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuggestionTicket {
    pub generation: u64,
    pub delay_ms: u64,
}

/// Set-union merge: existing entries keep their position, new entries append
/// in catalog order. Returns how many entries were added.
pub fn merge_suggestions(skills: &mut SkillGroups, suggestions: &SkillSuggestions) -> usize {
    let mut added = 0;
    for item in &suggestions.technical {
        if skills.technical.insert(item.clone()) {
            added += 1;
        }
    }
    for item in &suggestions.soft {
        if skills.soft.insert(item.clone()) {
            added += 1;
        }
    }
    for item in &suggestions.tools {
        if skills.tools.insert(item.clone()) {
            added += 1;
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_unions_without_duplicates() {
        let mut skills = SkillGroups::default();
        skills.technical.insert("React");
        skills.technical.insert("Rust");
        skills.tools.insert("Git");

        let added = merge_suggestions(&mut skills, &canned_suggestions());
        // 5 technical minus React, 2 soft, 3 tools minus Git
        assert_eq!(added, 8);
        assert_eq!(
            skills.technical.iter().collect::<Vec<_>>(),
            vec!["React", "Rust", "TypeScript", "Node.js", "PostgreSQL", "GraphQL"]
        );
        assert_eq!(
            skills.tools.iter().collect::<Vec<_>>(),
            vec!["Git", "Docker", "AWS"]
        );
    }

    #[test]
    fn merge_twice_adds_nothing_new() {
        let mut skills = SkillGroups::default();
        assert_eq!(merge_suggestions(&mut skills, &canned_suggestions()), 10);
        assert_eq!(merge_suggestions(&mut skills, &canned_suggestions()), 0);
        assert_eq!(skills.total_count(), 10);
    }
}
