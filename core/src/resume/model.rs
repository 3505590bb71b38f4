use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TEMPLATE: &str = "Classic";
pub const DEFAULT_THEME_COLOR: &str = "hsl(168, 60%, 40%)";
pub const PROJECT_DESCRIPTION_MAX_CHARS: usize = 200;

/// Insertion-ordered string set. Duplicates are suppressed on insert and the
/// first-insert position wins; equality is exact string match. Serializes as
/// a plain JSON array, so persisted records look like ordinary lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TagSet {
    items: Vec<String>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false (and leaves the set unchanged) for duplicates.
    pub fn insert(&mut self, item: impl Into<String>) -> bool {
        let item = item.into();
        if self.items.iter().any(|existing| *existing == item) {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn remove(&mut self, item: &str) -> bool {
        match self.items.iter().position(|existing| existing == item) {
            Some(idx) => {
                self.items.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, item: &str) -> bool {
        self.items.iter().any(|existing| existing == item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn join(&self, sep: &str) -> String {
        self.items.join(sep)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }
}

impl From<Vec<String>> for TagSet {
    fn from(items: Vec<String>) -> Self {
        let mut set = TagSet::new();
        for item in items {
            set.insert(item);
        }
        set
    }
}

impl From<TagSet> for Vec<String> {
    fn from(set: TagSet) -> Self {
        set.items
    }
}

impl FromIterator<String> for TagSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        iter.into_iter().collect::<Vec<String>>().into()
    }
}

impl<'a> FromIterator<&'a str> for TagSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(str::to_string).collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PersonalInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EducationEntry {
    pub institution: String,
    pub degree: String,
    pub year: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExperienceEntry {
    pub title: String,
    pub company: String,
    pub duration: String,
    pub description: String,
}

// isOpen is expand/collapse state carried for the editing surface; it never
// feeds the score.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectEntry {
    pub title: String,
    pub description: String,
    pub tech_stack: TagSet,
    pub live_url: String,
    pub github_url: String,
    pub is_open: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SkillGroups {
    pub technical: TagSet,
    pub soft: TagSet,
    pub tools: TagSet,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Technical,
    Soft,
    Tools,
}

impl SkillCategory {
    pub fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "technical" => Ok(SkillCategory::Technical),
            "soft" => Ok(SkillCategory::Soft),
            "tools" => Ok(SkillCategory::Tools),
            _ => Err(CoreError::InvalidInput(format!(
                "unknown skill category: {}",
                s
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillCategory::Technical => "technical",
            SkillCategory::Soft => "soft",
            SkillCategory::Tools => "tools",
        }
    }
}

impl SkillGroups {
    pub fn group(&self, category: SkillCategory) -> &TagSet {
        match category {
            SkillCategory::Technical => &self.technical,
            SkillCategory::Soft => &self.soft,
            SkillCategory::Tools => &self.tools,
        }
    }

    pub fn group_mut(&mut self, category: SkillCategory) -> &mut TagSet {
        match category {
            SkillCategory::Technical => &mut self.technical,
            SkillCategory::Soft => &mut self.soft,
            SkillCategory::Tools => &mut self.tools,
        }
    }

    pub fn total_count(&self) -> usize {
        self.technical.len() + self.soft.len() + self.tools.len()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SocialLinks {
    pub github: String,
    pub linkedin: String,
}

/// The builder's whole document. Persisted as one JSON value on every
/// mutation; partial-field writes never happen.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ResumeRecord {
    pub personal: PersonalInfo,
    pub summary: String,
    pub education: Vec<EducationEntry>,
    pub experience: Vec<ExperienceEntry>,
    pub projects: Vec<ProjectEntry>,
    pub skills: SkillGroups,
    pub links: SocialLinks,
}

/// Bounded at mutation time only; stored text is rendered as-is.
pub fn clamp_project_description(text: &str) -> String {
    text.chars().take(PROJECT_DESCRIPTION_MAX_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagset_keeps_first_insert_order_and_dedups() {
        let mut set = TagSet::new();
        assert!(set.insert("React"));
        assert!(set.insert("Git"));
        assert!(!set.insert("React"));
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["React", "Git"]);
    }

    #[test]
    fn tagset_dedups_on_deserialize() {
        let set: TagSet = serde_json::from_str(r#"["a","b","a"]"#).expect("parse");
        assert_eq!(set.as_slice(), ["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn project_entry_uses_persisted_field_names() {
        let project = ProjectEntry {
            title: "P".to_string(),
            ..ProjectEntry::default()
        };
        let json = serde_json::to_value(&project).expect("serialize");
        assert!(json.get("techStack").is_some());
        assert!(json.get("liveUrl").is_some());
        assert!(json.get("githubUrl").is_some());
        assert_eq!(json.get("isOpen"), Some(&serde_json::Value::Bool(false)));
    }

    #[test]
    fn default_record_is_empty() {
        let record = ResumeRecord::default();
        assert!(record.personal.name.is_empty());
        assert!(record.education.is_empty());
        assert_eq!(record.skills.total_count(), 0);
    }

    #[test]
    fn partial_record_deserializes_with_defaults() {
        let record: ResumeRecord =
            serde_json::from_str(r#"{"summary":"hi"}"#).expect("parse");
        assert_eq!(record.summary, "hi");
        assert!(record.projects.is_empty());
    }

    #[test]
    fn clamps_description_on_character_boundary() {
        let long = "é".repeat(300);
        let clamped = clamp_project_description(&long);
        assert_eq!(clamped.chars().count(), PROJECT_DESCRIPTION_MAX_CHARS);
    }
}
