use crate::error::CoreResult;
use crate::resume::model::ResumeRecord;
use serde_json::{Map, Value};

/// Upgrades legacy persisted shapes in place, before typed deserialization.
/// Every surface that loads a record goes through this, so stale data derives
/// one view everywhere. Returns true when anything changed; running it on
/// current-shape data changes nothing.
pub fn migrate_value(root: &mut Value) -> bool {
    let Some(obj) = root.as_object_mut() else {
        return false;
    };
    let mut changed = false;

    // skills persisted as one comma-joined string
    if let Some(joined) = obj.get("skills").and_then(Value::as_str) {
        let technical: Vec<Value> = joined
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Value::String(s.to_string()))
            .collect();
        let mut groups = Map::new();
        groups.insert("technical".to_string(), Value::Array(technical));
        groups.insert("soft".to_string(), Value::Array(Vec::new()));
        groups.insert("tools".to_string(), Value::Array(Vec::new()));
        obj.insert("skills".to_string(), Value::Object(groups));
        changed = true;
    }

    // projects written before tech stacks and project links existed; keyed on
    // the first entry, upgraded across all of them
    let needs_project_fields = obj
        .get("projects")
        .and_then(Value::as_array)
        .and_then(|projects| projects.first())
        .map(|first| first.get("techStack").is_none())
        .unwrap_or(false);
    if needs_project_fields {
        if let Some(projects) = obj.get_mut("projects").and_then(Value::as_array_mut) {
            for project in projects.iter_mut() {
                if let Some(fields) = project.as_object_mut() {
                    fields.insert("techStack".to_string(), Value::Array(Vec::new()));
                    fields.insert("liveUrl".to_string(), Value::String(String::new()));
                    fields.insert("githubUrl".to_string(), Value::String(String::new()));
                    fields.insert("isOpen".to_string(), Value::Bool(false));
                }
            }
            changed = true;
        }
    }

    changed
}

/// Parses a persisted record, migrating first. The bool reports whether
/// migration rewrote anything.
pub fn parse_record(raw: &str) -> CoreResult<(ResumeRecord, bool)> {
    let mut value: Value = serde_json::from_str(raw)?;
    let migrated = migrate_value(&mut value);
    let record: ResumeRecord = serde_json::from_value(value)?;
    Ok((record, migrated))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrates_comma_joined_skills() {
        let (record, migrated) = parse_record(r#"{"skills":"a,b,c"}"#).expect("parse");
        assert!(migrated);
        assert_eq!(
            record.skills.technical.as_slice(),
            ["a".to_string(), "b".to_string(), "c".to_string()]
        );
        assert!(record.skills.soft.is_empty());
        assert!(record.skills.tools.is_empty());
    }

    #[test]
    fn skill_split_trims_and_drops_empty_items() {
        let (record, _) = parse_record(r#"{"skills":" a , ,b,"}"#).expect("parse");
        assert_eq!(
            record.skills.technical.as_slice(),
            ["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn migrates_projects_missing_tech_stack() {
        let (record, migrated) =
            parse_record(r#"{"projects":[{"title":"X"}]}"#).expect("parse");
        assert!(migrated);
        let project = &record.projects[0];
        assert_eq!(project.title, "X");
        assert!(project.tech_stack.is_empty());
        assert_eq!(project.live_url, "");
        assert_eq!(project.github_url, "");
        assert!(!project.is_open);
    }

    #[test]
    fn current_shape_is_untouched() {
        let raw = r#"{"skills":{"technical":["a"],"soft":[],"tools":[]},"projects":[{"title":"X","techStack":["rust"],"liveUrl":"","githubUrl":"","isOpen":true}]}"#;
        let mut value: serde_json::Value = serde_json::from_str(raw).expect("json");
        let before = value.clone();
        assert!(!migrate_value(&mut value));
        assert_eq!(value, before);
    }

    #[test]
    fn migration_is_idempotent() {
        let mut value: serde_json::Value =
            serde_json::from_str(r#"{"skills":"a,b","projects":[{"title":"X"}]}"#).expect("json");
        assert!(migrate_value(&mut value));
        let once = value.clone();
        assert!(!migrate_value(&mut value));
        assert_eq!(value, once);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse_record("{not json").is_err());
    }
}
