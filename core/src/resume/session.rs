use crate::error::{CoreError, CoreResult};
use crate::journal::event::{now_rfc3339_utc, session_id_ulid, Actor, JournalEvent};
use crate::journal::log::Journal;
use crate::resume::ats::{preview_warnings, score_resume, AtsReport};
use crate::resume::migration;
use crate::resume::model::{
    clamp_project_description, EducationEntry, ExperienceEntry, PersonalInfo, ProjectEntry,
    ResumeRecord, SkillCategory, SocialLinks, DEFAULT_TEMPLATE, DEFAULT_THEME_COLOR,
};
use crate::resume::render::render_plain_text;
use crate::resume::suggest::{
    canned_suggestions, merge_suggestions, SuggestionTicket, SUGGEST_SKILLS_DELAY_MS,
};
use crate::storage::keys;
use crate::storage::store::StoreAdapter;

/// Owns the active record exclusively. Every mutation rewrites the whole
/// record to the store and rescores before returning, so the report is never
/// stale relative to the record.
pub struct BuilderSession<S: StoreAdapter> {
    store: S,
    journal: Journal,
    session_id: String,
    record: ResumeRecord,
    report: AtsReport,
    template: String,
    theme_color: String,
    suggestion_generation: u64,
}

impl<S: StoreAdapter> BuilderSession<S> {
    pub fn open(store: S, journal: Journal) -> CoreResult<Self> {
        let mut session = Self {
            store,
            journal,
            session_id: session_id_ulid(),
            record: ResumeRecord::default(),
            report: score_resume(&ResumeRecord::default()),
            template: DEFAULT_TEMPLATE.to_string(),
            theme_color: DEFAULT_THEME_COLOR.to_string(),
            suggestion_generation: 0,
        };
        session.journal_event(Actor::System, "SESSION_STARTED", serde_json::json!({}))?;

        match session.store.get(keys::RESUME_DATA)? {
            None => {
                let score = session.report.score;
                session.journal_event(
                    Actor::System,
                    "RESUME_LOADED",
                    serde_json::json!({"score": score, "migrated": false}),
                )?;
            }
            Some(raw) => match migration::parse_record(&raw) {
                Ok((record, migrated)) => {
                    session.record = record;
                    session.report = score_resume(&session.record);
                    let score = session.report.score;
                    session.journal_event(
                        Actor::System,
                        "RESUME_LOADED",
                        serde_json::json!({"score": score, "migrated": migrated}),
                    )?;
                }
                Err(err) => {
                    // the only swallowed error: a record that does not parse
                    // falls back to the default record instead of propagating
                    session.record = ResumeRecord::default();
                    session.report = score_resume(&session.record);
                    session.journal_event(
                        Actor::System,
                        "RESUME_LOAD_FALLBACK",
                        serde_json::json!({"error": err.to_string()}),
                    )?;
                }
            },
        }

        if let Some(template) = session.store.get(keys::RESUME_TEMPLATE)? {
            session.template = template;
        }
        if let Some(color) = session.store.get(keys::RESUME_COLOR)? {
            session.theme_color = color;
        }
        Ok(session)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn record(&self) -> &ResumeRecord {
        &self.record
    }

    pub fn report(&self) -> &AtsReport {
        &self.report
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn theme_color(&self) -> &str {
        &self.theme_color
    }

    pub fn warnings(&self) -> Vec<String> {
        preview_warnings(&self.record)
    }

    pub fn render_text(&self) -> String {
        render_plain_text(&self.record)
    }

    pub fn update_personal(&mut self, personal: PersonalInfo) -> CoreResult<()> {
        self.record.personal = personal;
        self.persist_and_rescore("personal")
    }

    pub fn update_summary(&mut self, summary: String) -> CoreResult<()> {
        self.record.summary = summary;
        self.persist_and_rescore("summary")
    }

    pub fn update_links(&mut self, links: SocialLinks) -> CoreResult<()> {
        self.record.links = links;
        self.persist_and_rescore("links")
    }

    pub fn add_education(&mut self, entry: EducationEntry) -> CoreResult<()> {
        self.record.education.push(entry);
        self.persist_and_rescore("education")
    }

    pub fn update_education(&mut self, index: usize, entry: EducationEntry) -> CoreResult<()> {
        let Some(slot) = self.record.education.get_mut(index) else {
            return Err(CoreError::InvalidInput(format!(
                "education index {} out of range",
                index
            )));
        };
        *slot = entry;
        self.persist_and_rescore("education")
    }

    pub fn remove_education(&mut self, index: usize) -> CoreResult<()> {
        if index >= self.record.education.len() {
            return Err(CoreError::InvalidInput(format!(
                "education index {} out of range",
                index
            )));
        }
        self.record.education.remove(index);
        self.persist_and_rescore("education")
    }

    pub fn add_experience(&mut self, entry: ExperienceEntry) -> CoreResult<()> {
        self.record.experience.push(entry);
        self.persist_and_rescore("experience")
    }

    pub fn update_experience(&mut self, index: usize, entry: ExperienceEntry) -> CoreResult<()> {
        let Some(slot) = self.record.experience.get_mut(index) else {
            return Err(CoreError::InvalidInput(format!(
                "experience index {} out of range",
                index
            )));
        };
        *slot = entry;
        self.persist_and_rescore("experience")
    }

    pub fn remove_experience(&mut self, index: usize) -> CoreResult<()> {
        if index >= self.record.experience.len() {
            return Err(CoreError::InvalidInput(format!(
                "experience index {} out of range",
                index
            )));
        }
        self.record.experience.remove(index);
        self.persist_and_rescore("experience")
    }

    pub fn add_project(&mut self, mut entry: ProjectEntry) -> CoreResult<()> {
        entry.description = clamp_project_description(&entry.description);
        self.record.projects.push(entry);
        self.persist_and_rescore("projects")
    }

    pub fn update_project(&mut self, index: usize, mut entry: ProjectEntry) -> CoreResult<()> {
        entry.description = clamp_project_description(&entry.description);
        let Some(slot) = self.record.projects.get_mut(index) else {
            return Err(CoreError::InvalidInput(format!(
                "project index {} out of range",
                index
            )));
        };
        *slot = entry;
        self.persist_and_rescore("projects")
    }

    pub fn remove_project(&mut self, index: usize) -> CoreResult<()> {
        if index >= self.record.projects.len() {
            return Err(CoreError::InvalidInput(format!(
                "project index {} out of range",
                index
            )));
        }
        self.record.projects.remove(index);
        self.persist_and_rescore("projects")
    }

    /// Returns false for a duplicate; duplicates do not persist or rescore.
    pub fn add_skill(&mut self, category: SkillCategory, skill: &str) -> CoreResult<bool> {
        let skill = skill.trim();
        if skill.is_empty() {
            return Err(CoreError::InvalidInput("skill must not be empty".to_string()));
        }
        let inserted = self.record.skills.group_mut(category).insert(skill);
        if inserted {
            self.persist_and_rescore("skills")?;
        }
        Ok(inserted)
    }

    pub fn remove_skill(&mut self, category: SkillCategory, skill: &str) -> CoreResult<bool> {
        let removed = self.record.skills.group_mut(category).remove(skill);
        if removed {
            self.persist_and_rescore("skills")?;
        }
        Ok(removed)
    }

    pub fn set_template(&mut self, template: &str) -> CoreResult<()> {
        self.template = template.to_string();
        self.store.set(keys::RESUME_TEMPLATE, template)?;
        self.journal_event(
            Actor::User,
            "TEMPLATE_CHANGED",
            serde_json::json!({"template": template}),
        )
    }

    pub fn set_theme_color(&mut self, color: &str) -> CoreResult<()> {
        self.theme_color = color.to_string();
        self.store.set(keys::RESUME_COLOR, color)?;
        self.journal_event(
            Actor::User,
            "THEME_CHANGED",
            serde_json::json!({"color": color}),
        )
    }

    /// Starts a suggestion request. Any ticket issued earlier becomes stale
    /// the moment this returns.
    pub fn begin_skill_suggestion(&mut self) -> CoreResult<SuggestionTicket> {
        self.suggestion_generation += 1;
        let ticket = SuggestionTicket {
            generation: self.suggestion_generation,
            delay_ms: SUGGEST_SKILLS_DELAY_MS,
        };
        self.journal_event(
            Actor::User,
            "SKILL_SUGGESTIONS_REQUESTED",
            serde_json::json!({"generation": ticket.generation, "delay_ms": ticket.delay_ms}),
        )?;
        Ok(ticket)
    }

    /// Applies the canned suggestions carried by a current ticket. A ticket
    /// from a superseded request is rejected so results cannot land out of
    /// order. Returns how many skills were added.
    pub fn apply_skill_suggestion(&mut self, ticket: SuggestionTicket) -> CoreResult<usize> {
        if ticket.generation != self.suggestion_generation {
            self.journal_event(
                Actor::System,
                "SKILL_SUGGESTIONS_STALE",
                serde_json::json!({
                    "generation": ticket.generation,
                    "current": self.suggestion_generation
                }),
            )?;
            return Err(CoreError::StaleSuggestion {
                handle: ticket.generation,
                current: self.suggestion_generation,
            });
        }
        let added = merge_suggestions(&mut self.record.skills, &canned_suggestions());
        self.journal_event(
            Actor::System,
            "SKILL_SUGGESTIONS_APPLIED",
            serde_json::json!({"generation": ticket.generation, "added": added}),
        )?;
        self.persist_and_rescore("skills")?;
        Ok(added)
    }

    fn persist_and_rescore(&mut self, field: &str) -> CoreResult<()> {
        let raw = serde_json::to_string(&self.record)?;
        self.store.set(keys::RESUME_DATA, &raw)?;
        self.report = score_resume(&self.record);
        let score = self.report.score;
        self.journal_event(
            Actor::User,
            "RESUME_SAVED",
            serde_json::json!({"field": field, "score": score}),
        )
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
