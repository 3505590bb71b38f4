use crate::resume::model::ResumeRecord;

/// Plain-text export of the record, used by the copy-text action. Sections
/// with no data are left out entirely; the contact header always prints.
pub fn render_plain_text(record: &ResumeRecord) -> String {
    let mut text = String::new();

    let name = if record.personal.name.is_empty() {
        "Name"
    } else {
        record.personal.name.as_str()
    };
    text.push_str(name);
    text.push('\n');
    text.push_str(&format!(
        "{} | {} | {}\n",
        record.personal.location, record.personal.email, record.personal.phone
    ));
    text.push_str(&format!(
        "{} | {}\n\n",
        record.links.linkedin, record.links.github
    ));

    if !record.summary.is_empty() {
        text.push_str(&format!("SUMMARY\n{}\n\n", record.summary));
    }

    if !record.experience.is_empty() {
        text.push_str("EXPERIENCE\n");
        for exp in &record.experience {
            text.push_str(&format!(
                "{} at {} ({})\n",
                exp.title, exp.company, exp.duration
            ));
            text.push_str(&format!("{}\n\n", exp.description));
        }
    }

    if !record.projects.is_empty() {
        text.push_str("PROJECTS\n");
        for proj in &record.projects {
            text.push_str(&format!("{}\n", proj.title));
            text.push_str(&format!("{}\n\n", proj.description));
        }
    }

    if !record.education.is_empty() {
        text.push_str("EDUCATION\n");
        for edu in &record.education {
            text.push_str(&format!(
                "{} - {} ({})\n",
                edu.institution, edu.degree, edu.year
            ));
        }
        text.push('\n');
    }

    let skills = &record.skills;
    if skills.total_count() > 0 {
        text.push_str("SKILLS\n");
        if !skills.technical.is_empty() {
            text.push_str(&format!("Technical: {}\n", skills.technical.join(", ")));
        }
        if !skills.tools.is_empty() {
            text.push_str(&format!("Tools: {}\n", skills.tools.join(", ")));
        }
        if !skills.soft.is_empty() {
            text.push_str(&format!("Soft Skills: {}\n", skills.soft.join(", ")));
        }
    }

    text
}
