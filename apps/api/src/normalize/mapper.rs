//! Template Mapper — fills the canonical schema from parsed sections.
//!
//! Absent or empty fields get placeholder copy that tells a reader the field
//! still needs completing; the output shape never depends on upload quality.

use crate::models::resume::{
    EducationEntry, ExperienceEntry, NormalizedDocument, ParsedResume, ProjectEntry, SkillGroup,
};
use crate::normalize::fields::{normalize_company_name, FieldNormalizer};
use crate::normalize::keywords::PipelineConfig;

pub const NAME_PLACEHOLDER: &str = "YOUR NAME";
pub const CONTACT_PLACEHOLDER: &str = "email@example.com | +1 (XXX) XXX-XXXX | City, State";
pub const PERIOD_PLACEHOLDER: &str = "MM/YYYY – MM/YYYY";
pub const GPA_PLACEHOLDER: &str = "GPA: X.X/4.0";

const SUMMARY_PLACEHOLDER: &[&str] = &[
    "Professional summary highlighting your experience, specializations, and key achievements.",
    "Add 2-3 lines describing your expertise and what makes you a strong candidate.",
];

pub struct TemplateMapper {
    fields: FieldNormalizer,
    wrap_width: usize,
    max_summary_lines: usize,
}

impl TemplateMapper {
    pub fn new(fields: FieldNormalizer, config: &PipelineConfig) -> Self {
        Self {
            fields,
            wrap_width: config.summary_wrap_width,
            max_summary_lines: config.summary_max_lines,
        }
    }

    pub fn map(&self, parsed: ParsedResume) -> NormalizedDocument {
        NormalizedDocument {
            name: non_empty_or(parsed.name, NAME_PLACEHOLDER),
            contact: non_empty_or(parsed.contact, CONTACT_PLACEHOLDER),
            summary: self.map_summary(&parsed.summary),
            education: self.map_education(parsed.education),
            skills: map_skills(parsed.skills),
            experience: self.map_experience(parsed.experience),
            projects: self.map_projects(parsed.projects),
        }
    }

    /// Joins all lines, greedily re-wraps to `wrap_width` characters and keeps
    /// the first `max_summary_lines` lines.
    pub fn map_summary(&self, summary: &[String]) -> Vec<String> {
        let joined = summary.join(" ");
        if joined.trim().is_empty() {
            return SUMMARY_PLACEHOLDER.iter().map(|s| s.to_string()).collect();
        }

        let mut lines = Vec::new();
        let mut current = String::new();
        for word in joined.split_whitespace() {
            let projected = current.chars().count() + 1 + word.chars().count();
            if !current.is_empty() && projected > self.wrap_width {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        if !current.is_empty() {
            lines.push(current);
        }

        lines.truncate(self.max_summary_lines);
        lines
    }

    fn map_education(&self, education: Vec<EducationEntry>) -> Vec<EducationEntry> {
        if education.is_empty() {
            return vec![EducationEntry {
                degree: "Degree in Field".to_string(),
                school: "University Name".to_string(),
                details: "Specialization or Relevant Coursework".to_string(),
                gpa: GPA_PLACEHOLDER.to_string(),
                period: PERIOD_PLACEHOLDER.to_string(),
            }];
        }

        education
            .into_iter()
            .map(|edu| {
                // A GPA the parser supplied is kept verbatim.
                let gpa = if !edu.gpa.trim().is_empty() {
                    edu.gpa.clone()
                } else {
                    self.fields
                        .extract_gpa(&format!("{} {} {}", edu.degree, edu.school, edu.details))
                };

                EducationEntry {
                    degree: or_placeholder(edu.degree, "Degree"),
                    school: or_placeholder(edu.school, "University"),
                    details: or_placeholder(edu.details, "Major"),
                    gpa: or_placeholder(gpa, GPA_PLACEHOLDER),
                    period: or_placeholder(self.fields.normalize_date(&edu.period), PERIOD_PLACEHOLDER),
                }
            })
            .collect()
    }

    fn map_experience(&self, experience: Vec<ExperienceEntry>) -> Vec<ExperienceEntry> {
        if experience.is_empty() {
            return vec![ExperienceEntry {
                company: "COMPANY NAME".to_string(),
                location: "City, State".to_string(),
                title: "Job Title".to_string(),
                period: PERIOD_PLACEHOLDER.to_string(),
                bullets: vec![
                    "Achievement or responsibility with quantifiable impact using metrics".to_string(),
                    "Another key accomplishment highlighting skills and technologies used".to_string(),
                    "Third bullet demonstrating leadership, collaboration, or technical expertise"
                        .to_string(),
                ],
            }];
        }

        experience
            .into_iter()
            .map(|exp| {
                let (company, location) = split_company_location(exp.company.trim(), exp.location.trim());
                ExperienceEntry {
                    company: normalize_company_name(&or_placeholder(company, "Company")),
                    location: or_placeholder(location, "Location"),
                    title: or_placeholder(exp.title, "Position"),
                    period: or_placeholder(self.fields.normalize_date(&exp.period), PERIOD_PLACEHOLDER),
                    bullets: self.map_bullets(&exp.bullets),
                }
            })
            .collect()
    }

    fn map_projects(&self, projects: Vec<ProjectEntry>) -> Vec<ProjectEntry> {
        projects
            .into_iter()
            .map(|proj| ProjectEntry {
                name: or_placeholder(proj.name, "Project Name"),
                tech: proj.tech.trim().to_string(),
                period: self.fields.normalize_date(&proj.period),
                bullets: self.map_bullets(&proj.bullets),
            })
            .collect()
    }

    fn map_bullets(&self, bullets: &[String]) -> Vec<String> {
        bullets
            .iter()
            .map(|b| self.fields.clean_bullet(b))
            .filter(|b| !b.is_empty())
            .map(|b| self.fields.highlight_metrics(&b))
            .collect()
    }
}

fn map_skills(skills: Vec<SkillGroup>) -> Vec<SkillGroup> {
    if skills.is_empty() {
        return vec![
            SkillGroup::new("Languages", "Python, JavaScript, Java, C++"),
            SkillGroup::new("Frameworks", "React, Node.js, Django, Flask"),
            SkillGroup::new("Tools", "Git, Docker, AWS, CI/CD"),
        ];
    }

    skills
        .into_iter()
        .map(|skill| SkillGroup {
            category: or_placeholder(skill.category, "Skills"),
            items: or_placeholder(skill.items, "List relevant skills"),
        })
        .collect()
}

/// `Acme – Berlin` → (`Acme`, `Berlin`), split on the first en-dash or hyphen.
/// A location that was already supplied is kept and the company left whole.
fn split_company_location(company: &str, location: &str) -> (String, String) {
    if !location.is_empty() {
        return (company.to_string(), location.to_string());
    }
    match company.find(['–', '-']) {
        Some(idx) => {
            let separator_len = company[idx..].chars().next().map_or(1, char::len_utf8);
            (
                company[..idx].trim().to_string(),
                company[idx + separator_len..].trim().to_string(),
            )
        }
        None => (company.to_string(), String::new()),
    }
}

fn non_empty_or(value: Option<String>, placeholder: &str) -> String {
    or_placeholder(value.unwrap_or_default(), placeholder)
}

fn or_placeholder(value: String, placeholder: &str) -> String {
    if value.trim().is_empty() {
        placeholder.to_string()
    } else {
        value
    }
}
