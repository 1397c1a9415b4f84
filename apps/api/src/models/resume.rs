//! Canonical resume schema — the one shape every renderer, editor and scorer reads.
//!
//! Parsed intermediates reuse the entry records below with blank fields; the
//! mapper is the only place that fills blanks with placeholder copy.

use serde::{Deserialize, Serialize};

/// Resume section recognised by heading keywords. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Summary,
    Education,
    Skills,
    Experience,
    Projects,
}

impl Section {
    /// Order in which heading keywords are tested against a line.
    pub const ALL: [Section; 5] = [
        Section::Summary,
        Section::Education,
        Section::Skills,
        Section::Experience,
        Section::Projects,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Summary => "summary",
            Section::Education => "education",
            Section::Skills => "skills",
            Section::Experience => "experience",
            Section::Projects => "projects",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub degree: String,
    pub school: String,
    pub details: String,
    pub gpa: String,
    pub period: String,
}

impl EducationEntry {
    pub fn with_degree(degree: impl Into<String>) -> Self {
        Self {
            degree: degree.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillGroup {
    pub category: String,
    pub items: String,
}

impl SkillGroup {
    pub fn new(category: impl Into<String>, items: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            items: items.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub company: String,
    pub location: String,
    pub title: String,
    pub period: String,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub name: String,
    pub tech: String,
    pub period: String,
    pub bullets: Vec<String>,
}

/// Structured output of the section parsers, before placeholder substitution.
///
/// `name` and `contact` are `None` when the segmenter never captured them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedResume {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub summary: Vec<String>,
    pub education: Vec<EducationEntry>,
    pub skills: Vec<SkillGroup>,
    pub experience: Vec<ExperienceEntry>,
    pub projects: Vec<ProjectEntry>,
}

/// The canonical schema. Education, skills and experience are never empty once
/// produced by the mapper; projects may be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedDocument {
    pub name: String,
    pub contact: String,
    pub summary: Vec<String>,
    pub education: Vec<EducationEntry>,
    pub skills: Vec<SkillGroup>,
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_serde_snake_case() {
        let json = serde_json::to_string(&Section::Experience).unwrap();
        assert_eq!(json, r#""experience""#);
        let back: Section = serde_json::from_str(r#""projects""#).unwrap();
        assert_eq!(back, Section::Projects);
    }

    #[test]
    fn test_section_as_str_matches_serde() {
        for section in Section::ALL {
            let json = serde_json::to_string(&section).unwrap();
            assert_eq!(json, format!("\"{}\"", section.as_str()));
        }
    }

    #[test]
    fn test_normalized_document_projects_default_to_empty() {
        let json = r#"{
            "name": "Ada Lovelace",
            "contact": "ada@example.com",
            "summary": [],
            "education": [],
            "skills": [],
            "experience": []
        }"#;
        let doc: NormalizedDocument = serde_json::from_str(json).unwrap();
        assert!(doc.projects.is_empty());
        assert_eq!(doc.name, "Ada Lovelace");
    }
}
