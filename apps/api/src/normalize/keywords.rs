//! Keyword and pattern tables that drive segmentation and field normalization.
//!
//! Built once at startup (defaults, optionally overridden from a JSON file) and
//! handed to the pipeline components at construction. Swapping a locale or
//! industry keyword set never touches parsing logic.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::resume::Section;

/// Heading keywords for one section kind. Matched as substrings of the upper-cased line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingRule {
    pub section: Section,
    pub keywords: Vec<String>,
}

impl HeadingRule {
    fn new(section: Section, keywords: &[&str]) -> Self {
        Self {
            section,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Tested in order; the first rule with a matching keyword wins.
    pub headings: Vec<HeadingRule>,
    /// Substrings that mark a line as an education entry opener.
    pub institution_keywords: Vec<String>,
    /// Case-insensitive regex source for degree abbreviations.
    pub degree_pattern: String,
    /// Case-sensitive substrings that make a non-bullet experience line a period line.
    pub date_line_markers: Vec<String>,
    /// Lower-case substrings that turn the end of a date range into "Present".
    pub ongoing_markers: Vec<String>,
    /// Glyphs the section parsers treat as bullet openers.
    pub bullet_glyphs: Vec<char>,
    /// Glyphs stripped from bullets before rendering (superset of `bullet_glyphs`).
    pub cosmetic_bullet_glyphs: Vec<char>,
    pub summary_wrap_width: usize,
    pub summary_max_lines: usize,
    /// When set, date-shaped lines inside a projects block update the open
    /// project's period instead of opening a new project.
    pub project_date_lines: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            headings: vec![
                HeadingRule::new(Section::Summary, &["SUMMARY", "PROFILE", "OBJECTIVE"]),
                HeadingRule::new(Section::Education, &["EDUCATION", "ACADEMIC"]),
                HeadingRule::new(Section::Skills, &["SKILL", "COMPETENC"]),
                HeadingRule::new(
                    Section::Experience,
                    &["EXPERIENCE", "EMPLOYMENT", "WORK HISTORY"],
                ),
                HeadingRule::new(Section::Projects, &["PROJECT"]),
            ],
            institution_keywords: vec![
                "University".to_string(),
                "College".to_string(),
                "Institute".to_string(),
            ],
            degree_pattern: DEFAULT_DEGREE_PATTERN.to_string(),
            date_line_markers: vec!["Present".to_string(), "Current".to_string()],
            ongoing_markers: vec!["present".to_string()],
            bullet_glyphs: vec!['•', '-', '*'],
            cosmetic_bullet_glyphs: vec!['•', '-', '*', '◦', '▪'],
            summary_wrap_width: 120,
            summary_max_lines: 3,
            project_date_lines: false,
        }
    }
}

const DEFAULT_DEGREE_PATTERN: &str =
    r"\b(?:(?:B\.?S|M\.?S|B\.?A|M\.?A|Ph\.?D)\b|Bachelor|Master|MEng\b|BTech\b)";

impl PipelineConfig {
    /// Loads a configuration from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read keyword config '{}'", path.display()))?;
        let config: PipelineConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid keyword config '{}'", path.display()))?;
        Ok(config)
    }

    pub fn keywords_for(&self, section: Section) -> impl Iterator<Item = &str> {
        self.headings
            .iter()
            .filter(move |rule| rule.section == section)
            .flat_map(|rule| rule.keywords.iter().map(String::as_str))
    }
}
