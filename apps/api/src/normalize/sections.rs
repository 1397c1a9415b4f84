//! Section Parsers — turn each segmented line group into structured records.
//!
//! Experience and projects share one entry state machine:
//!
//! | state         | header line          | bullet line   | date line          |
//! |---------------|----------------------|---------------|--------------------|
//! | `NoOpenEntry` | open                 | drop          | drop               |
//! | `EntryOpen`   | flush, open          | append        | set period         |
//!
//! End of section flushes any open entry. No parser fails: lines that fit no
//! rule are dropped and the mapper fills the gaps.

use regex::{Regex, RegexBuilder};

use crate::models::resume::{
    EducationEntry, ExperienceEntry, ParsedResume, ProjectEntry, Section, SkillGroup,
};
use crate::normalize::keywords::PipelineConfig;
use crate::normalize::segmenter::SegmentedDocument;

const DEFAULT_SKILL_CATEGORY: &str = "Skills";

// ────────────────────────────────────────────────────────────────────────────
// Entry state machine
// ────────────────────────────────────────────────────────────────────────────

/// How a line inside an entry-based section is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryLine<'a> {
    Header(&'a str),
    /// Bullet text with the glyph and leading whitespace already stripped.
    Bullet(&'a str),
    Date(&'a str),
}

/// A record that opens on a header line and accumulates bullets.
pub trait BulletedEntry: Sized {
    fn open(header: &str) -> Self;
    fn push_bullet(&mut self, bullet: &str);
    fn set_period(&mut self, period: &str);
}

impl BulletedEntry for ExperienceEntry {
    fn open(header: &str) -> Self {
        Self {
            company: header.to_string(),
            ..Self::default()
        }
    }

    fn push_bullet(&mut self, bullet: &str) {
        self.bullets.push(bullet.to_string());
    }

    fn set_period(&mut self, period: &str) {
        self.period = period.to_string();
    }
}

impl BulletedEntry for ProjectEntry {
    fn open(header: &str) -> Self {
        Self {
            name: header.to_string(),
            ..Self::default()
        }
    }

    fn push_bullet(&mut self, bullet: &str) {
        self.bullets.push(bullet.to_string());
    }

    fn set_period(&mut self, period: &str) {
        self.period = period.to_string();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryState<E> {
    NoOpenEntry,
    EntryOpen(E),
}

#[derive(Debug)]
pub struct EntryAccumulator<E> {
    state: EntryState<E>,
    flushed: Vec<E>,
}

impl<E> Default for EntryAccumulator<E> {
    fn default() -> Self {
        Self {
            state: EntryState::NoOpenEntry,
            flushed: Vec::new(),
        }
    }
}

impl<E: BulletedEntry> EntryAccumulator<E> {
    #[cfg(test)]
    pub fn state(&self) -> &EntryState<E> {
        &self.state
    }

    pub fn feed(&mut self, line: EntryLine<'_>) {
        match line {
            EntryLine::Header(header) => {
                self.flush();
                self.state = EntryState::EntryOpen(E::open(header));
            }
            EntryLine::Bullet(bullet) => {
                if let EntryState::EntryOpen(entry) = &mut self.state {
                    entry.push_bullet(bullet);
                }
            }
            EntryLine::Date(period) => {
                if let EntryState::EntryOpen(entry) = &mut self.state {
                    entry.set_period(period);
                }
            }
        }
    }

    /// End-of-section transition.
    pub fn finish(mut self) -> Vec<E> {
        self.flush();
        self.flushed
    }

    fn flush(&mut self) {
        if let EntryState::EntryOpen(entry) =
            std::mem::replace(&mut self.state, EntryState::NoOpenEntry)
        {
            self.flushed.push(entry);
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Section parser
// ────────────────────────────────────────────────────────────────────────────

/// Structured output of one section block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedSection {
    Summary(Vec<String>),
    Education(Vec<EducationEntry>),
    Skills(Vec<SkillGroup>),
    Experience(Vec<ExperienceEntry>),
    Projects(Vec<ProjectEntry>),
}

pub struct SectionParser {
    bullet_glyphs: Vec<char>,
    date_line_markers: Vec<String>,
    ongoing_markers: Vec<String>,
    institution_keywords: Vec<String>,
    project_date_lines: bool,
    degree: Regex,
    leading_date: Regex,
    year: Regex,
}

impl SectionParser {
    pub fn new(config: &PipelineConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            bullet_glyphs: config.bullet_glyphs.clone(),
            date_line_markers: config.date_line_markers.clone(),
            ongoing_markers: config
                .ongoing_markers
                .iter()
                .map(|m| m.to_lowercase())
                .collect(),
            institution_keywords: config.institution_keywords.clone(),
            project_date_lines: config.project_date_lines,
            degree: RegexBuilder::new(&config.degree_pattern)
                .case_insensitive(true)
                .build()?,
            leading_date: Regex::new(r"^(?:\d{2}/\d{4}|\d{4})")?,
            year: Regex::new(r"\b(?:19|20)\d{2}\b")?,
        })
    }

    pub fn parse(&self, segmented: &SegmentedDocument) -> ParsedResume {
        let mut resume = ParsedResume {
            name: segmented.name.clone(),
            contact: segmented.contact.clone(),
            ..ParsedResume::default()
        };

        for block in &segmented.blocks {
            let Some(kind) = block.kind else { continue };
            match self.parse_block(kind, &block.lines) {
                ParsedSection::Summary(lines) => resume.summary.extend(lines),
                ParsedSection::Education(entries) => resume.education.extend(entries),
                ParsedSection::Skills(groups) => resume.skills.extend(groups),
                ParsedSection::Experience(entries) => resume.experience.extend(entries),
                ParsedSection::Projects(entries) => resume.projects.extend(entries),
            }
        }
        resume
    }

    pub fn parse_block(&self, kind: Section, lines: &[String]) -> ParsedSection {
        match kind {
            Section::Summary => ParsedSection::Summary(lines.to_vec()),
            Section::Education => ParsedSection::Education(
                lines
                    .iter()
                    .filter(|line| self.is_education_opener(line))
                    .map(|line| self.parse_education_line(line))
                    .collect(),
            ),
            Section::Skills => {
                ParsedSection::Skills(lines.iter().map(|line| parse_skill_line(line)).collect())
            }
            Section::Experience => ParsedSection::Experience(self.accumulate(lines, true)),
            Section::Projects => {
                ParsedSection::Projects(self.accumulate(lines, self.project_date_lines))
            }
        }
    }

    fn accumulate<E: BulletedEntry>(&self, lines: &[String], recognize_dates: bool) -> Vec<E> {
        let mut accumulator = EntryAccumulator::default();
        for line in lines {
            accumulator.feed(self.classify(line, recognize_dates));
        }
        accumulator.finish()
    }

    /// Bullets are recognised first, so a bullet mentioning "Current" stays a bullet.
    pub fn classify<'a>(&self, line: &'a str, recognize_dates: bool) -> EntryLine<'a> {
        if let Some(bullet) = self.strip_bullet(line) {
            return EntryLine::Bullet(bullet);
        }
        if recognize_dates && self.is_date_line(line) {
            return EntryLine::Date(line);
        }
        EntryLine::Header(line)
    }

    fn strip_bullet<'a>(&self, line: &'a str) -> Option<&'a str> {
        let first = line.chars().next()?;
        self.bullet_glyphs
            .contains(&first)
            .then(|| line[first.len_utf8()..].trim_start())
    }

    pub fn is_date_line(&self, line: &str) -> bool {
        self.leading_date.is_match(line)
            || self
                .date_line_markers
                .iter()
                .any(|marker| line.contains(marker.as_str()))
    }

    /// Institution keywords match case-sensitively ("University", not "university");
    /// the degree pattern is case-insensitive.
    pub fn is_education_opener(&self, line: &str) -> bool {
        self.institution_keywords
            .iter()
            .any(|k| line.contains(k.as_str()))
            || self.degree.is_match(line)
    }

    /// `Degree | School – Details | dates | GPA` — segments after the first are
    /// routed by shape; anything unrecognised lands in `details`.
    pub fn parse_education_line(&self, line: &str) -> EducationEntry {
        let mut segments = line.split('|').map(str::trim).filter(|s| !s.is_empty());
        let mut entry = EducationEntry::with_degree(segments.next().unwrap_or(line.trim()));
        let mut details = Vec::new();

        for segment in segments {
            if segment.to_lowercase().contains("gpa") {
                entry.gpa = segment.to_string();
            } else if entry.period.is_empty() && self.looks_like_period(segment) {
                entry.period = segment.to_string();
            } else if entry.school.is_empty() {
                match split_on_dash(segment) {
                    Some((school, rest)) => {
                        entry.school = school.to_string();
                        details.push(rest);
                    }
                    None => entry.school = segment.to_string(),
                }
            } else {
                details.push(segment);
            }
        }

        entry.details = details.join(", ");
        entry
    }

    fn looks_like_period(&self, segment: &str) -> bool {
        let lower = segment.to_lowercase();
        self.year.is_match(segment)
            || self.leading_date.is_match(segment)
            || self.ongoing_markers.iter().any(|m| lower.contains(m.as_str()))
    }
}

fn parse_skill_line(line: &str) -> SkillGroup {
    match line.split_once(':') {
        Some((category, items)) => SkillGroup::new(category.trim(), items.trim()),
        None => SkillGroup::new(DEFAULT_SKILL_CATEGORY, line),
    }
}

/// Splits `School – Details` / `School - Details` on the first spaced dash.
fn split_on_dash(segment: &str) -> Option<(&str, &str)> {
    [" – ", " - "]
        .iter()
        .filter_map(|sep| segment.split_once(sep))
        .min_by_key(|(head, _)| head.len())
        .map(|(head, tail)| (head.trim(), tail.trim()))
        .filter(|(head, tail)| !head.is_empty() && !tail.is_empty())
}
