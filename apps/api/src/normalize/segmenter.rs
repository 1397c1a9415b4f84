//! Section Segmenter — one forward pass that splits a `LineStream` into
//! name, contact and per-section line groups.

use regex::Regex;
use tracing::debug;

use crate::models::resume::Section;
use crate::normalize::keywords::PipelineConfig;
use crate::normalize::loader::LineStream;

/// Lines at or below this index may be captured as contact details.
const CONTACT_WINDOW: usize = 2;
const PHONE_MIN_DIGITS: usize = 7;
const PHONE_MAX_DIGITS: usize = 13;

/// A run of lines under one heading. `kind` is `None` for lines seen before any
/// heading; section parsers skip those.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionBlock {
    pub kind: Option<Section>,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentedDocument {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub blocks: Vec<SectionBlock>,
}

pub struct Segmenter {
    /// Upper-cased keywords in test order.
    headings: Vec<(Section, Vec<String>)>,
    phone: Regex,
}

impl Segmenter {
    pub fn new(config: &PipelineConfig) -> Result<Self, regex::Error> {
        let headings = config
            .headings
            .iter()
            .map(|rule| {
                let keywords = rule.keywords.iter().map(|k| k.to_uppercase()).collect();
                (rule.section, keywords)
            })
            .collect();

        Ok(Self {
            headings,
            phone: Regex::new(r"\+?\(?\d{1,4}\)?(?:[-.\s]?\(?\d{1,4}\)?){1,4}")?,
        })
    }

    /// Returns the section a heading line switches to, if any.
    pub fn heading_for(&self, line: &str) -> Option<Section> {
        let upper = line.to_uppercase();
        self.headings
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| upper.contains(k.as_str())))
            .map(|(section, _)| *section)
    }

    /// An email marker, or a phone-shaped run carrying 7–13 digits.
    pub fn is_contact_line(&self, line: &str) -> bool {
        line.contains('@')
            || self.phone.find_iter(line).any(|m| {
                let digits = m.as_str().chars().filter(char::is_ascii_digit).count();
                (PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits)
            })
    }

    pub fn segment(&self, stream: &LineStream) -> SegmentedDocument {
        let mut doc = SegmentedDocument::default();
        let mut contact_parts: Vec<&str> = Vec::new();

        for (index, line) in stream.lines().iter().enumerate() {
            if index == 0 && doc.name.is_none() {
                doc.name = Some(line.clone());
                continue;
            }

            if index <= CONTACT_WINDOW && self.is_contact_line(line) {
                contact_parts.push(line);
                continue;
            }

            if let Some(section) = self.heading_for(line) {
                debug!(line = index, section = section.as_str(), "Section heading");
                doc.blocks.push(SectionBlock {
                    kind: Some(section),
                    lines: Vec::new(),
                });
                continue;
            }

            match doc.blocks.last_mut() {
                Some(block) => block.lines.push(line.clone()),
                None => doc.blocks.push(SectionBlock {
                    kind: None,
                    lines: vec![line.clone()],
                }),
            }
        }

        if !contact_parts.is_empty() {
            doc.contact = Some(contact_parts.join(" | "));
        }
        doc
    }
}
