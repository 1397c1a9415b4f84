// Resume normalization pipeline.
// Flow: loader → segmenter → section parsers (using field normalizers) → mapper → validator.
// Every stage is synchronous and owns its intermediate; only the NormalizedDocument leaves.
// Handlers run `Pipeline::run` inside tokio::task::spawn_blocking.

pub mod fields;
pub mod handlers;
pub mod keywords;
pub mod loader;
pub mod mapper;
pub mod sections;
pub mod segmenter;
pub mod validator;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::resume::{NormalizedDocument, Section};

pub use keywords::PipelineConfig;
pub use loader::{DocumentFormat, DocumentLoader, LineStream, RawDocument};
pub use validator::{validate, ValidationReport};

use fields::FieldNormalizer;
use mapper::TemplateMapper;
use sections::SectionParser;
use segmenter::Segmenter;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unsupported file format. Please upload {accepted} file.")]
    UnsupportedFormat { accepted: String },

    #[error("Failed to parse {format} file: {cause}")]
    Extraction {
        format: DocumentFormat,
        cause: String,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid pattern in pipeline config: {0}")]
    Pattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn extraction(format: DocumentFormat, cause: impl Into<String>) -> Self {
        Self::Extraction {
            format,
            cause: cause.into(),
        }
    }
}

/// Result of one successful pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub format: DocumentFormat,
    pub document: NormalizedDocument,
    pub validation: ValidationReport,
}

/// All pipeline stages, compiled from one `PipelineConfig`. Holds no per-run state,
/// so a single instance serves every upload.
pub struct Pipeline {
    loader: DocumentLoader,
    segmenter: Segmenter,
    parser: SectionParser,
    mapper: TemplateMapper,
}

impl Pipeline {
    pub fn new(config: &PipelineConfig) -> Result<Self, PipelineError> {
        for section in Section::ALL {
            if config.keywords_for(section).next().is_none() {
                warn!(
                    section = section.as_str(),
                    "No heading keywords configured, section will never be detected"
                );
            }
        }

        Ok(Self {
            loader: DocumentLoader::new(),
            segmenter: Segmenter::new(config)?,
            parser: SectionParser::new(config)?,
            mapper: TemplateMapper::new(FieldNormalizer::new(config)?, config),
        })
    }

    /// Loads, normalizes and validates one uploaded document.
    pub fn run(&self, raw: &RawDocument) -> Result<PipelineOutput, PipelineError> {
        let (format, lines) = self.loader.load(raw)?;
        if lines.is_empty() {
            warn!(file = %raw.file_name, "Document contains no text, output will be placeholders only");
        }
        info!(
            file = %raw.file_name,
            format = %format,
            lines = lines.len(),
            "Extracted resume text"
        );

        let document = self.normalize_lines(&lines);
        let validation = validate(&document);
        if !validation.is_valid {
            debug!(errors = ?validation.errors, "Normalized document is incomplete");
        }

        Ok(PipelineOutput {
            format,
            document,
            validation,
        })
    }

    /// Segments, parses and maps an already-extracted line stream.
    pub fn normalize_lines(&self, lines: &LineStream) -> NormalizedDocument {
        let segmented = self.segmenter.segment(lines);
        let parsed = self.parser.parse(&segmented);
        info!(
            summary = parsed.summary.len(),
            education = parsed.education.len(),
            skills = parsed.skills.len(),
            experience = parsed.experience.len(),
            projects = parsed.projects.len(),
            "Parsed resume sections"
        );
        self.mapper.map(parsed)
    }
}
