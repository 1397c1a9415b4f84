//! Document Loader — turns an uploaded file into a `LineStream`.
//!
//! Format is picked per adapter in docx, pdf, txt order: declared MIME type or
//! file extension.
//! Each format has one `TextExtractor`; every extractor's text goes through the
//! same split / trim / drop-empty rule.

use std::fmt;
use std::io::Read;
use std::path::Path;

use bytes::Bytes;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::normalize::PipelineError;

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const DOCX_BODY_PART: &str = "word/document.xml";

/// Lines substituted when a PDF yields no extractable text.
const PDF_DIAGNOSTIC_LINES: &[&str] = &[
    "PDF Upload",
    "Please use DOCX format for best results",
    "SUMMARY",
    "No text could be extracted from this PDF. Upload a DOCX or TXT version to populate every section.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Docx,
    Pdf,
    Txt,
}

impl DocumentFormat {
    pub const ALL: [DocumentFormat; 3] = [DocumentFormat::Docx, DocumentFormat::Pdf, DocumentFormat::Txt];

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Docx => "docx",
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Txt => "txt",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            DocumentFormat::Docx => DOCX_MIME,
            DocumentFormat::Pdf => "application/pdf",
            DocumentFormat::Txt => "text/plain",
        }
    }

    /// Formats are tried in `ALL` order (docx, pdf, txt); the first whose MIME type
    /// or file-name extension matches wins.
    pub fn detect(file_name: &str, content_type: Option<&str>) -> Option<Self> {
        let mime = content_type
            .map(|ct| ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
            .unwrap_or_default();
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        Self::ALL
            .into_iter()
            .find(|f| f.mime_type() == mime || f.extension() == extension)
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.extension().to_ascii_uppercase())
    }
}

/// Uploaded bytes plus the declared name and MIME type. Lives only while loading.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl RawDocument {
    pub fn new(
        file_name: impl Into<String>,
        content_type: Option<&str>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.map(str::to_string),
            bytes: bytes.into(),
        }
    }

    /// Reads a document from disk. The format is inferred from the extension later.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(file_name, None, bytes))
    }
}

/// Ordered, trimmed, non-empty text lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineStream(Vec<String>);

impl LineStream {
    pub fn from_text(text: &str) -> Self {
        Self(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn lines(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Format adapters
// ────────────────────────────────────────────────────────────────────────────

/// Extracts plain text from one container format.
pub trait TextExtractor: Send + Sync {
    fn format(&self) -> DocumentFormat;
    fn extract(&self, bytes: &[u8]) -> Result<String, PipelineError>;
}

/// Reads `word/document.xml` out of the OOXML zip and keeps only run text.
pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Docx
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, PipelineError> {
        let fail = |cause: String| PipelineError::extraction(DocumentFormat::Docx, cause);

        let mut archive =
            zip::ZipArchive::new(std::io::Cursor::new(bytes)).map_err(|e| fail(e.to_string()))?;
        let mut xml = String::new();
        archive
            .by_name(DOCX_BODY_PART)
            .map_err(|e| fail(format!("{DOCX_BODY_PART}: {e}")))?
            .read_to_string(&mut xml)
            .map_err(|e| fail(e.to_string()))?;

        docx_body_text(&xml).map_err(fail)
    }
}

/// Walks WordprocessingML and emits `<w:t>` text, newline per paragraph or break.
fn docx_body_text(xml: &str) -> Result<String, String> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text = true;
                }
            }
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"br" | b"cr" | b"p" => text.push('\n'),
                b"tab" => text.push('\t'),
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text {
                    let unescaped = e.unescape().map_err(|e| e.to_string())?;
                    text.push_str(&unescaped);
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "malformed XML at byte {}: {e}",
                    reader.buffer_position()
                ))
            }
            _ => {}
        }
    }

    Ok(text)
}

/// Real extraction through `pdf-extract`, falling back to diagnostic lines when a
/// PDF parses but carries no text layer (scans, image-only exports).
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, PipelineError> {
        // pdf-extract panics on some malformed inputs instead of returning Err.
        let text = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
            .map_err(|_| PipelineError::Parse("PDF decoder aborted on malformed input".to_string()))?
            .map_err(|e| PipelineError::extraction(DocumentFormat::Pdf, e.to_string()))?;
        if text.trim().is_empty() {
            warn!("PDF has no extractable text layer, using diagnostic placeholder");
            return Ok(PDF_DIAGNOSTIC_LINES.join("\n"));
        }
        Ok(text)
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Txt
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, PipelineError> {
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Loader
// ────────────────────────────────────────────────────────────────────────────

pub struct DocumentLoader {
    extractors: Vec<Box<dyn TextExtractor>>,
}

impl Default for DocumentLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentLoader {
    pub fn new() -> Self {
        Self {
            extractors: vec![
                Box::new(DocxExtractor),
                Box::new(PdfExtractor),
                Box::new(PlainTextExtractor),
            ],
        }
    }

    /// "DOCX, PDF, or TXT" — listed in adapter order.
    pub fn accepted_formats(&self) -> String {
        let names: Vec<String> = self
            .extractors
            .iter()
            .map(|e| e.format().to_string())
            .collect();
        match names.split_last() {
            Some((last, rest)) if !rest.is_empty() => format!("{}, or {last}", rest.join(", ")),
            Some((last, _)) => last.clone(),
            None => String::new(),
        }
    }

    pub fn load(&self, raw: &RawDocument) -> Result<(DocumentFormat, LineStream), PipelineError> {
        let unsupported = || PipelineError::UnsupportedFormat {
            accepted: self.accepted_formats(),
        };

        let format = DocumentFormat::detect(&raw.file_name, raw.content_type.as_deref())
            .ok_or_else(unsupported)?;
        let extractor = self
            .extractors
            .iter()
            .find(|e| e.format() == format)
            .ok_or_else(unsupported)?;

        debug!(file = %raw.file_name, format = %format, bytes = raw.bytes.len(), "Loading document");
        let text = extractor.extract(&raw.bytes).inspect_err(|e| {
            error!(file = %raw.file_name, "Text extraction failed: {e}");
        })?;

        Ok((format, LineStream::from_text(&text)))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    /// Wraps paragraphs into a minimal in-memory .docx container.
    pub(crate) fn build_docx(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| format!(r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">{p}</w:t></w:r></w:p>"#))
            .collect();
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        );

        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        writer
            .start_file(DOCX_BODY_PART, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_detect_mime_without_matching_extension() {
        assert_eq!(
            DocumentFormat::detect("resume.bin", Some(DOCX_MIME)),
            Some(DocumentFormat::Docx)
        );
        assert_eq!(
            DocumentFormat::detect("resume", Some("application/pdf")),
            Some(DocumentFormat::Pdf)
        );
    }

    #[test]
    fn test_detect_earlier_format_wins_on_conflict() {
        // docx is tried before pdf, by MIME or extension.
        assert_eq!(
            DocumentFormat::detect("resume.docx", Some("application/pdf")),
            Some(DocumentFormat::Docx)
        );
        assert_eq!(
            DocumentFormat::detect("resume.txt", Some("application/pdf")),
            Some(DocumentFormat::Pdf)
        );
    }

    #[test]
    fn test_detect_falls_back_to_extension_case_insensitive() {
        assert_eq!(
            DocumentFormat::detect("Resume.TXT", Some("application/octet-stream")),
            Some(DocumentFormat::Txt)
        );
        assert_eq!(DocumentFormat::detect("cv.pdf", None), Some(DocumentFormat::Pdf));
        assert_eq!(
            DocumentFormat::detect("notes", Some("text/plain; charset=utf-8")),
            Some(DocumentFormat::Txt)
        );
    }

    #[test]
    fn test_detect_unknown_is_none() {
        assert_eq!(DocumentFormat::detect("resume.doc", None), None);
        assert_eq!(DocumentFormat::detect("resume", None), None);
    }

    #[test]
    fn test_line_stream_trims_and_drops_blanks() {
        let stream = LineStream::from_text("  Jane Doe  \r\n\n\t\nSUMMARY\r\n   Builds things \n");
        assert_eq!(stream.lines(), &["Jane Doe", "SUMMARY", "Builds things"]);
        assert!(stream
            .lines()
            .iter()
            .all(|l| !l.is_empty() && l.trim() == l));
    }

    #[test]
    fn test_load_txt() {
        let raw = RawDocument::new("resume.txt", None, "Jane Doe\n\n  jane@example.com \n");
        let (format, lines) = DocumentLoader::new().load(&raw).unwrap();
        assert_eq!(format, DocumentFormat::Txt);
        assert_eq!(lines.lines(), &["Jane Doe", "jane@example.com"]);
    }

    #[test]
    fn test_load_docx_extracts_paragraphs_without_formatting() {
        let bytes = build_docx(&["Jane Doe", "  ", "R&amp;D Engineer", "EXPERIENCE"]);
        let raw = RawDocument::new("resume.docx", None, bytes);
        let (format, lines) = DocumentLoader::new().load(&raw).unwrap();
        assert_eq!(format, DocumentFormat::Docx);
        assert_eq!(lines.lines(), &["Jane Doe", "R&D Engineer", "EXPERIENCE"]);
    }

    #[test]
    fn test_docx_body_text_handles_breaks_and_tabs() {
        let xml = r#"<w:document xmlns:w="x"><w:body><w:p><w:r><w:t>Skills:</w:t><w:tab/><w:t>Rust</w:t><w:br/><w:t>Go</w:t></w:r></w:p></w:body></w:document>"#;
        let text = docx_body_text(xml).unwrap();
        assert_eq!(text, "Skills:\tRust\nGo\n");
    }

    #[test]
    fn test_load_corrupt_docx_is_extraction_error() {
        let raw = RawDocument::new("resume.docx", None, "definitely not a zip archive");
        let err = DocumentLoader::new().load(&raw).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Extraction {
                format: DocumentFormat::Docx,
                ..
            }
        ));
    }

    #[test]
    fn test_load_docx_without_body_part_is_extraction_error() {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        writer
            .start_file("docProps/core.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<core/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let raw = RawDocument::new("resume.docx", None, bytes);
        let err = DocumentLoader::new().load(&raw).unwrap_err();
        assert!(err.to_string().contains(DOCX_BODY_PART));
    }

    #[test]
    fn test_load_corrupt_pdf_fails() {
        let raw = RawDocument::new("resume.pdf", Some("application/pdf"), "not a pdf");
        let err = DocumentLoader::new().load(&raw).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Extraction {
                format: DocumentFormat::Pdf,
                ..
            } | PipelineError::Parse(_)
        ));
    }

    #[test]
    fn test_load_unsupported_lists_accepted_formats() {
        let raw = RawDocument::new("resume.odt", None, "x");
        let err = DocumentLoader::new().load(&raw).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unsupported file format. Please upload DOCX, PDF, or TXT file."
        );
    }

    #[tokio::test]
    async fn test_from_path_reads_file_name_and_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.txt");
        tokio::fs::write(&path, "Jane Doe\njane@example.com\n")
            .await
            .unwrap();

        let raw = RawDocument::from_path(&path).await.unwrap();
        assert_eq!(raw.file_name, "cv.txt");
        let (format, lines) = DocumentLoader::new().load(&raw).unwrap();
        assert_eq!(format, DocumentFormat::Txt);
        assert_eq!(lines.len(), 2);
    }

    #[tokio::test]
    async fn test_from_path_missing_file_is_io_error() {
        let err = RawDocument::from_path("/nonexistent/resume.txt")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Io(_)));
    }
}
