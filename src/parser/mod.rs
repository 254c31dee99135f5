//! Structural parsing of regulatory documents.
//!
//! [`Parser`] is the entry point: it reads the input into a line sequence,
//! detects the document format, builds the immutable pattern configuration
//! for that format, and dispatches to the matching state machine:
//!
//! - [`eu`]: preamble/recitals plus chapter/section/article
//! - [`us`]: chapter/section with per-state section-number dialects
//! - [`uk`]: parts, schedules, and numbered sections
//! - [`generic`]: whitespace/numbering inference plus hierarchy conversion
//!
//! A parse call carries no shared mutable state, so one parser instance can
//! serve concurrent calls.

pub mod eu;
pub mod generic;
pub mod uk;
pub mod us;

use std::io::BufRead;

use crate::detect::{detect_format, Detection};
use crate::document::{Chapter, Document, DocumentFormat, DocumentType};
use crate::error::Result;
use crate::generic::GenericParser;
use crate::patterns::{ParserConfig, PatternRegistry};

/// Parses regulatory documents into structured form.
pub struct Parser {
    registry: Option<Box<dyn PatternRegistry>>,
    inference: GenericParser,
}

impl Parser {
    /// Create a parser using the built-in patterns and detection.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: None,
            inference: GenericParser::new(),
        }
    }

    /// Create a parser that consults an external pattern registry for
    /// format detection and jurisdiction-specific patterns. Registry
    /// misses fall back to the built-in patterns.
    #[must_use]
    pub fn with_registry(registry: Box<dyn PatternRegistry>) -> Self {
        Self {
            registry: Some(registry),
            inference: GenericParser::new(),
        }
    }

    /// Parse a regulatory document from a reader.
    ///
    /// # Errors
    /// Returns [`crate::ExtractError::Io`] when reading fails. Structural
    /// ambiguity never errors; it degrades to a best-effort tree.
    pub fn parse<R: BufRead>(&self, reader: R) -> Result<Document> {
        let lines = reader.lines().collect::<std::io::Result<Vec<_>>>()?;
        Ok(self.parse_lines(&lines))
    }

    /// Parse a document already held in memory. Cannot fail.
    #[must_use]
    pub fn parse_str(&self, content: &str) -> Document {
        let lines: Vec<String> = content.lines().map(str::to_string).collect();
        self.parse_lines(&lines)
    }

    /// Detect the format of a document without parsing it.
    #[must_use]
    pub fn detect(&self, content: &str) -> DocumentFormat {
        let lines: Vec<String> = content.lines().map(str::to_string).collect();
        detect_format(&lines, self.registry.as_deref()).format
    }

    fn parse_lines(&self, lines: &[String]) -> Document {
        let mut doc = Document::new();

        let Detection { format, bridge } = detect_format(lines, self.registry.as_deref());
        let config = ParserConfig::for_format(format, bridge.as_ref());

        if let Some(first) = lines.first() {
            doc.title = first.clone();
            doc.doc_type = detect_document_type(lines);
        }

        doc.identifier = extract_identifier(lines, format, &config);

        tracing::debug!(
            format = format.as_str(),
            doc_type = doc.doc_type.as_str(),
            "parsing document"
        );

        match format {
            DocumentFormat::Us => us::parse_document(&mut doc, lines, &config),
            DocumentFormat::Uk => uk::parse_document(&mut doc, lines, &config),
            DocumentFormat::Generic => generic::parse_document(&mut doc, lines, &self.inference),
            DocumentFormat::Eu | DocumentFormat::Unknown => {
                eu::parse_document(&mut doc, lines, &config);
            }
        }

        doc
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Determine the document type from the first lines.
fn detect_document_type(lines: &[String]) -> DocumentType {
    for line in lines.iter().take(20) {
        let upper = line.to_uppercase();
        if upper.contains("REGULATION") {
            return DocumentType::Regulation;
        }
        if upper.contains("DIRECTIVE") {
            return DocumentType::Directive;
        }
        if upper.contains("DECISION") {
            return DocumentType::Decision;
        }
        if upper.contains("ACT") {
            return DocumentType::Act;
        }
        if upper.contains("CODE") || upper.contains("STATUTE") {
            return DocumentType::Statute;
        }
    }
    DocumentType::Unknown
}

/// Extract the jurisdiction-specific citation string, if one is present
/// near the top of the document.
fn extract_identifier(lines: &[String], format: DocumentFormat, config: &ParserConfig) -> String {
    match format {
        DocumentFormat::Uk => uk::extract_identifier(lines),
        DocumentFormat::Us => us::extract_identifier(lines, config),
        _ => eu::extract_identifier(lines),
    }
}

/// Look ahead up to four lines for the first non-empty line; used for
/// chapter and section titles that follow their header on the next line.
/// `trim` controls whether lines are trimmed before the emptiness check
/// (US/UK headers) or compared raw (EU headers).
pub(crate) fn lookahead_title(lines: &[String], from: usize, trim: bool) -> String {
    for line in lines.iter().skip(from + 1).take(4) {
        if trim {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        } else if !line.is_empty() {
            return line.clone();
        }
    }
    String::new()
}

/// Attach a finished leaf article to the current section or chapter,
/// synthesizing a default chapter when none exists so the article is never
/// dropped.
pub(crate) fn attach_article(
    doc: &mut Document,
    current_chapter: &mut Option<usize>,
    current_section: Option<usize>,
    article: crate::document::Article,
) {
    let chapter_idx = match *current_chapter {
        Some(idx) => idx,
        None => {
            tracing::debug!("article outside any chapter, synthesizing default chapter");
            doc.chapters.push(Chapter::new("1", ""));
            let idx = doc.chapters.len() - 1;
            *current_chapter = Some(idx);
            idx
        }
    };

    match current_section {
        Some(section_idx) => doc.chapters[chapter_idx].sections[section_idx]
            .articles
            .push(article),
        None => doc.chapters[chapter_idx].articles.push(article),
    }
}
