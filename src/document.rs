//! The structured document model produced by a parse.
//!
//! A [`Document`] owns its whole tree: an optional preamble (EU-style
//! recitals), an ordered list of chapters, and the definitions extracted
//! from the definitions article. Articles attach either directly to a
//! chapter or to a section within it, never both. The tree is built once
//! per parse and never mutated afterwards.

use serde::{Deserialize, Serialize};

/// Type of regulatory document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// EU regulation (directly applicable).
    Regulation,
    /// EU directive.
    Directive,
    /// EU decision.
    Decision,
    /// US statute or code.
    Statute,
    /// UK Act of Parliament.
    Act,
    /// Could not be determined.
    Unknown,
}

impl DocumentType {
    /// Get the string value used in serialized output.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regulation => "regulation",
            Self::Directive => "directive",
            Self::Decision => "decision",
            Self::Statute => "statute",
            Self::Act => "act",
            Self::Unknown => "unknown",
        }
    }
}

/// Structural format of a regulatory document, detected once per parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// EU-style: CHAPTER I, Article 1.
    Eu,
    /// US-style: CHAPTER 1, Section 1798.100.
    Us,
    /// UK-style: PART 1, numbered sections.
    Uk,
    /// Hierarchy inferred from whitespace/numbering patterns.
    Generic,
    /// Not yet detected.
    Unknown,
}

impl DocumentFormat {
    /// Get the string value used in serialized output.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eu => "eu",
            Self::Us => "us",
            Self::Uk => "uk",
            Self::Generic => "generic",
            Self::Unknown => "unknown",
        }
    }
}

/// A parsed regulatory document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document title (usually the first line, or the inferred title for
    /// generic documents).
    pub title: String,

    /// Type of document.
    #[serde(rename = "type")]
    pub doc_type: DocumentType,

    /// Jurisdiction-specific citation string (may be empty).
    pub identifier: String,

    /// Preamble with recitals. Present only for EU-style documents with a
    /// "Whereas:" block.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub preamble: Option<Preamble>,

    /// Ordered chapters.
    pub chapters: Vec<Chapter>,

    /// Defined terms from the definitions article.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub definitions: Vec<Definition>,
}

impl Document {
    /// Create an empty document of unknown type.
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: String::new(),
            doc_type: DocumentType::Unknown,
            identifier: String::new(),
            preamble: None,
            chapters: Vec::new(),
            definitions: Vec::new(),
        }
    }

    /// Aggregate counts over the whole tree.
    #[must_use]
    pub fn statistics(&self) -> Statistics {
        let mut stats = Statistics::default();

        if let Some(preamble) = &self.preamble {
            stats.recitals = preamble.recitals.len();
        }

        stats.chapters = self.chapters.len();

        for chapter in &self.chapters {
            stats.sections += chapter.sections.len();
            stats.articles += chapter.articles.len();

            for section in &chapter.sections {
                stats.articles += section.articles.len();
            }
        }

        stats.definitions = self.definitions.len();

        stats
    }

    /// Find an article by number, or `None` if not found. Chapter-level
    /// articles are checked before descending into sections.
    #[must_use]
    pub fn get_article(&self, number: u32) -> Option<&Article> {
        for chapter in &self.chapters {
            if let Some(article) = chapter.articles.iter().find(|a| a.number == number) {
                return Some(article);
            }
            for section in &chapter.sections {
                if let Some(article) = section.articles.iter().find(|a| a.number == number) {
                    return Some(article);
                }
            }
        }
        None
    }

    /// Find a chapter by its number label (e.g., `"I"`, `"3"`, `"S1"`).
    #[must_use]
    pub fn get_chapter(&self, number: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.number == number)
    }

    /// All articles in document order: for each chapter, its own articles
    /// first, then each section's articles.
    #[must_use]
    pub fn all_articles(&self) -> Vec<&Article> {
        let mut articles = Vec::new();
        for chapter in &self.chapters {
            articles.extend(chapter.articles.iter());
            for section in &chapter.sections {
                articles.extend(section.articles.iter());
            }
        }
        articles
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// The preamble section of an EU-style regulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preamble {
    /// Citation lines ("Having regard to ...").
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub citations: Vec<String>,

    /// Numbered recitals in order of appearance.
    pub recitals: Vec<Recital>,
}

/// A numbered recital in the preamble. Numbers need not be contiguous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recital {
    pub number: u32,
    pub text: String,
}

/// A chapter in a regulatory document.
///
/// The number is kept as a string: it may be arabic ("1"), roman ("IV"),
/// or a letter-prefixed label such as "S1" for UK schedules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub number: String,
    pub title: String,

    /// Sections within this chapter.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub sections: Vec<Section>,

    /// Articles attached directly to the chapter (no intervening section).
    /// Disjoint from the articles inside `sections`.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub articles: Vec<Article>,
}

impl Chapter {
    /// Create an empty chapter.
    #[must_use]
    pub fn new(number: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            title: title.into(),
            sections: Vec::new(),
            articles: Vec::new(),
        }
    }
}

/// A section within a chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub number: u32,
    pub title: String,
    pub articles: Vec<Article>,
}

impl Section {
    /// Create an empty section.
    #[must_use]
    pub fn new(number: u32, title: impl Into<String>) -> Self {
        Self {
            number,
            title: title.into(),
            articles: Vec::new(),
        }
    }
}

/// An article in a regulatory document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub number: u32,
    pub title: String,

    /// Numbered paragraphs. Not populated by the current parsers;
    /// structural depth below Article is out of scope.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub paragraphs: Vec<Paragraph>,

    /// Free body text (may be empty).
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub text: String,
}

impl Article {
    /// Create an article with empty body text.
    #[must_use]
    pub fn new(number: u32, title: impl Into<String>) -> Self {
        Self {
            number,
            title: title.into(),
            paragraphs: Vec::new(),
            text: String::new(),
        }
    }

    /// Set the body text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

/// A numbered paragraph within an article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub number: u32,
    pub text: String,
}

/// A defined term. Numbering is sequential and 1-based, independent of the
/// numbering in the source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    pub number: u32,
    pub term: String,

    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub text: String,
}

/// Parsing statistics for validation. Callers inspect these to judge parse
/// quality heuristically; there is no other partial-success signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub chapters: usize,
    pub sections: usize,
    pub articles: usize,
    pub definitions: usize,
    pub recitals: usize,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_document() -> Document {
        let mut doc = Document::new();
        doc.title = "Test Regulation".to_string();

        let mut chapter1 = Chapter::new("I", "General");
        chapter1.articles.push(Article::new(1, "Subject-matter"));

        let mut section = Section::new(1, "Principles");
        section.articles.push(Article::new(2, "Scope"));
        section.articles.push(Article::new(3, "Definitions"));
        chapter1.sections.push(section);

        let mut chapter2 = Chapter::new("II", "Rights");
        chapter2.articles.push(Article::new(4, "Transparency"));

        doc.chapters.push(chapter1);
        doc.chapters.push(chapter2);
        doc
    }

    #[test]
    fn test_statistics_counts_nested_articles() {
        let doc = sample_document();
        let stats = doc.statistics();

        assert_eq!(stats.chapters, 2);
        assert_eq!(stats.sections, 1);
        assert_eq!(stats.articles, 4);
        assert_eq!(stats.recitals, 0);
        assert_eq!(stats.definitions, 0);
    }

    #[test]
    fn test_statistics_recitals() {
        let mut doc = Document::new();
        doc.preamble = Some(Preamble {
            citations: Vec::new(),
            recitals: vec![
                Recital {
                    number: 1,
                    text: "first".to_string(),
                },
                Recital {
                    number: 3,
                    text: "third".to_string(),
                },
            ],
        });
        assert_eq!(doc.statistics().recitals, 2);
    }

    #[test]
    fn test_get_article_checks_chapter_level_first() {
        let doc = sample_document();
        assert_eq!(doc.get_article(1).unwrap().title, "Subject-matter");
        assert_eq!(doc.get_article(3).unwrap().title, "Definitions");
        assert!(doc.get_article(99).is_none());
    }

    #[test]
    fn test_get_chapter() {
        let doc = sample_document();
        assert_eq!(doc.get_chapter("I").unwrap().title, "General");
        assert_eq!(doc.get_chapter("II").unwrap().title, "Rights");
        assert!(doc.get_chapter("III").is_none());
    }

    #[test]
    fn test_all_articles_order() {
        let doc = sample_document();
        let numbers: Vec<u32> = doc.all_articles().iter().map(|a| a.number).collect();
        // Chapter-level articles before section articles, chapter order preserved
        assert_eq!(numbers, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_serialization_omits_empty_fields() {
        let doc = Document::new();
        let json = serde_json::to_value(&doc).unwrap();

        assert!(json.get("preamble").is_none());
        assert!(json.get("definitions").is_none());
        assert_eq!(json["type"], "unknown");
        assert_eq!(json["chapters"], serde_json::json!([]));
    }

    #[test]
    fn test_serialization_round_trip() {
        let doc = sample_document();
        let json = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(doc, back);
    }

    #[test]
    fn test_document_type_serialization() {
        assert_eq!(
            serde_json::to_string(&DocumentType::Regulation).unwrap(),
            "\"regulation\""
        );
        assert_eq!(DocumentType::Statute.as_str(), "statute");
        assert_eq!(DocumentFormat::Generic.as_str(), "generic");
    }
}
