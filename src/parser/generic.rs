//! Generic-format parsing: hierarchy inference plus conversion.
//!
//! Documents matching no known format are handed to the whitespace/
//! numbering inference parser, and its leveled section list is converted
//! into the standard document model. The inference parser's own title
//! detection overrides the document title when it found one.

use crate::convert::convert_generic_document;
use crate::document::Document;
use crate::generic::GenericParser;

/// Parse an unclassified document into `doc` via hierarchy inference.
pub(crate) fn parse_document(doc: &mut Document, lines: &[String], inference: &GenericParser) {
    let content = lines.join("\n");
    let (generic_doc, warnings) = inference.parse(&content);

    for warning in &warnings {
        tracing::debug!(level = ?warning.level, message = %warning.message, "inference warning");
    }
    tracing::debug!(
        confidence = generic_doc.confidence,
        sections = generic_doc.sections.len(),
        "generic inference complete"
    );

    let converted = convert_generic_document(Some(&generic_doc));
    doc.chapters = converted.chapters;
    doc.definitions = converted.definitions;

    if !generic_doc.title.is_empty() {
        doc.title = generic_doc.title;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_lines(input: &[&str]) -> Vec<String> {
        input.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_inferred_title_overrides_document_title() {
        let mut doc = Document::new();
        doc.title = "first line".to_string();

        parse_document(
            &mut doc,
            &to_lines(&["COMPLIANCE POLICY", "", "1. Purpose", "Why this exists."]),
            &GenericParser::new(),
        );

        assert_eq!(doc.title, "COMPLIANCE POLICY");
        assert!(!doc.chapters.is_empty());
    }

    #[test]
    fn test_unstructured_text_keeps_original_title() {
        let mut doc = Document::new();
        doc.title = "memo.txt".to_string();

        parse_document(
            &mut doc,
            &to_lines(&["a", "b", "c"]),
            &GenericParser::new(),
        );

        // Nothing substantial to infer a title from
        assert_eq!(doc.title, "memo.txt");
    }
}
