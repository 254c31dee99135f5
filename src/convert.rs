//! Conversion of inferred leveled sections into the document model.
//!
//! Maps the flat-but-leveled section list produced by generic hierarchy
//! inference into a Chapter > Section > Article tree:
//!
//! - level 0 → Chapter
//! - level 1 → Section (within the current Chapter)
//! - level 2+ → Article (within the current Section or Chapter)
//!
//! Implicit containers are created whenever a section arrives without a
//! parent at the expected level, so no article is ever dropped.

use crate::document::{Article, Chapter, Definition, Document, DocumentType, Section};
use crate::generic::{GenericDefinition, GenericDocument, GenericSection};
use crate::numbering::to_ordinal;

/// Convert an inference result into the standard document model. A `None`
/// input yields an empty document with an empty chapter list.
#[must_use]
pub fn convert_generic_document(generic: Option<&GenericDocument>) -> Document {
    let Some(generic) = generic else {
        return Document::new();
    };

    let mut doc = Document {
        title: generic.title.clone(),
        doc_type: DocumentType::Unknown,
        definitions: convert_generic_definitions(&generic.definitions),
        ..Document::new()
    };

    if generic.sections.is_empty() {
        return doc;
    }

    let mut chapter_index: u32 = 0;
    let mut section_index: u32 = 0;
    let mut article_index: u32 = 0;
    // Index of the chapter/section currently receiving children
    let mut current_chapter: Option<usize> = None;
    let mut current_section: Option<usize> = None;

    for section in &generic.sections {
        match section.level {
            0 => {
                chapter_index += 1;
                section_index = 0;
                article_index = 0;
                doc.chapters
                    .push(build_chapter_from_section(section, chapter_index));
                current_chapter = Some(doc.chapters.len() - 1);
                current_section = None;
            }
            1 => {
                let chapter_idx = match current_chapter {
                    Some(idx) => idx,
                    None => {
                        chapter_index += 1;
                        doc.chapters
                            .push(Chapter::new(chapter_index.to_string(), ""));
                        let idx = doc.chapters.len() - 1;
                        current_chapter = Some(idx);
                        idx
                    }
                };
                section_index += 1;
                article_index = 0;
                doc.chapters[chapter_idx].sections.push(Section::new(
                    to_ordinal(&section.number, section_index),
                    section.title.clone(),
                ));
                current_section = Some(doc.chapters[chapter_idx].sections.len() - 1);
            }
            _ => {
                article_index += 1;
                let article = build_article_from_section(section, article_index);

                match (current_chapter, current_section) {
                    (Some(chapter_idx), Some(section_idx)) => {
                        doc.chapters[chapter_idx].sections[section_idx]
                            .articles
                            .push(article);
                    }
                    (Some(chapter_idx), None) => {
                        doc.chapters[chapter_idx].articles.push(article);
                    }
                    (None, _) => {
                        // No container at all: open an implicit chapter
                        chapter_index += 1;
                        let mut chapter = Chapter::new(chapter_index.to_string(), "");
                        chapter.articles.push(article);
                        doc.chapters.push(chapter);
                        current_chapter = Some(doc.chapters.len() - 1);
                    }
                }
            }
        }
    }

    // No chapters but sections existed: wrap everything in a single
    // implicit chapter with each leveled entry becoming an article.
    if doc.chapters.is_empty() {
        let mut implicit = Chapter::new("1", "");
        for (i, section) in generic.sections.iter().enumerate() {
            implicit
                .articles
                .push(build_article_from_section(section, i as u32 + 1));
        }
        doc.chapters.push(implicit);
    }

    doc
}

/// Build a chapter from a top-level inferred section. Body content becomes
/// the chapter's own synthesized first article.
fn build_chapter_from_section(section: &GenericSection, chapter_index: u32) -> Chapter {
    let number = if section.number.is_empty() {
        chapter_index.to_string()
    } else {
        section.number.clone()
    };

    let mut chapter = Chapter::new(number, section.title.clone());

    if !section.content.is_empty() {
        chapter.articles.push(
            Article::new(1, section.title.clone()).with_text(section.content.clone()),
        );
    }

    chapter
}

/// Build an article from an inferred section, numbering it from the label
/// with the running index as fallback.
fn build_article_from_section(section: &GenericSection, article_index: u32) -> Article {
    Article::new(
        to_ordinal(&section.number, article_index),
        section.title.clone(),
    )
    .with_text(section.content.clone())
}

/// Renumber inferred definitions sequentially (1-based), independent of
/// source numbering.
fn convert_generic_definitions(generic: &[GenericDefinition]) -> Vec<Definition> {
    generic
        .iter()
        .enumerate()
        .map(|(i, definition)| Definition {
            number: i as u32 + 1,
            term: definition.term.clone(),
            text: definition.definition.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generic::NumberingStyle;
    use pretty_assertions::assert_eq;

    fn leveled(level: usize, number: &str, title: &str, content: &str) -> GenericSection {
        GenericSection {
            level,
            number: number.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            numbering: NumberingStyle::Unknown,
        }
    }

    fn generic_doc(sections: Vec<GenericSection>) -> GenericDocument {
        GenericDocument {
            title: "Converted".to_string(),
            confidence: 1.0,
            sections,
            definitions: Vec::new(),
        }
    }

    #[test]
    fn test_nil_document_yields_empty_chapters() {
        let doc = convert_generic_document(None);
        assert!(doc.chapters.is_empty());
        assert_eq!(doc.doc_type, DocumentType::Unknown);
    }

    #[test]
    fn test_already_correct_input_converts_one_to_one() {
        let generic = generic_doc(vec![
            leveled(0, "I", "General", ""),
            leveled(1, "1", "Principles", ""),
            leveled(2, "1", "Subject-matter", "text one"),
            leveled(2, "2", "Scope", "text two"),
            leveled(1, "2", "Rights", ""),
            leveled(2, "3", "Access", "text three"),
        ]);

        let doc = convert_generic_document(Some(&generic));

        assert_eq!(doc.chapters.len(), 1);
        let chapter = &doc.chapters[0];
        assert_eq!(chapter.number, "I");
        assert_eq!(chapter.sections.len(), 2);
        assert_eq!(chapter.sections[0].articles.len(), 2);
        assert_eq!(chapter.sections[1].articles.len(), 1);
        assert_eq!(chapter.sections[0].articles[1].number, 2);
    }

    #[test]
    fn test_section_without_chapter_synthesizes_one() {
        let generic = generic_doc(vec![
            leveled(1, "1", "Orphan section", ""),
            leveled(2, "1", "Orphan article", "body"),
        ]);

        let doc = convert_generic_document(Some(&generic));

        assert_eq!(doc.chapters.len(), 1);
        assert_eq!(doc.chapters[0].number, "1");
        assert_eq!(doc.chapters[0].sections.len(), 1);
        assert_eq!(doc.chapters[0].sections[0].articles.len(), 1);
    }

    #[test]
    fn test_articles_only_wrap_into_implicit_chapter() {
        let generic = generic_doc(vec![
            leveled(2, "a", "First", "content a"),
            leveled(2, "b", "Second", "content b"),
        ]);

        let doc = convert_generic_document(Some(&generic));

        assert_eq!(doc.chapters.len(), 1);
        assert_eq!(doc.chapters[0].number, "1");
        let articles = &doc.chapters[0].articles;
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].number, 1); // "a" -> 1
        assert_eq!(articles[1].number, 2); // "b" -> 2
    }

    #[test]
    fn test_chapter_content_becomes_synthesized_article() {
        let generic = generic_doc(vec![leveled(
            0,
            "I",
            "General",
            "This chapter has body text.",
        )]);

        let doc = convert_generic_document(Some(&generic));

        assert_eq!(doc.chapters.len(), 1);
        assert_eq!(doc.chapters[0].articles.len(), 1);
        assert_eq!(doc.chapters[0].articles[0].number, 1);
        assert_eq!(
            doc.chapters[0].articles[0].text,
            "This chapter has body text."
        );
    }

    #[test]
    fn test_article_number_falls_back_to_running_index() {
        let generic = generic_doc(vec![
            leveled(0, "1", "Chapter", ""),
            leveled(2, "??", "Unparseable", ""),
            leveled(2, "", "Empty label", ""),
        ]);

        let doc = convert_generic_document(Some(&generic));

        let articles = &doc.chapters[0].articles;
        assert_eq!(articles[0].number, 1);
        assert_eq!(articles[1].number, 2);
    }

    #[test]
    fn test_section_numbers_parse_roman_and_letters() {
        let generic = generic_doc(vec![
            leveled(0, "1", "Chapter", ""),
            leveled(1, "IV", "Roman section", ""),
            leveled(1, "b", "Letter section", ""),
        ]);

        let doc = convert_generic_document(Some(&generic));

        let sections = &doc.chapters[0].sections;
        assert_eq!(sections[0].number, 4);
        assert_eq!(sections[1].number, 2);
    }

    #[test]
    fn test_definitions_renumbered_sequentially() {
        let mut generic = generic_doc(Vec::new());
        generic.definitions = vec![
            GenericDefinition {
                term: "controller".to_string(),
                definition: "decides purposes".to_string(),
                confidence: 0.9,
            },
            GenericDefinition {
                term: "processor".to_string(),
                definition: "acts on instructions".to_string(),
                confidence: 0.9,
            },
        ];

        let doc = convert_generic_document(Some(&generic));

        assert_eq!(doc.definitions.len(), 2);
        assert_eq!(doc.definitions[0].number, 1);
        assert_eq!(doc.definitions[0].term, "controller");
        assert_eq!(doc.definitions[1].number, 2);
    }
}
