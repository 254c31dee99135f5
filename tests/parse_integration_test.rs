//! End-to-end integration tests for the parsing pipeline.
//!
//! Each fixture is an excerpt of a real-world document shape: an EU
//! regulation, a California-style state statute, a UK Act, and an
//! unclassified policy document handled by generic inference.

use std::fs;
use std::path::Path;

use lextract::{DocumentFormat, DocumentType, Parser};
use pretty_assertions::assert_eq;

/// Load fixture file content.
fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

#[test]
fn test_eu_regulation_end_to_end() {
    let text = load_fixture("gdpr_excerpt.txt");
    let parser = Parser::new();

    assert_eq!(parser.detect(&text), DocumentFormat::Eu);

    let doc = parser.parse_str(&text);

    assert_eq!(doc.doc_type, DocumentType::Regulation);
    assert_eq!(doc.identifier, "(EU) 2016/679");
    assert!(doc.title.starts_with("REGULATION (EU) 2016/679"));

    let stats = doc.statistics();
    assert_eq!(stats.chapters, 2);
    assert_eq!(stats.sections, 1);
    assert_eq!(stats.articles, 3);
    assert_eq!(stats.recitals, 2);
    assert_eq!(stats.definitions, 2);

    let chapter1 = doc.get_chapter("I").expect("chapter I");
    assert_eq!(chapter1.title, "GENERAL PROVISIONS");
    assert_eq!(chapter1.articles.len(), 2);

    let article1 = doc.get_article(1).expect("article 1");
    assert_eq!(article1.title, "Subject-matter and objectives");
    assert!(article1.text.contains("lays down rules"));

    // Article 12 lives inside Section 1 of chapter III
    let chapter3 = doc.get_chapter("III").expect("chapter III");
    assert_eq!(chapter3.sections[0].number, 1);
    assert_eq!(chapter3.sections[0].title, "Transparency and modalities");
    assert_eq!(chapter3.sections[0].articles[0].number, 12);

    // Recital continuation lines joined with a space
    let preamble = doc.preamble.as_ref().expect("preamble");
    assert_eq!(preamble.recitals[0].number, 1);
    assert!(preamble.recitals[1]
        .text
        .contains("should, whatever their nationality"));

    assert_eq!(doc.definitions[0].term, "personal data");
    assert_eq!(doc.definitions[1].term, "processing");

    // Flattened order: chapter-level articles first, then section articles
    let numbers: Vec<u32> = doc.all_articles().iter().map(|a| a.number).collect();
    assert_eq!(numbers, vec![1, 4, 12]);
}

#[test]
fn test_us_statute_end_to_end() {
    let text = load_fixture("ccpa_excerpt.txt");
    let parser = Parser::new();

    assert_eq!(parser.detect(&text), DocumentFormat::Us);

    let doc = parser.parse_str(&text);

    assert_eq!(doc.identifier, "Cal. Civ. Code Title 1.81.5");

    let stats = doc.statistics();
    assert_eq!(stats.chapters, 1);
    assert_eq!(stats.articles, 2);
    assert_eq!(stats.definitions, 2);

    let chapter = doc.get_chapter("55").expect("chapter 55");
    assert_eq!(chapter.title, "California Consumer Privacy Act");

    // The "Article 2" grouping label created no structure
    let section100 = doc.get_article(100).expect("section 1798.100");
    assert_eq!(
        section100.title,
        "General Duties of Businesses that Collect Personal Information"
    );
    assert!(section100.text.contains("point of collection"));

    assert_eq!(doc.definitions[0].term, "Business");
    assert_eq!(doc.definitions[1].term, "Consumer");
}

#[test]
fn test_uk_act_end_to_end() {
    let text = load_fixture("dpa_excerpt.txt");
    let parser = Parser::new();

    assert_eq!(parser.detect(&text), DocumentFormat::Uk);

    let doc = parser.parse_str(&text);

    assert_eq!(doc.doc_type, DocumentType::Act);
    assert_eq!(doc.identifier, "2018 c. 12");

    let stats = doc.statistics();
    assert_eq!(stats.chapters, 2);
    assert_eq!(stats.articles, 3);
    assert_eq!(stats.definitions, 2);

    let part1 = doc.get_chapter("1").expect("part 1");
    assert_eq!(part1.title, "Preliminary");
    assert_eq!(part1.articles[0].title, "Overview");

    // Schedules become chapters with an S-prefixed number
    let schedule = doc.get_chapter("S1").expect("schedule 1");
    assert_eq!(schedule.title, "Conditions relating to processing");
    assert_eq!(schedule.articles[0].title, "Employment condition");

    // Definitions come from the "Terms relating to..." section
    assert_eq!(doc.definitions[0].term, "personal data");
    assert_eq!(doc.definitions[1].term, "processing");
}

#[test]
fn test_generic_document_end_to_end() {
    let text = load_fixture("policy_excerpt.txt");
    let parser = Parser::new();

    assert_eq!(parser.detect(&text), DocumentFormat::Generic);

    let doc = parser.parse_str(&text);

    // The inferred ALL CAPS title replaces the first-line default
    assert_eq!(doc.title, "ACCEPTABLE USE POLICY");

    let stats = doc.statistics();
    assert_eq!(stats.chapters, 4);
    assert_eq!(stats.articles, 3);
    assert_eq!(stats.definitions, 1);
    assert_eq!(doc.definitions[0].term, "authorized user");

    // Each numbered top-level entry carries its content as an article
    let purpose = doc
        .chapters
        .iter()
        .find(|c| c.title == "Purpose")
        .expect("purpose chapter");
    assert!(purpose.articles[0].text.contains("acceptable use"));
}

#[test]
fn test_parse_from_reader_propagates_only_io_errors() {
    let parser = Parser::new();

    // Unstructured text degrades to a well-formed (if empty) document
    let doc = parser
        .parse(std::io::Cursor::new(b"not a legal document at all".to_vec()))
        .expect("structural ambiguity never errors");
    assert_eq!(doc.doc_type, DocumentType::Unknown);

    // Invalid UTF-8 surfaces as an I/O error from line reading
    let result = parser.parse(std::io::Cursor::new(vec![0xff, 0xfe, 0xfd]));
    assert!(result.is_err());
}

#[test]
fn test_empty_input_yields_empty_document() {
    let doc = Parser::new().parse_str("");
    assert_eq!(doc.title, "");
    assert_eq!(doc.doc_type, DocumentType::Unknown);
    assert!(doc.chapters.is_empty());
    assert!(doc.preamble.is_none());
}
