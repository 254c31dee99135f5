//! US-style document parsing (CCPA, VCDPA, CPA, and sibling state codes).
//!
//! US statutes nest CHAPTER > Article > Section, but the "Article" level is
//! a grouping label only; the numbered sections are the leaves and map onto
//! this model's Article. Section citations vary by state; the dialect
//! table in [`crate::patterns`] is tried in priority order and the first
//! match wins for a line.

use std::sync::LazyLock;

use regex::Regex;

use crate::document::{Article, Chapter, Definition, Document};
use crate::parser::lookahead_title;
use crate::patterns::ParserConfig;

/// Default definitions-section numbers when no bridge supplies locations:
/// CCPA 1798.110, VCDPA 59.1-575, CPA 6-1-1303, CTDPA 42-515,
/// TDPSA/ICDPA *.1, UCPA 13-61-101.
const DEFAULT_DEFINITION_SECTIONS: [u32; 6] = [110, 575, 1303, 515, 1, 101];

#[allow(clippy::expect_used)] // static regex that is guaranteed to be valid
static CO_SECTION_CITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:Section|§)\s*(\d+-\d+-\d+)").expect("valid regex"));

#[allow(clippy::expect_used)] // static regex that is guaranteed to be valid
static CT_SECTION_CITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:Section|Sec\.|§)\s*(\d+-\d+)").expect("valid regex"));

#[allow(clippy::expect_used)] // static regex that is guaranteed to be valid
static TX_SECTION_CITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:Section|Sec\.|§)\s*(\d+\.\d+)").expect("valid regex"));

#[allow(clippy::expect_used)] // static regex that is guaranteed to be valid
static IA_SECTION_CITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:Section|§)\s*(\d+[A-Z]\.\d+)").expect("valid regex"));

#[allow(clippy::expect_used)] // static regex that is guaranteed to be valid
static VA_TITLE_CHAPTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Title\s+59\.1\s+Chapter\s+(\d+)").expect("valid regex"));

#[allow(clippy::expect_used)] // static regex that is guaranteed to be valid
static CA_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"TITLE\s+([\d.]+)").expect("valid regex"));

/// Parse a US-style document body into `doc`.
pub(crate) fn parse_document(doc: &mut Document, lines: &[String], config: &ParserConfig) {
    let mut current_chapter: Option<usize> = None;
    // US sections are the leaves; they become Articles in the model
    let mut current_leaf: Option<Article> = None;
    let mut leaf_text = String::new();
    let mut pending_title = false;

    for i in 0..lines.len() {
        let trimmed = lines[i].trim();

        // CHAPTER header
        if let Some(captures) = config.us_chapter.captures(trimmed) {
            finalize_leaf(doc, &mut current_chapter, &mut current_leaf, &mut leaf_text);
            pending_title = false;

            let title = lookahead_title(lines, i, true);
            doc.chapters.push(Chapter::new(&captures[1], title));
            current_chapter = Some(doc.chapters.len() - 1);
            continue;
        }

        // "Article N" is a grouping label between chapter and sections;
        // recognize and skip it without creating structure
        if config.us_article.is_match(trimmed) {
            finalize_leaf(doc, &mut current_chapter, &mut current_leaf, &mut leaf_text);
            pending_title = false;
            continue;
        }

        // Section header, first matching dialect wins
        if let Some(section) = config.match_section(trimmed) {
            finalize_leaf(doc, &mut current_chapter, &mut current_leaf, &mut leaf_text);

            current_leaf = Some(Article::new(section.leaf_number, ""));
            pending_title = true;

            // Leaves need a container even when no chapter header appeared
            if current_chapter.is_none() {
                doc.chapters.push(Chapter::new("1", ""));
                current_chapter = Some(doc.chapters.len() - 1);
            }
            continue;
        }

        // The next non-empty line after a section header is its title
        if pending_title && !trimmed.is_empty() {
            if let Some(leaf) = &mut current_leaf {
                leaf.title = trimmed.to_string();
            }
            pending_title = false;
            continue;
        }

        // Accumulate body text, skipping title duplicates
        if let Some(leaf) = &current_leaf {
            if !trimmed.is_empty() {
                if !leaf.title.is_empty() && trimmed == leaf.title {
                    continue;
                }
                if !leaf_text.is_empty() {
                    leaf_text.push('\n');
                }
                leaf_text.push_str(trimmed);
            }
        }
    }

    finalize_leaf(doc, &mut current_chapter, &mut current_leaf, &mut leaf_text);

    doc.definitions = extract_definitions(doc, config);
}

/// Close out the in-progress leaf and attach it to the current chapter.
fn finalize_leaf(
    doc: &mut Document,
    current_chapter: &mut Option<usize>,
    current_leaf: &mut Option<Article>,
    leaf_text: &mut String,
) {
    if let Some(mut leaf) = current_leaf.take() {
        leaf.text = leaf_text.trim().to_string();
        crate::parser::attach_article(doc, current_chapter, None, leaf);
        leaf_text.clear();
    }
}

/// Extract defined terms from the definitions section, located by number
/// (bridge hints or the legacy defaults) or by a "definitions" title.
/// Numbering is sequential, independent of the source letters.
fn extract_definitions(doc: &Document, config: &ParserConfig) -> Vec<Definition> {
    let bridge_numbers: Vec<u32> = config
        .definition_locations
        .iter()
        .filter(|loc| loc.section_number > 0)
        .map(|loc| loc.section_number)
        .collect();
    let candidates: &[u32] = if bridge_numbers.is_empty() {
        &DEFAULT_DEFINITION_SECTIONS
    } else {
        &bridge_numbers
    };

    let mut def_article: Option<&Article> = None;
    'outer: for chapter in &doc.chapters {
        for article in &chapter.articles {
            if candidates.contains(&article.number)
                || article.title.to_lowercase().contains("definition")
            {
                def_article = Some(article);
                break 'outer;
            }
        }
    }

    let Some(article) = def_article else {
        return Vec::new();
    };
    if article.text.is_empty() {
        return Vec::new();
    }

    let mut definitions = Vec::new();
    for line in article.text.lines() {
        if let Some(captures) = config.us_definition.captures(line) {
            definitions.push(Definition {
                number: definitions.len() as u32 + 1,
                term: captures[2].trim().to_string(),
                text: String::new(),
            });
        }
    }
    definitions
}

/// Extract a US state-code citation from the first lines, steered by the
/// bridge jurisdiction when one is bound.
pub(crate) fn extract_identifier(lines: &[String], config: &ParserConfig) -> String {
    if let Some(jurisdiction) = config.jurisdiction.as_deref() {
        let head = lines.iter().take(20);
        match jurisdiction {
            "US-CO" => {
                for line in head {
                    if let Some(captures) = CO_SECTION_CITATION.captures(line) {
                        return format!("C.R.S. § {}", &captures[1]);
                    }
                    if line.contains("C.R.S.") {
                        return "C.R.S. § 6-1-1301 et seq.".to_string();
                    }
                }
            }
            "US-CT" => {
                for line in head {
                    if let Some(captures) = CT_SECTION_CITATION.captures(line) {
                        return format!("Conn. Gen. Stat. § {}", &captures[1]);
                    }
                    if line.contains("Conn. Gen. Stat.") || line.contains("CGS") {
                        return "Conn. Gen. Stat. § 42-515 et seq.".to_string();
                    }
                }
            }
            "US-TX" => {
                for line in head {
                    if let Some(captures) = TX_SECTION_CITATION.captures(line) {
                        return format!("Tex. Bus. & Com. Code § {}", &captures[1]);
                    }
                    if line.contains("Tex. Bus.") || line.contains("Texas Business") {
                        return "Tex. Bus. & Com. Code § 541.001 et seq.".to_string();
                    }
                }
            }
            "US-UT" => {
                for line in head {
                    if let Some(captures) = CO_SECTION_CITATION.captures(line) {
                        return format!("U.C.A. § {}", &captures[1]);
                    }
                    if line.contains("U.C.A.") || line.contains("Utah Code") {
                        return "U.C.A. § 13-61-101 et seq.".to_string();
                    }
                }
            }
            "US-IA" => {
                for line in head {
                    if let Some(captures) = IA_SECTION_CITATION.captures(line) {
                        return format!("Iowa Code § {}", &captures[1]);
                    }
                    if line.contains("Iowa Code") {
                        return "Iowa Code § 715D.1 et seq.".to_string();
                    }
                }
            }
            _ => {}
        }
    }

    // Virginia Code style identifiers
    for line in lines.iter().take(20) {
        if line.contains("Title 59.1") || line.contains("TITLE 59.1") {
            if line.contains("Chapter 53") || line.contains("CHAPTER 53") {
                return "Va. Code Ann. § 59.1-575 et seq.".to_string();
            }
            if let Some(captures) = VA_TITLE_CHAPTER.captures(line) {
                return format!("Va. Code Ann. Title 59.1 Chapter {}", &captures[1]);
            }
        }
        if line.contains("Section 59.1-") || line.contains("§ 59.1-") {
            return "Va. Code Ann. § 59.1".to_string();
        }
    }

    // California Civil Code style identifiers
    for line in lines.iter().take(20) {
        if line.contains("TITLE") {
            if let Some(captures) = CA_TITLE.captures(line) {
                return format!("Cal. Civ. Code Title {}", &captures[1]);
            }
        }
        if line.contains("Section 1798") {
            return "Cal. Civ. Code § 1798".to_string();
        }
    }

    String::new()
}
