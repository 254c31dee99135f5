//! UK-style document parsing (Acts of Parliament and Statutory Instruments).
//!
//! Everything before the enacting clause (or a "Made ..." commencement
//! line) is front matter and skipped. PART headers map to chapters;
//! SCHEDULE headers also map to chapters, with an "S" prefix on the number
//! to keep the two namespaces apart. Numbered sections carry their title
//! inline ("1.—Citation") or on the following line.

use std::sync::LazyLock;

use regex::Regex;

use crate::document::{Article, Chapter, Definition, Document};
use crate::parser::{attach_article, lookahead_title};
use crate::patterns::{DefinitionLocation, ParserConfig};

#[allow(clippy::expect_used)] // static regex that is guaranteed to be valid
static ENACTING_CLAUSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)BE\s+IT\s+ENACTED").expect("valid regex"));

#[allow(clippy::expect_used)] // static regex that is guaranteed to be valid
static MADE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Made\s+\d").expect("valid regex"));

#[allow(clippy::expect_used)] // static regex that is guaranteed to be valid
static CHAPTER_CITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d{4})\s+c\.\s*(\d+)\]").expect("valid regex"));

#[allow(clippy::expect_used)] // static regex that is guaranteed to be valid
static SI_SHORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"S\.?I\.?\s+(\d{4})/(\d+)").expect("valid regex"));

#[allow(clippy::expect_used)] // static regex that is guaranteed to be valid
static SI_LONG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Statutory\s+Instruments?\s+(\d{4})\s+No\.\s*(\d+)").expect("valid regex")
});

#[allow(clippy::expect_used)] // static regex that is guaranteed to be valid
static INTERPRETATION_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)interpretation|definitions?|terms").expect("valid regex"));

/// Parse a UK-style document body into `doc`.
pub(crate) fn parse_document(doc: &mut Document, lines: &[String], config: &ParserConfig) {
    let mut current_chapter: Option<usize> = None;
    // UK sections/regulations map to Articles in the model
    let mut current_article: Option<Article> = None;
    let mut article_text = String::new();
    let mut pending_title = false;

    // Skip front matter up to the enacting clause or commencement line
    let mut main_body_start = 0;
    for (i, line) in lines.iter().enumerate() {
        if ENACTING_CLAUSE.is_match(line) || MADE_LINE.is_match(line) {
            main_body_start = i + 1;
            break;
        }
    }

    for i in main_body_start..lines.len() {
        let trimmed = lines[i].trim();

        // PART header maps to a chapter
        if let Some(captures) = config.uk_part.captures(trimmed) {
            finalize_article(
                doc,
                &mut current_chapter,
                &mut current_article,
                &mut article_text,
            );
            pending_title = false;

            let title = lookahead_title(lines, i, true);
            doc.chapters.push(Chapter::new(&captures[1], title));
            current_chapter = Some(doc.chapters.len() - 1);
            continue;
        }

        // SCHEDULE header also maps to a chapter, "S"-prefixed
        if let Some(captures) = config.uk_schedule.captures(trimmed) {
            finalize_article(
                doc,
                &mut current_chapter,
                &mut current_article,
                &mut article_text,
            );
            pending_title = false;

            let title = lookahead_title(lines, i, true);
            doc.chapters
                .push(Chapter::new(format!("S{}", &captures[1]), title));
            current_chapter = Some(doc.chapters.len() - 1);
            continue;
        }

        // Numbered section: "1.—(1) Citation" / "1. Overview" / "1 Overview"
        let section = config
            .uk_section
            .captures(trimmed)
            .or_else(|| config.uk_section_plain.captures(trimmed));
        if let Some(captures) = section {
            finalize_article(
                doc,
                &mut current_chapter,
                &mut current_article,
                &mut article_text,
            );

            let number = captures[1].parse().unwrap_or_default();
            let title = captures
                .get(2)
                .map(|m| m.as_str().trim())
                .map(|t| t.trim_start_matches(['—', '-']).trim())
                .unwrap_or_default()
                .to_string();

            // An empty inline title is supplied by the next non-empty line
            pending_title = title.is_empty();
            current_article = Some(Article::new(number, title));

            if current_chapter.is_none() {
                doc.chapters.push(Chapter::new("1", ""));
                current_chapter = Some(doc.chapters.len() - 1);
            }
            continue;
        }

        if pending_title && !trimmed.is_empty() {
            if let Some(article) = &mut current_article {
                article.title = trimmed.to_string();
            }
            pending_title = false;
            continue;
        }

        // Accumulate article text, skipping title duplicates
        if let Some(article) = &current_article {
            if !trimmed.is_empty() {
                if !article.title.is_empty() && trimmed == article.title {
                    continue;
                }
                if !article_text.is_empty() {
                    article_text.push('\n');
                }
                article_text.push_str(trimmed);
            }
        }
    }

    finalize_article(
        doc,
        &mut current_chapter,
        &mut current_article,
        &mut article_text,
    );

    doc.definitions = extract_definitions(doc, config);
}

fn finalize_article(
    doc: &mut Document,
    current_chapter: &mut Option<usize>,
    current_article: &mut Option<Article>,
    article_text: &mut String,
) {
    if let Some(mut article) = current_article.take() {
        article.text = article_text.trim().to_string();
        attach_article(doc, current_chapter, None, article);
        article_text.clear();
    }
}

/// Extract defined terms from the interpretation section.
///
/// Bridge-provided section numbers and title regexes are consulted first;
/// without them, a title matching "interpretation", "definitions", or
/// "terms" locates the section. Numbering is sequential.
fn extract_definitions(doc: &Document, config: &ParserConfig) -> Vec<Definition> {
    let numbers: Vec<u32> = config
        .definition_locations
        .iter()
        .filter(|loc| loc.section_number > 0)
        .map(|loc| loc.section_number)
        .collect();
    let title_patterns = compile_title_patterns(&config.definition_locations);

    let mut def_article: Option<&Article> = None;
    'outer: for chapter in &doc.chapters {
        for article in &chapter.articles {
            if numbers.contains(&article.number)
                || title_patterns.iter().any(|p| p.is_match(&article.title))
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
        if let Some(captures) = config.uk_definition.captures(line) {
            definitions.push(Definition {
                number: definitions.len() as u32 + 1,
                term: captures[1].trim().to_string(),
                text: String::new(),
            });
        }
    }
    definitions
}

/// Compile bridge title hints, falling back to the built-in interpretation
/// title pattern. Invalid bridge regexes are skipped.
fn compile_title_patterns(locations: &[DefinitionLocation]) -> Vec<Regex> {
    let compiled: Vec<Regex> = locations
        .iter()
        .filter(|loc| !loc.section_title.is_empty())
        .filter_map(|loc| Regex::new(&loc.section_title).ok())
        .collect();

    if compiled.is_empty() {
        vec![INTERPRETATION_TITLE.clone()]
    } else {
        compiled
    }
}

/// Extract a UK identifier from the first lines: a chapter citation like
/// `[2018 c. 12]` for Acts, or an SI number for Statutory Instruments.
pub(crate) fn extract_identifier(lines: &[String]) -> String {
    for line in lines.iter().take(30) {
        if let Some(captures) = CHAPTER_CITATION.captures(line) {
            return format!("{} c. {}", &captures[1], &captures[2]);
        }
        if let Some(captures) = SI_SHORT.captures(line) {
            return format!("S.I. {}/{}", &captures[1], &captures[2]);
        }
        if let Some(captures) = SI_LONG.captures(line) {
            return format!("S.I. {}/{}", &captures[1], &captures[2]);
        }
    }
    String::new()
}
