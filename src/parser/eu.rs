//! EU-style document parsing (GDPR and similar instruments).
//!
//! Two phases: the preamble (everything up to the adoption clause, scanned
//! for numbered recitals) and the body (CHAPTER/Section/Article headers).
//! Article titles may span several lines; collection stops at the first
//! paragraph number, point marker, structural header, or a blank line once
//! title text has been collected.

use std::sync::LazyLock;

use regex::Regex;

use crate::document::{Article, Chapter, Definition, Document, Preamble, Recital, Section};
use crate::parser::{attach_article, lookahead_title};
use crate::patterns::ParserConfig;

#[allow(clippy::expect_used)] // static regex that is guaranteed to be valid
static EU_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(E[UC]\)\s*(?:No\s*)?(\d+/\d+)").expect("valid regex"));

/// Parse an EU-style document body into `doc`.
pub(crate) fn parse_document(doc: &mut Document, lines: &[String], config: &ParserConfig) {
    // Find where the main body starts (after the adoption clause)
    let mut main_body_start = 0;
    let mut preamble_end = 0;
    for (i, line) in lines.iter().enumerate() {
        let is_end = match &config.preamble_end {
            Some(pattern) => pattern.is_match(line),
            None => line.contains("HAVE ADOPTED THIS"),
        };
        if is_end {
            // The clause line itself is neither recital nor body
            preamble_end = i;
            main_body_start = i + 1;
            break;
        }
    }

    doc.preamble = parse_preamble(&lines[..preamble_end], config);
    parse_main_body(doc, &lines[main_body_start..], config);
    doc.definitions = extract_definitions(doc, config);
}

/// Extract an EU identifier such as `(EU) 2016/679` from the first lines.
pub(crate) fn extract_identifier(lines: &[String]) -> String {
    for line in lines.iter().take(10) {
        if line.contains("(EU)") || line.contains("(EC)") {
            if let Some(captures) = EU_IDENTIFIER.captures(line) {
                return format!("(EU) {}", &captures[1]);
            }
        }
    }
    String::new()
}

/// Scan the preamble for recitals. Returns `None` when no "Whereas:" block
/// exists (non-EU-style preambles carry no recitals).
fn parse_preamble(lines: &[String], config: &ParserConfig) -> Option<Preamble> {
    let mut in_recitals = false;
    let mut recitals = Vec::new();
    let mut current: Option<Recital> = None;
    let mut text = String::new();

    for line in lines {
        if line.starts_with("Whereas:") {
            in_recitals = true;
            continue;
        }
        if !in_recitals {
            continue;
        }

        if let Some(captures) = config.recital.captures(line) {
            if let Some(mut recital) = current.take() {
                recital.text = text.trim().to_string();
                recitals.push(recital);
            }

            current = Some(Recital {
                number: captures[1].parse().unwrap_or_default(),
                text: String::new(),
            });
            text.clear();
            text.push_str(&captures[2]);
        } else if current.is_some() && !line.is_empty() {
            // Continuation of the current recital
            text.push(' ');
            text.push_str(line);
        }
    }

    if let Some(mut recital) = current.take() {
        recital.text = text.trim().to_string();
        recitals.push(recital);
    }

    if !in_recitals {
        return None;
    }

    Some(Preamble {
        citations: Vec::new(),
        recitals,
    })
}

/// Parse chapters, sections, and articles from the main body.
fn parse_main_body(doc: &mut Document, lines: &[String], config: &ParserConfig) {
    let mut current_chapter: Option<usize> = None;
    let mut current_section: Option<usize> = None;
    let mut current_article: Option<Article> = None;
    let mut article_text = String::new();

    for i in 0..lines.len() {
        let line = &lines[i];

        // Chapter header
        if let Some(captures) = config.eu_chapter.captures(line) {
            if let Some(mut article) = current_article.take() {
                article.text = article_text.trim().to_string();
                attach_article(doc, &mut current_chapter, current_section, article);
                article_text.clear();
            }

            let title = lookahead_title(lines, i, false);
            doc.chapters.push(Chapter::new(&captures[1], title));
            current_chapter = Some(doc.chapters.len() - 1);
            current_section = None;
            continue;
        }

        // Section header
        if let Some(captures) = config.eu_section.captures(line) {
            if let Some(mut article) = current_article.take() {
                article.text = article_text.trim().to_string();
                attach_article(doc, &mut current_chapter, current_section, article);
                article_text.clear();
            }

            let chapter_idx = match current_chapter {
                Some(idx) => idx,
                None => {
                    doc.chapters.push(Chapter::new("1", ""));
                    let idx = doc.chapters.len() - 1;
                    current_chapter = Some(idx);
                    idx
                }
            };

            let title = lookahead_title(lines, i, false);
            doc.chapters[chapter_idx].sections.push(Section::new(
                captures[1].parse().unwrap_or_default(),
                title,
            ));
            current_section = Some(doc.chapters[chapter_idx].sections.len() - 1);
            continue;
        }

        // Article header
        if let Some(captures) = config.eu_article.captures(line) {
            if let Some(mut article) = current_article.take() {
                article.text = article_text.trim().to_string();
                attach_article(doc, &mut current_chapter, current_section, article);
            }

            let title = collect_article_title(lines, i, config);
            current_article = Some(Article::new(
                captures[1].parse().unwrap_or_default(),
                title,
            ));
            article_text.clear();
            continue;
        }

        // Accumulate article body, skipping lines that are part of the title
        if let Some(article) = &current_article {
            if !line.is_empty() && !article.title.contains(line.as_str()) {
                if !article_text.is_empty() {
                    article_text.push('\n');
                }
                article_text.push_str(line);
            }
        }
    }

    if let Some(mut article) = current_article.take() {
        article.text = article_text.trim().to_string();
        attach_article(doc, &mut current_chapter, current_section, article);
    }
}

/// Collect an article title by scanning forward from its header.
///
/// Blank lines before any title text are skipped; a blank line after
/// collected text marks the title as complete, so the next non-empty line
/// is body, not title. Collection also stops at paragraph numbers, point
/// markers, and structural headers.
fn collect_article_title(lines: &[String], header_idx: usize, config: &ParserConfig) -> String {
    let mut title_lines: Vec<&str> = Vec::new();
    let mut saw_blank_after_title = false;

    for line in lines.iter().skip(header_idx + 1) {
        if line.is_empty() {
            if !title_lines.is_empty() {
                saw_blank_after_title = true;
            }
            continue;
        }
        if starts_with_paragraph_number(line) {
            break;
        }
        if starts_with_point_or_definition(line) {
            break;
        }
        if config.eu_article.is_match(line)
            || config.eu_section.is_match(line)
            || config.eu_chapter.is_match(line)
        {
            break;
        }
        if saw_blank_after_title {
            break;
        }
        title_lines.push(line);
    }

    title_lines.join(" ")
}

/// Extract defined terms from Article 4 (the EU "Definitions" article).
/// Definition numbers are taken from the source markers.
fn extract_definitions(doc: &Document, config: &ParserConfig) -> Vec<Definition> {
    let Some(article) = doc.get_article(4) else {
        return Vec::new();
    };
    if article.text.is_empty() {
        return Vec::new();
    }

    let mut definitions = Vec::new();
    for line in article.text.lines() {
        if let Some(captures) = config.definition.captures(line) {
            definitions.push(Definition {
                number: captures[1].parse().unwrap_or_default(),
                term: captures[2].trim().to_string(),
                text: String::new(),
            });
        }
    }
    definitions
}

/// Whether a line starts with a paragraph number like `1.   `: digits,
/// a period, then at least two whitespace characters (regular or
/// non-breaking spaces).
pub(crate) fn starts_with_paragraph_number(line: &str) -> bool {
    let mut chars = line.chars().peekable();

    let mut digits = 0;
    while chars.peek().is_some_and(char::is_ascii_digit) {
        chars.next();
        digits += 1;
    }
    if digits == 0 {
        return false;
    }

    if chars.next() != Some('.') {
        return false;
    }

    let mut whitespace = 0;
    for ch in chars {
        if ch == ' ' || ch == '\u{00a0}' {
            whitespace += 1;
        } else {
            break;
        }
    }
    whitespace >= 2
}

/// Whether a line starts with a point or definition marker like `(1) ` or
/// `(a) `.
pub(crate) fn starts_with_point_or_definition(line: &str) -> bool {
    let bytes = line.as_bytes();
    if bytes.len() < 4 || bytes[0] != b'(' {
        return false;
    }
    let Some(close_idx) = line.find(')') else {
        return false;
    };
    if !(2..=4).contains(&close_idx) {
        return false;
    }
    if close_idx + 1 >= bytes.len() {
        return false;
    }
    bytes[close_idx + 1] == b' '
}
