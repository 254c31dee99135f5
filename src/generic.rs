//! Generic hierarchy inference for documents matching no known format.
//!
//! Infers structural levels from numbering patterns (arabic, lettered,
//! roman) and header shape (ALL CAPS lines, `CHAPTER`/`SECTION`/... labels,
//! underlines) rather than a fixed grammar. The output is a flat list of
//! leveled sections that the hierarchy converter maps into the standard
//! document model. Results carry a confidence score; parsing never fails.

use std::sync::LazyLock;

use regex::Regex;

macro_rules! inference_pattern {
    ($name:ident, $pattern:literal) => {
        #[allow(clippy::expect_used)] // static regex that is guaranteed to be valid
        static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($pattern).expect("valid regex"));
    };
}

// Numbering markers: "1.", "(1)", "1)"
inference_pattern!(ARABIC_DOT, r"^(\d+)\.\s+");
inference_pattern!(ARABIC_PAREN, r"^\((\d+)\)\s+");
inference_pattern!(ARABIC_CLOSE_PAREN, r"^(\d+)\)\s+");

// Letter markers
inference_pattern!(LOWER_LETTER_PAREN, r"^\(([a-z])\)\s+");
inference_pattern!(LOWER_LETTER_DOT, r"^([a-z])\.\s+");
inference_pattern!(UPPER_LETTER_PAREN, r"^\(([A-Z])\)\s+");
inference_pattern!(UPPER_LETTER_DOT, r"^([A-Z])\.\s+");

// Roman numeral markers
inference_pattern!(LOWER_ROMAN_PAREN, r"^\(([ivxlcdm]+)\)\s+");
inference_pattern!(LOWER_ROMAN_DOT, r"^([ivxlcdm]+)\.\s+");
inference_pattern!(UPPER_ROMAN_PAREN, r"^\(([IVXLCDM]+)\)\s+");
inference_pattern!(UPPER_ROMAN_DOT, r"^([IVXLCDM]+)\.\s+");

// Header shapes
inference_pattern!(ALL_CAPS_HEADER, r"^[A-Z][A-Z\s]{3,}[A-Z]$");
inference_pattern!(
    NUMBERED_HEADER,
    r"^(?:CHAPTER|SECTION|PART|TITLE|ARTICLE)\s+(?:\d+|[IVXLCDM]+)"
);
inference_pattern!(UNDERLINED_HEADER, r"^[-=]{3,}$");

// Definition shapes
inference_pattern!(
    QUOTED_MEANS,
    r#"["“”'‘’]([^"“”'‘’]+)["“”'‘’]\s+(?:means?|shall\s+mean)"#
);
inference_pattern!(
    QUOTED_REFERS_TO,
    r#"["“”'‘’]([^"“”'‘’]+)["“”'‘’]\s+(?:refers?\s+to|has\s+the\s+(?:same\s+)?meaning)"#
);
inference_pattern!(COLON_DEFINITION, r"^([A-Z][a-zA-Z\s]+):\s+");

/// Confidence below which a summary warning is attached to the result.
const CONFIDENCE_THRESHOLD: f64 = 0.5;

/// The numbering style of an inferred level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberingStyle {
    /// 1, 2, 3
    Arabic,
    /// a, b, c
    LowerLetter,
    /// A, B, C
    UpperLetter,
    /// i, ii, iii
    LowerRoman,
    /// I, II, III
    UpperRoman,
    /// No recognizable numbering.
    Unknown,
}

/// Severity of a parsing warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningLevel {
    Info,
    Warning,
    Error,
}

/// A warning generated during inference. Warnings reduce the confidence
/// score; they never abort a parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    pub level: WarningLevel,
    pub message: String,
}

impl ParseWarning {
    fn new(level: WarningLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// A section detected by inference, carrying a nesting level rather than a
/// committed Chapter/Section/Article role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericSection {
    /// Nesting level (0 = top).
    pub level: usize,

    /// Detected number label (e.g., "1", "IV", "a"); empty for bare
    /// headers.
    pub number: String,

    /// Title text after the number marker.
    pub title: String,

    /// Accumulated body content.
    pub content: String,

    /// The numbering style this section was recognized by.
    pub numbering: NumberingStyle,
}

/// A definition detected by inference.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericDefinition {
    pub term: String,
    pub definition: String,

    /// How confident the pattern match is (colon definitions score lower
    /// than quoted "means" phrases).
    pub confidence: f64,
}

/// Result of generic hierarchy inference.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericDocument {
    /// Detected title, empty if none was found.
    pub title: String,

    /// Overall parsing confidence in [0.0, 1.0].
    pub confidence: f64,

    /// Flat, leveled section list in document order.
    pub sections: Vec<GenericSection>,

    /// Detected definitions.
    pub definitions: Vec<GenericDefinition>,
}

#[derive(Debug, Default)]
struct DetectedHierarchy {
    /// Styles present in the document, outermost first.
    levels: Vec<(NumberingStyle, usize)>,
    indent_based: bool,
}

impl DetectedHierarchy {
    fn depth_of(&self, style: NumberingStyle) -> usize {
        self.levels
            .iter()
            .position(|(s, _)| *s == style)
            .unwrap_or(0)
    }
}

/// Whitespace/numbering-based structure inference for unclassified
/// documents.
#[derive(Debug, Default)]
pub struct GenericParser;

impl GenericParser {
    /// Create a new generic parser.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Infer structure from `content`. Never fails; low-quality input
    /// yields a low confidence score and warnings instead.
    #[must_use]
    pub fn parse(&self, content: &str) -> (GenericDocument, Vec<ParseWarning>) {
        let mut warnings = Vec::new();
        let lines: Vec<&str> = content.lines().collect();

        let title = detect_title(&lines, &mut warnings);
        let hierarchy = detect_hierarchy(&lines, &mut warnings);
        let sections = extract_sections(&lines, &hierarchy, &mut warnings);
        let definitions = extract_definitions(&lines, &mut warnings);

        let mut doc = GenericDocument {
            title,
            confidence: 0.0,
            sections,
            definitions,
        };
        doc.confidence = calculate_confidence(&doc, &hierarchy, &warnings);

        if doc.confidence < CONFIDENCE_THRESHOLD {
            warnings.push(ParseWarning::new(
                WarningLevel::Warning,
                "low confidence parsing, results may be unreliable",
            ));
        }

        (doc, warnings)
    }
}

/// Find the document title: the first ALL CAPS line, or the first
/// substantial line near the top.
fn detect_title(lines: &[&str], warnings: &mut Vec<ParseWarning>) -> String {
    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if ALL_CAPS_HEADER.is_match(trimmed) && trimmed.len() > 5 {
            return trimmed.to_string();
        }

        if trimmed.len() > 10 && i < 5 {
            return trimmed.to_string();
        }
    }

    warnings.push(ParseWarning::new(
        WarningLevel::Info,
        "could not detect document title",
    ));
    String::new()
}

/// Count numbering styles across the document and order the styles that
/// occur into nesting levels.
fn detect_hierarchy(lines: &[&str], warnings: &mut Vec<ParseWarning>) -> DetectedHierarchy {
    let mut arabic = 0usize;
    let mut lower_letter = 0usize;
    let mut upper_letter = 0usize;
    let mut lower_roman = 0usize;
    let mut upper_roman = 0usize;
    let mut indent_levels: Vec<usize> = Vec::new();

    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if ARABIC_DOT.is_match(trimmed) || ARABIC_PAREN.is_match(trimmed) {
            arabic += 1;
        }
        if LOWER_LETTER_PAREN.is_match(trimmed) || LOWER_LETTER_DOT.is_match(trimmed) {
            lower_letter += 1;
        }
        if UPPER_LETTER_PAREN.is_match(trimmed) || UPPER_LETTER_DOT.is_match(trimmed) {
            upper_letter += 1;
        }
        if LOWER_ROMAN_PAREN.is_match(trimmed) || LOWER_ROMAN_DOT.is_match(trimmed) {
            lower_roman += 1;
        }
        if UPPER_ROMAN_PAREN.is_match(trimmed) || UPPER_ROMAN_DOT.is_match(trimmed) {
            upper_roman += 1;
        }

        let indent = line.len() - line.trim_start_matches([' ', '\t']).len();
        if indent > 0 && !indent_levels.contains(&indent) {
            indent_levels.push(indent);
        }
    }

    let mut hierarchy = DetectedHierarchy {
        levels: Vec::new(),
        indent_based: indent_levels.len() > 1,
    };

    // Outermost-first ordering: roman chapters, arabic sections, then
    // lettered and lower-roman sublevels.
    for (style, count) in [
        (NumberingStyle::UpperRoman, upper_roman),
        (NumberingStyle::Arabic, arabic),
        (NumberingStyle::UpperLetter, upper_letter),
        (NumberingStyle::LowerLetter, lower_letter),
        (NumberingStyle::LowerRoman, lower_roman),
    ] {
        if count > 0 {
            hierarchy.levels.push((style, count));
        }
    }

    if hierarchy.levels.is_empty() {
        warnings.push(ParseWarning::new(
            WarningLevel::Warning,
            "could not detect document hierarchy",
        ));
    }

    hierarchy
}

/// Split the document into leveled sections at numbering markers, falling
/// back to header detection when no numbering exists.
fn extract_sections(
    lines: &[&str],
    hierarchy: &DetectedHierarchy,
    warnings: &mut Vec<ParseWarning>,
) -> Vec<GenericSection> {
    if hierarchy.levels.is_empty() {
        return extract_sections_by_headers(lines, warnings);
    }

    let mut sections = Vec::new();
    let mut current: Option<GenericSection> = None;
    let mut content = String::new();

    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if current.is_some() {
                content.push('\n');
            }
            continue;
        }

        let (numbering, number) = detect_numbering(trimmed);
        if numbering != NumberingStyle::Unknown {
            if let Some(mut section) = current.take() {
                section.content = content.trim().to_string();
                sections.push(section);
            }

            current = Some(GenericSection {
                level: hierarchy.depth_of(numbering),
                number,
                title: extract_section_title(trimmed),
                content: String::new(),
                numbering,
            });
            content.clear();
        } else if current.is_some() {
            content.push_str(trimmed);
            content.push('\n');
        } else if ALL_CAPS_HEADER.is_match(trimmed) || NUMBERED_HEADER.is_match(trimmed) {
            // Header without typical numbering opens a top-level section
            current = Some(GenericSection {
                level: 0,
                number: String::new(),
                title: trimmed.to_string(),
                content: String::new(),
                numbering: NumberingStyle::Unknown,
            });
            content.clear();
        }
    }

    if let Some(mut section) = current.take() {
        section.content = content.trim().to_string();
        sections.push(section);
    }

    sections
}

/// Header-shape fallback: ALL CAPS lines, CHAPTER/SECTION/... labels, and
/// underlined headings open top-level sections.
fn extract_sections_by_headers(
    lines: &[&str],
    warnings: &mut Vec<ParseWarning>,
) -> Vec<GenericSection> {
    let mut sections = Vec::new();
    let mut current: Option<GenericSection> = None;
    let mut content = String::new();

    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if current.is_some() {
                content.push('\n');
            }
            continue;
        }

        let underlined_next = lines
            .get(i + 1)
            .is_some_and(|next| UNDERLINED_HEADER.is_match(next.trim()));
        let is_header = ALL_CAPS_HEADER.is_match(trimmed)
            || NUMBERED_HEADER.is_match(trimmed)
            || underlined_next;

        if is_header {
            if let Some(mut section) = current.take() {
                section.content = content.trim().to_string();
                sections.push(section);
            }

            current = Some(GenericSection {
                level: 0,
                number: String::new(),
                title: trimmed.to_string(),
                content: String::new(),
                numbering: NumberingStyle::Unknown,
            });
            content.clear();
        } else if current.is_some() && !UNDERLINED_HEADER.is_match(trimmed) {
            content.push_str(trimmed);
            content.push('\n');
        }
    }

    if let Some(mut section) = current.take() {
        section.content = content.trim().to_string();
        sections.push(section);
    }

    if sections.is_empty() {
        warnings.push(ParseWarning::new(
            WarningLevel::Warning,
            "could not detect any sections in document",
        ));
    }

    sections
}

/// Scan for definition-shaped lines.
fn extract_definitions(
    lines: &[&str],
    warnings: &mut Vec<ParseWarning>,
) -> Vec<GenericDefinition> {
    let mut definitions = Vec::new();

    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(captures) = QUOTED_MEANS.captures(trimmed) {
            definitions.push(GenericDefinition {
                term: captures[1].to_string(),
                definition: text_after_match(trimmed, &captures[0]),
                confidence: 0.9,
            });
        } else if let Some(captures) = QUOTED_REFERS_TO.captures(trimmed) {
            definitions.push(GenericDefinition {
                term: captures[1].to_string(),
                definition: text_after_match(trimmed, &captures[0]),
                confidence: 0.85,
            });
        } else if let Some(captures) = COLON_DEFINITION.captures(trimmed) {
            // Colon definitions are prone to false positives
            definitions.push(GenericDefinition {
                term: captures[1].trim().to_string(),
                definition: trimmed
                    .strip_prefix(&captures[0])
                    .unwrap_or("")
                    .to_string(),
                confidence: 0.6,
            });
        }
    }

    if definitions.is_empty() {
        warnings.push(ParseWarning::new(
            WarningLevel::Info,
            "no definitions detected in document",
        ));
    }

    definitions
}

/// Classify the numbering marker opening a line. Letter interpretations
/// win over roman ones for single characters; roman candidates are
/// validated against the roman alphabet.
fn detect_numbering(line: &str) -> (NumberingStyle, String) {
    if let Some(captures) = UPPER_ROMAN_DOT.captures(line) {
        if is_roman_numeral(&captures[1]) {
            return (NumberingStyle::UpperRoman, captures[1].to_string());
        }
    }
    if let Some(captures) = UPPER_ROMAN_PAREN.captures(line) {
        if is_roman_numeral(&captures[1]) {
            return (NumberingStyle::UpperRoman, captures[1].to_string());
        }
    }
    if let Some(captures) = ARABIC_DOT.captures(line) {
        return (NumberingStyle::Arabic, captures[1].to_string());
    }
    if let Some(captures) = ARABIC_PAREN.captures(line) {
        return (NumberingStyle::Arabic, captures[1].to_string());
    }
    if let Some(captures) = UPPER_LETTER_DOT.captures(line) {
        return (NumberingStyle::UpperLetter, captures[1].to_string());
    }
    if let Some(captures) = UPPER_LETTER_PAREN.captures(line) {
        return (NumberingStyle::UpperLetter, captures[1].to_string());
    }
    if let Some(captures) = LOWER_LETTER_DOT.captures(line) {
        return (NumberingStyle::LowerLetter, captures[1].to_string());
    }
    if let Some(captures) = LOWER_LETTER_PAREN.captures(line) {
        return (NumberingStyle::LowerLetter, captures[1].to_string());
    }
    if let Some(captures) = LOWER_ROMAN_DOT.captures(line) {
        if is_roman_numeral(&captures[1]) {
            return (NumberingStyle::LowerRoman, captures[1].to_string());
        }
    }
    if let Some(captures) = LOWER_ROMAN_PAREN.captures(line) {
        if is_roman_numeral(&captures[1]) {
            return (NumberingStyle::LowerRoman, captures[1].to_string());
        }
    }

    (NumberingStyle::Unknown, String::new())
}

/// Strip the numbering marker from a section line, leaving the title.
fn extract_section_title(line: &str) -> String {
    let patterns: [&LazyLock<Regex>; 11] = [
        &UPPER_ROMAN_DOT,
        &UPPER_ROMAN_PAREN,
        &ARABIC_DOT,
        &ARABIC_PAREN,
        &ARABIC_CLOSE_PAREN,
        &UPPER_LETTER_DOT,
        &UPPER_LETTER_PAREN,
        &LOWER_LETTER_DOT,
        &LOWER_LETTER_PAREN,
        &LOWER_ROMAN_DOT,
        &LOWER_ROMAN_PAREN,
    ];

    for pattern in patterns {
        if let Some(found) = pattern.find(line) {
            let title = line[found.end()..].trim();
            let title = title
                .strip_prefix("- ")
                .or_else(|| title.strip_prefix("– "))
                .or_else(|| title.strip_prefix("— "))
                .unwrap_or(title);
            return title.to_string();
        }
    }

    String::new()
}

fn calculate_confidence(
    doc: &GenericDocument,
    hierarchy: &DetectedHierarchy,
    warnings: &[ParseWarning],
) -> f64 {
    let mut confidence = 1.0f64;

    for warning in warnings {
        confidence -= match warning.level {
            WarningLevel::Error => 0.3,
            WarningLevel::Warning => 0.15,
            WarningLevel::Info => 0.05,
        };
    }

    if !hierarchy.levels.is_empty() {
        confidence += 0.1;
    }
    if !doc.sections.is_empty() {
        confidence += 0.1;
    }
    if !doc.definitions.is_empty() {
        confidence += 0.05;
    }
    if !doc.title.is_empty() {
        confidence += 0.05;
    }

    confidence.clamp(0.0, 1.0)
}

fn text_after_match(line: &str, matched: &str) -> String {
    match line.find(matched) {
        Some(idx) => line[idx + matched.len()..].trim().to_string(),
        None => String::new(),
    }
}

fn is_roman_numeral(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| matches!(c.to_ascii_uppercase(), 'I' | 'V' | 'X' | 'L' | 'C' | 'D' | 'M'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_title_all_caps() {
        let parser = GenericParser::new();
        let (doc, _) = parser.parse("INTERNAL DATA POLICY\n\n1. Purpose\nSome text.\n");
        assert_eq!(doc.title, "INTERNAL DATA POLICY");
    }

    #[test]
    fn test_detect_title_first_substantial_line() {
        let parser = GenericParser::new();
        let (doc, _) = parser.parse("Acceptable use guidelines\n\n1. Scope\nText.\n");
        assert_eq!(doc.title, "Acceptable use guidelines");
    }

    #[test]
    fn test_numbered_sections_extracted() {
        let parser = GenericParser::new();
        let input = "POLICY\n\n1. Purpose\nThis policy exists.\n\n2. Scope\nIt applies to everyone.\n";
        let (doc, _) = parser.parse(input);

        // The ALL CAPS heading opens a bare top-level section, then the
        // two numbered sections follow
        assert_eq!(doc.sections.len(), 3);
        assert_eq!(doc.sections[0].title, "POLICY");
        assert_eq!(doc.sections[1].number, "1");
        assert_eq!(doc.sections[1].title, "Purpose");
        assert!(doc.sections[1].content.contains("This policy exists."));
        assert_eq!(doc.sections[2].number, "2");
    }

    #[test]
    fn test_roman_chapters_nest_above_arabic() {
        let parser = GenericParser::new();
        let input = "I. GENERAL\n\n1. First rule\nText one.\n\n2. Second rule\nText two.\n\nII. SPECIFIC\n\n3. Third rule\nText three.\n";
        let (doc, _) = parser.parse(input);

        assert_eq!(doc.sections.len(), 5);
        assert_eq!(doc.sections[0].level, 0);
        assert_eq!(doc.sections[0].numbering, NumberingStyle::UpperRoman);
        assert_eq!(doc.sections[1].level, 1);
        assert_eq!(doc.sections[1].numbering, NumberingStyle::Arabic);
    }

    #[test]
    fn test_lettered_items_detected_as_lower_letter() {
        let (numbering, number) = detect_numbering("a. first item");
        assert_eq!(numbering, NumberingStyle::LowerLetter);
        assert_eq!(number, "a");

        // 'i' reads as a letter, not a roman numeral
        let (numbering, _) = detect_numbering("(i) inner item");
        assert_eq!(numbering, NumberingStyle::LowerLetter);

        // multi-char roman still reads as roman
        let (numbering, number) = detect_numbering("(ii) inner item");
        assert_eq!(numbering, NumberingStyle::LowerRoman);
        assert_eq!(number, "ii");
    }

    #[test]
    fn test_header_fallback_without_numbering() {
        let parser = GenericParser::new();
        let input = "OVERVIEW\nSome introduction text.\n\nDETAILED RULES\nMore text here.\n";
        let (doc, _) = parser.parse(input);

        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.sections[0].title, "OVERVIEW");
        assert_eq!(doc.sections[0].level, 0);
        assert!(doc.sections[1].content.contains("More text here."));
    }

    #[test]
    fn test_quoted_means_definition() {
        let parser = GenericParser::new();
        let input = "1. Definitions\n\"processor\" means an entity that processes data.\n";
        let (doc, _) = parser.parse(input);

        assert_eq!(doc.definitions.len(), 1);
        assert_eq!(doc.definitions[0].term, "processor");
        assert!(doc.definitions[0]
            .definition
            .contains("an entity that processes data"));
        assert!(doc.definitions[0].confidence > 0.8);
    }

    #[test]
    fn test_colon_definition_scores_lower() {
        let parser = GenericParser::new();
        let (doc, _) = parser.parse("Processor: an entity acting for a controller.\n");

        assert_eq!(doc.definitions.len(), 1);
        assert_eq!(doc.definitions[0].term, "Processor");
        assert!(doc.definitions[0].confidence < 0.7);
    }

    #[test]
    fn test_empty_input_low_confidence() {
        let parser = GenericParser::new();
        let (doc, warnings) = parser.parse("");

        assert!(doc.sections.is_empty());
        assert!(doc.title.is_empty());
        assert!(doc.confidence < 0.7);
        assert!(warnings
            .iter()
            .any(|w| w.level == WarningLevel::Warning));
    }

    #[test]
    fn test_section_title_dash_prefix_stripped() {
        assert_eq!(extract_section_title("1. - Overview"), "Overview");
        assert_eq!(extract_section_title("1. — Overview"), "Overview");
        assert_eq!(extract_section_title("2. Scope"), "Scope");
    }
}
