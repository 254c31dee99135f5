//! Compiled pattern sets and the pattern-library seam.
//!
//! A [`ParserConfig`] is the immutable set of compiled patterns one parse
//! call runs with: built-in defaults, optionally overridden per hierarchy
//! level by a [`PatternBridge`] supplied by an external pattern registry.
//! A bridge overriding only some levels leaves the rest at their defaults.
//!
//! The registry itself (loading and compiling jurisdiction definitions) is
//! an external collaborator behind the [`PatternRegistry`] trait; this
//! crate only consumes the compiled patterns it hands over.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::document::DocumentFormat;

macro_rules! default_pattern {
    ($name:ident, $pattern:literal) => {
        #[allow(clippy::expect_used)] // static regex that is guaranteed to be valid
        pub(crate) static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($pattern).expect("valid regex"));
    };
}

// EU-style (GDPR and similar instruments)
default_pattern!(EU_CHAPTER, r"^CHAPTER\s+([IVX]+)$");
default_pattern!(EU_SECTION, r"^Section\s+(\d+)$");
default_pattern!(EU_ARTICLE, r"^Article\s+(\d+)$");

// US-style (California Civil Code and sibling state codes)
default_pattern!(US_CHAPTER, r"^CHAPTER\s+(\d+)$");
default_pattern!(US_ARTICLE, r"^Article\s+(\d+)$");
default_pattern!(US_SECTION_CA, r"^Section\s+(\d+)\.(\d+)$");
default_pattern!(US_SECTION_VA, r"^(?:Section|§)\s*(\d+\.\d+)-(\d+)\.?$");
default_pattern!(US_SECTION_CO, r"^(?:Section|§)\s*(\d+)-(\d+)-(\d+)\.?$");
default_pattern!(US_SECTION_IA, r"^(?:Section|§)\s*(\d+[A-Z])\.(\d+)$");

// UK-style (Acts and Statutory Instruments)
default_pattern!(UK_PART, r"^PART\s+(\d+)\s*$");
default_pattern!(UK_SECTION, r"^(\d+)\.\s*[-—]?\s*(.+)$");
default_pattern!(UK_SECTION_PLAIN, r"^(\d+)\s+(\S.*)$");
default_pattern!(UK_SCHEDULE, r"^SCHEDULE\s+(\d+)\s*$");
default_pattern!(
    UK_DEFINITION,
    r#"^(?:\(\d+\)\s+)?[“”"]([^“”"]+)[“”"]\s+(?:means?|has\s+the\s+(?:same\s+)?meaning)"#
);

// Common
default_pattern!(RECITAL, r"^\((\d+)\)\s+(.*)$");
default_pattern!(DEFINITION, r#"^\((\d+)\)\s+['"‘’]([^'"‘’]+)['"‘’].*means"#);
default_pattern!(
    US_DEFINITION,
    r#"^\(([a-z])\)\s+['"‘’]([^'"‘’]+)['"‘’]\s+means"#
);

/// Where a jurisdiction keeps its definitions: a section number, a title
/// regex, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefinitionLocation {
    /// Section number of the definitions section (0 when unknown).
    pub section_number: u32,

    /// Regex source matched against section titles (empty when unknown).
    pub section_title: String,
}

impl DefinitionLocation {
    /// Create a location hint by section number.
    #[must_use]
    pub fn by_number(section_number: u32) -> Self {
        Self {
            section_number,
            section_title: String::new(),
        }
    }

    /// Create a location hint by section title regex.
    #[must_use]
    pub fn by_title(section_title: impl Into<String>) -> Self {
        Self {
            section_number: 0,
            section_title: section_title.into(),
        }
    }
}

/// Opaque bundle of compiled patterns for one jurisdiction, produced by an
/// external pattern registry. The parser only calls the accessors; it never
/// inspects how the patterns were defined.
#[derive(Debug, Clone, Default)]
pub struct PatternBridge {
    jurisdiction: String,
    hierarchy: HashMap<String, Regex>,
    definition: Option<Regex>,
    recital: Option<Regex>,
    preamble_end: Option<Regex>,
    definition_locations: Vec<DefinitionLocation>,
}

impl PatternBridge {
    /// Create an empty bridge for a jurisdiction code (e.g., "EU", "US-CA",
    /// "GB").
    #[must_use]
    pub fn new(jurisdiction: impl Into<String>) -> Self {
        Self {
            jurisdiction: jurisdiction.into(),
            ..Self::default()
        }
    }

    /// Set the pattern for a hierarchy level ("chapter", "section",
    /// "article", "part", "schedule").
    #[must_use]
    pub fn with_hierarchy_pattern(mut self, level: impl Into<String>, pattern: Regex) -> Self {
        self.hierarchy.insert(level.into(), pattern);
        self
    }

    /// Set the definition-extraction pattern.
    #[must_use]
    pub fn with_definition_pattern(mut self, pattern: Regex) -> Self {
        self.definition = Some(pattern);
        self
    }

    /// Set the recital pattern.
    #[must_use]
    pub fn with_recital_pattern(mut self, pattern: Regex) -> Self {
        self.recital = Some(pattern);
        self
    }

    /// Set the preamble-end pattern.
    #[must_use]
    pub fn with_preamble_end_pattern(mut self, pattern: Regex) -> Self {
        self.preamble_end = Some(pattern);
        self
    }

    /// Add a definition-location hint.
    #[must_use]
    pub fn with_definition_location(mut self, location: DefinitionLocation) -> Self {
        self.definition_locations.push(location);
        self
    }

    /// The jurisdiction code this bridge was built for.
    #[must_use]
    pub fn jurisdiction(&self) -> &str {
        &self.jurisdiction
    }

    /// Compiled pattern for a hierarchy level, if the jurisdiction defines
    /// one.
    #[must_use]
    pub fn hierarchy_pattern(&self, level: &str) -> Option<&Regex> {
        self.hierarchy.get(level)
    }

    /// Compiled definition-extraction pattern, if defined.
    #[must_use]
    pub fn definition_pattern(&self) -> Option<&Regex> {
        self.definition.as_ref()
    }

    /// Compiled recital pattern, if defined.
    #[must_use]
    pub fn recital_pattern(&self) -> Option<&Regex> {
        self.recital.as_ref()
    }

    /// Compiled preamble-end pattern, if defined.
    #[must_use]
    pub fn preamble_end_pattern(&self) -> Option<&Regex> {
        self.preamble_end.as_ref()
    }

    /// Definition-location hints for this jurisdiction.
    #[must_use]
    pub fn definition_locations(&self) -> &[DefinitionLocation] {
        &self.definition_locations
    }
}

/// A format detected by an external pattern registry, with its confidence
/// score. Registries return matches ranked best-first.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatMatch {
    /// Registry-internal format identifier.
    pub format_id: String,

    /// Jurisdiction code (e.g., "EU", "US-CO", "GB").
    pub jurisdiction: String,

    /// Confidence in [0.0, 1.0].
    pub confidence: f64,
}

/// External pattern registry: detects formats by confidence-scored matching
/// and hands over compiled pattern bridges. Implemented outside this crate.
pub trait PatternRegistry {
    /// Rank registered formats against `content`, best first, dropping
    /// matches below `min_confidence`.
    fn detect_with_threshold(&self, content: &str, min_confidence: f64) -> Vec<FormatMatch>;

    /// Build a bridge carrying the compiled patterns of a format.
    fn bridge(&self, format_id: &str) -> Option<PatternBridge>;
}

/// Whether detection results are too weak to commit to any specific format,
/// meaning the generic whitespace/numbering inference should run instead.
#[must_use]
pub fn should_use_generic(matches: &[FormatMatch], threshold: f64) -> bool {
    match matches.first() {
        Some(best) => best.confidence < threshold,
        None => true,
    }
}

/// Detect the best-matching format in `content` and return its bridge, or
/// `None` when nothing reaches `min_confidence`.
#[must_use]
pub fn detect_and_bridge(
    registry: &dyn PatternRegistry,
    content: &str,
    min_confidence: f64,
) -> Option<PatternBridge> {
    let matches = registry.detect_with_threshold(content, min_confidence);
    let best = matches.first()?;
    registry.bridge(&best.format_id)
}

/// US section-number dialect. The shapes differ in how the leaf article
/// number is embedded in the citation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionDialect {
    /// `Section 59.1-575`: leaf number after the hyphen.
    Virginia,
    /// `Section 6-1-1303`: leaf number is the third hyphen segment.
    ColoradoUtah,
    /// `Section 715D.1`: leaf number after the letter-suffixed segment.
    Iowa,
    /// `Section 1798.100`: leaf number is the subsection part.
    CaliforniaTexas,
}

/// One entry in the ordered US section-dialect table: a recognizer plus the
/// capture group holding the leaf article number.
#[derive(Debug, Clone)]
pub struct SectionShape {
    pub dialect: SectionDialect,
    pattern: Regex,
    leaf_group: usize,
}

impl SectionShape {
    fn new(dialect: SectionDialect, pattern: Regex) -> Self {
        let leaf_group = match dialect {
            SectionDialect::ColoradoUtah => 3,
            _ => 2,
        };
        Self {
            dialect,
            pattern,
            leaf_group,
        }
    }

    /// Try to recognize `line` as a section header in this dialect,
    /// returning the leaf article number.
    #[must_use]
    pub fn leaf_number(&self, line: &str) -> Option<u32> {
        let captures = self.pattern.captures(line)?;
        captures.get(self.leaf_group)?.as_str().parse().ok()
    }
}

/// A recognized US section header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionMatch {
    pub dialect: SectionDialect,
    pub leaf_number: u32,
}

/// The immutable compiled pattern set one parse call runs with.
///
/// Built once per parse from the defaults plus optional bridge overrides,
/// so a [`crate::parser::Parser`] carries no per-call mutable state.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    pub(crate) eu_chapter: Regex,
    pub(crate) eu_section: Regex,
    pub(crate) eu_article: Regex,

    pub(crate) us_chapter: Regex,
    pub(crate) us_article: Regex,
    pub(crate) section_shapes: Vec<SectionShape>,

    pub(crate) uk_part: Regex,
    pub(crate) uk_section: Regex,
    pub(crate) uk_section_plain: Regex,
    pub(crate) uk_schedule: Regex,
    pub(crate) uk_definition: Regex,

    pub(crate) recital: Regex,
    pub(crate) definition: Regex,
    pub(crate) us_definition: Regex,
    pub(crate) preamble_end: Option<Regex>,

    pub(crate) definition_locations: Vec<DefinitionLocation>,
    pub(crate) jurisdiction: Option<String>,
}

impl ParserConfig {
    /// The built-in default pattern set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            eu_chapter: EU_CHAPTER.clone(),
            eu_section: EU_SECTION.clone(),
            eu_article: EU_ARTICLE.clone(),
            us_chapter: US_CHAPTER.clone(),
            us_article: US_ARTICLE.clone(),
            section_shapes: vec![
                SectionShape::new(SectionDialect::Virginia, US_SECTION_VA.clone()),
                SectionShape::new(SectionDialect::ColoradoUtah, US_SECTION_CO.clone()),
                SectionShape::new(SectionDialect::Iowa, US_SECTION_IA.clone()),
                SectionShape::new(SectionDialect::CaliforniaTexas, US_SECTION_CA.clone()),
            ],
            uk_part: UK_PART.clone(),
            uk_section: UK_SECTION.clone(),
            uk_section_plain: UK_SECTION_PLAIN.clone(),
            uk_schedule: UK_SCHEDULE.clone(),
            uk_definition: UK_DEFINITION.clone(),
            recital: RECITAL.clone(),
            definition: DEFINITION.clone(),
            us_definition: US_DEFINITION.clone(),
            preamble_end: None,
            definition_locations: Vec::new(),
            jurisdiction: None,
        }
    }

    /// Build the pattern set for a detected format, applying any bridge
    /// overrides for that format's hierarchy levels. Levels the bridge does
    /// not define stay at their defaults.
    #[must_use]
    pub fn for_format(format: DocumentFormat, bridge: Option<&PatternBridge>) -> Self {
        let mut config = Self::new();
        let Some(bridge) = bridge else {
            return config;
        };

        config.jurisdiction = Some(bridge.jurisdiction().to_string());
        config.definition_locations = bridge.definition_locations().to_vec();

        match format {
            DocumentFormat::Eu => config.apply_eu_bridge(bridge),
            DocumentFormat::Us => config.apply_us_bridge(bridge),
            DocumentFormat::Uk => config.apply_uk_bridge(bridge),
            DocumentFormat::Generic | DocumentFormat::Unknown => {}
        }

        config
    }

    fn apply_eu_bridge(&mut self, bridge: &PatternBridge) {
        if let Some(pattern) = bridge.hierarchy_pattern("chapter") {
            self.eu_chapter = pattern.clone();
        }
        if let Some(pattern) = bridge.hierarchy_pattern("section") {
            self.eu_section = pattern.clone();
        }
        if let Some(pattern) = bridge.hierarchy_pattern("article") {
            self.eu_article = pattern.clone();
        }
        if let Some(pattern) = bridge.definition_pattern() {
            self.definition = pattern.clone();
        }
        if let Some(pattern) = bridge.recital_pattern() {
            self.recital = pattern.clone();
        }
        if let Some(pattern) = bridge.preamble_end_pattern() {
            self.preamble_end = Some(pattern.clone());
        }
    }

    fn apply_us_bridge(&mut self, bridge: &PatternBridge) {
        if let Some(pattern) = bridge.hierarchy_pattern("chapter") {
            self.us_chapter = pattern.clone();
        }
        // Some states (Colorado, Utah) use "part" instead of "chapter" as
        // the top-level division; it takes precedence when both are defined.
        if let Some(pattern) = bridge.hierarchy_pattern("part") {
            self.us_chapter = pattern.clone();
        }
        if let Some(pattern) = bridge.hierarchy_pattern("article") {
            self.us_article = pattern.clone();
        }
        if let Some(pattern) = bridge.hierarchy_pattern("section") {
            // The section pattern replaces the shape for the bridge's own
            // dialect; the other dialects keep their defaults.
            let dialect = match bridge.jurisdiction() {
                "US-VA" | "US-CT" => SectionDialect::Virginia,
                "US-CO" | "US-UT" => SectionDialect::ColoradoUtah,
                "US-IA" => SectionDialect::Iowa,
                _ => SectionDialect::CaliforniaTexas,
            };
            for shape in &mut self.section_shapes {
                if shape.dialect == dialect {
                    shape.pattern = pattern.clone();
                }
            }
        }
        if let Some(pattern) = bridge.definition_pattern() {
            self.us_definition = pattern.clone();
        }
    }

    fn apply_uk_bridge(&mut self, bridge: &PatternBridge) {
        if let Some(pattern) = bridge.hierarchy_pattern("part") {
            self.uk_part = pattern.clone();
        }
        if let Some(pattern) = bridge.hierarchy_pattern("section") {
            self.uk_section = pattern.clone();
        }
        if let Some(pattern) = bridge.hierarchy_pattern("schedule") {
            self.uk_schedule = pattern.clone();
        }
        if let Some(pattern) = bridge.definition_pattern() {
            self.uk_definition = pattern.clone();
        }
    }

    /// Try the US section dialects in priority order against a trimmed
    /// line. First match wins.
    #[must_use]
    pub fn match_section(&self, line: &str) -> Option<SectionMatch> {
        for shape in &self.section_shapes {
            if let Some(leaf_number) = shape.leaf_number(line) {
                return Some(SectionMatch {
                    dialect: shape.dialect,
                    leaf_number,
                });
            }
        }
        None
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::new()
    }
}
