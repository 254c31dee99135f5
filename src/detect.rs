//! Document format detection.
//!
//! Two strategies, tried in order: confidence-scored matching through an
//! external pattern registry (when one is configured), then the built-in
//! indicator counting. Indicator weights live in a data table so they can
//! be unit-tested and adjusted independently of the scan loop.

use std::sync::LazyLock;

use regex::Regex;

use crate::document::DocumentFormat;
use crate::patterns::{
    detect_and_bridge, should_use_generic, PatternBridge, PatternRegistry, EU_ARTICLE, EU_CHAPTER,
    UK_PART, UK_SCHEDULE, US_CHAPTER, US_SECTION_CA,
};

/// Minimum registry confidence to commit to a jurisdiction; below this the
/// generic inference path is used.
pub const MIN_REGISTRY_CONFIDENCE: f64 = 0.3;

/// Minimum indicator score to commit to a format in the built-in strategy.
const MIN_INDICATOR_SCORE: u32 = 2;

#[allow(clippy::expect_used)] // static regex that is guaranteed to be valid
static UK_CHAPTER_CITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\d{4}\s+c\.\s*\d+\]").expect("valid regex"));

#[allow(clippy::expect_used)] // static regex that is guaranteed to be valid
static UK_SI_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"S\.?I\.?\s+\d{4}/\d+").expect("valid regex"));

/// How an indicator inspects a line.
enum Signal {
    /// Regex against the raw line.
    Line(&'static LazyLock<Regex>),
    /// Regex against the trimmed line.
    TrimmedLine(&'static LazyLock<Regex>),
    /// Any of these substrings in the raw line (case-sensitive).
    ContainsAny(&'static [&'static str]),
    /// Substring of the uppercased trimmed line.
    ContainsUpper(&'static str),
}

impl Signal {
    fn matches(&self, line: &str, trimmed: &str, upper: &str) -> bool {
        match self {
            Self::Line(pattern) => pattern.is_match(line),
            Self::TrimmedLine(pattern) => pattern.is_match(trimmed),
            Self::ContainsAny(needles) => needles.iter().any(|n| line.contains(n)),
            Self::ContainsUpper(needle) => upper.contains(needle),
        }
    }
}

struct Indicator {
    format: DocumentFormat,
    weight: u32,
    signal: Signal,
}

/// The indicator weight table. Each hit adds its weight to the format's
/// score; the highest score above the minimum wins, with ties broken
/// UK > US > EU.
static INDICATORS: [Indicator; 19] = [
    // EU
    Indicator {
        format: DocumentFormat::Eu,
        weight: 2,
        signal: Signal::Line(&EU_CHAPTER),
    },
    Indicator {
        format: DocumentFormat::Eu,
        weight: 1,
        signal: Signal::Line(&EU_ARTICLE),
    },
    Indicator {
        format: DocumentFormat::Eu,
        weight: 3,
        signal: Signal::ContainsAny(&["HAVE ADOPTED THIS REGULATION"]),
    },
    Indicator {
        format: DocumentFormat::Eu,
        weight: 2,
        signal: Signal::ContainsAny(&["(EU)", "(EC)"]),
    },
    // US
    Indicator {
        format: DocumentFormat::Us,
        weight: 2,
        signal: Signal::Line(&US_CHAPTER),
    },
    Indicator {
        format: DocumentFormat::Us,
        weight: 2,
        signal: Signal::Line(&US_SECTION_CA),
    },
    Indicator {
        format: DocumentFormat::Us,
        weight: 2,
        signal: Signal::ContainsUpper("CALIFORNIA"),
    },
    Indicator {
        format: DocumentFormat::Us,
        weight: 2,
        signal: Signal::ContainsUpper("VIRGINIA"),
    },
    Indicator {
        format: DocumentFormat::Us,
        weight: 3,
        signal: Signal::ContainsAny(&["TITLE 1.81", "Section 1798"]),
    },
    Indicator {
        format: DocumentFormat::Us,
        weight: 3,
        signal: Signal::ContainsAny(&["Section 59.1-", "§ 59.1-"]),
    },
    // UK
    Indicator {
        format: DocumentFormat::Uk,
        weight: 3,
        signal: Signal::ContainsUpper("BE IT ENACTED"),
    },
    Indicator {
        format: DocumentFormat::Uk,
        weight: 3,
        signal: Signal::ContainsUpper("STATUTORY INSTRUMENT"),
    },
    Indicator {
        format: DocumentFormat::Uk,
        weight: 2,
        signal: Signal::ContainsUpper("ROYAL ASSENT"),
    },
    Indicator {
        format: DocumentFormat::Uk,
        weight: 2,
        signal: Signal::ContainsUpper("LORDS SPIRITUAL AND TEMPORAL"),
    },
    Indicator {
        format: DocumentFormat::Uk,
        weight: 2,
        signal: Signal::ContainsUpper("HOUSE OF COMMONS"),
    },
    Indicator {
        format: DocumentFormat::Uk,
        weight: 1,
        signal: Signal::TrimmedLine(&UK_PART),
    },
    Indicator {
        format: DocumentFormat::Uk,
        weight: 1,
        signal: Signal::TrimmedLine(&UK_SCHEDULE),
    },
    Indicator {
        format: DocumentFormat::Uk,
        weight: 3,
        signal: Signal::Line(&UK_CHAPTER_CITATION),
    },
    Indicator {
        format: DocumentFormat::Uk,
        weight: 3,
        signal: Signal::Line(&UK_SI_NUMBER),
    },
];

/// Result of format detection: the format, plus the pattern bridge when a
/// registry match supplied one.
#[derive(Debug)]
pub struct Detection {
    pub format: DocumentFormat,
    pub bridge: Option<PatternBridge>,
}

/// Detect the structural format of a document.
///
/// When a registry is available its confidence-scored detection runs first;
/// jurisdictions it cannot map (or no registry at all) fall through to the
/// built-in indicator counting.
#[must_use]
pub fn detect_format(lines: &[String], registry: Option<&dyn PatternRegistry>) -> Detection {
    if let Some(registry) = registry {
        let content = lines.join("\n");

        let matches = registry.detect_with_threshold(&content, MIN_REGISTRY_CONFIDENCE);
        if should_use_generic(&matches, MIN_REGISTRY_CONFIDENCE) {
            tracing::debug!("registry detection below threshold, using generic inference");
            return Detection {
                format: DocumentFormat::Generic,
                bridge: None,
            };
        }

        if let Some(bridge) = detect_and_bridge(registry, &content, MIN_REGISTRY_CONFIDENCE) {
            if let Some(format) = map_jurisdiction(bridge.jurisdiction()) {
                tracing::debug!(
                    jurisdiction = bridge.jurisdiction(),
                    format = format.as_str(),
                    "format detected via pattern registry"
                );
                return Detection {
                    format,
                    bridge: Some(bridge),
                };
            }
        }
    }

    Detection {
        format: detect_format_legacy(lines),
        bridge: None,
    }
}

/// Map a registry jurisdiction code onto a structural format. Unknown codes
/// return `None`, falling through to the built-in detection.
fn map_jurisdiction(jurisdiction: &str) -> Option<DocumentFormat> {
    match jurisdiction {
        "EU" => Some(DocumentFormat::Eu),
        "US" | "US-Federal" | "US-CA" | "US-VA" | "US-CO" | "US-CT" | "US-UT" | "US-IA"
        | "US-TX" => Some(DocumentFormat::Us),
        "GB" | "GB-SCT" => Some(DocumentFormat::Uk),
        _ => None,
    }
}

/// Built-in indicator counting over the weight table. Returns `Generic`
/// when no format reaches the minimum score.
#[must_use]
pub fn detect_format_legacy(lines: &[String]) -> DocumentFormat {
    let mut eu_score = 0u32;
    let mut us_score = 0u32;
    let mut uk_score = 0u32;

    for line in lines {
        let trimmed = line.trim();
        let upper = trimmed.to_uppercase();

        for indicator in &INDICATORS {
            if indicator.signal.matches(line, trimmed, &upper) {
                match indicator.format {
                    DocumentFormat::Eu => eu_score += indicator.weight,
                    DocumentFormat::Us => us_score += indicator.weight,
                    DocumentFormat::Uk => uk_score += indicator.weight,
                    DocumentFormat::Generic | DocumentFormat::Unknown => {}
                }
            }
        }
    }

    tracing::debug!(eu_score, us_score, uk_score, "indicator scores");

    if eu_score.max(us_score).max(uk_score) < MIN_INDICATOR_SCORE {
        return DocumentFormat::Generic;
    }

    if uk_score > eu_score && uk_score > us_score {
        return DocumentFormat::Uk;
    }
    if us_score > eu_score {
        return DocumentFormat::Us;
    }
    DocumentFormat::Eu
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::FormatMatch;

    fn lines(input: &[&str]) -> Vec<String> {
        input.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_detect_eu_from_adoption_clause() {
        let input = lines(&[
            "REGULATION (EU) 2016/679",
            "HAVE ADOPTED THIS REGULATION:",
            "CHAPTER I",
            "Article 1",
        ]);
        assert_eq!(detect_format_legacy(&input), DocumentFormat::Eu);
    }

    #[test]
    fn test_detect_us_from_state_markers() {
        let input = lines(&[
            "CALIFORNIA CONSUMER PRIVACY ACT",
            "TITLE 1.81.5",
            "Section 1798.100",
        ]);
        assert_eq!(detect_format_legacy(&input), DocumentFormat::Us);
    }

    #[test]
    fn test_detect_uk_from_enacting_clause() {
        let input = lines(&[
            "Data Protection Act 2018",
            "[2018 c. 12]",
            "BE IT ENACTED by the Queen's most Excellent Majesty",
            "PART 1",
        ]);
        assert_eq!(detect_format_legacy(&input), DocumentFormat::Uk);
    }

    #[test]
    fn test_scores_below_threshold_force_generic() {
        let input = lines(&[
            "Internal compliance policy",
            "1. Purpose",
            "2. Scope",
            "Article 1", // one weak EU hit (+1) stays below the threshold
        ]);
        assert_eq!(detect_format_legacy(&input), DocumentFormat::Generic);
    }

    #[test]
    fn test_uk_wins_ties_over_us_and_eu() {
        // UK strictly above both forces UK even though US > EU
        let input = lines(&[
            "Section 1798.100",          // US +2 (dotted section) +3 (Section 1798)
            "CALIFORNIA",                // US +2
            "STATUTORY INSTRUMENT",      // UK +3
            "BE IT ENACTED",             // UK +3
            "ROYAL ASSENT",              // UK +2
        ]);
        assert_eq!(detect_format_legacy(&input), DocumentFormat::Uk);
    }

    #[test]
    fn test_us_beats_eu_on_tie_break() {
        // Equal scores resolve to EU only when US is not strictly greater
        let input = lines(&["(EU) something", "CALIFORNIA rules apply"]);
        // EU +2, US +2: tie resolves to EU (US must be strictly greater)
        assert_eq!(detect_format_legacy(&input), DocumentFormat::Eu);
    }

    #[test]
    fn test_si_number_counts_for_uk() {
        let input = lines(&["S.I. 2019/419", "The Data Protection Regulations 2019"]);
        assert_eq!(detect_format_legacy(&input), DocumentFormat::Uk);
    }

    struct StubRegistry {
        matches: Vec<FormatMatch>,
        bridge_jurisdiction: Option<String>,
    }

    impl PatternRegistry for StubRegistry {
        fn detect_with_threshold(&self, _content: &str, min_confidence: f64) -> Vec<FormatMatch> {
            self.matches
                .iter()
                .filter(|m| m.confidence >= min_confidence)
                .cloned()
                .collect()
        }

        fn bridge(&self, _format_id: &str) -> Option<PatternBridge> {
            self.bridge_jurisdiction
                .as_ref()
                .map(|j| PatternBridge::new(j.clone()))
        }
    }

    #[test]
    fn test_registry_detection_binds_bridge() {
        let registry = StubRegistry {
            matches: vec![FormatMatch {
                format_id: "eu_regulation".to_string(),
                jurisdiction: "EU".to_string(),
                confidence: 0.9,
            }],
            bridge_jurisdiction: Some("EU".to_string()),
        };

        let detection = detect_format(&lines(&["whatever"]), Some(&registry));
        assert_eq!(detection.format, DocumentFormat::Eu);
        assert!(detection.bridge.is_some());
    }

    #[test]
    fn test_registry_low_confidence_forces_generic() {
        let registry = StubRegistry {
            matches: vec![FormatMatch {
                format_id: "eu_regulation".to_string(),
                jurisdiction: "EU".to_string(),
                confidence: 0.1,
            }],
            bridge_jurisdiction: Some("EU".to_string()),
        };

        let detection = detect_format(&lines(&["whatever"]), Some(&registry));
        assert_eq!(detection.format, DocumentFormat::Generic);
        assert!(detection.bridge.is_none());
    }

    #[test]
    fn test_unmapped_jurisdiction_falls_through_to_indicators() {
        let registry = StubRegistry {
            matches: vec![FormatMatch {
                format_id: "nz_act".to_string(),
                jurisdiction: "NZ".to_string(),
                confidence: 0.9,
            }],
            bridge_jurisdiction: Some("NZ".to_string()),
        };

        let input = lines(&["CHAPTER I", "Article 1", "HAVE ADOPTED THIS REGULATION:"]);
        let detection = detect_format(&input, Some(&registry));
        assert_eq!(detection.format, DocumentFormat::Eu);
        assert!(detection.bridge.is_none());
    }
}
