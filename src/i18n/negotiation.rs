//! Accept-Language negotiation.
//!
//! Parses a raw `Accept-Language` header into quality-ranked candidates and
//! matches them against the supported languages, falling back from a
//! region-qualified tag ("ko-KR") to its base tag ("ko").

use std::cmp::Ordering;

use crate::i18n::SupportedLanguages;

/// How quality values are treated while parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QualityPolicy {
    /// Qualities are kept exactly as sent, including values outside [0, 1].
    #[default]
    Permissive,
    /// Qualities are clamped into [0, 1] and `q=0` candidates are dropped.
    Strict,
}

/// A language tag with its quality weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub tag: String,
    pub quality: f64,
}

impl Candidate {
    pub fn new(tag: impl Into<String>, quality: f64) -> Self {
        Self {
            tag: tag.into(),
            quality,
        }
    }

    /// Portion of the tag before the first `-`, if the tag has a region part.
    pub fn base_tag(&self) -> Option<&str> {
        self.tag.split_once('-').map(|(base, _)| base)
    }
}

/// Parse an `Accept-Language` header value with the permissive policy.
///
/// # Example
/// ```
/// use noprefix_locale::i18n::{parse_accept_language, Candidate};
///
/// let parsed = parse_accept_language("ko-KR,ko;q=0.9,en-US;q=0.8");
/// assert_eq!(
///     parsed,
///     vec![
///         Candidate::new("ko-KR", 1.0),
///         Candidate::new("ko", 0.9),
///         Candidate::new("en-US", 0.8),
///     ]
/// );
/// ```
pub fn parse_accept_language(header: &str) -> Vec<Candidate> {
    parse_accept_language_with(header, QualityPolicy::Permissive)
}

/// Parse an `Accept-Language` header value.
///
/// The result is sorted by quality, highest first. The sort is stable, so
/// tags with equal quality keep their left-to-right header order. A `q`
/// value that does not parse as a number counts as 1.0.
pub fn parse_accept_language_with(header: &str, policy: QualityPolicy) -> Vec<Candidate> {
    if header.is_empty() {
        return Vec::new();
    }

    let mut candidates: Vec<Candidate> = header
        .split(',')
        .map(parse_item)
        .filter_map(|candidate| match policy {
            QualityPolicy::Permissive => Some(candidate),
            QualityPolicy::Strict => {
                let quality = candidate.quality.clamp(0.0, 1.0);
                (quality > 0.0).then(|| Candidate::new(candidate.tag, quality))
            }
        })
        .collect();

    candidates.sort_by(|a, b| b.quality.partial_cmp(&a.quality).unwrap_or(Ordering::Equal));
    candidates
}

fn parse_item(item: &str) -> Candidate {
    let mut segments = item.trim().split(';');
    let tag = segments.next().unwrap_or_default().trim();

    let quality = segments
        .map(str::trim)
        .find_map(|segment| segment.strip_prefix("q="))
        .map(|value| parse_quality(value.trim()))
        .unwrap_or(1.0);

    Candidate::new(tag, quality)
}

fn parse_quality(value: &str) -> f64 {
    match value.parse::<f64>() {
        Ok(quality) if !quality.is_nan() => quality,
        _ => 1.0,
    }
}

/// Pick the first candidate, in ranked order, that the supported set accepts.
///
/// Each candidate is tried as an exact code first, then by its base tag when
/// it carries a region.
pub fn negotiate<'a>(candidates: &[Candidate], supported: &'a SupportedLanguages) -> Option<&'a str> {
    candidates.iter().find_map(|candidate| {
        supported
            .get_by_code(&candidate.tag)
            .or_else(|| candidate.base_tag().and_then(|base| supported.get_by_code(base)))
            .map(|lang| lang.code.as_str())
    })
}

/// Parse a header and negotiate it in one step.
pub fn best_match<'a>(
    header: &str,
    supported: &'a SupportedLanguages,
    policy: QualityPolicy,
) -> Option<&'a str> {
    negotiate(&parse_accept_language_with(header, policy), supported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn supported() -> SupportedLanguages {
        SupportedLanguages::from_pairs([("ko", "Korean"), ("en", "English"), ("ja", "Japanese")])
    }

    fn tags(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.tag.as_str()).collect()
    }

    // ==================== Parse Tests ====================

    #[test]
    fn test_parse_complex_header() {
        let parsed = parse_accept_language("ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7,ja;q=0.6");
        assert_eq!(
            parsed,
            vec![
                Candidate::new("ko-KR", 1.0),
                Candidate::new("ko", 0.9),
                Candidate::new("en-US", 0.8),
                Candidate::new("en", 0.7),
                Candidate::new("ja", 0.6),
            ]
        );
    }

    #[test]
    fn test_parse_simple_header() {
        assert_eq!(parse_accept_language("en"), vec![Candidate::new("en", 1.0)]);
    }

    #[test]
    fn test_parse_empty_header() {
        assert!(parse_accept_language("").is_empty());
    }

    #[test]
    fn test_parse_malformed_quality_defaults_to_one() {
        assert_eq!(
            parse_accept_language("ko;q=bogus,en;q=0.5"),
            vec![Candidate::new("ko", 1.0), Candidate::new("en", 0.5)]
        );
    }

    #[test]
    fn test_parse_nan_quality_defaults_to_one() {
        assert_eq!(parse_accept_language("ko;q=NaN"), vec![Candidate::new("ko", 1.0)]);
    }

    #[test]
    fn test_parse_sorts_by_quality_descending() {
        let parsed = parse_accept_language("en;q=0.5,ja;q=0.9,ko");
        assert_eq!(tags(&parsed), vec!["ko", "ja", "en"]);
    }

    #[test]
    fn test_parse_equal_quality_keeps_header_order() {
        let parsed = parse_accept_language("ja;q=0.8,en;q=0.8,ko;q=0.8");
        assert_eq!(tags(&parsed), vec!["ja", "en", "ko"]);
    }

    #[test]
    fn test_parse_spaces_around_values() {
        let parsed = parse_accept_language(" ko-KR , ko ; q=0.9 , en ; q=0.8 ");
        assert_eq!(parsed[0], Candidate::new("ko-KR", 1.0));
        assert_eq!(parsed[1], Candidate::new("ko", 0.9));
        assert_eq!(parsed[2], Candidate::new("en", 0.8));
    }

    #[test]
    fn test_parse_multiple_semicolons() {
        assert_eq!(parse_accept_language("ko;;q=0.9"), vec![Candidate::new("ko", 0.9)]);
    }

    #[test]
    fn test_parse_first_quality_parameter_wins() {
        assert_eq!(
            parse_accept_language("ko;q=0.3;q=0.9"),
            vec![Candidate::new("ko", 0.3)]
        );
    }

    #[test]
    fn test_parse_spaced_q_is_not_quality() {
        assert_eq!(parse_accept_language("ko;q = 0.5"), vec![Candidate::new("ko", 1.0)]);
    }

    #[test]
    fn test_parse_empty_item_kept() {
        let parsed = parse_accept_language("en,");
        assert_eq!(parsed, vec![Candidate::new("en", 1.0), Candidate::new("", 1.0)]);

        // The empty tag never matches, even when nothing else does.
        assert_eq!(negotiate(&parse_accept_language("fr,"), &supported()), None);
    }

    #[test]
    fn test_parse_other_parameters_ignored() {
        assert_eq!(
            parse_accept_language("ko;level=1;q=0.4"),
            vec![Candidate::new("ko", 0.4)]
        );
    }

    #[test]
    fn test_parse_wildcard_is_an_ordinary_tag() {
        let parsed = parse_accept_language("ja;q=1.0, ko;q=0.8, en;q=0.5, *;q=0.1");
        assert_eq!(tags(&parsed), vec!["ja", "ko", "en", "*"]);
    }

    // ==================== Quality Range Tests ====================

    #[test]
    fn test_permissive_keeps_quality_above_one() {
        assert_eq!(parse_accept_language("ko;q=1.5"), vec![Candidate::new("ko", 1.5)]);
    }

    #[test]
    fn test_permissive_keeps_negative_and_zero_quality() {
        let parsed = parse_accept_language("ko;q=-1,en;q=0");
        assert_eq!(parsed, vec![Candidate::new("en", 0.0), Candidate::new("ko", -1.0)]);
    }

    #[test]
    fn test_permissive_out_of_range_outranks_one() {
        let parsed = parse_accept_language("en,ja;q=2");
        assert_eq!(tags(&parsed), vec!["ja", "en"]);
    }

    #[test]
    fn test_permissive_keeps_infinity() {
        let parsed = parse_accept_language("en,ko;q=inf");
        assert_eq!(parsed, vec![Candidate::new("ko", f64::INFINITY), Candidate::new("en", 1.0)]);
    }

    #[test]
    fn test_strict_clamps_infinity() {
        let parsed = parse_accept_language_with("ko;q=inf", QualityPolicy::Strict);
        assert_eq!(parsed, vec![Candidate::new("ko", 1.0)]);
    }

    #[test]
    fn test_strict_clamps_quality() {
        let parsed = parse_accept_language_with("en,ja;q=2", QualityPolicy::Strict);
        assert_eq!(parsed, vec![Candidate::new("en", 1.0), Candidate::new("ja", 1.0)]);
    }

    #[test]
    fn test_strict_drops_not_acceptable() {
        let parsed = parse_accept_language_with("ko;q=0,en;q=-3,ja;q=0.2", QualityPolicy::Strict);
        assert_eq!(parsed, vec![Candidate::new("ja", 0.2)]);
    }

    #[test]
    fn test_strict_still_tolerates_malformed_quality() {
        let parsed = parse_accept_language_with("ko;q=x", QualityPolicy::Strict);
        assert_eq!(parsed, vec![Candidate::new("ko", 1.0)]);
    }

    // ==================== Base Tag Tests ====================

    #[test]
    fn test_base_tag() {
        assert_eq!(Candidate::new("ko-KR", 1.0).base_tag(), Some("ko"));
        assert_eq!(Candidate::new("zh-Hans-CN", 1.0).base_tag(), Some("zh"));
        assert_eq!(Candidate::new("ko", 1.0).base_tag(), None);
    }

    // ==================== Negotiate Tests ====================

    #[test]
    fn test_negotiate_exact_match() {
        let languages = supported();
        assert_eq!(best_match("ko,en;q=0.8", &languages, QualityPolicy::Permissive), Some("ko"));
    }

    #[test]
    fn test_negotiate_region_fallback() {
        let languages = supported();
        assert_eq!(
            best_match("ko-KR,en-US;q=0.8", &languages, QualityPolicy::Permissive),
            Some("ko")
        );
    }

    #[test]
    fn test_negotiate_falls_to_second_choice() {
        let languages = supported();
        assert_eq!(best_match("fr,en;q=0.8", &languages, QualityPolicy::Permissive), Some("en"));
    }

    #[test]
    fn test_negotiate_no_match() {
        let languages = supported();
        assert_eq!(best_match("fr,de,es", &languages, QualityPolicy::Permissive), None);
        assert_eq!(best_match("xx-XX", &languages, QualityPolicy::Permissive), None);
        assert_eq!(best_match("", &languages, QualityPolicy::Permissive), None);
    }

    #[test]
    fn test_negotiate_real_world_header() {
        let languages = SupportedLanguages::from_pairs([("ko", "Korean"), ("en", "English")]);
        assert_eq!(
            best_match("ko-KR,ko;q=0.9,en-US;q=0.8", &languages, QualityPolicy::Permissive),
            Some("ko")
        );
    }

    #[test]
    fn test_negotiate_prefers_exact_regional_code() {
        let languages = SupportedLanguages::from_pairs([("en", "English"), ("en-GB", "British English")]);
        assert_eq!(best_match("en-GB", &languages, QualityPolicy::Permissive), Some("en-GB"));
    }

    #[test]
    fn test_negotiate_respects_quality_over_position() {
        let languages = supported();
        assert_eq!(
            best_match("en;q=0.2,ja-JP;q=0.9", &languages, QualityPolicy::Permissive),
            Some("ja")
        );
    }

    #[test]
    fn test_negotiate_equal_quality_first_listed_wins() {
        let languages = supported();
        assert_eq!(
            best_match("ja;q=0.5,ko;q=0.5", &languages, QualityPolicy::Permissive),
            Some("ja")
        );
    }

    #[test]
    fn test_negotiate_is_case_sensitive() {
        let languages = supported();
        assert_eq!(best_match("KO-kr", &languages, QualityPolicy::Permissive), None);
    }

    #[test]
    fn test_negotiate_strict_skips_refused_language() {
        let languages = supported();
        assert_eq!(best_match("ko;q=0,en;q=0.1", &languages, QualityPolicy::Strict), Some("en"));
        assert_eq!(best_match("ko;q=0,en;q=0.1", &languages, QualityPolicy::Permissive), Some("en"));
        assert_eq!(best_match("ko;q=0", &languages, QualityPolicy::Permissive), Some("ko"));
        assert_eq!(best_match("ko;q=0", &languages, QualityPolicy::Strict), None);
    }

    // ==================== Property Tests ====================

    proptest! {
        #[test]
        fn prop_parse_never_panics(header in ".{0,200}") {
            let _ = parse_accept_language(&header);
            let _ = parse_accept_language_with(&header, QualityPolicy::Strict);
        }

        #[test]
        fn prop_parse_output_is_sorted(header in "[a-zA-Z, ;=.0-9-]{0,80}") {
            let parsed = parse_accept_language(&header);
            for pair in parsed.windows(2) {
                prop_assert!(pair[0].quality >= pair[1].quality);
            }
        }

        #[test]
        fn prop_parse_keeps_one_candidate_per_item(items in proptest::collection::vec("[a-z]{1,3}(-[A-Z]{2})?", 1..8)) {
            let header = items.join(",");
            let parsed = parse_accept_language(&header);
            prop_assert_eq!(parsed.len(), items.len());
            // All qualities are 1.0, so stable sorting preserves input order.
            prop_assert_eq!(tags(&parsed), items.iter().map(String::as_str).collect::<Vec<_>>());
        }

        #[test]
        fn prop_strict_qualities_in_unit_range(header in "[a-z, ;=.0-9-]{0,80}") {
            for candidate in parse_accept_language_with(&header, QualityPolicy::Strict) {
                prop_assert!(candidate.quality > 0.0 && candidate.quality <= 1.0);
            }
        }

        #[test]
        fn prop_negotiated_code_is_supported(header in "[a-zA-Z, ;=.0-9-]{0,80}") {
            let languages = supported();
            if let Some(code) = best_match(&header, &languages, QualityPolicy::Permissive) {
                prop_assert!(languages.is_valid(code));
            }
        }
    }
}
