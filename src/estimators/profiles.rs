// src/estimators/profiles.rs
//! Built-in source profiles. Order in [`specialized`] is router priority.

use super::{KeywordSignal, PositionBucket, SourceProfile};
use crate::confidence::ConfidenceModel;
use crate::patterns::{UrlFamily, UrlPattern};
use crate::policy::{FilterMode, SourcePolicy, TrustTier};

fn hours(range: std::ops::RangeInclusive<u32>) -> Vec<u32> {
    range.collect()
}

/// Wire service with dated article slugs and a fast, strictly ordered feed.
pub fn bloomberg() -> SourceProfile {
    SourceProfile {
        name: "bloomberg",
        matchers: vec!["bloomberg", "bnn"],
        url_patterns: vec![
            UrlPattern::new(UrlFamily::DashedYmd, 1.0),
            UrlPattern::new(UrlFamily::SlashedYmd, 0.9),
        ],
        buckets: vec![
            PositionBucket::new(1, 20, 1.0),
            PositionBucket::new(5, 180, 0.9),
            PositionBucket::new(12, 600, 0.75),
        ],
        beyond_weight: 0.6,
        confidence: ConfidenceModel {
            url_pattern: 0.92,
            rss_position: 0.7,
            publishing_pattern: 0.55,
            content_scan: 0.8,
        },
        keywords: vec![
            KeywordSignal::new("breaking", 15, 1.0),
            KeywordSignal::new("live:", 30, 0.9),
            KeywordSignal::new("markets wrap", 120, 0.8),
            KeywordSignal::new("week ahead", 720, 0.7),
        ],
        defaults: SourcePolicy {
            max_age_hours: 48,
            typical_publishing_hours: hours(6..=20),
            average_articles_per_day: 60.0,
            assumed_recent_article_count: 20,
            trust_tier: TrustTier::High,
            filter_mode: FilterMode::BinarySearch,
        },
        utc_offset_hours: -5,
        request_headers: vec![("Accept-Language", "en-US,en;q=0.9")],
    }
}

pub fn reuters() -> SourceProfile {
    SourceProfile {
        name: "reuters",
        matchers: vec!["reuters"],
        url_patterns: vec![
            UrlPattern::new(UrlFamily::DashedYmd, 1.0),
            UrlPattern::new(UrlFamily::SlashedYmd, 0.9),
        ],
        buckets: vec![
            PositionBucket::new(1, 10, 1.0),
            PositionBucket::new(5, 60, 0.9),
            PositionBucket::new(15, 240, 0.75),
        ],
        beyond_weight: 0.55,
        confidence: ConfidenceModel {
            url_pattern: 0.92,
            rss_position: 0.7,
            publishing_pattern: 0.5,
            content_scan: 0.8,
        },
        keywords: vec![
            KeywordSignal::new("breaking", 10, 1.0),
            KeywordSignal::new("exclusive", 60, 0.85),
            KeywordSignal::new("factbox", 360, 0.7),
        ],
        defaults: SourcePolicy {
            max_age_hours: 24,
            typical_publishing_hours: hours(0..=23),
            average_articles_per_day: 50.0,
            assumed_recent_article_count: 25,
            trust_tier: TrustTier::High,
            filter_mode: FilterMode::BinarySearch,
        },
        utc_offset_hours: 0,
        request_headers: vec![("Accept-Language", "en-US,en;q=0.9")],
    }
}

/// Korean dailies and wires: compact stamps, `idxno` article ids, KST.
pub fn korean_press() -> SourceProfile {
    SourceProfile {
        name: "korean_press",
        matchers: vec![
            "yonhap", "hankyung", "maeil", "mk_", "chosun", "joongang", "donga", "hankyoreh",
            "edaily", "newsis", "korea", "_kr",
        ],
        url_patterns: vec![
            UrlPattern::new(UrlFamily::AkrYmd, 1.0),
            UrlPattern::new(UrlFamily::CompactStamp, 1.0),
            UrlPattern::new(UrlFamily::IdxnoYmd, 0.95),
            UrlPattern::new(UrlFamily::DashedYmd, 0.9),
            UrlPattern::new(UrlFamily::SlashedYmd, 0.9),
            UrlPattern::new(UrlFamily::CompactYmd, 0.85),
        ],
        buckets: vec![
            PositionBucket::new(1, 15, 1.0),
            PositionBucket::new(5, 120, 0.85),
            PositionBucket::new(12, 480, 0.7),
        ],
        beyond_weight: 0.55,
        confidence: ConfidenceModel {
            url_pattern: 0.9,
            rss_position: 0.65,
            publishing_pattern: 0.55,
            content_scan: 0.8,
        },
        keywords: vec![
            KeywordSignal::new("속보", 10, 1.0),
            KeywordSignal::new("breaking", 10, 1.0),
            KeywordSignal::new("단독", 60, 0.8),
            KeywordSignal::new("종합", 120, 0.7),
        ],
        defaults: SourcePolicy {
            max_age_hours: 72,
            typical_publishing_hours: hours(6..=23),
            average_articles_per_day: 40.0,
            assumed_recent_article_count: 15,
            trust_tier: TrustTier::Medium,
            filter_mode: FilterMode::Sequential,
        },
        utc_offset_hours: 9,
        request_headers: vec![("Accept-Language", "ko-KR,ko;q=0.9,en;q=0.5")],
    }
}

/// Papers whose article paths carry `/yyyy/mm/dd/`.
pub fn dated_path() -> SourceProfile {
    SourceProfile {
        name: "dated_path",
        matchers: vec![
            "cnbc",
            "financial_times",
            "guardian",
            "nytimes",
            "wsj",
            "washington_post",
            "marketwatch",
        ],
        url_patterns: vec![
            UrlPattern::new(UrlFamily::SlashedYmd, 1.0),
            UrlPattern::new(UrlFamily::DashedYmd, 0.95),
            UrlPattern::new(UrlFamily::CompactYmd, 0.85),
        ],
        buckets: vec![
            PositionBucket::new(1, 45, 1.0),
            PositionBucket::new(6, 300, 0.85),
            PositionBucket::new(15, 960, 0.7),
        ],
        beyond_weight: 0.55,
        confidence: ConfidenceModel {
            url_pattern: 0.9,
            rss_position: 0.65,
            publishing_pattern: 0.5,
            content_scan: 0.8,
        },
        keywords: vec![
            KeywordSignal::new("live updates", 30, 0.9),
            KeywordSignal::new("breaking", 15, 1.0),
        ],
        defaults: SourcePolicy {
            max_age_hours: 48,
            typical_publishing_hours: hours(5..=22),
            average_articles_per_day: 30.0,
            assumed_recent_article_count: 15,
            trust_tier: TrustTier::Medium,
            filter_mode: FilterMode::Sequential,
        },
        utc_offset_hours: -5,
        request_headers: vec![("Accept-Language", "en-US,en;q=0.9")],
    }
}

/// Low-cadence newsletters and columns. Feed order spans days.
pub fn newsletter() -> SourceProfile {
    SourceProfile {
        name: "newsletter",
        matchers: vec!["substack", "newsletter", "column", "weekly", "medium_com"],
        url_patterns: vec![
            UrlPattern::new(UrlFamily::DashedYmd, 0.8),
            UrlPattern::new(UrlFamily::SlashedYmd, 0.8),
            UrlPattern::new(UrlFamily::HexEpoch, 0.5),
        ],
        buckets: vec![
            PositionBucket::new(1, 24 * 60, 0.9),
            PositionBucket::new(3, 3 * 24 * 60, 0.7),
        ],
        beyond_weight: 0.5,
        confidence: ConfidenceModel {
            url_pattern: 0.75,
            rss_position: 0.6,
            publishing_pattern: 0.45,
            content_scan: 0.8,
        },
        keywords: vec![KeywordSignal::new("this week", 3 * 24 * 60, 0.7)],
        defaults: SourcePolicy {
            max_age_hours: 168,
            typical_publishing_hours: Vec::new(),
            average_articles_per_day: 1.0,
            assumed_recent_article_count: 4,
            trust_tier: TrustTier::Low,
            filter_mode: FilterMode::Sequential,
        },
        utc_offset_hours: 0,
        request_headers: Vec::new(),
    }
}

/// Profile behind the universal estimator: every URL family at reduced weight,
/// no ordering assumptions about unknown feeds.
pub fn universal() -> SourceProfile {
    SourceProfile {
        name: "universal",
        matchers: Vec::new(),
        url_patterns: vec![
            UrlPattern::new(UrlFamily::DashedYmd, 0.95),
            UrlPattern::new(UrlFamily::SlashedYmd, 0.95),
            UrlPattern::new(UrlFamily::CompactStamp, 0.9),
            UrlPattern::new(UrlFamily::AkrYmd, 0.9),
            UrlPattern::new(UrlFamily::IdxnoYmd, 0.85),
            UrlPattern::new(UrlFamily::CompactYmd, 0.8),
            UrlPattern::new(UrlFamily::UnixEpoch, 0.75),
            UrlPattern::new(UrlFamily::HexEpoch, 0.6),
        ],
        buckets: vec![
            PositionBucket::new(1, 30, 0.9),
            PositionBucket::new(5, 240, 0.8),
            PositionBucket::new(12, 720, 0.65),
        ],
        beyond_weight: 0.5,
        confidence: ConfidenceModel::default(),
        keywords: vec![
            KeywordSignal::new("breaking", 20, 0.9),
            KeywordSignal::new("속보", 20, 0.9),
            KeywordSignal::new("just in", 20, 0.9),
        ],
        defaults: SourcePolicy::default(),
        utc_offset_hours: 0,
        request_headers: Vec::new(),
    }
}

/// Specialized profiles in router priority order.
pub fn specialized() -> Vec<SourceProfile> {
    vec![bloomberg(), reuters(), korean_press(), dated_path(), newsletter()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matchers_claim_expected_sources() {
        assert!(bloomberg().matches("Bloomberg-Economics"));
        assert!(korean_press().matches("yonhap_economy"));
        assert!(korean_press().matches("mk_stock"));
        assert!(dated_path().matches("cnbc.world"));
        assert!(!dated_path().matches("microsoft_news"));
        assert!(newsletter().matches("some.substack"));
        assert!(!bloomberg().matches("reuters_markets"));
    }

    #[test]
    fn profile_names_are_unique() {
        let mut names: Vec<_> = specialized().iter().map(|p| p.name).collect();
        names.push(universal().name);
        let n = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), n);
    }
}
