//! Quality sub-scores and the weighted overall score.
//!
//! Every sub-score is on a 0 to 10 scale:
//!
//! ```text
//! diversity    = min(10, distinct (category, origin) pairs)
//! reliability  = 10 * items from trusted domains / items
//! relevance    = 10 * items mentioning a topical keyword / items
//! trending     = 10 * trending items / items
//! engagement   = 10 * items with platform score >= threshold / items
//! overall      = sum(weight_i * subscore_i)
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::QualityWeights;
use crate::result_set::AggregateResultSet;
use crate::types::{Category, ResultItem};

use super::breakdown::ratio;

/// Upper bound of every score.
pub const MAX_SCORE: f64 = 10.0;

/// The five quality sub-scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub diversity: f64,
    pub reliability: f64,
    pub relevance: f64,
    pub trending_ratio: f64,
    pub engagement: f64,
}

impl QualityMetrics {
    /// Weighted combination of the sub-scores, clamped to `[0, 10]`.
    pub fn overall(&self, weights: &QualityWeights) -> f64 {
        clamp_score(
            self.diversity * weights.diversity
                + self.reliability * weights.reliability
                + self.relevance * weights.relevance
                + self.trending_ratio * weights.trending
                + self.engagement * weights.engagement,
        )
    }

    /// Sub-scores with their display labels, in reporting order.
    pub fn labelled(&self) -> [(&'static str, f64); 5] {
        [
            ("Content diversity", self.diversity),
            ("Source reliability", self.reliability),
            ("Topical relevance", self.relevance),
            ("Trending ratio", self.trending_ratio),
            ("Engagement quality", self.engagement),
        ]
    }
}

/// Matchers built once from the configured domain and keyword lists.
#[derive(Debug, Clone)]
pub struct QualityRules {
    trusted_domains: Vec<String>,
    keywords: Vec<String>,
    engagement_threshold: f64,
}

impl QualityRules {
    pub fn new(trusted_domains: &[String], keywords: &[String], engagement_threshold: f64) -> Self {
        Self {
            trusted_domains: trusted_domains
                .iter()
                .map(|d| normalize_host(d))
                .filter(|d| !d.is_empty())
                .collect(),
            keywords: keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            engagement_threshold,
        }
    }

    /// Whether the item's identity host is a trusted domain or one of its
    /// subdomains. Identities that do not parse as URLs are never trusted.
    pub fn is_trusted(&self, item: &ResultItem) -> bool {
        let Ok(url) = Url::parse(item.identity.trim()) else {
            return false;
        };
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = normalize_host(host);
        self.trusted_domains.iter().any(|domain| {
            host == *domain
                || host
                    .strip_suffix(domain.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }

    /// Whether any topical keyword occurs in the item's combined text.
    pub fn is_relevant(&self, item: &ResultItem) -> bool {
        let text = item.combined_text().to_lowercase();
        self.keywords.iter().any(|keyword| text.contains(keyword.as_str()))
    }

    pub fn is_high_engagement(&self, item: &ResultItem) -> bool {
        item.engagement() >= self.engagement_threshold
    }

    /// Compute all five sub-scores. An empty set scores zero everywhere.
    pub fn evaluate(&self, set: &AggregateResultSet) -> QualityMetrics {
        let total = set.len();
        if total == 0 {
            return QualityMetrics::default();
        }

        let mut pairs: HashSet<(Category, &str)> = HashSet::new();
        let mut trusted = 0;
        let mut relevant = 0;
        let mut engaging = 0;
        for item in set.items() {
            pairs.insert((item.category, item.origin.as_str()));
            trusted += usize::from(self.is_trusted(item));
            relevant += usize::from(self.is_relevant(item));
            engaging += usize::from(self.is_high_engagement(item));
        }
        let trending = set.category(Category::Trending).len();

        QualityMetrics {
            diversity: (pairs.len() as f64).min(MAX_SCORE),
            reliability: share(trusted, total),
            relevance: share(relevant, total),
            trending_ratio: share(trending, total),
            engagement: share(engaging, total),
        }
    }
}

fn share(hits: usize, total: usize) -> f64 {
    clamp_score(ratio(hits, total) * MAX_SCORE)
}

/// Clamp to `[0, 10]`, mapping NaN to 0.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, MAX_SCORE)
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('.').to_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_owned(),
        None => host,
    }
}
