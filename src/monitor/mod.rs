//! Size and quality measurement of an aggregate result set.
//!
//! [`SizeQualityMonitor::measure`] always returns a well-formed
//! [`QualitySnapshot`]: an empty set yields all-zero metrics, never an
//! error, because the control loop decides on every round from a snapshot.

pub mod breakdown;
pub mod quality;
mod recommend;

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::MonitorConfig;
use crate::result_set::AggregateResultSet;
use crate::types::Category;

pub use breakdown::SizeBreakdown;
pub use quality::{QualityMetrics, QualityRules};

/// One immutable measurement of a result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualitySnapshot {
    pub session_id: String,
    pub measured_at: DateTime<Utc>,
    pub size_bytes: usize,
    pub size_target: usize,
    pub target_achieved: bool,
    pub item_count: usize,
    /// Weighted overall score, 0 to 10.
    pub quality_score: f64,
    pub metrics: QualityMetrics,
    pub by_category: BTreeMap<Category, SizeBreakdown>,
    pub by_origin: BTreeMap<String, SizeBreakdown>,
    pub recommendations: Vec<String>,
}

impl QualitySnapshot {
    pub fn size_kib(&self) -> f64 {
        self.size_bytes as f64 / 1024.0
    }

    /// Progress towards the size target in percent (may exceed 100).
    pub fn progress_percent(&self) -> f64 {
        breakdown::ratio(self.size_bytes, self.size_target) * 100.0
    }

    pub fn tier(&self) -> QualityTier {
        QualityTier::classify(self.quality_score)
    }
}

/// Coarse classification of an overall quality score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityTier {
    Excellent,
    VeryGood,
    Good,
    Fair,
    Low,
    Critical,
}

impl QualityTier {
    pub fn classify(score: f64) -> Self {
        match score {
            s if s >= 9.0 => Self::Excellent,
            s if s >= 8.0 => Self::VeryGood,
            s if s >= 7.0 => Self::Good,
            s if s >= 6.0 => Self::Fair,
            s if s >= 5.0 => Self::Low,
            _ => Self::Critical,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "EXCELLENT",
            Self::VeryGood => "VERY GOOD",
            Self::Good => "GOOD",
            Self::Fair => "FAIR",
            Self::Low => "LOW",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Computes size, breakdowns, quality and recommendations.
///
/// Construct one per session (or share one immutably); it holds no
/// per-session state.
#[derive(Debug, Clone)]
pub struct SizeQualityMonitor {
    config: MonitorConfig,
    rules: QualityRules,
}

impl SizeQualityMonitor {
    pub fn new(config: MonitorConfig) -> Self {
        let rules = QualityRules::new(
            &config.trusted_domains,
            &config.topical_keywords,
            config.engagement_threshold,
        );
        Self { config, rules }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Size target in bytes.
    pub fn size_target(&self) -> usize {
        self.config.size_target_bytes()
    }

    /// Measure a result set.
    pub fn measure(&self, set: &AggregateResultSet) -> QualitySnapshot {
        let size_bytes = set.recompute_size();
        let size_target = self.size_target();
        let target_achieved = size_bytes >= size_target;
        let item_count = set.len();

        let by_category = breakdown::by_category(set);
        let by_origin = breakdown::by_origin(set);
        let metrics = self.rules.evaluate(set);
        let quality_score = metrics.overall(&self.config.weights);

        let recommendations = recommend::recommendations(
            &self.config,
            &recommend::Measurement {
                size_bytes,
                target_achieved,
                item_count,
                quality_score,
                metrics: &metrics,
                by_category: &by_category,
            },
        );

        tracing::debug!(
            session = %set.session_id(),
            size_bytes,
            size_target,
            target_achieved,
            quality_score,
            "measured result set"
        );

        QualitySnapshot {
            session_id: set.session_id().to_owned(),
            measured_at: Utc::now(),
            size_bytes,
            size_target,
            target_achieved,
            item_count,
            quality_score,
            metrics,
            by_category,
            by_origin,
            recommendations,
        }
    }

    /// Whether another round is warranted: the size target is missed or the
    /// quality score is below `min_quality_score`.
    pub fn needs_expansion(&self, snapshot: &QualitySnapshot, min_quality_score: f64) -> bool {
        !snapshot.target_achieved || snapshot.quality_score < min_quality_score
    }

    /// Short hints on what to search for next.
    pub fn expansion_hints(&self, snapshot: &QualitySnapshot) -> Vec<String> {
        let mut hints: Vec<String> = snapshot
            .by_category
            .iter()
            .filter(|(_, group)| group.count < self.config.min_category_items)
            .map(|(category, group)| {
                format!("expand {category} results: only {} collected", group.count)
            })
            .collect();
        let floor = self.config.sub_score_alert_threshold;
        if snapshot.metrics.relevance < floor {
            hints.push("search for more topic-specific content".to_owned());
        }
        if snapshot.metrics.trending_ratio < floor {
            hints.push("collect more trending content from social networks".to_owned());
        }
        hints
    }
}
