//! Harvest configuration with the business defaults baked in.
//!
//! [`HarvestConfig`] groups the measurement thresholds, the expansion
//! catalogs and the control-loop limits. Every section uses
//! `#[serde(default)]`, so a TOML file only needs the keys it overrides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HarvestError, Result};

/// Top-level configuration for an acquisition session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Size and quality measurement.
    pub monitor: MonitorConfig,
    /// Follow-up query generation.
    pub expansion: ExpansionConfig,
    /// Round limits and pacing.
    pub coordinator: CoordinatorConfig,
}

/// Weights of the five quality sub-scores. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityWeights {
    pub diversity: f64,
    pub reliability: f64,
    pub relevance: f64,
    pub trending: f64,
    pub engagement: f64,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            diversity: 0.20,
            reliability: 0.25,
            relevance: 0.30,
            trending: 0.15,
            engagement: 0.10,
        }
    }
}

impl QualityWeights {
    pub fn sum(&self) -> f64 {
        self.diversity + self.reliability + self.relevance + self.trending + self.engagement
    }

    fn as_array(&self) -> [f64; 5] {
        [
            self.diversity,
            self.reliability,
            self.relevance,
            self.trending,
            self.engagement,
        ]
    }
}

/// Size and quality measurement settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Content size target in KiB. The byte target is this value times 1024.
    pub size_target_kib: u64,
    /// Sub-score weights for the overall quality score.
    pub weights: QualityWeights,
    /// Domains whose results count as reliable. Subdomains match too.
    pub trusted_domains: Vec<String>,
    /// Keywords marking a result as topically relevant (case-insensitive).
    pub topical_keywords: Vec<String>,
    /// Platform score at or above which a result counts as high engagement.
    pub engagement_threshold: f64,
    /// Overall score below which quality recommendations are produced.
    pub quality_alert_threshold: f64,
    /// Sub-score below which a targeted recommendation is produced.
    pub sub_score_alert_threshold: f64,
    /// Share of total size (percent) above which a category dominates.
    pub dominant_share_percent: f64,
    /// Item count below which a category is considered starved.
    pub min_category_items: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            size_target_kib: 300,
            weights: QualityWeights::default(),
            trusted_domains: [
                "g1.globo.com",
                "exame.com",
                "valor.globo.com",
                "estadao.com.br",
                "folha.uol.com.br",
                "infomoney.com.br",
                "youtube.com",
                "instagram.com",
                "facebook.com",
            ]
            .map(String::from)
            .to_vec(),
            topical_keywords: [
                "marketing",
                "sales",
                "conversion",
                "roi",
                "campaign",
                "advertisement",
                "advertising",
                "strategy",
                "funnel",
                "vendas",
                "conversão",
                "campanha",
                "anúncio",
                "publicidade",
                "estratégia",
                "funil",
            ]
            .map(String::from)
            .to_vec(),
            engagement_threshold: 7.0,
            quality_alert_threshold: 7.0,
            sub_score_alert_threshold: 6.0,
            dominant_share_percent: 80.0,
            min_category_items: 5,
        }
    }
}

impl MonitorConfig {
    /// The size target in bytes (`size_target_kib * 1024`).
    pub fn size_target_bytes(&self) -> usize {
        (self.size_target_kib as usize).saturating_mul(1024)
    }
}

/// Follow-up query generation settings.
///
/// Templates use the `{segment}`, `{product}` and `{subject}` placeholders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    /// Context attribute holding the market segment.
    pub segment_key: String,
    /// Context attribute holding the product.
    pub product_key: String,
    /// Templates used when both segment and product are known.
    pub segment_product_templates: Vec<String>,
    /// Templates interpolated with the base query otherwise.
    pub subject_templates: Vec<String>,
    /// Topic-agnostic research queries appended after the templates.
    pub generic_queries: Vec<String>,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            segment_key: "segment".to_owned(),
            product_key: "product".to_owned(),
            segment_product_templates: [
                "{segment} {product} marketing strategies",
                "{segment} {product} successful campaigns",
                "{segment} {product} high conversion",
                "{segment} {product} marketing roi",
                "{segment} {product} success stories",
                "how to sell {product} {segment}",
                "marketing {product} {segment} brazil",
                "{product} {segment} ads that converted",
                "{product} {segment} sales funnel",
                "{product} {segment} high converting copy",
            ]
            .map(String::from)
            .to_vec(),
            subject_templates: [
                "{subject} digital marketing",
                "{subject} sales strategies",
                "{subject} successful campaigns",
                "{subject} high conversion",
                "{subject} marketing roi",
                "{subject} growth hacking",
                "{subject} sales funnel",
                "{subject} marketing automation",
                "{subject} social media",
                "{subject} influencer marketing",
                "{subject} email marketing",
                "{subject} content marketing",
                "{subject} paid ads",
                "{subject} organic growth",
                "{subject} viral marketing",
            ]
            .map(String::from)
            .to_vec(),
            generic_queries: [
                "digital marketing strategies",
                "high conversion campaigns",
                "ads that converted",
                "marketing success cases",
                "digital campaign roi",
                "optimized sales funnel",
                "high conversion landing pages",
                "copy that converts",
                "audience segmentation",
                "marketing automation",
                "growth hacking",
                "viral marketing",
                "influencer marketing roi",
                "email marketing conversion",
                "social media engagement",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

/// Control-loop limits and pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Maximum number of expansion rounds after the base round.
    pub max_expansion_rounds: usize,
    /// Pause between rounds in milliseconds, as a courtesy to the backend.
    pub round_delay_ms: u64,
    /// Quality score a session must also reach before it counts as
    /// converged. 0.0 disables the quality gate.
    pub min_quality_score: f64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_expansion_rounds: 15,
            round_delay_ms: 1000,
            min_quality_score: 0.0,
        }
    }
}

impl HarvestConfig {
    /// Validates this configuration, returning an error for the first
    /// invalid field.
    pub fn validate(&self) -> Result<()> {
        let monitor = &self.monitor;
        if monitor.size_target_kib == 0 {
            return Err(HarvestError::Config(
                "size_target_kib must be greater than 0".into(),
            ));
        }
        let weights = monitor.weights.as_array();
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(HarvestError::Config(
                "quality weights must be finite and non-negative".into(),
            ));
        }
        if (monitor.weights.sum() - 1.0).abs() > 1e-6 {
            return Err(HarvestError::Config(format!(
                "quality weights must sum to 1.0, got {:.4}",
                monitor.weights.sum()
            )));
        }
        for (name, value) in [
            ("engagement_threshold", monitor.engagement_threshold),
            ("quality_alert_threshold", monitor.quality_alert_threshold),
            ("sub_score_alert_threshold", monitor.sub_score_alert_threshold),
            ("min_quality_score", self.coordinator.min_quality_score),
        ] {
            if !(0.0..=10.0).contains(&value) {
                return Err(HarvestError::Config(format!(
                    "{name} must be within 0..=10"
                )));
            }
        }
        if !(0.0..=100.0).contains(&monitor.dominant_share_percent) {
            return Err(HarvestError::Config(
                "dominant_share_percent must be within 0..=100".into(),
            ));
        }
        if self.expansion.generic_queries.is_empty() {
            return Err(HarvestError::Config(
                "at least one generic expansion query is required".into(),
            ));
        }
        Ok(())
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| HarvestError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| HarvestError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path:
    /// `<config dir>/topic-harvest/config.toml`.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("topic-harvest")
            .join("config.toml")
    }
}
