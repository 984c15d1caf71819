//! Threshold rules turning a measurement into recommendations.

use std::collections::BTreeMap;

use crate::config::MonitorConfig;
use crate::types::Category;

use super::breakdown::SizeBreakdown;
use super::quality::QualityMetrics;

/// The measured values the rules look at.
pub(crate) struct Measurement<'a> {
    pub size_bytes: usize,
    pub target_achieved: bool,
    pub item_count: usize,
    pub quality_score: f64,
    pub metrics: &'a QualityMetrics,
    pub by_category: &'a BTreeMap<Category, SizeBreakdown>,
}

/// Build the ordered recommendation list: size first, then quality, then
/// category balance.
pub(crate) fn recommendations(config: &MonitorConfig, m: &Measurement<'_>) -> Vec<String> {
    let mut out = Vec::new();
    size_rules(config, m, &mut out);
    quality_rules(config, m, &mut out);
    balance_rules(config, m, &mut out);
    out
}

fn size_rules(config: &MonitorConfig, m: &Measurement<'_>, out: &mut Vec<String>) {
    let current_kib = m.size_bytes as f64 / 1024.0;
    let target_kib = config.size_target_kib;
    if m.target_achieved {
        out.push(format!(
            "TARGET MET: {current_kib:.1} KiB collected (target {target_kib} KiB)"
        ));
    } else {
        let deficit = target_kib as f64 - current_kib;
        out.push(format!(
            "EXPAND SEARCH: {deficit:.1} KiB missing to reach the {target_kib} KiB target"
        ));
        out.push("Run complementary searches with niche-specific queries".to_owned());
    }
}

fn quality_rules(config: &MonitorConfig, m: &Measurement<'_>, out: &mut Vec<String>) {
    let score = m.quality_score;
    if score >= config.quality_alert_threshold {
        out.push(format!("HIGH QUALITY: score {score:.1}/10"));
        return;
    }
    out.push(format!(
        "LOW QUALITY: score {score:.1}/10, look for more reliable and relevant sources"
    ));

    let floor = config.sub_score_alert_threshold;
    let metrics = m.metrics;
    let targeted = [
        (
            metrics.diversity,
            "Diversify content: combine more platforms and providers",
        ),
        (
            metrics.reliability,
            "Improve sources: prioritise trusted domains and industry authorities",
        ),
        (
            metrics.relevance,
            "Increase relevance: focus on topic-specific queries",
        ),
        (
            metrics.trending_ratio,
            "Collect more trending content: expand searches on social networks",
        ),
        (
            metrics.engagement,
            "Seek higher engagement: favour posts with strong platform scores",
        ),
    ];
    out.extend(
        targeted
            .into_iter()
            .filter(|(value, _)| *value < floor)
            .map(|(_, message)| message.to_owned()),
    );
}

fn balance_rules(config: &MonitorConfig, m: &Measurement<'_>, out: &mut Vec<String>) {
    let before = out.len();
    for (category, group) in m.by_category {
        if group.percentage_of_total > config.dominant_share_percent {
            out.push(format!(
                "DIVERSIFY: {category} holds {:.1}% of the content, collect more from other categories",
                group.percentage_of_total
            ));
        }
    }
    // Starvation is only reported for a non-empty set.
    if m.item_count > 0 {
        for (category, group) in m.by_category {
            if group.count < config.min_category_items {
                out.push(format!(
                    "EXPAND {}: only {} items collected",
                    category.name().to_uppercase(),
                    group.count
                ));
            }
        }
    }
    if out.len() == before {
        out.push("GOOD BALANCE: content is well distributed across categories".to_owned());
    }
}
