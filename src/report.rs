//! Rendering of finished sessions for downstream consumers.
//!
//! [`to_json`] produces the structured document; [`render_text`] produces
//! a Markdown summary for humans.

use std::fmt;

use crate::error::{HarvestError, Result};
use crate::orchestrator::AcquisitionOutcome;

/// Serialise an outcome as pretty-printed JSON.
pub fn to_json(outcome: &AcquisitionOutcome) -> Result<String> {
    serde_json::to_string_pretty(outcome).map_err(|e| HarvestError::Report(e.to_string()))
}

/// Ten-cell bar for a 0 to 10 score.
fn score_bar(score: f64) -> String {
    let filled = score.clamp(0.0, 10.0) as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}

/// Markdown view of a finished session.
///
/// Implements [`fmt::Display`]; [`render_text`] is the owned-string form.
pub struct TextReport<'a>(pub &'a AcquisitionOutcome);

/// Render an outcome as a Markdown report.
pub fn render_text(outcome: &AcquisitionOutcome) -> String {
    TextReport(outcome).to_string()
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = self.0;
        let snap = &outcome.snapshot;
        let target_kib = snap.size_target as f64 / 1024.0;

        writeln!(f, "# Content acquisition report\n")?;
        writeln!(f, "**Session:** {}  ", outcome.session_id)?;
        writeln!(f, "**Started:** {}  ", outcome.started_at.to_rfc3339())?;
        writeln!(f, "**Status:** {}  ", outcome.status)?;
        writeln!(
            f,
            "**Rounds:** 1 base + {} expansion ({} ms)\n",
            outcome.expansion_rounds, outcome.elapsed_ms
        )?;

        writeln!(f, "## Summary\n")?;
        writeln!(f, "- Size: {:.1} KiB of {target_kib:.0} KiB", snap.size_kib())?;
        writeln!(f, "- Progress: {:.1}%", snap.progress_percent())?;
        writeln!(f, "- Items: {}", snap.item_count)?;
        writeln!(
            f,
            "- Quality: {:.2}/10 ({})\n",
            snap.quality_score,
            snap.tier()
        )?;

        writeln!(f, "## By category\n")?;
        writeln!(f, "| Category | Items | KiB | Share | Avg chars/item |")?;
        writeln!(f, "|---|---:|---:|---:|---:|")?;
        for (category, group) in &snap.by_category {
            writeln!(
                f,
                "| {category} | {} | {:.1} | {:.1}% | {:.0} |",
                group.count, group.size_kib, group.percentage_of_total, group.avg_size_per_item
            )?;
        }

        if !snap.by_origin.is_empty() {
            writeln!(f, "\n## By origin\n")?;
            let mut origins: Vec<_> = snap.by_origin.iter().collect();
            origins.sort_by(|a, b| b.1.size_bytes.cmp(&a.1.size_bytes).then(a.0.cmp(b.0)));
            for (origin, group) in origins {
                writeln!(
                    f,
                    "- **{origin}**: {} items, {:.1} KiB ({:.1}% of total)",
                    group.count, group.size_kib, group.percentage_of_total
                )?;
            }
        }

        writeln!(f, "\n## Quality metrics\n")?;
        for (label, value) in snap.metrics.labelled() {
            writeln!(f, "- {label}: {value:.1}/10 `{}`", score_bar(value))?;
        }

        if !snap.recommendations.is_empty() {
            writeln!(f, "\n## Recommendations\n")?;
            for (i, rec) in snap.recommendations.iter().enumerate() {
                writeln!(f, "{}. {rec}", i + 1)?;
            }
        }

        writeln!(f, "\n## Rounds\n")?;
        for round in &outcome.trace {
            match &round.error {
                Some(err) => writeln!(f, "- [{}] `{}`: failed ({err})", round.round, round.query)?,
                None => writeln!(
                    f,
                    "- [{}] `{}`: +{} items, +{:.1} KiB",
                    round.round,
                    round.query,
                    round.items_added,
                    round.size_added as f64 / 1024.0
                )?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HarvestConfig;
    use crate::fixture::FixtureBackend;
    use crate::orchestrator::SearchCoordinator;
    use crate::types::{Category, ResultItem, SessionContext};

    async fn outcome() -> AcquisitionOutcome {
        let backend = FixtureBackend::new()
            .with_batch(
                "crm",
                vec![ResultItem::new("https://youtube.com/v", Category::Video, "youtube")
                    .with_title("crm marketing")
                    .with_description("d".repeat(2048))],
            )
            .with_failure("crm digital marketing");
        let mut config = HarvestConfig::default();
        config.coordinator.max_expansion_rounds = 2;
        config.coordinator.round_delay_ms = 0;
        let coordinator = SearchCoordinator::new(backend, &config).expect("config");
        coordinator.run(&SessionContext::new("report-test", "crm")).await
    }

    #[test]
    fn score_bar_has_ten_cells() {
        assert_eq!(score_bar(3.7), "███░░░░░░░");
        assert_eq!(score_bar(12.0).chars().count(), 10);
        assert_eq!(score_bar(-1.0), "░░░░░░░░░░");
    }

    #[tokio::test]
    async fn text_report_lists_sections_and_failed_round() {
        let text = render_text(&outcome().await);
        assert!(text.contains("**Session:** report-test"));
        assert!(text.contains("**Status:** budget exhausted"));
        assert!(text.contains("| video | 1 |"));
        assert!(text.contains("- **youtube**: 1 items"));
        assert!(text.contains("`crm digital marketing`: failed"));
        assert!(text.contains("## Recommendations"));
    }

    #[tokio::test]
    async fn display_matches_rendered_text() {
        let outcome = outcome().await;
        let text = render_text(&outcome);
        assert_eq!(format!("{}", TextReport(&outcome)), text);
        assert!(text.starts_with("# Content acquisition report\n\n"));
        assert!(text.contains("## Rounds\n\n- [0] `crm`: +1 items"));
    }

    #[tokio::test]
    async fn json_report_is_structured() {
        let json = to_json(&outcome().await).expect("json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("parse");
        assert_eq!(value["status"]["kind"], "budget_exhausted");
        assert_eq!(value["snapshot"]["size_target"], 307_200);
        assert_eq!(value["trace"].as_array().map(Vec::len), Some(3));
        assert!(value["result_set"]["buckets"]["video"].is_array());
    }
}
