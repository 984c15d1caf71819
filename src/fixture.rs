//! A search backend that replays recorded batches.
//!
//! Fixture documents are JSON:
//!
//! ```json
//! {
//!   "batches": { "crm software": [ { "identity": "https://...", "category": "web" } ] },
//!   "failures": [ "crm software paid ads" ]
//! }
//! ```
//!
//! Queries without a batch return an empty batch; queries listed under
//! `failures` return an error.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::backend::SearchBackend;
use crate::error::{HarvestError, Result};
use crate::types::{ResultItem, SessionContext};

/// Replays batches keyed by exact query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureBackend {
    #[serde(default)]
    batches: BTreeMap<String, Vec<ResultItem>>,
    #[serde(default)]
    failures: BTreeSet<String>,
}

impl FixtureBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a fixture document.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| HarvestError::Fixture(e.to_string()))
    }

    /// Load a fixture document from disk.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn with_batch(mut self, query: impl Into<String>, items: Vec<ResultItem>) -> Self {
        self.batches.insert(query.into(), items);
        self
    }

    pub fn with_failure(mut self, query: impl Into<String>) -> Self {
        self.failures.insert(query.into());
        self
    }

    /// Number of queries with a recorded batch.
    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }
}

impl SearchBackend for FixtureBackend {
    async fn search(&self, query: &str, context: &SessionContext) -> Result<Vec<ResultItem>> {
        if self.failures.contains(query) {
            return Err(HarvestError::Search(format!(
                "fixture failure for query '{query}'"
            )));
        }
        let batch = self.batches.get(query).cloned().unwrap_or_default();
        tracing::trace!(
            session = %context.session_id,
            query,
            items = batch.len(),
            "replayed fixture batch"
        );
        Ok(batch)
    }

    fn name(&self) -> &str {
        "fixture"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    const DOC: &str = r#"{
        "batches": {
            "crm": [
                {"identity": "https://a.com", "category": "social", "origin": "instagram",
                 "caption": "hello", "platform_score": 8.5},
                {"identity": "https://b.com", "title": "no category"}
            ]
        },
        "failures": ["broken"]
    }"#;

    #[tokio::test]
    async fn replays_recorded_batch() {
        let backend = FixtureBackend::from_json(DOC).expect("parse");
        let ctx = SessionContext::new("s", "crm");
        let batch = backend.search("crm", &ctx).await.expect("batch");
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].category, Category::Social);
        assert_eq!(batch[0].platform_score, Some(8.5));
        assert_eq!(batch[1].category, Category::Web);
    }

    #[tokio::test]
    async fn unknown_query_returns_empty_batch() {
        let backend = FixtureBackend::from_json(DOC).expect("parse");
        let ctx = SessionContext::new("s", "crm");
        let batch = backend.search("something else", &ctx).await.expect("batch");
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn listed_failure_returns_error() {
        let backend = FixtureBackend::new().with_failure("broken");
        let ctx = SessionContext::new("s", "crm");
        let err = backend.search("broken", &ctx).await.unwrap_err();
        assert_eq!(err.to_string(), "search error: fixture failure for query 'broken'");
    }

    #[test]
    fn malformed_document_is_a_fixture_error() {
        let err = FixtureBackend::from_json("{ not json").unwrap_err();
        assert!(err.to_string().starts_with("fixture error"));
    }

    #[test]
    fn builder_records_batches() {
        let backend = FixtureBackend::new()
            .with_batch("a", vec![ResultItem::new("https://a.com", Category::Web, "x")])
            .with_batch("b", vec![]);
        assert_eq!(backend.batch_count(), 2);
    }
}
