//! The accumulated, deduplicated results of one acquisition session.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::types::{Category, ResultItem};

/// All results acquired so far in one session, bucketed by category.
///
/// Buckets keep discovery order. The identity set holds every identity
/// ever inserted, so no two items share one. Items are only added through
/// [`crate::orchestrator::dedup::merge`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregateResultSet {
    session_id: String,
    buckets: BTreeMap<Category, Vec<ResultItem>>,
    #[serde(skip)]
    identities: HashSet<String>,
    size_bytes: usize,
}

impl AggregateResultSet {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            ..Self::default()
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Running content size of all contained items.
    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    /// Total number of items across all categories.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether an identity (already trimmed) has been inserted.
    pub fn contains(&self, identity: &str) -> bool {
        self.identities.contains(identity)
    }

    /// Items of one category in discovery order.
    pub fn category(&self, category: Category) -> &[ResultItem] {
        self.buckets
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The first `n` items of a category in discovery order.
    pub fn top_items(&self, category: Category, n: usize) -> &[ResultItem] {
        let items = self.category(category);
        &items[..n.min(items.len())]
    }

    /// Every item, category by category in [`Category::ALL`] order.
    pub fn items(&self) -> impl Iterator<Item = &ResultItem> {
        Category::ALL
            .into_iter()
            .flat_map(move |category| self.category(category).iter())
    }

    /// Full recomputation of the content size over all contained items.
    pub fn recompute_size(&self) -> usize {
        self.items().map(ResultItem::content_size).sum()
    }

    /// Insert an item whose trimmed identity is known to be new.
    ///
    /// Returns the item's content size.
    pub(crate) fn insert_unique(&mut self, identity: String, item: ResultItem) -> usize {
        let size = item.content_size();
        self.identities.insert(identity);
        self.buckets.entry(item.category).or_default().push(item);
        self.size_bytes += size;
        size
    }

    /// Reset the running counter from a full recomputation.
    pub(crate) fn resync_size(&mut self) {
        let recomputed = self.recompute_size();
        if recomputed != self.size_bytes {
            tracing::warn!(
                session = %self.session_id,
                running = self.size_bytes,
                recomputed,
                "running size drifted from recomputation"
            );
        }
        self.size_bytes = recomputed;
    }
}
