//! Size breakdowns by category and by origin.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::result_set::AggregateResultSet;
use crate::types::{Category, ResultItem};

/// Count and size of one group of results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SizeBreakdown {
    pub count: usize,
    pub size_bytes: usize,
    pub size_kib: f64,
    /// `size_bytes / count`, 0 for an empty group.
    pub avg_size_per_item: f64,
    /// Share of the grand total size in percent, 0 when the total is 0.
    pub percentage_of_total: f64,
}

impl SizeBreakdown {
    fn add(&mut self, item: &ResultItem) {
        self.count += 1;
        self.size_bytes += item.content_size();
    }

    fn finish(&mut self, total_bytes: usize) {
        self.size_kib = self.size_bytes as f64 / 1024.0;
        self.avg_size_per_item = ratio(self.size_bytes, self.count);
        self.percentage_of_total = ratio(self.size_bytes, total_bytes) * 100.0;
    }
}

/// Division guarded against a zero denominator.
pub(crate) fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Breakdown per category. Every category is present, empty ones as zeros.
pub fn by_category(set: &AggregateResultSet) -> BTreeMap<Category, SizeBreakdown> {
    let mut groups: BTreeMap<Category, SizeBreakdown> = Category::ALL
        .into_iter()
        .map(|category| (category, SizeBreakdown::default()))
        .collect();
    for item in set.items() {
        groups.entry(item.category).or_default().add(item);
    }
    finish_all(groups)
}

/// Breakdown per origin, keyed by origin name.
pub fn by_origin(set: &AggregateResultSet) -> BTreeMap<String, SizeBreakdown> {
    let mut groups: BTreeMap<String, SizeBreakdown> = BTreeMap::new();
    for item in set.items() {
        groups.entry(item.origin.clone()).or_default().add(item);
    }
    finish_all(groups)
}

fn finish_all<K: Ord>(mut groups: BTreeMap<K, SizeBreakdown>) -> BTreeMap<K, SizeBreakdown> {
    let total: usize = groups.values().map(|g| g.size_bytes).sum();
    for group in groups.values_mut() {
        group.finish(total);
    }
    groups
}
