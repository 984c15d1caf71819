//! Identity-based deduplication of incoming result batches.
//!
//! An item's identity is its source URL, trimmed and otherwise compared
//! verbatim. Merging is idempotent: a batch merged twice leaves the set as
//! merging it once did.

use serde::Serialize;

use crate::result_set::AggregateResultSet;
use crate::types::ResultItem;

/// What a single merge changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    /// Items appended to the set.
    pub added: usize,
    /// Content size of the appended items.
    pub added_size_bytes: usize,
    /// Items dropped as duplicates or for a blank identity.
    pub skipped: usize,
}

/// Merge `incoming` into `existing`, skipping known identities.
///
/// New items are appended to their category bucket in batch order. Items
/// with a blank identity cannot be deduplicated and are skipped. The
/// running size counter is recomputed once the batch is in.
pub fn merge(existing: &mut AggregateResultSet, incoming: Vec<ResultItem>) -> MergeStats {
    let mut stats = MergeStats::default();

    for item in incoming {
        let identity = item.identity.trim();
        if identity.is_empty() || existing.contains(identity) {
            stats.skipped += 1;
            continue;
        }
        let identity = identity.to_owned();
        stats.added_size_bytes += existing.insert_unique(identity, item);
        stats.added += 1;
    }

    existing.resync_size();

    tracing::debug!(
        session = %existing.session_id(),
        added = stats.added,
        skipped = stats.skipped,
        added_size_bytes = stats.added_size_bytes,
        "merged result batch"
    );
    stats
}
