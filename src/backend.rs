//! Trait for the external search collaborator.
//!
//! The acquisition loop never talks to the network itself. Whatever runs
//! the actual search (an HTTP client, a scraper, a replay fixture)
//! implements [`SearchBackend`] and hands back one batch per query.

use std::future::Future;
use std::sync::Arc;

use crate::error::HarvestError;
use crate::types::{ResultItem, SessionContext};

/// A pluggable search backend.
///
/// Implementations own transport concerns such as retries and timeouts
/// and report a failed call as an error. All implementations must be
/// `Send + Sync` so that independent sessions can share one backend.
pub trait SearchBackend: Send + Sync {
    /// Run a search and return one categorised batch of results.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError`] when the search could not be performed.
    fn search(
        &self,
        query: &str,
        context: &SessionContext,
    ) -> impl Future<Output = Result<Vec<ResultItem>, HarvestError>> + Send;

    /// Human-readable backend name for logs.
    fn name(&self) -> &str {
        "search-backend"
    }
}

impl<B: SearchBackend> SearchBackend for Arc<B> {
    fn search(
        &self,
        query: &str,
        context: &SessionContext,
    ) -> impl Future<Output = Result<Vec<ResultItem>, HarvestError>> + Send {
        self.as_ref().search(query, context)
    }

    fn name(&self) -> &str {
        self.as_ref().name()
    }
}
