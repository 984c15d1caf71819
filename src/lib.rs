//! # topic-harvest
//!
//! Round-based content acquisition for topic research.
//!
//! A session issues a base query to a [`SearchBackend`], merges the
//! returned batch into a deduplicated [`AggregateResultSet`], measures its
//! size and quality, and keeps issuing expansion queries until the size
//! target is reached or the round budget runs out.
//!
//! ## Design
//!
//! - The search itself is external: anything implementing
//!   [`SearchBackend`] can feed the loop
//! - Deduplication by trimmed source URL; merging is idempotent
//! - Size counts characters of five text fields, identically everywhere
//! - Quality is a fixed-weight blend of five 0 to 10 sub-scores
//! - Expansion queries are deterministic, so sessions are reproducible
//! - No global state: every component is built from a [`HarvestConfig`]

pub mod backend;
pub mod config;
pub mod error;
pub mod fixture;
pub mod monitor;
pub mod orchestrator;
pub mod report;
pub mod result_set;
pub mod types;

pub use backend::SearchBackend;
pub use config::HarvestConfig;
pub use error::{HarvestError, Result};
pub use fixture::FixtureBackend;
pub use monitor::{QualitySnapshot, QualityTier, SizeQualityMonitor};
pub use orchestrator::{
    AcquisitionOutcome, AcquisitionStatus, QueryBudget, QueryExpansionStrategy, RoundTrace,
    SearchCoordinator,
};
pub use result_set::AggregateResultSet;
pub use types::{Category, ResultItem, SessionContext};

/// Run one session with the given backend and configuration.
///
/// Convenience wrapper around [`SearchCoordinator::new`] and
/// [`SearchCoordinator::run`].
///
/// # Errors
///
/// Returns [`HarvestError::Config`] if `config` is invalid. A failed base
/// search is reported through [`AcquisitionStatus::FatalError`]; use
/// [`AcquisitionOutcome::into_result`] to turn it into an error.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> topic_harvest::Result<()> {
/// let backend = topic_harvest::FixtureBackend::new();
/// let context = topic_harvest::SessionContext::with_generated_id("crm software");
/// let outcome = topic_harvest::acquire(backend, &context, &Default::default()).await?;
/// println!("{}: {} bytes", outcome.status, outcome.snapshot.size_bytes);
/// # Ok(())
/// # }
/// ```
pub async fn acquire<B: SearchBackend>(
    backend: B,
    context: &SessionContext,
    config: &HarvestConfig,
) -> Result<AcquisitionOutcome> {
    let coordinator = SearchCoordinator::new(backend, config)?;
    Ok(coordinator.run(context).await)
}
