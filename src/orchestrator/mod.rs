//! Acquisition orchestrator: dedup-merge, query expansion, round loop.
//!
//! The coordinator issues the base query, merges each batch into the
//! session's result set, measures it, and keeps issuing expansion queries
//! until the size target is met or the round budget runs out.

pub mod budget;
pub mod coordinator;
pub mod dedup;
pub mod expansion;

pub use budget::QueryBudget;
pub use coordinator::{AcquisitionOutcome, AcquisitionStatus, RoundTrace, SearchCoordinator};
pub use dedup::{merge, MergeStats};
pub use expansion::QueryExpansionStrategy;
