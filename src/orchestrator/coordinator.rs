//! The round-based acquisition loop.
//!
//! # Pipeline
//!
//! 1. Search the base query. Failure here is fatal for the session.
//! 2. Merge the batch through [`dedup::merge`] and measure the set.
//! 3. Stop when converged or when the budget is spent.
//! 4. Otherwise pause, take the next unissued expansion query, search it
//!    (a failure counts as an empty batch), and go back to 2.
//!
//! Rounds run strictly one after another: the next query is only chosen
//! once the previous batch is merged and measured. Cancellation is
//! observed between rounds, never in the middle of one.

use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::backend::SearchBackend;
use crate::config::{CoordinatorConfig, HarvestConfig};
use crate::error::{HarvestError, Result};
use crate::monitor::{QualitySnapshot, SizeQualityMonitor};
use crate::result_set::AggregateResultSet;
use crate::types::SessionContext;

use super::budget::QueryBudget;
use super::dedup::{self, MergeStats};
use super::expansion::QueryExpansionStrategy;

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AcquisitionStatus {
    /// The size target (and quality floor, if any) was reached.
    TargetAchieved,
    /// No budget or no unissued queries were left. A partial result.
    BudgetExhausted,
    /// The caller cancelled the session between rounds.
    Cancelled,
    /// The base search failed; nothing was acquired.
    FatalError { reason: String },
}

impl fmt::Display for AcquisitionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetAchieved => f.write_str("target achieved"),
            Self::BudgetExhausted => f.write_str("budget exhausted"),
            Self::Cancelled => f.write_str("cancelled"),
            Self::FatalError { reason } => write!(f, "fatal error: {reason}"),
        }
    }
}

/// One search round, for observability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundTrace {
    /// 0 for the base round, then 1, 2, ... for expansion rounds.
    pub round: usize,
    pub query: String,
    pub items_added: usize,
    pub size_added: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RoundTrace {
    fn merged(round: usize, query: &str, stats: MergeStats) -> Self {
        Self {
            round,
            query: query.to_owned(),
            items_added: stats.added,
            size_added: stats.added_size_bytes,
            error: None,
        }
    }

    fn failed(round: usize, query: &str, err: &HarvestError) -> Self {
        Self {
            round,
            query: query.to_owned(),
            items_added: 0,
            size_added: 0,
            error: Some(err.to_string()),
        }
    }
}

/// Everything a finished session produced.
#[derive(Debug, Clone, Serialize)]
pub struct AcquisitionOutcome {
    pub session_id: String,
    pub status: AcquisitionStatus,
    pub snapshot: QualitySnapshot,
    pub result_set: AggregateResultSet,
    pub trace: Vec<RoundTrace>,
    /// Expansion rounds issued after the base round.
    pub expansion_rounds: usize,
    /// Every query issued, base query first.
    pub issued_queries: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

impl AcquisitionOutcome {
    pub fn target_achieved(&self) -> bool {
        self.status == AcquisitionStatus::TargetAchieved
    }

    pub fn recommendations(&self) -> &[String] {
        &self.snapshot.recommendations
    }

    /// Turn a fatal outcome into [`HarvestError::BaseSearch`]; every other
    /// status is returned as `Ok`.
    pub fn into_result(self) -> Result<Self> {
        match &self.status {
            AcquisitionStatus::FatalError { reason } => Err(HarvestError::BaseSearch(reason.clone())),
            _ => Ok(self),
        }
    }
}

/// Drives acquisition sessions against one search backend.
///
/// The coordinator holds no per-session state: each [`run`](Self::run)
/// owns its result set and budget, so independent sessions may run
/// concurrently on one coordinator.
pub struct SearchCoordinator<B> {
    backend: B,
    monitor: SizeQualityMonitor,
    expansion: QueryExpansionStrategy,
    config: CoordinatorConfig,
    cancel: CancellationToken,
}

impl<B: SearchBackend> SearchCoordinator<B> {
    /// Build a coordinator after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Config`] if the configuration is invalid.
    pub fn new(backend: B, config: &HarvestConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            backend,
            monitor: SizeQualityMonitor::new(config.monitor.clone()),
            expansion: QueryExpansionStrategy::new(config.expansion.clone()),
            config: config.coordinator.clone(),
            cancel: CancellationToken::new(),
        })
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that stops every running session at its next round boundary.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn monitor(&self) -> &SizeQualityMonitor {
        &self.monitor
    }

    /// Run one acquisition session to a terminal status.
    pub async fn run(&self, context: &SessionContext) -> AcquisitionOutcome {
        let started_at = Utc::now();
        let timer = Instant::now();
        let session = context.session_id.as_str();
        let mut set = AggregateResultSet::new(session);
        let mut budget = QueryBudget::new(self.config.max_expansion_rounds);
        let mut trace = Vec::new();

        tracing::info!(
            session,
            backend = self.backend.name(),
            max_rounds = self.config.max_expansion_rounds,
            "acquisition session started"
        );

        let status = 'session: {
            if self.cancel.is_cancelled() {
                break 'session AcquisitionStatus::Cancelled;
            }

            // Base round.
            let base = context.base_query.as_str();
            budget.record_base(base);
            tracing::debug!(session, query = base, "issuing base query");
            match self.backend.search(base, context).await {
                Ok(batch) => {
                    let stats = dedup::merge(&mut set, batch);
                    trace.push(RoundTrace::merged(0, base, stats));
                }
                Err(err) => {
                    tracing::error!(session, error = %err, "base search failed");
                    trace.push(RoundTrace::failed(0, base, &err));
                    break 'session AcquisitionStatus::FatalError {
                        reason: err.to_string(),
                    };
                }
            }

            let mut snapshot = self.monitor.measure(&set);
            loop {
                if !self
                    .monitor
                    .needs_expansion(&snapshot, self.config.min_quality_score)
                {
                    break 'session AcquisitionStatus::TargetAchieved;
                }
                if budget.is_exhausted() {
                    break 'session AcquisitionStatus::BudgetExhausted;
                }
                let Some(query) = self
                    .expansion
                    .next_queries(context, budget.issued())
                    .into_iter()
                    .next()
                else {
                    tracing::info!(session, "no unissued expansion queries left");
                    break 'session AcquisitionStatus::BudgetExhausted;
                };

                if !self.pause().await || self.cancel.is_cancelled() {
                    break 'session AcquisitionStatus::Cancelled;
                }

                budget.spend(&query);
                let round = budget.rounds_used();
                tracing::debug!(session, round, query = %query, "issuing expansion query");
                let entry = match self.backend.search(&query, context).await {
                    Ok(batch) => RoundTrace::merged(round, &query, dedup::merge(&mut set, batch)),
                    Err(err) => {
                        tracing::warn!(session, round, error = %err, "expansion round failed, continuing");
                        RoundTrace::failed(round, &query, &err)
                    }
                };
                snapshot = self.monitor.measure(&set);
                tracing::info!(
                    session,
                    round,
                    items_added = entry.items_added,
                    size_added = entry.size_added,
                    size_bytes = snapshot.size_bytes,
                    quality_score = snapshot.quality_score,
                    "expansion round complete"
                );
                trace.push(entry);
            }
        };

        let snapshot = self.monitor.measure(&set);
        let elapsed_ms = u64::try_from(timer.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::info!(
            session,
            status = %status,
            size_bytes = snapshot.size_bytes,
            items = snapshot.item_count,
            quality_score = snapshot.quality_score,
            rounds = budget.rounds_used(),
            elapsed_ms,
            "acquisition session finished"
        );

        AcquisitionOutcome {
            session_id: context.session_id.clone(),
            status,
            snapshot,
            result_set: set,
            trace,
            expansion_rounds: budget.rounds_used(),
            issued_queries: budget.into_issued(),
            started_at,
            elapsed_ms,
        }
    }

    /// Run several independent sessions concurrently.
    ///
    /// Sessions share nothing but the backend; each keeps its own result
    /// set, budget and round order. Outcomes come back in input order.
    pub async fn run_many(&self, contexts: &[SessionContext]) -> Vec<AcquisitionOutcome> {
        let sessions = contexts.iter().map(|context| self.run(context));
        futures::future::join_all(sessions).await
    }

    /// Wait the inter-round delay. Returns `false` if cancelled meanwhile.
    async fn pause(&self) -> bool {
        if self.config.round_delay_ms == 0 {
            return true;
        }
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(self.config.round_delay_ms)) => true,
            _ = self.cancel.cancelled() => false,
        }
    }
}
