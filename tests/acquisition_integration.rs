//! Integration tests for the acquisition loop.
//!
//! These drive [`SearchCoordinator`] end to end with in-process backends
//! (no network calls), checking the stopping rules, failure policy and
//! the size bookkeeping across rounds.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use topic_harvest::{
    AcquisitionStatus, Category, FixtureBackend, HarvestConfig, HarvestError, ResultItem,
    SearchBackend, SearchCoordinator, SessionContext,
};

const KIB: usize = 1024;

fn kib_item(url: &str, category: Category, kib: usize) -> ResultItem {
    ResultItem::new(url, category, "google").with_body("a".repeat(kib * KIB))
}

fn test_config(max_rounds: usize) -> HarvestConfig {
    let mut config = HarvestConfig::default();
    config.coordinator.max_expansion_rounds = max_rounds;
    config.coordinator.round_delay_ms = 0;
    config
}

/// Returns `base_kib` on the first call and `step_kib` of fresh content on
/// every later call, except for calls listed in `fail_on`.
struct GrowingBackend {
    base_kib: usize,
    step_kib: usize,
    fail_on: Vec<usize>,
    calls: AtomicUsize,
}

impl GrowingBackend {
    fn new(base_kib: usize, step_kib: usize) -> Self {
        Self {
            base_kib,
            step_kib,
            fail_on: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    fn failing_on(mut self, call: usize) -> Self {
        self.fail_on.push(call);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SearchBackend for GrowingBackend {
    async fn search(
        &self,
        query: &str,
        context: &SessionContext,
    ) -> Result<Vec<ResultItem>, HarvestError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on.contains(&call) {
            return Err(HarvestError::Search(format!("backend timeout on '{query}'")));
        }
        let kib = if call == 0 { self.base_kib } else { self.step_kib };
        let url = format!("https://{}.example/{call}", context.session_id);
        Ok(vec![kib_item(&url, Category::Web, kib)])
    }
}

/// Always returns an empty batch.
struct EmptyBackend {
    calls: AtomicUsize,
}

impl SearchBackend for EmptyBackend {
    async fn search(&self, _query: &str, _context: &SessionContext) -> Result<Vec<ResultItem>, HarvestError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn base_query_meeting_target_issues_no_expansion() {
    let items = vec![
        kib_item("https://exame.com/marketing-1", Category::Web, 150),
        kib_item("https://g1.globo.com/economia/2", Category::Web, 150),
        kib_item("https://www.estadao.com.br/3", Category::Web, 100),
    ];
    let backend = FixtureBackend::new().with_batch("crm software", items);
    let coordinator = SearchCoordinator::new(backend, &test_config(15)).unwrap();

    let outcome = coordinator
        .run(&SessionContext::new("reliable", "crm software"))
        .await;

    assert_eq!(outcome.status, AcquisitionStatus::TargetAchieved);
    assert!(outcome.snapshot.target_achieved);
    assert_eq!(outcome.snapshot.size_bytes, 400 * KIB);
    assert_eq!(outcome.expansion_rounds, 0);
    assert_eq!(outcome.trace.len(), 1);
    assert_eq!(outcome.issued_queries, vec!["crm software".to_string()]);
    assert!((outcome.snapshot.metrics.reliability - 10.0).abs() < 1e-9);
}

#[tokio::test]
async fn target_reached_on_fifth_expansion_round() {
    let backend = GrowingBackend::new(50, 60);
    let coordinator = SearchCoordinator::new(backend, &test_config(15)).unwrap();

    let outcome = coordinator.run(&SessionContext::new("growing", "crm")).await;

    assert_eq!(outcome.status, AcquisitionStatus::TargetAchieved);
    assert_eq!(outcome.expansion_rounds, 5);
    assert_eq!(outcome.trace.len(), 6);
    assert_eq!(outcome.snapshot.size_bytes, 350 * KIB);

    // Base + 4 expansions is 290 KiB, still short of the 300 KiB target.
    let after_four: usize = outcome.trace[..5].iter().map(|r| r.size_added).sum();
    assert_eq!(after_four, 290 * KIB);
    assert!(after_four < outcome.snapshot.size_target);
}

#[tokio::test]
async fn failed_expansion_round_is_skipped() {
    // Call 2 is the second expansion round.
    let backend = GrowingBackend::new(50, 60).failing_on(2);
    let coordinator = SearchCoordinator::new(backend, &test_config(15)).unwrap();

    let outcome = coordinator.run(&SessionContext::new("flaky", "crm")).await;

    assert!(!matches!(outcome.status, AcquisitionStatus::FatalError { .. }));
    assert_eq!(outcome.status, AcquisitionStatus::TargetAchieved);
    let failed = &outcome.trace[2];
    assert_eq!(failed.round, 2);
    assert_eq!(failed.items_added, 0);
    assert!(failed.error.as_deref().unwrap().contains("backend timeout"));
    // The next expansion query was still attempted.
    assert_eq!(outcome.trace[3].round, 3);
    assert!(outcome.trace[3].error.is_none());
    assert_ne!(outcome.trace[3].query, failed.query);
    assert_eq!(outcome.expansion_rounds, 6);
}

#[tokio::test]
async fn empty_backend_exhausts_default_budget() {
    let backend = Arc::new(EmptyBackend {
        calls: AtomicUsize::new(0),
    });
    let coordinator = SearchCoordinator::new(Arc::clone(&backend), &test_config(15)).unwrap();

    let outcome = coordinator.run(&SessionContext::new("empty", "crm")).await;

    assert_eq!(outcome.status, AcquisitionStatus::BudgetExhausted);
    assert_eq!(outcome.expansion_rounds, 15);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 16);
    assert_eq!(outcome.snapshot.size_bytes, 0);
    assert!(outcome.recommendations()[0].starts_with("EXPAND SEARCH"));
}

#[tokio::test]
async fn small_budget_bounds_calls() {
    let backend = Arc::new(GrowingBackend::new(1, 1));
    let coordinator = SearchCoordinator::new(Arc::clone(&backend), &test_config(3)).unwrap();

    let outcome = coordinator.run(&SessionContext::new("small", "crm")).await;

    assert_eq!(outcome.status, AcquisitionStatus::BudgetExhausted);
    assert_eq!(backend.calls(), 4);
    assert_eq!(outcome.snapshot.size_bytes, 4 * KIB);
}

#[tokio::test]
async fn trace_sizes_add_up_to_final_size() {
    let backend = GrowingBackend::new(20, 35);
    let coordinator = SearchCoordinator::new(backend, &test_config(15)).unwrap();

    let outcome = coordinator.run(&SessionContext::new("sum", "crm")).await;

    let traced: usize = outcome.trace.iter().map(|r| r.size_added).sum();
    assert_eq!(traced, outcome.snapshot.size_bytes);
    assert_eq!(outcome.result_set.size_bytes(), outcome.result_set.recompute_size());
    assert_eq!(outcome.result_set.len(), outcome.snapshot.item_count);
}

#[tokio::test]
async fn repeated_batches_do_not_inflate_size() {
    let batch = vec![
        kib_item("https://a.example/1", Category::Web, 10),
        kib_item("https://a.example/2", Category::Social, 10),
    ];
    let mut backend = FixtureBackend::new().with_batch("crm", batch.clone());
    for query in ["crm digital marketing", "crm sales strategies"] {
        backend = backend.with_batch(query, batch.clone());
    }
    let coordinator = SearchCoordinator::new(backend, &test_config(2)).unwrap();

    let outcome = coordinator.run(&SessionContext::new("dup", "crm")).await;

    assert_eq!(outcome.result_set.len(), 2);
    assert_eq!(outcome.snapshot.size_bytes, 20 * KIB);
    assert_eq!(outcome.trace[1].items_added, 0);
    assert_eq!(outcome.trace[2].items_added, 0);
}

#[tokio::test]
async fn quality_scores_stay_in_bounds() {
    let items = vec![
        ResultItem::new("https://youtube.com/watch?v=1", Category::Trending, "youtube")
            .with_title("viral marketing campaign")
            .with_platform_score(9.5),
        ResultItem::new("https://instagram.com/p/2", Category::Trending, "instagram")
            .with_caption("sales funnel strategy")
            .with_platform_score(10.0),
    ];
    let backend = FixtureBackend::new().with_batch("crm", items);
    let coordinator = SearchCoordinator::new(backend, &test_config(1)).unwrap();

    let outcome = coordinator.run(&SessionContext::new("bounds", "crm")).await;
    let snap = &outcome.snapshot;

    assert!((0.0..=10.0).contains(&snap.quality_score));
    for (_, value) in snap.metrics.labelled() {
        assert!((0.0..=10.0).contains(&value));
    }
    assert!((snap.metrics.trending_ratio - 10.0).abs() < 1e-9);
    assert!((snap.metrics.engagement - 10.0).abs() < 1e-9);
}

#[tokio::test]
async fn segment_and_product_drive_first_expansion_query() {
    let backend = Arc::new(EmptyBackend {
        calls: AtomicUsize::new(0),
    });
    let coordinator = SearchCoordinator::new(Arc::clone(&backend), &test_config(2)).unwrap();
    let ctx = SessionContext::new("ctx", "online fitness")
        .with_attribute("segment", "fitness")
        .with_attribute("product", "online course");

    let outcome = coordinator.run(&ctx).await;

    assert_eq!(
        outcome.issued_queries,
        vec![
            "online fitness".to_string(),
            "fitness online course marketing strategies".to_string(),
            "fitness online course successful campaigns".to_string(),
        ]
    );
}

#[tokio::test]
async fn independent_sessions_run_concurrently() {
    let backend = Arc::new(GrowingBackend::new(50, 60));
    let coordinator = SearchCoordinator::new(Arc::clone(&backend), &test_config(15)).unwrap();
    let contexts = vec![
        SessionContext::new("alpha", "crm"),
        SessionContext::new("beta", "erp"),
    ];

    let outcomes = coordinator.run_many(&contexts).await;

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].session_id, "alpha");
    assert_eq!(outcomes[1].session_id, "beta");
    for outcome in &outcomes {
        assert_eq!(outcome.result_set.session_id(), outcome.session_id);
        assert!(outcome
            .result_set
            .items()
            .all(|item| item.identity.contains(&outcome.session_id)));
        assert_eq!(outcome.status, AcquisitionStatus::TargetAchieved);
    }
}

/// Cancels the shared token once `cancel_after` calls have been made.
struct CancellingBackend {
    cancel: CancellationToken,
    cancel_after: usize,
    calls: AtomicUsize,
}

impl SearchBackend for CancellingBackend {
    async fn search(&self, _query: &str, context: &SessionContext) -> Result<Vec<ResultItem>, HarvestError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call >= self.cancel_after {
            self.cancel.cancel();
        }
        let url = format!("https://{}.example/{call}", context.session_id);
        Ok(vec![kib_item(&url, Category::Social, 1)])
    }
}

#[tokio::test]
async fn cancellation_is_observed_between_rounds() {
    let cancel = CancellationToken::new();
    let backend = Arc::new(CancellingBackend {
        cancel: cancel.clone(),
        cancel_after: 2,
        calls: AtomicUsize::new(0),
    });
    let coordinator = SearchCoordinator::new(Arc::clone(&backend), &test_config(10))
        .unwrap()
        .with_cancel_token(cancel);

    let outcome = coordinator.run(&SessionContext::new("cancel", "crm")).await;

    assert_eq!(outcome.status, AcquisitionStatus::Cancelled);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    // The in-flight round was fully merged before stopping.
    assert_eq!(outcome.trace.len(), 2);
    assert_eq!(outcome.snapshot.size_bytes, 2 * KIB);
}

#[tokio::test]
async fn fatal_base_failure_surfaces_as_error() {
    let backend = FixtureBackend::new().with_failure("crm");
    let coordinator = SearchCoordinator::new(backend, &test_config(5)).unwrap();

    let outcome = coordinator.run(&SessionContext::new("fatal", "crm")).await;

    assert!(matches!(outcome.status, AcquisitionStatus::FatalError { .. }));
    assert_eq!(outcome.expansion_rounds, 0);
    assert_eq!(outcome.trace.len(), 1);
    assert!(matches!(outcome.into_result(), Err(HarvestError::BaseSearch(_))));
}

#[tokio::test]
async fn cancellation_interrupts_inter_round_pause() {
    let backend = Arc::new(GrowingBackend::new(1, 1));
    let mut config = test_config(5);
    config.coordinator.round_delay_ms = 10_000;
    let cancel = CancellationToken::new();
    let coordinator = SearchCoordinator::new(Arc::clone(&backend), &config)
        .unwrap()
        .with_cancel_token(cancel.clone());

    let trigger = tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        cancel.cancel();
    });
    let started = std::time::Instant::now();
    let outcome = coordinator.run(&SessionContext::new("paused", "crm")).await;
    let elapsed = started.elapsed();
    trigger.await.unwrap();

    assert_eq!(outcome.status, AcquisitionStatus::Cancelled);
    assert_eq!(backend.calls(), 1);
    assert_eq!(outcome.expansion_rounds, 0);
    assert_eq!(outcome.trace.len(), 1);
    assert!(elapsed < std::time::Duration::from_secs(5), "{elapsed:?}");
}
