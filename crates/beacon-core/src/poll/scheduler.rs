use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use beacon_protocol::PollSource;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, error, info, warn};

use super::gate::{FetchGate, PollState};
use super::rollover::DateRangeTracker;
use crate::detect::ChangeDetector;
use crate::fetch::{PollError, SnapshotFetcher};
use crate::notify::AlertDispatcher;
use crate::state::{Delta, NotificationStore};

/// Result of one poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The delta was merged into the store.
    Applied(Delta),
    /// Fetched fine, nothing new.
    Unchanged,
    /// A fetch for the same source was still in flight.
    Skipped,
    /// The application shut down while the fetch was in flight.
    Discarded,
}

struct Inner {
    store: NotificationStore,
    detector: Mutex<ChangeDetector>,
    gates: Mutex<HashMap<PollSource, Arc<FetchGate>>>,
    alerts: Option<Arc<AlertDispatcher>>,
    shutdown: CancellationToken,
}

impl Inner {
    fn gate(&self, source: PollSource) -> Arc<FetchGate> {
        let mut gates = self.gates.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(gates.entry(source).or_default())
    }

    async fn run_cycle(&self, fetcher: &dyn SnapshotFetcher) -> Result<PollOutcome, PollError> {
        let source = fetcher.source();
        let gate = self.gate(source);
        let Some(_permit) = gate.try_begin() else {
            return Ok(PollOutcome::Skipped);
        };

        let snapshot = fetcher.fetch().await?;
        // A view tearing down doesn't stop this: the store outlives views.
        if self.shutdown.is_cancelled() {
            return Ok(PollOutcome::Discarded);
        }

        let delta = self
            .detector
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .detect(source, &snapshot)?;
        if delta.is_noop() {
            return Ok(PollOutcome::Unchanged);
        }

        self.store.apply_delta(delta.clone());
        if delta.raises_alert()
            && let Some(alerts) = &self.alerts
        {
            let alerts = Arc::clone(alerts);
            let alert_delta = delta.clone();
            // Backends shell out; keep them off the runtime threads.
            tokio::task::spawn_blocking(move || alerts.dispatch(&alert_delta));
        }
        Ok(PollOutcome::Applied(delta))
    }
}

fn log_background_cycle(source: PollSource, result: &Result<PollOutcome, PollError>) {
    match result {
        Ok(PollOutcome::Applied(delta)) => debug!(
            event = "core.poll.cycle_completed",
            source = %source,
            count = delta.total(),
            has_updates = delta.has_updates,
            baseline = delta.baseline,
        ),
        Ok(PollOutcome::Unchanged) => debug!(
            event = "core.poll.cycle_completed",
            source = %source,
            count = 0,
        ),
        Ok(PollOutcome::Skipped) => debug!(
            event = "core.poll.cycle_skipped",
            source = %source,
            reason = "previous fetch still in flight",
        ),
        Ok(PollOutcome::Discarded) => debug!(
            event = "core.poll.cycle_skipped",
            source = %source,
            reason = "application shutting down",
        ),
        Err(PollError::Parse(e)) => error!(
            event = "core.poll.cycle_failed",
            source = %source,
            error = %e,
        ),
        Err(e) => warn!(
            event = "core.poll.cycle_failed",
            source = %source,
            error = %e,
        ),
    }
}

/// Owns the background pollers and the per-source overlap guards.
///
/// Cheap to clone. Every poller's timer is a child of the scheduler's
/// shutdown token, so [`shutdown`](Self::shutdown) stops them all.
#[derive(Clone)]
pub struct PollScheduler {
    inner: Arc<Inner>,
}

impl PollScheduler {
    pub fn new(store: NotificationStore, alerts: Option<Arc<AlertDispatcher>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                detector: Mutex::new(ChangeDetector::new()),
                gates: Mutex::new(HashMap::new()),
                alerts,
                shutdown: CancellationToken::new(),
            }),
        }
    }

    pub fn store(&self) -> &NotificationStore {
        &self.inner.store
    }

    pub fn state(&self, source: PollSource) -> PollState {
        self.inner.gate(source).state()
    }

    /// Run `f` with the change detector locked.
    pub fn with_detector<R>(&self, f: impl FnOnce(&mut ChangeDetector) -> R) -> R {
        let mut detector = self
            .inner
            .detector
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut detector)
    }

    /// Poll `fetcher` every `period`, starting now, until the guard drops.
    ///
    /// Each tick spawns its cycle detached, so dropping the guard stops the
    /// timer but a fetch already in flight still lands in the store.
    pub fn start(&self, fetcher: Arc<dyn SnapshotFetcher>, period: Duration) -> PollerGuard {
        let source = fetcher.source();
        let token = self.inner.shutdown.child_token();
        let timer_token = token.clone();
        let inner = Arc::clone(&self.inner);

        info!(
            event = "core.poll.poller_started",
            source = %source,
            period_ms = period.as_millis() as u64,
        );

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = timer_token.cancelled() => break,
                    _ = ticker.tick() => {
                        let inner = Arc::clone(&inner);
                        let fetcher = Arc::clone(&fetcher);
                        tokio::spawn(async move {
                            let result = inner.run_cycle(fetcher.as_ref()).await;
                            log_background_cycle(source, &result);
                        });
                    }
                }
            }
            info!(event = "core.poll.poller_stopped", source = %source);
        });

        PollerGuard {
            label: source.to_string(),
            source: Some(source),
            _guard: token.drop_guard(),
        }
    }

    /// Check for day rollover every `period` until the guard drops.
    pub fn start_rollover(&self, tracker: Arc<DateRangeTracker>, period: Duration) -> PollerGuard {
        let token = self.inner.shutdown.child_token();
        tracker.spawn(period, token.clone());
        info!(
            event = "core.poll.rollover_started",
            period_ms = period.as_millis() as u64,
        );
        PollerGuard {
            label: "rollover".to_string(),
            source: None,
            _guard: token.drop_guard(),
        }
    }

    /// One cycle on demand. Errors are returned instead of swallowed.
    pub async fn refresh(&self, fetcher: &dyn SnapshotFetcher) -> Result<PollOutcome, PollError> {
        let source = fetcher.source();
        info!(event = "core.poll.refresh_started", source = %source);
        let result = self.inner.run_cycle(fetcher).await;
        match &result {
            Ok(_) => info!(event = "core.poll.refresh_completed", source = %source),
            Err(e) => warn!(
                event = "core.poll.refresh_failed",
                source = %source,
                error = %e,
            ),
        }
        result
    }

    /// Stop every timer and discard results that arrive afterwards.
    pub fn shutdown(&self) {
        info!(event = "core.poll.shutdown_started");
        self.inner.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }
}

/// Keeps one timer alive. Dropping it cancels the timer.
pub struct PollerGuard {
    label: String,
    source: Option<PollSource>,
    _guard: DropGuard,
}

impl PollerGuard {
    /// The polled source; `None` for the rollover timer.
    pub fn source(&self) -> Option<PollSource> {
        self.source
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl std::fmt::Debug for PollerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollerGuard")
            .field("label", &self.label)
            .finish()
    }
}

/// The timers a mounted view owns. All of them stop when the scope drops,
/// on every exit path.
#[derive(Debug)]
pub struct ViewScope {
    name: String,
    guards: Vec<PollerGuard>,
}

impl ViewScope {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            guards: Vec::new(),
        }
    }

    pub fn push(&mut self, guard: PollerGuard) {
        self.guards.push(guard);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sources(&self) -> impl Iterator<Item = PollSource> + '_ {
        self.guards.iter().filter_map(PollerGuard::source)
    }

    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        info!(
            event = "core.poll.scope_dropped",
            view = %self.name,
            timers = self.guards.len(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::Snapshot;
    use crate::fetch::FetchError;
    use async_trait::async_trait;
    use beacon_protocol::{Category, ResourceCount};
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

    const USERS: PollSource = PollSource::Category(Category::Users);

    /// Returns a growing user count; each fetch takes `latency`.
    struct GrowingUsers {
        next: AtomicU64,
        calls: AtomicUsize,
        latency: Duration,
    }

    impl GrowingUsers {
        fn new(latency: Duration) -> Arc<Self> {
            Arc::new(Self {
                next: AtomicU64::new(10),
                calls: AtomicUsize::new(0),
                latency,
            })
        }
    }

    #[async_trait]
    impl SnapshotFetcher for GrowingUsers {
        fn source(&self) -> PollSource {
            USERS
        }

        async fn fetch(&self) -> Result<Snapshot, PollError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.latency).await;
            let count = self.next.fetch_add(1, Ordering::SeqCst);
            Ok(Snapshot::Count(ResourceCount {
                count,
                ..Default::default()
            }))
        }
    }

    struct Failing;

    #[async_trait]
    impl SnapshotFetcher for Failing {
        fn source(&self) -> PollSource {
            USERS
        }

        async fn fetch(&self) -> Result<Snapshot, PollError> {
            Err(FetchError::Status { code: 500 }.into())
        }
    }

    fn scheduler() -> PollScheduler {
        PollScheduler::new(NotificationStore::new(), None)
    }

    #[tokio::test]
    async fn test_refresh_baseline_then_growth() {
        let scheduler = scheduler();
        let fetcher = GrowingUsers::new(Duration::ZERO);

        let outcome = scheduler.refresh(fetcher.as_ref()).await.unwrap();
        assert!(matches!(outcome, PollOutcome::Applied(ref d) if d.baseline && d.count == 10));

        let outcome = scheduler.refresh(fetcher.as_ref()).await.unwrap();
        assert!(matches!(outcome, PollOutcome::Applied(ref d) if !d.baseline && d.count == 1));
        assert_eq!(scheduler.store().get_total(Category::Users), 11);
    }

    #[tokio::test]
    async fn test_failure_keeps_state_and_cursor() {
        let scheduler = scheduler();
        scheduler
            .refresh(GrowingUsers::new(Duration::ZERO).as_ref())
            .await
            .unwrap();
        let before = scheduler.store().snapshot();
        let cursor = scheduler.with_detector(|d| d.cursor(USERS).cloned());

        let err = scheduler.refresh(&Failing).await.unwrap_err();
        assert!(matches!(err, PollError::Fetch(FetchError::Status { code: 500 })));
        assert_eq!(scheduler.store().snapshot(), before);
        assert_eq!(scheduler.with_detector(|d| d.cursor(USERS).cloned()), cursor);
        assert_eq!(scheduler.state(USERS), PollState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_cycle_is_skipped() {
        let scheduler = scheduler();
        let fetcher = GrowingUsers::new(Duration::from_secs(5));

        let slow = {
            let scheduler = scheduler.clone();
            let fetcher = Arc::clone(&fetcher);
            tokio::spawn(async move { scheduler.refresh(fetcher.as_ref()).await })
        };
        tokio::task::yield_now().await;
        assert_eq!(scheduler.state(USERS), PollState::Fetching);

        let second = scheduler.refresh(fetcher.as_ref()).await.unwrap();
        assert_eq!(second, PollOutcome::Skipped);

        assert!(matches!(slow.await.unwrap(), Ok(PollOutcome::Applied(_))));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.state(USERS), PollState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_ticks_until_guard_dropped() {
        let scheduler = scheduler();
        let fetcher = GrowingUsers::new(Duration::ZERO);
        let guard = scheduler.start(fetcher.clone(), Duration::from_secs(10));
        assert_eq!(guard.source(), Some(USERS));

        // First tick fires immediately, then once per period.
        tokio::time::sleep(Duration::from_secs(25)).await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);

        drop(guard);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_result_lands_after_teardown() {
        let scheduler = scheduler();
        let fetcher = GrowingUsers::new(Duration::from_secs(3));
        let guard = scheduler.start(fetcher.clone(), Duration::from_secs(10));
        tokio::time::sleep(Duration::from_secs(1)).await;
        drop(guard);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(scheduler.store().get_total(Category::Users), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_discards_in_flight_result() {
        let scheduler = scheduler();
        let fetcher = GrowingUsers::new(Duration::from_secs(3));
        let _guard = scheduler.start(fetcher.clone(), Duration::from_secs(10));
        tokio::time::sleep(Duration::from_secs(1)).await;
        scheduler.shutdown();

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert!(!scheduler.store().has_any());
        assert!(scheduler.is_shut_down());
    }

    #[tokio::test(start_paused = true)]
    async fn test_view_scope_releases_every_timer() {
        let scheduler = scheduler();
        let fetcher = GrowingUsers::new(Duration::ZERO);
        {
            let mut scope = ViewScope::new("users");
            scope.push(scheduler.start(fetcher.clone(), Duration::from_secs(10)));
            scope.push(scheduler.start_rollover(
                Arc::new(DateRangeTracker::today()),
                Duration::from_secs(60),
            ));
            assert_eq!(scope.len(), 2);
            assert_eq!(scope.sources().collect::<Vec<_>>(), vec![USERS]);
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        let calls = fetcher.calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(100)).await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), calls);
    }
}
