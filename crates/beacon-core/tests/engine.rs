//! End-to-end pipeline tests: scripted fetchers through detection, the
//! store, view-clear and alert dispatch.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use beacon_core::notify::{Alert, NotificationBackend, NotifyError};
use beacon_core::surfaces::SidebarBadges;
use beacon_core::{
    AlertDispatcher, BeaconConfig, Category, Engine, FetchError, NotificationRegistry,
    PollError, PollOutcome, PollSource, PreferenceField, SharedSettings, Snapshot,
    SnapshotFetcher, TimestampedItem,
};
use beacon_protocol::{ReportTypeUpdate, ResourceCount, UpdateVerdict};
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};

struct Scripted {
    source: PollSource,
    replies: Mutex<VecDeque<Result<Snapshot, PollError>>>,
}

impl Scripted {
    fn new(source: PollSource, replies: Vec<Result<Snapshot, PollError>>) -> Arc<Self> {
        Arc::new(Self {
            source,
            replies: Mutex::new(replies.into()),
        })
    }
}

#[async_trait]
impl SnapshotFetcher for Scripted {
    fn source(&self) -> PollSource {
        self.source
    }

    async fn fetch(&self) -> Result<Snapshot, PollError> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(FetchError::Network {
                    message: "script exhausted".to_string(),
                }
                .into())
            })
    }
}

/// A scripted fetcher whose every reply takes `latency` to arrive.
struct Slow {
    inner: Arc<Scripted>,
    latency: Duration,
}

#[async_trait]
impl SnapshotFetcher for Slow {
    fn source(&self) -> PollSource {
        self.inner.source
    }

    async fn fetch(&self) -> Result<Snapshot, PollError> {
        tokio::time::sleep(self.latency).await;
        self.inner.fetch().await
    }
}

fn slow(source: PollSource, replies: Vec<Result<Snapshot, PollError>>) -> Arc<Slow> {
    Arc::new(Slow {
        inner: Scripted::new(source, replies),
        latency: Duration::from_secs(5),
    })
}

#[derive(Default)]
struct Recorder {
    sent: Mutex<Vec<Alert>>,
    checks: AtomicUsize,
}

struct RecordingBackend(Arc<Recorder>);

impl NotificationBackend for RecordingBackend {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn is_available(&self) -> bool {
        self.0.checks.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn send(&self, alert: &Alert) -> Result<(), NotifyError> {
        self.0.sent.lock().unwrap().push(alert.clone());
        Ok(())
    }
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
}

fn returns(minutes: &[i64]) -> Snapshot {
    Snapshot::Timestamped(
        minutes
            .iter()
            .map(|m| TimestampedItem {
                id: m.to_string(),
                created_at: t0() + ChronoDuration::minutes(*m),
                sub_item: None,
            })
            .collect(),
    )
}

fn verdict(has_updates: bool, breakdown: &[(&str, bool, u64)]) -> Snapshot {
    Snapshot::Verdict(UpdateVerdict {
        has_updates,
        count: None,
        breakdown: breakdown
            .iter()
            .map(|(name, flag, count)| {
                (
                    name.to_string(),
                    ReportTypeUpdate {
                        has_updates: *flag,
                        count: *count,
                    },
                )
            })
            .collect(),
    })
}

fn engine_with(
    fetchers: Vec<Arc<dyn SnapshotFetcher>>,
    recorder: Option<Arc<Recorder>>,
) -> Engine {
    let settings = SharedSettings::default();
    let alerts = recorder.map(|recorder| {
        AlertDispatcher::new(
            NotificationRegistry::from_backends(vec![Box::new(RecordingBackend(recorder))]),
            true,
        )
        .with_settings(settings.clone())
    });
    Engine::with_fetchers(BeaconConfig::default(), fetchers, settings, alerts)
}

/// Alerts are dispatched on the blocking pool; give them a moment to land.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::test]
async fn first_poll_counts_backlog_without_alert() {
    let recorder = Arc::new(Recorder::default());
    let engine = engine_with(
        vec![Scripted::new(
            Category::Returns.into(),
            vec![Ok(returns(&[-5, -4, -3, -2, -1]))],
        )],
        Some(recorder.clone()),
    );

    let outcome = engine.refresh(Category::Returns.into()).await.unwrap();
    assert!(matches!(outcome, PollOutcome::Applied(ref d) if d.baseline));
    settle().await;

    let state = engine.store().snapshot();
    assert_eq!(state.total(Category::Returns), 5);
    assert!(!state.category(Category::Returns).has_updates());
    assert!(recorder.sent.lock().unwrap().is_empty());
    // No alert means permission was never requested either.
    assert_eq!(recorder.checks.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn new_items_after_baseline_alert_once() {
    let recorder = Arc::new(Recorder::default());
    let engine = engine_with(
        vec![Scripted::new(
            Category::Returns.into(),
            vec![
                Ok(returns(&[-2, -1])),
                Ok(returns(&[-2, -1, 1, 2])),
                Ok(returns(&[-2, -1, 1, 2])),
            ],
        )],
        Some(recorder.clone()),
    );
    let source = Category::Returns.into();

    engine.refresh(source).await.unwrap();
    engine.refresh(source).await.unwrap();
    let third = engine.refresh(source).await.unwrap();
    assert_eq!(third, PollOutcome::Unchanged);
    settle().await;

    assert_eq!(engine.store().get_total(Category::Returns), 4);
    let sent = recorder.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].message, "2 new in returns");
}

#[tokio::test]
async fn failed_fetch_keeps_badges() {
    let engine = engine_with(
        vec![Scripted::new(
            Category::Users.into(),
            vec![
                Ok(Snapshot::Count(ResourceCount {
                    count: 7,
                    ..Default::default()
                })),
                Err(FetchError::Rejected {
                    action: "count_users".to_string(),
                    message: "session expired".to_string(),
                }
                .into()),
            ],
        )],
        None,
    );
    let source = Category::Users.into();
    engine.refresh(source).await.unwrap();

    let err = engine.refresh(source).await.unwrap_err();
    assert!(err.to_string().contains("session expired"));
    assert_eq!(engine.store().get_total(Category::Users), 7);
}

#[tokio::test]
async fn flag_only_logs_show_as_any() {
    let engine = engine_with(
        vec![Scripted::new(
            Category::Logs.into(),
            vec![Ok(verdict(true, &[]))],
        )],
        None,
    );
    engine.refresh(Category::Logs.into()).await.unwrap();
    assert_eq!(engine.store().get_total(Category::Logs), 0);
    assert!(engine.store().has_any());
}

#[tokio::test]
async fn viewed_verdict_is_not_resurrected() {
    let engine = engine_with(
        vec![Scripted::new(
            Category::Reports.into(),
            vec![
                Ok(verdict(true, &[("Sales Report", true, 3)])),
                Ok(verdict(true, &[("Sales Report", true, 3)])),
                Ok(verdict(true, &[("Sales Report", true, 4), ("Stock Report", true, 1)])),
            ],
        )],
        None,
    );
    let source = Category::Reports.into();

    engine.refresh(source).await.unwrap();
    assert_eq!(engine.store().get_total(Category::Reports), 3);

    engine.gateway().navigate("/reports");
    assert_eq!(engine.store().get_total(Category::Reports), 0);

    // Same verdict again: already seen, stays cleared.
    engine.refresh(source).await.unwrap();
    assert!(!engine.store().has_any());

    // Genuinely new data re-raises.
    engine.refresh(source).await.unwrap();
    let state = engine.store().snapshot();
    let reports = state.category(Category::Reports);
    assert_eq!(reports.sub_item("Sales Report").map(|c| c.count), Some(1));
    assert_eq!(reports.sub_item("Stock Report").map(|c| c.count), Some(1));
    assert_eq!(reports.total(), 2);
}

#[tokio::test]
async fn muted_category_still_counts() {
    let recorder = Arc::new(Recorder::default());
    let engine = engine_with(
        vec![Scripted::new(
            Category::Users.into(),
            vec![
                Ok(Snapshot::Count(ResourceCount {
                    count: 1,
                    ..Default::default()
                })),
                Ok(Snapshot::Count(ResourceCount {
                    count: 3,
                    ..Default::default()
                })),
            ],
        )],
        Some(recorder.clone()),
    );

    let debouncer = engine.settings_debouncer(vec![]);
    debouncer.set(PreferenceField::Category(Category::Users), false);
    debouncer.flush();
    assert!(!engine.settings().get().category_enabled(Category::Users));

    engine.refresh(Category::Users.into()).await.unwrap();
    engine.refresh(Category::Users.into()).await.unwrap();
    settle().await;

    assert_eq!(engine.store().get_total(Category::Users), 3);
    assert!(recorder.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn refresh_unknown_source_is_an_error() {
    let engine = engine_with(vec![], None);
    let err = engine.refresh(PollSource::SystemUpdates).await.unwrap_err();
    assert!(matches!(err, PollError::UnknownSource { .. }));
}

#[tokio::test(start_paused = true)]
async fn mounted_view_polls_and_badges_follow() {
    let engine = engine_with(
        vec![
            Scripted::new(
                Category::Warehouse.into(),
                vec![
                    Ok(Snapshot::Count(ResourceCount {
                        count: 2,
                        breakdown: [("north".to_string(), 2)].into(),
                    })),
                    Ok(Snapshot::Count(ResourceCount {
                        count: 5,
                        breakdown: [("north".to_string(), 5)].into(),
                    })),
                ],
            ),
            Scripted::new(PollSource::SystemUpdates, vec![Ok(verdict(true, &[]))]),
        ],
        None,
    );
    let mut subscription = engine.store().subscribe();

    let scope = engine.mount_all("dashboard");
    // Two pollers plus the rollover timer.
    assert_eq!(scope.len(), 3);

    let state = subscription.changed().await.unwrap();
    assert!(state.has_any());

    tokio::time::sleep(Duration::from_secs(11)).await;
    let badges = SidebarBadges::from_state(&engine.store().snapshot());
    assert_eq!(badges.get(Category::Warehouse).unwrap().label(), "5");
    assert!(engine.store().snapshot().system().has_updates);

    drop(scope);
    engine.shutdown();
}

#[tokio::test]
async fn refresh_all_reports_each_source() {
    let engine = engine_with(
        vec![
            Scripted::new(Category::Logs.into(), vec![Ok(verdict(false, &[]))]),
            Scripted::new(
                Category::Suppliers.into(),
                vec![Err(FetchError::Status { code: 503 }.into())],
            ),
        ],
        None,
    );
    let results = engine.refresh_all().await;
    assert_eq!(results.len(), 2);
    assert!(results.iter().any(|(s, r)| *s == PollSource::Category(Category::Logs) && r.is_ok()));
    assert!(
        results
            .iter()
            .any(|(s, r)| *s == PollSource::Category(Category::Suppliers) && r.is_err())
    );
}

#[tokio::test(start_paused = true)]
async fn clear_during_returns_fetch_keeps_only_new_items() {
    let engine = engine_with(
        vec![slow(
            Category::Returns.into(),
            vec![Ok(returns(&[-3, -2, -1])), Ok(returns(&[-3, -2, -1, 1, 2]))],
        )],
        None,
    );
    let source = Category::Returns.into();
    engine.refresh(source).await.unwrap();
    assert_eq!(engine.store().get_total(Category::Returns), 3);

    let (outcome, ()) = tokio::join!(engine.refresh(source), async {
        tokio::time::sleep(Duration::from_secs(1)).await;
        engine.gateway().mark_viewed(Category::Returns, None);
        assert_eq!(engine.store().get_total(Category::Returns), 0);
    });

    assert!(matches!(outcome.unwrap(), PollOutcome::Applied(ref d) if d.count == 2));
    let state = engine.store().snapshot();
    assert_eq!(state.total(Category::Returns), 2);
    assert!(state.category(Category::Returns).has_updates());
}

#[tokio::test(start_paused = true)]
async fn clear_during_reports_fetch_keeps_only_new_verdicts() {
    let engine = engine_with(
        vec![slow(
            Category::Reports.into(),
            vec![
                Ok(verdict(true, &[("Sales Report", true, 3)])),
                Ok(verdict(true, &[("Sales Report", true, 4), ("Stock Report", true, 1)])),
            ],
        )],
        None,
    );
    let source = Category::Reports.into();
    engine.refresh(source).await.unwrap();
    assert_eq!(engine.store().get_total(Category::Reports), 3);

    let (outcome, ()) = tokio::join!(engine.refresh(source), async {
        tokio::time::sleep(Duration::from_secs(1)).await;
        engine.gateway().mark_viewed(Category::Reports, None);
        assert!(!engine.store().has_any());
    });

    assert!(matches!(outcome.unwrap(), PollOutcome::Applied(_)));
    let state = engine.store().snapshot();
    let reports = state.category(Category::Reports);
    // The three cleared sales reports stay cleared; only the growth shows.
    assert_eq!(reports.sub_item("Sales Report").map(|c| c.count), Some(1));
    assert_eq!(reports.sub_item("Stock Report").map(|c| c.count), Some(1));
    assert_eq!(reports.total(), 2);
}
