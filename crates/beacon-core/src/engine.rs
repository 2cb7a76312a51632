//! Wiring of the whole engine from a [`BeaconConfig`].

use std::collections::BTreeMap;
use std::sync::Arc;

use beacon_config::BeaconConfig;
use beacon_protocol::PollSource;
use tracing::info;

use crate::fetch::{
    ActionClient, FetchError, HttpActionClient, PollError, SnapshotFetcher, default_fetchers,
};
use crate::notify::{AlertDispatcher, NotificationRegistry};
use crate::poll::{DateRangeTracker, PollOutcome, PollScheduler, ViewScope};
use crate::settings::{Preferences, SettingsDebouncer, SettingsSink, SharedSettings};
use crate::state::NotificationStore;
use crate::view_clear::ViewClearGateway;

/// One store, one scheduler, one fetcher per source.
///
/// Created once at application start. Views call [`mount`](Self::mount) and
/// hold the returned [`ViewScope`] for as long as they are shown.
pub struct Engine {
    config: BeaconConfig,
    store: NotificationStore,
    scheduler: PollScheduler,
    fetchers: BTreeMap<PollSource, Arc<dyn SnapshotFetcher>>,
    gateway: ViewClearGateway,
    settings: SharedSettings,
    date_range: Arc<DateRangeTracker>,
}

impl Engine {
    /// HTTP transport and the platform's notification backends.
    pub fn from_config(config: BeaconConfig, prefs: Preferences) -> Result<Self, FetchError> {
        let client = Arc::new(HttpActionClient::from_config(&config.endpoint)?);
        let settings = SharedSettings::new(prefs);
        let alerts = AlertDispatcher::new(NotificationRegistry::platform(), config.alerts.enabled())
            .with_settings(settings.clone());
        Ok(Self::with_client(config, client, settings, Some(alerts)))
    }

    pub fn with_client(
        config: BeaconConfig,
        client: Arc<dyn ActionClient>,
        settings: SharedSettings,
        alerts: Option<AlertDispatcher>,
    ) -> Self {
        let fetchers = default_fetchers(&config, client);
        Self::with_fetchers(config, fetchers, settings, alerts)
    }

    pub fn with_fetchers(
        config: BeaconConfig,
        fetchers: Vec<Arc<dyn SnapshotFetcher>>,
        settings: SharedSettings,
        alerts: Option<AlertDispatcher>,
    ) -> Self {
        let store = NotificationStore::new();
        let scheduler = PollScheduler::new(store.clone(), alerts.map(Arc::new));
        let gateway = ViewClearGateway::new(store.clone(), config.effective_routes());
        let fetchers = fetchers.into_iter().map(|f| (f.source(), f)).collect();

        info!(event = "core.engine.init_completed");
        Self {
            config,
            store,
            scheduler,
            fetchers,
            gateway,
            settings,
            date_range: Arc::new(DateRangeTracker::today()),
        }
    }

    pub fn config(&self) -> &BeaconConfig {
        &self.config
    }

    pub fn store(&self) -> &NotificationStore {
        &self.store
    }

    pub fn scheduler(&self) -> &PollScheduler {
        &self.scheduler
    }

    pub fn gateway(&self) -> &ViewClearGateway {
        &self.gateway
    }

    pub fn settings(&self) -> &SharedSettings {
        &self.settings
    }

    pub fn date_range(&self) -> &Arc<DateRangeTracker> {
        &self.date_range
    }

    pub fn sources(&self) -> impl Iterator<Item = PollSource> + '_ {
        self.fetchers.keys().copied()
    }

    /// Start a poller for each of `sources` with its configured period.
    /// Sources without a fetcher are skipped.
    pub fn mount(&self, view: &str, sources: &[PollSource]) -> ViewScope {
        let mut scope = ViewScope::new(view);
        for source in sources {
            if let Some(fetcher) = self.fetchers.get(source) {
                let period = self.config.polling.period(*source);
                scope.push(self.scheduler.start(Arc::clone(fetcher), period));
            }
        }
        info!(event = "core.engine.mount_completed", view = view, timers = scope.len());
        scope
    }

    /// Every source plus the day-rollover timer.
    pub fn mount_all(&self, view: &str) -> ViewScope {
        let sources: Vec<PollSource> = self.sources().collect();
        let mut scope = self.mount(view, &sources);
        scope.push(
            self.scheduler
                .start_rollover(Arc::clone(&self.date_range), self.config.polling.rollover_period()),
        );
        scope
    }

    pub async fn refresh(&self, source: PollSource) -> Result<PollOutcome, PollError> {
        let fetcher = self
            .fetchers
            .get(&source)
            .ok_or(PollError::UnknownSource { source_key: source })?;
        self.scheduler.refresh(fetcher.as_ref()).await
    }

    /// Refresh every source concurrently.
    pub async fn refresh_all(&self) -> Vec<(PollSource, Result<PollOutcome, PollError>)> {
        let cycles = self.fetchers.iter().map(|(source, fetcher)| async move {
            (*source, self.scheduler.refresh(fetcher.as_ref()).await)
        });
        futures::future::join_all(cycles).await
    }

    /// A debouncer mirroring into the shared settings plus `extra` sinks.
    pub fn settings_debouncer(&self, extra: Vec<Arc<dyn SettingsSink>>) -> SettingsDebouncer {
        let mut sinks: Vec<Arc<dyn SettingsSink>> = vec![Arc::new(self.settings.clone())];
        sinks.extend(extra);
        SettingsDebouncer::new(self.settings.get(), self.config.settings.debounce(), sinks)
    }

    pub fn shutdown(&self) {
        self.scheduler.shutdown();
        info!(event = "core.engine.shutdown_completed");
    }
}
