use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use beacon_config::ReportsConfig;
use beacon_protocol::{ActionRequest, Category, PollSource, UpdateVerdict, actions};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::errors::PollError;
use super::{ActionClient, SnapshotFetcher, decode_payload};
use crate::detect::Snapshot;

/// One `check_reports_updates` answer handed to every fetcher holding it.
///
/// Callers arriving while a request is in flight wait for it. An answer
/// younger than `reuse_for` is returned again instead of asking twice.
/// Failures are never kept.
pub struct SharedVerdict {
    reuse_for: Duration,
    last: Mutex<Option<(Instant, UpdateVerdict)>>,
}

impl SharedVerdict {
    pub fn new(reuse_for: Duration) -> Self {
        Self {
            reuse_for,
            last: Mutex::new(None),
        }
    }
}

/// Report freshness verdict for the last `window_hours`.
///
/// Transport failures are retried up to `retry_attempts` total attempts with
/// a fixed delay. Payload errors are not retried.
pub struct ReportFreshnessFetcher {
    client: Arc<dyn ActionClient>,
    source: PollSource,
    window_hours: u32,
    retry_attempts: u32,
    retry_delay: Duration,
    shared: Option<Arc<SharedVerdict>>,
}

impl ReportFreshnessFetcher {
    pub fn new(client: Arc<dyn ActionClient>, source: PollSource, config: &ReportsConfig) -> Self {
        Self {
            client,
            source,
            window_hours: config.window_hours(),
            retry_attempts: config.retry_attempts().max(1),
            retry_delay: config.retry_delay(),
            shared: None,
        }
    }

    /// Serve this fetcher from `shared` instead of a request of its own.
    pub fn sharing(mut self, shared: Arc<SharedVerdict>) -> Self {
        self.shared = Some(shared);
        self
    }

    pub fn for_reports(client: Arc<dyn ActionClient>, config: &ReportsConfig) -> Self {
        Self::new(client, PollSource::Category(Category::Reports), config)
    }

    pub fn for_system_updates(client: Arc<dyn ActionClient>, config: &ReportsConfig) -> Self {
        Self::new(client, PollSource::SystemUpdates, config)
    }
}

#[async_trait]
impl SnapshotFetcher for ReportFreshnessFetcher {
    fn source(&self) -> PollSource {
        self.source
    }

    async fn fetch(&self) -> Result<Snapshot, PollError> {
        let Some(shared) = &self.shared else {
            return Ok(Snapshot::Verdict(self.request().await?));
        };

        let mut last = shared.last.lock().await;
        if let Some((at, verdict)) = last.as_ref()
            && at.elapsed() < shared.reuse_for
        {
            debug!(event = "core.fetch.verdict_reused", source = %self.source);
            return Ok(Snapshot::Verdict(verdict.clone()));
        }
        let verdict = self.request().await?;
        *last = Some((Instant::now(), verdict.clone()));
        Ok(Snapshot::Verdict(verdict))
    }
}

impl ReportFreshnessFetcher {
    async fn request(&self) -> Result<UpdateVerdict, PollError> {
        let request = ActionRequest::new(actions::CHECK_REPORTS_UPDATES)
            .with_param("hours", self.window_hours);

        let mut attempt = 1;
        let data = loop {
            match self.client.call(request.clone()).await {
                Ok(data) => break data,
                Err(e) if attempt < self.retry_attempts => {
                    warn!(
                        event = "core.fetch.retry_scheduled",
                        source = %self.source,
                        attempt = attempt,
                        error = %e,
                    );
                    attempt += 1;
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e.into()),
            }
        };

        Ok(decode_payload(actions::CHECK_REPORTS_UPDATES, data)?)
    }
}
