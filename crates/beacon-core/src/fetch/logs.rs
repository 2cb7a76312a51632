use std::sync::Arc;

use async_trait::async_trait;
use beacon_protocol::{ActionRequest, Category, PollSource, UpdateVerdict, actions};

use super::errors::PollError;
use super::{ActionClient, SnapshotFetcher, decode_payload};
use crate::detect::Snapshot;

/// Log activity in the last `window_hours`. Flag only; counts are dropped.
pub struct LogActivityFetcher {
    client: Arc<dyn ActionClient>,
    window_hours: u32,
}

impl LogActivityFetcher {
    pub fn new(client: Arc<dyn ActionClient>, window_hours: u32) -> Self {
        Self {
            client,
            window_hours,
        }
    }
}

#[async_trait]
impl SnapshotFetcher for LogActivityFetcher {
    fn source(&self) -> PollSource {
        PollSource::Category(Category::Logs)
    }

    async fn fetch(&self) -> Result<Snapshot, PollError> {
        let request = ActionRequest::new(actions::CHECK_LOG_ACTIVITY)
            .with_param("hours", self.window_hours);
        let data = self.client.call(request).await?;
        let verdict: UpdateVerdict = decode_payload(actions::CHECK_LOG_ACTIVITY, data)?;
        Ok(Snapshot::Verdict(UpdateVerdict {
            has_updates: verdict.has_updates,
            ..Default::default()
        }))
    }
}
