use std::sync::Arc;

use async_trait::async_trait;
use beacon_protocol::{ActionRequest, Category, PendingReturn, PollSource, actions};

use super::errors::PollError;
use super::{ActionClient, SnapshotFetcher, decode_payload};
use crate::detect::{Snapshot, TimestampedItem};

/// Pending returns, diffed by creation time.
pub struct ReturnsFetcher {
    client: Arc<dyn ActionClient>,
    limit: u32,
    group_by_reason: bool,
}

impl ReturnsFetcher {
    pub fn new(client: Arc<dyn ActionClient>, limit: u32) -> Self {
        Self {
            client,
            limit,
            group_by_reason: false,
        }
    }

    /// Count returns under a sub-item named after their `reason`.
    pub fn with_reason_groups(mut self) -> Self {
        self.group_by_reason = true;
        self
    }
}

#[async_trait]
impl SnapshotFetcher for ReturnsFetcher {
    fn source(&self) -> PollSource {
        PollSource::Category(Category::Returns)
    }

    async fn fetch(&self) -> Result<Snapshot, PollError> {
        let request =
            ActionRequest::new(actions::GET_PENDING_RETURNS).with_param("limit", self.limit);
        let data = self.client.call(request).await?;
        let rows: Vec<PendingReturn> = decode_payload(actions::GET_PENDING_RETURNS, data)?;

        let items = rows
            .into_iter()
            .map(|row| TimestampedItem {
                id: row.id.to_string(),
                created_at: row.created_at,
                sub_item: if self.group_by_reason { row.reason } else { None },
            })
            .collect();
        Ok(Snapshot::Timestamped(items))
    }
}
