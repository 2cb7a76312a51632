use std::sync::Arc;

use async_trait::async_trait;
use beacon_protocol::{ActionRequest, Category, PollSource, ResourceCount, actions};

use super::errors::PollError;
use super::{ActionClient, SnapshotFetcher, decode_payload};
use crate::detect::Snapshot;

/// Cardinality of a resource listing, diffed by count.
pub struct CountFetcher {
    client: Arc<dyn ActionClient>,
    category: Category,
    action: &'static str,
}

impl CountFetcher {
    /// The listing action behind a count-diffed category.
    pub fn action_for(category: Category) -> Option<&'static str> {
        match category {
            Category::Warehouse => Some(actions::GET_WAREHOUSE_ALERTS),
            Category::Users => Some(actions::COUNT_USERS),
            Category::Suppliers => Some(actions::COUNT_SUPPLIERS),
            _ => None,
        }
    }

    /// `None` when the category isn't served by a listing action.
    pub fn new(client: Arc<dyn ActionClient>, category: Category) -> Option<Self> {
        Self::action_for(category).map(|action| Self {
            client,
            category,
            action,
        })
    }
}

#[async_trait]
impl SnapshotFetcher for CountFetcher {
    fn source(&self) -> PollSource {
        PollSource::Category(self.category)
    }

    async fn fetch(&self) -> Result<Snapshot, PollError> {
        let data = self.client.call(ActionRequest::new(self.action)).await?;
        let count: ResourceCount = decode_payload(self.action, data)?;
        Ok(Snapshot::Count(count))
    }
}
