//! Snapshot fetchers against the remote action endpoint.
//!
//! [`ActionClient`] is the transport seam: it sends one action and hands
//! back the envelope's `data`. Each [`SnapshotFetcher`] builds its request,
//! decodes the payload, and shapes it into a [`Snapshot`] for the detector.
//! Fetchers are stateless; cursors live in the detector.

mod counts;
mod errors;
mod http;
mod logs;
mod registry;
mod reports;
mod returns;

use async_trait::async_trait;
use beacon_protocol::{ActionRequest, PollSource};
use serde::de::DeserializeOwned;

use crate::detect::Snapshot;

pub use counts::CountFetcher;
pub use errors::{FetchError, ParseError, PollError};
pub use http::{HttpActionClient, decode_envelope};
pub use logs::LogActivityFetcher;
pub use registry::default_fetchers;
pub use reports::{ReportFreshnessFetcher, SharedVerdict};
pub use returns::ReturnsFetcher;

#[async_trait]
pub trait ActionClient: Send + Sync {
    /// Send one action and return the `data` of a successful envelope.
    async fn call(&self, request: ActionRequest) -> Result<serde_json::Value, FetchError>;
}

#[async_trait]
pub trait SnapshotFetcher: Send + Sync {
    fn source(&self) -> PollSource;

    async fn fetch(&self) -> Result<Snapshot, PollError>;
}

/// Decode an action's `data` into its typed payload.
pub(crate) fn decode_payload<T: DeserializeOwned>(
    action: &str,
    data: serde_json::Value,
) -> Result<T, ParseError> {
    serde_json::from_value(data).map_err(|e| ParseError::Payload {
        action: action.to_string(),
        message: e.to_string(),
    })
}
