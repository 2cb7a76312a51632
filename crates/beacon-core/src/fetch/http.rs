use std::time::Duration;

use async_trait::async_trait;
use beacon_config::EndpointConfig;
use beacon_protocol::{ActionRequest, ActionResponse};
use tracing::debug;

use super::ActionClient;
use super::errors::FetchError;

/// `reqwest`-backed client POSTing JSON actions to one endpoint.
#[derive(Debug, Clone)]
pub struct HttpActionClient {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpActionClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network {
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }

    pub fn from_config(config: &EndpointConfig) -> Result<Self, FetchError> {
        Self::new(config.url(), config.timeout())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn transport_error(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout {
                secs: self.timeout.as_secs(),
            }
        } else {
            FetchError::Network {
                message: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl ActionClient for HttpActionClient {
    async fn call(&self, request: ActionRequest) -> Result<serde_json::Value, FetchError> {
        let action = request.action.clone();
        debug!(event = "core.fetch.request_started", action = %action, url = %self.url);

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                code: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;
        let data = decode_envelope(&action, &body)?;

        debug!(event = "core.fetch.request_completed", action = %action);
        Ok(data)
    }
}

/// Unwrap a `{success, data?, message?}` body.
///
/// Non-JSON bodies, `success: false` and a missing `data` are all errors;
/// none of them may be read as "nothing to report".
pub fn decode_envelope(action: &str, body: &[u8]) -> Result<serde_json::Value, FetchError> {
    let envelope: ActionResponse<serde_json::Value> =
        serde_json::from_slice(body).map_err(|e| FetchError::InvalidBody {
            message: e.to_string(),
        })?;

    if !envelope.success {
        return Err(FetchError::Rejected {
            action: action.to_string(),
            message: envelope
                .message
                .unwrap_or_else(|| "no message given".to_string()),
        });
    }

    envelope.data.ok_or_else(|| FetchError::MissingData {
        action: action.to_string(),
    })
}
