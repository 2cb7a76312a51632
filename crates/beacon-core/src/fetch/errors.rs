//! Fetch, parse and poll error types.

use beacon_protocol::PollSource;

use crate::detect::SnapshotKind;
use crate::errors::BeaconError;

/// Failure to get a usable envelope from the action endpoint.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Request to action endpoint failed: {message}")]
    Network { message: String },

    #[error("Action endpoint timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Action endpoint returned HTTP {code}")]
    Status { code: u16 },

    #[error("Action endpoint returned an unreadable body: {message}")]
    InvalidBody { message: String },

    #[error("Action '{action}' was rejected: {message}")]
    Rejected { action: String, message: String },

    #[error("Action '{action}' succeeded without data")]
    MissingData { action: String },
}

impl BeaconError for FetchError {
    fn error_code(&self) -> &'static str {
        match self {
            FetchError::Network { .. } => "FETCH_NETWORK",
            FetchError::Timeout { .. } => "FETCH_TIMEOUT",
            FetchError::Status { .. } => "FETCH_STATUS",
            FetchError::InvalidBody { .. } => "FETCH_INVALID_BODY",
            FetchError::Rejected { .. } => "FETCH_REJECTED",
            FetchError::MissingData { .. } => "FETCH_MISSING_DATA",
        }
    }
}

/// The envelope was fine but its payload doesn't fit the category.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Malformed '{action}' payload: {message}")]
    Payload { action: String, message: String },

    #[error("Source '{slice}' expects {expected}, got {found}")]
    PolicyMismatch {
        slice: PollSource,
        expected: SnapshotKind,
        found: SnapshotKind,
    },
}

impl BeaconError for ParseError {
    fn error_code(&self) -> &'static str {
        match self {
            ParseError::Payload { .. } => "PARSE_PAYLOAD",
            ParseError::PolicyMismatch { .. } => "PARSE_POLICY_MISMATCH",
        }
    }
}

/// Anything that turns one poll cycle into a no-op.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("No fetcher registered for '{source_key}'")]
    UnknownSource { source_key: PollSource },
}

impl BeaconError for PollError {
    fn error_code(&self) -> &'static str {
        match self {
            PollError::Fetch(e) => e.error_code(),
            PollError::Parse(e) => e.error_code(),
            PollError::UnknownSource { .. } => "POLL_UNKNOWN_SOURCE",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, PollError::UnknownSource { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_protocol::Category;

    #[test]
    fn test_rejected_carries_server_message() {
        let error = FetchError::Rejected {
            action: "count_users".to_string(),
            message: "session expired".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Action 'count_users' was rejected: session expired"
        );
        assert_eq!(error.error_code(), "FETCH_REJECTED");
        assert!(!error.is_user_error());
    }

    #[test]
    fn test_policy_mismatch_message() {
        let error = ParseError::PolicyMismatch {
            slice: PollSource::Category(Category::Logs),
            expected: SnapshotKind::Verdict,
            found: SnapshotKind::Count,
        };
        assert_eq!(
            error.to_string(),
            "Source 'logs' expects update verdict, got count"
        );
    }

    #[test]
    fn test_poll_error_is_transparent() {
        let error: PollError = FetchError::Status { code: 502 }.into();
        assert_eq!(error.to_string(), "Action endpoint returned HTTP 502");
        assert_eq!(error.error_code(), "FETCH_STATUS");
    }
}
