//! Notification error types.

use crate::errors::BeaconError;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Notification tool not found: {tool}")]
    ToolNotFound { tool: String },

    #[error("Notification failed: {message}")]
    SendFailed { message: String },
}

impl BeaconError for NotifyError {
    fn error_code(&self) -> &'static str {
        match self {
            NotifyError::ToolNotFound { .. } => "NOTIFY_TOOL_NOT_FOUND",
            NotifyError::SendFailed { .. } => "NOTIFY_SEND_FAILED",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, NotifyError::ToolNotFound { .. })
    }
}
