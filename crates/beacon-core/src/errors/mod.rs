use std::error::Error;

/// Base trait for all engine errors
pub trait BeaconError: Error + Send + Sync + 'static {
    /// Error code for programmatic handling
    fn error_code(&self) -> &'static str;

    /// Whether this error is caused by user input rather than the environment
    fn is_user_error(&self) -> bool {
        false
    }
}

/// Common result type for the engine
pub type BeaconResult<T> = Result<T, Box<dyn BeaconError>>;

impl BeaconError for beacon_config::ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            beacon_config::ConfigError::ConfigParseError { .. } => "CONFIG_PARSE_ERROR",
            beacon_config::ConfigError::InvalidConfiguration { .. } => "INVALID_CONFIGURATION",
            beacon_config::ConfigError::IoError { .. } => "CONFIG_IO_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            beacon_config::ConfigError::ConfigParseError { .. }
                | beacon_config::ConfigError::InvalidConfiguration { .. }
        )
    }
}
