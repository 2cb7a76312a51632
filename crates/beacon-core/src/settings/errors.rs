use crate::errors::BeaconError;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error writing settings: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Failed to serialize settings: {message}")]
    Serialize { message: String },

    #[error("Failed to parse settings file: {message}")]
    Parse { message: String },

    #[error("Unknown preference '{name}'")]
    UnknownField { name: String },
}

impl BeaconError for SettingsError {
    fn error_code(&self) -> &'static str {
        match self {
            SettingsError::Io { .. } => "SETTINGS_IO_ERROR",
            SettingsError::Serialize { .. } => "SETTINGS_SERIALIZE_ERROR",
            SettingsError::Parse { .. } => "SETTINGS_PARSE_ERROR",
            SettingsError::UnknownField { .. } => "SETTINGS_UNKNOWN_FIELD",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            SettingsError::Parse { .. } | SettingsError::UnknownField { .. }
        )
    }
}
