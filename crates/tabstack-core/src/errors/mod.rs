use std::error::Error;

/// Base trait for all application errors
pub trait TabstackError: Error + Send + Sync + 'static {
    /// Error code for programmatic handling
    fn error_code(&self) -> &'static str;

    /// Whether this error should be logged as an error or warning
    fn is_user_error(&self) -> bool {
        false
    }
}

/// Common result type for the application
pub type TabstackResult<T> = Result<T, Box<dyn TabstackError>>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found at '{path}'")]
    ConfigNotFound { path: String },

    #[error("Failed to parse config file: {message}")]
    ConfigParseError { message: String },

    #[error("Invalid close button mode '{mode}'. Supported modes: hover, always, never")]
    InvalidCloseButtonMode { mode: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("IO error reading config: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl TabstackError for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            ConfigError::ConfigNotFound { .. } => "CONFIG_NOT_FOUND",
            ConfigError::ConfigParseError { .. } => "CONFIG_PARSE_ERROR",
            ConfigError::InvalidCloseButtonMode { .. } => "INVALID_CLOSE_BUTTON_MODE",
            ConfigError::InvalidConfiguration { .. } => "INVALID_CONFIGURATION",
            ConfigError::IoError { .. } => "CONFIG_IO_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            ConfigError::ConfigParseError { .. }
                | ConfigError::InvalidCloseButtonMode { .. }
                | ConfigError::InvalidConfiguration { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tabstack_result() {
        let _result: TabstackResult<i32> = Ok(42);
    }

    #[test]
    fn test_config_error_display() {
        let error = ConfigError::InvalidCloseButtonMode {
            mode: "sometimes".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid close button mode 'sometimes'. Supported modes: hover, always, never"
        );
        assert_eq!(error.error_code(), "INVALID_CLOSE_BUTTON_MODE");
        assert!(error.is_user_error());
    }

    #[test]
    fn test_config_parse_error_carries_toml_message() {
        let toml_err = toml::from_str::<toml::Value>("[tab_bar\nheight = ").unwrap_err();
        let error = ConfigError::ConfigParseError {
            message: toml_err.to_string(),
        };
        assert!(error.to_string().starts_with("Failed to parse config file: "));
        assert_eq!(error.error_code(), "CONFIG_PARSE_ERROR");
        assert!(error.is_user_error());
    }

    #[test]
    fn test_missing_config_is_not_user_error() {
        let error = ConfigError::ConfigNotFound {
            path: "/tmp/.tabstack/config.toml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Config file not found at '/tmp/.tabstack/config.toml'"
        );
        assert!(!error.is_user_error());
    }

    #[test]
    fn test_config_io_error_is_not_user_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = ConfigError::from(io_err);
        assert_eq!(error.error_code(), "CONFIG_IO_ERROR");
        assert!(!error.is_user_error());
    }
}
