use crate::bridge::BridgeError;
use crate::errors::{ConfigError, TabstackError};

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl TabstackError for DispatchError {
    fn error_code(&self) -> &'static str {
        match self {
            DispatchError::Bridge(e) => e.error_code(),
            DispatchError::Config(e) => e.error_code(),
        }
    }

    fn is_user_error(&self) -> bool {
        match self {
            DispatchError::Bridge(e) => e.is_user_error(),
            DispatchError::Config(e) => e.is_user_error(),
        }
    }
}
