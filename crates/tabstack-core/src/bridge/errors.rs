use crate::errors::TabstackError;
use crate::window::WindowId;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Accessibility element for window {window} is stale")]
    StaleElement { window: WindowId },

    #[error("Window {window} not found")]
    WindowNotFound { window: WindowId },

    #[error(
        "Accessibility permission denied. Grant access in System Settings > Privacy & Security > Accessibility"
    )]
    PermissionDenied,

    #[error("Failed to {action} '{attribute}' on window {window}: {message}")]
    AttributeFailed {
        window: WindowId,
        attribute: &'static str,
        action: &'static str,
        message: String,
    },

    #[error("Window enumeration failed: {message}")]
    EnumerationFailed { message: String },
}

impl BridgeError {
    /// The element reference went stale and may be recovered by re-acquiring
    /// it from the owning process.
    pub fn is_stale(&self) -> bool {
        matches!(self, BridgeError::StaleElement { .. })
    }
}

impl TabstackError for BridgeError {
    fn error_code(&self) -> &'static str {
        match self {
            BridgeError::StaleElement { .. } => "BRIDGE_STALE_ELEMENT",
            BridgeError::WindowNotFound { .. } => "BRIDGE_WINDOW_NOT_FOUND",
            BridgeError::PermissionDenied => "BRIDGE_PERMISSION_DENIED",
            BridgeError::AttributeFailed { .. } => "BRIDGE_ATTRIBUTE_FAILED",
            BridgeError::EnumerationFailed { .. } => "BRIDGE_ENUMERATION_FAILED",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, BridgeError::PermissionDenied)
    }
}
