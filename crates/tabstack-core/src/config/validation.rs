//! Configuration validation logic.

use crate::config::types::{CloseButtonMode, TabstackConfig};
use crate::errors::ConfigError;

/// Valid close button modes.
pub const VALID_CLOSE_BUTTON_MODES: [&str; 3] = ["hover", "always", "never"];

/// Validate a TabstackConfig, returning an error if any values are invalid.
///
/// # Validation Rules
///
/// - Tab bar height, if set, must be positive
/// - Close button mode, if set, must be one of hover, always, never
/// - Echo timeout, if set, must be non-zero
/// - Tolerances, if set, must not be negative
pub fn validate_config(config: &TabstackConfig) -> Result<(), ConfigError> {
    if let Some(height) = config.tab_bar.height
        && !(height > 0.0 && height.is_finite())
    {
        return Err(ConfigError::InvalidConfiguration {
            message: format!("Tab bar height must be positive, got {}", height),
        });
    }

    if let Some(ref mode) = config.tab_bar.close_button {
        mode.parse::<CloseButtonMode>()?;
    }

    if config.timing.echo_timeout_ms == Some(0) {
        return Err(ConfigError::InvalidConfiguration {
            message: "Echo timeout must be greater than 0 ms".to_string(),
        });
    }

    let tolerances = [
        ("position", config.tolerance.position),
        ("ghost", config.tolerance.ghost),
        ("frame_echo", config.tolerance.frame_echo),
    ];
    for (name, value) in tolerances {
        if let Some(value) = value
            && !(value >= 0.0 && value.is_finite())
        {
            return Err(ConfigError::InvalidConfiguration {
                message: format!("Tolerance '{}' must not be negative, got {}", name, value),
            });
        }
    }

    Ok(())
}
