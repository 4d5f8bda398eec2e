//! Configuration type definitions for tabstack.
//!
//! # Example Configuration
//!
//! ```toml
//! [switcher]
//! style = "titles"
//! split_groups = true
//!
//! [tab_bar]
//! height = 28.0
//! show_drag_handle = false
//! close_button = "always"
//!
//! [timing]
//! echo_timeout_ms = 300
//! resync_ms = 400
//!
//! [tolerance]
//! ghost = 6.0
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Main configuration loaded from TOML config files.
///
/// Every field is optional so a project config only overrides what it sets;
/// accessor methods fill in defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TabstackConfig {
    #[serde(default)]
    pub switcher: SwitcherConfig,

    #[serde(default)]
    pub tab_bar: TabBarConfig,

    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default)]
    pub tolerance: ToleranceConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitcherStyle {
    AppIcons,
    Titles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseButtonMode {
    Hover,
    Always,
    Never,
}

impl std::str::FromStr for CloseButtonMode {
    type Err = crate::errors::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hover" => Ok(CloseButtonMode::Hover),
            "always" => Ok(CloseButtonMode::Always),
            "never" => Ok(CloseButtonMode::Never),
            other => Err(crate::errors::ConfigError::InvalidCloseButtonMode {
                mode: other.to_string(),
            }),
        }
    }
}

/// Global switcher presentation and grouping policy.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SwitcherConfig {
    /// Default: app_icons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<SwitcherStyle>,

    /// List group members individually instead of one entry per group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_groups: Option<bool>,
}

impl SwitcherConfig {
    pub fn style(&self) -> SwitcherStyle {
        self.style.unwrap_or(SwitcherStyle::AppIcons)
    }

    pub fn split_groups(&self) -> bool {
        self.split_groups.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TabBarConfig {
    /// Height reserved above a group's frame, in points. Default: 28.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_drag_handle: Option<bool>,

    /// One of: hover, always, never. Default: hover.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_button: Option<String>,
}

impl TabBarConfig {
    pub fn height(&self) -> f64 {
        self.height.unwrap_or(defaults::TAB_BAR_HEIGHT)
    }

    pub fn show_drag_handle(&self) -> bool {
        self.show_drag_handle.unwrap_or(true)
    }

    /// Parsed close button mode. Invalid values are rejected by validation,
    /// so this falls back to hover only for unvalidated configs.
    pub fn close_button(&self) -> CloseButtonMode {
        self.close_button
            .as_deref()
            .and_then(|mode| mode.parse().ok())
            .unwrap_or(CloseButtonMode::Hover)
    }
}

/// Deferred-work delays, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TimingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub echo_timeout_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_recheck_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resync_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_debounce_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panel_reorder_ms: Option<u64>,
}

impl TimingConfig {
    pub fn echo_timeout(&self) -> Duration {
        Duration::from_millis(self.echo_timeout_ms.unwrap_or(defaults::ECHO_TIMEOUT_MS))
    }

    pub fn quick_recheck(&self) -> Duration {
        Duration::from_millis(self.quick_recheck_ms.unwrap_or(defaults::QUICK_RECHECK_MS))
    }

    pub fn resync(&self) -> Duration {
        Duration::from_millis(self.resync_ms.unwrap_or(defaults::RESYNC_MS))
    }

    pub fn space_debounce(&self) -> Duration {
        Duration::from_millis(self.space_debounce_ms.unwrap_or(defaults::SPACE_DEBOUNCE_MS))
    }

    pub fn panel_reorder(&self) -> Duration {
        Duration::from_millis(self.panel_reorder_ms.unwrap_or(defaults::PANEL_REORDER_MS))
    }
}

/// Geometry tolerances, in points.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ToleranceConfig {
    /// How far a re-read origin may drift before the position write is retried.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<f64>,

    /// Edge distance under which an ungrouped window counts as a ghost of a group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ghost: Option<f64>,

    /// Edge distance under which a move/resize matches a frame we wrote.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_echo: Option<f64>,
}

impl ToleranceConfig {
    pub fn position(&self) -> f64 {
        self.position.unwrap_or(defaults::POSITION_TOLERANCE)
    }

    pub fn ghost(&self) -> f64 {
        self.ghost.unwrap_or(defaults::GHOST_TOLERANCE)
    }

    pub fn frame_echo(&self) -> f64 {
        self.frame_echo.unwrap_or(defaults::FRAME_ECHO_TOLERANCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tabstack_config_serialization() {
        let mut config = TabstackConfig::default();
        config.tab_bar.height = Some(32.0);
        config.switcher.style = Some(SwitcherStyle::Titles);
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("height = 32.0"));
        assert!(toml_str.contains("style = \"titles\""));
        let parsed: TabstackConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_accessors_fall_back_to_defaults() {
        let config = TabstackConfig::default();
        assert_eq!(config.switcher.style(), SwitcherStyle::AppIcons);
        assert!(!config.switcher.split_groups());
        assert_eq!(config.tab_bar.height(), defaults::TAB_BAR_HEIGHT);
        assert!(config.tab_bar.show_drag_handle());
        assert_eq!(config.tab_bar.close_button(), CloseButtonMode::Hover);
        assert_eq!(
            config.timing.echo_timeout(),
            Duration::from_millis(defaults::ECHO_TIMEOUT_MS)
        );
        assert_eq!(config.tolerance.ghost(), defaults::GHOST_TOLERANCE);
    }

    #[test]
    fn test_close_button_mode_parsing() {
        assert_eq!("never".parse::<CloseButtonMode>().unwrap(), CloseButtonMode::Never);
        assert!("sometimes".parse::<CloseButtonMode>().is_err());
    }
}
