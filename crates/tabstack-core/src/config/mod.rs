//! # Configuration System
//!
//! Hierarchical TOML configuration for tabstack.
//!
//! ## Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.tabstack/config.toml` (global user preferences)
//! 3. **Project config** - `./.tabstack/config.toml` (local overrides)
//!
//! ## Usage Example
//!
//! ```toml
//! # ~/.tabstack/config.toml
//! [switcher]
//! style = "titles"
//!
//! [tab_bar]
//! close_button = "always"
//! ```
//!
//! ```rust,no_run
//! use tabstack_core::config::TabstackConfig;
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TabstackConfig::load_hierarchy()?;
//!     let height = config.tab_bar.height();
//!     Ok(())
//! }
//! ```

pub mod defaults;
pub mod loading;
pub mod types;
pub mod validation;

pub use types::{
    CloseButtonMode, SwitcherConfig, SwitcherStyle, TabBarConfig, TabstackConfig, TimingConfig,
    ToleranceConfig,
};
pub use validation::{VALID_CLOSE_BUTTON_MODES, validate_config};

impl TabstackConfig {
    /// Load configuration from the hierarchy of config files.
    ///
    /// See [`loading::load_hierarchy`] for details.
    pub fn load_hierarchy() -> Result<Self, crate::errors::ConfigError> {
        loading::load_hierarchy()
    }

    /// Validate the configuration.
    ///
    /// See [`validation::validate_config`] for details.
    pub fn validate(&self) -> Result<(), crate::errors::ConfigError> {
        validation::validate_config(self)
    }
}
