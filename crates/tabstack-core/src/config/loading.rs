//! Configuration loading and merging logic.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.tabstack/config.toml` (global user preferences)
//! 3. **Project config** - `./.tabstack/config.toml` (local overrides)

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::types::{
    SwitcherConfig, TabBarConfig, TabstackConfig, TimingConfig, ToleranceConfig,
};
use crate::config::validation::validate_config;
use crate::errors::ConfigError;

/// Check if an error is a "file not found" error.
fn is_file_not_found(e: &ConfigError) -> bool {
    match e {
        ConfigError::ConfigNotFound { .. } => true,
        ConfigError::IoError { source } => source.kind() == std::io::ErrorKind::NotFound,
        _ => false,
    }
}

/// Load configuration from the hierarchy of config files.
///
/// # Errors
///
/// Returns an error if a config file exists but cannot be parsed, or if the
/// merged configuration fails validation. Missing config files are not errors.
pub fn load_hierarchy() -> Result<TabstackConfig, ConfigError> {
    let user = user_config_path();
    let project = std::env::current_dir()?
        .join(".tabstack")
        .join("config.toml");
    load_from_paths(user.as_deref(), Some(project.as_path()))
}

/// Load and merge configuration from explicit user and project paths.
pub fn load_from_paths(
    user: Option<&Path>,
    project: Option<&Path>,
) -> Result<TabstackConfig, ConfigError> {
    let mut config = TabstackConfig::default();

    for path in [user, project].into_iter().flatten() {
        match load_config_file(path) {
            Ok(file_config) => {
                debug!(event = "core.config.file_loaded", path = %path.display());
                config = merge_configs(config, file_config);
            }
            Err(e) if !is_file_not_found(&e) => return Err(e),
            Err(_) => {} // File not found - continue with merged config
        }
    }

    validate_config(&config)?;
    Ok(config)
}

/// Path of the user config file, `~/.tabstack/config.toml`.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".tabstack").join("config.toml"))
}

/// Load a configuration file from the given path.
pub fn load_config_file(path: &Path) -> Result<TabstackConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::ConfigNotFound {
                path: path.display().to_string(),
            }
        } else {
            ConfigError::IoError { source: e }
        }
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
        message: format!("'{}': {}", path.display(), e),
    })
}

/// Merge two configurations, with override_config taking precedence.
///
/// A field set in the override replaces the base value; unset fields keep it.
pub fn merge_configs(base: TabstackConfig, override_config: TabstackConfig) -> TabstackConfig {
    TabstackConfig {
        switcher: SwitcherConfig {
            style: override_config.switcher.style.or(base.switcher.style),
            split_groups: override_config
                .switcher
                .split_groups
                .or(base.switcher.split_groups),
        },
        tab_bar: TabBarConfig {
            height: override_config.tab_bar.height.or(base.tab_bar.height),
            show_drag_handle: override_config
                .tab_bar
                .show_drag_handle
                .or(base.tab_bar.show_drag_handle),
            close_button: override_config
                .tab_bar
                .close_button
                .or(base.tab_bar.close_button),
        },
        timing: TimingConfig {
            echo_timeout_ms: override_config
                .timing
                .echo_timeout_ms
                .or(base.timing.echo_timeout_ms),
            quick_recheck_ms: override_config
                .timing
                .quick_recheck_ms
                .or(base.timing.quick_recheck_ms),
            resync_ms: override_config.timing.resync_ms.or(base.timing.resync_ms),
            space_debounce_ms: override_config
                .timing
                .space_debounce_ms
                .or(base.timing.space_debounce_ms),
            panel_reorder_ms: override_config
                .timing
                .panel_reorder_ms
                .or(base.timing.panel_reorder_ms),
        },
        tolerance: ToleranceConfig {
            position: override_config
                .tolerance
                .position
                .or(base.tolerance.position),
            ghost: override_config.tolerance.ghost.or(base.tolerance.ghost),
            frame_echo: override_config
                .tolerance
                .frame_echo
                .or(base.tolerance.frame_echo),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{CloseButtonMode, SwitcherStyle};
    use std::time::Duration;

    #[test]
    fn test_config_hierarchy_integration() {
        let temp_dir = tempfile::tempdir().unwrap();
        let user_path = temp_dir.path().join("user.toml");
        let project_path = temp_dir.path().join("project.toml");

        fs::write(
            &user_path,
            r#"
[switcher]
style = "titles"

[tab_bar]
height = 32.0
close_button = "always"

[timing]
resync_ms = 800
"#,
        )
        .unwrap();
        fs::write(
            &project_path,
            r#"
[tab_bar]
close_button = "never"

[switcher]
split_groups = true
"#,
        )
        .unwrap();

        let config =
            load_from_paths(Some(user_path.as_path()), Some(project_path.as_path())).unwrap();
        assert_eq!(config.switcher.style(), SwitcherStyle::Titles); // From user
        assert!(config.switcher.split_groups()); // From project
        assert_eq!(config.tab_bar.height(), 32.0); // From user
        assert_eq!(config.tab_bar.close_button(), CloseButtonMode::Never); // Overridden
        assert_eq!(config.timing.resync(), Duration::from_millis(800));
    }

    #[test]
    fn test_missing_files_fall_back_to_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = load_from_paths(
            Some(temp_dir.path().join("missing.toml").as_path()),
            Some(temp_dir.path().join("also-missing.toml").as_path()),
        )
        .unwrap();
        assert_eq!(config, TabstackConfig::default());
    }

    #[test]
    fn test_parse_error_is_not_swallowed() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "invalid toml [[[").unwrap();

        let err = load_from_paths(Some(path.as_path()), None).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
    }

    #[test]
    fn test_invalid_merged_config_fails_validation() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[tab_bar]\nheight = -4.0\n").unwrap();

        let err = load_from_paths(None, Some(path.as_path())).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let err = load_config_file(Path::new("/nonexistent/tabstack/config.toml")).unwrap_err();
        assert!(is_file_not_found(&err));
    }

    #[test]
    fn test_toml_parsing_edge_cases() {
        let empty: TabstackConfig = toml::from_str("").unwrap();
        assert_eq!(empty, TabstackConfig::default());

        let partial: TabstackConfig = toml::from_str("[tolerance]\nghost = 8.0\n").unwrap();
        assert_eq!(partial.tolerance.ghost(), 8.0);
        assert_eq!(partial.tab_bar.height(), crate::config::defaults::TAB_BAR_HEIGHT);

        let bad_style: Result<TabstackConfig, _> = toml::from_str("[switcher]\nstyle = \"grid\"\n");
        assert!(bad_style.is_err());
    }

    #[test]
    fn test_merge_keeps_base_when_override_unset() {
        let mut base = TabstackConfig::default();
        base.timing.echo_timeout_ms = Some(500);
        base.tolerance.frame_echo = Some(1.0);
        let merged = merge_configs(base, TabstackConfig::default());
        assert_eq!(merged.timing.echo_timeout_ms, Some(500));
        assert_eq!(merged.tolerance.frame_echo, Some(1.0));
    }
}
