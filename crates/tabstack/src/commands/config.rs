use clap::ArgMatches;
use serde::Serialize;
use tracing::{error, info};

use tabstack_core::TabstackConfig;
use tabstack_core::config::{CloseButtonMode, SwitcherStyle};

/// Every setting with defaults applied, as the coordinator will see it.
#[derive(Debug, Serialize)]
struct EffectiveConfig {
    switcher_style: SwitcherStyle,
    split_groups: bool,
    tab_bar_height: f64,
    show_drag_handle: bool,
    close_button: CloseButtonMode,
    echo_timeout_ms: u128,
    quick_recheck_ms: u128,
    resync_ms: u128,
    space_debounce_ms: u128,
    panel_reorder_ms: u128,
    position_tolerance: f64,
    ghost_tolerance: f64,
    frame_echo_tolerance: f64,
}

impl From<&TabstackConfig> for EffectiveConfig {
    fn from(config: &TabstackConfig) -> Self {
        Self {
            switcher_style: config.switcher.style(),
            split_groups: config.switcher.split_groups(),
            tab_bar_height: config.tab_bar.height(),
            show_drag_handle: config.tab_bar.show_drag_handle(),
            close_button: config.tab_bar.close_button(),
            echo_timeout_ms: config.timing.echo_timeout().as_millis(),
            quick_recheck_ms: config.timing.quick_recheck().as_millis(),
            resync_ms: config.timing.resync().as_millis(),
            space_debounce_ms: config.timing.space_debounce().as_millis(),
            panel_reorder_ms: config.timing.panel_reorder().as_millis(),
            position_tolerance: config.tolerance.position(),
            ghost_tolerance: config.tolerance.ghost(),
            frame_echo_tolerance: config.tolerance.frame_echo(),
        }
    }
}

pub(crate) fn handle_config_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");

    info!(event = "cli.config_started", json_output = json_output);

    let config = match TabstackConfig::load_hierarchy() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Could not load configuration: {}", e);
            error!(event = "cli.config_failed", error = %e);
            return Err(e.into());
        }
    };
    let effective = EffectiveConfig::from(&config);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&effective)?);
    } else {
        println!("Switcher:");
        println!("  style:                {:?}", effective.switcher_style);
        println!("  split groups:         {}", effective.split_groups);
        println!("Tab bar:");
        println!("  height:               {}", effective.tab_bar_height);
        println!("  drag handle:          {}", effective.show_drag_handle);
        println!("  close button:         {:?}", effective.close_button);
        println!("Timing (ms):");
        println!("  echo timeout:         {}", effective.echo_timeout_ms);
        println!("  quick recheck:        {}", effective.quick_recheck_ms);
        println!("  resync:               {}", effective.resync_ms);
        println!("  space debounce:       {}", effective.space_debounce_ms);
        println!("  panel reorder:        {}", effective.panel_reorder_ms);
        println!("Tolerance (points):");
        println!("  position:             {}", effective.position_tolerance);
        println!("  ghost frame:          {}", effective.ghost_tolerance);
        println!("  frame echo:           {}", effective.frame_echo_tolerance);
    }

    info!(event = "cli.config_completed");
    Ok(())
}
