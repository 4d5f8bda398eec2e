use clap::ArgMatches;
use tracing::error;

use tabstack_core::events;

mod config;
pub(crate) mod replay;
mod windows;

pub fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    events::log_app_startup();

    let result = match matches.subcommand() {
        Some(("replay", sub_matches)) => replay::handle_replay_command(sub_matches),
        Some(("config", sub_matches)) => config::handle_config_command(sub_matches),
        Some(("windows", sub_matches)) => windows::handle_windows_command(sub_matches),
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    };

    if let Err(e) = &result {
        events::log_app_error(e.as_ref());
    }
    events::log_app_shutdown(result.is_ok());
    result
}
