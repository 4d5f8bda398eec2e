use clap::ArgMatches;
use tracing::{error, info};

use tabstack_core::WindowSnapshot;

#[cfg(target_os = "macos")]
fn list_windows() -> Result<Vec<WindowSnapshot>, Box<dyn std::error::Error>> {
    use tabstack_core::WindowEnumerator;
    use tabstack_core::bridge::macos::MacWindowServer;

    Ok(MacWindowServer::new().snapshot()?)
}

#[cfg(not(target_os = "macos"))]
fn list_windows() -> Result<Vec<WindowSnapshot>, Box<dyn std::error::Error>> {
    Err("Listing live windows requires macOS".into())
}

pub(crate) fn handle_windows_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");

    info!(event = "cli.windows_started", json_output = json_output);

    let windows = match list_windows() {
        Ok(windows) => windows,
        Err(e) => {
            eprintln!("Could not list windows: {}", e);
            error!(event = "cli.windows_failed", error = %e);
            return Err(e);
        }
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&windows)?);
    } else if windows.is_empty() {
        println!("No windows on screen.");
    } else {
        for window in &windows {
            println!(
                "{:>8}  {:<20}  {:>6},{:<6} {:>5}x{:<5}  {}{}",
                window.id.to_string(),
                window.app_name,
                window.frame.x,
                window.frame.y,
                window.frame.width,
                window.frame.height,
                window.title,
                if window.is_fullscreen { " [fullscreen]" } else { "" }
            );
        }
    }

    info!(event = "cli.windows_completed", count = windows.len());
    Ok(())
}
