//! Process-level lifecycle events shared by every front end.

use tracing::{error, info};

pub fn log_app_startup() {
    info!(
        event = "core.app.startup_completed",
        version = env!("CARGO_PKG_VERSION")
    );
}

/// Logged once the command has finished, whatever its outcome.
pub fn log_app_shutdown(success: bool) {
    info!(event = "core.app.shutdown_started", success = success);
}

pub fn log_app_error(error: &dyn std::error::Error) {
    error!(
        event = "core.app.error_occurred",
        error = %error,
        error_type = std::any::type_name_of_val(error)
    );
}
