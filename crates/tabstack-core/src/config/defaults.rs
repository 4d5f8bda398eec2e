//! Default values for configuration fields.

/// Tab bar height in points.
pub const TAB_BAR_HEIGHT: f64 = 28.0;

/// How long a raise we issued keeps swallowing focus notifications.
///
/// Long enough to cover the burst of notifications a single raise produces,
/// short enough that a genuine click right after a commit still registers.
pub const ECHO_TIMEOUT_MS: u64 = 300;

/// Delay before re-reading a window after its first squeeze write.
pub const QUICK_RECHECK_MS: u64 = 150;

/// Quiet period after the last move/resize before members are resynced.
pub const RESYNC_MS: u64 = 400;

/// Quiet period after a Space change before members are re-queried.
pub const SPACE_DEBOUNCE_MS: u64 = 250;

pub const PANEL_REORDER_MS: u64 = 50;

pub const POSITION_TOLERANCE: f64 = 4.0;

pub const GHOST_TOLERANCE: f64 = 4.0;

pub const FRAME_ECHO_TOLERANCE: f64 = 2.0;
