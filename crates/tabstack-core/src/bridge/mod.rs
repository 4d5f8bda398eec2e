//! Boundaries to the window server and the tab bar renderer.
//!
//! Every read can fail or go stale; writes are fire-and-forget from the
//! coordinator's point of view and only report whether they were issued.

mod errors;
pub mod fake;
#[cfg(target_os = "macos")]
pub mod macos;

pub use errors::BridgeError;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};
use crate::window::{GroupId, SpaceId, WindowId, WindowSnapshot};

/// Per-window reads and writes through the accessibility API.
pub trait AccessibilityBridge {
    fn frame(&self, window: WindowId) -> Result<Rect, BridgeError>;

    fn set_frame(&mut self, window: WindowId, frame: Rect) -> Result<(), BridgeError>;

    fn set_position(&mut self, window: WindowId, origin: Point) -> Result<(), BridgeError>;

    fn title(&self, window: WindowId) -> Result<String, BridgeError>;

    fn is_fullscreen(&self, window: WindowId) -> Result<bool, BridgeError>;

    fn window_exists(&self, window: WindowId) -> bool;

    /// Window id of the focused window of process `pid`.
    fn focused_window(&self, pid: i32) -> Result<Option<WindowId>, BridgeError>;

    /// Raise and focus `window`.
    fn raise(&mut self, window: WindowId) -> Result<(), BridgeError>;

    /// Look the window up again through its owning process after its element
    /// went stale.
    fn reacquire(&mut self, window: WindowId, pid: i32) -> Result<(), BridgeError>;
}

/// Z-ordered inventory of on-screen windows, front first.
pub trait WindowEnumerator {
    fn snapshot(&self) -> Result<Vec<WindowSnapshot>, BridgeError>;
}

pub trait SpaceQuery {
    fn space_id(&self, window: WindowId) -> Option<SpaceId>;

    fn space_ids(&self, windows: &[WindowId]) -> HashMap<WindowId, Option<SpaceId>> {
        windows
            .iter()
            .map(|window| (*window, self.space_id(*window)))
            .collect()
    }
}

pub trait ScreenQuery {
    /// Usable area of the screen showing `frame`.
    fn visible_frame(&self, frame: &Rect) -> Option<Rect>;
}

/// Everything the coordinator needs from the OS side.
pub trait WindowServer: AccessibilityBridge + WindowEnumerator + SpaceQuery + ScreenQuery {}

impl<T> WindowServer for T where T: AccessibilityBridge + WindowEnumerator + SpaceQuery + ScreenQuery {}

/// Handle of a tab bar panel owned by a [`RenderSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PanelId(pub u64);

/// Tab bar renderer. One panel per group.
pub trait RenderSink {
    fn create_panel(&mut self, group: GroupId) -> PanelId;

    fn destroy_panel(&mut self, panel: PanelId);

    /// Place the panel above `frame`.
    fn position_above(&mut self, panel: PanelId, frame: Rect, is_maximized: bool);

    /// Order the panel directly above `window` in the window list.
    fn order_above(&mut self, panel: PanelId, window: WindowId);

    fn show(&mut self, panel: PanelId);

    fn order_out(&mut self, panel: PanelId);
}
