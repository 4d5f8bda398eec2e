//! In-memory window server and recording renderer.
//!
//! Drives the coordinator in tests and scripted replays. The fake models the
//! misbehaviour the coordinator has to cope with: apps that revert position
//! writes, elements that go stale, windows that vanish between reads.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{
    AccessibilityBridge, BridgeError, PanelId, RenderSink, ScreenQuery, SpaceQuery,
    WindowEnumerator,
};
use crate::geometry::{Point, Rect};
use crate::window::{GroupId, SpaceId, WindowId, WindowSnapshot};

fn default_pid() -> i32 {
    1
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FakeWindow {
    pub id: WindowId,
    #[serde(default = "default_pid")]
    pub pid: i32,
    pub frame: Rect,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub app_name: String,
    #[serde(default)]
    pub space: Option<SpaceId>,
    #[serde(default)]
    pub is_fullscreen: bool,
    /// Number of upcoming position writes the app will undo.
    #[serde(default)]
    pub reverts_position: u32,
    #[serde(default)]
    pub stale: bool,
    #[serde(default = "default_true")]
    pub reacquirable: bool,
    /// The app refuses frame writes with an attribute error.
    #[serde(default)]
    pub rejects_writes: bool,
}

impl FakeWindow {
    pub fn new(id: u64, frame: Rect) -> Self {
        Self {
            id: WindowId(id),
            pid: default_pid(),
            frame,
            title: format!("Window {}", id),
            app_name: "App".to_string(),
            space: Some(SpaceId(1)),
            is_fullscreen: false,
            reverts_position: 0,
            stale: false,
            reacquirable: true,
            rejects_writes: false,
        }
    }

    pub fn with_pid(mut self, pid: i32) -> Self {
        self.pid = pid;
        self
    }

    pub fn with_space(mut self, space: Option<SpaceId>) -> Self {
        self.space = space;
        self
    }

    pub fn reverting(mut self, writes: u32) -> Self {
        self.reverts_position = writes;
        self
    }

    fn snapshot(&self) -> WindowSnapshot {
        WindowSnapshot {
            id: self.id,
            pid: Some(self.pid),
            frame: self.frame,
            title: self.title.clone(),
            app_name: self.app_name.clone(),
            is_fullscreen: self.is_fullscreen,
        }
    }
}

/// A frame or position write as the app received it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameWrite {
    pub window: WindowId,
    pub requested: Rect,
    pub reverted: bool,
}

#[derive(Debug, Clone)]
pub struct FakeWindowServer {
    /// Front to back.
    windows: Vec<FakeWindow>,
    visible_frame: Rect,
    writes: Vec<FrameWrite>,
    raised: Vec<WindowId>,
}

impl FakeWindowServer {
    pub fn new(visible_frame: Rect) -> Self {
        Self {
            windows: Vec::new(),
            visible_frame,
            writes: Vec::new(),
            raised: Vec::new(),
        }
    }

    pub fn with_windows(visible_frame: Rect, windows: impl IntoIterator<Item = FakeWindow>) -> Self {
        let mut server = Self::new(visible_frame);
        server.windows.extend(windows);
        server
    }

    pub fn window(&self, id: WindowId) -> Option<&FakeWindow> {
        self.windows.iter().find(|w| w.id == id)
    }

    pub fn window_mut(&mut self, id: WindowId) -> Option<&mut FakeWindow> {
        self.windows.iter_mut().find(|w| w.id == id)
    }

    pub fn writes(&self) -> &[FrameWrite] {
        &self.writes
    }

    pub fn raised(&self) -> &[WindowId] {
        &self.raised
    }

    pub fn clear_log(&mut self) {
        self.writes.clear();
        self.raised.clear();
    }

    pub fn z_order(&self) -> Vec<WindowId> {
        self.windows.iter().map(|w| w.id).collect()
    }

    /// Open a window in front of all others.
    pub fn open(&mut self, window: FakeWindow) {
        self.windows.retain(|w| w.id != window.id);
        self.windows.insert(0, window);
    }

    pub fn close(&mut self, id: WindowId) -> Option<FakeWindow> {
        let index = self.windows.iter().position(|w| w.id == id)?;
        Some(self.windows.remove(index))
    }

    /// Bring a window to the front as if the user clicked it.
    pub fn bring_to_front(&mut self, id: WindowId) -> bool {
        match self.windows.iter().position(|w| w.id == id) {
            Some(index) => {
                let window = self.windows.remove(index);
                self.windows.insert(0, window);
                true
            }
            None => false,
        }
    }

    /// User-driven move or resize.
    pub fn set_window_frame(&mut self, id: WindowId, frame: Rect) -> bool {
        self.window_mut(id).map(|w| w.frame = frame).is_some()
    }

    pub fn set_title(&mut self, id: WindowId, title: &str) -> bool {
        self.window_mut(id).map(|w| w.title = title.to_string()).is_some()
    }

    pub fn set_space(&mut self, id: WindowId, space: Option<SpaceId>) -> bool {
        self.window_mut(id).map(|w| w.space = space).is_some()
    }

    pub fn set_fullscreen(&mut self, id: WindowId, fullscreen: bool) -> bool {
        self.window_mut(id).map(|w| w.is_fullscreen = fullscreen).is_some()
    }

    pub fn mark_stale(&mut self, id: WindowId, reacquirable: bool) -> bool {
        self.window_mut(id)
            .map(|w| {
                w.stale = true;
                w.reacquirable = reacquirable;
            })
            .is_some()
    }

    pub fn set_reverts_position(&mut self, id: WindowId, writes: u32) -> bool {
        self.window_mut(id).map(|w| w.reverts_position = writes).is_some()
    }

    pub fn set_rejects_writes(&mut self, id: WindowId, rejects: bool) -> bool {
        self.window_mut(id).map(|w| w.rejects_writes = rejects).is_some()
    }

    pub fn set_visible_frame(&mut self, frame: Rect) {
        self.visible_frame = frame;
    }

    fn live(&self, id: WindowId) -> Result<&FakeWindow, BridgeError> {
        let window = self
            .window(id)
            .ok_or(BridgeError::WindowNotFound { window: id })?;
        if window.stale {
            return Err(BridgeError::StaleElement { window: id });
        }
        Ok(window)
    }

    fn live_mut(&mut self, id: WindowId) -> Result<&mut FakeWindow, BridgeError> {
        self.live(id)?;
        self.window_mut(id)
            .ok_or(BridgeError::WindowNotFound { window: id })
    }

    fn apply_write(&mut self, id: WindowId, requested: Rect) -> Result<(), BridgeError> {
        let window = self.live_mut(id)?;
        if window.rejects_writes {
            return Err(BridgeError::AttributeFailed {
                window: id,
                attribute: "AXSize",
                action: "set",
                message: "attribute is not settable".to_string(),
            });
        }
        let reverted = window.reverts_position > 0;
        if reverted {
            // The app accepts the size but snaps back to its own origin
            window.reverts_position -= 1;
            window.frame.width = requested.width;
            window.frame.height = requested.height;
        } else {
            window.frame = requested;
        }
        self.writes.push(FrameWrite {
            window: id,
            requested,
            reverted,
        });
        Ok(())
    }
}

impl AccessibilityBridge for FakeWindowServer {
    fn frame(&self, window: WindowId) -> Result<Rect, BridgeError> {
        Ok(self.live(window)?.frame)
    }

    fn set_frame(&mut self, window: WindowId, frame: Rect) -> Result<(), BridgeError> {
        self.apply_write(window, frame)
    }

    fn set_position(&mut self, window: WindowId, origin: Point) -> Result<(), BridgeError> {
        let requested = self.live(window)?.frame.with_origin(origin);
        self.apply_write(window, requested)
    }

    fn title(&self, window: WindowId) -> Result<String, BridgeError> {
        Ok(self.live(window)?.title.clone())
    }

    fn is_fullscreen(&self, window: WindowId) -> Result<bool, BridgeError> {
        Ok(self.live(window)?.is_fullscreen)
    }

    fn window_exists(&self, window: WindowId) -> bool {
        self.window(window).is_some()
    }

    fn focused_window(&self, pid: i32) -> Result<Option<WindowId>, BridgeError> {
        Ok(self.windows.iter().find(|w| w.pid == pid).map(|w| w.id))
    }

    fn raise(&mut self, window: WindowId) -> Result<(), BridgeError> {
        self.live(window)?;
        self.bring_to_front(window);
        self.raised.push(window);
        Ok(())
    }

    fn reacquire(&mut self, window: WindowId, pid: i32) -> Result<(), BridgeError> {
        match self.window_mut(window) {
            Some(w) if w.pid == pid && w.reacquirable => {
                w.stale = false;
                Ok(())
            }
            _ => Err(BridgeError::WindowNotFound { window }),
        }
    }
}

impl WindowEnumerator for FakeWindowServer {
    fn snapshot(&self) -> Result<Vec<WindowSnapshot>, BridgeError> {
        Ok(self.windows.iter().map(FakeWindow::snapshot).collect())
    }
}

impl SpaceQuery for FakeWindowServer {
    fn space_id(&self, window: WindowId) -> Option<SpaceId> {
        self.window(window).and_then(|w| w.space)
    }
}

impl ScreenQuery for FakeWindowServer {
    fn visible_frame(&self, _frame: &Rect) -> Option<Rect> {
        Some(self.visible_frame)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RenderCommand {
    Create { panel: PanelId, group: GroupId },
    Destroy { panel: PanelId },
    PositionAbove { panel: PanelId, frame: Rect, is_maximized: bool },
    OrderAbove { panel: PanelId, window: WindowId },
    Show { panel: PanelId },
    OrderOut { panel: PanelId },
}

/// Render sink that records every command it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    commands: Vec<RenderCommand>,
    panels: HashMap<PanelId, GroupId>,
    next_panel: u64,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    pub fn panel_for(&self, group: GroupId) -> Option<PanelId> {
        self.panels
            .iter()
            .find(|(_, g)| **g == group)
            .map(|(panel, _)| *panel)
    }

    pub fn last_position(&self, panel: PanelId) -> Option<Rect> {
        self.commands.iter().rev().find_map(|c| match c {
            RenderCommand::PositionAbove { panel: p, frame, .. } if *p == panel => Some(*frame),
            _ => None,
        })
    }

    /// Window the panel was last ordered above.
    pub fn last_ordered_above(&self, panel: PanelId) -> Option<WindowId> {
        self.commands.iter().rev().find_map(|c| match c {
            RenderCommand::OrderAbove { panel: p, window } if *p == panel => Some(*window),
            _ => None,
        })
    }

    pub fn is_shown(&self, panel: PanelId) -> bool {
        self.commands
            .iter()
            .rev()
            .find_map(|c| match c {
                RenderCommand::Show { panel: p } if *p == panel => Some(true),
                RenderCommand::OrderOut { panel: p } if *p == panel => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }
}

impl RenderSink for RecordingSink {
    fn create_panel(&mut self, group: GroupId) -> PanelId {
        self.next_panel += 1;
        let panel = PanelId(self.next_panel);
        self.panels.insert(panel, group);
        self.commands.push(RenderCommand::Create { panel, group });
        panel
    }

    fn destroy_panel(&mut self, panel: PanelId) {
        self.panels.remove(&panel);
        self.commands.push(RenderCommand::Destroy { panel });
    }

    fn position_above(&mut self, panel: PanelId, frame: Rect, is_maximized: bool) {
        self.commands.push(RenderCommand::PositionAbove {
            panel,
            frame,
            is_maximized,
        });
    }

    fn order_above(&mut self, panel: PanelId, window: WindowId) {
        self.commands.push(RenderCommand::OrderAbove { panel, window });
    }

    fn show(&mut self, panel: PanelId) {
        self.commands.push(RenderCommand::Show { panel });
    }

    fn order_out(&mut self, panel: PanelId) {
        self.commands.push(RenderCommand::OrderOut { panel });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> FakeWindowServer {
        FakeWindowServer::with_windows(
            Rect::new(0.0, 0.0, 1440.0, 900.0),
            [
                FakeWindow::new(1, Rect::new(0.0, 0.0, 800.0, 600.0)),
                FakeWindow::new(2, Rect::new(100.0, 100.0, 800.0, 600.0)).with_pid(7),
            ],
        )
    }

    #[test]
    fn test_reverting_app_keeps_its_origin() {
        let mut server = server();
        server.set_reverts_position(WindowId(1), 1);

        server
            .set_frame(WindowId(1), Rect::new(0.0, 30.0, 800.0, 570.0))
            .unwrap();
        assert_eq!(
            server.frame(WindowId(1)).unwrap(),
            Rect::new(0.0, 0.0, 800.0, 570.0)
        );
        assert!(server.writes()[0].reverted);

        // Only the configured number of writes are undone
        server
            .set_position(WindowId(1), Point::new(0.0, 30.0))
            .unwrap();
        assert_eq!(server.frame(WindowId(1)).unwrap().y, 30.0);
    }

    #[test]
    fn test_stale_element_until_reacquired() {
        let mut server = server();
        server.mark_stale(WindowId(2), true);

        let err = server.frame(WindowId(2)).unwrap_err();
        assert!(err.is_stale());
        assert!(server.reacquire(WindowId(2), 1).is_err());
        server.reacquire(WindowId(2), 7).unwrap();
        assert!(server.frame(WindowId(2)).is_ok());
    }

    #[test]
    fn test_raise_reorders_snapshot() {
        let mut server = server();
        server.raise(WindowId(2)).unwrap();
        let order: Vec<WindowId> = server.snapshot().unwrap().iter().map(|w| w.id).collect();
        assert_eq!(order, vec![WindowId(2), WindowId(1)]);
        assert_eq!(server.focused_window(7).unwrap(), Some(WindowId(2)));
    }

    #[test]
    fn test_closed_window_is_not_found() {
        let mut server = server();
        server.close(WindowId(1));
        assert!(!server.window_exists(WindowId(1)));
        assert!(matches!(
            server.frame(WindowId(1)),
            Err(BridgeError::WindowNotFound { .. })
        ));
    }

    #[test]
    fn test_recording_sink_tracks_panel_state() {
        let mut sink = RecordingSink::new();
        let panel = sink.create_panel(GroupId(3));
        sink.position_above(panel, Rect::new(0.0, 30.0, 800.0, 770.0), false);
        sink.show(panel);
        sink.order_above(panel, WindowId(9));

        assert_eq!(sink.panel_for(GroupId(3)), Some(panel));
        assert!(sink.is_shown(panel));
        assert_eq!(sink.last_ordered_above(panel), Some(WindowId(9)));

        sink.order_out(panel);
        assert!(!sink.is_shown(panel));
        sink.destroy_panel(panel);
        assert_eq!(sink.panel_count(), 0);
    }
}
