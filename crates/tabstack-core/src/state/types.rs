use serde::{Deserialize, Serialize};

use crate::window::{GroupId, WindowId};

/// Direction of an arrow key pressed while the switcher is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrowDirection {
    Left,
    Right,
    Up,
    Down,
}

/// Everything the coordinator reacts to.
///
/// OS notifications carry only the window id; the coordinator re-reads live
/// state through the bridge. Intents come from the tab bar, the keyboard
/// layer, or a replay script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// A window became focused. `pid` lets a stale element be re-acquired.
    WindowFocused {
        window: WindowId,
        #[serde(default)]
        pid: Option<i32>,
    },
    WindowMoved { window: WindowId },
    WindowResized { window: WindowId },
    WindowDestroyed { window: WindowId },
    TitleChanged { window: WindowId },
    FullscreenChanged { window: WindowId, fullscreen: bool },
    /// The active Space changed. Member Spaces are re-checked after a debounce.
    SpaceChanged,

    /// Group windows that no group owns yet. The first window's frame wins.
    CreateGroup {
        windows: Vec<WindowId>,
        #[serde(default)]
        name: Option<String>,
    },
    /// Add a window to a group, moving it out of its current group if any.
    AddWindow {
        group: GroupId,
        window: WindowId,
        #[serde(default)]
        at: Option<usize>,
    },
    /// Drag a tab out: the window leaves and becomes a solo group.
    ReleaseWindow { group: GroupId, window: WindowId },
    /// Take a window out of a group and leave it ungrouped.
    RemoveWindow { group: GroupId, window: WindowId },
    /// Dissolve a group, leaving its windows where they are.
    DestroyGroup { group: GroupId },
    AddSeparator {
        group: GroupId,
        #[serde(default)]
        at: Option<usize>,
    },
    CloseSeparators { group: GroupId },
    SwitchTab { group: GroupId, index: usize },
    MoveTab { group: GroupId, from: usize, to: usize },
    /// Move a multi-selection of tabs as a block to `to`.
    MoveTabs {
        group: GroupId,
        windows: Vec<WindowId>,
        to: usize,
    },
    SetPinned {
        group: GroupId,
        window: WindowId,
        pinned: bool,
    },
    /// Modifier pressed on a group: freeze the MRU order for cycling.
    BeginTabCycle { group: GroupId },
    NextTabCycle,
    EndTabCycle {
        #[serde(default)]
        landed: Option<WindowId>,
    },
    /// Open the global switcher, or move the selection forward.
    SwitcherAdvance,
    SwitcherRetreat,
    SwitcherArrow { direction: ArrowDirection },
    SwitcherCommit,
    SwitcherCancel,
    /// The held modifier was released: ends a tab cycle or commits the switcher.
    ModifierReleased,
    RenameGroup {
        group: GroupId,
        name: Option<String>,
    },
    SetCustomTabName {
        window: WindowId,
        name: Option<String>,
    },
}
