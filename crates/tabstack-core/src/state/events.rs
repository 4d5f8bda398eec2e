use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::window::{GroupId, SpaceId, WindowId};

/// What changed as a result of a command or a deferred task.
///
/// Each variant describes _what happened_. Bridge failures that cannot be
/// recovered use the `Result` error channel; notifications that turn out to
/// be our own echoes produce no events at all, so an empty vector is a valid
/// outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    GroupCreated {
        group: GroupId,
        windows: Vec<WindowId>,
    },
    /// The group is gone: its last member left or it was destroyed.
    GroupDissolved { group: GroupId },
    GroupRenamed {
        group: GroupId,
        name: Option<String>,
    },
    WindowJoined { group: GroupId, window: WindowId },
    WindowLeft { group: GroupId, window: WindowId },
    ActiveChanged { group: GroupId, window: WindowId },
    TabsReordered { group: GroupId },
    PinChanged {
        group: GroupId,
        window: WindowId,
        pinned: bool,
    },
    SeparatorAdded { group: GroupId, separator: WindowId },
    SeparatorsClosed { group: GroupId, count: usize },
    /// Members were brought to the group frame.
    FrameSynced { group: GroupId, frame: Rect },
    /// The group frame was shortened to make room for the tab bar.
    FrameSqueezed { group: GroupId, delta: f64 },
    /// An app reverted our position write; it was re-issued once.
    PositionRetried { window: WindowId },
    SpaceRelabelled { group: GroupId, space: SpaceId },
    /// A member found on another Space was moved into its own group.
    StrayEjected {
        from: GroupId,
        window: WindowId,
        into: GroupId,
    },
    TitleChanged { window: WindowId, title: String },
    CustomTabNameChanged {
        window: WindowId,
        name: Option<String>,
    },
    FullscreenChanged { window: WindowId, fullscreen: bool },
    /// A focus notification was recognized as the echo of our own raise.
    EchoSuppressed { window: WindowId },
    /// A stale accessibility element was re-acquired from its process.
    ElementReacquired { window: WindowId },
    WindowDestroyed { window: WindowId },
    CycleStarted { group: GroupId },
    CycleEnded {
        group: GroupId,
        window: Option<WindowId>,
    },
    SwitcherOpened { count: usize, selected: usize },
    SwitcherMoved { selected: usize },
    SwitcherCommitted { window: WindowId },
    SwitcherCancelled,
}
