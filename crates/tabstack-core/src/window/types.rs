use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// Window server identifier of a real window, or an allocated separator id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u64);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// OS virtual desktop identifier. Zero means unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpaceId(pub u64);

impl SpaceId {
    pub const UNKNOWN: SpaceId = SpaceId(0);

    pub fn is_known(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for SpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A group member: a real OS window or a synthetic separator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowRef {
    pub id: WindowId,
    pub pid: Option<i32>,
    pub frame: Rect,
    pub title: String,
    /// User-assigned tab label shown instead of the window title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_tab_name: Option<String>,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub is_fullscreen: bool,
    #[serde(default)]
    pub is_separator: bool,
}

impl WindowRef {
    pub fn new(id: WindowId, pid: Option<i32>, frame: Rect, title: impl Into<String>) -> Self {
        Self {
            id,
            pid,
            frame,
            title: title.into(),
            custom_tab_name: None,
            is_pinned: false,
            is_fullscreen: false,
            is_separator: false,
        }
    }

    pub fn separator(id: WindowId) -> Self {
        Self {
            is_separator: true,
            ..Self::new(id, None, Rect::default(), "")
        }
    }

    pub fn pinned(mut self) -> Self {
        self.is_pinned = true;
        self
    }

    pub fn fullscreen(mut self) -> Self {
        self.is_fullscreen = true;
        self
    }

    /// Label shown on the tab: custom name if set, else the window title.
    pub fn display_title(&self) -> &str {
        self.custom_tab_name.as_deref().unwrap_or(&self.title)
    }

    pub fn is_managed(&self) -> bool {
        !self.is_separator
    }
}

impl From<&WindowSnapshot> for WindowRef {
    fn from(snapshot: &WindowSnapshot) -> Self {
        Self {
            is_fullscreen: snapshot.is_fullscreen,
            ..Self::new(
                snapshot.id,
                snapshot.pid,
                snapshot.frame,
                snapshot.title.clone(),
            )
        }
    }
}

/// One entry of a z-ordered on-screen window enumeration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSnapshot {
    pub id: WindowId,
    pub pid: Option<i32>,
    pub frame: Rect,
    pub title: String,
    #[serde(default)]
    pub app_name: String,
    #[serde(default)]
    pub is_fullscreen: bool,
}
