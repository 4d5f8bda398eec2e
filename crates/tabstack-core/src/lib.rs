//! tabstack-core: Core library for tab group management
//!
//! Groups independently owned OS windows into tab groups that share one
//! visible frame and one tab bar, and keeps that arrangement consistent while
//! the window server reports asynchronous, sometimes self-caused events.
//!
//! # Main Entry Points
//!
//! - [`state`] - The `Coordinator` and its `Command`/`Event` dispatch surface
//! - [`group`] - Group membership, pinning and focus-history rules
//! - [`registry`] - Group ownership lookup and race arbitration
//! - [`bridge`] - Window server and rendering boundaries
//! - [`config`] - Configuration management

pub mod bridge;
pub mod config;
pub mod echo;
pub mod errors;
pub mod events;
pub mod frame;
pub mod geometry;
pub mod group;
pub mod logging;
pub mod mru;
pub mod registry;
pub mod scheduler;
pub mod space;
pub mod state;
pub mod window;

// Re-export commonly used types at crate root for convenience
pub use bridge::{
    AccessibilityBridge, BridgeError, PanelId, RenderSink, ScreenQuery, SpaceQuery,
    WindowEnumerator, WindowServer,
};
pub use config::TabstackConfig;
pub use echo::{EchoSuppressor, EchoVerdict};
pub use geometry::{Point, Rect};
pub use group::Group;
pub use mru::{Candidate, GlobalMru, MruEntry};
pub use registry::GroupRegistry;
pub use scheduler::{Clock, ManualClock, Scheduler, SystemClock};
pub use state::{ArrowDirection, Command, Coordinator, DispatchError, Event, Store, SwitcherSession};
pub use window::{GroupId, SpaceId, WindowId, WindowRef, WindowSnapshot};

// Re-export logging initialization
pub use logging::init_logging;
