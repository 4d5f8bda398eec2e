//! Deferred work keyed by intent.
//!
//! Scheduling a key that is already pending replaces the older task, so a
//! burst of notifications collapses into the newest one.

mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::echo::ClearTicket;
use crate::geometry::Rect;
use crate::window::{GroupId, WindowId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKey {
    EchoClear,
    QuickRecheck(WindowId),
    Resync(GroupId),
    SpaceCheck,
    PanelReorder(GroupId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Deferred {
    /// Clear an echo suppression on the next turn.
    EchoClear(ClearTicket),
    /// Re-read a window after a first squeeze and retry the position once.
    QuickRecheck {
        group: GroupId,
        window: WindowId,
        expected: Rect,
    },
    /// Bring every member back to the group frame after a resize or move settles.
    Resync(GroupId),
    /// Re-check member Spaces after a Space change notification.
    SpaceCheck,
    /// Order the tab bar above the group's active window.
    PanelReorder { group: GroupId, generation: u64 },
}

impl Deferred {
    pub fn key(&self) -> TaskKey {
        match self {
            Deferred::EchoClear(_) => TaskKey::EchoClear,
            Deferred::QuickRecheck { window, .. } => TaskKey::QuickRecheck(*window),
            Deferred::Resync(group) => TaskKey::Resync(*group),
            Deferred::SpaceCheck => TaskKey::SpaceCheck,
            Deferred::PanelReorder { group, .. } => TaskKey::PanelReorder(*group),
        }
    }

    fn group(&self) -> Option<GroupId> {
        match self {
            Deferred::QuickRecheck { group, .. }
            | Deferred::Resync(group)
            | Deferred::PanelReorder { group, .. } => Some(*group),
            Deferred::EchoClear(_) | Deferred::SpaceCheck => None,
        }
    }
}

#[derive(Debug)]
struct Pending {
    task: Deferred,
    due: Instant,
    seq: u64,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    pending: HashMap<TaskKey, Pending>,
    seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` at `now + delay`, replacing any pending task with the same key.
    pub fn schedule(&mut self, task: Deferred, now: Instant, delay: Duration) {
        let key = task.key();
        self.seq += 1;
        let replaced = self
            .pending
            .insert(
                key,
                Pending {
                    task,
                    due: now + delay,
                    seq: self.seq,
                },
            )
            .is_some();
        debug!(
            event = "core.scheduler.task_scheduled",
            task = ?key,
            delay_ms = delay.as_millis() as u64,
            replaced = replaced
        );
    }

    pub fn cancel(&mut self, key: TaskKey) -> bool {
        self.pending.remove(&key).is_some()
    }

    /// Drop every task tied to a dissolved group.
    pub fn cancel_group(&mut self, group: GroupId) {
        self.pending
            .retain(|_, pending| pending.task.group() != Some(group));
    }

    pub fn is_pending(&self, key: TaskKey) -> bool {
        self.pending.contains_key(&key)
    }

    /// Remove and return every task due at `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<Deferred> {
        let due_keys: Vec<TaskKey> = self
            .pending
            .iter()
            .filter(|(_, pending)| pending.due <= now)
            .map(|(key, _)| *key)
            .collect();

        let mut due: Vec<Pending> = due_keys
            .into_iter()
            .filter_map(|key| self.pending.remove(&key))
            .collect();
        due.sort_by_key(|pending| (pending.due, pending.seq));
        due.into_iter().map(|pending| pending.task).collect()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.pending.values().map(|pending| pending.due).min()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
