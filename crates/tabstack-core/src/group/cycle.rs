//! Modifier-held MRU tab cycling.
//!
//! `begin_cycle` freezes the traversal order so focus notifications that land
//! mid-gesture (including our own raise echoes) cannot reorder the pass.

use tracing::debug;

use super::types::{CycleState, Group};
use crate::mru::merge_mru_order;
use crate::window::WindowId;

impl Group {
    pub fn is_cycling(&self) -> bool {
        self.cycle.is_some()
    }

    /// Snapshot the eligible members in MRU order and enter cycling.
    ///
    /// Fullscreen members are not eligible. Returns false, leaving the group
    /// idle, when fewer than two members are eligible.
    pub fn begin_cycle(&mut self) -> bool {
        let eligible = self
            .windows
            .iter()
            .filter(|w| w.is_managed() && !w.is_fullscreen)
            .map(|w| w.id);
        let order = merge_mru_order(&self.focus_history, eligible);

        if order.len() < 2 {
            debug!(
                event = "core.group.cycle_skipped",
                group_id = %self.id(),
                eligible = order.len()
            );
            self.cycle = None;
            return false;
        }

        debug!(
            event = "core.group.cycle_started",
            group_id = %self.id(),
            eligible = order.len()
        );
        self.cycle = Some(CycleState { order, cursor: 0 });
        true
    }

    /// Advance to the next member of the frozen order.
    ///
    /// Ids removed since the snapshot are skipped. Returns the member index of
    /// the selection, or `None` if not cycling or nothing eligible remains.
    pub fn next_in_mru_cycle(&mut self) -> Option<usize> {
        let windows = &self.windows;
        let cycle = self.cycle.as_mut()?;
        let len = cycle.order.len();

        for _ in 0..len {
            cycle.cursor = (cycle.cursor + 1) % len;
            let id = cycle.order[cycle.cursor];
            if let Some(index) = windows.iter().position(|w| w.id == id && w.is_managed()) {
                return Some(index);
            }
        }
        None
    }

    /// Window id under the frozen cursor, if still a member.
    pub fn cycle_selection(&self) -> Option<WindowId> {
        let cycle = self.cycle.as_ref()?;
        cycle
            .order
            .get(cycle.cursor)
            .copied()
            .filter(|id| self.contains_managed(*id))
    }

    /// Leave cycling and commit the final selection to the MRU front.
    ///
    /// Precedence: `landed` (if still a member), then the frozen cursor
    /// position, then the current active window.
    pub fn end_cycle(&mut self, landed: Option<WindowId>) -> Option<WindowId> {
        if self.cycle.is_none() {
            return None;
        }
        let chosen = landed
            .filter(|id| self.contains_managed(*id))
            .or_else(|| self.cycle_selection())
            .or_else(|| self.active_window_id());
        self.cycle = None;

        if let Some(id) = chosen {
            self.record_focus(id);
            self.switch_to_window(id);
        }
        debug!(
            event = "core.group.cycle_ended",
            group_id = %self.id(),
            selected = ?chosen
        );
        chosen
    }
}
