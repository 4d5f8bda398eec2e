//! Tab reordering and pinning.
//!
//! Every operation here keeps pinned members as a contiguous prefix and keeps
//! the active window selected across the reindexing.

use std::collections::HashSet;

use tracing::debug;

use super::types::Group;
use crate::window::WindowId;

impl Group {
    /// Index bounds `[lo, hi]` a member with this pinned state may occupy once
    /// it has been taken out of the list.
    fn segment_bounds(&self, pinned: bool) -> (usize, usize) {
        let pinned_count = self.pinned_count();
        if pinned {
            (0, pinned_count)
        } else {
            (pinned_count, self.windows.len())
        }
    }

    /// Move the member at `from` to `to`, clamped into its own segment.
    pub fn move_tab(&mut self, from: usize, to: usize) -> bool {
        if from >= self.windows.len() {
            return false;
        }
        self.preserving_active(|group| {
            let window = group.windows.remove(from);
            let (lo, hi) = group.segment_bounds(window.is_pinned);
            let index = to.clamp(lo, hi);
            group.windows.insert(index, window);
            index != from
        })
    }

    /// Move a pinned member within the pinned prefix.
    pub fn move_pinned_tab(&mut self, from: usize, to: usize) -> bool {
        if from >= self.pinned_count() {
            return false;
        }
        self.move_tab(from, to)
    }

    /// Move an unpinned member within the unpinned suffix.
    pub fn move_unpinned_tab(&mut self, from: usize, to: usize) -> bool {
        if from < self.pinned_count() || from >= self.windows.len() {
            return false;
        }
        self.move_tab(from, to)
    }

    /// Move several members as one block, keeping their relative order.
    ///
    /// `to` is an insertion index in the current list. The block must share a
    /// single pinned state; mixed selections are rejected.
    pub fn move_tabs(&mut self, ids: &[WindowId], to: usize) -> bool {
        let selected: HashSet<WindowId> = ids.iter().copied().collect();
        let block_pinned: Vec<bool> = self
            .windows
            .iter()
            .filter(|w| selected.contains(&w.id))
            .map(|w| w.is_pinned)
            .collect();
        let Some(&pinned) = block_pinned.first() else {
            return false;
        };
        if block_pinned.iter().any(|p| *p != pinned) {
            debug!(
                event = "core.group.move_tabs_rejected",
                group_id = %self.id(),
                reason = "mixed_pinned_state"
            );
            return false;
        }

        self.preserving_active(|group| {
            let kept_before = group.windows[..to.min(group.windows.len())]
                .iter()
                .filter(|w| !selected.contains(&w.id))
                .count();
            let (block, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut group.windows)
                .into_iter()
                .partition(|w| selected.contains(&w.id));
            group.windows = rest;

            let (lo, hi) = group.segment_bounds(pinned);
            let index = kept_before.clamp(lo, hi);
            group.windows.splice(index..index, block);
            true
        })
    }

    /// Pin a member: it joins the end of the pinned prefix.
    pub fn pin_window(&mut self, id: WindowId) -> bool {
        self.set_pinned(id, true)
    }

    /// Unpin a member: it becomes the first unpinned tab.
    pub fn unpin_window(&mut self, id: WindowId) -> bool {
        self.set_pinned(id, false)
    }

    pub fn set_pinned(&mut self, id: WindowId, pinned: bool) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let window = &self.windows[index];
        if window.is_separator || window.is_pinned == pinned {
            return false;
        }

        self.preserving_active(|group| {
            let mut window = group.windows.remove(index);
            window.is_pinned = pinned;
            // Both cases land on the boundary between the two segments
            let boundary = group.pinned_count();
            group.windows.insert(boundary, window);
        });

        debug!(
            event = "core.group.pin_changed",
            group_id = %self.id(),
            window_id = %id,
            pinned = pinned,
            pinned_count = self.pinned_count()
        );
        true
    }
}
