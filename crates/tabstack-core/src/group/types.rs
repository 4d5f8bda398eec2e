use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geometry::Rect;
use crate::window::{GroupId, SpaceId, WindowId, WindowRef};

/// Frozen traversal state of a modifier-held tab cycle.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct CycleState {
    pub(super) order: Vec<WindowId>,
    pub(super) cursor: usize,
}

/// A set of windows sharing one frame and one tab bar.
///
/// Invariants held by every operation:
/// - pinned members form a contiguous prefix
/// - `active_index` points at a non-separator whenever one exists
/// - `focus_history` is a permutation of the managed member ids
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    id: GroupId,
    pub(super) windows: Vec<WindowRef>,
    pub(super) active_index: usize,
    pub frame: Rect,
    squeeze_delta: f64,
    pub space_id: SpaceId,
    pub name: Option<String>,
    pub(super) focus_history: Vec<WindowId>,
    #[serde(skip)]
    pub(super) cycle: Option<CycleState>,
}

impl Group {
    /// Build a group from an initial member list.
    ///
    /// Pinned members are moved to the front, keeping their relative order.
    /// The initial focus history follows member order.
    pub fn new(
        id: GroupId,
        windows: Vec<WindowRef>,
        frame: Rect,
        space_id: SpaceId,
        name: Option<String>,
    ) -> Self {
        let (mut ordered, unpinned): (Vec<_>, Vec<_>) =
            windows.into_iter().partition(|w| w.is_pinned);
        ordered.extend(unpinned);

        let focus_history = ordered
            .iter()
            .filter(|w| w.is_managed())
            .map(|w| w.id)
            .collect();

        let mut group = Self {
            id,
            windows: ordered,
            active_index: 0,
            frame,
            squeeze_delta: 0.0,
            space_id,
            name,
            focus_history,
            cycle: None,
        };
        group.resolve_active();
        group
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn windows(&self) -> &[WindowRef] {
        &self.windows
    }

    pub fn window(&self, id: WindowId) -> Option<&WindowRef> {
        self.windows.iter().find(|w| w.id == id)
    }

    pub fn window_mut(&mut self, id: WindowId) -> Option<&mut WindowRef> {
        self.windows.iter_mut().find(|w| w.id == id)
    }

    pub fn managed_windows(&self) -> impl Iterator<Item = &WindowRef> {
        self.windows.iter().filter(|w| w.is_managed())
    }

    pub fn managed_ids(&self) -> Vec<WindowId> {
        self.managed_windows().map(|w| w.id).collect()
    }

    pub fn managed_count(&self) -> usize {
        self.managed_windows().count()
    }

    /// A group with no managed members is dead, whatever separators remain.
    pub fn is_empty(&self) -> bool {
        self.managed_count() == 0
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.windows.iter().any(|w| w.id == id)
    }

    pub fn contains_managed(&self, id: WindowId) -> bool {
        self.windows.iter().any(|w| w.id == id && w.is_managed())
    }

    pub fn index_of(&self, id: WindowId) -> Option<usize> {
        self.windows.iter().position(|w| w.id == id)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.windows
            .get(self.active_index)
            .filter(|w| w.is_managed())
            .map(|_| self.active_index)
    }

    pub fn active_window(&self) -> Option<&WindowRef> {
        self.windows
            .get(self.active_index)
            .filter(|w| w.is_managed())
    }

    pub fn active_window_id(&self) -> Option<WindowId> {
        self.active_window().map(|w| w.id)
    }

    pub fn focus_history(&self) -> &[WindowId] {
        &self.focus_history
    }

    pub fn pinned_count(&self) -> usize {
        self.windows.iter().take_while(|w| w.is_pinned).count()
    }

    pub fn squeeze_delta(&self) -> f64 {
        self.squeeze_delta
    }

    /// Record the tab bar squeeze applied to this group's frame.
    ///
    /// The delta only ever grows; a smaller or equal value is ignored so a
    /// re-clamp can never reapply the squeeze on top of itself.
    pub fn record_squeeze(&mut self, delta: f64) -> bool {
        if delta > self.squeeze_delta {
            self.squeeze_delta = delta;
            true
        } else {
            false
        }
    }

    /// Add a member. Returns false if the id is already present.
    ///
    /// `at` is clamped into the pinned prefix for pinned windows and into the
    /// unpinned suffix otherwise; `None` appends to the end of that segment.
    pub fn add_window(&mut self, window: WindowRef, at: Option<usize>) -> bool {
        if self.contains(window.id) {
            debug!(
                event = "core.group.add_window_rejected",
                group_id = %self.id,
                window_id = %window.id,
                reason = "duplicate"
            );
            return false;
        }

        let pinned = self.pinned_count();
        let (lo, hi) = if window.is_pinned {
            (0, pinned)
        } else {
            (pinned, self.windows.len())
        };
        let index = at.unwrap_or(hi).clamp(lo, hi);

        let was_empty = self.windows.is_empty();
        let id = window.id;
        let is_managed = window.is_managed();
        self.windows.insert(index, window);

        if was_empty {
            self.active_index = index;
        } else if index <= self.active_index {
            self.active_index += 1;
        }

        if is_managed {
            self.focus_history.push(id);
        }
        self.resolve_active();

        debug!(
            event = "core.group.window_added",
            group_id = %self.id,
            window_id = %id,
            index = index
        );
        true
    }

    pub fn remove_window(&mut self, id: WindowId) -> Option<WindowRef> {
        self.remove_windows(&[id]).into_iter().next()
    }

    pub fn remove_window_at(&mut self, index: usize) -> Option<WindowRef> {
        let id = self.windows.get(index)?.id;
        self.remove_window(id)
    }

    /// Remove members by id, returning the removed refs in member order.
    ///
    /// If the active member is removed and it was the MRU front, the new MRU
    /// front becomes active; otherwise the surviving member just before the old
    /// active position does. When no managed member survives, separators and
    /// history are cleared and the group is empty.
    pub fn remove_windows(&mut self, ids: &[WindowId]) -> Vec<WindowRef> {
        let targets: HashSet<WindowId> = ids.iter().copied().filter(|id| self.contains(*id)).collect();
        if targets.is_empty() {
            return Vec::new();
        }

        let active_id = self.active_window_id();
        let active_removed = active_id.is_some_and(|id| targets.contains(&id));
        let active_was_front = active_removed && self.focus_history.first() == active_id.as_ref();
        let survivors_before_active = self.windows[..self.active_index.min(self.windows.len())]
            .iter()
            .filter(|w| !targets.contains(&w.id))
            .count();

        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.windows)
            .into_iter()
            .partition(|w| targets.contains(&w.id));
        self.windows = kept;
        self.focus_history.retain(|id| !targets.contains(id));

        if self.is_empty() {
            self.windows.clear();
            self.focus_history.clear();
            self.cycle = None;
            self.active_index = 0;
            debug!(event = "core.group.emptied", group_id = %self.id);
            return removed;
        }

        self.active_index = if !active_removed {
            active_id
                .and_then(|id| self.index_of(id))
                .unwrap_or(self.active_index)
        } else if active_was_front {
            self.focus_history
                .first()
                .and_then(|front| self.index_of(*front))
                .unwrap_or(0)
        } else {
            survivors_before_active.saturating_sub(1)
        };
        self.resolve_active();

        debug!(
            event = "core.group.windows_removed",
            group_id = %self.id,
            removed_count = removed.len(),
            remaining = self.windows.len()
        );
        removed
    }

    /// Activate the non-separator nearest to `index`. No-op on an empty group.
    pub fn switch_to_index(&mut self, index: usize) -> bool {
        if self.windows.is_empty() {
            return false;
        }
        let start = index.min(self.windows.len() - 1);
        match self.nearest_managed(start) {
            Some(resolved) => {
                self.active_index = resolved;
                true
            }
            None => false,
        }
    }

    pub fn switch_to_window(&mut self, id: WindowId) -> bool {
        match self.index_of(id) {
            Some(index) => self.switch_to_index(index),
            None => false,
        }
    }

    /// Move a managed member to the front of the focus history.
    pub fn record_focus(&mut self, id: WindowId) -> bool {
        if !self.contains_managed(id) {
            return false;
        }
        self.focus_history.retain(|h| *h != id);
        self.focus_history.insert(0, id);
        true
    }

    pub fn add_separator(&mut self, id: WindowId, at: Option<usize>) -> bool {
        self.add_window(WindowRef::separator(id), at)
    }

    /// Re-resolve `active_index` onto a non-separator, searching outward.
    pub(super) fn resolve_active(&mut self) {
        if self.windows.is_empty() {
            self.active_index = 0;
            return;
        }
        let start = self.active_index.min(self.windows.len() - 1);
        self.active_index = self.nearest_managed(start).unwrap_or(start);
    }

    /// Nearest managed index to `start`: left first, then right, expanding.
    fn nearest_managed(&self, start: usize) -> Option<usize> {
        let len = self.windows.len();
        for distance in 0..len {
            if let Some(left) = start.checked_sub(distance)
                && self.windows[left].is_managed()
            {
                return Some(left);
            }
            let right = start + distance;
            if right < len && self.windows[right].is_managed() {
                return Some(right);
            }
        }
        None
    }

    /// Run a reindexing mutation while keeping the active window selected.
    pub(super) fn preserving_active<T>(&mut self, mutate: impl FnOnce(&mut Self) -> T) -> T {
        let active_id = self.active_window_id();
        let result = mutate(self);
        if let Some(index) = active_id.and_then(|id| self.index_of(id)) {
            self.active_index = index;
        }
        self.resolve_active();
        result
    }
}


#[cfg(test)]
mod tests {
    use super::test_helpers::*;
    use super::*;

    #[test]
    fn test_new_moves_pinned_members_to_front() {
        let group = Group::new(
            GroupId(1),
            vec![win(1), win(2).pinned(), win(3)],
            Rect::default(),
            SpaceId::UNKNOWN,
            None,
        );
        assert_eq!(ids(&group), vec![2, 1, 3]);
        assert_eq!(group.pinned_count(), 1);
        assert_invariants(&group);
    }

    #[test]
    fn test_add_window_rejects_duplicate() {
        let mut group = group_of(&[1, 2]);
        assert!(!group.add_window(win(2), None));
        assert_eq!(ids(&group), vec![1, 2]);
    }

    #[test]
    fn test_add_window_before_active_shifts_active_index() {
        let mut group = group_of(&[1, 2, 3]);
        assert!(group.switch_to_index(1));
        assert!(group.add_window(win(4), Some(0)));
        assert_eq!(ids(&group), vec![4, 1, 2, 3]);
        assert_eq!(group.active_window_id(), Some(WindowId(2)));
        assert_eq!(history(&group), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_add_unpinned_window_is_clamped_after_pinned_prefix() {
        let mut group = Group::new(
            GroupId(1),
            vec![win(1).pinned(), win(2).pinned(), win(3)],
            Rect::default(),
            SpaceId::UNKNOWN,
            None,
        );
        assert!(group.add_window(win(4), Some(0)));
        assert_eq!(ids(&group), vec![1, 2, 4, 3]);
        assert!(group.add_window(win(5).pinned(), Some(10)));
        assert_eq!(ids(&group), vec![1, 2, 5, 4, 3]);
        assert_invariants(&group);
    }

    #[test]
    fn test_remove_active_mru_front_selects_new_front() {
        // focus history [C, A, B], active C
        let mut group = group_of(&[1, 2, 3]);
        group.record_focus(WindowId(2));
        group.record_focus(WindowId(1));
        group.record_focus(WindowId(3));
        group.switch_to_window(WindowId(3));
        assert_eq!(history(&group), vec![3, 1, 2]);

        group.remove_window(WindowId(3));
        assert_eq!(group.active_window_id(), Some(WindowId(1)));
        assert_invariants(&group);
    }

    #[test]
    fn test_remove_active_not_front_selects_preceding_member() {
        let mut group = group_of(&[1, 2, 3, 4]);
        group.switch_to_window(WindowId(3));
        // history front is 1, so 3 is active but not the MRU front
        group.remove_window(WindowId(3));
        assert_eq!(group.active_window_id(), Some(WindowId(2)));
    }

    #[test]
    fn test_remove_inactive_member_keeps_active_window() {
        let mut group = group_of(&[1, 2, 3]);
        group.switch_to_window(WindowId(3));
        group.remove_window(WindowId(1));
        assert_eq!(group.active_window_id(), Some(WindowId(3)));
        assert_eq!(group.active_index(), Some(1));
    }

    #[test]
    fn test_remove_last_managed_member_clears_separators() {
        let mut group = group_of(&[1]);
        group.add_separator(WindowId(1 << 33), None);
        let removed = group.remove_window(WindowId(1));
        assert!(removed.is_some());
        assert!(group.is_empty());
        assert!(group.windows().is_empty());
        assert!(group.focus_history().is_empty());
    }

    #[test]
    fn test_remove_absent_window_is_noop() {
        let mut group = group_of(&[1, 2]);
        assert!(group.remove_window(WindowId(9)).is_none());
        assert_eq!(ids(&group), vec![1, 2]);
    }

    #[test]
    fn test_active_never_lands_on_separator() {
        let mut group = group_of(&[1, 2]);
        let sep = WindowId(1 << 33);
        group.add_separator(sep, Some(1));
        assert_eq!(ids(&group)[1], sep.0);

        assert!(group.switch_to_index(1));
        // Left neighbour wins the tie
        assert_eq!(group.active_window_id(), Some(WindowId(1)));

        group.remove_window(WindowId(1));
        assert_eq!(group.active_window_id(), Some(WindowId(2)));
        assert_invariants(&group);
    }

    #[test]
    fn test_switch_to_out_of_range_index_clamps() {
        let mut group = group_of(&[1, 2, 3]);
        assert!(group.switch_to_index(99));
        assert_eq!(group.active_window_id(), Some(WindowId(3)));
    }

    #[test]
    fn test_record_focus_ignores_separators_and_absent_ids() {
        let mut group = group_of(&[1, 2]);
        let sep = WindowId(1 << 33);
        group.add_separator(sep, None);
        assert!(!group.record_focus(sep));
        assert!(!group.record_focus(WindowId(42)));
        assert!(group.record_focus(WindowId(2)));
        assert_eq!(history(&group), vec![2, 1]);
    }

    #[test]
    fn test_record_squeeze_is_monotonic() {
        let mut group = group_of(&[1]);
        assert!(group.record_squeeze(30.0));
        assert!(!group.record_squeeze(30.0));
        assert!(!group.record_squeeze(10.0));
        assert_eq!(group.squeeze_delta(), 30.0);
    }

    #[test]
    fn test_invariants_hold_across_add_remove_sequence() {
        let mut group = group_of(&[1, 2, 3]);
        let mut next_sep = 1u64 << 33;
        for step in 0..40u64 {
            match step % 5 {
                0 => {
                    group.add_window(win(10 + step), Some((step as usize) % 4));
                }
                1 => {
                    group.add_separator(WindowId(next_sep), Some(step as usize % 3));
                    next_sep += 1;
                }
                2 => {
                    if let Some(first) = group.managed_ids().first().copied() {
                        group.remove_window(first);
                    }
                }
                3 => {
                    group.switch_to_index(step as usize);
                }
                _ => {
                    if let Some(last) = group.managed_ids().last().copied() {
                        group.record_focus(last);
                    }
                }
            }
            assert_invariants(&group);
        }
    }
}
