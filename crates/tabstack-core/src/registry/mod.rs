//! Group registry: ownership lookup and race arbitration.
//!
//! At rest every window id belongs to at most one group. While a window is
//! mid-transfer it can briefly show up in two groups' member lists; that state
//! is tolerated here and resolved by [`GroupRegistry::owner_for`] plus
//! [`GroupRegistry::promote_window_ownership`] on the next mutating event.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::geometry::Rect;
use crate::group::Group;
use crate::window::{GroupId, SeparatorIds, SpaceId, WindowId, WindowRef};

/// Result of releasing members from a group.
#[derive(Debug, Clone)]
pub struct ReleaseOutcome {
    /// The members that left the group.
    pub released: Vec<WindowRef>,
    /// Set when the release emptied the group. The value still carries its
    /// last member list so callers can re-home the ejected windows.
    pub dissolved: Option<Group>,
}

#[derive(Debug, Default)]
pub struct GroupRegistry {
    groups: Vec<Group>,
    next_group_id: u64,
    separator_ids: SeparatorIds,
    /// Sequence number of the last focus each group recorded for a window.
    focus_stamps: HashMap<(GroupId, WindowId), u64>,
    focus_seq: u64,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    pub fn group_ids(&self) -> Vec<GroupId> {
        self.groups.iter().map(|g| g.id()).collect()
    }

    pub fn get(&self, id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| g.id() == id)
    }

    pub fn get_mut(&mut self, id: GroupId) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| g.id() == id)
    }

    /// First group listing `window` as a managed member.
    pub fn group_for(&self, window: WindowId) -> Option<&Group> {
        self.groups.iter().find(|g| g.contains_managed(window))
    }

    /// Every group listing `window`. More than one entry means an ownership
    /// race is in progress.
    pub fn groups_for(&self, window: WindowId) -> Vec<GroupId> {
        self.groups
            .iter()
            .filter(|g| g.contains_managed(window))
            .map(|g| g.id())
            .collect()
    }

    pub fn is_owned(&self, window: WindowId) -> bool {
        self.group_for(window).is_some()
    }

    /// Create a group from an initial member set.
    ///
    /// Returns `None` without touching the registry when the set has no
    /// managed window, contains a duplicate id, or any id is already owned.
    pub fn create_group(
        &mut self,
        windows: Vec<WindowRef>,
        frame: Rect,
        space_id: SpaceId,
        name: Option<String>,
    ) -> Option<GroupId> {
        if !windows.iter().any(|w| w.is_managed()) {
            debug!(event = "core.registry.create_rejected", reason = "empty");
            return None;
        }
        let mut seen = HashSet::new();
        if !windows.iter().all(|w| seen.insert(w.id)) {
            debug!(event = "core.registry.create_rejected", reason = "duplicate_ids");
            return None;
        }
        if let Some(owned) = windows.iter().find(|w| self.is_owned(w.id)) {
            debug!(
                event = "core.registry.create_rejected",
                reason = "already_owned",
                window_id = %owned.id
            );
            return None;
        }

        self.next_group_id += 1;
        let id = GroupId(self.next_group_id);
        let count = windows.len();
        self.groups
            .push(Group::new(id, windows, frame, space_id, name));

        info!(
            event = "core.registry.group_created",
            group_id = %id,
            window_count = count,
            space_id = %space_id
        );
        Some(id)
    }

    /// Add a window that no other group owns.
    pub fn add_window(&mut self, group: GroupId, window: WindowRef, at: Option<usize>) -> bool {
        if window.is_managed() && self.is_owned(window.id) {
            debug!(
                event = "core.registry.add_rejected",
                group_id = %group,
                window_id = %window.id,
                reason = "already_owned"
            );
            return false;
        }
        self.get_mut(group)
            .is_some_and(|g| g.add_window(window, at))
    }

    /// Add a window even if another group still lists it.
    ///
    /// Used when a drop lands before the source group has seen the detach;
    /// the duplicate is settled by arbitration on the next mutating event.
    pub fn adopt_window(&mut self, group: GroupId, window: WindowRef, at: Option<usize>) -> bool {
        let others = self.groups_for(window.id);
        let added = self
            .get_mut(group)
            .is_some_and(|g| g.add_window(window.clone(), at));
        if added && !others.is_empty() {
            debug!(
                event = "core.registry.transient_multi_owner",
                window_id = %window.id,
                target = %group,
                previous_owners = ?others
            );
        }
        added
    }

    /// Stamp a focus for `window` in `group` and move it to the group's MRU
    /// front.
    pub fn record_focus(&mut self, group: GroupId, window: WindowId) -> bool {
        let recorded = self
            .get_mut(group)
            .is_some_and(|g| g.record_focus(window));
        if recorded {
            self.focus_seq += 1;
            self.focus_stamps.insert((group, window), self.focus_seq);
        }
        recorded
    }

    /// Pick the single owner of `window` for a mutating decision.
    ///
    /// With one candidate that group wins. With several, the group whose
    /// recorded frame is closest to `live_frame` wins; ties go to the group
    /// that most recently recorded focus for the window, then to the oldest
    /// group id.
    pub fn owner_for(&self, window: WindowId, live_frame: Option<Rect>) -> Option<GroupId> {
        let candidates: Vec<&Group> = self
            .groups
            .iter()
            .filter(|g| g.contains_managed(window))
            .collect();

        match candidates.as_slice() {
            [] => None,
            [only] => Some(only.id()),
            _ => {
                let distance = |g: &Group| live_frame.map_or(0.0, |f| g.frame.edge_distance(&f));
                let stamp = |g: &Group| {
                    self.focus_stamps
                        .get(&(g.id(), window))
                        .copied()
                        .unwrap_or(0)
                };
                let winner = candidates
                    .iter()
                    .copied()
                    .min_by(|a, b| {
                        distance(a)
                            .total_cmp(&distance(b))
                            .then_with(|| stamp(b).cmp(&stamp(a)))
                            .then_with(|| a.id().cmp(&b.id()))
                    })
                    .map(|g| g.id());

                warn!(
                    event = "core.registry.ownership_race_resolved",
                    window_id = %window,
                    candidates = candidates.len(),
                    winner = ?winner
                );
                winner
            }
        }
    }

    /// Make `owner` the only group holding `window`.
    ///
    /// The window is removed from every other group; groups emptied by that
    /// removal are dissolved and returned.
    pub fn promote_window_ownership(&mut self, window: WindowId, owner: GroupId) -> Vec<Group> {
        let losers: Vec<GroupId> = self
            .groups_for(window)
            .into_iter()
            .filter(|g| *g != owner)
            .collect();

        let mut dissolved = Vec::new();
        for loser in losers {
            if let Some(group) = self.get_mut(loser) {
                group.remove_window(window);
            }
            self.focus_stamps.remove(&(loser, window));
            debug!(
                event = "core.registry.ownership_revoked",
                window_id = %window,
                group_id = %loser,
                owner = %owner
            );
            if self.get(loser).is_some_and(|g| g.is_empty())
                && let Some(group) = self.take_group(loser)
            {
                dissolved.push(group);
            }
        }
        dissolved
    }

    /// Release members from a group.
    ///
    /// If the release would leave no managed member, the whole group is taken
    /// out of the registry with its member list intact and returned in
    /// `dissolved`.
    pub fn release_windows(&mut self, group: GroupId, windows: &[WindowId]) -> Option<ReleaseOutcome> {
        let target = self.get(group)?;
        let releasing: HashSet<WindowId> = windows
            .iter()
            .copied()
            .filter(|id| target.contains(*id))
            .collect();
        if releasing.is_empty() {
            return None;
        }

        let empties_group = target
            .managed_windows()
            .all(|w| releasing.contains(&w.id));

        if empties_group {
            let dissolved = self.take_group(group)?;
            let released = dissolved
                .windows()
                .iter()
                .filter(|w| releasing.contains(&w.id))
                .cloned()
                .collect();
            info!(
                event = "core.registry.group_dissolved",
                group_id = %group,
                reason = "released_last_member"
            );
            return Some(ReleaseOutcome {
                released,
                dissolved: Some(dissolved),
            });
        }

        let ids: Vec<WindowId> = releasing.iter().copied().collect();
        let released = self.get_mut(group)?.remove_windows(&ids);
        for id in &ids {
            self.focus_stamps.remove(&(group, *id));
        }
        Some(ReleaseOutcome {
            released,
            dissolved: None,
        })
    }

    pub fn release_window(&mut self, group: GroupId, window: WindowId) -> Option<ReleaseOutcome> {
        self.release_windows(group, &[window])
    }

    /// Purge a window from every group (destroy cleanup).
    ///
    /// Returns the ids of groups that still exist after losing the window and
    /// the groups that were dissolved because of it.
    pub fn remove_window_everywhere(&mut self, window: WindowId) -> (Vec<GroupId>, Vec<Group>) {
        let mut touched = Vec::new();
        let mut dissolved = Vec::new();
        for group_id in self.groups_for(window) {
            if let Some(group) = self.get_mut(group_id) {
                group.remove_window(window);
            }
            self.focus_stamps.remove(&(group_id, window));
            if self.get(group_id).is_some_and(|g| g.is_empty()) {
                if let Some(group) = self.take_group(group_id) {
                    info!(
                        event = "core.registry.group_dissolved",
                        group_id = %group_id,
                        reason = "last_member_destroyed"
                    );
                    dissolved.push(group);
                }
            } else {
                touched.push(group_id);
            }
        }
        (touched, dissolved)
    }

    /// Allocate a separator id and insert it into `group`.
    pub fn add_separator(&mut self, group: GroupId, at: Option<usize>) -> Option<WindowId> {
        self.get(group)?;
        let id = self.separator_ids.allocate();
        let target = self.get_mut(group)?;
        target.add_separator(id, at).then_some(id)
    }

    /// Update a window's title everywhere it is listed. Returns true only if
    /// some stored title actually changed.
    pub fn update_window_title(&mut self, window: WindowId, title: &str) -> bool {
        let mut changed = false;
        for group in &mut self.groups {
            if let Some(w) = group.window_mut(window)
                && w.title != title
            {
                w.title = title.to_string();
                changed = true;
            }
        }
        changed
    }

    pub fn update_window_custom_tab_name(&mut self, window: WindowId, name: Option<&str>) -> bool {
        let name = name.map(str::trim).filter(|n| !n.is_empty());
        let mut changed = false;
        for group in &mut self.groups {
            if let Some(w) = group.window_mut(window)
                && w.custom_tab_name.as_deref() != name
            {
                w.custom_tab_name = name.map(str::to_string);
                changed = true;
            }
        }
        changed
    }

    /// Remove a whole group, returning it.
    pub fn take_group(&mut self, id: GroupId) -> Option<Group> {
        let index = self.groups.iter().position(|g| g.id() == id)?;
        self.focus_stamps.retain(|(group, _), _| *group != id);
        Some(self.groups.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::test_helpers::win;

    fn frame() -> Rect {
        Rect::new(0.0, 30.0, 800.0, 770.0)
    }

    fn registry_with(groups: &[&[u64]]) -> (GroupRegistry, Vec<GroupId>) {
        let mut registry = GroupRegistry::new();
        let ids = groups
            .iter()
            .map(|members| {
                registry
                    .create_group(
                        members.iter().map(|id| win(*id)).collect(),
                        frame(),
                        SpaceId(1),
                        None,
                    )
                    .unwrap()
            })
            .collect();
        (registry, ids)
    }

    #[test]
    fn test_create_group_rejects_invalid_sets() {
        let (mut registry, _) = registry_with(&[&[1, 2]]);
        assert!(registry.create_group(vec![], frame(), SpaceId(1), None).is_none());
        assert!(
            registry
                .create_group(vec![win(5), win(5)], frame(), SpaceId(1), None)
                .is_none()
        );
        assert!(
            registry
                .create_group(vec![win(2), win(6)], frame(), SpaceId(1), None)
                .is_none()
        );
        assert!(
            registry
                .create_group(
                    vec![WindowRef::separator(WindowId(1 << 33))],
                    frame(),
                    SpaceId(1),
                    None
                )
                .is_none()
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_group_lookup() {
        let (registry, ids) = registry_with(&[&[1, 2], &[3]]);
        assert_eq!(registry.group_for(WindowId(3)).map(|g| g.id()), Some(ids[1]));
        assert!(registry.group_for(WindowId(9)).is_none());
        assert_eq!(registry.groups_for(WindowId(1)), vec![ids[0]]);
    }

    #[test]
    fn test_add_window_rejects_window_owned_elsewhere() {
        let (mut registry, ids) = registry_with(&[&[1, 2], &[3]]);
        assert!(!registry.add_window(ids[1], win(1), None));
        assert!(registry.add_window(ids[1], win(4), None));
        assert_eq!(registry.groups_for(WindowId(4)), vec![ids[1]]);
    }

    #[test]
    fn test_owner_for_prefers_closest_frame() {
        let (mut registry, ids) = registry_with(&[&[1, 2], &[3]]);
        registry.get_mut(ids[1]).unwrap().frame = Rect::new(500.0, 30.0, 600.0, 600.0);
        assert!(registry.adopt_window(ids[1], win(2), None));
        assert_eq!(registry.groups_for(WindowId(2)).len(), 2);

        let live = Rect::new(502.0, 31.0, 600.0, 600.0);
        assert_eq!(registry.owner_for(WindowId(2), Some(live)), Some(ids[1]));
        assert_eq!(registry.owner_for(WindowId(2), Some(frame())), Some(ids[0]));
    }

    #[test]
    fn test_owner_for_tie_breaks_on_most_recent_focus() {
        let (mut registry, ids) = registry_with(&[&[1, 2], &[3]]);
        assert!(registry.adopt_window(ids[1], win(2), None));
        registry.record_focus(ids[0], WindowId(2));
        registry.record_focus(ids[1], WindowId(2));
        // Both groups share the same frame, so recency decides
        assert_eq!(registry.owner_for(WindowId(2), Some(frame())), Some(ids[1]));
        registry.record_focus(ids[0], WindowId(2));
        assert_eq!(registry.owner_for(WindowId(2), Some(frame())), Some(ids[0]));
    }

    #[test]
    fn test_owner_for_without_live_frame_is_deterministic() {
        let (mut registry, ids) = registry_with(&[&[1, 2], &[3]]);
        assert!(registry.adopt_window(ids[1], win(2), None));
        assert_eq!(registry.owner_for(WindowId(2), None), Some(ids[0]));
    }

    #[test]
    fn test_promote_removes_window_from_losers() {
        let (mut registry, ids) = registry_with(&[&[1, 2], &[3]]);
        registry.adopt_window(ids[1], win(2), None);
        let dissolved = registry.promote_window_ownership(WindowId(2), ids[1]);
        assert!(dissolved.is_empty());
        assert_eq!(registry.groups_for(WindowId(2)), vec![ids[1]]);
        assert!(!registry.get(ids[0]).unwrap().contains(WindowId(2)));
    }

    #[test]
    fn test_promote_dissolves_emptied_loser() {
        let (mut registry, ids) = registry_with(&[&[1], &[3]]);
        registry.adopt_window(ids[1], win(1), None);
        let dissolved = registry.promote_window_ownership(WindowId(1), ids[1]);
        assert_eq!(dissolved.len(), 1);
        assert_eq!(dissolved[0].id(), ids[0]);
        assert!(registry.get(ids[0]).is_none());
    }

    #[test]
    fn test_release_last_member_dissolves_and_keeps_member_list() {
        let (mut registry, ids) = registry_with(&[&[1, 2]]);
        let outcome = registry
            .release_windows(ids[0], &[WindowId(1), WindowId(2)])
            .unwrap();
        let dissolved = outcome.dissolved.unwrap();
        assert_eq!(dissolved.managed_ids(), vec![WindowId(1), WindowId(2)]);
        assert_eq!(outcome.released.len(), 2);
        assert!(registry.is_empty());
        assert!(registry.group_for(WindowId(1)).is_none());
        assert!(registry.group_for(WindowId(2)).is_none());
    }

    #[test]
    fn test_release_partial_keeps_group() {
        let (mut registry, ids) = registry_with(&[&[1, 2, 3]]);
        let outcome = registry.release_window(ids[0], WindowId(2)).unwrap();
        assert!(outcome.dissolved.is_none());
        assert_eq!(outcome.released[0].id, WindowId(2));
        assert_eq!(
            registry.get(ids[0]).unwrap().managed_ids(),
            vec![WindowId(1), WindowId(3)]
        );
        assert!(registry.release_window(ids[0], WindowId(9)).is_none());
    }

    #[test]
    fn test_remove_last_member_everywhere_dissolves_group() {
        let (mut registry, ids) = registry_with(&[&[1], &[2, 3]]);
        let separator = registry.add_separator(ids[0], None);
        assert!(separator.is_some());

        let (touched, dissolved) = registry.remove_window_everywhere(WindowId(1));
        assert!(touched.is_empty());
        assert_eq!(dissolved.len(), 1);
        assert!(registry.get(ids[0]).is_none());
        assert!(registry.group_for(WindowId(1)).is_none());

        let (touched, dissolved) = registry.remove_window_everywhere(WindowId(2));
        assert_eq!(touched, vec![ids[1]]);
        assert!(dissolved.is_empty());
    }

    #[test]
    fn test_update_title_reports_change_only_once() {
        let (mut registry, _) = registry_with(&[&[1, 2]]);
        assert!(registry.update_window_title(WindowId(1), "Renamed"));
        assert!(!registry.update_window_title(WindowId(1), "Renamed"));
        assert!(!registry.update_window_title(WindowId(9), "Missing"));
    }

    #[test]
    fn test_update_custom_tab_name_normalizes_blank_to_none() {
        let (mut registry, _) = registry_with(&[&[1]]);
        assert!(registry.update_window_custom_tab_name(WindowId(1), Some("Docs")));
        assert!(!registry.update_window_custom_tab_name(WindowId(1), Some("Docs")));
        assert!(registry.update_window_custom_tab_name(WindowId(1), Some("   ")));
        let group = registry.group_for(WindowId(1)).unwrap();
        assert!(group.window(WindowId(1)).unwrap().custom_tab_name.is_none());
    }

    #[test]
    fn test_separator_ids_do_not_collide_across_groups() {
        let (mut registry, ids) = registry_with(&[&[1], &[2]]);
        let a = registry.add_separator(ids[0], None).unwrap();
        let b = registry.add_separator(ids[1], None).unwrap();
        assert_ne!(a, b);
        assert!(registry.add_separator(GroupId(99), None).is_none());
    }
}
