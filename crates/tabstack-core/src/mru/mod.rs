//! Global most-recently-used tracking and switcher candidate building.

mod candidates;

pub use candidates::{Candidate, CandidatePolicy, build_candidates};

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::window::{GroupId, WindowId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MruEntry {
    Window { window: WindowId },
    Group { group: GroupId },
    GroupWindow { group: GroupId, window: WindowId },
}

impl MruEntry {
    pub fn group(&self) -> Option<GroupId> {
        match self {
            MruEntry::Window { .. } => None,
            MruEntry::Group { group } | MruEntry::GroupWindow { group, .. } => Some(*group),
        }
    }

    pub fn window(&self) -> Option<WindowId> {
        match self {
            MruEntry::Group { .. } => None,
            MruEntry::Window { window } | MruEntry::GroupWindow { window, .. } => Some(*window),
        }
    }

    /// Two entries name the same switchable thing.
    fn same_subject(&self, other: &MruEntry) -> bool {
        match (self.group(), other.group()) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.window() == other.window(),
            // A plain entry and a group entry collide only on the same window
            _ => self.window().is_some() && self.window() == other.window(),
        }
    }
}

/// Cross-group MRU list, most recent first, without duplicates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalMru {
    entries: Vec<MruEntry>,
}

impl GlobalMru {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[MruEntry] {
        &self.entries
    }

    pub fn front(&self) -> Option<&MruEntry> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Move `entry` to the front, dropping any entry for the same subject.
    pub fn touch(&mut self, entry: MruEntry) {
        self.entries.retain(|e| !e.same_subject(&entry));
        self.entries.insert(0, entry);
    }

    pub fn remove_window(&mut self, window: WindowId) {
        self.entries.retain(|e| e.window() != Some(window));
    }

    pub fn remove_group(&mut self, group: GroupId) {
        self.entries.retain(|e| e.group() != Some(group));
    }
}

/// Order `members` MRU-first: ids from `mru` that are members (in MRU order),
/// then the remaining members in their original order.
pub fn merge_mru_order(mru: &[WindowId], members: impl IntoIterator<Item = WindowId>) -> Vec<WindowId> {
    let members: Vec<WindowId> = members.into_iter().collect();
    let member_set: HashSet<WindowId> = members.iter().copied().collect();
    let mut placed = HashSet::new();

    let mut ordered: Vec<WindowId> = mru
        .iter()
        .copied()
        .filter(|id| member_set.contains(id) && placed.insert(*id))
        .collect();
    ordered.extend(members.into_iter().filter(|id| placed.insert(*id)));
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_moves_entry_to_front_without_duplicates() {
        let mut mru = GlobalMru::new();
        mru.touch(MruEntry::Window { window: WindowId(1) });
        mru.touch(MruEntry::Window { window: WindowId(2) });
        mru.touch(MruEntry::Window { window: WindowId(1) });
        assert_eq!(
            mru.entries(),
            &[
                MruEntry::Window { window: WindowId(1) },
                MruEntry::Window { window: WindowId(2) },
            ]
        );
    }

    #[test]
    fn test_touch_collapses_entries_for_same_group() {
        let mut mru = GlobalMru::new();
        mru.touch(MruEntry::Group { group: GroupId(1) });
        mru.touch(MruEntry::Window { window: WindowId(9) });
        mru.touch(MruEntry::GroupWindow {
            group: GroupId(1),
            window: WindowId(3),
        });
        assert_eq!(mru.len(), 2);
        assert_eq!(
            mru.front(),
            Some(&MruEntry::GroupWindow {
                group: GroupId(1),
                window: WindowId(3)
            })
        );
    }

    #[test]
    fn test_grouping_a_window_replaces_its_plain_entry() {
        let mut mru = GlobalMru::new();
        mru.touch(MruEntry::Window { window: WindowId(3) });
        mru.touch(MruEntry::GroupWindow {
            group: GroupId(1),
            window: WindowId(3),
        });
        assert_eq!(mru.len(), 1);
    }

    #[test]
    fn test_remove_window_and_group() {
        let mut mru = GlobalMru::new();
        mru.touch(MruEntry::Window { window: WindowId(1) });
        mru.touch(MruEntry::GroupWindow {
            group: GroupId(2),
            window: WindowId(5),
        });
        mru.remove_window(WindowId(1));
        assert_eq!(mru.len(), 1);
        mru.remove_group(GroupId(2));
        assert!(mru.is_empty());
    }

    #[test]
    fn test_merge_mru_order() {
        let mru = [WindowId(3), WindowId(9), WindowId(1), WindowId(3)];
        let members = [WindowId(1), WindowId(2), WindowId(3), WindowId(4)];
        assert_eq!(
            merge_mru_order(&mru, members),
            vec![WindowId(3), WindowId(1), WindowId(2), WindowId(4)]
        );
    }
}
