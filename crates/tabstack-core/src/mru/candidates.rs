use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use super::{GlobalMru, MruEntry, merge_mru_order};
use crate::group::Group;
use crate::registry::GroupRegistry;
use crate::window::{GroupId, WindowId, WindowSnapshot};

/// One switchable item, in switcher order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Candidate {
    /// An ungrouped window.
    Window { window: WindowId, title: String },
    /// A whole group; activating it raises its active member.
    Group { group: GroupId, windows: Vec<WindowId> },
    /// One member of a group, listed individually.
    GroupWindow { group: GroupId, window: WindowId },
}

impl Candidate {
    pub fn group(&self) -> Option<GroupId> {
        match self {
            Candidate::Window { .. } => None,
            Candidate::Group { group, .. } | Candidate::GroupWindow { group, .. } => Some(*group),
        }
    }

    #[cfg(test)]
    pub fn window(&self) -> Option<WindowId> {
        match self {
            Candidate::Group { .. } => None,
            Candidate::Window { window, .. } | Candidate::GroupWindow { window, .. } => {
                Some(*window)
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CandidatePolicy {
    /// List each group member as its own item instead of one item per group.
    pub split_groups: bool,
    /// Edge tolerance for treating an ungrouped window as a ghost report of a
    /// listed group's frame.
    pub ghost_tolerance: f64,
}

impl Default for CandidatePolicy {
    fn default() -> Self {
        Self {
            split_groups: false,
            ghost_tolerance: 4.0,
        }
    }
}

/// Working state shared by the three build phases.
struct Builder<'a> {
    registry: &'a GroupRegistry,
    policy: CandidatePolicy,
    placed: HashSet<WindowId>,
    listed_groups: HashSet<GroupId>,
    out: Vec<Candidate>,
}

impl<'a> Builder<'a> {
    fn emit_group(&mut self, group: &Group, only: Option<WindowId>) {
        self.listed_groups.insert(group.id());
        if self.policy.split_groups {
            let members = match only {
                Some(window) => vec![window],
                None => merge_mru_order(group.focus_history(), group.managed_ids()),
            };
            for window in members {
                if self.placed.insert(window) {
                    self.out.push(Candidate::GroupWindow {
                        group: group.id(),
                        window,
                    });
                }
            }
        } else {
            if group.managed_ids().iter().all(|id| self.placed.contains(id)) {
                return;
            }
            self.placed.extend(group.managed_ids());
            self.out.push(Candidate::Group {
                group: group.id(),
                windows: group.managed_ids(),
            });
        }
    }

    fn is_ghost(&self, window: &WindowSnapshot) -> bool {
        self.listed_groups.iter().any(|id| {
            self.registry
                .get(*id)
                .is_some_and(|g| g.frame.edges_within(&window.frame, self.policy.ghost_tolerance))
        })
    }
}

/// Merge the global MRU with a live z-ordered snapshot into switcher order.
///
/// 1. MRU entries front to back: group entries emit their group, plain
///    entries emit only unowned, still-visible windows.
/// 2. Snapshot windows not yet placed: owned ones emit their group, unowned
///    ones emit themselves unless they are a ghost of a listed group's frame.
/// 3. Groups with no visible member are appended.
pub fn build_candidates(
    mru: &GlobalMru,
    registry: &GroupRegistry,
    snapshot: &[WindowSnapshot],
    policy: CandidatePolicy,
) -> Vec<Candidate> {
    let mut builder = Builder {
        registry,
        policy,
        placed: HashSet::new(),
        listed_groups: HashSet::new(),
        out: Vec::new(),
    };

    for entry in mru.entries() {
        match *entry {
            MruEntry::Group { group } => {
                if let Some(group) = registry.get(group) {
                    builder.emit_group(group, None);
                }
            }
            MruEntry::GroupWindow { group, window } => {
                if let Some(group) = registry.get(group)
                    && group.contains_managed(window)
                {
                    let only = policy.split_groups.then_some(window);
                    builder.emit_group(group, only);
                }
            }
            MruEntry::Window { window } => {
                if builder.placed.contains(&window) || registry.is_owned(window) {
                    continue;
                }
                if let Some(live) = snapshot.iter().find(|w| w.id == window) {
                    builder.placed.insert(window);
                    builder.out.push(Candidate::Window {
                        window,
                        title: live.title.clone(),
                    });
                }
            }
        }
    }

    for window in snapshot {
        if builder.placed.contains(&window.id) {
            continue;
        }
        if let Some(group) = registry.group_for(window.id) {
            let only = policy.split_groups.then_some(window.id);
            builder.emit_group(group, only);
            continue;
        }
        if builder.is_ghost(window) {
            debug!(
                event = "core.mru.ghost_window_skipped",
                window_id = %window.id
            );
            continue;
        }
        builder.placed.insert(window.id);
        builder.out.push(Candidate::Window {
            window: window.id,
            title: window.title.clone(),
        });
    }

    for group in registry.groups() {
        if policy.split_groups || !builder.listed_groups.contains(&group.id()) {
            builder.emit_group(group, None);
        }
    }

    builder.out
}
