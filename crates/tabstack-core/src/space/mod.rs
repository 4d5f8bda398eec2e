//! Space drift detection.
//!
//! Decides, per group, whether members followed a Space change together
//! (relabel) or split up (eject the strays). Applying a decision is the
//! coordinator's job.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::bridge::SpaceQuery;
use crate::group::Group;
use crate::registry::GroupRegistry;
use crate::window::{GroupId, SpaceId, WindowId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum SpaceDecision {
    Unchanged,
    /// Every member that answered moved to `space` together.
    Relabel { space: SpaceId },
    /// Members disagree. The group stays on `keep_space`; each stray leaves
    /// for the Space it reported.
    Eject {
        keep_space: SpaceId,
        strays: Vec<(WindowId, SpaceId)>,
    },
}

/// Decide what a group should do given each managed member's reported Space.
///
/// Missing, nil and unknown answers never count as strays.
pub fn plan_group(group: &Group, answers: &HashMap<WindowId, Option<SpaceId>>) -> SpaceDecision {
    let known: Vec<(WindowId, SpaceId)> = group
        .managed_ids()
        .into_iter()
        .filter_map(|id| match answers.get(&id).copied().flatten() {
            Some(space) if space.is_known() => Some((id, space)),
            _ => None,
        })
        .collect();

    if known.is_empty() {
        return SpaceDecision::Unchanged;
    }

    let mut tally: BTreeMap<SpaceId, usize> = BTreeMap::new();
    for (_, space) in &known {
        *tally.entry(*space).or_default() += 1;
    }

    if tally.len() == 1 {
        let (_, space) = known[0];
        return if space == group.space_id {
            SpaceDecision::Unchanged
        } else {
            SpaceDecision::Relabel { space }
        };
    }

    if !group.space_id.is_known() {
        // No reference Space to judge strays against
        return SpaceDecision::Unchanged;
    }

    let keep_space = if tally.contains_key(&group.space_id) {
        group.space_id
    } else {
        plurality_space(group, &known, &tally)
    };

    let strays = known
        .into_iter()
        .filter(|(_, space)| *space != keep_space)
        .collect();
    SpaceDecision::Eject { keep_space, strays }
}

/// Most reported Space; ties go to the active window's Space, then the lowest id.
fn plurality_space(
    group: &Group,
    known: &[(WindowId, SpaceId)],
    tally: &BTreeMap<SpaceId, usize>,
) -> SpaceId {
    let best = tally.values().copied().max().unwrap_or(0);
    let active_space = group
        .active_window_id()
        .and_then(|active| known.iter().find(|(id, _)| *id == active))
        .map(|(_, space)| *space);

    if let Some(space) = active_space
        && tally.get(&space) == Some(&best)
    {
        return space;
    }
    tally
        .iter()
        .find(|(_, count)| **count == best)
        .map(|(space, _)| *space)
        .unwrap_or(group.space_id)
}

/// Query every group's members and collect the groups that need action.
pub fn plan(registry: &GroupRegistry, query: &impl SpaceQuery) -> Vec<(GroupId, SpaceDecision)> {
    registry
        .groups()
        .filter_map(|group| {
            let answers = query.space_ids(&group.managed_ids());
            let decision = plan_group(group, &answers);
            debug!(
                event = "core.space.group_checked",
                group_id = %group.id(),
                space_id = %group.space_id,
                decision = ?decision
            );
            (decision != SpaceDecision::Unchanged).then(|| (group.id(), decision))
        })
        .collect()
}
