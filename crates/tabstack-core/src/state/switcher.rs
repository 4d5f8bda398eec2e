//! The modifier-held window switcher.

use tracing::{debug, info};

use crate::bridge::{BridgeError, RenderSink, WindowServer};
use crate::mru::{self, Candidate, CandidatePolicy, MruEntry};
use crate::scheduler::Clock;
use crate::state::dispatch::Coordinator;
use crate::state::events::Event;
use crate::state::types::ArrowDirection;
use crate::window::{GroupId, WindowId};

/// An open switcher: the candidate list captured when it opened and the
/// highlighted position.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitcherSession {
    candidates: Vec<Candidate>,
    cursor: usize,
}

impl SwitcherSession {
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected(&self) -> Option<&Candidate> {
        self.candidates.get(self.cursor)
    }

    fn step(&mut self, forward: bool) {
        let len = self.candidates.len();
        if len == 0 {
            return;
        }
        self.cursor = if forward {
            (self.cursor + 1) % len
        } else {
            (self.cursor + len - 1) % len
        };
    }

    /// Drop a destroyed window from the list. The highlight stays on the same
    /// candidate unless that candidate is the one removed.
    pub(super) fn forget_window(&mut self, window: WindowId) {
        let cursor = self.cursor;
        let mut index = 0;
        let mut removed_before = 0;
        self.candidates.retain_mut(|candidate| {
            let keep = match candidate {
                Candidate::Window { window: w, .. } | Candidate::GroupWindow { window: w, .. } => {
                    *w != window
                }
                Candidate::Group { windows, .. } => {
                    windows.retain(|w| *w != window);
                    !windows.is_empty()
                }
            };
            if !keep && index < cursor {
                removed_before += 1;
            }
            index += 1;
            keep
        });
        self.cursor = (cursor - removed_before).min(self.candidates.len().saturating_sub(1));
    }
}

impl<S: WindowServer, R: RenderSink, C: Clock> Coordinator<S, R, C> {
    /// Open the switcher, or move its highlight when already open.
    pub(super) fn switcher_step(
        &mut self,
        forward: bool,
        events: &mut Vec<Event>,
    ) -> Result<(), BridgeError> {
        if let Some(session) = self.switcher.as_mut() {
            session.step(forward);
            events.push(Event::SwitcherMoved {
                selected: session.cursor,
            });
            return Ok(());
        }

        let snapshot = self.server.snapshot()?;
        let policy = CandidatePolicy {
            split_groups: self.config.switcher.split_groups(),
            ghost_tolerance: self.config.tolerance.ghost(),
        };
        let candidates = mru::build_candidates(&self.mru, &self.registry, &snapshot, policy);
        if candidates.is_empty() {
            debug!(event = "core.switcher.open_skipped", reason = "no_candidates");
            return Ok(());
        }

        let count = candidates.len();
        // The first item is what already has focus; open on the one behind it
        let cursor = match (forward, count) {
            (true, 1) => 0,
            (true, _) => 1,
            (false, _) => count - 1,
        };
        info!(
            event = "core.switcher.opened",
            candidate_count = count,
            selected = cursor
        );
        self.switcher = Some(SwitcherSession { candidates, cursor });
        events.push(Event::SwitcherOpened {
            count,
            selected: cursor,
        });
        Ok(())
    }

    pub(super) fn switcher_arrow(&mut self, direction: ArrowDirection, events: &mut Vec<Event>) {
        let Some(session) = self.switcher.as_mut() else {
            return;
        };
        let forward = matches!(direction, ArrowDirection::Right | ArrowDirection::Down);
        session.step(forward);
        events.push(Event::SwitcherMoved {
            selected: session.cursor,
        });
    }

    pub(super) fn switcher_commit(&mut self, events: &mut Vec<Event>) -> Result<(), BridgeError> {
        let Some(session) = self.switcher.take() else {
            return Ok(());
        };
        let target = session.selected().and_then(|candidate| self.resolve_candidate(candidate));

        let raised = match target {
            Some((Some(group), window)) => {
                if let Some(g) = self.registry.get_mut(group)
                    && g.active_window_id() != Some(window)
                    && g.switch_to_window(window)
                {
                    events.push(Event::ActiveChanged { group, window });
                }
                self.activate(group, window, "switcher_commit", events)?
            }
            Some((None, window)) => {
                let raised = self.raise_under_echo(window, "switcher_commit", events)?;
                if raised {
                    self.mru.touch(MruEntry::Window { window });
                }
                raised
            }
            None => false,
        };

        match target {
            Some((_, window)) if raised => {
                info!(event = "core.switcher.committed", window_id = %window);
                events.push(Event::SwitcherCommitted { window });
            }
            _ => {
                debug!(event = "core.switcher.commit_dropped", reason = "target_gone");
                events.push(Event::SwitcherCancelled);
            }
        }
        Ok(())
    }

    pub(super) fn switcher_cancel(&mut self, events: &mut Vec<Event>) {
        if self.switcher.take().is_some() {
            debug!(event = "core.switcher.cancelled");
            events.push(Event::SwitcherCancelled);
        }
    }

    /// The window a candidate stands for, re-checked against current state.
    fn resolve_candidate(&self, candidate: &Candidate) -> Option<(Option<GroupId>, WindowId)> {
        match candidate {
            Candidate::Window { window, .. } => {
                (!self.registry.is_owned(*window)).then_some((None, *window))
            }
            Candidate::Group { group, .. } => {
                let active = self.registry.get(*group)?.active_window_id()?;
                Some((Some(*group), active))
            }
            Candidate::GroupWindow { group, window } => self
                .registry
                .get(*group)?
                .contains_managed(*window)
                .then_some((Some(*group), *window)),
        }
    }
}
