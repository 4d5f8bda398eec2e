//! Applying Space drift decisions: relabel whole groups, eject strays.

use tracing::{info, warn};

use crate::bridge::{RenderSink, WindowServer};
use crate::scheduler::{Clock, Deferred};
use crate::space::{self, SpaceDecision};
use crate::state::dispatch::Coordinator;
use crate::state::events::Event;
use crate::window::{GroupId, SpaceId, WindowId};

impl<S: WindowServer, R: RenderSink, C: Clock> Coordinator<S, R, C> {
    /// Space changes arrive in bursts; members are only re-queried once the
    /// burst has settled.
    pub(super) fn handle_space_changed(&mut self) {
        let now = self.now();
        self.scheduler
            .schedule(Deferred::SpaceCheck, now, self.config.timing.space_debounce());
    }

    pub(super) fn check_spaces(&mut self, events: &mut Vec<Event>) {
        for (group, decision) in space::plan(&self.registry, &self.server) {
            match decision {
                SpaceDecision::Unchanged => {}
                SpaceDecision::Relabel { space } => self.relabel(group, space, events),
                SpaceDecision::Eject { keep_space, strays } => {
                    self.relabel(group, keep_space, events);
                    for (window, space) in strays {
                        self.eject_stray(group, window, space, events);
                    }
                }
            }
        }
    }

    fn relabel(&mut self, group: GroupId, space: SpaceId, events: &mut Vec<Event>) {
        let Some(g) = self.registry.get_mut(group) else {
            return;
        };
        if g.space_id == space {
            return;
        }
        info!(
            event = "core.space.group_relabelled",
            group_id = %group,
            from = %g.space_id,
            to = %space
        );
        g.space_id = space;
        events.push(Event::SpaceRelabelled { group, space });
    }

    /// Move a member that ended up on another Space into a solo group that
    /// keeps the source group's frame and squeeze.
    fn eject_stray(
        &mut self,
        group: GroupId,
        window: WindowId,
        space: SpaceId,
        events: &mut Vec<Event>,
    ) {
        let Some(g) = self.registry.get(group) else {
            return;
        };
        let frame = g.frame;
        let delta = g.squeeze_delta();
        let prior_active = g.active_window_id();

        let Some(outcome) = self.registry.release_window(group, window) else {
            return;
        };
        events.push(Event::WindowLeft { group, window });
        match outcome.dissolved {
            Some(dissolved) => self.dissolve(dissolved, events),
            None => {
                // The window stays on its own Space; nothing is raised
                if let Err(e) = self.after_member_left(group, prior_active, false, events) {
                    warn!(event = "core.space.refresh_failed", group_id = %group, error = %e);
                }
            }
        }

        for mut member in outcome.released {
            member.is_pinned = false;
            let Some(solo) = self.registry.create_group(vec![member], frame, space, None) else {
                continue;
            };
            if let Some(s) = self.registry.get_mut(solo) {
                s.record_squeeze(delta);
            }
            info!(
                event = "core.space.stray_ejected",
                from = %group,
                window_id = %window,
                into = %solo,
                space_id = %space
            );
            events.push(Event::GroupCreated {
                group: solo,
                windows: vec![window],
            });
            events.push(Event::StrayEjected {
                from: group,
                window,
                into: solo,
            });
            self.sync_panel(solo);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::bridge::fake::FakeWindow;
    use crate::geometry::Rect;
    use crate::state::dispatch::test_support::*;
    use crate::state::{Command, Event, Store};
    use crate::window::{SpaceId, WindowId};

    fn settle(c: &mut TestCoordinator, clock: &crate::scheduler::ManualClock) -> Vec<Event> {
        clock.advance(c.config().timing.space_debounce());
        c.run_pending()
    }

    #[test]
    fn test_whole_group_move_relabels_without_ejection() {
        let (mut c, clock) = coordinator(windows_at(&[1, 2], home()));
        let group = grouped(&mut c, &[1, 2]);
        assert_eq!(c.registry().get(group).unwrap().space_id, SpaceId(1));

        c.server_mut().set_space(WindowId(1), Some(SpaceId(2)));
        c.server_mut().set_space(WindowId(2), Some(SpaceId(2)));
        assert!(c.dispatch(Command::SpaceChanged).unwrap().is_empty());
        let events = settle(&mut c, &clock);

        assert_eq!(events, vec![Event::SpaceRelabelled {
            group,
            space: SpaceId(2)
        }]);
        assert_eq!(c.registry().len(), 1);
        assert_eq!(c.registry().get(group).unwrap().space_id, SpaceId(2));
    }

    #[test]
    fn test_stray_is_ejected_with_prior_frame_and_squeeze() {
        let top = Rect::new(0.0, 0.0, 800.0, 600.0);
        let (mut c, clock) = coordinator(vec![FakeWindow::new(1, top), FakeWindow::new(2, top)]);
        let group = grouped(&mut c, &[1, 2]);
        let frame = c.registry().get(group).unwrap().frame;
        let delta = c.registry().get(group).unwrap().squeeze_delta();
        assert!(delta > 0.0);

        c.server_mut().set_space(WindowId(2), Some(SpaceId(2)));
        c.dispatch(Command::SpaceChanged).unwrap();
        let events = settle(&mut c, &clock);

        let solo = events
            .iter()
            .find_map(|e| match e {
                Event::StrayEjected { from, window, into }
                    if *from == group && *window == WindowId(2) =>
                {
                    Some(*into)
                }
                _ => None,
            })
            .unwrap();
        assert_eq!(
            ids(&c.registry().get(group).unwrap().managed_ids()),
            vec![1]
        );
        let solo = c.registry().get(solo).unwrap();
        assert_eq!(ids(&solo.managed_ids()), vec![2]);
        assert_eq!(solo.frame, frame);
        assert_eq!(solo.squeeze_delta(), delta);
        assert_eq!(solo.space_id, SpaceId(2));
        assert!(c.panel_for(solo.id()).is_some());
    }

    #[test]
    fn test_unknown_space_answers_are_never_strays() {
        let (mut c, clock) = coordinator(windows_at(&[1, 2], home()));
        grouped(&mut c, &[1, 2]);
        c.server_mut().set_space(WindowId(2), None);
        c.dispatch(Command::SpaceChanged).unwrap();

        assert!(settle(&mut c, &clock).is_empty());
        assert_eq!(c.registry().len(), 1);
    }

    #[test]
    fn test_space_check_is_debounced() {
        let (mut c, clock) = coordinator(windows_at(&[1, 2], home()));
        grouped(&mut c, &[1, 2]);
        c.server_mut().set_space(WindowId(1), Some(SpaceId(3)));
        c.server_mut().set_space(WindowId(2), Some(SpaceId(3)));

        c.dispatch(Command::SpaceChanged).unwrap();
        clock.advance(c.config().timing.space_debounce() / 2);
        c.dispatch(Command::SpaceChanged).unwrap();
        clock.advance(c.config().timing.space_debounce() / 2);
        assert!(c.run_pending().is_empty());

        let events = settle(&mut c, &clock);
        assert_eq!(events.len(), 1);
    }
}
