//! Focus notifications, tab switching and modifier-held tab cycling.

use std::time::Duration;

use tracing::{debug, info};

use crate::bridge::{BridgeError, RenderSink, WindowServer};
use crate::echo::EchoVerdict;
use crate::geometry::Rect;
use crate::mru::MruEntry;
use crate::scheduler::{Clock, Deferred};
use crate::state::dispatch::Coordinator;
use crate::state::events::Event;
use crate::window::{GroupId, WindowId};

impl<S: WindowServer, R: RenderSink, C: Clock> Coordinator<S, R, C> {
    pub(super) fn handle_focus(
        &mut self,
        window: WindowId,
        pid: Option<i32>,
        events: &mut Vec<Event>,
    ) -> Result<(), BridgeError> {
        let now = self.now();
        match self.echo.should_suppress(window, now) {
            EchoVerdict::Allow => {}
            verdict => {
                if let EchoVerdict::SuppressThenClear(ticket) = verdict {
                    self.scheduler
                        .schedule(Deferred::EchoClear(ticket), now, Duration::ZERO);
                }
                events.push(Event::EchoSuppressed { window });
                return Ok(());
            }
        }

        if let Some(pid) = pid {
            for group in self.registry.groups_for(window) {
                if let Some(member) = self
                    .registry
                    .get_mut(group)
                    .and_then(|g| g.window_mut(window))
                    && member.pid.is_none()
                {
                    member.pid = Some(pid);
                }
            }
        }

        let live = if self.registry.groups_for(window).len() > 1 {
            match self.read_frame(window, pid, events)? {
                Some(frame) => Some(frame),
                None => return Ok(()),
            }
        } else {
            None
        };

        let Some(group) = self.resolve_owner(window, live, events) else {
            self.mru.touch(MruEntry::Window { window });
            debug!(event = "core.focus.free_window_recorded", window_id = %window);
            return Ok(());
        };

        if self.cycling == Some(group) {
            debug!(
                event = "core.focus.ignored_while_cycling",
                group_id = %group,
                window_id = %window
            );
            return Ok(());
        }

        let Some(g) = self.registry.get_mut(group) else {
            return Ok(());
        };
        let before = g.active_window_id();
        g.switch_to_window(window);
        self.registry.record_focus(group, window);
        self.mru.touch(MruEntry::GroupWindow { group, window });
        if before != Some(window) {
            info!(
                event = "core.focus.active_changed",
                group_id = %group,
                window_id = %window
            );
            events.push(Event::ActiveChanged { group, window });
        }
        self.schedule_panel_reorder(group);
        Ok(())
    }

    /// Settle which group owns `window`, revoking it from the losers of a
    /// transient multi-ownership race.
    pub(super) fn resolve_owner(
        &mut self,
        window: WindowId,
        live: Option<Rect>,
        events: &mut Vec<Event>,
    ) -> Option<GroupId> {
        let candidates = self.registry.groups_for(window);
        if candidates.len() <= 1 {
            return candidates.first().copied();
        }

        let owner = self.registry.owner_for(window, live)?;
        let dissolved = self.registry.promote_window_ownership(window, owner);
        for loser in candidates.into_iter().filter(|g| *g != owner) {
            events.push(Event::WindowLeft {
                group: loser,
                window,
            });
            if self.registry.get(loser).is_some() {
                self.sync_panel(loser);
            }
        }
        for group in dissolved {
            self.dissolve(group, events);
        }
        Some(owner)
    }

    pub(super) fn switch_tab(
        &mut self,
        group: GroupId,
        index: usize,
        events: &mut Vec<Event>,
    ) -> Result<(), BridgeError> {
        let Some(g) = self.registry.get_mut(group) else {
            return Ok(());
        };
        let before = g.active_window_id();
        if !g.switch_to_index(index) {
            return Ok(());
        }
        let Some(window) = g.active_window_id() else {
            return Ok(());
        };
        if before == Some(window) {
            return Ok(());
        }
        events.push(Event::ActiveChanged { group, window });
        self.activate(group, window, "tab_switch", events)?;
        Ok(())
    }

    pub(super) fn begin_tab_cycle(
        &mut self,
        group: GroupId,
        events: &mut Vec<Event>,
    ) -> Result<(), BridgeError> {
        if self.cycling.is_some() {
            self.finish_tab_cycle(None, events)?;
        }
        let started = self
            .registry
            .get_mut(group)
            .is_some_and(|g| g.begin_cycle());
        if started {
            self.cycling = Some(group);
            events.push(Event::CycleStarted { group });
        }
        Ok(())
    }

    pub(super) fn next_tab_cycle(&mut self, events: &mut Vec<Event>) -> Result<(), BridgeError> {
        let Some(group) = self.cycling else {
            return Ok(());
        };
        let Some(g) = self.registry.get_mut(group) else {
            self.cycling = None;
            return Ok(());
        };
        let Some(index) = g.next_in_mru_cycle() else {
            return Ok(());
        };
        let before = g.active_window_id();
        g.switch_to_index(index);
        let Some(window) = g.active_window_id() else {
            return Ok(());
        };
        if before != Some(window) {
            events.push(Event::ActiveChanged { group, window });
        }
        // Focus history stays frozen until the cycle ends
        self.raise_under_echo(window, "tab_cycle", events)?;
        self.sync_panel(group);
        Ok(())
    }

    /// Leave cycling and commit the selection to the group's MRU front.
    pub(super) fn finish_tab_cycle(
        &mut self,
        landed: Option<WindowId>,
        events: &mut Vec<Event>,
    ) -> Result<(), BridgeError> {
        let Some(group) = self.cycling.take() else {
            return Ok(());
        };
        let Some(g) = self.registry.get_mut(group) else {
            return Ok(());
        };
        let before = g.active_window_id();
        let chosen = g.end_cycle(landed);
        events.push(Event::CycleEnded {
            group,
            window: chosen,
        });

        if let Some(window) = chosen {
            self.registry.record_focus(group, window);
            self.mru.touch(MruEntry::GroupWindow { group, window });
            if before != Some(window) {
                events.push(Event::ActiveChanged { group, window });
                self.raise_under_echo(window, "tab_cycle_end", events)?;
            }
            self.sync_panel(group);
        }
        Ok(())
    }

    pub(super) fn modifier_released(&mut self, events: &mut Vec<Event>) -> Result<(), BridgeError> {
        if self.cycling.is_some() {
            self.finish_tab_cycle(None, events)
        } else if self.switcher.is_some() {
            self.switcher_commit(events)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::state::dispatch::test_support::*;
    use crate::state::{Command, Event, Store};
    use crate::window::WindowId;

    fn focus(c: &mut TestCoordinator, id: u64) -> Vec<Event> {
        c.dispatch(Command::WindowFocused {
            window: WindowId(id),
            pid: None,
        })
        .unwrap()
    }

    #[test]
    fn test_user_focus_moves_active_tab_and_mru() {
        let (mut c, _) = coordinator(windows_at(&[1, 2], home()));
        let group = grouped(&mut c, &[1, 2]);

        let events = focus(&mut c, 2);

        assert_eq!(events, vec![Event::ActiveChanged {
            group,
            window: WindowId(2)
        }]);
        let g = c.registry().get(group).unwrap();
        assert_eq!(g.active_window_id(), Some(WindowId(2)));
        assert_eq!(ids(g.focus_history()), vec![2, 1]);
    }

    #[test]
    fn test_switch_tab_echo_is_suppressed_then_cleared() {
        let (mut c, _) = coordinator(windows_at(&[1, 2], home()));
        let group = grouped(&mut c, &[1, 2]);

        let events = c
            .dispatch(Command::SwitchTab { group, index: 1 })
            .unwrap();
        assert_eq!(events, vec![Event::ActiveChanged {
            group,
            window: WindowId(2)
        }]);
        assert_eq!(c.server().raised(), &[WindowId(2)]);

        // The raise comes back as a focus notification
        assert_eq!(focus(&mut c, 2), vec![Event::EchoSuppressed {
            window: WindowId(2)
        }]);
        // Second notification in the same burst
        assert_eq!(focus(&mut c, 2), vec![Event::EchoSuppressed {
            window: WindowId(2)
        }]);

        c.run_pending();
        assert!(!c.echo().is_suppressing());

        let events = focus(&mut c, 1);
        assert_eq!(events, vec![Event::ActiveChanged {
            group,
            window: WindowId(1)
        }]);
    }

    #[test]
    fn test_unrelated_focus_during_commit_is_suppressed() {
        let (mut c, _) = coordinator(windows_at(&[1, 2, 3], home()));
        let group = grouped(&mut c, &[1, 2]);
        c.dispatch(Command::SwitchTab { group, index: 1 }).unwrap();

        assert_eq!(focus(&mut c, 3), vec![Event::EchoSuppressed {
            window: WindowId(3)
        }]);
        assert!(c.echo().is_suppressing());
        assert!(c.run_pending().is_empty());
        assert!(c.echo().is_suppressing());
    }

    #[test]
    fn test_suppression_expires_after_timeout() {
        let (mut c, clock) = coordinator(windows_at(&[1, 2], home()));
        let group = grouped(&mut c, &[1, 2]);
        c.dispatch(Command::SwitchTab { group, index: 1 }).unwrap();

        clock.advance(c.config().timing.echo_timeout());
        let events = focus(&mut c, 1);
        assert_eq!(events, vec![Event::ActiveChanged {
            group,
            window: WindowId(1)
        }]);
    }

    #[test]
    fn test_free_window_focus_is_recorded_in_global_mru() {
        let (mut c, _) = coordinator(windows_at(&[1, 2], home()));
        assert!(focus(&mut c, 2).is_empty());
        assert_eq!(
            c.mru().front(),
            Some(&crate::mru::MruEntry::Window {
                window: WindowId(2)
            })
        );
    }

    #[test]
    fn test_tab_cycle_visits_mru_order_and_commits_on_release() {
        let (mut c, _) = coordinator(windows_at(&[1, 2, 3], home()));
        let group = grouped(&mut c, &[1, 2, 3]);

        let events = c.dispatch(Command::BeginTabCycle { group }).unwrap();
        assert_eq!(events, vec![Event::CycleStarted { group }]);

        c.dispatch(Command::NextTabCycle).unwrap();
        assert_eq!(
            c.registry().get(group).unwrap().active_window_id(),
            Some(WindowId(2))
        );
        // Late echo of the first raise, then a stray focus while cycling
        focus(&mut c, 2);
        c.dispatch(Command::NextTabCycle).unwrap();
        assert_eq!(
            c.registry().get(group).unwrap().active_window_id(),
            Some(WindowId(3))
        );
        // History stays frozen mid-cycle
        assert_eq!(
            ids(c.registry().get(group).unwrap().focus_history()),
            vec![1, 2, 3]
        );

        let events = c.dispatch(Command::ModifierReleased).unwrap();
        assert_eq!(events, vec![Event::CycleEnded {
            group,
            window: Some(WindowId(3))
        }]);
        assert_eq!(c.cycling_group(), None);
        assert_eq!(
            ids(c.registry().get(group).unwrap().focus_history()),
            vec![3, 1, 2]
        );
        assert_eq!(c.server().raised(), &[WindowId(2), WindowId(3)]);
    }

    #[test]
    fn test_focus_during_cycle_does_not_reorder() {
        let (mut c, clock) = coordinator(windows_at(&[1, 2, 3], home()));
        let group = grouped(&mut c, &[1, 2, 3]);
        c.dispatch(Command::BeginTabCycle { group }).unwrap();
        clock.advance(Duration::from_secs(1));

        assert!(focus(&mut c, 3).is_empty());
        assert_eq!(
            ids(c.registry().get(group).unwrap().focus_history()),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_begin_cycle_on_single_member_group_is_a_no_op() {
        let (mut c, _) = coordinator(windows_at(&[1], home()));
        let group = grouped(&mut c, &[1]);
        assert!(c.dispatch(Command::BeginTabCycle { group }).unwrap().is_empty());
        assert_eq!(c.cycling_group(), None);
        assert!(c.dispatch(Command::NextTabCycle).unwrap().is_empty());
    }

    #[test]
    fn test_end_cycle_prefers_landed_window() {
        let (mut c, _) = coordinator(windows_at(&[1, 2, 3], home()));
        let group = grouped(&mut c, &[1, 2, 3]);
        c.dispatch(Command::BeginTabCycle { group }).unwrap();
        c.dispatch(Command::NextTabCycle).unwrap();

        let events = c
            .dispatch(Command::EndTabCycle {
                landed: Some(WindowId(3)),
            })
            .unwrap();
        assert!(events.contains(&Event::CycleEnded {
            group,
            window: Some(WindowId(3))
        }));
        assert!(events.contains(&Event::ActiveChanged {
            group,
            window: WindowId(3)
        }));
        assert_eq!(
            c.registry().get(group).unwrap().focus_history()[0],
            WindowId(3)
        );
    }

    #[test]
    fn test_ownership_race_is_settled_on_focus() {
        let (mut c, _) = coordinator(windows_at(&[1, 2, 3], home()));
        let first = grouped(&mut c, &[1, 2]);
        let second = grouped(&mut c, &[3]);
        // A drop landed in `second` before `first` saw the detach
        let member = c.registry().get(first).unwrap().window(WindowId(2)).cloned().unwrap();
        c.registry.adopt_window(second, member, None);
        assert_eq!(c.registry().groups_for(WindowId(2)).len(), 2);

        let events = focus(&mut c, 2);

        assert_eq!(c.registry().groups_for(WindowId(2)).len(), 1);
        let owner = c.registry().group_for(WindowId(2)).unwrap().id();
        let loser = if owner == first { second } else { first };
        assert!(events.contains(&Event::WindowLeft {
            group: loser,
            window: WindowId(2)
        }));
    }
}
