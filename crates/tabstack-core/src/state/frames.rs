//! Move/resize handling: echo recognition, clamping, mirroring and resync.

use tracing::{debug, info, warn};

use crate::bridge::{BridgeError, RenderSink, WindowServer};
use crate::frame::{ClampAdjustment, ClampOutcome};
use crate::geometry::Rect;
use crate::scheduler::{Clock, Deferred, TaskKey};
use crate::state::dispatch::Coordinator;
use crate::state::events::Event;
use crate::window::{GroupId, WindowId};

impl<S: WindowServer, R: RenderSink, C: Clock> Coordinator<S, R, C> {
    pub(super) fn handle_frame_changed(
        &mut self,
        window: WindowId,
        events: &mut Vec<Event>,
    ) -> Result<(), BridgeError> {
        if !self.registry.is_owned(window) {
            return Ok(());
        }
        if self.scheduler.is_pending(TaskKey::QuickRecheck(window)) {
            // The re-check owns this window until it has run, then replays it
            debug!(event = "core.frame.change_deferred", window_id = %window);
            self.deferred_frame_changes.insert(window);
            return Ok(());
        }

        let Some(live) = self.read_frame(window, None, events)? else {
            return Ok(());
        };
        let Some(group) = self.resolve_owner(window, Some(live), events) else {
            return Ok(());
        };

        if self
            .expected_frames
            .get(&window)
            .is_some_and(|expected| self.frames.is_frame_echo(expected, &live))
        {
            self.expected_frames.remove(&window);
            debug!(event = "core.frame.echo_consumed", window_id = %window);
            return Ok(());
        }
        self.expected_frames.remove(&window);

        self.adopt_member_frame(group, window, live, events);
        Ok(())
    }

    /// Take a member's user-made frame as the group frame, clamped, and
    /// mirror it to the other members.
    fn adopt_member_frame(
        &mut self,
        group: GroupId,
        window: WindowId,
        live: Rect,
        events: &mut Vec<Event>,
    ) {
        let Some(g) = self.registry.get(group) else {
            return;
        };
        if g.window(window).is_some_and(|w| w.is_fullscreen) {
            return;
        }
        if g.frame.edges_within(&live, self.frames.echo_tolerance) {
            return;
        }
        let delta = g.squeeze_delta();

        let outcome = match self.server.visible_frame(&live) {
            Some(visible) => self.frames.clamp(live, visible, delta),
            None => ClampOutcome {
                frame: live,
                squeeze_delta: delta,
                adjustment: ClampAdjustment::Unchanged,
            },
        };
        let frame = outcome.frame;
        info!(
            event = "core.frame.user_change_detected",
            group_id = %group,
            window_id = %window,
            adjustment = ?outcome.adjustment
        );

        self.apply_group_frame(group, outcome, events);
        if outcome.changed()
            && self.write_member_frame(group, window, frame, events)
            && outcome.adjustment == ClampAdjustment::Squeezed
        {
            self.schedule_recheck(group, window, frame);
        }

        let targets = self
            .registry
            .get(group)
            .map(|g| self.frames.mirror_targets(g, window))
            .unwrap_or_default();
        for target in targets {
            self.write_member_frame(group, target, frame, events);
        }

        events.push(Event::FrameSynced { group, frame });
        self.sync_panel(group);
        let now = self.now();
        self.scheduler
            .schedule(Deferred::Resync(group), now, self.config.timing.resync());
    }

    /// Write one member's frame. A failure is logged and only costs that
    /// member its update.
    fn write_member_frame(
        &mut self,
        group: GroupId,
        window: WindowId,
        frame: Rect,
        events: &mut Vec<Event>,
    ) -> bool {
        match self.write_frame(window, frame, events) {
            Ok(written) => written,
            Err(e) => {
                self.expected_frames.remove(&window);
                warn!(
                    event = "core.frame.mirror_failed",
                    group_id = %group,
                    window_id = %window,
                    error = %e
                );
                false
            }
        }
    }

    fn apply_group_frame(&mut self, group: GroupId, outcome: ClampOutcome, events: &mut Vec<Event>) {
        let Some(g) = self.registry.get_mut(group) else {
            return;
        };
        g.frame = outcome.frame;
        if g.record_squeeze(outcome.squeeze_delta) {
            events.push(Event::FrameSqueezed {
                group,
                delta: outcome.squeeze_delta,
            });
        }
    }

    fn schedule_recheck(&mut self, group: GroupId, window: WindowId, expected: Rect) {
        let now = self.now();
        self.scheduler.schedule(
            Deferred::QuickRecheck {
                group,
                window,
                expected,
            },
            now,
            self.config.timing.quick_recheck(),
        );
    }

    /// Clamp a group's frame below the tab bar and bring every member to it.
    pub(super) fn clamp_group(
        &mut self,
        group: GroupId,
        events: &mut Vec<Event>,
    ) -> Result<(), BridgeError> {
        let Some(g) = self.registry.get(group) else {
            return Ok(());
        };
        let current = g.frame;
        let outcome = match self.server.visible_frame(&current) {
            Some(visible) => self.frames.clamp(current, visible, g.squeeze_delta()),
            None => ClampOutcome {
                frame: current,
                squeeze_delta: g.squeeze_delta(),
                adjustment: ClampAdjustment::Unchanged,
            },
        };
        let members: Vec<WindowId> = g
            .managed_windows()
            .filter(|w| !w.is_fullscreen)
            .map(|w| w.id)
            .collect();

        self.apply_group_frame(group, outcome, events);
        for window in members {
            if self.write_member_frame(group, window, outcome.frame, events)
                && outcome.adjustment == ClampAdjustment::Squeezed
            {
                self.schedule_recheck(group, window, outcome.frame);
            }
        }
        events.push(Event::FrameSynced {
            group,
            frame: outcome.frame,
        });
        Ok(())
    }

    /// Re-read a window after its first squeeze and re-issue the position
    /// once if the app put it back.
    pub(super) fn quick_recheck(
        &mut self,
        group: GroupId,
        window: WindowId,
        expected: Rect,
        events: &mut Vec<Event>,
    ) -> Result<(), BridgeError> {
        let deferred_change = self.deferred_frame_changes.remove(&window);
        if !self
            .registry
            .get(group)
            .is_some_and(|g| g.contains_managed(window))
        {
            return Ok(());
        }
        let Some(live) = self.read_frame(window, None, events)? else {
            return Ok(());
        };
        if !self.frames.needs_position_retry(&expected, &live) {
            debug!(event = "core.frame.recheck_passed", window_id = %window);
            if deferred_change {
                self.expected_frames.remove(&window);
                self.adopt_member_frame(group, window, live, events);
            }
            return Ok(());
        }

        warn!(
            event = "core.frame.position_retried",
            window_id = %window,
            expected_y = expected.y,
            live_y = live.y
        );
        self.expected_frames.insert(window, live.with_origin(expected.origin()));
        let retried = self
            .with_element(window, None, events, |server| {
                server.set_position(window, expected.origin())
            })?
            .is_some();
        if retried {
            events.push(Event::PositionRetried { window });
            if deferred_change {
                // Keep whatever size the user gave it while the re-check was pending
                self.adopt_member_frame(group, window, live.with_origin(expected.origin()), events);
            }
        }
        Ok(())
    }

    /// Bring drifted members back to the group frame once moves have settled.
    pub(super) fn resync_group(
        &mut self,
        group: GroupId,
        events: &mut Vec<Event>,
    ) -> Result<(), BridgeError> {
        let Some(g) = self.registry.get(group) else {
            return Ok(());
        };
        let frame = g.frame;
        let members: Vec<WindowId> = g
            .managed_windows()
            .filter(|w| !w.is_fullscreen)
            .map(|w| w.id)
            .collect();

        let mut corrected = 0;
        for window in members {
            let live = match self.read_frame(window, None, events) {
                Ok(Some(live)) => live,
                Ok(None) => continue,
                Err(e) => {
                    warn!(
                        event = "core.frame.resync_read_failed",
                        group_id = %group,
                        window_id = %window,
                        error = %e
                    );
                    continue;
                }
            };
            if !live.edges_within(&frame, self.frames.echo_tolerance)
                && self.write_member_frame(group, window, frame, events)
            {
                corrected += 1;
            }
        }

        debug!(
            event = "core.frame.resync_completed",
            group_id = %group,
            corrected = corrected
        );
        if corrected > 0 {
            events.push(Event::FrameSynced { group, frame });
        }
        self.sync_panel(group);
        Ok(())
    }

    pub(super) fn handle_fullscreen_changed(
        &mut self,
        window: WindowId,
        fullscreen: bool,
        events: &mut Vec<Event>,
    ) -> Result<(), BridgeError> {
        let mut changed = false;
        for group in self.registry.groups_for(window) {
            let Some(g) = self.registry.get_mut(group) else {
                continue;
            };
            let frame = g.frame;
            match g.window_mut(window) {
                Some(member) if member.is_fullscreen != fullscreen => {
                    member.is_fullscreen = fullscreen;
                }
                _ => continue,
            }
            changed = true;
            if !fullscreen {
                self.write_frame(window, frame, events)?;
            }
            self.sync_panel(group);
        }
        if changed {
            info!(
                event = "core.frame.fullscreen_changed",
                window_id = %window,
                fullscreen = fullscreen
            );
            events.push(Event::FullscreenChanged { window, fullscreen });
        }
        Ok(())
    }

    pub(super) fn handle_title_changed(
        &mut self,
        window: WindowId,
        events: &mut Vec<Event>,
    ) -> Result<(), BridgeError> {
        if !self.registry.is_owned(window) {
            return Ok(());
        }
        let Some(title) = self.with_element(window, None, events, |server| server.title(window))?
        else {
            return Ok(());
        };
        if self.registry.update_window_title(window, &title) {
            events.push(Event::TitleChanged { window, title });
        }
        Ok(())
    }
}
