use std::collections::{HashMap, HashSet};
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::bridge::{BridgeError, PanelId, RenderSink, WindowServer};
use crate::config::TabstackConfig;
use crate::echo::EchoSuppressor;
use crate::frame::FrameReconciler;
use crate::geometry::Rect;
use crate::group::Group;
use crate::mru::{GlobalMru, MruEntry};
use crate::registry::GroupRegistry;
use crate::scheduler::{Clock, Deferred, Scheduler, SystemClock, TaskKey};
use crate::state::errors::DispatchError;
use crate::state::events::Event;
use crate::state::store::Store;
use crate::state::switcher::SwitcherSession;
use crate::state::types::Command;
use crate::window::{GroupId, SpaceId, WindowId, WindowRef};

/// Upper bound on drain passes in one `run_pending` call. Tasks may schedule
/// zero-delay follow-ups; this keeps a misbehaving loop from spinning.
const MAX_DRAIN_PASSES: usize = 8;

/// Owns all grouping state and reacts to commands and deferred work.
///
/// Single-threaded: every notification, intent and deferred task runs to
/// completion on the caller's thread. Deferred tasks are only executed from
/// [`Coordinator::run_pending`].
pub struct Coordinator<S, R, C = SystemClock> {
    pub(super) config: TabstackConfig,
    pub(super) server: S,
    pub(super) sink: R,
    pub(super) clock: C,
    pub(super) registry: GroupRegistry,
    pub(super) mru: GlobalMru,
    pub(super) echo: EchoSuppressor,
    pub(super) scheduler: Scheduler,
    pub(super) frames: FrameReconciler,
    /// Last frame we wrote per window, used to recognize our own echoes.
    pub(super) expected_frames: HashMap<WindowId, Rect>,
    /// Move/resize notifications held back while a quick re-check is pending.
    pub(super) deferred_frame_changes: HashSet<WindowId>,
    pub(super) panels: HashMap<GroupId, PanelId>,
    pub(super) panel_generation: u64,
    pub(super) switcher: Option<SwitcherSession>,
    pub(super) cycling: Option<GroupId>,
}

impl<S: WindowServer, R: RenderSink> Coordinator<S, R, SystemClock> {
    pub fn new(config: TabstackConfig, server: S, sink: R) -> Self {
        Self::with_clock(config, server, sink, SystemClock)
    }
}

impl<S: WindowServer, R: RenderSink, C: Clock> Coordinator<S, R, C> {
    pub fn with_clock(config: TabstackConfig, server: S, sink: R, clock: C) -> Self {
        let frames = FrameReconciler::new(
            config.tab_bar.height(),
            config.tolerance.position(),
            config.tolerance.frame_echo(),
        );
        let echo = EchoSuppressor::new(config.timing.echo_timeout());
        Self {
            config,
            server,
            sink,
            clock,
            registry: GroupRegistry::new(),
            mru: GlobalMru::new(),
            echo,
            scheduler: Scheduler::new(),
            frames,
            expected_frames: HashMap::new(),
            deferred_frame_changes: HashSet::new(),
            panels: HashMap::new(),
            panel_generation: 0,
            switcher: None,
            cycling: None,
        }
    }

    /// Replace the configuration, rebuilding the timing and geometry rules.
    ///
    /// Pending deferred work keeps the delays it was scheduled with.
    pub fn set_config(&mut self, config: TabstackConfig) -> Result<(), DispatchError> {
        config.validate()?;
        self.frames = FrameReconciler::new(
            config.tab_bar.height(),
            config.tolerance.position(),
            config.tolerance.frame_echo(),
        );
        self.echo = EchoSuppressor::new(config.timing.echo_timeout());
        self.config = config;
        info!(event = "core.state.config_applied");
        Ok(())
    }

    pub fn config(&self) -> &TabstackConfig {
        &self.config
    }

    pub fn registry(&self) -> &GroupRegistry {
        &self.registry
    }

    pub fn mru(&self) -> &GlobalMru {
        &self.mru
    }

    pub fn echo(&self) -> &EchoSuppressor {
        &self.echo
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn server(&self) -> &S {
        &self.server
    }

    /// Mutable access for simulating OS-side changes between commands.
    pub fn server_mut(&mut self) -> &mut S {
        &mut self.server
    }

    pub fn sink(&self) -> &R {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut R {
        &mut self.sink
    }

    pub fn panel_for(&self, group: GroupId) -> Option<PanelId> {
        self.panels.get(&group).copied()
    }

    pub fn expected_frame(&self, window: WindowId) -> Option<Rect> {
        self.expected_frames.get(&window).copied()
    }

    pub fn switcher(&self) -> Option<&SwitcherSession> {
        self.switcher.as_ref()
    }

    pub fn cycling_group(&self) -> Option<GroupId> {
        self.cycling
    }

    /// When the next deferred task becomes due, if any is pending.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_due()
    }

    /// Run every deferred task that is due, including zero-delay follow-ups
    /// scheduled by the tasks themselves.
    pub fn run_pending(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        for _ in 0..MAX_DRAIN_PASSES {
            let due = self.scheduler.take_due(self.now());
            if due.is_empty() {
                break;
            }
            for task in due {
                self.run_task(task, &mut events);
            }
        }
        events
    }

    fn run_task(&mut self, task: Deferred, events: &mut Vec<Event>) {
        let key = task.key();
        debug!(event = "core.scheduler.task_started", task = ?key);

        let result = match task {
            Deferred::EchoClear(ticket) => {
                if self.echo.clear_with(ticket) {
                    debug!(event = "core.echo.cleared");
                }
                Ok(())
            }
            Deferred::QuickRecheck {
                group,
                window,
                expected,
            } => self.quick_recheck(group, window, expected, events),
            Deferred::Resync(group) => self.resync_group(group, events),
            Deferred::SpaceCheck => {
                self.check_spaces(events);
                Ok(())
            }
            Deferred::PanelReorder { group, generation } => {
                self.reorder_panel(group, generation);
                Ok(())
            }
        };

        if let Err(e) = result {
            warn!(
                event = "core.scheduler.task_failed",
                task = ?key,
                error = %e
            );
        }
    }

    fn route(&mut self, cmd: Command, events: &mut Vec<Event>) -> Result<(), DispatchError> {
        match cmd {
            Command::WindowFocused { window, pid } => self.handle_focus(window, pid, events)?,
            Command::WindowMoved { window } | Command::WindowResized { window } => {
                self.handle_frame_changed(window, events)?
            }
            Command::WindowDestroyed { window } => self.purge_window(window, events),
            Command::TitleChanged { window } => self.handle_title_changed(window, events)?,
            Command::FullscreenChanged { window, fullscreen } => {
                self.handle_fullscreen_changed(window, fullscreen, events)?
            }
            Command::SpaceChanged => self.handle_space_changed(),
            Command::CreateGroup { windows, name } => self.create_group(&windows, name, events)?,
            Command::AddWindow { group, window, at } => {
                self.add_window(group, window, at, events)?
            }
            Command::ReleaseWindow { group, window } => {
                self.release_window(group, window, true, events)?
            }
            Command::RemoveWindow { group, window } => {
                self.release_window(group, window, false, events)?
            }
            Command::DestroyGroup { group } => self.destroy_group(group, events),
            Command::AddSeparator { group, at } => self.add_separator(group, at, events),
            Command::CloseSeparators { group } => self.close_separators(group, events),
            Command::SwitchTab { group, index } => self.switch_tab(group, index, events)?,
            Command::MoveTab { group, from, to } => self.move_tab(group, from, to, events),
            Command::MoveTabs { group, windows, to } => {
                self.move_tabs(group, &windows, to, events)
            }
            Command::SetPinned {
                group,
                window,
                pinned,
            } => self.set_pinned(group, window, pinned, events),
            Command::BeginTabCycle { group } => self.begin_tab_cycle(group, events)?,
            Command::NextTabCycle => self.next_tab_cycle(events)?,
            Command::EndTabCycle { landed } => self.finish_tab_cycle(landed, events)?,
            Command::SwitcherAdvance => self.switcher_step(true, events)?,
            Command::SwitcherRetreat => self.switcher_step(false, events)?,
            Command::SwitcherArrow { direction } => self.switcher_arrow(direction, events),
            Command::SwitcherCommit => self.switcher_commit(events)?,
            Command::SwitcherCancel => self.switcher_cancel(events),
            Command::ModifierReleased => self.modifier_released(events)?,
            Command::RenameGroup { group, name } => self.rename_group(group, name, events),
            Command::SetCustomTabName { window, name } => {
                self.set_custom_tab_name(window, name, events)
            }
        }
        Ok(())
    }

    pub(super) fn now(&self) -> Instant {
        self.clock.now()
    }

    fn pid_of(&self, window: WindowId) -> Option<i32> {
        self.registry
            .group_for(window)
            .and_then(|g| g.window(window))
            .and_then(|w| w.pid)
    }

    /// Run a bridge call against `window`, recovering a stale element once.
    ///
    /// A stale element is re-acquired from its owning process and the call is
    /// retried. When the window is gone, or cannot be re-acquired, it is
    /// purged as destroyed and `Ok(None)` is returned.
    pub(super) fn with_element<T>(
        &mut self,
        window: WindowId,
        pid: Option<i32>,
        events: &mut Vec<Event>,
        mut op: impl FnMut(&mut S) -> Result<T, BridgeError>,
    ) -> Result<Option<T>, BridgeError> {
        match op(&mut self.server) {
            Ok(value) => return Ok(Some(value)),
            Err(BridgeError::WindowNotFound { .. }) => {
                self.purge_window(window, events);
                return Ok(None);
            }
            Err(e) if e.is_stale() => {}
            Err(e) => return Err(e),
        }

        let pid = pid.or_else(|| self.pid_of(window));
        let reacquired = match pid {
            Some(pid) if self.server.window_exists(window) => {
                self.server.reacquire(window, pid).is_ok()
            }
            _ => false,
        };
        if !reacquired {
            warn!(
                event = "core.bridge.reacquire_failed",
                window_id = %window,
                pid = ?pid
            );
            self.purge_window(window, events);
            return Ok(None);
        }

        info!(event = "core.bridge.element_reacquired", window_id = %window);
        events.push(Event::ElementReacquired { window });
        match op(&mut self.server) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_stale() || matches!(e, BridgeError::WindowNotFound { .. }) => {
                self.purge_window(window, events);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub(super) fn read_frame(
        &mut self,
        window: WindowId,
        pid: Option<i32>,
        events: &mut Vec<Event>,
    ) -> Result<Option<Rect>, BridgeError> {
        self.with_element(window, pid, events, |server| server.frame(window))
    }

    /// Write a frame and remember it so the resulting notification is
    /// recognized as ours. Returns false if the window turned out to be gone.
    pub(super) fn write_frame(
        &mut self,
        window: WindowId,
        frame: Rect,
        events: &mut Vec<Event>,
    ) -> Result<bool, BridgeError> {
        self.expected_frames.insert(window, frame);
        let written = self
            .with_element(window, None, events, |server| server.set_frame(window, frame))?
            .is_some();
        debug!(
            event = "core.frame.write_issued",
            window_id = %window,
            written = written
        );
        Ok(written)
    }

    /// Raise a window with echo suppression armed for the focus it causes.
    pub(super) fn raise_under_echo(
        &mut self,
        window: WindowId,
        source: &'static str,
        events: &mut Vec<Event>,
    ) -> Result<bool, BridgeError> {
        let now = self.now();
        self.echo.begin(window, source, now);
        let raised = self
            .with_element(window, None, events, |server| server.raise(window))?
            .is_some();
        if !raised {
            self.echo.clear();
        }
        Ok(raised)
    }

    /// Bring a group member to the front and make it the group's MRU front.
    pub(super) fn activate(
        &mut self,
        group: GroupId,
        window: WindowId,
        source: &'static str,
        events: &mut Vec<Event>,
    ) -> Result<bool, BridgeError> {
        if !self.raise_under_echo(window, source, events)? {
            return Ok(false);
        }
        self.registry.record_focus(group, window);
        self.mru.touch(MruEntry::GroupWindow { group, window });
        self.sync_panel(group);
        Ok(true)
    }

    /// Create a group, clamp it below the tab bar and show its panel.
    pub(super) fn create_group_from(
        &mut self,
        windows: Vec<WindowRef>,
        frame: Rect,
        space: SpaceId,
        name: Option<String>,
        events: &mut Vec<Event>,
    ) -> Result<Option<GroupId>, BridgeError> {
        let ids: Vec<WindowId> = windows.iter().map(|w| w.id).collect();
        let Some(group) = self.registry.create_group(windows, frame, space, name) else {
            return Ok(None);
        };
        events.push(Event::GroupCreated {
            group,
            windows: ids,
        });
        if let Some(active) = self.registry.get(group).and_then(|g| g.active_window_id()) {
            self.mru.touch(MruEntry::GroupWindow {
                group,
                window: active,
            });
        }
        self.clamp_group(group, events)?;
        self.sync_panel(group);
        Ok(Some(group))
    }

    /// Position and order a group's panel, creating it on first use.
    pub(super) fn sync_panel(&mut self, group: GroupId) {
        let Some(g) = self.registry.get(group) else {
            return;
        };
        let frame = g.frame;
        let active = g.active_window().map(|w| (w.id, w.is_fullscreen));
        let maximized = self
            .server
            .visible_frame(&frame)
            .is_some_and(|visible| self.frames.is_maximized(&frame, &visible));

        let panel = *self
            .panels
            .entry(group)
            .or_insert_with(|| self.sink.create_panel(group));

        match active {
            Some((_, true)) => self.sink.order_out(panel),
            Some((window, false)) => {
                self.sink.position_above(panel, frame, maximized);
                self.sink.order_above(panel, window);
                self.sink.show(panel);
            }
            None => self.sink.order_out(panel),
        }
    }

    pub(super) fn schedule_panel_reorder(&mut self, group: GroupId) {
        self.panel_generation += 1;
        let now = self.now();
        self.scheduler.schedule(
            Deferred::PanelReorder {
                group,
                generation: self.panel_generation,
            },
            now,
            self.config.timing.panel_reorder(),
        );
    }

    fn reorder_panel(&mut self, group: GroupId, generation: u64) {
        if generation != self.panel_generation {
            debug!(
                event = "core.panel.reorder_skipped",
                group_id = %group,
                generation = generation,
                current = self.panel_generation
            );
            return;
        }
        let active = self.registry.get(group).and_then(|g| g.active_window_id());
        if let (Some(panel), Some(window)) = (self.panels.get(&group).copied(), active) {
            self.sink.order_above(panel, window);
            debug!(
                event = "core.panel.reordered",
                group_id = %group,
                window_id = %window
            );
        }
    }

    /// Tear down everything attached to a group that left the registry.
    pub(super) fn dissolve(&mut self, group: Group, events: &mut Vec<Event>) {
        let id = group.id();
        if let Some(panel) = self.panels.remove(&id) {
            self.sink.destroy_panel(panel);
        }
        self.scheduler.cancel_group(id);
        self.mru.remove_group(id);
        if self.cycling == Some(id) {
            self.cycling = None;
        }
        info!(
            event = "core.state.group_dissolved",
            group_id = %id,
            remaining_windows = group.managed_count()
        );
        events.push(Event::GroupDissolved { group: id });
    }

    /// Follow-up after a member left a surviving group: announce and raise a
    /// new active tab, then refresh the panel.
    pub(super) fn after_member_left(
        &mut self,
        group: GroupId,
        prior_active: Option<WindowId>,
        raise: bool,
        events: &mut Vec<Event>,
    ) -> Result<(), BridgeError> {
        let Some(active) = self.registry.get(group).and_then(|g| g.active_window_id()) else {
            return Ok(());
        };
        if prior_active != Some(active) {
            events.push(Event::ActiveChanged {
                group,
                window: active,
            });
            if raise {
                self.activate(group, active, "member_left", events)?;
            }
        }
        self.sync_panel(group);
        Ok(())
    }

    /// Forget a window everywhere: groups, MRU, expected frames, pending work.
    pub(super) fn purge_window(&mut self, window: WindowId, events: &mut Vec<Event>) {
        let prior: Vec<(GroupId, Option<WindowId>)> = self
            .registry
            .groups_for(window)
            .into_iter()
            .map(|g| (g, self.registry.get(g).and_then(|g| g.active_window_id())))
            .collect();

        let (touched, dissolved) = self.registry.remove_window_everywhere(window);
        self.mru.remove_window(window);
        self.expected_frames.remove(&window);
        self.scheduler.cancel(TaskKey::QuickRecheck(window));
        self.deferred_frame_changes.remove(&window);
        if let Some(session) = self.switcher.as_mut() {
            session.forget_window(window);
        }

        info!(
            event = "core.state.window_purged",
            window_id = %window,
            group_count = prior.len()
        );
        events.push(Event::WindowDestroyed { window });

        for group in dissolved {
            events.push(Event::WindowLeft {
                group: group.id(),
                window,
            });
            self.dissolve(group, events);
        }
        for group in touched {
            events.push(Event::WindowLeft { group, window });
            let prior_active = prior
                .iter()
                .find(|(g, _)| *g == group)
                .and_then(|(_, active)| *active);
            if let Err(e) = self.after_member_left(group, prior_active, true, events) {
                warn!(
                    event = "core.state.activate_failed",
                    group_id = %group,
                    error = %e
                );
            }
        }
    }
}

impl<S: WindowServer, R: RenderSink, C: Clock> Store for Coordinator<S, R, C> {
    type Error = DispatchError;

    fn dispatch(&mut self, cmd: Command) -> Result<Vec<Event>, DispatchError> {
        debug!(event = "core.state.dispatch_started", command = ?cmd);

        let mut events = Vec::new();
        let result = self.route(cmd, &mut events).map(|()| events);

        match &result {
            Ok(events) => info!(
                event = "core.state.dispatch_completed",
                event_count = events.len()
            ),
            Err(e) => error!(event = "core.state.dispatch_failed", error = %e),
        }
        result
    }
}


#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::test_support::*;
    use super::*;
    use crate::bridge::fake::RecordingSink;
    use crate::bridge::fake::{FakeWindowServer, RenderCommand};
    use crate::errors::TabstackError;

    #[test]
    fn test_coordinator_implements_store_trait() {
        fn assert_store<T: Store>() {}
        assert_store::<TestCoordinator>();
        assert_store::<Coordinator<FakeWindowServer, RecordingSink>>();
    }

    #[test]
    fn test_dispatch_on_missing_group_is_a_silent_no_op() {
        let (mut c, _) = coordinator(windows_at(&[1], home()));
        let events = c
            .dispatch(Command::SwitchTab {
                group: GroupId(99),
                index: 0,
            })
            .unwrap();
        assert!(events.is_empty());
        assert!(c.registry().is_empty());
    }

    #[test]
    fn test_create_group_syncs_members_and_shows_panel() {
        let (mut c, _) = coordinator(vec![
            crate::bridge::fake::FakeWindow::new(1, home()),
            crate::bridge::fake::FakeWindow::new(2, Rect::new(300.0, 200.0, 500.0, 400.0)),
        ]);
        let group = grouped(&mut c, &[1, 2]);

        assert_eq!(c.server().window(WindowId(2)).unwrap().frame, home());
        let panel = c.panel_for(group).unwrap();
        assert_eq!(c.sink().panel_for(group), Some(panel));
        assert_eq!(c.sink().last_position(panel), Some(home()));
        assert_eq!(c.sink().last_ordered_above(panel), Some(WindowId(1)));
        assert!(c.sink().is_shown(panel));
        assert_eq!(c.mru().front(), Some(&MruEntry::GroupWindow {
            group,
            window: WindowId(1)
        }));
    }

    #[test]
    fn test_create_group_rejects_owned_window() {
        let (mut c, _) = coordinator(windows_at(&[1, 2, 3], home()));
        grouped(&mut c, &[1, 2]);
        let events = c
            .dispatch(Command::CreateGroup {
                windows: vec![WindowId(2), WindowId(3)],
                name: None,
            })
            .unwrap();
        assert!(events.is_empty());
        assert_eq!(c.registry().len(), 1);
    }

    #[test]
    fn test_create_group_with_unknown_window_is_a_no_op() {
        let (mut c, _) = coordinator(windows_at(&[1], home()));
        let events = c
            .dispatch(Command::CreateGroup {
                windows: vec![WindowId(1), WindowId(42)],
                name: None,
            })
            .unwrap();
        assert!(events.is_empty());
        assert!(c.registry().is_empty());
    }

    #[test]
    fn test_destroying_last_member_dissolves_group_and_panel() {
        let (mut c, _) = coordinator(windows_at(&[1], home()));
        let group = grouped(&mut c, &[1]);
        c.server_mut().close(WindowId(1));

        let events = c
            .dispatch(Command::WindowDestroyed {
                window: WindowId(1),
            })
            .unwrap();

        assert!(events.contains(&Event::GroupDissolved { group }));
        assert!(c.registry().get(group).is_none());
        assert!(c.registry().group_for(WindowId(1)).is_none());
        assert_eq!(c.sink().panel_count(), 0);
        assert!(c.panel_for(group).is_none());
        assert!(c.mru().is_empty());
    }

    #[test]
    fn test_destroying_active_member_raises_new_active() {
        let (mut c, _) = coordinator(windows_at(&[1, 2, 3], home()));
        let group = grouped(&mut c, &[1, 2, 3]);
        c.server_mut().clear_log();
        c.server_mut().close(WindowId(1));

        let events = c
            .dispatch(Command::WindowDestroyed {
                window: WindowId(1),
            })
            .unwrap();

        let active = c.registry().get(group).unwrap().active_window_id().unwrap();
        assert!(events.contains(&Event::ActiveChanged {
            group,
            window: active
        }));
        assert_eq!(c.server().raised(), &[active]);
    }

    #[test]
    fn test_stale_element_is_reacquired() {
        let (mut c, _) = coordinator(windows_at(&[1, 2], home()));
        grouped(&mut c, &[1, 2]);
        let moved = Rect::new(200.0, 150.0, 800.0, 600.0);
        c.server_mut().set_window_frame(WindowId(1), moved);
        c.server_mut().mark_stale(WindowId(1), true);

        let events = c
            .dispatch(Command::WindowMoved {
                window: WindowId(1),
            })
            .unwrap();

        assert_eq!(events[0], Event::ElementReacquired {
            window: WindowId(1)
        });
        assert_eq!(c.server().window(WindowId(2)).unwrap().frame, moved);
    }

    #[test]
    fn test_unrecoverable_stale_element_is_purged() {
        let (mut c, _) = coordinator(windows_at(&[1, 2], home()));
        let group = grouped(&mut c, &[1, 2]);
        c.server_mut().mark_stale(WindowId(2), false);

        let events = c
            .dispatch(Command::WindowResized {
                window: WindowId(2),
            })
            .unwrap();

        assert!(events.contains(&Event::WindowDestroyed {
            window: WindowId(2)
        }));
        assert!(events.contains(&Event::WindowLeft {
            group,
            window: WindowId(2)
        }));
        assert_eq!(
            ids(&c.registry().get(group).unwrap().managed_ids()),
            vec![1]
        );
    }

    #[test]
    fn test_panel_reorder_drops_stale_generation() {
        let (mut c, clock) = coordinator(windows_at(&[1, 2, 3, 4], home()));
        let first = grouped(&mut c, &[1, 2]);
        let second = grouped(&mut c, &[3, 4]);
        c.sink_mut().clear();

        c.dispatch(Command::WindowFocused {
            window: WindowId(2),
            pid: None,
        })
        .unwrap();
        c.dispatch(Command::WindowFocused {
            window: WindowId(4),
            pid: None,
        })
        .unwrap();
        clock.advance(Duration::from_millis(50));
        c.run_pending();

        let first_panel = c.panel_for(first).unwrap();
        let second_panel = c.panel_for(second).unwrap();
        assert_eq!(c.sink().last_ordered_above(first_panel), None);
        assert_eq!(c.sink().last_ordered_above(second_panel), Some(WindowId(4)));
        assert!(matches!(
            c.sink().commands().last(),
            Some(RenderCommand::OrderAbove { panel, .. }) if *panel == second_panel
        ));
    }

    #[test]
    fn test_set_config_rejects_invalid_values() {
        let (mut c, _) = coordinator(Vec::new());
        let mut config = TabstackConfig::default();
        config.tab_bar.height = Some(-1.0);
        let err = c.set_config(config).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIGURATION");

        let mut config = TabstackConfig::default();
        config.tab_bar.height = Some(40.0);
        c.set_config(config).unwrap();
        assert_eq!(c.config().tab_bar.height(), 40.0);
    }
}
