//! Group lifecycle and tab bar intents.

use tracing::{debug, info};

use crate::bridge::{BridgeError, RenderSink, WindowServer};
use crate::scheduler::Clock;
use crate::state::dispatch::Coordinator;
use crate::state::events::Event;
use crate::window::{GroupId, SpaceId, WindowId, WindowRef};

fn normalize_name(name: Option<String>) -> Option<String> {
    name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

impl<S: WindowServer, R: RenderSink, C: Clock> Coordinator<S, R, C> {
    pub(super) fn create_group(
        &mut self,
        windows: &[WindowId],
        name: Option<String>,
        events: &mut Vec<Event>,
    ) -> Result<(), BridgeError> {
        let snapshot = self.server.snapshot()?;
        let mut members = Vec::with_capacity(windows.len());
        for id in windows {
            let Some(live) = snapshot.iter().find(|w| w.id == *id) else {
                debug!(
                    event = "core.state.create_rejected",
                    window_id = %id,
                    reason = "not_on_screen"
                );
                return Ok(());
            };
            members.push(WindowRef::from(live));
        }
        let Some(first) = members.first() else {
            return Ok(());
        };
        let frame = first.frame;
        let space = self.server.space_id(first.id).unwrap_or(SpaceId::UNKNOWN);

        self.create_group_from(members, frame, space, normalize_name(name), events)?;
        Ok(())
    }

    pub(super) fn add_window(
        &mut self,
        group: GroupId,
        window: WindowId,
        at: Option<usize>,
        events: &mut Vec<Event>,
    ) -> Result<(), BridgeError> {
        let Some(target) = self.registry.get(group) else {
            return Ok(());
        };
        if target.contains(window) {
            return Ok(());
        }

        let moved = match self.registry.group_for(window).map(|g| g.id()) {
            Some(source) => self.detach(source, window, events)?,
            None => None,
        };
        let mut member = match moved {
            Some(member) => member,
            None => {
                let snapshot = self.server.snapshot()?;
                match snapshot.iter().find(|w| w.id == window) {
                    Some(live) => WindowRef::from(live),
                    None => return Err(BridgeError::WindowNotFound { window }),
                }
            }
        };
        member.is_pinned = false;
        let fullscreen = member.is_fullscreen;

        let Some(frame) = self.registry.get(group).map(|g| g.frame) else {
            return Ok(());
        };
        if !self.registry.add_window(group, member, at) {
            return Ok(());
        }
        info!(
            event = "core.state.window_joined",
            group_id = %group,
            window_id = %window
        );
        events.push(Event::WindowJoined { group, window });

        if !fullscreen {
            self.write_frame(window, frame, events)?;
        }
        if let Some(g) = self.registry.get_mut(group)
            && g.active_window_id() != Some(window)
            && g.switch_to_window(window)
        {
            events.push(Event::ActiveChanged { group, window });
        }
        self.activate(group, window, "window_added", events)?;
        Ok(())
    }

    /// Take a member out of `source`, cleaning up the group it leaves.
    fn detach(
        &mut self,
        source: GroupId,
        window: WindowId,
        events: &mut Vec<Event>,
    ) -> Result<Option<WindowRef>, BridgeError> {
        let prior_active = self.registry.get(source).and_then(|g| g.active_window_id());
        let Some(outcome) = self.registry.release_window(source, window) else {
            return Ok(None);
        };
        events.push(Event::WindowLeft {
            group: source,
            window,
        });
        match outcome.dissolved {
            Some(dissolved) => self.dissolve(dissolved, events),
            None => self.after_member_left(source, prior_active, true, events)?,
        }
        Ok(outcome.released.into_iter().next())
    }

    /// Remove a member. With `rehome` the window becomes a solo group at its
    /// current frame, as when a tab is dragged out of the bar.
    pub(super) fn release_window(
        &mut self,
        group: GroupId,
        window: WindowId,
        rehome: bool,
        events: &mut Vec<Event>,
    ) -> Result<(), BridgeError> {
        let Some(g) = self.registry.get(group) else {
            return Ok(());
        };
        if !g.contains_managed(window) {
            return Ok(());
        }
        if rehome && g.managed_count() == 1 {
            debug!(
                event = "core.state.release_skipped",
                group_id = %group,
                reason = "already_solo"
            );
            return Ok(());
        }
        let space = g.space_id;
        let group_frame = g.frame;

        let live = if rehome {
            match self.read_frame(window, None, events)? {
                Some(frame) => frame,
                None => return Ok(()),
            }
        } else {
            group_frame
        };

        let Some(mut member) = self.detach(group, window, events)? else {
            return Ok(());
        };
        self.mru.remove_window(window);
        if !rehome {
            return Ok(());
        }

        member.is_pinned = false;
        member.frame = live;
        self.create_group_from(vec![member], live, space, None, events)?;
        Ok(())
    }

    pub(super) fn destroy_group(&mut self, group: GroupId, events: &mut Vec<Event>) {
        if let Some(dissolved) = self.registry.take_group(group) {
            self.dissolve(dissolved, events);
        }
    }

    pub(super) fn add_separator(&mut self, group: GroupId, at: Option<usize>, events: &mut Vec<Event>) {
        if let Some(separator) = self.registry.add_separator(group, at) {
            events.push(Event::SeparatorAdded { group, separator });
            self.sync_panel(group);
        }
    }

    pub(super) fn close_separators(&mut self, group: GroupId, events: &mut Vec<Event>) {
        let Some(g) = self.registry.get_mut(group) else {
            return;
        };
        let separators: Vec<WindowId> = g
            .windows()
            .iter()
            .filter(|w| w.is_separator)
            .map(|w| w.id)
            .collect();
        if separators.is_empty() {
            return;
        }
        let count = g.remove_windows(&separators).len();
        events.push(Event::SeparatorsClosed { group, count });
        self.sync_panel(group);
    }

    pub(super) fn move_tab(&mut self, group: GroupId, from: usize, to: usize, events: &mut Vec<Event>) {
        if self
            .registry
            .get_mut(group)
            .is_some_and(|g| g.move_tab(from, to))
        {
            events.push(Event::TabsReordered { group });
        }
    }

    pub(super) fn move_tabs(
        &mut self,
        group: GroupId,
        windows: &[WindowId],
        to: usize,
        events: &mut Vec<Event>,
    ) {
        if self
            .registry
            .get_mut(group)
            .is_some_and(|g| g.move_tabs(windows, to))
        {
            events.push(Event::TabsReordered { group });
        }
    }

    pub(super) fn set_pinned(
        &mut self,
        group: GroupId,
        window: WindowId,
        pinned: bool,
        events: &mut Vec<Event>,
    ) {
        if self
            .registry
            .get_mut(group)
            .is_some_and(|g| g.set_pinned(window, pinned))
        {
            events.push(Event::PinChanged {
                group,
                window,
                pinned,
            });
        }
    }

    pub(super) fn rename_group(
        &mut self,
        group: GroupId,
        name: Option<String>,
        events: &mut Vec<Event>,
    ) {
        let name = normalize_name(name);
        let Some(g) = self.registry.get_mut(group) else {
            return;
        };
        if g.name == name {
            return;
        }
        g.name = name.clone();
        events.push(Event::GroupRenamed { group, name });
    }

    pub(super) fn set_custom_tab_name(
        &mut self,
        window: WindowId,
        name: Option<String>,
        events: &mut Vec<Event>,
    ) {
        let name = normalize_name(name);
        if self
            .registry
            .update_window_custom_tab_name(window, name.as_deref())
        {
            events.push(Event::CustomTabNameChanged { window, name });
        }
    }
}
