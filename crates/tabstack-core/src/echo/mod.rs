//! Commit-echo suppression.
//!
//! Every raise or activate we issue comes back as one or more focus
//! notifications. While a suppression is armed those notifications are
//! swallowed so they cannot reorder MRU history or move the active tab.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::window::WindowId;

#[derive(Debug, Clone, PartialEq)]
pub struct Suppression {
    pub target: WindowId,
    pub deadline: Instant,
    pub source: &'static str,
}

/// Handle for a deferred clear. Only clears the suppression it was issued
/// for; a newer `begin` invalidates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoVerdict {
    /// Not suppressing; the notification may mutate state.
    Allow,
    /// Swallow the notification.
    Suppress,
    /// Swallow it and run the ticket on the next turn of the event loop.
    SuppressThenClear(ClearTicket),
}

impl EchoVerdict {
    pub fn is_suppressed(&self) -> bool {
        !matches!(self, EchoVerdict::Allow)
    }
}

#[derive(Debug)]
pub struct EchoSuppressor {
    state: Option<Suppression>,
    timeout: Duration,
    generation: u64,
    clear_pending: bool,
}

impl EchoSuppressor {
    pub fn new(timeout: Duration) -> Self {
        Self {
            state: None,
            timeout,
            generation: 0,
            clear_pending: false,
        }
    }

    pub fn state(&self) -> Option<&Suppression> {
        self.state.as_ref()
    }

    pub fn is_suppressing(&self) -> bool {
        self.state.is_some()
    }

    /// Arm suppression for `target` until `now + timeout`.
    pub fn begin(&mut self, target: WindowId, source: &'static str, now: Instant) {
        self.generation += 1;
        self.clear_pending = false;
        self.state = Some(Suppression {
            target,
            deadline: now + self.timeout,
            source,
        });
        debug!(
            event = "core.echo.suppression_started",
            window_id = %target,
            source = source,
            timeout_ms = self.timeout.as_millis() as u64
        );
    }

    /// Gate for every focus-driven mutation.
    pub fn should_suppress(&mut self, window: WindowId, now: Instant) -> EchoVerdict {
        let Some(state) = &self.state else {
            return EchoVerdict::Allow;
        };

        if now >= state.deadline {
            debug!(
                event = "core.echo.suppression_expired",
                window_id = %state.target,
                source = state.source
            );
            self.clear();
            return EchoVerdict::Allow;
        }

        if window != state.target {
            // Unrelated focus while a commit is in flight; keep the deadline
            debug!(
                event = "core.echo.suppressed_other",
                window_id = %window,
                target = %state.target,
                source = state.source
            );
            return EchoVerdict::Suppress;
        }

        debug!(
            event = "core.echo.suppressed",
            window_id = %window,
            source = state.source
        );
        if self.clear_pending {
            EchoVerdict::Suppress
        } else {
            self.clear_pending = true;
            EchoVerdict::SuppressThenClear(ClearTicket(self.generation))
        }
    }

    /// Run a deferred clear. Stale tickets are ignored.
    pub fn clear_with(&mut self, ticket: ClearTicket) -> bool {
        if ticket.0 != self.generation || self.state.is_none() {
            return false;
        }
        self.clear();
        true
    }

    pub fn clear(&mut self) {
        self.state = None;
        self.clear_pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_millis(300);

    #[test]
    fn test_idle_allows() {
        let mut echo = EchoSuppressor::new(TIMEOUT);
        assert_eq!(
            echo.should_suppress(WindowId(5), Instant::now()),
            EchoVerdict::Allow
        );
    }

    #[test]
    fn test_target_is_suppressed_until_scheduled_clear_runs() {
        let t0 = Instant::now();
        let mut echo = EchoSuppressor::new(TIMEOUT);
        echo.begin(WindowId(5), "switcher_commit", t0);

        let first = echo.should_suppress(WindowId(5), t0);
        let EchoVerdict::SuppressThenClear(ticket) = first else {
            panic!("expected a scheduled clear, got {:?}", first);
        };
        // Same burst: still suppressed, no second ticket
        assert_eq!(echo.should_suppress(WindowId(5), t0), EchoVerdict::Suppress);

        assert!(echo.clear_with(ticket));
        assert_eq!(echo.should_suppress(WindowId(5), t0), EchoVerdict::Allow);
    }

    #[test]
    fn test_other_window_is_suppressed_without_touching_state() {
        let t0 = Instant::now();
        let mut echo = EchoSuppressor::new(TIMEOUT);
        echo.begin(WindowId(5), "tab_switch", t0);
        let before = echo.state().cloned();

        assert_eq!(echo.should_suppress(WindowId(6), t0), EchoVerdict::Suppress);
        assert_eq!(echo.state().cloned(), before);
    }

    #[test]
    fn test_expired_deadline_auto_clears() {
        let t0 = Instant::now();
        let mut echo = EchoSuppressor::new(TIMEOUT);
        echo.begin(WindowId(5), "tab_switch", t0);
        assert_eq!(
            echo.should_suppress(WindowId(6), t0 + TIMEOUT),
            EchoVerdict::Allow
        );
        assert!(!echo.is_suppressing());
    }

    #[test]
    fn test_stale_ticket_does_not_clear_newer_suppression() {
        let t0 = Instant::now();
        let mut echo = EchoSuppressor::new(TIMEOUT);
        echo.begin(WindowId(5), "tab_switch", t0);
        let EchoVerdict::SuppressThenClear(ticket) = echo.should_suppress(WindowId(5), t0) else {
            panic!("expected a scheduled clear");
        };

        echo.begin(WindowId(7), "tab_cycle", t0);
        assert!(!echo.clear_with(ticket));
        assert!(echo.is_suppressing());
        assert!(echo.should_suppress(WindowId(7), t0).is_suppressed());
    }

    #[test]
    fn test_clear_is_unconditional() {
        let t0 = Instant::now();
        let mut echo = EchoSuppressor::new(TIMEOUT);
        echo.begin(WindowId(5), "tab_switch", t0);
        echo.clear();
        assert_eq!(echo.should_suppress(WindowId(5), t0), EchoVerdict::Allow);
    }
}
