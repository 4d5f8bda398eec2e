//! Scripted scenario replay against the in-memory window server.
//!
//! A script lists the windows on screen, optional configuration overrides
//! and timed steps. Each step either mutates the fake window server (what an
//! app or the user did) or dispatches a coordinator command. Deferred work is
//! run as the replay clock passes each deadline.
//!
//! ```json
//! {
//!   "visible_frame": { "x": 0, "y": 0, "width": 1440, "height": 900 },
//!   "windows": [
//!     { "id": 1, "frame": { "x": 100, "y": 10, "width": 800, "height": 600 } },
//!     { "id": 2, "frame": { "x": 100, "y": 10, "width": 800, "height": 600 } }
//!   ],
//!   "steps": [
//!     { "action": "dispatch", "command": { "CreateGroup": { "windows": [1, 2] } } },
//!     { "at_ms": 500, "action": "set_frame", "window": 2,
//!       "frame": { "x": 300, "y": 200, "width": 800, "height": 572 } },
//!     { "at_ms": 500, "action": "dispatch", "command": { "WindowMoved": { "window": 2 } } }
//!   ]
//! }
//! ```

use std::fs;
use std::time::{Duration, Instant};

use clap::ArgMatches;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use tabstack_core::bridge::fake::{FakeWindow, FakeWindowServer, RecordingSink};
use tabstack_core::{
    Clock, Command, Coordinator, Event, GroupId, GroupRegistry, ManualClock, Rect, SpaceId, Store,
    TabstackConfig, WindowId,
};

use crate::table::GroupTable;

/// Bound on drain rounds while catching the clock up, in case deferred work
/// keeps rescheduling itself at the current instant.
const MAX_DRAIN_ROUNDS: usize = 1_000;

#[derive(Debug, Deserialize)]
struct Scenario {
    visible_frame: Rect,
    #[serde(default)]
    windows: Vec<FakeWindow>,
    #[serde(default)]
    config: TabstackConfig,
    #[serde(default)]
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct Step {
    /// Milliseconds since the replay started. A step scheduled earlier than
    /// its predecessor runs immediately after it.
    #[serde(default)]
    at_ms: u64,
    #[serde(flatten)]
    action: Action,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum Action {
    Dispatch {
        command: Command,
    },
    Open {
        window: FakeWindow,
    },
    Close {
        window: WindowId,
    },
    SetFrame {
        window: WindowId,
        frame: Rect,
    },
    SetTitle {
        window: WindowId,
        title: String,
    },
    SetSpace {
        window: WindowId,
        space: Option<SpaceId>,
    },
    SetFullscreen {
        window: WindowId,
        fullscreen: bool,
    },
    MarkStale {
        window: WindowId,
        #[serde(default)]
        reacquirable: bool,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberSummary {
    pub id: WindowId,
    pub title: String,
    pub pinned: bool,
    pub separator: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub id: GroupId,
    pub name: Option<String>,
    pub space: SpaceId,
    pub frame: Rect,
    pub squeeze: f64,
    pub active: Option<WindowId>,
    pub windows: Vec<MemberSummary>,
}

#[derive(Debug, Serialize)]
struct StepFailure {
    step: usize,
    error: String,
}

#[derive(Debug, Serialize)]
struct ReplayReport {
    groups: Vec<GroupSummary>,
    failures: Vec<StepFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    events: Option<Vec<Event>>,
}

type ReplayCoordinator = Coordinator<FakeWindowServer, RecordingSink, ManualClock>;

pub(crate) fn handle_replay_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let script = matches
        .get_one::<String>("script")
        .ok_or("Script path is required")?;
    let json_output = matches.get_flag("json");
    let show_events = matches.get_flag("events");

    info!(
        event = "cli.replay_started",
        script = script.as_str(),
        json_output = json_output
    );

    let scenario = match load_scenario(script) {
        Ok(scenario) => scenario,
        Err(e) => {
            eprintln!("Could not load scenario '{}': {}", script, e);
            error!(event = "cli.replay_failed", script = script.as_str(), error = %e);
            return Err(e);
        }
    };
    let step_count = scenario.steps.len();

    let (coordinator, events, failures) = run_scenario(scenario);
    let report = ReplayReport {
        groups: summarize(coordinator.registry()),
        failures,
        events: show_events.then_some(events),
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        if let Some(events) = &report.events {
            for event in events {
                println!("{}", serde_json::to_string(event)?);
            }
            println!();
        }
        if report.groups.is_empty() {
            println!("No groups.");
        } else {
            GroupTable::new(&report.groups).print_table(&report.groups);
        }
        for failure in &report.failures {
            eprintln!("Step {} failed: {}", failure.step, failure.error);
        }
    }

    info!(
        event = "cli.replay_completed",
        steps = step_count,
        groups = report.groups.len(),
        failed_steps = report.failures.len()
    );

    if !report.failures.is_empty() {
        return Err(format!("{} of {} steps failed", report.failures.len(), step_count).into());
    }
    Ok(())
}

fn load_scenario(path: &str) -> Result<Scenario, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    let scenario: Scenario = serde_json::from_str(&content)?;
    scenario.config.validate()?;
    Ok(scenario)
}

fn run_scenario(scenario: Scenario) -> (ReplayCoordinator, Vec<Event>, Vec<StepFailure>) {
    let clock = ManualClock::new();
    let start = clock.now();
    let server = FakeWindowServer::with_windows(scenario.visible_frame, scenario.windows);
    let mut coordinator =
        Coordinator::with_clock(scenario.config, server, RecordingSink::new(), clock.clone());

    let mut events = Vec::new();
    let mut failures = Vec::new();
    for (index, step) in scenario.steps.into_iter().enumerate() {
        let at = start + Duration::from_millis(step.at_ms);
        advance_to(&mut coordinator, &clock, Some(at), &mut events);

        match apply(&mut coordinator, step.action) {
            Ok(mut emitted) => events.append(&mut emitted),
            Err(e) => {
                warn!(event = "cli.replay_step_failed", step = index, error = %e);
                failures.push(StepFailure {
                    step: index,
                    error: e.to_string(),
                });
            }
        }
    }
    advance_to(&mut coordinator, &clock, None, &mut events);

    (coordinator, events, failures)
}

/// Move the replay clock forward deadline by deadline, running deferred work
/// as it comes due. With no target the clock runs until nothing is pending.
fn advance_to(
    coordinator: &mut ReplayCoordinator,
    clock: &ManualClock,
    target: Option<Instant>,
    events: &mut Vec<Event>,
) {
    for _ in 0..MAX_DRAIN_ROUNDS {
        let Some(deadline) = coordinator.next_deadline() else {
            break;
        };
        if target.is_some_and(|t| deadline > t) {
            break;
        }
        if deadline > clock.now() {
            clock.set(deadline);
        }
        events.extend(coordinator.run_pending());
    }
    if let Some(target) = target
        && target > clock.now()
    {
        clock.set(target);
    }
}

fn apply(
    coordinator: &mut ReplayCoordinator,
    action: Action,
) -> Result<Vec<Event>, Box<dyn std::error::Error>> {
    let action = match action {
        Action::Dispatch { command } => return Ok(coordinator.dispatch(command)?),
        other => other,
    };
    let server = coordinator.server_mut();
    let known = match action {
        Action::Dispatch { .. } => true,
        Action::Open { window } => {
            server.open(window);
            true
        }
        Action::Close { window } => server.close(window).is_some(),
        Action::SetFrame { window, frame } => server.set_window_frame(window, frame),
        Action::SetTitle { window, title } => server.set_title(window, &title),
        Action::SetSpace { window, space } => server.set_space(window, space),
        Action::SetFullscreen { window, fullscreen } => server.set_fullscreen(window, fullscreen),
        Action::MarkStale {
            window,
            reacquirable,
        } => server.mark_stale(window, reacquirable),
    };
    if !known {
        return Err("window is not on screen".into());
    }
    Ok(Vec::new())
}

fn summarize(registry: &GroupRegistry) -> Vec<GroupSummary> {
    registry
        .groups()
        .map(|group| GroupSummary {
            id: group.id(),
            name: group.name.clone(),
            space: group.space_id,
            frame: group.frame,
            squeeze: group.squeeze_delta(),
            active: group.active_window_id(),
            windows: group
                .windows()
                .iter()
                .map(|w| MemberSummary {
                    id: w.id,
                    title: w.display_title().to_string(),
                    pinned: w.is_pinned,
                    separator: w.is_separator,
                })
                .collect(),
        })
        .collect()
}
