/// Session transitions: the only code that mutates a `Session`.
///
/// Entry points, one per external stimulus:
///   - `tick(now)`           timers: countdown, clock display, move repeat
///   - `press(dir, now)`     direction key down
///   - `release(dir)`        direction key up
///   - `proceed(now)`        the "continue" key
///
/// Every entry point runs to completion and returns the events it produced.
/// An empty result means nothing observable changed.

use std::time::Instant;

use crate::domain::movement::{self, Direction};
use super::event::GameEvent;
use super::session::{Phase, Session};

// ══════════════════════════════════════════════════════════════
// Entry points
// ══════════════════════════════════════════════════════════════

/// Fire every timer due at or before `now`, in purpose order.
pub fn tick(s: &mut Session, now: Instant) -> Vec<GameEvent> {
    let mut events = Vec::new();
    resolve_countdown(s, now, &mut events);
    resolve_clock(s, now, &mut events);
    resolve_repeat(s, now, &mut events);
    events
}

/// Direction key down.
///
/// Cancels any previous repeat, takes one step immediately, then arms the
/// repeat timer so the step recurs every `move_speed` while held.
/// During the countdown the direction is only remembered; the run start
/// moves with it if it is still held. Ignored once completed.
pub fn press(s: &mut Session, dir: Direction, now: Instant) -> Vec<GameEvent> {
    let mut events = Vec::new();
    match s.phase {
        Phase::Running => {}
        Phase::CountingDown => {
            s.active_dir = Some(dir);
            return events;
        }
        Phase::Completed => return events,
    }

    s.repeat_timer.cancel();
    s.active_dir = Some(dir);
    step_player(s, dir, now, &mut events);

    // Completion cancels input; don't re-arm behind its back.
    if s.phase == Phase::Running {
        s.repeat_timer.start(now);
    }
    events
}

/// Direction key up. Only the active direction stops the repeat.
pub fn release(s: &mut Session, dir: Direction) {
    if s.active_dir == Some(dir) {
        s.repeat_timer.cancel();
        s.active_dir = None;
    }
}

/// The "continue" key. Only meaningful once a run is completed:
/// new maze, player back at the origin, history kept, countdown restarted.
pub fn proceed(s: &mut Session, now: Instant) -> Vec<GameEvent> {
    if s.phase != Phase::Completed {
        return vec![];
    }
    s.regenerate();
    s.begin_countdown(now);
    vec![
        GameEvent::MazeRegenerated,
        GameEvent::CountdownTick { remaining: s.countdown_remaining },
    ]
}

// ══════════════════════════════════════════════════════════════
// Timers
// ══════════════════════════════════════════════════════════════

fn resolve_countdown(s: &mut Session, now: Instant, events: &mut Vec<GameEvent>) {
    while let Some(at) = s.countdown_timer.poll(now) {
        s.countdown_remaining = s.countdown_remaining.saturating_sub(1);
        events.push(GameEvent::CountdownTick { remaining: s.countdown_remaining });
        if s.countdown_remaining == 0 {
            s.countdown_timer.cancel();
            start_run(s, at, events);
            break;
        }
    }
}

fn start_run(s: &mut Session, at: Instant, events: &mut Vec<GameEvent>) {
    s.phase = Phase::Running;
    s.started_at = Some(at);
    s.elapsed = std::time::Duration::ZERO;
    s.clock_timer.start(at);
    events.push(GameEvent::RunStarted);

    // Direction held through the countdown: step now, repeat from here.
    if let Some(dir) = s.active_dir {
        step_player(s, dir, at, events);
        if s.phase == Phase::Running {
            s.repeat_timer.start(at);
        }
    }
}

/// Refresh the elapsed-time display. Missed periods collapse into one event.
fn resolve_clock(s: &mut Session, now: Instant, events: &mut Vec<GameEvent>) {
    let Some(start) = s.started_at else { return };
    let mut fired = false;
    while s.clock_timer.poll(now).is_some() {
        fired = true;
    }
    if fired && s.phase == Phase::Running {
        s.elapsed = now.saturating_duration_since(start);
        events.push(GameEvent::ClockTick { elapsed: s.elapsed });
    }
}

/// Repeated steps while a direction is held, one per elapsed cadence period.
fn resolve_repeat(s: &mut Session, now: Instant, events: &mut Vec<GameEvent>) {
    while let Some(at) = s.repeat_timer.poll(now) {
        let Some(dir) = s.active_dir else {
            s.repeat_timer.cancel();
            break;
        };
        step_player(s, dir, at, events);
    }
}

// ══════════════════════════════════════════════════════════════
// Movement + win
// ══════════════════════════════════════════════════════════════

/// Validate and apply one step. Blocked steps change nothing and emit nothing.
fn step_player(s: &mut Session, dir: Direction, at: Instant, events: &mut Vec<GameEvent>) {
    if s.phase != Phase::Running {
        return;
    }
    let Some(to) = movement::try_move(&s.grid, s.player, dir) else { return };

    let from = s.player;
    s.player = to;
    events.push(GameEvent::PlayerMoved { from, to });

    if s.at_end() {
        complete_run(s, at, events);
    }
}

fn complete_run(s: &mut Session, at: Instant, events: &mut Vec<GameEvent>) {
    s.phase = Phase::Completed;
    s.clock_timer.cancel();
    s.repeat_timer.cancel();
    s.active_dir = None;

    let start = s.started_at.unwrap_or(at);
    s.elapsed = at.saturating_duration_since(start);
    let seconds = s.history.record(s.elapsed);
    events.push(GameEvent::RunCompleted { seconds, run: s.history.len() });
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
