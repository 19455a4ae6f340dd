/// Input state tracker.
///
/// Turns raw terminal key events into discrete game inputs:
///   - `Press(dir)` when a direction key goes from "not held" to "held"
///   - `Release(dir)` when it goes back
///   - one-shot `Continue`, `NextTheme` and `Quit`
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::config::ControlMode;
use crate::domain::movement::Direction;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InputEvent {
    Press(Direction),
    Release(Direction),
    Continue,
    NextTheme,
    Quit,
}

pub struct InputState {
    mode: ControlMode,

    /// Held direction keys, with the timestamp of their last Press/Repeat.
    held: HashMap<KeyCode, Instant>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new(mode: ControlMode) -> Self {
        InputState {
            mode,
            held: HashMap::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events without blocking.
    /// Call once per frame, before the session tick.
    pub fn drain_events(&mut self) -> Vec<InputEvent> {
        let mut out = Vec::new();
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.handle_key(key, Instant::now(), &mut out);
            }
        }
        self.expire(Instant::now(), &mut out);
        out
    }

    /// Map one key event. Split out from `drain_events` so it runs without a terminal.
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant, out: &mut Vec<InputEvent>) {
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            out.push(InputEvent::Quit);
            return;
        }

        let code = normalize(key.code);

        match (key.kind, self.direction_for(code)) {
            (KeyEventKind::Release, Some(dir)) => {
                // Without enhancement, rely on timeout-based expiry instead
                if self.honor_release && self.held.remove(&code).is_some() {
                    out.push(InputEvent::Release(dir));
                }
            }
            (KeyEventKind::Release, None) => {}
            (_, Some(dir)) => {
                // Press or Repeat: only the not-held → held edge is a new press
                let was_held = self.is_held(code, now);
                self.held.insert(code, now);
                if !was_held {
                    out.push(InputEvent::Press(dir));
                }
            }
            (KeyEventKind::Press, None) => match code {
                KeyCode::Char(' ') => out.push(InputEvent::Continue),
                KeyCode::Char('t') => out.push(InputEvent::NextTheme),
                KeyCode::Esc | KeyCode::Char('q') => out.push(InputEvent::Quit),
                _ => {}
            },
            _ => {}
        }
    }

    /// Release keys that have timed out (fallback for terminals without Release).
    pub fn expire(&mut self, now: Instant, out: &mut Vec<InputEvent>) {
        if self.honor_release {
            return;
        }
        let expired: Vec<KeyCode> = self
            .held
            .iter()
            .filter(|(_, t)| now.duration_since(**t) >= HOLD_TIMEOUT)
            .map(|(code, _)| *code)
            .collect();
        for code in expired {
            self.held.remove(&code);
            if let Some(dir) = self.direction_for(code) {
                out.push(InputEvent::Release(dir));
            }
        }
    }

    /// Key label set for the help line.
    pub fn move_keys_label(&self) -> &'static str {
        match self.mode {
            ControlMode::Wasd => "WASD",
            ControlMode::Arrows => "Arrows",
        }
    }

    // ── Internal ──

    fn direction_for(&self, code: KeyCode) -> Option<Direction> {
        match (self.mode, code) {
            (ControlMode::Wasd, KeyCode::Char('w')) => Some(Direction::Up),
            (ControlMode::Wasd, KeyCode::Char('a')) => Some(Direction::Left),
            (ControlMode::Wasd, KeyCode::Char('s')) => Some(Direction::Down),
            (ControlMode::Wasd, KeyCode::Char('d')) => Some(Direction::Right),
            (ControlMode::Arrows, KeyCode::Up) => Some(Direction::Up),
            (ControlMode::Arrows, KeyCode::Left) => Some(Direction::Left),
            (ControlMode::Arrows, KeyCode::Down) => Some(Direction::Down),
            (ControlMode::Arrows, KeyCode::Right) => Some(Direction::Right),
            _ => None,
        }
    }

    fn is_held(&self, code: KeyCode, now: Instant) -> bool {
        self.held
            .get(&code)
            .map(|t| self.honor_release || now.duration_since(*t) < HOLD_TIMEOUT)
            .unwrap_or(false)
    }
}

/// Letters are bound case-insensitively.
fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, kind)
    }

    fn feed(input: &mut InputState, code: KeyCode, kind: KeyEventKind, now: Instant) -> Vec<InputEvent> {
        let mut out = vec![];
        input.handle_key(key(code, kind), now, &mut out);
        out
    }

    #[test]
    fn wasd_bindings() {
        let t0 = Instant::now();
        let mut input = InputState::new(ControlMode::Wasd);
        assert_eq!(feed(&mut input, KeyCode::Char('w'), KeyEventKind::Press, t0), vec![InputEvent::Press(Direction::Up)]);
        assert_eq!(feed(&mut input, KeyCode::Char('A'), KeyEventKind::Press, t0), vec![InputEvent::Press(Direction::Left)]);
        assert!(feed(&mut input, KeyCode::Up, KeyEventKind::Press, t0).is_empty());
    }

    #[test]
    fn arrow_bindings() {
        let t0 = Instant::now();
        let mut input = InputState::new(ControlMode::Arrows);
        assert_eq!(feed(&mut input, KeyCode::Down, KeyEventKind::Press, t0), vec![InputEvent::Press(Direction::Down)]);
        assert!(feed(&mut input, KeyCode::Char('s'), KeyEventKind::Press, t0).is_empty());
    }

    #[test]
    fn autorepeat_is_not_a_new_press() {
        let t0 = Instant::now();
        let mut input = InputState::new(ControlMode::Wasd);
        feed(&mut input, KeyCode::Char('d'), KeyEventKind::Press, t0);
        let ms = Duration::from_millis;
        assert!(feed(&mut input, KeyCode::Char('d'), KeyEventKind::Repeat, t0 + ms(30)).is_empty());
        assert!(feed(&mut input, KeyCode::Char('d'), KeyEventKind::Press, t0 + ms(60)).is_empty());
    }

    #[test]
    fn release_events_when_enhanced() {
        let t0 = Instant::now();
        let mut input = InputState::new(ControlMode::Wasd);
        input.honor_release = true;
        feed(&mut input, KeyCode::Char('s'), KeyEventKind::Press, t0);

        // Held indefinitely: no timeout release.
        let mut out = vec![];
        input.expire(t0 + Duration::from_secs(5), &mut out);
        assert!(out.is_empty());

        assert_eq!(
            feed(&mut input, KeyCode::Char('s'), KeyEventKind::Release, t0 + Duration::from_secs(5)),
            vec![InputEvent::Release(Direction::Down)]
        );
        // A stray second release is ignored.
        assert!(feed(&mut input, KeyCode::Char('s'), KeyEventKind::Release, t0).is_empty());
    }

    #[test]
    fn timeout_release_without_enhancement() {
        let t0 = Instant::now();
        let mut input = InputState::new(ControlMode::Arrows);
        feed(&mut input, KeyCode::Left, KeyEventKind::Press, t0);
        assert!(feed(&mut input, KeyCode::Left, KeyEventKind::Release, t0).is_empty());

        let mut out = vec![];
        input.expire(t0 + Duration::from_millis(100), &mut out);
        assert!(out.is_empty());
        input.expire(t0 + HOLD_TIMEOUT, &mut out);
        assert_eq!(out, vec![InputEvent::Release(Direction::Left)]);

        // Pressing again after the timeout is a fresh press.
        assert_eq!(
            feed(&mut input, KeyCode::Left, KeyEventKind::Press, t0 + HOLD_TIMEOUT),
            vec![InputEvent::Press(Direction::Left)]
        );
    }

    #[test]
    fn one_shot_keys() {
        let t0 = Instant::now();
        let mut input = InputState::new(ControlMode::Wasd);
        assert_eq!(feed(&mut input, KeyCode::Char(' '), KeyEventKind::Press, t0), vec![InputEvent::Continue]);
        // Space is the only continue key.
        assert!(feed(&mut input, KeyCode::Enter, KeyEventKind::Press, t0).is_empty());
        assert_eq!(feed(&mut input, KeyCode::Char('T'), KeyEventKind::Press, t0), vec![InputEvent::NextTheme]);
        assert_eq!(feed(&mut input, KeyCode::Esc, KeyEventKind::Press, t0), vec![InputEvent::Quit]);
        // Autorepeat of a one-shot key does nothing.
        assert!(feed(&mut input, KeyCode::Char(' '), KeyEventKind::Repeat, t0).is_empty());
    }

    #[test]
    fn ctrl_c_quits() {
        let mut input = InputState::new(ControlMode::Wasd);
        let mut out = vec![];
        input.handle_key(
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Instant::now(),
            &mut out,
        );
        assert_eq!(out, vec![InputEvent::Quit]);
    }
}
