/// Session: everything one play session owns.
///
/// Grid, player, phase, run history, the RNG that builds every maze, and the
/// three timer handles (countdown, clock, move repeat). Transitions live in
/// `sim::step`; this module only holds state and its construction.
///
/// ## Phases
///
///   CountingDown ──(last tick)──▶ Running ──(reach end)──▶ Completed
///        ▲                                                     │
///        └────────────────────(continue)───────────────────────┘

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::TimingConfig;
use crate::domain::cell::Pos;
use crate::domain::grid::Grid;
use crate::domain::movement::Direction;
use super::history::RunHistory;
use super::timer::Timer;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    CountingDown,
    Running,
    Completed,
}

pub struct Session {
    // ── Maze ──
    pub grid: Grid,
    pub size: usize,
    pub end: Pos,

    // ── Player ──
    pub player: Pos,
    /// Direction currently held. Set on key-down, cleared on matching key-up.
    pub active_dir: Option<Direction>,

    // ── Timing ──
    pub phase: Phase,
    pub countdown_remaining: u32,
    pub started_at: Option<Instant>,
    /// Last computed elapsed time (display value while running, final once completed).
    pub elapsed: Duration,
    pub history: RunHistory,
    pub timing: TimingConfig,

    // ── Scheduled tasks ──
    pub(super) countdown_timer: Timer,
    pub(super) clock_timer: Timer,
    pub(super) repeat_timer: Timer,

    pub(super) rng: StdRng,
}

impl Session {
    /// Generate the first maze and start the countdown at `now`.
    pub fn new(size: usize, timing: TimingConfig, mut rng: StdRng, now: Instant) -> Self {
        let grid = Grid::generate(size, &mut rng);
        let end = grid.end();
        let mut s = Session {
            size: grid.size(),
            grid,
            end,
            player: Pos::ORIGIN,
            active_dir: None,
            phase: Phase::CountingDown,
            countdown_remaining: 0,
            started_at: None,
            elapsed: Duration::ZERO,
            history: RunHistory::new(),
            countdown_timer: Timer::new(timing.countdown_interval()),
            clock_timer: Timer::new(timing.clock_interval()),
            repeat_timer: Timer::new(timing.move_speed()),
            timing,
            rng,
        };
        s.begin_countdown(now);
        s
    }

    /// Seeded when `seed` is given, otherwise from OS entropy.
    pub fn with_seed(size: usize, timing: TimingConfig, seed: Option<u64>, now: Instant) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self::new(size, timing, rng, now)
    }

    /// Enter CountingDown from scratch: every timer cancelled, countdown armed.
    pub(super) fn begin_countdown(&mut self, now: Instant) {
        self.phase = Phase::CountingDown;
        self.countdown_remaining = self.timing.countdown_ticks.max(1);
        self.started_at = None;
        self.elapsed = Duration::ZERO;
        self.active_dir = None;
        self.clock_timer.cancel();
        self.repeat_timer.cancel();
        self.countdown_timer.start(now);
    }

    /// Replace the maze with a freshly generated one and put the player at the origin.
    pub(super) fn regenerate(&mut self) {
        self.grid = Grid::generate(self.size, &mut self.rng);
        self.end = self.grid.end();
        self.player = Pos::ORIGIN;
    }

    #[inline]
    pub fn at_end(&self) -> bool {
        self.player == self.end
    }

    #[allow(dead_code)]
    pub fn is_repeating(&self) -> bool {
        self.repeat_timer.is_active()
    }

    #[allow(dead_code)]
    pub fn clock_running(&self) -> bool {
        self.clock_timer.is_active()
    }
}
