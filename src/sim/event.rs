/// Events emitted by session transitions.
/// The presentation layer consumes these to decide when to redraw.

use std::time::Duration;

use crate::domain::cell::Pos;

#[allow(dead_code)]
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    CountdownTick { remaining: u32 },
    RunStarted,
    ClockTick { elapsed: Duration },
    PlayerMoved { from: Pos, to: Pos },
    RunCompleted { seconds: f64, run: usize },
    MazeRegenerated,
}
