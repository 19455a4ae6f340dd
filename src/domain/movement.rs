/// Movement rules: pure functions, no side effects.
///
/// A step is legal when:
///   - the target cell is inside the grid, and
///   - the current cell's wall facing the target is open.
///
/// Win detection is the caller's concern.

use super::cell::{Pos, Side};
use super::grid::Grid;

/// Movement direction (continuous while key held).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

    #[allow(dead_code)]
    /// Unit step vector `(dx, dy)`; y grows downwards.
    pub fn delta(self) -> (i32, i32) {
        self.side().delta()
    }

    /// The wall slot crossed when moving this way.
    pub fn side(self) -> Side {
        match self {
            Direction::Up => Side::Top,
            Direction::Right => Side::Right,
            Direction::Down => Side::Bottom,
            Direction::Left => Side::Left,
        }
    }
}

/// Validate one step from `pos`. Returns the new position, or None if blocked.
pub fn try_move(grid: &Grid, pos: Pos, dir: Direction) -> Option<Pos> {
    if !grid.contains(pos) {
        return None;
    }
    let target = grid.neighbour(pos, dir.side())?;
    if !grid.is_open(pos, dir.side()) {
        return None;
    }
    Some(target)
}
