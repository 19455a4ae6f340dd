/// Cells, sides and grid coordinates.
/// Wall semantics are centralized here; the grid only stores cells.

/// A grid coordinate. `x` is the column, `y` the row (0 = top).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const ORIGIN: Pos = Pos { x: 0, y: 0 };

    pub fn new(x: usize, y: usize) -> Self {
        Pos { x, y }
    }
}

/// One of the four wall slots of a cell, in storage order.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    /// The wall slot on the neighbouring cell that faces this one.
    pub fn opposite(self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Right => Side::Left,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
        }
    }

    /// Unit step towards the neighbour behind this wall.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Side::Top => (0, -1),
            Side::Right => (1, 0),
            Side::Bottom => (0, 1),
            Side::Left => (-1, 0),
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Debug)]
pub struct Cell {
    pub pos: Pos,
    /// Only meaningful while the generator runs.
    pub visited: bool,
    walls: [bool; 4], // Top, Right, Bottom, Left
}

impl Cell {
    /// A fresh cell: unvisited, fully walled.
    pub fn new(x: usize, y: usize) -> Self {
        Cell {
            pos: Pos::new(x, y),
            visited: false,
            walls: [true; 4],
        }
    }

    #[inline]
    pub fn has_wall(&self, side: Side) -> bool {
        self.walls[side.index()]
    }

    #[inline]
    pub fn open(&mut self, side: Side) {
        self.walls[side.index()] = false;
    }

    #[allow(dead_code)]
    /// Number of walls still standing.
    pub fn wall_count(&self) -> usize {
        self.walls.iter().filter(|w| **w).count()
    }
}
