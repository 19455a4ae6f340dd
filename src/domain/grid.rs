/// Square maze grid and its generator.
///
/// ## Generation
///
/// Randomized iterative backtracker (depth-first search with an explicit stack):
///   1. Every cell starts unvisited with all four walls standing.
///   2. (0,0) is marked visited and pushed.
///   3. While the stack is non-empty, peek the top cell. If it has no unvisited
///      neighbours, pop it. Otherwise pick one uniformly at random, knock out
///      the wall pair between them, mark it visited and push it.
///
/// Every cell is visited exactly once, so the open passages form a spanning
/// tree of the grid: exactly one simple path between any two cells.
///
/// After carving, the outward-facing wall of every border cell is removed,
/// leaving the outer boundary fully open on all four sides.

use std::collections::VecDeque;

use rand::Rng;

use super::cell::{Cell, Pos, Side};

pub const DEFAULT_SIZE: usize = 20;

#[derive(Clone, Debug)]
pub struct Grid {
    size: usize,
    /// Row-major: `cells[y * size + x]`.
    cells: Vec<Cell>,
}

// ── Construction ──

impl Grid {
    /// A fully walled, unvisited grid. A size of 0 is treated as 1.
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let mut cells = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                cells.push(Cell::new(x, y));
            }
        }
        Grid { size, cells }
    }

    /// Carve a perfect maze and open the perimeter.
    pub fn generate<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Self {
        let mut grid = Self::carve(size, rng);
        grid.open_perimeter();
        grid
    }

    /// Carve a perfect maze without touching the outer walls.
    pub fn carve<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Self {
        let mut grid = Self::new(size);

        let mut stack: Vec<Pos> = Vec::with_capacity(grid.size * grid.size);
        grid.cell_mut(Pos::ORIGIN).visited = true;
        stack.push(Pos::ORIGIN);

        while let Some(&current) = stack.last() {
            let (options, count) = grid.unvisited_neighbours(current);
            if count == 0 {
                stack.pop();
                continue;
            }

            let (side, next) = options[rng.gen_range(0..count)];
            grid.remove_wall(current, side);
            grid.cell_mut(next).visited = true;
            stack.push(next);
        }

        grid
    }

    /// Clear the outward-facing wall of every border cell.
    pub fn open_perimeter(&mut self) {
        let last = self.size - 1;
        for i in 0..self.size {
            self.cell_mut(Pos::new(0, i)).open(Side::Left);
            self.cell_mut(Pos::new(last, i)).open(Side::Right);
            self.cell_mut(Pos::new(i, 0)).open(Side::Top);
            self.cell_mut(Pos::new(i, last)).open(Side::Bottom);
        }
    }
}

// ── Queries ──

impl Grid {
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Bottom-right corner: the goal cell.
    pub fn end(&self) -> Pos {
        Pos::new(self.size - 1, self.size - 1)
    }

    /// Panics if `pos` is outside the grid; callers bounds-check first.
    #[inline]
    pub fn cell(&self, pos: Pos) -> &Cell {
        &self.cells[pos.y * self.size + pos.x]
    }

    #[allow(dead_code)]
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    #[inline]
    pub fn contains(&self, pos: Pos) -> bool {
        pos.x < self.size && pos.y < self.size
    }

    /// The in-bounds cell across `side` from `pos`, if any.
    pub fn neighbour(&self, pos: Pos, side: Side) -> Option<Pos> {
        let (dx, dy) = side.delta();
        let nx = pos.x as i32 + dx;
        let ny = pos.y as i32 + dy;
        if nx < 0 || ny < 0 {
            return None;
        }
        let next = Pos::new(nx as usize, ny as usize);
        if self.contains(next) { Some(next) } else { None }
    }

    /// Is the wall on `pos`'s `side` open? The current cell's flag is authoritative.
    #[inline]
    pub fn is_open(&self, pos: Pos, side: Side) -> bool {
        !self.cell(pos).has_wall(side)
    }

    #[allow(dead_code)]
    /// Open passages between adjacent in-bounds cells, each shared edge counted once.
    pub fn passage_count(&self) -> usize {
        self.cells
            .iter()
            .map(|c| {
                [Side::Right, Side::Bottom]
                    .iter()
                    .filter(|s| !c.has_wall(**s) && self.neighbour(c.pos, **s).is_some())
                    .count()
            })
            .sum()
    }

    #[allow(dead_code)]
    /// Breadth-first search over open passages.
    pub fn path_exists(&self, from: Pos, to: Pos) -> bool {
        self.distance(from, to).is_some()
    }

    /// Number of steps on the (unique) path between two cells.
    pub fn distance(&self, from: Pos, to: Pos) -> Option<usize> {
        if !self.contains(from) || !self.contains(to) {
            return None;
        }
        let mut dist = vec![usize::MAX; self.size * self.size];
        let mut queue = VecDeque::new();
        dist[from.y * self.size + from.x] = 0;
        queue.push_back(from);

        while let Some(p) = queue.pop_front() {
            let d = dist[p.y * self.size + p.x];
            if p == to {
                return Some(d);
            }
            for side in Side::ALL {
                if !self.is_open(p, side) {
                    continue;
                }
                if let Some(n) = self.neighbour(p, side) {
                    let slot = &mut dist[n.y * self.size + n.x];
                    if *slot == usize::MAX {
                        *slot = d + 1;
                        queue.push_back(n);
                    }
                }
            }
        }
        None
    }
}

// ── Internal ──

impl Grid {
    #[inline]
    fn cell_mut(&mut self, pos: Pos) -> &mut Cell {
        &mut self.cells[pos.y * self.size + pos.x]
    }

    /// Unvisited neighbours in Top, Right, Bottom, Left order.
    fn unvisited_neighbours(&self, pos: Pos) -> ([(Side, Pos); 4], usize) {
        let mut out = [(Side::Top, Pos::ORIGIN); 4];
        let mut count = 0;
        for side in Side::ALL {
            if let Some(n) = self.neighbour(pos, side) {
                if !self.cell(n).visited {
                    out[count] = (side, n);
                    count += 1;
                }
            }
        }
        (out, count)
    }

    /// Open the wall pair between `pos` and its neighbour across `side`.
    fn remove_wall(&mut self, pos: Pos, side: Side) {
        if let Some(n) = self.neighbour(pos, side) {
            self.cell_mut(pos).open(side);
            self.cell_mut(n).open(side.opposite());
        }
    }
}
