/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Glyph)
///   2. Compare each glyph with `back` buffer (previous frame)
///   3. Only emit terminal commands for glyphs that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// ## Maze layout
///
/// Each maze cell is two terminal columns wide and one row tall:
/// column 0 shows the floor (`_` when the bottom wall stands), column 1 the
/// right wall (`|`). One extra row above carries the top walls, one extra
/// column on the left the left walls.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::cell::{Pos, Side};
use crate::sim::session::{Phase, Session};
use crate::ui::theme::Theme;

/// Everything besides the session that a frame depends on.
pub struct View<'a> {
    pub theme: &'a Theme,
    /// Transient notice shown under the maze (theme switches etc).
    pub notice: &'a str,
    pub move_keys: &'a str,
}

/// A redraw-on-demand sink. The game loop calls it after every batch of events.
pub trait Renderer {
    fn render(&mut self, session: &Session, view: &View) -> io::Result<()>;
}

// ── Glyph: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Glyph {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Glyph {
    const BLANK: Glyph = Glyph { ch: ' ', fg: Color::White, bg: Color::Reset };

    /// Sentinel used to invalidate the back buffer.
    /// Different from any real glyph, so every position will be diff'd.
    const INVALID: Glyph = Glyph { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Glyph { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Glyphs ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Glyph>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Glyph::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Glyph::BLANK; w * h];
        }
    }

    fn fill(&mut self, g: Glyph) {
        self.cells.fill(g);
    }

    fn set(&mut self, x: usize, y: usize, g: Glyph) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = g;
        }
    }

    fn get(&self, x: usize, y: usize) -> Glyph {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Glyph::BLANK
        }
    }

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Glyph::new(ch, fg, bg));
        }
    }

    #[cfg(test)]
    fn row_text(&self, y: usize) -> String {
        (0..self.width).map(|x| self.get(x, y).ch).collect()
    }
}

// ── Terminal renderer ──

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
const MAP_COL: usize = 2;
const CELL_W: usize = 2;

const PLAYER: char = '@';
const GOAL: char = '*';

pub struct TerminalRenderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    /// Background of the last frame; a change forces a full repaint.
    last_bg: Option<Color>,
    keyboard_enhanced: bool,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        TerminalRenderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_bg: None,
            keyboard_enhanced: false,
        }
    }

    /// Enter raw mode + alternate screen. Returns whether the terminal will
    /// report key Release events.
    pub fn init(&mut self) -> io::Result<bool> {
        terminal::enable_raw_mode()?;
        execute!(self.writer, terminal::EnterAlternateScreen, cursor::Hide, Clear(ClearType::All))?;

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.keyboard_enhanced = true;
        }

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.resize(tw as usize, th as usize);
        Ok(self.keyboard_enhanced)
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.keyboard_enhanced {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        // Force full repaint: back ≠ front for every glyph.
        self.back.fill(Glyph::INVALID);
    }

    // ── Diff flush: only write changed glyphs ──

    fn flush_diff(&mut self, base_bg: Color) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = base_bg;
        let mut need_move = true;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let g = self.front.get(x, y);
                if g == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }
                if need_move {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if g.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(g.fg))?;
                    last_fg = g.fg;
                }
                if g.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(g.bg))?;
                    last_bg = g.bg;
                }
                queue!(self.writer, Print(g.ch))?;
            }
            // Rows don't wrap reliably in raw mode; always reposition.
            need_move = true;
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self, s: &Session, view: &View) {
        let theme = view.theme;
        self.front.fill(Glyph::new(' ', theme.text, theme.background));

        self.compose_hud(s, theme);
        self.compose_maze(s, theme);
        self.compose_history(s, theme);

        match s.phase {
            Phase::CountingDown => {
                let label = format!(" {} ", s.countdown_remaining);
                self.compose_overlay(s, theme, &[&label]);
            }
            Phase::Completed => {
                let done = format!(" Completed in {:.2}s ", s.history.last().unwrap_or(0.0));
                self.compose_overlay(s, theme, &[&done, " Hit space for next "]);
            }
            Phase::Running => {}
        }

        let foot = MAP_ROW + s.size + 2;
        if !view.notice.is_empty() {
            self.front.put_str(MAP_COL, foot, view.notice, theme.background, theme.text);
        }
        let help = format!("{}: move   Space: next   T: theme   Q: quit", view.move_keys);
        self.front.put_str(MAP_COL, foot + 1, &help, theme.text, theme.background);
    }

    fn compose_hud(&mut self, s: &Session, theme: &Theme) {
        let status = match s.phase {
            Phase::CountingDown => "Get ready",
            Phase::Running => "Go!",
            Phase::Completed => "Finished",
        };
        let hud = format!(" Time: {:.2}s   {} ", s.elapsed.as_secs_f64(), status);
        self.front.put_str(MAP_COL, HUD_ROW, &hud, theme.text, theme.background);
    }

    fn compose_maze(&mut self, s: &Session, theme: &Theme) {
        let n = s.size;
        let floor = |ch: char| Glyph::new(ch, theme.wall, theme.floor);

        // Top walls
        for x in 0..n {
            if !s.grid.is_open(Pos::new(x, 0), Side::Top) {
                self.front.set(MAP_COL + 1 + x * CELL_W, MAP_ROW, floor('_'));
            }
        }

        for y in 0..n {
            let row = MAP_ROW + 1 + y;
            let left = if s.grid.is_open(Pos::new(0, y), Side::Left) { ' ' } else { '|' };
            self.front.set(MAP_COL, row, floor(left));

            for x in 0..n {
                let p = Pos::new(x, y);
                let col = MAP_COL + 1 + x * CELL_W;

                let body = if p == s.player {
                    Glyph::new(PLAYER, theme.background, theme.floor)
                } else if p == s.end {
                    Glyph::new(GOAL, theme.text, theme.floor)
                } else if s.grid.is_open(p, Side::Bottom) {
                    floor(' ')
                } else {
                    floor('_')
                };
                self.front.set(col, row, body);

                let right = if !s.grid.is_open(p, Side::Right) {
                    '|'
                } else if !s.grid.is_open(p, Side::Bottom)
                    && s.grid.neighbour(p, Side::Right).map_or(false, |r| !s.grid.is_open(r, Side::Bottom))
                {
                    '_'
                } else {
                    ' '
                };
                self.front.set(col + 1, row, floor(right));
            }
        }
    }

    fn compose_history(&mut self, s: &Session, theme: &Theme) {
        let col = MAP_COL + 2 + s.size * CELL_W + 3;
        self.front.put_str(col, MAP_ROW, "Runs", theme.text, theme.background);

        // Newest runs that fit beside the maze; always leave room for "Best".
        let room = s.size.saturating_sub(1).max(1);
        let skip = s.history.len().saturating_sub(room);
        for (i, t) in s.history.iter().enumerate().skip(skip) {
            let line = format!("Run {}: {:.2}s", i + 1, t);
            self.front.put_str(col, MAP_ROW + 1 + i - skip, &line, theme.text, theme.background);
        }
        if let Some((run, t)) = s.history.best() {
            let line = format!("Best: {:.2}s (run {})", t, run);
            self.front.put_str(col, MAP_ROW + 1 + room, &line, theme.text, theme.background);
        }
    }

    /// Centered box over the maze.
    fn compose_overlay(&mut self, s: &Session, theme: &Theme, lines: &[&str]) {
        let maze_w = 1 + s.size * CELL_W;
        let maze_h = 1 + s.size;
        let box_w = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let x0 = MAP_COL + maze_w.saturating_sub(box_w) / 2;
        let y0 = MAP_ROW + maze_h.saturating_sub(lines.len()) / 2;
        for (i, line) in lines.iter().enumerate() {
            let pad = (box_w - line.chars().count()) / 2;
            for x in 0..box_w {
                self.front.set(x0 + x, y0 + i, Glyph::new(' ', theme.background, theme.text));
            }
            self.front.put_str(x0 + pad, y0 + i, line, theme.background, theme.text);
        }
    }
}

impl Renderer for TerminalRenderer {
    fn render(&mut self, session: &Session, view: &View) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.resize(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(view.theme.background), Clear(ClearType::All))?;
        }

        // Theme change → clear for a clean repaint
        if self.last_bg != Some(view.theme.background) {
            self.back.fill(Glyph::INVALID);
            queue!(self.writer, SetBackgroundColor(view.theme.background), Clear(ClearType::All))?;
            self.last_bg = Some(view.theme.background);
        }

        self.compose(session, view);
        self.flush_diff(view.theme.background)?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }
}
