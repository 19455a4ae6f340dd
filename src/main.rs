/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use config::GameConfig;
use sim::event::GameEvent;
use sim::session::Session;
use sim::step;
use ui::input::{InputEvent, InputState};
use ui::renderer::{Renderer, TerminalRenderer, View};

const FRAME_SLEEP: Duration = Duration::from_millis(5);
const NOTICE_TIME: Duration = Duration::from_millis(1500);

/// Transient one-line message under the maze.
struct Notice {
    text: String,
    until: Option<Instant>,
}

impl Notice {
    fn set(&mut self, text: String, now: Instant) {
        self.text = text;
        self.until = Some(now + NOTICE_TIME);
    }

    fn expire(&mut self, now: Instant) {
        if self.until.map_or(false, |t| now >= t) {
            self.text.clear();
            self.until = None;
        }
    }
}

fn main() {
    let config = GameConfig::load();

    let mut session = Session::with_seed(
        config.maze.size,
        config.timing.clone(),
        config.maze.seed,
        Instant::now(),
    );

    let mut renderer = TerminalRenderer::new();
    let mut input = InputState::new(config.controls);

    match renderer.init() {
        Ok(enhanced) => input.honor_release = enhanced,
        Err(e) => {
            eprintln!("Terminal init failed: {e}");
            return;
        }
    }

    let result = game_loop(&mut session, &mut renderer, &mut input, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    print_summary(&session);
}

fn game_loop(
    session: &mut Session,
    renderer: &mut impl Renderer,
    input: &mut InputState,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut theme_idx = config.default_theme;
    let mut notice = Notice { text: String::new(), until: None };

    loop {
        let inputs = input.drain_events();
        let now = Instant::now();

        // Timers first, so a press lands on the phase the clock says we're in.
        let mut events = step::tick(session, now);

        for ev in inputs {
            match ev {
                InputEvent::Quit => return Ok(()),
                InputEvent::Press(dir) => events.extend(step::press(session, dir, now)),
                InputEvent::Release(dir) => step::release(session, dir),
                InputEvent::Continue => events.extend(step::proceed(session, now)),
                InputEvent::NextTheme => {
                    theme_idx = (theme_idx + 1) % config.themes.len();
                    notice.set(format!("Theme: {}", config.themes[theme_idx].name), now);
                }
            }
        }

        for ev in &events {
            match ev {
                GameEvent::RunCompleted { seconds, run } => {
                    if session.history.best().map_or(false, |(best, _)| best == *run) && *run > 1 {
                        notice.set(format!("New best: {seconds:.2}s"), now);
                    }
                }
                GameEvent::MazeRegenerated => {
                    notice.text.clear();
                    notice.until = None;
                }
                _ => {}
            }
        }
        notice.expire(now);

        let view = View {
            theme: &config.themes[theme_idx],
            notice: &notice.text,
            move_keys: input.move_keys_label(),
        };
        renderer.render(session, &view)?;
        std::thread::sleep(FRAME_SLEEP);
    }
}

fn print_summary(session: &Session) {
    println!();
    if session.history.is_empty() {
        println!("No runs completed.");
        return;
    }
    for (i, t) in session.history.iter().enumerate() {
        println!("Run {}: {:.2}s", i + 1, t);
    }
    if let Some((run, t)) = session.history.best() {
        println!("Best: {:.2}s (run {})", t, run);
    }
}
