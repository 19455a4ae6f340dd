/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
/// Out-of-range values are clamped with a warning rather than rejected.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::grid::DEFAULT_SIZE;
use crate::ui::theme::{self, Theme};

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub maze: MazeConfig,
    pub timing: TimingConfig,
    pub controls: ControlMode,
    /// Built-ins first, then any extra `[themes.*]` sorted by name.
    pub themes: Vec<Theme>,
    /// Index into `themes` of the theme to start with.
    pub default_theme: usize,
}

#[derive(Clone, Debug)]
pub struct MazeConfig {
    pub size: usize,
    /// Fixed seed for reproducible mazes; None = fresh entropy.
    pub seed: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct TimingConfig {
    pub move_speed_ms: u64,          // repeat cadence while a direction is held
    pub countdown_ticks: u32,
    pub countdown_interval_ms: u64,
    pub clock_interval_ms: u64,      // elapsed-time display refresh
}

impl TimingConfig {
    pub fn move_speed(&self) -> Duration {
        Duration::from_millis(self.move_speed_ms)
    }

    pub fn countdown_interval(&self) -> Duration {
        Duration::from_millis(self.countdown_interval_ms)
    }

    pub fn clock_interval(&self) -> Duration {
        Duration::from_millis(self.clock_interval_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            move_speed_ms: default_move_speed(),
            countdown_ticks: default_countdown_ticks(),
            countdown_interval_ms: default_countdown_interval(),
            clock_interval_ms: default_clock_interval(),
        }
    }
}

/// Which physical keys drive the four directions.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    #[default]
    Wasd,
    Arrows,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    maze: TomlMaze,
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    controls: TomlControls,
    #[serde(default)]
    theme: TomlThemeSelect,
    #[serde(default)]
    themes: BTreeMap<String, TomlTheme>,
}

#[derive(Deserialize, Debug)]
struct TomlMaze {
    #[serde(default = "default_size")]
    size: usize,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_move_speed")]
    move_speed_ms: u64,
    #[serde(default = "default_countdown_ticks")]
    countdown_ticks: u32,
    #[serde(default = "default_countdown_interval")]
    countdown_interval_ms: u64,
    #[serde(default = "default_clock_interval")]
    clock_interval_ms: u64,
}

#[derive(Deserialize, Debug, Default)]
struct TomlControls {
    #[serde(default)]
    mode: ControlMode,
}

#[derive(Deserialize, Debug)]
struct TomlThemeSelect {
    #[serde(default = "default_theme_name")]
    default: String,
}

#[derive(Deserialize, Debug)]
struct TomlTheme {
    background: String,
    floor: String,
    wall: String,
    text: String,
}

// ── Defaults ──

fn default_size() -> usize { DEFAULT_SIZE }
fn default_move_speed() -> u64 { 50 }
fn default_countdown_ticks() -> u32 { 5 }
fn default_countdown_interval() -> u64 { 1000 }
fn default_clock_interval() -> u64 { 10 }
fn default_theme_name() -> String { "theme1".into() }

/// Largest maze that still fits a reasonable terminal.
const MAX_SIZE: usize = 60;

impl Default for TomlMaze {
    fn default() -> Self {
        TomlMaze { size: default_size(), seed: None }
    }
}

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            move_speed_ms: default_move_speed(),
            countdown_ticks: default_countdown_ticks(),
            countdown_interval_ms: default_countdown_interval(),
            clock_interval_ms: default_clock_interval(),
        }
    }
}

impl Default for TomlThemeSelect {
    fn default() -> Self {
        TomlThemeSelect { default: default_theme_name() }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        resolve(TomlConfig::default())
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) ~/.local/share/mazerun. Missing file or keys fall back to defaults.
    pub fn load() -> Self {
        resolve(load_toml(&candidate_dirs()))
    }

    #[allow(dead_code)]
    /// Parse a config document directly (no file search).
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<TomlConfig>(text).map(resolve)
    }
}

/// Turn the raw schema into validated settings.
fn resolve(cfg: TomlConfig) -> GameConfig {
    let mut size = cfg.maze.size;
    if size == 0 {
        eprintln!("Warning: maze.size must be at least 1, using 1.");
        size = 1;
    } else if size > MAX_SIZE {
        eprintln!("Warning: maze.size {size} is too large, using {MAX_SIZE}.");
        size = MAX_SIZE;
    }

    let timing = TimingConfig {
        move_speed_ms: at_least_one("timing.move_speed_ms", cfg.timing.move_speed_ms),
        countdown_ticks: at_least_one("timing.countdown_ticks", cfg.timing.countdown_ticks as u64) as u32,
        countdown_interval_ms: at_least_one("timing.countdown_interval_ms", cfg.timing.countdown_interval_ms),
        clock_interval_ms: at_least_one("timing.clock_interval_ms", cfg.timing.clock_interval_ms),
    };

    let mut themes = theme::builtin();
    for (name, t) in &cfg.themes {
        match Theme::from_hex(name, &t.background, &t.floor, &t.wall, &t.text) {
            Some(parsed) => match themes.iter_mut().find(|x| x.name == *name) {
                Some(slot) => *slot = parsed,
                None => themes.push(parsed),
            },
            None => eprintln!("Warning: theme '{name}' has an invalid color, skipped."),
        }
    }

    let default_theme = themes
        .iter()
        .position(|t| t.name == cfg.theme.default)
        .unwrap_or_else(|| {
            eprintln!("Warning: unknown theme '{}', using '{}'.", cfg.theme.default, themes[0].name);
            0
        });

    GameConfig {
        maze: MazeConfig { size, seed: cfg.maze.seed },
        timing,
        controls: cfg.controls.mode,
        themes,
        default_theme,
    }
}

fn at_least_one(key: &str, value: u64) -> u64 {
    if value == 0 {
        eprintln!("Warning: {key} must be at least 1, using 1.");
        1
    } else {
        value
    }
}

/// Where `config.toml` may live, in priority order, without duplicates:
/// executable directory, working directory, `~/.local/share/mazerun`.
fn candidate_dirs() -> Vec<PathBuf> {
    let exe_dir = std::env::current_exe()
        .ok()
        .map(|exe| exe.canonicalize().unwrap_or(exe))
        .and_then(|exe| exe.parent().map(PathBuf::from));
    let cwd = std::env::current_dir().ok();
    let data_dir = std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".local/share/mazerun"))
        .filter(|dir| dir.is_dir());

    let mut dirs: Vec<PathBuf> = Vec::with_capacity(3);
    for dir in [exe_dir, cwd, data_dir].into_iter().flatten() {
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }
    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::style::Color;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.maze.size, 20);
        assert_eq!(cfg.maze.seed, None);
        assert_eq!(cfg.timing.move_speed(), Duration::from_millis(50));
        assert_eq!(cfg.timing.countdown_ticks, 5);
        assert_eq!(cfg.timing.countdown_interval(), Duration::from_secs(1));
        assert_eq!(cfg.timing.clock_interval(), Duration::from_millis(10));
        assert_eq!(cfg.controls, ControlMode::Wasd);
        assert_eq!(cfg.themes.len(), 2);
        assert_eq!(cfg.themes[cfg.default_theme].name, "theme1");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::from_toml_str(
            "[maze]\nsize = 8\nseed = 99\n[timing]\nmove_speed_ms = 80\n[controls]\nmode = \"arrows\"\n",
        )
        .unwrap();
        assert_eq!(cfg.maze.size, 8);
        assert_eq!(cfg.maze.seed, Some(99));
        assert_eq!(cfg.timing.move_speed_ms, 80);
        assert_eq!(cfg.timing.countdown_ticks, 5);
        assert_eq!(cfg.controls, ControlMode::Arrows);
    }

    #[test]
    fn zero_values_are_clamped() {
        let cfg = GameConfig::from_toml_str(
            "[maze]\nsize = 0\n[timing]\nmove_speed_ms = 0\ncountdown_ticks = 0\nclock_interval_ms = 0\n",
        )
        .unwrap();
        assert_eq!(cfg.maze.size, 1);
        assert_eq!(cfg.timing.move_speed_ms, 1);
        assert_eq!(cfg.timing.countdown_ticks, 1);
        assert_eq!(cfg.timing.clock_interval_ms, 1);
    }

    #[test]
    fn oversized_maze_is_capped() {
        let cfg = GameConfig::from_toml_str("[maze]\nsize = 500\n").unwrap();
        assert_eq!(cfg.maze.size, MAX_SIZE);
    }

    #[test]
    fn custom_themes_override_and_extend() {
        let cfg = GameConfig::from_toml_str(
            "[theme]\ndefault = \"night\"\n\
             [themes.night]\nbackground = \"#000000\"\nfloor = \"#111111\"\nwall = \"#eeeeee\"\ntext = \"#ffffff\"\n\
             [themes.theme2]\nbackground = \"#010203\"\nfloor = \"#010203\"\nwall = \"#010203\"\ntext = \"#010203\"\n",
        )
        .unwrap();
        assert_eq!(cfg.themes.len(), 3);
        assert_eq!(cfg.themes[cfg.default_theme].name, "night");
        assert_eq!(cfg.themes[1].background, Color::Rgb { r: 1, g: 2, b: 3 });
    }

    #[test]
    fn bad_theme_and_unknown_default_fall_back() {
        let cfg = GameConfig::from_toml_str(
            "[theme]\ndefault = \"missing\"\n\
             [themes.broken]\nbackground = \"red\"\nfloor = \"#111111\"\nwall = \"#eeeeee\"\ntext = \"#ffffff\"\n",
        )
        .unwrap();
        assert_eq!(cfg.themes.len(), 2);
        assert_eq!(cfg.default_theme, 0);
    }

    #[test]
    fn unknown_control_mode_is_a_parse_error() {
        assert!(GameConfig::from_toml_str("[controls]\nmode = \"joystick\"\n").is_err());
    }

    #[test]
    fn search_dirs_include_cwd_once() {
        let dirs = candidate_dirs();
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(dirs.iter().filter(|d| **d == cwd).count(), 1);
        assert!(dirs.len() <= 3);
        for (i, d) in dirs.iter().enumerate() {
            assert!(!dirs[i + 1..].contains(d), "duplicate {d:?}");
        }
    }
}
