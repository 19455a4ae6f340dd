/// Color themes. Cosmetic only: consumed by the renderer, never by game logic.

use crossterm::style::Color;

#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
    pub name: String,
    pub background: Color,
    pub floor: Color,
    pub wall: Color,
    pub text: Color,
}

impl Theme {
    /// Build a theme from `#rrggbb` strings. None if any color is malformed.
    pub fn from_hex(name: &str, background: &str, floor: &str, wall: &str, text: &str) -> Option<Self> {
        Some(Theme {
            name: name.to_string(),
            background: parse_hex(background)?,
            floor: parse_hex(floor)?,
            wall: parse_hex(wall)?,
            text: parse_hex(text)?,
        })
    }
}

/// Parse `#rrggbb` (leading `#` optional) into an RGB color.
pub fn parse_hex(s: &str) -> Option<Color> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color::Rgb { r: channel(0)?, g: channel(2)?, b: channel(4)? })
}

/// The two stock themes: teal and sand.
pub fn builtin() -> Vec<Theme> {
    vec![
        Theme {
            name: "theme1".into(),
            background: Color::Rgb { r: 0x2a, g: 0x91, b: 0x78 },
            floor: Color::Rgb { r: 0x51, g: 0xc2, b: 0xa7 },
            wall: Color::Rgb { r: 0x44, g: 0x3d, b: 0x8a },
            text: Color::Rgb { r: 0x86, g: 0x80, b: 0xbd },
        },
        Theme {
            name: "theme2".into(),
            background: Color::Rgb { r: 0xeb, g: 0xb9, b: 0x57 },
            floor: Color::Rgb { r: 0xeb, g: 0xc8, b: 0x83 },
            wall: Color::Rgb { r: 0x44, g: 0x3d, b: 0x8a },
            text: Color::Rgb { r: 0x44, g: 0x3d, b: 0x8a },
        },
    ]
}
