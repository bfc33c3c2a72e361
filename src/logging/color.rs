use std::borrow::Cow;

use super::Level;

pub const COLOR_RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black = 30,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl Color {
    pub fn code(self) -> u8 {
        self as u8
    }
}

pub fn color_seq(code: u8) -> String {
    format!("\x1b[{}m", code)
}

pub fn color_seq_bold(code: u8) -> String {
    format!("\x1b[{};1m", code)
}

/// Turns numeric color codes into escape sequences, one per code, in order.
pub fn convert_colors(codes: &[u8], bold: bool) -> Vec<String> {
    let seq = if bold { color_seq_bold } else { color_seq };
    codes.iter().map(|&code| seq(code)).collect()
}

// Indexed by `Level::index()`. Info is left uncolored.
const COLORS: [&str; 6] = [
    "\x1b[35m", "\x1b[31m", "\x1b[33m", "\x1b[32m", "", "\x1b[36m",
];

const BOLD_COLORS: [&str; 6] = [
    "\x1b[35;1m",
    "\x1b[31;1m",
    "\x1b[33;1m",
    "\x1b[32;1m",
    "",
    "\x1b[36;1m",
];

pub fn default_color(level: Level) -> &'static str {
    COLORS[level.index()]
}

pub fn default_bold_color(level: Level) -> &'static str {
    BOLD_COLORS[level.index()]
}

/// Escape sequence for a format layout: `"bold"`, `"reset"`, or anything else for the
/// plain color.
pub fn level_color(layout: &str, level: Level) -> &'static str {
    match layout {
        "bold" => default_bold_color(level),
        "reset" => COLOR_RESET,
        _ => default_color(level),
    }
}

/// Per-backend coloring settings.
#[derive(Debug, Clone, Default)]
pub struct Colorizer {
    pub enabled: bool,
    /// Indexed by `Level::index()`. Missing or empty entries fall back to the defaults.
    pub overrides: Vec<String>,
}

impl Colorizer {
    pub fn new(enabled: bool, overrides: Vec<String>) -> Self {
        Self { enabled, overrides }
    }

    pub fn color_for(&self, level: Level) -> &str {
        match self.overrides.get(level.index()) {
            Some(color) if !color.is_empty() => color,
            _ => default_color(level),
        }
    }

    /// Wraps the text in the level's color when enabled; the result is written in one go.
    pub fn paint<'a>(&self, level: Level, text: &'a str) -> Cow<'a, str> {
        if !self.enabled {
            return Cow::Borrowed(text);
        }

        let color = self.color_for(level);
        let mut painted = String::with_capacity(color.len() + text.len() + COLOR_RESET.len());
        painted.push_str(color);
        painted.push_str(text);
        painted.push_str(COLOR_RESET);
        Cow::Owned(painted)
    }
}
