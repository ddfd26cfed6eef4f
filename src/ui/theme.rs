// localchat — A terminal chat interface for local and remote language models
// Copyright (C) 2025  Simon Peter Rothgang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use ratatui::style::Color;

// Accent
pub const RUST_ORANGE: Color = Color::Rgb(244, 118, 0);

// UI chrome
pub const PROMPT_CHAR: &str = "❯";
pub const SEPARATOR_CHAR: &str = "─";

pub const SPINNER_FRAMES: &[char] = &[
    '\u{280B}', '\u{2819}', '\u{2839}', '\u{2838}', '\u{283C}', '\u{2834}', '\u{2826}', '\u{2827}',
    '\u{2807}', '\u{280F}',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Self::Dark => DARK,
            Self::Light => LIGHT,
        }
    }
}

/// Colors for one theme mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub text: Color,
    pub dim: Color,
    pub accent: Color,
    pub role_user: Color,
    pub role_assistant: Color,
    pub role_system: Color,
    pub user_msg_bg: Color,
    pub error: Color,
    pub ready: Color,
    pub loading: Color,
}

const DARK: Palette = Palette {
    text: Color::White,
    dim: Color::DarkGray,
    accent: RUST_ORANGE,
    role_user: Color::White,
    role_assistant: RUST_ORANGE,
    role_system: Color::Yellow,
    user_msg_bg: Color::Rgb(40, 44, 52),
    error: Color::Red,
    ready: Color::Green,
    loading: Color::Yellow,
};

const LIGHT: Palette = Palette {
    text: Color::Black,
    dim: Color::Gray,
    accent: Color::Rgb(196, 86, 0),
    role_user: Color::Black,
    role_assistant: Color::Rgb(196, 86, 0),
    role_system: Color::Rgb(150, 110, 0),
    user_msg_bg: Color::Rgb(232, 234, 238),
    error: Color::Rgb(190, 30, 30),
    ready: Color::Rgb(20, 130, 40),
    loading: Color::Rgb(150, 110, 0),
};

pub fn spinner_char(frame: usize) -> char {
    SPINNER_FRAMES[frame % SPINNER_FRAMES.len()]
}
