// Copyright (C) 2025  Tom Waddington
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Core types for autotype scripts and playback

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

/// Zero-indexed (line, column) location in a document. Columns count chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

/// Half-open span between two positions, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(a: Position, b: Position) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Editor selection. `anchor == active` is a plain cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub anchor: Position,
    pub active: Position,
}

impl Selection {
    pub fn new(anchor: Position, active: Position) -> Self {
        Self { anchor, active }
    }

    pub fn collapsed(at: Position) -> Self {
        Self {
            anchor: at,
            active: at,
        }
    }
}

/// How the start line of a page is brought into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    // Centre the line, but only when it is outside the viewport
    Center,
    // Put the line at the top of the viewport
    Edge,
}

impl Align {
    pub fn from_front_matter(value: Option<&str>) -> Self {
        match value.unwrap_or("middle") {
            "middle" => Align::Center,
            _ => Align::Edge,
        }
    }
}

/// Text typed for a page, either whole or as ordered segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Segments(Vec<String>),
}

impl Content {
    /// Text to type. Segments are concatenated as is; the `---` lines that
    /// separated them in the page file are not part of any segment and are
    /// not typed.
    pub fn joined(&self) -> String {
        match self {
            Content::Text(text) => text.clone(),
            Content::Segments(parts) => parts.concat(),
        }
    }
}

/// One scripted unit of edits against one target file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptPage {
    // Page file name inside the script directory
    pub name: String,
    // Absolute path of the page file
    pub path: PathBuf,
    // Target file as written in the front matter
    pub file: String,
    // Target file resolved against the filesystem at load time
    pub target: PathBuf,
    pub line: usize,
    pub col: usize,
    pub align: Align,
    pub content: Content,
}

impl ScriptPage {
    pub fn start(&self) -> Position {
        Position::new(self.line, self.col)
    }
}

/// Which sound set accompanies typing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum SoundEffects {
    #[default]
    None,
    Category(String),
}

impl From<String> for SoundEffects {
    fn from(value: String) -> Self {
        match value.trim() {
            "" | "none" => SoundEffects::None,
            category => SoundEffects::Category(category.to_string()),
        }
    }
}

impl FromStr for SoundEffects {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(SoundEffects::from(s.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct TypingConfig {
    // Minimum time between keystrokes
    pub delay_base: Duration,
    // Upper bound of the uniform random time added to delay_base
    pub delay_variation: Duration,
    // Probability (0.0 to 1.0) of an extra hesitation pause
    pub hesitation_chance: f64,
    pub hesitation_delay: Duration,
    pub sound_effects: SoundEffects,
}

impl TypingConfig {
    /// No delays, no hesitation, no sound. Used to complete a page at once.
    pub fn instant() -> Self {
        Self {
            delay_base: Duration::ZERO,
            delay_variation: Duration::ZERO,
            hesitation_chance: 0.0,
            hesitation_delay: Duration::ZERO,
            sound_effects: SoundEffects::None,
        }
    }
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            delay_base: Duration::from_millis(20),
            delay_variation: Duration::from_millis(80),
            hesitation_chance: 0.1,
            hesitation_delay: Duration::from_millis(250),
            sound_effects: SoundEffects::None,
        }
    }
}
