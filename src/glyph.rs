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

//! Control glyphs understood inside page content

pub const DOWN: char = '↓';
pub const UP: char = '↑';
pub const RIGHT: char = '→';
pub const LEFT: char = '←';
pub const HOME: char = '⇤';
pub const END: char = '⇥';
pub const BACKSPACE: char = '⌫';
pub const DELETE: char = '⌦';
pub const DELETE_TO_LINE_START: char = '⇚';
pub const DELETE_TO_LINE_END: char = '⇛';
pub const SPLICE_LINE: char = '✂';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Literal(char),
    Newline,
    Down,
    Up,
    Right,
    Left,
    Home,
    End,
    Backspace,
    Delete,
    DeleteToLineStart,
    DeleteToLineEnd,
    // Removes the current line including its line break
    SpliceLine,
}

impl Glyph {
    pub fn classify(c: char) -> Self {
        match c {
            '\n' => Glyph::Newline,
            DOWN => Glyph::Down,
            UP => Glyph::Up,
            RIGHT => Glyph::Right,
            LEFT => Glyph::Left,
            HOME => Glyph::Home,
            END => Glyph::End,
            BACKSPACE => Glyph::Backspace,
            DELETE => Glyph::Delete,
            DELETE_TO_LINE_START => Glyph::DeleteToLineStart,
            DELETE_TO_LINE_END => Glyph::DeleteToLineEnd,
            SPLICE_LINE => Glyph::SpliceLine,
            other => Glyph::Literal(other),
        }
    }

    /// Name of the sound file played for this keystroke.
    pub fn sound(&self) -> &'static str {
        match self {
            Glyph::Literal(' ') => "space",
            Glyph::Literal(_) => "key",
            Glyph::Newline => "enter",
            Glyph::Down | Glyph::Up | Glyph::Right | Glyph::Left | Glyph::Home | Glyph::End => {
                "arrow"
            }
            Glyph::Backspace
            | Glyph::Delete
            | Glyph::DeleteToLineStart
            | Glyph::DeleteToLineEnd
            | Glyph::SpliceLine => "delete",
        }
    }
}

pub fn glyphs(text: &str) -> impl Iterator<Item = Glyph> + '_ {
    text.chars().map(Glyph::classify)
}
