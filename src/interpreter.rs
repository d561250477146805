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

//! Typing interpreter
//!
//! Turns one glyph and the current cursor into the edit to apply, where
//! the cursor lands, and where the next glyph starts. Pure: the document
//! is only consulted for line lengths.

use crate::document::LineLookup;
use crate::glyph::Glyph;
use crate::types::{Position, Range};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Insert { at: Position, text: char },
    Delete(Range),
    Move,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub effect: Effect,
    // Cursor once the effect is applied
    pub cursor: Position,
    // Where the following glyph is interpreted
    pub next: Position,
}

impl Step {
    fn moved(to: Position) -> Self {
        Self {
            effect: Effect::Move,
            cursor: to,
            next: to,
        }
    }

    fn delete(range: Range, cursor: Position) -> Self {
        if range.is_empty() {
            return Self::moved(cursor);
        }
        Self {
            effect: Effect::Delete(range),
            cursor,
            next: cursor,
        }
    }

    /// Whether the cursor has left a viewport whose last line is `last_visible`.
    pub fn scrolls_past(&self, last_visible: usize) -> bool {
        self.cursor.line > last_visible
    }
}

pub fn step(glyph: Glyph, pos: Position, doc: &impl LineLookup) -> Step {
    let pos = doc.clamp(pos);
    let Position { line, col } = pos;
    let line_len = doc.line_len(line);
    let last_line = doc.last_line();

    match glyph {
        Glyph::Literal(c) => {
            let after = Position::new(line, col + 1);
            Step {
                effect: Effect::Insert { at: pos, text: c },
                cursor: after,
                next: after,
            }
        }
        // The cursor stays on the pre-insert point; typing resumes on the new line
        Glyph::Newline => Step {
            effect: Effect::Insert { at: pos, text: '\n' },
            cursor: pos,
            next: Position::new(line + 1, 0),
        },
        Glyph::Down => Step::moved(doc.clamp(Position::new((line + 1).min(last_line), col))),
        Glyph::Up => Step::moved(doc.clamp(Position::new(line.saturating_sub(1), col))),
        Glyph::Right => Step::moved(Position::new(line, (col + 1).min(line_len))),
        Glyph::Left => Step::moved(Position::new(line, col.saturating_sub(1))),
        Glyph::Home => Step::moved(Position::new(line, 0)),
        Glyph::End => Step::moved(doc.line_end(line)),
        Glyph::Backspace => {
            let from = if col > 0 {
                Position::new(line, col - 1)
            } else if line > 0 {
                doc.line_end(line - 1)
            } else {
                pos
            };
            Step::delete(Range::new(from, pos), from)
        }
        Glyph::Delete => {
            let to = if col < line_len {
                Position::new(line, col + 1)
            } else if line < last_line {
                Position::new(line + 1, 0)
            } else {
                pos
            };
            Step::delete(Range::new(pos, to), pos)
        }
        Glyph::DeleteToLineStart => {
            let start = Position::new(line, 0);
            Step::delete(Range::new(start, pos), start)
        }
        Glyph::DeleteToLineEnd => Step::delete(Range::new(pos, doc.line_end(line)), pos),
        Glyph::SpliceLine => {
            let start = Position::new(line, 0);
            // The last line has no following break, so only its text goes
            let end = if line < last_line {
                Position::new(line + 1, 0)
            } else {
                doc.line_end(line)
            };
            Step::delete(Range::new(start, end), start)
        }
    }
}
