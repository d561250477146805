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

//! In-memory text document
//!
//! Lines are stored without terminators. Columns are char indices, so
//! multi-byte text never splits a code point.

use std::path::{Path, PathBuf};

use crate::types::{Position, Range};

/// Per-line lookups the typing interpreter needs.
pub trait LineLookup {
    /// Always at least 1; an empty document has one empty line.
    fn line_count(&self) -> usize;
    /// Length in chars of `line`, 0 past the end of the document.
    fn line_len(&self, line: usize) -> usize;

    fn last_line(&self) -> usize {
        self.line_count().saturating_sub(1)
    }

    fn line_end(&self, line: usize) -> Position {
        Position::new(line, self.line_len(line))
    }

    fn end_position(&self) -> Position {
        self.line_end(self.last_line())
    }

    fn clamp(&self, pos: Position) -> Position {
        let line = pos.line.min(self.last_line());
        Position::new(line, pos.col.min(self.line_len(line)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TextDocument {
    path: PathBuf,
    lines: Vec<String>,
    line_ending: LineEnding,
    modified: bool,
}

fn byte_index(line: &str, col: usize) -> usize {
    line.char_indices()
        .nth(col)
        .map(|(i, _)| i)
        .unwrap_or(line.len())
}

impl TextDocument {
    pub fn from_text(path: impl Into<PathBuf>, text: &str) -> Self {
        let line_ending = if text.contains("\r\n") {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        };
        let normalized = text.replace("\r\n", "\n");

        Self {
            path: path.into(),
            lines: normalized.split('\n').map(str::to_string).collect(),
            line_ending,
            modified: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn mark_saved(&mut self) {
        self.modified = false;
    }

    pub fn line(&self, line: usize) -> Option<&str> {
        self.lines.get(line).map(String::as_str)
    }

    pub fn line_range(&self, line: usize) -> Range {
        let line = line.min(self.last_line());
        Range::new(Position::new(line, 0), self.line_end(line))
    }

    /// Full text using `\n` separators.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Full text using the line ending the document was loaded with.
    pub fn to_disk_text(&self) -> String {
        self.lines.join(self.line_ending.as_str())
    }

    /// Inserts `text` at `at`, returning the position just after it.
    pub fn insert(&mut self, at: Position, text: &str) -> Position {
        let at = self.clamp(at);
        let line = &mut self.lines[at.line];
        let split = byte_index(line, at.col);
        let tail = line.split_off(split);

        let mut inserted = text.split('\n');
        let first = inserted.next().unwrap_or_default();
        line.push_str(first);

        let mut end = Position::new(at.line, at.col + first.chars().count());
        let mut insert_at = at.line + 1;
        for piece in inserted {
            self.lines.insert(insert_at, piece.to_string());
            end = Position::new(insert_at, piece.chars().count());
            insert_at += 1;
        }
        self.lines[end.line].push_str(&tail);

        self.modified = true;
        end
    }

    /// Removes the text inside `range`, returning it.
    pub fn delete(&mut self, range: Range) -> String {
        let start = self.clamp(range.start);
        let end = self.clamp(range.end);
        if start >= end {
            return String::new();
        }

        let start_byte = byte_index(&self.lines[start.line], start.col);
        let end_byte = byte_index(&self.lines[end.line], end.col);

        let removed = if start.line == end.line {
            self.lines[start.line]
                .drain(start_byte..end_byte)
                .collect::<String>()
        } else {
            let tail = self.lines[end.line][end_byte..].to_string();
            let mut removed = self.lines[start.line].split_off(start_byte);
            for line in self.lines.drain(start.line + 1..end.line) {
                removed.push('\n');
                removed.push_str(&line);
            }
            // The end line has shifted up to start.line + 1
            let end_line = self.lines.remove(start.line + 1);
            removed.push('\n');
            removed.push_str(&end_line[..end_byte]);
            self.lines[start.line].push_str(&tail);
            removed
        };

        self.modified = true;
        removed
    }
}

impl LineLookup for TextDocument {
    fn line_count(&self) -> usize {
        self.lines.len().max(1)
    }

    fn line_len(&self, line: usize) -> usize {
        self.lines.get(line).map_or(0, |l| l.chars().count())
    }
}
