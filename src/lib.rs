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

//! autotype replays scripted code changes as live typing.
//!
//! A script is a directory of pages. Each page names a target file, a
//! start position and the text to type, which may contain control glyphs
//! for cursor movement and deletion (see [`glyph`]).

pub mod config;
pub mod document;
pub mod editor;
pub mod front_matter;
pub mod glyph;
pub mod interpreter;
pub mod playback;
pub mod presenter;
pub mod script;
pub mod session;
pub mod sound;
pub mod terminal;
pub mod types;
