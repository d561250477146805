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

//! Which page plays next

use crate::types::ScriptPage;

#[derive(Debug, PartialEq, Eq)]
pub enum Next<'a> {
    Page(&'a ScriptPage),
    EndOfScript,
}

/// Position in the script for the lifetime of the process.
#[derive(Debug, Default)]
pub struct Session {
    index: usize,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The page `next` would return, without advancing.
    pub fn peek<'a>(&self, pages: &'a [ScriptPage]) -> Next<'a> {
        match pages.get(self.index) {
            Some(page) => Next::Page(page),
            None => Next::EndOfScript,
        }
    }

    /// Returns the current page and advances past it. At or beyond the
    /// end the index is left untouched.
    pub fn next<'a>(&mut self, pages: &'a [ScriptPage]) -> Next<'a> {
        let next = self.peek(pages);
        if let Next::Page(_) = next {
            self.index += 1;
        }
        next
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Align, Content};
    use std::path::PathBuf;

    fn pages(n: usize) -> Vec<ScriptPage> {
        (0..n)
            .map(|i| ScriptPage {
                name: format!("{i:02}"),
                path: PathBuf::from(format!("/work/.auto-type/{i:02}")),
                file: "main.rs".into(),
                target: PathBuf::from("/work/main.rs"),
                line: i,
                col: 0,
                align: Align::Center,
                content: Content::Text(String::new()),
            })
            .collect()
    }

    #[test]
    fn test_next_walks_pages_in_order() {
        let pages = pages(2);
        let mut session = Session::new();
        assert_eq!(session.next(&pages), Next::Page(&pages[0]));
        assert_eq!(session.next(&pages), Next::Page(&pages[1]));
        assert_eq!(session.index(), 2);
    }

    #[test]
    fn test_end_of_script_does_not_advance() {
        let pages = pages(1);
        let mut session = Session::new();
        session.next(&pages);
        assert_eq!(session.next(&pages), Next::EndOfScript);
        assert_eq!(session.next(&pages), Next::EndOfScript);
        assert_eq!(session.index(), 1);
    }

    #[test]
    fn test_reset_returns_to_first_page() {
        let pages = pages(3);
        let mut session = Session::new();
        for played in 0..5 {
            for _ in 0..played {
                session.next(&pages);
            }
            session.reset();
            assert_eq!(session.next(&pages), Next::Page(&pages[0]));
            session.reset();
        }
    }

    #[test]
    fn test_peek_does_not_advance() {
        let pages = pages(2);
        let mut session = Session::new();
        assert_eq!(session.peek(&pages), Next::Page(&pages[0]));
        assert_eq!(session.peek(&pages), Next::Page(&pages[0]));
        assert_eq!(session.index(), 0);
        session.next(&pages);
        session.next(&pages);
        assert_eq!(session.peek(&pages), Next::EndOfScript);
    }

    #[test]
    fn test_empty_script() {
        let mut session = Session::new();
        assert_eq!(session.next(&[]), Next::EndOfScript);
        assert_eq!(session.index(), 0);
    }
}
