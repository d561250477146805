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

//! Editor host
//!
//! Holds the open documents, the focused one, its selection and the
//! viewport. Every change is pushed to a [`View`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::document::TextDocument;
use crate::types::{Align, Position, Range, Selection};

pub type SharedEditor = Arc<Mutex<Editor>>;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("no document is focused")]
    NoActiveDocument,
    #[error("{} is not open", .0.display())]
    NotOpen(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// Visible window of lines in the focused document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub top: usize,
    pub height: usize,
}

impl Viewport {
    pub fn last_line(&self) -> usize {
        self.top + self.height.max(1) - 1
    }

    pub fn contains(&self, line: usize) -> bool {
        line >= self.top && line <= self.last_line()
    }
}

/// What a view needs to draw the focused document.
pub struct Frame<'a> {
    pub document: Option<&'a TextDocument>,
    pub selection: Selection,
    pub viewport: Viewport,
}

pub trait View: Send {
    fn draw(&mut self, frame: Frame<'_>) -> Result<()>;
    fn notify(&mut self, level: NoticeLevel, message: &str) -> Result<()>;
}

/// View that draws nothing and routes notices to the log.
#[derive(Debug, Default)]
pub struct HeadlessView;

impl View for HeadlessView {
    fn draw(&mut self, _frame: Frame<'_>) -> Result<()> {
        Ok(())
    }

    fn notify(&mut self, level: NoticeLevel, message: &str) -> Result<()> {
        match level {
            NoticeLevel::Info => info!("{message}"),
            NoticeLevel::Warning => warn!("{message}"),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Insert { at: Position, text: String },
    Delete(Range),
}

pub struct Editor {
    documents: Vec<TextDocument>,
    active: Option<usize>,
    selection: Selection,
    viewport: Viewport,
    view: Box<dyn View>,
}

impl Editor {
    pub fn new(view: Box<dyn View>, height: usize) -> Self {
        Self {
            documents: Vec::new(),
            active: None,
            selection: Selection::default(),
            viewport: Viewport {
                top: 0,
                height: height.max(1),
            },
            view,
        }
    }

    pub fn headless(height: usize) -> Self {
        Self::new(Box::new(HeadlessView), height)
    }

    pub fn shared(self) -> SharedEditor {
        Arc::new(Mutex::new(self))
    }

    fn index_of(&self, path: &Path) -> Option<usize> {
        self.documents.iter().position(|doc| doc.path() == path)
    }

    pub fn is_open(&self, path: &Path) -> bool {
        self.index_of(path).is_some()
    }

    /// Adds a document unless one with the same path is already open.
    /// An open document keeps its unsaved edits.
    pub fn open(&mut self, path: PathBuf, text: &str) {
        if self.is_open(&path) {
            return;
        }
        self.documents.push(TextDocument::from_text(path, text));
    }

    pub fn documents(&self) -> &[TextDocument] {
        &self.documents
    }

    pub fn documents_mut(&mut self) -> &mut [TextDocument] {
        &mut self.documents
    }

    /// Focuses an open document.
    pub fn show(&mut self, path: &Path) -> Result<(), EditorError> {
        let index = self
            .index_of(path)
            .ok_or_else(|| EditorError::NotOpen(path.to_path_buf()))?;
        if self.active != Some(index) {
            self.active = Some(index);
            self.selection = Selection::default();
            self.viewport.top = 0;
        }
        self.redraw();
        Ok(())
    }

    pub fn active_document(&self) -> Option<&TextDocument> {
        self.active.and_then(|i| self.documents.get(i))
    }

    fn active_document_mut(&mut self) -> Result<&mut TextDocument, EditorError> {
        self.active
            .and_then(|i| self.documents.get_mut(i))
            .ok_or(EditorError::NoActiveDocument)
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn last_visible_line(&self) -> usize {
        self.viewport.last_line()
    }

    pub fn resize(&mut self, height: usize) {
        self.viewport.height = height.max(1);
        self.redraw();
    }

    /// Applies one edit to the focused document as a single change.
    pub fn apply(&mut self, edit: Edit) -> Result<(), EditorError> {
        let doc = self.active_document_mut()?;
        match edit {
            Edit::Insert { at, text } => {
                doc.insert(at, &text);
            }
            Edit::Delete(range) => {
                doc.delete(range);
            }
        }
        Ok(())
    }

    /// Scrolls so that `range.start` is visible according to `align`.
    pub fn reveal(&mut self, range: Range, align: Align) {
        let line = range.start.line;
        let height = self.viewport.height.max(1);
        match align {
            Align::Center => {
                if !self.viewport.contains(line) {
                    self.viewport.top = line.saturating_sub(height / 2);
                }
            }
            Align::Edge => self.viewport.top = line,
        }
    }

    /// Scrolls the least amount needed to show `line`.
    pub fn scroll_into_view(&mut self, line: usize) {
        if line < self.viewport.top {
            self.viewport.top = line;
        } else if line > self.viewport.last_line() {
            self.viewport.top = line + 1 - self.viewport.height.max(1);
        }
    }

    pub fn redraw(&mut self) {
        let frame = Frame {
            document: self.active.and_then(|i| self.documents.get(i)),
            selection: self.selection,
            viewport: self.viewport,
        };
        if let Err(e) = self.view.draw(frame) {
            warn!("Failed to draw editor: {e:#}");
        }
    }

    pub fn notify(&mut self, level: NoticeLevel, message: &str) {
        if let Err(e) = self.view.notify(level, message) {
            warn!("Failed to show notice '{message}': {e:#}");
        }
    }
}
