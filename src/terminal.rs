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

//! Terminal front end for the presenter
//!
//! Draws the focused document with crossterm and turns key presses into
//! presenter commands on a background thread.

use anyhow::{Context, Result};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    queue,
    style::{Attribute, Print, SetAttribute},
    terminal::{
        self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
        enable_raw_mode,
    },
};
use std::io::{IsTerminal, Stdout, Write};
use std::thread;
use tokio::sync::mpsc::UnboundedSender;

use crate::editor::{Frame, NoticeLevel, View};

const TAB_WIDTH: usize = 4;
const GUTTER_WIDTH: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Play,
    Complete,
    Reset,
    Stop,
    Save,
    Resize(u16),
    Quit,
}

// RAII guard for raw mode and the alternate screen - only enabled if stdout is a TTY
pub struct TerminalGuard {
    enabled: bool,
}

impl TerminalGuard {
    pub fn new() -> Result<Self> {
        let enabled = if std::io::stdout().is_terminal() {
            enable_raw_mode().context("Failed to enable raw mode")?;
            crossterm::execute!(std::io::stdout(), EnterAlternateScreen)
                .context("Failed to enter alternate screen")?;
            true
        } else {
            false
        };
        Ok(TerminalGuard { enabled })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.enabled {
            let _ = crossterm::execute!(std::io::stdout(), Show, LeaveAlternateScreen);
            let _ = disable_raw_mode();
        }
    }
}

/// Rows available for document text; the last row is the status line.
pub fn text_rows() -> usize {
    let (_, rows) = terminal::size().unwrap_or((80, 24));
    rows.saturating_sub(1).max(1) as usize
}

fn map_key(key: KeyEvent) -> Option<Input> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Input::Quit),
        KeyCode::Char('p') | KeyCode::Char(' ') => Some(Input::Play),
        KeyCode::Char('c') => Some(Input::Complete),
        KeyCode::Char('r') => Some(Input::Reset),
        KeyCode::Char('s') => Some(Input::Stop),
        KeyCode::Char('w') => Some(Input::Save),
        KeyCode::Char('q') | KeyCode::Esc => Some(Input::Quit),
        _ => None,
    }
}

/// Forwards key presses until the receiver goes away.
pub fn spawn_input_thread(tx: UnboundedSender<Input>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        loop {
            let input = match event::read() {
                Ok(Event::Key(key)) => map_key(key),
                Ok(Event::Resize(_, rows)) => Some(Input::Resize(rows.saturating_sub(1).max(1))),
                Ok(_) => None,
                Err(_) => Some(Input::Quit),
            };
            if let Some(input) = input {
                if tx.send(input).is_err() || input == Input::Quit {
                    break;
                }
            }
        }
    })
}

/// Expands tabs and returns the display column of `col`.
fn render_line(line: &str, col: usize) -> (String, usize) {
    let mut out = String::with_capacity(line.len());
    let mut cursor = None;
    for (i, c) in line.chars().enumerate() {
        if i == col {
            cursor = Some(out.chars().count());
        }
        if c == '\t' {
            let width = TAB_WIDTH - out.chars().count() % TAB_WIDTH;
            out.extend(std::iter::repeat_n(' ', width));
        } else {
            out.push(c);
        }
    }
    let cursor = cursor.unwrap_or_else(|| out.chars().count());
    (out, cursor)
}

pub struct TerminalView {
    out: Stdout,
    status: String,
    title: String,
}

impl TerminalView {
    pub fn new() -> Self {
        Self {
            out: std::io::stdout(),
            status: "p play · c complete · r reset · s stop · w write · q quit".to_string(),
            title: String::new(),
        }
    }

    fn draw_status(&mut self, width: usize, row: u16) -> Result<()> {
        let mut line = format!(" {} │ {}", self.title, self.status);
        line = line.chars().take(width).collect();
        let padding = width.saturating_sub(line.chars().count());
        queue!(
            self.out,
            MoveTo(0, row),
            SetAttribute(Attribute::Reverse),
            Print(line),
            Print(" ".repeat(padding)),
            SetAttribute(Attribute::Reset),
        )?;
        Ok(())
    }
}

impl Default for TerminalView {
    fn default() -> Self {
        Self::new()
    }
}

impl View for TerminalView {
    fn draw(&mut self, frame: Frame<'_>) -> Result<()> {
        let (cols, rows) = terminal::size().unwrap_or((80, 24));
        let width = cols as usize;
        let text_width = width.saturating_sub(GUTTER_WIDTH);
        let status_row = rows.saturating_sub(1);

        queue!(self.out, Hide, MoveTo(0, 0), Clear(ClearType::All))?;

        let mut cursor_at = None;
        if let Some(doc) = frame.document {
            self.title = doc.file_name();
            let active = frame.selection.active;

            for row in 0..status_row {
                let line_no = frame.viewport.top + row as usize;
                let Some(text) = doc.line(line_no) else {
                    break;
                };
                let (rendered, cursor_col) = render_line(text, active.col);
                let visible: String = rendered.chars().take(text_width).collect();

                queue!(
                    self.out,
                    MoveTo(0, row),
                    SetAttribute(Attribute::Dim),
                    Print(format!("{:>4} ", line_no + 1)),
                    SetAttribute(Attribute::Reset),
                    Print(visible),
                )?;

                if line_no == active.line {
                    let x = (GUTTER_WIDTH + cursor_col).min(width.saturating_sub(1));
                    cursor_at = Some((x as u16, row));
                }
            }
        }

        self.draw_status(width, status_row)?;
        if let Some((x, y)) = cursor_at {
            queue!(self.out, MoveTo(x, y), Show)?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn notify(&mut self, level: NoticeLevel, message: &str) -> Result<()> {
        self.status = match level {
            NoticeLevel::Info => message.to_string(),
            NoticeLevel::Warning => format!("⚠ {message}"),
        };
        let (cols, rows) = terminal::size().unwrap_or((80, 24));
        queue!(self.out, crossterm::cursor::SavePosition)?;
        self.draw_status(cols as usize, rows.saturating_sub(1))?;
        queue!(self.out, crossterm::cursor::RestorePosition)?;
        self.out.flush()?;
        Ok(())
    }
}
