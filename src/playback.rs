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

//! Playback engine for script pages
//!
//! Types page content one glyph at a time with randomised delays. Each
//! edit completes before its delay starts, and the next glyph waits for
//! both.

use anyhow::{Context, Result};
use rand::Rng;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::document::LineLookup;
use crate::editor::{Edit, EditorError, SharedEditor};
use crate::glyph::{Glyph, glyphs};
use crate::interpreter::{self, Effect};
use crate::sound::SoundPlayer;
use crate::types::{Position, ScriptPage, Selection, SoundEffects, TypingConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEnd {
    // All content typed; holds where the next glyph would have gone
    Finished(Position),
    // Cancelled before the content ran out
    Stopped(Position),
}

pub struct PlaybackEngine {
    editor: SharedEditor,
    sound: Arc<dyn SoundPlayer>,
    config: TypingConfig,
    running: Arc<AtomicBool>,
}

impl PlaybackEngine {
    pub fn new(editor: SharedEditor, sound: Arc<dyn SoundPlayer>, config: TypingConfig) -> Self {
        Self {
            editor,
            sound,
            config,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Flag that stops playback after the current glyph once set to false.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    fn should_continue(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn calculate_delay(&self) -> Duration {
        let mut rng = rand::rng();
        let mut delay = self.config.delay_base + self.config.delay_variation.mul_f64(rng.random());

        let chance = self.config.hesitation_chance.clamp(0.0, 1.0);
        if chance > 0.0 && rng.random_bool(chance) {
            delay += self.config.hesitation_delay;
        }
        delay
    }

    fn trigger_sound(&self, glyph: Glyph) {
        let SoundEffects::Category(category) = &self.config.sound_effects else {
            return;
        };
        let sound = glyph.sound();
        let playing = self.sound.play(sound, category);

        tokio::spawn(async move {
            if let Err(e) = playing.await {
                warn!("Failed to play sound {sound}: {e:#}");
            }
        });
    }

    /// Focuses the page's document, selects its start line and reveals it.
    pub async fn reveal_start(&self, page: &ScriptPage) -> Result<Position> {
        let mut editor = self.editor.lock().await;
        editor
            .show(&page.target)
            .with_context(|| format!("Failed to focus {}", page.file))?;

        let doc = editor
            .active_document()
            .ok_or(EditorError::NoActiveDocument)?;
        let range = doc.line_range(page.line);
        let start = doc.clamp(page.start());

        editor.set_selection(Selection::new(range.start, range.end));
        editor.reveal(range, page.align);
        editor.redraw();
        Ok(start)
    }

    async fn type_glyph(&self, glyph: Glyph, pos: Position) -> Result<Position> {
        let mut editor = self.editor.lock().await;
        let doc = editor
            .active_document()
            .ok_or(EditorError::NoActiveDocument)?;
        let step = interpreter::step(glyph, pos, doc);

        match step.effect {
            Effect::Insert { at, text } => editor.apply(Edit::Insert {
                at,
                text: text.to_string(),
            })?,
            Effect::Delete(range) => editor.apply(Edit::Delete(range))?,
            Effect::Move => {}
        }
        editor.set_selection(Selection::collapsed(step.cursor));

        if step.scrolls_past(editor.last_visible_line()) || step.cursor.line < editor.viewport().top {
            editor.scroll_into_view(step.cursor.line);
        }
        editor.redraw();

        Ok(step.next)
    }

    /// Types `text` into the focused document starting at `start`.
    pub async fn type_text(&self, text: &str, start: Position) -> Result<PlaybackEnd> {
        let mut pos = start;

        for glyph in glyphs(text) {
            if !self.should_continue() {
                info!(at = %pos, "Playback stopped");
                return Ok(PlaybackEnd::Stopped(pos));
            }

            pos = self.type_glyph(glyph, pos).await?;
            self.trigger_sound(glyph);

            let delay = self.calculate_delay();
            sleep(delay).await;
        }
        Ok(PlaybackEnd::Finished(pos))
    }

    pub async fn play_page(&self, page: &ScriptPage) -> Result<PlaybackEnd> {
        let start = self.reveal_start(page).await?;
        let text = page.content.joined();
        debug!(page = %page.name, chars = text.chars().count(), at = %start, "Typing page");
        self.type_text(&text, start).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{Editor, Frame, NoticeLevel, View};
    use crate::sound::{PlayFuture, Silent};
    use crate::types::{Align, Content};
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    type Frames = Arc<Mutex<Vec<(String, Selection)>>>;

    struct RecordingView(Frames);

    impl View for RecordingView {
        fn draw(&mut self, frame: Frame<'_>) -> Result<()> {
            if let Some(doc) = frame.document {
                self.0.lock().unwrap().push((doc.text(), frame.selection));
            }
            Ok(())
        }

        fn notify(&mut self, _level: NoticeLevel, _message: &str) -> Result<()> {
            Ok(())
        }
    }

    struct FailingPlayer(Arc<AtomicUsize>);

    impl SoundPlayer for FailingPlayer {
        fn play(&self, _sound: &str, _category: &str) -> PlayFuture {
            self.0.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { anyhow::bail!("no audio device") })
        }
    }

    const PATH: &str = "/work/src/lib.rs";

    fn setup(text: &str, height: usize) -> (SharedEditor, Frames) {
        let frames: Frames = Arc::default();
        let mut editor = Editor::new(Box::new(RecordingView(frames.clone())), height);
        editor.open(PathBuf::from(PATH), text);
        editor.show(Path::new(PATH)).unwrap();
        (editor.shared(), frames)
    }

    fn engine(editor: &SharedEditor) -> PlaybackEngine {
        PlaybackEngine::new(editor.clone(), Arc::new(Silent), TypingConfig::instant())
    }

    async fn text_of(editor: &SharedEditor) -> String {
        editor.lock().await.active_document().unwrap().text()
    }

    fn p(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    #[tokio::test]
    async fn test_types_literal_text() {
        let (editor, frames) = setup("", 10);
        let end = engine(&editor).type_text("ab", p(0, 0)).await.unwrap();

        assert_eq!(end, PlaybackEnd::Finished(p(0, 2)));
        assert_eq!(text_of(&editor).await, "ab");

        let frames = frames.lock().unwrap();
        let typed: Vec<_> = frames.iter().rev().take(2).rev().cloned().collect();
        assert_eq!(
            typed,
            vec![
                ("a".to_string(), Selection::collapsed(p(0, 1))),
                ("ab".to_string(), Selection::collapsed(p(0, 2))),
            ]
        );
    }

    #[tokio::test]
    async fn test_backspace_after_literal() {
        let (editor, frames) = setup("", 10);
        engine(&editor).type_text("a⌫", p(0, 0)).await.unwrap();

        let frames = frames.lock().unwrap();
        let typed: Vec<_> = frames.iter().rev().take(2).rev().cloned().collect();
        assert_eq!(
            typed,
            vec![
                ("a".to_string(), Selection::collapsed(p(0, 1))),
                (String::new(), Selection::collapsed(p(0, 0))),
            ]
        );
    }

    #[tokio::test]
    async fn test_newline_collapses_to_insert_point() {
        let (editor, frames) = setup("0123456789", 10);
        let end = engine(&editor).type_text("\n", p(0, 5)).await.unwrap();

        assert_eq!(end, PlaybackEnd::Finished(p(1, 0)));
        let frames = frames.lock().unwrap();
        let (text, selection) = frames.last().unwrap();
        assert_eq!(text, "01234\n56789");
        assert_eq!(*selection, Selection::collapsed(p(0, 5)));
    }

    #[tokio::test]
    async fn test_play_page_reveals_then_types() {
        let (editor, _frames) = setup("fn main() {\n}\n", 10);
        let page = ScriptPage {
            name: "01".into(),
            path: PathBuf::from("/work/.auto-type/01"),
            file: "src/lib.rs".into(),
            target: PathBuf::from(PATH),
            line: 0,
            col: 11,
            align: Align::Center,
            content: Content::Segments(vec!["\n    ".into(), "todo!()".into()]),
        };

        let end = engine(&editor).play_page(&page).await.unwrap();
        assert_eq!(end, PlaybackEnd::Finished(p(1, 11)));
        assert_eq!(text_of(&editor).await, "fn main() {\n    todo!()\n}\n");
    }

    #[tokio::test]
    async fn test_cursor_scrolls_into_view() {
        let (editor, _frames) = setup("", 2);
        engine(&editor).type_text("a\nb\nc\nd", p(0, 0)).await.unwrap();

        let editor = editor.lock().await;
        assert_eq!(editor.selection(), Selection::collapsed(p(3, 1)));
        assert_eq!(editor.viewport().top, 2);
    }

    #[tokio::test]
    async fn test_stop_before_start() {
        let (editor, _frames) = setup("", 10);
        let engine = engine(&editor);
        engine.stop_handle().store(false, Ordering::SeqCst);

        let end = engine.type_text("abc", p(0, 0)).await.unwrap();
        assert_eq!(end, PlaybackEnd::Stopped(p(0, 0)));
        assert_eq!(text_of(&editor).await, "");
    }

    #[tokio::test]
    async fn test_stop_mid_run_finishes_current_step() {
        let (editor, _frames) = setup("", 10);
        let config = TypingConfig {
            delay_base: Duration::from_millis(20),
            ..TypingConfig::instant()
        };
        let engine = PlaybackEngine::new(editor.clone(), Arc::new(Silent), config);
        let stop = engine.stop_handle();

        let run = tokio::spawn(async move { engine.type_text(&"x".repeat(200), p(0, 0)).await });
        sleep(Duration::from_millis(50)).await;
        stop.store(false, Ordering::SeqCst);

        let end = run.await.unwrap().unwrap();
        let PlaybackEnd::Stopped(at) = end else {
            panic!("Expected playback to stop, got {end:?}");
        };
        let typed = text_of(&editor).await;
        assert!(!typed.is_empty() && typed.len() < 200);
        assert_eq!(at, p(0, typed.len()));
    }

    #[tokio::test]
    async fn test_sound_failures_do_not_interrupt_typing() {
        let (editor, _frames) = setup("", 10);
        let calls = Arc::new(AtomicUsize::new(0));
        let config = TypingConfig {
            sound_effects: SoundEffects::Category("hacker".into()),
            ..TypingConfig::instant()
        };
        let engine = PlaybackEngine::new(editor.clone(), Arc::new(FailingPlayer(calls.clone())), config);

        let end = engine.type_text("abc", p(0, 0)).await.unwrap();
        assert_eq!(end, PlaybackEnd::Finished(p(0, 3)));
        assert_eq!(text_of(&editor).await, "abc");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_typing_without_focus_fails() {
        let editor = Editor::headless(10).shared();
        let result = engine(&editor).type_text("a", p(0, 0)).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_calculate_delay_bounds() {
        let (editor, _frames) = setup("", 10);
        let config = TypingConfig {
            hesitation_chance: 0.0,
            ..TypingConfig::default()
        };
        let engine = PlaybackEngine::new(editor.clone(), Arc::new(Silent), config);
        for _ in 0..100 {
            let delay = engine.calculate_delay();
            assert!(delay >= Duration::from_millis(20) && delay <= Duration::from_millis(100));
        }

        let config = TypingConfig {
            hesitation_chance: 1.0,
            ..TypingConfig::default()
        };
        let engine = PlaybackEngine::new(editor, Arc::new(Silent), config);
        let delay = engine.calculate_delay();
        assert!(delay >= Duration::from_millis(270) && delay <= Duration::from_millis(350));
    }
}
