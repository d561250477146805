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

//! Command surface for a live session
//!
//! Each command loads the script afresh, so pages can be edited between
//! runs. Only one page types at a time.

use std::path::{Path, PathBuf};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use anyhow::{Context, Result};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use crate::editor::{NoticeLevel, SharedEditor};
use crate::playback::{PlaybackEnd, PlaybackEngine};
use crate::script::{LoadNotice, load_script};
use crate::session::{Next, Session};
use crate::sound::{Silent, SoundPlayer};
use crate::types::{ScriptPage, TypingConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    // Typing continues in the background
    Started(String),
    Completed(String),
    EndOfScript,
    NothingToDo(LoadNotice),
    // Another page is still typing; the command was ignored
    Busy,
}

impl Outcome {
    /// Message to show the user.
    pub fn notice(&self) -> (NoticeLevel, String) {
        match self {
            Outcome::Started(page) => (NoticeLevel::Info, format!("Typing {page}")),
            Outcome::Completed(page) => (NoticeLevel::Info, format!("Completed {page}")),
            Outcome::EndOfScript => (NoticeLevel::Info, "No more script pages.".to_string()),
            Outcome::NothingToDo(notice) => (NoticeLevel::Warning, notice.to_string()),
            Outcome::Busy => (
                NoticeLevel::Info,
                "Still typing the previous page.".to_string(),
            ),
        }
    }
}

enum Prepared {
    // The page to play and the script it belongs to
    Page(ScriptPage, Vec<ScriptPage>),
    Done(Outcome),
}

struct ActiveRun {
    page: String,
    running: Arc<AtomicBool>,
    handle: JoinHandle<Result<PlaybackEnd>>,
}

pub struct Presenter {
    script_dir: PathBuf,
    config: TypingConfig,
    editor: SharedEditor,
    sound: Arc<dyn SoundPlayer>,
    session: Session,
    active: Option<ActiveRun>,
}

impl Presenter {
    pub fn new(
        script_dir: PathBuf,
        config: TypingConfig,
        editor: SharedEditor,
        sound: Arc<dyn SoundPlayer>,
    ) -> Self {
        Self {
            script_dir,
            config,
            editor,
            sound,
            session: Session::new(),
            active: None,
        }
    }

    pub fn script_dir(&self) -> &Path {
        &self.script_dir
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn editor(&self) -> &SharedEditor {
        &self.editor
    }

    /// Whether a page is still typing. Forgets runs that have ended.
    pub fn is_busy(&mut self) -> bool {
        if let Some(run) = &self.active {
            if !run.handle.is_finished() {
                return true;
            }
        }
        self.active = None;
        false
    }

    async fn prepare(&mut self) -> Result<Prepared> {
        let script = load_script(&self.script_dir)?;
        if let Some(notice) = script.notice {
            return Ok(Prepared::Done(Outcome::NothingToDo(notice)));
        }

        let page = match self.session.peek(&script.pages) {
            Next::Page(page) => page.clone(),
            Next::EndOfScript => return Ok(Prepared::Done(Outcome::EndOfScript)),
        };
        debug!(page = %page.name, index = self.session.index(), "Selected page");

        self.open_documents(&script.pages, &page).await?;
        Ok(Prepared::Page(page, script.pages))
    }

    /// Opens every page's target concurrently. Only the current page's
    /// target has to succeed.
    async fn open_documents(&self, pages: &[ScriptPage], current: &ScriptPage) -> Result<()> {
        let mut targets: Vec<PathBuf> = Vec::new();
        {
            let editor = self.editor.lock().await;
            for page in pages {
                if !targets.contains(&page.target) && !editor.is_open(&page.target) {
                    targets.push(page.target.clone());
                }
            }
        }

        let mut reads = JoinSet::new();
        for path in targets {
            reads.spawn(async move {
                let text = tokio::fs::read_to_string(&path).await;
                (path, text)
            });
        }

        while let Some(joined) = reads.join_next().await {
            let (path, text) = joined.context("Document reader failed")?;
            match text {
                Ok(text) => self.editor.lock().await.open(path, &text),
                Err(e) if path == current.target => {
                    return Err(e).with_context(|| format!("Failed to open {}", path.display()));
                }
                Err(e) => warn!("Failed to open {}: {e}", path.display()),
            }
        }
        Ok(())
    }

    /// Types the next page in the background, one glyph at a time.
    pub async fn play(&mut self) -> Result<Outcome> {
        if self.is_busy() {
            return Ok(Outcome::Busy);
        }
        let (page, pages) = match self.prepare().await? {
            Prepared::Page(page, pages) => (page, pages),
            Prepared::Done(outcome) => return Ok(outcome),
        };

        let engine = PlaybackEngine::new(self.editor.clone(), self.sound.clone(), self.config.clone());
        let start = engine.reveal_start(&page).await?;
        // Counted as played only once the page is on screen
        self.session.next(&pages);
        let running = engine.stop_handle();
        let editor = self.editor.clone();
        let name = page.name.clone();
        let text = page.content.joined();

        let handle = tokio::spawn({
            let name = name.clone();
            async move {
                let result = engine.type_text(&text, start).await;
                match &result {
                    Ok(end) => info!(page = %name, ?end, "Playback ended"),
                    Err(e) => {
                        warn!(page = %name, "Playback failed: {e:#}");
                        editor
                            .lock()
                            .await
                            .notify(NoticeLevel::Warning, &format!("Typing {name} failed: {e:#}"));
                    }
                }
                result
            }
        });

        self.active = Some(ActiveRun {
            page: name.clone(),
            running,
            handle,
        });
        Ok(Outcome::Started(name))
    }

    /// Applies the next page's edits immediately, without delays or sound.
    pub async fn complete(&mut self) -> Result<Outcome> {
        if self.is_busy() {
            return Ok(Outcome::Busy);
        }
        let (page, pages) = match self.prepare().await? {
            Prepared::Page(page, pages) => (page, pages),
            Prepared::Done(outcome) => return Ok(outcome),
        };

        let engine = PlaybackEngine::new(self.editor.clone(), Arc::new(Silent), TypingConfig::instant());
        let start = engine.reveal_start(&page).await?;
        self.session.next(&pages);
        let end = engine.type_text(&page.content.joined(), start).await?;
        debug!(page = %page.name, ?end, "Completed page");
        Ok(Outcome::Completed(page.name))
    }

    /// Starts the script over. A page that is typing stops after its current glyph.
    pub fn reset(&mut self) {
        self.session.reset();
        if let Some(run) = &self.active {
            info!(page = %run.page, "Reset while typing, stopping");
            run.running.store(false, Ordering::SeqCst);
        }
    }

    /// Stops the active run and waits for it.
    pub async fn stop(&mut self) -> Result<Option<PlaybackEnd>> {
        if let Some(run) = &self.active {
            run.running.store(false, Ordering::SeqCst);
        }
        self.wait().await
    }

    /// Waits for the active run, if any, to end.
    pub async fn wait(&mut self) -> Result<Option<PlaybackEnd>> {
        let Some(run) = self.active.take() else {
            return Ok(None);
        };
        let end = run.handle.await.context("Playback task panicked")??;
        Ok(Some(end))
    }

    /// Writes every modified document to disk, returning how many were written.
    pub async fn save(&self) -> Result<usize> {
        let mut editor = self.editor.lock().await;
        let mut written = 0;
        for doc in editor.documents_mut() {
            if !doc.is_modified() {
                continue;
            }
            tokio::fs::write(doc.path(), doc.to_disk_text())
                .await
                .with_context(|| format!("Failed to write {}", doc.path().display()))?;
            doc.mark_saved();
            written += 1;
        }
        info!(written, "Saved documents");
        Ok(written)
    }
}
