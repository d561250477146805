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

//! Sound playback for typing effects
//!
//! Sounds live at `<dir>/<category>/<name>.mp3` and are played by an
//! external program. Playback is best effort.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;

use anyhow::{Context, Result, bail};
use tokio::process::Command;

pub type PlayFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;

pub trait SoundPlayer: Send + Sync {
    fn play(&self, sound: &str, category: &str) -> PlayFuture;
}

/// Plays nothing.
#[derive(Debug, Default)]
pub struct Silent;

impl SoundPlayer for Silent {
    fn play(&self, _sound: &str, _category: &str) -> PlayFuture {
        Box::pin(async { Ok(()) })
    }
}

/// Runs an audio player program once per sound.
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    program: Option<String>,
    sound_dir: PathBuf,
}

fn default_program() -> Option<&'static str> {
    if cfg!(target_os = "windows") {
        None
    } else if cfg!(target_os = "macos") {
        Some("afplay")
    } else {
        Some("mpg123")
    }
}

fn player_args(program: &str, file: &Path) -> Vec<String> {
    let file = file.display().to_string();
    let name = Path::new(program)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match name.as_str() {
        "afplay" => vec!["-v".into(), "1".into(), file],
        "mpg123" => vec!["-q".into(), file],
        "mplayer" => vec!["-really-quiet".into(), file],
        _ => vec![file],
    }
}

impl CommandPlayer {
    /// `program` overrides the platform default player.
    pub fn new(sound_dir: impl Into<PathBuf>, program: Option<String>) -> Self {
        Self {
            program: program.or_else(|| default_program().map(str::to_string)),
            sound_dir: sound_dir.into(),
        }
    }

    pub fn sound_path(&self, sound: &str, category: &str) -> PathBuf {
        self.sound_dir.join(category).join(format!("{sound}.mp3"))
    }
}

impl SoundPlayer for CommandPlayer {
    fn play(&self, sound: &str, category: &str) -> PlayFuture {
        let file = self.sound_path(sound, category);
        let program = self.program.clone();

        Box::pin(async move {
            let Some(program) = program else {
                return Ok(());
            };
            if !file.is_file() {
                bail!("Sound file {} does not exist", file.display());
            }

            let status = Command::new(&program)
                .args(player_args(&program, &file))
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await
                .with_context(|| format!("Failed to run {program}"))?;

            if !status.success() {
                bail!("{program} exited with {status} playing {}", file.display());
            }
            Ok(())
        })
    }
}
