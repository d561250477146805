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

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use autotype::config::Settings;
use autotype::editor::{Editor, NoticeLevel};
use autotype::presenter::Presenter;
use autotype::script::load_script;
use autotype::sound::{CommandPlayer, Silent, SoundPlayer};
use autotype::terminal::{Input, TerminalGuard, TerminalView, spawn_input_thread, text_rows};
use autotype::types::SoundEffects;

#[derive(Parser, Debug)]
#[command(name = "autotype", version, about = "Replay scripted code changes as live typing")]
struct Cli {
    /// Workspace root that holds the script directory
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Settings file [default: <workspace>/.auto-type.json]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write logs here while the presenter owns the terminal
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Minimum milliseconds between keystrokes
    #[arg(long)]
    delay_base: Option<f64>,

    /// Random milliseconds added on top of the base delay
    #[arg(long)]
    delay_variation: Option<f64>,

    /// Sound set to play while typing, or "none"
    #[arg(long)]
    sound_effects: Option<SoundEffects>,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Mode {
    /// Type pages into the terminal editor, one key press at a time
    #[default]
    Present,
    /// Load the script and list its pages
    Check,
}

fn init_logging(log_file: Option<&Path>, mode: Mode) -> Result<()> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match (log_file, mode) {
        (Some(path), _) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        // Log lines would tear the presenter's screen
        (None, Mode::Present) => {
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(std::io::sink)
                .init();
        }
        (None, Mode::Check) => {
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn check(script_dir: &Path) -> Result<()> {
    let script = load_script(script_dir)?;
    if let Some(notice) = script.notice {
        warn!("{notice}");
        return Ok(());
    }

    for page in &script.pages {
        println!(
            "{}\t{}:{}:{}\t{:?}\t{} chars",
            page.name,
            page.target.display(),
            page.line + 1,
            page.col + 1,
            page.align,
            page.content.joined().chars().count()
        );
    }
    Ok(())
}

async fn present(workspace: &Path, settings: &Settings) -> Result<()> {
    let config = settings.typing_config();
    let sound: Arc<dyn SoundPlayer> = match config.sound_effects {
        SoundEffects::None => Arc::new(Silent),
        SoundEffects::Category(_) => Arc::new(CommandPlayer::new(
            settings.sound_dir(workspace),
            settings.sound_player.clone(),
        )),
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let interrupt = tx.clone();
    ctrlc::set_handler(move || {
        let _ = interrupt.send(Input::Quit);
    })?;

    let _terminal = TerminalGuard::new()?;
    let editor = Editor::new(Box::new(TerminalView::new()), text_rows()).shared();
    let mut presenter = Presenter::new(settings.script_dir(workspace), config, editor.clone(), sound);
    editor.lock().await.redraw();
    info!(script = %presenter.script_dir().display(), "Presenter ready");

    let _input = spawn_input_thread(tx);

    while let Some(input) = rx.recv().await {
        let notice = match input {
            Input::Play => presenter.play().await.map(|outcome| Some(outcome.notice())),
            Input::Complete => presenter.complete().await.map(|outcome| Some(outcome.notice())),
            Input::Reset => {
                presenter.reset();
                Ok(Some((NoticeLevel::Info, "Back to the first page.".to_string())))
            }
            Input::Stop => presenter
                .stop()
                .await
                .map(|end| end.map(|_| (NoticeLevel::Info, "Stopped.".to_string()))),
            Input::Save => presenter
                .save()
                .await
                .map(|written| Some((NoticeLevel::Info, format!("Wrote {written} file(s)")))),
            Input::Resize(rows) => {
                editor.lock().await.resize(rows as usize);
                Ok(None)
            }
            Input::Quit => break,
        };

        let notice = notice.unwrap_or_else(|e| {
            warn!("{e:#}");
            Some((NoticeLevel::Warning, format!("{e:#}")))
        });
        if let Some((level, message)) = notice {
            editor.lock().await.notify(level, &message);
        }
    }

    if let Err(e) = presenter.stop().await {
        warn!("Playback ended with an error: {e:#}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mode = cli.mode.unwrap_or_default();
    init_logging(cli.log_file.as_deref(), mode)?;

    let workspace = cli
        .workspace
        .canonicalize()
        .with_context(|| format!("Workspace {} not found", cli.workspace.display()))?;

    let mut settings = Settings::load(&workspace, cli.config.as_deref())?;
    if let Some(base) = cli.delay_base {
        settings.character_delay_base = base;
    }
    if let Some(variation) = cli.delay_variation {
        settings.character_delay_variation = variation;
    }
    if let Some(sound_effects) = cli.sound_effects {
        settings.sound_effects = sound_effects;
    }
    settings.validate()?;

    match mode {
        Mode::Present => present(&workspace, &settings).await,
        Mode::Check => check(&settings.script_dir(&workspace)),
    }
}
