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

//! Settings file loading
//!
//! Settings are read from JSON with camelCase keys. Every key is
//! optional; command-line flags are applied on top.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use tracing::debug;

use crate::types::{SoundEffects, TypingConfig};

pub const SETTINGS_FILE: &str = ".auto-type.json";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct Settings {
    pub sound_effects: SoundEffects,
    // Milliseconds
    pub character_delay_base: f64,
    // Milliseconds
    pub character_delay_variation: f64,
    pub hesitation_chance: f64,
    // Milliseconds
    pub hesitation_delay: f64,
    pub sound_directory: PathBuf,
    pub sound_player: Option<String>,
    pub script_directory: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_effects: SoundEffects::None,
            character_delay_base: 20.0,
            character_delay_variation: 80.0,
            hesitation_chance: 0.1,
            hesitation_delay: 250.0,
            sound_directory: PathBuf::from("audio"),
            sound_player: None,
            script_directory: PathBuf::from(".auto-type"),
        }
    }
}

fn millis(value: f64) -> Duration {
    Duration::from_micros((value * 1000.0).round() as u64)
}

impl Settings {
    /// Reads `path`, or `<workspace>/.auto-type.json` when no path is given.
    /// A missing default file yields the defaults.
    pub fn load(workspace: &Path, path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (workspace.join(SETTINGS_FILE), false),
        };

        if !required && !path.exists() {
            debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }

        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        let settings = Self::from_json(&text)
            .with_context(|| format!("Invalid settings in {}", path.display()))?;
        debug!(path = %path.display(), ?settings, "Loaded settings");
        Ok(settings)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("characterDelayBase", self.character_delay_base),
            ("characterDelayVariation", self.character_delay_variation),
            ("hesitationDelay", self.hesitation_delay),
        ] {
            ensure!(value.is_finite(), "{name} must be finite");
            ensure!(value >= 0.0, "{name} must be >= 0");
        }
        ensure!(
            (0.0..=1.0).contains(&self.hesitation_chance),
            "hesitationChance must be between 0.0 and 1.0"
        );
        Ok(())
    }

    pub fn typing_config(&self) -> TypingConfig {
        TypingConfig {
            delay_base: millis(self.character_delay_base),
            delay_variation: millis(self.character_delay_variation),
            hesitation_chance: self.hesitation_chance,
            hesitation_delay: millis(self.hesitation_delay),
            sound_effects: self.sound_effects.clone(),
        }
    }

    pub fn script_dir(&self, workspace: &Path) -> PathBuf {
        workspace.join(&self.script_directory)
    }

    pub fn sound_dir(&self, workspace: &Path) -> PathBuf {
        workspace.join(&self.sound_directory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_typing_defaults() {
        let config = Settings::default().typing_config();
        let defaults = TypingConfig::default();
        assert_eq!(config.delay_base, defaults.delay_base);
        assert_eq!(config.delay_variation, defaults.delay_variation);
        assert_eq!(config.hesitation_delay, defaults.hesitation_delay);
        assert_eq!(config.sound_effects, SoundEffects::None);
    }

    #[test]
    fn test_from_json() {
        let settings = Settings::from_json(
            r#"{ "soundEffects": "hacker", "characterDelayBase": 5, "characterDelayVariation": 10.5 }"#,
        )
        .unwrap();
        assert_eq!(settings.sound_effects, SoundEffects::Category("hacker".into()));
        assert_eq!(settings.character_delay_base, 5.0);
        assert_eq!(settings.hesitation_chance, 0.1);

        let config = settings.typing_config();
        assert_eq!(config.delay_base, Duration::from_millis(5));
        assert_eq!(config.delay_variation, Duration::from_micros(10_500));
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(Settings::from_json(r#"{ "characterDelayBase": -1 }"#).is_err());
        assert!(Settings::from_json(r#"{ "hesitationChance": 1.5 }"#).is_err());
        assert!(Settings::from_json(r#"{ "typo": 1 }"#).is_err());
    }

    #[test]
    fn test_missing_default_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(dir.path(), None).unwrap();
        assert_eq!(settings.script_dir(dir.path()), dir.path().join(".auto-type"));
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::load(dir.path(), Some(&dir.path().join("missing.json"))).is_err());
    }

    #[test]
    fn test_load_workspace_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{ "soundEffects": "none", "scriptDirectory": "demo" }"#,
        )
        .unwrap();
        let settings = Settings::load(dir.path(), None).unwrap();
        assert_eq!(settings.sound_effects, SoundEffects::None);
        assert_eq!(settings.script_dir(dir.path()), dir.path().join("demo"));
    }
}
