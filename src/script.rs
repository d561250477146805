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

//! Script loading
//!
//! A script is a directory with one page file per entry. Each page is a
//! front-matter header, a line holding only `---`, and the content to type.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::front_matter::{FrontMatterError, parse_front_matter};
use crate::types::{Content, ScriptPage};

const SEPARATOR: &str = "\n---\n";

/// Load failures. Any of these aborts the whole script.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("{source} in script page {}", page.display())]
    MalformedFrontMatter {
        page: PathBuf,
        #[source]
        source: FrontMatterError,
    },
    #[error("Missing file property in script page {}", page.display())]
    MissingTargetFile { page: PathBuf },
    #[error("Can't find target file {file} for script page {}", page.display())]
    TargetFileNotFound { page: PathBuf, file: String },
    #[error("Failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Conditions that leave nothing to play but are not failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadNotice {
    #[error("The script directory {} does not exist. Nothing for autotype to do.", .0.display())]
    ScriptDirectoryMissing(PathBuf),
    #[error("No script pages found in {}. Nothing for autotype to do.", .0.display())]
    EmptyScriptDirectory(PathBuf),
}

#[derive(Debug)]
pub struct Script {
    pub dir: PathBuf,
    pub pages: Vec<ScriptPage>,
    pub notice: Option<LoadNotice>,
}

impl Script {
    fn empty(dir: &Path, notice: LoadNotice) -> Self {
        Self {
            dir: dir.to_path_buf(),
            pages: Vec::new(),
            notice: Some(notice),
        }
    }
}

/// Reads every page in `dir` in directory order.
pub fn load_script(dir: &Path) -> Result<Script, ScriptError> {
    if !dir.is_dir() {
        return Ok(Script::empty(
            dir,
            LoadNotice::ScriptDirectoryMissing(dir.to_path_buf()),
        ));
    }

    let io_err = |source| ScriptError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut page_paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let path = entry.path();
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if hidden || !path.is_file() {
            debug!(path = %path.display(), "skipping non-page entry");
            continue;
        }
        page_paths.push(path);
    }

    if page_paths.is_empty() {
        return Ok(Script::empty(
            dir,
            LoadNotice::EmptyScriptDirectory(dir.to_path_buf()),
        ));
    }

    let pages = page_paths
        .iter()
        .map(|path| load_page(path, dir))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(dir = %dir.display(), pages = pages.len(), "loaded script");

    Ok(Script {
        dir: dir.to_path_buf(),
        pages,
        notice: None,
    })
}

fn load_page(path: &Path, script_dir: &Path) -> Result<ScriptPage, ScriptError> {
    let raw = fs::read_to_string(path).map_err(|source| ScriptError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    parse_page(&name, path, &raw, script_dir)
}

/// Builds a page from the text of a page file.
pub fn parse_page(
    name: &str,
    path: &Path,
    raw: &str,
    script_dir: &Path,
) -> Result<ScriptPage, ScriptError> {
    let text = raw.replace("\r\n", "\n");
    let mut parts = text.split(SEPARATOR);
    let header = parts.next().unwrap_or_default();
    let segments: Vec<String> = parts.map(str::to_string).collect();

    let front_matter =
        parse_front_matter(header).map_err(|source| ScriptError::MalformedFrontMatter {
            page: path.to_path_buf(),
            source,
        })?;

    let Some(file) = front_matter.file else {
        return Err(ScriptError::MissingTargetFile {
            page: path.to_path_buf(),
        });
    };

    let target = resolve_target(&file, script_dir).ok_or_else(|| {
        ScriptError::TargetFileNotFound {
            page: path.to_path_buf(),
            file: file.clone(),
        }
    })?;

    let content = match segments.len() {
        0 => Content::Text(String::new()),
        1 => Content::Text(segments.into_iter().collect()),
        _ => Content::Segments(segments),
    };

    Ok(ScriptPage {
        name: name.to_string(),
        path: path.to_path_buf(),
        file,
        target,
        line: front_matter.line,
        col: front_matter.col,
        align: front_matter.align,
        content,
    })
}

/// Finds `file` relative to the parent of the script directory, falling
/// back to the path as given.
pub fn resolve_target(file: &str, script_dir: &Path) -> Option<PathBuf> {
    let given = Path::new(file);
    let root = script_dir.parent().unwrap_or(script_dir);

    let candidate = [root.join(given), given.to_path_buf()]
        .into_iter()
        .find(|path| path.exists())?;

    Some(candidate.canonicalize().unwrap_or(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Align;
    use tempfile::TempDir;

    fn workspace() -> (TempDir, PathBuf) {
        let root = tempfile::tempdir().unwrap();
        let script_dir = root.path().join(".auto-type");
        fs::create_dir(&script_dir).unwrap();
        fs::write(root.path().join("main.rs"), "fn main() {\n}\n").unwrap();
        (root, script_dir)
    }

    #[test]
    fn test_missing_directory_is_not_an_error() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join(".auto-type");
        let script = load_script(&dir).unwrap();
        assert!(script.pages.is_empty());
        assert_eq!(script.notice, Some(LoadNotice::ScriptDirectoryMissing(dir)));
    }

    #[test]
    fn test_empty_directory_is_not_an_error() {
        let (_root, dir) = workspace();
        let script = load_script(&dir).unwrap();
        assert!(script.pages.is_empty());
        assert_eq!(script.notice, Some(LoadNotice::EmptyScriptDirectory(dir)));
    }

    #[test]
    fn test_loads_page_relative_to_script_parent() {
        let (root, dir) = workspace();
        fs::write(
            dir.join("01"),
            "file: main.rs\nline: 2\ncol: 1\nalign: top\n---\n    println!(\"hi\");\n",
        )
        .unwrap();

        let script = load_script(&dir).unwrap();
        assert_eq!(script.notice, None);
        assert_eq!(script.pages.len(), 1);

        let page = &script.pages[0];
        assert_eq!(page.name, "01");
        assert_eq!(page.file, "main.rs");
        assert_eq!(page.target, root.path().join("main.rs").canonicalize().unwrap());
        assert_eq!((page.line, page.col), (1, 0));
        assert_eq!(page.align, Align::Edge);
        assert_eq!(page.content.joined(), "    println!(\"hi\");\n");
    }

    #[test]
    fn test_missing_file_key_fails_whole_load() {
        let (_root, dir) = workspace();
        fs::write(dir.join("01"), "file: main.rs\n---\nok").unwrap();
        fs::write(dir.join("02"), "line: 3\n---\nbroken").unwrap();

        let result = load_script(&dir);
        assert!(matches!(
            result,
            Err(ScriptError::MissingTargetFile { ref page }) if page.ends_with("02")
        ));
    }

    #[test]
    fn test_relative_target_prefers_workspace_over_cwd() {
        // The crate root is the test working directory and has its own Cargo.toml
        assert!(Path::new("Cargo.toml").exists());
        let (root, dir) = workspace();
        fs::write(root.path().join("Cargo.toml"), "[package]\n").unwrap();

        let target = resolve_target("Cargo.toml", &dir).unwrap();
        assert_eq!(target, root.path().join("Cargo.toml").canonicalize().unwrap());
    }

    #[test]
    fn test_absolute_target() {
        let (root, dir) = workspace();
        let main = root.path().join("main.rs").canonicalize().unwrap();
        assert_eq!(resolve_target(main.to_str().unwrap(), &dir), Some(main));
    }

    #[test]
    fn test_unknown_target_fails_whole_load() {
        let (_root, dir) = workspace();
        fs::write(dir.join("01"), "file: nope.rs\n---\ntext").unwrap();

        match load_script(&dir) {
            Err(ScriptError::TargetFileNotFound { file, .. }) => assert_eq!(file, "nope.rs"),
            other => panic!("Expected TargetFileNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_front_matter_fails_whole_load() {
        let (_root, dir) = workspace();
        fs::write(dir.join("01"), "file main.rs\n---\ntext").unwrap();

        let err = load_script(&dir).unwrap_err();
        assert!(matches!(err, ScriptError::MalformedFrontMatter { .. }));
        assert!(err.to_string().contains("in script page"));
    }

    #[test]
    fn test_content_segments_and_crlf() {
        let (_root, dir) = workspace();
        let page = parse_page(
            "01",
            &dir.join("01"),
            "file: main.rs\r\n---\r\nfirst\r\n---\r\nsecond",
            &dir,
        )
        .unwrap();
        assert_eq!(
            page.content,
            Content::Segments(vec!["first".to_string(), "second".to_string()])
        );
        assert_eq!(page.content.joined(), "firstsecond");
    }

    #[test]
    fn test_inline_dashes_are_content() {
        let (_root, dir) = workspace();
        let page = parse_page("01", &dir.join("01"), "file: main.rs\n---\na --- b\n", &dir).unwrap();
        assert_eq!(page.content, Content::Text("a --- b\n".to_string()));
    }

    #[test]
    fn test_hidden_entries_are_skipped() {
        let (_root, dir) = workspace();
        fs::write(dir.join(".DS_Store"), "junk").unwrap();
        let script = load_script(&dir).unwrap();
        assert!(script.pages.is_empty());
        assert!(matches!(script.notice, Some(LoadNotice::EmptyScriptDirectory(_))));
    }
}
