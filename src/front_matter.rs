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

//! Front-matter parser for script pages
//!
//! A page header is a block of `key: value` lines:
//! - `file` target document (required, checked by the loader)
//! - `line` / `col` 1-indexed start position (default 1)
//! - `align` `middle` centres the start line, anything else pins it to the top

use nom::{
    IResult, Parser,
    bytes::complete::take_while1,
    character::complete::{char, space0},
    combinator::rest,
    sequence::separated_pair,
};
use thiserror::Error;

use crate::types::Align;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrontMatterError {
    #[error("line {line}: expected `key: value`, found '{text}'")]
    NotKeyValue { line: usize, text: String },
    #[error("line {line}: `{key}` must be a positive integer, found '{value}'")]
    BadNumber {
        line: usize,
        key: String,
        value: String,
    },
}

/// Parsed page header. Positions are already zero-indexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatter {
    pub file: Option<String>,
    pub line: usize,
    pub col: usize,
    pub align: Align,
}

fn parse_key_value(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(
        take_while1(|c: char| c != ':' && !c.is_whitespace()),
        (space0, char(':'), space0),
        rest,
    )
    .parse(input)
}

fn parse_position(line: usize, key: &str, value: Option<&str>) -> Result<usize, FrontMatterError> {
    let Some(value) = value else {
        return Ok(0);
    };
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(FrontMatterError::BadNumber {
            line,
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Parses the header block that precedes the `---` separator.
///
/// When a key is declared more than once the first occurrence wins.
/// Unrecognised keys are ignored.
pub fn parse_front_matter(input: &str) -> Result<FrontMatter, FrontMatterError> {
    let mut entries: Vec<(usize, &str, &str)> = Vec::new();

    for (line_num, line) in input.lines().enumerate() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        match parse_key_value(trimmed) {
            Ok((_, (key, value))) => {
                if entries.iter().any(|(_, k, _)| *k == key) {
                    continue;
                }
                entries.push((line_num + 1, key, value.trim()));
            }
            Err(_) => {
                return Err(FrontMatterError::NotKeyValue {
                    line: line_num + 1,
                    text: trimmed.to_string(),
                });
            }
        }
    }

    let lookup = |key: &str| {
        entries
            .iter()
            .find(|(_, k, _)| *k == key)
            .map(|(line, _, value)| (*line, *value))
    };

    let line = match lookup("line") {
        Some((at, value)) => parse_position(at, "line", Some(value))?,
        None => parse_position(0, "line", None)?,
    };
    let col = match lookup("col") {
        Some((at, value)) => parse_position(at, "col", Some(value))?,
        None => parse_position(0, "col", None)?,
    };

    Ok(FrontMatter {
        file: lookup("file")
            .map(|(_, value)| value.to_string())
            .filter(|value| !value.is_empty()),
        line,
        col,
        align: Align::from_front_matter(lookup("align").map(|(_, value)| value)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        let result = parse_key_value("file : src/main.rs");
        assert!(result.is_ok());
        let (_, (key, value)) = result.unwrap();
        assert_eq!(key, "file");
        assert_eq!(value, "src/main.rs");
    }

    #[test]
    fn test_positions_are_zero_indexed() {
        let fm = parse_front_matter("file: a.rs\nline: 12\ncol: 5").unwrap();
        assert_eq!(fm.line, 11);
        assert_eq!(fm.col, 4);
        assert_eq!(fm.file.as_deref(), Some("a.rs"));
    }

    #[test]
    fn test_defaults() {
        let fm = parse_front_matter("file: a.rs").unwrap();
        assert_eq!((fm.line, fm.col), (0, 0));
        assert_eq!(fm.align, Align::Center);
    }

    #[test]
    fn test_align() {
        let fm = parse_front_matter("file: a.rs\nalign: middle").unwrap();
        assert_eq!(fm.align, Align::Center);

        let fm = parse_front_matter("file: a.rs\nalign: top").unwrap();
        assert_eq!(fm.align, Align::Edge);
    }

    #[test]
    fn test_first_declaration_wins() {
        let fm = parse_front_matter("file: first.rs\nline: 3\nfile: second.rs\nline: 9").unwrap();
        assert_eq!(fm.file.as_deref(), Some("first.rs"));
        assert_eq!(fm.line, 2);
    }

    #[test]
    fn test_value_keeps_colons() {
        let fm = parse_front_matter(r"file: C:\work\a.rs").unwrap();
        assert_eq!(fm.file.as_deref(), Some(r"C:\work\a.rs"));
    }

    #[test]
    fn test_blank_lines_and_unknown_keys() {
        let fm = parse_front_matter("\n  file: a.rs  \n\ntheme: dark\n").unwrap();
        assert_eq!(fm.file.as_deref(), Some("a.rs"));
    }

    #[test]
    fn test_missing_file_is_not_a_parse_error() {
        let fm = parse_front_matter("line: 2").unwrap();
        assert_eq!(fm.file, None);

        let fm = parse_front_matter("file:").unwrap();
        assert_eq!(fm.file, None);
    }

    #[test]
    fn test_rejects_non_key_value_line() {
        let result = parse_front_matter("file: a.rs\njust some text");
        assert_eq!(
            result,
            Err(FrontMatterError::NotKeyValue {
                line: 2,
                text: "just some text".to_string()
            })
        );
    }

    #[test]
    fn test_rejects_bad_numbers() {
        assert!(matches!(
            parse_front_matter("file: a.rs\nline: ten"),
            Err(FrontMatterError::BadNumber { line: 2, .. })
        ));
        assert!(matches!(
            parse_front_matter("file: a.rs\ncol: 0"),
            Err(FrontMatterError::BadNumber { .. })
        ));
    }
}
