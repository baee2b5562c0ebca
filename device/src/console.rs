use crate::config::Role;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ScriptError {
    #[error("Unknown device {0:?}, expected primary or companion")]
    UnknownDevice(String),
    #[error("Expected `<row> <col>`, `reset` or `show`")]
    BadAction,
    #[error("Bad coordinate {0:?}")]
    BadCoordinate(String),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Tap { row: i32, col: i32 },
    Reset,
    Show,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScriptLine {
    pub role: Role,
    pub action: Action,
}

/// Parses one line of the demo script.
///
/// Blank lines and `#` comments yield `Ok(None)`. Coordinates are passed
/// through as given, so out-of-range taps reach the game and get rejected
/// there.
pub fn parse_line(line: &str) -> Result<Option<ScriptLine>, ScriptError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((device, rest)) = words.split_first() else {
        return Ok(None);
    };
    let role = match device.to_ascii_lowercase().as_str() {
        "p" | "primary" => Role::Primary,
        "c" | "companion" => Role::Companion,
        _ => return Err(ScriptError::UnknownDevice(device.to_string())),
    };
    let action = match rest {
        ["reset"] => Action::Reset,
        ["show"] => Action::Show,
        [row, col] => Action::Tap {
            row: coordinate(row)?,
            col: coordinate(col)?,
        },
        _ => return Err(ScriptError::BadAction),
    };
    Ok(Some(ScriptLine { role, action }))
}

fn coordinate(word: &str) -> Result<i32, ScriptError> {
    word.parse()
        .map_err(|_| ScriptError::BadCoordinate(word.to_string()))
}
