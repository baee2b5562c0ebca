use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown mark {0:?}")]
pub struct UnknownMark(pub String);

// X always opens the game
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    // The name peers use on the wire
    pub fn name(self) -> &'static str {
        match self {
            Mark::X => "X",
            Mark::O => "O",
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Mark {
    type Err = UnknownMark;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "X" => Ok(Mark::X),
            "O" => Ok(Mark::O),
            other => Err(UnknownMark(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent() {
        assert_eq!(Mark::X.opponent(), Mark::O);
        assert_eq!(Mark::O.opponent(), Mark::X);
    }

    #[test]
    fn test_parse_mark() {
        assert_eq!("X".parse::<Mark>(), Ok(Mark::X));
        assert_eq!("O".parse::<Mark>(), Ok(Mark::O));
        assert_eq!(
            "x".parse::<Mark>(),
            Err(UnknownMark("x".to_string()))
        );
        assert!("EMPTY".parse::<Mark>().is_err());
    }
}
