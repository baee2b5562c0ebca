//! Wire protocol shared by the phone and the wearable.
//!
//! Moves travel as `"<MARK>,<row>,<col>"` text records under [`MOVE_PATH`].
//! Two coordinate pairs are reserved: `-2,-2` asks the peer to reset and
//! `-1,-1` announces that the sender's game ended. Both are surfaced as their
//! own [`PeerMessage`] variants so nothing outside this module deals with the
//! sentinels.

use crate::tictactoe::{Board, GameOutcome, GameState, Mark, Phase, RawMove};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const MOVE_PATH: &str = "/tic_tac_toe_move";
pub const STATUS_PATH: &str = "/game_end_status";

const RESET_SENTINEL: (i32, i32) = (-2, -2);
const GAME_OVER_SENTINEL: (i32, i32) = (-1, -1);
const EMPTY_MARK: &str = "EMPTY";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Payload is not valid UTF-8")]
    NotUtf8,
    #[error("Expected 3 comma-separated fields, found {0}")]
    FieldCount(usize),
    #[error("Invalid {field} coordinate {value:?}")]
    Coordinate { field: &'static str, value: String },
    #[error("Unknown mark {0:?}")]
    UnknownMark(String),
    #[error("Move record carries no mover")]
    MissingMover,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PeerMessage {
    Move(RawMove),
    Reset,
    // None means the sender's game ended in a draw
    GameOver(Option<Mark>),
}

impl PeerMessage {
    pub fn encode(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let text = std::str::from_utf8(payload).map_err(|_| DecodeError::NotUtf8)?;
        let fields: Vec<&str> = text.split(',').collect();
        let &[mark, row, col] = fields.as_slice() else {
            return Err(DecodeError::FieldCount(fields.len()));
        };
        let row = parse_coordinate("row", row)?;
        let col = parse_coordinate("column", col)?;

        // The mark token of a reset record carries no meaning
        if (row, col) == RESET_SENTINEL {
            return Ok(PeerMessage::Reset);
        }
        let mark = parse_mark(mark)?;
        if (row, col) == GAME_OVER_SENTINEL {
            return Ok(PeerMessage::GameOver(mark));
        }
        let mover = mark.ok_or(DecodeError::MissingMover)?;
        Ok(PeerMessage::Move(RawMove::new(row, col, mover)))
    }
}

impl fmt::Display for PeerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeerMessage::Move(RawMove { row, col, mover }) => {
                write!(f, "{},{},{}", mover, row, col)
            }
            PeerMessage::Reset => {
                write!(f, "{},{},{}", EMPTY_MARK, RESET_SENTINEL.0, RESET_SENTINEL.1)
            }
            PeerMessage::GameOver(winner) => {
                let mark = winner.map(Mark::name).unwrap_or(EMPTY_MARK);
                write!(
                    f,
                    "{},{},{}",
                    mark, GAME_OVER_SENTINEL.0, GAME_OVER_SENTINEL.1
                )
            }
        }
    }
}

fn parse_coordinate(field: &'static str, value: &str) -> Result<i32, DecodeError> {
    value.parse().map_err(|_| DecodeError::Coordinate {
        field,
        value: value.to_string(),
    })
}

fn parse_mark(token: &str) -> Result<Option<Mark>, DecodeError> {
    if token == EMPTY_MARK {
        return Ok(None);
    }
    token
        .parse()
        .map(Some)
        .map_err(|_| DecodeError::UnknownMark(token.to_string()))
}

// Informational text sent under STATUS_PATH when a game ends. Receivers only
// display it.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameEndStatus {
    Draw,
    Winner(Mark),
}

impl GameEndStatus {
    pub fn from_outcome(outcome: GameOutcome) -> Option<Self> {
        match outcome {
            GameOutcome::InProgress => None,
            GameOutcome::Draw => Some(GameEndStatus::Draw),
            GameOutcome::Won(mark) => Some(GameEndStatus::Winner(mark)),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for GameEndStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEndStatus::Draw => write!(f, "EMPATE"),
            GameEndStatus::Winner(mark) => write!(f, "GANADOR: {}", mark),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GameSnapshot {
    pub board: Board,
    pub phase: Phase,
    pub outcome: GameOutcome,
    pub status: String,
    // Last text the peer sent under STATUS_PATH
    pub peer_status: Option<String>,
}

impl GameSnapshot {
    pub fn new(game: &GameState, peer_status: Option<String>) -> Self {
        GameSnapshot {
            board: *game.board(),
            phase: game.phase(),
            outcome: game.outcome(),
            status: game.status_text(),
            peer_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_move() {
        let msg = PeerMessage::Move(RawMove::new(1, 2, Mark::O));
        assert_eq!(msg.encode(), b"O,1,2".to_vec());
    }

    #[test]
    fn test_encode_control_records() {
        assert_eq!(PeerMessage::Reset.encode(), b"EMPTY,-2,-2".to_vec());
        assert_eq!(
            PeerMessage::GameOver(Some(Mark::X)).encode(),
            b"X,-1,-1".to_vec()
        );
        assert_eq!(PeerMessage::GameOver(None).encode(), b"EMPTY,-1,-1".to_vec());
    }

    #[test]
    fn test_decode_move() {
        assert_eq!(
            PeerMessage::decode(b"X,0,2"),
            Ok(PeerMessage::Move(RawMove::new(0, 2, Mark::X)))
        );
        // Range checks belong to the game, not the codec
        assert_eq!(
            PeerMessage::decode(b"X,9,0"),
            Ok(PeerMessage::Move(RawMove::new(9, 0, Mark::X)))
        );
    }

    #[test]
    fn test_decode_reset_ignores_mark() {
        assert_eq!(PeerMessage::decode(b"X,-2,-2"), Ok(PeerMessage::Reset));
        assert_eq!(PeerMessage::decode(b"EMPTY,-2,-2"), Ok(PeerMessage::Reset));
        assert_eq!(PeerMessage::decode(b"?,-2,-2"), Ok(PeerMessage::Reset));
    }

    #[test]
    fn test_decode_game_over() {
        assert_eq!(
            PeerMessage::decode(b"O,-1,-1"),
            Ok(PeerMessage::GameOver(Some(Mark::O)))
        );
        assert_eq!(
            PeerMessage::decode(b"EMPTY,-1,-1"),
            Ok(PeerMessage::GameOver(None))
        );
    }

    #[test]
    fn test_decode_malformed() {
        assert_eq!(PeerMessage::decode(b"X,1"), Err(DecodeError::FieldCount(2)));
        assert_eq!(
            PeerMessage::decode(b"X,1,1,1"),
            Err(DecodeError::FieldCount(4))
        );
        assert_eq!(PeerMessage::decode(b""), Err(DecodeError::FieldCount(1)));
        assert_eq!(
            PeerMessage::decode(b"X,a,1"),
            Err(DecodeError::Coordinate {
                field: "row",
                value: "a".to_string()
            })
        );
        assert_eq!(
            PeerMessage::decode(b"X,1, 1"),
            Err(DecodeError::Coordinate {
                field: "column",
                value: " 1".to_string()
            })
        );
        assert_eq!(
            PeerMessage::decode(b"Z,1,1"),
            Err(DecodeError::UnknownMark("Z".to_string()))
        );
        assert_eq!(
            PeerMessage::decode(b"EMPTY,1,1"),
            Err(DecodeError::MissingMover)
        );
        assert_eq!(
            PeerMessage::decode(&[0xff, 0xfe]),
            Err(DecodeError::NotUtf8)
        );
    }

    #[test]
    fn test_game_end_status() {
        assert_eq!(GameEndStatus::from_outcome(GameOutcome::InProgress), None);
        assert_eq!(
            GameEndStatus::from_outcome(GameOutcome::Draw).unwrap().encode(),
            b"EMPATE".to_vec()
        );
        assert_eq!(
            GameEndStatus::from_outcome(GameOutcome::Won(Mark::O))
                .unwrap()
                .encode(),
            b"GANADOR: O".to_vec()
        );
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut game = GameState::default();
        game.submit_move(1, 1, Mark::X);
        let snapshot = GameSnapshot::new(&game, Some("EMPATE".to_string()));
        assert_eq!(snapshot.status, "Turno de O");
        assert_eq!(snapshot.phase, Phase::AwaitingMove(Mark::O));

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: GameSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
