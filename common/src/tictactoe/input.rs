use crate::tictactoe::board::{Board, BoardPosition, BoardPositionError};
use crate::tictactoe::player::Mark;
use crate::tictactoe::rules::GameOutcome;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("Invalid move position: {0}")]
    InvalidPosition(BoardPositionError),
    #[error("Cell {0} is already occupied")]
    Occupied(BoardPosition),
    #[error("Game is already over: {0:?}")]
    GameOver(GameOutcome),
    #[error("It is {expected}'s turn, not {mover}'s")]
    OutOfTurn { expected: Mark, mover: Mark },
    #[error("Only {local} may be played from this device, not {mover}")]
    NotLocalPlayer { local: Mark, mover: Mark },
}

// A move as it arrives from a tap or a peer, before any validation
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
pub struct RawMove {
    pub row: i32,
    pub col: i32,
    pub mover: Mark,
}

impl RawMove {
    pub fn new(row: i32, col: i32, mover: Mark) -> Self {
        RawMove { row, col, mover }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ValidMove {
    position: BoardPosition,
    mover: Mark,
}

impl ValidMove {
    // validates:
    // - both coordinates lie on the board
    // - the target cell is empty
    pub fn new(input: RawMove, board: &Board) -> Result<Self, MoveError> {
        let position =
            BoardPosition::new(input.row, input.col).map_err(MoveError::InvalidPosition)?;
        if !board.cell(position).is_empty() {
            return Err(MoveError::Occupied(position));
        }
        Ok(ValidMove {
            position,
            mover: input.mover,
        })
    }

    pub fn position(&self) -> BoardPosition {
        self.position
    }

    pub fn mover(&self) -> Mark {
        self.mover
    }
}
