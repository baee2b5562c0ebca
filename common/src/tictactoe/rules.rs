//! Stateless evaluation of a board snapshot.

use crate::tictactoe::board::{Board, Cell, BOARD_SIZE};
use crate::tictactoe::input::{MoveError, RawMove, ValidMove};
use crate::tictactoe::player::Mark;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameOutcome {
    InProgress,
    Won(Mark),
    Draw,
}

impl GameOutcome {
    pub fn is_over(&self) -> bool {
        !matches!(self, GameOutcome::InProgress)
    }
}

// Rows top-to-bottom, then columns left-to-right, then both diagonals.
// The order only matters for determinism.
const LINES: [[(usize, usize); BOARD_SIZE]; 8] = [
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

/// Places `mover` on an empty cell and returns the resulting board.
///
/// The input board is left untouched whether or not the move is accepted.
pub fn apply_move(board: &Board, row: i32, col: i32, mover: Mark) -> Result<Board, MoveError> {
    let valid = ValidMove::new(RawMove::new(row, col, mover), board)?;
    let mut next = *board;
    next.set(valid.position(), Cell::Marked(valid.mover()));
    Ok(next)
}

/// Returns the mark that owns a full line, if any.
pub fn detect_winner(board: &Board) -> Option<Mark> {
    let cells = board.get();
    LINES.iter().find_map(|[a, b, c]| {
        let first = cells[a.0][a.1];
        if first == cells[b.0][b.1] && first == cells[c.0][c.1] {
            first.mark()
        } else {
            None
        }
    })
}

pub fn is_full(board: &Board) -> bool {
    board.cells().all(|c| !c.is_empty())
}

pub fn is_terminal(board: &Board) -> bool {
    detect_winner(board).is_some() || is_full(board)
}

pub fn outcome(board: &Board) -> GameOutcome {
    match detect_winner(board) {
        Some(mark) => GameOutcome::Won(mark),
        None if is_full(board) => GameOutcome::Draw,
        None => GameOutcome::InProgress,
    }
}
