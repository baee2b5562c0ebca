use crate::tictactoe::player::Mark;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const BOARD_SIZE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coordinate {
    Row,
    Col,
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coordinate::Row => write!(f, "row"),
            Coordinate::Col => write!(f, "column"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardPositionError {
    #[error("{0} coordinate {1} is outside the board (0..={max})", max = BOARD_SIZE - 1)]
    OutOfBounds(Coordinate, i32),
}

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Marked(Mark),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn mark(&self) -> Option<Mark> {
        match self {
            Cell::Marked(mark) => Some(*mark),
            Cell::Empty => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BoardPosition(usize, usize);

impl BoardPosition {
    // Coordinates arrive as signed integers from peers, so anything
    // negative or past the last row/column is rejected here.
    pub fn new(row: i32, col: i32) -> Result<Self, BoardPositionError> {
        let row = to_index(Coordinate::Row, row)?;
        let col = to_index(Coordinate::Col, col)?;
        Ok(BoardPosition(row, col))
    }

    pub fn row(&self) -> usize {
        self.0
    }

    pub fn col(&self) -> usize {
        self.1
    }
}

impl fmt::Display for BoardPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

fn to_index(coordinate: Coordinate, value: i32) -> Result<usize, BoardPositionError> {
    usize::try_from(value)
        .ok()
        .filter(|idx| *idx < BOARD_SIZE)
        .ok_or(BoardPositionError::OutOfBounds(coordinate, value))
}

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct Board([[Cell; BOARD_SIZE]; BOARD_SIZE]);

impl Board {
    pub fn new() -> Self {
        Board::default()
    }

    pub fn get(&self) -> &[[Cell; BOARD_SIZE]; BOARD_SIZE] {
        &self.0
    }

    pub fn cell(&self, pos: BoardPosition) -> Cell {
        self.0[pos.row()][pos.col()]
    }

    // Need to take signed integers because peers may send out-of-range coordinates
    pub fn try_cell(&self, row: i32, col: i32) -> Option<Cell> {
        BoardPosition::new(row, col).ok().map(|pos| self.cell(pos))
    }

    pub(crate) fn set(&mut self, pos: BoardPosition, cell: Cell) {
        self.0[pos.row()][pos.col()] = cell;
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.0.iter().flat_map(|row| row.iter().copied())
    }

    pub fn count(&self, mark: Mark) -> usize {
        self.cells().filter(|c| *c == Cell::Marked(mark)).count()
    }

    pub fn is_blank(&self) -> bool {
        self.cells().all(|c| c.is_empty())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self
            .0
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        Cell::Empty => " ",
                        Cell::Marked(mark) => mark.name(),
                    })
                    .collect::<Vec<&str>>()
                    .join("|")
            })
            .collect::<Vec<String>>();
        write!(f, "{}", rows.join("\n-+-+-\n"))
    }
}
