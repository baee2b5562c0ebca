mod board;
mod game_state;
mod input;
mod player;
mod rules;

pub use board::{Board, BoardPosition, BoardPositionError, Cell, Coordinate, BOARD_SIZE};
pub use game_state::{GameState, Phase, PlayMode, Transition};
pub use input::{MoveError, RawMove, ValidMove};
pub use player::{Mark, UnknownMark};
pub use rules::{apply_move, detect_winner, is_full, is_terminal, outcome, GameOutcome};
