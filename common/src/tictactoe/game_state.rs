use crate::tictactoe::board::Board;
use crate::tictactoe::input::{MoveError, RawMove};
use crate::tictactoe::player::Mark;
use crate::tictactoe::rules::{self, GameOutcome};
use serde::{Deserialize, Serialize};
use tracing::debug;

// Which marks a device is allowed to play from local input
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PlayMode {
    // Both marks are played on this device, one tap per turn
    #[default]
    HotSeat,
    // Only `local` is played here; the other mark arrives from the peer
    Paired { local: Mark },
}

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    AwaitingMove(Mark),
    Terminal(GameOutcome),
}

// What an accepted move did to the game
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    Continued { next: Mark },
    Finished(GameOutcome),
}

#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    board: Board,
    phase: Phase,
    mode: PlayMode,
}

impl Default for GameState {
    fn default() -> Self {
        GameState::new(PlayMode::default())
    }
}

impl GameState {
    pub fn new(mode: PlayMode) -> Self {
        GameState {
            board: Board::new(),
            phase: Phase::AwaitingMove(Mark::X),
            mode,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    // None once the game is over
    pub fn turn(&self) -> Option<Mark> {
        match self.phase {
            Phase::AwaitingMove(mark) => Some(mark),
            Phase::Terminal(_) => None,
        }
    }

    pub fn outcome(&self) -> GameOutcome {
        rules::outcome(&self.board)
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::Terminal(_))
    }

    /// The mark a local tap would play right now.
    pub fn local_mover(&self) -> Option<Mark> {
        match self.mode {
            PlayMode::HotSeat => self.turn(),
            PlayMode::Paired { local } => Some(local),
        }
    }

    /// Applies a move from local input.
    ///
    /// Returns `None` without touching the game when the move is not playable:
    /// the game is over, the cell is taken or off the board, it is not
    /// `mover`'s turn, or `mover` belongs to the peer in paired mode.
    pub fn submit_move(&mut self, row: i32, col: i32, mover: Mark) -> Option<Transition> {
        let input = RawMove::new(row, col, mover);
        let result = self.check_local(mover).and_then(|_| self.apply(input));
        log_rejection(result, "local", input)
    }

    /// Applies a move reported by the peer device. The sender is trusted, so
    /// only the board and turn rules apply.
    pub fn receive_remote_move(&mut self, row: i32, col: i32, mover: Mark) -> Option<Transition> {
        let input = RawMove::new(row, col, mover);
        let result = self.apply(input);
        log_rejection(result, "remote", input)
    }

    pub fn reset(&mut self) {
        self.board = Board::new();
        self.phase = Phase::AwaitingMove(Mark::X);
    }

    // Line shown to the players above the board
    pub fn status_text(&self) -> String {
        match self.phase {
            Phase::Terminal(GameOutcome::Won(mark)) => format!("¡GANADOR: {}!", mark),
            Phase::Terminal(_) => "¡EMPATE!".to_string(),
            Phase::AwaitingMove(_) if self.board.is_blank() => "Inicia la partida".to_string(),
            Phase::AwaitingMove(mark) => format!("Turno de {}", mark),
        }
    }

    fn check_local(&self, mover: Mark) -> Result<(), MoveError> {
        match self.mode {
            PlayMode::Paired { local } if local != mover => {
                Err(MoveError::NotLocalPlayer { local, mover })
            }
            _ => Ok(()),
        }
    }

    fn apply(&mut self, input: RawMove) -> Result<Transition, MoveError> {
        let expected = match self.phase {
            Phase::Terminal(outcome) => return Err(MoveError::GameOver(outcome)),
            Phase::AwaitingMove(mark) => mark,
        };
        if input.mover != expected {
            return Err(MoveError::OutOfTurn {
                expected,
                mover: input.mover,
            });
        }
        self.board = rules::apply_move(&self.board, input.row, input.col, input.mover)?;

        let transition = match rules::outcome(&self.board) {
            GameOutcome::InProgress => {
                let next = input.mover.opponent();
                self.phase = Phase::AwaitingMove(next);
                Transition::Continued { next }
            }
            outcome => {
                self.phase = Phase::Terminal(outcome);
                Transition::Finished(outcome)
            }
        };
        Ok(transition)
    }
}

fn log_rejection(
    result: Result<Transition, MoveError>,
    origin: &str,
    input: RawMove,
) -> Option<Transition> {
    match result {
        Ok(transition) => Some(transition),
        Err(err) => {
            debug!("Ignoring {} move {:?}: {}", origin, input, err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tictactoe::board::Cell;

    fn play(game: &mut GameState, moves: &[(i32, i32, Mark)]) {
        for (row, col, mover) in moves {
            assert!(
                game.submit_move(*row, *col, *mover).is_some(),
                "move {:?} was rejected",
                (row, col, mover)
            );
        }
    }

    #[test]
    fn test_initial_state() {
        let game = GameState::default();
        assert_eq!(game.phase(), Phase::AwaitingMove(Mark::X));
        assert_eq!(game.turn(), Some(Mark::X));
        assert!(game.board().is_blank());
        assert_eq!(game.status_text(), "Inicia la partida");
    }

    #[test]
    fn test_top_row_win() {
        let mut game = GameState::default();
        play(
            &mut game,
            &[(0, 0, Mark::X), (1, 1, Mark::O), (0, 1, Mark::X), (2, 2, Mark::O)],
        );
        assert_eq!(
            game.submit_move(0, 2, Mark::X),
            Some(Transition::Finished(GameOutcome::Won(Mark::X)))
        );
        assert_eq!(game.phase(), Phase::Terminal(GameOutcome::Won(Mark::X)));
        assert_eq!(game.outcome(), GameOutcome::Won(Mark::X));
        assert_eq!(game.turn(), None);
        assert_eq!(game.status_text(), "¡GANADOR: X!");
    }

    #[test]
    fn test_draw() {
        let mut game = GameState::default();
        // X O X / X O O / O X X
        play(
            &mut game,
            &[
                (0, 0, Mark::X),
                (0, 1, Mark::O),
                (0, 2, Mark::X),
                (1, 1, Mark::O),
                (1, 0, Mark::X),
                (2, 0, Mark::O),
                (2, 1, Mark::X),
                (1, 2, Mark::O),
            ],
        );
        assert_eq!(
            game.submit_move(2, 2, Mark::X),
            Some(Transition::Finished(GameOutcome::Draw))
        );
        assert_eq!(game.phase(), Phase::Terminal(GameOutcome::Draw));
        assert_eq!(game.status_text(), "¡EMPATE!");
    }

    #[test]
    fn test_turn_alternation() {
        let mut game = GameState::default();
        let cells = [(0, 0), (0, 1), (0, 2), (1, 1), (1, 0), (2, 0), (2, 1), (1, 2)];
        for (n, (row, col)) in cells.iter().enumerate() {
            let mover = game.turn().unwrap();
            let expected = if n % 2 == 0 { Mark::X } else { Mark::O };
            assert_eq!(mover, expected);
            assert_eq!(
                game.submit_move(*row, *col, mover),
                Some(Transition::Continued {
                    next: mover.opponent()
                })
            );
            let x = game.board().count(Mark::X);
            let o = game.board().count(Mark::O);
            assert!(x == o || x == o + 1);
        }
        assert_eq!(game.turn(), Some(Mark::X));
        assert_eq!(game.status_text(), "Turno de X");
    }

    #[test]
    fn test_occupied_cell_is_ignored() {
        let mut game = GameState::default();
        play(&mut game, &[(1, 1, Mark::X)]);
        let before = game.clone();
        assert_eq!(game.submit_move(1, 1, Mark::O), None);
        assert_eq!(game, before);
        assert_eq!(game.receive_remote_move(1, 1, Mark::O), None);
        assert_eq!(game, before);
    }

    #[test]
    fn test_out_of_range_and_wrong_turn_are_ignored() {
        let mut game = GameState::default();
        let before = game.clone();
        assert_eq!(game.submit_move(9, 0, Mark::X), None);
        assert_eq!(game.receive_remote_move(-1, -1, Mark::X), None);
        assert_eq!(game.submit_move(0, 0, Mark::O), None);
        assert_eq!(game, before);
    }

    #[test]
    fn test_terminal_is_absorbing() {
        let mut game = GameState::default();
        play(
            &mut game,
            &[
                (0, 0, Mark::X),
                (1, 1, Mark::O),
                (0, 1, Mark::X),
                (2, 2, Mark::O),
                (0, 2, Mark::X),
            ],
        );
        let before = game.clone();
        assert_eq!(game.submit_move(2, 0, Mark::O), None);
        assert_eq!(game.receive_remote_move(2, 0, Mark::O), None);
        assert_eq!(game, before);
    }

    #[test]
    fn test_paired_mode_only_plays_local_mark() {
        let mut game = GameState::new(PlayMode::Paired { local: Mark::O });
        assert_eq!(game.local_mover(), Some(Mark::O));
        // X is the peer's mark, even though it is X's turn
        assert_eq!(game.submit_move(0, 0, Mark::X), None);
        // O is local, but it is not O's turn yet
        assert_eq!(game.submit_move(0, 0, Mark::O), None);
        assert!(game.board().is_blank());

        assert!(game.receive_remote_move(0, 0, Mark::X).is_some());
        assert_eq!(
            game.submit_move(1, 1, Mark::O),
            Some(Transition::Continued { next: Mark::X })
        );
        assert_eq!(game.board().try_cell(1, 1), Some(Cell::Marked(Mark::O)));
    }

    #[test]
    fn test_hot_seat_local_mover_follows_turn() {
        let mut game = GameState::default();
        assert_eq!(game.local_mover(), Some(Mark::X));
        play(&mut game, &[(0, 0, Mark::X)]);
        assert_eq!(game.local_mover(), Some(Mark::O));
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut game = GameState::new(PlayMode::Paired { local: Mark::X });
        play(&mut game, &[(0, 0, Mark::X)]);
        game.receive_remote_move(2, 2, Mark::O);
        game.reset();
        let once = game.clone();
        game.reset();
        assert_eq!(game, once);
        assert_eq!(game, GameState::new(PlayMode::Paired { local: Mark::X }));
        assert_eq!(game.phase(), Phase::AwaitingMove(Mark::X));
    }
}
