//! Xiangqi (Chinese chess) rules and a minimax/alpha-beta opponent.
//!
//! `logic` owns the board, move legality and game-end detection; `engine`
//! owns evaluation and search. The flat re-exports below are the entry
//! points most callers need.

pub mod engine;
pub mod logic;

pub use engine::config::{ConfigError, EngineConfig};
pub use engine::eval::SimpleEvaluator;
pub use engine::search::{get_best_move, AlphaBetaEngine, SearchError};
pub use engine::{Evaluator, Move, SearchResult, SearchStats, Searcher};
pub use logic::board::{Board, BoardCoordinate, Color, FenError, Piece, PieceType};
pub use logic::game::{GameState, GameStatus, MoveRecord};
pub use logic::generator::MoveGenerator;
pub use logic::rules::{
    check_game_end, is_in_check, is_valid_move, is_valid_move_at, EndReason, GameEnd, MoveError,
};

/// Standard opening position, Red to move.
#[must_use]
pub fn initialize_board() -> Board {
    Board::new()
}
