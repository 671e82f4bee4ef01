use crate::logic::board::{Board, BoardCoordinate, Color};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod config;
pub mod eval;
pub mod search;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Move {
    pub from: BoardCoordinate,
    pub to: BoardCoordinate,
}

impl Move {
    pub const fn new(from: BoardCoordinate, to: BoardCoordinate) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.from, self.to)
    }
}

/// Outcome of one search call. `best_move` is `None` only at leaves and
/// positions without legal moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    pub score: i32,
}

impl SearchResult {
    pub const fn leaf(score: i32) -> Self {
        Self {
            best_move: None,
            score,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SearchStats {
    pub depth: u8,
    pub nodes: u32,
    pub time_ms: u64,
}

pub trait Evaluator {
    /// Positive scores favour Red.
    fn evaluate(&self, board: &Board) -> i32;
}

pub trait Searcher {
    fn best_move(&mut self, board: &Board, side: Color, depth: u8) -> Option<Move>;

    /// Depth used when the caller does not pick one.
    fn default_depth(&self) -> u8;
}
