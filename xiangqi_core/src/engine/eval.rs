use crate::engine::config::EngineConfig;
use crate::engine::Evaluator;
use crate::logic::board::{Board, Color};
use crate::logic::eval_constants::get_pst_value;
use crate::logic::rules::is_in_check;
use std::sync::Arc;

/// Material + Horse/Soldier placement + a small bonus for giving check.
pub struct SimpleEvaluator {
    config: Arc<EngineConfig>,
}

impl SimpleEvaluator {
    pub const fn new(config: Arc<EngineConfig>) -> Self {
        Self { config }
    }
}

impl Evaluator for SimpleEvaluator {
    fn evaluate(&self, board: &Board) -> i32 {
        let mut score = 0;

        for (pos, piece) in board.occupied() {
            let value = self.config.piece_value(piece.piece_type)
                + get_pst_value(piece.piece_type, piece.color, pos.row, pos.col);
            match piece.color {
                Color::Red => score += value,
                Color::Black => score -= value,
            }
        }

        if is_in_check(board, Color::Black) {
            score += self.config.check_bonus;
        }
        if is_in_check(board, Color::Red) {
            score -= self.config.check_bonus;
        }

        score
    }
}
