use crate::engine::config::EngineConfig;
use crate::engine::eval::SimpleEvaluator;
use crate::engine::{Evaluator, Move, SearchResult, SearchStats, Searcher};
use crate::logic::board::{Board, Color};
use crate::logic::generator::MoveGenerator;
use crate::logic::rules::{is_in_check, MoveError};
use rand::seq::SliceRandom;
use std::sync::Arc;
use thiserror::Error;

/// Window bound wider than any reachable score.
pub const INFINITY: i32 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("board could not be restored during search: {0}")]
    Board(#[from] MoveError),
    #[error("search returned a move outside the legal set")]
    IllegalResult,
}

pub struct AlphaBetaEngine {
    config: Arc<EngineConfig>,
    evaluator: SimpleEvaluator,
    generator: MoveGenerator,
    nodes_searched: u32,
    last_stats: SearchStats,
}

impl Default for AlphaBetaEngine {
    fn default() -> Self {
        Self::new(Arc::new(EngineConfig::default()))
    }
}

impl AlphaBetaEngine {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        Self {
            evaluator: SimpleEvaluator::new(config.clone()),
            config,
            generator: MoveGenerator::new(),
            nodes_searched: 0,
            last_stats: SearchStats::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Statistics of the most recent `get_best_move` call.
    pub const fn last_stats(&self) -> SearchStats {
        self.last_stats
    }

    fn now() -> f64 {
        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            if let Some(window) = web_sys::window() {
                return window.performance().map_or(0.0, |p| p.now());
            }
            let global = js_sys::global();
            if let Ok(worker) = global.dyn_into::<web_sys::WorkerGlobalScope>() {
                return worker.performance().map_or(0.0, |p| p.now());
            }
            0.0
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            use std::time::{SystemTime, UNIX_EPOCH};
            let since_the_epoch = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default();
            #[allow(clippy::cast_precision_loss)]
            let time_ms = (since_the_epoch.as_secs() as f64).mul_add(
                1000.0,
                f64::from(since_the_epoch.subsec_nanos()) / 1_000_000.0,
            );
            time_ms
        }
    }

    /// Minimax with alpha-beta pruning. Red maximizes. The caller's board is
    /// not modified; the search plays and takes back moves on a private copy.
    pub fn search(
        &mut self,
        board: &Board,
        depth: u8,
        alpha: i32,
        beta: i32,
        maximizing: bool,
    ) -> Result<SearchResult, SearchError> {
        let mut scratch = board.clone();
        let result = self.alpha_beta(&mut scratch, depth, alpha, beta, maximizing);
        debug_assert!(result.is_err() || scratch == *board, "search left the board altered");
        result
    }

    fn alpha_beta(
        &mut self,
        board: &mut Board,
        depth: u8,
        alpha: i32,
        beta: i32,
        maximizing: bool,
    ) -> Result<SearchResult, SearchError> {
        self.nodes_searched = self.nodes_searched.saturating_add(1);

        if depth == 0 {
            return Ok(SearchResult::leaf(self.evaluator.evaluate(board)));
        }

        let turn = if maximizing { Color::Red } else { Color::Black };
        let moves = self.generator.generate_moves(board, turn);
        let Some(&first_move) = moves.first() else {
            return Ok(SearchResult::leaf(self.terminal_score(board, turn, depth)));
        };

        let (best_move, best_score) =
            Self::select_move(first_move, &moves, maximizing, alpha, beta, |mv, alpha, beta| {
                let captured = match board.make_move(mv) {
                    Ok(captured) => captured,
                    Err(err) => {
                        log::warn!("skipping {mv} at depth {depth}: {err}");
                        return Ok(None);
                    }
                };
                let child = self.alpha_beta(board, depth - 1, alpha, beta, !maximizing);
                board.unmake_move(mv, captured)?;

                match child {
                    Ok(result) => Ok(Some(result.score)),
                    Err(err) => {
                        log::warn!("skipping {mv} at depth {depth}: {err}");
                        Ok(None)
                    }
                }
            })?;

        let score = best_score.unwrap_or_else(|| self.evaluator.evaluate(board));
        Ok(SearchResult {
            best_move: Some(best_move),
            score,
        })
    }

    /// Alpha-beta loop over `moves`. `child` scores one move inside the
    /// current window; `Ok(None)` skips it and `Err` aborts the node. The
    /// chosen move defaults to `first_move` so a node with legal moves always
    /// names one, with `None` as score when every child was skipped.
    fn select_move<F>(
        first_move: Move,
        moves: &[Move],
        maximizing: bool,
        mut alpha: i32,
        mut beta: i32,
        mut child: F,
    ) -> Result<(Move, Option<i32>), SearchError>
    where
        F: FnMut(Move, i32, i32) -> Result<Option<i32>, SearchError>,
    {
        let mut best_move = first_move;
        let mut best_score: Option<i32> = None;

        for &mv in moves {
            let Some(score) = child(mv, alpha, beta)? else {
                continue;
            };

            let improves = best_score.map_or(true, |best| {
                if maximizing {
                    score > best
                } else {
                    score < best
                }
            });
            if improves {
                best_score = Some(score);
                best_move = mv;
            }

            if maximizing {
                alpha = alpha.max(score);
            } else {
                beta = beta.min(score);
            }
            if beta <= alpha {
                break;
            }
        }

        Ok((best_move, best_score))
    }

    /// Score for a side with no legal move. Mates found with more depth left
    /// are nearer the root and score further from zero.
    fn terminal_score(&self, board: &Board, turn: Color, depth: u8) -> i32 {
        if !self.config.stalemate_is_loss && !is_in_check(board, turn) {
            return 0;
        }
        let magnitude = self.config.mate_score.saturating_add(i32::from(depth));
        match turn {
            Color::Red => -magnitude,
            Color::Black => magnitude,
        }
    }

    /// Picks a move for `side`. Returns `None` only when `side` has no legal
    /// move; any search anomaly falls back to a random legal move.
    pub fn get_best_move(&mut self, board: &Board, side: Color, depth: u8) -> Option<Move> {
        let moves = self.generator.generate_moves(board, side);
        match moves.as_slice() {
            [] => {
                log::debug!("no legal move for {side}");
                return None;
            }
            [only] => return Some(*only),
            _ => {}
        }

        let depth = self.config.clamp_depth(depth);
        self.nodes_searched = 0;
        let start = Self::now();

        let outcome = self.search(board, depth, -INFINITY, INFINITY, side == Color::Red);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let elapsed = (Self::now() - start).max(0.0) as u64;
        self.last_stats = SearchStats {
            depth,
            nodes: self.nodes_searched,
            time_ms: elapsed,
        };

        if let Ok(result) = &outcome {
            log::debug!(
                "{side} search: score={} depth={depth} nodes={} time={elapsed}ms",
                result.score,
                self.nodes_searched
            );
        }
        Self::settle_move(side, &moves, outcome)
    }

    /// Same as `get_best_move` at the configured `default_depth`.
    pub fn get_default_move(&mut self, board: &Board, side: Color) -> Option<Move> {
        let depth = self.config.default_depth;
        self.get_best_move(board, side, depth)
    }

    /// Accepts the searched move when it is one of `moves`; any error or
    /// foreign move falls back to a uniformly random pick among `moves`.
    fn settle_move(
        side: Color,
        moves: &[Move],
        outcome: Result<SearchResult, SearchError>,
    ) -> Option<Move> {
        let checked = outcome.and_then(|result| match result.best_move {
            Some(mv) if moves.contains(&mv) => Ok(mv),
            _ => Err(SearchError::IllegalResult),
        });

        match checked {
            Ok(mv) => {
                log::debug!("{side} plays {mv}");
                Some(mv)
            }
            Err(err) => {
                log::warn!("search failed for {side} ({err}), picking a random legal move");
                moves.choose(&mut rand::thread_rng()).copied()
            }
        }
    }
}

impl Searcher for AlphaBetaEngine {
    fn best_move(&mut self, board: &Board, side: Color, depth: u8) -> Option<Move> {
        self.get_best_move(board, side, depth)
    }

    fn default_depth(&self) -> u8 {
        self.config.default_depth
    }
}

/// One-shot helper using the default configuration.
pub fn get_best_move(board: &Board, side: Color, depth: u8) -> Option<Move> {
    AlphaBetaEngine::default().get_best_move(board, side, depth)
}
