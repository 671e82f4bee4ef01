use crate::engine::{Move, Searcher};
use crate::logic::board::{Board, BoardCoordinate, Color, FenError, Piece};
use crate::logic::generator::MoveGenerator;
use crate::logic::rules::{check_game_end, check_move, is_in_check, EndReason, MoveError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Playing,
    Checkmate(Color), // Winner
    Stalemate(Color), // Winner: the blocked side loses
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub from: BoardCoordinate,
    pub to: BoardCoordinate,
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub color: Color,
    pub gives_check: bool,
}

impl MoveRecord {
    pub const fn as_move(&self) -> Move {
        Move::new(self.from, self.to)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub board: Board,
    pub turn: Color,
    pub status: GameStatus,
    pub last_move: Option<(BoardCoordinate, BoardCoordinate)>,
    pub history: Vec<MoveRecord>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            turn: Color::Red,
            status: GameStatus::Playing,
            last_move: None,
            history: Vec::new(),
        }
    }

    /// Starts from an arbitrary FEN position; the status is judged immediately.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let (board, turn) = Board::from_fen(fen)?;
        let mut game = Self {
            board,
            turn,
            status: GameStatus::Playing,
            last_move: None,
            history: Vec::new(),
        };
        game.update_status();
        Ok(game)
    }

    pub fn make_move(
        &mut self,
        from: BoardCoordinate,
        to: BoardCoordinate,
    ) -> Result<(), MoveError> {
        if self.status != GameStatus::Playing {
            return Err(MoveError::GameOver);
        }

        check_move(&self.board, from, to, self.turn)?;

        let piece = self
            .board
            .get_piece(from)
            .ok_or(MoveError::NoPieceAtSource)?;
        let captured = self.board.make_move(Move::new(from, to))?;
        let gives_check = is_in_check(&self.board, self.turn.opposite());

        self.history.push(MoveRecord {
            from,
            to,
            piece,
            captured,
            color: self.turn,
            gives_check,
        });
        log::debug!(
            "{} {:?} {from}->{to}{}",
            self.turn,
            piece.piece_type,
            if gives_check { " check" } else { "" }
        );

        self.turn = self.turn.opposite();
        self.last_move = Some((from, to));

        self.update_status();

        Ok(())
    }

    /// Asks `engine` for the side to move and plays its answer. `Ok(None)`
    /// means the game was already decided or no move exists.
    pub fn play_engine_move<S: Searcher>(
        &mut self,
        engine: &mut S,
        depth: u8,
    ) -> Result<Option<Move>, MoveError> {
        if self.status != GameStatus::Playing {
            return Ok(None);
        }
        let Some(mv) = engine.best_move(&self.board, self.turn, depth) else {
            return Ok(None);
        };
        self.make_move(mv.from, mv.to)?;
        Ok(Some(mv))
    }

    /// `play_engine_move` at the engine's own default depth.
    pub fn play_engine_turn<S: Searcher>(&mut self, engine: &mut S) -> Result<Option<Move>, MoveError> {
        let depth = engine.default_depth();
        self.play_engine_move(engine, depth)
    }

    fn update_status(&mut self) {
        let verdict = check_game_end(&self.board, self.turn.opposite());
        self.status = match (verdict.winner, verdict.reason) {
            (Some(winner), Some(EndReason::Checkmate)) => GameStatus::Checkmate(winner),
            (Some(winner), Some(EndReason::Stalemate)) => GameStatus::Stalemate(winner),
            _ => GameStatus::Playing,
        };

        if self.status != GameStatus::Playing {
            log::info!("game over: {:?}", self.status);
        }
    }

    /// Whether the side to move is in check.
    pub fn is_in_check(&self) -> bool {
        is_in_check(&self.board, self.turn)
    }

    /// Legal targets for the piece on `from`, empty unless it belongs to the side to move.
    pub fn legal_destinations(&self, from: BoardCoordinate) -> Vec<BoardCoordinate> {
        match self.board.get_piece(from) {
            Some(piece) if piece.color == self.turn && self.status == GameStatus::Playing => {
                MoveGenerator::new().legal_destinations(&self.board, from)
            }
            _ => Vec::new(),
        }
    }

    pub fn undo_move(&mut self) -> bool {
        let Some(record) = self.history.last().cloned() else {
            return false;
        };

        if let Err(err) = self.board.unmake_move(record.as_move(), record.captured) {
            log::warn!("undo of {} rejected: {err}", record.as_move());
            return false;
        }
        self.history.pop();
        self.turn = record.color;

        // Restore last_move from the previous record in history, if any
        self.last_move = self.history.last().map(|prev| (prev.from, prev.to));

        // Undoing always reopens the game, even from checkmate.
        self.status = GameStatus::Playing;
        log::debug!("undid {}", record.as_move());

        true
    }

    /// Takes back the last two plies (a player's move and the reply).
    /// Both plies go or neither does: nothing changes when fewer than two
    /// have been played or either one cannot be restored.
    pub fn undo_round(&mut self) -> bool {
        if self.history.len() < 2 {
            return false;
        }
        let mut rewound = self.clone();
        if !(rewound.undo_move() && rewound.undo_move()) {
            return false;
        }
        *self = rewound;
        true
    }
}
