use crate::engine::Move;
use crate::logic::rules::MoveError;
use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;
use std::fmt;
use thiserror::Error;

pub const BOARD_ROWS: usize = 10;
pub const BOARD_COLS: usize = 9;
pub const BOARD_SQUARES: usize = BOARD_ROWS * BOARD_COLS;

/// One of the two sides. Red starts on rows 5-9 and moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Red,
    Black,
}

impl Color {
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Red => Self::Black,
            Self::Black => Self::Red,
        }
    }

    /// Row delta of a single forward step.
    pub const fn forward(self) -> isize {
        match self {
            Self::Red => -1,
            Self::Black => 1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Red => f.write_str("red"),
            Self::Black => f.write_str("black"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceType {
    General,
    Advisor,
    Elephant,
    Horse,
    Chariot,
    Cannon,
    Soldier,
}

impl PieceType {
    /// Lower-case FEN letter.
    pub const fn fen_char(self) -> char {
        match self {
            Self::General => 'k',
            Self::Advisor => 'a',
            Self::Elephant => 'b',
            Self::Horse => 'n',
            Self::Chariot => 'r',
            Self::Cannon => 'c',
            Self::Soldier => 'p',
        }
    }

    pub const fn from_fen_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'k' => Some(Self::General),
            'a' => Some(Self::Advisor),
            'b' | 'e' => Some(Self::Elephant),
            'n' | 'h' => Some(Self::Horse),
            'r' => Some(Self::Chariot),
            'c' => Some(Self::Cannon),
            'p' => Some(Self::Soldier),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub piece_type: PieceType,
    pub color: Color,
}

impl Piece {
    pub const fn new(piece_type: PieceType, color: Color) -> Self {
        Self { piece_type, color }
    }

    pub const fn fen_char(self) -> char {
        let c = self.piece_type.fen_char();
        match self.color {
            Color::Red => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }
}

/// A square on the 10x9 grid. Row 0 is Black's back rank, row 9 is Red's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoardCoordinate {
    pub row: usize,
    pub col: usize,
}

impl BoardCoordinate {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Option<Self> {
        if row < BOARD_ROWS && col < BOARD_COLS {
            Some(Self { row, col })
        } else {
            None
        }
    }

    /// Accepts raw signed input, e.g. from pointer math in a UI.
    #[must_use]
    pub fn from_signed(row: isize, col: isize) -> Option<Self> {
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        Self::new(row, col)
    }

    #[must_use]
    pub fn offset(self, d_row: isize, d_col: isize) -> Option<Self> {
        let row = self.row.checked_add_signed(d_row)?;
        let col = self.col.checked_add_signed(d_col)?;
        Self::new(row, col)
    }

    pub const fn index(self) -> usize {
        self.row * BOARD_COLS + self.col
    }

    #[must_use]
    pub const fn from_index(sq: usize) -> Option<Self> {
        Self::new(sq / BOARD_COLS, sq % BOARD_COLS)
    }

    /// Reflection across the river.
    #[must_use]
    pub const fn mirrored(self) -> Self {
        Self {
            row: BOARD_ROWS - 1 - self.row,
            col: self.col,
        }
    }
}

impl fmt::Display for BoardCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("FEN string is empty")]
    Empty,
    #[error("expected 10 rows in FEN placement, found {0}")]
    RowCount(usize),
    #[error("FEN row {row} describes {cols} columns, expected 9")]
    ColumnCount { row: usize, cols: usize },
    #[error("unknown FEN piece letter '{0}'")]
    UnknownPiece(char),
    #[error("unknown side to move '{0}'")]
    UnknownSide(String),
}

/// The 10x9 grid. Cloning is cheap and every clone is independent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    #[serde(with = "BigArray")]
    grid: [Option<Piece>; BOARD_SQUARES],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Standard starting layout.
    #[must_use]
    pub fn new() -> Self {
        let mut board = Self::empty();
        board.setup_initial_position();
        board
    }

    #[must_use]
    pub const fn empty() -> Self {
        Self {
            grid: [None; BOARD_SQUARES],
        }
    }

    fn setup_initial_position(&mut self) {
        // Black (top, rows 0-3)
        self.setup_pieces(Color::Black, 0, 2, 3);

        // Red (bottom, rows 6-9)
        self.setup_pieces(Color::Red, 9, 7, 6);
    }

    fn setup_pieces(&mut self, color: Color, back_row: usize, cannon_row: usize, soldier_row: usize) {
        let pieces = [
            PieceType::Chariot,
            PieceType::Horse,
            PieceType::Elephant,
            PieceType::Advisor,
            PieceType::General,
            PieceType::Advisor,
            PieceType::Elephant,
            PieceType::Horse,
            PieceType::Chariot,
        ];

        for (col, &pt) in pieces.iter().enumerate() {
            self.add_piece(back_row, col, pt, color);
        }

        self.add_piece(cannon_row, 1, PieceType::Cannon, color);
        self.add_piece(cannon_row, 7, PieceType::Cannon, color);

        for col in (0..BOARD_COLS).step_by(2) {
            self.add_piece(soldier_row, col, PieceType::Soldier, color);
        }
    }

    /// Places a piece; coordinates outside the grid are ignored.
    pub fn add_piece(&mut self, row: usize, col: usize, piece_type: PieceType, color: Color) {
        if let Some(pos) = BoardCoordinate::new(row, col) {
            self.set_piece(pos, Some(Piece::new(piece_type, color)));
        }
    }

    pub fn set_piece(&mut self, pos: BoardCoordinate, piece: Option<Piece>) {
        if let Some(cell) = self.grid.get_mut(pos.index()) {
            *cell = piece;
        }
    }

    #[must_use]
    pub fn get_piece(&self, pos: BoardCoordinate) -> Option<Piece> {
        self.grid.get(pos.index()).copied().flatten()
    }

    pub fn is_occupied(&self, pos: BoardCoordinate) -> bool {
        self.get_piece(pos).is_some()
    }

    pub fn clear(&mut self) {
        self.grid = [None; BOARD_SQUARES];
    }

    /// Every occupied square in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = (BoardCoordinate, Piece)> + '_ {
        self.grid.iter().enumerate().filter_map(|(sq, cell)| {
            let piece = (*cell)?;
            BoardCoordinate::from_index(sq).map(|pos| (pos, piece))
        })
    }

    /// Squares held by `color`, row-major.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (BoardCoordinate, Piece)> + '_ {
        self.occupied().filter(move |(_, p)| p.color == color)
    }

    #[must_use]
    pub fn find_general(&self, color: Color) -> Option<BoardCoordinate> {
        self.pieces(color)
            .find(|(_, p)| p.piece_type == PieceType::General)
            .map(|(pos, _)| pos)
    }

    /// Moves whatever stands on `mv.from` to `mv.to` and returns the captured piece.
    /// No rule checking is done here.
    pub fn make_move(&mut self, mv: Move) -> Result<Option<Piece>, MoveError> {
        let piece = self.get_piece(mv.from).ok_or(MoveError::NoPieceAtSource)?;
        let captured = self.get_piece(mv.to);
        self.set_piece(mv.from, None);
        self.set_piece(mv.to, Some(piece));
        Ok(captured)
    }

    /// Reverts a `make_move`, restoring `captured` on the destination square.
    pub fn unmake_move(&mut self, mv: Move, captured: Option<Piece>) -> Result<(), MoveError> {
        if self.is_occupied(mv.from) {
            return Err(MoveError::CorruptUndo(mv.from));
        }
        let piece = self
            .get_piece(mv.to)
            .ok_or(MoveError::CorruptUndo(mv.to))?;
        self.set_piece(mv.to, captured);
        self.set_piece(mv.from, Some(piece));
        Ok(())
    }

    /// Copy-on-branch variant of `make_move`. The receiver is left untouched.
    #[must_use]
    pub fn with_move(&self, mv: Move) -> Self {
        let mut next = self.clone();
        if let Err(err) = next.make_move(mv) {
            log::warn!("with_move({mv}) ignored: {err}");
        }
        next
    }

    /// Reflects the board across the river and swaps every piece's side.
    #[must_use]
    pub fn mirrored(&self) -> Self {
        let mut out = Self::empty();
        for (pos, piece) in self.occupied() {
            out.set_piece(
                pos.mirrored(),
                Some(Piece::new(piece.piece_type, piece.color.opposite())),
            );
        }
        out
    }

    pub fn to_fen_string(&self, turn: Color) -> String {
        let mut fen = String::new();
        for r in 0..BOARD_ROWS {
            let mut empty_count = 0;
            for c in 0..BOARD_COLS {
                match BoardCoordinate::new(r, c).and_then(|pos| self.get_piece(pos)) {
                    Some(piece) => {
                        if empty_count > 0 {
                            fen.push_str(&empty_count.to_string());
                            empty_count = 0;
                        }
                        fen.push(piece.fen_char());
                    }
                    None => empty_count += 1,
                }
            }
            if empty_count > 0 {
                fen.push_str(&empty_count.to_string());
            }
            if r + 1 < BOARD_ROWS {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(if turn == Color::Red { 'w' } else { 'b' });
        fen
    }

    /// Parses the placement and side-to-move fields of a Xiangqi FEN.
    /// Trailing fields (move counters) are ignored; a missing side means Red.
    pub fn from_fen(fen: &str) -> Result<(Self, Color), FenError> {
        let mut fields = fen.split_whitespace();
        let placement = fields.next().ok_or(FenError::Empty)?;

        let rows: Vec<&str> = placement.split('/').collect();
        if rows.len() != BOARD_ROWS {
            return Err(FenError::RowCount(rows.len()));
        }

        let mut board = Self::empty();
        for (r, row_text) in rows.iter().enumerate() {
            let mut col = 0;
            for ch in row_text.chars() {
                if let Some(skip) = ch.to_digit(10) {
                    col += skip as usize;
                    continue;
                }
                let piece_type = PieceType::from_fen_char(ch).ok_or(FenError::UnknownPiece(ch))?;
                let color = if ch.is_ascii_uppercase() {
                    Color::Red
                } else {
                    Color::Black
                };
                if col >= BOARD_COLS {
                    return Err(FenError::ColumnCount { row: r, cols: col + 1 });
                }
                board.add_piece(r, col, piece_type, color);
                col += 1;
            }
            if col != BOARD_COLS {
                return Err(FenError::ColumnCount { row: r, cols: col });
            }
        }

        let turn = match fields.next() {
            None | Some("w" | "r") => Color::Red,
            Some("b") => Color::Black,
            Some(other) => return Err(FenError::UnknownSide(other.to_string())),
        };

        Ok((board, turn))
    }
}
