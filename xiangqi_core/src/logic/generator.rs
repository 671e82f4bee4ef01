use crate::engine::Move;
use crate::logic::board::{Board, BoardCoordinate, Color, Piece, PieceType};
use crate::logic::rules::{ensure_general_safe_in_place, validate_piece_logic};

const ORTHOGONAL: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const DIAGONAL: [(isize, isize); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const ELEPHANT_JUMPS: [(isize, isize); 4] = [(-2, -2), (-2, 2), (2, -2), (2, 2)];
const HORSE_JUMPS: [(isize, isize); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

/// Enumerates moves by walking each piece's reachable targets and running
/// them through the rules. Yields the same set as scanning every
/// (piece, destination) pair, in row-major origin order.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveGenerator;

impl MoveGenerator {
    pub const fn new() -> Self {
        Self
    }

    /// All fully-legal moves for `turn`. Candidates are judged on one
    /// scratch copy of `board`, played and taken back in turn.
    pub fn generate_moves(&self, board: &Board, turn: Color) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);
        let mut scratch = board.clone();
        for (from, piece) in board.pieces(turn) {
            self.for_each_target(board, from, piece, |to| {
                let mv = Move::new(from, to);
                if ensure_general_safe_in_place(&mut scratch, mv, turn).is_ok() {
                    moves.push(mv);
                }
                true
            });
        }
        moves
    }

    /// Geometry-legal moves for `turn`, ignoring self-check.
    pub fn generate_pseudo_moves(&self, board: &Board, turn: Color) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);
        for (from, piece) in board.pieces(turn) {
            self.for_each_target(board, from, piece, |to| {
                moves.push(Move::new(from, to));
                true
            });
        }
        moves
    }

    /// Destinations the piece on `from` may legally reach; empty when the square is empty.
    pub fn legal_destinations(&self, board: &Board, from: BoardCoordinate) -> Vec<BoardCoordinate> {
        let Some(piece) = board.get_piece(from) else {
            return Vec::new();
        };

        let mut targets = Vec::new();
        let mut scratch = board.clone();
        self.for_each_target(board, from, piece, |to| {
            if ensure_general_safe_in_place(&mut scratch, Move::new(from, to), piece.color).is_ok() {
                targets.push(to);
            }
            true
        });
        targets
    }

    /// Checks if the player has at least one legal move.
    /// This is optimized to return `true` as soon as a valid move is found.
    pub fn has_legal_moves(&self, board: &Board, turn: Color) -> bool {
        let mut scratch = board.clone();
        board.pieces(turn).any(|(from, piece)| {
            let mut found = false;
            self.for_each_target(board, from, piece, |to| {
                found = ensure_general_safe_in_place(&mut scratch, Move::new(from, to), turn).is_ok();
                !found
            });
            found
        })
    }

    /// Calls `visit` with every pseudo-legal destination of `piece`. The
    /// visitor returns `false` to stop early.
    fn for_each_target<F>(&self, board: &Board, from: BoardCoordinate, piece: Piece, mut visit: F)
    where
        F: FnMut(BoardCoordinate) -> bool,
    {
        let mut try_target = |to: BoardCoordinate| {
            if validate_piece_logic(board, piece, from, to).is_ok() {
                visit(to)
            } else {
                true
            }
        };

        match piece.piece_type {
            PieceType::General => Self::visit_offsets(from, &ORTHOGONAL, &mut try_target),
            PieceType::Advisor => Self::visit_offsets(from, &DIAGONAL, &mut try_target),
            PieceType::Elephant => Self::visit_offsets(from, &ELEPHANT_JUMPS, &mut try_target),
            PieceType::Horse => Self::visit_offsets(from, &HORSE_JUMPS, &mut try_target),
            PieceType::Soldier => {
                let forward = piece.color.forward();
                Self::visit_offsets(from, &[(forward, 0), (0, -1), (0, 1)], &mut try_target);
            }
            PieceType::Chariot => Self::visit_rays(board, from, false, &mut try_target),
            PieceType::Cannon => Self::visit_rays(board, from, true, &mut try_target),
        }
    }

    fn visit_offsets<F>(from: BoardCoordinate, offsets: &[(isize, isize)], visit: &mut F)
    where
        F: FnMut(BoardCoordinate) -> bool,
    {
        for &(dr, dc) in offsets {
            if let Some(to) = from.offset(dr, dc) {
                if !visit(to) {
                    return;
                }
            }
        }
    }

    /// Walks the four orthogonal rays. A chariot ray ends at the first
    /// occupied square; a cannon ray runs to the edge so it can find its
    /// capture beyond the screen.
    fn visit_rays<F>(board: &Board, from: BoardCoordinate, past_blockers: bool, visit: &mut F)
    where
        F: FnMut(BoardCoordinate) -> bool,
    {
        for &(dr, dc) in &ORTHOGONAL {
            let mut cursor = from.offset(dr, dc);
            while let Some(to) = cursor {
                if !visit(to) {
                    return;
                }
                if !past_blockers && board.is_occupied(to) {
                    break;
                }
                cursor = to.offset(dr, dc);
            }
        }
    }
}
