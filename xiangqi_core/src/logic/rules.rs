use crate::engine::Move;
use crate::logic::board::{Board, BoardCoordinate, Color, Piece, PieceType};
use crate::logic::generator::MoveGenerator;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("coordinates are off the board")]
    OutOfBounds,
    #[error("no piece on the source square")]
    NoPieceAtSource,
    #[error("piece does not belong to the side to move")]
    NotYourTurn,
    #[error("source and destination are the same square")]
    SameSquare,
    #[error("piece cannot move in that pattern")]
    InvalidMovePattern,
    #[error("path is blocked")]
    BlockedPath,
    #[error("destination holds a piece of the same side")]
    TargetOccupiedByFriendly,
    #[error("piece cannot leave its palace")]
    PalaceRestriction,
    #[error("elephant cannot cross the river")]
    RiverRestriction,
    #[error("move leaves own general in check")]
    SelfCheck,
    #[error("move leaves the generals facing on an open file")]
    FlyingGeneral,
    #[error("game is already over")]
    GameOver,
    #[error("cannot restore move: board disagrees at {0}")]
    CorruptUndo(BoardCoordinate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    Checkmate,
    Stalemate,
}

/// Verdict of `check_game_end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEnd {
    pub is_over: bool,
    pub winner: Option<Color>,
    pub reason: Option<EndReason>,
}

impl GameEnd {
    pub const ONGOING: Self = Self {
        is_over: false,
        winner: None,
        reason: None,
    };

    const fn won_by(winner: Color, reason: EndReason) -> Self {
        Self {
            is_over: true,
            winner: Some(winner),
            reason: Some(reason),
        }
    }
}

/// Fully-legal check for the piece standing on `from`: geometry, blocking and
/// the self-check filter. Returns the first rule that rejects the move.
pub fn check_move(
    board: &Board,
    from: BoardCoordinate,
    to: BoardCoordinate,
    turn: Color,
) -> Result<(), MoveError> {
    let piece = board.get_piece(from).ok_or(MoveError::NoPieceAtSource)?;
    if piece.color != turn {
        return Err(MoveError::NotYourTurn);
    }

    validate_piece_logic(board, piece, from, to)?;
    ensure_general_safe(board, Move::new(from, to), turn)
}

/// `true` when `piece`, standing on `from`, may legally move to `to`.
/// A board that does not hold `piece` on `from` yields `false`.
pub fn is_valid_move(piece: Piece, board: &Board, from: BoardCoordinate, to: BoardCoordinate) -> bool {
    if board.get_piece(from) != Some(piece) {
        return false;
    }
    check_move(board, from, to, piece.color).is_ok()
}

/// Raw-coordinate entry point for interactive callers. Off-board input and a
/// missing piece are answered with `false`.
pub fn is_valid_move_at(
    piece: Option<Piece>,
    board: &Board,
    from: (isize, isize),
    to: (isize, isize),
) -> bool {
    let (Some(piece), Some(from), Some(to)) = (
        piece,
        BoardCoordinate::from_signed(from.0, from.1),
        BoardCoordinate::from_signed(to.0, to.1),
    ) else {
        return false;
    };
    is_valid_move(piece, board, from, to)
}

/// Geometry-only legality; the mover's own king safety is not considered.
pub fn is_pseudo_legal(piece: Piece, board: &Board, from: BoardCoordinate, to: BoardCoordinate) -> bool {
    validate_piece_logic(board, piece, from, to).is_ok()
}

/// Self-check filter: plays `mv` on a scratch copy and rejects it if the
/// mover's general is attacked or left facing the enemy general.
pub fn ensure_general_safe(board: &Board, mv: Move, color: Color) -> Result<(), MoveError> {
    let mut scratch = board.clone();
    ensure_general_safe_in_place(&mut scratch, mv, color)
}

/// Same verdict as `ensure_general_safe`, judged by playing `mv` on `board`
/// and taking it back. `board` is unchanged on return.
pub fn ensure_general_safe_in_place(
    board: &mut Board,
    mv: Move,
    color: Color,
) -> Result<(), MoveError> {
    let captured = board.make_move(mv)?;

    let verdict = if is_in_check(board, color) {
        Err(MoveError::SelfCheck)
    } else if is_flying_general(board) {
        Err(MoveError::FlyingGeneral)
    } else {
        Ok(())
    };

    board.unmake_move(mv, captured)?;
    verdict
}

/// `true` if any enemy piece attacks `color`'s general by raw geometry.
/// A board without that general is never in check.
pub fn is_in_check(board: &Board, color: Color) -> bool {
    let Some(general) = board.find_general(color) else {
        return false;
    };

    board
        .pieces(color.opposite())
        .any(|(pos, piece)| validate_piece_logic(board, piece, pos, general).is_ok())
}

/// Both generals on one file with nothing between them.
pub fn is_flying_general(board: &Board) -> bool {
    let (Some(red), Some(black)) = (
        board.find_general(Color::Red),
        board.find_general(Color::Black),
    ) else {
        return false;
    };

    red.col == black.col && count_obstacles(board, red, black) == Some(0)
}

/// Judges the position after `last_mover` has moved. The opponent loses when
/// it has no fully-legal move; being in check decides checkmate vs stalemate.
pub fn check_game_end(board: &Board, last_mover: Color) -> GameEnd {
    let defender = last_mover.opposite();
    if MoveGenerator::new().has_legal_moves(board, defender) {
        return GameEnd::ONGOING;
    }

    if is_in_check(board, defender) {
        GameEnd::won_by(last_mover, EndReason::Checkmate)
    } else {
        GameEnd::won_by(last_mover, EndReason::Stalemate)
    }
}

/// Validates the geometry and specific rules for a piece move, IGNORING self-check.
pub fn validate_piece_logic(
    board: &Board,
    piece: Piece,
    from: BoardCoordinate,
    to: BoardCoordinate,
) -> Result<(), MoveError> {
    if from == to {
        return Err(MoveError::SameSquare);
    }

    if let Some(target) = board.get_piece(to) {
        if target.color == piece.color {
            return Err(MoveError::TargetOccupiedByFriendly);
        }
    }

    let d_row = to.row.abs_diff(from.row);
    let d_col = to.col.abs_diff(from.col);

    match piece.piece_type {
        PieceType::General => validate_general(piece.color, to, d_row, d_col),
        PieceType::Advisor => validate_advisor(piece.color, to, d_row, d_col),
        PieceType::Elephant => validate_elephant(board, piece.color, from, to, d_row, d_col),
        PieceType::Horse => validate_horse(board, from, to, d_row, d_col),
        PieceType::Chariot => validate_chariot(board, from, to),
        PieceType::Cannon => validate_cannon(board, from, to),
        PieceType::Soldier => validate_soldier(piece.color, from, to, d_row, d_col),
    }
}

fn validate_general(
    color: Color,
    to: BoardCoordinate,
    d_row: usize,
    d_col: usize,
) -> Result<(), MoveError> {
    if d_row + d_col != 1 {
        return Err(MoveError::InvalidMovePattern);
    }
    if !is_in_palace(color, to) {
        return Err(MoveError::PalaceRestriction);
    }
    Ok(())
}

fn validate_advisor(
    color: Color,
    to: BoardCoordinate,
    d_row: usize,
    d_col: usize,
) -> Result<(), MoveError> {
    if d_row != 1 || d_col != 1 {
        return Err(MoveError::InvalidMovePattern);
    }
    if !is_in_palace(color, to) {
        return Err(MoveError::PalaceRestriction);
    }
    Ok(())
}

fn validate_elephant(
    board: &Board,
    color: Color,
    from: BoardCoordinate,
    to: BoardCoordinate,
    d_row: usize,
    d_col: usize,
) -> Result<(), MoveError> {
    if d_row != 2 || d_col != 2 {
        return Err(MoveError::InvalidMovePattern);
    }
    if !is_own_half(color, to.row) {
        return Err(MoveError::RiverRestriction);
    }
    let eye = BoardCoordinate::new(
        (from.row + to.row) / 2,
        (from.col + to.col) / 2,
    )
    .ok_or(MoveError::OutOfBounds)?;
    if board.is_occupied(eye) {
        return Err(MoveError::BlockedPath);
    }
    Ok(())
}

fn validate_horse(
    board: &Board,
    from: BoardCoordinate,
    to: BoardCoordinate,
    d_row: usize,
    d_col: usize,
) -> Result<(), MoveError> {
    if !((d_row == 2 && d_col == 1) || (d_row == 1 && d_col == 2)) {
        return Err(MoveError::InvalidMovePattern);
    }
    // The leg sits one step from the origin along the long axis.
    let leg_row = if d_row == 2 {
        (from.row + to.row) / 2
    } else {
        from.row
    };
    let leg_col = if d_col == 2 {
        (from.col + to.col) / 2
    } else {
        from.col
    };

    let leg = BoardCoordinate::new(leg_row, leg_col).ok_or(MoveError::OutOfBounds)?;
    if board.is_occupied(leg) {
        return Err(MoveError::BlockedPath);
    }
    Ok(())
}

fn validate_chariot(board: &Board, from: BoardCoordinate, to: BoardCoordinate) -> Result<(), MoveError> {
    match count_obstacles(board, from, to) {
        None => Err(MoveError::InvalidMovePattern),
        Some(0) => Ok(()),
        Some(_) => Err(MoveError::BlockedPath),
    }
}

fn validate_cannon(board: &Board, from: BoardCoordinate, to: BoardCoordinate) -> Result<(), MoveError> {
    let obstacles = count_obstacles(board, from, to).ok_or(MoveError::InvalidMovePattern)?;
    let screens_needed = usize::from(board.is_occupied(to));

    if obstacles == screens_needed {
        Ok(())
    } else {
        Err(MoveError::BlockedPath)
    }
}

fn validate_soldier(
    color: Color,
    from: BoardCoordinate,
    to: BoardCoordinate,
    d_row: usize,
    d_col: usize,
) -> Result<(), MoveError> {
    if d_row + d_col != 1 {
        return Err(MoveError::InvalidMovePattern);
    }

    let forward_step = from.offset(color.forward(), 0) == Some(to);
    if forward_step {
        return Ok(());
    }

    // Sideways steps only once the soldier stands across the river.
    if d_col == 1 && !is_own_half(color, from.row) {
        return Ok(());
    }

    Err(MoveError::InvalidMovePattern)
}

fn is_in_palace(color: Color, pos: BoardCoordinate) -> bool {
    if !(3..=5).contains(&pos.col) {
        return false;
    }
    match color {
        Color::Red => pos.row >= 7,
        Color::Black => pos.row <= 2,
    }
}

/// Red's half is rows 5-9, Black's is rows 0-4.
const fn is_own_half(color: Color, row: usize) -> bool {
    match color {
        Color::Red => row >= 5,
        Color::Black => row <= 4,
    }
}

/// Pieces strictly between two squares on a shared row or column; `None`
/// when the squares are not aligned.
pub fn count_obstacles(board: &Board, from: BoardCoordinate, to: BoardCoordinate) -> Option<usize> {
    if from.row == to.row {
        let (min, max) = (from.col.min(to.col), from.col.max(to.col));
        Some(
            ((min + 1)..max)
                .filter_map(|c| BoardCoordinate::new(from.row, c))
                .filter(|&pos| board.is_occupied(pos))
                .count(),
        )
    } else if from.col == to.col {
        let (min, max) = (from.row.min(to.row), from.row.max(to.row));
        Some(
            ((min + 1)..max)
                .filter_map(|r| BoardCoordinate::new(r, from.col))
                .filter(|&pos| board.is_occupied(pos))
                .count(),
        )
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(row: usize, col: usize) -> BoardCoordinate {
        BoardCoordinate::new(row, col).unwrap()
    }

    /// Empty board with the generals on different files.
    fn bare_board() -> Board {
        let mut board = Board::empty();
        board.add_piece(9, 3, PieceType::General, Color::Red);
        board.add_piece(0, 5, PieceType::General, Color::Black);
        board
    }

    fn place(board: &mut Board, row: usize, col: usize, pt: PieceType, color: Color) -> Piece {
        board.add_piece(row, col, pt, color);
        Piece::new(pt, color)
    }

    #[test]
    fn test_soldier_before_river() {
        let board = Board::new();
        let soldier = board.get_piece(sq(6, 0)).unwrap();
        assert!(is_valid_move(soldier, &board, sq(6, 0), sq(5, 0)));
        assert!(!is_valid_move(soldier, &board, sq(6, 0), sq(4, 0)));
        assert!(!is_valid_move(soldier, &board, sq(6, 0), sq(6, 1)));
        assert!(!is_valid_move(soldier, &board, sq(6, 0), sq(7, 0)));
    }

    #[test]
    fn test_soldier_after_river() {
        let mut board = bare_board();
        let soldier = place(&mut board, 4, 2, PieceType::Soldier, Color::Red);
        assert!(is_valid_move(soldier, &board, sq(4, 2), sq(3, 2)));
        assert!(is_valid_move(soldier, &board, sq(4, 2), sq(4, 1)));
        assert!(is_valid_move(soldier, &board, sq(4, 2), sq(4, 3)));
        assert!(!is_valid_move(soldier, &board, sq(4, 2), sq(5, 2)));
        assert!(!is_valid_move(soldier, &board, sq(4, 2), sq(3, 3)));

        let black = place(&mut board, 5, 6, PieceType::Soldier, Color::Black);
        assert!(is_valid_move(black, &board, sq(5, 6), sq(6, 6)));
        assert!(is_valid_move(black, &board, sq(5, 6), sq(5, 7)));
        assert!(!is_valid_move(black, &board, sq(5, 6), sq(4, 6)));
    }

    #[test]
    fn test_general_and_advisor_stay_in_palace() {
        let board = Board::new();
        let general = board.get_piece(sq(9, 4)).unwrap();
        assert!(is_valid_move(general, &board, sq(9, 4), sq(8, 4)));
        assert!(!is_valid_move(general, &board, sq(9, 4), sq(8, 3)));

        let mut board = bare_board();
        let general = Piece::new(PieceType::General, Color::Red);
        board.set_piece(sq(9, 3), None);
        board.add_piece(7, 3, PieceType::General, Color::Red);
        assert_eq!(
            validate_piece_logic(&board, general, sq(7, 3), sq(6, 3)),
            Err(MoveError::PalaceRestriction)
        );
        assert_eq!(
            validate_piece_logic(&board, general, sq(7, 3), sq(7, 2)),
            Err(MoveError::PalaceRestriction)
        );

        let advisor = place(&mut board, 8, 4, PieceType::Advisor, Color::Red);
        assert!(is_valid_move(advisor, &board, sq(8, 4), sq(9, 5)));
        assert!(!is_valid_move(advisor, &board, sq(8, 4), sq(8, 5)));
    }

    #[test]
    fn test_elephant_eye_and_river() {
        let mut board = bare_board();
        let elephant = place(&mut board, 5, 2, PieceType::Elephant, Color::Red);
        assert!(is_valid_move(elephant, &board, sq(5, 2), sq(7, 4)));
        assert_eq!(
            validate_piece_logic(&board, elephant, sq(5, 2), sq(3, 4)),
            Err(MoveError::RiverRestriction)
        );

        board.add_piece(6, 3, PieceType::Soldier, Color::Black);
        assert_eq!(
            validate_piece_logic(&board, elephant, sq(5, 2), sq(7, 4)),
            Err(MoveError::BlockedPath)
        );
    }

    #[test]
    fn test_horse_leg_blocking() {
        let mut board = bare_board();
        let horse = place(&mut board, 5, 4, PieceType::Horse, Color::Red);
        assert!(is_valid_move(horse, &board, sq(5, 4), sq(3, 5)));

        // Short-axis and diagonal neighbours do not hobble the horse.
        board.add_piece(5, 5, PieceType::Soldier, Color::Black);
        board.add_piece(4, 5, PieceType::Soldier, Color::Black);
        assert!(is_valid_move(horse, &board, sq(5, 4), sq(3, 5)));

        board.add_piece(4, 4, PieceType::Soldier, Color::Black);
        assert!(!is_valid_move(horse, &board, sq(5, 4), sq(3, 5)));

        // Sideways jump: the leg is one column toward the destination.
        assert!(!is_valid_move(horse, &board, sq(5, 4), sq(4, 6)));
        assert!(is_valid_move(horse, &board, sq(5, 4), sq(6, 2)));
        board.add_piece(5, 3, PieceType::Soldier, Color::Black);
        assert!(!is_valid_move(horse, &board, sq(5, 4), sq(6, 2)));
    }

    #[test]
    fn test_chariot_path_blocking() {
        let mut board = bare_board();
        let chariot = place(&mut board, 5, 0, PieceType::Chariot, Color::Red);
        assert!(is_valid_move(chariot, &board, sq(5, 0), sq(5, 8)));
        assert!(is_valid_move(chariot, &board, sq(5, 0), sq(1, 0)));
        assert!(!is_valid_move(chariot, &board, sq(5, 0), sq(4, 1)));

        board.add_piece(5, 4, PieceType::Soldier, Color::Black);
        assert!(!is_valid_move(chariot, &board, sq(5, 0), sq(5, 8)));
        assert!(is_valid_move(chariot, &board, sq(5, 0), sq(5, 4)));
    }

    #[test]
    fn test_cannon_screens() {
        let board = Board::new();
        let cannon = board.get_piece(sq(7, 1)).unwrap();
        // No screen between the two cannons at the start.
        assert!(!is_valid_move(cannon, &board, sq(7, 1), sq(2, 1)));
        // Exactly one screen: the black cannon shields the black horse.
        assert!(is_valid_move(cannon, &board, sq(7, 1), sq(0, 1)));
        // Quiet moves cannot jump.
        assert!(!is_valid_move(cannon, &board, sq(7, 1), sq(1, 1)));

        let mut board = bare_board();
        let cannon = place(&mut board, 5, 0, PieceType::Cannon, Color::Red);
        board.add_piece(5, 2, PieceType::Soldier, Color::Black);
        board.add_piece(5, 4, PieceType::Soldier, Color::Black);
        board.add_piece(5, 6, PieceType::Soldier, Color::Black);
        assert!(!is_valid_move(cannon, &board, sq(5, 0), sq(5, 2)));
        assert!(is_valid_move(cannon, &board, sq(5, 0), sq(5, 4)));
        assert!(!is_valid_move(cannon, &board, sq(5, 0), sq(5, 6)));
    }

    #[test]
    fn test_friendly_target_rejected() {
        let board = Board::new();
        let chariot = board.get_piece(sq(9, 0)).unwrap();
        assert_eq!(
            validate_piece_logic(&board, chariot, sq(9, 0), sq(9, 1)),
            Err(MoveError::TargetOccupiedByFriendly)
        );
    }

    #[test]
    fn test_self_check_is_rejected() {
        let mut board = bare_board();
        // Red chariot pinned on the general's file by a black chariot.
        let chariot = place(&mut board, 6, 3, PieceType::Chariot, Color::Red);
        board.add_piece(2, 3, PieceType::Chariot, Color::Black);

        assert!(is_pseudo_legal(chariot, &board, sq(6, 3), sq(6, 0)));
        assert_eq!(
            check_move(&board, sq(6, 3), sq(6, 0), Color::Red),
            Err(MoveError::SelfCheck)
        );
        assert!(is_valid_move(chariot, &board, sq(6, 3), sq(2, 3)));
    }

    #[test]
    fn test_in_place_safety_check_restores_board() {
        let mut board = bare_board();
        board.add_piece(6, 3, PieceType::Chariot, Color::Red);
        board.add_piece(2, 3, PieceType::Chariot, Color::Black);
        let before = board.clone();

        let cases = [
            (Move::new(sq(6, 3), sq(6, 0)), Err(MoveError::SelfCheck)),
            (Move::new(sq(6, 3), sq(2, 3)), Ok(())),
            (Move::new(sq(9, 3), sq(9, 4)), Ok(())),
        ];
        for (mv, expected) in cases {
            assert_eq!(ensure_general_safe(&before, mv, Color::Red), expected, "{mv}");
            assert_eq!(ensure_general_safe_in_place(&mut board, mv, Color::Red), expected, "{mv}");
            assert_eq!(board, before, "{mv}");
        }
    }

    #[test]
    fn test_flying_general_is_rejected() {
        let mut board = Board::empty();
        board.add_piece(9, 4, PieceType::General, Color::Red);
        board.add_piece(0, 4, PieceType::General, Color::Black);
        let chariot = place(&mut board, 5, 4, PieceType::Chariot, Color::Red);

        assert!(!is_flying_general(&board));
        assert_eq!(
            check_move(&board, sq(5, 4), sq(5, 0), Color::Red),
            Err(MoveError::FlyingGeneral)
        );
        assert!(is_valid_move(chariot, &board, sq(5, 4), sq(1, 4)));

        board.set_piece(sq(5, 4), None);
        assert!(is_flying_general(&board));
        // Facing generals do not count as geometric check.
        assert!(!is_in_check(&board, Color::Red));
    }

    #[test]
    fn test_chariot_check_on_open_file() {
        let mut board = Board::empty();
        board.add_piece(9, 4, PieceType::General, Color::Red);
        board.add_piece(0, 3, PieceType::General, Color::Black);
        board.add_piece(5, 4, PieceType::Chariot, Color::Black);
        assert!(is_in_check(&board, Color::Red));
        assert!(!is_in_check(&board, Color::Black));

        board.add_piece(7, 4, PieceType::Advisor, Color::Red);
        assert!(!is_in_check(&board, Color::Red));
    }

    #[test]
    fn test_missing_general_is_not_check() {
        let mut board = Board::empty();
        board.add_piece(5, 4, PieceType::Chariot, Color::Black);
        assert!(!is_in_check(&board, Color::Red));
    }

    #[test]
    fn test_raw_coordinates_are_rejected_quietly() {
        let board = Board::new();
        let soldier = board.get_piece(sq(6, 0));
        assert!(is_valid_move_at(soldier, &board, (6, 0), (5, 0)));
        assert!(!is_valid_move_at(soldier, &board, (6, 0), (-1, 0)));
        assert!(!is_valid_move_at(soldier, &board, (6, 0), (6, 9)));
        assert!(!is_valid_move_at(None, &board, (6, 0), (5, 0)));
        assert!(!is_valid_move_at(soldier, &board, (6, 0), (6, 0)));
    }

    #[test]
    fn test_piece_must_match_board() {
        let board = Board::new();
        let black_soldier = Piece::new(PieceType::Soldier, Color::Black);
        assert!(!is_valid_move(black_soldier, &board, sq(6, 0), sq(5, 0)));
    }

    #[test]
    fn test_initial_position_is_ongoing() {
        assert_eq!(check_game_end(&Board::new(), Color::Red), GameEnd::ONGOING);
        assert_eq!(check_game_end(&Board::new(), Color::Black), GameEnd::ONGOING);
    }
}
