use crate::logic::board::{Color, PieceType, BOARD_ROWS};

// Piece Values
pub const VAL_GENERAL: i32 = 10000;
pub const VAL_CHARIOT: i32 = 900;
pub const VAL_CANNON: i32 = 450;
pub const VAL_HORSE: i32 = 400;
pub const VAL_ADVISOR: i32 = 200;
pub const VAL_ELEPHANT: i32 = 200;
pub const VAL_SOLDIER: i32 = 100;

pub const CHECK_BONUS: i32 = 50;
pub const MATE_SCORE: i32 = 9999;

// Piece-square tables, written from Red's seat: row 0 is Black's back rank,
// row 9 is Red's. Black reads them mirrored.

#[rustfmt::skip]
pub const PST_SOLDIER: [[i32; 9]; 10] = [
    [ 60,  70,  80,  90, 100,  90,  80,  70,  60], // Enemy back rank
    [ 90, 100, 110, 120, 130, 120, 110, 100,  90],
    [ 90, 100, 110, 120, 130, 120, 110, 100,  90],
    [ 90, 100, 110, 120, 130, 120, 110, 100,  90],
    [ 80,  90, 100, 110, 120, 110, 100,  90,  80], // Across the river
    [ 70,  80,  90, 100, 110, 100,  90,  80,  70], // River bank
    [ 30,  40,  50,  60,  70,  60,  50,  40,  30], // Starting row
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
];

#[rustfmt::skip]
pub const PST_HORSE: [[i32; 9]; 10] = [
    [ 50,  60,  70,  80,  80,  80,  70,  60,  50],
    [ 60,  70,  80,  90,  90,  90,  80,  70,  60],
    [ 70,  80,  90, 100, 100, 100,  90,  80,  70],
    [ 80,  90, 100, 110, 110, 110, 100,  90,  80],
    [ 90, 100, 110, 120, 120, 120, 110, 100,  90],
    [ 90, 100, 110, 120, 120, 120, 110, 100,  90],
    [ 90, 100, 110, 120, 120, 120, 110, 100,  90],
    [ 80,  90, 100, 110, 110, 110, 100,  90,  80],
    [ 70,  80,  90, 100, 100, 100,  90,  80,  70],
    [ 60,  70,  80,  90,  90,  90,  80,  70,  60],
];

/// Positional bonus for a piece of `color` on (`row`, `col`). Only Horses
/// and Soldiers carry one; off-board input scores 0.
pub fn get_pst_value(piece_type: PieceType, color: Color, row: usize, col: usize) -> i32 {
    let table = match piece_type {
        PieceType::Soldier => &PST_SOLDIER,
        PieceType::Horse => &PST_HORSE,
        _ => return 0,
    };

    let table_row = match color {
        Color::Red => Some(row),
        Color::Black => (BOARD_ROWS - 1).checked_sub(row),
    };

    table_row
        .and_then(|r| table.get(r))
        .and_then(|cells| cells.get(col))
        .copied()
        .unwrap_or(0)
}
