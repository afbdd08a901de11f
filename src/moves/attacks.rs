//! The attack oracle: "could `by_color` capture on `sq`?" Ray-walks the
//! mailbox array for sliding pieces; probes fixed offset tables for
//! pawns/knights/kings.

use crate::board::Position;
use crate::piece::{Color, PieceType};
use crate::square::Square;

const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2),
];

const KING_OFFSETS: [(i32, i32); 8] = [
    (1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (-1, -1), (0, -1), (1, -1),
];

const BISHOP_DIRS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ROOK_DIRS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

#[inline]
fn offset(sq: Square, df: i32, dr: i32) -> Option<Square> {
    let file = sq.file() as i32 + df;
    let rank = sq.rank() as i32 + dr;
    if (0..8).contains(&file) && (0..8).contains(&rank) {
        Some(Square::new(rank as u8, file as u8))
    } else {
        None
    }
}

/// Direction an enemy pawn would need to stand in to capture onto `sq`:
/// for a white attacker, the attacking pawn sits one rank *below* `sq`.
#[inline]
fn pawn_attacker_offsets(by_color: Color) -> [(i32, i32); 2] {
    match by_color {
        Color::White => [(-1, -1), (1, -1)],
        Color::Black => [(-1, 1), (1, 1)],
    }
}

pub fn is_square_attacked(pos: &Position, sq: Square, by_color: Color) -> bool {
    for (df, dr) in pawn_attacker_offsets(by_color) {
        if let Some(from) = offset(sq, df, dr) {
            if let Some(p) = pos.piece_at(from) {
                if p.color == by_color && p.kind == PieceType::Pawn {
                    return true;
                }
            }
        }
    }

    for &(df, dr) in &KNIGHT_OFFSETS {
        if let Some(from) = offset(sq, df, dr) {
            if let Some(p) = pos.piece_at(from) {
                if p.color == by_color && p.kind == PieceType::Knight {
                    return true;
                }
            }
        }
    }

    for &(df, dr) in &KING_OFFSETS {
        if let Some(from) = offset(sq, df, dr) {
            if let Some(p) = pos.piece_at(from) {
                if p.color == by_color && p.kind == PieceType::King {
                    return true;
                }
            }
        }
    }

    for &(df, dr) in &BISHOP_DIRS {
        let mut cur = sq;
        while let Some(next) = offset(cur, df, dr) {
            cur = next;
            if let Some(p) = pos.piece_at(cur) {
                if p.color == by_color
                    && (p.kind == PieceType::Bishop || p.kind == PieceType::Queen)
                {
                    return true;
                }
                break;
            }
        }
    }

    for &(df, dr) in &ROOK_DIRS {
        let mut cur = sq;
        while let Some(next) = offset(cur, df, dr) {
            cur = next;
            if let Some(p) = pos.piece_at(cur) {
                if p.color == by_color
                    && (p.kind == PieceType::Rook || p.kind == PieceType::Queen)
                {
                    return true;
                }
                break;
            }
        }
    }

    false
}

#[inline]
pub fn in_check(pos: &Position, color: Color) -> bool {
    is_square_attacked(pos, pos.king_square(color), color.opposite())
}

/// Every square that `color`'s king would pass through or land on while
/// castling, used by generation-time legality checks.
pub fn castle_path_squares(color: Color, kingside: bool) -> (Square, Square, Square) {
    match (color, kingside) {
        (Color::White, true) => (Square::E1, Square::F1, Square::G1),
        (Color::White, false) => (Square::E1, Square::D1, Square::C1),
        (Color::Black, true) => (Square::E8, Square::F8, Square::G8),
        (Color::Black, false) => (Square::E8, Square::D8, Square::C8),
    }
}
