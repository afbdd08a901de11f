//! `make`/`unmake`: the only way a `Position` is ever mutated.
//!
//! Each `make_move` call pushes a delta [`Undo`] record before mutating
//! anything and maintains the Zobrist key incrementally; `unmake_move` pops
//! the record and restores the position verbatim, including the exact prior
//! key (cheaper than re-deriving the XOR inverse, and just as correct).

use super::types::{NullMoveUndo, Undo};
use crate::board::{CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ, Position};
use crate::hash::zobrist::{ep_file_to_hash, piece_key, zobrist_keys};
use crate::moves::types::Move;
use crate::piece::{Color, Piece, PieceType};
use crate::square::Square;

#[inline]
fn corner_right(sq: Square) -> Option<u8> {
    match sq.index() {
        0 => Some(CASTLE_WQ),
        7 => Some(CASTLE_WK),
        56 => Some(CASTLE_BQ),
        63 => Some(CASTLE_BK),
        _ => None,
    }
}

fn rights_after_move(prev: u8, from: Square, to: Square, moved: Piece) -> u8 {
    let mut rights = prev;
    if moved.kind == PieceType::King {
        rights &= match moved.color {
            Color::White => !(CASTLE_WK | CASTLE_WQ),
            Color::Black => !(CASTLE_BK | CASTLE_BQ),
        };
    }
    if let Some(r) = corner_right(from) {
        rights &= !r;
    }
    if let Some(r) = corner_right(to) {
        rights &= !r;
    }
    rights
}

fn rook_castle_squares(color: Color, kingside: bool) -> (Square, Square) {
    match (color, kingside) {
        (Color::White, true) => (Square::H1, Square::F1),
        (Color::White, false) => (Square::A1, Square::D1),
        (Color::Black, true) => (Square::H8, Square::F8),
        (Color::Black, false) => (Square::A8, Square::D8),
    }
}

pub fn make_move(pos: &mut Position, mv: Move) -> Undo {
    let moved_color = pos.side_to_move();
    let piece = pos
        .piece_at(mv.from)
        .expect("make_move called with no piece on the from-square");
    debug_assert_eq!(piece.color, moved_color);

    let captured_square = if mv.is_en_passant() {
        Square::new(mv.from.rank(), mv.to.file())
    } else {
        mv.to
    };
    let captured = pos.piece_at(captured_square);

    let prev_zobrist = pos.zobrist;
    let prev_castling_rights = pos.castling_rights;
    let prev_en_passant = pos.en_passant;
    let prev_halfmove_clock = pos.halfmove_clock;
    let prev_fullmove_number = pos.fullmove_number;
    let prev_history_len = pos.history.len();
    pos.history.push(prev_zobrist);

    let keys = zobrist_keys();
    let ep_before = ep_file_to_hash(pos);

    if let Some(cap) = captured {
        pos.set_square(captured_square, None);
        pos.zobrist ^= piece_key(cap, captured_square);
    }

    pos.set_square(mv.from, None);
    pos.zobrist ^= piece_key(piece, mv.from);
    let placed = match mv.promotion {
        Some(promo) => Piece::new(moved_color, promo),
        None => piece,
    };
    pos.set_square(mv.to, Some(placed));
    pos.zobrist ^= piece_key(placed, mv.to);

    let mut castling_rook = None;
    if mv.is_castling() {
        let (rook_from, rook_to) = rook_castle_squares(moved_color, mv.is_kingside_castle());
        let rook = pos
            .piece_at(rook_from)
            .expect("castling rook missing from its home square");
        pos.set_square(rook_from, None);
        pos.zobrist ^= piece_key(rook, rook_from);
        pos.set_square(rook_to, Some(rook));
        pos.zobrist ^= piece_key(rook, rook_to);
        castling_rook = Some((rook_from, rook_to));
    }

    if piece.kind == PieceType::King {
        pos.king_square[moved_color as usize] = mv.to;
    }

    let new_rights = rights_after_move(prev_castling_rights, mv.from, mv.to, piece);
    crate::hash::zobrist::xor_castling_delta(&mut pos.zobrist, keys, prev_castling_rights, new_rights);
    pos.castling_rights = new_rights;

    let new_ep = if mv.is_double_pawn_push() {
        let mid_rank = (mv.from.rank() + mv.to.rank()) / 2;
        Some(Square::new(mid_rank, mv.from.file()))
    } else {
        None
    };
    pos.en_passant = new_ep;
    pos.side_to_move = moved_color.opposite();
    let ep_after = ep_file_to_hash(pos);

    if let Some(f) = ep_before {
        pos.zobrist ^= keys.ep_file[f as usize];
    }
    if let Some(f) = ep_after {
        pos.zobrist ^= keys.ep_file[f as usize];
    }
    pos.zobrist ^= keys.side_to_move;

    pos.halfmove_clock = if piece.kind == PieceType::Pawn || captured.is_some() {
        0
    } else {
        prev_halfmove_clock + 1
    };
    if moved_color == Color::Black {
        pos.fullmove_number = prev_fullmove_number + 1;
    }

    #[cfg(debug_assertions)]
    pos.assert_invariants();

    Undo {
        mv,
        moved_color,
        captured,
        captured_square,
        castling_rook,
        prev_castling_rights,
        prev_en_passant,
        prev_halfmove_clock,
        prev_fullmove_number,
        prev_zobrist,
        prev_history_len,
    }
}

pub fn unmake_move(pos: &mut Position, undo: Undo) {
    let moved = Piece::new(undo.moved_color, undo.mv.piece);
    pos.set_square(undo.mv.from, Some(moved));
    pos.set_square(undo.mv.to, None);

    if let Some((rook_from, rook_to)) = undo.castling_rook {
        let rook = Piece::new(undo.moved_color, PieceType::Rook);
        pos.set_square(rook_to, None);
        pos.set_square(rook_from, Some(rook));
    }

    if let Some(cap) = undo.captured {
        pos.set_square(undo.captured_square, Some(cap));
    }

    if undo.mv.piece == PieceType::King {
        pos.king_square[undo.moved_color as usize] = undo.mv.from;
    }

    pos.side_to_move = undo.moved_color;
    pos.castling_rights = undo.prev_castling_rights;
    pos.en_passant = undo.prev_en_passant;
    pos.halfmove_clock = undo.prev_halfmove_clock;
    pos.fullmove_number = undo.prev_fullmove_number;
    pos.zobrist = undo.prev_zobrist;
    pos.history.truncate(undo.prev_history_len);

    #[cfg(debug_assertions)]
    pos.assert_invariants();
}

pub fn make_null_move(pos: &mut Position) -> NullMoveUndo {
    let keys = zobrist_keys();
    let prev_en_passant = pos.en_passant;
    let prev_halfmove_clock = pos.halfmove_clock;
    let prev_zobrist = pos.zobrist;
    let ep_before = ep_file_to_hash(pos);

    pos.en_passant = None;
    pos.side_to_move = pos.side_to_move().opposite();
    pos.halfmove_clock += 1;
    pos.zobrist ^= keys.side_to_move;
    if let Some(f) = ep_before {
        pos.zobrist ^= keys.ep_file[f as usize];
    }

    NullMoveUndo { prev_en_passant, prev_halfmove_clock, prev_zobrist }
}

pub fn unmake_null_move(pos: &mut Position, undo: NullMoveUndo) {
    pos.side_to_move = pos.side_to_move().opposite();
    pos.en_passant = undo.prev_en_passant;
    pos.halfmove_clock = undo.prev_halfmove_clock;
    pos.zobrist = undo.prev_zobrist;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::types::{DOUBLE_PAWN_PUSH, QUIET_MOVE};

    #[test]
    fn make_unmake_round_trip_quiet_move() {
        let mut pos = Position::new();
        let before = pos.clone();
        let mv = Move {
            from: Square::E2,
            to: Square::E4,
            piece: PieceType::Pawn,
            promotion: None,
            flags: DOUBLE_PAWN_PUSH,
        };
        let undo = make_move(&mut pos, mv);
        assert_ne!(pos, before);
        unmake_move(&mut pos, undo);
        assert_eq!(pos, before);
    }

    #[test]
    fn castling_relocates_rook() {
        let mut pos = Position::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        let before = pos.clone();
        let mv = Move {
            from: Square::E1,
            to: Square::G1,
            piece: PieceType::King,
            promotion: None,
            flags: crate::moves::types::KINGSIDE_CASTLE,
        };
        let undo = make_move(&mut pos, mv);
        assert_eq!(pos.piece_at(Square::F1).unwrap().kind, PieceType::Rook);
        assert!(pos.piece_at(Square::H1).is_none());
        unmake_move(&mut pos, undo);
        assert_eq!(pos, before);
    }

    #[test]
    fn rook_capture_on_corner_clears_rights() {
        let mut pos =
            Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let mv = Move {
            from: Square::A1,
            to: Square::A8,
            piece: PieceType::Rook,
            promotion: None,
            flags: crate::moves::types::CAPTURE,
        };
        let undo = make_move(&mut pos, mv);
        assert!(!pos.has_right(CASTLE_BQ));
        assert!(!pos.has_right(CASTLE_WQ));
        unmake_move(&mut pos, undo);
        assert!(pos.has_right(CASTLE_BQ));
        assert!(pos.has_right(CASTLE_WQ));
    }

    #[test]
    fn null_move_round_trip() {
        let mut pos = Position::new();
        let before = pos.clone();
        let undo = make_null_move(&mut pos);
        assert_eq!(pos.side_to_move(), Color::Black);
        unmake_null_move(&mut pos, undo);
        assert_eq!(pos, before);
    }

    #[test]
    fn en_passant_capture_removes_pawn() {
        let mut pos =
            Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();
        assert_eq!(pos.en_passant(), Some(Square::D6));
        let mv = Move {
            from: Square::E5,
            to: Square::D6,
            piece: PieceType::Pawn,
            promotion: None,
            flags: crate::moves::types::EN_PASSANT,
        };
        let undo = make_move(&mut pos, mv);
        assert!(pos.piece_at(Square::D5).is_none());
        unmake_move(&mut pos, undo);
        assert!(pos.piece_at(Square::D5).is_some());
    }

    #[test]
    fn halfmove_clock_resets_on_pawn_move() {
        let mut pos = Position::new();
        pos.halfmove_clock = 10;
        let mv = Move {
            from: Square::E2,
            to: Square::E3,
            piece: PieceType::Pawn,
            promotion: None,
            flags: QUIET_MOVE,
        };
        make_move(&mut pos, mv);
        assert_eq!(pos.halfmove_clock(), 0);
    }
}
