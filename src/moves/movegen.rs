//! Pseudo-legal and legal move generation, plus the capture-only generator
//! used by quiescence search.

use super::attacks::{castle_path_squares, in_check, is_square_attacked};
use super::execute::{make_move, unmake_move};
use super::types::{
    CAPTURE, DOUBLE_PAWN_PUSH, EN_PASSANT, KINGSIDE_CASTLE, Move, MoveBuffer, PROMOTION,
    PROMOTION_CAPTURE, QUEENSIDE_CASTLE, QUIET_MOVE,
};
use crate::board::{CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ, Position};
use crate::piece::{Color, PieceType};
use crate::square::Square;

const PROMOTION_PIECES: [PieceType; 4] =
    [PieceType::Queen, PieceType::Rook, PieceType::Bishop, PieceType::Knight];

const BISHOP_DIRS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ROOK_DIRS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2),
];
const KING_OFFSETS: [(i32, i32); 8] = [
    (1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (-1, -1), (0, -1), (1, -1),
];

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

fn generate_pawn_moves(pos: &Position, color: Color, buf: &mut impl MoveBuffer) {
    let (push_dir, start_rank, promo_rank): (i32, u8, u8) = match color {
        Color::White => (1, 1, 7),
        Color::Black => (-1, 6, 0),
    };

    for sq in Square::all() {
        let Some(p) = pos.piece_at(sq) else { continue };
        if p.color != color || p.kind != PieceType::Pawn {
            continue;
        }

        // Single push.
        if let Some(one) = offset(sq, 0, push_dir) {
            if pos.piece_at(one).is_none() {
                if one.rank() == promo_rank {
                    for &promo in &PROMOTION_PIECES {
                        buf.push(Move {
                            from: sq,
                            to: one,
                            piece: PieceType::Pawn,
                            promotion: Some(promo),
                            flags: PROMOTION,
                        });
                    }
                } else {
                    buf.push(Move {
                        from: sq,
                        to: one,
                        piece: PieceType::Pawn,
                        promotion: None,
                        flags: QUIET_MOVE,
                    });
                    // Double push, only from the home rank and only if both
                    // squares are empty.
                    if sq.rank() == start_rank {
                        if let Some(two) = offset(sq, 0, push_dir * 2) {
                            if pos.piece_at(two).is_none() {
                                buf.push(Move {
                                    from: sq,
                                    to: two,
                                    piece: PieceType::Pawn,
                                    promotion: None,
                                    flags: DOUBLE_PAWN_PUSH,
                                });
                            }
                        }
                    }
                }
            }
        }

        // Diagonal captures (and en passant).
        for df in [-1i32, 1] {
            let Some(to) = offset(sq, df, push_dir) else { continue };
            if Some(to) == pos.en_passant() {
                buf.push(Move {
                    from: sq,
                    to,
                    piece: PieceType::Pawn,
                    promotion: None,
                    flags: EN_PASSANT,
                });
                continue;
            }
            if let Some(target) = pos.piece_at(to) {
                if target.color != color {
                    if to.rank() == promo_rank {
                        for &promo in &PROMOTION_PIECES {
                            buf.push(Move {
                                from: sq,
                                to,
                                piece: PieceType::Pawn,
                                promotion: Some(promo),
                                flags: PROMOTION_CAPTURE,
                            });
                        }
                    } else {
                        buf.push(Move {
                            from: sq,
                            to,
                            piece: PieceType::Pawn,
                            promotion: None,
                            flags: CAPTURE,
                        });
                    }
                }
            }
        }
    }
}

fn generate_offset_moves(
    pos: &Position,
    color: Color,
    kind: PieceType,
    offsets: &[(i32, i32)],
    buf: &mut impl MoveBuffer,
) {
    for sq in Square::all() {
        let Some(p) = pos.piece_at(sq) else { continue };
        if p.color != color || p.kind != kind {
            continue;
        }
        for &(df, dr) in offsets {
            let Some(to) = offset(sq, df, dr) else { continue };
            match pos.piece_at(to) {
                None => buf.push(Move { from: sq, to, piece: kind, promotion: None, flags: QUIET_MOVE }),
                Some(target) if target.color != color => {
                    buf.push(Move { from: sq, to, piece: kind, promotion: None, flags: CAPTURE })
                }
                _ => {}
            }
        }
    }
}

fn generate_sliding_moves(
    pos: &Position,
    color: Color,
    kind: PieceType,
    dirs: &[(i32, i32)],
    buf: &mut impl MoveBuffer,
) {
    for sq in Square::all() {
        let Some(p) = pos.piece_at(sq) else { continue };
        if p.color != color || p.kind != kind {
            continue;
        }
        for &(df, dr) in dirs {
            let mut cur = sq;
            while let Some(to) = offset(cur, df, dr) {
                cur = to;
                match pos.piece_at(to) {
                    None => {
                        buf.push(Move { from: sq, to, piece: kind, promotion: None, flags: QUIET_MOVE });
                    }
                    Some(target) => {
                        if target.color != color {
                            buf.push(Move { from: sq, to, piece: kind, promotion: None, flags: CAPTURE });
                        }
                        break;
                    }
                }
            }
        }
    }
}

fn generate_castling_moves(pos: &Position, color: Color, buf: &mut impl MoveBuffer) {
    let king_sq = pos.king_square(color);
    if in_check(pos, color) {
        return;
    }
    let enemy = color.opposite();

    let (kingside_right, queenside_right) = match color {
        Color::White => (CASTLE_WK, CASTLE_WQ),
        Color::Black => (CASTLE_BK, CASTLE_BQ),
    };

    if pos.has_right(kingside_right) {
        let (start, middle, end) = castle_path_squares(color, true);
        if pos.piece_at(middle).is_none()
            && pos.piece_at(end).is_none()
            && !is_square_attacked(pos, start, enemy)
            && !is_square_attacked(pos, middle, enemy)
            && !is_square_attacked(pos, end, enemy)
        {
            buf.push(Move {
                from: king_sq,
                to: end,
                piece: PieceType::King,
                promotion: None,
                flags: KINGSIDE_CASTLE,
            });
        }
    }

    if pos.has_right(queenside_right) {
        let (start, middle, end) = castle_path_squares(color, false);
        // The b-file square must be empty too, though it need not be safe.
        let b_file = offset(end, -1, 0).expect("queenside end square has a file to its left");
        if pos.piece_at(middle).is_none()
            && pos.piece_at(end).is_none()
            && pos.piece_at(b_file).is_none()
            && !is_square_attacked(pos, start, enemy)
            && !is_square_attacked(pos, middle, enemy)
            && !is_square_attacked(pos, end, enemy)
        {
            buf.push(Move {
                from: king_sq,
                to: end,
                piece: PieceType::King,
                promotion: None,
                flags: QUEENSIDE_CASTLE,
            });
        }
    }
}

/// All pseudo-legal moves for the side to move. Castling moves are already
/// filtered for check/attacked-path at generation time, per the spec.
pub fn generate_pseudo_legal(pos: &Position, buf: &mut impl MoveBuffer) {
    buf.clear();
    let color = pos.side_to_move();
    generate_pawn_moves(pos, color, buf);
    generate_offset_moves(pos, color, PieceType::Knight, &KNIGHT_OFFSETS, buf);
    generate_offset_moves(pos, color, PieceType::King, &KING_OFFSETS, buf);
    generate_sliding_moves(pos, color, PieceType::Bishop, &BISHOP_DIRS, buf);
    generate_sliding_moves(pos, color, PieceType::Rook, &ROOK_DIRS, buf);
    generate_sliding_moves(pos, color, PieceType::Queen, &BISHOP_DIRS, buf);
    generate_sliding_moves(pos, color, PieceType::Queen, &ROOK_DIRS, buf);
    generate_castling_moves(pos, color, buf);
}

/// Pseudo-legal moves filtered to those that leave the mover's own king safe.
pub fn generate_legal(pos: &mut Position, out: &mut impl MoveBuffer, scratch: &mut impl MoveBuffer) {
    out.clear();
    generate_pseudo_legal(pos, scratch);
    let color = pos.side_to_move();
    for i in 0..scratch.len() {
        let mv = scratch[i];
        let undo = make_move(pos, mv);
        if !in_check(pos, color) {
            out.push(mv);
        }
        unmake_move(pos, undo);
    }
}

/// Legal captures and promotions only, for quiescence search.
pub fn generate_captures(pos: &mut Position, out: &mut impl MoveBuffer, scratch: &mut impl MoveBuffer) {
    out.clear();
    generate_pseudo_legal(pos, scratch);
    let color = pos.side_to_move();
    for i in 0..scratch.len() {
        let mv = scratch[i];
        if !mv.is_capture() && !mv.is_promotion() {
            continue;
        }
        let undo = make_move(pos, mv);
        if !in_check(pos, color) {
            out.push(mv);
        }
        unmake_move(pos, undo);
    }
}

/// True iff `mv` appears in the legal move set for `pos`.
pub fn is_legal(pos: &mut Position, mv: Move) -> bool {
    let mut legal = Vec::with_capacity(64);
    let mut scratch = Vec::with_capacity(64);
    generate_legal(pos, &mut legal, &mut scratch);
    legal.contains(&mv)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_has_twenty_legal_moves() {
        let mut pos = Position::new();
        let mut legal = Vec::new();
        let mut scratch = Vec::new();
        generate_legal(&mut pos, &mut legal, &mut scratch);
        assert_eq!(legal.len(), 20);
    }

    #[test]
    fn pinned_piece_cannot_expose_king() {
        // White king e1, white rook e2 pinned by a black rook on e8.
        let mut pos = Position::from_fen("4r2k/8/8/8/8/8/4R3/4K3 w - - 0 1").unwrap();
        let mut legal = Vec::new();
        let mut scratch = Vec::new();
        generate_legal(&mut pos, &mut legal, &mut scratch);
        assert!(legal.iter().all(|m| !(m.from == Square::E2 && m.to.file() != 4)));
    }

    #[test]
    fn castling_blocked_by_attacked_path() {
        let mut pos =
            Position::from_fen("4r2k/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let mut legal = Vec::new();
        let mut scratch = Vec::new();
        generate_legal(&mut pos, &mut legal, &mut scratch);
        assert!(!legal.iter().any(|m| m.is_kingside_castle()));
    }

    #[test]
    fn en_passant_available_after_double_push() {
        let mut pos =
            Position::from_fen("rnbqkbnr/1ppp1ppp/p7/3Pp3/8/8/PPP1PPPP/RNBQKBNR w KQkq e6 0 3")
                .unwrap();
        let mut legal = Vec::new();
        let mut scratch = Vec::new();
        generate_legal(&mut pos, &mut legal, &mut scratch);
        assert!(legal.iter().any(|m| m.is_en_passant() && m.to == Square::E6));
    }
}
