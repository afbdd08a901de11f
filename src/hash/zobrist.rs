//! Deterministic Zobrist key tables.
//!
//! The spec calls for a fixed, deterministic seed unconditionally (not an
//! opt-in feature as in the teacher repo) so that two processes hash the same
//! position identically — useful for reproducible tests and TT replay.

use crate::board::{Color, Position};
use crate::piece::PieceType;
use once_cell::sync::OnceCell;
use rand::{RngCore, SeedableRng, rngs::StdRng};

const ZOBRIST_SEED: u64 = 0x9E37_79B9_AAAC_5C87;

pub struct ZobristKeys {
    /// `piece[color][piece_type][square]`.
    pub piece: [[[u64; 64]; 6]; 2],
    pub side_to_move: u64,
    /// Bit order matches `castle_bits`: [0]=WK, [1]=WQ, [2]=BK, [3]=BQ.
    pub castling: [u64; 4],
    /// a..h => 0..7.
    pub ep_file: [u64; 8],
}

fn non_zero(rng: &mut StdRng) -> u64 {
    loop {
        let v = rng.next_u64();
        if v != 0 {
            return v;
        }
    }
}

fn generate_keys() -> ZobristKeys {
    let mut rng = StdRng::seed_from_u64(ZOBRIST_SEED);
    let mut keys = ZobristKeys {
        piece: [[[0u64; 64]; 6]; 2],
        side_to_move: 0,
        castling: [0u64; 4],
        ep_file: [0u64; 8],
    };
    for c in 0..2 {
        for p in 0..6 {
            for sq in 0..64 {
                keys.piece[c][p][sq] = non_zero(&mut rng);
            }
        }
    }
    for i in 0..4 {
        keys.castling[i] = non_zero(&mut rng);
    }
    for f in 0..8 {
        keys.ep_file[f] = non_zero(&mut rng);
    }
    keys.side_to_move = non_zero(&mut rng);
    keys
}

pub fn zobrist_keys() -> &'static ZobristKeys {
    static KEYS: OnceCell<ZobristKeys> = OnceCell::new();
    KEYS.get_or_init(generate_keys)
}

#[inline]
pub fn xor_castling_delta(hash: &mut u64, keys: &ZobristKeys, old: u8, new: u8) {
    use crate::board::{CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ};
    let changed = old ^ new;
    if changed & CASTLE_WK != 0 {
        *hash ^= keys.castling[0];
    }
    if changed & CASTLE_WQ != 0 {
        *hash ^= keys.castling[1];
    }
    if changed & CASTLE_BK != 0 {
        *hash ^= keys.castling[2];
    }
    if changed & CASTLE_BQ != 0 {
        *hash ^= keys.castling[3];
    }
}

#[inline(always)]
pub fn piece_key(piece: crate::piece::Piece, sq: crate::square::Square) -> u64 {
    zobrist_keys().piece[piece.color as usize][piece.kind as usize][sq.index() as usize]
}

/// Returns `Some(file)` only if the side to move actually has a pawn that
/// could capture onto the en-passant square (pseudo-legal only, ignoring
/// pins) — matching the teacher's "relaxed rule" for when EP contributes to
/// the hash.
pub fn ep_file_to_hash(pos: &Position) -> Option<u8> {
    let ep = pos.en_passant()?;
    let rank = ep.rank();
    if rank != 2 && rank != 5 {
        return None;
    }
    let file = ep.file() as i32;
    let capture_rank: i32 = match pos.side_to_move() {
        Color::White => rank as i32 - 1,
        Color::Black => rank as i32 + 1,
    };
    for df in [-1i32, 1] {
        let f = file + df;
        if !(0..8).contains(&f) {
            continue;
        }
        let sq = crate::square::Square::new(capture_rank as u8, f as u8);
        if let Some(p) = pos.piece_at(sq) {
            if p.color == pos.side_to_move() && p.kind == PieceType::Pawn {
                return Some(ep.file());
            }
        }
    }
    None
}
