//! Tapered static evaluation: six named terms (material, piece-square,
//! king safety, pawn structure, mobility, extras), each weighted
//! differently in the middlegame and endgame and blended by a
//! material-derived phase.

use crate::board::Position;
use crate::piece::{Color, PieceType};
use crate::search::pesto;
use crate::square::Square;

const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2),
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

const TOTAL_PHASE: i32 = 24;

fn phase_weight(kind: PieceType) -> i32 {
    match kind {
        PieceType::Knight | PieceType::Bishop => 1,
        PieceType::Rook => 2,
        PieceType::Queen => 4,
        PieceType::Pawn | PieceType::King => 0,
    }
}

fn game_phase(pos: &Position) -> i32 {
    Square::all()
        .filter_map(|sq| pos.piece_at(sq))
        .map(|p| phase_weight(p.kind))
        .sum::<i32>()
        .min(TOTAL_PHASE)
}

/// Per the spec's simplified rule for king piece-square selection: a
/// position counts as an endgame if at most 12 non-king pieces remain, or
/// if neither side has a queen.
fn is_endgame(pos: &Position) -> bool {
    let mut non_king = 0;
    let mut queens = 0;
    for sq in Square::all() {
        if let Some(p) = pos.piece_at(sq) {
            if p.kind != PieceType::King {
                non_king += 1;
            }
            if p.kind == PieceType::Queen {
                queens += 1;
            }
        }
    }
    non_king <= 12 || queens == 0
}

fn non_king_table(kind: PieceType) -> (&'static pesto::Table, &'static pesto::Table) {
    match kind {
        PieceType::Pawn => (&pesto::PAWN_MG, &pesto::PAWN_EG),
        PieceType::Knight => (&pesto::KNIGHT_MG, &pesto::KNIGHT_EG),
        PieceType::Bishop => (&pesto::BISHOP_MG, &pesto::BISHOP_EG),
        PieceType::Rook => (&pesto::ROOK_MG, &pesto::ROOK_EG),
        PieceType::Queen => (&pesto::QUEEN_MG, &pesto::QUEEN_EG),
        PieceType::King => unreachable!("king uses non_king_table's dedicated selector"),
    }
}

/// Table lookup for a piece of `color` on `sq`. Tables are published a8-first
/// (Black's side); White reads them through [`Square::mirror`].
fn table_value(table: &pesto::Table, color: Color, sq: Square) -> i32 {
    match color {
        Color::White => table[sq.mirror().index() as usize],
        Color::Black => table[sq.index() as usize],
    }
}

/// Sum of material values, signed from White's perspective. Equal for both
/// phases; the mg/eg split happens via the per-term weight table instead.
fn material(pos: &Position) -> i32 {
    Square::all()
        .filter_map(|sq| pos.piece_at(sq))
        .map(|p| {
            let v = p.kind.value();
            if p.color == Color::White { v } else { -v }
        })
        .sum()
}

/// `(mg, eg)` piece-square total, signed from White's perspective. The king
/// term picks its single table outright via [`is_endgame`] rather than
/// tapering continuously, per the spec's simplified rule.
fn piece_square(pos: &Position, endgame: bool) -> (i32, i32) {
    let mut mg = 0;
    let mut eg = 0;
    for sq in Square::all() {
        let Some(p) = pos.piece_at(sq) else { continue };
        let sign = if p.color == Color::White { 1 } else { -1 };
        if p.kind == PieceType::King {
            let table = if endgame { &pesto::KING_EG } else { &pesto::KING_MG };
            let v = sign * table_value(table, p.color, sq);
            mg += v;
            eg += v;
            continue;
        }
        let (mg_table, eg_table) = non_king_table(p.kind);
        mg += sign * table_value(mg_table, p.color, sq);
        eg += sign * table_value(eg_table, p.color, sq);
    }
    (mg, eg)
}

const KING_ATTACKED_PENALTY: i32 = 50;
const KING_SHIELD_BONUS: i32 = 10;

/// Penalty if the king square is attacked, bonus per friendly pawn on the
/// three squares one rank in front of the king. Applied at full weight in
/// the middlegame and zero in the endgame by the caller.
fn king_safety(pos: &Position) -> i32 {
    let mut score = 0;
    for &color in &[Color::White, Color::Black] {
        let sign = if color == Color::White { 1 } else { -1 };
        let king_sq = pos.king_square(color);
        if crate::moves::attacks::is_square_attacked(pos, king_sq, color.opposite()) {
            score -= sign * KING_ATTACKED_PENALTY;
        }
        let shield_rank = match color {
            Color::White => king_sq.rank() as i32 + 1,
            Color::Black => king_sq.rank() as i32 - 1,
        };
        if (0..8).contains(&shield_rank) {
            for f in (king_sq.file() as i32 - 1)..=(king_sq.file() as i32 + 1) {
                if !(0..8).contains(&f) {
                    continue;
                }
                let shield_sq = Square::new(shield_rank as u8, f as u8);
                if let Some(p) = pos.piece_at(shield_sq) {
                    if p.color == color && p.kind == PieceType::Pawn {
                        score += sign * KING_SHIELD_BONUS;
                    }
                }
            }
        }
    }
    score
}

fn pawn_file_counts(pos: &Position, color: Color) -> [u8; 8] {
    let mut counts = [0u8; 8];
    for sq in Square::all() {
        if let Some(p) = pos.piece_at(sq) {
            if p.color == color && p.kind == PieceType::Pawn {
                counts[sq.file() as usize] += 1;
            }
        }
    }
    counts
}

const DOUBLED_PAWN_PENALTY: i32 = 10;
const ISOLATED_PAWN_PENALTY: i32 = 15;

/// 10cp per extra pawn on a file (doubled), 15cp per pawn with no friendly
/// pawn on an adjacent file (isolated).
fn pawn_structure(pos: &Position) -> i32 {
    let mut score = 0;
    for &(color, sign) in &[(Color::White, 1), (Color::Black, -1)] {
        let files = pawn_file_counts(pos, color);
        for file in 0..8u8 {
            let count = files[file as usize];
            if count == 0 {
                continue;
            }
            if count > 1 {
                score -= sign * DOUBLED_PAWN_PENALTY * (count as i32 - 1);
            }
            let left = file.checked_sub(1).map(|f| files[f as usize]).unwrap_or(0);
            let right = files.get(file as usize + 1).copied().unwrap_or(0);
            if left == 0 && right == 0 {
                score -= sign * ISOLATED_PAWN_PENALTY * count as i32;
            }
        }
    }
    score
}

fn slider_mobility(pos: &Position, sq: Square, color: Color, dirs: &[(i32, i32)]) -> i32 {
    let mut count = 0;
    for &(df, dr) in dirs {
        let mut cur = sq;
        while let Some(next) = offset(cur, df, dr) {
            cur = next;
            match pos.piece_at(cur) {
                Some(p) if p.color == color => break,
                Some(_) => {
                    count += 1;
                    break;
                }
                None => count += 1,
            }
        }
    }
    count
}

/// `(white_moves - black_moves) * 2` over knight/bishop/rook/queen
/// pseudo-legal destinations, per the spec's pseudo-legal-count definition.
fn mobility(pos: &Position) -> i32 {
    let mut white_moves = 0;
    let mut black_moves = 0;
    for sq in Square::all() {
        let Some(p) = pos.piece_at(sq) else { continue };
        let count = match p.kind {
            PieceType::Knight => KNIGHT_OFFSETS
                .iter()
                .filter(|&&(df, dr)| {
                    offset(sq, df, dr)
                        .map(|to| pos.piece_at(to).map(|q| q.color != p.color).unwrap_or(true))
                        .unwrap_or(false)
                })
                .count() as i32,
            PieceType::Bishop => slider_mobility(pos, sq, p.color, &BISHOP_DIRS),
            PieceType::Rook => slider_mobility(pos, sq, p.color, &ROOK_DIRS),
            PieceType::Queen => {
                slider_mobility(pos, sq, p.color, &BISHOP_DIRS)
                    + slider_mobility(pos, sq, p.color, &ROOK_DIRS)
            }
            _ => continue,
        };
        match p.color {
            Color::White => white_moves += count,
            Color::Black => black_moves += count,
        }
    }
    (white_moves - black_moves) * 2
}

const BISHOP_PAIR_BONUS: i32 = 30;
const ROOK_OPEN_FILE_BONUS: i32 = 15;
const ROOK_SEMI_OPEN_FILE_BONUS: i32 = 7;
const PASSED_PAWN_BASE: i32 = 20;
const PASSED_PAWN_PER_RANK: i32 = 2;

fn is_passed_pawn(pos: &Position, sq: Square, color: Color) -> bool {
    let file = sq.file() as i32;
    let rank = sq.rank() as i32;
    let enemy = color.opposite();
    let direction: i32 = if color == Color::White { 1 } else { -1 };

    let mut r = rank + direction;
    while (0..8).contains(&r) {
        for f in (file - 1)..=(file + 1) {
            if !(0..8).contains(&f) {
                continue;
            }
            if let Some(p) = pos.piece_at(Square::new(r as u8, f as u8)) {
                if p.color == enemy && p.kind == PieceType::Pawn {
                    return false;
                }
            }
        }
        r += direction;
    }
    true
}

/// Bishop pair, rook on an open/semi-open file, and passed-pawn bonuses.
fn extras(pos: &Position) -> i32 {
    let mut score = 0;

    for &(color, sign) in &[(Color::White, 1), (Color::Black, -1)] {
        let bishops = Square::all()
            .filter_map(|sq| pos.piece_at(sq))
            .filter(|p| p.color == color && p.kind == PieceType::Bishop)
            .count();
        if bishops >= 2 {
            score += sign * BISHOP_PAIR_BONUS;
        }
    }

    let white_pawn_files = pawn_file_counts(pos, Color::White);
    let black_pawn_files = pawn_file_counts(pos, Color::Black);

    for sq in Square::all() {
        let Some(p) = pos.piece_at(sq) else { continue };
        if p.kind != PieceType::Rook {
            continue;
        }
        let sign = if p.color == Color::White { 1 } else { -1 };
        let file = sq.file() as usize;
        let own_pawns = if p.color == Color::White { white_pawn_files } else { black_pawn_files };
        let enemy_pawns = if p.color == Color::White { black_pawn_files } else { white_pawn_files };
        if own_pawns[file] == 0 {
            if enemy_pawns[file] == 0 {
                score += sign * ROOK_OPEN_FILE_BONUS;
            } else {
                score += sign * ROOK_SEMI_OPEN_FILE_BONUS;
            }
        }
    }

    for sq in Square::all() {
        let Some(p) = pos.piece_at(sq) else { continue };
        if p.kind != PieceType::Pawn || !is_passed_pawn(pos, sq, p.color) {
            continue;
        }
        let sign = if p.color == Color::White { 1 } else { -1 };
        let advanced = if p.color == Color::White { sq.rank() } else { 7 - sq.rank() };
        score += sign * (PASSED_PAWN_BASE + PASSED_PAWN_PER_RANK * advanced as i32);
    }

    score
}

struct Weighted {
    mg: i32,
    eg: i32,
}

/// Weights are fixed-point, scaled by `WEIGHT_SCALE`, to keep the blend
/// integer-only: 1.0 -> 20, 1.1 -> 22, 0.7 -> 14, and so on.
const WEIGHT_SCALE: i32 = 20;

fn weigh(value_mg: i32, value_eg: i32, mg_weight: i32, eg_weight: i32) -> Weighted {
    Weighted {
        mg: value_mg * mg_weight / WEIGHT_SCALE,
        eg: value_eg * eg_weight / WEIGHT_SCALE,
    }
}

/// Full static evaluation from White's perspective, in centipawns.
pub fn static_eval(pos: &Position) -> i32 {
    let phase = game_phase(pos);
    let endgame = is_endgame(pos);

    let mat = material(pos);
    let (psqt_mg, psqt_eg) = piece_square(pos, endgame);
    let safety = king_safety(pos);
    let pawns = pawn_structure(pos);
    let mob = mobility(pos);
    let extra = extras(pos);

    let terms = [
        weigh(mat, mat, 20, 22),
        weigh(psqt_mg, psqt_eg, 20, 20),
        weigh(safety, safety, 20, 0),
        weigh(pawns, pawns, 20, 21),
        weigh(mob, mob, 20, 14),
        weigh(extra, extra, 20, 20),
    ];

    let mg_total: i32 = terms.iter().map(|t| t.mg).sum();
    let eg_total: i32 = terms.iter().map(|t| t.eg).sum();

    (mg_total * phase + eg_total * (TOTAL_PHASE - phase)) / TOTAL_PHASE
}

/// `static_eval` from the perspective of the side to move, as the negamax
/// search wants it.
pub fn evaluate(pos: &Position) -> i32 {
    let score = static_eval(pos);
    match pos.side_to_move() {
        Color::White => score,
        Color::Black => -score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_is_balanced() {
        let pos = Position::new();
        assert_eq!(static_eval(&pos), 0);
    }

    #[test]
    fn extra_queen_is_a_large_advantage() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
        assert!(static_eval(&pos) > 800);
    }

    #[test]
    fn doubled_pawns_are_penalized() {
        let doubled = Position::from_fen("4k3/8/8/8/8/4P3/4P3/4K3 w - - 0 1").unwrap();
        let split = Position::from_fen("4k3/8/8/8/8/3P4/4P3/4K3 w - - 0 1").unwrap();
        assert!(static_eval(&doubled) < static_eval(&split));
    }

    #[test]
    fn passed_pawn_further_advanced_scores_higher() {
        let far = Position::from_fen("4k3/8/8/8/4P3/8/8/4K3 w - - 0 1").unwrap();
        let close = Position::from_fen("4k3/4P3/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(static_eval(&close) > static_eval(&far));
    }

    #[test]
    fn bishop_pair_is_rewarded() {
        let pair = Position::from_fen("4k3/8/8/8/8/8/8/2B1KB2 w - - 0 1").unwrap();
        let single = Position::from_fen("4k3/8/8/8/8/8/8/3BK3 w - - 0 1").unwrap();
        assert!(static_eval(&pair) > static_eval(&single));
    }

    #[test]
    fn rook_on_open_file_is_rewarded() {
        let open = Position::from_fen("4k3/8/8/8/8/8/8/3RK3 w - - 0 1").unwrap();
        let blocked = Position::from_fen("4k3/3p4/8/8/8/8/8/3RK3 w - - 0 1").unwrap();
        assert!(static_eval(&open) > static_eval(&blocked));
    }

    #[test]
    fn evaluate_flips_sign_for_black_to_move() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/3QK3 b - - 0 1").unwrap();
        assert!(evaluate(&pos) < 0);
    }
}
