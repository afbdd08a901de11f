//! Terminal position queries: checkmate, stalemate, draw by insufficient
//! material, and a richer `GameStatus` summary for callers that want the
//! full picture in one call.

use crate::board::Position;
use crate::moves::attacks::in_check;
use crate::moves::movegen::generate_legal;
use crate::piece::{Color, PieceType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InPlay,
    Checkmate,
    Stalemate,
    DrawByMaterial,
    DrawByFiftyMove,
    DrawByThreefold,
}

pub fn is_checkmate(pos: &mut Position) -> bool {
    let color = pos.side_to_move();
    let mut legal = Vec::with_capacity(64);
    let mut scratch = Vec::with_capacity(64);
    generate_legal(pos, &mut legal, &mut scratch);
    legal.is_empty() && in_check(pos, color)
}

pub fn is_stalemate(pos: &mut Position) -> bool {
    let color = pos.side_to_move();
    let mut legal = Vec::with_capacity(64);
    let mut scratch = Vec::with_capacity(64);
    generate_legal(pos, &mut legal, &mut scratch);
    legal.is_empty() && !in_check(pos, color)
}

/// Narrow, spec-mandated four-case material draw: K-vs-K, K+N-vs-K,
/// K+B-vs-K, and K+B-vs-K+B. Bishop square color is not compared; any
/// K+B-vs-K+B counts as drawn, matching the source this was distilled from
/// rather than the stricter (opposite-color-bishops-only) rule some engines
/// use.
pub fn is_draw_by_material(pos: &Position) -> bool {
    let mut white = Vec::new();
    let mut black = Vec::new();
    for sq in crate::square::Square::all() {
        if let Some(p) = pos.piece_at(sq) {
            if p.kind == PieceType::King {
                continue;
            }
            match p.color {
                Color::White => white.push(p.kind),
                Color::Black => black.push(p.kind),
            }
        }
    }

    match (white.as_slice(), black.as_slice()) {
        ([], []) => true,
        ([PieceType::Knight], []) | ([], [PieceType::Knight]) => true,
        ([PieceType::Bishop], []) | ([], [PieceType::Bishop]) => true,
        ([PieceType::Bishop], [PieceType::Bishop]) => true,
        _ => false,
    }
}

pub fn is_draw_by_fifty_move(pos: &Position) -> bool {
    pos.halfmove_clock() >= 100
}

pub fn is_draw_by_threefold(pos: &Position) -> bool {
    pos.is_threefold_repetition()
}

/// Every condition that ends the game or forces a draw, checked in the
/// order a UI would want: automatic draws first, then the move-based
/// outcomes last since they require generating the legal move set.
pub fn game_status(pos: &mut Position) -> GameStatus {
    if is_draw_by_material(pos) {
        return GameStatus::DrawByMaterial;
    }
    if is_draw_by_fifty_move(pos) {
        return GameStatus::DrawByFiftyMove;
    }
    if is_draw_by_threefold(pos) {
        return GameStatus::DrawByThreefold;
    }
    if is_checkmate(pos) {
        return GameStatus::Checkmate;
    }
    if is_stalemate(pos) {
        return GameStatus::Stalemate;
    }
    GameStatus::InPlay
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_is_in_play() {
        let mut pos = Position::new();
        assert_eq!(game_status(&mut pos), GameStatus::InPlay);
    }

    #[test]
    fn back_rank_mate_is_checkmate() {
        let mut pos = Position::from_fen("6k1/5ppp/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        // Not yet mate; play Ra8#.
        let mv = crate::moves::types::Move {
            from: crate::square::Square::A1,
            to: crate::square::Square::A8,
            piece: PieceType::Rook,
            promotion: None,
            flags: crate::moves::types::QUIET_MOVE,
        };
        crate::moves::execute::make_move(&mut pos, mv);
        assert!(is_checkmate(&mut pos));
        assert_eq!(game_status(&mut pos), GameStatus::Checkmate);
    }

    #[test]
    fn known_stalemate_position() {
        let mut pos = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(is_stalemate(&mut pos));
        assert!(!is_checkmate(&mut pos));
    }

    #[test]
    fn lone_kings_are_a_material_draw() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(is_draw_by_material(&pos));
    }

    #[test]
    fn king_and_bishop_each_side_is_a_material_draw() {
        let pos = Position::from_fen("4kb2/8/8/8/8/8/8/3BK3 w - - 0 1").unwrap();
        assert!(is_draw_by_material(&pos));
    }

    #[test]
    fn king_and_rook_is_not_a_material_draw() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/3RK3 w - - 0 1").unwrap();
        assert!(!is_draw_by_material(&pos));
    }

    #[test]
    fn fifty_move_clock_triggers_draw() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/3RK3 w - - 100 60").unwrap();
        assert!(is_draw_by_fifty_move(&pos));
    }
}
