//! Terminal-status integration tests: checkmate, stalemate, and the draw
//! rules, run against full games built move-by-move rather than FEN-only
//! snapshots, so threefold repetition is also exercised.

use coregambit::board::Position;
use coregambit::moves::execute::make_move;
use coregambit::moves::types::{Move, QUIET_MOVE};
use coregambit::piece::PieceType;
use coregambit::square::Square;
use coregambit::status::{game_status, is_checkmate, is_stalemate, GameStatus};

fn pos(fen: &str) -> Position {
    Position::from_fen(fen).expect("valid FEN")
}

fn king_move(from: Square, to: Square) -> Move {
    Move { from, to, piece: PieceType::King, promotion: None, flags: QUIET_MOVE }
}

#[test]
fn starting_position_is_in_play() {
    let mut position = Position::new();
    assert_eq!(game_status(&mut position), GameStatus::InPlay);
}

#[test]
fn back_rank_is_checkmate() {
    let mut position = pos("6k1/5ppp/8/8/8/8/8/R3K3 w - - 0 1");
    let mv = Move { from: Square::A1, to: Square::A8, piece: PieceType::Rook, promotion: None, flags: QUIET_MOVE };
    make_move(&mut position, mv);
    assert!(is_checkmate(&mut position));
    assert_eq!(game_status(&mut position), GameStatus::Checkmate);
}

#[test]
fn known_position_is_stalemate_not_checkmate() {
    let mut position = pos("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
    assert!(is_stalemate(&mut position));
    assert!(!is_checkmate(&mut position));
    assert_eq!(game_status(&mut position), GameStatus::Stalemate);
}

#[test]
fn fifty_move_clock_at_exactly_100_is_a_draw() {
    let mut position = pos("4k3/8/8/8/8/8/8/3RK3 w - - 100 60");
    assert_eq!(game_status(&mut position), GameStatus::DrawByFiftyMove);
}

#[test]
fn fifty_move_clock_at_99_is_not_yet_a_draw() {
    let mut position = pos("4k3/8/8/8/8/8/8/3RK3 w - - 99 60");
    assert_eq!(game_status(&mut position), GameStatus::InPlay);
}

#[test]
fn lone_kings_are_a_material_draw() {
    let mut position = pos("4k3/8/8/8/8/8/8/4K3 w - - 0 1");
    assert_eq!(game_status(&mut position), GameStatus::DrawByMaterial);
}

#[test]
fn king_and_knight_each_side_is_not_a_material_draw() {
    // K+N vs K+N is not one of the four named draw cases (only K+N vs bare
    // K qualifies), so this must stay in play.
    let mut position = pos("4kn2/8/8/8/8/8/8/3NK3 w - - 0 1");
    assert_eq!(game_status(&mut position), GameStatus::InPlay);
}

#[test]
fn threefold_repetition_is_detected_by_king_shuffling() {
    let mut position = pos("4k3/8/8/8/8/8/8/R3K3 w - - 0 1");
    let cycle = [
        king_move(Square::E1, Square::D1),
        king_move(Square::E8, Square::D8),
        king_move(Square::D1, Square::E1),
        king_move(Square::D8, Square::E8),
    ];
    for mv in cycle.iter().cycle().take(8) {
        make_move(&mut position, *mv);
    }
    assert_eq!(game_status(&mut position), GameStatus::DrawByThreefold);
}

#[test]
fn threefold_does_not_trigger_after_only_two_occurrences() {
    let mut position = pos("4k3/8/8/8/8/8/8/R3K3 w - - 0 1");
    let cycle = [
        king_move(Square::E1, Square::D1),
        king_move(Square::E8, Square::D8),
        king_move(Square::D1, Square::E1),
        king_move(Square::D8, Square::E8),
    ];
    for mv in cycle.iter() {
        make_move(&mut position, *mv);
    }
    assert_eq!(game_status(&mut position), GameStatus::InPlay);
}
