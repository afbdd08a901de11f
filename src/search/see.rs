//! Static exchange evaluation: is a capture on `mv.to` safe for the side
//! making it?
//!
//! The move orderer only ever asks for the zero threshold, so
//! [`static_exchange_eval`] follows the simplified definition: make the
//! move, ask the attack oracle whether the destination square is still
//! attacked by the opponent, unmake.

use crate::board::Position;
use crate::piece::PieceType;
use crate::moves::types::Move;

/// True iff the capture on `mv.to` is safe for the side making `mv`: after
/// playing it, the destination square is no longer attacked by the
/// opponent. Only the zero threshold is meaningful under this definition.
pub fn static_exchange_eval(pos: &Position, mv: Move, threshold: i32) -> bool {
    debug_assert_eq!(threshold, 0, "simplified SEE only supports a zero threshold");
    let mover = pos
        .piece_at(mv.from)
        .expect("static_exchange_eval called with no piece on the from-square");
    let mut scratch = pos.clone();
    crate::moves::execute::make_move(&mut scratch, mv);
    !crate::moves::attacks::is_square_attacked(&scratch, mv.to, mover.color.opposite())
}
