//! Error kinds for the engine core.
//!
//! `InvalidFen` and `IllegalMove` are the only errors a caller can trigger and
//! recover from; `UnknownGame` belongs to the external game-registry layer and
//! is never raised here; `Cancelled` is not an error (search returns a move,
//! not a `Result`); `InvariantViolated` is a debug assertion in debug builds
//! and a logged event (not a panic) in release builds — see
//! `crate::board::Position::assert_invariants`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum FenError {
    #[error("expected 6 whitespace-separated fields, found {0}")]
    WrongFieldCount(usize),

    #[error("expected 8 ranks in piece placement, found {0}")]
    WrongRankCount(usize),

    #[error("rank {rank} does not sum to 8 files (got {got})")]
    BadRankLength { rank: usize, got: usize },

    #[error("invalid piece character '{0}'")]
    InvalidPieceChar(char),

    #[error("invalid side-to-move field '{0}', expected 'w' or 'b'")]
    InvalidColor(String),

    #[error("invalid castling rights character '{0}'")]
    InvalidCastlingChar(char),

    #[error("invalid en-passant square '{0}'")]
    InvalidEnPassant(String),

    #[error("invalid halfmove/fullmove counter '{0}'")]
    InvalidCounter(String),

    #[error("position has no king for {0:?}")]
    MissingKing(crate::piece::Color),
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum MoveError {
    #[error("move {0} is not in the legal move set for this position")]
    Illegal(String),
}
