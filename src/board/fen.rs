//! FEN parsing and serialization.

use super::{CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ, Position};
use crate::error::FenError;
use crate::piece::{Color, Piece, PieceType};
use crate::square::Square;

impl Position {
    pub(crate) fn load_fen(&mut self, fen: &str) -> Result<(), FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(FenError::WrongFieldCount(fields.len()));
        }

        let mut squares = [super::EMPTY_SQ; 64];
        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::WrongRankCount(ranks.len()));
        }
        // FEN ranks run 8 down to 1; our rank index 0 is rank 1.
        for (rank_from_top, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_from_top;
            let mut file = 0usize;
            for ch in rank_str.chars() {
                if let Some(skip) = ch.to_digit(10) {
                    file += skip as usize;
                    if file > 8 {
                        return Err(FenError::BadRankLength { rank, got: file });
                    }
                } else {
                    let (color, kind) =
                        PieceType::from_fen_char(ch).ok_or(FenError::InvalidPieceChar(ch))?;
                    if file >= 8 {
                        return Err(FenError::BadRankLength { rank, got: file + 1 });
                    }
                    let sq = Square::new(rank as u8, file as u8);
                    squares[sq.index() as usize] = super::pack(color, kind);
                    file += 1;
                }
            }
            if file != 8 {
                return Err(FenError::BadRankLength { rank, got: file });
            }
        }

        let side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidColor(other.to_string())),
        };

        let mut castling_rights = 0u8;
        if fields[2] != "-" {
            for ch in fields[2].chars() {
                castling_rights |= match ch {
                    'K' => CASTLE_WK,
                    'Q' => CASTLE_WQ,
                    'k' => CASTLE_BK,
                    'q' => CASTLE_BQ,
                    other => return Err(FenError::InvalidCastlingChar(other)),
                };
            }
        }

        let en_passant = if fields[3] == "-" {
            None
        } else {
            Some(Square::from_algebraic(fields[3]).ok_or_else(|| {
                FenError::InvalidEnPassant(fields[3].to_string())
            })?)
        };

        let halfmove_clock: u32 = fields[4]
            .parse()
            .map_err(|_| FenError::InvalidCounter(fields[4].to_string()))?;
        let fullmove_number: u32 = fields[5]
            .parse()
            .map_err(|_| FenError::InvalidCounter(fields[5].to_string()))?;

        let mut king_square = [Square::A1; 2];
        for sq in Square::all() {
            let byte = squares[sq.index() as usize];
            if byte != super::EMPTY_SQ {
                let (color, kind) = super::unpack(byte);
                if kind == PieceType::King {
                    king_square[color as usize] = sq;
                }
            }
        }
        if squares.iter().filter(|&&b| b == super::pack(Color::White, PieceType::King)).count() != 1 {
            return Err(FenError::MissingKing(Color::White));
        }
        if squares.iter().filter(|&&b| b == super::pack(Color::Black, PieceType::King)).count() != 1 {
            return Err(FenError::MissingKing(Color::Black));
        }

        self.squares = squares;
        self.side_to_move = side_to_move;
        self.castling_rights = castling_rights;
        self.en_passant = en_passant;
        self.halfmove_clock = halfmove_clock;
        self.fullmove_number = fullmove_number;
        self.king_square = king_square;
        self.history.clear();
        self.undo_stack.clear();
        self.zobrist = self.compute_zobrist_full();
        Ok(())
    }

    pub(crate) fn fen_string(&self) -> String {
        let mut placement = String::new();
        for rank_from_top in 0..8 {
            let rank = 7 - rank_from_top;
            let mut empty_run = 0u32;
            for file in 0..8u8 {
                let sq = Square::new(rank, file);
                match self.piece_at(sq) {
                    Some(Piece { color, kind }) => {
                        if empty_run > 0 {
                            placement.push_str(&empty_run.to_string());
                            empty_run = 0;
                        }
                        placement.push(kind.to_fen_char(color));
                    }
                    None => empty_run += 1,
                }
            }
            if empty_run > 0 {
                placement.push_str(&empty_run.to_string());
            }
            if rank_from_top != 7 {
                placement.push('/');
            }
        }

        let side = match self.side_to_move {
            Color::White => "w",
            Color::Black => "b",
        };

        let mut rights = String::new();
        if self.castling_rights & CASTLE_WK != 0 {
            rights.push('K');
        }
        if self.castling_rights & CASTLE_WQ != 0 {
            rights.push('Q');
        }
        if self.castling_rights & CASTLE_BK != 0 {
            rights.push('k');
        }
        if self.castling_rights & CASTLE_BQ != 0 {
            rights.push('q');
        }
        if rights.is_empty() {
            rights.push('-');
        }

        let ep = match self.en_passant {
            Some(sq) => sq.to_string(),
            None => "-".to_string(),
        };

        format!(
            "{placement} {side} {rights} {ep} {} {}",
            self.halfmove_clock, self.fullmove_number
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_fen_round_trips() {
        let pos = Position::new();
        assert_eq!(pos.to_fen(), Position::STARTING_FEN);
    }

    #[test]
    fn kiwipete_round_trips() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let pos = Position::from_fen(fen).unwrap();
        assert_eq!(pos.to_fen(), fen);
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert_eq!(
            Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -"),
            Err(FenError::WrongFieldCount(5))
        );
    }

    #[test]
    fn rejects_missing_king() {
        let err = Position::from_fen("8/8/8/8/8/8/8/7K w - - 0 1").unwrap_err();
        assert_eq!(err, FenError::MissingKing(Color::Black));
    }

    #[test]
    fn rejects_bad_piece_char() {
        let err =
            Position::from_fen("rnbqkbnx/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
                .unwrap_err();
        assert_eq!(err, FenError::InvalidPieceChar('x'));
    }
}
