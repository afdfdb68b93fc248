//! FEN (Forsyth-Edwards Notation) parsing and serialization.

use crate::{CastlingRights, Color, ColoredPiece, Square};
use std::fmt;
use thiserror::Error;

/// Errors that can occur when parsing FEN strings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid FEN: expected 4 or 6 fields, got {0}")]
    InvalidPartCount(usize),

    #[error("invalid piece placement: {0}")]
    InvalidPiecePlacement(String),

    #[error("invalid active color: expected 'w' or 'b', got '{0}'")]
    InvalidActiveColor(String),

    #[error("invalid castling rights: {0}")]
    InvalidCastlingRights(String),

    #[error("invalid en passant square: {0}")]
    InvalidEnPassantSquare(String),

    #[error("invalid halfmove clock: {0}")]
    InvalidHalfmoveClock(String),

    #[error("invalid fullmove number: {0}")]
    InvalidFullmoveNumber(String),
}

/// A syntactically valid FEN record, already decoded into board values.
///
/// Parsing only checks notation. Whether the described position is playable
/// (one king per side and so on) is decided by whoever builds a position from
/// it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fen {
    /// Piece on each square, indexed a1 = 0 ... h8 = 63.
    pub placement: [Option<ColoredPiece>; 64],
    pub side_to_move: Color,
    pub castling: CastlingRights,
    pub en_passant: Option<Square>,
    /// Half-moves since the last capture or pawn move. Defaults to 0 when the
    /// field is absent.
    pub halfmove_clock: u32,
    /// Defaults to 1 when the field is absent.
    pub fullmove_number: u32,
}

impl Fen {
    /// The standard starting position.
    pub const STARTPOS: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Parses a FEN string. The two move-counter fields may be omitted.
    pub fn parse(fen: &str) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() != 4 && parts.len() != 6 {
            return Err(FenError::InvalidPartCount(parts.len()));
        }

        let placement = Self::parse_placement(parts[0])?;

        let side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidActiveColor(other.to_string())),
        };

        let castling = CastlingRights::from_fen(parts[2])
            .ok_or_else(|| FenError::InvalidCastlingRights(parts[2].to_string()))?;

        let en_passant = Self::parse_en_passant(parts[3])?;

        let (halfmove_clock, fullmove_number) = if parts.len() == 6 {
            let halfmove = parts[4]
                .parse::<u32>()
                .map_err(|_| FenError::InvalidHalfmoveClock(parts[4].to_string()))?;
            let fullmove = parts[5]
                .parse::<u32>()
                .map_err(|_| FenError::InvalidFullmoveNumber(parts[5].to_string()))?;
            (halfmove, fullmove)
        } else {
            (0, 1)
        };

        Ok(Fen {
            placement,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }

    fn parse_placement(field: &str) -> Result<[Option<ColoredPiece>; 64], FenError> {
        let ranks: Vec<&str> = field.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::InvalidPiecePlacement(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        let mut placement = [None; 64];
        // FEN lists rank 8 first.
        for (row, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - row;
            let mut file = 0usize;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                    file += skip as usize;
                } else if let Some(piece) = ColoredPiece::from_fen_char(c) {
                    if file < 8 {
                        placement[rank * 8 + file] = Some(piece);
                    }
                    file += 1;
                } else {
                    return Err(FenError::InvalidPiecePlacement(format!(
                        "invalid character '{}' in rank {}",
                        c,
                        rank + 1
                    )));
                }
                if file > 8 {
                    break;
                }
            }
            if file != 8 {
                return Err(FenError::InvalidPiecePlacement(format!(
                    "rank {} has {} squares, expected 8",
                    rank + 1,
                    file
                )));
            }
        }
        Ok(placement)
    }

    fn parse_en_passant(field: &str) -> Result<Option<Square>, FenError> {
        if field == "-" {
            return Ok(None);
        }
        match Square::from_algebraic(field) {
            Some(sq) if sq.rank().index() == 2 || sq.rank().index() == 5 => Ok(Some(sq)),
            _ => Err(FenError::InvalidEnPassantSquare(field.to_string())),
        }
    }

    /// Writes only the piece placement field.
    pub fn placement_field(placement: &[Option<ColoredPiece>; 64]) -> String {
        let mut out = String::with_capacity(72);
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match placement[rank * 8 + file] {
                    Some(piece) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(piece.to_fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if rank > 0 {
                out.push('/');
            }
        }
        out
    }
}

impl fmt::Display for Fen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ",
            Self::placement_field(&self.placement),
            self.side_to_move.to_fen_char(),
            self.castling
        )?;
        match self.en_passant {
            Some(sq) => write!(f, "{}", sq)?,
            None => f.write_str("-")?,
        }
        write!(f, " {} {}", self.halfmove_clock, self.fullmove_number)
    }
}
