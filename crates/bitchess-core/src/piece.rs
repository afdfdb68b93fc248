//! Piece kinds and colored pieces.

use crate::Color;
use std::fmt;

/// The six kinds of chess pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Piece {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl Piece {
    /// All piece kinds in index order.
    pub const ALL: [Piece; 6] = [
        Piece::Pawn,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
        Piece::King,
    ];

    /// Pieces a pawn may promote to, strongest first.
    pub const PROMOTIONS: [Piece; 4] = [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight];

    /// Returns the index of this piece kind (0-5).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`Piece::index`].
    #[inline]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Piece::Pawn),
            1 => Some(Piece::Knight),
            2 => Some(Piece::Bishop),
            3 => Some(Piece::Rook),
            4 => Some(Piece::Queen),
            5 => Some(Piece::King),
            _ => None,
        }
    }

    /// Lowercase letter used by FEN and UCI promotion suffixes.
    pub const fn to_char(self) -> char {
        match self {
            Piece::Pawn => 'p',
            Piece::Knight => 'n',
            Piece::Bishop => 'b',
            Piece::Rook => 'r',
            Piece::Queen => 'q',
            Piece::King => 'k',
        }
    }

    /// Returns true for bishops, rooks and queens.
    #[inline]
    pub const fn is_slider(self) -> bool {
        matches!(self, Piece::Bishop | Piece::Rook | Piece::Queen)
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Piece::Pawn => "pawn",
            Piece::Knight => "knight",
            Piece::Bishop => "bishop",
            Piece::Rook => "rook",
            Piece::Queen => "queen",
            Piece::King => "king",
        };
        f.write_str(name)
    }
}

/// A piece kind together with its owner.
///
/// Each colored piece has a 4-bit code `kind * 2 + color`, so white pieces
/// are even and black pieces odd: WP=0, BP=1, WN=2, ... WK=10, BK=11. The
/// code doubles as the index of the piece's bitboard inside a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColoredPiece {
    pub piece: Piece,
    pub color: Color,
}

impl ColoredPiece {
    /// Number of distinct colored pieces.
    pub const COUNT: usize = 12;

    /// Code reserved for "no piece" in packed encodings.
    pub const EMPTY_CODE: u8 = 12;

    #[inline]
    pub const fn new(piece: Piece, color: Color) -> Self {
        ColoredPiece { piece, color }
    }

    /// Returns the 4-bit code of this piece.
    #[inline]
    pub const fn code(self) -> u8 {
        (self.piece as u8) * 2 + self.color as u8
    }

    /// Decodes a code produced by [`ColoredPiece::code`].
    #[inline]
    pub const fn from_code(code: u8) -> Option<Self> {
        let color = if code & 1 == 0 {
            Color::White
        } else {
            Color::Black
        };
        match Piece::from_index((code >> 1) as usize) {
            Some(piece) => Some(ColoredPiece { piece, color }),
            None => None,
        }
    }

    /// Returns the FEN letter: uppercase for White, lowercase for Black.
    pub const fn to_fen_char(self) -> char {
        let c = self.piece.to_char();
        match self.color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    /// Parses a FEN piece letter.
    pub const fn from_fen_char(c: char) -> Option<Self> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let piece = match c.to_ascii_lowercase() {
            'p' => Piece::Pawn,
            'n' => Piece::Knight,
            'b' => Piece::Bishop,
            'r' => Piece::Rook,
            'q' => Piece::Queen,
            'k' => Piece::King,
            _ => return None,
        };
        Some(ColoredPiece { piece, color })
    }
}

impl fmt::Display for ColoredPiece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.color, self.piece)
    }
}
