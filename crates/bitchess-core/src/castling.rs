//! Castling rights.

use crate::Color;
use std::fmt;

/// Which rook a king castles with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleSide {
    King,
    Queen,
}

impl CastleSide {
    pub const ALL: [CastleSide; 2] = [CastleSide::King, CastleSide::Queen];
}

/// The four castling permissions packed into the low nibble of a byte.
///
/// Bit layout: 1 = white king side, 2 = white queen side, 4 = black king
/// side, 8 = black queen side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    pub const WHITE_KINGSIDE: u8 = 0b0001;
    pub const WHITE_QUEENSIDE: u8 = 0b0010;
    pub const BLACK_KINGSIDE: u8 = 0b0100;
    pub const BLACK_QUEENSIDE: u8 = 0b1000;

    /// Creates rights from raw flags; bits above the low nibble are dropped.
    #[inline]
    pub const fn new(flags: u8) -> Self {
        CastlingRights(flags & 0b1111)
    }

    /// The flag bit for one color and side.
    #[inline]
    pub const fn flag(color: Color, side: CastleSide) -> u8 {
        match (color, side) {
            (Color::White, CastleSide::King) => Self::WHITE_KINGSIDE,
            (Color::White, CastleSide::Queen) => Self::WHITE_QUEENSIDE,
            (Color::Black, CastleSide::King) => Self::BLACK_KINGSIDE,
            (Color::Black, CastleSide::Queen) => Self::BLACK_QUEENSIDE,
        }
    }

    #[inline]
    pub const fn has(self, color: Color, side: CastleSide) -> bool {
        self.0 & Self::flag(color, side) != 0
    }

    /// Returns these rights without the given permission.
    #[inline]
    #[must_use]
    pub const fn without(self, color: Color, side: CastleSide) -> Self {
        CastlingRights(self.0 & !Self::flag(color, side))
    }

    /// Returns these rights with the given permission added.
    #[inline]
    #[must_use]
    pub const fn with(self, color: Color, side: CastleSide) -> Self {
        CastlingRights(self.0 | Self::flag(color, side))
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Parses the FEN castling field (`KQkq`, any subset, or `-`).
    pub fn from_fen(field: &str) -> Option<Self> {
        if field == "-" {
            return Some(Self::NONE);
        }
        if field.is_empty() {
            return None;
        }
        let mut rights = Self::NONE;
        for c in field.chars() {
            rights = match c {
                'K' => rights.with(Color::White, CastleSide::King),
                'Q' => rights.with(Color::White, CastleSide::Queen),
                'k' => rights.with(Color::Black, CastleSide::King),
                'q' => rights.with(Color::Black, CastleSide::Queen),
                _ => return None,
            };
        }
        Some(rights)
    }
}

impl fmt::Display for CastlingRights {
    /// Writes the FEN castling field.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        let letters = [
            (Color::White, CastleSide::King, 'K'),
            (Color::White, CastleSide::Queen, 'Q'),
            (Color::Black, CastleSide::King, 'k'),
            (Color::Black, CastleSide::Queen, 'q'),
        ];
        for (color, side, letter) in letters {
            if self.has(color, side) {
                write!(f, "{}", letter)?;
            }
        }
        Ok(())
    }
}
