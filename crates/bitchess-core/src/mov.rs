//! Packed move representation.

use crate::{ColoredPiece, Piece, Square};
use std::fmt;

/// Special-move marker carried in the top bits of a [`Move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MoveFlag {
    /// Quiet move, capture or promotion.
    None = 0,
    /// Castling with the h-file rook.
    KingCastle = 1,
    /// Castling with the a-file rook.
    QueenCastle = 2,
    /// En passant capture.
    EnPassant = 3,
    /// Pawn advance of two ranks from its starting rank.
    DoublePush = 4,
}

impl MoveFlag {
    #[inline]
    const fn from_bits(bits: u32) -> Self {
        match bits {
            1 => MoveFlag::KingCastle,
            2 => MoveFlag::QueenCastle,
            3 => MoveFlag::EnPassant,
            4 => MoveFlag::DoublePush,
            _ => MoveFlag::None,
        }
    }

    #[inline]
    pub const fn is_castling(self) -> bool {
        matches!(self, MoveFlag::KingCastle | MoveFlag::QueenCastle)
    }
}

const SQUARE_MASK: u32 = 0x3f;
const CODE_MASK: u32 = 0xf;
const FLAG_MASK: u32 = 0x7;

const TARGET_SHIFT: u32 = 6;
const PIECE_SHIFT: u32 = 12;
const CAPTURE_SHIFT: u32 = 16;
const PROMOTION_SHIFT: u32 = 20;
const FLAG_SHIFT: u32 = 24;

/// A move packed into 27 bits of a `u32`, low bits first:
///
/// | bits  | field                                      |
/// |-------|--------------------------------------------|
/// | 0-5   | source square                              |
/// | 6-11  | target square                              |
/// | 12-15 | moving piece code                          |
/// | 16-19 | captured piece code, or 12 for none        |
/// | 20-23 | promotion piece code, or 12 for none       |
/// | 24-26 | [`MoveFlag`]                               |
///
/// Piece codes are those of [`ColoredPiece::code`]. A move carries enough
/// information (captured piece included) to be undone without consulting the
/// board it was played on.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move(u32);

impl Move {
    /// Packs a move.
    #[inline]
    pub const fn new(
        source: Square,
        target: Square,
        piece: ColoredPiece,
        capture: Option<ColoredPiece>,
        promotion: Option<ColoredPiece>,
        flag: MoveFlag,
    ) -> Self {
        let capture = match capture {
            Some(p) => p.code(),
            None => ColoredPiece::EMPTY_CODE,
        };
        let promotion = match promotion {
            Some(p) => p.code(),
            None => ColoredPiece::EMPTY_CODE,
        };
        Move(
            source.index() as u32
                | (target.index() as u32) << TARGET_SHIFT
                | (piece.code() as u32) << PIECE_SHIFT
                | (capture as u32) << CAPTURE_SHIFT
                | (promotion as u32) << PROMOTION_SHIFT
                | (flag as u32) << FLAG_SHIFT,
        )
    }

    /// The raw packed value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn source(self) -> Square {
        // SAFETY: masked to 6 bits
        unsafe { Square::from_index_unchecked((self.0 & SQUARE_MASK) as u8) }
    }

    #[inline]
    pub const fn target(self) -> Square {
        // SAFETY: masked to 6 bits
        unsafe { Square::from_index_unchecked(((self.0 >> TARGET_SHIFT) & SQUARE_MASK) as u8) }
    }

    /// The piece standing on the source square before the move.
    #[inline]
    pub const fn piece(self) -> ColoredPiece {
        match ColoredPiece::from_code(((self.0 >> PIECE_SHIFT) & CODE_MASK) as u8) {
            Some(p) => p,
            // Moves are only built by `new`, which always stores a real piece.
            None => unreachable!(),
        }
    }

    #[inline]
    pub const fn capture(self) -> Option<ColoredPiece> {
        ColoredPiece::from_code(((self.0 >> CAPTURE_SHIFT) & CODE_MASK) as u8)
    }

    #[inline]
    pub const fn promotion(self) -> Option<ColoredPiece> {
        ColoredPiece::from_code(((self.0 >> PROMOTION_SHIFT) & CODE_MASK) as u8)
    }

    #[inline]
    pub const fn flag(self) -> MoveFlag {
        MoveFlag::from_bits((self.0 >> FLAG_SHIFT) & FLAG_MASK)
    }

    #[inline]
    pub const fn is_capture(self) -> bool {
        (self.0 >> CAPTURE_SHIFT) & CODE_MASK != ColoredPiece::EMPTY_CODE as u32
    }

    #[inline]
    pub const fn is_promotion(self) -> bool {
        (self.0 >> PROMOTION_SHIFT) & CODE_MASK != ColoredPiece::EMPTY_CODE as u32
    }

    /// Long algebraic notation as used by UCI, e.g. `e2e4` or `e7e8q`.
    pub fn to_uci(self) -> String {
        self.to_string()
    }

    /// Placeholder used to fill fixed-size move buffers; never legal.
    pub const NULL: Move = Move::new(
        Square::A1,
        Square::A1,
        ColoredPiece::new(Piece::Pawn, crate::Color::White),
        None,
        None,
        MoveFlag::None,
    );
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Move")
            .field("uci", &self.to_uci())
            .field("piece", &self.piece())
            .field("capture", &self.capture())
            .field("flag", &self.flag())
            .finish()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.source(), self.target())?;
        if let Some(promotion) = self.promotion() {
            write!(f, "{}", promotion.piece.to_char())?;
        }
        Ok(())
    }
}
