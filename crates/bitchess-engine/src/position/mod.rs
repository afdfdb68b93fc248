//! Chess position representation.

mod make;

use std::fmt;

use bitchess_core::{
    CastleSide, CastlingRights, Color, ColoredPiece, Fen, FenError, File, Piece, Rank, Square,
};
use thiserror::Error;

use crate::Bitboard;

/// Reasons a board description cannot be turned into a [`Position`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PositionError {
    #[error(transparent)]
    Fen(#[from] FenError),

    #[error("{0} has no king")]
    MissingKing(Color),

    #[error("{color} has {count} kings")]
    MultipleKings { color: Color, count: u32 },

    #[error("pawn on back rank at {0}")]
    PawnOnBackRank(Square),

    #[error("{0} is in check but it is not their move")]
    OpponentInCheck(Color),

    #[error("invalid en passant square {0}: no pawn to capture")]
    InvalidEnPassant(Square),
}

/// Complete position state with the history needed to undo moves.
///
/// Piece placement is kept three ways (per-piece bitboards, per-color
/// occupancy and a square lookup) and all three always agree. Castling rights
/// and the en passant square are stacks with one entry per applied move plus
/// the initial one; the top entry is the current value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    /// Indexed by [`ColoredPiece::code`].
    pieces: [Bitboard; ColoredPiece::COUNT],
    /// White, black, both.
    occupancy: [Bitboard; 3],
    board: [Option<ColoredPiece>; 64],
    side_to_move: Color,
    castling: Vec<CastlingRights>,
    en_passant: Vec<Option<Square>>,
}

const BOTH: usize = 2;

impl Position {
    fn empty(side_to_move: Color) -> Self {
        Position {
            pieces: [Bitboard::EMPTY; ColoredPiece::COUNT],
            occupancy: [Bitboard::EMPTY; 3],
            board: [None; 64],
            side_to_move,
            castling: Vec::with_capacity(64),
            en_passant: Vec::with_capacity(64),
        }
    }

    /// Creates the standard starting position.
    pub fn startpos() -> Self {
        let mut position = Position::empty(Color::White);
        let back = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];
        for (file, piece) in File::ALL.into_iter().zip(back) {
            position.put_piece(Square::new(file, Rank::R1), ColoredPiece::new(piece, Color::White));
            position.put_piece(Square::new(file, Rank::R2), ColoredPiece::new(Piece::Pawn, Color::White));
            position.put_piece(Square::new(file, Rank::R7), ColoredPiece::new(Piece::Pawn, Color::Black));
            position.put_piece(Square::new(file, Rank::R8), ColoredPiece::new(piece, Color::Black));
        }
        position.castling.push(CastlingRights::ALL);
        position.en_passant.push(None);
        position
    }

    /// Creates a position from a FEN string. Move counters are accepted but
    /// not tracked.
    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        let parsed = Fen::parse(fen)?;
        Self::from_parts(
            parsed.placement,
            parsed.side_to_move,
            parsed.castling,
            parsed.en_passant,
        )
    }

    /// Builds a position from already-decoded parts and checks that it is
    /// playable.
    ///
    /// Castling rights whose king or rook is not on its home square are
    /// dropped rather than rejected.
    pub fn from_parts(
        placement: [Option<ColoredPiece>; 64],
        side_to_move: Color,
        castling: CastlingRights,
        en_passant: Option<Square>,
    ) -> Result<Self, PositionError> {
        let mut position = Position::empty(side_to_move);
        for (index, piece) in placement.into_iter().enumerate() {
            if let (Some(piece), Some(sq)) = (piece, Square::from_index(index as u8)) {
                position.put_piece(sq, piece);
            }
        }

        for color in Color::ALL {
            match position.pieces_of(Piece::King, color).count() {
                0 => return Err(PositionError::MissingKing(color)),
                1 => {}
                count => return Err(PositionError::MultipleKings { color, count }),
            }
        }

        let pawns = position.pieces_of(Piece::Pawn, Color::White)
            | position.pieces_of(Piece::Pawn, Color::Black);
        if let Some(sq) = (pawns & (Bitboard::RANK_1 | Bitboard::RANK_8)).lsb() {
            return Err(PositionError::PawnOnBackRank(sq));
        }

        let them = side_to_move.opposite();
        if crate::movegen::is_king_attacked(&position, them) {
            return Err(PositionError::OpponentInCheck(them));
        }

        if let Some(ep) = en_passant {
            position.validate_en_passant(ep)?;
        }

        let castling = position.surviving_castling_rights(castling);
        position.castling.push(castling);
        position.en_passant.push(en_passant);
        Ok(position)
    }

    /// The en passant square must sit behind an enemy pawn that could just
    /// have advanced two ranks.
    fn validate_en_passant(&self, ep: Square) -> Result<(), PositionError> {
        let us = self.side_to_move;
        let them = us.opposite();
        let (ep_rank, pawn_rank) = match us {
            Color::White => (Rank::R6, Rank::R5),
            Color::Black => (Rank::R3, Rank::R4),
        };
        let pawn_sq = Square::new(ep.file(), pawn_rank);
        let valid = ep.rank() == ep_rank
            && self.board[ep.index() as usize].is_none()
            && self.piece_on(pawn_sq) == Some(ColoredPiece::new(Piece::Pawn, them));
        if valid {
            Ok(())
        } else {
            Err(PositionError::InvalidEnPassant(ep))
        }
    }

    /// Returns `rights` minus every right whose king or rook has left its
    /// home square.
    pub(crate) fn surviving_castling_rights(&self, rights: CastlingRights) -> CastlingRights {
        let mut result = rights;
        for color in Color::ALL {
            let king_home = castle_king_home(color);
            let king_home_ok =
                self.piece_on(king_home) == Some(ColoredPiece::new(Piece::King, color));
            for side in CastleSide::ALL {
                let rook_home = castle_rook_squares(color, side).0;
                let rook_home_ok =
                    self.piece_on(rook_home) == Some(ColoredPiece::new(Piece::Rook, color));
                if !(king_home_ok && rook_home_ok) {
                    result = result.without(color, side);
                }
            }
        }
        result
    }

    /// Converts the position to a four-field FEN string (placement, side,
    /// castling, en passant).
    pub fn to_fen(&self) -> String {
        let ep = match self.en_passant() {
            Some(sq) => sq.to_string(),
            None => "-".to_string(),
        };
        format!(
            "{} {} {} {}",
            Fen::placement_field(&self.board),
            self.side_to_move.to_fen_char(),
            self.castling_rights(),
            ep
        )
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// The current castling rights.
    #[inline]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling.last().copied().unwrap_or(CastlingRights::NONE)
    }

    /// The current en passant target square.
    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant.last().copied().flatten()
    }

    /// Castling rights before each applied move, current value last.
    pub fn castling_history(&self) -> &[CastlingRights] {
        &self.castling
    }

    /// En passant squares before each applied move, current value last.
    pub fn en_passant_history(&self) -> &[Option<Square>] {
        &self.en_passant
    }

    /// Number of moves applied since construction.
    #[inline]
    pub fn ply(&self) -> usize {
        self.castling.len().saturating_sub(1)
    }

    /// Returns the piece on the given square, if any.
    #[inline]
    pub fn piece_on(&self, sq: Square) -> Option<ColoredPiece> {
        self.board[sq.index() as usize]
    }

    /// Returns a bitboard of one colored piece.
    #[inline]
    pub fn pieces(&self, piece: ColoredPiece) -> Bitboard {
        self.pieces[piece.code() as usize]
    }

    /// Returns a bitboard of pieces of the given type and color.
    #[inline]
    pub fn pieces_of(&self, piece: Piece, color: Color) -> Bitboard {
        self.pieces(ColoredPiece::new(piece, color))
    }

    /// Returns every square holding a piece of `color`.
    #[inline]
    pub fn occupancy(&self, color: Color) -> Bitboard {
        self.occupancy[color.index()]
    }

    /// Returns a bitboard of all occupied squares.
    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.occupancy[BOTH]
    }

    /// Returns the king square of `color`.
    ///
    /// # Panics
    /// Panics if `color` has no king, which construction rules out.
    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        match self.pieces_of(Piece::King, color).lsb() {
            Some(sq) => sq,
            None => panic!("position has no {} king", color),
        }
    }

    /// Fallible form of [`Position::king_square`].
    pub fn try_king_square(&self, color: Color) -> Result<Square, PositionError> {
        self.pieces_of(Piece::King, color)
            .lsb()
            .ok_or(PositionError::MissingKing(color))
    }

    #[inline]
    pub(crate) fn put_piece(&mut self, sq: Square, piece: ColoredPiece) {
        debug_assert!(self.board[sq.index() as usize].is_none(), "{} is occupied", sq);
        self.pieces[piece.code() as usize].set(sq);
        self.occupancy[piece.color.index()].set(sq);
        self.occupancy[BOTH].set(sq);
        self.board[sq.index() as usize] = Some(piece);
    }

    #[inline]
    pub(crate) fn remove_piece(&mut self, sq: Square, piece: ColoredPiece) {
        debug_assert_eq!(self.board[sq.index() as usize], Some(piece), "on {}", sq);
        self.pieces[piece.code() as usize].clear(sq);
        self.occupancy[piece.color.index()].clear(sq);
        self.occupancy[BOTH] = self.occupancy[0] | self.occupancy[1];
        self.board[sq.index() as usize] = None;
    }

    #[inline]
    pub(crate) fn move_piece(&mut self, from: Square, to: Square, piece: ColoredPiece) {
        self.remove_piece(from, piece);
        self.put_piece(to, piece);
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl fmt::Display for Position {
    /// ASCII board with rank and file labels, followed by the side to move,
    /// castling rights and en passant square.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::ALL.into_iter().rev() {
            write!(f, "{} ", rank.to_char())?;
            for file in File::ALL {
                match self.piece_on(Square::new(file, rank)) {
                    Some(piece) => write!(f, "{} ", piece.to_fen_char())?,
                    None => write!(f, ". ")?,
                }
            }
            writeln!(f)?;
        }
        writeln!(f, "  a b c d e f g h")?;
        writeln!(f)?;
        writeln!(f, "side to move: {}", self.side_to_move)?;
        writeln!(f, "castling:     {}", self.castling_rights())?;
        match self.en_passant() {
            Some(sq) => write!(f, "en passant:   {}", sq),
            None => write!(f, "en passant:   -"),
        }
    }
}

pub(crate) const fn castle_king_home(color: Color) -> Square {
    match color {
        Color::White => Square::E1,
        Color::Black => Square::E8,
    }
}

/// King destination for a castle.
pub(crate) const fn castle_king_target(color: Color, side: CastleSide) -> Square {
    match (color, side) {
        (Color::White, CastleSide::King) => Square::G1,
        (Color::White, CastleSide::Queen) => Square::C1,
        (Color::Black, CastleSide::King) => Square::G8,
        (Color::Black, CastleSide::Queen) => Square::C8,
    }
}

/// Rook (from, to) for a castle.
pub(crate) const fn castle_rook_squares(color: Color, side: CastleSide) -> (Square, Square) {
    match (color, side) {
        (Color::White, CastleSide::King) => (Square::H1, Square::F1),
        (Color::White, CastleSide::Queen) => (Square::A1, Square::D1),
        (Color::Black, CastleSide::King) => (Square::H8, Square::F8),
        (Color::Black, CastleSide::Queen) => (Square::A8, Square::D8),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn startpos_fen_roundtrip() {
        let pos = Position::startpos();
        assert_eq!(pos.to_fen(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -");
        assert_eq!(Position::from_fen(Fen::STARTPOS).unwrap(), pos);
        assert_eq!(Position::default(), pos);
    }

    #[test]
    fn custom_fen_roundtrip() {
        let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq -";
        let pos = Position::from_fen(fen).unwrap();
        assert_eq!(pos.to_fen(), fen);
    }

    #[test]
    fn views_agree() {
        let pos = Position::startpos();
        assert_eq!(pos.occupied().count(), 32);
        assert_eq!(pos.occupancy(Color::White).count(), 16);
        assert_eq!(pos.occupied(), pos.occupancy(Color::White) | pos.occupancy(Color::Black));
        for index in 0..64u8 {
            let square = Square::from_index(index).unwrap();
            match pos.piece_on(square) {
                Some(piece) => assert!(pos.pieces(piece).contains(square)),
                None => assert!(!pos.occupied().contains(square)),
            }
        }
        assert_eq!(pos.pieces_of(Piece::Pawn, Color::Black).count(), 8);
        assert_eq!(pos.king_square(Color::White), Square::E1);
        assert_eq!(pos.try_king_square(Color::Black), Ok(Square::E8));
    }

    #[test]
    fn histories_start_with_one_entry() {
        let pos = Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();
        assert_eq!(pos.castling_history(), &[CastlingRights::NONE]);
        assert_eq!(pos.en_passant_history(), &[Some(sq("d6"))]);
        assert_eq!(pos.ply(), 0);
        assert_eq!(pos.en_passant(), Some(sq("d6")));
    }

    #[test]
    fn rejects_missing_and_extra_kings() {
        assert_eq!(
            Position::from_fen("8/8/8/8/8/8/8/4K3 w - - 0 1"),
            Err(PositionError::MissingKing(Color::Black))
        );
        assert_eq!(
            Position::from_fen("4k3/8/8/8/8/8/8/3KK3 w - - 0 1"),
            Err(PositionError::MultipleKings {
                color: Color::White,
                count: 2
            })
        );
    }

    #[test]
    fn rejects_pawn_on_back_rank() {
        assert_eq!(
            Position::from_fen("4k2P/8/8/8/8/8/8/4K3 w - - 0 1"),
            Err(PositionError::PawnOnBackRank(sq("h8")))
        );
    }

    #[test]
    fn rejects_side_not_to_move_in_check() {
        assert!(Position::from_fen("4k3/8/8/8/8/8/8/4R1K1 b - - 0 1").is_ok());
        assert_eq!(
            Position::from_fen("4k3/8/8/8/8/8/8/4R1K1 w - - 0 1"),
            Err(PositionError::OpponentInCheck(Color::Black))
        );
    }

    #[test]
    fn rejects_en_passant_without_pawn() {
        assert_eq!(
            Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - d6 0 1"),
            Err(PositionError::InvalidEnPassant(sq("d6")))
        );
        assert_eq!(
            Position::from_fen("4k3/8/8/3p4/8/8/8/4K3 b - d6 0 1"),
            Err(PositionError::InvalidEnPassant(sq("d6")))
        );
    }

    #[test]
    fn fen_errors_pass_through() {
        assert!(matches!(
            Position::from_fen("not a fen"),
            Err(PositionError::Fen(FenError::InvalidPartCount(3)))
        ));
    }

    #[test]
    fn castling_rights_follow_pieces() {
        let pos = Position::from_fen("r3k3/8/8/8/8/8/8/4K2R w KQkq - 0 1").unwrap();
        assert_eq!(pos.castling_rights().to_string(), "Kq");
        let moved_king = Position::from_fen("r6r/4k3/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        assert_eq!(moved_king.castling_rights().to_string(), "KQ");
    }

    #[test]
    fn display_draws_board() {
        let text = Position::startpos().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "8 r n b q k b n r ");
        assert_eq!(lines[4], "4 . . . . . . . . ");
        assert_eq!(lines[7], "1 R N B Q K B N R ");
        assert_eq!(lines[8], "  a b c d e f g h");
        assert!(text.contains("side to move: white"));
        assert!(text.contains("castling:     KQkq"));
        assert!(text.ends_with("en passant:   -"));
    }
}
