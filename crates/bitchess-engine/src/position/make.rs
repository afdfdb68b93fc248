//! Applying and undoing moves in place.

use bitchess_core::{CastleSide, ColoredPiece, Move, MoveFlag, Piece, Square};

use super::{castle_rook_squares, Position};

impl Position {
    /// Plays `m` on this position.
    ///
    /// `m` must come from [`crate::legal_moves`] on the current position.
    /// Nothing is checked in release builds.
    pub fn make_move(&mut self, m: Move) {
        let us = self.side_to_move;
        let from = m.source();
        let to = m.target();
        let piece = m.piece();
        debug_assert_eq!(self.piece_on(from), Some(piece), "{} does not match the board", m);
        debug_assert_eq!(piece.color, us, "{} moves the wrong side", m);

        let rights = self.castling_rights();
        self.castling.push(rights);
        self.en_passant.push(None);

        match m.flag() {
            MoveFlag::None => {
                debug_assert_eq!(self.piece_on(to), m.capture(), "{} capture mismatch", m);
                self.remove_piece(from, piece);
                if let Some(captured) = m.capture() {
                    self.remove_piece(to, captured);
                }
                self.put_piece(to, m.promotion().unwrap_or(piece));
            }
            MoveFlag::KingCastle | MoveFlag::QueenCastle => {
                self.move_piece(from, to, piece);
                let (rook_from, rook_to) = castle_rook_squares(us, castle_side(m.flag()));
                self.move_piece(rook_from, rook_to, ColoredPiece::new(Piece::Rook, us));
            }
            MoveFlag::EnPassant => {
                self.move_piece(from, to, piece);
                let captured = ColoredPiece::new(Piece::Pawn, us.opposite());
                debug_assert_eq!(m.capture(), Some(captured));
                self.remove_piece(Square::new(to.file(), from.rank()), captured);
            }
            MoveFlag::DoublePush => {
                self.move_piece(from, to, piece);
                if let Some(top) = self.en_passant.last_mut() {
                    *top = passed_square(from, to);
                }
            }
        }

        let rights = self.surviving_castling_rights(rights);
        if let Some(top) = self.castling.last_mut() {
            *top = rights;
        }
        self.side_to_move = us.opposite();
    }

    /// Takes back `m`, which must be the last move made on this position.
    pub fn unmake_move(&mut self, m: Move) {
        debug_assert!(self.castling.len() > 1, "unmake_move({}) with no move made", m);
        if self.castling.len() > 1 {
            self.castling.pop();
            self.en_passant.pop();
        }
        self.side_to_move = self.side_to_move.opposite();

        let us = self.side_to_move;
        let from = m.source();
        let to = m.target();
        let piece = m.piece();
        debug_assert_eq!(piece.color, us, "{} was not played by the side to move", m);

        match m.flag() {
            MoveFlag::None => {
                self.remove_piece(to, m.promotion().unwrap_or(piece));
                self.put_piece(from, piece);
                if let Some(captured) = m.capture() {
                    self.put_piece(to, captured);
                }
            }
            MoveFlag::KingCastle | MoveFlag::QueenCastle => {
                self.move_piece(to, from, piece);
                let (rook_from, rook_to) = castle_rook_squares(us, castle_side(m.flag()));
                self.move_piece(rook_to, rook_from, ColoredPiece::new(Piece::Rook, us));
            }
            MoveFlag::EnPassant => {
                self.move_piece(to, from, piece);
                let captured = ColoredPiece::new(Piece::Pawn, us.opposite());
                self.put_piece(Square::new(to.file(), from.rank()), captured);
            }
            MoveFlag::DoublePush => {
                self.move_piece(to, from, piece);
            }
        }
    }
}

#[inline]
fn castle_side(flag: MoveFlag) -> CastleSide {
    if flag == MoveFlag::KingCastle {
        CastleSide::King
    } else {
        CastleSide::Queen
    }
}

/// The square a double-pushed pawn skipped over.
#[inline]
fn passed_square(from: Square, to: Square) -> Option<Square> {
    Square::from_index((from.index() + to.index()) / 2)
}
