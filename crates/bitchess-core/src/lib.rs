//! Core types for chess.
//!
//! This crate provides the value types shared by the move generator and its
//! drivers:
//! - [`Piece`], [`ColoredPiece`] and [`Color`] for piece representation
//! - [`Square`], [`File`], and [`Rank`] for board coordinates
//! - [`CastlingRights`] for the four castling permissions
//! - [`Move`] for the packed move encoding
//! - FEN parsing and serialization through [`Fen`]

mod castling;
mod color;
mod fen;
mod mov;
mod piece;
mod square;

pub use castling::{CastleSide, CastlingRights};
pub use color::Color;
pub use fen::{Fen, FenError};
pub use mov::{Move, MoveFlag};
pub use piece::{ColoredPiece, Piece};
pub use square::{File, ParseSquareError, Rank, Square};
