//! Bitboard chess move generation.
//!
//! This crate provides:
//! - [`Bitboard`] - 64-bit board representation with efficient operations
//! - [`Position`] - Piece placement plus the castling and en passant history
//!   needed to take moves back
//! - Legal move generation driven by magic bitboards and check/pin analysis
//! - [`perft`] and [`perft_divide`] for validating the generator
//!
//! # Architecture
//!
//! The engine uses bitboards for piece representation - each piece type/color
//! combination has a 64-bit integer where each bit represents a square.
//! Sliding attacks come from magic lookup tables built once per process.
//! Moves are generated legal: checkers and pins are found first and each
//! piece is restricted accordingly, so nothing is made and then rejected.
//!
//! # Example
//!
//! ```
//! use bitchess_engine::{generate_moves, perft, Position};
//!
//! let mut position = Position::startpos();
//! let moves = generate_moves(&position);
//! assert_eq!(moves.len(), 20);
//!
//! let e4 = moves.iter().copied().find(|m| m.to_uci() == "e2e4").unwrap();
//! position.make_move(e4);
//! assert_eq!(perft(&mut position, 2), 600);
//! position.unmake_move(e4);
//! assert_eq!(position, Position::startpos());
//! ```

mod bitboard;
pub mod movegen;
mod position;

pub use bitboard::{Bitboard, BitboardIter};
pub use movegen::perft::{perft, perft_divide};
pub use movegen::{
    attack_map, attackers_of, bishop_attacks, generate_moves, in_between, is_in_check,
    is_king_attacked, king_attacks, knight_attacks, legal_captures, legal_moves, pawn_attacks,
    pin_masks, queen_attacks, rook_attacks, MoveList, PinMasks,
};
pub use position::{Position, PositionError};

/// Builds the global attack tables.
///
/// Tables are otherwise built on first use; calling this up front keeps that
/// cost out of timed code.
pub fn init() {
    movegen::init_tables();
}
