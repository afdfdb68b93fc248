//! Attack, check and pin queries against a position.

use super::attacks::{
    bishop_attacks, in_between, king_attacks, knight_attacks, pawn_attacks, rook_attacks,
};
use super::magics::{x_ray_bishop_attacks, x_ray_rook_attacks};
use crate::{Bitboard, Position};
use bitchess_core::{Color, Piece, Square};

/// Lines along which the side to move has pinned pieces.
///
/// Each mask holds, for every pin of that family, the squares between the
/// king and the pinner plus the pinner itself. A friendly piece inside a mask
/// is pinned and may only move within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PinMasks {
    /// Pins along ranks and files.
    pub orthogonal: Bitboard,
    /// Pins along diagonals.
    pub diagonal: Bitboard,
}

impl PinMasks {
    /// Every square of either family.
    #[inline]
    pub fn all(self) -> Bitboard {
        self.orthogonal | self.diagonal
    }
}

/// Pieces of color `by` attacking `sq`, with sliders blocked by `occupied`.
pub fn attackers_of(position: &Position, sq: Square, by: Color, occupied: Bitboard) -> Bitboard {
    let queens = position.pieces_of(Piece::Queen, by);
    (pawn_attacks(sq, by.opposite()) & position.pieces_of(Piece::Pawn, by))
        | (knight_attacks(sq) & position.pieces_of(Piece::Knight, by))
        | (king_attacks(sq) & position.pieces_of(Piece::King, by))
        | (bishop_attacks(sq, occupied) & (position.pieces_of(Piece::Bishop, by) | queens))
        | (rook_attacks(sq, occupied) & (position.pieces_of(Piece::Rook, by) | queens))
}

/// Enemy pieces (relative to the side to move) attacking `sq`.
///
/// On the mover's own king square this is the set of checkers.
#[inline]
pub fn attacks_to_square(position: &Position, sq: Square) -> Bitboard {
    attackers_of(
        position,
        sq,
        position.side_to_move().opposite(),
        position.occupied(),
    )
}

/// Every square attacked by the side not to move, with sliders blocked by
/// `occupied`.
///
/// Callers building the king-danger map pass an occupancy without the moving
/// king, so squares behind it along a checking line count as attacked.
pub fn attack_map(position: &Position, occupied: Bitboard) -> Bitboard {
    let them = position.side_to_move().opposite();
    let mut attacked = Bitboard::EMPTY;

    for from in position.pieces_of(Piece::Pawn, them) {
        attacked |= pawn_attacks(from, them);
    }
    for from in position.pieces_of(Piece::Knight, them) {
        attacked |= knight_attacks(from);
    }

    let queens = position.pieces_of(Piece::Queen, them);
    for from in position.pieces_of(Piece::Bishop, them) | queens {
        attacked |= bishop_attacks(from, occupied);
    }
    for from in position.pieces_of(Piece::Rook, them) | queens {
        attacked |= rook_attacks(from, occupied);
    }

    attacked | king_attacks(position.king_square(them))
}

/// Pins against the side to move's king on `king_sq`.
pub fn pin_masks(position: &Position, king_sq: Square) -> PinMasks {
    let us = position.side_to_move();
    let them = us.opposite();
    let occupied = position.occupied();
    let own = position.occupancy(us);
    let queens = position.pieces_of(Piece::Queen, them);

    let mut pins = PinMasks::default();

    let rook_pinners = x_ray_rook_attacks(king_sq, occupied, own)
        & (position.pieces_of(Piece::Rook, them) | queens);
    for pinner in rook_pinners {
        pins.orthogonal |= in_between(king_sq, pinner) | Bitboard::from_square(pinner);
    }

    let bishop_pinners = x_ray_bishop_attacks(king_sq, occupied, own)
        & (position.pieces_of(Piece::Bishop, them) | queens);
    for pinner in bishop_pinners {
        pins.diagonal |= in_between(king_sq, pinner) | Bitboard::from_square(pinner);
    }

    pins
}

/// Returns true if the king of the given color is attacked.
pub fn is_king_attacked(position: &Position, color: Color) -> bool {
    attackers_of(
        position,
        position.king_square(color),
        color.opposite(),
        position.occupied(),
    )
    .is_not_empty()
}

/// Returns true if the side to move is in check.
#[inline]
pub fn is_in_check(position: &Position) -> bool {
    is_king_attacked(position, position.side_to_move())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn squares(names: &[&str]) -> Bitboard {
        names
            .iter()
            .fold(Bitboard::EMPTY, |bb, name| bb | Bitboard::from_square(sq(name)))
    }

    #[test]
    fn no_checkers_at_start() {
        let position = Position::startpos();
        assert!(attacks_to_square(&position, Square::E1).is_empty());
        assert!(!is_in_check(&position));
        assert!(!is_king_attacked(&position, Color::Black));
    }

    #[test]
    fn double_check_reports_both_checkers() {
        let position = Position::from_fen("4k3/8/8/8/1b6/8/8/r3K3 w - - 0 1").unwrap();
        let checkers = attacks_to_square(&position, Square::E1);
        assert_eq!(checkers, squares(&["a1", "b4"]));
        assert!(is_in_check(&position));
    }

    #[test]
    fn attackers_of_honors_occupancy_override() {
        let position = Position::from_fen("4k3/8/8/8/8/8/4P3/4R1K1 b - - 0 1").unwrap();
        let e8 = Square::E8;
        assert!(attackers_of(&position, e8, Color::White, position.occupied()).is_empty());
        let without_pawn = position.occupied() ^ Bitboard::from_square(sq("e2"));
        assert_eq!(
            attackers_of(&position, e8, Color::White, without_pawn),
            Bitboard::from_square(Square::E1)
        );
    }

    #[test]
    fn attack_map_sees_through_removed_king() {
        let position = Position::from_fen("4k3/8/8/8/8/8/8/r3K3 w - - 0 1").unwrap();
        let king = Bitboard::from_square(Square::E1);
        let with_king = attack_map(&position, position.occupied());
        let without_king = attack_map(&position, position.occupied() ^ king);
        assert!(!with_king.contains(Square::F1));
        assert!(without_king.contains(Square::F1));
        assert!(without_king.contains(sq("d7")));
        assert!(without_king.contains(sq("a8")));
    }

    #[test]
    fn pins_by_family() {
        // The e8 rook gives check here; only the d2 pawn is pinned.
        let position = Position::from_fen("k3r3/8/8/b7/8/8/3P4/4K3 w - - 0 1").unwrap();
        let pins = pin_masks(&position, Square::E1);
        assert!(pins.orthogonal.is_empty());
        assert_eq!(pins.diagonal, squares(&["d2", "c3", "b4", "a5"]));

        let position = Position::from_fen("k3r3/8/8/b7/8/8/3PN3/4K3 w - - 0 1").unwrap();
        let pins = pin_masks(&position, Square::E1);
        assert_eq!(
            pins.orthogonal,
            squares(&["e2", "e3", "e4", "e5", "e6", "e7", "e8"])
        );
        assert_eq!(pins.all() & position.occupancy(Color::White), squares(&["d2", "e2"]));
    }

    #[test]
    fn two_blockers_are_not_pinned() {
        let position = Position::from_fen("k3r3/8/8/8/4P3/8/4N3/4K3 w - - 0 1").unwrap();
        assert_eq!(pin_masks(&position, Square::E1), PinMasks::default());
    }
}
