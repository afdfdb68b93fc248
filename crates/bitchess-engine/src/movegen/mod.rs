//! Move generation.
//!
//! This module provides legal move generation for chess positions using
//! magic bitboards for efficient sliding piece attack calculation. Moves are
//! generated legal directly: checkers, pins and the squares the enemy attacks
//! are worked out first, so no move has to be tried and taken back.

mod attacks;
mod checks;
mod magics;
pub mod perft;

use crate::position::{castle_king_home, castle_king_target, castle_rook_squares};
use crate::{Bitboard, Position};
use bitchess_core::{CastleSide, Color, ColoredPiece, Move, MoveFlag, Piece, Square};

pub use attacks::{
    bishop_attacks, in_between, king_attacks, knight_attacks, pawn_attacks, pawn_pushes,
    queen_attacks, ray, rook_attacks, Direction,
};
pub use checks::{
    attack_map, attackers_of, attacks_to_square, is_in_check, is_king_attacked, pin_masks,
    PinMasks,
};
pub use magics::{
    bishop_mask, classical_bishop_attacks, classical_rook_attacks, negative_ray_attacks,
    positive_ray_attacks, rook_mask, x_ray_bishop_attacks, x_ray_rook_attacks,
};

/// Builds the attack tables now instead of on first use.
pub(crate) fn init_tables() {
    magics::get_attack_tables();
    attacks::in_between_table();
}

/// A list of moves with a fixed maximum capacity.
///
/// Chess positions have at most 218 legal moves, so we use a fixed-size
/// array to avoid heap allocations during move generation.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; Self::MAX_MOVES],
    len: usize,
}

impl MoveList {
    /// Maximum number of legal moves in any chess position.
    pub const MAX_MOVES: usize = 256;

    /// Creates an empty move list.
    #[inline]
    pub const fn new() -> Self {
        MoveList {
            moves: [Move::NULL; Self::MAX_MOVES],
            len: 0,
        }
    }

    /// Adds a move to the list.
    #[inline]
    pub fn push(&mut self, m: Move) {
        debug_assert!(self.len < Self::MAX_MOVES);
        self.moves[self.len] = m;
        self.len += 1;
    }

    /// Returns the number of moves.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the list is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns a slice of the moves.
    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.as_slice().iter()
    }

    /// Clears the move list.
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Retains only moves for which the predicate returns true, keeping
    /// their order.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&Move) -> bool,
    {
        let mut write = 0;
        for read in 0..self.len {
            if f(&self.moves[read]) {
                self.moves[write] = self.moves[read];
                write += 1;
            }
        }
        self.len = write;
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        debug_assert!(index < self.len);
        &self.moves[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// Generates all legal moves for the given position.
pub fn generate_moves(position: &Position) -> MoveList {
    let mut moves = MoveList::new();
    legal_moves(position, &mut moves);
    moves
}

/// Clears `moves` and fills it with every legal move in `position`.
pub fn legal_moves(position: &Position, moves: &mut MoveList) {
    moves.clear();
    let gen = Generator::new(position);

    gen.king_moves(moves);

    let check_mask = match gen.checkers.count() {
        0 => Bitboard::FULL,
        1 => match gen.checkers.lsb() {
            Some(checker) => in_between(gen.king_sq, checker) | Bitboard::from_square(checker),
            None => return,
        },
        // Only the king can answer a double check.
        _ => return,
    };

    gen.pawn_moves(moves, check_mask);
    gen.piece_moves(moves, check_mask);
    gen.en_passant_moves(moves);

    if gen.checkers.is_empty() {
        gen.castling_moves(moves);
    }
}

/// Clears `moves` and fills it with the legal captures in `position`,
/// en passant included.
pub fn legal_captures(position: &Position, moves: &mut MoveList) {
    legal_moves(position, moves);
    moves.retain(|m| m.is_capture());
}

/// Per-call facts shared by the piece generators.
struct Generator<'a> {
    position: &'a Position,
    us: Color,
    them: Color,
    king_sq: Square,
    own: Bitboard,
    enemy: Bitboard,
    occupied: Bitboard,
    checkers: Bitboard,
    /// Squares attacked by the enemy with our king lifted off the board.
    danger: Bitboard,
    pins: PinMasks,
}

impl<'a> Generator<'a> {
    fn new(position: &'a Position) -> Self {
        let us = position.side_to_move();
        let king_sq = position.king_square(us);
        let occupied = position.occupied();
        Generator {
            position,
            us,
            them: us.opposite(),
            king_sq,
            own: position.occupancy(us),
            enemy: position.occupancy(us.opposite()),
            occupied,
            checkers: attacks_to_square(position, king_sq),
            danger: attack_map(position, occupied ^ Bitboard::from_square(king_sq)),
            pins: pin_masks(position, king_sq),
        }
    }

    #[inline]
    fn piece(&self, piece: Piece) -> ColoredPiece {
        ColoredPiece::new(piece, self.us)
    }

    /// Pushes a plain move or capture to every square in `targets`.
    #[inline]
    fn push_targets(&self, moves: &mut MoveList, from: Square, targets: Bitboard, piece: ColoredPiece) {
        for to in targets {
            moves.push(Move::new(
                from,
                to,
                piece,
                self.position.piece_on(to),
                None,
                MoveFlag::None,
            ));
        }
    }

    fn king_moves(&self, moves: &mut MoveList) {
        let targets = king_attacks(self.king_sq) & !self.own & !self.danger;
        self.push_targets(moves, self.king_sq, targets, self.piece(Piece::King));
    }

    /// Knight, bishop, rook and queen moves.
    ///
    /// Pinned sliders keep moving along their pin line; a pinned piece can
    /// never block or capture a checker, so under check only free pieces move.
    fn piece_moves(&self, moves: &mut MoveList, check_mask: Bitboard) {
        let pinned = self.pins.all() & self.own;
        let free = !pinned;
        let in_check = self.checkers.is_not_empty();
        let allowed = !self.own & check_mask;

        for from in self.position.pieces_of(Piece::Knight, self.us) & free {
            self.push_targets(moves, from, knight_attacks(from) & allowed, self.piece(Piece::Knight));
        }

        for kind in [Piece::Bishop, Piece::Rook, Piece::Queen] {
            let piece = self.piece(kind);
            let pieces = self.position.pieces(piece);
            let diagonal = kind != Piece::Rook;
            let orthogonal = kind != Piece::Bishop;

            for from in pieces & free {
                let mut targets = Bitboard::EMPTY;
                if diagonal {
                    targets |= bishop_attacks(from, self.occupied);
                }
                if orthogonal {
                    targets |= rook_attacks(from, self.occupied);
                }
                self.push_targets(moves, from, targets & allowed, piece);
            }

            if in_check {
                continue;
            }
            if diagonal {
                for from in pieces & self.pins.diagonal {
                    let targets = bishop_attacks(from, self.occupied) & !self.own & self.pins.diagonal;
                    self.push_targets(moves, from, targets, piece);
                }
            }
            if orthogonal {
                for from in pieces & self.pins.orthogonal {
                    let targets = rook_attacks(from, self.occupied) & !self.own & self.pins.orthogonal;
                    self.push_targets(moves, from, targets, piece);
                }
            }
        }
    }

    /// Pawn pushes and captures (en passant excluded).
    ///
    /// A pawn pinned along a file may still push; one pinned along a diagonal
    /// may only capture its pinner. Neither can move while in check.
    fn pawn_moves(&self, moves: &mut MoveList, check_mask: Bitboard) {
        let pawns = self.position.pieces_of(Piece::Pawn, self.us);
        let in_check = self.checkers.is_not_empty();

        for from in pawns {
            let (push_mask, capture_mask) = if self.pins.orthogonal.contains(from) {
                if in_check {
                    continue;
                }
                (self.pins.orthogonal, Bitboard::EMPTY)
            } else if self.pins.diagonal.contains(from) {
                if in_check {
                    continue;
                }
                (Bitboard::EMPTY, self.pins.diagonal)
            } else {
                (check_mask, check_mask)
            };

            let targets = (self.pawn_push_targets(from) & push_mask)
                | (pawn_attacks(from, self.us) & self.enemy & capture_mask);
            self.push_pawn_targets(moves, from, targets);
        }
    }

    /// Empty squares a pawn can advance to, single and double step.
    #[inline]
    fn pawn_push_targets(&self, from: Square) -> Bitboard {
        let pushes = pawn_pushes(from, self.us);
        // The single-step square is the push target adjacent to the pawn.
        let single = pushes & king_attacks(from);
        if (single & self.occupied).is_not_empty() {
            Bitboard::EMPTY
        } else {
            pushes & !self.occupied
        }
    }

    fn push_pawn_targets(&self, moves: &mut MoveList, from: Square, targets: Bitboard) {
        let pawn = self.piece(Piece::Pawn);
        let promotion_rank = self.us.promotion_rank();
        for to in targets {
            let capture = self.position.piece_on(to);
            if to.rank().index() == promotion_rank {
                for promotion in Piece::PROMOTIONS {
                    moves.push(Move::new(
                        from,
                        to,
                        pawn,
                        capture,
                        Some(self.piece(promotion)),
                        MoveFlag::None,
                    ));
                }
            } else {
                let flag = if from.index().abs_diff(to.index()) == 16 {
                    MoveFlag::DoublePush
                } else {
                    MoveFlag::None
                };
                moves.push(Move::new(from, to, pawn, capture, None, flag));
            }
        }
    }

    /// En passant captures, each checked by replaying it on a scratch
    /// occupancy and testing whether our king would then be attacked.
    fn en_passant_moves(&self, moves: &mut MoveList) {
        let Some(ep) = self.position.en_passant() else {
            return;
        };
        let pawn = self.piece(Piece::Pawn);
        let captured = ColoredPiece::new(Piece::Pawn, self.them);

        for from in pawn_attacks(ep, self.them) & self.position.pieces(pawn) {
            let captured_sq = Square::new(ep.file(), from.rank());
            let occupied = (self.occupied
                ^ Bitboard::from_square(from)
                ^ Bitboard::from_square(captured_sq))
                | Bitboard::from_square(ep);
            if !self.attacked_after_en_passant(occupied, captured_sq) {
                moves.push(Move::new(from, ep, pawn, Some(captured), None, MoveFlag::EnPassant));
            }
        }
    }

    fn attacked_after_en_passant(&self, occupied: Bitboard, captured_sq: Square) -> bool {
        let position = self.position;
        let them = self.them;
        let queens = position.pieces_of(Piece::Queen, them);
        let rooks = position.pieces_of(Piece::Rook, them) | queens;
        let bishops = position.pieces_of(Piece::Bishop, them) | queens;
        let knights = position.pieces_of(Piece::Knight, them);
        let pawns = position.pieces_of(Piece::Pawn, them) & !Bitboard::from_square(captured_sq);

        (rook_attacks(self.king_sq, occupied) & rooks).is_not_empty()
            || (bishop_attacks(self.king_sq, occupied) & bishops).is_not_empty()
            || (knight_attacks(self.king_sq) & knights).is_not_empty()
            || (pawn_attacks(self.king_sq, self.us) & pawns).is_not_empty()
    }

    fn castling_moves(&self, moves: &mut MoveList) {
        let rights = self.position.castling_rights();
        let king = self.piece(Piece::King);
        let home = castle_king_home(self.us);

        for side in CastleSide::ALL {
            if !rights.has(self.us, side) {
                continue;
            }
            let target = castle_king_target(self.us, side);
            let (rook_home, _) = castle_rook_squares(self.us, side);
            let must_be_empty = in_between(home, rook_home);
            let king_path = in_between(home, target) | Bitboard::from_square(target);
            if (must_be_empty & self.occupied).is_empty() && (king_path & self.danger).is_empty() {
                let flag = match side {
                    CastleSide::King => MoveFlag::KingCastle,
                    CastleSide::Queen => MoveFlag::QueenCastle,
                };
                moves.push(Move::new(home, target, king, None, None, flag));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn uci_moves(fen: &str) -> Vec<String> {
        let position = Position::from_fen(fen).unwrap();
        let mut list: Vec<String> = generate_moves(&position).iter().map(|m| m.to_uci()).collect();
        list.sort();
        list
    }

    #[test]
    fn movelist_push_and_iterate() {
        let mut list = MoveList::new();
        assert!(list.is_empty());
        let pawn = ColoredPiece::new(Piece::Pawn, Color::White);
        let m1 = Move::new(sq("e2"), sq("e4"), pawn, None, None, MoveFlag::DoublePush);
        let m2 = Move::new(sq("d2"), sq("d3"), pawn, None, None, MoveFlag::None);
        list.push(m1);
        list.push(m2);
        assert_eq!(list.len(), 2);
        assert_eq!(list[0], m1);
        assert_eq!(list[1], m2);
        assert_eq!(list.iter().count(), 2);

        list.retain(|m| m.flag() == MoveFlag::None);
        assert_eq!(list.as_slice(), &[m2]);
        list.clear();
        assert!(list.is_empty());
        assert!(MoveList::default().is_empty());
    }

    #[test]
    fn startpos_has_twenty_moves() {
        let position = Position::startpos();
        let moves = generate_moves(&position);
        assert_eq!(moves.len(), 20);
        let doubles = moves.iter().filter(|m| m.flag() == MoveFlag::DoublePush).count();
        assert_eq!(doubles, 8);
    }

    #[test]
    fn legal_moves_clears_previous_contents() {
        let position = Position::startpos();
        let mut moves = MoveList::new();
        legal_moves(&position, &mut moves);
        legal_moves(&position, &mut moves);
        assert_eq!(moves.len(), 20);
    }

    #[test]
    fn double_check_allows_only_king_moves() {
        let position = Position::from_fen("4k3/8/8/8/1b6/3R4/8/r3K3 w - - 0 1").unwrap();
        let moves = generate_moves(&position);
        assert!(!moves.is_empty());
        assert!(moves.iter().all(|m| m.piece().piece == Piece::King));
    }

    #[test]
    fn single_check_moves_block_capture_or_step_aside() {
        // The e8 rook checks down the file; the f3 knight can only block on e5.
        let position = Position::from_fen("4r1k1/8/8/8/8/5N2/8/4K3 w - - 0 1").unwrap();
        let moves = generate_moves(&position);
        let mask = in_between(Square::E1, Square::E8) | Bitboard::from_square(Square::E8);
        for m in moves.iter() {
            assert!(m.piece().piece == Piece::King || mask.contains(m.target()), "{}", m);
        }
        let blocks: Vec<String> = moves
            .iter()
            .filter(|m| m.piece().piece == Piece::Knight)
            .map(|m| m.to_uci())
            .collect();
        assert_eq!(blocks, vec!["f3e5"]);
    }

    #[test]
    fn king_cannot_retreat_along_check_ray() {
        let moves = uci_moves("4k3/8/8/8/8/8/8/r3K3 w - - 0 1");
        assert!(!moves.contains(&"e1f1".to_string()));
        assert!(moves.contains(&"e1e2".to_string()));
    }

    #[test]
    fn pinned_pieces_stay_on_pin_line() {
        // Rook e2 pinned by the e8 rook, bishop c3 pinned by the a5 bishop.
        let moves = uci_moves("k3r3/8/8/b7/8/2B5/4R3/4K3 w - - 0 1");
        let rook: Vec<&String> = moves.iter().filter(|m| m.starts_with("e2")).collect();
        assert_eq!(rook.len(), 6);
        assert!(rook.iter().all(|m| m.as_bytes()[2] == b'e'));
        let bishop: Vec<&String> = moves.iter().filter(|m| m.starts_with("c3")).collect();
        assert_eq!(bishop, vec!["c3a5", "c3b4", "c3d2"]);
    }

    #[test]
    fn pinned_knight_never_moves() {
        let moves = uci_moves("k3r3/8/8/8/8/8/4N3/4K3 w - - 0 1");
        assert!(moves.iter().all(|m| !m.starts_with("e2")));
    }

    #[test]
    fn pinned_pawns_by_family() {
        // File pin: push only. Diagonal pin: capture the pinner only.
        let moves = uci_moves("k3r3/8/8/8/8/3p4/4P3/4K3 w - - 0 1");
        let pawn: Vec<&String> = moves.iter().filter(|m| m.starts_with("e2")).collect();
        assert_eq!(pawn, vec!["e2e3", "e2e4"]);

        let moves = uci_moves("k7/8/8/8/8/2b1p3/3P4/4K3 w - - 0 1");
        let pawn: Vec<&String> = moves.iter().filter(|m| m.starts_with("d2")).collect();
        assert_eq!(pawn, vec!["d2c3"]);
    }

    #[test]
    fn diagonally_pinned_pawn_cannot_push_onto_file_pin_line() {
        // c2 is pinned by the b1 bishop. Its push square c3 lies inside the
        // rook's pin on the knight, which must not make the push legal.
        let moves = uci_moves("k7/8/8/8/8/rN1K4/2P5/1b6 w - - 0 1");
        assert!(moves.iter().all(|m| !m.starts_with("c2")));
        assert!(moves.iter().all(|m| !m.starts_with("b3")));
    }

    #[test]
    fn promotions_cover_four_pieces() {
        let position = Position::from_fen("8/P7/8/8/8/8/8/4K2k w - - 0 1").unwrap();
        let moves = generate_moves(&position);
        let promotions: Vec<Piece> = moves
            .iter()
            .filter_map(|m| m.promotion().map(|p| p.piece))
            .collect();
        assert_eq!(promotions, Piece::PROMOTIONS.to_vec());
    }

    #[test]
    fn en_passant_available() {
        let moves = uci_moves("rnbqkbnr/pppp1ppp/8/4pP2/8/8/PPPPP1PP/RNBQKBNR w KQkq e6 0 1");
        assert!(moves.contains(&"f5e6".to_string()));
    }

    #[test]
    fn en_passant_horizontal_discovered_check() {
        // Removing both pawns from rank 5 would expose the king to the rook.
        let moves = uci_moves("8/8/8/K2pP2r/8/8/8/7k w - d6 0 1");
        assert!(!moves.contains(&"e5d6".to_string()));
    }

    #[test]
    fn en_passant_captures_checking_pawn() {
        let moves = uci_moves("8/8/8/2k5/3Pp3/8/8/4K3 b - d3 0 1");
        assert!(moves.contains(&"e4d3".to_string()));
    }

    #[test]
    fn en_passant_cannot_ignore_knight_check() {
        let moves = uci_moves("8/8/8/3pP3/8/5n2/8/4K2k w - d6 0 1");
        assert!(!moves.contains(&"e5d6".to_string()));
    }

    #[test]
    fn castling_both_sides() {
        let moves = uci_moves("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1");
        assert!(moves.contains(&"e1g1".to_string()));
        assert!(moves.contains(&"e1c1".to_string()));
    }

    #[test]
    fn no_castling_through_attacked_square() {
        let moves = uci_moves("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(!moves.contains(&"e1g1".to_string()));
        assert!(moves.contains(&"e1c1".to_string()));

        let moves = uci_moves("3rk3/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(moves.contains(&"e1g1".to_string()));
        assert!(!moves.contains(&"e1c1".to_string()));

        let moves = uci_moves("4k3/8/8/8/8/8/8/R3K1r1 w Q - 0 1");
        assert!(!moves.contains(&"e1c1".to_string()));
    }

    #[test]
    fn queenside_castle_allowed_when_only_b_file_attacked() {
        let moves = uci_moves("1r2k3/8/8/8/8/8/8/R3K3 w Q - 0 1");
        assert!(moves.contains(&"e1c1".to_string()));
        let moves = uci_moves("4k3/8/8/8/8/8/8/RN2K3 w Q - 0 1");
        assert!(!moves.contains(&"e1c1".to_string()));
    }

    #[test]
    fn legal_captures_are_a_subset() {
        let position = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        let all = generate_moves(&position);
        let mut captures = MoveList::new();
        legal_captures(&position, &mut captures);
        assert_eq!(captures.len(), 8);
        assert!(captures.iter().all(|m| m.is_capture() && all.as_slice().contains(m)));
        assert_eq!(
            captures.len(),
            all.iter().filter(|m| m.is_capture()).count()
        );
    }
}
