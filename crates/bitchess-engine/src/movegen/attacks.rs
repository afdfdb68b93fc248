//! Attack table generation and lookup for all piece types.

use crate::Bitboard;
use bitchess_core::{Color, Square};
use std::sync::OnceLock;

pub use super::magics::{bishop_attacks, queen_attacks, rook_attacks};

/// The eight ray directions, in compass order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    North = 0,
    NorthEast = 1,
    East = 2,
    SouthEast = 3,
    South = 4,
    SouthWest = 5,
    West = 6,
    NorthWest = 7,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// (rank delta, file delta) of one step.
    const fn delta(self) -> (i8, i8) {
        match self {
            Direction::North => (1, 0),
            Direction::NorthEast => (1, 1),
            Direction::East => (0, 1),
            Direction::SouthEast => (-1, 1),
            Direction::South => (-1, 0),
            Direction::SouthWest => (-1, -1),
            Direction::West => (0, -1),
            Direction::NorthWest => (1, -1),
        }
    }

    /// True if stepping in this direction increases the square index.
    #[inline]
    pub const fn is_positive(self) -> bool {
        matches!(
            self,
            Direction::North | Direction::NorthEast | Direction::East | Direction::NorthWest
        )
    }

    #[inline]
    pub const fn opposite(self) -> Direction {
        Self::ALL[(self as usize + 4) % 8]
    }
}

/// Rays to the board edge [direction][square], origin excluded.
const RAYS: [[Bitboard; 64]; 8] = compute_rays();

/// Precomputed knight attack tables.
const KNIGHT_ATTACKS: [Bitboard; 64] = compute_leaper_attacks(&[
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
]);

/// Precomputed king attack tables.
const KING_ATTACKS: [Bitboard; 64] = compute_leaper_attacks(&[
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
]);

/// Precomputed pawn attack tables [color][square].
const PAWN_ATTACKS: [[Bitboard; 64]; 2] = [
    compute_leaper_attacks(&[(1, 1), (1, -1)]),
    compute_leaper_attacks(&[(-1, 1), (-1, -1)]),
];

/// Precomputed pawn push targets [color][square].
const PAWN_PUSHES: [[Bitboard; 64]; 2] = compute_pawn_pushes();

static IN_BETWEEN: OnceLock<Box<[[Bitboard; 64]; 64]>> = OnceLock::new();

/// Returns the ray from `sq` towards the board edge in `dir`, `sq` excluded.
#[inline]
pub fn ray(dir: Direction, sq: Square) -> Bitboard {
    RAYS[dir as usize][sq.index() as usize]
}

/// Returns knight attacks from the given square.
#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    KNIGHT_ATTACKS[sq.index() as usize]
}

/// Returns king attacks from the given square.
#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    KING_ATTACKS[sq.index() as usize]
}

/// Returns pawn attacks from the given square for the given color.
#[inline]
pub fn pawn_attacks(sq: Square, color: Color) -> Bitboard {
    PAWN_ATTACKS[color.index()][sq.index() as usize]
}

/// Returns the squares a pawn of `color` on `sq` could push to on an empty
/// board: one step forward, plus two steps from its starting rank.
#[inline]
pub fn pawn_pushes(sq: Square, color: Color) -> Bitboard {
    PAWN_PUSHES[color.index()][sq.index() as usize]
}

/// Squares strictly between `a` and `b` when they share a rank, file or
/// diagonal. Empty otherwise.
#[inline]
pub fn in_between(a: Square, b: Square) -> Bitboard {
    in_between_table()[a.index() as usize][b.index() as usize]
}

pub(crate) fn in_between_table() -> &'static [[Bitboard; 64]; 64] {
    IN_BETWEEN.get_or_init(|| {
        let mut table = Box::new([[Bitboard::EMPTY; 64]; 64]);
        for a in (0..64u8).filter_map(Square::from_index) {
            for dir in Direction::ALL {
                let back = dir.opposite();
                for b in ray(dir, a) {
                    table[a.index() as usize][b.index() as usize] = ray(dir, a) & ray(back, b);
                }
            }
        }
        tracing::debug!("in-between table built");
        table
    })
}

const fn compute_rays() -> [[Bitboard; 64]; 8] {
    let mut rays = [[Bitboard::EMPTY; 64]; 8];
    let mut d = 0;
    while d < 8 {
        let (dr, df) = Direction::ALL[d].delta();
        let mut sq = 0;
        while sq < 64 {
            let mut bb = 0u64;
            let mut r = (sq / 8) as i8 + dr;
            let mut f = (sq % 8) as i8 + df;
            while r >= 0 && r < 8 && f >= 0 && f < 8 {
                bb |= 1u64 << (r * 8 + f);
                r += dr;
                f += df;
            }
            rays[d][sq] = Bitboard(bb);
            sq += 1;
        }
        d += 1;
    }
    rays
}

const fn compute_leaper_attacks(offsets: &[(i8, i8)]) -> [Bitboard; 64] {
    let mut attacks = [Bitboard::EMPTY; 64];
    let mut sq = 0;
    while sq < 64 {
        let rank = (sq / 8) as i8;
        let file = (sq % 8) as i8;
        let mut bb = 0u64;
        let mut i = 0;
        while i < offsets.len() {
            let r = rank + offsets[i].0;
            let f = file + offsets[i].1;
            if r >= 0 && r < 8 && f >= 0 && f < 8 {
                bb |= 1u64 << (r * 8 + f);
            }
            i += 1;
        }
        attacks[sq] = Bitboard(bb);
        sq += 1;
    }
    attacks
}

const fn compute_pawn_pushes() -> [[Bitboard; 64]; 2] {
    let mut pushes = [[Bitboard::EMPTY; 64]; 2];
    let mut sq = 0;
    while sq < 64 {
        let rank = sq / 8;
        if rank < 7 {
            let mut bb = 1u64 << (sq + 8);
            if rank == 1 {
                bb |= 1u64 << (sq + 16);
            }
            pushes[0][sq] = Bitboard(bb);
        }
        if rank > 0 {
            let mut bb = 1u64 << (sq - 8);
            if rank == 6 {
                bb |= 1u64 << (sq - 16);
            }
            pushes[1][sq] = Bitboard(bb);
        }
        sq += 1;
    }
    pushes
}
