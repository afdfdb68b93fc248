//! Magic bitboard tables for sliding piece attack generation.
//!
//! Magic bitboards use a perfect hashing technique to map blocker configurations
//! to precomputed attack bitboards in O(1) time. The tables are filled from the
//! classical ray-scan attacks, which are also exported for verification.

use super::attacks::{ray, Direction};
use crate::Bitboard;
use bitchess_core::Square;
use std::sync::OnceLock;

/// Magic entry for a single square.
#[derive(Debug, Clone, Copy)]
pub struct Magic {
    /// Mask of relevant blocker squares (excludes edges).
    pub mask: Bitboard,
    /// The magic multiplier for this square.
    pub factor: u64,
    /// Right shift amount (64 - number of bits in mask).
    pub shift: u8,
    /// Offset into the shared attack table.
    pub offset: usize,
}

impl Magic {
    const EMPTY: Magic = Magic {
        mask: Bitboard::EMPTY,
        factor: 0,
        shift: 0,
        offset: 0,
    };

    /// Computes the attack table index for a given occupancy.
    #[inline]
    fn index(&self, occupied: Bitboard) -> usize {
        let relevant = occupied & self.mask;
        self.offset + (relevant.0.wrapping_mul(self.factor) >> self.shift) as usize
    }
}

/// Stores all precomputed slider attack tables.
pub struct AttackTables {
    /// Rook entries followed by bishop entries.
    pub attacks: Vec<Bitboard>,
    pub rook_magics: [Magic; 64],
    pub bishop_magics: [Magic; 64],
}

static ATTACK_TABLES: OnceLock<AttackTables> = OnceLock::new();

/// Gets the global attack tables, initializing if necessary.
pub fn get_attack_tables() -> &'static AttackTables {
    ATTACK_TABLES.get_or_init(AttackTables::new)
}

const BISHOP_MAGICS: [u64; 64] = [
    0x89a1121896040240,
    0x2004844802002010,
    0x2068080051921000,
    0x62880a0220200808,
    0x0004042004000000,
    0x0100822020200011,
    0xc00444222012000a,
    0x0028808801216001,
    0x0400492088408100,
    0x0201c401040c0084,
    0x00840800910a0010,
    0x0000082080240060,
    0x2000840504006000,
    0x30010c4108405004,
    0x1008005410080802,
    0x8144042209100900,
    0x0208081020014400,
    0x004800201208ca00,
    0x0f18140408012008,
    0x1004002802102001,
    0x0841000820080811,
    0x0040200200a42008,
    0x0000800054042000,
    0x88010400410c9000,
    0x0520040470104290,
    0x1004040051500081,
    0x2002081833080021,
    0x000400c00c010142,
    0x941408200c002000,
    0x0658810000806011,
    0x0188071040440a00,
    0x4800404002011c00,
    0x0104442040404200,
    0x0004144200041000,
    0x0004022401120400,
    0x80c0040400080120,
    0x8040010040820802,
    0x0480810700020090,
    0x0102008e00040242,
    0x0809005202050100,
    0x8002024220104080,
    0x0431008804142000,
    0x0019001802081400,
    0x0200014208040080,
    0x3308082008200100,
    0x041010500040c020,
    0x4012020c04210308,
    0x208220a202004080,
    0x0111040120082000,
    0x6803040141280a00,
    0x2101004202410000,
    0x8200000041108022,
    0x0000021082088000,
    0x0002410204010040,
    0x0040100400809000,
    0x0822088220820214,
    0x0040808090012004,
    0x00910224040218c9,
    0x0402814422015008,
    0x0090014004842410,
    0x0001000042304105,
    0x0010008830412a00,
    0x2520081090008908,
    0x40102000a0a60140,
];

const ROOK_MAGICS: [u64; 64] = [
    0x0a8002c000108020,
    0x06c00049b0002001,
    0x0100200010090040,
    0x2480041000800801,
    0x0280028004000800,
    0x0900410008040022,
    0x0280020001001080,
    0x2880002041000080,
    0xa000800080400034,
    0x0004808020004000,
    0x2290802004801000,
    0x0411000d00100020,
    0x0402800800040080,
    0x000b000401004208,
    0x2409000100040200,
    0x0001002100004082,
    0x0022878001e24000,
    0x1090810021004010,
    0x0801030040200012,
    0x0500808008001000,
    0x0a08018014000880,
    0x8000808004000200,
    0x0201008080010200,
    0x0801020000441091,
    0x0000800080204005,
    0x1040200040100048,
    0x0000120200402082,
    0x0d14880480100080,
    0x0012040280080080,
    0x0100040080020080,
    0x9020010080800200,
    0x0813241200148449,
    0x0491604001800080,
    0x0100401000402001,
    0x4820010021001040,
    0x0400402202000812,
    0x0209009005000802,
    0x0810800601800400,
    0x4301083214000150,
    0x204026458e001401,
    0x0040204000808000,
    0x8001008040010020,
    0x8410820820420010,
    0x1003001000090020,
    0x0804040008008080,
    0x0012000810020004,
    0x1000100200040208,
    0x430000a044020001,
    0x0280009023410300,
    0x00e0100040002240,
    0x0000200100401700,
    0x2244100408008080,
    0x0008000400801980,
    0x0002000810040200,
    0x8010100228810400,
    0x2000009044210200,
    0x4080008040102101,
    0x0040002080411d01,
    0x2005524060000901,
    0x0502001008400422,
    0x489a000810200402,
    0x0001004400080a13,
    0x4000011008020084,
    0x0026002114058042,
];

impl AttackTables {
    /// Creates and initializes all attack tables.
    pub fn new() -> Self {
        let mut attacks = Vec::new();
        let mut rook_magics = [Magic::EMPTY; 64];
        let mut bishop_magics = [Magic::EMPTY; 64];

        for sq in (0..64u8).filter_map(Square::from_index) {
            rook_magics[sq.index() as usize] = fill_square(
                &mut attacks,
                sq,
                rook_mask(sq),
                ROOK_MAGICS[sq.index() as usize],
                classical_rook_attacks,
            );
        }
        let rook_entries = attacks.len();

        for sq in (0..64u8).filter_map(Square::from_index) {
            bishop_magics[sq.index() as usize] = fill_square(
                &mut attacks,
                sq,
                bishop_mask(sq),
                BISHOP_MAGICS[sq.index() as usize],
                classical_bishop_attacks,
            );
        }

        tracing::debug!(
            rook_entries,
            bishop_entries = attacks.len() - rook_entries,
            "magic attack tables built"
        );

        AttackTables {
            attacks,
            rook_magics,
            bishop_magics,
        }
    }
}

impl Default for AttackTables {
    fn default() -> Self {
        Self::new()
    }
}

/// Appends one square's slice of the shared table and returns its entry.
fn fill_square(
    attacks: &mut Vec<Bitboard>,
    sq: Square,
    mask: Bitboard,
    factor: u64,
    slow: fn(Square, Bitboard) -> Bitboard,
) -> Magic {
    let bits = mask.count() as u8;
    let magic = Magic {
        mask,
        factor,
        shift: 64 - bits,
        offset: attacks.len(),
    };
    attacks.resize(magic.offset + (1usize << bits), Bitboard::EMPTY);

    // Carry-Rippler enumeration of every subset of the mask.
    let mut blockers = Bitboard::EMPTY;
    loop {
        let expected = slow(sq, blockers);
        let slot = &mut attacks[magic.index(blockers)];
        // A slider always attacks at least one square, so EMPTY marks a free slot.
        debug_assert!(
            slot.is_empty() || *slot == expected,
            "destructive magic collision on {}",
            sq
        );
        *slot = expected;

        blockers = Bitboard(blockers.0.wrapping_sub(mask.0) & mask.0);
        if blockers.is_empty() {
            break;
        }
    }
    magic
}

/// Returns bishop attacks for a square given occupied squares.
#[inline]
pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    let tables = get_attack_tables();
    tables.attacks[tables.bishop_magics[sq.index() as usize].index(occupied)]
}

/// Returns rook attacks for a square given occupied squares.
#[inline]
pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    let tables = get_attack_tables();
    tables.attacks[tables.rook_magics[sq.index() as usize].index(occupied)]
}

/// Returns queen attacks (bishop + rook).
#[inline]
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    bishop_attacks(sq, occupied) | rook_attacks(sq, occupied)
}

/// Rook attacks through the first layer of `blockers`.
///
/// Returns only the squares that become visible once the blockers hit by a
/// plain rook scan are lifted.
#[inline]
pub fn x_ray_rook_attacks(sq: Square, occupied: Bitboard, blockers: Bitboard) -> Bitboard {
    let attacks = rook_attacks(sq, occupied);
    let first_layer = blockers & attacks;
    attacks ^ rook_attacks(sq, occupied ^ first_layer)
}

/// Bishop counterpart of [`x_ray_rook_attacks`].
#[inline]
pub fn x_ray_bishop_attacks(sq: Square, occupied: Bitboard, blockers: Bitboard) -> Bitboard {
    let attacks = bishop_attacks(sq, occupied);
    let first_layer = blockers & attacks;
    attacks ^ bishop_attacks(sq, occupied ^ first_layer)
}

/// Attacks along an index-increasing ray, stopping at the first blocker.
pub fn positive_ray_attacks(sq: Square, dir: Direction, occupied: Bitboard) -> Bitboard {
    debug_assert!(dir.is_positive());
    let attacks = ray(dir, sq);
    match (attacks & occupied).lsb() {
        Some(blocker) => attacks ^ ray(dir, blocker),
        None => attacks,
    }
}

/// Attacks along an index-decreasing ray, stopping at the first blocker.
pub fn negative_ray_attacks(sq: Square, dir: Direction, occupied: Bitboard) -> Bitboard {
    debug_assert!(!dir.is_positive());
    let attacks = ray(dir, sq);
    match (attacks & occupied).msb() {
        Some(blocker) => attacks ^ ray(dir, blocker),
        None => attacks,
    }
}

/// Rook attacks by scanning each ray. Slow; used to build and check the tables.
pub fn classical_rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    positive_ray_attacks(sq, Direction::North, occupied)
        | positive_ray_attacks(sq, Direction::East, occupied)
        | negative_ray_attacks(sq, Direction::South, occupied)
        | negative_ray_attacks(sq, Direction::West, occupied)
}

/// Bishop attacks by scanning each ray. Slow; used to build and check the tables.
pub fn classical_bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    positive_ray_attacks(sq, Direction::NorthEast, occupied)
        | positive_ray_attacks(sq, Direction::NorthWest, occupied)
        | negative_ray_attacks(sq, Direction::SouthEast, occupied)
        | negative_ray_attacks(sq, Direction::SouthWest, occupied)
}

/// Relevant rook blockers: every ray square except the last one on each ray.
pub fn rook_mask(sq: Square) -> Bitboard {
    (ray(Direction::North, sq) & !Bitboard::RANK_8)
        | (ray(Direction::South, sq) & !Bitboard::RANK_1)
        | (ray(Direction::East, sq) & !Bitboard::FILE_H)
        | (ray(Direction::West, sq) & !Bitboard::FILE_A)
}

/// Relevant bishop blockers: diagonal rays without the board edge.
pub fn bishop_mask(sq: Square) -> Bitboard {
    (ray(Direction::NorthEast, sq)
        | ray(Direction::NorthWest, sq)
        | ray(Direction::SouthEast, sq)
        | ray(Direction::SouthWest, sq))
        & !Bitboard::EDGES
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitchess_core::{File, Rank};

    #[test]
    fn bishop_attacks_empty_board() {
        let sq = Square::new(File::D, Rank::R4);
        assert_eq!(bishop_attacks(sq, Bitboard::EMPTY).count(), 13);
        assert_eq!(bishop_attacks(Square::A1, Bitboard::EMPTY).count(), 7);
    }

    #[test]
    fn rook_attacks_empty_board() {
        let sq = Square::new(File::D, Rank::R4);
        assert_eq!(rook_attacks(sq, Bitboard::EMPTY).count(), 14);
        assert_eq!(rook_attacks(Square::A1, Bitboard::EMPTY).count(), 14);
    }

    #[test]
    fn queen_attacks_empty_board() {
        let sq = Square::new(File::D, Rank::R4);
        assert_eq!(queen_attacks(sq, Bitboard::EMPTY).count(), 27);
    }

    #[test]
    fn bishop_attacks_with_blockers() {
        let sq = Square::new(File::D, Rank::R4);
        let e5 = Square::new(File::E, Rank::R5);
        let c3 = Square::new(File::C, Rank::R3);
        let blockers = Bitboard::from_square(e5) | Bitboard::from_square(c3);
        let attacks = bishop_attacks(sq, blockers);
        assert!(attacks.contains(e5));
        assert!(attacks.contains(c3));
        assert!(!attacks.contains(Square::new(File::F, Rank::R6)));
        assert!(!attacks.contains(Square::new(File::B, Rank::R2)));
    }

    #[test]
    fn rook_attacks_with_blockers() {
        let sq = Square::new(File::D, Rank::R4);
        let d6 = Square::new(File::D, Rank::R6);
        let attacks = rook_attacks(sq, Bitboard::from_square(d6));
        assert!(attacks.contains(d6));
        assert!(!attacks.contains(Square::new(File::D, Rank::R7)));
    }

    #[test]
    fn mask_sizes_match_shift_layout() {
        assert_eq!(rook_mask(Square::A1).count(), 12);
        assert_eq!(rook_mask(Square::new(File::D, Rank::R4)).count(), 10);
        assert_eq!(bishop_mask(Square::A1).count(), 6);
        assert_eq!(bishop_mask(Square::new(File::D, Rank::R4)).count(), 9);
        assert_eq!(bishop_mask(Square::new(File::B, Rank::R5)).count(), 5);
    }

    #[test]
    fn shared_table_size() {
        let tables = get_attack_tables();
        let rook: usize = (0..64u8)
            .filter_map(Square::from_index)
            .map(|sq| 1usize << rook_mask(sq).count())
            .sum();
        let bishop: usize = (0..64u8)
            .filter_map(Square::from_index)
            .map(|sq| 1usize << bishop_mask(sq).count())
            .sum();
        assert_eq!(rook, 102_400);
        assert_eq!(bishop, 5_248);
        assert_eq!(tables.attacks.len(), rook + bishop);
        assert_eq!(tables.bishop_magics[0].offset, rook);
    }

    #[test]
    fn classical_scans_stop_at_first_blocker() {
        let d4 = Square::new(File::D, Rank::R4);
        let occupied = Bitboard::from_square(Square::new(File::D, Rank::R6))
            | Bitboard::from_square(Square::new(File::B, Rank::R4));
        let north = positive_ray_attacks(d4, Direction::North, occupied);
        assert_eq!(north.count(), 2);
        let west = negative_ray_attacks(d4, Direction::West, occupied);
        assert_eq!(west.count(), 2);
        assert!(west.contains(Square::new(File::B, Rank::R4)));
    }

    #[test]
    fn x_ray_sees_past_first_blocker() {
        let e1 = Square::E1;
        let e2 = Square::new(File::E, Rank::R2);
        let e5 = Square::new(File::E, Rank::R5);
        let e7 = Square::new(File::E, Rank::R7);
        let occupied = Bitboard::from(e1) | Bitboard::from(e2) | Bitboard::from(e5) | Bitboard::from(e7);
        let xray = x_ray_rook_attacks(e1, occupied, Bitboard::from(e2));
        assert!(xray.contains(e5));
        assert!(!xray.contains(e2));
        assert!(!xray.contains(e7));
        assert!(x_ray_rook_attacks(e1, occupied, Bitboard::EMPTY).is_empty());
    }
}
