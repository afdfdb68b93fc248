//! Perft reference counts for the standard test positions.
//!
//! The deeper depths take a while in debug builds and are ignored by default.
//! Run with: `cargo test -p bitchess-engine --release --test perft -- --ignored`

use bitchess_engine::{perft, perft_divide, Position};

const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
const POSITION_4: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
const POSITION_4_MIRRORED: &str =
    "r2q1rk1/pP1p2pp/Q4n2/bbp1p3/Np6/1B3NBn/pPPP1PPP/R3K2R b KQ - 0 1";
const POSITION_5: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 0 1";

fn nodes(fen: &str, depth: u32) -> u64 {
    bitchess_engine::init();
    let mut position = Position::from_fen(fen).unwrap();
    let before = position.clone();
    let count = perft(&mut position, depth);
    assert_eq!(position, before, "perft left {} modified", fen);
    count
}

#[test]
fn startpos_shallow() {
    assert_eq!(nodes(STARTPOS, 1), 20);
    assert_eq!(nodes(STARTPOS, 2), 400);
    assert_eq!(nodes(STARTPOS, 3), 8_902);
    assert_eq!(nodes(STARTPOS, 4), 197_281);
}

#[test]
#[ignore = "slow in debug builds"]
fn startpos_depth_5() {
    assert_eq!(nodes(STARTPOS, 5), 4_865_609);
}

#[test]
#[ignore = "slow in debug builds"]
fn startpos_depth_6() {
    assert_eq!(nodes(STARTPOS, 6), 119_060_324);
}

#[test]
#[ignore = "slow in debug builds"]
fn kiwipete_depth_4() {
    assert_eq!(nodes(KIWIPETE, 4), 4_085_603);
}

#[test]
#[ignore = "slow in debug builds"]
fn position3_depth_5() {
    assert_eq!(nodes(POSITION_3, 5), 674_624);
}

#[test]
fn position4_mirror_matches() {
    for depth in 1..=3 {
        assert_eq!(nodes(POSITION_4, depth), nodes(POSITION_4_MIRRORED, depth));
    }
}

#[test]
#[ignore = "slow in debug builds"]
fn position4_depth_4() {
    assert_eq!(nodes(POSITION_4, 4), 422_333);
}

#[test]
#[ignore = "slow in debug builds"]
fn position5_depth_4() {
    assert_eq!(nodes(POSITION_5, 4), 2_103_487);
}

#[test]
fn divide_matches_known_kiwipete_split() {
    let mut position = Position::from_fen(KIWIPETE).unwrap();
    let divide = perft_divide(&mut position, 3);
    let count = |uci: &str| {
        divide
            .iter()
            .find(|(m, _)| m.to_uci() == uci)
            .map(|&(_, n)| n)
            .unwrap_or_else(|| panic!("{} missing from divide", uci))
    };
    assert_eq!(count("e1g1"), 2_059);
    assert_eq!(count("e1c1"), 1_887);
    assert_eq!(count("d5e6"), 2_241);
    assert_eq!(divide.iter().map(|&(_, n)| n).sum::<u64>(), 97_862);
}
