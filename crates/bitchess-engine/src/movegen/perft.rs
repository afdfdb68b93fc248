//! Perft (performance test) for move generator validation.
//!
//! Perft counts the number of leaf nodes at a given depth, which can be
//! compared against known-correct values to validate the move generator.
//! The walk plays every move in place and takes it back, so the position is
//! left exactly as it was passed in.

use super::{legal_moves, MoveList};
use crate::Position;
use bitchess_core::Move;

/// Counts the number of leaf nodes at the given depth.
///
/// This is the standard perft function used to validate move generators.
pub fn perft(position: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut moves = MoveList::new();
    legal_moves(position, &mut moves);

    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;
    for &m in &moves {
        position.make_move(m);
        nodes += perft(position, depth - 1);
        position.unmake_move(m);
    }
    nodes
}

/// Perft with divide - node count below each root move, sorted by UCI text.
/// Useful for debugging to identify which moves have incorrect counts.
pub fn perft_divide(position: &mut Position, depth: u32) -> Vec<(Move, u64)> {
    if depth == 0 {
        return Vec::new();
    }

    let mut moves = MoveList::new();
    legal_moves(position, &mut moves);
    let mut results = Vec::with_capacity(moves.len());

    for &m in &moves {
        position.make_move(m);
        let nodes = perft(position, depth - 1);
        position.unmake_move(m);
        tracing::trace!(mv = %m, nodes, "divide");
        results.push((m, nodes));
    }

    results.sort_by_cached_key(|(m, _)| m.to_uci());
    results
}
