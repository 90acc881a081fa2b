//! Move generation.
//!
//! Two move models are supported:
//! - `MoveModel::Relocation`: take one tile out and reinsert it at another cell, the
//!   tiles in between shifting by one. Up to `n·(n-1)` candidates per state, with
//!   duplicates removed inside each expansion.
//! - `MoveModel::Swap`: exchange two cells. Exactly `n·(n-1)/2` distinct successors.
use crate::engine::TileState;
use std::collections::HashSet;
use std::fmt;

/// A single move on the grid, by cell index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Move {
    /// Remove the tile at `from` and reinsert it so that it lands on `to`.
    Relocate { from: usize, to: usize },
    /// Exchange the tiles at `a` and `b`.
    Swap { a: usize, b: usize },
}

impl Move {
    /// Applies the move to a copy of `state`.
    ///
    /// # Panics
    /// Panics if the move refers to a cell outside the grid.
    pub fn apply(&self, state: &TileState) -> TileState {
        match *self {
            Move::Relocate { from, to } => state.relocated(from, to),
            Move::Swap { a, b } => state.swapped(a, b),
        }
    }

    /// Returns the move that takes the result of `self` back to where it started.
    pub fn inverse(&self) -> Move {
        match *self {
            Move::Relocate { from, to } => Move::Relocate { from: to, to: from },
            Move::Swap { a, b } => Move::Swap { a, b },
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Relocate { from, to } => write!(f, "move {} -> {}", from, to),
            Move::Swap { a, b } => write!(f, "swap {} <-> {}", a, b),
        }
    }
}

/// Which moves the search may take from a state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum MoveModel {
    #[default]
    Relocation,
    Swap,
}

impl MoveModel {
    /// Lists every state reachable from `state` in one move, with the move taken.
    ///
    /// Relocation emits in `from`-major, `to`-ascending order and keeps only the
    /// first move producing each arrangement; swap emits pairs `a < b` in `a`-major
    /// order. The order is deterministic, which the depth-first search relies on.
    pub fn successors(&self, state: &TileState) -> Vec<(Move, TileState)> {
        match self {
            MoveModel::Relocation => relocation_successors(state),
            MoveModel::Swap => swap_successors(state),
        }
    }

    /// Upper bound on the number of successors for a grid of `n` tiles.
    pub fn max_branching(&self, n: usize) -> usize {
        match self {
            MoveModel::Relocation => n * n.saturating_sub(1),
            MoveModel::Swap => n * n.saturating_sub(1) / 2,
        }
    }
}

fn relocation_successors(state: &TileState) -> Vec<(Move, TileState)> {
    let n = state.len();
    let mut seen = HashSet::with_capacity(n * n);
    let mut successors = Vec::with_capacity(n * n);

    for from in 0..n {
        for to in (0..n).filter(|&to| to != from) {
            let mv = Move::Relocate { from, to };
            let next = mv.apply(state);
            // Moving a tile one cell over is the same as moving its neighbour back.
            if seen.insert(next.canonical_key()) {
                successors.push((mv, next));
            }
        }
    }

    successors
}

fn swap_successors(state: &TileState) -> Vec<(Move, TileState)> {
    let n = state.len();
    let mut successors = Vec::with_capacity(n * (n - 1) / 2);

    for a in 0..n {
        for b in (a + 1)..n {
            let mv = Move::Swap { a, b };
            successors.push((mv, mv.apply(state)));
        }
    }

    successors
}
