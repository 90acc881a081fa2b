//! Error type shared by the snapshot, parsing and host-input paths.
//!
//! A search that runs out of budget is not an error: it ends in
//! `SearchOutcome::Exhausted` (see `solver`). Everything here is detected
//! synchronously before a search starts or when the host rejects input.

/// Errors raised while building a `TileState` or driving the live `Game`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PuzzleError {
    /// The tile count is not a perfect square, or the grid would be smaller than 2x2.
    #[error("invalid grid size: {len} tiles do not form an N x N grid with N >= 2")]
    InvalidGridSize { len: usize },
    /// A tile is missing a field, has an out-of-range or duplicate id, or a bad alpha.
    #[error("malformed tile at index {index}: {reason}")]
    MalformedTile { index: usize, reason: String },
    /// A manual move was attempted while a solve session holds the grid.
    #[error("a solve is in progress; manual moves are disabled")]
    SolveInProgress,
    /// A cell outside the grid was selected.
    #[error("cell {index} is outside the grid")]
    InvalidCell { index: usize },
}

impl PuzzleError {
    pub(crate) fn malformed(index: usize, reason: impl Into<String>) -> Self {
        PuzzleError::MalformedTile {
            index,
            reason: reason.into(),
        }
    }
}
