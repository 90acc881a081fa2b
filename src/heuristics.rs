use crate::engine::TileState;

/// Sums the Manhattan distance of every tile from its home cell.
///
/// A tile's home is `(id / grid_size, id % grid_size)`; its current position is its
/// index in the state decomposed the same way. The result is zero exactly when every
/// tile sits on its home cell.
///
/// # Examples
/// ```
/// use hue_puzzle_solver::engine::{Rgb, TileState};
/// use hue_puzzle_solver::heuristics::manhattan_distance;
/// let solved = TileState::from_palette(&[Rgb::new(1, 2, 3), Rgb::new(4, 5, 6)]).unwrap();
/// assert_eq!(manhattan_distance(&solved), 0);
/// // Swapping opposite corners moves two tiles by 2 each.
/// assert_eq!(manhattan_distance(&solved.swapped(0, 3)), 4);
/// ```
pub fn manhattan_distance(state: &TileState) -> u32 {
    let grid_size = state.grid_size();
    state
        .tiles()
        .iter()
        .enumerate()
        .map(|(index, tile)| {
            let (row, col) = (index / grid_size, index % grid_size);
            let (home_row, home_col) = (tile.id / grid_size, tile.id % grid_size);
            (row.abs_diff(home_row) + col.abs_diff(home_col)) as u32
        })
        .sum()
}

/// Counts the tiles that are not on their home cell.
///
/// Coarser than `manhattan_distance`; the strategy evaluator reports both.
pub fn misplaced_tiles(state: &TileState) -> u32 {
    state
        .tiles()
        .iter()
        .enumerate()
        .filter(|(index, tile)| tile.id != *index)
        .count() as u32
}
