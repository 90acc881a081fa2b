//! Goal predicates.
//!
//! Two notions of "solved" coexist and are kept apart on purpose:
//! - `GoalMode::GlobalOrder`: the grid equals its own stable sort by
//!   `(r, g, b, alpha)`, tile identity included.
//! - `GoalMode::RowGradient`: each row is a single color with a monotonic alpha
//!   gradient, in the direction set by row 0. Weaker than `GlobalOrder`: it ignores
//!   tile ids and the order of rows.
use crate::engine::{Tile, TileState};

/// Which predicate decides that a state is solved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum GoalMode {
    /// Exact match with the canonical sorted arrangement.
    #[default]
    GlobalOrder,
    /// Per-row single color with monotonic alpha.
    RowGradient,
}

impl GoalMode {
    pub fn is_solved(&self, state: &TileState) -> bool {
        match self {
            GoalMode::GlobalOrder => is_global_order_solved(state),
            GoalMode::RowGradient => is_row_gradient_solved(state),
        }
    }
}

/// Direction of the alpha gradient along each row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GradientDirection {
    Ascending,
    Descending,
}

/// Returns the canonical target arrangement: the tiles of `state`, stably sorted by
/// `(r, g, b, alpha)`.
///
/// Tiles that tie on all four keys keep their current relative order, so sorting a
/// solved state returns it unchanged.
pub fn global_order_target(state: &TileState) -> Vec<Tile> {
    let mut target = state.tiles().to_vec();
    target.sort_by(|a, b| a.color_order(b));
    target
}

/// Checks the state against its canonical sorted arrangement, tile by tile.
///
/// # Examples
/// ```
/// use hue_puzzle_solver::engine::{Rgb, TileState};
/// use hue_puzzle_solver::goal::is_global_order_solved;
/// let solved = TileState::from_palette(&[Rgb::new(0, 0, 0), Rgb::new(9, 9, 9)]).unwrap();
/// assert!(is_global_order_solved(&solved));
/// assert!(!is_global_order_solved(&solved.swapped(0, 3)));
/// ```
pub fn is_global_order_solved(state: &TileState) -> bool {
    let target = global_order_target(state);
    state.tiles().iter().zip(&target).all(|(tile, goal)| {
        tile.id == goal.id
            && tile.color == goal.color
            && tile.alpha.to_bits() == goal.alpha.to_bits()
    })
}

/// Reads the gradient direction off row 0: ascending if its first alpha is below its
/// last, descending otherwise.
pub fn gradient_direction(state: &TileState) -> GradientDirection {
    let first = state.get_tile(0, 0);
    let last = state.get_tile(0, state.grid_size() - 1);
    if first.alpha < last.alpha {
        GradientDirection::Ascending
    } else {
        GradientDirection::Descending
    }
}

/// Checks that every row is one color with alphas ordered in the row-0 direction.
pub fn is_row_gradient_solved(state: &TileState) -> bool {
    let direction = gradient_direction(state);
    state.rows().all(|row| {
        row.windows(2).all(|pair| {
            let (left, right) = (&pair[0], &pair[1]);
            let ordered = match direction {
                GradientDirection::Ascending => right.alpha >= left.alpha,
                GradientDirection::Descending => right.alpha <= left.alpha,
            };
            ordered && right.same_color(left)
        })
    })
}
