//! Core puzzle model for the hue sorting game.
//!
//! This module defines the game's fundamental components:
//! - `Rgb` and `Tile`: a colored, semi-transparent tile with a fixed home position.
//! - `TileState`: an immutable, validated snapshot of one grid arrangement.
//! - `StateKey`: the canonical serialization used for visited-set membership.
//! - `Game`: the live grid a player interacts with (selection, swaps, move counter,
//!   undo history, win check and the input lock held by solve sessions).
use crate::error::PuzzleError;
use crate::goal;
use crate::player::{GridHost, StepObserver};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::cmp::Ordering;
use std::fmt;

/// An opaque base color. Ordering is lexicographic on `(r, g, b)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Composites the color at `alpha` over a white background.
    ///
    /// Terminals cannot draw translucent cells, so this is what the board renders.
    fn over_white(&self, alpha: f64) -> (u8, u8, u8) {
        let blend = |c: u8| (255.0 - alpha * (255.0 - c as f64)).round() as u8;
        (blend(self.r), blend(self.g), blend(self.b))
    }
}

/// One tile of the puzzle.
///
/// `id` is the tile's home cell in row-major order
/// (`id = home_row * grid_size + home_col`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tile {
    pub id: usize,
    pub color: Rgb,
    pub alpha: f64,
}

impl Tile {
    pub const fn new(id: usize, color: Rgb, alpha: f64) -> Self {
        Tile { id, color, alpha }
    }

    /// Orders tiles by `(r, g, b, alpha)`, the order of a fully sorted grid.
    ///
    /// `id` does not take part; two tiles with the same color and alpha compare equal.
    pub fn color_order(&self, other: &Tile) -> Ordering {
        self.color
            .cmp(&other.color)
            .then_with(|| self.alpha.total_cmp(&other.alpha))
    }

    /// Returns true if both tiles carry the same base color.
    pub fn same_color(&self, other: &Tile) -> bool {
        self.color == other.color
    }
}

/// Deterministic byte encoding of a `TileState`.
///
/// Two states have equal keys iff they hold the same tiles (id, color and alpha bits)
/// in the same cells.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StateKey(Vec<u8>);

impl StateKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Returns the side length of a square grid holding `len` tiles, if there is one.
pub fn grid_size_for(len: usize) -> Option<usize> {
    let mut side = 0usize;
    while side * side < len {
        side += 1;
    }
    (side >= 2 && side * side == len).then_some(side)
}

/// An immutable arrangement of all tiles on the grid.
///
/// The positional index of a tile is its current cell
/// (`row = index / grid_size`, `col = index % grid_size`). Every constructor that
/// accepts outside data validates it, so a `TileState` always holds `grid_size²`
/// tiles with pairwise-distinct ids in `[0, grid_size²)`.
///
/// Cloning copies every tile: two states never share storage, and moves produce new
/// states instead of mutating the one they start from.
#[derive(Clone, Debug, PartialEq)]
pub struct TileState {
    grid_size: usize,
    tiles: Vec<Tile>,
}

impl TileState {
    /// Validates `tiles` and builds a state from them.
    ///
    /// # Errors
    /// * `PuzzleError::InvalidGridSize` if the tile count is not `N²` with `N >= 2`.
    /// * `PuzzleError::MalformedTile` if an id is out of range or repeated, or an alpha
    ///   is not strictly between 0 and 1.
    ///
    /// # Examples
    /// ```
    /// use hue_puzzle_solver::engine::{Rgb, Tile, TileState};
    /// let red = Rgb::new(200, 0, 0);
    /// let tiles = (0..4).map(|id| Tile::new(id, red, 0.2 * (id + 1) as f64)).collect();
    /// let state = TileState::new(tiles).unwrap();
    /// assert_eq!(state.grid_size(), 2);
    ///
    /// assert!(TileState::new(vec![Tile::new(0, red, 0.5)]).is_err());
    /// ```
    pub fn new(tiles: Vec<Tile>) -> Result<Self, PuzzleError> {
        let grid_size =
            grid_size_for(tiles.len()).ok_or(PuzzleError::InvalidGridSize { len: tiles.len() })?;

        let mut seen = vec![false; tiles.len()];
        for (index, tile) in tiles.iter().enumerate() {
            if tile.id >= tiles.len() {
                return Err(PuzzleError::malformed(
                    index,
                    format!("id {} is outside [0, {})", tile.id, tiles.len()),
                ));
            }
            if seen[tile.id] {
                return Err(PuzzleError::malformed(
                    index,
                    format!("id {} appears more than once", tile.id),
                ));
            }
            seen[tile.id] = true;
            if !(tile.alpha > 0.0 && tile.alpha < 1.0) {
                return Err(PuzzleError::malformed(
                    index,
                    format!("alpha {} is outside (0, 1)", tile.alpha),
                ));
            }
        }

        Ok(TileState { grid_size, tiles })
    }

    /// Builds the fully sorted grid for a palette of `grid_size` base colors.
    ///
    /// Each color gets `grid_size` opacities `(j + 1) / (grid_size + 1)`. Tiles are
    /// placed in `(r, g, b, alpha)` order and every id is the tile's index in that
    /// order, so the result satisfies both goal predicates and has a heuristic of zero.
    ///
    /// # Errors
    /// Returns `PuzzleError::InvalidGridSize` unless `palette.len() >= 2`.
    pub fn from_palette(palette: &[Rgb]) -> Result<Self, PuzzleError> {
        let grid_size = palette.len();
        if grid_size < 2 {
            return Err(PuzzleError::InvalidGridSize {
                len: grid_size * grid_size,
            });
        }

        let mut tiles: Vec<Tile> = palette
            .iter()
            .flat_map(|&color| {
                (0..grid_size).map(move |j| {
                    Tile::new(0, color, (j + 1) as f64 / (grid_size + 1) as f64)
                })
            })
            .collect();
        tiles.sort_by(|a, b| a.color_order(b));
        for (index, tile) in tiles.iter_mut().enumerate() {
            tile.id = index;
        }

        TileState::new(tiles)
    }

    /// Generates a shuffled grid from a seeded random palette.
    ///
    /// The same `(grid_size, seed)` pair always produces the same grid.
    pub fn random(grid_size: usize, seed: u64) -> Result<Self, PuzzleError> {
        let mut rng = SmallRng::seed_from_u64(seed);
        let palette: Vec<Rgb> = (0..grid_size)
            .map(|_| Rgb::new(rng.gen(), rng.gen(), rng.gen()))
            .collect();
        let solved = TileState::from_palette(&palette)?;

        let mut tiles = solved.tiles;
        tiles.shuffle(&mut rng);
        Ok(TileState {
            grid_size: solved.grid_size,
            tiles,
        })
    }

    /// Wraps tiles that are already known to be a valid arrangement of `grid_size`.
    fn from_permutation(grid_size: usize, tiles: Vec<Tile>) -> Self {
        debug_assert_eq!(tiles.len(), grid_size * grid_size);
        TileState { grid_size, tiles }
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Number of tiles (`grid_size²`).
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Always false: a valid grid holds at least four tiles.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Returns the tile in cell `index`, or `None` outside the grid.
    pub fn tile(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    /// Returns the tile at row `r`, column `c`.
    ///
    /// # Panics
    /// Panics if `r` or `c` are outside the grid.
    pub fn get_tile(&self, r: usize, c: usize) -> &Tile {
        &self.tiles[r * self.grid_size + c]
    }

    /// Splits a row-major cell index into `(row, col)`.
    pub fn position_of(&self, index: usize) -> (usize, usize) {
        (index / self.grid_size, index % self.grid_size)
    }

    /// Iterates over the grid's rows, top to bottom.
    pub fn rows(&self) -> std::slice::Chunks<'_, Tile> {
        self.tiles.chunks(self.grid_size)
    }

    /// Returns a copy of this state with cells `a` and `b` exchanged.
    ///
    /// # Panics
    /// Panics if either index is outside the grid.
    pub fn swapped(&self, a: usize, b: usize) -> TileState {
        let mut tiles = self.tiles.clone();
        tiles.swap(a, b);
        TileState::from_permutation(self.grid_size, tiles)
    }

    /// Returns a copy of this state with the tile at `from` removed and reinserted so
    /// that it ends up in cell `to`; the tiles in between shift by one.
    ///
    /// # Panics
    /// Panics if either index is outside the grid.
    pub fn relocated(&self, from: usize, to: usize) -> TileState {
        let mut tiles = self.tiles.clone();
        let tile = tiles.remove(from);
        tiles.insert(to, tile);
        TileState::from_permutation(self.grid_size, tiles)
    }

    /// Canonical serialization of this arrangement.
    pub fn canonical_key(&self) -> StateKey {
        let mut bytes = Vec::with_capacity(self.tiles.len() * 15);
        for tile in &self.tiles {
            bytes.extend_from_slice(&(tile.id as u32).to_le_bytes());
            bytes.extend_from_slice(&[tile.color.r, tile.color.g, tile.color.b]);
            bytes.extend_from_slice(&tile.alpha.to_bits().to_le_bytes());
        }
        StateKey(bytes)
    }

    /// Renders the grid with row/column numbers and 24-bit ANSI background colors.
    ///
    /// If `selected` is `Some(index)`, that cell is marked with `[]`.
    pub fn to_string_with_highlight(&self, selected: Option<usize>) -> String {
        let mut output = String::new();

        output.push_str("   ");
        for c_idx in 0..self.grid_size {
            output.push_str(&format!("{:<4}", c_idx));
        }
        output.push('\n');

        for (r_idx, row) in self.rows().enumerate() {
            output.push_str(&format!("{:<3}", r_idx));
            for (c_idx, tile) in row.iter().enumerate() {
                let (r, g, b) = tile.color.over_white(tile.alpha);
                let is_highlight = selected == Some(r_idx * self.grid_size + c_idx);
                let content = if is_highlight { " [] " } else { "    " };
                output.push_str(&format!("\x1b[48;2;{};{};{}m{}\x1b[m", r, g, b, content));
            }
            if r_idx + 1 < self.grid_size {
                output.push('\n');
            }
        }

        output
    }
}

impl fmt::Display for TileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_with_highlight(None))
    }
}

/// What a click on a cell did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    /// The cell is now selected.
    Selected(usize),
    /// The selected cell was clicked again and is no longer selected.
    Deselected,
    /// The two cells were swapped.
    Swapped(usize, usize),
}

/// The live puzzle a player interacts with.
///
/// A `Game` is the host side of the solver: it owns the one mutable grid, adopts
/// states handed back by the solver, and rejects manual input while a solve session
/// holds the grid.
#[derive(Clone, Debug)]
pub struct Game {
    state: TileState,
    selected: Option<usize>,
    moves: u32,
    history: Vec<(TileState, u32)>, // (state, moves) before each applied move, for undo
    won: bool,
    input_locked: bool,
}

impl Game {
    /// Starts a game on a random grid of `grid_size` colors.
    pub fn new(grid_size: usize, seed: u64) -> Result<Self, PuzzleError> {
        Ok(Game::new_with_state(TileState::random(grid_size, seed)?))
    }

    /// Starts a game on a given arrangement.
    pub fn new_with_state(state: TileState) -> Self {
        let won = goal::is_row_gradient_solved(&state);
        Game {
            state,
            selected: None,
            moves: 0,
            history: Vec::new(),
            won,
            input_locked: false,
        }
    }

    pub fn state(&self) -> &TileState {
        &self.state
    }

    /// Moves made so far; undone moves are subtracted.
    pub fn move_count(&self) -> u32 {
        self.moves
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Whether the grid passes the row gradient check.
    pub fn is_won(&self) -> bool {
        self.won
    }

    pub fn is_input_locked(&self) -> bool {
        self.input_locked
    }

    /// Handles a click on cell `index`.
    ///
    /// The first click selects a cell, a click on another cell swaps the two, and a
    /// second click on the selected cell deselects it.
    ///
    /// # Errors
    /// * `PuzzleError::SolveInProgress` while a solve session holds the grid.
    /// * `PuzzleError::InvalidCell` if `index` is outside the grid.
    pub fn select(&mut self, index: usize) -> Result<Selection, PuzzleError> {
        if self.input_locked {
            return Err(PuzzleError::SolveInProgress);
        }
        if index >= self.state.len() {
            return Err(PuzzleError::InvalidCell { index });
        }

        match self.selected.take() {
            Some(prev) if prev == index => Ok(Selection::Deselected),
            Some(prev) => {
                let next = self.state.swapped(prev, index);
                self.apply(next);
                Ok(Selection::Swapped(prev, index))
            }
            None => {
                self.selected = Some(index);
                Ok(Selection::Selected(index))
            }
        }
    }

    /// Swaps two cells directly, as two clicks would.
    pub fn swap_cells(&mut self, a: usize, b: usize) -> Result<(), PuzzleError> {
        if self.input_locked {
            return Err(PuzzleError::SolveInProgress);
        }
        for index in [a, b] {
            if index >= self.state.len() {
                return Err(PuzzleError::InvalidCell { index });
            }
        }
        self.selected = None;
        if a != b {
            let next = self.state.swapped(a, b);
            self.apply(next);
        }
        Ok(())
    }

    /// Reverts the last move. Returns false if there is nothing to undo or the grid
    /// is locked by a solve session.
    pub fn undo_last_move(&mut self) -> bool {
        if self.input_locked {
            return false;
        }
        match self.history.pop() {
            Some((prev_state, prev_moves)) => {
                self.state = prev_state;
                self.moves = prev_moves;
                self.selected = None;
                self.won = goal::is_row_gradient_solved(&self.state);
                true
            }
            None => false,
        }
    }

    /// Replaces the grid with a new random one of the same size and clears all
    /// progress.
    pub fn reset(&mut self, seed: u64) -> Result<(), PuzzleError> {
        if self.input_locked {
            return Err(PuzzleError::SolveInProgress);
        }
        *self = Game::new(self.state.grid_size(), seed)?;
        Ok(())
    }

    fn apply(&mut self, next: TileState) {
        let prev = std::mem::replace(&mut self.state, next);
        self.history.push((prev, self.moves));
        self.moves += 1;
        self.won = goal::is_row_gradient_solved(&self.state);
    }

    fn revert_to(&mut self, prev: TileState) {
        // Drop the matching history entry if this is the state the last move left.
        if self.history.last().map_or(false, |(s, _)| *s == prev) {
            self.history.pop();
        }
        self.state = prev;
        self.moves = self.moves.saturating_sub(1);
        self.won = goal::is_row_gradient_solved(&self.state);
    }
}

impl StepObserver for Game {
    fn on_step(&mut self, next: &TileState, move_delta: i32) {
        self.selected = None;
        if move_delta < 0 {
            self.revert_to(next.clone());
        } else {
            self.apply(next.clone());
        }
    }
}

impl GridHost for Game {
    fn snapshot(&self) -> Result<TileState, PuzzleError> {
        Ok(self.state.clone())
    }

    fn set_input_locked(&mut self, locked: bool) {
        self.input_locked = locked;
        if locked {
            self.selected = None;
        }
    }

    fn on_found(&mut self, path: &[TileState]) {
        log::debug!("solver found a path of {} states", path.len());
    }

    fn on_exhausted(&mut self) {
        log::info!("no solution found within the search budget");
    }
}
