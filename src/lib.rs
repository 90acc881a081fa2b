//! # Hue Puzzle Solver Library
//!
//! This library provides the model of a hue sorting puzzle (a square grid of colored,
//! semi-transparent tiles to be put back in order) and the searches that solve it.
//!
//! It is used by three binaries:
//! - `human_player`: interactive play in the terminal, with hints and an animated
//!   auto-solve.
//! - `ai_solver`: reads a grid file and prints a solution path.
//! - `heuristic_evaluator`: compares the search strategies over seeded random grids.
//!
//! ## Modules
//! - `engine`: tiles (`Tile`, `Rgb`), grid snapshots (`TileState`) and the live
//!   `Game` that hosts the solver.
//! - `goal`: the two notions of "solved" (`GoalMode`).
//! - `heuristics`: distance estimates used by best-first search and reporting.
//! - `moves`: relocation and swap move generation (`MoveModel`).
//! - `solver`: depth-first, best-first and backtracking search (`solve`, `Search`).
//! - `player`: the host seam (`GridHost`, `StepObserver`), solve sessions and
//!   solution playback.
//! - `utils`: reading and writing grids as text.
//! - `error`: the crate's error type.

pub mod engine;
pub mod error;
pub mod goal;
pub mod heuristics;
pub mod moves;
pub mod player;
pub mod solver;
pub mod utils;

pub use error::PuzzleError;
