use clap::{Parser, ValueEnum};
use hue_puzzle_solver::engine::TileState;
use hue_puzzle_solver::goal::GoalMode;
use hue_puzzle_solver::heuristics::manhattan_distance;
use hue_puzzle_solver::moves::MoveModel;
use hue_puzzle_solver::solver::{
    solve, SearchConfig, SearchOutcome, SearchStrategy, DEFAULT_MAX_BACKTRACK_DEPTH,
    DEFAULT_MAX_DEPTH,
};
use hue_puzzle_solver::utils::{state_from_str_array, state_to_lines};
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Strategy {
    Dfs,
    BestFirst,
    Backtracking,
}

impl From<Strategy> for SearchStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Dfs => SearchStrategy::DepthFirst,
            Strategy::BestFirst => SearchStrategy::BestFirst,
            Strategy::Backtracking => SearchStrategy::Backtracking,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Goal {
    GlobalOrder,
    RowGradient,
}

impl From<Goal> for GoalMode {
    fn from(goal: Goal) -> Self {
        match goal {
            Goal::GlobalOrder => GoalMode::GlobalOrder,
            Goal::RowGradient => GoalMode::RowGradient,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Moves {
    Relocation,
    Swap,
}

impl From<Moves> for MoveModel {
    fn from(moves: Moves) -> Self {
        match moves {
            Moves::Relocation => MoveModel::Relocation,
            Moves::Swap => MoveModel::Swap,
        }
    }
}

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Search strategy
    #[clap(short, long, value_enum, default_value = "dfs")]
    strategy: Strategy,

    /// When the grid counts as solved
    #[clap(short, long, value_enum, default_value = "global-order")]
    goal: Goal,

    /// Moves the dfs and best-first strategies may take
    #[clap(short, long, value_enum, default_value = "relocation")]
    moves: Moves,

    /// Expansion budget for the dfs and best-first strategies
    #[clap(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Maximum number of swaps in flight for the backtracking strategy
    #[clap(long, default_value_t = DEFAULT_MAX_BACKTRACK_DEPTH)]
    max_backtrack_depth: usize,

    /// Print every state on the solution path, not just the moves
    #[clap(short, long)]
    verbose: bool,

    /// Path to the grid file (one row per line, tiles as `id:#rrggbb@alpha`)
    grid_file: PathBuf,
}

impl Args {
    fn search_config(&self) -> SearchConfig {
        SearchConfig::default()
            .with_strategy(self.strategy.into())
            .with_goal(self.goal.into())
            .with_moves(self.moves.into())
            .with_max_depth(self.max_depth)
            .with_max_backtrack_depth(self.max_backtrack_depth)
    }
}

fn read_grid_file(path: &PathBuf) -> Result<TileState, String> {
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read file: {}", e))?;
    let lines: Vec<&str> = content.lines().collect();
    state_from_str_array(&lines).map_err(|e| format!("Invalid grid: {}", e))
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let root = match read_grid_file(&args.grid_file) {
        Ok(root) => root,
        Err(e) => {
            eprintln!("{}: {}", args.grid_file.display(), e);
            process::exit(1);
        }
    };
    let config = args.search_config();

    println!("Loaded grid from {}\n", args.grid_file.display());
    println!("Initial grid (distance {}):\n{}\n", manhattan_distance(&root), root);
    println!(
        "Searching with {:?} ({:?} goal, {:?} moves)...\n",
        config.strategy, config.goal, config.moves
    );

    match solve(&root, &config) {
        SearchOutcome::Found(solution) => {
            println!("Solution found:\n");
            println!("Moves ({}):", solution.len());
            if solution.is_empty() {
                println!("  Already solved.");
            }
            for (i, mv) in solution.moves.iter().enumerate() {
                println!("  Move {}: {}", i + 1, mv);
                if args.verbose {
                    println!("{}\n", solution.path[i + 1]);
                }
            }
            let stats = solution.stats;
            println!(
                "\nExpansions: {}, generated: {}, visited: {}, peak frontier: {}\n",
                stats.expansions, stats.generated, stats.visited, stats.max_frontier
            );
            println!("Final grid:\n{}\n", solution.final_state());
            for line in state_to_lines(solution.final_state()) {
                println!("{}", line);
            }
        }
        SearchOutcome::Exhausted(stats) => {
            println!(
                "No solution found within budget ({} expansions, {} generated).\n",
                stats.expansions, stats.generated
            );
            process::exit(2);
        }
    }
}
