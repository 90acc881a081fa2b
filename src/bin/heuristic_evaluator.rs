use clap::Parser;
use hue_puzzle_solver::engine::TileState;
use hue_puzzle_solver::goal::GoalMode;
use hue_puzzle_solver::heuristics::{manhattan_distance, misplaced_tiles};
use hue_puzzle_solver::moves::MoveModel;
use hue_puzzle_solver::solver::{solve, SearchConfig, SearchStrategy, DEFAULT_MAX_DEPTH};
use std::process;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Number of random grids to evaluate
    #[clap(short = 'n', long, default_value_t = 20)]
    grids: usize,

    /// Side length of every grid
    #[clap(short, long, default_value_t = 3)]
    grid_size: usize,

    /// Seed of the first grid; grid `i` uses `start_seed + i`
    #[clap(short, long, default_value_t = 0)]
    start_seed: u64,

    /// Expansion budget of the dfs and best-first strategies
    #[clap(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Swap depth of the backtracking strategy; grows as 36^depth on a 3x3 grid
    #[clap(long, default_value_t = 3)]
    max_backtrack_depth: usize,
}

/// Results collected for one strategy across every grid.
#[derive(Default)]
struct Tally {
    found: usize,
    expansions: Vec<usize>,
    path_lengths: Vec<usize>,
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn strategies(args: &Args) -> Vec<(&'static str, SearchConfig)> {
    let frontier = SearchConfig::default().with_max_depth(args.max_depth);
    vec![
        ("DFS-RELOC", frontier.clone()),
        ("DFS-SWAP", frontier.clone().with_moves(MoveModel::Swap)),
        (
            "BEST-RELOC",
            frontier.clone().with_strategy(SearchStrategy::BestFirst),
        ),
        (
            "BEST-SWAP",
            frontier
                .with_strategy(SearchStrategy::BestFirst)
                .with_moves(MoveModel::Swap),
        ),
        (
            "BACKTRACK",
            SearchConfig::backtracking().with_max_backtrack_depth(args.max_backtrack_depth),
        ),
    ]
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    let strategies = strategies(&args);
    let mut tallies: Vec<Tally> = strategies.iter().map(|_| Tally::default()).collect();
    let mut initial_distances = Vec::with_capacity(args.grids);
    let mut initial_misplaced = Vec::with_capacity(args.grids);

    println!(
        "Starting strategy evaluation for {} grids of size {}...",
        args.grids, args.grid_size
    );

    for grid_idx in 0..args.grids {
        let current_seed = args.start_seed + grid_idx as u64;
        let root = match TileState::random(args.grid_size, current_seed) {
            Ok(root) => root,
            Err(e) => {
                eprintln!("Cannot create a grid: {}", e);
                process::exit(1);
            }
        };
        initial_distances.push(manhattan_distance(&root));
        initial_misplaced.push(misplaced_tiles(&root));

        println!(
            "\nEvaluating Grid {} (Seed: {}, distance {}, misplaced {}, row gradient {})",
            grid_idx,
            current_seed,
            manhattan_distance(&root),
            misplaced_tiles(&root),
            GoalMode::RowGradient.is_solved(&root)
        );

        for ((name, config), tally) in strategies.iter().zip(tallies.iter_mut()) {
            let outcome = solve(&root, config);
            let stats = outcome.stats();
            tally.expansions.push(stats.expansions);
            match outcome.solution() {
                Some(solution) => {
                    tally.found += 1;
                    tally.path_lengths.push(solution.len());
                    println!(
                        "  Strategy: {:<10}, Found in {:<4} moves, Expansions: {}",
                        name,
                        solution.len(),
                        stats.expansions
                    );
                }
                None => println!(
                    "  Strategy: {:<10}, Exhausted,           Expansions: {}",
                    name, stats.expansions
                ),
            }
        }
    }

    println!("\n--- Evaluation Complete ---");
    println!("Number of grids evaluated: {}", args.grids);
    println!(
        "Strategies evaluated: {}",
        strategies
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<&str>>()
            .join(", ")
    );
    println!(
        "Mean initial distance: {:.2}, mean misplaced tiles: {:.2}",
        mean(initial_distances.iter().map(|&d| d as f64)),
        mean(initial_misplaced.iter().map(|&m| m as f64))
    );
    println!("\n--- Summary ---");

    let mut rows: Vec<(&str, &Tally)> = strategies
        .iter()
        .map(|(name, _)| *name)
        .zip(tallies.iter())
        .collect();
    // Most grids solved first, then fewest expansions.
    rows.sort_by(|a, b| {
        b.1.found.cmp(&a.1.found).then_with(|| {
            let ea = mean(a.1.expansions.iter().map(|&e| e as f64));
            let eb = mean(b.1.expansions.iter().map(|&e| e as f64));
            ea.total_cmp(&eb)
        })
    });

    for (name, tally) in rows {
        println!(
            "Strategy {:<10}: Found {}/{}, Avg Expansions = {:.1}, Avg Path Length = {:.2}",
            name,
            tally.found,
            args.grids,
            mean(tally.expansions.iter().map(|&e| e as f64)),
            mean(tally.path_lengths.iter().map(|&l| l as f64))
        );
    }
}
