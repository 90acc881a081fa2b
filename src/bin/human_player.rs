use clap::Parser;
use hue_puzzle_solver::engine::{Game, Selection, TileState};
use hue_puzzle_solver::error::PuzzleError;
use hue_puzzle_solver::player::{request_hint, request_solve_limited, GridHost, StepObserver};
use hue_puzzle_solver::solver::{
    SearchConfig, SearchOutcome, DEFAULT_MAX_BACKTRACK_DEPTH, DEFAULT_MAX_DEPTH,
};
use std::io::{self, Write};
use std::process;
use std::thread;
use std::time::Duration;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Number of colors, and the side length of the grid
    #[clap(short, long, default_value_t = 3)]
    grid_size: usize,

    /// Seed for the first grid; random if omitted
    #[clap(short, long)]
    seed: Option<u64>,

    /// Pause before a hint search starts
    #[clap(long, default_value_t = 2000)]
    hint_delay_ms: u64,

    /// Expansion budget of the hint search
    #[clap(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Maximum number of swaps in flight during auto-solve
    #[clap(long, default_value_t = DEFAULT_MAX_BACKTRACK_DEPTH)]
    max_backtrack_depth: usize,

    /// Swaps and undos auto-solve may make before giving up and rewinding
    #[clap(long, default_value_t = 2000)]
    max_auto_steps: usize,

    /// Pause after each swap shown during auto-solve
    #[clap(long, default_value_t = 500)]
    step_delay_ms: u64,

    /// Pause after each undone swap during auto-solve
    #[clap(long, default_value_t = 10)]
    undo_delay_ms: u64,
}

/// Shows backtracking steps on the terminal as they are applied to the game.
struct AnimatedHost<'a> {
    game: &'a mut Game,
    step_delay: Duration,
    undo_delay: Duration,
}

impl StepObserver for AnimatedHost<'_> {
    fn on_step(&mut self, next: &TileState, move_delta: i32) {
        self.game.on_step(next, move_delta);
        if move_delta > 0 {
            println!("Moves: {}\n{}\n", self.game.move_count(), self.game.state());
            thread::sleep(self.step_delay);
        } else {
            thread::sleep(self.undo_delay);
        }
    }
}

impl GridHost for AnimatedHost<'_> {
    fn snapshot(&self) -> Result<TileState, PuzzleError> {
        self.game.snapshot()
    }

    fn set_input_locked(&mut self, locked: bool) {
        self.game.set_input_locked(locked);
    }

    fn on_found(&mut self, path: &[TileState]) {
        self.game.on_found(path);
    }

    fn on_exhausted(&mut self) {
        self.game.on_exhausted();
    }
}

fn show_hint(game: &mut Game, args: &Args) {
    println!("Thinking...");
    thread::sleep(Duration::from_millis(args.hint_delay_ms));
    let config = SearchConfig::default().with_max_depth(args.max_depth);
    match request_hint(game, &config) {
        Ok(Some(_)) => println!("Hint applied."),
        Ok(None) if game.is_won() => println!("Nothing to do: the grid is already solved."),
        Ok(None) => println!("No hint found within {} expansions.", args.max_depth),
        Err(e) => println!("Cannot search: {}", e),
    }
}

fn auto_solve(game: &mut Game, args: &Args) {
    let start_moves = game.move_count();
    let mut host = AnimatedHost {
        game: &mut *game,
        step_delay: Duration::from_millis(args.step_delay_ms),
        undo_delay: Duration::from_millis(args.undo_delay_ms),
    };
    let config = SearchConfig::backtracking().with_max_backtrack_depth(args.max_backtrack_depth);
    match request_solve_limited(&mut host, &config, args.max_auto_steps) {
        Ok(Some(SearchOutcome::Found(solution))) => println!(
            "Solved with {} swaps ({} tried).",
            solution.len(),
            solution.stats.expansions
        ),
        Ok(Some(SearchOutcome::Exhausted(stats))) => {
            println!("Auto-solve gave up after {} swaps.", stats.expansions)
        }
        Ok(None) => {
            // Take back the swaps the abandoned search left on the grid.
            while game.move_count() > start_moves && game.undo_last_move() {}
            println!(
                "Auto-solve stopped after {} steps; the grid was rewound.",
                args.max_auto_steps
            );
        }
        Err(e) => println!("Cannot search: {}", e),
    }
}

fn click(game: &mut Game, r: usize, c: usize) {
    let grid_size = game.state().grid_size();
    if r >= grid_size || c >= grid_size {
        println!(
            "Invalid coordinates: Row and column must be between 0 and {}.",
            grid_size - 1
        );
        return;
    }
    match game.select(r * grid_size + c) {
        Ok(Selection::Selected(_)) => println!("Selected ({}, {}).", r, c),
        Ok(Selection::Deselected) => println!("Selection cleared."),
        Ok(Selection::Swapped(a, b)) => println!("Swapped cells {} and {}.", a, b),
        Err(e) => println!("Invalid move: {}", e),
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut seed = args.seed.unwrap_or_else(rand::random);
    let mut game = match Game::new(args.grid_size, seed) {
        Ok(game) => game,
        Err(e) => {
            eprintln!("Cannot create a grid: {}", e);
            process::exit(1);
        }
    };
    println!("Welcome to Hue Sort! Line every row up into a single-color gradient.");

    loop {
        println!("---------------------");
        println!("Seed: {}, Moves: {}", seed, game.move_count());
        println!("{}", game.state().to_string_with_highlight(game.selected()));

        if game.is_won() {
            println!("");
            println!("🎉 SOLVED in {} moves! 🎉", game.move_count());
            println!("Enter 'n' for a new grid or 'q' to quit.");
        }

        print!("Enter a cell (row col), 'h' hint, 'a' auto-solve, 'u' undo, 'n' new, 'q' quit: ");
        io::stdout().flush().ok();

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {}
            Err(_) => {
                println!("Error reading input. Please try again.");
                continue;
            }
        }

        match input.trim() {
            "q" => {
                println!("Thanks for playing!");
                break;
            }
            "u" => {
                if game.undo_last_move() {
                    println!("Move undone.");
                } else {
                    println!("Cannot undo further (no moves made).");
                }
            }
            "n" => {
                seed = seed.wrapping_add(1);
                if let Err(e) = game.reset(seed) {
                    println!("Cannot create a grid: {}", e);
                }
            }
            "h" => show_hint(&mut game, &args),
            "a" => auto_solve(&mut game, &args),
            other => {
                let parts: Vec<&str> = other.split_whitespace().collect();
                match parts.as_slice() {
                    [r, c] => match (r.parse::<usize>(), c.parse::<usize>()) {
                        (Ok(r), Ok(c)) => click(&mut game, r, c),
                        _ => println!(
                            "Invalid input: Please enter numbers for row and column (e.g., '1 2')."
                        ),
                    },
                    _ => println!("Invalid input format. Use 'row col', 'h', 'a', 'u', 'n' or 'q'."),
                }
            }
        }
    }
}
