//! The seam between the solver and the host that owns the live grid.
//!
//! The host implements `GridHost`; the solver never touches host state except
//! through it. `SolveSession` locks the host, runs a search in bounded ticks and
//! unlocks it again; `SolutionPlayer` writes solution states back one move at a time.
use crate::engine::TileState;
use crate::error::PuzzleError;
use crate::moves::Move;
use crate::solver::{solve, Search, SearchConfig, SearchOutcome, SearchPhase, Solution};

/// Work units a `request_solve` call hands to the search per tick.
pub const DEFAULT_TICK_WORK: usize = 64;

/// Receives every state the solver or player asks the host to adopt.
///
/// `move_delta` is `+1` for a move forward and `-1` for an undone move.
pub trait StepObserver {
    fn on_step(&mut self, next: &TileState, move_delta: i32);
}

impl<F> StepObserver for F
where
    F: FnMut(&TileState, i32),
{
    fn on_step(&mut self, next: &TileState, move_delta: i32) {
        self(next, move_delta)
    }
}

/// Capabilities the solver needs from the host that owns the live grid.
pub trait GridHost: StepObserver {
    /// Copies the live grid.
    fn snapshot(&self) -> Result<TileState, PuzzleError>;

    /// Enables or disables manual input. Held for the whole of a solve session.
    fn set_input_locked(&mut self, _locked: bool) {}

    /// Called once when a session finds a solution.
    fn on_found(&mut self, _path: &[TileState]) {}

    /// Called once when a session gives up.
    fn on_exhausted(&mut self) {}
}

/// A search in progress against a locked host grid.
///
/// Starting a session snapshots and locks the host; the lock is released when the
/// session reports its outcome or is cancelled.
pub struct SolveSession {
    search: Option<Search>,
}

impl SolveSession {
    /// Snapshots `host`, locks its input and prepares the search.
    ///
    /// # Errors
    /// Propagates any error from `GridHost::snapshot`; the host stays unlocked.
    pub fn start<H: GridHost>(host: &mut H, config: &SearchConfig) -> Result<Self, PuzzleError> {
        let root = host.snapshot()?;
        host.set_input_locked(true);
        Ok(SolveSession {
            search: Some(Search::new(root, config)),
        })
    }

    /// Whether the session is still searching.
    pub fn is_active(&self) -> bool {
        self.search.is_some()
    }

    /// Advances the search by up to `work` units.
    ///
    /// Returns the outcome on the tick the search ends, after unlocking the host and
    /// calling `on_found` or `on_exhausted`. Returns `None` while the search runs and
    /// on every call after the outcome was delivered.
    pub fn tick<H: GridHost>(&mut self, host: &mut H, work: usize) -> Option<SearchOutcome> {
        let search = self.search.as_mut()?;
        if search.step(work, host) == SearchPhase::Running {
            return None;
        }

        let outcome = self.search.take()?.finish(host);
        host.set_input_locked(false);
        match &outcome {
            SearchOutcome::Found(solution) => host.on_found(&solution.path),
            SearchOutcome::Exhausted(_) => host.on_exhausted(),
        }
        Some(outcome)
    }

    /// Abandons the search and unlocks the host without reporting an outcome.
    pub fn cancel<H: GridHost>(mut self, host: &mut H) {
        if self.search.take().is_some() {
            host.set_input_locked(false);
        }
    }
}

/// Runs a whole solve against `host`: snapshot, lock, search, unlock, notify.
pub fn request_solve<H: GridHost>(
    host: &mut H,
    config: &SearchConfig,
) -> Result<SearchOutcome, PuzzleError> {
    let mut session = SolveSession::start(host, config)?;
    loop {
        if let Some(outcome) = session.tick(host, DEFAULT_TICK_WORK) {
            return Ok(outcome);
        }
    }
}

/// Like `request_solve`, but gives up after `max_work` units of search.
///
/// When the limit is hit the session is cancelled: the host is unlocked, neither
/// `on_found` nor `on_exhausted` is called, and `None` is returned. Steps already
/// streamed to the host stay applied.
pub fn request_solve_limited<H: GridHost>(
    host: &mut H,
    config: &SearchConfig,
    max_work: usize,
) -> Result<Option<SearchOutcome>, PuzzleError> {
    let mut session = SolveSession::start(host, config)?;
    let mut remaining = max_work;
    while remaining > 0 {
        let work = remaining.min(DEFAULT_TICK_WORK);
        if let Some(outcome) = session.tick(host, work) {
            return Ok(Some(outcome));
        }
        remaining -= work;
    }
    log::info!("solve abandoned after {} units of work", max_work);
    session.cancel(host);
    Ok(None)
}

/// Searches from the live grid and applies only the first move found.
///
/// The search runs on a snapshot and never streams steps to the host, whatever the
/// strategy, so the host sees exactly one move. Returns the adopted state, or `None`
/// if the grid is already solved or the search ran out of budget.
pub fn request_hint<H: GridHost>(
    host: &mut H,
    config: &SearchConfig,
) -> Result<Option<TileState>, PuzzleError> {
    let root = host.snapshot()?;
    host.set_input_locked(true);
    let outcome = solve(&root, config);
    host.set_input_locked(false);

    match outcome {
        SearchOutcome::Found(solution) => {
            host.on_found(&solution.path);
            Ok(SolutionPlayer::apply_hint(solution, host))
        }
        SearchOutcome::Exhausted(_) => {
            host.on_exhausted();
            Ok(None)
        }
    }
}

/// Plays a solution back onto a host.
///
/// Hints use `apply_hint`, which applies one move and throws the rest of the path
/// away. A backtracking result is replayed move by move with `step_forward`, paced
/// by the caller, and `step_back` reverts the last applied move.
#[derive(Clone, Debug)]
pub struct SolutionPlayer {
    path: Vec<TileState>,
    moves: Vec<Move>,
    position: usize,
}

impl SolutionPlayer {
    pub fn new(solution: Solution) -> Self {
        SolutionPlayer {
            path: solution.path,
            moves: solution.moves,
            position: 0,
        }
    }

    /// Writes `path[1]` to `observer` with delta `+1` and discards the rest.
    ///
    /// A one-state path (the root was already solved) applies nothing.
    pub fn apply_hint(solution: Solution, observer: &mut dyn StepObserver) -> Option<TileState> {
        let mut player = SolutionPlayer::new(solution);
        player.step_forward(observer)?;
        player.path.into_iter().nth(1)
    }

    /// Number of moves applied so far.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Moves left to apply.
    pub fn remaining(&self) -> usize {
        self.moves.len() - self.position
    }

    pub fn is_finished(&self) -> bool {
        self.position == self.moves.len()
    }

    /// The state the host should be showing at the current position.
    pub fn current(&self) -> &TileState {
        &self.path[self.position]
    }

    /// Applies the next move. Returns `None` once the path is finished.
    pub fn step_forward(&mut self, observer: &mut dyn StepObserver) -> Option<Move> {
        let mv = *self.moves.get(self.position)?;
        self.position += 1;
        observer.on_step(&self.path[self.position], 1);
        Some(mv)
    }

    /// Reverts the last applied move. Returns `None` at the start of the path.
    pub fn step_back(&mut self, observer: &mut dyn StepObserver) -> Option<Move> {
        self.position = self.position.checked_sub(1)?;
        observer.on_step(&self.path[self.position], -1);
        Some(self.moves[self.position])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Game, Rgb};
    use crate::goal::GoalMode;
    use crate::moves::MoveModel;
    use crate::solver::SearchStrategy;

    fn sorted_3x3() -> TileState {
        TileState::from_palette(&[
            Rgb::new(20, 20, 20),
            Rgb::new(20, 20, 120),
            Rgb::new(20, 20, 220),
        ])
        .unwrap()
    }

    fn reversed_3x3() -> TileState {
        TileState::new(sorted_3x3().tiles().iter().rev().copied().collect()).unwrap()
    }

    /// Host that records every call made on it.
    struct RecordingHost {
        state: TileState,
        locked: bool,
        deltas: Vec<i32>,
        found: Option<usize>,
        exhausted: bool,
    }

    impl RecordingHost {
        fn new(state: TileState) -> Self {
            RecordingHost {
                state,
                locked: false,
                deltas: Vec::new(),
                found: None,
                exhausted: false,
            }
        }
    }

    impl StepObserver for RecordingHost {
        fn on_step(&mut self, next: &TileState, move_delta: i32) {
            self.state = next.clone();
            self.deltas.push(move_delta);
        }
    }

    impl GridHost for RecordingHost {
        fn snapshot(&self) -> Result<TileState, PuzzleError> {
            Ok(self.state.clone())
        }

        fn set_input_locked(&mut self, locked: bool) {
            self.locked = locked;
        }

        fn on_found(&mut self, path: &[TileState]) {
            self.found = Some(path.len());
        }

        fn on_exhausted(&mut self) {
            self.exhausted = true;
        }
    }

    #[test]
    fn test_hint_applies_exactly_path_one() {
        let sorted = sorted_3x3();
        let root = sorted.swapped(1, 7);
        let config = SearchConfig::default().with_moves(MoveModel::Swap);

        let outcome = solve(&root, &config);
        let solution = outcome.solution().unwrap().clone();
        let expected = solution.path[1].clone();

        let mut host = RecordingHost::new(root);
        let applied = SolutionPlayer::apply_hint(solution, &mut host);
        assert_eq!(applied.as_ref(), Some(&expected));
        assert_eq!(host.state, expected);
        assert_eq!(host.deltas, vec![1]);
    }

    #[test]
    fn test_hint_on_solved_grid_applies_nothing() {
        let mut host = RecordingHost::new(sorted_3x3());
        let applied = request_hint(&mut host, &SearchConfig::default()).unwrap();
        assert_eq!(applied, None);
        assert!(host.deltas.is_empty());
        assert_eq!(host.found, Some(1));
        assert!(!host.locked);
    }

    #[test]
    fn test_request_hint_updates_game() {
        let sorted = sorted_3x3();
        let mut game = Game::new_with_state(sorted.swapped(0, 2));
        let config = SearchConfig::default().with_moves(MoveModel::Swap);

        let applied = request_hint(&mut game, &config).unwrap();
        assert_eq!(applied.as_ref(), Some(game.state()));
        assert_eq!(game.move_count(), 1);
        assert_eq!(game.state(), &sorted);
        assert!(game.is_won());
        assert!(!game.is_input_locked());
    }

    #[test]
    fn test_backtracking_hint_moves_the_game_once() {
        let sorted = TileState::from_palette(&[Rgb::new(1, 1, 1), Rgb::new(2, 2, 2)]).unwrap();
        let root = sorted.swapped(1, 2);
        let config = SearchConfig::backtracking();
        let expected = solve(&root, &config).solution().unwrap().path[1].clone();

        let mut game = Game::new_with_state(root);
        let applied = request_hint(&mut game, &config).unwrap();
        assert_eq!(applied.as_ref(), Some(&expected));
        assert_eq!(game.state(), &expected);
        assert_eq!(game.move_count(), 1);
        assert!(!game.is_input_locked());

        assert!(game.undo_last_move());
        assert_eq!(game.move_count(), 0);
        assert!(!game.undo_last_move());
    }

    #[test]
    fn test_session_locks_host_until_done() {
        let mut game = Game::new(3, 21).unwrap();
        let config = SearchConfig::default().with_max_depth(30);

        let mut session = SolveSession::start(&mut game, &config).unwrap();
        assert!(game.is_input_locked());
        assert!(game.select(0).is_err());

        let mut outcome = None;
        while outcome.is_none() {
            outcome = session.tick(&mut game, 1);
        }
        assert!(!session.is_active());
        assert!(!game.is_input_locked());
        assert!(session.tick(&mut game, 1).is_none());
        assert!(game.select(0).is_ok());
    }

    #[test]
    fn test_limited_solve_gives_up_and_unlocks() {
        // Takes millions of swaps at the default depth.
        let start = TileState::random(3, 0).unwrap();
        assert!(!GoalMode::RowGradient.is_solved(&start));
        let mut game = Game::new_with_state(start.clone());
        let config = SearchConfig::backtracking();

        let outcome = request_solve_limited(&mut game, &config, 200).unwrap();
        assert_eq!(outcome, None);
        assert!(!game.is_input_locked());

        // Swaps still in flight were left on the game and can be undone.
        while game.undo_last_move() {}
        assert_eq!(game.state(), &start);
        assert_eq!(game.move_count(), 0);
    }

    #[test]
    fn test_limited_solve_within_limit_matches_full_solve() {
        let sorted = TileState::from_palette(&[Rgb::new(1, 1, 1), Rgb::new(2, 2, 2)]).unwrap();
        let root = sorted.swapped(1, 2);
        let config = SearchConfig::backtracking();

        let mut limited = Game::new_with_state(root.clone());
        let outcome = request_solve_limited(&mut limited, &config, 10_000).unwrap();
        let mut full = Game::new_with_state(root);
        assert_eq!(outcome, Some(request_solve(&mut full, &config).unwrap()));
        assert_eq!(limited.state(), full.state());
    }

    #[test]
    fn test_session_cancel_unlocks() {
        let mut game = Game::new(3, 4).unwrap();
        let session = SolveSession::start(&mut game, &SearchConfig::default()).unwrap();
        assert!(game.is_input_locked());
        session.cancel(&mut game);
        assert!(!game.is_input_locked());
    }

    #[test]
    fn test_exhausted_is_reported_not_raised() {
        // Fully reversed: eight relocations from sorted, far past a budget of 3.
        let mut host = RecordingHost::new(reversed_3x3());
        let config = SearchConfig::default().with_max_depth(3);
        let outcome = request_solve(&mut host, &config).unwrap();
        assert!(!outcome.is_found());
        assert!(host.exhausted);
        assert_eq!(host.found, None);
        assert!(!host.locked);
    }

    #[test]
    fn test_backtracking_streams_steps_to_host() {
        let sorted = TileState::from_palette(&[Rgb::new(1, 1, 1), Rgb::new(2, 2, 2)]).unwrap();
        let root = sorted.swapped(1, 2);
        let mut game = Game::new_with_state(root);

        let outcome = request_solve(&mut game, &SearchConfig::backtracking()).unwrap();
        let solution = outcome.solution().expect("2x2 backtracking");
        assert_eq!(game.state(), solution.final_state());
        assert_eq!(game.move_count() as usize, solution.len());
        assert!(game.is_won());
    }

    #[test]
    fn test_player_replays_and_reverts() {
        let sorted = sorted_3x3();
        let root = sorted.swapped(0, 4).swapped(2, 6);
        let config = SearchConfig::default()
            .with_strategy(SearchStrategy::BestFirst)
            .with_moves(MoveModel::Swap)
            .with_goal(GoalMode::GlobalOrder);
        let solution = solve(&root, &config).solution().unwrap().clone();
        assert_eq!(solution.len(), 2);

        let mut host = RecordingHost::new(root.clone());
        let mut player = SolutionPlayer::new(solution.clone());
        assert_eq!(player.step_back(&mut host), None);

        assert_eq!(player.step_forward(&mut host), Some(solution.moves[0]));
        assert_eq!(host.state, solution.path[1]);
        assert_eq!(player.step_back(&mut host), Some(solution.moves[0]));
        assert_eq!(host.state, root);
        assert_eq!(player.position(), 0);

        while player.step_forward(&mut host).is_some() {}
        assert!(player.is_finished());
        assert_eq!(player.remaining(), 0);
        assert_eq!(player.current(), &sorted);
        assert_eq!(host.state, sorted);
        assert_eq!(host.deltas, vec![1, -1, 1, 1]);
    }

    #[test]
    fn test_closure_observer() {
        let mut seen = Vec::new();
        let mut observer = |next: &TileState, delta: i32| seen.push((next.len(), delta));
        observer.on_step(&sorted_3x3(), 1);
        assert_eq!(seen, vec![(9, 1)]);
    }
}
