//! State-space search over tile arrangements.
//!
//! Three strategies share one configuration and one result type:
//! - `SearchStrategy::DepthFirst`: uninformed depth-first search over an explicit
//!   stack, with a global visited set and a total expansion budget.
//! - `SearchStrategy::BestFirst`: the same bookkeeping with a priority queue ordered
//!   by `cost + heuristic`.
//! - `SearchStrategy::Backtracking`: bounded recursive backtracking over swaps that
//!   applies and undoes swaps on a working grid, reporting every step.
//!
//! Every strategy can be advanced a bounded amount of work at a time (`Search::step`)
//! so a host can interleave searching with its own event loop, or run to completion
//! (`Search::finish`, `solve`).
use crate::engine::{StateKey, TileState};
use crate::goal::GoalMode;
use crate::heuristics::manhattan_distance;
use crate::moves::{Move, MoveModel};
use crate::player::StepObserver;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

/// Default expansion budget of the frontier strategies.
pub const DEFAULT_MAX_DEPTH: usize = 700;
/// Default recursion bound of the backtracking strategy.
pub const DEFAULT_MAX_BACKTRACK_DEPTH: usize = 50;

/// How the state graph is explored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum SearchStrategy {
    #[default]
    DepthFirst,
    BestFirst,
    Backtracking,
}

/// Everything a solve request needs besides the grid itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    /// Predicate that ends the search.
    pub goal: GoalMode,
    /// Moves the frontier strategies may take. Backtracking always swaps.
    pub moves: MoveModel,
    pub strategy: SearchStrategy,
    /// Frontier strategies: the total number of node expansions allowed. Successors
    /// whose depth is not below this value are also dropped.
    pub max_depth: usize,
    /// Backtracking: the maximum number of swaps on the working grid at once.
    pub max_backtrack_depth: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            goal: GoalMode::GlobalOrder,
            moves: MoveModel::Relocation,
            strategy: SearchStrategy::DepthFirst,
            max_depth: DEFAULT_MAX_DEPTH,
            max_backtrack_depth: DEFAULT_MAX_BACKTRACK_DEPTH,
        }
    }
}

impl SearchConfig {
    /// The auto-solve setup: backtracking over swaps until every row is a gradient.
    pub fn backtracking() -> Self {
        SearchConfig {
            goal: GoalMode::RowGradient,
            moves: MoveModel::Swap,
            strategy: SearchStrategy::Backtracking,
            ..SearchConfig::default()
        }
    }

    pub fn with_goal(mut self, goal: GoalMode) -> Self {
        self.goal = goal;
        self
    }

    pub fn with_moves(mut self, moves: MoveModel) -> Self {
        self.moves = moves;
        self
    }

    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_backtrack_depth(mut self, max_backtrack_depth: usize) -> Self {
        self.max_backtrack_depth = max_backtrack_depth;
        self
    }
}

/// One node of the search tree.
///
/// Nodes live in an append-only arena owned by the search; `parent` is the index of
/// the parent node in that arena.
#[derive(Clone, Debug)]
pub struct SearchNode {
    pub state: TileState,
    pub depth: usize,
    pub cost: usize,
    pub heuristic: u32,
    pub parent: Option<usize>,
    /// The move that produced this node from its parent.
    pub mv: Option<Move>,
}

impl SearchNode {
    fn root(state: TileState) -> Self {
        let heuristic = manhattan_distance(&state);
        SearchNode {
            state,
            depth: 0,
            cost: 0,
            heuristic,
            parent: None,
            mv: None,
        }
    }

    fn child(parent_index: usize, parent: &SearchNode, mv: Move, state: TileState) -> Self {
        let heuristic = manhattan_distance(&state);
        SearchNode {
            state,
            depth: parent.depth + 1,
            cost: parent.cost + 1,
            heuristic,
            parent: Some(parent_index),
            mv: Some(mv),
        }
    }

    /// Priority used by best-first search. Saturates at `u32::MAX`.
    fn priority(&self) -> u32 {
        u32::try_from(self.cost)
            .unwrap_or(u32::MAX)
            .saturating_add(self.heuristic)
    }
}

/// Counters collected during one search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes taken off the frontier and tested (backtracking: swaps applied).
    pub expansions: usize,
    /// Successor nodes created.
    pub generated: usize,
    /// Distinct states in the visited set when the search ended.
    pub visited: usize,
    /// Largest frontier size seen (backtracking: deepest recursion level).
    pub max_frontier: usize,
}

/// A path from the searched state to a solved one.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    /// States from the root (`path[0]`) to the goal (`path[path.len() - 1]`).
    pub path: Vec<TileState>,
    /// `moves[k]` turns `path[k]` into `path[k + 1]`.
    pub moves: Vec<Move>,
    pub stats: SearchStats,
}

impl Solution {
    /// The state the first move leads to, if the root was not already solved.
    pub fn next_state(&self) -> Option<&TileState> {
        self.path.get(1)
    }

    pub fn final_state(&self) -> &TileState {
        // A solution always holds at least the root.
        &self.path[self.path.len() - 1]
    }

    /// Number of moves on the path.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// True if the root itself was solved.
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

/// Result of a finished search.
#[derive(Clone, Debug, PartialEq)]
pub enum SearchOutcome {
    Found(Solution),
    /// The budget ran out or the state graph was exhausted. Not an error.
    Exhausted(SearchStats),
}

impl SearchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found(_))
    }

    pub fn stats(&self) -> &SearchStats {
        match self {
            SearchOutcome::Found(solution) => &solution.stats,
            SearchOutcome::Exhausted(stats) => stats,
        }
    }

    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SearchOutcome::Found(solution) => Some(solution),
            SearchOutcome::Exhausted(_) => None,
        }
    }
}

/// Where a search stands after a call to `step`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchPhase {
    Running,
    Found,
    Exhausted,
}

enum Frontier {
    Stack(Vec<usize>),
    // Ties on priority pop in insertion order; node indices only grow.
    Queue(BinaryHeap<Reverse<(u32, usize)>>),
}

impl Frontier {
    fn push(&mut self, index: usize, node: &SearchNode) {
        match self {
            Frontier::Stack(stack) => stack.push(index),
            Frontier::Queue(heap) => heap.push(Reverse((node.priority(), index))),
        }
    }

    fn pop(&mut self) -> Option<usize> {
        match self {
            Frontier::Stack(stack) => stack.pop(),
            Frontier::Queue(heap) => heap.pop().map(|Reverse((_, index))| index),
        }
    }

    fn len(&self) -> usize {
        match self {
            Frontier::Stack(stack) => stack.len(),
            Frontier::Queue(heap) => heap.len(),
        }
    }
}

/// Depth-first or best-first search over an explicit frontier.
///
/// Each unit of work pops one node. A node whose state was already expanded is
/// dropped; otherwise its state joins the visited set, the expansion counter goes up
/// and the node is tested against the goal. Unvisited successors shallower than
/// `max_depth` are pushed in the order the move model emits them. Depth-first search
/// also stops as soon as it generates a solved successor.
///
/// The search ends `Exhausted` when the frontier empties or `max_depth` expansions
/// have been made.
pub struct FrontierSearch {
    goal: GoalMode,
    moves: MoveModel,
    max_depth: usize,
    goal_on_generation: bool,
    nodes: Vec<SearchNode>,
    frontier: Frontier,
    visited: HashSet<StateKey>,
    stats: SearchStats,
    outcome: Option<SearchOutcome>,
}

impl FrontierSearch {
    /// Prepares a search from `root`. Uses a priority queue for
    /// `SearchStrategy::BestFirst` and a stack otherwise.
    pub fn new(root: TileState, config: &SearchConfig) -> Self {
        let best_first = config.strategy == SearchStrategy::BestFirst;
        let mut frontier = if best_first {
            Frontier::Queue(BinaryHeap::new())
        } else {
            Frontier::Stack(Vec::new())
        };

        let root = SearchNode::root(root);
        frontier.push(0, &root);

        FrontierSearch {
            goal: config.goal,
            moves: config.moves,
            max_depth: config.max_depth,
            goal_on_generation: !best_first,
            nodes: vec![root],
            frontier,
            visited: HashSet::new(),
            stats: SearchStats {
                max_frontier: 1,
                ..SearchStats::default()
            },
            outcome: None,
        }
    }

    /// Advances the search by up to `work` pops.
    pub fn step(&mut self, work: usize) -> SearchPhase {
        for _ in 0..work {
            if self.outcome.is_some() {
                break;
            }
            self.expand_next();
        }
        self.phase()
    }

    pub fn phase(&self) -> SearchPhase {
        match self.outcome {
            None => SearchPhase::Running,
            Some(SearchOutcome::Found(_)) => SearchPhase::Found,
            Some(SearchOutcome::Exhausted(_)) => SearchPhase::Exhausted,
        }
    }

    /// Runs the search to its end and returns the outcome.
    pub fn finish(mut self) -> SearchOutcome {
        while self.outcome.is_none() {
            self.expand_next();
        }
        // The loop above only ends once an outcome is stored.
        self.outcome.unwrap_or(SearchOutcome::Exhausted(self.stats))
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Returns true if `state` has already been expanded by this search.
    pub fn is_visited(&self, state: &TileState) -> bool {
        self.visited.contains(&state.canonical_key())
    }

    fn expand_next(&mut self) {
        if self.stats.expansions >= self.max_depth {
            log::debug!(
                "expansion budget of {} used up without reaching the goal",
                self.max_depth
            );
            self.outcome = Some(SearchOutcome::Exhausted(self.stats));
            return;
        }

        let Some(index) = self.frontier.pop() else {
            log::debug!("frontier empty after {} expansions", self.stats.expansions);
            self.outcome = Some(SearchOutcome::Exhausted(self.stats));
            return;
        };

        if !self.visited.insert(self.nodes[index].state.canonical_key()) {
            return;
        }
        self.stats.expansions += 1;
        self.stats.visited = self.visited.len();

        let node = &self.nodes[index];
        log::trace!(
            "expanding node {} (depth {}, h {}), frontier {}",
            index,
            node.depth,
            node.heuristic,
            self.frontier.len()
        );

        if self.goal.is_solved(&node.state) {
            self.found(index);
            return;
        }

        let child_depth = node.depth + 1;
        let successors = self.moves.successors(&node.state);
        for (mv, next) in successors {
            if child_depth >= self.max_depth || self.visited.contains(&next.canonical_key()) {
                continue;
            }

            let solved = self.goal_on_generation && self.goal.is_solved(&next);
            let child = SearchNode::child(index, &self.nodes[index], mv, next);
            let child_index = self.nodes.len();
            self.frontier.push(child_index, &child);
            self.nodes.push(child);
            self.stats.generated += 1;

            if solved {
                self.found(child_index);
                return;
            }
        }
        self.stats.max_frontier = self.stats.max_frontier.max(self.frontier.len());
    }

    fn found(&mut self, goal_index: usize) {
        let mut indices = Vec::new();
        let mut current = Some(goal_index);
        while let Some(index) = current {
            indices.push(index);
            current = self.nodes[index].parent;
        }
        indices.reverse();

        let path = indices
            .iter()
            .map(|&i| self.nodes[i].state.clone())
            .collect();
        let moves = indices.iter().filter_map(|&i| self.nodes[i].mv).collect();

        log::debug!(
            "goal reached at depth {} after {} expansions",
            self.nodes[goal_index].depth,
            self.stats.expansions
        );
        self.outcome = Some(SearchOutcome::Found(Solution {
            path,
            moves,
            stats: self.stats,
        }));
    }
}

/// One recursion level of the backtracking search.
struct Frame {
    /// Index into `BacktrackSearch::pairs` of the next swap to try.
    cursor: usize,
    /// The swap this level currently has applied to the working grid.
    applied: Option<usize>,
}

/// Bounded recursive backtracking over swaps, unrolled onto an explicit stack.
///
/// At each level every pair `a < b` is tried in order: the swap is applied to the
/// working grid and reported with delta `+1`, the goal is tested, and the search
/// descends. When a level runs out of pairs its swap is undone and reported with
/// delta `-1`. A level never tries the swap its parent just made, since that would
/// only restore the parent's grid.
///
/// Each unit of work applies or undoes one swap.
pub struct BacktrackSearch {
    goal: GoalMode,
    max_depth: usize,
    root: TileState,
    current: TileState,
    pairs: Vec<(usize, usize)>,
    frames: Vec<Frame>,
    stats: SearchStats,
    outcome: Option<SearchOutcome>,
}

impl BacktrackSearch {
    pub fn new(root: TileState, config: &SearchConfig) -> Self {
        let n = root.len();
        let pairs = (0..n)
            .flat_map(|a| ((a + 1)..n).map(move |b| (a, b)))
            .collect();

        let mut search = BacktrackSearch {
            goal: config.goal,
            max_depth: config.max_backtrack_depth,
            current: root.clone(),
            root,
            pairs,
            frames: Vec::new(),
            stats: SearchStats::default(),
            outcome: None,
        };

        if search.goal.is_solved(&search.root) {
            search.found();
        } else if search.max_depth == 0 {
            search.outcome = Some(SearchOutcome::Exhausted(search.stats));
        } else {
            search.frames.push(Frame {
                cursor: 0,
                applied: None,
            });
        }
        search
    }

    /// Advances the search by up to `work` swaps or undos, reporting each to
    /// `observer`.
    pub fn step(&mut self, work: usize, observer: &mut dyn StepObserver) -> SearchPhase {
        for _ in 0..work {
            if self.outcome.is_some() {
                break;
            }
            self.advance(observer);
        }
        self.phase()
    }

    pub fn phase(&self) -> SearchPhase {
        match self.outcome {
            None => SearchPhase::Running,
            Some(SearchOutcome::Found(_)) => SearchPhase::Found,
            Some(SearchOutcome::Exhausted(_)) => SearchPhase::Exhausted,
        }
    }

    /// Runs the search to its end, reporting every step to `observer`.
    pub fn finish(mut self, observer: &mut dyn StepObserver) -> SearchOutcome {
        while self.outcome.is_none() {
            self.advance(observer);
        }
        self.outcome.unwrap_or(SearchOutcome::Exhausted(self.stats))
    }

    /// The working grid: the root with every currently applied swap.
    pub fn current(&self) -> &TileState {
        &self.current
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    fn advance(&mut self, observer: &mut dyn StepObserver) {
        let level = self.frames.len();
        let Some(frame) = self.frames.last_mut() else {
            self.outcome = Some(SearchOutcome::Exhausted(self.stats));
            return;
        };

        // Coming back from a failed descent: undo this level's swap first.
        if let Some(applied) = frame.applied.take() {
            let (a, b) = self.pairs[applied];
            self.current = self.current.swapped(a, b);
            observer.on_step(&self.current, -1);
            return;
        }

        let parent_swap = level
            .checked_sub(2)
            .and_then(|parent| self.frames[parent].applied);
        let frame = &mut self.frames[level - 1];
        let next = (frame.cursor..self.pairs.len()).find(|&p| Some(p) != parent_swap);

        let Some(pair_index) = next else {
            self.frames.pop();
            if self.frames.is_empty() {
                log::debug!(
                    "backtracking exhausted after {} swaps",
                    self.stats.expansions
                );
                self.outcome = Some(SearchOutcome::Exhausted(self.stats));
            }
            return;
        };

        frame.cursor = pair_index + 1;
        frame.applied = Some(pair_index);
        let (a, b) = self.pairs[pair_index];
        self.current = self.current.swapped(a, b);
        self.stats.expansions += 1;
        self.stats.generated += 1;
        observer.on_step(&self.current, 1);

        if self.goal.is_solved(&self.current) {
            self.found();
        } else if level < self.max_depth {
            self.frames.push(Frame {
                cursor: 0,
                applied: None,
            });
            self.stats.max_frontier = self.stats.max_frontier.max(self.frames.len());
        }
    }

    fn found(&mut self) {
        let moves: Vec<Move> = self
            .frames
            .iter()
            .filter_map(|frame| frame.applied)
            .map(|p| {
                let (a, b) = self.pairs[p];
                Move::Swap { a, b }
            })
            .collect();

        let mut path = Vec::with_capacity(moves.len() + 1);
        path.push(self.root.clone());
        for mv in &moves {
            let next = mv.apply(&path[path.len() - 1]);
            path.push(next);
        }

        log::debug!(
            "backtracking solved the grid with {} swaps after {} tried",
            moves.len(),
            self.stats.expansions
        );
        self.outcome = Some(SearchOutcome::Found(Solution {
            path,
            moves,
            stats: self.stats,
        }));
    }
}

/// A search of any strategy.
pub enum Search {
    Frontier(FrontierSearch),
    Backtrack(BacktrackSearch),
}

impl Search {
    pub fn new(root: TileState, config: &SearchConfig) -> Self {
        log::debug!(
            "starting {:?} search on a {}x{} grid ({:?} goal, {:?} moves, budget {})",
            config.strategy,
            root.grid_size(),
            root.grid_size(),
            config.goal,
            config.moves,
            match config.strategy {
                SearchStrategy::Backtracking => config.max_backtrack_depth,
                _ => config.max_depth,
            }
        );
        match config.strategy {
            SearchStrategy::Backtracking => Search::Backtrack(BacktrackSearch::new(root, config)),
            SearchStrategy::DepthFirst | SearchStrategy::BestFirst => {
                Search::Frontier(FrontierSearch::new(root, config))
            }
        }
    }

    /// Advances the search by up to `work` units. Only backtracking reports steps.
    pub fn step(&mut self, work: usize, observer: &mut dyn StepObserver) -> SearchPhase {
        match self {
            Search::Frontier(search) => search.step(work),
            Search::Backtrack(search) => search.step(work, observer),
        }
    }

    pub fn phase(&self) -> SearchPhase {
        match self {
            Search::Frontier(search) => search.phase(),
            Search::Backtrack(search) => search.phase(),
        }
    }

    pub fn finish(self, observer: &mut dyn StepObserver) -> SearchOutcome {
        match self {
            Search::Frontier(search) => search.finish(),
            Search::Backtrack(search) => search.finish(observer),
        }
    }
}

/// Searches from `root` until a goal is found or the budget runs out.
///
/// Backtracking steps are not reported; use `solve_with_observer` to watch them.
///
/// # Examples
/// ```
/// use hue_puzzle_solver::engine::{Rgb, TileState};
/// use hue_puzzle_solver::solver::{solve, SearchConfig};
/// let solved = TileState::from_palette(&[Rgb::new(0, 0, 0), Rgb::new(90, 90, 90)]).unwrap();
/// let outcome = solve(&solved.swapped(1, 2), &SearchConfig::default());
/// assert!(outcome.is_found());
/// ```
pub fn solve(root: &TileState, config: &SearchConfig) -> SearchOutcome {
    solve_with_observer(root, config, &mut |_: &TileState, _: i32| {})
}

/// Like `solve`, but reports every backtracking step to `observer`.
pub fn solve_with_observer(
    root: &TileState,
    config: &SearchConfig,
    observer: &mut dyn StepObserver,
) -> SearchOutcome {
    let outcome = Search::new(root.clone(), config).finish(observer);
    let stats = outcome.stats();
    match &outcome {
        SearchOutcome::Found(solution) => log::info!(
            "solution with {} moves found after {} expansions",
            solution.len(),
            stats.expansions
        ),
        SearchOutcome::Exhausted(_) => log::info!(
            "no solution within budget ({} expansions, {} generated)",
            stats.expansions,
            stats.generated
        ),
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Rgb, Tile};
    use crate::goal::{is_global_order_solved, is_row_gradient_solved};

    fn sorted_2x2() -> TileState {
        TileState::from_palette(&[Rgb::new(10, 10, 10), Rgb::new(200, 50, 50)]).unwrap()
    }

    fn permuted(state: &TileState, order: &[usize]) -> TileState {
        let tiles: Vec<Tile> = order.iter().map(|&i| state.tiles()[i]).collect();
        TileState::new(tiles).unwrap()
    }

    #[test]
    fn test_solved_root_is_a_one_node_path() {
        let root = sorted_2x2();
        let outcome = solve(&root, &SearchConfig::default());
        let solution = outcome.solution().expect("already solved");
        assert_eq!(solution.path, vec![root]);
        assert!(solution.is_empty());
        assert_eq!(solution.next_state(), None);
        assert_eq!(solution.stats.expansions, 1);
    }

    #[test]
    fn test_dfs_solves_reversed_2x2_within_budget() {
        let root = permuted(&sorted_2x2(), &[3, 2, 1, 0]);
        let config = SearchConfig::default().with_max_depth(10);
        let outcome = solve(&root, &config);

        let solution = outcome.solution().expect("reversed 2x2 should be solved");
        assert!(is_global_order_solved(solution.final_state()));
        assert_eq!(solution.path[0], root);
        assert_eq!(solution.path.len(), solution.moves.len() + 1);
        assert!(solution.stats.expansions <= 10);
        for (k, mv) in solution.moves.iter().enumerate() {
            assert_eq!(mv.apply(&solution.path[k]), solution.path[k + 1]);
        }
    }

    #[test]
    fn test_dfs_solves_every_2x2_permutation() {
        let sorted = sorted_2x2();
        let orders = [
            [0, 1, 3, 2],
            [1, 0, 2, 3],
            [2, 3, 0, 1],
            [3, 1, 2, 0],
            [1, 3, 0, 2],
            [3, 2, 1, 0],
        ];
        for order in orders {
            let root = permuted(&sorted, &order);
            let outcome = solve(&root, &SearchConfig::default().with_max_depth(10));
            assert!(outcome.is_found(), "order {:?}", order);
        }
    }

    #[test]
    fn test_dfs_catches_goal_on_generation() {
        let sorted = sorted_2x2();
        let root = permuted(&sorted, &[0, 1, 3, 2]);
        let config = SearchConfig::default()
            .with_moves(MoveModel::Swap)
            .with_max_depth(2);
        let mut search = FrontierSearch::new(root.clone(), &config);
        assert_eq!(search.step(1), SearchPhase::Found);
        // The goal is one swap away and is caught when generated.
        let outcome = search.finish();
        let solution = outcome.solution().unwrap();
        assert_eq!(solution.moves, vec![Move::Swap { a: 2, b: 3 }]);
        assert_eq!(solution.stats.expansions, 1);
    }

    #[test]
    fn test_exhausted_respects_budget() {
        let root = TileState::random(3, 77).unwrap();
        for budget in [0, 1, 5, 40] {
            let config = SearchConfig::default().with_max_depth(budget);
            let outcome = solve(&root, &config);
            assert!(outcome.stats().expansions <= budget);
            if budget == 0 {
                assert_eq!(outcome, SearchOutcome::Exhausted(SearchStats {
                    max_frontier: 1,
                    ..SearchStats::default()
                }));
            }
        }
    }

    #[test]
    fn test_visited_states_are_never_reexpanded() {
        let root = TileState::random(3, 8).unwrap();
        for moves in [MoveModel::Relocation, MoveModel::Swap] {
            let config = SearchConfig::default()
                .with_moves(moves)
                .with_max_depth(60);
            let mut search = FrontierSearch::new(root.clone(), &config);
            while search.step(7) == SearchPhase::Running {}
            let stats = *search.stats();
            assert_eq!(stats.expansions, stats.visited);
            assert!(search.is_visited(&root));
        }
    }

    #[test]
    fn test_depth_filter_stops_at_root_when_budget_is_one() {
        // Children would sit at depth 1, which is not below a budget of 1.
        let root = permuted(&sorted_2x2(), &[1, 0, 2, 3]);
        let config = SearchConfig::default().with_max_depth(1);
        let outcome = solve(&root, &config);
        assert_eq!(
            outcome,
            SearchOutcome::Exhausted(SearchStats {
                expansions: 1,
                generated: 0,
                visited: 1,
                max_frontier: 1,
            })
        );
    }

    #[test]
    fn test_priority_saturates() {
        let mut node = SearchNode::root(sorted_2x2());
        node.cost = 4;
        node.heuristic = 3;
        assert_eq!(node.priority(), 7);

        node.cost = usize::MAX;
        assert_eq!(node.priority(), u32::MAX);

        node.cost = 10;
        node.heuristic = u32::MAX - 5;
        assert_eq!(node.priority(), u32::MAX);
    }

    #[test]
    fn test_best_first_finds_short_paths() {
        let sorted = TileState::from_palette(&[
            Rgb::new(0, 0, 0),
            Rgb::new(0, 0, 90),
            Rgb::new(0, 0, 180),
        ])
        .unwrap();
        let root = sorted.swapped(0, 8).swapped(3, 4);
        let config = SearchConfig::default()
            .with_strategy(SearchStrategy::BestFirst)
            .with_moves(MoveModel::Swap)
            .with_max_depth(200);
        let outcome = solve(&root, &config);
        let solution = outcome.solution().expect("two swaps away");
        assert_eq!(solution.len(), 2);
        assert_eq!(solution.final_state(), &sorted);
    }

    #[test]
    fn test_stepped_search_matches_run_to_completion() {
        let root = TileState::random(2, 3).unwrap();
        let config = SearchConfig::default().with_max_depth(50);

        let mut stepped = Search::new(root.clone(), &config);
        let mut ticks = 0;
        while stepped.step(1, &mut |_: &TileState, _: i32| {}) == SearchPhase::Running {
            ticks += 1;
            assert!(ticks <= 1_000, "search did not terminate");
        }
        let stepped = stepped.finish(&mut |_: &TileState, _: i32| {});

        assert_eq!(stepped, solve(&root, &config));
    }

    #[test]
    fn test_backtracking_already_solved() {
        let root = sorted_2x2();
        let mut steps = 0;
        let outcome = solve_with_observer(
            &root,
            &SearchConfig::backtracking(),
            &mut |_: &TileState, _: i32| steps += 1,
        );
        let solution = outcome.solution().unwrap();
        assert!(solution.is_empty());
        assert_eq!(steps, 0);
    }

    #[test]
    fn test_backtracking_reaches_row_gradient() {
        let sorted = sorted_2x2();
        for order in [[1, 0, 3, 2], [2, 3, 0, 1], [0, 2, 1, 3], [3, 0, 2, 1]] {
            let root = permuted(&sorted, &order);
            if is_row_gradient_solved(&root) {
                continue;
            }
            let mut live = root.clone();
            let mut net = 0;
            let outcome = solve_with_observer(
                &root,
                &SearchConfig::backtracking(),
                &mut |next: &TileState, delta: i32| {
                    live = next.clone();
                    net += delta;
                },
            );
            let solution = outcome.solution().expect("2x2 should be solvable");
            assert!(is_row_gradient_solved(solution.final_state()));
            assert_eq!(&live, solution.final_state());
            assert_eq!(net as usize, solution.len());
            for (k, mv) in solution.moves.iter().enumerate() {
                assert!(matches!(mv, Move::Swap { .. }));
                assert_eq!(mv.apply(&solution.path[k]), solution.path[k + 1]);
            }
        }
    }

    #[test]
    fn test_backtracking_reports_undos() {
        // Depth 1 tries every single swap and undoes each failed one.
        let sorted = sorted_2x2();
        let root = permuted(&sorted, &[3, 0, 2, 1]);
        assert!(!is_row_gradient_solved(&root));

        let mut events = Vec::new();
        let config = SearchConfig::backtracking().with_max_backtrack_depth(1);
        let outcome = solve_with_observer(&root, &config, &mut |_: &TileState, delta: i32| {
            events.push(delta)
        });

        if outcome.is_found() {
            let forward = events.iter().filter(|&&d| d == 1).count();
            let back = events.iter().filter(|&&d| d == -1).count();
            assert_eq!(forward, back + 1);
        } else {
            assert_eq!(events.len(), 12); // six swaps, each undone
            assert_eq!(events.iter().sum::<i32>(), 0);
        }
    }

    #[test]
    fn test_backtracking_zero_depth_is_exhausted() {
        let root = permuted(&sorted_2x2(), &[3, 0, 2, 1]);
        let config = SearchConfig::backtracking().with_max_backtrack_depth(0);
        assert!(!solve(&root, &config).is_found());
    }

    #[test]
    fn test_backtracking_never_undoes_parent_swap_directly() {
        let root = permuted(&sorted_2x2(), &[3, 0, 2, 1]);
        let config = SearchConfig::backtracking().with_max_backtrack_depth(3);
        let mut search = BacktrackSearch::new(root, &config);
        let mut observer = |_: &TileState, _: i32| {};
        while search.step(1, &mut observer) == SearchPhase::Running {
            let applied: Vec<usize> = search.frames.iter().filter_map(|f| f.applied).collect();
            for pair in applied.windows(2) {
                assert_ne!(pair[0], pair[1]);
            }
        }
    }
}
