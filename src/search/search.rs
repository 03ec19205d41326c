//! The two-pass invasion search.
//!
//! Each pass is a depth-first branch and bound over army subdivisions. The
//! frontier is a stack: the most recently created state is expanded next,
//! and since division yields the most committed waves first the search
//! reaches all-out assaults before cautious ones at equal depth.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, trace};

use super::config::SearchConfig;
use super::divide::{is_hopeless, plan_waves};
use super::solution::{InvasionSolution, InvasionWave, SearchResults};
use super::stats::{PassStats, SearchProgress};
use super::tree::{SearchState, SearchTree, StateId};
use crate::army::Army;
use crate::core::{ConfigError, Result};
use crate::nation::Nation;

/// Search context.
///
/// Owns the configuration and the progress counters; every call to
/// [`search`](Self::search) runs both passes from scratch.
pub struct InvasionSearch {
    config: SearchConfig,
    progress: Arc<SearchProgress>,
}

impl InvasionSearch {
    /// Create a new search context.
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            progress: Arc::new(SearchProgress::new()),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Counters that can be sampled from another thread while a search runs.
    #[must_use]
    pub fn progress(&self) -> Arc<SearchProgress> {
        Arc::clone(&self.progress)
    }

    /// Search for the fastest way for `army` to capture all of `nation`.
    ///
    /// Runs the linear pass, which never splits the army, then the parallel
    /// pass, bounded by the depth the linear pass achieved. If `nation` has
    /// not yet been invaded the invasion begins in the configured direction.
    pub fn search(&self, army: &Army, nation: &Nation) -> Result<SearchResults> {
        let (root, baseline) = self.prepare(army, nation)?;

        let linear = Pass::new(PassKind::Linear, root.clone(), baseline, &self.config, &self.progress).run();
        let bound = linear.stats.best_depth;

        let parallel = Pass::new(PassKind::Parallel, root, baseline, &self.config, &self.progress)
            .with_depth_bound(bound)
            .run();

        Ok(SearchResults {
            nodes_created: parallel.stats.nodes_created,
            solutions_found: parallel.stats.solutions_found,
            linear_waves: linear.stats.best_depth,
            linear_solution: linear.solution,
            parallel_waves: parallel.stats.best_depth,
            parallel_solution: parallel.solution,
            linear_stats: linear.stats,
            parallel_stats: parallel.stats,
        })
    }

    fn prepare(&self, army: &Army, nation: &Nation) -> Result<(SearchState, f64)> {
        self.config.validate()?;

        if army.is_empty() {
            return Err(ConfigError::EmptyArmy);
        }
        if army.size() > self.config.max_army_size {
            return Err(ConfigError::ArmyTooLarge {
                size: army.size(),
                limit: self.config.max_army_size,
            });
        }
        if nation.is_empty() {
            return Err(ConfigError::NoFortifications);
        }

        let mut nation = nation.clone();
        match nation.direction() {
            None => nation.begin_invasion(self.config.direction),
            Some(direction) if direction == self.config.direction => {}
            Some(_) => return Err(ConfigError::InvasionAlreadyBegun),
        }

        let baseline = army.value();
        Ok((SearchState::root(army.clone(), nation, baseline), baseline))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PassKind {
    Linear,
    Parallel,
}

impl std::fmt::Display for PassKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PassKind::Linear => write!(f, "linear"),
            PassKind::Parallel => write!(f, "parallel"),
        }
    }
}

/// What happened to one popped state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StepOutcome {
    Solved { depth: u32 },
    Pruned { depth: u32 },
    Expanded { depth: u32, children: usize },
}

/// Best complete solution of a pass.
struct Incumbent {
    depth: u32,
    value: f64,
    army: Army,
    nation: Nation,
    waves: Vec<InvasionWave>,
}

/// Closest the pass came while nothing was solved.
struct Partial {
    remaining: usize,
    objective: f64,
    army: Army,
    nation: Nation,
    waves: Vec<InvasionWave>,
}

struct PassOutcome {
    solution: InvasionSolution,
    stats: PassStats,
}

/// One pass over the search tree, owning its frontier and bookkeeping.
struct Pass<'a> {
    kind: PassKind,
    tree: SearchTree,
    frontier: Vec<StateId>,
    root_army: Army,
    root_nation: Nation,
    baseline: f64,
    keep_together: bool,
    optimized: bool,
    heal_after: bool,
    depth_bound: Option<u32>,
    incumbent: Option<Incumbent>,
    partial: Option<Partial>,
    stats: PassStats,
    progress: &'a SearchProgress,
}

impl<'a> Pass<'a> {
    fn new(
        kind: PassKind,
        root: SearchState,
        baseline: f64,
        config: &SearchConfig,
        progress: &'a SearchProgress,
    ) -> Self {
        let root_army = root.army.clone();
        let root_nation = root.nation.clone();

        let mut tree = SearchTree::new();
        let root_id = tree.alloc(root);

        Self {
            kind,
            tree,
            frontier: vec![root_id],
            root_army,
            root_nation,
            baseline,
            keep_together: kind == PassKind::Linear,
            optimized: kind == PassKind::Linear || config.optimize,
            heal_after: config.heal_after_assault,
            depth_bound: None,
            incumbent: None,
            partial: None,
            stats: PassStats {
                nodes_created: 1,
                peak_frontier: 1,
                ..PassStats::default()
            },
            progress,
        }
    }

    fn with_depth_bound(mut self, bound: Option<u32>) -> Self {
        self.depth_bound = bound;
        self
    }

    fn run(mut self) -> PassOutcome {
        info!(pass = %self.kind, bound = ?self.depth_bound, optimized = self.optimized, "Starting search pass");
        let start = Instant::now();

        while self.step().is_some() {}

        self.stats.time_us = start.elapsed().as_micros() as u64;
        info!(
            pass = %self.kind,
            nodes_created = self.stats.nodes_created,
            solutions_found = self.stats.solutions_found,
            best_depth = ?self.stats.best_depth,
            peak_states = self.tree.peak(),
            "Finished search pass"
        );
        self.finish()
    }

    /// Pop and process one state. Returns `None` once the frontier is empty.
    fn step(&mut self) -> Option<StepOutcome> {
        let id = self.frontier.pop()?;
        let outcome = self.process(id);
        self.tree.settle(id);
        self.progress.record(self.frontier.len(), self.stats.solutions_found);
        Some(outcome)
    }

    fn process(&mut self, id: StateId) -> StepOutcome {
        let state = self.tree.get(id);
        let depth = state.depth;

        if state.is_solved() {
            self.record_solution(id);
            return StepOutcome::Solved { depth };
        }

        if self.incumbent.is_none() {
            self.consider_partial(id);
        }

        if self.is_disqualified(id) {
            self.stats.states_pruned += 1;
            return StepOutcome::Pruned { depth };
        }

        match self.expand(id) {
            Some(children) => StepOutcome::Expanded { depth, children },
            None => {
                self.stats.states_pruned += 1;
                StepOutcome::Pruned { depth }
            }
        }
    }

    fn is_disqualified(&self, id: StateId) -> bool {
        let state = self.tree.get(id);

        // Nothing captured and nothing gained.
        if !state.parent.is_none() && self.tree.get(state.parent).objective == state.objective {
            return true;
        }

        matches!(self.depth_bound, Some(bound) if state.depth >= bound)
    }

    /// Push every child of `id` onto the frontier. Returns `None` if the
    /// army can never take the hardest border fortification.
    fn expand(&mut self, id: StateId) -> Option<usize> {
        let state = self.tree.get(id);
        let border = state.nation.border_fortifications();
        if is_hopeless(&state.army, border) {
            trace!(state = %id, army = %state.army, "Army can never take the hardest border fortification");
            return None;
        }

        let children: Vec<SearchState> = plan_waves(&state.army, border, self.keep_together, self.optimized)
            .into_iter()
            .filter_map(|wave| {
                let outcome = wave.resolve(&state.nation, self.heal_after);
                if outcome.wasted_reserve {
                    return None;
                }
                Some(SearchState::child(
                    outcome.army,
                    outcome.nation,
                    state.depth + 1,
                    id,
                    wave,
                    self.baseline,
                ))
            })
            .collect();

        trace!(state = %id, depth = state.depth, children = children.len(), "Expanded state");

        // Reversed so the most committed wave is popped first.
        let count = children.len();
        for child in children.into_iter().rev() {
            let child_id = self.tree.alloc(child);
            self.frontier.push(child_id);
        }

        self.stats.nodes_created += count as u64;
        self.stats.states_expanded += 1;
        self.stats.peak_frontier = self.stats.peak_frontier.max(self.frontier.len());
        Some(count)
    }

    fn record_solution(&mut self, id: StateId) {
        let state = self.tree.get(id);
        let depth = state.depth;
        let value = state.army.value();

        let (count, replace) = match &self.incumbent {
            None => (true, true),
            Some(best) if depth < best.depth => {
                self.stats.solutions_found = 0;
                (true, true)
            }
            Some(best) if depth == best.depth => (true, value > best.value),
            Some(_) => (!self.optimized, false),
        };

        if count {
            self.stats.solutions_found += 1;
        }
        if !replace {
            return;
        }

        let tightens = self.incumbent.as_ref().map_or(true, |best| depth < best.depth);
        if self.optimized && tightens {
            self.depth_bound = Some(depth);
        }

        debug!(pass = %self.kind, depth, value, "New best solution");
        self.stats.best_depth = Some(depth);
        self.incumbent = Some(Incumbent {
            depth,
            value,
            army: state.army.clone(),
            nation: state.nation.clone(),
            waves: self.tree.path_to(id),
        });
    }

    fn consider_partial(&mut self, id: StateId) {
        let state = self.tree.get(id);
        let remaining = state.nation.num_remaining();

        let better = self.partial.as_ref().map_or(true, |best| {
            remaining < best.remaining || (remaining == best.remaining && state.objective < best.objective)
        });
        if !better {
            return;
        }

        debug!(pass = %self.kind, depth = state.depth, remaining, "New best partial invasion");
        self.partial = Some(Partial {
            remaining,
            objective: state.objective,
            army: state.army.clone(),
            nation: state.nation.clone(),
            waves: self.tree.path_to(id),
        });
    }

    fn finish(self) -> PassOutcome {
        let (army, nation, waves) = match (self.incumbent, self.partial) {
            (Some(best), _) => (best.army, best.nation, best.waves),
            (None, Some(partial)) => (partial.army, partial.nation, partial.waves),
            (None, None) => (self.root_army.clone(), self.root_nation.clone(), Vec::new()),
        };

        PassOutcome {
            solution: InvasionSolution::new(self.root_army, self.root_nation, army, nation, waves),
            stats: self.stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nation::InvasionDirection;

    fn invaded(count: usize) -> Nation {
        let mut nation = Nation::with_fortifications(count).unwrap();
        nation.begin_invasion(InvasionDirection::East);
        nation
    }

    fn pass<'a>(
        kind: PassKind,
        army: &Army,
        nation: Nation,
        config: &SearchConfig,
        progress: &'a SearchProgress,
    ) -> Pass<'a> {
        let baseline = army.value();
        let root = SearchState::root(army.clone(), nation, baseline);
        Pass::new(kind, root, baseline, config, progress)
    }

    /// Allocate a child of the root after `captures` border fortifications fall.
    fn child_state(pass: &mut Pass<'_>, army: Army, captures: usize, depth: u32) -> StateId {
        let root = pass.frontier[0];
        let mut nation = pass.root_nation.clone();
        for _ in 0..captures {
            let target = nation.border_fortifications()[0].clone();
            nation = nation.advance(&[target]);
        }
        let state = SearchState::child(army, nation, depth, root, InvasionWave::default(), pass.baseline);
        pass.tree.alloc(state)
    }

    #[test]
    fn test_single_fort_single_wave() {
        let search = InvasionSearch::new(SearchConfig::default());
        let results = search.search(&Army::new(2, 0, 0), &Nation::with_fortifications(1).unwrap()).unwrap();

        assert_eq!(results.linear_waves, Some(1));
        assert_eq!(results.parallel_waves, Some(1));
        assert!(results.best_solution().is_complete());
        assert_eq!(results.best_solution().final_army().soldiers(), &[62, 62]);
    }

    #[test]
    fn test_hopeless_army_returns_root_partial() {
        let search = InvasionSearch::new(SearchConfig::default());
        let results = search.search(&Army::new(1, 0, 0), &Nation::with_fortifications(1).unwrap()).unwrap();

        assert_eq!(results.solutions_found, 0);
        assert_eq!(results.nodes_created, 1);
        assert_eq!(results.parallel_waves, None);
        assert!(!results.parallel_solution.is_complete());
        assert_eq!(results.parallel_solution.num_waves(), 0);
    }

    #[test]
    fn test_input_validation() {
        let search = InvasionSearch::new(SearchConfig::default().with_max_army_size(2));
        let nation = Nation::with_fortifications(1).unwrap();

        assert!(matches!(search.search(&Army::empty(), &nation), Err(ConfigError::EmptyArmy)));
        assert!(matches!(
            search.search(&Army::new(3, 0, 0), &nation),
            Err(ConfigError::ArmyTooLarge { size: 3, limit: 2 })
        ));

        let mut north = Nation::with_fortifications(1).unwrap();
        north.begin_invasion(InvasionDirection::North);
        assert!(matches!(
            search.search(&Army::new(2, 0, 0), &north),
            Err(ConfigError::InvasionAlreadyBegun)
        ));
    }

    #[test]
    fn test_already_invaded_nation_accepted() {
        let search = InvasionSearch::new(SearchConfig::default());
        let results = search.search(&Army::new(2, 0, 0), &invaded(1)).unwrap();
        assert_eq!(results.parallel_waves, Some(1));
    }

    #[test]
    fn test_depth_bound_monotonic() {
        let config = SearchConfig::default();
        let progress = SearchProgress::new();
        let army = Army::new(3, 0, 1);
        let mut pass = pass(PassKind::Parallel, &army, invaded(3), &config, &progress);

        let mut best: Option<u32> = None;
        let mut solved = 0;
        while let Some(outcome) = pass.step() {
            match outcome {
                StepOutcome::Solved { depth } => {
                    solved += 1;
                    best = Some(best.map_or(depth, |b| b.min(depth)));
                }
                StepOutcome::Expanded { depth, .. } => {
                    if let Some(bound) = best {
                        assert!(depth < bound, "Expanded depth {depth} after a solution at {bound}");
                    }
                }
                StepOutcome::Pruned { .. } => {}
            }
        }
        assert!(solved > 0);
        assert_eq!(pass.stats.best_depth, best);
    }

    #[test]
    fn test_linear_pass_never_splits() {
        let config = SearchConfig::default();
        let progress = SearchProgress::new();
        let army = Army::new(4, 1, 0);
        let outcome = pass(PassKind::Linear, &army, invaded(4), &config, &progress).run();

        assert!(outcome.solution.is_complete());
        for wave in outcome.solution.waves() {
            assert!(wave.len() == 1, "Linear wave split the army: {:?}", wave);
        }
    }

    #[test]
    fn test_parallel_no_worse_than_linear() {
        let search = InvasionSearch::new(SearchConfig::default());
        let army = Army::new(3, 1, 1);
        let results = search.search(&army, &Nation::with_fortifications(3).unwrap()).unwrap();

        let linear = results.linear_waves.unwrap();
        let parallel = results.parallel_waves.unwrap();
        assert!(parallel <= linear);
    }

    #[test]
    fn test_unoptimized_counts_more_solutions() {
        let army = Army::new(3, 0, 1);
        let nation = Nation::with_fortifications(2).unwrap();

        let optimized = InvasionSearch::new(SearchConfig::default()).search(&army, &nation).unwrap();
        let exhaustive = InvasionSearch::new(SearchConfig::default().with_optimize(false))
            .search(&army, &nation)
            .unwrap();

        assert_eq!(optimized.parallel_waves, exhaustive.parallel_waves);
        assert!(exhaustive.nodes_created >= optimized.nodes_created);
        assert!(exhaustive.solutions_found > 0);
    }

    #[test]
    fn test_progress_drained_after_pass() {
        let search = InvasionSearch::new(SearchConfig::default());
        let progress = search.progress();
        let results = search.search(&Army::new(2, 0, 0), &Nation::with_fortifications(1).unwrap()).unwrap();

        assert_eq!(progress.open_states(), 0);
        assert_eq!(progress.solutions_found(), results.solutions_found);
    }

    #[test]
    fn test_hopeless_root_pruned() {
        let config = SearchConfig::default();
        let progress = SearchProgress::new();
        let mut pass = pass(PassKind::Parallel, &Army::new(0, 2, 0), invaded(1), &config, &progress);

        assert_eq!(pass.step(), Some(StepOutcome::Pruned { depth: 0 }));
        assert_eq!(pass.step(), None);
        assert_eq!(pass.stats.states_pruned, 1);
    }

    #[test]
    fn test_most_committed_wave_popped_first() {
        let config = SearchConfig::default();
        let progress = SearchProgress::new();
        let wounded = Army::from_units([90, 90], [40], []);
        let mut pass = pass(PassKind::Linear, &wounded, invaded(1), &config, &progress);

        // Root expands into the assault and the healing rest; the assault
        // is solved on the very next step.
        assert_eq!(pass.step(), Some(StepOutcome::Expanded { depth: 0, children: 2 }));
        assert_eq!(pass.step(), Some(StepOutcome::Solved { depth: 1 }));
    }

    #[test]
    fn test_record_solution_optimized() {
        let config = SearchConfig::default();
        let progress = SearchProgress::new();
        let mut pass = pass(PassKind::Parallel, &Army::new(2, 0, 0), invaded(1), &config, &progress);
        assert!(pass.optimized);

        let first = child_state(&mut pass, Army::from_units([50], [], []), 1, 3);
        pass.record_solution(first);
        assert_eq!(pass.stats.solutions_found, 1);
        assert_eq!(pass.depth_bound, Some(3));

        // Same depth: always counted, kept only if strictly more valuable.
        let stronger = child_state(&mut pass, Army::from_units([90], [], []), 1, 3);
        pass.record_solution(stronger);
        let equal = child_state(&mut pass, Army::from_units([], [], [45]), 1, 3);
        pass.record_solution(equal);
        let weaker = child_state(&mut pass, Army::from_units([60], [], []), 1, 3);
        pass.record_solution(weaker);
        assert_eq!(pass.stats.solutions_found, 4);
        let best = pass.incumbent.as_ref().unwrap();
        assert_eq!(best.depth, 3);
        assert_eq!(best.army.soldiers(), &[90]);

        // Deeper solutions are ignored entirely.
        let deeper = child_state(&mut pass, Army::new(1, 0, 0), 1, 4);
        pass.record_solution(deeper);
        assert_eq!(pass.stats.solutions_found, 4);
        assert_eq!(pass.incumbent.as_ref().unwrap().army.soldiers(), &[90]);

        // A shallower solution restarts the count and tightens the bound.
        let shallower = child_state(&mut pass, Army::from_units([10], [], []), 1, 2);
        pass.record_solution(shallower);
        assert_eq!(pass.stats.solutions_found, 1);
        assert_eq!(pass.depth_bound, Some(2));
        assert_eq!(pass.stats.best_depth, Some(2));
        let best = pass.incumbent.as_ref().unwrap();
        assert_eq!(best.depth, 2);
        assert_eq!(best.army.soldiers(), &[10]);
    }

    #[test]
    fn test_record_solution_unoptimized() {
        let config = SearchConfig::default().with_optimize(false);
        let progress = SearchProgress::new();
        let mut pass = pass(PassKind::Parallel, &Army::new(2, 0, 0), invaded(1), &config, &progress);
        assert!(!pass.optimized);

        let first = child_state(&mut pass, Army::from_units([50], [], []), 1, 3);
        pass.record_solution(first);
        assert_eq!(pass.stats.solutions_found, 1);
        assert_eq!(pass.depth_bound, None);

        // Deeper solutions still count, but never replace the best.
        let deeper = child_state(&mut pass, Army::new(1, 0, 0), 1, 4);
        pass.record_solution(deeper);
        assert_eq!(pass.stats.solutions_found, 2);
        assert_eq!(pass.incumbent.as_ref().unwrap().depth, 3);
        assert_eq!(pass.incumbent.as_ref().unwrap().army.soldiers(), &[50]);

        let shallower = child_state(&mut pass, Army::from_units([10], [], []), 1, 2);
        pass.record_solution(shallower);
        assert_eq!(pass.stats.solutions_found, 1);
        assert_eq!(pass.depth_bound, None);
        assert_eq!(pass.stats.best_depth, Some(2));
        assert_eq!(pass.incumbent.as_ref().unwrap().depth, 2);
    }

    #[test]
    fn test_partial_prefers_fewest_remaining_then_lowest_objective() {
        let config = SearchConfig::default();
        let progress = SearchProgress::new();
        let mut pass = pass(PassKind::Parallel, &Army::new(2, 0, 0), invaded(2), &config, &progress);

        let battered = child_state(&mut pass, Army::from_units([50], [], []), 1, 1);
        pass.consider_partial(battered);

        // Unhurt, but nothing taken.
        let idle = child_state(&mut pass, Army::new(2, 0, 0), 0, 1);
        pass.consider_partial(idle);
        assert_eq!(pass.partial.as_ref().unwrap().army.soldiers(), &[50]);

        // Tied on remaining: the healthier army has the lower objective.
        let healthier = child_state(&mut pass, Army::from_units([90], [], []), 1, 1);
        pass.consider_partial(healthier);
        let middling = child_state(&mut pass, Army::from_units([70], [], []), 1, 2);
        pass.consider_partial(middling);

        let partial = pass.partial.as_ref().unwrap();
        assert_eq!(partial.remaining, 1);
        assert_eq!(partial.army.soldiers(), &[90]);
        assert_eq!(partial.objective, pass.tree.get(healthier).objective);
    }
}
