//! Search statistics and live progress counters.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

/// Statistics collected during one search pass.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PassStats {
    /// States created, including the root.
    pub nodes_created: u64,

    /// Solutions counted under the pass's recording rules.
    pub solutions_found: u64,

    /// States divided into children.
    pub states_expanded: u64,

    /// States discarded without expansion.
    pub states_pruned: u64,

    /// Largest frontier size observed.
    pub peak_frontier: usize,

    /// Number of waves in the best complete solution, if any.
    pub best_depth: Option<u32>,

    /// Time spent in the pass (microseconds).
    pub time_us: u64,
}

impl PassStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction of created states that were solutions.
    #[must_use]
    pub fn solution_ratio(&self) -> f64 {
        if self.nodes_created == 0 {
            0.0
        } else {
            self.solutions_found as f64 / self.nodes_created as f64
        }
    }

    /// States created per second.
    #[must_use]
    pub fn nodes_per_second(&self) -> f64 {
        if self.time_us == 0 {
            0.0
        } else {
            self.nodes_created as f64 / (self.time_us as f64 / 1_000_000.0)
        }
    }
}

/// Counters a poller can sample while a search runs on another thread.
///
/// The search only stores into these counters; it never waits on readers.
#[derive(Debug, Default)]
pub struct SearchProgress {
    open_states: AtomicUsize,
    solutions_found: AtomicU64,
}

impl SearchProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current size of the active pass's frontier.
    #[must_use]
    pub fn open_states(&self) -> usize {
        self.open_states.load(Ordering::Relaxed)
    }

    /// Solutions counted so far by the active pass.
    #[must_use]
    pub fn solutions_found(&self) -> u64 {
        self.solutions_found.load(Ordering::Relaxed)
    }

    pub(crate) fn record(&self, open_states: usize, solutions_found: u64) {
        self.open_states.store(open_states, Ordering::Relaxed);
        self.solutions_found.store(solutions_found, Ordering::Relaxed);
    }
}
