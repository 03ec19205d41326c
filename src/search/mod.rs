//! Branch-and-bound invasion search.
//!
//! ## Overview
//!
//! A search runs two passes over the same starting army and nation:
//!
//! - **Linear**: the army never splits. Every wave sends all units at one
//!   border fortification, or rests them all. The depth of its best solution
//!   bounds the next pass.
//! - **Parallel**: the army splits freely across the border fortifications
//!   each wave. With `optimize` set, the first solution found bounds all
//!   further search to its depth.
//!
//! States are kept in an arena ([`SearchTree`]) and expanded depth-first
//! from a stack. A state is pruned when its wave gained nothing, when it has
//! reached the depth bound, or when the army can never take the hardest
//! border fortification.
//!
//! ## Usage
//!
//! ```rust
//! use invasion_solver::army::Army;
//! use invasion_solver::nation::Nation;
//! use invasion_solver::search::{InvasionSearch, SearchConfig};
//!
//! let nation = Nation::with_fortifications(3).unwrap();
//! let search = InvasionSearch::new(SearchConfig::default());
//!
//! let results = search.search(&Army::new(4, 1, 1), &nation).unwrap();
//! let best = results.best_solution();
//! println!("{} waves, complete: {}", best.num_waves(), best.is_complete());
//! ```
//!
//! ## Cost
//!
//! Dividing an army of `n` units enumerates up to `2^n` sub-armies for each
//! border fortification of each state. `SearchConfig::max_army_size` caps `n`
//! (at most 63, the width of the combination mask).

pub mod config;
pub mod divide;
#[allow(clippy::module_inception)]
pub mod search;
pub mod solution;
pub mod stats;
pub mod tree;

pub use config::{SearchConfig, MAX_SUBDIVISION_WIDTH};
pub use divide::{is_hopeless, plan_waves};
pub use search::InvasionSearch;
pub use solution::{InvasionSolution, InvasionWave, SearchResults, WaveOutcome};
pub use stats::{PassStats, SearchProgress};
pub use tree::{SearchState, SearchTree, StateId};
