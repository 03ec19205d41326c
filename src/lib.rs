//! # invasion-solver
//!
//! Plans the fastest campaign for an attacking army against a grid of
//! fortifications.
//!
//! ## Design Principles
//!
//! 1. **Deterministic Combat**: Whether a sub-army can take a fortification,
//!    and the damage it takes doing so, is decided up front. No dice.
//!
//! 2. **Waves, Not Turns**: Each step of the campaign is a wave of
//!    simultaneous assaults. Units not assigned to a fortification rest and
//!    heal.
//!
//! 3. **Fewest Waves Wins**: Solutions are ranked by wave count, then by the
//!    value of the surviving army.
//!
//! ## Architecture
//!
//! - **Branch and Bound**: Depth-first search over army subdivisions, bounded
//!   by the shallowest solution found so far.
//!
//! - **Persistent Data Structures**: Nations advance by O(1) clones via
//!   `im-rs`; the protection graph is built once and shared.
//!
//! - **Arena States**: Search states refer to their parent by handle, so
//!   solutions are rebuilt without ownership cycles.
//!
//! ## Modules
//!
//! - `core`: Unit classes, combat constants, configuration errors
//! - `army`: The attacking force
//! - `combat`: Assault evaluation and damage distribution
//! - `nation`: Fortifications, layouts, and the protection graph
//! - `search`: The two-pass search and its result records

pub mod core;
pub mod army;
pub mod combat;
pub mod nation;
pub mod search;

// Re-export commonly used types
pub use crate::core::{ConfigError, Result, UnitClass};

pub use crate::army::Army;

pub use crate::combat::{apply_damage, AssaultTemplate};

pub use crate::nation::{
    Fortification, FortificationId, GridPoint,
    InvasionDirection, Nation, NationLayout,
};

pub use crate::search::{
    InvasionSearch, SearchConfig, SearchProgress,
    InvasionSolution, InvasionWave, SearchResults, PassStats,
};
