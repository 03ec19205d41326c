//! The defending nation.
//!
//! - [`Fortification`]: a capturable position whose offense and defense grow
//!   with its level.
//! - [`NationLayout`]: a square occupancy grid a nation is built from.
//! - [`Nation`]: the fortifications, their capture state, and the protection
//!   graph that decides which of them can be assaulted.

pub mod fortification;
pub mod layout;
#[allow(clippy::module_inception)]
pub mod nation;

pub use fortification::{Fortification, FortificationId, GridPoint};
pub use layout::NationLayout;
pub use nation::{InvasionDirection, Nation, ProtectedSet};
