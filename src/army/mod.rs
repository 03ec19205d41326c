//! The attacking force.
//!
//! See [`Army`] for the model: sorted per-class health lists with cached
//! damage, health, and value aggregates.

#[allow(clippy::module_inception)]
mod army;

pub use army::{Army, UnitHealths};
