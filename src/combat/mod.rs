//! Deterministic combat resolution.
//!
//! Combat is decided entirely up front: [`AssaultTemplate::evaluate`] checks
//! whether a sub-army can take a fortification and simulates the damage it
//! will take; [`AssaultTemplate::resolve`] then distributes that damage over
//! the sub-army with [`apply_damage`] and optionally heals the survivors.

pub mod assault;
pub mod damage;

pub use assault::{simulate_fortification_damage, AssaultTemplate};
pub use damage::apply_damage;
