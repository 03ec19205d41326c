//! Core types shared by every subsystem: unit classes, combat constants,
//! and configuration errors.

pub mod constants;
pub mod error;

pub use constants::{fortification_defense, fortification_offense, UnitClass};
pub use error::{ConfigError, Result};
