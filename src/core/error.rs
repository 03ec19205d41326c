//! Configuration errors.
//!
//! The search itself never fails: infeasible assaults and wasted waves are
//! pruned silently and an exhausted frontier still yields a best-effort
//! result. Errors only arise while validating input before a search starts,
//! or while encoding a result record for an external store.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Nation layout has no rows")]
    EmptyLayout,

    #[error("Nation layout must be square: row {row} has {len} cells, expected {expected}")]
    NonSquareLayout {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("Nation must contain at least one fortification")]
    NoFortifications,

    #[error("Army must contain at least one unit")]
    EmptyArmy,

    #[error("Army of {size} units exceeds the subdivision limit of {limit}")]
    ArmyTooLarge { size: usize, limit: usize },

    #[error("Subdivision limit {0} exceeds the 63-unit combination width")]
    SubdivisionLimitTooLarge(usize),

    #[error("Nation was already invaded from a different direction")]
    InvasionAlreadyBegun,

    #[error("Layout density {0} must lie in 0.0..=1.0")]
    InvalidDensity(f64),

    #[error("Encoding error: {0}")]
    Encoding(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
