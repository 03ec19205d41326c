//! Search configuration parameters.

use serde::{Deserialize, Serialize};

use crate::core::{ConfigError, Result};
use crate::nation::InvasionDirection;

/// Widest army the subset enumeration can address with a `u64` mask.
pub const MAX_SUBDIVISION_WIDTH: usize = 63;

/// Search configuration parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Bound the parallel pass to the depth of the first solution it finds
    /// (default: true). Without it every solution within the linear pass's
    /// depth is explored and counted.
    pub optimize: bool,

    /// Direction the invasion travels (default: East).
    pub direction: InvasionDirection,

    /// Largest army the search accepts (default: 16).
    ///
    /// Dividing an army of `n` units enumerates up to `2^n` sub-armies per
    /// border fortification per state, which dominates search cost.
    pub max_army_size: usize,

    /// Heal sub-armies after every assault (default: true).
    pub heal_after_assault: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            optimize: true,
            direction: InvasionDirection::East,
            max_army_size: 16,
            heal_after_assault: true,
        }
    }
}

impl SearchConfig {
    /// Set whether the parallel pass is optimized.
    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    /// Set the invasion direction.
    pub fn with_direction(mut self, direction: InvasionDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Set the largest accepted army.
    pub fn with_max_army_size(mut self, size: usize) -> Self {
        self.max_army_size = size;
        self
    }

    /// Set whether sub-armies heal after assaults.
    pub fn with_healing(mut self, heal: bool) -> Self {
        self.heal_after_assault = heal;
        self
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_army_size > MAX_SUBDIVISION_WIDTH {
            return Err(ConfigError::SubdivisionLimitTooLarge(self.max_army_size));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();
        assert!(config.optimize);
        assert_eq!(config.direction, InvasionDirection::East);
        assert_eq!(config.max_army_size, 16);
        assert!(config.heal_after_assault);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = SearchConfig::default()
            .with_optimize(false)
            .with_direction(InvasionDirection::North)
            .with_max_army_size(8)
            .with_healing(false);

        assert!(!config.optimize);
        assert_eq!(config.direction, InvasionDirection::North);
        assert_eq!(config.max_army_size, 8);
        assert!(!config.heal_after_assault);
    }

    #[test]
    fn test_validate_rejects_wide_armies() {
        let config = SearchConfig::default().with_max_army_size(64);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SubdivisionLimitTooLarge(64))
        ));
    }

    #[test]
    fn test_serialization() {
        let config = SearchConfig::default().with_direction(InvasionDirection::West);
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: SearchConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.direction, InvasionDirection::West);
        assert_eq!(config.max_army_size, deserialized.max_army_size);
    }
}
