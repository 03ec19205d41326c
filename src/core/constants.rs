//! Combat constants for invading units and defending fortifications.
//!
//! Every unit class has a fixed offense and maximum health. Fortifications
//! scale linearly with their level, so nations that are left alone grow
//! harder to crack each wave.

use serde::{Deserialize, Serialize};

/// Offense contributed by one soldier.
pub const SOLDIER_OFFENSE: u32 = 50;
/// Maximum (and starting) health of a soldier.
pub const SOLDIER_HEALTH: u16 = 100;
/// Per-soldier damage reduction factor when soldiers fight together.
pub const SOLDIER_STACKING_DEFENCE: u32 = 2;

/// Offense contributed by one archer before stacking.
pub const ARCHER_OFFENSE: u32 = 100;
/// Maximum (and starting) health of an archer.
pub const ARCHER_HEALTH: u16 = 50;
/// Extra offense each archer gains per additional archer in its group.
pub const ARCHER_STACKING_OFFENSE: u32 = 2;

/// Offense contributed by one healer.
pub const HEALER_OFFENSE: u32 = 5;
/// Maximum (and starting) health of a healer.
pub const HEALER_HEALTH: u16 = 40;
/// Health restored by a single healer after an assault.
pub const HEALER_HEALING: u16 = 5;
/// Extra healing per additional healer in the group.
pub const HEALER_STACKING_HEALING: u16 = 2;

/// Defense of a level 0 fortification.
pub const FORTIFICATION_DEFENSE: u32 = 80;
/// Offense of a level 0 fortification.
pub const FORTIFICATION_OFFENSE: u32 = 100;
/// Offense gained per fortification level.
pub const FORTIFICATION_OFFENSE_UPGRADE: u32 = 10;
/// Defense gained per fortification level.
pub const FORTIFICATION_DEFENSE_UPGRADE: u32 = 12;

/// Flat value every living unit adds to an army, on top of its health ratio.
pub const UNIT_BASE_VALUE: f64 = 10.0;

/// Value of a single uncaptured fortification in the search objective.
pub const FORTIFICATION_VALUE: f64 = 1000.0;

/// The three classes of invading unit.
///
/// Classes are always processed in declaration order: soldiers absorb
/// damage first, then healers, then archers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitClass {
    Soldier,
    Healer,
    Archer,
}

impl UnitClass {
    /// All classes in damage-absorption order.
    pub const ALL: [UnitClass; 3] = [UnitClass::Soldier, UnitClass::Healer, UnitClass::Archer];

    /// Base offense of one unit of this class.
    #[must_use]
    pub const fn offense(self) -> u32 {
        match self {
            UnitClass::Soldier => SOLDIER_OFFENSE,
            UnitClass::Healer => HEALER_OFFENSE,
            UnitClass::Archer => ARCHER_OFFENSE,
        }
    }

    /// Maximum health of one unit of this class.
    #[must_use]
    pub const fn max_health(self) -> u16 {
        match self {
            UnitClass::Soldier => SOLDIER_HEALTH,
            UnitClass::Healer => HEALER_HEALTH,
            UnitClass::Archer => ARCHER_HEALTH,
        }
    }
}

impl std::fmt::Display for UnitClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            UnitClass::Soldier => "Soldier",
            UnitClass::Healer => "Healer",
            UnitClass::Archer => "Archer",
        };
        f.write_str(name)
    }
}

/// Offense of a fortification at the given level.
#[must_use]
pub const fn fortification_offense(level: u32) -> u32 {
    FORTIFICATION_OFFENSE + level * FORTIFICATION_OFFENSE_UPGRADE
}

/// Defense of a fortification at the given level.
#[must_use]
pub const fn fortification_defense(level: u32) -> u32 {
    FORTIFICATION_DEFENSE + level * FORTIFICATION_DEFENSE_UPGRADE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_stats() {
        assert_eq!(UnitClass::Soldier.offense(), 50);
        assert_eq!(UnitClass::Healer.max_health(), 40);
        assert_eq!(UnitClass::Archer.max_health(), 50);
    }

    #[test]
    fn test_absorption_order() {
        assert_eq!(
            UnitClass::ALL,
            [UnitClass::Soldier, UnitClass::Healer, UnitClass::Archer]
        );
    }

    #[test]
    fn test_fortification_scaling() {
        assert_eq!(fortification_defense(0), 80);
        assert_eq!(fortification_offense(0), 100);
        assert_eq!(fortification_defense(2), 104);
        assert_eq!(fortification_offense(3), 130);
    }
}
