//! The invading army.
//!
//! An `Army` is three ascending-sorted lists of unit health values, one per
//! `UnitClass`. Aggregate statistics are computed once at construction and
//! the army is never mutated afterwards: damage, healing, and merging all
//! produce new armies.
//!
//! Dead units (health 0) may appear in an army straight out of an assault.
//! They contribute nothing to damage, health, or value, and are physically
//! dropped the next time armies are merged.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::constants::{
    ARCHER_STACKING_OFFENSE, HEALER_HEALING, HEALER_STACKING_HEALING, UNIT_BASE_VALUE,
};
use crate::core::UnitClass;

/// Health values of every unit in one class.
pub type UnitHealths = SmallVec<[u16; 8]>;

/// An immutable multiset of unit health values per class.
///
/// Only the unit lists are serialized; the cached aggregates are rebuilt on
/// deserialization, after clamping and sorting the lists.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(from = "ArmyRecord")]
pub struct Army {
    soldiers: UnitHealths,
    healers: UnitHealths,
    archers: UnitHealths,

    // Cached aggregates, derived from the unit lists above.
    #[serde(skip)]
    damage: u32,
    #[serde(skip)]
    health: u32,
    #[serde(skip)]
    max_health: u32,
}

/// Serialized form of an [`Army`].
#[derive(Deserialize)]
struct ArmyRecord {
    soldiers: UnitHealths,
    healers: UnitHealths,
    archers: UnitHealths,
}

impl From<ArmyRecord> for Army {
    fn from(record: ArmyRecord) -> Self {
        Army::from_units(record.soldiers, record.healers, record.archers)
    }
}

impl Army {
    /// Create an army with every unit at full health.
    #[must_use]
    pub fn new(soldiers: usize, healers: usize, archers: usize) -> Self {
        let full = |class: UnitClass, count: usize| -> UnitHealths {
            std::iter::repeat(class.max_health()).take(count).collect()
        };
        Self::from_sorted(
            full(UnitClass::Soldier, soldiers),
            full(UnitClass::Healer, healers),
            full(UnitClass::Archer, archers),
        )
    }

    /// Create an army from arbitrary health values.
    ///
    /// Values are clamped to each class's maximum health and sorted.
    #[must_use]
    pub fn from_units(
        soldiers: impl IntoIterator<Item = u16>,
        healers: impl IntoIterator<Item = u16>,
        archers: impl IntoIterator<Item = u16>,
    ) -> Self {
        let prepare = |class: UnitClass, units: &mut dyn Iterator<Item = u16>| -> UnitHealths {
            let mut list: UnitHealths = units.map(|h| h.min(class.max_health())).collect();
            list.sort_unstable();
            list
        };
        Self::from_sorted(
            prepare(UnitClass::Soldier, &mut soldiers.into_iter()),
            prepare(UnitClass::Healer, &mut healers.into_iter()),
            prepare(UnitClass::Archer, &mut archers.into_iter()),
        )
    }

    /// An army with no units.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build an army from lists that are already sorted ascending.
    pub(crate) fn from_sorted(soldiers: UnitHealths, healers: UnitHealths, archers: UnitHealths) -> Self {
        debug_assert!(soldiers.windows(2).all(|w| w[0] <= w[1]));
        debug_assert!(healers.windows(2).all(|w| w[0] <= w[1]));
        debug_assert!(archers.windows(2).all(|w| w[0] <= w[1]));

        let mut army = Self {
            soldiers,
            healers,
            archers,
            damage: 0,
            health: 0,
            max_health: 0,
        };

        let living_archers = army.living(UnitClass::Archer) as u32;
        let archer_offense = if living_archers > 0 {
            UnitClass::Archer.offense() + ARCHER_STACKING_OFFENSE * (living_archers - 1)
        } else {
            0
        };
        army.damage = army.living(UnitClass::Soldier) as u32 * UnitClass::Soldier.offense()
            + army.living(UnitClass::Healer) as u32 * UnitClass::Healer.offense()
            + living_archers * archer_offense;

        for class in UnitClass::ALL {
            let units = army.units(class);
            army.health += units.iter().map(|&h| u32::from(h)).sum::<u32>();
            army.max_health += army.living(class) as u32 * u32::from(class.max_health());
        }
        army
    }

    /// Health values of one class, sorted ascending.
    #[inline]
    #[must_use]
    pub fn units(&self, class: UnitClass) -> &[u16] {
        match class {
            UnitClass::Soldier => &self.soldiers,
            UnitClass::Healer => &self.healers,
            UnitClass::Archer => &self.archers,
        }
    }

    #[inline]
    #[must_use]
    pub fn soldiers(&self) -> &[u16] {
        &self.soldiers
    }

    #[inline]
    #[must_use]
    pub fn healers(&self) -> &[u16] {
        &self.healers
    }

    #[inline]
    #[must_use]
    pub fn archers(&self) -> &[u16] {
        &self.archers
    }

    /// Number of units of a class that are still alive.
    #[must_use]
    pub fn living(&self, class: UnitClass) -> usize {
        self.units(class).iter().filter(|&&h| h > 0).count()
    }

    /// Total offense the army brings to an assault.
    #[inline]
    #[must_use]
    pub fn damage(&self) -> u32 {
        self.damage
    }

    /// Sum of current health over all units.
    #[inline]
    #[must_use]
    pub fn health(&self) -> u32 {
        self.health
    }

    /// Sum of maximum health over all living units.
    #[inline]
    #[must_use]
    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    /// Whether any healer is still alive.
    #[must_use]
    pub fn can_heal(&self) -> bool {
        self.healers.iter().any(|&h| h > 0)
    }

    /// Number of units held, dead or alive.
    #[must_use]
    pub fn size(&self) -> usize {
        self.soldiers.len() + self.healers.len() + self.archers.len()
    }

    /// Check if the army holds no units at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Tie-breaking value of the army: every living unit is worth a flat
    /// base plus the fraction of its health remaining.
    #[must_use]
    pub fn value(&self) -> f64 {
        UnitClass::ALL
            .iter()
            .map(|&class| {
                let max = f64::from(class.max_health());
                self.units(class)
                    .iter()
                    .filter(|&&h| h > 0)
                    .map(|&h| UNIT_BASE_VALUE + f64::from(h) / max)
                    .sum::<f64>()
            })
            .sum()
    }

    /// Health every living unit regains from this army's healers.
    ///
    /// Only living healers heal, but the stacking bonus counts every healer
    /// in the army, including those that fell in the last assault.
    #[must_use]
    pub fn heal_amount(&self) -> u32 {
        let living = self.living(UnitClass::Healer) as u32;
        if living == 0 {
            return 0;
        }
        let stacked = self.healers.len() as u32 - 1;
        let per_healer = u32::from(HEALER_HEALING) + u32::from(HEALER_STACKING_HEALING) * stacked;
        living * per_healer
    }

    /// Return a copy of the army after its healers have tended to it.
    ///
    /// Living units gain `heal_amount()` health, capped at their class
    /// maximum. Dead units stay dead.
    #[must_use]
    pub fn healed(&self) -> Army {
        let amount = self.heal_amount();
        if amount == 0 {
            return self.clone();
        }
        let heal = |class: UnitClass| -> UnitHealths {
            let max = u32::from(class.max_health());
            self.units(class)
                .iter()
                .map(|&h| if h == 0 { 0 } else { (u32::from(h) + amount).min(max) as u16 })
                .collect()
        };
        Army::from_sorted(
            heal(UnitClass::Soldier),
            heal(UnitClass::Healer),
            heal(UnitClass::Archer),
        )
    }

    /// Merge sub-armies back into one army, dropping every dead unit.
    #[must_use]
    pub fn merge<'a>(sub_armies: impl IntoIterator<Item = &'a Army>) -> Army {
        let mut soldiers = UnitHealths::new();
        let mut healers = UnitHealths::new();
        let mut archers = UnitHealths::new();

        for army in sub_armies {
            soldiers.extend(army.soldiers.iter().copied().filter(|&h| h > 0));
            healers.extend(army.healers.iter().copied().filter(|&h| h > 0));
            archers.extend(army.archers.iter().copied().filter(|&h| h > 0));
        }
        soldiers.sort_unstable();
        healers.sort_unstable();
        archers.sort_unstable();

        Army::from_sorted(soldiers, healers, archers)
    }

    /// Split the army by a bit mask over its units.
    ///
    /// Bit `j` addresses the `j`th unit of the concatenated
    /// soldier, healer, archer sequence. Set bits go to the first army,
    /// clear bits to the second. Both halves stay sorted.
    #[must_use]
    pub fn partition(&self, mask: u64) -> (Army, Army) {
        debug_assert!(self.size() < 64, "Partition masks cover at most 63 units");

        let mut chosen: [UnitHealths; 3] = Default::default();
        let mut rest: [UnitHealths; 3] = Default::default();
        let mut bit = 0;
        for (class_idx, class) in UnitClass::ALL.iter().enumerate() {
            for &health in self.units(*class) {
                if mask & (1u64 << bit) != 0 {
                    chosen[class_idx].push(health);
                } else {
                    rest[class_idx].push(health);
                }
                bit += 1;
            }
        }

        let [s, h, a] = chosen;
        let [rs, rh, ra] = rest;
        (Army::from_sorted(s, h, a), Army::from_sorted(rs, rh, ra))
    }

    /// Check whether two armies hold exactly the same health values per class.
    #[must_use]
    pub fn same_composition(&self, other: &Army) -> bool {
        self.soldiers == other.soldiers && self.healers == other.healers && self.archers == other.archers
    }

    /// Consume the army, returning its mutable unit lists.
    pub(crate) fn into_units(self) -> [UnitHealths; 3] {
        [self.soldiers, self.healers, self.archers]
    }
}

impl PartialEq for Army {
    fn eq(&self, other: &Self) -> bool {
        self.same_composition(other)
    }
}

impl Eq for Army {}

impl std::hash::Hash for Army {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.soldiers.hash(state);
        self.healers.hash(state);
        self.archers.hash(state);
    }
}

impl std::fmt::Display for Army {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (label, class) in [("S", UnitClass::Soldier), ("H", UnitClass::Healer), ("A", UnitClass::Archer)] {
            if class != UnitClass::Soldier {
                write!(f, " ")?;
            }
            write!(f, "{}:", label)?;
            for health in self.units(class) {
                write!(f, " {}", health)?;
            }
        }
        write!(f, "}}")
    }
}
