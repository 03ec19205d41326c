//! Assault templates: one sub-army assigned to one fortification.

use serde::{Deserialize, Serialize};

use super::damage::apply_damage;
use crate::army::Army;
use crate::core::constants::SOLDIER_STACKING_DEFENCE;
use crate::core::UnitClass;
use crate::nation::Fortification;

/// A sub-army assigned to a fortification, with the damage the
/// fortification will inflict simulated up front.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssaultTemplate {
    target: Fortification,
    attackers: Army,
    fortification_damage: u32,
}

impl AssaultTemplate {
    /// Evaluate whether `attackers` can take `target`.
    ///
    /// Returns `None` if the assault is infeasible: the attackers lack the
    /// offense to breach the defense, or would not survive the damage.
    /// Assignments to the reserve placeholder always succeed and take no
    /// damage.
    #[must_use]
    pub fn evaluate(target: &Fortification, attackers: Army) -> Option<Self> {
        if target.is_placeholder() {
            return Some(Self::reserve(attackers));
        }

        let damage = simulate_fortification_damage(target, &attackers);
        let feasible = attackers.health() > damage && attackers.damage() >= target.defense();

        feasible.then(|| Self {
            target: target.clone(),
            attackers,
            fortification_damage: damage,
        })
    }

    /// Hold `attackers` in reserve for a wave.
    #[must_use]
    pub fn reserve(attackers: Army) -> Self {
        Self {
            target: Fortification::placeholder(),
            attackers,
            fortification_damage: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn target(&self) -> &Fortification {
        &self.target
    }

    #[inline]
    #[must_use]
    pub fn attackers(&self) -> &Army {
        &self.attackers
    }

    /// Damage the target deals to the attackers.
    #[inline]
    #[must_use]
    pub fn fortification_damage(&self) -> u32 {
        self.fortification_damage
    }

    #[must_use]
    pub fn is_reserve(&self) -> bool {
        self.target.is_placeholder()
    }

    /// Carry out the assault, returning the attackers afterwards.
    ///
    /// Damage lands on soldiers, then healers, then archers. Dead units stay
    /// in the returned army until it is merged. With `heal_after` the
    /// surviving healers patch the group up once the fighting is over.
    #[must_use]
    pub fn resolve(&self, heal_after: bool) -> Army {
        let [mut soldiers, mut healers, mut archers] = self.attackers.clone().into_units();

        if !self.is_reserve() {
            let mut remaining = self.fortification_damage;
            remaining = apply_damage(&mut soldiers, remaining);
            remaining = apply_damage(&mut healers, remaining);
            remaining = apply_damage(&mut archers, remaining);

            debug_assert_eq!(
                remaining, 0,
                "After assaulting {} there is still {} damage to apply",
                self.target.id(),
                remaining
            );
        }

        let after = Army::from_sorted(soldiers, healers, archers);
        if heal_after {
            after.healed()
        } else {
            after
        }
    }
}

/// Damage `target` inflicts on `attackers` during an assault.
///
/// The more offense the attackers bring, the faster the fortification falls
/// and the less damage it gets to deal. Soldiers fighting together shield
/// each other, reducing the damage further.
#[must_use]
pub fn simulate_fortification_damage(target: &Fortification, attackers: &Army) -> u32 {
    if target.is_placeholder() {
        return 0;
    }

    let offense = u64::from(target.offense());
    let defense = u64::from(target.defense());
    let attack = u64::from(attackers.damage().max(1));
    let raw = (offense * defense / attack) as u32;

    let soldiers = attackers.living(UnitClass::Soldier) as u32;
    let reduction = if soldiers > 1 {
        (soldiers - 1) * SOLDIER_STACKING_DEFENCE * soldiers
    } else {
        0
    };

    raw.saturating_sub(reduction)
}
