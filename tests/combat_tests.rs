//! Combat integration tests: damage distribution, healing, and merging.

use proptest::prelude::*;

use invasion_solver::army::Army;
use invasion_solver::combat::{apply_damage, simulate_fortification_damage, AssaultTemplate};
use invasion_solver::core::UnitClass;
use invasion_solver::nation::{Fortification, FortificationId};

fn sorted_healths(max: u16, len: usize) -> impl Strategy<Value = Vec<u16>> {
    prop::collection::vec(1..=max, 0..=len).prop_map(|mut v| {
        v.sort_unstable();
        v
    })
}

fn army_strategy() -> impl Strategy<Value = Army> {
    (
        prop::collection::vec(0..=UnitClass::Soldier.max_health(), 0..5),
        prop::collection::vec(0..=UnitClass::Healer.max_health(), 0..4),
        prop::collection::vec(0..=UnitClass::Archer.max_health(), 0..5),
    )
        .prop_map(|(s, h, a)| Army::from_units(s, h, a))
}

// =============================================================================
// Damage Distribution
// =============================================================================

proptest! {
    #[test]
    fn prop_damage_is_conserved(units in sorted_healths(100, 8), fraction in 0.0f64..=1.0) {
        let total: u32 = units.iter().map(|&h| u32::from(h)).sum();
        let damage = (f64::from(total) * fraction) as u32;

        let mut after = units.clone();
        let leftover = apply_damage(&mut after, damage);

        prop_assert_eq!(leftover, 0);
        let lost: u32 = units.iter().zip(&after).map(|(&b, &a)| u32::from(b - a)).sum();
        prop_assert_eq!(lost, damage);
        for (before, now) in units.iter().zip(&after) {
            prop_assert!(now <= before);
        }
    }

    #[test]
    fn prop_overwhelming_damage_kills_all(units in sorted_healths(100, 8), extra in 0u32..500) {
        let total: u32 = units.iter().map(|&h| u32::from(h)).sum();

        let mut after = units.clone();
        let leftover = apply_damage(&mut after, total + extra);

        prop_assert_eq!(leftover, extra);
        prop_assert!(after.iter().all(|&h| h == 0));
    }

    #[test]
    fn prop_resolve_consumes_all_damage(army in army_strategy(), level in 0u32..6) {
        let fort = Fortification::new(FortificationId::new(0), 0).upgraded(level);
        if let Some(assault) = AssaultTemplate::evaluate(&fort, army.clone()) {
            let after = assault.resolve(false);
            let lost = army.health() - after.health();
            prop_assert_eq!(lost, assault.fortification_damage());
        }
    }
}

// =============================================================================
// Healing and Merging
// =============================================================================

proptest! {
    #[test]
    fn prop_heal_is_capped(army in army_strategy(), rounds in 1usize..5) {
        let mut healed = army.clone();
        for _ in 0..rounds {
            healed = healed.healed();
        }

        for class in UnitClass::ALL {
            let max = class.max_health();
            for (&before, &after) in army.units(class).iter().zip(healed.units(class)) {
                prop_assert!(after <= max);
                if before == 0 {
                    prop_assert_eq!(after, 0);
                } else {
                    prop_assert!(after >= before);
                }
            }
        }
    }

    #[test]
    fn prop_merge_drops_the_dead(a in army_strategy(), b in army_strategy()) {
        let merged = Army::merge([&a, &b]);

        for class in UnitClass::ALL {
            prop_assert!(merged.units(class).iter().all(|&h| h > 0));
            prop_assert_eq!(merged.units(class).len(), a.living(class) + b.living(class));
            prop_assert!(merged.units(class).windows(2).all(|w| w[0] <= w[1]));
        }
        prop_assert_eq!(merged.health(), a.health() + b.health());
    }
}

#[test]
fn test_merge_of_dead_army_is_empty() {
    let dead = Army::from_units([0, 0], [0], [0]);
    let merged = Army::merge([&dead]);

    assert!(merged.is_empty());
    assert_eq!(merged.value(), 0.0);
}

// =============================================================================
// Assault Scenarios
// =============================================================================

#[test]
fn test_stronger_fort_deals_more_damage() {
    let army = Army::new(3, 0, 1);
    let weak = Fortification::new(FortificationId::new(0), 0);
    let strong = weak.upgraded(4);

    assert!(simulate_fortification_damage(&strong, &army) > simulate_fortification_damage(&weak, &army));
}

#[test]
fn test_healers_patch_up_after_assault() {
    let fort = Fortification::new(FortificationId::new(0), 0);
    let assault = AssaultTemplate::evaluate(&fort, Army::new(2, 2, 0)).unwrap();

    let raw = assault.resolve(false);
    let healed = assault.resolve(true);

    // Two healers: 2 * (5 + 2) per living unit
    let bonus: u32 = raw
        .soldiers()
        .iter()
        .zip(healed.soldiers())
        .map(|(&r, &h)| u32::from(h - r))
        .sum();
    assert_eq!(bonus, 2 * 14);
}

#[test]
fn test_placeholder_assault_is_free() {
    let army = Army::new(1, 1, 1);
    let reserve = AssaultTemplate::reserve(army.clone());

    assert!(reserve.is_reserve());
    assert_eq!(simulate_fortification_damage(reserve.target(), &army), 0);
    assert_eq!(reserve.resolve(true), army);
}
