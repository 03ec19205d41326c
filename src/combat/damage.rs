//! Damage distribution across a class of units.

/// Spread `damage` over one class of units, weakest first.
///
/// `units` must be sorted ascending. If the class cannot absorb all of the
/// damage every unit dies and the excess is returned for the next class.
/// Otherwise damage is shared evenly among the surviving units: whenever an
/// even share would kill the weakest survivor, that survivor's health is
/// taken from every survivor at once; the final remainder is spread one
/// point at a time from the weakest upwards. In that case the return value
/// is always zero.
///
/// The list stays sorted ascending.
pub fn apply_damage(units: &mut [u16], damage: u32) -> u32 {
    if units.is_empty() || damage == 0 {
        return damage;
    }

    let total: u32 = units.iter().map(|&h| u32::from(h)).sum();
    if total <= damage {
        units.fill(0);
        return damage - total;
    }

    let mut remaining = damage;
    let mut weakest = 0;

    while remaining > 0 {
        while units[weakest] == 0 {
            weakest += 1;
        }

        let weakest_health = units[weakest];
        let survivors = (units.len() - weakest) as u32;
        let share = remaining / survivors;

        if share >= u32::from(weakest_health) {
            for unit in &mut units[weakest..] {
                *unit -= weakest_health;
                remaining -= u32::from(weakest_health);
            }
        } else {
            // share < weakest_health, so nobody dies from the even share
            // and the remainder (< survivors) takes at most one more point each.
            if share > 0 {
                for unit in &mut units[weakest..] {
                    *unit -= share as u16;
                    remaining -= share;
                }
            }
            for unit in &mut units[weakest..] {
                if remaining == 0 {
                    break;
                }
                *unit -= 1;
                remaining -= 1;
            }
            debug_assert_eq!(remaining, 0);
        }
    }

    remaining
}
