//! Dividing an army into the waves it could launch next.

use rustc_hash::FxHashSet;

use super::solution::InvasionWave;
use crate::army::Army;
use crate::combat::AssaultTemplate;
use crate::nation::Fortification;

/// Check whether an army can never take the hardest border fortification.
///
/// Army damage only falls over time, so an army without the offense to
/// breach the hardest defense now never will. An army that can breach it
/// but lacks the health is also hopeless unless healing could raise it
/// above the fortification's offense.
#[must_use]
pub fn is_hopeless(army: &Army, border: &[Fortification]) -> bool {
    let Some(hardest) = border.iter().max_by_key(|f| f.level()) else {
        return false;
    };

    if army.damage() < hardest.defense() {
        return true;
    }
    army.health() <= hardest.offense() && !(army.can_heal() && army.max_health() > hardest.offense())
}

/// Enumerate every wave `army` can launch against `border`.
///
/// Each wave assigns every unit to at most one border fortification, with
/// the leftovers held in reserve. Sub-armies are tried from most to least
/// committed. With `keep_together` a fortification receives either every
/// remaining unit or none. With `dedup` identical sub-armies are evaluated
/// once per fortification per assignment step.
#[must_use]
pub fn plan_waves(army: &Army, border: &[Fortification], keep_together: bool, dedup: bool) -> Vec<InvasionWave> {
    let mut targets: Vec<Fortification> = border.to_vec();
    targets.push(Fortification::placeholder());

    let mut planner = WavePlanner {
        targets: &targets,
        keep_together,
        dedup,
        current: Vec::with_capacity(targets.len()),
        waves: Vec::new(),
    };
    planner.assign(army.clone(), 0);
    planner.waves
}

struct WavePlanner<'a> {
    targets: &'a [Fortification],
    keep_together: bool,
    dedup: bool,
    current: Vec<AssaultTemplate>,
    waves: Vec<InvasionWave>,
}

impl WavePlanner<'_> {
    fn assign(&mut self, remaining: Army, target_idx: usize) {
        if target_idx == self.targets.len() - 1 {
            if remaining.is_empty() {
                self.emit();
            } else {
                self.current.push(AssaultTemplate::reserve(remaining));
                self.emit();
                self.current.pop();
            }
            return;
        }

        if remaining.is_empty() {
            self.emit();
            return;
        }

        let target = &self.targets[target_idx];
        let all: u64 = (1u64 << remaining.size()) - 1;
        let mut evaluated: FxHashSet<Army> = FxHashSet::default();

        let mut mask = all;
        loop {
            let (chosen, rest) = remaining.partition(mask);

            if mask == 0 {
                self.assign(rest, target_idx + 1);
            } else if !(self.dedup && evaluated.contains(&chosen)) {
                if let Some(assault) = AssaultTemplate::evaluate(target, chosen) {
                    if self.dedup {
                        evaluated.insert(assault.attackers().clone());
                    }
                    self.current.push(assault);
                    self.assign(rest, target_idx + 1);
                    self.current.pop();
                }
            }

            if mask == 0 {
                break;
            }
            mask = if self.keep_together { 0 } else { mask - 1 };
        }
    }

    fn emit(&mut self) {
        self.waves.push(InvasionWave::new(self.current.clone()));
    }
}
