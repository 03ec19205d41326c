//! Invasion waves, solutions, and the result record of a search.
//!
//! These are the shapes handed to presentation and persistence
//! collaborators. All of them serialize with serde; `to_bytes` and
//! `from_bytes` provide a compact bincode encoding.

use serde::{Deserialize, Serialize};

use super::stats::PassStats;
use crate::army::Army;
use crate::combat::AssaultTemplate;
use crate::core::Result;
use crate::nation::{Fortification, Nation};

/// One round of simultaneous assaults.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InvasionWave {
    assaults: Vec<AssaultTemplate>,
}

/// The army and nation left after a wave.
#[derive(Clone, Debug)]
pub struct WaveOutcome {
    /// Surviving units of every sub-army, merged.
    pub army: Army,

    /// The nation with this wave's captures folded in.
    pub nation: Nation,

    /// True if units were held in reserve without gaining anything.
    pub wasted_reserve: bool,
}

impl InvasionWave {
    /// Create a wave from its assaults.
    pub fn new(assaults: Vec<AssaultTemplate>) -> Self {
        Self { assaults }
    }

    #[must_use]
    pub fn assaults(&self) -> &[AssaultTemplate] {
        &self.assaults
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.assaults.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assaults.is_empty()
    }

    /// Fortifications this wave captures.
    pub fn captured(&self) -> impl Iterator<Item = &Fortification> {
        self.assaults
            .iter()
            .filter(|a| !a.is_reserve())
            .map(AssaultTemplate::target)
    }

    /// The sub-army held in reserve, if any.
    #[must_use]
    pub fn reserve(&self) -> Option<&AssaultTemplate> {
        self.assaults.iter().find(|a| a.is_reserve())
    }

    /// Carry out every assault against `nation`.
    #[must_use]
    pub fn resolve(&self, nation: &Nation, heal_after: bool) -> WaveOutcome {
        let mut survivors = Vec::with_capacity(self.assaults.len());
        let mut captured = Vec::new();
        let mut wasted_reserve = false;

        for assault in &self.assaults {
            let after = assault.resolve(heal_after);
            if assault.is_reserve() {
                wasted_reserve |= assault.attackers().value() == after.value();
            } else {
                captured.push(assault.target().clone());
            }
            survivors.push(after);
        }

        WaveOutcome {
            army: Army::merge(survivors.iter()),
            nation: nation.advance(&captured),
            wasted_reserve,
        }
    }
}

/// The best sequence of waves a search pass found.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InvasionSolution {
    initial_army: Army,
    initial_nation: Nation,
    final_army: Army,
    final_nation: Nation,
    waves: Vec<InvasionWave>,
    complete: bool,
}

impl InvasionSolution {
    pub fn new(
        initial_army: Army,
        initial_nation: Nation,
        final_army: Army,
        final_nation: Nation,
        waves: Vec<InvasionWave>,
    ) -> Self {
        let complete = final_nation.is_defeated();
        Self {
            initial_army,
            initial_nation,
            final_army,
            final_nation,
            waves,
            complete,
        }
    }

    #[must_use]
    pub fn initial_army(&self) -> &Army {
        &self.initial_army
    }

    #[must_use]
    pub fn initial_nation(&self) -> &Nation {
        &self.initial_nation
    }

    #[must_use]
    pub fn final_army(&self) -> &Army {
        &self.final_army
    }

    #[must_use]
    pub fn final_nation(&self) -> &Nation {
        &self.final_nation
    }

    /// The waves in the order they are launched.
    #[must_use]
    pub fn waves(&self) -> &[InvasionWave] {
        &self.waves
    }

    #[must_use]
    pub fn num_waves(&self) -> usize {
        self.waves.len()
    }

    /// Whether every fortification falls by the last wave.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Re-run every wave from the initial nation.
    ///
    /// Returns the army and nation before the first wave and after each
    /// wave, in order.
    #[must_use]
    pub fn replay(&self, heal_after: bool) -> Vec<(Army, Nation)> {
        let mut frames = Vec::with_capacity(self.waves.len() + 1);
        frames.push((self.initial_army.clone(), self.initial_nation.clone()));

        let mut nation = self.initial_nation.clone();
        for wave in &self.waves {
            let outcome = wave.resolve(&nation, heal_after);
            nation = outcome.nation.clone();
            frames.push((outcome.army, outcome.nation));
        }
        frames
    }

    /// Encode with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode from bincode.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

/// Everything a two-pass search produces.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchResults {
    /// States created by the parallel pass.
    pub nodes_created: u64,

    /// Solutions counted by the parallel pass.
    pub solutions_found: u64,

    /// Waves needed when the army never splits, if it can win at all.
    pub linear_waves: Option<u32>,

    /// Best result of the pass that keeps the army together.
    pub linear_solution: InvasionSolution,

    /// Waves needed when the army splits freely, if it can win at all.
    pub parallel_waves: Option<u32>,

    /// Best result of the pass that divides the army.
    pub parallel_solution: InvasionSolution,

    pub linear_stats: PassStats,

    pub parallel_stats: PassStats,
}

impl SearchResults {
    /// Fraction of parallel-pass states that were counted as solutions.
    #[must_use]
    pub fn solution_ratio(&self) -> f64 {
        self.parallel_stats.solution_ratio()
    }

    /// The primary result.
    #[must_use]
    pub fn best_solution(&self) -> &InvasionSolution {
        &self.parallel_solution
    }

    /// Encode with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode from bincode.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}
