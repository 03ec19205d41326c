//! Arena-based search tree.
//!
//! States live in a flat `Vec` and refer to their parent by `StateId`, so
//! the lineage needed to rebuild a solution never forms ownership cycles.
//! A state is released once it has been processed and all of its children
//! are gone; released slots are reused, which keeps memory proportional to
//! the frontier plus the ancestor chains it keeps alive.

use serde::{Deserialize, Serialize};

use super::solution::InvasionWave;
use crate::army::Army;
use crate::nation::Nation;

/// Index into the search tree arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateId(pub u32);

impl StateId {
    /// Sentinel value representing no state.
    pub const NONE: StateId = StateId(u32::MAX);

    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for StateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_none() {
            write!(f, "StateId(NONE)")
        } else {
            write!(f, "StateId({})", self.0)
        }
    }
}

/// A node of the search: the army and nation after some sequence of waves.
#[derive(Clone, Debug)]
pub struct SearchState {
    pub army: Army,
    pub nation: Nation,

    /// Number of waves launched to reach this state.
    pub depth: u32,

    /// Parent state (NONE for the root).
    pub parent: StateId,

    /// The wave that produced this state from its parent.
    pub transition: Option<InvasionWave>,

    /// Lower is better: army value lost plus the value of the fortifications
    /// still standing.
    pub objective: f64,

    live_children: u32,
    settled: bool,
}

impl SearchState {
    /// The starting state of a search.
    ///
    /// `baseline` is the value of the starting army, against which every
    /// state's losses are measured.
    pub fn root(army: Army, nation: Nation, baseline: f64) -> Self {
        Self::new(army, nation, 0, StateId::NONE, None, baseline)
    }

    /// A state produced by launching `wave` from `parent`.
    pub fn child(army: Army, nation: Nation, depth: u32, parent: StateId, wave: InvasionWave, baseline: f64) -> Self {
        Self::new(army, nation, depth, parent, Some(wave), baseline)
    }

    fn new(
        army: Army,
        nation: Nation,
        depth: u32,
        parent: StateId,
        transition: Option<InvasionWave>,
        baseline: f64,
    ) -> Self {
        let objective = baseline - army.value() + nation.value();
        Self {
            army,
            nation,
            depth,
            parent,
            transition,
            objective,
            live_children: 0,
            settled: false,
        }
    }

    /// Check if every fortification has fallen.
    #[inline]
    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.nation.is_defeated()
    }
}

/// Arena of live search states.
#[derive(Debug, Default)]
pub struct SearchTree {
    slots: Vec<Option<SearchState>>,
    free: Vec<StateId>,
    live: usize,
    peak: usize,
}

impl SearchTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a state, returning its ID. The parent, if any, must be live.
    pub fn alloc(&mut self, state: SearchState) -> StateId {
        if !state.parent.is_none() {
            self.get_mut(state.parent).live_children += 1;
        }

        let id = match self.free.pop() {
            Some(id) => {
                self.slots[id.index()] = Some(state);
                id
            }
            None => {
                self.slots.push(Some(state));
                StateId::new((self.slots.len() - 1) as u32)
            }
        };

        self.live += 1;
        self.peak = self.peak.max(self.live);
        id
    }

    /// Get a live state.
    ///
    /// # Panics
    ///
    /// Panics if the state has been released.
    #[inline]
    #[must_use]
    pub fn get(&self, id: StateId) -> &SearchState {
        self.slots[id.index()]
            .as_ref()
            .unwrap_or_else(|| panic!("{} is not live in the search tree", id))
    }

    #[inline]
    fn get_mut(&mut self, id: StateId) -> &mut SearchState {
        self.slots[id.index()]
            .as_mut()
            .unwrap_or_else(|| panic!("{} is not live in the search tree", id))
    }

    /// Mark a state as processed. It is released as soon as it has no live
    /// children, together with any ancestors that become childless.
    pub fn settle(&mut self, id: StateId) {
        let state = self.get_mut(id);
        state.settled = true;
        if state.live_children == 0 {
            self.release(id);
        }
    }

    fn release(&mut self, id: StateId) {
        let mut current = id;
        loop {
            let state = self.slots[current.index()]
                .take()
                .unwrap_or_else(|| panic!("{} released twice", current));
            self.free.push(current);
            self.live -= 1;

            if state.parent.is_none() {
                return;
            }
            let parent = self.get_mut(state.parent);
            parent.live_children -= 1;
            if parent.live_children > 0 || !parent.settled {
                return;
            }
            current = state.parent;
        }
    }

    /// The waves leading from the root to `id`, in launch order.
    ///
    /// # Panics
    ///
    /// Panics if any ancestor has been released or a non-root state lacks
    /// its transition.
    #[must_use]
    pub fn path_to(&self, id: StateId) -> Vec<InvasionWave> {
        let mut waves = Vec::with_capacity(self.get(id).depth as usize);
        let mut current = id;
        loop {
            let state = self.get(current);
            if state.parent.is_none() {
                break;
            }
            let wave = state
                .transition
                .as_ref()
                .unwrap_or_else(|| panic!("{} has a parent but no transition", current));
            waves.push(wave.clone());
            current = state.parent;
        }
        waves.reverse();
        waves
    }

    /// Number of live states.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Most states that were live at once.
    #[must_use]
    pub fn peak(&self) -> usize {
        self.peak
    }
}
