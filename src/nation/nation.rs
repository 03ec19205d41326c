//! The defending nation and its protection graph.
//!
//! ## Protection
//!
//! Before an invasion begins, `begin_invasion` decides which fortifications
//! shield which others from direct assault. A fortification `A` protects `B`
//! when `B` lies strictly behind `A` along the invasion direction, inside a
//! 45° cone: the offset `B - A` has a positive component along the direction
//! and a perpendicular component no larger than that.
//!
//! Only fortifications with no uncaptured protectors ("border" fortifications)
//! can be assaulted.
//!
//! ## Advancing
//!
//! A nation is never modified once the search is running. `advance` builds the
//! nation that results from a wave of captures. Per-fortification tables are
//! `im` vectors, so an advanced nation shares structure with its predecessor,
//! and the protection graph is shared behind an `Arc`.

use std::sync::{Arc, OnceLock};

use im::Vector;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::fortification::{Fortification, FortificationId, GridPoint};
use super::layout::NationLayout;
use crate::core::constants::FORTIFICATION_VALUE;
use crate::core::{ConfigError, Result};

/// Fortifications shielded by one protector.
pub type ProtectedSet = SmallVec<[FortificationId; 8]>;

/// Direction the invading army advances across the nation grid.
///
/// `x` grows with the column, `y` with the row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvasionDirection {
    /// Towards decreasing rows.
    North,
    /// Towards increasing rows.
    South,
    /// Towards increasing columns.
    #[default]
    East,
    /// Towards decreasing columns.
    West,
}

impl InvasionDirection {
    /// Unit vector `(x, y)` of the direction.
    #[must_use]
    pub const fn vector(self) -> (i32, i32) {
        match self {
            InvasionDirection::North => (0, -1),
            InvasionDirection::South => (0, 1),
            InvasionDirection::East => (1, 0),
            InvasionDirection::West => (-1, 0),
        }
    }
}

/// A nation of fortifications under invasion.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Nation {
    /// Cells along each side of the grid.
    size: u32,

    /// Fortifications indexed by id.
    fortifications: Vector<Fortification>,

    /// Grid coordinates indexed by id, fixed for the nation's size.
    coordinates: Arc<Vec<GridPoint>>,

    /// Capture state indexed by id.
    captured: Vector<bool>,

    /// Number of uncaptured protectors indexed by id.
    protectors: Vector<u32>,

    /// Fortifications each fortification protects, indexed by id.
    protection: Arc<Vec<ProtectedSet>>,

    num_captured: usize,

    /// Set once by `begin_invasion`.
    direction: Option<InvasionDirection>,

    #[serde(skip)]
    border_cache: OnceLock<Vec<Fortification>>,

    #[serde(skip)]
    internal_cache: OnceLock<Vec<Fortification>>,
}

impl Nation {
    /// Create a nation from an occupancy layout.
    ///
    /// Ids are assigned to fortified cells in row-major order.
    pub fn from_layout(layout: &NationLayout) -> Result<Self> {
        if layout.fortified_count() == 0 {
            return Err(ConfigError::NoFortifications);
        }
        Ok(Self::from_positions(layout.size() as u32, layout.fortified_positions()))
    }

    /// Create a nation with `count` fortifications on the smallest odd-sized
    /// square grid that holds them, filling the grid column by column.
    pub fn with_fortifications(count: usize) -> Result<Self> {
        if count == 0 {
            return Err(ConfigError::NoFortifications);
        }
        let mut size = 1u32;
        while ((size * size) as usize) < count {
            size += 2;
        }
        let positions = (0..size)
            .flat_map(|column| (0..size).map(move |row| row * size + column))
            .take(count);
        Ok(Self::from_positions(size, positions))
    }

    fn from_positions(size: u32, positions: impl Iterator<Item = u32>) -> Self {
        let fortifications: Vector<Fortification> = positions
            .enumerate()
            .map(|(id, position)| Fortification::new(FortificationId::new(id as u32), position))
            .collect();
        let count = fortifications.len();
        let coordinates: Vec<GridPoint> = fortifications.iter().map(|f| f.coordinates(size)).collect();

        Self {
            size,
            fortifications,
            coordinates: Arc::new(coordinates),
            captured: std::iter::repeat(false).take(count).collect(),
            protectors: std::iter::repeat(0).take(count).collect(),
            protection: Arc::new(vec![ProtectedSet::new(); count]),
            num_captured: 0,
            direction: None,
            border_cache: OnceLock::new(),
            internal_cache: OnceLock::new(),
        }
    }

    /// Build the protection graph for an invasion travelling in `direction`.
    ///
    /// # Panics
    ///
    /// Panics if the invasion has already begun.
    pub fn begin_invasion(&mut self, direction: InvasionDirection) {
        assert!(self.direction.is_none(), "Invasion has already begun");
        assert_eq!(self.num_captured, 0, "Invasion must begin on an uncaptured nation");

        let (dx, dy) = direction.vector();
        let (dir_x, dir_y) = (f64::from(dx), f64::from(dy));
        let half = f64::from(self.size) / 2.0;
        let invasion_point = (-dir_x * half, -dir_y * half);

        let distance_sq = |id: FortificationId| -> f64 {
            let p = self.coordinates[id.index()];
            let (ox, oy) = (f64::from(p.x) - invasion_point.0, f64::from(p.y) - invasion_point.1);
            ox * ox + oy * oy
        };

        // Farthest from the invasion point first.
        let mut order: Vec<FortificationId> = self.fortifications.iter().map(|f| f.id()).collect();
        order.sort_by(|a, b| distance_sq(*b).total_cmp(&distance_sq(*a)));

        let mut protection = vec![ProtectedSet::new(); order.len()];
        let mut protectors = vec![0u32; order.len()];

        for closer in (1..order.len()).rev() {
            let protector = order[closer];
            let from = self.coordinates[protector.index()];
            for &protected in order[..closer].iter().rev() {
                let to = self.coordinates[protected.index()];
                let (line_x, line_y) = (to.x - from.x, to.y - from.y);
                let rows_behind = dx * line_x + dy * line_y;
                let columns_behind = if dx == 0 { line_x.abs() } else { line_y.abs() };

                if rows_behind > 0 && columns_behind <= rows_behind {
                    protection[protector.index()].push(protected);
                    protectors[protected.index()] += 1;
                }
            }
        }

        tracing::debug!(
            fortifications = order.len(),
            edges = protectors.iter().sum::<u32>(),
            ?direction,
            "Built protection graph"
        );

        self.protection = Arc::new(protection);
        self.protectors = protectors.into_iter().collect();
        self.direction = Some(direction);
        self.border_cache = OnceLock::new();
        self.internal_cache = OnceLock::new();
    }

    /// The nation left after a wave captures `captured`.
    ///
    /// Protector counts of everything the captured fortifications shielded
    /// drop, and every fortification still standing gains levels: two if it
    /// is still protected, one otherwise.
    #[must_use]
    pub fn advance(&self, captured: &[Fortification]) -> Nation {
        let mut next = Nation {
            size: self.size,
            fortifications: self.fortifications.clone(),
            coordinates: Arc::clone(&self.coordinates),
            captured: self.captured.clone(),
            protectors: self.protectors.clone(),
            protection: Arc::clone(&self.protection),
            num_captured: self.num_captured + captured.len(),
            direction: self.direction,
            border_cache: OnceLock::new(),
            internal_cache: OnceLock::new(),
        };

        for fort in captured {
            let id = fort.id();
            debug_assert!(!fort.is_placeholder(), "Placeholders cannot be captured");
            debug_assert!(!self.captured[id.index()], "{} captured twice", id);

            for &shielded in &self.protection[id.index()] {
                let count = next.protectors[shielded.index()];
                next.protectors.set(shielded.index(), count - 1);
            }
            next.captured.set(id.index(), true);
        }

        for idx in 0..next.fortifications.len() {
            if next.captured[idx] {
                continue;
            }
            let levels = if next.protectors[idx] > 0 { 2 } else { 1 };
            let upgraded = next.fortifications[idx].upgraded(levels);
            next.fortifications.set(idx, upgraded);
        }

        next
    }

    /// Uncaptured fortifications with no remaining protectors, in id order.
    pub fn border_fortifications(&self) -> &[Fortification] {
        self.border_cache.get_or_init(|| {
            self.fortifications
                .iter()
                .filter(|f| {
                    let idx = f.id().index();
                    self.protectors[idx] == 0 && !self.captured[idx]
                })
                .cloned()
                .collect()
        })
    }

    /// Uncaptured fortifications that are still protected, in id order.
    pub fn internal_fortifications(&self) -> &[Fortification] {
        self.internal_cache.get_or_init(|| {
            self.fortifications
                .iter()
                .filter(|f| {
                    let idx = f.id().index();
                    self.protectors[idx] > 0 && !self.captured[idx]
                })
                .cloned()
                .collect()
        })
    }

    /// Check if every fortification has been captured.
    #[must_use]
    pub fn is_defeated(&self) -> bool {
        self.num_captured == self.fortifications.len()
    }

    #[must_use]
    pub fn num_remaining(&self) -> usize {
        self.fortifications.len() - self.num_captured
    }

    #[must_use]
    pub fn num_captured(&self) -> usize {
        self.num_captured
    }

    /// Objective contribution of the fortifications still standing.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.num_remaining() as f64 * FORTIFICATION_VALUE
    }

    /// Cells along each side of the grid.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Number of fortifications, captured or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fortifications.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fortifications.is_empty()
    }

    pub fn fortifications(&self) -> impl Iterator<Item = &Fortification> {
        self.fortifications.iter()
    }

    #[must_use]
    pub fn fortification(&self, id: FortificationId) -> Option<&Fortification> {
        self.fortifications.get(id.index())
    }

    /// Grid position of `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a fortification of this nation.
    #[must_use]
    pub fn coordinates(&self, id: FortificationId) -> GridPoint {
        self.coordinates[id.index()]
    }

    /// Check whether `id` has fallen.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a fortification of this nation.
    #[must_use]
    pub fn is_captured(&self, id: FortificationId) -> bool {
        self.captured[id.index()]
    }

    /// Number of uncaptured fortifications protecting `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a fortification of this nation.
    #[must_use]
    pub fn protector_count(&self, id: FortificationId) -> u32 {
        self.protectors[id.index()]
    }

    /// Fortifications that `id` protects.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a fortification of this nation.
    #[must_use]
    pub fn protects(&self, id: FortificationId) -> &[FortificationId] {
        &self.protection[id.index()]
    }

    /// Direction of the invasion, once begun.
    #[must_use]
    pub fn direction(&self) -> Option<InvasionDirection> {
        self.direction
    }
}

impl std::fmt::Display for Nation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Fortifications to capture: {}", self.num_remaining())
    }
}
