//! Fortifications and their placement on the nation grid.

use serde::{Deserialize, Serialize};

use crate::core::{fortification_defense, fortification_offense};

/// Stable identifier of a fortification within its nation.
///
/// Ids are dense: a nation with `n` fortifications uses ids `0..n`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FortificationId(pub u32);

impl FortificationId {
    /// Sentinel id carried by placeholder fortifications.
    pub const PLACEHOLDER: FortificationId = FortificationId(u32::MAX);

    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Index into per-fortification tables.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for FortificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if *self == Self::PLACEHOLDER {
            write!(f, "Fort(reserve)")
        } else {
            write!(f, "Fort({})", self.0)
        }
    }
}

/// Integer coordinate of a grid cell, centred on the middle of the nation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPoint {
    /// Column offset from the centre.
    pub x: i32,
    /// Row offset from the centre.
    pub y: i32,
}

impl GridPoint {
    /// Coordinate of a row-major grid position in a nation of `size` × `size` cells.
    #[must_use]
    pub const fn from_position(position: u32, size: u32) -> Self {
        let half = (size / 2) as i32;
        Self {
            x: (position % size) as i32 - half,
            y: (position / size) as i32 - half,
        }
    }
}

/// A defended position the invaders must capture.
///
/// Each search level also uses one synthetic placeholder fortification that
/// stands for "units held in reserve". Placeholders have no offense or
/// defense and are never part of a nation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fortification {
    id: FortificationId,
    position: u32,
    placeholder: bool,
    level: u32,
}

impl Fortification {
    /// Create a level 0 fortification at a row-major grid position.
    #[must_use]
    pub fn new(id: FortificationId, position: u32) -> Self {
        Self {
            id,
            position,
            placeholder: false,
            level: 0,
        }
    }

    /// The reserve placeholder.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            id: FortificationId::PLACEHOLDER,
            position: 0,
            placeholder: true,
            level: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> FortificationId {
        self.id
    }

    /// Row-major position on the nation grid.
    #[inline]
    #[must_use]
    pub fn position(&self) -> u32 {
        self.position
    }

    #[inline]
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    #[inline]
    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Damage this fortification deals to an assault that must fully absorb it.
    #[must_use]
    pub fn offense(&self) -> u32 {
        if self.placeholder {
            0
        } else {
            fortification_offense(self.level)
        }
    }

    /// Offense an assault needs to breach this fortification.
    #[must_use]
    pub fn defense(&self) -> u32 {
        if self.placeholder {
            0
        } else {
            fortification_defense(self.level)
        }
    }

    /// Grid coordinate in a nation of the given size.
    #[must_use]
    pub fn coordinates(&self, nation_size: u32) -> GridPoint {
        GridPoint::from_position(self.position, nation_size)
    }

    /// Return a copy upgraded by `levels`.
    #[must_use]
    pub fn upgraded(&self, levels: u32) -> Self {
        Self {
            level: self.level + levels,
            ..self.clone()
        }
    }
}
