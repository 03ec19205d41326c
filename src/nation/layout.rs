//! Occupancy grids describing where a nation has fortifications.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::{ConfigError, Result};

/// A square grid of cells, each either fortified or empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NationLayout {
    size: usize,
    cells: Vec<bool>,
}

impl NationLayout {
    /// Build a layout from rows of occupancy flags.
    ///
    /// Fails if there are no rows or any row's length differs from the
    /// number of rows.
    pub fn new(rows: Vec<Vec<bool>>) -> Result<Self> {
        let size = rows.len();
        if size == 0 {
            return Err(ConfigError::EmptyLayout);
        }
        if let Some((row, cells)) = rows.iter().enumerate().find(|(_, r)| r.len() != size) {
            return Err(ConfigError::NonSquareLayout {
                row,
                len: cells.len(),
                expected: size,
            });
        }

        Ok(Self {
            size,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// A fully fortified `size` × `size` layout.
    pub fn filled(size: usize) -> Result<Self> {
        Self::new(vec![vec![true; size]; size])
    }

    /// A seeded random layout where each cell is fortified with probability `density`.
    ///
    /// At least one cell is always fortified.
    pub fn random(size: usize, density: f64, seed: u64) -> Result<Self> {
        if size == 0 {
            return Err(ConfigError::EmptyLayout);
        }
        if !(0.0..=1.0).contains(&density) {
            return Err(ConfigError::InvalidDensity(density));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut cells: Vec<bool> = (0..size * size).map(|_| rng.gen_bool(density)).collect();
        if !cells.iter().any(|&c| c) {
            let idx = rng.gen_range(0..cells.len());
            cells[idx] = true;
        }

        Ok(Self { size, cells })
    }

    /// Number of cells along each side.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Check whether the cell at `row`, `column` holds a fortification.
    ///
    /// # Panics
    ///
    /// Panics if either coordinate is not less than [`size`](Self::size).
    #[must_use]
    pub fn is_fortified(&self, row: usize, column: usize) -> bool {
        assert!(
            row < self.size && column < self.size,
            "Cell ({}, {}) is outside a {}x{} layout",
            row,
            column,
            self.size,
            self.size
        );
        self.cells[row * self.size + column]
    }

    /// Number of fortified cells.
    #[must_use]
    pub fn fortified_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Row-major positions of every fortified cell.
    pub fn fortified_positions(&self) -> impl Iterator<Item = u32> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c)
            .map(|(i, _)| i as u32)
    }
}
