//! Randomized maze carving with a dead-end loosening pass.

use maze_search_core::{
    config::GridTuning, error::GenerationError, CellCoord, CellIndex, Direction, RandomizedSet,
};
use rand::Rng;
use tracing::debug;

use crate::{query, Grid};

/// Carves connected, maze-like grids.
///
/// Generation grows a cycle-free tree from a random interior cell by opening
/// frontier cells (closed cells touching exactly one open cell), then opens a
/// fraction of the closed cells bordering dead ends to introduce loops.
#[derive(Clone, Debug)]
pub struct GridGenerator {
    side: usize,
    loosening_fraction: f64,
}

impl Default for GridGenerator {
    fn default() -> Self {
        Self::new(&GridTuning::default())
    }
}

impl GridGenerator {
    /// Creates a generator from the provided tuning.
    #[must_use]
    pub fn new(tuning: &GridTuning) -> Self {
        Self {
            side: tuning.side,
            loosening_fraction: tuning.loosening_fraction.clamp(0.0, 1.0),
        }
    }

    /// Carves a fresh grid using `rng` as the only source of randomness.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`] when the side leaves no interior or the
    /// neighbor-count bookkeeping breaks an invariant.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Grid, GenerationError> {
        if self.side < 3 {
            return Err(GenerationError::GridTooSmall { side: self.side });
        }

        let mut carver = Carver::new(self.side);
        let seed = CellCoord::new(
            rng.gen_range(1..self.side - 1),
            rng.gen_range(1..self.side - 1),
        )
        .to_index(self.side);
        carver.open_cell(seed, Opening::Tree)?;

        while !carver.frontier.is_empty() {
            let cell = carver.frontier.random_element(rng)?;
            carver.frontier.remove(cell);
            carver.open_cell(cell, Opening::Tree)?;
        }
        let tree_cells = carver.open_count;

        let mut loosening = carver.loosening_candidates();
        let budget = loosening_budget(loosening.len(), self.loosening_fraction);
        for _ in 0..budget {
            let cell = loosening.random_element(rng)?;
            loosening.remove(cell);
            carver.open_cell(cell, Opening::Loosening)?;
        }

        debug!(
            side = self.side,
            tree_cells,
            loosened = budget,
            open = carver.open_count,
            "grid carved"
        );

        let grid = Grid {
            side: self.side,
            open: carver.open,
            open_count: carver.open_count,
        };
        let reachable = query::reachable_open_cells(&grid);
        if reachable != grid.open_count() {
            return Err(GenerationError::Disconnected {
                reachable,
                open: grid.open_count(),
            });
        }
        Ok(grid)
    }
}

fn loosening_budget(candidates: usize, fraction: f64) -> usize {
    if fraction >= 1.0 {
        return candidates;
    }
    // Floor keeps the default fraction of 0.5 equal to `candidates / 2`.
    (candidates as f64 * fraction).floor() as usize
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Opening {
    Tree,
    Loosening,
}

struct Carver {
    side: usize,
    open: Vec<bool>,
    open_count: usize,
    neighbor_counts: Vec<u8>,
    frontier: RandomizedSet,
}

impl Carver {
    fn new(side: usize) -> Self {
        let cells = side * side;
        Self {
            side,
            open: vec![false; cells],
            open_count: 0,
            neighbor_counts: vec![0; cells],
            frontier: RandomizedSet::with_bound(cells),
        }
    }

    fn open_cell(&mut self, cell: CellIndex, opening: Opening) -> Result<(), GenerationError> {
        if self.open[cell] {
            return Err(GenerationError::CellAlreadyOpen { cell });
        }
        self.open[cell] = true;
        self.open_count += 1;

        for neighbor in self.interior_neighbors(cell) {
            self.neighbor_counts[neighbor] += 1;

            if self.open[neighbor] || opening == Opening::Loosening {
                continue;
            }

            match self.neighbor_counts[neighbor] {
                1 => self.frontier.add(neighbor),
                _ => self.frontier.remove(neighbor),
            }
        }
        Ok(())
    }

    fn loosening_candidates(&self) -> RandomizedSet {
        let mut candidates = RandomizedSet::with_bound(self.open.len());
        for cell in 0..self.open.len() {
            if !self.open[cell] || self.neighbor_counts[cell] != 1 {
                continue;
            }
            for neighbor in self.interior_neighbors(cell) {
                if !self.open[neighbor] {
                    candidates.add(neighbor);
                }
            }
        }
        candidates
    }

    fn interior_neighbors(&self, cell: CellIndex) -> impl Iterator<Item = CellIndex> {
        let side = self.side;
        Direction::ALL.into_iter().filter_map(move |direction| {
            direction
                .step(cell, side)
                .filter(|&next| !CellCoord::from_index(next, side).is_on_ring(side))
        })
    }
}
