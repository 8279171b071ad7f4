//! Posterior distribution over the target's cell.

use maze_search_core::{manhattan_distance, view::BeliefView, CellIndex};
use maze_search_world::Grid;
use tracing::debug;

use crate::PingSensor;

/// Dense probability map over every cell of the grid.
///
/// Closed cells always hold zero. The excluded cell (the agent's current
/// position) is forced to zero and the remaining open cells sum to one.
#[derive(Clone, Debug, PartialEq)]
pub struct BeliefMap {
    side: usize,
    probabilities: Vec<f64>,
    open_cells: Vec<CellIndex>,
}

impl BeliefMap {
    /// Uniform prior over the open cells other than `excluded`.
    ///
    /// Returns `None` when no such cell exists.
    #[must_use]
    pub fn uniform(grid: &Grid, excluded: CellIndex) -> Option<Self> {
        let open_cells: Vec<CellIndex> = grid.open_cells().collect();
        let mut belief = Self {
            side: grid.side(),
            probabilities: vec![0.0; grid.cell_count()],
            open_cells,
        };
        if belief.reset_uniform(excluded) {
            Some(belief)
        } else {
            None
        }
    }

    /// Probability mass at `cell`; zero outside the grid.
    #[must_use]
    pub fn get(&self, cell: CellIndex) -> f64 {
        self.probabilities.get(cell).copied().unwrap_or(0.0)
    }

    /// Total mass over the open cells other than `excluded`.
    #[must_use]
    pub fn total_excluding(&self, excluded: CellIndex) -> f64 {
        self.open_cells
            .iter()
            .filter(|&&cell| cell != excluded)
            .map(|&cell| self.probabilities[cell])
            .sum()
    }

    /// Open cell holding the most mass, lowest index on ties.
    #[must_use]
    pub fn most_likely(&self) -> Option<CellIndex> {
        let mut best: Option<(CellIndex, f64)> = None;
        for &cell in &self.open_cells {
            let mass = self.probabilities[cell];
            if best.map_or(true, |(_, top)| mass > top) {
                best = Some((cell, mass));
            }
        }
        best.map(|(cell, _)| cell)
    }

    /// Bayesian update for one ping taken from `agent`.
    pub fn observe_ping(&mut self, sensor: &PingSensor, agent: CellIndex, positive: bool) {
        let side = self.side;
        self.reweight(agent, |cell| {
            sensor.likelihood(positive, manhattan_distance(agent, cell, side))
        });
    }

    /// Multiplies every open cell other than `excluded` by `likelihood` and renormalizes.
    ///
    /// A posterior with no usable mass falls back to the uniform prior.
    pub fn reweight<F>(&mut self, excluded: CellIndex, likelihood: F)
    where
        F: Fn(CellIndex) -> f64,
    {
        for &cell in &self.open_cells {
            if cell == excluded {
                continue;
            }
            self.probabilities[cell] *= likelihood(cell);
        }
        self.normalize_excluding(excluded);
    }

    /// Rules out `cell` (the agent just stood there) and renormalizes the rest.
    pub fn clear_cell(&mut self, cell: CellIndex) {
        self.normalize_excluding(cell);
    }

    /// Borrowed view for adapters.
    #[must_use]
    pub fn view(&self) -> BeliefView<'_> {
        BeliefView::new(&self.probabilities)
    }

    fn normalize_excluding(&mut self, excluded: CellIndex) {
        if let Some(slot) = self.probabilities.get_mut(excluded) {
            *slot = 0.0;
        }
        let total = self.total_excluding(excluded);
        if total > 0.0 && total.is_finite() {
            for &cell in &self.open_cells {
                self.probabilities[cell] /= total;
            }
            return;
        }

        debug!(total, excluded, "degenerate posterior, resetting to uniform");
        let _ = self.reset_uniform(excluded);
    }

    fn reset_uniform(&mut self, excluded: CellIndex) -> bool {
        self.probabilities.fill(0.0);
        let support = self
            .open_cells
            .iter()
            .filter(|&&cell| cell != excluded)
            .count();
        if support == 0 {
            return false;
        }
        let mass = 1.0 / support as f64;
        for &cell in &self.open_cells {
            if cell != excluded {
                self.probabilities[cell] = mass;
            }
        }
        true
    }
}
