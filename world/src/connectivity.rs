//! Breadth-first distance field over the open cells of a grid.

use std::collections::VecDeque;

use maze_search_core::CellIndex;

use crate::Grid;

/// Dense walking-distance grid seeded from one or more source cells.
///
/// Distances default to `u16::MAX` for walls and unreachable cells so callers
/// can tell them apart from traversable cells. The generator uses the field to
/// confirm connectivity and the tracking planner to route towards distant belief.
#[derive(Clone, Debug, Default)]
pub struct DistanceField {
    distances: Vec<u16>,
}

impl DistanceField {
    /// Rebuilds the distances with a breadth-first search from `sources`.
    ///
    /// Sources that are closed or outside the grid are ignored.
    pub fn rebuild_from(&mut self, grid: &Grid, sources: &[CellIndex]) {
        let cell_count = grid.cell_count();

        if self.distances.len() != cell_count {
            self.distances = vec![u16::MAX; cell_count];
        } else {
            self.distances.fill(u16::MAX);
        }

        if cell_count == 0 {
            return;
        }

        let mut queue = VecDeque::new();

        for &source in sources {
            if !grid.is_open(source) || self.distances[source] == 0 {
                continue;
            }
            self.distances[source] = 0;
            queue.push_back(source);
        }

        while let Some(cell) = queue.pop_front() {
            let current_distance = self.distances[cell];
            if current_distance >= u16::MAX.saturating_sub(1) {
                continue;
            }
            let next_distance = current_distance + 1;

            for neighbor in grid.open_neighbors(cell) {
                if self.distances[neighbor] <= next_distance {
                    continue;
                }
                self.distances[neighbor] = next_distance;
                queue.push_back(neighbor);
            }
        }
    }

    /// Walking distance to the cell, or `None` for walls and unreachable cells.
    #[must_use]
    pub fn distance(&self, cell: CellIndex) -> Option<u16> {
        self.distances
            .get(cell)
            .copied()
            .filter(|&distance| distance != u16::MAX)
    }

    /// Number of cells reached by the last rebuild.
    #[must_use]
    pub fn reachable_count(&self) -> usize {
        self.distances
            .iter()
            .filter(|&&distance| distance != u16::MAX)
            .count()
    }
}
