//! Read-only snapshots handed to diagnostic adapters.
//!
//! Nothing in the search depends on these views; they only borrow state the
//! systems already own so adapters can present it.

use crate::CellIndex;

/// Read-only view into the open/closed layout of a square grid.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    open: &'a [bool],
    side: usize,
}

impl<'a> GridView<'a> {
    /// Captures a new grid view backed by the provided cell slice.
    #[must_use]
    pub const fn new(open: &'a [bool], side: usize) -> Self {
        Self { open, side }
    }

    /// Side length of the grid.
    #[must_use]
    pub const fn side(&self) -> usize {
        self.side
    }

    /// Reports whether the cell is open. Out-of-range cells read as closed.
    #[must_use]
    pub fn is_open(&self, cell: CellIndex) -> bool {
        self.open.get(cell).copied().unwrap_or(false)
    }

    /// Dense open flags in row-major order.
    #[must_use]
    pub const fn cells(&self) -> &'a [bool] {
        self.open
    }
}

/// Per-cell values (signatures, neighbor counts) laid out like the grid.
#[derive(Clone, Copy, Debug)]
pub struct CellValuesView<'a> {
    values: &'a [u16],
}

impl<'a> CellValuesView<'a> {
    /// Wraps a dense row-major value slice.
    #[must_use]
    pub const fn new(values: &'a [u16]) -> Self {
        Self { values }
    }

    /// Value stored for the cell, if it lies within the grid.
    #[must_use]
    pub fn get(&self, cell: CellIndex) -> Option<u16> {
        self.values.get(cell).copied()
    }
}

/// Read-only view of the tracker's belief over target locations.
#[derive(Clone, Copy, Debug)]
pub struct BeliefView<'a> {
    probabilities: &'a [f64],
}

impl<'a> BeliefView<'a> {
    /// Wraps a dense row-major probability slice.
    #[must_use]
    pub const fn new(probabilities: &'a [f64]) -> Self {
        Self { probabilities }
    }

    /// Probability assigned to the cell; zero outside the grid.
    #[must_use]
    pub fn probability(&self, cell: CellIndex) -> f64 {
        self.probabilities.get(cell).copied().unwrap_or(0.0)
    }

    /// Dense probabilities in row-major order.
    #[must_use]
    pub const fn cells(&self) -> &'a [f64] {
        self.probabilities
    }
}

/// Everything an adapter needs to draw one moment of a trial.
#[derive(Clone, Copy, Debug)]
pub struct TrialSnapshot<'a> {
    /// Grid layout.
    pub grid: GridView<'a>,
    /// Optional per-cell annotation such as scan signatures.
    pub annotations: Option<CellValuesView<'a>>,
    /// Optional belief map.
    pub belief: Option<BeliefView<'a>>,
    /// Current agent cell, when known to the caller.
    pub agent: Option<CellIndex>,
    /// Target cell, when the caller chooses to reveal it.
    pub target: Option<CellIndex>,
}

impl<'a> TrialSnapshot<'a> {
    /// Snapshot showing only the grid layout.
    #[must_use]
    pub const fn grid_only(grid: GridView<'a>) -> Self {
        Self {
            grid,
            annotations: None,
            belief: None,
            agent: None,
            target: None,
        }
    }
}
