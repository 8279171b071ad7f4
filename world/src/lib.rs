#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative grid state for the maze search engine.
//!
//! A [`Grid`] is carved once per trial (or once per experiment) by
//! [`GridGenerator`] and is immutable afterwards. Systems read it directly or
//! through the helpers in [`query`]; the per-cell scan signatures used by the
//! localizer are derived once with [`SignatureMap::compute`].

mod connectivity;
mod generator;
mod signature;

use maze_search_core::{view::GridView, CellCoord, CellIndex, Direction};
use thiserror::Error;

pub use connectivity::DistanceField;
pub use generator::GridGenerator;
pub use signature::{SignatureMap, CLOSED_SIGNATURE};

/// Glyph marking an open cell in textual layouts.
pub const OPEN_GLYPH: char = '.';
/// Glyph marking a wall cell in textual layouts.
pub const WALL_GLYPH: char = '#';

/// Square open/closed grid addressed by linear cell index.
///
/// The outer ring is always closed and the open cells of a generated grid form
/// a single 4-connected component.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    side: usize,
    open: Vec<bool>,
    open_count: usize,
}

impl Grid {
    /// Builds a grid from open flags, checking the closed-ring invariant.
    pub(crate) fn from_cells(side: usize, open: Vec<bool>) -> Result<Self, LayoutError> {
        if open.len() != side * side {
            return Err(LayoutError::NotSquare {
                side,
                cells: open.len(),
            });
        }
        if let Some(cell) = (0..open.len())
            .find(|&cell| open[cell] && CellCoord::from_index(cell, side).is_on_ring(side))
        {
            return Err(LayoutError::OpenRing { cell });
        }
        let open_count = open.iter().filter(|&&flag| flag).count();
        Ok(Self {
            side,
            open,
            open_count,
        })
    }

    /// Parses a layout drawn with [`OPEN_GLYPH`] and [`WALL_GLYPH`], one row per line.
    ///
    /// Blank lines and surrounding whitespace are ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`LayoutError`] when the drawing is not square, uses an
    /// unknown glyph, or opens a cell on the outer ring.
    pub fn from_ascii(layout: &str) -> Result<Self, LayoutError> {
        let rows: Vec<&str> = layout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let side = rows.len();
        let mut open = Vec::with_capacity(side * side);
        for (row, line) in rows.iter().enumerate() {
            let width = line.chars().count();
            if width != side {
                return Err(LayoutError::RaggedRow { row, width, side });
            }
            for glyph in line.chars() {
                match glyph {
                    OPEN_GLYPH => open.push(true),
                    WALL_GLYPH => open.push(false),
                    other => return Err(LayoutError::UnknownGlyph(other)),
                }
            }
        }
        Self::from_cells(side, open)
    }

    /// Side length of the grid.
    #[must_use]
    pub const fn side(&self) -> usize {
        self.side
    }

    /// Total number of cells, open or closed.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.open.len()
    }

    /// Number of open cells.
    #[must_use]
    pub const fn open_count(&self) -> usize {
        self.open_count
    }

    /// Reports whether the cell is open. Out-of-range cells read as closed.
    #[must_use]
    pub fn is_open(&self, cell: CellIndex) -> bool {
        self.open.get(cell).copied().unwrap_or(false)
    }

    /// Iterator over every open cell in row-major order.
    pub fn open_cells(&self) -> impl Iterator<Item = CellIndex> + '_ {
        self.open
            .iter()
            .enumerate()
            .filter_map(|(cell, &open)| open.then_some(cell))
    }

    /// Destination of a step from `cell`, if that destination is open.
    #[must_use]
    pub fn step(&self, cell: CellIndex, direction: Direction) -> Option<CellIndex> {
        direction
            .step(cell, self.side)
            .filter(|&next| self.is_open(next))
    }

    /// Open 4-neighbors of `cell`.
    pub fn open_neighbors(&self, cell: CellIndex) -> impl Iterator<Item = CellIndex> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| self.step(cell, direction))
    }

    /// Manhattan distance between two cells of this grid.
    #[must_use]
    pub fn distance(&self, a: CellIndex, b: CellIndex) -> usize {
        maze_search_core::manhattan_distance(a, b, self.side)
    }

    /// Borrowed view for adapters.
    #[must_use]
    pub fn view(&self) -> GridView<'_> {
        GridView::new(&self.open, self.side)
    }

    /// Renders the grid with [`OPEN_GLYPH`] and [`WALL_GLYPH`].
    #[must_use]
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(self.open.len() + self.side);
        for row in self.open.chunks(self.side.max(1)) {
            out.extend(
                row.iter()
                    .map(|&open| if open { OPEN_GLYPH } else { WALL_GLYPH }),
            );
            out.push('\n');
        }
        out
    }
}

/// Reasons a textual or raw layout cannot become a [`Grid`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// Cell count does not match `side * side`.
    #[error("{cells} cells do not form a {side}x{side} grid")]
    NotSquare {
        /// Requested side.
        side: usize,
        /// Supplied cell count.
        cells: usize,
    },
    /// A row's width differs from the number of rows.
    #[error("row {row} has width {width}, expected {side}")]
    RaggedRow {
        /// Zero-based row.
        row: usize,
        /// Observed width.
        width: usize,
        /// Expected width.
        side: usize,
    },
    /// A glyph other than the open or wall glyph was found.
    #[error("unknown glyph {0:?}")]
    UnknownGlyph(char),
    /// A cell on the outer ring is open.
    #[error("cell {cell} on the outer ring is open")]
    OpenRing {
        /// Offending cell.
        cell: CellIndex,
    },
}

/// Query functions that provide read-only access to grid state.
pub mod query {
    use maze_search_core::CellIndex;
    use rand::Rng;

    use super::{DistanceField, Grid};

    /// Places an agent on a uniformly random open interior cell by rejection sampling.
    ///
    /// Returns `None` when the grid has no open cell.
    pub fn random_open_cell<R: Rng + ?Sized>(
        grid: &Grid,
        rng: &mut R,
    ) -> Option<CellIndex> {
        if grid.open_count() == 0 || grid.side() < 3 {
            return None;
        }
        let side = grid.side();
        loop {
            let column = rng.gen_range(1..side - 1);
            let row = rng.gen_range(1..side - 1);
            let cell = row * side + column;
            if grid.is_open(cell) {
                return Some(cell);
            }
        }
    }

    /// Number of open cells reachable from the first open cell.
    #[must_use]
    pub fn reachable_open_cells(grid: &Grid) -> usize {
        let Some(source) = grid.open_cells().next() else {
            return 0;
        };
        let mut field = DistanceField::default();
        field.rebuild_from(grid, &[source]);
        field.reachable_count()
    }

    /// Reports whether every open cell lies in a single 4-connected component.
    #[must_use]
    pub fn is_connected(grid: &Grid) -> bool {
        reachable_open_cells(grid) == grid.open_count()
    }

    /// Reports whether every cell on the outer ring is closed.
    #[must_use]
    pub fn ring_is_closed(grid: &Grid) -> bool {
        let side = grid.side();
        (0..grid.cell_count())
            .filter(|&cell| maze_search_core::CellCoord::from_index(cell, side).is_on_ring(side))
            .all(|cell| !grid.is_open(cell))
    }
}
