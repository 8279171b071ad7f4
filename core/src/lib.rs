#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the maze search engine.
//!
//! This crate defines the vocabulary that connects the grid world, the
//! localization and tracking systems, and the adapters. Cells are addressed by
//! a single linear index `row * side + column`; [`CellCoord`] and
//! [`Direction`] translate between that index and the two-dimensional layout.
//! Dynamic subsets of cells are tracked with [`RandomizedSet`], outcomes that
//! the orchestrator must react to are expressed through the error kinds in
//! [`error`], and tunable constants live in [`config`].

pub mod config;
pub mod error;
mod randomized_set;
pub mod view;

pub use randomized_set::RandomizedSet;

/// Linear index of a single grid cell (`row * side + column`).
pub type CellIndex = usize;

/// Canonical banner emitted when an experiment starts.
pub const WELCOME_BANNER: &str = "Maze search: localize, then hunt.";

/// Moore-neighborhood offsets as `(column, row)` deltas, clockwise from north-west.
pub const MOORE_OFFSETS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
];

/// Cardinal movement directions available to the agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in clockwise order starting from north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Column and row delta produced by a single step in this direction.
    #[must_use]
    pub const fn delta(self) -> (i64, i64) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// Change in linear cell index produced by a single step on a grid with the given side.
    #[must_use]
    pub fn index_offset(self, side: usize) -> isize {
        let side = isize::try_from(side).unwrap_or(isize::MAX);
        match self {
            Self::North => -side,
            Self::East => 1,
            Self::South => side,
            Self::West => -1,
        }
    }

    /// Cell reached by stepping once from `cell`, or `None` when the step leaves the grid.
    #[must_use]
    pub fn step(self, cell: CellIndex, side: usize) -> Option<CellIndex> {
        let (dx, dy) = self.delta();
        CellCoord::from_index(cell, side)
            .offset(dx, dy, side)
            .map(|coord| coord.to_index(side))
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    column: usize,
    row: usize,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: usize, row: usize) -> Self {
        Self { column, row }
    }

    /// Decomposes a linear cell index on a grid with the given side.
    #[must_use]
    pub const fn from_index(index: CellIndex, side: usize) -> Self {
        if side == 0 {
            return Self::new(0, 0);
        }
        Self::new(index % side, index / side)
    }

    /// Linear index of the cell on a grid with the given side.
    #[must_use]
    pub const fn to_index(self, side: usize) -> CellIndex {
        self.row * side + self.column
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> usize {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> usize {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> usize {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }

    /// Reports whether the cell lies on the outer ring of a grid with the given side.
    #[must_use]
    pub const fn is_on_ring(self, side: usize) -> bool {
        self.column == 0 || self.row == 0 || self.column + 1 >= side || self.row + 1 >= side
    }

    /// Cell displaced by `(dx, dy)`, or `None` when the result leaves the grid.
    #[must_use]
    pub fn offset(self, dx: i64, dy: i64, side: usize) -> Option<Self> {
        let column = i64::try_from(self.column).ok()?.checked_add(dx)?;
        let row = i64::try_from(self.row).ok()?.checked_add(dy)?;
        let column = usize::try_from(column).ok()?;
        let row = usize::try_from(row).ok()?;
        if column < side && row < side {
            Some(Self::new(column, row))
        } else {
            None
        }
    }
}

/// Manhattan distance between two linear cell indices on a grid with the given side.
#[must_use]
pub fn manhattan_distance(a: CellIndex, b: CellIndex, side: usize) -> usize {
    CellCoord::from_index(a, side).manhattan_distance(CellCoord::from_index(b, side))
}

#[cfg(test)]
mod tests {
    use super::{manhattan_distance, CellCoord, Direction};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn linear_distance_agrees_with_coordinates() {
        let side = 8;
        let a = CellCoord::new(2, 5).to_index(side);
        let b = CellCoord::new(6, 1).to_index(side);
        assert_eq!(manhattan_distance(a, b, side), 8);
    }

    #[test]
    fn index_round_trips_through_coordinates() {
        let side = 7;
        for index in 0..side * side {
            assert_eq!(CellCoord::from_index(index, side).to_index(side), index);
        }
    }

    #[test]
    fn step_agrees_with_index_offset_inside_grid() {
        let side = 5;
        let centre = CellCoord::new(2, 2).to_index(side);
        for direction in Direction::ALL {
            let stepped = direction.step(centre, side).expect("centre has all neighbors");
            let offset = centre as isize + direction.index_offset(side);
            assert_eq!(stepped as isize, offset);
        }
    }

    #[test]
    fn step_refuses_to_leave_grid() {
        let side = 4;
        assert_eq!(Direction::North.step(1, side), None);
        assert_eq!(Direction::West.step(4, side), None);
        assert_eq!(Direction::East.step(3, side), None);
        assert_eq!(Direction::South.step(13, side), None);
    }

    #[test]
    fn ring_detection_matches_border() {
        let side = 4;
        assert!(CellCoord::new(0, 2).is_on_ring(side));
        assert!(CellCoord::new(3, 1).is_on_ring(side));
        assert!(CellCoord::new(2, 3).is_on_ring(side));
        assert!(!CellCoord::new(1, 2).is_on_ring(side));
    }
}
