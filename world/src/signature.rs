//! Local scan signatures derived from the fixed grid layout.

use maze_search_core::{
    config::SignatureKind, view::CellValuesView, CellCoord, CellIndex, RandomizedSet,
    MOORE_OFFSETS,
};

use crate::Grid;

/// Signature assigned to closed cells; never produced by an open cell.
pub const CLOSED_SIGNATURE: u16 = u16::MAX;

/// Per-cell scan result, computed once per grid.
///
/// Two open cells sharing a signature are indistinguishable by a single scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureMap {
    values: Vec<u16>,
}

impl SignatureMap {
    /// Computes the signature of every cell in one pass over the grid.
    #[must_use]
    pub fn compute(grid: &Grid, kind: SignatureKind) -> Self {
        let side = grid.side();
        let values = (0..grid.cell_count())
            .map(|cell| {
                if grid.is_open(cell) {
                    encode(grid, CellCoord::from_index(cell, side), kind)
                } else {
                    CLOSED_SIGNATURE
                }
            })
            .collect();
        Self { values }
    }

    /// Signature of the cell; out-of-range cells read as closed.
    #[must_use]
    pub fn get(&self, cell: CellIndex) -> u16 {
        self.values.get(cell).copied().unwrap_or(CLOSED_SIGNATURE)
    }

    /// Every open cell carrying `signature`.
    #[must_use]
    pub fn cells_matching(&self, signature: u16) -> RandomizedSet {
        let mut matches = RandomizedSet::with_bound(self.values.len());
        if signature == CLOSED_SIGNATURE {
            return matches;
        }
        matches.extend(
            self.values
                .iter()
                .enumerate()
                .filter_map(|(cell, &value)| (value == signature).then_some(cell)),
        );
        matches
    }

    /// Borrowed view for adapters.
    #[must_use]
    pub fn view(&self) -> CellValuesView<'_> {
        CellValuesView::new(&self.values)
    }
}

fn encode(grid: &Grid, cell: CellCoord, kind: SignatureKind) -> u16 {
    let side = grid.side();
    let neighbor_open = |(dx, dy): (i64, i64)| {
        cell.offset(dx, dy, side)
            .is_some_and(|neighbor| grid.is_open(neighbor.to_index(side)))
    };

    match kind {
        SignatureKind::ClosedNeighborCount => MOORE_OFFSETS
            .into_iter()
            .filter(|&offset| !neighbor_open(offset))
            .count() as u16,
        SignatureKind::OpenNeighborMask => MOORE_OFFSETS
            .into_iter()
            .enumerate()
            .filter(|&(_, offset)| neighbor_open(offset))
            .fold(0, |mask, (bit, _)| mask | (1 << bit)),
    }
}
