//! Bounded best-first search over short self-avoiding walks.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use maze_search_core::{config::TieBreak, CellIndex, Direction};
use maze_search_world::{DistanceField, Grid};
use rand::Rng;
use tracing::{debug, trace};

use crate::BeliefMap;

/// Route chosen by the planner.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedPath {
    /// Cells to walk through, excluding the starting cell.
    pub cells: Vec<CellIndex>,
    /// Sum of belief over the starting cell and every cell in `cells`.
    pub score: f64,
}

impl PlannedPath {
    /// Number of moves the path asks for.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the path asks for no move at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Partial path waiting in the frontier.
#[derive(Clone, Debug)]
struct Partial {
    score: f64,
    sequence: u64,
    cells: Vec<CellIndex>,
}

impl PartialEq for Partial {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Partial {}

impl Ord for Partial {
    fn cmp(&self, other: &Self) -> Ordering {
        // Highest cumulative belief first, then insertion order.
        self.score
            .partial_cmp(&other.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for Partial {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Picks the walk of at most `lookahead` moves with the highest cumulative belief.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathPlanner {
    lookahead: usize,
    tie_break: TieBreak,
}

impl PathPlanner {
    /// Planner exploring walks up to `lookahead` moves long.
    #[must_use]
    pub fn new(lookahead: usize, tie_break: TieBreak) -> Self {
        Self {
            lookahead: lookahead.max(1),
            tie_break,
        }
    }

    /// Searches every self-avoiding walk from `start`.
    ///
    /// A walk is finalized when it reaches the lookahead or steps onto
    /// `target`. A walk onto the target ends the hunt, so the shortest such
    /// walk beats any belief score. Walks that dead-end earlier only compete
    /// when nothing was finalized, so the agent can still leave a pocket
    /// smaller than the lookahead.
    ///
    /// When the best walk collects no belief at all, every remaining candidate
    /// lies beyond the horizon; the planner then heads for the most likely
    /// cell along a shortest route instead. Returns `None` when `start` has
    /// no open neighbor.
    pub fn plan<R: Rng + ?Sized>(
        &self,
        grid: &Grid,
        belief: &BeliefMap,
        start: CellIndex,
        target: Option<CellIndex>,
        rng: &mut R,
    ) -> Option<PlannedPath> {
        let mut frontier = BinaryHeap::new();
        let mut sequence = 0u64;
        frontier.push(Partial {
            score: belief.get(start),
            sequence,
            cells: Vec::with_capacity(self.lookahead),
        });

        let mut capture: Option<PlannedPath> = None;
        let mut finalized = Selection::new(self.tie_break);
        let mut stunted = Selection::new(self.tie_break);
        let mut expanded = 0usize;

        while let Some(partial) = frontier.pop() {
            expanded += 1;
            let head = partial.cells.last().copied().unwrap_or(start);
            let mut extended = false;

            for direction in Direction::ALL {
                let Some(next) = grid.step(head, direction) else {
                    continue;
                };
                if next == start || partial.cells.contains(&next) {
                    continue;
                }
                extended = true;

                let mut cells = partial.cells.clone();
                cells.push(next);
                let score = partial.score + belief.get(next);
                if Some(next) == target {
                    offer_capture(&mut capture, PlannedPath { cells, score });
                    continue;
                }
                if cells.len() >= self.lookahead {
                    finalized.offer(PlannedPath { cells, score }, rng);
                    continue;
                }
                sequence += 1;
                frontier.push(Partial {
                    score,
                    sequence,
                    cells,
                });
            }

            if !extended && !partial.cells.is_empty() {
                stunted.offer(
                    PlannedPath {
                        cells: partial.cells,
                        score: partial.score,
                    },
                    rng,
                );
            }
        }

        trace!(start, expanded, "planner frontier exhausted");
        if capture.is_some() {
            return capture;
        }
        let start_mass = belief.get(start);
        match finalized.into_best().or_else(|| stunted.into_best()) {
            Some(path) if path.score <= start_mass => {
                self.approach(grid, belief, start).or(Some(path))
            }
            best => best,
        }
    }

    /// Shortest route of at most `lookahead` moves towards the most likely cell.
    fn approach(&self, grid: &Grid, belief: &BeliefMap, start: CellIndex) -> Option<PlannedPath> {
        let goal = belief.most_likely().filter(|&cell| belief.get(cell) > 0.0)?;
        let mut field = DistanceField::default();
        field.rebuild_from(grid, &[goal]);
        let mut remaining = field.distance(start)?;

        let mut head = start;
        let mut cells = Vec::with_capacity(self.lookahead);
        let mut score = belief.get(start);
        while cells.len() < self.lookahead && remaining > 0 {
            let next = grid
                .open_neighbors(head)
                .find(|&cell| field.distance(cell) == Some(remaining - 1))?;
            cells.push(next);
            score += belief.get(next);
            head = next;
            remaining -= 1;
        }

        debug!(start, goal, moves = cells.len(), "belief beyond horizon, approaching");
        Some(PlannedPath { cells, score })
    }
}

/// Keeps the shortest walk onto the target, preferring more belief among equals.
fn offer_capture(best: &mut Option<PlannedPath>, candidate: PlannedPath) {
    let better = best.as_ref().map_or(true, |current| {
        candidate.len() < current.len()
            || (candidate.len() == current.len() && candidate.score > current.score)
    });
    if better {
        *best = Some(candidate);
    }
}

/// Running best path under a tie-break rule.
#[derive(Debug)]
struct Selection {
    tie_break: TieBreak,
    best: Option<PlannedPath>,
    ties: u32,
}

impl Selection {
    const fn new(tie_break: TieBreak) -> Self {
        Self {
            tie_break,
            best: None,
            ties: 0,
        }
    }

    fn offer<R: Rng + ?Sized>(&mut self, candidate: PlannedPath, rng: &mut R) {
        let Some(best) = &self.best else {
            self.best = Some(candidate);
            self.ties = 1;
            return;
        };
        if candidate.score > best.score {
            self.best = Some(candidate);
            self.ties = 1;
        } else if candidate.score == best.score && self.tie_break == TieBreak::Random {
            self.ties += 1;
            if rng.gen_range(0..self.ties) == 0 {
                self.best = Some(candidate);
            }
        }
    }

    fn into_best(self) -> Option<PlannedPath> {
        self.best
    }
}
