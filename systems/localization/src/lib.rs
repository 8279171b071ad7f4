#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Self-localization system that narrows an unknown agent position to a single cell.
//!
//! The agent knows the map but not where it stands. It scans its local
//! neighborhood, keeps every cell with a matching signature as a candidate, and
//! then alternates moves and scans. A move whose outcome (blocked or not)
//! disagrees with a candidate's layout eliminates that candidate; surviving
//! candidates are translated with the agent. Each scan and each move costs one
//! step.

mod policy;

use maze_search_core::{
    config::LocalizationTuning, error::LocalizationError, CellIndex, Direction, RandomizedSet,
};
use maze_search_world::{query, Grid, SignatureMap};
use rand::{Rng, RngCore};
use tracing::{debug, trace, warn};

pub use policy::{policy_for, random_direction, Evidence, InformationGain, MovePolicy, Uniform};

/// Outcome of a successful localization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Localization {
    /// Cell the agent occupies once localized.
    pub position: CellIndex,
    /// Scans plus moves spent.
    pub steps: u32,
    /// Candidate-set size after the initial scan and after every iteration.
    pub candidate_history: Vec<usize>,
}

/// Localization system configured with an iteration cap and a move policy.
#[derive(Debug)]
pub struct Localizer {
    tuning: LocalizationTuning,
    policy: Box<dyn MovePolicy>,
}

impl Default for Localizer {
    fn default() -> Self {
        Self::new(LocalizationTuning::default())
    }
}

impl Localizer {
    /// Creates a localizer using the policy named by the tuning.
    #[must_use]
    pub fn new(tuning: LocalizationTuning) -> Self {
        let policy = policy_for(tuning.move_policy);
        Self { tuning, policy }
    }

    /// Creates a localizer with a caller-supplied move policy.
    #[must_use]
    pub fn with_policy(tuning: LocalizationTuning, policy: Box<dyn MovePolicy>) -> Self {
        Self { tuning, policy }
    }

    /// Places the agent on a random open interior cell and localizes it.
    ///
    /// # Errors
    ///
    /// Returns [`LocalizationError::NoOpenCells`] for an empty grid, and
    /// otherwise the errors of [`Localizer::localize_from`].
    pub fn localize<R: Rng>(
        &self,
        grid: &Grid,
        rng: &mut R,
    ) -> Result<Localization, LocalizationError> {
        let start = query::random_open_cell(grid, rng).ok_or(LocalizationError::NoOpenCells)?;
        self.localize_from(grid, start, rng)
    }

    /// Localizes an agent whose hidden starting cell is `start`.
    ///
    /// # Errors
    ///
    /// Returns [`LocalizationError::Exhausted`] when the iteration cap is hit
    /// with several candidates left, or [`LocalizationError::NoCandidates`]
    /// when the evidence eliminates every candidate.
    pub fn localize_from<R: Rng>(
        &self,
        grid: &Grid,
        start: CellIndex,
        rng: &mut R,
    ) -> Result<Localization, LocalizationError> {
        self.localize_from_with(grid, start, rng, |_| {})
    }

    /// Like [`Localizer::localize_from`], handing the session to `on_begin`
    /// right after the initial scan.
    ///
    /// # Errors
    ///
    /// See [`Localizer::localize_from`].
    pub fn localize_from_with<R, F>(
        &self,
        grid: &Grid,
        start: CellIndex,
        rng: &mut R,
        on_begin: F,
    ) -> Result<Localization, LocalizationError>
    where
        R: Rng,
        F: FnOnce(&Session<'_>),
    {
        let mut session = self.begin(grid, start)?;
        on_begin(&session);

        let mut iterations = 0;
        while !session.is_resolved() && iterations < self.tuning.max_iterations {
            session.iterate(rng)?;
            iterations += 1;
        }

        session.finish()
    }

    /// Starts a step-by-step session: computes signatures and takes the initial scan.
    ///
    /// # Errors
    ///
    /// Returns [`LocalizationError::NoOpenCells`] when `start` is not an open cell.
    pub fn begin<'a>(
        &'a self,
        grid: &'a Grid,
        start: CellIndex,
    ) -> Result<Session<'a>, LocalizationError> {
        if !grid.is_open(start) {
            return Err(LocalizationError::NoOpenCells);
        }
        let signatures = SignatureMap::compute(grid, self.tuning.signature);
        let mut session = Session {
            policy: self.policy.as_ref(),
            grid,
            signatures,
            candidates: RandomizedSet::new(),
            seen: RandomizedSet::with_bound(grid.cell_count()),
            agent: start,
            steps: 0,
            last_move: None,
            candidate_history: Vec::new(),
        };
        let scan = session.scan();
        session.candidates = session.signatures.cells_matching(scan);
        session.candidate_history.push(session.candidates.len());
        debug!(
            start,
            signature = scan,
            candidates = session.candidates.len(),
            "initial scan"
        );
        Ok(session)
    }
}

/// In-progress localization of one agent.
///
/// The session owns the true agent position; the algorithm itself only reads
/// it through scans and the blocked/unblocked outcome of moves.
#[derive(Debug)]
pub struct Session<'a> {
    policy: &'a dyn MovePolicy,
    grid: &'a Grid,
    signatures: SignatureMap,
    candidates: RandomizedSet,
    seen: RandomizedSet,
    agent: CellIndex,
    steps: u32,
    last_move: Option<Direction>,
    candidate_history: Vec<usize>,
}

impl Session<'_> {
    /// Reports whether exactly one candidate remains.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.candidates.len() == 1
    }

    /// Cells still consistent with every observation.
    #[must_use]
    pub fn candidates(&self) -> &RandomizedSet {
        &self.candidates
    }

    /// Cells recorded as seen by earlier eliminations.
    #[must_use]
    pub fn seen(&self) -> &RandomizedSet {
        &self.seen
    }

    /// True agent cell. Exposed for diagnostics and tests only.
    #[must_use]
    pub const fn agent(&self) -> CellIndex {
        self.agent
    }

    /// Scans plus moves spent so far.
    #[must_use]
    pub const fn steps(&self) -> u32 {
        self.steps
    }

    /// Signatures computed for the grid.
    #[must_use]
    pub const fn signatures(&self) -> &SignatureMap {
        &self.signatures
    }

    /// Performs one move followed by one scan.
    ///
    /// # Errors
    ///
    /// Returns [`LocalizationError::NoCandidates`] when the candidate set empties,
    /// or a set error if translating candidates leaves the index range.
    pub fn iterate<R: Rng>(&mut self, rng: &mut R) -> Result<(), LocalizationError> {
        let direction = self.choose_move(rng);
        self.execute_move(direction)?;

        let scan = self.scan();
        let mismatched: RandomizedSet = self
            .candidates
            .iter()
            .filter(|&candidate| self.signatures.get(candidate) != scan)
            .collect();
        self.candidates.difference(&mismatched);
        self.candidate_history.push(self.candidates.len());

        trace!(
            ?direction,
            signature = scan,
            candidates = self.candidates.len(),
            steps = self.steps,
            "localization iteration"
        );

        if self.candidates.is_empty() {
            return Err(LocalizationError::NoCandidates { steps: self.steps });
        }
        Ok(())
    }

    /// Consumes the session, yielding the resolved position or the reason it is unresolved.
    ///
    /// # Errors
    ///
    /// Returns [`LocalizationError::NoCandidates`] or [`LocalizationError::Exhausted`]
    /// unless exactly one candidate remains.
    pub fn finish(self) -> Result<Localization, LocalizationError> {
        match self.candidates.len() {
            0 => Err(LocalizationError::NoCandidates { steps: self.steps }),
            1 => {
                let position = self.candidates.as_slice()[0];
                debug!(position, steps = self.steps, "agent localized");
                Ok(Localization {
                    position,
                    steps: self.steps,
                    candidate_history: self.candidate_history,
                })
            }
            remaining => {
                warn!(
                    steps = self.steps,
                    remaining, "localization hit its iteration cap"
                );
                Err(LocalizationError::Exhausted {
                    steps: self.steps,
                    remaining,
                })
            }
        }
    }

    fn scan(&mut self) -> u16 {
        self.steps += 1;
        self.signatures.get(self.agent)
    }

    fn choose_move<R: Rng>(&self, rng: &mut R) -> Direction {
        let evidence = Evidence {
            grid: self.grid,
            signatures: &self.signatures,
            candidates: &self.candidates,
            seen: &self.seen,
        };
        let rng: &mut dyn RngCore = rng;
        let mut direction = self.policy.propose(&evidence, rng);
        while Some(direction) == self.last_move {
            direction = random_direction(rng);
        }
        direction
    }

    fn execute_move(&mut self, direction: Direction) -> Result<(), LocalizationError> {
        self.steps += 1;
        self.last_move = Some(direction);

        let side = self.grid.side();
        let destination = self.grid.step(self.agent, direction);
        let moved = destination.is_some();

        let mut inconsistent = RandomizedSet::new();
        for candidate in &self.candidates {
            let candidate_moves = self.grid.step(candidate, direction).is_some();
            if candidate_moves == moved {
                continue;
            }
            inconsistent.add(candidate);
            if let Some(target) = direction.step(candidate, side) {
                self.seen.add(target);
            }
        }
        self.candidates.difference(&inconsistent);

        if let Some(next) = destination {
            self.seen.union(&self.candidates);
            self.candidates.shift_all(direction.index_offset(side))?;
            self.agent = next;
        }
        Ok(())
    }
}
