#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Target tracking system driven by noisy pings and a Bayesian belief map.
//!
//! Once the agent knows where it stands, the target hides on a uniformly random
//! open cell. Every cycle the agent takes a few pings, folds them into its
//! [`BeliefMap`], plans a short walk through the most probable cells with the
//! [`PathPlanner`] and walks part of it. Stepping onto the target ends the
//! hunt. Every ping and every move costs one step.

mod belief;
mod planner;
mod sensor;

use maze_search_core::{
    config::TrackingTuning,
    error::TrackingError,
    view::TrialSnapshot,
    CellIndex, RandomizedSet,
};
use maze_search_world::Grid;
use rand::Rng;
use tracing::{debug, trace, warn};

pub use belief::BeliefMap;
pub use planner::{PathPlanner, PlannedPath};
pub use sensor::PingSensor;

/// Pings and moves making up one tracking cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cadence {
    /// Pings taken before planning.
    pub pings_per_cycle: u32,
    /// Planned steps walked before pinging again.
    pub moves_per_cycle: usize,
}

impl Cadence {
    /// Alternates a single ping with a single move.
    pub const INTERLEAVED: Self = Self {
        pings_per_cycle: 1,
        moves_per_cycle: 1,
    };

    /// Cadence configured by the tuning.
    #[must_use]
    pub const fn from_tuning(tuning: &TrackingTuning) -> Self {
        Self {
            pings_per_cycle: tuning.pings_per_cycle,
            moves_per_cycle: tuning.moves_per_cycle,
        }
    }
}

/// Outcome of a successful hunt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tracking {
    /// Pings plus moves spent.
    pub steps: u32,
    /// Pings taken.
    pub pings: u32,
    /// Moves walked.
    pub moves: u32,
    /// Cycles started, including the capturing one.
    pub cycles: u32,
    /// Cell where the target was caught.
    pub capture: CellIndex,
}

/// Tracking system configured with a sensor, a planner and a cadence.
#[derive(Clone, Copy, Debug)]
pub struct Tracker {
    sensor: PingSensor,
    planner: PathPlanner,
    cadence: Cadence,
    max_cycles: u32,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(&TrackingTuning::default())
    }
}

impl Tracker {
    /// Creates a tracker from the tuning.
    #[must_use]
    pub fn new(tuning: &TrackingTuning) -> Self {
        Self {
            sensor: PingSensor::new(tuning.alpha),
            planner: PathPlanner::new(tuning.lookahead, tuning.tie_break),
            cadence: Cadence::from_tuning(tuning),
            max_cycles: tuning.max_cycles,
        }
    }

    /// Replaces the ping/move cadence.
    #[must_use]
    pub fn with_cadence(mut self, cadence: Cadence) -> Self {
        self.cadence = cadence;
        self
    }

    /// Configured cadence.
    #[must_use]
    pub const fn cadence(&self) -> Cadence {
        self.cadence
    }

    /// Hides the target on a random open cell and hunts it down from `agent`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::NoOpenCells`] when there is nowhere to hide the
    /// target and [`TrackingError::NonConvergent`] when the cycle cap is hit.
    pub fn track<R: Rng>(
        &self,
        grid: &Grid,
        agent: CellIndex,
        rng: &mut R,
    ) -> Result<Tracking, TrackingError> {
        let target = place_target(grid, agent, rng)?;
        self.track_target(grid, agent, target, rng)
    }

    /// Hunts a target hidden at `target`, starting from `agent`.
    ///
    /// # Errors
    ///
    /// See [`Tracker::track`] and [`Tracker::begin`].
    pub fn track_target<R: Rng>(
        &self,
        grid: &Grid,
        agent: CellIndex,
        target: CellIndex,
        rng: &mut R,
    ) -> Result<Tracking, TrackingError> {
        self.track_target_with(grid, agent, target, rng, |_| {})
    }

    /// Like [`Tracker::track_target`], calling `on_cycle` after every cycle.
    ///
    /// # Errors
    ///
    /// See [`Tracker::track`].
    pub fn track_target_with<R, F>(
        &self,
        grid: &Grid,
        agent: CellIndex,
        target: CellIndex,
        rng: &mut R,
        mut on_cycle: F,
    ) -> Result<Tracking, TrackingError>
    where
        R: Rng,
        F: FnMut(&Hunt<'_>),
    {
        let mut hunt = self.begin(grid, agent, target)?;
        while hunt.cycles < self.max_cycles {
            let captured = hunt.run_cycle(rng);
            on_cycle(&hunt);
            if captured {
                let outcome = hunt.finish();
                debug!(
                    steps = outcome.steps,
                    cycles = outcome.cycles,
                    capture = outcome.capture,
                    "target captured"
                );
                return Ok(outcome);
            }
        }

        warn!(
            steps = hunt.steps,
            cycles = hunt.cycles,
            "tracking hit its cycle cap"
        );
        Err(TrackingError::NonConvergent { steps: hunt.steps })
    }

    /// Starts a hunt that callers drive one ping or cycle at a time.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::InvalidTarget`] when `target` is a wall or the
    /// agent's own cell, and [`TrackingError::NoOpenCells`] when `agent` is the
    /// only open cell.
    pub fn begin<'a>(
        &self,
        grid: &'a Grid,
        agent: CellIndex,
        target: CellIndex,
    ) -> Result<Hunt<'a>, TrackingError> {
        if target == agent || !grid.is_open(target) {
            return Err(TrackingError::InvalidTarget { target });
        }
        let belief = BeliefMap::uniform(grid, agent).ok_or(TrackingError::NoOpenCells)?;
        Ok(Hunt {
            grid,
            sensor: self.sensor,
            planner: self.planner,
            cadence: self.cadence,
            belief,
            agent,
            target,
            steps: 0,
            pings: 0,
            moves: 0,
            cycles: 0,
            captured: false,
        })
    }
}

/// Picks the target cell uniformly among open cells other than `agent`.
///
/// # Errors
///
/// Returns [`TrackingError::NoOpenCells`] when no such cell exists.
pub fn place_target<R: Rng + ?Sized>(
    grid: &Grid,
    agent: CellIndex,
    rng: &mut R,
) -> Result<CellIndex, TrackingError> {
    let mut hideouts: RandomizedSet = grid.open_cells().collect();
    hideouts.remove(agent);
    if hideouts.is_empty() {
        return Err(TrackingError::NoOpenCells);
    }
    Ok(hideouts.random_element(rng)?)
}

/// In-progress hunt over a borrowed grid.
#[derive(Clone, Debug)]
pub struct Hunt<'a> {
    grid: &'a Grid,
    sensor: PingSensor,
    planner: PathPlanner,
    cadence: Cadence,
    belief: BeliefMap,
    agent: CellIndex,
    target: CellIndex,
    steps: u32,
    pings: u32,
    moves: u32,
    cycles: u32,
    captured: bool,
}

impl Hunt<'_> {
    /// Current agent cell.
    #[must_use]
    pub const fn agent(&self) -> CellIndex {
        self.agent
    }

    /// Hidden target cell.
    #[must_use]
    pub const fn target(&self) -> CellIndex {
        self.target
    }

    /// Pings plus moves spent so far.
    #[must_use]
    pub const fn steps(&self) -> u32 {
        self.steps
    }

    /// Cycles started so far.
    #[must_use]
    pub const fn cycles(&self) -> u32 {
        self.cycles
    }

    /// Whether the agent has stepped onto the target.
    #[must_use]
    pub const fn is_captured(&self) -> bool {
        self.captured
    }

    /// Current belief over the target's cell.
    #[must_use]
    pub const fn belief(&self) -> &BeliefMap {
        &self.belief
    }

    /// Read-only snapshot for rendering, revealing the target.
    #[must_use]
    pub fn snapshot(&self) -> TrialSnapshot<'_> {
        TrialSnapshot {
            belief: Some(self.belief.view()),
            agent: Some(self.agent),
            target: Some(self.target),
            ..TrialSnapshot::grid_only(self.grid.view())
        }
    }

    /// Takes one ping from the agent's cell and updates the belief.
    pub fn ping<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        let distance = self.grid.distance(self.agent, self.target);
        let positive = self.sensor.sample(distance, rng);
        self.steps += 1;
        self.pings += 1;
        self.belief.observe_ping(&self.sensor, self.agent, positive);
        trace!(agent = self.agent, positive, "ping");
        positive
    }

    /// Plans the next walk from the agent's cell.
    pub fn plan<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<PlannedPath> {
        self.planner
            .plan(self.grid, &self.belief, self.agent, Some(self.target), rng)
    }

    /// Walks at most `limit` cells of `path`, stopping early on capture.
    ///
    /// Every cell left behind without a capture is ruled out of the belief.
    pub fn walk(&mut self, path: &PlannedPath, limit: usize) -> bool {
        for &cell in path.cells.iter().take(limit) {
            self.steps += 1;
            self.moves += 1;
            self.agent = cell;
            if cell == self.target {
                self.captured = true;
                return true;
            }
            self.belief.clear_cell(cell);
        }
        false
    }

    /// Runs one ping, plan and walk cycle; returns whether the target was caught.
    pub fn run_cycle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.captured {
            return true;
        }
        self.cycles += 1;
        for _ in 0..self.cadence.pings_per_cycle {
            let _ = self.ping(rng);
        }
        match self.plan(rng) {
            Some(path) => {
                trace!(
                    cycle = self.cycles,
                    moves = path.len(),
                    score = path.score,
                    "planned path"
                );
                self.walk(&path, self.cadence.moves_per_cycle)
            }
            None => false,
        }
    }

    /// Summarizes the hunt so far.
    #[must_use]
    pub fn finish(self) -> Tracking {
        Tracking {
            steps: self.steps,
            pings: self.pings,
            moves: self.moves,
            cycles: self.cycles,
            capture: self.agent,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    const DEAD_END: &str = "
        #######
        #.....#
        #######
        #######
        #######
        #######
        #######
    ";

    #[test]
    fn cadence_follows_tuning() {
        let tuning = TrackingTuning {
            pings_per_cycle: 1,
            moves_per_cycle: 2,
            ..TrackingTuning::default()
        };
        let tracker = Tracker::new(&tuning);
        assert_eq!(
            tracker.cadence(),
            Cadence {
                pings_per_cycle: 1,
                moves_per_cycle: 2
            }
        );
        assert_eq!(
            tracker.with_cadence(Cadence::INTERLEAVED).cadence(),
            Cadence::INTERLEAVED
        );
    }

    #[test]
    fn target_never_lands_on_the_agent() {
        let grid = Grid::from_ascii(DEAD_END).expect("valid layout");
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..64 {
            let target = place_target(&grid, 8, &mut rng).expect("four hideouts");
            assert_ne!(target, 8);
            assert!(grid.is_open(target));
        }
    }

    #[test]
    fn walk_stops_at_the_target() {
        let grid = Grid::from_ascii(DEAD_END).expect("valid layout");
        let tracker = Tracker::default();
        let mut hunt = tracker.begin(&grid, 8, 10).expect("hunt");
        let path = PlannedPath {
            cells: vec![9, 10, 11],
            score: 0.0,
        };
        assert!(hunt.walk(&path, 9));
        assert_eq!(hunt.agent(), 10);
        assert_eq!(hunt.steps(), 2);
        assert!(hunt.is_captured());
    }

    #[test]
    fn walk_honours_the_move_limit() {
        let grid = Grid::from_ascii(DEAD_END).expect("valid layout");
        let tracker = Tracker::default();
        let mut hunt = tracker.begin(&grid, 8, 12).expect("hunt");
        let path = PlannedPath {
            cells: vec![9, 10, 11],
            score: 0.0,
        };
        assert!(!hunt.walk(&path, 2));
        assert_eq!(hunt.agent(), 10);
        assert_eq!(hunt.belief().get(9), 0.0);
        assert_eq!(hunt.belief().get(10), 0.0);
        assert!((hunt.belief().total_excluding(10) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn snapshot_reveals_agent_target_and_belief() {
        let grid = Grid::from_ascii(DEAD_END).expect("valid layout");
        let hunt = Tracker::default().begin(&grid, 8, 12).expect("hunt");
        let snapshot = hunt.snapshot();
        assert_eq!(snapshot.agent, Some(8));
        assert_eq!(snapshot.target, Some(12));
        let belief = snapshot.belief.expect("belief view");
        assert_eq!(belief.probability(8), 0.0);
        assert_eq!(belief.probability(9), 0.25);
    }

    #[test]
    fn target_must_be_open_and_apart_from_the_agent() {
        let grid = Grid::from_ascii(DEAD_END).expect("valid layout");
        let tracker = Tracker::default();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(
            tracker.track_target(&grid, 8, 8, &mut rng),
            Err(TrackingError::InvalidTarget { target: 8 })
        );
        assert_eq!(
            tracker.track_target(&grid, 8, 15, &mut rng),
            Err(TrackingError::InvalidTarget { target: 15 })
        );
        assert!(tracker.begin(&grid, 8, 12).is_ok());
    }
}
