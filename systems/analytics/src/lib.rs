#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Trial orchestration and step-count statistics.
//!
//! A trial carves (or borrows) a grid, drops the agent on a random open cell,
//! localizes it and then hunts a hidden target. Trials share nothing mutable:
//! each one draws from its own generator derived from the experiment seed and
//! the trial index, so batches run in parallel and still replay exactly.

mod summary;

use maze_search_core::{
    config::ExperimentConfig,
    error::{ConfigError, GenerationError, LocalizationError, TrialError},
    view::TrialSnapshot,
    CellIndex,
};
use maze_search_system_localization::Localizer;
use maze_search_system_tracking::{place_target, Tracker};
use maze_search_world::{query, Grid, GridGenerator};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, info};

pub use summary::BatchSummary;

/// Generator stream reserved for the grid shared by every trial.
const SHARED_GRID_STREAM: u64 = 0;

/// Deterministic generator for trial `index` of an experiment seeded with `seed`.
#[must_use]
pub fn trial_rng(seed: u64, index: u32) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(u64::from(index) + 1);
    rng
}

/// Step counts and outcome of a single trial.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrialReport {
    /// Position of the trial in its batch.
    pub index: u32,
    /// Scans and moves spent localizing, including a failed attempt.
    pub localization_steps: u32,
    /// Pings and moves spent tracking, including a failed attempt.
    pub tracking_steps: u32,
    /// Why the trial stopped short of a capture, if it did.
    pub failure: Option<TrialError>,
}

impl TrialReport {
    /// Localization plus tracking steps.
    #[must_use]
    pub const fn total_steps(&self) -> u32 {
        self.localization_steps + self.tracking_steps
    }

    /// Whether the target was captured.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Moment of a trial handed to an observer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// The agent has been dropped on the grid; annotations carry scan signatures.
    Placed,
    /// Localization resolved the agent's cell.
    Localized,
    /// A tracking cycle finished.
    Tracking {
        /// One-based cycle number.
        cycle: u32,
    },
}

/// Fully configured batch of trials.
#[derive(Debug)]
pub struct Experiment {
    config: ExperimentConfig,
    generator: GridGenerator,
    localizer: Localizer,
    tracker: Tracker,
}

impl Experiment {
    /// Validates `config` and builds the systems it describes.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] reported by validation.
    pub fn new(config: ExperimentConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            generator: GridGenerator::new(&config.grid),
            localizer: Localizer::new(config.localization.clone()),
            tracker: Tracker::new(&config.tracking),
            config,
        })
    }

    /// Configuration the experiment was built from.
    #[must_use]
    pub const fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Carves the grid shared by every trial when grids are reused.
    ///
    /// # Errors
    ///
    /// Propagates generator invariant violations.
    pub fn shared_grid(&self) -> Result<Option<Grid>, GenerationError> {
        if !self.config.reuse_grid {
            return Ok(None);
        }
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        rng.set_stream(SHARED_GRID_STREAM);
        self.generator.generate(&mut rng).map(Some)
    }

    /// Runs every trial in parallel on the current rayon pool.
    ///
    /// # Errors
    ///
    /// Fails only when the shared grid cannot be generated; per-trial failures
    /// are recorded in the reports.
    pub fn run_trials(&self) -> Result<Vec<TrialReport>, GenerationError> {
        let shared = self.shared_grid()?;
        let reports: Vec<TrialReport> = (0..self.config.trials)
            .into_par_iter()
            .map(|index| self.run_trial(shared.as_ref(), index))
            .collect();
        Ok(reports)
    }

    /// Runs every trial and aggregates the reports.
    ///
    /// # Errors
    ///
    /// See [`Experiment::run_trials`].
    pub fn run_batch(&self) -> Result<BatchSummary, GenerationError> {
        let reports = self.run_trials()?;
        let summary = BatchSummary::from_reports(&reports);
        info!(
            trials = summary.trials,
            successes = summary.successes,
            mean_total_steps = summary.mean_total_steps,
            "batch finished"
        );
        Ok(summary)
    }

    /// Runs trial `index`, on `shared` when given and on a fresh grid otherwise.
    #[must_use]
    pub fn run_trial(&self, shared: Option<&Grid>, index: u32) -> TrialReport {
        self.execute(shared, index, None)
    }

    /// Runs trial `index` like [`Experiment::run_trial`], reporting every stage to `observer`.
    pub fn observe_trial<F>(
        &self,
        shared: Option<&Grid>,
        index: u32,
        mut observer: F,
    ) -> TrialReport
    where
        F: FnMut(Stage, &TrialSnapshot<'_>),
    {
        self.execute(shared, index, Some(&mut observer))
    }

    fn execute(
        &self,
        shared: Option<&Grid>,
        index: u32,
        mut observer: Option<&mut dyn FnMut(Stage, &TrialSnapshot<'_>)>,
    ) -> TrialReport {
        let mut report = TrialReport {
            index,
            localization_steps: 0,
            tracking_steps: 0,
            failure: None,
        };
        let mut rng = trial_rng(self.config.seed, index);

        let fresh;
        let grid = match shared {
            Some(grid) => grid,
            None => match self.generator.generate(&mut rng) {
                Ok(grid) => {
                    fresh = grid;
                    &fresh
                }
                Err(error) => {
                    report.failure = Some(error.into());
                    return report;
                }
            },
        };

        let Some(start) = query::random_open_cell(grid, &mut rng) else {
            report.failure = Some(LocalizationError::NoOpenCells.into());
            return report;
        };
        let localized = self
            .localizer
            .localize_from_with(grid, start, &mut rng, |session| {
                if let Some(observe) = observer.as_mut() {
                    let snapshot = TrialSnapshot {
                        annotations: Some(session.signatures().view()),
                        agent: Some(session.agent()),
                        ..TrialSnapshot::grid_only(grid.view())
                    };
                    observe(Stage::Placed, &snapshot);
                }
            });
        let position = match localized {
            Ok(localization) => {
                report.localization_steps = localization.steps;
                localization.position
            }
            Err(error) => {
                report.localization_steps = error.steps().unwrap_or(0);
                report.failure = Some(error.into());
                debug!(index, %error, "localization failed");
                return report;
            }
        };
        if let Some(observe) = observer.as_mut() {
            let snapshot = agent_snapshot(grid, position);
            observe(Stage::Localized, &snapshot);
        }

        let tracked = place_target(grid, position, &mut rng).and_then(|target| {
            self.tracker
                .track_target_with(grid, position, target, &mut rng, |hunt| {
                    if let Some(observe) = observer.as_mut() {
                        observe(
                            Stage::Tracking {
                                cycle: hunt.cycles(),
                            },
                            &hunt.snapshot(),
                        );
                    }
                })
        });
        match tracked {
            Ok(tracking) => report.tracking_steps = tracking.steps,
            Err(error) => {
                report.tracking_steps = error.steps().unwrap_or(0);
                report.failure = Some(error.into());
                debug!(index, %error, "tracking failed");
            }
        }
        report
    }
}

fn agent_snapshot(grid: &Grid, agent: CellIndex) -> TrialSnapshot<'_> {
    TrialSnapshot {
        agent: Some(agent),
        ..TrialSnapshot::grid_only(grid.view())
    }
}
