//! Tunable knobs for grid generation, localization, tracking and experiments.
//!
//! Every struct deserializes with `#[serde(default)]`, so a partial
//! configuration file only overrides the fields it names.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default seed used when an experiment does not name one.
pub const DEFAULT_SEED: u64 = 0x5eed_0f_5a1f_7a57;

/// Grid generation parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridTuning {
    /// Side length of the square grid, including the closed outer ring.
    pub side: usize,
    /// Share of dead-end loosening candidates opened after the tree pass.
    pub loosening_fraction: f64,
}

impl Default for GridTuning {
    fn default() -> Self {
        Self {
            side: 32,
            loosening_fraction: 0.5,
        }
    }
}

/// Encoding used for the per-cell local scan signature.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureKind {
    /// Number of closed cells among the eight Moore neighbors.
    #[default]
    ClosedNeighborCount,
    /// Bit per Moore neighbor, set when that neighbor is open.
    OpenNeighborMask,
}

/// Strategy used by the localizer to choose its next move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovePolicyKind {
    /// Prefer the direction revealing the most distinct neighbor signatures.
    #[default]
    InformationGain,
    /// Pick a direction uniformly at random.
    Uniform,
}

/// Localization parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalizationTuning {
    /// Maximum number of move-and-scan iterations before giving up.
    pub max_iterations: u32,
    /// Move selection strategy.
    pub move_policy: MovePolicyKind,
    /// Local scan encoding.
    pub signature: SignatureKind,
}

impl Default for LocalizationTuning {
    fn default() -> Self {
        Self {
            max_iterations: 512,
            move_policy: MovePolicyKind::default(),
            signature: SignatureKind::default(),
        }
    }
}

/// Rule deciding between planned paths with equal cumulative belief.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Keep the first finalized path reaching the best score.
    #[default]
    KeepFirst,
    /// Choose uniformly among finalized paths sharing the best score.
    Random,
}

/// Tracking parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingTuning {
    /// Sensor decay; a ping at distance `d` is positive with probability `exp(-alpha * (d - 1))`.
    pub alpha: f64,
    /// Maximum number of moves in a planned path.
    pub lookahead: usize,
    /// Pings taken at the start of every cycle.
    pub pings_per_cycle: u32,
    /// Planned steps executed before the next ping cycle.
    pub moves_per_cycle: usize,
    /// Maximum number of ping/plan/move cycles before giving up.
    pub max_cycles: u32,
    /// Planner tie-break rule.
    pub tie_break: TieBreak,
}

impl Default for TrackingTuning {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            lookahead: 9,
            pings_per_cycle: 3,
            moves_per_cycle: 9,
            max_cycles: 512,
            tie_break: TieBreak::default(),
        }
    }
}

/// Complete description of a batch of independent trials.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Number of independent trials.
    pub trials: u32,
    /// Seed from which every per-trial generator is derived.
    pub seed: u64,
    /// Generate one grid and share it across trials instead of one per trial.
    pub reuse_grid: bool,
    /// Grid generation parameters.
    pub grid: GridTuning,
    /// Localization parameters.
    pub localization: LocalizationTuning,
    /// Tracking parameters.
    pub tracking: TrackingTuning,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            trials: 5_000,
            seed: DEFAULT_SEED,
            reuse_grid: true,
            grid: GridTuning::default(),
            localization: LocalizationTuning::default(),
            tracking: TrackingTuning::default(),
        }
    }
}

impl ExperimentConfig {
    /// Checks every parameter against its admissible range.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.side < 3 {
            return Err(ConfigError::Side(self.grid.side));
        }
        let fraction = self.grid.loosening_fraction;
        if !(0.0..=1.0).contains(&fraction) {
            return Err(ConfigError::LooseningFraction(fraction));
        }
        let alpha = self.tracking.alpha;
        if !alpha.is_finite() || alpha < 0.0 {
            return Err(ConfigError::Alpha(alpha));
        }
        if self.trials == 0 {
            return Err(ConfigError::Zero("trials"));
        }
        if self.localization.max_iterations == 0 {
            return Err(ConfigError::Zero("localization.max_iterations"));
        }
        if self.tracking.lookahead == 0 {
            return Err(ConfigError::Zero("tracking.lookahead"));
        }
        if self.tracking.pings_per_cycle == 0 {
            return Err(ConfigError::Zero("tracking.pings_per_cycle"));
        }
        if self.tracking.moves_per_cycle == 0 {
            return Err(ConfigError::Zero("tracking.moves_per_cycle"));
        }
        if self.tracking.max_cycles == 0 {
            return Err(ConfigError::Zero("tracking.max_cycles"));
        }
        Ok(())
    }
}
