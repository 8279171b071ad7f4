//! Observable outcomes that abort or cap a trial phase.
//!
//! Generation errors indicate a defect and are fatal for the trial.
//! Localization and tracking errors carry the steps spent so far so the
//! orchestrator can decide whether to discard, retry, or include the trial.

use thiserror::Error;

use crate::CellIndex;

/// Failures raised by [`crate::RandomizedSet`] operations.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SetError {
    /// A random member was requested from an empty set.
    #[error("random element requested from an empty set")]
    Empty,
    /// Shifting a member would move it below zero.
    #[error("shifting {value} by {delta} leaves the index range")]
    ShiftOutOfRange {
        /// Member that could not be shifted.
        value: CellIndex,
        /// Requested displacement.
        delta: isize,
    },
}

/// Invariant violations raised while carving the grid.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// The requested side leaves no interior cells to open.
    #[error("grid side {side} leaves no interior; at least 3 is required")]
    GridTooSmall {
        /// Requested side length.
        side: usize,
    },
    /// The generator attempted to open a cell that was already open.
    #[error("cell {cell} opened twice")]
    CellAlreadyOpen {
        /// Index of the offending cell.
        cell: CellIndex,
    },
    /// Post-generation flood fill did not reach every open cell.
    #[error("only {reachable} of {open} open cells are connected")]
    Disconnected {
        /// Cells reached from the first open cell.
        reachable: usize,
        /// Total number of open cells.
        open: usize,
    },
    /// Frontier bookkeeping surfaced an empty-set access.
    #[error(transparent)]
    Set(#[from] SetError),
}

/// Outcomes that stop localization without a unique position.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum LocalizationError {
    /// Every candidate was eliminated, so the evidence is inconsistent.
    #[error("candidate set emptied after {steps} steps")]
    NoCandidates {
        /// Steps spent before the set emptied.
        steps: u32,
    },
    /// The iteration cap was reached with several candidates remaining.
    #[error("localization exhausted after {steps} steps with {remaining} candidates left")]
    Exhausted {
        /// Steps spent before giving up.
        steps: u32,
        /// Candidates still consistent with the evidence.
        remaining: usize,
    },
    /// The grid offered no open cell to place the agent on.
    #[error("grid has no open cell to place the agent on")]
    NoOpenCells,
    /// Candidate bookkeeping surfaced a set error.
    #[error(transparent)]
    Set(#[from] SetError),
}

impl LocalizationError {
    /// Steps spent before the phase stopped, when known.
    #[must_use]
    pub const fn steps(&self) -> Option<u32> {
        match self {
            Self::NoCandidates { steps } | Self::Exhausted { steps, .. } => Some(*steps),
            Self::NoOpenCells | Self::Set(_) => None,
        }
    }
}

/// Outcomes that stop tracking without a capture.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum TrackingError {
    /// The cycle cap was reached without capturing the target.
    #[error("target not captured after {steps} steps")]
    NonConvergent {
        /// Steps spent before giving up.
        steps: u32,
    },
    /// No open cell other than the agent's remains to hide the target in.
    #[error("no open cell is available for the target")]
    NoOpenCells,
    /// The target was handed in on a wall or on the agent's own cell.
    #[error("target cell {target} is not an open cell apart from the agent's")]
    InvalidTarget {
        /// Rejected target cell.
        target: CellIndex,
    },
    /// Target placement surfaced a set error.
    #[error(transparent)]
    Set(#[from] SetError),
}

impl TrackingError {
    /// Steps spent before the phase stopped, when known.
    #[must_use]
    pub const fn steps(&self) -> Option<u32> {
        match self {
            Self::NonConvergent { steps } => Some(*steps),
            Self::NoOpenCells | Self::InvalidTarget { .. } | Self::Set(_) => None,
        }
    }
}

/// Any failure that ends a trial.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum TrialError {
    /// Grid generation violated an invariant.
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),
    /// Localization did not converge.
    #[error("localization failed: {0}")]
    Localization(#[from] LocalizationError),
    /// Tracking did not capture the target.
    #[error("tracking failed: {0}")]
    Tracking(#[from] TrackingError),
}

/// Rejected experiment configuration values.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    /// The grid side leaves no interior.
    #[error("grid side must be at least 3, got {0}")]
    Side(usize),
    /// The loosening fraction lies outside `0.0..=1.0`.
    #[error("loosening fraction must lie in 0..=1, got {0}")]
    LooseningFraction(f64),
    /// The sensor noise parameter is negative or not finite.
    #[error("alpha must be finite and non-negative, got {0}")]
    Alpha(f64),
    /// A count parameter that must be positive was zero.
    #[error("{0} must be at least 1")]
    Zero(&'static str),
}
