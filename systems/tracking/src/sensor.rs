//! Noisy proximity sensor.

use rand::Rng;

/// Beeps with probability `exp(-alpha * (d - 1))` for a target at Manhattan distance `d`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PingSensor {
    alpha: f64,
}

impl PingSensor {
    /// Creates a sensor with decay `alpha`. Negative values are treated as zero.
    #[must_use]
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: alpha.max(0.0),
        }
    }

    /// Decay parameter.
    #[must_use]
    pub const fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Probability of a positive ping for a target `distance` cells away.
    ///
    /// Distances below one are clamped to one, where the probability is exactly 1.
    #[must_use]
    pub fn positive_probability(&self, distance: usize) -> f64 {
        let excess = distance.saturating_sub(1);
        if excess == 0 {
            return 1.0;
        }
        (-self.alpha * excess as f64).exp()
    }

    /// Likelihood of observing `positive` if the target were `distance` cells away.
    #[must_use]
    pub fn likelihood(&self, positive: bool, distance: usize) -> f64 {
        let probability = self.positive_probability(distance);
        if positive {
            probability
        } else {
            1.0 - probability
        }
    }

    /// Samples one ping for a target `distance` cells away.
    pub fn sample<R: Rng + ?Sized>(&self, distance: usize, rng: &mut R) -> bool {
        rng.gen::<f64>() < self.positive_probability(distance)
    }
}
