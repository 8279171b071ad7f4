//! Move selection strategies for the localizer.

use std::{collections::HashSet, fmt};

use maze_search_core::{config::MovePolicyKind, Direction, RandomizedSet};
use maze_search_world::{Grid, SignatureMap};
use rand::{Rng, RngCore};

/// Everything a policy may inspect when proposing the next move.
#[derive(Clone, Copy, Debug)]
pub struct Evidence<'a> {
    /// Map being searched.
    pub grid: &'a Grid,
    /// Scan signature of every cell.
    pub signatures: &'a SignatureMap,
    /// Cells still consistent with every observation.
    pub candidates: &'a RandomizedSet,
    /// Cells already accounted for by earlier eliminations.
    pub seen: &'a RandomizedSet,
}

/// Strategy proposing the direction of the next localization move.
///
/// The localizer applies the anti-oscillation rule on top of whatever the
/// policy proposes, so policies need not remember earlier moves.
pub trait MovePolicy: fmt::Debug + Send + Sync {
    /// Proposes a direction given the current evidence.
    fn propose(&self, evidence: &Evidence<'_>, rng: &mut dyn RngCore) -> Direction;
}

/// Builds the policy named by the configuration.
#[must_use]
pub fn policy_for(kind: MovePolicyKind) -> Box<dyn MovePolicy> {
    match kind {
        MovePolicyKind::InformationGain => Box::new(InformationGain),
        MovePolicyKind::Uniform => Box::new(Uniform),
    }
}

/// Uniformly random cardinal direction.
pub fn random_direction(rng: &mut dyn RngCore) -> Direction {
    Direction::ALL[rng.gen_range(0..Direction::ALL.len())]
}

/// Chooses the direction whose unseen neighbor cells show the most distinct
/// signatures across all candidates.
///
/// A strict winner is required; any tie, including all tallies being zero,
/// falls back to a uniformly random direction.
#[derive(Clone, Copy, Debug, Default)]
pub struct InformationGain;

impl InformationGain {
    /// Number of distinct unseen neighbor signatures per direction, in [`Direction::ALL`] order.
    #[must_use]
    pub fn tallies(evidence: &Evidence<'_>) -> [usize; 4] {
        let side = evidence.grid.side();
        let mut distinct: [HashSet<u16>; 4] = Default::default();

        for candidate in evidence.candidates {
            for (slot, direction) in Direction::ALL.into_iter().enumerate() {
                let Some(neighbor) = direction.step(candidate, side) else {
                    continue;
                };
                if evidence.seen.contains(neighbor) {
                    continue;
                }
                let _ = distinct[slot].insert(evidence.signatures.get(neighbor));
            }
        }

        distinct.map(|signatures| signatures.len())
    }
}

impl MovePolicy for InformationGain {
    fn propose(&self, evidence: &Evidence<'_>, rng: &mut dyn RngCore) -> Direction {
        let tallies = Self::tallies(evidence);
        strict_winner(&tallies).unwrap_or_else(|| random_direction(rng))
    }
}

/// Ignores the evidence and picks any direction uniformly.
#[derive(Clone, Copy, Debug, Default)]
pub struct Uniform;

impl MovePolicy for Uniform {
    fn propose(&self, _evidence: &Evidence<'_>, rng: &mut dyn RngCore) -> Direction {
        random_direction(rng)
    }
}

fn strict_winner(tallies: &[usize; 4]) -> Option<Direction> {
    let best = *tallies.iter().max()?;
    let mut winners = tallies.iter().enumerate().filter(|&(_, &tally)| tally == best);
    let (slot, _) = winners.next()?;
    if winners.next().is_some() {
        return None;
    }
    Some(Direction::ALL[slot])
}
