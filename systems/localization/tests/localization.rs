use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use maze_search_core::config::{GridTuning, LocalizationTuning, MovePolicyKind, SignatureKind};
use maze_search_core::error::LocalizationError;
use maze_search_core::Direction;
use maze_search_system_localization::{Evidence, Localizer, MovePolicy};
use maze_search_world::{Grid, GridGenerator, SignatureMap};
use proptest::prelude::*;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

const OPEN_ROOM_WITH_PILLAR: &str = "
    #######
    #.....#
    #.....#
    #..#..#
    #.....#
    #.....#
    #######
";

fn room() -> Grid {
    Grid::from_ascii(OPEN_ROOM_WITH_PILLAR).expect("valid layout")
}

#[test]
fn candidate_history_replays_identically_for_a_seed() {
    let grid = room();
    let localizer = Localizer::default();

    let first = localizer
        .localize(&grid, &mut ChaCha8Rng::seed_from_u64(2024))
        .expect("room localizes");
    let second = localizer
        .localize(&grid, &mut ChaCha8Rng::seed_from_u64(2024))
        .expect("room localizes");

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.candidate_history.last(), Some(&1));
}

#[test]
fn candidate_history_never_grows() {
    let grid = room();
    let localizer = Localizer::default();
    for seed in 0..32 {
        let outcome = localizer
            .localize(&grid, &mut ChaCha8Rng::seed_from_u64(seed))
            .expect("room localizes");
        for pair in outcome.candidate_history.windows(2) {
            assert!(pair[1] <= pair[0], "history grew: {:?}", outcome.candidate_history);
        }
    }
}

#[test]
fn steps_count_every_scan_and_move() {
    let grid = room();
    let localizer = Localizer::default();
    let outcome = localizer
        .localize(&grid, &mut ChaCha8Rng::seed_from_u64(9))
        .expect("room localizes");
    let iterations = outcome.candidate_history.len() as u32 - 1;
    assert_eq!(outcome.steps, 1 + 2 * iterations);
}

#[test]
fn resolved_position_is_the_true_agent_cell() {
    let grid = room();
    let localizer = Localizer::default();
    let mut rng = ChaCha8Rng::seed_from_u64(31);
    let start = 2 * 7 + 4;
    let mut session = localizer.begin(&grid, start).expect("open start");
    while !session.is_resolved() {
        assert!(session.candidates().contains(session.agent()));
        session.iterate(&mut rng).expect("consistent evidence");
    }
    let agent = session.agent();
    let outcome = session.finish().expect("resolved");
    assert_eq!(outcome.position, agent);
}

#[test]
fn tiny_iteration_cap_reports_exhaustion() {
    let grid = room();
    let localizer = Localizer::new(LocalizationTuning {
        max_iterations: 1,
        move_policy: MovePolicyKind::Uniform,
        ..LocalizationTuning::default()
    });
    // The centre of the left half is surrounded by open cells, like most of the room.
    let start = 3 * 7 + 1;
    match localizer.localize_from(&grid, start, &mut ChaCha8Rng::seed_from_u64(1)) {
        Ok(outcome) => assert_eq!(outcome.candidate_history.last(), Some(&1)),
        Err(LocalizationError::Exhausted { steps, remaining }) => {
            assert_eq!(steps, 3);
            assert!(remaining > 1);
        }
        Err(other) => panic!("unexpected error: {other}"),
    }
}

#[test]
fn uniform_policy_and_open_mask_still_localize() {
    let grid = room();
    let localizer = Localizer::new(LocalizationTuning {
        move_policy: MovePolicyKind::Uniform,
        signature: SignatureKind::OpenNeighborMask,
        ..LocalizationTuning::default()
    });
    let outcome = localizer
        .localize(&grid, &mut ChaCha8Rng::seed_from_u64(77))
        .expect("room localizes");
    assert!(grid.is_open(outcome.position));
}

/// Always heads east and counts how often it was asked.
#[derive(Debug)]
struct Eastward {
    proposals: Arc<AtomicUsize>,
}

impl MovePolicy for Eastward {
    fn propose(&self, _evidence: &Evidence<'_>, _rng: &mut dyn RngCore) -> Direction {
        let _ = self.proposals.fetch_add(1, Ordering::Relaxed);
        Direction::East
    }
}

#[test]
fn custom_policy_is_consulted_once_per_iteration() {
    let grid = room();
    let tuning = LocalizationTuning::default();
    let proposals = Arc::new(AtomicUsize::new(0));
    let localizer = Localizer::with_policy(
        tuning.clone(),
        Box::new(Eastward {
            proposals: Arc::clone(&proposals),
        }),
    );

    // Corners share a signature, so one scan cannot resolve the start.
    let start = 7 + 1;
    let mut initial = None;
    let result = localizer.localize_from_with(
        &grid,
        start,
        &mut ChaCha8Rng::seed_from_u64(6),
        |session| {
            initial = Some((
                session.agent(),
                session.signatures().get(session.agent()),
                session.candidates().len(),
            ));
        },
    );

    let expected_signature = SignatureMap::compute(&grid, tuning.signature).get(start);
    let (agent, signature, candidates) = initial.expect("session observed");
    assert_eq!((agent, signature), (start, expected_signature));
    assert!(candidates > 1);

    let asked = proposals.load(Ordering::Relaxed);
    match result {
        Ok(outcome) => assert_eq!(asked, outcome.candidate_history.len() - 1),
        Err(LocalizationError::Exhausted { .. }) => {
            assert_eq!(asked, tuning.max_iterations as usize);
        }
        Err(other) => panic!("unexpected error: {other}"),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn agent_stays_a_candidate_on_generated_grids(seed in any::<u64>()) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let grid = GridGenerator::new(&GridTuning { side: 14, ..GridTuning::default() })
            .generate(&mut rng)
            .expect("grid");
        let localizer = Localizer::default();
        let start = grid.open_cells().next().expect("open cell");
        let mut session = localizer.begin(&grid, start).expect("open start");
        let mut previous = session.candidates().len();
        for _ in 0..512 {
            if session.is_resolved() {
                break;
            }
            prop_assert!(session.candidates().contains(session.agent()));
            session.iterate(&mut rng).expect("consistent evidence");
            prop_assert!(session.candidates().len() <= previous);
            previous = session.candidates().len();
        }
        if session.is_resolved() {
            prop_assert_eq!(session.candidates().as_slice(), &[session.agent()]);
        }
    }
}
