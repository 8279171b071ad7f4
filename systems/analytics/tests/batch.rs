use maze_search_core::config::{ExperimentConfig, GridTuning};
use maze_search_core::error::ConfigError;
use maze_search_system_analytics::{trial_rng, BatchSummary, Experiment, Stage};
use rand::Rng;

fn small_config(reuse_grid: bool) -> ExperimentConfig {
    ExperimentConfig {
        trials: 16,
        seed: 0xfeed,
        reuse_grid,
        grid: GridTuning {
            side: 12,
            ..GridTuning::default()
        },
        ..ExperimentConfig::default()
    }
}

#[test]
fn parallel_batch_matches_sequential_trials() {
    let experiment = Experiment::new(small_config(true)).expect("valid config");
    let shared = experiment.shared_grid().expect("grid").expect("reused grid");

    let parallel = experiment.run_trials().expect("batch");
    let sequential: Vec<_> = (0..16)
        .map(|index| experiment.run_trial(Some(&shared), index))
        .collect();

    assert_eq!(parallel, sequential);
    for (position, report) in parallel.iter().enumerate() {
        assert_eq!(report.index as usize, position);
    }
}

#[test]
fn batch_replays_identically_for_a_seed() {
    let first = Experiment::new(small_config(false))
        .expect("valid config")
        .run_batch()
        .expect("batch");
    let second = Experiment::new(small_config(false))
        .expect("valid config")
        .run_batch()
        .expect("batch");
    assert_eq!(first, second);
    assert_eq!(first.trials, 16);
    assert_eq!(
        first.successes
            + first.exhausted_localizations
            + first.non_convergent_trackings
            + first.other_failures,
        16
    );
}

#[test]
fn fresh_grid_mode_has_no_shared_grid() {
    let experiment = Experiment::new(small_config(false)).expect("valid config");
    assert!(experiment.shared_grid().expect("no generation").is_none());
    let report = experiment.run_trial(None, 3);
    assert_eq!(report.index, 3);
    if report.is_success() {
        assert!(report.localization_steps >= 1);
        assert!(report.tracking_steps >= 1);
    }
}

#[test]
fn observing_a_trial_does_not_change_its_outcome() {
    let experiment = Experiment::new(small_config(true)).expect("valid config");
    let shared = experiment.shared_grid().expect("grid");

    let mut stages = Vec::new();
    let observed = experiment.observe_trial(shared.as_ref(), 5, |stage, snapshot| {
        if stage == Stage::Placed {
            assert!(snapshot.annotations.is_some());
        }
        if let Stage::Tracking { .. } = stage {
            assert!(snapshot.belief.is_some());
            assert!(snapshot.target.is_some());
        }
        stages.push(stage);
    });
    let plain = experiment.run_trial(shared.as_ref(), 5);

    assert_eq!(observed, plain);
    assert_eq!(stages.first(), Some(&Stage::Placed));
    if plain.is_success() {
        assert_eq!(stages.get(1), Some(&Stage::Localized));
        let cycles: Vec<u32> = stages
            .iter()
            .filter_map(|stage| match stage {
                Stage::Tracking { cycle } => Some(*cycle),
                _ => None,
            })
            .collect();
        assert!(!cycles.is_empty());
        assert!(cycles.windows(2).all(|pair| pair[1] == pair[0] + 1));
    }
}

#[test]
fn trial_generators_are_independent_streams() {
    let a: u64 = trial_rng(7, 0).gen();
    let b: u64 = trial_rng(7, 1).gen();
    let again: u64 = trial_rng(7, 0).gen();
    assert_ne!(a, b);
    assert_eq!(a, again);
}

#[test]
fn invalid_configuration_is_rejected() {
    let mut config = small_config(true);
    config.tracking.lookahead = 0;
    let error = Experiment::new(config).expect_err("lookahead zero");
    assert_eq!(error, ConfigError::Zero("tracking.lookahead"));
}

#[test]
fn summary_counts_match_reports() {
    let experiment = Experiment::new(small_config(true)).expect("valid config");
    let reports = experiment.run_trials().expect("batch");
    let summary = BatchSummary::from_reports(&reports);
    let successes = reports.iter().filter(|report| report.is_success()).count();
    assert_eq!(summary.successes as usize, successes);
}
