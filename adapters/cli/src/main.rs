#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs maze search experiments.

mod settings;

use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use maze_search_core::WELCOME_BANNER;
use maze_search_rendering::{SnapshotSink, TextRenderer, TextSink};
use maze_search_system_analytics::{BatchSummary, Experiment, Stage};
use settings::CliArgs;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Tracking cycles printed by `--render`.
const RENDERED_CYCLES: u32 = 3;

/// Entry point for the maze search command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing();

    let config = args.resolve()?;
    let experiment = Experiment::new(config).context("invalid experiment configuration")?;
    println!("{WELCOME_BANNER}");
    info!(
        trials = experiment.config().trials,
        side = experiment.config().grid.side,
        alpha = experiment.config().tracking.alpha,
        "starting batch"
    );

    if args.render {
        render_first_trial(&experiment)?;
    }

    let summary = run_batch(&experiment, args.threads)?;
    println!("{summary}");
    Ok(())
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("maze_search=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_batch(experiment: &Experiment, threads: Option<usize>) -> Result<BatchSummary> {
    let summary = match threads {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .context("failed to build worker pool")?;
            pool.install(|| experiment.run_batch())
        }
        None => experiment.run_batch(),
    };
    summary.context("failed to generate the shared grid")
}

fn render_first_trial(experiment: &Experiment) -> Result<()> {
    let shared = experiment
        .shared_grid()
        .context("failed to generate the shared grid")?;
    let mut sink = TextSink::new(TextRenderer::default(), io::stdout().lock());
    let mut failure = None;

    let report = experiment.observe_trial(shared.as_ref(), 0, |stage, snapshot| {
        let heading = match stage {
            Stage::Placed => "trial 0: agent placed, scan signatures".to_owned(),
            Stage::Localized => "trial 0: localized".to_owned(),
            Stage::Tracking { cycle } if cycle <= RENDERED_CYCLES => {
                format!("trial 0: tracking cycle {cycle}")
            }
            Stage::Tracking { .. } => return,
        };
        if failure.is_none() {
            failure = sink.present(&heading, snapshot).err();
        }
    });
    if let Some(error) = failure {
        return Err(error.context("failed to render trial 0"));
    }

    match report.failure {
        None => println!(
            "trial 0 captured the target after {} steps ({} localizing, {} tracking)\n",
            report.total_steps(),
            report.localization_steps,
            report.tracking_steps
        ),
        Some(error) => println!("trial 0 failed: {error}\n"),
    }
    Ok(())
}
