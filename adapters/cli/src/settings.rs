use std::{fs, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use maze_search_core::config::ExperimentConfig;

/// Runs batches of localize-then-hunt trials and prints their step statistics.
#[derive(Debug, Parser)]
#[command(name = "maze-search", version)]
pub(crate) struct CliArgs {
    /// TOML file with experiment settings; flags override its values.
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
    /// Number of trials.
    #[arg(long)]
    pub(crate) trials: Option<u32>,
    /// Grid side length.
    #[arg(long)]
    pub(crate) side: Option<usize>,
    /// Sensor decay parameter.
    #[arg(long)]
    pub(crate) alpha: Option<f64>,
    /// Maximum planned path length.
    #[arg(long)]
    pub(crate) lookahead: Option<usize>,
    /// Pings per tracking cycle.
    #[arg(long)]
    pub(crate) pings: Option<u32>,
    /// Planned steps walked per tracking cycle.
    #[arg(long)]
    pub(crate) moves: Option<usize>,
    /// Experiment seed.
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Generate a new grid for every trial.
    #[arg(long)]
    pub(crate) fresh_grid: bool,
    /// Worker threads; defaults to one per core.
    #[arg(long)]
    pub(crate) threads: Option<usize>,
    /// Print the first trial's grid, signatures and belief maps.
    #[arg(long)]
    pub(crate) render: bool,
}

impl CliArgs {
    /// Loads the configuration file, if any, and applies flag overrides.
    pub(crate) fn resolve(&self) -> Result<ExperimentConfig> {
        let mut config = match &self.config {
            Some(path) => load(path)?,
            None => ExperimentConfig::default(),
        };
        self.apply(&mut config);
        Ok(config)
    }

    fn apply(&self, config: &mut ExperimentConfig) {
        if let Some(trials) = self.trials {
            config.trials = trials;
        }
        if let Some(side) = self.side {
            config.grid.side = side;
        }
        if let Some(alpha) = self.alpha {
            config.tracking.alpha = alpha;
        }
        if let Some(lookahead) = self.lookahead {
            config.tracking.lookahead = lookahead;
        }
        if let Some(pings) = self.pings {
            config.tracking.pings_per_cycle = pings;
        }
        if let Some(moves) = self.moves {
            config.tracking.moves_per_cycle = moves;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.fresh_grid {
            config.reuse_grid = false;
        }
    }
}

fn load(path: &Path) -> Result<ExperimentConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read experiment config at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid experiment config at {}", path.display()))
}

fn parse(contents: &str) -> Result<ExperimentConfig> {
    toml::from_str(contents).context("failed to parse experiment config toml contents")
}
