//! Batch match runner.
//!
//! Runs one scenario across many seeds in parallel using rayon and
//! aggregates the results.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::game_runner::{run_game, GameConfig};
use crate::metrics::{BatchSummary, GameMetrics};
use crate::scenario::Scenario;

/// Configuration for a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of matches to run.
    pub game_count: u32,
    /// Worker threads (0 = rayon default).
    pub parallel_games: u32,
    /// Seed of the first match; the rest count up from it.
    pub seed_start: u64,
    /// Overrides the scenario's tick limit.
    pub max_ticks: Option<u64>,
    /// Directory for results.
    pub output_dir: PathBuf,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            game_count: 100,
            parallel_games: 0,
            seed_start: 0,
            max_ticks: None,
            output_dir: PathBuf::from("results"),
        }
    }
}

impl BatchConfig {
    /// Run `game_count` matches.
    #[must_use]
    pub fn new(game_count: u32) -> Self {
        Self {
            game_count,
            ..Default::default()
        }
    }

    /// Set output directory.
    #[must_use]
    pub fn with_output(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Set seed start.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set the tick limit.
    #[must_use]
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }
}

/// Error type for batch operations.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// The worker pool could not be built.
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    /// Results could not be written or read.
    #[error("Results I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// Results could not be encoded or decoded.
    #[error("Results JSON is invalid: {0}")]
    Json(#[from] serde_json::Error),
}

/// Results from a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Scenario played.
    pub scenario: String,
    /// Configuration used.
    pub config: BatchConfig,
    /// Per-match metrics in seed order.
    pub games: Vec<GameMetrics>,
    /// Aggregate summary.
    pub summary: BatchSummary,
    /// Wall-clock runtime.
    pub duration_seconds: f64,
}

impl BatchResults {
    /// Save results to a JSON file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), BatchError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load results from a JSON file.
    pub fn load(path: &Path) -> Result<Self, BatchError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

fn game_config(scenario: &Scenario, seed: u64, max_ticks: Option<u64>) -> GameConfig {
    let config = GameConfig::new(scenario.clone()).with_seed(seed);
    match max_ticks {
        Some(max_ticks) => config.with_max_ticks(max_ticks),
        None => config,
    }
}

/// Run a batch of matches.
pub fn run_batch(scenario: &Scenario, config: BatchConfig) -> Result<BatchResults, BatchError> {
    let start = Instant::now();
    let completed = AtomicU32::new(0);

    info!(
        scenario = %scenario.name,
        games = config.game_count,
        seed_start = config.seed_start,
        "Starting batch run"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.parallel_games as usize)
        .build()?;

    let games: Vec<GameMetrics> = pool.install(|| {
        (0..config.game_count)
            .into_par_iter()
            .map(|i| {
                let seed = config.seed_start.wrapping_add(u64::from(i));
                let result = run_game(&game_config(scenario, seed, config.max_ticks), None);

                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if done % 10 == 0 {
                    debug!("Progress: {}/{}", done, config.game_count);
                }
                result.metrics
            })
            .collect()
    });

    let summary = BatchSummary::from_games(&games);
    let duration_seconds = start.elapsed().as_secs_f64();
    info!(
        games = games.len(),
        win_rate = summary.win_rate,
        "Batch complete in {:.1}s",
        duration_seconds
    );

    Ok(BatchResults {
        scenario: scenario.name.clone(),
        config,
        games,
        summary,
        duration_seconds,
    })
}

/// Play the same seed `runs` times and compare final hashes.
pub fn verify_determinism(scenario: &Scenario, seed: u64, runs: u32) -> bool {
    let config = GameConfig::new(scenario.clone()).with_seed(seed);
    let hashes: Vec<u64> = (0..runs.max(1))
        .into_par_iter()
        .map(|_| run_game(&config, None).metrics.final_state_hash)
        .collect();

    let first = hashes[0];
    let deterministic = hashes.iter().all(|&hash| hash == first);
    if deterministic {
        info!(runs, hash = format!("{first:016x}"), "Runs agree");
    } else {
        warn!(?hashes, "Runs diverged");
    }
    deterministic
}
