//! Headless base-defense runner.
//!
//! Runs matches without graphics, either scripted from a scenario or driven
//! over JSON lines on stdin/stdout.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode - read commands from stdin
//! cargo run -p bastion_headless
//!
//! # Play one scenario, print metrics as JSON and the final board
//! cargo run -p bastion_headless -- run --scenario scenarios/fortified.ron --ascii
//!
//! # Run a batch across seeds
//! cargo run -p bastion_headless -- batch --scenario standard_hard --count 500 --output results/
//!
//! # Check that a seed replays identically
//! cargo run -p bastion_headless -- verify --scenario standard --seed 42 --runs 5
//! ```
//!
//! Logs (stderr) are human-readable; stdout is reserved for JSON.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use bastion_core::config::Difficulty;
use clap::{Parser, Subcommand, ValueEnum};
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bastion_headless::{
    ascii_visualizer::{AsciiCanvas, AsciiConfig},
    batch::{run_batch, verify_determinism, BatchConfig, BatchError},
    game_runner::{run_game, GameConfig},
    runner::{HeadlessConfig, HeadlessRunner},
    scenario::{Scenario, ScenarioError},
};

#[derive(Parser)]
#[command(name = "bastion_headless")]
#[command(about = "Headless base-defense runner for balance testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum DifficultyArg {
    Easy,
    Medium,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(arg: DifficultyArg) -> Self {
        match arg {
            DifficultyArg::Easy => Self::Easy,
            DifficultyArg::Medium => Self::Medium,
            DifficultyArg::Hard => Self::Hard,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Play one scripted match and print its metrics
    Run {
        /// Built-in scenario name or RON file
        #[arg(short, long, default_value = "standard")]
        scenario: String,

        /// Override the scenario's seed
        #[arg(long)]
        seed: Option<u64>,

        /// Override the scenario's difficulty
        #[arg(short, long, value_enum)]
        difficulty: Option<DifficultyArg>,

        /// Override the scenario's tick limit
        #[arg(long)]
        max_ticks: Option<u64>,

        /// Print ASCII frames to stderr
        #[arg(long)]
        ascii: bool,

        /// With --ascii, also print a frame every N ticks
        #[arg(long, default_value = "0")]
        frames_every: u64,

        /// Write metrics to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run a scenario across many seeds in parallel
    Batch {
        /// Built-in scenario name or RON file
        #[arg(short, long, default_value = "standard")]
        scenario: String,

        /// Number of matches
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Worker threads (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Starting seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Override the scenario's tick limit
        #[arg(long)]
        max_ticks: Option<u64>,
    },

    /// Verify determinism by running the same seed several times
    Verify {
        /// Built-in scenario name or RON file
        #[arg(short, long, default_value = "standard")]
        scenario: String,

        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },

    /// Drive a match over JSON lines on stdin/stdout
    Interactive {
        /// Built-in scenario name or RON file
        #[arg(short, long, default_value = "standard")]
        scenario: String,

        /// Output state after every tick command
        #[arg(long)]
        auto_state: bool,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    #[error(transparent)]
    Batch(#[from] BatchError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Non-determinism detected for seed {0}")]
    NonDeterministic(u64),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for machine output)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    let result = match cli.command {
        Some(Commands::Run {
            scenario,
            seed,
            difficulty,
            max_ticks,
            ascii,
            frames_every,
            output,
        }) => cmd_run(RunArgs {
            scenario,
            seed,
            difficulty,
            max_ticks,
            ascii,
            frames_every,
            output,
        }),
        Some(Commands::Batch {
            scenario,
            count,
            parallel,
            output,
            seed,
            max_ticks,
        }) => cmd_batch(&scenario, count, parallel, output, seed, max_ticks),
        Some(Commands::Verify {
            scenario,
            seed,
            runs,
        }) => cmd_verify(&scenario, seed, runs),
        Some(Commands::Interactive {
            scenario,
            auto_state,
        }) => cmd_interactive(&scenario, auto_state),
        None => cmd_interactive("standard", false),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            ExitCode::FAILURE
        }
    }
}

struct RunArgs {
    scenario: String,
    seed: Option<u64>,
    difficulty: Option<DifficultyArg>,
    max_ticks: Option<u64>,
    ascii: bool,
    frames_every: u64,
    output: Option<PathBuf>,
}

/// Play one scripted match
fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let mut scenario = Scenario::resolve(&args.scenario)?;
    if let Some(difficulty) = args.difficulty {
        scenario.difficulty = difficulty.into();
    }

    let mut config = GameConfig::new(scenario);
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(max_ticks) = args.max_ticks {
        config = config.with_max_ticks(max_ticks);
    }

    let result = if args.ascii {
        let mut canvas = AsciiCanvas::new(AsciiConfig::default());
        let result = run_game(&config.with_frames_every(args.frames_every), Some(&mut canvas));
        for frame in canvas.frames() {
            eprintln!("{frame}");
        }
        result
    } else {
        run_game(&config, None)
    };

    let json = serde_json::to_string_pretty(&result.metrics)?;
    match args.output {
        Some(path) => {
            std::fs::write(&path, json)?;
            tracing::info!(path = %path.display(), "Metrics written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }
    Ok(())
}

/// Run a batch of matches
fn cmd_batch(
    scenario: &str,
    count: u32,
    parallel: u32,
    output: PathBuf,
    seed: u64,
    max_ticks: Option<u64>,
) -> Result<(), CliError> {
    let scenario = Scenario::resolve(scenario)?;
    std::fs::create_dir_all(&output)?;

    let mut config = BatchConfig::new(count)
        .with_seed(seed)
        .with_output(output.clone());
    config.parallel_games = parallel;
    config.max_ticks = max_ticks;

    let results = run_batch(&scenario, config)?;
    let results_path = output.join("batch_results.json");
    results.save(&results_path)?;

    let summary = &results.summary;
    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE: {}", results.scenario);
    eprintln!("{}", "=".repeat(50));
    eprintln!("Matches played: {}", summary.total_games);
    eprintln!("Duration: {:.1}s", results.duration_seconds);
    eprintln!("Won:      {:>5.1}%", summary.win_rate * 100.0);
    eprintln!("Lost:     {:>5.1}%", summary.loss_rate * 100.0);
    eprintln!("Timeout:  {:>5.1}%", summary.timeout_rate * 100.0);
    eprintln!("Avg ticks: {:.0}", summary.avg_duration_ticks);
    eprintln!("Avg walls breached: {:.1}", summary.avg_walls_breached);
    if let Some(ticks) = summary.fastest_loss_ticks {
        eprintln!("Fastest loss: {ticks} ticks");
    }
    eprintln!("\nResults saved to: {}", results_path.display());
    Ok(())
}

/// Verify determinism
fn cmd_verify(scenario: &str, seed: u64, runs: u32) -> Result<(), CliError> {
    let scenario = Scenario::resolve(scenario)?;
    tracing::info!(
        scenario = %scenario.name,
        seed,
        runs,
        "Verifying determinism"
    );

    if verify_determinism(&scenario, seed, runs) {
        eprintln!("PASS: All {runs} runs produced identical results");
        Ok(())
    } else {
        eprintln!("FAIL: Non-determinism detected!");
        Err(CliError::NonDeterministic(seed))
    }
}

/// Drive a match over stdin/stdout
fn cmd_interactive(scenario: &str, auto_state: bool) -> Result<(), CliError> {
    let scenario = Scenario::resolve(scenario)?;
    let config = HeadlessConfig {
        auto_state_output: auto_state,
        ..HeadlessConfig::default()
    };

    let mut runner = HeadlessRunner::from_scenario(&scenario, config);
    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();
    runner.run(stdin, stdout)?;
    Ok(())
}
