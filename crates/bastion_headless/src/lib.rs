//! Headless match runner for balance testing and CI verification.
//!
//! Runs base-defense matches without graphics:
//!
//! - **Scripted runs**: a RON scenario with a build plan plays to the end
//! - **Batches**: many seeds in parallel, aggregated into win rates
//! - **Determinism checks**: the same seed must give the same final hash
//! - **Interactive control**: JSON lines on stdin/stdout (see [`protocol`])
//!
//! Logs go to stderr; stdout carries only machine-readable output.
//!
//! # Example
//!
//! ```bash
//! # Play a scenario and print the final board
//! cargo run -p bastion_headless -- run --scenario scenarios/fortified.ron --ascii
//!
//! # 200 seeds, JSON results in results/
//! cargo run -p bastion_headless -- batch --scenario standard_hard --count 200
//!
//! # Drive a match by hand
//! echo '{"cmd":"tick","count":60}' | cargo run -p bastion_headless -- interactive
//! ```

pub mod ascii_visualizer;
pub mod batch;
pub mod game_runner;
pub mod metrics;
pub mod protocol;
pub mod runner;
pub mod scenario;

pub use ascii_visualizer::{render_ascii, AsciiCanvas, AsciiConfig};
pub use batch::{run_batch, verify_determinism, BatchConfig, BatchError, BatchResults};
pub use game_runner::{run_game, GameConfig, GameResult};
pub use metrics::{BatchSummary, GameMetrics, MatchOutcome, MetricsCollector};
pub use protocol::{Command, Response};
pub use runner::{HeadlessConfig, HeadlessRunner};
pub use scenario::{PlannedCommand, Scenario, ScenarioError};
