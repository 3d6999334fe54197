//! Scripted match execution.
//!
//! Plays one scenario to the end (or the tick limit) with no controller
//! attached: the build plan is the only player input.

use bastion_core::render::RenderSink;
use bastion_core::simulation::Match;
use tracing::{debug, info};

use crate::metrics::{GameMetrics, MetricsCollector};
use crate::scenario::Scenario;

/// Configuration for a single scripted match.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Scenario to play.
    pub scenario: Scenario,
    /// Seed for the wave generator.
    pub seed: u64,
    /// Tick limit.
    pub max_ticks: u64,
    /// Render every N ticks when a sink is supplied (0 = final frame only).
    pub frame_every: u64,
}

impl GameConfig {
    /// Play `scenario` with its own seed and tick limit.
    #[must_use]
    pub fn new(scenario: Scenario) -> Self {
        Self {
            seed: scenario.seed,
            max_ticks: scenario.max_ticks,
            frame_every: 0,
            scenario,
        }
    }

    /// Override the seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Override the tick limit.
    #[must_use]
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    /// Render a frame every `ticks` ticks.
    #[must_use]
    pub fn with_frames_every(mut self, ticks: u64) -> Self {
        self.frame_every = ticks;
        self
    }
}

/// Outcome of a scripted match.
#[derive(Debug, Clone)]
pub struct GameResult {
    /// Collected metrics.
    pub metrics: GameMetrics,
    /// The match as it stood at the end.
    pub final_state: Match,
}

/// Play a scripted match.
///
/// Planned commands due at or before the current tick are applied before
/// that tick runs; rejected ones are logged and counted, never fatal.
pub fn run_game(config: &GameConfig, mut sink: Option<&mut dyn RenderSink>) -> GameResult {
    let scenario = &config.scenario;
    let mut game = scenario.build_match(config.seed);
    let mut collector = MetricsCollector::new(scenario.name.clone(), config.seed, &game);
    let mut plan = scenario.ordered_plan().into_iter().peekable();

    debug!(
        scenario = %scenario.name,
        seed = config.seed,
        max_ticks = config.max_ticks,
        planned = scenario.build_plan.len(),
        "Starting scripted match"
    );

    while !game.phase().is_over() && game.current_tick() < config.max_ticks {
        let now = game.current_tick();
        while let Some(planned) = plan.next_if(|planned| planned.at_tick <= now) {
            let result = game.apply_command(planned.command);
            if let Err(error) = &result {
                debug!(tick = now, command = ?planned.command, %error, "Planned command rejected");
            }
            collector.record_command(&game, &result);
        }

        let events = game.tick(scenario.tick_ms);
        collector.observe(&game, &events);

        if let Some(sink) = sink.as_deref_mut() {
            if config.frame_every > 0 && game.current_tick() % config.frame_every == 0 {
                game.render(sink);
            }
        }
    }

    if let Some(sink) = sink {
        game.render(sink);
    }

    let metrics = collector.finish(&game);
    info!(
        scenario = %metrics.scenario,
        seed = metrics.seed,
        outcome = ?metrics.outcome,
        ticks = metrics.duration_ticks,
        waves = metrics.waves_launched,
        hash = format!("{:016x}", metrics.final_state_hash),
        "Match finished"
    );

    GameResult {
        metrics,
        final_state: game,
    }
}
