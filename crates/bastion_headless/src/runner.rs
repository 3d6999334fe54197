//! Interactive headless session.
//!
//! Reads [`Command`] lines, applies them to a live [`Match`] and answers
//! with [`Response`] lines. Input and output are generic so tests can drive
//! a session from memory; the binary wires them to stdin and stdout.

use std::io::{self, BufRead, Write};

use bastion_core::simulation::{Match, DEFAULT_TICK_MS};
use tracing::{debug, info, warn};

use crate::metrics::MatchOutcome;
use crate::protocol::{Command, MatchState, Response, TickSummary};
use crate::scenario::Scenario;

/// Headless session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessConfig {
    /// Dump the full state after every `tick` command.
    pub auto_state_output: bool,
    /// Milliseconds of game time per tick.
    pub tick_ms: u32,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            auto_state_output: false,
            tick_ms: DEFAULT_TICK_MS,
        }
    }
}

/// A match driven by a controller over the JSON-lines protocol.
#[derive(Debug, Clone)]
pub struct HeadlessRunner {
    config: HeadlessConfig,
    game: Match,
    game_over_sent: bool,
}

impl HeadlessRunner {
    /// Wrap an existing match.
    #[must_use]
    pub fn new(game: Match, config: HeadlessConfig) -> Self {
        Self {
            config,
            game,
            game_over_sent: false,
        }
    }

    /// Start from a scenario, applying none of its build plan: the
    /// controller plays instead.
    #[must_use]
    pub fn from_scenario(scenario: &Scenario, mut config: HeadlessConfig) -> Self {
        config.tick_ms = scenario.tick_ms;
        Self::new(scenario.build_match(scenario.seed), config)
    }

    /// The live match.
    #[must_use]
    pub fn game(&self) -> &Match {
        &self.game
    }

    /// Run the session until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        info!(tick = self.game.current_tick(), "Starting interactive session");
        write!(output, "{}", Response::ready(self.game.current_tick()).to_json_line())?;
        output.flush()?;

        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let command = match Command::from_json(line) {
                Ok(command) => command,
                Err(e) => {
                    warn!(error = %e, "Unparseable command line");
                    let error = Response::error(format!("Parse error: {e}"), None);
                    write!(output, "{}", error.to_json_line())?;
                    output.flush()?;
                    continue;
                }
            };

            let quit = command == Command::Quit;
            for response in self.handle(command) {
                write!(output, "{}", response.to_json_line())?;
            }
            output.flush()?;
            if quit {
                break;
            }
        }

        info!(tick = self.game.current_tick(), "Session closed");
        Ok(())
    }

    /// Apply one command and collect the responses it produces.
    pub fn handle(&mut self, command: Command) -> Vec<Response> {
        debug!(cmd = command.name(), "Handling command");

        if let Some(player_command) = command.to_player_command() {
            return vec![match self.game.apply_command(player_command) {
                Ok(outcome) => Response::Accepted {
                    cmd: command.name().to_string(),
                    outcome,
                },
                Err(e) => Response::error(e.to_string(), Some(command.name())),
            }];
        }

        match command {
            Command::Tick { count } => self.run_ticks(count),
            Command::Query => vec![Response::State(self.snapshot())],
            Command::Hash => vec![Response::StateHash {
                tick: self.game.current_tick(),
                hash: self.game.state_hash(),
            }],
            Command::LoadScenario { path } => match Scenario::load(&path) {
                Ok(scenario) => {
                    info!(scenario = %scenario.name, "Scenario loaded");
                    *self = Self::from_scenario(&scenario, self.config.clone());
                    vec![Response::ready(self.game.current_tick())]
                }
                Err(e) => vec![Response::error(e.to_string(), Some("load_scenario"))],
            },
            Command::Quit => vec![Response::Bye],
            // Player commands were handled above.
            Command::Place { .. }
            | Command::Select { .. }
            | Command::Cancel
            | Command::Fund { .. }
            | Command::Repair
            | Command::Advance => Vec::new(),
        }
    }

    fn run_ticks(&mut self, count: u32) -> Vec<Response> {
        let mut summary = TickSummary::default();
        for _ in 0..count {
            if self.game.phase().is_over() {
                break;
            }
            summary.absorb(self.game.tick(self.config.tick_ms));
        }

        let mut responses = vec![Response::Ticked {
            tick: self.game.current_tick(),
            events: summary,
        }];
        if self.config.auto_state_output {
            responses.push(Response::State(self.snapshot()));
        }
        if self.game.phase().is_over() && !self.game_over_sent {
            self.game_over_sent = true;
            responses.push(Response::GameOver {
                result: MatchOutcome::from_phase(self.game.phase()),
                ticks: self.game.current_tick(),
            });
        }
        responses
    }

    fn snapshot(&self) -> MatchState {
        let mut state = MatchState::default();
        self.game.render(&mut state);
        state.hash = self.game.state_hash();
        state
    }
}
