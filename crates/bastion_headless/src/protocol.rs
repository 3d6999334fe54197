//! JSON protocol for headless match control.
//!
//! The interactive runner communicates via JSON lines (one object per line):
//!
//! **Input (stdin):** commands from the controller
//! **Output (stdout):** responses and state dumps
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","tick":0}
//! -> {"cmd":"place","kind":"Barracks","col":4,"row":5}
//! <- {"type":"accepted","cmd":"place","outcome":{"Placed":38}}
//! -> {"cmd":"select","id":38}
//! -> {"cmd":"fund","amount":40}
//! -> {"cmd":"advance"}
//! -> {"cmd":"tick","count":60}
//! <- {"type":"ticked","tick":60,"events":{...}}
//! -> {"cmd":"hash"}
//! <- {"type":"state_hash","tick":60,"hash":1234567890}
//! ```

use bastion_core::commands::{CommandOutcome, PlayerCommand};
use bastion_core::components::{Allegiance, GridCell, Health, StructureId, UnitId};
use bastion_core::render::{FrameInfo, RenderSink, StructureView, UnitView, VisualTag};
use bastion_core::simulation::{MatchPhase, TickEvents};
use bastion_core::structures::StructureKind;
use serde::{Deserialize, Serialize};

use crate::metrics::MatchOutcome;

/// Protocol version reported in the ready line.
pub const PROTOCOL_VERSION: &str = "1.0";

// ============================================================================
// Input Commands (controller -> runner)
// ============================================================================

/// Commands that can be sent to the headless runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Advance the match by N ticks (default: 1).
    Tick {
        /// Ticks to run.
        #[serde(default = "default_tick_count")]
        count: u32,
    },
    /// Dump the current state without advancing time.
    Query,
    /// Report the state hash.
    Hash,
    /// Place a structure with its top-left corner at a grid cell.
    Place {
        /// Structure to build.
        kind: StructureKind,
        /// Column.
        col: i32,
        /// Row.
        row: i32,
    },
    /// Select a structure.
    Select {
        /// Structure id.
        id: u32,
    },
    /// Clear the selection.
    Cancel,
    /// Fund the selected barracks.
    Fund {
        /// Gold to move.
        amount: u32,
    },
    /// Repair the selected structure.
    Repair,
    /// End the build phase.
    Advance,
    /// Replace the match with a fresh one from a scenario file.
    LoadScenario {
        /// RON file.
        path: String,
    },
    /// Stop the session.
    Quit,
}

fn default_tick_count() -> u32 {
    1
}

impl Command {
    /// Parse from a JSON line.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Command name for acknowledgments.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tick { .. } => "tick",
            Self::Query => "query",
            Self::Hash => "hash",
            Self::Place { .. } => "place",
            Self::Select { .. } => "select",
            Self::Cancel => "cancel",
            Self::Fund { .. } => "fund",
            Self::Repair => "repair",
            Self::Advance => "advance",
            Self::LoadScenario { .. } => "load_scenario",
            Self::Quit => "quit",
        }
    }

    /// The player command this line stands for, if it is one.
    #[must_use]
    pub fn to_player_command(&self) -> Option<PlayerCommand> {
        match *self {
            Self::Place { kind, col, row } => Some(PlayerCommand::PlaceStructure {
                kind,
                cell: GridCell::new(col, row),
            }),
            Self::Select { id } => Some(PlayerCommand::SelectStructure(StructureId(id))),
            Self::Cancel => Some(PlayerCommand::CancelSelection),
            Self::Fund { amount } => Some(PlayerCommand::FundStructure { amount }),
            Self::Repair => Some(PlayerCommand::RepairStructure),
            Self::Advance => Some(PlayerCommand::AdvanceBuildPhase),
            Self::Tick { .. }
            | Self::Query
            | Self::Hash
            | Self::LoadScenario { .. }
            | Self::Quit => None,
        }
    }
}

// ============================================================================
// Output Responses (runner -> controller)
// ============================================================================

/// Responses sent from the headless runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Runner is ready to accept commands.
    Ready {
        /// Protocol version.
        version: String,
        /// Current tick.
        tick: u64,
    },
    /// A player command was applied.
    Accepted {
        /// Command name.
        cmd: String,
        /// What it did.
        outcome: CommandOutcome,
    },
    /// Acknowledgment of a control command.
    Ack {
        /// Command name.
        cmd: String,
    },
    /// A command was rejected or could not be parsed.
    Error {
        /// Reason.
        message: String,
        /// Command name, when the line parsed.
        cmd: Option<String>,
    },
    /// Ticks were run.
    Ticked {
        /// Tick after the run.
        tick: u64,
        /// Everything that happened.
        events: TickSummary,
    },
    /// Full state dump.
    State(MatchState),
    /// The match has ended.
    GameOver {
        /// Result.
        result: MatchOutcome,
        /// Tick it ended on.
        ticks: u64,
    },
    /// State hash for determinism verification.
    StateHash {
        /// Current tick.
        tick: u64,
        /// Hash.
        hash: u64,
    },
    /// Goodbye message before shutdown.
    Bye,
}

impl Response {
    /// Create a ready response.
    #[must_use]
    pub fn ready(tick: u64) -> Self {
        Self::Ready {
            version: PROTOCOL_VERSION.to_string(),
            tick,
        }
    }

    /// Create an acknowledgment.
    #[must_use]
    pub fn ack(cmd: &str) -> Self {
        Self::Ack {
            cmd: cmd.to_string(),
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>, cmd: Option<&str>) -> Self {
        Self::Error {
            message: message.into(),
            cmd: cmd.map(String::from),
        }
    }

    /// Serialize to a JSON line (with newline).
    #[must_use]
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"Serialization failed: {e}"}}"#)
        });
        json.push('\n');
        json
    }
}

// ============================================================================
// State Types
// ============================================================================

/// Accumulated events of one or more ticks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSummary {
    /// Hits landed.
    pub hits: u32,
    /// Total damage dealt.
    pub damage: u64,
    /// Units removed.
    pub deaths: Vec<UnitId>,
    /// Units created.
    pub spawned: Vec<UnitId>,
    /// Walls that fell.
    pub breached: Vec<StructureId>,
    /// Gold credited by mines.
    pub gold_generated: u32,
    /// Waves released.
    pub waves_started: Vec<u32>,
    /// Last phase change.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<MatchPhase>,
}

impl TickSummary {
    /// Add one tick's events.
    pub fn absorb(&mut self, events: TickEvents) {
        self.hits += events.damage.len() as u32;
        self.damage += events
            .damage
            .iter()
            .map(|hit| u64::from(hit.damage))
            .sum::<u64>();
        self.deaths.extend(events.deaths);
        self.spawned.extend(events.spawned);
        self.breached.extend(events.breached);
        self.gold_generated += events.gold_generated;
        self.waves_started.extend(events.wave_started);
        if events.phase_change.is_some() {
            self.phase = events.phase_change;
        }
    }
}

/// Health as seen by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthState {
    /// Current.
    pub current: u32,
    /// Maximum.
    pub max: u32,
}

impl From<Health> for HealthState {
    fn from(health: Health) -> Self {
        Self {
            current: health.current,
            max: health.max,
        }
    }
}

/// One entity in a state dump. Positions are converted to floats for the
/// controller; the match itself never sees them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    /// Structure or unit id.
    pub id: u32,
    /// Visual kind, e.g. `wall_breached` or `archer`.
    pub kind: String,
    /// Center x.
    pub x: f64,
    /// Center y.
    pub y: f64,
    /// Health.
    pub health: HealthState,
    /// Side, for units.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allegiance: Option<Allegiance>,
    /// Attack line end point, for units with a live target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<(f64, f64)>,
    /// Selected, for structures.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub selected: bool,
}

/// Full state dump.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    /// Current tick.
    pub tick: u64,
    /// Phase.
    pub phase: Option<MatchPhase>,
    /// Gold in the pool.
    pub gold: u32,
    /// Waves released.
    pub waves_launched: u32,
    /// Structures in id order.
    pub structures: Vec<EntityState>,
    /// Units in id order.
    pub units: Vec<EntityState>,
    /// State hash.
    pub hash: u64,
}

/// Name used for a visual tag on the wire.
#[must_use]
pub fn tag_name(tag: VisualTag) -> String {
    match tag {
        VisualTag::CommandCenter => "command_center".to_string(),
        VisualTag::Barracks => "barracks".to_string(),
        VisualTag::GoldMine => "gold_mine".to_string(),
        VisualTag::GoldMineExhausted => "gold_mine_exhausted".to_string(),
        VisualTag::Wall => "wall".to_string(),
        VisualTag::WallBreached => "wall_breached".to_string(),
        VisualTag::Unit { archetype, .. } => format!("{archetype:?}").to_lowercase(),
    }
}

impl RenderSink for MatchState {
    fn begin_frame(&mut self, frame: &FrameInfo) {
        self.tick = frame.tick;
        self.phase = Some(frame.phase);
        self.gold = frame.gold;
        self.waves_launched = frame.waves_launched;
        self.structures.clear();
        self.units.clear();
    }

    fn structure(&mut self, view: &StructureView) {
        let center = view.bounds.center();
        self.structures.push(EntityState {
            id: view.id.0,
            kind: tag_name(view.tag),
            x: center.x.to_num(),
            y: center.y.to_num(),
            health: view.health.into(),
            allegiance: None,
            target: None,
            selected: view.selected,
        });
    }

    fn unit(&mut self, view: &UnitView) {
        let allegiance = match view.tag {
            VisualTag::Unit { allegiance, .. } => Some(allegiance),
            _ => None,
        };
        self.units.push(EntityState {
            id: view.id.0,
            kind: tag_name(view.tag),
            x: view.position.x.to_num(),
            y: view.position.y.to_num(),
            health: view.health.into(),
            allegiance,
            target: view.target_position.map(|p| (p.x.to_num(), p.y.to_num())),
            selected: false,
        });
    }
}
