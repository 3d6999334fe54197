//! Match tuning data.
//!
//! Pure data structures with defaults for the standard 1024x768 map. All of
//! them deserialize from RON so scenario files can override any subset.
//!
//! **Note:** This module contains no IO. File loading lives in the headless
//! runner.

use serde::{Deserialize, Serialize};

use crate::components::Footprint;
use crate::error::{GameError, Result};
use crate::math::Fixed;
use crate::structures::StructureKind;
use crate::units::UnitArchetype;

/// Per-archetype combat and movement stats.
///
/// # Example RON
///
/// ```ron
/// ArchetypeStats(
///     speed_centi: 80,   // 0.8 world units per tick
///     health: 100,
///     damage: 10,
///     range: 50,
///     cooldown_ms: 1500,
///     radius: 15,
/// )
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchetypeStats {
    /// Movement per tick in hundredths of a world unit.
    pub speed_centi: u32,
    /// Maximum health.
    pub health: u32,
    /// Damage per hit.
    pub damage: u32,
    /// Attack range in world units.
    pub range: u32,
    /// Time between hits.
    pub cooldown_ms: u32,
    /// Body radius in world units.
    pub radius: u32,
}

impl ArchetypeStats {
    /// Movement per tick.
    #[must_use]
    pub fn speed(&self) -> Fixed {
        Fixed::from_num(self.speed_centi) / Fixed::from_num(100)
    }
}

/// Stats for every archetype.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchetypeTable {
    /// Melee infantry.
    pub warrior: ArchetypeStats,
    /// Ranged infantry.
    pub archer: ArchetypeStats,
    /// Slow heavy hitter, used for bosses.
    pub giant: ArchetypeStats,
}

impl ArchetypeTable {
    /// Stats for one archetype.
    #[must_use]
    pub fn get(&self, archetype: UnitArchetype) -> &ArchetypeStats {
        match archetype {
            UnitArchetype::Warrior => &self.warrior,
            UnitArchetype::Archer => &self.archer,
            UnitArchetype::Giant => &self.giant,
        }
    }
}

impl Default for ArchetypeTable {
    fn default() -> Self {
        Self {
            warrior: ArchetypeStats {
                speed_centi: 80,
                health: 100,
                damage: 10,
                range: 50,
                cooldown_ms: 1500,
                radius: 15,
            },
            archer: ArchetypeStats {
                speed_centi: 60,
                health: 60,
                damage: 8,
                range: 120,
                cooldown_ms: 1500,
                radius: 12,
            },
            giant: ArchetypeStats {
                speed_centi: 40,
                health: 500,
                damage: 25,
                range: 50,
                cooldown_ms: 1500,
                radius: 25,
            },
        }
    }
}

/// Size, durability and price of a structure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureSpec {
    /// Size in grid cells.
    pub footprint: Footprint,
    /// Maximum health.
    pub max_health: u32,
    /// Placement cost.
    pub cost: u32,
}

/// Specs for every structure kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureCatalog {
    /// Central structure; its destruction loses the match.
    pub command_center: StructureSpec,
    /// Defender production.
    pub barracks: StructureSpec,
    /// Passive gold income.
    pub gold_mine: StructureSpec,
    /// Perimeter obstacle.
    pub wall: StructureSpec,
}

impl Default for StructureCatalog {
    fn default() -> Self {
        Self {
            command_center: StructureSpec {
                footprint: Footprint::square(2),
                max_health: 500,
                cost: 0,
            },
            barracks: StructureSpec {
                footprint: Footprint::square(2),
                max_health: 200,
                cost: 100,
            },
            gold_mine: StructureSpec {
                footprint: Footprint::square(1),
                max_health: 150,
                cost: 75,
            },
            wall: StructureSpec {
                footprint: Footprint::square(1),
                max_health: 300,
                cost: 50,
            },
        }
    }
}

/// Barracks production tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarracksTuning {
    /// Time between spawns.
    pub spawn_interval_ms: u32,
    /// Reserve debited per spawned defender.
    pub hire_cost: u32,
}

impl Default for BarracksTuning {
    fn default() -> Self {
        Self {
            spawn_interval_ms: 8000,
            hire_cost: 20,
        }
    }
}

/// Gold mine tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoldMineTuning {
    /// Time between payouts.
    pub interval_ms: u32,
    /// Gold credited per payout.
    pub yield_amount: u32,
    /// Health the mine loses per payout.
    pub depletion: u32,
    /// Price of restoring an exhausted mine.
    pub restore_cost: u32,
}

impl Default for GoldMineTuning {
    fn default() -> Self {
        Self {
            interval_ms: 5000,
            yield_amount: 25,
            depletion: 5,
            restore_cost: 75,
        }
    }
}

/// Wall tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallTuning {
    /// Price of rebuilding a breached wall.
    pub repair_cost: u32,
}

impl Default for WallTuning {
    fn default() -> Self {
        Self { repair_cost: 50 }
    }
}

/// Which units a wave is drawn from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaveComposition {
    /// Every unit has the same archetype.
    Only(UnitArchetype),
    /// Each unit picks uniformly from the list.
    Mixed(Vec<UnitArchetype>),
}

/// One-off boss added on top of a wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossSpec {
    /// Boss archetype.
    pub archetype: UnitArchetype,
    /// Health before the difficulty multiplier.
    pub base_health: u32,
    /// Damage before the difficulty multiplier.
    pub base_damage: u32,
}

/// A single wave of attackers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveSpec {
    /// Unit count before the wave and difficulty multipliers.
    pub base_count: u32,
    /// Archetype draw.
    pub composition: WaveComposition,
    /// Optional boss.
    #[serde(default)]
    pub boss: Option<BossSpec>,
}

/// Unit-vs-wall collision rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementRules {
    /// Defenders may not step into an intact wall.
    pub defenders_blocked_by_walls: bool,
    /// Attackers may not step into an intact wall.
    pub attackers_blocked_by_walls: bool,
}

impl Default for MovementRules {
    fn default() -> Self {
        Self {
            defenders_blocked_by_walls: true,
            attackers_blocked_by_walls: false,
        }
    }
}

/// Difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Difficulty {
    /// 500 starting gold, no wave scaling.
    Easy,
    /// 400 starting gold, waves 30% larger.
    #[default]
    Medium,
    /// 300 starting gold, waves 60% larger.
    Hard,
}

impl Difficulty {
    /// Numeric level (0, 1, 2).
    #[must_use]
    pub const fn level(self) -> u32 {
        match self {
            Self::Easy => 0,
            Self::Medium => 1,
            Self::Hard => 2,
        }
    }

    /// Gold in the shared pool at match start.
    #[must_use]
    pub const fn starting_gold(self) -> u32 {
        match self {
            Self::Easy => 500,
            Self::Medium => 400,
            Self::Hard => 300,
        }
    }

    /// Apply the difficulty multiplier `1 + 0.3 * level`, truncating.
    #[must_use]
    pub const fn scale(self, base: u32) -> u32 {
        base * (10 + 3 * self.level()) / 10
    }
}

/// Complete match configuration.
///
/// # Example RON
///
/// ```ron
/// MatchConfig(
///     build_time_ms: 5000,
///     movement: MovementRules(attackers_blocked_by_walls: true),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Map width in world units.
    pub map_width: u32,
    /// Map height in world units.
    pub map_height: u32,
    /// Grid cell size in world units.
    pub cell_size: u32,
    /// Inset of the build area from every map edge.
    pub border: u32,
    /// Length of the build phase.
    pub build_time_ms: u32,
    /// Quiet time between a cleared wave and the next one.
    pub wave_interval_ms: u32,
    /// Ring the build area with walls at match start.
    pub perimeter_walls: bool,
    /// Distance at which a unit counts as standing in a breach.
    pub breach_arrival_radius: u32,
    /// Raiders look for structures this many cells either side of their path.
    pub raid_corridor_cells: u32,
    /// Collision rules.
    pub movement: MovementRules,
    /// Unit stats.
    pub archetypes: ArchetypeTable,
    /// Structure specs.
    pub structures: StructureCatalog,
    /// Barracks tuning.
    pub barracks: BarracksTuning,
    /// Gold mine tuning.
    pub gold_mine: GoldMineTuning,
    /// Wall tuning.
    pub wall: WallTuning,
    /// Waves in order.
    pub waves: Vec<WaveSpec>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            map_width: 1024,
            map_height: 768,
            cell_size: 64,
            border: 128,
            build_time_ms: 3000,
            wave_interval_ms: 3000,
            perimeter_walls: true,
            breach_arrival_radius: 10,
            raid_corridor_cells: 3,
            movement: MovementRules::default(),
            archetypes: ArchetypeTable::default(),
            structures: StructureCatalog::default(),
            barracks: BarracksTuning::default(),
            gold_mine: GoldMineTuning::default(),
            wall: WallTuning::default(),
            waves: vec![
                WaveSpec {
                    base_count: 6,
                    composition: WaveComposition::Only(UnitArchetype::Warrior),
                    boss: None,
                },
                WaveSpec {
                    base_count: 9,
                    composition: WaveComposition::Mixed(vec![
                        UnitArchetype::Warrior,
                        UnitArchetype::Archer,
                    ]),
                    boss: None,
                },
                WaveSpec {
                    base_count: 7,
                    composition: WaveComposition::Only(UnitArchetype::Warrior),
                    boss: Some(BossSpec {
                        archetype: UnitArchetype::Giant,
                        base_health: 800,
                        base_damage: 40,
                    }),
                },
            ],
        }
    }
}

impl MatchConfig {
    /// Parse a (possibly partial) configuration from RON.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        ron::from_str(source).map_err(|e| GameError::DataParseError(e.to_string()))
    }

    /// Number of waves to clear for a win.
    #[must_use]
    pub fn wave_count(&self) -> u32 {
        self.waves.len() as u32
    }

    /// Spec for a structure kind.
    #[must_use]
    pub fn spec(&self, kind: StructureKind) -> &StructureSpec {
        match kind {
            StructureKind::CommandCenter => &self.structures.command_center,
            StructureKind::Barracks => &self.structures.barracks,
            StructureKind::GoldMine => &self.structures.gold_mine,
            StructureKind::Wall => &self.structures.wall,
        }
    }
}
