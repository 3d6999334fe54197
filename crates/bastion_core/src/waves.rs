//! Wave composition and spawn placement.
//!
//! All randomness comes from [`WaveRng`], a seeded generator stored in the
//! match state, so a seed fully determines every wave.

use serde::{Deserialize, Serialize};

use crate::config::{Difficulty, MatchConfig, WaveComposition, WaveSpec};
use crate::math::Vec2Fixed;
use crate::units::{StatOverrides, UnitArchetype};

/// Simple deterministic RNG for wave generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WaveRng {
    state: u64,
}

impl WaveRng {
    /// Seed the generator.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(0x9E37_79B9_7F4A_7C15),
        }
    }

    /// Next raw value. Only the high bits are returned; the low bits of this
    /// LCG cycle with a short period.
    pub fn next(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(0x5_DEEC_E66D).wrapping_add(11);
        self.state >> 16
    }

    /// Uniform value in `[min, max)`. Returns `min` for an empty range.
    pub fn next_range(&mut self, min: i32, max: i32) -> i32 {
        let range = i64::from(max) - i64::from(min);
        if range <= 0 {
            return min;
        }
        (i64::from(min) + (self.next() % range as u64) as i64) as i32
    }

    /// Uniform pick from a non-empty slice.
    pub fn pick<T: Copy>(&mut self, items: &[T]) -> Option<T> {
        if items.is_empty() {
            return None;
        }
        let index = (self.next() % items.len() as u64) as usize;
        items.get(index).copied()
    }
}

/// One attacker the director wants spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnOrder {
    /// Archetype.
    pub archetype: UnitArchetype,
    /// Stat replacements (bosses).
    pub overrides: StatOverrides,
}

/// Number of regular units in a wave: `base * (1 + 0.5 * wave) * (1 + 0.3 * level)`,
/// truncated.
#[must_use]
pub fn wave_size(spec: &WaveSpec, wave: u32, difficulty: Difficulty) -> u32 {
    spec.base_count * (2 + wave) * (10 + 3 * difficulty.level()) / 20
}

/// Everything to spawn for `wave`, regular units first, boss last.
pub fn plan_wave(
    config: &MatchConfig,
    wave: u32,
    difficulty: Difficulty,
    rng: &mut WaveRng,
) -> Vec<SpawnOrder> {
    let Some(spec) = config.waves.get(wave as usize) else {
        return Vec::new();
    };

    let count = wave_size(spec, wave, difficulty);
    let mut orders = Vec::with_capacity(count as usize + 1);
    for _ in 0..count {
        let archetype = match &spec.composition {
            WaveComposition::Only(archetype) => Some(*archetype),
            WaveComposition::Mixed(choices) => rng.pick(choices),
        };
        if let Some(archetype) = archetype {
            orders.push(SpawnOrder {
                archetype,
                overrides: StatOverrides::default(),
            });
        }
    }

    if let Some(boss) = spec.boss {
        orders.push(SpawnOrder {
            archetype: boss.archetype,
            overrides: StatOverrides {
                health: Some(difficulty.scale(boss.base_health)),
                damage: Some(difficulty.scale(boss.base_damage)),
            },
        });
    }

    orders
}

/// Random point in one of the four border strips outside the build area.
///
/// Left and right strips span the full map height, top and bottom strips the
/// full width. Bounds are inclusive.
pub fn spawn_point(config: &MatchConfig, rng: &mut WaveRng) -> Vec2Fixed {
    let width = config.map_width as i32;
    let height = config.map_height as i32;
    let border = config.border as i32;

    let (x, y) = match rng.next_range(0, 4) {
        0 => (rng.next_range(0, border + 1), rng.next_range(0, height + 1)),
        1 => (
            rng.next_range(width - border, width + 1),
            rng.next_range(0, height + 1),
        ),
        2 => (rng.next_range(0, width + 1), rng.next_range(0, border + 1)),
        _ => (
            rng.next_range(0, width + 1),
            rng.next_range(height - border, height + 1),
        ),
    };
    Vec2Fixed::from_ints(x, y)
}
