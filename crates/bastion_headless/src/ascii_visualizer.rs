//! ASCII render sink for terminal review.
//!
//! Structures fill the character cells their footprint covers; units draw
//! over them as a single letter, uppercase for attackers and lowercase for
//! defenders.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use bastion_core::components::Allegiance;
use bastion_core::math::Fixed;
use bastion_core::render::{FrameInfo, RenderSink, StructureView, UnitView, VisualTag};
use bastion_core::simulation::Match;
use bastion_core::units::UnitArchetype;

/// ASCII visualization configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsciiConfig {
    /// Width of the viewport in characters.
    pub width: usize,
    /// Height of the viewport in characters.
    pub height: usize,
    /// Append a legend and unit counts.
    pub show_legend: bool,
    /// Use colored output (ANSI).
    pub use_color: bool,
}

impl Default for AsciiConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 24,
            show_legend: true,
            use_color: false,
        }
    }
}

/// ANSI color codes.
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const RED: &str = "\x1b[31m";
    pub const BLUE: &str = "\x1b[34m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const GRAY: &str = "\x1b[90m";
}

/// Glyph for a visual tag.
#[must_use]
pub fn glyph(tag: VisualTag) -> char {
    match tag {
        VisualTag::CommandCenter => '#',
        VisualTag::Barracks => 'B',
        VisualTag::GoldMine => '$',
        VisualTag::GoldMineExhausted => 'x',
        VisualTag::Wall => '=',
        VisualTag::WallBreached => ':',
        VisualTag::Unit {
            archetype,
            allegiance,
        } => {
            let base = match archetype {
                UnitArchetype::Warrior => 'w',
                UnitArchetype::Archer => 'a',
                UnitArchetype::Giant => 'g',
            };
            match allegiance {
                Allegiance::Attacker => base.to_ascii_uppercase(),
                Allegiance::Defender => base,
            }
        }
    }
}

fn color(tag: VisualTag) -> &'static str {
    match tag {
        VisualTag::CommandCenter | VisualTag::Barracks => colors::BOLD,
        VisualTag::GoldMine => colors::YELLOW,
        VisualTag::GoldMineExhausted | VisualTag::Wall | VisualTag::WallBreached => colors::GRAY,
        VisualTag::Unit {
            allegiance: Allegiance::Attacker,
            ..
        } => colors::RED,
        VisualTag::Unit {
            allegiance: Allegiance::Defender,
            ..
        } => colors::BLUE,
    }
}

/// Render sink that turns each frame into text.
#[derive(Debug, Clone)]
pub struct AsciiCanvas {
    config: AsciiConfig,
    frame: Option<FrameInfo>,
    grid: Vec<Vec<Option<VisualTag>>>,
    counts: BTreeMap<char, u32>,
    frames: Vec<String>,
}

impl AsciiCanvas {
    /// Empty canvas.
    #[must_use]
    pub fn new(config: AsciiConfig) -> Self {
        let grid = vec![vec![None; config.width.max(1)]; config.height.max(1)];
        Self {
            config,
            frame: None,
            grid,
            counts: BTreeMap::new(),
            frames: Vec::new(),
        }
    }

    /// Finished frames, oldest first.
    #[must_use]
    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    /// Take the finished frames.
    pub fn take_frames(&mut self) -> Vec<String> {
        std::mem::take(&mut self.frames)
    }

    fn column(&self, x: Fixed) -> usize {
        let width = self.frame.map_or(1, |f| f.map_width.max(1));
        scale(x, width, self.grid[0].len())
    }

    fn row(&self, y: Fixed) -> usize {
        let height = self.frame.map_or(1, |f| f.map_height.max(1));
        scale(y, height, self.grid.len())
    }

    fn compose(&self) -> String {
        let mut out = String::new();
        let (bold, reset) = if self.config.use_color {
            (colors::BOLD, colors::RESET)
        } else {
            ("", "")
        };

        if let Some(frame) = &self.frame {
            let _ = writeln!(
                out,
                "{bold}Tick {} | {:?} | gold {} | waves {}{reset}",
                frame.tick, frame.phase, frame.gold, frame.waves_launched
            );
        }

        let border = "-".repeat(self.grid[0].len());
        let _ = writeln!(out, "+{border}+");
        for row in &self.grid {
            out.push('|');
            for cell in row {
                match cell {
                    Some(tag) if self.config.use_color => {
                        let _ = write!(out, "{}{}{}", color(*tag), glyph(*tag), colors::RESET);
                    }
                    Some(tag) => out.push(glyph(*tag)),
                    None => out.push(' '),
                }
            }
            out.push_str("|\n");
        }
        let _ = writeln!(out, "+{border}+");

        if self.config.show_legend {
            out.push_str("# command center  B barracks  $ mine  = wall  : breach\n");
            out.push_str("W/A/G attackers  w/a/g defenders\n");
            let counts: Vec<String> = self
                .counts
                .iter()
                .filter(|(ch, _)| ch.is_ascii_alphabetic() && *ch != &'B' && *ch != &'x')
                .map(|(ch, n)| format!("{ch}:{n}"))
                .collect();
            if !counts.is_empty() {
                let _ = writeln!(out, "units {}", counts.join(" "));
            }
        }
        out
    }
}

fn scale(value: Fixed, extent: u32, cells: usize) -> usize {
    let value = value.to_num::<i64>().max(0) as u64;
    let index = value * cells as u64 / u64::from(extent);
    (index as usize).min(cells.saturating_sub(1))
}

impl RenderSink for AsciiCanvas {
    fn begin_frame(&mut self, frame: &FrameInfo) {
        self.frame = Some(*frame);
        for row in &mut self.grid {
            row.fill(None);
        }
        self.counts.clear();
    }

    fn structure(&mut self, view: &StructureView) {
        let (left, top) = (self.column(view.bounds.left()), self.row(view.bounds.top()));
        // Exclusive edges: step back one world unit so a footprint never
        // spills into the next character cell.
        let one = Fixed::from_num(1);
        let right = self.column(view.bounds.right() - one).max(left);
        let bottom = self.row(view.bounds.bottom() - one).max(top);
        for row in &mut self.grid[top..=bottom] {
            for cell in &mut row[left..=right] {
                *cell = Some(view.tag);
            }
        }
        *self.counts.entry(glyph(view.tag)).or_default() += 1;
    }

    fn unit(&mut self, view: &UnitView) {
        let (col, row) = (self.column(view.position.x), self.row(view.position.y));
        self.grid[row][col] = Some(view.tag);
        *self.counts.entry(glyph(view.tag)).or_default() += 1;
    }

    fn end_frame(&mut self) {
        let text = self.compose();
        self.frames.push(text);
    }
}

/// Render the current state of `game` as one ASCII frame.
#[must_use]
pub fn render_ascii(game: &Match, config: &AsciiConfig) -> String {
    let mut canvas = AsciiCanvas::new(config.clone());
    game.render(&mut canvas);
    canvas.take_frames().pop().unwrap_or_default()
}
