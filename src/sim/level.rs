//! Level definitions and the board generator.
//!
//! ## Level 1 (offset pair)
//!   3 icons × 6 copies = 18 cards on 18 fixed positions:
//!   a 3×3 grid at layer 1, then the same grid shifted by half a unit
//!   at layer 2. Only the deck is shuffled; positions keep their order.
//!
//! ## Level 2 (pyramid)
//!   16 icons × 15 copies = 240 cards over a 7×7 grid listed twice per cell
//!   (98 slots). Card `i` takes slot `i mod 98`, so cells hold deep stacks.
//!   Layer falls off with distance from the grid center:
//!     `layer = max(0, floor((1 - d / center) * 25) + bonus)`, bonus ∈ 0..=2
//!   Center cells carry the highest layers; corners clamp to 0.

use rand::Rng;

use crate::domain::board::Board;
use crate::domain::card::{Card, Icon};
use super::rng::{self, IdGen};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Level {
    One,
    Two,
}

impl Level {
    pub fn number(self) -> u8 {
        match self {
            Level::One => 1,
            Level::Two => 2,
        }
    }

    pub fn from_number(n: u8) -> Option<Level> {
        match n {
            1 => Some(Level::One),
            2 => Some(Level::Two),
            _ => None,
        }
    }

    /// The level that follows this one; `None` after the last.
    pub fn next(self) -> Option<Level> {
        match self {
            Level::One => Some(Level::Two),
            Level::Two => None,
        }
    }

    pub fn def(self) -> LevelDef {
        match self {
            Level::One => LevelDef {
                icon_kinds: 3,
                copies: 6,
                layout: Layout::OffsetPair,
            },
            Level::Two => LevelDef {
                icon_kinds: 16,
                copies: 15,
                layout: Layout::Pyramid {
                    grid: 7,
                    depth: 2,
                    peak: 25.0,
                    bonus_max: 2,
                    offset: 1.5,
                },
            },
        }
    }
}

/// Generation parameters for one level.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct LevelDef {
    pub icon_kinds: usize,
    pub copies: usize,
    pub layout: Layout,
}

impl LevelDef {
    pub fn card_count(&self) -> usize {
        self.icon_kinds * self.copies
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Layout {
    OffsetPair,
    Pyramid {
        /// Grid side length.
        grid: usize,
        /// Position-list entries per cell.
        depth: usize,
        /// Layer at distance 0, before the bonus.
        peak: f64,
        bonus_max: u32,
        /// Added to both coordinates.
        offset: f64,
    },
}

// ══════════════════════════════════════════════════════════════
// Generator
// ══════════════════════════════════════════════════════════════

/// Build the starting board for `level`.
///
/// `palette` must hold at least `def.icon_kinds` distinct icons; the config
/// loader enforces this for both built-in levels.
pub fn generate<R: Rng + ?Sized>(level: Level, palette: &[Icon], rng: &mut R, ids: &mut IdGen) -> Board {
    let def = level.def();
    debug_assert!(palette.len() >= def.icon_kinds, "palette too small for {:?}", level);

    let kinds = rng::pick_distinct(palette, def.icon_kinds.min(palette.len()), rng);
    let mut deck: Vec<Icon> = Vec::with_capacity(kinds.len() * def.copies);
    for icon in &kinds {
        for _ in 0..def.copies {
            deck.push(icon.clone());
        }
    }
    rng::shuffle(&mut deck, rng);

    let cards = match def.layout {
        Layout::OffsetPair => place_offset_pair(deck, ids),
        Layout::Pyramid { grid, depth, peak, bonus_max, offset } => {
            place_pyramid(deck, grid, depth, peak, bonus_max, offset, rng, ids)
        }
    };

    log::info!("generated level {} with {} cards", level.number(), cards.len());
    Board::from_cards(cards)
}

/// The 18 fixed level-1 positions: `(x, y, layer)`, layer 1 first.
pub fn offset_pair_positions() -> Vec<(f64, f64, u32)> {
    let mut positions = Vec::with_capacity(18);
    for (shift, layer) in [(0.0, 1), (0.5, 2)] {
        for row in 0..3 {
            for col in 0..3 {
                positions.push((3.0 + col as f64 + shift, 2.0 + row as f64 + shift, layer));
            }
        }
    }
    positions
}

fn place_offset_pair(deck: Vec<Icon>, ids: &mut IdGen) -> Vec<Card> {
    deck.into_iter()
        .zip(offset_pair_positions())
        .map(|(icon, (x, y, layer))| Card::new(ids.next_id(), icon, x, y, layer))
        .collect()
}

/// Layer for grid cell `(gx, gy)` before clamping, without the bonus.
pub fn pyramid_base_layer(gx: usize, gy: usize, grid: usize, peak: f64) -> i64 {
    let center = (grid as f64 - 1.0) / 2.0;
    let dx = gx as f64 - center;
    let dy = gy as f64 - center;
    let distance = (dx * dx + dy * dy).sqrt();
    ((1.0 - distance / center) * peak).floor() as i64
}

#[allow(clippy::too_many_arguments)]
fn place_pyramid<R: Rng + ?Sized>(
    deck: Vec<Icon>,
    grid: usize,
    depth: usize,
    peak: f64,
    bonus_max: u32,
    offset: f64,
    rng: &mut R,
    ids: &mut IdGen,
) -> Vec<Card> {
    let mut positions: Vec<(usize, usize)> = Vec::with_capacity(grid * grid * depth);
    for gx in 0..grid {
        for gy in 0..grid {
            for _ in 0..depth {
                positions.push((gx, gy));
            }
        }
    }

    deck.into_iter()
        .enumerate()
        .map(|(i, icon)| {
            let (gx, gy) = positions[i % positions.len()];
            let base = pyramid_base_layer(gx, gy, grid, peak);
            let layer = (base + rng::bonus(rng, bonus_max) as i64).max(0) as u32;
            Card::new(ids.next_id(), icon, gx as f64 + offset, gy as f64 + offset, layer)
        })
        .collect()
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
