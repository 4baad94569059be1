//! Card, icon and id types.
//!
//! Cards are plain values: the board owns them, the history clones them,
//! and snapshots copy them out. Nothing holds a reference into the board.

use std::fmt;

/// Opaque card token. Unique for the lifetime of an engine.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct CardId(pub u32);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A symbol from the icon palette (usually a single emoji).
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Icon(String);

impl Icon {
    pub fn new(symbol: impl Into<String>) -> Self {
        Icon(symbol.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Icon {
    fn from(s: &str) -> Self {
        Icon::new(s)
    }
}

/// Grid cell a card occupies for occlusion purposes.
pub type Cell = (i64, i64);

#[derive(Clone, PartialEq, Debug)]
pub struct Card {
    pub id: CardId,
    pub icon: Icon,
    /// Column; may sit on a half unit.
    pub x: f64,
    /// Row; may sit on a half unit.
    pub y: f64,
    /// Stacking order. Higher sits above lower at the same cell.
    pub layer: u32,
}

impl Card {
    pub fn new(id: CardId, icon: Icon, x: f64, y: f64, layer: u32) -> Self {
        Card { id, icon, x, y, layer }
    }

    /// Rounded `(x, y)`. Coordinates are never negative, so `round()`
    /// (half away from zero) behaves as round-half-up here.
    #[inline]
    pub fn cell(&self) -> Cell {
        (self.x.round() as i64, self.y.round() as i64)
    }
}
