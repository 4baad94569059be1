//! Occlusion: which cards can be picked.
//!
//! A card is blocked iff another card sits on the same rounded cell with a
//! strictly greater layer. Two query paths:
//!   - `is_clickable()` scans the whole card set (the definition).
//!   - `CellIndex` precomputes cell → max layer in one pass, for when the
//!     whole board is being classified at once (snapshots of 240 cards).

use std::collections::HashMap;

use super::card::{Card, Cell};

/// Direct definition. O(n) per card.
pub fn is_clickable(card: &Card, cards: &[Card]) -> bool {
    let cell = card.cell();
    !cards.iter().any(|other| {
        other.id != card.id && other.layer > card.layer && other.cell() == cell
    })
}

/// Cell → highest layer present at that cell.
#[derive(Clone, Debug, Default)]
pub struct CellIndex {
    max_layer: HashMap<Cell, u32>,
}

impl CellIndex {
    pub fn build(cards: &[Card]) -> Self {
        let mut max_layer: HashMap<Cell, u32> = HashMap::with_capacity(cards.len());
        for card in cards {
            max_layer
                .entry(card.cell())
                .and_modify(|top| *top = (*top).max(card.layer))
                .or_insert(card.layer);
        }
        CellIndex { max_layer }
    }

    pub fn max_layer(&self, cell: Cell) -> Option<u32> {
        self.max_layer.get(&cell).copied()
    }

    /// Equal-layer neighbours do not block, so `>=` against the max is enough.
    #[inline]
    pub fn is_clickable(&self, card: &Card) -> bool {
        self.max_layer(card.cell()).map_or(true, |top| card.layer >= top)
    }

    /// Number of distinct occupied cells.
    pub fn cell_count(&self) -> usize {
        self.max_layer.len()
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
