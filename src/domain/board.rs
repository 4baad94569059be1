//! Board: the active card set of the current level.
//!
//! Cards keep generation order. Removal preserves the order of the rest,
//! which keeps render order (stable sort by layer) predictable.

use super::card::{Card, CardId, Cell};
use super::occlusion::{self, CellIndex};

#[derive(Clone, PartialEq, Debug, Default)]
pub struct Board {
    cards: Vec<Card>,
}

impl Board {
    pub fn new() -> Self {
        Board { cards: vec![] }
    }

    /// Ids must be unique; generators guarantee this.
    pub fn from_cards(cards: Vec<Card>) -> Self {
        debug_assert!(
            {
                let mut ids: Vec<CardId> = cards.iter().map(|c| c.id).collect();
                ids.sort();
                ids.windows(2).all(|w| w[0] != w[1])
            },
            "duplicate card id on board"
        );
        Board { cards }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    /// Remove a card from the active set and hand it back.
    pub fn take(&mut self, id: CardId) -> Option<Card> {
        let idx = self.cards.iter().position(|c| c.id == id)?;
        Some(self.cards.remove(idx))
    }

    pub fn is_clickable(&self, id: CardId) -> bool {
        self.get(id)
            .map_or(false, |card| occlusion::is_clickable(card, &self.cards))
    }

    pub fn cell_index(&self) -> CellIndex {
        CellIndex::build(&self.cards)
    }

    pub fn clickable_ids(&self) -> Vec<CardId> {
        let index = self.cell_index();
        self.cards
            .iter()
            .filter(|c| index.is_clickable(c))
            .map(|c| c.id)
            .collect()
    }

    /// The pickable card on top of `cell`, if any.
    /// Among equal top layers the later-generated card wins (it is drawn last).
    pub fn top_at(&self, cell: Cell) -> Option<&Card> {
        self.cards
            .iter()
            .filter(|c| c.cell() == cell)
            .fold(None, |best: Option<&Card>, c| match best {
                Some(b) if b.layer > c.layer => Some(b),
                _ => Some(c),
            })
    }
}
