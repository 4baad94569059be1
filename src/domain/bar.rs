//! Matching bar: fixed-capacity slot array.
//!
//! Each slot is empty or holds one icon. `insert()` fills the first empty
//! slot; `evaluate()` clears every icon that reached the match size.
//! Deadlock = every slot occupied and nothing left to clear.

use super::card::Icon;

pub const DEFAULT_CAPACITY: usize = 7;
pub const DEFAULT_MATCH_SIZE: usize = 3;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MatchingBar {
    slots: Vec<Option<Icon>>,
    match_size: usize,
}

impl Default for MatchingBar {
    fn default() -> Self {
        MatchingBar::new(DEFAULT_CAPACITY, DEFAULT_MATCH_SIZE)
    }
}

impl MatchingBar {
    pub fn new(capacity: usize, match_size: usize) -> Self {
        MatchingBar {
            slots: vec![None; capacity],
            match_size,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn match_size(&self) -> usize {
        self.match_size
    }

    pub fn slots(&self) -> &[Option<Icon>] {
        &self.slots
    }

    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Empty every slot.
    pub fn reset(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }

    /// Put `icon` in the first empty slot. `None` when full (no-op).
    pub fn insert(&mut self, icon: Icon) -> Option<usize> {
        let idx = self.slots.iter().position(Option::is_none)?;
        self.slots[idx] = Some(icon);
        Some(idx)
    }

    /// Occupied-slot count per icon, in first-occurrence order.
    pub fn counts(&self) -> Vec<(Icon, usize)> {
        let mut counts: Vec<(Icon, usize)> = Vec::new();
        for icon in self.slots.iter().flatten() {
            match counts.iter_mut().find(|(i, _)| i == icon) {
                Some((_, n)) => *n += 1,
                None => counts.push((icon.clone(), 1)),
            }
        }
        counts
    }

    /// Clear all slots of every icon at or above the match size.
    /// Returns the cleared icons; empty when nothing matched.
    pub fn evaluate(&mut self) -> Vec<Icon> {
        let matched: Vec<Icon> = self
            .counts()
            .into_iter()
            .filter(|(_, n)| *n >= self.match_size)
            .map(|(icon, _)| icon)
            .collect();

        for slot in &mut self.slots {
            if slot.as_ref().map_or(false, |icon| matched.contains(icon)) {
                *slot = None;
            }
        }
        matched
    }

    pub fn has_pending_match(&self) -> bool {
        self.counts().iter().any(|(_, n)| *n >= self.match_size)
    }

    pub fn is_deadlocked(&self) -> bool {
        self.is_full() && !self.has_pending_match()
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
