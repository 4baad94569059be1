//! Undo history.
//!
//! An entry is a structural copy of `(board, bar)` captured right before a
//! card selection mutates them. Level generation and match clears never
//! capture. Restoring replaces both wholesale and does not push anything,
//! so undo is not redoable.

use crate::domain::bar::MatchingBar;
use crate::domain::board::Board;
use super::world::WorldState;

/// Board and bar as they were before one selection.
#[derive(Clone, PartialEq, Debug)]
pub struct HistoryEntry {
    pub board: Board,
    pub bar: MatchingBar,
}

/// Capture the undoable part of the world.
pub fn capture(w: &WorldState) -> HistoryEntry {
    HistoryEntry {
        board: w.board.clone(),
        bar: w.bar.clone(),
    }
}

/// Put a captured entry back. Phase and message are left to the caller.
pub fn restore(w: &mut WorldState, entry: HistoryEntry) {
    w.board = entry.board;
    w.bar = entry.bar;
}

/// Push-only stack of entries, newest last.
#[derive(Clone, Debug, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        History { entries: vec![] }
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn pop(&mut self) -> Option<HistoryEntry> {
        self.entries.pop()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
