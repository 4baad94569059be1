//! WorldState: the live state of one game session.
//!
//! ## Ownership
//!
//!   - `board`: active cards of the current level.
//!   - `bar`: matching-bar slots.
//!
//! Both are replaced wholesale on level start and on undo. Everything else
//! (`phase`, `message`) is derived from the last request and is not part of
//! the undo history.

use crate::config::RuleConfig;
use crate::domain::bar::MatchingBar;
use crate::domain::board::Board;
use super::level::Level;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    /// Accepting card selections.
    Playing,
    /// Board cleared; waiting for `advance()` to load `next`.
    LevelComplete { next: Level },
    /// Last level cleared. Terminal.
    GameComplete,
    /// Bar full with no match; waiting for a restart decision.
    /// `declined` once the player has said no.
    Deadlock { declined: bool },
}

#[derive(Clone, Debug)]
pub struct WorldState {
    pub level: Level,
    pub board: Board,
    pub bar: MatchingBar,
    pub phase: Phase,
    pub message: String,
}

impl WorldState {
    pub fn new(rules: &RuleConfig) -> Self {
        WorldState {
            level: Level::One,
            board: Board::new(),
            bar: MatchingBar::new(rules.bar_capacity, rules.match_size),
            phase: Phase::Playing,
            message: String::new(),
        }
    }

    pub fn set_message(&mut self, msg: &str) {
        self.message = msg.to_string();
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }
}
