//! Events emitted while handling a request.
//! The presentation layer consumes these for sound and flashes.

use crate::domain::card::{CardId, Icon};
use super::level::Level;

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    LevelStarted { level: Level },
    CardPicked { id: CardId, icon: Icon, slot: usize },
    Matched { icon: Icon },
    LevelCleared { level: Level },
    GameCleared,
    Deadlocked,
    Undone,
}
