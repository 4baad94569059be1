//! Read-only render data handed to the presentation layer.
//!
//! A `Snapshot` is a full copy: the renderer can keep it as long as it likes
//! and never touches engine state. Cards come sorted by layer (stable), so
//! drawing them in order paints higher layers over lower ones.

use std::time::Duration;

use crate::config::TimingConfig;
use crate::domain::card::{CardId, Icon};
use super::level::Level;
use super::world::{Phase, WorldState};

#[derive(Clone, PartialEq, Debug)]
pub struct CardView {
    pub id: CardId,
    pub icon: Icon,
    pub x: f64,
    pub y: f64,
    pub layer: u32,
    pub clickable: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    None,
    LevelComplete,
    GameComplete,
    Deadlock,
}

/// What the collaborator should do after `delay`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PendingAction {
    /// Call `Engine::advance()`.
    AdvanceLevel,
    /// Ask the player whether to restart, then call `Engine::confirm_restart()`.
    PromptRestart,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Pending {
    pub delay: Duration,
    pub action: PendingAction,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Snapshot {
    pub level: Level,
    pub cards: Vec<CardView>,
    pub slots: Vec<Option<Icon>>,
    pub status_message: String,
    pub outcome: Outcome,
    pub pending: Option<Pending>,
    pub can_undo: bool,
}

impl Snapshot {
    pub fn capture(w: &WorldState, timing: &TimingConfig, can_undo: bool) -> Self {
        let index = w.board.cell_index();
        let mut cards: Vec<CardView> = w
            .board
            .cards()
            .iter()
            .map(|c| CardView {
                id: c.id,
                icon: c.icon.clone(),
                x: c.x,
                y: c.y,
                layer: c.layer,
                clickable: index.is_clickable(c),
            })
            .collect();
        cards.sort_by_key(|c| c.layer);

        let (outcome, pending) = match w.phase {
            Phase::Playing => (Outcome::None, None),
            Phase::LevelComplete { .. } => (
                Outcome::LevelComplete,
                Some(Pending {
                    delay: timing.level_advance_delay,
                    action: PendingAction::AdvanceLevel,
                }),
            ),
            Phase::GameComplete => (Outcome::GameComplete, None),
            Phase::Deadlock { declined: false } => (
                Outcome::Deadlock,
                Some(Pending {
                    delay: timing.deadlock_prompt_delay,
                    action: PendingAction::PromptRestart,
                }),
            ),
            Phase::Deadlock { declined: true } => (Outcome::Deadlock, None),
        };

        Snapshot {
            level: w.level,
            cards,
            slots: w.bar.slots().to_vec(),
            status_message: w.message.clone(),
            outcome,
            pending,
            can_undo,
        }
    }

    pub fn card(&self, id: CardId) -> Option<&CardView> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn clickable(&self) -> impl Iterator<Item = &CardView> {
        self.cards.iter().filter(|c| c.clickable)
    }
}
