//! Level controller: the engine's request/response boundary.
//!
//! Every request runs to completion and returns a `Response`:
//!   - `status`: `Applied`, or `Ignored(reason)` when the request was a
//!     no-op (bad id, covered card, full bar, empty history ...)
//!   - `events`: what happened, in order
//!   - `snapshot`: full render data after the request
//!
//! Selection order:
//!   1. Guard: phase, card exists, clickable, free slot
//!   2. History capture
//!   3. Card moves from board to first empty slot
//!   4. Bar evaluation (clear every icon at match size)
//!   5. Deadlock check
//!   6. Win check (match happened and board is empty)
//!
//! Delays (level advance, restart prompt) are reported in the snapshot as
//! `pending`; the engine itself never waits.

use rand::rngs::StdRng;

use crate::config::{GameConfig, RuleConfig, TimingConfig};
use crate::domain::bar::MatchingBar;
use crate::domain::board::Board;
use crate::domain::card::{CardId, Icon};
use super::event::GameEvent;
use super::history::{self, History};
use super::level::{self, Level};
use super::rng::{self, IdGen};
use super::snapshot::Snapshot;
use super::world::{Phase, WorldState};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum IgnoreReason {
    UnknownCard,
    Blocked,
    BarFull,
    NothingToUndo,
    NotPlaying,
    NoPendingTransition,
    NotDeadlocked,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Status {
    Applied,
    Ignored(IgnoreReason),
}

#[derive(Clone, Debug)]
pub struct Response {
    pub status: Status,
    pub events: Vec<GameEvent>,
    pub snapshot: Snapshot,
}

impl Response {
    pub fn is_applied(&self) -> bool {
        self.status == Status::Applied
    }
}

pub struct Engine {
    rules: RuleConfig,
    timing: TimingConfig,
    palette: Vec<Icon>,
    seed: u64,
    rng: StdRng,
    ids: IdGen,
    world: WorldState,
    history: History,
}

// ── Construction ──

impl Engine {
    /// New session at Level 1. Seed from config, or a fresh one.
    pub fn new(config: &GameConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rng::fresh_seed);
        Engine::with_seed(config, seed)
    }

    pub fn with_seed(config: &GameConfig, seed: u64) -> Self {
        let mut engine = Engine {
            rules: config.rules,
            timing: config.timing,
            palette: config.palette.clone(),
            seed,
            rng: rng::seeded(seed),
            ids: IdGen::new(),
            world: WorldState::new(&config.rules),
            history: History::new(),
        };
        engine.start_level(Level::One);
        engine
    }
}

// ── Read access ──

impl Engine {
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn level(&self) -> Level {
        self.world.level
    }

    pub fn phase(&self) -> Phase {
        self.world.phase
    }

    pub fn board(&self) -> &Board {
        &self.world.board
    }

    pub fn bar(&self) -> &MatchingBar {
        &self.world.bar
    }

    pub fn message(&self) -> &str {
        &self.world.message
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.world, &self.timing, self.can_undo())
    }

    fn can_undo(&self) -> bool {
        !self.history.is_empty()
            && matches!(self.world.phase, Phase::Playing | Phase::Deadlock { .. })
    }

    fn respond(&self, status: Status, events: Vec<GameEvent>) -> Response {
        Response {
            status,
            events,
            snapshot: self.snapshot(),
        }
    }

    fn ignore(&self, reason: IgnoreReason) -> Response {
        log::debug!("request ignored: {:?}", reason);
        self.respond(Status::Ignored(reason), vec![])
    }
}

// ── Requests ──

impl Engine {
    /// Generate `level` from scratch: new board, empty bar, empty history.
    pub fn start_level(&mut self, level: Level) -> Response {
        let board = level::generate(level, &self.palette, &mut self.rng, &mut self.ids);
        let count = board.len();

        self.history.clear();
        self.world.level = level;
        self.world.board = board;
        self.world.bar.reset();
        self.world.phase = Phase::Playing;
        let msg = match level {
            Level::One => format!(
                "Click a tile to move it into slot. Match {} to clear.",
                self.rules.match_size
            ),
            _ => format!(
                "Level {}: Match {} to clear {} tiles!",
                level.number(),
                self.rules.match_size,
                count
            ),
        };
        self.world.set_message(&msg);

        log::info!("level {} started (seed {})", level.number(), self.seed);
        self.respond(Status::Applied, vec![GameEvent::LevelStarted { level }])
    }

    /// Move a clickable card into the bar and resolve the consequences.
    pub fn select_card(&mut self, id: CardId) -> Response {
        if !self.world.is_playing() {
            return self.ignore(IgnoreReason::NotPlaying);
        }
        if self.world.board.get(id).is_none() {
            return self.ignore(IgnoreReason::UnknownCard);
        }
        if !self.world.board.is_clickable(id) {
            return self.ignore(IgnoreReason::Blocked);
        }
        if self.world.bar.is_full() {
            return self.ignore(IgnoreReason::BarFull);
        }

        let entry = history::capture(&self.world);
        let Some(card) = self.world.board.take(id) else {
            return self.ignore(IgnoreReason::UnknownCard);
        };
        let Some(slot) = self.world.bar.insert(card.icon.clone()) else {
            history::restore(&mut self.world, entry);
            return self.ignore(IgnoreReason::BarFull);
        };
        self.history.push(entry);

        log::debug!("picked {} {} into slot {}", card.id, card.icon, slot);
        let mut events = vec![GameEvent::CardPicked { id: card.id, icon: card.icon, slot }];

        let matched = self.world.bar.evaluate();
        for icon in &matched {
            log::debug!("matched {}", icon);
            events.push(GameEvent::Matched { icon: icon.clone() });
        }
        if !matched.is_empty() {
            let msg = format!("Matched {}!", self.rules.match_size);
            self.world.set_message(&msg);
        }

        self.resolve_outcome(!matched.is_empty(), &mut events);
        self.respond(Status::Applied, events)
    }

    /// Deadlock first, then the win condition.
    fn resolve_outcome(&mut self, matched: bool, events: &mut Vec<GameEvent>) {
        if self.world.bar.is_deadlocked() {
            log::warn!("deadlock on level {}", self.world.level.number());
            self.world.phase = Phase::Deadlock { declined: false };
            self.world.set_message("Game over! The bar is full with no match. Restart?");
            events.push(GameEvent::Deadlocked);
            return;
        }

        if !matched || !self.world.board.is_empty() {
            return;
        }

        let level = self.world.level;
        log::info!("level {} cleared", level.number());
        events.push(GameEvent::LevelCleared { level });
        match level.next() {
            Some(next) => {
                self.world.phase = Phase::LevelComplete { next };
                let msg = format!(
                    "Level {} Completed! Loading Level {}...",
                    level.number(),
                    next.number()
                );
                self.world.set_message(&msg);
            }
            None => {
                self.world.phase = Phase::GameComplete;
                let msg = format!("🎉 Congratulations! You cleared Level {}!", level.number());
                self.world.set_message(&msg);
                events.push(GameEvent::GameCleared);
            }
        }
    }

    /// Restore the state before the latest selection.
    pub fn undo(&mut self) -> Response {
        if matches!(self.world.phase, Phase::LevelComplete { .. } | Phase::GameComplete) {
            return self.ignore(IgnoreReason::NotPlaying);
        }
        let Some(entry) = self.history.pop() else {
            return self.ignore(IgnoreReason::NothingToUndo);
        };

        history::restore(&mut self.world, entry);
        self.world.phase = Phase::Playing;
        self.world.set_message("Move undone.");
        self.respond(Status::Applied, vec![GameEvent::Undone])
    }

    /// Answer the deadlock prompt. `true` restarts at Level 1; `false`
    /// leaves everything as it is.
    pub fn confirm_restart(&mut self, restart: bool) -> Response {
        if !matches!(self.world.phase, Phase::Deadlock { .. }) {
            return self.ignore(IgnoreReason::NotDeadlocked);
        }
        if restart {
            return self.start_level(Level::One);
        }
        self.world.phase = Phase::Deadlock { declined: true };
        self.respond(Status::Applied, vec![])
    }

    /// Carry out a scheduled level transition.
    pub fn advance(&mut self) -> Response {
        match self.world.phase {
            Phase::LevelComplete { next } => self.start_level(next),
            _ => self.ignore(IgnoreReason::NoPendingTransition),
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::card::Card;
    use crate::sim::snapshot::{Outcome, PendingAction};

    fn engine() -> Engine {
        Engine::with_seed(&GameConfig::default(), 1234)
    }

    /// Replace the live board with a single flat row of icons.
    fn with_row(engine: &mut Engine, symbols: &[&str]) -> Vec<CardId> {
        let cards: Vec<Card> = symbols
            .iter()
            .enumerate()
            .map(|(i, s)| Card::new(CardId(1000 + i as u32), Icon::new(*s), i as f64, 0.0, 0))
            .collect();
        let ids = cards.iter().map(|c| c.id).collect();
        engine.world.board = Board::from_cards(cards);
        ids
    }

    #[test]
    fn new_engine_starts_level_one() {
        let e = engine();
        assert_eq!(e.level(), Level::One);
        assert_eq!(e.board().len(), 18);
        assert!(e.bar().is_empty());
        assert_eq!(e.history_len(), 0);
        assert_eq!(e.message(), "Click a tile to move it into slot. Match 3 to clear.");
    }

    #[test]
    fn covered_card_is_ignored() {
        let mut e = engine();
        let covered = e.board().cards().iter().find(|c| c.x == 4.0 && c.y == 3.0).unwrap().id;
        let r = e.select_card(covered);
        assert_eq!(r.status, Status::Ignored(IgnoreReason::Blocked));
        assert_eq!(e.board().len(), 18);
        assert_eq!(e.history_len(), 0);
    }

    #[test]
    fn unknown_card_is_ignored() {
        let mut e = engine();
        let before = e.snapshot();
        let r = e.select_card(CardId(9999));
        assert_eq!(r.status, Status::Ignored(IgnoreReason::UnknownCard));
        assert_eq!(r.snapshot, before);
    }

    #[test]
    fn triple_clears_with_message() {
        let mut e = engine();
        let ids = with_row(&mut e, &["🍎", "🍎", "🍎", "🍇"]);
        e.select_card(ids[0]);
        e.select_card(ids[1]);
        let r = e.select_card(ids[2]);
        assert!(r.is_applied());
        assert!(r.events.contains(&GameEvent::Matched { icon: Icon::new("🍎") }));
        assert!(r.snapshot.slots.iter().all(Option::is_none));
        assert_eq!(r.snapshot.status_message, "Matched 3!");
        assert_eq!(r.snapshot.outcome, Outcome::None);
    }

    #[test]
    fn full_bar_without_triple_deadlocks_once() {
        let mut e = engine();
        let ids = with_row(&mut e, &["🍎", "🍇", "🍉", "🍎", "🍇", "🍉", "🍎", "🥝"]);
        let mut deadlocks = 0;
        for id in &ids[..6] {
            let r = e.select_card(*id);
            deadlocks += r.events.iter().filter(|ev| **ev == GameEvent::Deadlocked).count();
        }
        // Seventh pick completes the apples: a match, not a deadlock.
        let r = e.select_card(ids[6]);
        assert!(r.events.contains(&GameEvent::Matched { icon: Icon::new("🍎") }));
        assert_eq!(deadlocks, 0);

        let ids = with_row(&mut e, &["🥝", "🍒", "🍐", "🥥", "🍌"]);
        for id in &ids {
            let r = e.select_card(*id);
            deadlocks += r.events.iter().filter(|ev| **ev == GameEvent::Deadlocked).count();
        }
        assert_eq!(deadlocks, 1);
        assert_eq!(e.phase(), Phase::Deadlock { declined: false });
        let snap = e.snapshot();
        assert_eq!(snap.outcome, Outcome::Deadlock);
        assert_eq!(snap.pending.map(|p| p.action), Some(PendingAction::PromptRestart));
    }

    #[test]
    fn selections_after_deadlock_are_ignored() {
        let mut e = engine();
        let ids = with_row(&mut e, &["🍎", "🍇", "🍉", "🍎", "🍇", "🍉", "🥝", "🍒"]);
        for id in &ids[..7] {
            e.select_card(*id);
        }
        assert!(matches!(e.phase(), Phase::Deadlock { .. }));
        let r = e.select_card(ids[7]);
        assert_eq!(r.status, Status::Ignored(IgnoreReason::NotPlaying));
        assert!(r.events.is_empty());
    }

    #[test]
    fn declining_restart_keeps_state_and_silences_prompt() {
        let mut e = engine();
        let ids = with_row(&mut e, &["🍎", "🍇", "🍉", "🍎", "🍇", "🍉", "🥝"]);
        for id in &ids {
            e.select_card(*id);
        }
        let bar_before = e.bar().clone();
        let r = e.confirm_restart(false);
        assert!(r.is_applied());
        assert_eq!(e.bar(), &bar_before);
        assert_eq!(r.snapshot.outcome, Outcome::Deadlock);
        assert_eq!(r.snapshot.pending, None);
    }

    #[test]
    fn accepting_restart_goes_back_to_level_one() {
        let mut e = engine();
        let ids = with_row(&mut e, &["🍎", "🍇", "🍉", "🍎", "🍇", "🍉", "🥝"]);
        for id in &ids {
            e.select_card(*id);
        }
        let r = e.confirm_restart(true);
        assert!(r.events.contains(&GameEvent::LevelStarted { level: Level::One }));
        assert_eq!(e.phase(), Phase::Playing);
        assert_eq!(e.board().len(), 18);
        assert!(e.bar().is_empty());
        assert_eq!(e.history_len(), 0);
    }

    #[test]
    fn confirm_restart_outside_deadlock_is_ignored() {
        let mut e = engine();
        let r = e.confirm_restart(true);
        assert_eq!(r.status, Status::Ignored(IgnoreReason::NotDeadlocked));
    }

    #[test]
    fn undo_after_deadlock_resumes_play() {
        let mut e = engine();
        let ids = with_row(&mut e, &["🍎", "🍇", "🍉", "🍎", "🍇", "🍉", "🥝"]);
        for id in &ids {
            e.select_card(*id);
        }
        let r = e.undo();
        assert!(r.is_applied());
        assert_eq!(e.phase(), Phase::Playing);
        assert_eq!(e.bar().occupied(), 6);
        assert!(e.board().get(ids[6]).is_some());
    }

    #[test]
    fn undo_is_inverse_of_select() {
        let mut e = engine();
        let board_before = e.board().clone();
        let bar_before = e.bar().clone();
        let id = e.board().clickable_ids()[0];
        e.select_card(id);
        assert_ne!(e.board(), &board_before);
        let r = e.undo();
        assert_eq!(r.status, Status::Applied);
        assert_eq!(e.board(), &board_before);
        assert_eq!(e.bar(), &bar_before);
        assert_eq!(e.history_len(), 0);
    }

    #[test]
    fn undo_with_empty_history_is_ignored() {
        let mut e = engine();
        let msg = e.message().to_string();
        let r = e.undo();
        assert_eq!(r.status, Status::Ignored(IgnoreReason::NothingToUndo));
        assert_eq!(r.snapshot.status_message, msg);
    }

    #[test]
    fn clearing_level_one_schedules_level_two() {
        let mut e = engine();
        let ids = with_row(&mut e, &["🍎", "🍎", "🍎"]);
        for id in &ids {
            e.select_card(*id);
        }
        assert_eq!(e.phase(), Phase::LevelComplete { next: Level::Two });
        let snap = e.snapshot();
        assert_eq!(snap.outcome, Outcome::LevelComplete);
        assert_eq!(snap.status_message, "Level 1 Completed! Loading Level 2...");
        assert_eq!(snap.pending.map(|p| p.action), Some(PendingAction::AdvanceLevel));
        assert!(!snap.can_undo);
        assert_eq!(e.undo().status, Status::Ignored(IgnoreReason::NotPlaying));

        let r = e.advance();
        assert!(r.events.contains(&GameEvent::LevelStarted { level: Level::Two }));
        assert_eq!(e.level(), Level::Two);
        assert_eq!(e.board().len(), 240);
        assert_eq!(e.history_len(), 0);
        assert_eq!(e.message(), "Level 2: Match 3 to clear 240 tiles!");
    }

    #[test]
    fn clearing_level_two_completes_the_game() {
        let mut e = engine();
        e.start_level(Level::Two);
        let ids = with_row(&mut e, &["🍇", "🍇", "🍇"]);
        let mut last = None;
        for id in &ids {
            last = Some(e.select_card(*id));
        }
        let r = last.unwrap();
        assert!(r.events.contains(&GameEvent::GameCleared));
        assert_eq!(e.phase(), Phase::GameComplete);
        assert_eq!(r.snapshot.outcome, Outcome::GameComplete);
        assert_eq!(r.snapshot.pending, None);
        assert_eq!(e.advance().status, Status::Ignored(IgnoreReason::NoPendingTransition));
    }

    #[test]
    fn advance_while_playing_is_ignored() {
        let mut e = engine();
        assert_eq!(e.advance().status, Status::Ignored(IgnoreReason::NoPendingTransition));
        assert_eq!(e.level(), Level::One);
    }

    #[test]
    fn ids_stay_unique_across_levels() {
        let mut e = engine();
        let first: Vec<CardId> = e.board().cards().iter().map(|c| c.id).collect();
        e.start_level(Level::One);
        assert!(e.board().cards().iter().all(|c| !first.contains(&c.id)));
    }
}
