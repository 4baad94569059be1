use std::collections::HashMap;

use triplestack::sim::world::Phase;
use triplestack::{
    CardId, Engine, GameConfig, GameEvent, IgnoreReason, Level, Outcome, PendingAction, Status,
};

fn engine(seed: u64) -> Engine {
    Engine::with_seed(&GameConfig::default(), seed)
}

fn bar_counts(e: &Engine) -> HashMap<String, usize> {
    e.bar()
        .counts()
        .into_iter()
        .map(|(icon, n)| (icon.as_str().to_string(), n))
        .collect()
}

/// Prefer the clickable card whose icon is already most frequent in the bar.
fn greedy_pick(e: &Engine) -> Option<CardId> {
    let counts = bar_counts(e);
    e.board()
        .clickable_ids()
        .into_iter()
        .max_by_key(|id| {
            let icon = e.board().get(*id).map(|c| c.icon.as_str().to_string());
            icon.and_then(|i| counts.get(&i).copied()).unwrap_or(0)
        })
}

/// Prefer a clickable card whose icon would not complete a triple.
fn spoiler_pick(e: &Engine) -> Option<CardId> {
    let counts = bar_counts(e);
    let ids = e.board().clickable_ids();
    ids.iter()
        .copied()
        .min_by_key(|id| {
            let icon = e.board().get(*id).map(|c| c.icon.as_str().to_string());
            icon.and_then(|i| counts.get(&i).copied()).unwrap_or(0)
        })
}

/// Play Level 1 to completion. Three icons never fill seven slots without
/// a triple, so any picking order clears the board.
fn clear_level_one(e: &mut Engine) -> Vec<GameEvent> {
    let mut events = vec![];
    while let Some(id) = greedy_pick(e) {
        let r = e.select_card(id);
        assert!(r.is_applied(), "pick {id} ignored: {:?}", r.status);
        events.extend(r.events);
        if e.phase() != Phase::Playing {
            break;
        }
    }
    events
}

#[test]
fn level_one_clears_and_advances_to_level_two() {
    let config = GameConfig::default();
    let mut e = Engine::with_seed(&config, 20261019);
    let events = clear_level_one(&mut e);

    assert!(e.board().is_empty());
    assert!(e.bar().is_empty());
    assert_eq!(events.iter().filter(|ev| matches!(ev, GameEvent::Matched { .. })).count(), 6);
    assert!(events.contains(&GameEvent::LevelCleared { level: Level::One }));
    assert!(!events.contains(&GameEvent::Deadlocked));

    let snap = e.snapshot();
    assert_eq!(snap.outcome, Outcome::LevelComplete);
    let pending = snap.pending.expect("level advance should be scheduled");
    assert_eq!(pending.action, PendingAction::AdvanceLevel);
    assert_eq!(pending.delay, config.timing.level_advance_delay);

    // Nothing is pickable while the transition is pending.
    assert_eq!(e.select_card(CardId(1)).status, Status::Ignored(IgnoreReason::NotPlaying));

    let r = e.advance();
    assert!(r.is_applied());
    assert_eq!(r.snapshot.level, Level::Two);
    assert_eq!(r.snapshot.cards.len(), 240);
    assert!(r.snapshot.clickable().count() > 0);
    assert_eq!(r.snapshot.outcome, Outcome::None);
    assert!(!r.snapshot.can_undo);
}

#[test]
fn every_level_one_seed_is_winnable() {
    for seed in 0..25 {
        let mut e = engine(seed);
        clear_level_one(&mut e);
        assert_eq!(e.phase(), Phase::LevelComplete { next: Level::Two }, "seed {seed}");
    }
}

#[test]
fn undo_restores_board_and_bar_exactly() {
    let mut e = engine(3);
    for _ in 0..4 {
        let id = greedy_pick(&e).unwrap();
        e.select_card(id);
    }
    let before = e.snapshot();
    let id = greedy_pick(&e).unwrap();
    e.select_card(id);
    let r = e.undo();

    assert_eq!(r.events, vec![GameEvent::Undone]);
    assert_eq!(r.snapshot.cards, before.cards);
    assert_eq!(r.snapshot.slots, before.slots);
    assert_eq!(r.snapshot.status_message, "Move undone.");
    assert_eq!(e.history_len(), 4);
}

#[test]
fn undo_unwinds_to_the_level_start() {
    let mut e = engine(11);
    let start = e.snapshot();
    let mut picks = 0;
    for _ in 0..5 {
        let id = greedy_pick(&e).unwrap();
        if e.select_card(id).is_applied() {
            picks += 1;
        }
    }
    for _ in 0..picks {
        assert!(e.undo().is_applied());
    }
    assert_eq!(e.undo().status, Status::Ignored(IgnoreReason::NothingToUndo));
    assert_eq!(e.snapshot().cards, start.cards);
    assert_eq!(e.snapshot().slots, start.slots);
}

#[test]
fn deadlock_fires_once_and_blocks_further_picks() {
    let mut reached = 0;
    for seed in 0..10 {
        let mut e = engine(seed);
        clear_level_one(&mut e);
        e.advance();

        let mut deadlocks = 0;
        for _ in 0..300 {
            let Some(id) = spoiler_pick(&e) else { break };
            let r = e.select_card(id);
            deadlocks += r.events.iter().filter(|ev| **ev == GameEvent::Deadlocked).count();
            if !r.is_applied() {
                assert_eq!(r.status, Status::Ignored(IgnoreReason::NotPlaying));
                break;
            }
        }
        assert!(deadlocks <= 1, "seed {seed}: deadlock fired {deadlocks} times");

        if deadlocks == 1 {
            reached += 1;
            assert!(e.bar().is_full());
            assert!(bar_counts(&e).values().all(|&n| n < 3));
            let snap = e.snapshot();
            assert_eq!(snap.outcome, Outcome::Deadlock);
            assert_eq!(
                snap.status_message,
                "Game over! The bar is full with no match. Restart?"
            );
            assert_eq!(snap.pending.map(|p| p.action), Some(PendingAction::PromptRestart));

            let r = e.confirm_restart(true);
            assert_eq!(r.snapshot.level, Level::One);
            assert_eq!(r.snapshot.cards.len(), 18);
        }
    }
    assert!(reached > 0, "spoiler play never jammed the bar");
}

#[test]
fn same_seed_plays_identically() {
    let mut a = engine(99);
    let mut b = engine(99);
    assert_eq!(a.snapshot(), b.snapshot());
    clear_level_one(&mut a);
    clear_level_one(&mut b);
    assert_eq!(a.advance().snapshot, b.advance().snapshot);
}

#[test]
fn custom_rules_from_toml_shape_the_bar() {
    let config = GameConfig::from_toml_str(
        "[rules]\nbar_capacity = 5\nmatch_size = 2\n[general]\nseed = 8\n",
    )
    .unwrap();
    let e = Engine::new(&config);
    assert_eq!(e.seed(), 8);
    assert_eq!(e.snapshot().slots.len(), 5);
    assert_eq!(e.snapshot().status_message, "Click a tile to move it into slot. Match 2 to clear.");
}
