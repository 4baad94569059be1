//! Property tests for the engine's rule invariants.
//!
//! Seeds and pick sequences are generated; each pick is an index into the
//! current clickable set, so every sequence is a legal game.
//!
//! Invariants covered:
//! - Snapshot clickability equals the direct occlusion definition.
//! - After every selection no icon in the bar reaches the match size.
//! - Cards are conserved: board + bar + cleared = dealt.
//! - Deadlock is reported exactly when the bar is full without a triple.
//! - Select followed by undo restores board and bar.

use proptest::prelude::*;
use triplestack::domain::card::Card;
use triplestack::domain::occlusion;
use triplestack::sim::world::Phase;
use triplestack::{Engine, GameConfig, GameEvent, Level};

fn engine(seed: u64, level: Level) -> Engine {
    let mut e = Engine::with_seed(&GameConfig::default(), seed);
    if level != Level::One {
        e.start_level(level);
    }
    e
}

/// Another card on the same rounded cell with a greater layer blocks.
fn blocked_by_definition(card: &Card, cards: &[Card]) -> bool {
    cards
        .iter()
        .any(|o| o.id != card.id && o.cell() == card.cell() && o.layer > card.layer)
}

fn level_strategy() -> impl Strategy<Value = Level> {
    prop_oneof![Just(Level::One), Just(Level::Two)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn clickability_matches_definition(seed in any::<u64>(), level in level_strategy(), picks in prop::collection::vec(any::<usize>(), 0..12)) {
        let mut e = engine(seed, level);
        for p in picks {
            let ids = e.board().clickable_ids();
            if ids.is_empty() || e.phase() != Phase::Playing {
                break;
            }
            e.select_card(ids[p % ids.len()]);
        }

        let cards = e.board().cards().to_vec();
        let snap = e.snapshot();
        prop_assert_eq!(snap.cards.len(), cards.len());
        for view in &snap.cards {
            let card = cards.iter().find(|c| c.id == view.id).unwrap();
            prop_assert_eq!(view.clickable, !blocked_by_definition(card, &cards));
            prop_assert_eq!(view.clickable, occlusion::is_clickable(card, &cards));
        }
        // Render order: non-decreasing layers.
        prop_assert!(snap.cards.windows(2).all(|w| w[0].layer <= w[1].layer));
    }

    #[test]
    fn bar_and_card_count_invariants_hold(seed in any::<u64>(), level in level_strategy(), picks in prop::collection::vec(any::<usize>(), 1..40)) {
        let mut e = engine(seed, level);
        let dealt = e.board().len();
        let match_size = e.bar().match_size();
        let mut cleared = 0;
        let mut deadlocks = 0;

        for p in picks {
            let ids = e.board().clickable_ids();
            if ids.is_empty() {
                break;
            }
            let r = e.select_card(ids[p % ids.len()]);
            if !r.is_applied() {
                prop_assert!(e.phase() != Phase::Playing);
                break;
            }
            for ev in &r.events {
                match ev {
                    GameEvent::Matched { .. } => cleared += match_size,
                    GameEvent::Deadlocked => deadlocks += 1,
                    _ => {}
                }
            }

            prop_assert!(e.bar().counts().iter().all(|(_, n)| *n < match_size));
            prop_assert!(e.bar().occupied() <= e.bar().capacity());
            prop_assert_eq!(e.board().len() + e.bar().occupied() + cleared, dealt);

            let jammed = e.bar().is_full() && !e.bar().has_pending_match();
            prop_assert_eq!(jammed, matches!(e.phase(), Phase::Deadlock { .. }));
        }
        prop_assert!(deadlocks <= 1);
    }

    #[test]
    fn undo_inverts_a_selection(seed in any::<u64>(), level in level_strategy(), prefix in prop::collection::vec(any::<usize>(), 0..6), pick in any::<usize>()) {
        let mut e = engine(seed, level);
        for p in prefix {
            let ids = e.board().clickable_ids();
            if e.phase() != Phase::Playing || ids.is_empty() {
                break;
            }
            e.select_card(ids[p % ids.len()]);
        }
        prop_assume!(e.phase() == Phase::Playing);

        let board = e.board().clone();
        let bar = e.bar().clone();
        let depth = e.history_len();
        let ids = e.board().clickable_ids();
        prop_assume!(!ids.is_empty());

        let r = e.select_card(ids[pick % ids.len()]);
        prop_assert!(r.is_applied());
        // A level clear ends undo; Level 2 is never cleared in a few picks.
        prop_assume!(!matches!(e.phase(), Phase::LevelComplete { .. } | Phase::GameComplete));

        prop_assert!(e.undo().is_applied());
        prop_assert_eq!(e.board(), &board);
        prop_assert_eq!(e.bar(), &bar);
        prop_assert_eq!(e.history_len(), depth);
        prop_assert_eq!(e.phase(), Phase::Playing);
    }

    #[test]
    fn same_seed_same_snapshot(seed in any::<u64>(), level in level_strategy()) {
        prop_assert_eq!(engine(seed, level).snapshot(), engine(seed, level).snapshot());
    }
}
