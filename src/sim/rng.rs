//! Randomness and id generation.
//!
//! Every random decision in a session flows from one seeded `StdRng`,
//! so a seed fully determines the boards the engine produces.

use rand::rngs::StdRng;
use rand::seq::{index, SliceRandom};
use rand::{Rng, SeedableRng};

use crate::domain::card::CardId;

pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn fresh_seed() -> u64 {
    rand::thread_rng().gen()
}

/// Uniform in-place shuffle.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    items.shuffle(rng);
}

/// `n` distinct elements, without replacement. Caller guarantees `n <= items.len()`.
pub fn pick_distinct<T: Clone, R: Rng + ?Sized>(items: &[T], n: usize, rng: &mut R) -> Vec<T> {
    index::sample(rng, items.len(), n)
        .into_iter()
        .map(|i| items[i].clone())
        .collect()
}

/// Uniform integer in `0..=max`.
pub fn bonus<R: Rng + ?Sized>(rng: &mut R, max: u32) -> u32 {
    rng.gen_range(0..=max)
}

/// Monotonic card id source. Ids are never reused within a session.
#[derive(Clone, Debug)]
pub struct IdGen {
    next: u32,
}

impl IdGen {
    pub fn new() -> Self {
        IdGen { next: 1 }
    }

    pub fn next_id(&mut self) -> CardId {
        let id = CardId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}
