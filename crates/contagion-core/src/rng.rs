//! Random Source
//!
//! Every stochastic decision in the engine goes through [`RandomSource`], so
//! a seeded generator reproduces a whole run draw for draw.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};

/// Uniform-random and shuffle primitives used by the simulation stages.
pub trait RandomSource {
    /// Uniform draw in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Uniform index in `0..len`, or `None` when `len` is zero.
    fn pick_index(&mut self, len: usize) -> Option<usize>;

    /// Shuffles `items` in place.
    fn shuffle<T>(&mut self, items: &mut [T]);

    /// Bernoulli trial. `chance(0.0)` never succeeds and `chance(1.0)`
    /// always does.
    fn chance(&mut self, probability: f64) -> bool {
        self.next_unit() < probability
    }

    /// Count drawn from `[min, min + span)`. A zero span yields `min`.
    fn count_in(&mut self, min: usize, span: usize) -> usize {
        min + (self.next_unit() * span as f64).floor() as usize
    }

    /// Picks one element uniformly.
    fn pick<T: Copy>(&mut self, items: &[T]) -> Option<T> {
        self.pick_index(items.len()).and_then(|i| items.get(i).copied())
    }

    /// Draws up to `amount` distinct elements without replacement.
    fn choose_distinct<T: Copy>(&mut self, items: &[T], amount: usize) -> Vec<T> {
        let mut pool = items.to_vec();
        self.shuffle(&mut pool);
        pool.truncate(amount);
        pool
    }
}

impl<R: RngCore> RandomSource for R {
    fn next_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }

    fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.gen_range(0..len))
        }
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(self);
    }
}

/// Seeded random number generator resource
#[derive(Resource)]
pub struct SimRng(pub SmallRng);

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self(SmallRng::seed_from_u64(seed))
    }

    /// Non-reproducible generator seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self(SmallRng::from_entropy())
    }
}
