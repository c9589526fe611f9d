//! Random draws used by the resolver.
//!
//! The engine only ever needs two kinds of draw: a uniform probability roll
//! and a uniform index into a list. [`Dice`] captures exactly that, so a
//! seeded [`ChaCha8Rng`] and a scripted test sequence are interchangeable.
//!
//! Every draw is a one-shot decision; a probability `p` fires iff
//! `chance() < p`.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of the engine's random decisions.
pub trait Dice {
    /// Uniform draw in `[0, 1)`.
    fn chance(&mut self) -> f64;

    /// Uniform index in `0..len`. `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;

    /// Rolls against probability `p`.
    fn roll(&mut self, p: f64) -> bool {
        self.chance() < p
    }
}

impl Dice for ChaCha8Rng {
    fn chance(&mut self) -> f64 {
        self.gen::<f64>()
    }

    fn pick(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }
}

/// Creates the engine's deterministic RNG for `seed`.
#[must_use]
pub fn seeded(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Dice that replays a fixed list of draws, for tests.
///
/// `chance()` returns the next value as-is; `pick(len)` maps the next value
/// onto `0..len`. Once the script runs out it keeps returning `fallback`.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    draws: std::collections::VecDeque<f64>,
    fallback: f64,
    consumed: usize,
}

#[cfg(test)]
impl ScriptedDice {
    pub fn new(draws: impl IntoIterator<Item = f64>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
            fallback: 0.999,
            consumed: 0,
        }
    }

    pub fn with_fallback(mut self, fallback: f64) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn remaining(&self) -> usize {
        self.draws.len()
    }

    fn next(&mut self) -> f64 {
        self.consumed += 1;
        self.draws.pop_front().unwrap_or(self.fallback)
    }
}

#[cfg(test)]
impl Dice for ScriptedDice {
    fn chance(&mut self) -> f64 {
        self.next()
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn pick(&mut self, len: usize) -> usize {
        ((self.next() * len as f64) as usize).min(len - 1)
    }
}
