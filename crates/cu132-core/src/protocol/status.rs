//! Poll reply selection
//!
//! A poll is answered with either a race status or a sensor event. The choice
//! comes from a [`BitSource`] handed to the interpreter, so a live simulator
//! draws from an RNG while tests script the outcome.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of the bit that picks a poll reply
pub trait BitSource {
    /// Draw the next bit
    fn next_bit(&mut self) -> bool;
}

impl<B: BitSource + ?Sized> BitSource for Box<B> {
    fn next_bit(&mut self) -> bool {
        (**self).next_bit()
    }
}

/// Fair coin backed by a seedable RNG
pub struct RandomBits {
    rng: StdRng,
}

impl RandomBits {
    /// Create a source seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a reproducible source
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomBits {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl BitSource for RandomBits {
    fn next_bit(&mut self) -> bool {
        self.rng.gen()
    }
}

/// Replays a fixed bit sequence, then keeps returning the fallback
#[derive(Debug, Clone, Default)]
pub struct ScriptedBits {
    bits: VecDeque<bool>,
    fallback: bool,
}

impl ScriptedBits {
    /// Create a source that yields `bits` in order
    pub fn new(bits: impl IntoIterator<Item = bool>) -> Self {
        Self {
            bits: bits.into_iter().collect(),
            fallback: false,
        }
    }

    /// Create a source that always yields `bit`
    pub fn constant(bit: bool) -> Self {
        Self {
            bits: VecDeque::new(),
            fallback: bit,
        }
    }

    /// Number of scripted bits not yet drawn
    pub fn remaining(&self) -> usize {
        self.bits.len()
    }
}

impl BitSource for ScriptedBits {
    fn next_bit(&mut self) -> bool {
        self.bits.pop_front().unwrap_or(self.fallback)
    }
}
