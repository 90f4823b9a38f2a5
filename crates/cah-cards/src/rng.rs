//! Seedable randomness for deck and reveal shuffles.
//!
//! Every random decision in the engine goes through [`GameRng`]. Tests
//! seed it and get the same deck order and the same anonymized reveal
//! order every run; production seeds it from the OS.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

/// Deterministic shuffler backed by a ChaCha8 stream.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
    fork_counter: u64,
}

impl GameRng {
    /// Creates a shuffler from a fixed seed. Same seed, same shuffles.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
            fork_counter: 0,
        }
    }

    /// Creates a shuffler with a seed drawn from the thread RNG.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::seeded(rand::random())
    }

    /// The seed this stream was created from. Logged at game start so a
    /// reported game can be replayed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Derives an independent stream, e.g. one for the deck and one for
    /// reveal order. Forks of equal parents are equal.
    #[must_use]
    pub fn fork(&mut self) -> Self {
        self.fork_counter += 1;
        Self::seeded(
            self.seed
                .wrapping_add(self.fork_counter.wrapping_mul(0x9E37_79B9_7F4A_7C15)),
        )
    }

    /// Uniform (Fisher–Yates) shuffle in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.inner);
    }
}
