//! Bag module - 7-bag random piece generation
//!
//! Classic "7-bag" fairness: each batch holds one of every playable kind,
//! shuffled, and is fully consumed before the next batch is generated.
//! The shuffle source is an injectable LCG so piece sequences are
//! reproducible from a seed.

use arrayvec::ArrayVec;

use crate::types::Tetromino;

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        self.next_u32() % max
    }

    /// Shuffle a slice using Fisher-Yates
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }
}

/// 7-bag piece generator
#[derive(Debug, Clone)]
pub struct PieceBag {
    bag: ArrayVec<Tetromino, 7>,
    rng: SimpleRng,
}

impl PieceBag {
    /// Create a new bag with the given seed
    pub fn new(seed: u32) -> Self {
        Self {
            bag: ArrayVec::new(),
            rng: SimpleRng::new(seed),
        }
    }

    /// Draw the next piece, refilling with a fresh permutation when the
    /// bag runs dry
    pub fn next(&mut self) -> Tetromino {
        if self.bag.is_empty() {
            self.refill();
        }
        // Refill always leaves 7 entries
        self.bag.pop().unwrap()
    }

    /// Pieces left in the current batch
    pub fn remaining(&self) -> usize {
        self.bag.len()
    }

    fn refill(&mut self) {
        self.bag.clear();
        self.bag.extend(Tetromino::KINDS);
        self.rng.shuffle(&mut self.bag);
    }
}
