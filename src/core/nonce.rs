//! Client nonce counter

use std::sync::atomic::{AtomicU32, Ordering};

/// Lock-free source of per-attempt nonces.
///
/// Starts at a random value so that separate miners (or restarts of the same
/// one) do not walk the same search space. Wraps on 32-bit overflow.
#[derive(Debug)]
pub struct NonceCounter(AtomicU32);

impl NonceCounter {
    /// Create a counter with a random starting point
    pub fn random() -> Self {
        Self::starting_at(rand::random::<u32>())
    }

    /// Create a counter with a fixed starting point
    pub const fn starting_at(value: u32) -> Self {
        Self(AtomicU32::new(value))
    }

    /// Increment the counter and return the new value
    pub fn next(&self) -> u32 {
        self.0.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    /// Current value without incrementing
    pub fn current(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }
}

impl Default for NonceCounter {
    fn default() -> Self {
        Self::random()
    }
}
