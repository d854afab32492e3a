//! Seeded Environment with a settable clock.
//!
//! Clones share one RNG stream and one clock, so a test can hand a clone to
//! a registrar and still move time forward from outside.

use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use chrono::{DateTime, Duration, Utc};
use epp_core::Environment;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seed used by [`SimEnv::new`].
pub const DEFAULT_SEED: u64 = 0x5EED_0EBB;

/// 2025-01-01T00:00:00Z, the clock's starting point.
const START: i64 = 1_735_689_600;

/// Deterministic environment for tests and simulations.
#[derive(Clone)]
pub struct SimEnv {
    rng: Arc<Mutex<ChaCha8Rng>>,
    clock: Arc<Mutex<DateTime<Utc>>>,
}

impl SimEnv {
    /// Environment seeded with [`DEFAULT_SEED`], clock at 2025-01-01.
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    /// Environment with an explicit seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Arc::new(Mutex::new(ChaCha8Rng::seed_from_u64(seed))),
            clock: Arc::new(Mutex::new(DateTime::from_timestamp(START, 0).unwrap_or_default())),
        }
    }

    /// Same environment with the clock set to `now`.
    #[must_use]
    pub fn at(self, now: DateTime<Utc>) -> Self {
        self.set_now(now);
        self
    }

    /// Move the clock to `now`. Going backwards is allowed.
    pub fn set_now(&self, now: DateTime<Utc>) {
        *self.clock.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    /// Move the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut clock = self.clock.lock().unwrap_or_else(PoisonError::into_inner);
        *clock += by;
    }
}

impl Default for SimEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SimEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimEnv").field("now", &self.now()).finish_non_exhaustive()
    }
}

impl Environment for SimEnv {
    fn now(&self) -> DateTime<Utc> {
        *self.clock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner).fill_bytes(buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_bytes() {
        let (a, b) = (SimEnv::with_seed(7), SimEnv::with_seed(7));
        let (mut x, mut y) = ([0u8; 32], [0u8; 32]);
        a.random_bytes(&mut x);
        b.random_bytes(&mut y);
        assert_eq!(x, y);
    }

    #[test]
    fn clones_share_stream_and_clock() {
        let env = SimEnv::new();
        let clone = env.clone();

        let (mut first, mut second) = ([0u8; 16], [0u8; 16]);
        env.random_bytes(&mut first);
        clone.random_bytes(&mut second);
        assert_ne!(first, second);

        let before = env.now();
        clone.advance(Duration::days(1));
        assert_eq!(env.now() - before, Duration::days(1));
    }
}
