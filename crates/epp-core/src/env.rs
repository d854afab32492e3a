//! Environment abstraction for deterministic testing.
//!
//! The `Environment` trait decouples session logic from system resources
//! (wall clock, randomness). Production code uses
//! [`SystemEnv`](crate::system_env::SystemEnv); the harness supplies a
//! seeded implementation with a settable clock.
//!
//! # Invariants
//!
//! - Determinism: Given the same seed, `random_bytes()` produces the same
//!   sequence
//! - Isolation: Implementations must not share global state

use chrono::{DateTime, Utc};

/// Abstract environment providing wall-clock time and randomness.
///
/// Transaction ids, expiry checks and generated credentials all flow
/// through this trait, so a test can pin every value a flow produces.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Returns the current wall-clock time.
    ///
    /// Unlike a monotonic clock this may step backwards. Callers that need
    /// strictly increasing values (transaction ids) enforce it themselves.
    fn now(&self) -> DateTime<Utc>;

    /// Fills the provided buffer with random bytes.
    ///
    /// # Security
    ///
    /// Production implementations MUST use OS entropy (`getrandom`).
    /// Generated auth-info passwords depend on it.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generates a random `u64`.
    fn random_u64(&self) -> u64 {
        let mut bytes = [0u8; 8];
        self.random_bytes(&mut bytes);
        u64::from_be_bytes(bytes)
    }

    /// Uniform index in `0..bound` by rejection sampling.
    ///
    /// Returns 0 when `bound` is 0.
    fn random_index(&self, bound: usize) -> usize {
        let Ok(bound) = u64::try_from(bound) else { return 0 };
        if bound == 0 {
            return 0;
        }
        let zone = u64::MAX - (u64::MAX % bound);
        loop {
            let value = self.random_u64();
            if value < zone {
                // value % bound < bound, which came from a usize
                return usize::try_from(value % bound).unwrap_or_default();
            }
        }
    }
}
