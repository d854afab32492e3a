//! Production Environment implementation using the system clock and RNG.

use chrono::{DateTime, Utc};
use rand::RngCore;

use crate::env::Environment;

/// Production environment using the system clock and OS randomness.
///
/// # Security
///
/// The RNG uses `getrandom`, which provides OS-level cryptographic
/// randomness. Contact ids and auth-info passwords are drawn from it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        if let Err(e) = getrandom::fill(buffer) {
            // thread_rng is a CSPRNG seeded from the OS; still unpredictable
            tracing::error!("getrandom failed: {}", e);
            rand::thread_rng().fill_bytes(buffer);
        }
    }
}
