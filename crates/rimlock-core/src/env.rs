//! Environment abstraction for deterministic testing.
//!
//! Decouples protocol logic from system resources (time, randomness).
//! Tests supply scripted clocks and byte sequences; production uses
//! the real system clock and OS entropy.

use std::time::Duration;

/// Abstract environment providing time, randomness, and async sleep.
///
/// # Safety
///
/// Implementations MUST guarantee:
///
/// - `wall_clock_secs()` never goes backwards within one execution
///   context
/// - `random_bytes()` uses cryptographically secure entropy in
///   production (envelope IVs and word sampling both draw from it)
pub trait Environment: Clone + Send + Sync + 'static {
    /// Current wall-clock time as whole seconds since the Unix epoch.
    ///
    /// Rotation windows are derived from this value on demand; it is
    /// never cached beyond a single call.
    fn wall_clock_secs(&self) -> u64;

    /// Sleeps for the specified duration.
    ///
    /// This is the ONLY async method in the trait, and only the
    /// escalation path uses it (the grace-period wait).
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;

    /// Fills the provided buffer with random bytes.
    ///
    /// # Invariants
    ///
    /// - Given the same seed, a test environment produces the same
    ///   sequence of bytes
    /// - Production implementations use a cryptographically secure RNG
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generates a random `u64`.
    fn random_u64(&self) -> u64 {
        let mut bytes = [0u8; 8];
        self.random_bytes(&mut bytes);
        u64::from_be_bytes(bytes)
    }
}

/// Adapter exposing an [`Environment`]'s randomness as a
/// [`rand::RngCore`], so `rand`'s sampling algorithms (uniform
/// selection without replacement) run on injected entropy.
pub struct EnvRng<'a, E>(
    /// The backing environment.
    pub &'a E,
);

impl<E: Environment> rand::RngCore for EnvRng<'_, E> {
    fn next_u32(&mut self) -> u32 {
        let mut bytes = [0u8; 4];
        self.0.random_bytes(&mut bytes);
        u32::from_be_bytes(bytes)
    }

    fn next_u64(&mut self) -> u64 {
        self.0.random_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.random_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.0.random_bytes(dest);
        Ok(())
    }
}
