//! Rotation windows and the current secret epoch.

use tracing::debug;

use crate::{env::Environment, error::RotationError, words::WordPool};

/// Length of one rotation window in seconds.
pub const ROTATION_PERIOD_SECS: u64 = 30;

/// Rotation window counter for a wall-clock instant.
///
/// Derived, never stored: callers recompute it from the clock on
/// demand so an epoch's window and "now" can diverge once the window
/// elapses.
pub fn rotation_window(unix_secs: u64) -> u64 {
    unix_secs / ROTATION_PERIOD_SECS
}

/// One generation of the rotating 3-word secret.
///
/// Immutable once created; the rotator replaces it wholesale on each
/// rotation, so at any instant at most one epoch is current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretEpoch {
    words: [String; 3],
    window: u64,
}

impl SecretEpoch {
    /// Bind a word triple to the rotation window it was created in.
    pub fn new(words: [String; 3], window: u64) -> Self {
        Self { words, window }
    }

    /// The 3-word secret, in sampling order.
    pub fn words(&self) -> &[String; 3] {
        &self.words
    }

    /// Borrowed view of the words for key derivation.
    pub fn word_refs(&self) -> [&str; 3] {
        [&self.words[0], &self.words[1], &self.words[2]]
    }

    /// Rotation window at creation time.
    pub fn window(&self) -> u64 {
        self.window
    }

    /// Exact sequence equality against a user-supplied attempt.
    ///
    /// Order matters and count matters: anything other than the same
    /// 3 words in the same order is a mismatch.
    pub fn matches(&self, attempt: &[String]) -> bool {
        attempt.len() == self.words.len() && attempt == self.words
    }
}

/// Samples and owns the current secret epoch.
///
/// Explicitly owned state rather than process-wide globals: tests
/// construct independent rotators with deterministic environments.
/// Rotation is explicit - `current()` never auto-rotates, matching a
/// TOTP-style model where the secret stays valid until replaced,
/// decoupled from whether its 30-second window has elapsed.
#[derive(Debug, Clone)]
pub struct SecretRotator<E> {
    env: E,
    pool: WordPool,
    epoch: Option<SecretEpoch>,
}

impl<E: Environment> SecretRotator<E> {
    /// Rotator over the given pool with no current epoch.
    pub fn new(env: E, pool: WordPool) -> Self {
        Self { env, pool, epoch: None }
    }

    /// Rotation window for the current wall-clock time.
    pub fn current_window(&self) -> u64 {
        rotation_window(self.env.wall_clock_secs())
    }

    /// Sample a fresh 3-word secret and make it current.
    ///
    /// The previous epoch, if any, is dropped wholesale.
    ///
    /// # Errors
    ///
    /// `PoolExhausted` if the pool holds fewer than 3 distinct words.
    pub fn rotate(&mut self) -> Result<&SecretEpoch, RotationError> {
        let words = self.pool.sample_words(&self.env)?;
        let window = self.current_window();

        // The words themselves are secret material and stay out of
        // the log stream.
        debug!(window, "rotated secret epoch");

        self.epoch = Some(SecretEpoch::new(words, window));
        let Some(epoch) = self.epoch.as_ref() else {
            unreachable!("epoch was assigned on the previous line");
        };
        Ok(epoch)
    }

    /// The current epoch, or `None` before the first rotation.
    pub fn current(&self) -> Option<&SecretEpoch> {
        self.epoch.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    use rand::{RngCore, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[derive(Clone)]
    struct TestEnv {
        now_secs: u64,
        rng: Arc<Mutex<ChaCha8Rng>>,
    }

    impl TestEnv {
        fn at(now_secs: u64) -> Self {
            Self { now_secs, rng: Arc::new(Mutex::new(ChaCha8Rng::seed_from_u64(11))) }
        }
    }

    impl Environment for TestEnv {
        fn wall_clock_secs(&self) -> u64 {
            self.now_secs
        }

        fn sleep(&self, _duration: Duration) -> impl std::future::Future<Output = ()> + Send {
            async {}
        }

        fn random_bytes(&self, buffer: &mut [u8]) {
            self.rng.lock().unwrap().fill_bytes(buffer);
        }
    }

    fn triple(words: [&str; 3]) -> [String; 3] {
        words.map(str::to_string)
    }

    #[test]
    fn window_is_floor_of_seconds_over_thirty() {
        assert_eq!(rotation_window(0), 0);
        assert_eq!(rotation_window(29), 0);
        assert_eq!(rotation_window(30), 1);
        assert_eq!(rotation_window(30_000), 1000);
        assert_eq!(rotation_window(30_029), 1000);
        assert_eq!(rotation_window(30_030), 1001);
    }

    #[test]
    fn no_epoch_before_first_rotation() {
        let rotor = SecretRotator::new(TestEnv::at(0), WordPool::builtin());
        assert!(rotor.current().is_none());
    }

    #[test]
    fn rotate_binds_the_current_window() {
        let mut rotor = SecretRotator::new(TestEnv::at(30_000), WordPool::builtin());

        let epoch = rotor.rotate().unwrap();

        assert_eq!(epoch.window(), 1000);
        assert_eq!(rotor.current_window(), 1000);
    }

    #[test]
    fn rotate_replaces_the_epoch_wholesale() {
        let mut rotor = SecretRotator::new(TestEnv::at(30_000), WordPool::builtin());

        let first = rotor.rotate().unwrap().clone();
        let second = rotor.rotate().unwrap().clone();

        assert_eq!(rotor.current(), Some(&second));
        // Same window, independently sampled words.
        assert_eq!(first.window(), second.window());
    }

    #[test]
    fn repeated_rotation_always_yields_three_distinct_words() {
        let mut rotor = SecretRotator::new(TestEnv::at(60), WordPool::builtin());

        for _ in 0..50 {
            let words = rotor.rotate().unwrap().words().clone();
            assert_ne!(words[0], words[1]);
            assert_ne!(words[0], words[2]);
            assert_ne!(words[1], words[2]);
        }
    }

    #[test]
    fn rotate_on_an_exhausted_pool_fails() {
        let pool = WordPool::new(vec!["lone".to_string()]);
        let mut rotor = SecretRotator::new(TestEnv::at(0), pool);

        assert_eq!(rotor.rotate().unwrap_err(), RotationError::PoolExhausted { distinct: 1 });
        assert!(rotor.current().is_none());
    }

    #[test]
    fn matches_requires_exact_sequence() {
        let epoch = SecretEpoch::new(triple(["breeze", "kernel", "sprint"]), 1000);

        assert!(epoch.matches(&triple(["breeze", "kernel", "sprint"])));
        assert!(!epoch.matches(&triple(["breeze", "sprint", "kernel"])), "order matters");
        assert!(!epoch.matches(&triple(["breeze", "kernel", "kernel"])));
        assert!(!epoch.matches(&["breeze".to_string(), "kernel".to_string()]), "count matters");
        assert!(!epoch.matches(&[]));
    }
}
