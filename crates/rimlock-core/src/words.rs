//! Static catalogue of candidate secret words.

use rand::seq::index;

use crate::{
    env::{EnvRng, Environment},
    error::RotationError,
};

/// Number of words in one secret.
pub const SECRET_WORD_COUNT: usize = 3;

/// Built-in word catalogue.
///
/// Lowercase six-letter tokens; duplicates are permitted (the list
/// carries one) and are collapsed at sampling time.
const BUILTIN_WORDS: [&str; 100] = [
    "active", "breeze", "candle", "dancer", "effort", "forest", "gentle", "harbor", "insect",
    "jigsaw", "kidnap", "laptop", "magnet", "nectar", "oracle", "pencil", "quench", "rescue",
    "shelter", "tunnel", "unique", "vacuum", "wander", "yellow", "zigzag", "anchor", "bright",
    "create", "desert", "embark", "famous", "guitar", "honest", "ignite", "jockey", "kernel",
    "launch", "mantle", "narrow", "outset", "pastel", "quaint", "ripple", "sprint", "timber",
    "uphold", "vortex", "whisky", "xenial", "yonder", "abacus", "bucket", "carpet", "dental",
    "empire", "fabric", "gospel", "hunger", "impact", "jigsaw", "kidney", "lawyer", "mosaic",
    "nugget", "octave", "puddle", "quiver", "reboot", "sierra", "thread", "urgent", "violet",
    "wealth", "xeroxs", "yammer", "abrupt", "buckle", "cactus", "decade", "exceed", "fossil",
    "growth", "humble", "insult", "jungle", "kindle", "luxury", "muscle", "napkin", "orphan",
    "patent", "quasar", "rocket", "sizzle", "theory", "unfold", "volume", "wisdom", "xylotl",
    "zephyr",
];

/// Immutable ordered catalogue of candidate secret words.
///
/// Read-only after construction. Order is preserved so that a given
/// environment seed always samples the same words.
#[derive(Debug, Clone)]
pub struct WordPool {
    words: Vec<String>,
}

impl WordPool {
    /// Pool backed by the built-in 100-word catalogue.
    pub fn builtin() -> Self {
        Self { words: BUILTIN_WORDS.iter().map(|word| (*word).to_string()).collect() }
    }

    /// Pool over a caller-supplied word list.
    ///
    /// No validation happens here; an undersized list surfaces as
    /// [`RotationError::PoolExhausted`] on the first sample.
    pub fn new(words: Vec<String>) -> Self {
        Self { words }
    }

    /// Total number of tokens, duplicates included.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// True if the pool holds no tokens at all.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Sample 3 distinct words uniformly without replacement.
    ///
    /// Distinctness is by value: a token appearing twice in the pool
    /// can still only be chosen once. Sampling runs over the
    /// deduplicated view, so duplicated tokens carry no extra weight.
    ///
    /// # Errors
    ///
    /// `PoolExhausted` if the pool holds fewer than 3 distinct words.
    pub fn sample_words<E: Environment>(
        &self,
        env: &E,
    ) -> Result<[String; SECRET_WORD_COUNT], RotationError> {
        let mut distinct: Vec<&String> = Vec::with_capacity(self.words.len());
        for word in &self.words {
            if !distinct.contains(&word) {
                distinct.push(word);
            }
        }

        if distinct.len() < SECRET_WORD_COUNT {
            return Err(RotationError::PoolExhausted { distinct: distinct.len() });
        }

        let picks = index::sample(&mut EnvRng(env), distinct.len(), SECRET_WORD_COUNT);
        let chosen: Vec<String> = picks.iter().map(|i| distinct[i].clone()).collect();

        let Ok(words) = <[String; SECRET_WORD_COUNT]>::try_from(chosen) else {
            unreachable!("index::sample returns exactly SECRET_WORD_COUNT indices");
        };
        Ok(words)
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

    // Environment with a seeded RNG for reproducible sampling.
    #[derive(Clone)]
    struct SeededEnv {
        rng: Arc<Mutex<ChaCha8Rng>>,
    }

    impl SeededEnv {
        fn new(seed: u64) -> Self {
            Self { rng: Arc::new(Mutex::new(ChaCha8Rng::seed_from_u64(seed))) }
        }
    }

    impl Environment for SeededEnv {
        fn wall_clock_secs(&self) -> u64 {
            0
        }

        fn sleep(&self, _duration: Duration) -> impl std::future::Future<Output = ()> + Send {
            async {}
        }

        fn random_bytes(&self, buffer: &mut [u8]) {
            self.rng.lock().unwrap().fill_bytes(buffer);
        }
    }

    #[test]
    fn builtin_pool_has_one_hundred_tokens() {
        assert_eq!(WordPool::builtin().len(), 100);
    }

    #[test]
    fn sampled_words_are_distinct_and_from_the_pool() {
        let pool = WordPool::builtin();
        let env = SeededEnv::new(7);

        for _ in 0..50 {
            let words = pool.sample_words(&env).unwrap();

            assert_ne!(words[0], words[1]);
            assert_ne!(words[0], words[2]);
            assert_ne!(words[1], words[2]);
            for word in &words {
                assert!(BUILTIN_WORDS.contains(&word.as_str()), "{word} not in pool");
            }
        }
    }

    #[test]
    fn same_seed_samples_same_words() {
        let pool = WordPool::builtin();

        let a = pool.sample_words(&SeededEnv::new(42)).unwrap();
        let b = pool.sample_words(&SeededEnv::new(42)).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn duplicated_tokens_cannot_be_chosen_twice() {
        // Three distinct values hiding in six tokens.
        let pool = WordPool::new(
            ["bolt", "bolt", "gear", "gear", "rim", "rim"].map(str::to_string).to_vec(),
        );
        let env = SeededEnv::new(3);

        for _ in 0..20 {
            let mut words = pool.sample_words(&env).unwrap();
            words.sort();
            assert_eq!(words, ["bolt", "gear", "rim"].map(str::to_string));
        }
    }

    #[test]
    fn undersized_pool_is_exhausted() {
        let pool = WordPool::new(["solo", "duo"].map(str::to_string).to_vec());

        let err = pool.sample_words(&SeededEnv::new(0)).unwrap_err();

        assert_eq!(err, RotationError::PoolExhausted { distinct: 2 });
    }

    #[test]
    fn duplicates_only_pool_is_exhausted() {
        let pool = WordPool::new(vec!["echo".to_string(); 10]);

        let err = pool.sample_words(&SeededEnv::new(0)).unwrap_err();

        assert_eq!(err, RotationError::PoolExhausted { distinct: 1 });
    }

    #[test]
    fn empty_pool_is_exhausted() {
        let pool = WordPool::new(Vec::new());

        assert!(pool.is_empty());
        assert_eq!(
            pool.sample_words(&SeededEnv::new(0)).unwrap_err(),
            RotationError::PoolExhausted { distinct: 0 }
        );
    }
}
