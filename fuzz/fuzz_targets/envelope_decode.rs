//! Fuzz target for the envelope wire codec and open path
//!
//! # Strategy
//!
//! - Random text: arbitrary strings through base64 decode
//! - Random structure: arbitrary IV/ciphertext pairs through open
//! - Valid-prefix attacks: sealed envelope re-encoded after mutation
//!
//! # Invariants
//!
//! - Decode returns cleanly or errors; NEVER panics
//! - Open rejects misaligned bodies without allocating per claimed size
//! - A mutated valid envelope never opens back to the original key
//!   without an error or a differing payload

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rimlock_crypto::{CipherEnvelope, IV_SIZE, derive_rolling_key, derive_symmetric_key, open, seal};

#[derive(Debug, Arbitrary)]
enum EnvelopeAttack {
    RandomText { wire: String },
    RandomStructure { iv: [u8; IV_SIZE], ciphertext: Vec<u8> },
    MutatedValid { iv: [u8; IV_SIZE], counter: u64, index: usize, flip: u8 },
}

fuzz_target!(|attack: EnvelopeAttack| {
    const WORDS: [&str; 3] = ["breeze", "kernel", "sprint"];
    let symmetric = derive_symmetric_key(WORDS);

    match attack {
        EnvelopeAttack::RandomText { wire } => {
            if let Ok(envelope) = CipherEnvelope::decode(&wire) {
                let _ = open(&envelope, &symmetric);
            }
        }
        EnvelopeAttack::RandomStructure { iv, ciphertext } => {
            let envelope = CipherEnvelope { iv, ciphertext };
            let _ = open(&envelope, &symmetric);
        }
        EnvelopeAttack::MutatedValid { iv, counter, index, flip } => {
            let rolling = derive_rolling_key(WORDS, counter);
            let mut envelope = seal(&rolling, &symmetric, iv);

            let position = index % envelope.ciphertext.len();
            envelope.ciphertext[position] ^= flip;

            if flip != 0 {
                if let Ok(recovered) = open(&envelope, &symmetric) {
                    assert_ne!(
                        recovered, rolling,
                        "mutated envelope silently returned the original key"
                    );
                }
            }
        }
    }
});
