//! Rimlock Cryptographic Primitives
//!
//! Cryptographic building blocks for the Rimlock unlock protocol. Pure
//! functions with deterministic outputs. Callers provide random bytes
//! (the envelope IV) for deterministic testing.
//!
//! # Key Lifecycle
//!
//! Each unlock attempt derives two independent keys from the current
//! 3-word secret and wraps one in an encryption round trip under the
//! other. Both keys are ephemeral, scoped to a single attempt.
//!
//! ```text
//! 3-word secret epoch
//!        │
//!        ├─ SHA-256(words) ────────────► Symmetric Key (32 bytes)
//!        │                                      │
//!        └─ HMAC-SHA256(words, window) ► Rolling Key (32 bytes)
//!                                               │
//!                        AES-256-CBC seal ◄─────┘
//!                               │
//!                               ▼
//!                  base64(IV ‖ ciphertext) envelope
//! ```
//!
//! The receiver opens the envelope under an independently re-derived
//! symmetric key and compares the recovered rolling key, in constant
//! time, against an independently re-derived expectation. Any
//! divergence in words or window breaks the symmetry and surfaces as a
//! mismatch rather than a decryption crash.
//!
//! # Security
//!
//! - The symmetric key never encrypts anything except the 32-byte
//!   rolling key, so CBC's malleability buys an attacker nothing
//!   beyond forcing a mismatch.
//! - A fresh random IV per attempt keeps equal rolling keys from
//!   producing equal ciphertexts.
//! - Derivation is order-sensitive: permuting the same three words
//!   yields unrelated keys.
//! - Intermediate secret buffers are zeroized after use.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod rolling;

pub use rolling::{
    CipherEnvelope, EnvelopeError, IV_SIZE, KEY_SIZE, derive_rolling_key, derive_symmetric_key,
    keys_match, open, seal,
};
