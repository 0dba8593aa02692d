//! Key derivation for the rolling-key protocol.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

type HmacSha256 = Hmac<Sha256>;

/// Size of every derived key in bytes.
pub const KEY_SIZE: usize = 32;

/// Derive the symmetric (envelope) key from a 3-word secret.
///
/// The words are joined with single spaces and hashed with SHA-256.
/// The join is order-sensitive: permuting the same three words yields
/// a different key.
///
/// Deterministic: same words always produce the same key, so the
/// sender and receiver halves of the protocol can each re-derive it
/// from the shared epoch without exchanging key material.
pub fn derive_symmetric_key(words: [&str; 3]) -> [u8; KEY_SIZE] {
    let mut joined = words.join(" ");
    let digest = Sha256::digest(joined.as_bytes());
    joined.zeroize();
    digest.into()
}

/// Derive the rolling (proof-of-possession) key for one rotation
/// window.
///
/// HMAC-SHA256 keyed by the space-joined words over the decimal string
/// of the window counter. Adjacent windows produce unrelated keys, so
/// a captured envelope is useless once the window advances.
pub fn derive_rolling_key(words: [&str; 3], counter: u64) -> [u8; KEY_SIZE] {
    let mut joined = words.join(" ");
    let Ok(mut mac) = HmacSha256::new_from_slice(joined.as_bytes()) else {
        unreachable!("HMAC-SHA256 accepts keys of any length");
    };
    mac.update(counter.to_string().as_bytes());
    joined.zeroize();
    mac.finalize().into_bytes().into()
}

/// Constant-time equality for two derived keys.
///
/// The unlock decision compares an attacker-influenced value (the
/// opened envelope) against the expected rolling key, so the
/// comparison must not leak a matching prefix through timing.
pub fn keys_match(a: &[u8; KEY_SIZE], b: &[u8; KEY_SIZE]) -> bool {
    a.ct_eq(b).into()
}
