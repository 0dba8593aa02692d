//! Error types for envelope operations.

use thiserror::Error;

/// Errors from decoding or opening a cipher envelope.
///
/// Every variant means verification failure, never a crash: the
/// protocol layer recovers all of them into the anti-theft path. None
/// of them carry key material.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// Wire string is not valid base64
    #[error("envelope is not valid base64: {reason}")]
    InvalidEncoding {
        /// Decoder's description of the malformation
        reason: String,
    },

    /// Decoded payload is too short to contain the 16-byte IV
    #[error("envelope truncated: {len} bytes, need at least 16")]
    TruncatedEnvelope {
        /// Decoded payload length
        len: usize,
    },

    /// Ciphertext body is empty or not a whole number of AES blocks
    #[error("ciphertext misaligned: {len} bytes is not a positive multiple of 16")]
    MisalignedCiphertext {
        /// Ciphertext length
        len: usize,
    },

    /// PKCS#7 padding check failed after decryption (tampered
    /// ciphertext or wrong symmetric key)
    #[error("invalid padding after decryption")]
    InvalidPadding,
}
