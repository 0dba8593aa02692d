//! Envelope sealing and the base64 wire codec.
//!
//! All functions are pure - the random IV must be provided by the
//! caller. This enables deterministic testing and keeps IV freshness
//! an explicit obligation of the protocol layer.

use aes::Aes256;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use base64::{Engine as _, engine::general_purpose::STANDARD};

use super::{derivation::KEY_SIZE, error::EnvelopeError};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Size of the envelope IV in bytes.
pub const IV_SIZE: usize = 16;

/// AES block size; ciphertext length must be a multiple of this.
const BLOCK_SIZE: usize = 16;

/// A sealed rolling key: random IV plus padded AES-256-CBC ciphertext.
///
/// This is the only artifact exchanged between the app and bike roles.
/// Wire format: `base64(IV ‖ ciphertext)`, IV first. Created fresh per
/// unlock attempt and discarded immediately after; an envelope is
/// never reused because its IV is never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherEnvelope {
    /// The 16-byte CBC initialization vector
    pub iv: [u8; IV_SIZE],
    /// The padded ciphertext (always a whole number of AES blocks)
    pub ciphertext: Vec<u8>,
}

impl CipherEnvelope {
    /// Encode as the transport string: `base64(IV ‖ ciphertext)`.
    pub fn encode(&self) -> String {
        let mut raw = Vec::with_capacity(IV_SIZE + self.ciphertext.len());
        raw.extend_from_slice(&self.iv);
        raw.extend_from_slice(&self.ciphertext);
        STANDARD.encode(raw)
    }

    /// Decode a transport string back into an envelope.
    ///
    /// # Errors
    ///
    /// - `InvalidEncoding`: not valid base64
    /// - `TruncatedEnvelope`: too short to contain the 16-byte IV
    ///
    /// Ciphertext alignment is deliberately not checked here; a
    /// misaligned body is reported by [`open`] so that all
    /// key-recovery failures funnel through one call site.
    pub fn decode(encoded: &str) -> Result<Self, EnvelopeError> {
        let raw = STANDARD
            .decode(encoded)
            .map_err(|err| EnvelopeError::InvalidEncoding { reason: err.to_string() })?;

        if raw.len() < IV_SIZE {
            return Err(EnvelopeError::TruncatedEnvelope { len: raw.len() });
        }

        let mut iv = [0u8; IV_SIZE];
        iv.copy_from_slice(&raw[..IV_SIZE]);

        Ok(Self { iv, ciphertext: raw[IV_SIZE..].to_vec() })
    }
}

/// Seal a rolling key under the symmetric key and a fresh IV.
///
/// AES-256-CBC with PKCS#7 padding. The caller MUST supply a
/// cryptographically random IV and MUST NOT reuse it: under CBC a
/// repeated IV leaks plaintext equality across attempts.
pub fn seal(
    rolling_key: &[u8; KEY_SIZE],
    symmetric_key: &[u8; KEY_SIZE],
    iv: [u8; IV_SIZE],
) -> CipherEnvelope {
    let ciphertext = Aes256CbcEnc::new(symmetric_key.into(), (&iv).into())
        .encrypt_padded_vec_mut::<Pkcs7>(rolling_key);

    CipherEnvelope { iv, ciphertext }
}

/// Open a sealed envelope, recovering the rolling key bytes.
///
/// Decryption depends only on the symmetric key, not on the rolling
/// key's value: a wrong-window or wrong-word rolling key still opens
/// cleanly and surfaces as a comparison mismatch at the protocol
/// layer, not as an error here.
///
/// # Errors
///
/// - `MisalignedCiphertext`: body empty or not a whole number of
///   blocks
/// - `InvalidPadding`: PKCS#7 padding check failed after decryption
pub fn open(
    envelope: &CipherEnvelope,
    symmetric_key: &[u8; KEY_SIZE],
) -> Result<Vec<u8>, EnvelopeError> {
    let len = envelope.ciphertext.len();
    if len == 0 || len % BLOCK_SIZE != 0 {
        return Err(EnvelopeError::MisalignedCiphertext { len });
    }

    Aes256CbcDec::new(symmetric_key.into(), (&envelope.iv).into())
        .decrypt_padded_vec_mut::<Pkcs7>(&envelope.ciphertext)
        .map_err(|_| EnvelopeError::InvalidPadding)
}

#[cfg(test)]
mod tests {
    use super::{super::derivation::{derive_rolling_key, derive_symmetric_key}, *};

    const WORDS: [&str; 3] = ["breeze", "kernel", "sprint"];

    fn test_keys() -> ([u8; KEY_SIZE], [u8; KEY_SIZE]) {
        (derive_rolling_key(WORDS, 1000), derive_symmetric_key(WORDS))
    }

    #[test]
    fn seal_open_roundtrip() {
        let (rolling, symmetric) = test_keys();

        let envelope = seal(&rolling, &symmetric, [0x42; IV_SIZE]);
        let recovered = open(&envelope, &symmetric).unwrap();

        assert_eq!(recovered, rolling);
    }

    #[test]
    fn ciphertext_is_padded_to_whole_blocks() {
        let (rolling, symmetric) = test_keys();

        let envelope = seal(&rolling, &symmetric, [0x00; IV_SIZE]);

        // 32-byte plaintext pads to 48 bytes under PKCS#7.
        assert_eq!(envelope.ciphertext.len(), 48);
    }

    #[test]
    fn different_ivs_produce_different_ciphertexts() {
        let (rolling, symmetric) = test_keys();

        let a = seal(&rolling, &symmetric, [0x00; IV_SIZE]);
        let b = seal(&rolling, &symmetric, [0x01; IV_SIZE]);

        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn encode_decode_roundtrip() {
        let (rolling, symmetric) = test_keys();

        let envelope = seal(&rolling, &symmetric, [0xAB; IV_SIZE]);
        let decoded = CipherEnvelope::decode(&envelope.encode()).unwrap();

        assert_eq!(decoded, envelope);
    }

    #[test]
    fn wire_string_is_iv_first() {
        let (rolling, symmetric) = test_keys();
        let iv = [0x7F; IV_SIZE];

        let envelope = seal(&rolling, &symmetric, iv);
        let raw = STANDARD.decode(envelope.encode()).unwrap();

        assert_eq!(&raw[..IV_SIZE], &iv);
        assert_eq!(&raw[IV_SIZE..], envelope.ciphertext.as_slice());
    }

    #[test]
    fn tampered_ciphertext_never_silently_matches() {
        let (rolling, symmetric) = test_keys();
        let envelope = seal(&rolling, &symmetric, [0x13; IV_SIZE]);

        for index in 0..envelope.ciphertext.len() {
            let mut tampered = envelope.clone();
            tampered.ciphertext[index] ^= 0xFF;

            match open(&tampered, &symmetric) {
                Err(EnvelopeError::InvalidPadding) => {},
                Ok(recovered) => {
                    assert_ne!(recovered, rolling, "flip at byte {index} returned the original key");
                },
                Err(other) => panic!("unexpected error for byte {index}: {other}"),
            }
        }
    }

    #[test]
    fn corrupted_iv_changes_recovered_key() {
        let (rolling, symmetric) = test_keys();
        let mut envelope = seal(&rolling, &symmetric, [0x55; IV_SIZE]);

        // IV corruption only garbles the first plaintext block, so the
        // padding stays valid and open succeeds with wrong bytes.
        envelope.iv[0] ^= 0x01;
        let recovered = open(&envelope, &symmetric).unwrap();

        assert_ne!(recovered, rolling);
    }

    #[test]
    fn wrong_symmetric_key_fails_or_differs() {
        let (rolling, symmetric) = test_keys();
        let other = derive_symmetric_key(["anchor", "bright", "create"]);

        let envelope = seal(&rolling, &symmetric, [0x99; IV_SIZE]);

        match open(&envelope, &other) {
            Err(EnvelopeError::InvalidPadding) => {},
            Ok(recovered) => assert_ne!(recovered, rolling),
            Err(err) => panic!("unexpected error: {err}"),
        }
    }

    #[test]
    fn empty_ciphertext_is_rejected() {
        let envelope = CipherEnvelope { iv: [0; IV_SIZE], ciphertext: Vec::new() };
        let (_, symmetric) = test_keys();

        assert!(matches!(
            open(&envelope, &symmetric),
            Err(EnvelopeError::MisalignedCiphertext { len: 0 })
        ));
    }

    #[test]
    fn misaligned_ciphertext_is_rejected() {
        let envelope = CipherEnvelope { iv: [0; IV_SIZE], ciphertext: vec![0u8; 17] };
        let (_, symmetric) = test_keys();

        assert!(matches!(
            open(&envelope, &symmetric),
            Err(EnvelopeError::MisalignedCiphertext { len: 17 })
        ));
    }

    #[test]
    fn non_base64_wire_string_is_rejected() {
        assert!(matches!(
            CipherEnvelope::decode("not//valid??base64!"),
            Err(EnvelopeError::InvalidEncoding { .. })
        ));
    }

    #[test]
    fn truncated_wire_string_is_rejected() {
        // 8 raw bytes: shorter than one IV.
        let short = STANDARD.encode([0u8; 8]);

        assert!(matches!(
            CipherEnvelope::decode(&short),
            Err(EnvelopeError::TruncatedEnvelope { len: 8 })
        ));
    }
}
