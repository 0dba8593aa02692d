//! Unlock attempt state machine.
//!
//! One instance handles exactly one attempt: a fail-fast word check,
//! then the encrypt/decrypt round trip over the rolling key. The round
//! trip is deliberate - a direct key comparison would mask bugs in the
//! cipher layer, while the round trip exercises IV randomness, padding
//! and derivation on every attempt.
//!
//! # State Machine
//!
//! ```text
//! ┌───────────────┐ words match ┌──────────────┐ round trip ┌─────────────┐
//! │ AwaitingInput │────────────>│ WordsChecked │───────────>│ KeyVerified │
//! └───────────────┘             └──────────────┘            └─────────────┘
//!         │ mismatch                                               │
//!         ↓                                                        ↓
//!    ┌──────────┐                                             ┌──────────┐
//!    │ Terminal │<────────────────────────────────────────────│ Terminal │
//!    └──────────┘                                             └──────────┘
//! ```
//!
//! The sender half ([`issue_envelope`]) and receiver half
//! ([`verify_envelope`]) are joined only by the base64 wire string.
//! Both halves re-derive the symmetric key independently from the
//! shared epoch; no key material crosses the seam.

use rimlock_crypto::{
    CipherEnvelope, EnvelopeError, IV_SIZE, KEY_SIZE, derive_rolling_key, derive_symmetric_key,
    keys_match, open, seal,
};
use thiserror::Error;
use tracing::{info, warn};
use zeroize::Zeroize;

use crate::{
    env::Environment,
    rotor::{SecretEpoch, rotation_window},
};

/// Why an attempt was denied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DenyReason {
    /// Supplied words differ from the current secret (order or count
    /// included). No key material was computed.
    #[error("secret words did not match")]
    WordMismatch,

    /// Envelope opened cleanly but the recovered rolling key differs
    /// from the independently recomputed one.
    #[error("rolling key mismatch")]
    KeyMismatch,

    /// Envelope was malformed or failed to open.
    #[error("envelope rejected: {0}")]
    Envelope(#[from] EnvelopeError),
}

/// Caller-visible result of one attempt.
///
/// This is the entire surface: verification-layer failures are fully
/// recovered into `AntiTheft`, never raised as errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlockOutcome {
    /// Attempt verified; grant motive power.
    Unlocked,
    /// Attempt denied; escalate to the anti-theft controller.
    AntiTheft(DenyReason),
}

/// Protocol state, observable for diagnostics and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolState {
    /// No attempt processed yet
    AwaitingInput,
    /// Word check passed; key round trip pending
    WordsChecked,
    /// Key round trip finished
    KeyVerified {
        /// Whether the recovered rolling key matched
        unlocked: bool,
    },
    /// Attempt concluded; further calls observe the stored outcome
    Terminal {
        /// The concluded outcome
        outcome: UnlockOutcome,
    },
}

/// Sender half: derive, seal and encode one fresh envelope.
///
/// Draws a fresh 16-byte IV from the environment; this is the only
/// randomness in an unlock attempt. Intermediate keys are zeroized
/// before returning.
pub fn issue_envelope<E: Environment>(env: &E, epoch: &SecretEpoch, counter: u64) -> String {
    let words = epoch.word_refs();
    let mut rolling = derive_rolling_key(words, counter);
    let mut symmetric = derive_symmetric_key(words);

    let mut iv = [0u8; IV_SIZE];
    env.random_bytes(&mut iv);

    let wire = seal(&rolling, &symmetric, iv).encode();
    rolling.zeroize();
    symmetric.zeroize();
    wire
}

/// Receiver half: decode, open and compare against the re-derived
/// rolling key.
///
/// Re-derives both keys independently of the sender - this models the
/// bike side of the exchange, which shares only the epoch and the wire
/// string. The final comparison is constant-time.
///
/// # Errors
///
/// Every failure maps to a [`DenyReason`]; none escapes as a crash.
pub fn verify_envelope(epoch: &SecretEpoch, counter: u64, wire: &str) -> Result<(), DenyReason> {
    let words = epoch.word_refs();
    let mut symmetric = derive_symmetric_key(words);
    let envelope = CipherEnvelope::decode(wire)?;

    let opened = open(&envelope, &symmetric);
    symmetric.zeroize();
    let mut recovered = opened?;

    let mut expected = derive_rolling_key(words, counter);
    let matched = recovered.len() == KEY_SIZE && {
        let mut candidate = [0u8; KEY_SIZE];
        candidate.copy_from_slice(&recovered);
        let matched = keys_match(&candidate, &expected);
        candidate.zeroize();
        matched
    };
    recovered.zeroize();
    expected.zeroize();

    if matched { Ok(()) } else { Err(DenyReason::KeyMismatch) }
}

/// One unlock attempt against the current secret epoch.
pub struct UnlockProtocol<'a, E> {
    env: &'a E,
    epoch: &'a SecretEpoch,
    state: ProtocolState,
}

impl<'a, E: Environment> UnlockProtocol<'a, E> {
    /// New attempt in `AwaitingInput`.
    pub fn new(env: &'a E, epoch: &'a SecretEpoch) -> Self {
        Self { env, epoch, state: ProtocolState::AwaitingInput }
    }

    /// Current protocol state.
    pub fn state(&self) -> &ProtocolState {
        &self.state
    }

    /// Run the attempt to its terminal outcome.
    ///
    /// A word mismatch fails fast: no key is derived, no IV is drawn,
    /// nothing about the key material is exposed. On a word match the
    /// full round trip runs inside the current rotation window.
    ///
    /// Calling again after the attempt concluded returns the stored
    /// outcome without re-running anything.
    pub fn verify(&mut self, attempt: &[String]) -> UnlockOutcome {
        if let ProtocolState::Terminal { outcome } = &self.state {
            return outcome.clone();
        }

        if !self.epoch.matches(attempt) {
            warn!("unlock denied: word mismatch");
            return self.conclude(UnlockOutcome::AntiTheft(DenyReason::WordMismatch));
        }
        self.state = ProtocolState::WordsChecked;

        let counter = rotation_window(self.env.wall_clock_secs());
        let wire = issue_envelope(self.env, self.epoch, counter);

        match verify_envelope(self.epoch, counter, &wire) {
            Ok(()) => {
                self.state = ProtocolState::KeyVerified { unlocked: true };
                info!(window = counter, "unlock granted");
                self.conclude(UnlockOutcome::Unlocked)
            },
            Err(reason) => {
                self.state = ProtocolState::KeyVerified { unlocked: false };
                warn!(window = counter, %reason, "unlock denied");
                self.conclude(UnlockOutcome::AntiTheft(reason))
            },
        }
    }

    fn conclude(&mut self, outcome: UnlockOutcome) -> UnlockOutcome {
        self.state = ProtocolState::Terminal { outcome: outcome.clone() };
        outcome
    }
}
