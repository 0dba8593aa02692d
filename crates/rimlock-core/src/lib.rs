//! Rimlock Protocol Core
//!
//! Authentication and escalation logic for the Rimlock bike unlock
//! system. The crate is organized leaf-first:
//!
//! - [`words`]: static catalogue of candidate secret words
//! - [`rotor`]: rotation windows and the current 3-word secret epoch
//! - [`protocol`]: the unlock attempt state machine (word check plus
//!   the encrypt/decrypt round trip over the rolling key)
//! - [`antitheft`]: the fail-safe escalation state machine entered on
//!   any verification failure
//! - [`env`]: injectable time and randomness, so every state machine
//!   runs deterministically under test
//!
//! Protocol logic is pure and synchronous; the only async code is the
//! escalation seam, where the connectivity probe and the grace-period
//! wait are bounded, cancellable awaits.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod antitheft;
pub mod env;
pub mod error;
pub mod protocol;
pub mod rotor;
pub mod words;

pub use antitheft::{
    AlertTransport, AntiTheftController, ConnectivityProbe, EscalationState, GRACE_PERIOD,
    Immobilizer, PROBE_TIMEOUT,
};
pub use env::Environment;
pub use error::{RotationError, TransportError};
pub use protocol::{
    DenyReason, ProtocolState, UnlockOutcome, UnlockProtocol, issue_envelope, verify_envelope,
};
pub use rotor::{ROTATION_PERIOD_SECS, SecretEpoch, SecretRotator, rotation_window};
pub use words::WordPool;
