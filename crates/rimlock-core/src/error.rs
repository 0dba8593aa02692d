//! Error types for the Rimlock protocol core.
//!
//! Verification failures are not errors here: the unlock protocol
//! folds them into its outcome type so callers only ever observe
//! "unlocked" or "anti-theft". These types cover the two conditions
//! that do escape: a misconfigured word pool (fatal at startup) and a
//! failed alert delivery (logged, then overridden by local lockdown).

use thiserror::Error;

/// Errors from secret rotation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RotationError {
    /// The pool cannot yield 3 distinct words. Misconfiguration:
    /// startup must halt rather than degrade silently.
    #[error("word pool exhausted: need 3 distinct words, have {distinct}")]
    PoolExhausted {
        /// Number of distinct words actually available
        distinct: usize,
    },
}

/// Theft alert delivery failed.
///
/// Fire-and-forget from the controller's perspective: no retry, but
/// the failure is reported upward and the controller falls through to
/// the local lockdown path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("theft alert delivery failed: {reason}")]
pub struct TransportError {
    /// Transport's description of the failure
    pub reason: String,
}

impl TransportError {
    /// Convenience constructor.
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}
