//! Rolling-key primitives: derivation, envelope sealing, wire codec.

mod derivation;
mod envelope;
mod error;

pub use derivation::{KEY_SIZE, derive_rolling_key, derive_symmetric_key, keys_match};
pub use envelope::{CipherEnvelope, IV_SIZE, open, seal};
pub use error::EnvelopeError;
