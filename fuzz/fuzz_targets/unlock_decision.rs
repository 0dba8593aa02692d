//! Fuzz target for the unlock decision path
//!
//! # Strategy
//!
//! - Arbitrary word attempts against a fixed epoch
//! - Arbitrary wire strings through the receiver half
//!
//! # Invariants
//!
//! - The protocol only ever concludes Unlocked or AntiTheft
//! - An attempt unlocks if and only if it equals the epoch's words
//! - The receiver half never panics on attacker-controlled wire input

#![no_main]

use std::time::Duration;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rimlock_core::{Environment, SecretEpoch, UnlockOutcome, UnlockProtocol, verify_envelope};

#[derive(Debug, Arbitrary)]
struct DecisionInput {
    attempt: Vec<String>,
    wire: String,
    counter: u64,
    now_secs: u64,
}

#[derive(Clone)]
struct FuzzEnv {
    now_secs: u64,
}

impl Environment for FuzzEnv {
    fn wall_clock_secs(&self) -> u64 {
        self.now_secs
    }

    fn sleep(&self, _duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        async {}
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        buffer.fill(0x5A);
    }
}

fuzz_target!(|input: DecisionInput| {
    let words = ["breeze", "kernel", "sprint"].map(str::to_string);
    let epoch = SecretEpoch::new(words.clone(), input.counter);
    let env = FuzzEnv { now_secs: input.now_secs };

    let outcome = UnlockProtocol::new(&env, &epoch).verify(&input.attempt);
    let should_unlock = input.attempt == words;

    match outcome {
        UnlockOutcome::Unlocked => assert!(should_unlock, "wrong words unlocked"),
        UnlockOutcome::AntiTheft(_) => assert!(!should_unlock, "right words denied"),
    }

    // Receiver half on raw attacker input: must conclude, never crash.
    let _ = verify_envelope(&epoch, input.counter, &input.wire);
});
