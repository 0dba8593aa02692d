//! Rimlock demo binary.
//!
//! Rotates a fresh 3-word secret, prompts for an unlock attempt, and
//! on failure drives the anti-theft escalation with a real network
//! probe.
//!
//! # Usage
//!
//! ```bash
//! # Interactive demo with the built-in word pool
//! rimlock
//!
//! # Custom pool and probe endpoint
//! rimlock --words-file pool.txt --probe-addr example.com:443
//! ```

// Interactive demo: the operator dialogue runs on stdout, everything
// else goes through tracing.
#![allow(clippy::print_stdout)]

mod net;
mod system_env;

use std::{io::Write as _, path::PathBuf};

use clap::Parser;
use rimlock_core::{
    AntiTheftController, Environment, ROTATION_PERIOD_SECS, SecretRotator, UnlockOutcome,
    UnlockProtocol, WordPool, rotation_window,
};
use rimlock_crypto::{derive_rolling_key, derive_symmetric_key};
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    net::{LoggedAlertTransport, LoggedImmobilizer, TcpProbe},
    system_env::SystemEnv,
};

/// Rimlock bike unlock demo
#[derive(Parser, Debug)]
#[command(name = "rimlock")]
#[command(about = "Rolling-key bike unlock with anti-theft escalation")]
#[command(version)]
struct Args {
    /// Newline-separated word pool (defaults to the built-in catalogue)
    #[arg(long)]
    words_file: Option<PathBuf>,

    /// Endpoint for the connectivity probe (host:port)
    #[arg(long, default_value = "www.google.com:443")]
    probe_addr: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Trace raw derived key material at debug level.
    ///
    /// Leaks secrets into the log stream; never enable outside of
    /// protocol debugging.
    #[arg(long)]
    debug_trace_keys: bool,
}

fn load_pool(args: &Args) -> Result<WordPool, std::io::Error> {
    let Some(path) = &args.words_file else {
        return Ok(WordPool::builtin());
    };

    let text = std::fs::read_to_string(path)?;
    let words = text.lines().map(|line| line.trim().to_lowercase()).filter(|w| !w.is_empty());
    Ok(WordPool::new(words.collect()))
}

fn read_attempt() -> Result<Vec<String>, std::io::Error> {
    print!("Enter your 3 secret words (space-separated): ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.split_whitespace().map(str::to_lowercase).collect())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let env = SystemEnv::new();
    let pool = load_pool(&args)?;
    let mut rotor = SecretRotator::new(env.clone(), pool);

    // PoolExhausted is the one error allowed to halt startup.
    let epoch = rotor.rotate()?.clone();

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    println!("Rimlock anti-theft demo");
    println!("Your current secret words: {}", epoch.words().join(" "));
    println!("These words expire in {ROTATION_PERIOD_SECS} seconds.");
    println!();

    if args.debug_trace_keys {
        let window = rotation_window(env.wall_clock_secs());
        tracing::debug!(
            window,
            symmetric_key = %hex::encode(derive_symmetric_key(epoch.word_refs())),
            rolling_key = %hex::encode(derive_rolling_key(epoch.word_refs(), window)),
            "derived key material (debug trace enabled)"
        );
    }

    let attempt = tokio::task::spawn_blocking(read_attempt).await??;

    let outcome = UnlockProtocol::new(&env, &epoch).verify(&attempt);
    match outcome {
        UnlockOutcome::Unlocked => {
            println!("Unlocked. Ride safe.");
        },
        UnlockOutcome::AntiTheft(reason) => {
            println!("Unlock denied ({reason}); anti-theft engaged.");

            let mut controller = AntiTheftController::new(
                TcpProbe::new(args.probe_addr.clone()),
                LoggedAlertTransport,
                LoggedImmobilizer,
            );
            let state = controller.escalate(&env, &mut shutdown_rx).await;
            println!("Anti-theft terminal state: {state:?}");
        },
    }

    Ok(())
}
