//! Anti-theft escalation state machine.
//!
//! Entered on any unlock failure. Immobilizes the bike first, then
//! makes a best-effort remote report, falling back to an autonomous
//! local lockdown when the network is unreachable or shutdown is
//! requested mid-escalation.
//!
//! # State Machine
//!
//! ```text
//! ┌──────┐ escalate ┌──────────┐ alert sent  ┌──────────┐
//! │ Idle │─────────>│ Alerting │────────────>│ Reported │
//! └──────┘          └──────────┘             └──────────┘
//!                        │
//!                        │ offline / alert failed / shutdown
//!                        ↓
//!               ┌───────────────┐
//!               │ LocalLockdown │
//!               └───────────────┘
//! ```
//!
//! `Reported` and `LocalLockdown` are terminal; re-arming is an
//! out-of-scope administrative action.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::{env::Environment, error::TransportError};

/// Upper bound on the connectivity probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Wait before autonomous lockdown when no network is available.
pub const GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Reachability check against a known external endpoint.
///
/// Failure to reach within the timeout means "unavailable", never an
/// error - the controller only ever branches on the boolean.
pub trait ConnectivityProbe: Send {
    /// True if the alert channel is reachable within `timeout`.
    fn is_available(&mut self, timeout: Duration) -> impl std::future::Future<Output = bool> + Send;
}

/// Remote theft alert delivery.
///
/// Fire-and-forget: the controller never retries; a failure is logged
/// and overridden by the local lockdown fallback.
pub trait AlertTransport: Send {
    /// Deliver one theft alert.
    fn send_theft_alert(
        &mut self,
    ) -> impl std::future::Future<Output = Result<(), TransportError>> + Send;
}

/// Motive-power cutoff commands.
///
/// Both commands are idempotent "deny further motive power" actions
/// and must complete synchronously before any network activity.
pub trait Immobilizer: Send {
    /// Cut throttle input.
    fn disable_throttle(&mut self);
    /// Engage the braking lock.
    fn engage_brake_lock(&mut self);
}

/// Escalation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationState {
    /// Armed, nothing detected
    Idle,
    /// Immobilized; report in progress
    Alerting,
    /// Theft alert delivered (terminal)
    Reported,
    /// Autonomous fail-safe lock, no network dependency (terminal)
    LocalLockdown,
}

impl EscalationState {
    /// True for the two terminal states.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Reported | Self::LocalLockdown)
    }
}

/// Drives the escalation sequence over its three collaborators.
#[derive(Debug)]
pub struct AntiTheftController<P, T, M> {
    probe: P,
    transport: T,
    immobilizer: M,
    state: EscalationState,
}

impl<P, T, M> AntiTheftController<P, T, M>
where
    P: ConnectivityProbe,
    T: AlertTransport,
    M: Immobilizer,
{
    /// Idle controller over the given collaborators.
    pub fn new(probe: P, transport: T, immobilizer: M) -> Self {
        Self { probe, transport, immobilizer, state: EscalationState::Idle }
    }

    /// Current state.
    pub fn state(&self) -> EscalationState {
        self.state
    }

    /// Run the escalation sequence to a terminal state.
    ///
    /// Immobilization happens first and unconditionally. Every await
    /// point afterwards races the shutdown signal; cancellation
    /// resolves to `LocalLockdown`, never an ambiguous state.
    ///
    /// Calling on a terminal controller returns the terminal state
    /// without side effects.
    pub async fn escalate<E: Environment>(
        &mut self,
        env: &E,
        shutdown: &mut watch::Receiver<bool>,
    ) -> EscalationState {
        if self.state.is_terminal() {
            return self.state;
        }
        self.state = EscalationState::Alerting;

        warn!("unauthorized access detected, immobilizing");
        self.immobilizer.disable_throttle();
        self.immobilizer.engage_brake_lock();

        let available = tokio::select! {
            () = shutdown_signal(shutdown) => {
                warn!("shutdown during connectivity probe, failing safe");
                self.state = EscalationState::LocalLockdown;
                return self.state;
            }
            available = self.probe.is_available(PROBE_TIMEOUT) => available,
        };

        if available {
            match self.transport.send_theft_alert().await {
                Ok(()) => {
                    info!("theft alert delivered");
                    self.state = EscalationState::Reported;
                },
                Err(err) => {
                    // Alert failure must not leave the bike merely
                    // "reported" - fall through to the local lock.
                    warn!(%err, "alert delivery failed, failing safe");
                    self.state = EscalationState::LocalLockdown;
                },
            }
        } else {
            info!(grace_secs = GRACE_PERIOD.as_secs(), "no connectivity, local lockdown pending");
            tokio::select! {
                () = shutdown_signal(shutdown) => {
                    warn!("shutdown during grace period");
                }
                () = env.sleep(GRACE_PERIOD) => {}
            }
            self.state = EscalationState::LocalLockdown;
        }

        self.state
    }
}

/// Resolves once shutdown is requested; never resolves if the sender
/// is dropped without signalling.
async fn shutdown_signal(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
