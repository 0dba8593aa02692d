//! Production collaborators: TCP reachability probe and demo alert
//! transport / immobilizer.

use std::time::Duration;

use rimlock_core::{AlertTransport, ConnectivityProbe, Immobilizer, TransportError};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

/// Reachability probe that opens a TCP connection to a well-known
/// endpoint.
///
/// Any failure - refused, unreachable, or the timeout elapsing - is
/// "unavailable", never an error.
pub struct TcpProbe {
    addr: String,
}

impl TcpProbe {
    /// Probe against `addr` (`host:port`).
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }
}

impl ConnectivityProbe for TcpProbe {
    fn is_available(&mut self, timeout: Duration) -> impl std::future::Future<Output = bool> + Send {
        let addr = self.addr.clone();
        async move {
            let reachable =
                matches!(tokio::time::timeout(timeout, TcpStream::connect(&addr)).await, Ok(Ok(_)));
            debug!(%addr, reachable, "connectivity probe");
            reachable
        }
    }
}

/// Demo alert transport: reports delivery through the log stream.
///
/// A production build would hand the alert to a mobile push channel;
/// the controller's contract is the same either way.
#[derive(Default)]
pub struct LoggedAlertTransport;

impl AlertTransport for LoggedAlertTransport {
    fn send_theft_alert(
        &mut self,
    ) -> impl std::future::Future<Output = Result<(), TransportError>> + Send {
        async {
            info!("sending theft alert to the owner's app");
            Ok(())
        }
    }
}

/// Demo immobilizer: reports the motor cutoff through the log stream.
#[derive(Default)]
pub struct LoggedImmobilizer;

impl Immobilizer for LoggedImmobilizer {
    fn disable_throttle(&mut self) {
        warn!("throttle disabled");
    }

    fn engage_brake_lock(&mut self) {
        warn!("regenerative braking locked");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_endpoint_is_unavailable() {
        // Reserved TEST-NET-1 address; nothing listens there.
        let mut probe = TcpProbe::new("192.0.2.1:9");

        assert!(!probe.is_available(Duration::from_millis(100)).await);
    }

    #[tokio::test]
    async fn reachable_endpoint_is_available() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let mut probe = TcpProbe::new(addr.to_string());

        assert!(probe.is_available(Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn logged_transport_reports_success() {
        let mut transport = LoggedAlertTransport;
        assert!(transport.send_theft_alert().await.is_ok());
    }
}
