//! Reconnect supervisor.
//!
//! The client keeps exactly one live logical connection: whenever the
//! current one is lost, the supervisor opens a replacement. The default
//! [`ReconnectPolicy`] is the game's original behavior — retry
//! immediately, forever, no backoff — which suits the trusted LAN-style
//! deployments the server targets (a vanished server just means silent
//! retry until it comes back). Interval, jitter and attempt budget are
//! configurable so deployments and tests can inject deterministic
//! timing.
//!
//! Every attempt and every delay consults a `watch`-based shutdown
//! signal, so a frontend can stop the cycle cleanly.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;

use crate::controller::SessionController;
use crate::net_client::NetClient;
use crate::transport::TransportError;

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Retry policy for the connect/lose/re-establish cycle.
#[derive(Debug, Clone, Copy)]
pub struct ReconnectPolicy {
    /// Pause between consecutive connection attempts.
    pub delay: Duration,
    /// Upper bound of a uniformly random extra pause added to `delay`.
    pub jitter: Duration,
    /// Consecutive failed attempts tolerated before giving up.
    /// `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    /// Immediate retry, forever — the original client policy.
    fn default() -> Self {
        Self {
            delay: Duration::ZERO,
            jitter: Duration::ZERO,
            max_attempts: None,
        }
    }
}

impl ReconnectPolicy {
    fn next_delay(&self) -> Duration {
        use rand::RngExt;

        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.delay;
        }
        let mut rng = rand::rng();
        self.delay + Duration::from_millis(rng.random_range(0..=jitter_ms))
    }
}

/// The configured attempt budget ran out without a single connection.
#[derive(Debug, Error)]
#[error("giving up after {attempts} consecutive failed connection attempts")]
pub struct RetriesExhausted {
    pub attempts: u32,
}

// ---------------------------------------------------------------------------
// Connector seam
// ---------------------------------------------------------------------------

/// Opens one fresh connection per call.
///
/// Production uses [`WsConnector`]; tests script outcomes to drive the
/// supervisor deterministically.
pub trait Connector {
    fn connect(&mut self) -> impl Future<Output = Result<NetClient, TransportError>> + Send;
}

/// Connects to a fixed WebSocket URL.
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Connector for WsConnector {
    async fn connect(&mut self) -> Result<NetClient, TransportError> {
        NetClient::connect_ws(&self.url).await
    }
}

// ---------------------------------------------------------------------------
// Reconnector
// ---------------------------------------------------------------------------

/// Hands out one established session per call to
/// [`next_session`](Reconnector::next_session).
///
/// The caller drives the loop: serve a session until it disconnects, then
/// ask for the next one. Each connection loss therefore triggers exactly
/// one reconnect cycle — no attempt skipped, none duplicated.
pub struct Reconnector<C> {
    connector: C,
    policy: ReconnectPolicy,
    shutdown: watch::Receiver<bool>,
    /// Consecutive failed attempts; resets once a connection lands.
    failures: u32,
}

impl Reconnector<WsConnector> {
    /// Supervisor for a fixed WebSocket URL.
    pub fn to_url(
        url: impl Into<String>,
        policy: ReconnectPolicy,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self::new(WsConnector::new(url), policy, shutdown)
    }
}

impl<C: Connector> Reconnector<C> {
    pub fn new(connector: C, policy: ReconnectPolicy, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            connector,
            policy,
            shutdown,
            failures: 0,
        }
    }

    /// Establish the next session, applying the retry policy between
    /// failed attempts.
    ///
    /// Returns `Ok(None)` once shutdown has been signalled, and
    /// [`RetriesExhausted`] when the attempt budget runs out. The first
    /// attempt of every cycle is immediate; the policy delay applies
    /// only between attempts within a cycle.
    pub async fn next_session(&mut self) -> Result<Option<SessionController>, RetriesExhausted> {
        let mut first_attempt = true;
        loop {
            if *self.shutdown.borrow() {
                tracing::info!("shutdown signalled, not reconnecting");
                return Ok(None);
            }
            if let Some(max) = self.policy.max_attempts
                && self.failures >= max
            {
                return Err(RetriesExhausted {
                    attempts: self.failures,
                });
            }
            if !first_attempt && !self.wait_out_delay().await {
                return Ok(None);
            }
            first_attempt = false;

            match self.connector.connect().await {
                Ok(net) => {
                    self.failures = 0;
                    tracing::info!("connected to the quiz server");
                    return Ok(Some(SessionController::new(net)));
                }
                Err(err) => {
                    self.failures += 1;
                    tracing::info!(
                        error = %err,
                        failures = self.failures,
                        "connection attempt failed"
                    );
                }
            }
        }
    }

    /// Sleep out the policy delay. Returns `false` if shutdown was
    /// signalled while waiting.
    async fn wait_out_delay(&mut self) -> bool {
        let delay = self.policy.next_delay();
        if delay.is_zero() {
            return !*self.shutdown.borrow();
        }
        tokio::select! {
            _ = tokio::time::sleep(delay) => true,
            _ = shutdown_signalled(&mut self.shutdown) => false,
        }
    }
}

async fn shutdown_signalled(rx: &mut watch::Receiver<bool>) {
    // A dropped sender means shutdown can never arrive; park forever and
    // let the other select branch win.
    if rx.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Scripted connect outcomes; anything past the script succeeds.
    struct ScriptedConnector {
        outcomes: VecDeque<Result<(), &'static str>>,
        calls: Arc<AtomicU32>,
    }

    impl ScriptedConnector {
        fn new(outcomes: Vec<Result<(), &'static str>>) -> (Self, Arc<AtomicU32>) {
            let calls = Arc::new(AtomicU32::new(0));
            (
                Self {
                    outcomes: outcomes.into(),
                    calls: Arc::clone(&calls),
                },
                calls,
            )
        }
    }

    impl Connector for ScriptedConnector {
        async fn connect(&mut self) -> Result<NetClient, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.outcomes.pop_front() {
                Some(Err(reason)) => Err(TransportError::Io(reason.to_string())),
                Some(Ok(())) | None => {
                    let (transport, _server) = MockTransport::pair();
                    Ok(NetClient::from_transport(transport))
                }
            }
        }
    }

    /// A receiver whose sender is gone: shutdown can never be signalled.
    fn no_shutdown() -> watch::Receiver<bool> {
        watch::channel(false).1
    }

    #[tokio::test]
    async fn exactly_one_connect_attempt_per_close() {
        let (connector, calls) = ScriptedConnector::new(vec![]);
        let mut reconnector =
            Reconnector::new(connector, ReconnectPolicy::default(), no_shutdown());

        // Five closes in a row: the caller comes back for the next
        // session after each one.
        for close in 1..=5u32 {
            let session = reconnector.next_session().await.unwrap();
            assert!(session.is_some());
            assert_eq!(calls.load(Ordering::SeqCst), close);
        }
    }

    #[tokio::test]
    async fn failed_attempts_retry_until_success() {
        let (connector, calls) = ScriptedConnector::new(vec![Err("refused"), Err("refused")]);
        let mut reconnector =
            Reconnector::new(connector, ReconnectPolicy::default(), no_shutdown());

        let session = reconnector.next_session().await.unwrap();
        assert!(session.is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn attempt_budget_is_enforced() {
        let (connector, calls) =
            ScriptedConnector::new(vec![Err("down"), Err("down"), Err("down"), Err("down")]);
        let policy = ReconnectPolicy {
            max_attempts: Some(3),
            ..ReconnectPolicy::default()
        };
        let mut reconnector = Reconnector::new(connector, policy, no_shutdown());

        let err = reconnector.next_session().await.unwrap_err();
        assert_eq!(err.attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn failure_counter_resets_after_a_successful_connect() {
        let (connector, calls) =
            ScriptedConnector::new(vec![Err("down"), Ok(()), Err("down"), Err("down")]);
        let policy = ReconnectPolicy {
            max_attempts: Some(2),
            ..ReconnectPolicy::default()
        };
        let mut reconnector = Reconnector::new(connector, policy, no_shutdown());

        // One failure, then success — under budget.
        assert!(reconnector.next_session().await.unwrap().is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // The next cycle starts from a clean slate and gets its full
        // budget of two attempts before giving up.
        let err = reconnector.next_session().await.unwrap_err();
        assert_eq!(err.attempts, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn shutdown_before_the_cycle_makes_no_attempts() {
        let (connector, calls) = ScriptedConnector::new(vec![]);
        let (tx, rx) = watch::channel(true);
        let mut reconnector = Reconnector::new(connector, ReconnectPolicy::default(), rx);

        assert!(reconnector.next_session().await.unwrap().is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn delay_applies_between_attempts_but_not_before_the_first() {
        let (connector, _calls) = ScriptedConnector::new(vec![Err("down")]);
        let policy = ReconnectPolicy {
            delay: Duration::from_millis(250),
            ..ReconnectPolicy::default()
        };
        let mut reconnector = Reconnector::new(connector, policy, no_shutdown());

        let started = tokio::time::Instant::now();
        assert!(reconnector.next_session().await.unwrap().is_some());
        // One failure, one delay, one success.
        assert_eq!(started.elapsed(), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_interrupts_the_retry_delay() {
        let (connector, calls) = ScriptedConnector::new(vec![Err("down"), Err("down")]);
        let policy = ReconnectPolicy {
            delay: Duration::from_secs(3600),
            ..ReconnectPolicy::default()
        };
        let (tx, rx) = watch::channel(false);
        let mut reconnector = Reconnector::new(connector, policy, rx);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let _ = tx.send(true);
        });

        assert!(reconnector.next_session().await.unwrap().is_none());
        // Only the immediate first attempt ran; the hour-long delay was
        // cut short by shutdown.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
