//! Keepalive Monitor
//!
//! Detects silently-dead stream connections through periodic ping probes.
//! A probe is sent every `ping_interval`; the connection is declared dead
//! when the acknowledgment for a probe has not arrived within
//! `pong_timeout` of the most recent probe.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::{DEFAULT_PING_INTERVAL, DEFAULT_PONG_TIMEOUT};

/// Configuration for keepalive behavior.
#[derive(Debug, Clone)]
pub struct KeepaliveConfig {
    /// Interval between ping probes.
    pub ping_interval: Duration,
    /// Wait for a pong after a probe before the connection is considered dead.
    pub pong_timeout: Duration,
}

impl Default for KeepaliveConfig {
    fn default() -> Self {
        Self {
            ping_interval: DEFAULT_PING_INTERVAL,
            pong_timeout: DEFAULT_PONG_TIMEOUT,
        }
    }
}

impl KeepaliveConfig {
    /// Create a configuration with custom values.
    #[must_use]
    pub const fn new(ping_interval: Duration, pong_timeout: Duration) -> Self {
        Self {
            ping_interval,
            pong_timeout,
        }
    }
}

/// Events emitted by the keepalive monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepaliveEvent {
    /// A ping probe should be sent on the transport.
    SendPing,
    /// The connection missed its acknowledgment window and must be torn down.
    Timeout,
}

/// Liveness state shared between the monitor and the read loop.
///
/// The read loop records pongs as they arrive; the session marks probes as
/// they are actually written to the transport.
#[derive(Debug)]
pub struct KeepaliveState {
    last_probe: RwLock<Instant>,
    awaiting_pong: AtomicBool,
}

impl Default for KeepaliveState {
    fn default() -> Self {
        Self::new()
    }
}

impl KeepaliveState {
    /// Create fresh liveness state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_probe: RwLock::new(Instant::now()),
            awaiting_pong: AtomicBool::new(false),
        }
    }

    /// Record that a probe was just written to the transport.
    pub fn mark_probe_sent(&self) {
        *self.last_probe.write() = Instant::now();
        self.awaiting_pong.store(true, Ordering::SeqCst);
    }

    /// Record that an acknowledgment arrived.
    pub fn record_pong(&self) {
        self.awaiting_pong.store(false, Ordering::SeqCst);
    }

    /// Whether a probe is still waiting for its acknowledgment.
    #[must_use]
    pub fn is_awaiting_pong(&self) -> bool {
        self.awaiting_pong.load(Ordering::SeqCst)
    }

    /// Time elapsed since the most recent probe.
    #[must_use]
    pub fn time_since_probe(&self) -> Duration {
        self.last_probe.read().elapsed()
    }

    /// Reset for a new connection.
    pub fn reset(&self) {
        *self.last_probe.write() = Instant::now();
        self.awaiting_pong.store(false, Ordering::SeqCst);
    }
}

/// Background task that drives the probe schedule and watches for timeouts.
///
/// The monitor never touches the transport itself; it asks the session to
/// send probes via [`KeepaliveEvent::SendPing`] and reports a dead
/// connection via [`KeepaliveEvent::Timeout`], after which it exits.
pub struct KeepaliveMonitor {
    config: KeepaliveConfig,
    state: Arc<KeepaliveState>,
    event_tx: mpsc::Sender<KeepaliveEvent>,
    cancel: CancellationToken,
}

impl KeepaliveMonitor {
    /// Create a new monitor.
    #[must_use]
    pub const fn new(
        config: KeepaliveConfig,
        state: Arc<KeepaliveState>,
        event_tx: mpsc::Sender<KeepaliveEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            state,
            event_tx,
            cancel,
        }
    }

    /// Run until cancelled or a timeout is detected.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.config.ping_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => {
                    tracing::debug!("keepalive monitor cancelled");
                    return;
                }
                _ = ticker.tick() => {
                    if self.tick().await.is_err() {
                        return;
                    }
                }
            }
        }
    }

    /// One scheduling step: timeout check first, then the next probe.
    async fn tick(&self) -> Result<(), ()> {
        if self.state.is_awaiting_pong() {
            let since_probe = self.state.time_since_probe();
            if since_probe > self.config.pong_timeout {
                tracing::warn!(
                    since_probe_ms = since_probe.as_millis(),
                    timeout_ms = self.config.pong_timeout.as_millis(),
                    "keepalive timeout, connection considered dead"
                );
                let _ = self.event_tx.send(KeepaliveEvent::Timeout).await;
                return Err(());
            }
        }

        if self.event_tx.send(KeepaliveEvent::SendPing).await.is_err() {
            tracing::debug!("keepalive event channel closed");
            return Err(());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_service_defaults() {
        let config = KeepaliveConfig::default();
        assert_eq!(config.ping_interval, Duration::from_secs(30));
        assert_eq!(config.pong_timeout, Duration::from_secs(60));
    }

    #[test]
    fn probe_and_pong_cycle() {
        let state = KeepaliveState::new();
        assert!(!state.is_awaiting_pong());

        state.mark_probe_sent();
        assert!(state.is_awaiting_pong());

        state.record_pong();
        assert!(!state.is_awaiting_pong());
    }

    #[test]
    fn reset_clears_pending_probe() {
        let state = KeepaliveState::new();
        state.mark_probe_sent();
        state.reset();
        assert!(!state.is_awaiting_pong());
        assert!(state.time_since_probe() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn monitor_requests_probes() {
        let state = Arc::new(KeepaliveState::new());
        let (event_tx, mut event_rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();
        let monitor = KeepaliveMonitor::new(
            KeepaliveConfig::new(Duration::from_millis(20), Duration::from_secs(1)),
            state,
            event_tx,
            cancel.clone(),
        );
        let handle = tokio::spawn(monitor.run());

        let event = tokio::time::timeout(Duration::from_millis(500), event_rx.recv())
            .await
            .expect("monitor should emit an event")
            .expect("channel should stay open");
        assert_eq!(event, KeepaliveEvent::SendPing);

        cancel.cancel();
        handle.await.expect("monitor task should finish");
    }

    #[tokio::test]
    async fn monitor_detects_missed_pong() {
        let state = Arc::new(KeepaliveState::new());
        let (event_tx, mut event_rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();
        let monitor = KeepaliveMonitor::new(
            KeepaliveConfig::new(Duration::from_millis(20), Duration::from_millis(40)),
            state.clone(),
            event_tx,
            cancel.clone(),
        );

        // a probe went out and its acknowledgment window has already passed
        state.mark_probe_sent();
        *state.last_probe.write() = Instant::now()
            .checked_sub(Duration::from_millis(200))
            .unwrap();

        let handle = tokio::spawn(monitor.run());

        let mut timed_out = false;
        while let Ok(Some(event)) =
            tokio::time::timeout(Duration::from_millis(500), event_rx.recv()).await
        {
            if event == KeepaliveEvent::Timeout {
                timed_out = true;
                break;
            }
        }
        assert!(timed_out, "expected a Timeout event");

        cancel.cancel();
        let _ = tokio::time::timeout(Duration::from_millis(200), handle).await;
    }

    #[tokio::test]
    async fn monitor_stops_on_cancellation() {
        let state = Arc::new(KeepaliveState::new());
        let (event_tx, _event_rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();
        let monitor = KeepaliveMonitor::new(
            KeepaliveConfig::new(Duration::from_secs(30), Duration::from_secs(60)),
            state,
            event_tx,
            cancel.clone(),
        );

        let handle = tokio::spawn(monitor.run());
        cancel.cancel();

        let result = tokio::time::timeout(Duration::from_millis(200), handle).await;
        assert!(result.is_ok(), "monitor should exit promptly when cancelled");
    }
}
