//! Stream Session
//!
//! Owns one logical report subscription: a signed WebSocket handshake, a
//! read loop that hands frames to the caller in arrival order, keepalive
//! probing, and bounded reconnection.
//!
//! # Lifecycle
//!
//! ```text
//! Disconnected -> Connecting -> Connected -> Closing -> Disconnected
//!                     ^             |
//!                     +-- liveness -+   (while the reconnect budget lasts)
//! ```
//!
//! Reports are delivered through a bounded channel: when the receiver lags,
//! the read loop blocks on the send, so backpressure propagates to the
//! transport instead of queueing without bound. Delivery is at-least-once
//! across reconnects; the service may replay reports the caller already
//! saw, and deduplication by feed/timestamp is the caller's concern.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::handshake::client::generate_key;
use tokio_tungstenite::tungstenite::http::Request;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use crate::auth::{RequestSigner, SystemClock};
use crate::config::{Credentials, StreamsConfig};
use crate::keepalive::{KeepaliveConfig, KeepaliveEvent, KeepaliveMonitor, KeepaliveState};
use crate::messages::{ReportResponse, StreamFrame};
use crate::reconnect::{ReconnectConfig, ReconnectPolicy};
use crate::report::{self, ReportError};
use crate::tls;

/// WebSocket subscription path.
pub const WS_PATH: &str = "/api/v1/ws";

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsSource = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

// =============================================================================
// Error Type
// =============================================================================

/// Errors that can terminate a stream session.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// No feed ids were supplied for the subscription.
    #[error("no feed ids provided for subscription")]
    EmptySubscription,

    /// A feed id failed validation before the handshake.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Building or signing the handshake request failed.
    #[error("WebSocket handshake failed: {0}")]
    Handshake(String),

    /// Transport-level WebSocket failure.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// No pong arrived within the timeout of the last ping.
    #[error("no pong received within {0:?} of the last ping")]
    KeepaliveTimeout(Duration),

    /// The server closed the connection.
    #[error("connection closed by the server")]
    ConnectionClosed,

    /// The reconnect budget was exhausted.
    #[error("gave up reconnecting after {attempts} attempts")]
    StreamExhausted {
        /// Attempts consumed before giving up.
        attempts: u32,
    },
}

// =============================================================================
// Session State & Status
// =============================================================================

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No connection, and none being attempted.
    #[default]
    Disconnected,
    /// Handshake in progress (or waiting out a reconnect delay).
    Connecting,
    /// Connected and delivering frames.
    Connected,
    /// Cooperative stop observed, draining and closing.
    Closing,
}

/// Connection status notifications, decoupled from report delivery.
///
/// Sent with `try_send` so a slow status consumer can never block the read
/// loop; a full status channel drops notifications rather than stalling
/// frame processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamStatus {
    /// The session established a connection.
    Connected {
        /// Host the session connected to.
        host: String,
        /// Origin the connection was made from.
        origin: String,
    },
    /// The session lost (or gave up) a connection.
    Disconnected {
        /// Host the session was connected to.
        host: String,
        /// Origin the connection was made from.
        origin: String,
    },
    /// The session is about to retry the connection.
    Reconnecting {
        /// Reconnection attempt number.
        attempt: u32,
    },
    /// An inbound frame could not be parsed and was skipped.
    FrameError {
        /// Parse failure detail.
        detail: String,
    },
}

// =============================================================================
// Stream Configuration
// =============================================================================

/// Configuration for one stream session.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Scheme and authority to connect to, e.g. `wss://ws.dataengine.chain.link`.
    pub url_base: String,
    /// Feed ids to subscribe to, in the order they are signed and sent.
    pub feed_ids: Vec<String>,
    /// API credentials for the handshake signature.
    pub credentials: Credentials,
    /// Keepalive tuning.
    pub keepalive: KeepaliveConfig,
    /// Reconnection tuning.
    pub reconnect: ReconnectConfig,
    /// Skip TLS certificate verification (debugging only).
    pub accept_invalid_certs: bool,
}

impl StreamConfig {
    /// Create a stream configuration with default tunables.
    #[must_use]
    pub fn new(url_base: impl Into<String>, feed_ids: Vec<String>, credentials: Credentials) -> Self {
        Self {
            url_base: url_base.into(),
            feed_ids,
            credentials,
            keepalive: KeepaliveConfig::default(),
            reconnect: ReconnectConfig::default(),
            accept_invalid_certs: false,
        }
    }

    /// Derive a stream configuration from the client configuration.
    #[must_use]
    pub fn from_config(config: &StreamsConfig, feed_ids: Vec<String>) -> Self {
        Self {
            url_base: format!("wss://{}", config.ws_host),
            feed_ids,
            credentials: config.credentials.clone(),
            keepalive: KeepaliveConfig::new(config.ping_interval, config.pong_timeout),
            reconnect: ReconnectConfig {
                enabled: config.reconnect_enabled,
                max_attempts: config.max_reconnect_attempts,
                ..ReconnectConfig::default()
            },
            accept_invalid_certs: config.insecure_skip_verify,
        }
    }

    /// The subscription path, with feed ids joined in caller order.
    ///
    /// The order is part of the signed bytes, so it must match what goes on
    /// the wire exactly.
    #[must_use]
    pub fn subscription_path(&self) -> String {
        format!("{WS_PATH}?feedIDs={}", self.feed_ids.join(","))
    }

    fn host(&self) -> &str {
        self.url_base
            .trim_start_matches("wss://")
            .trim_start_matches("ws://")
    }
}

// =============================================================================
// Stream Session
// =============================================================================

/// One logical subscription to the report stream.
///
/// Create the session, spawn [`StreamSession::run`], and receive reports on
/// the channel handed to [`StreamSession::new`]. Cancel the token for a
/// cooperative stop; `run` then returns `Ok(())`.
pub struct StreamSession {
    config: StreamConfig,
    signer: RequestSigner<SystemClock>,
    report_tx: mpsc::Sender<ReportResponse>,
    status_tx: Option<mpsc::Sender<StreamStatus>>,
    cancel: CancellationToken,
    state: RwLock<SessionState>,
}

impl StreamSession {
    /// Create a new session.
    ///
    /// `report_tx` receives every well-formed frame in arrival order;
    /// `status_tx`, when supplied, receives connection transitions and
    /// per-frame errors.
    #[must_use]
    pub fn new(
        config: StreamConfig,
        report_tx: mpsc::Sender<ReportResponse>,
        status_tx: Option<mpsc::Sender<StreamStatus>>,
        cancel: CancellationToken,
    ) -> Self {
        let signer = RequestSigner::new(config.credentials.clone());
        Self {
            config,
            signer,
            report_tx,
            status_tx,
            cancel,
            state: RwLock::new(SessionState::Disconnected),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state.read()
    }

    fn set_state(&self, state: SessionState) {
        *self.state.write() = state;
    }

    fn notify(&self, status: StreamStatus) {
        if let Some(tx) = &self.status_tx {
            let _ = tx.try_send(status);
        }
    }

    /// Run the session until cancelled or terminally failed.
    ///
    /// A cooperative stop returns `Ok(())`; liveness failures drive the
    /// reconnect policy and surface as an error only once the budget is
    /// exhausted (or reconnection is disabled).
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::EmptySubscription`] or a feed id validation
    /// failure before any I/O, and [`StreamError::StreamExhausted`] (or the
    /// underlying failure when reconnection is disabled) afterwards.
    pub async fn run(self: Arc<Self>) -> Result<(), StreamError> {
        if self.config.feed_ids.is_empty() {
            return Err(StreamError::EmptySubscription);
        }
        for feed_id in &self.config.feed_ids {
            report::validate_feed_id(feed_id)?;
        }

        let mut policy = ReconnectPolicy::new(self.config.reconnect.clone());

        loop {
            if self.cancel.is_cancelled() {
                self.set_state(SessionState::Disconnected);
                return Ok(());
            }

            self.set_state(SessionState::Connecting);
            let error = match self.connect_and_run().await {
                Ok(()) => {
                    tracing::info!("report stream stopped");
                    self.set_state(SessionState::Disconnected);
                    return Ok(());
                }
                Err(error) => error,
            };

            self.set_state(SessionState::Disconnected);
            self.notify(StreamStatus::Disconnected {
                host: self.config.host().to_string(),
                origin: self.config.url_base.clone(),
            });
            tracing::warn!(error = %error, "report stream connection lost");

            if let Some(delay) = policy.next_delay() {
                let attempt = policy.attempt_count();
                self.notify(StreamStatus::Reconnecting { attempt });
                tracing::info!(
                    attempt,
                    delay_ms = delay.as_millis(),
                    "reconnecting to report stream"
                );
                tokio::select! {
                    () = self.cancel.cancelled() => {
                        self.set_state(SessionState::Disconnected);
                        return Ok(());
                    }
                    () = tokio::time::sleep(delay) => {}
                }
            } else if policy.is_enabled() && policy.attempt_count() > 0 {
                return Err(StreamError::StreamExhausted {
                    attempts: policy.attempt_count(),
                });
            } else {
                return Err(error);
            }
        }
    }

    /// Establish one connection and pump it until it dies or the session
    /// is stopped.
    async fn connect_and_run(&self) -> Result<(), StreamError> {
        let path = self.config.subscription_path();
        let url = format!("{}{}", self.config.url_base, path);
        let request = self.handshake_request(&path, &url)?;

        tracing::info!(url = %url, "connecting to report stream");
        let (socket, _response) = if self.config.accept_invalid_certs {
            let connector =
                tls::insecure_connector().map_err(|err| StreamError::Handshake(err.to_string()))?;
            tokio_tungstenite::connect_async_tls_with_config(request, None, false, Some(connector))
                .await?
        } else {
            tokio_tungstenite::connect_async(request).await?
        };

        self.set_state(SessionState::Connected);
        self.notify(StreamStatus::Connected {
            host: self.config.host().to_string(),
            origin: self.config.url_base.clone(),
        });
        tracing::info!(host = %self.config.host(), "report stream connected");

        let (mut sink, mut source) = socket.split();

        let keepalive_state = Arc::new(KeepaliveState::new());
        let (keepalive_tx, mut keepalive_rx) = mpsc::channel(8);
        let keepalive_cancel = CancellationToken::new();
        let monitor = KeepaliveMonitor::new(
            self.config.keepalive.clone(),
            Arc::clone(&keepalive_state),
            keepalive_tx,
            keepalive_cancel.clone(),
        );
        tokio::spawn(monitor.run());

        let outcome = self
            .read_loop(&mut sink, &mut source, &keepalive_state, &mut keepalive_rx)
            .await;

        // Single close point per connection: whatever ended the loop above,
        // the transport is closed here exactly once. The socket may already
        // be gone, so the close frame is best-effort.
        keepalive_cancel.cancel();
        let _ = sink.send(Message::Close(None)).await;

        outcome
    }

    /// Pump frames and keepalive events until the connection dies or the
    /// session is cancelled.
    async fn read_loop(
        &self,
        sink: &mut WsSink,
        source: &mut WsSource,
        keepalive_state: &Arc<KeepaliveState>,
        keepalive_rx: &mut mpsc::Receiver<KeepaliveEvent>,
    ) -> Result<(), StreamError> {
        loop {
            tokio::select! {
                () = self.cancel.cancelled() => {
                    self.set_state(SessionState::Closing);
                    return Ok(());
                }
                event = keepalive_rx.recv() => match event {
                    Some(KeepaliveEvent::SendPing) => {
                        keepalive_state.mark_probe_sent();
                        sink.send(Message::Ping(Vec::new().into())).await?;
                    }
                    Some(KeepaliveEvent::Timeout) => {
                        return Err(StreamError::KeepaliveTimeout(
                            self.config.keepalive.pong_timeout,
                        ));
                    }
                    None => {}
                },
                frame = source.next() => match frame {
                    Some(Ok(Message::Text(text))) => self.handle_frame(&text).await,
                    Some(Ok(Message::Pong(_))) => keepalive_state.record_pong(),
                    Some(Ok(Message::Ping(payload))) => {
                        sink.send(Message::Pong(payload)).await?;
                    }
                    Some(Ok(Message::Close(_))) => return Err(StreamError::ConnectionClosed),
                    Some(Ok(_)) => {}
                    Some(Err(err)) => return Err(err.into()),
                    None => return Err(StreamError::ConnectionClosed),
                },
            }
        }
    }

    /// Parse one text frame and deliver it. A frame that fails to parse is
    /// reported and skipped; it never tears the session down.
    async fn handle_frame(&self, text: &str) {
        match serde_json::from_str::<StreamFrame>(text) {
            Ok(frame) => {
                tracing::trace!(feed_id = %frame.report.feed_id, "report frame received");
                if self.report_tx.send(frame.report).await.is_err() {
                    // receiver dropped: nobody is listening any more
                    tracing::debug!("report receiver dropped, stopping session");
                    self.cancel.cancel();
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "skipping malformed stream frame");
                self.notify(StreamStatus::FrameError {
                    detail: err.to_string(),
                });
            }
        }
    }

    /// Build the signed WebSocket upgrade request.
    fn handshake_request(&self, path: &str, url: &str) -> Result<Request<()>, StreamError> {
        let mut builder = Request::builder()
            .method("GET")
            .uri(url)
            .header("Host", self.config.host())
            .header("Connection", "Upgrade")
            .header("Upgrade", "websocket")
            .header("Sec-WebSocket-Version", "13")
            .header("Sec-WebSocket-Key", generate_key());
        for (name, value) in self.signer.auth_headers("GET", path, b"") {
            builder = builder.header(name, value);
        }
        builder
            .body(())
            .map_err(|err| StreamError::Handshake(err.to_string()))
    }
}
