#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::default_trait_access
    )
)]

//! Datastreams Client - Chainlink Data Streams SDK
//!
//! A client for the Chainlink Data Streams service. The service publishes
//! signed price reports over two paths that share one authentication
//! scheme: a REST API for pulls and a WebSocket stream for push delivery.
//!
//! # Modules
//!
//! - `auth`: HMAC-SHA256 request signing shared by REST and WebSocket
//! - `client`: signed REST calls (feed catalog, latest/historical reports)
//! - `stream`: long-lived report stream with keepalive and reconnection
//! - `report`: ABI envelope splitting, v3 payload decoding, price math
//! - `messages`: JSON wire types
//! - `config`: credentials, hosts, and tunables
//!
//! # Data Flow
//!
//! ```text
//!                 ┌──────────────┐ signed GET  ┌─────────────┐
//! feed ids ──────▶│ StreamsClient│────────────▶│             │
//!                 └──────────────┘             │   Data      │
//!                 ┌──────────────┐ signed WS   │   Streams   │
//! feed ids ──────▶│ StreamSession│◀───frames───│   service   │
//!                 └──────┬───────┘             └─────────────┘
//!                        ▼
//!                 ┌──────────────┐
//!                 │ report codec │──▶ typed reports & prices
//!                 └──────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Request signing shared by the REST client and the WebSocket handshake.
pub mod auth;

/// Signed REST client.
pub mod client;

/// Credentials, hosts, and tunables.
pub mod config;

/// Keepalive probing for stream connections.
pub mod keepalive;

/// JSON wire types for REST responses and stream frames.
pub mod messages;

/// Reconnection backoff policy.
pub mod reconnect;

/// Report envelope and payload decoding.
pub mod report;

/// Long-lived report stream session.
pub mod stream;

mod tls;

// =============================================================================
// Re-exports
// =============================================================================

// Signing
pub use auth::{
    AUTHORIZATION_HEADER, Clock, RequestSigner, SIGNATURE_HEADER, SignedRequest, SystemClock,
    TIMESTAMP_HEADER,
};

// Configuration
pub use config::{
    ConfigError, Credentials, MAINNET_REST_HOST, MAINNET_WS_HOST, StreamsConfig,
    TESTNET_REST_HOST, TESTNET_WS_HOST,
};

// REST client
pub use client::{ClientError, StreamsClient};

// Wire types
pub use messages::{Feed, ReportPage, ReportResponse, StreamFrame};

// Report decoding
pub use report::{
    DEFAULT_DECIMALS, DecodedPrices, DecodedReport, ReportData, ReportDataV3, ReportEnvelope,
    ReportError, V3_SCHEMA_VERSION, decode_envelope, decode_full_report, decode_payload,
    schema_version, to_decimal, validate_feed_id,
};

// Streaming
pub use keepalive::{KeepaliveConfig, KeepaliveEvent, KeepaliveMonitor, KeepaliveState};
pub use reconnect::{ReconnectConfig, ReconnectPolicy};
pub use stream::{
    SessionState, StreamConfig, StreamError, StreamSession, StreamStatus, WS_PATH,
};
