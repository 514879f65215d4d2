//! Client Configuration Settings
//!
//! Configuration types for the Data Streams client, with mainnet defaults
//! and optional loading from environment variables.

use std::time::Duration;

// =============================================================================
// Service Hosts
// =============================================================================

/// Mainnet REST API host.
pub const MAINNET_REST_HOST: &str = "api.dataengine.chain.link";
/// Mainnet WebSocket host.
pub const MAINNET_WS_HOST: &str = "ws.dataengine.chain.link";
/// Testnet REST API host.
pub const TESTNET_REST_HOST: &str = "api.testnet-dataengine.chain.link";
/// Testnet WebSocket host.
pub const TESTNET_WS_HOST: &str = "ws.testnet-dataengine.chain.link";

/// Default interval between keepalive pings.
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(30);
/// Default wait for a pong before the connection is considered dead.
pub const DEFAULT_PONG_TIMEOUT: Duration = Duration::from_secs(60);
/// Default HTTP request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Default bound on reconnection attempts.
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 10;

// =============================================================================
// Credentials
// =============================================================================

/// Data Streams API credentials.
///
/// The key identifier is sent in plain text on every request; the secret is
/// only ever used as the HMAC key. The `Debug` implementation redacts the
/// secret so credentials can appear in logs without leaking it.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    api_secret: String,
}

impl Credentials {
    /// Create new credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyValue`] if either part is empty.
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Result<Self, ConfigError> {
        let api_key = api_key.into();
        let api_secret = api_secret.into();

        if api_key.is_empty() {
            return Err(ConfigError::EmptyValue("api key".to_string()));
        }
        if api_secret.is_empty() {
            return Err(ConfigError::EmptyValue("api secret".to_string()));
        }

        Ok(Self {
            api_key,
            api_secret,
        })
    }

    /// Get the key identifier.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get the signing secret.
    #[must_use]
    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

// =============================================================================
// Client Configuration
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone)]
pub struct StreamsConfig {
    /// API credentials.
    pub credentials: Credentials,
    /// REST API host.
    pub rest_host: String,
    /// WebSocket host.
    pub ws_host: String,
    /// HTTP request timeout.
    pub request_timeout: Duration,
    /// Interval between keepalive pings.
    pub ping_interval: Duration,
    /// Wait for a pong before the connection is considered dead.
    pub pong_timeout: Duration,
    /// Whether the stream reconnects after a liveness failure.
    pub reconnect_enabled: bool,
    /// Maximum reconnection attempts before giving up (0 = unlimited).
    pub max_reconnect_attempts: u32,
    /// Skip TLS certificate verification (debugging only).
    pub insecure_skip_verify: bool,
}

impl StreamsConfig {
    /// Create a configuration with mainnet hosts and default tunables.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            rest_host: MAINNET_REST_HOST.to_string(),
            ws_host: MAINNET_WS_HOST.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            ping_interval: DEFAULT_PING_INTERVAL,
            pong_timeout: DEFAULT_PONG_TIMEOUT,
            reconnect_enabled: true,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            insecure_skip_verify: false,
        }
    }

    /// Create a configuration pointed at the testnet environment.
    #[must_use]
    pub fn testnet(credentials: Credentials) -> Self {
        Self {
            rest_host: TESTNET_REST_HOST.to_string(),
            ws_host: TESTNET_WS_HOST.to_string(),
            ..Self::new(credentials)
        }
    }

    /// Create a configuration from environment variables.
    ///
    /// Reads `DATASTREAMS_API_KEY` and `DATASTREAMS_API_SECRET` (required),
    /// plus optional overrides for hosts and tunables. A `.env` file in the
    /// working directory is honored if present.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let api_key = std::env::var("DATASTREAMS_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("DATASTREAMS_API_KEY".to_string()))?;
        let api_secret = std::env::var("DATASTREAMS_API_SECRET")
            .map_err(|_| ConfigError::MissingEnvVar("DATASTREAMS_API_SECRET".to_string()))?;

        let mut config = Self::new(Credentials::new(api_key, api_secret)?);

        if let Ok(host) = std::env::var("DATASTREAMS_REST_HOST") {
            config.rest_host = host;
        }
        if let Ok(host) = std::env::var("DATASTREAMS_WS_HOST") {
            config.ws_host = host;
        }
        config.request_timeout =
            parse_env_duration_secs("DATASTREAMS_REQUEST_TIMEOUT_SECS", config.request_timeout);
        config.ping_interval =
            parse_env_duration_secs("DATASTREAMS_PING_INTERVAL_SECS", config.ping_interval);
        config.pong_timeout =
            parse_env_duration_secs("DATASTREAMS_PONG_TIMEOUT_SECS", config.pong_timeout);
        config.reconnect_enabled =
            parse_env_bool("DATASTREAMS_RECONNECT_ENABLED", config.reconnect_enabled);
        config.max_reconnect_attempts = parse_env_u32(
            "DATASTREAMS_MAX_RECONNECT_ATTEMPTS",
            config.max_reconnect_attempts,
        );
        config.insecure_skip_verify =
            parse_env_bool("DATASTREAMS_INSECURE_SKIP_VERIFY", config.insecure_skip_verify);

        Ok(config)
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    /// A required value is empty.
    #[error("{0} cannot be empty")]
    EmptyValue(String),
}

fn parse_env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_env_duration_secs(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(default, Duration::from_secs)
}
