//! Request Signing
//!
//! Every REST call and WebSocket handshake carries an HMAC-SHA256 signature
//! computed over the request about to hit the wire. The signed message is
//!
//! ```text
//! <METHOD> "\n" <path-with-query> "\n" <hex(sha256(body))> "\n" <timestamp-millis>
//! ```
//!
//! keyed with the API secret, and travels in three headers alongside the
//! plain key identifier and the millisecond timestamp. The path is signed
//! exactly as transmitted, so query ordering and encoding matter.
//!
//! The wall clock is injected through [`Clock`] so signatures are
//! reproducible bit-for-bit under test.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::config::Credentials;

type HmacSha256 = Hmac<Sha256>;

// =============================================================================
// Headers
// =============================================================================

/// Header carrying the plain key identifier.
pub const AUTHORIZATION_HEADER: &str = "Authorization";
/// Header carrying the signing timestamp in decimal milliseconds.
pub const TIMESTAMP_HEADER: &str = "X-Authorization-Timestamp";
/// Header carrying the lowercase hex HMAC digest.
pub const SIGNATURE_HEADER: &str = "X-Authorization-Signature-SHA256";

// =============================================================================
// Clock
// =============================================================================

/// Source of millisecond wall-clock timestamps.
///
/// Production code uses [`SystemClock`]; tests inject a fixed clock to make
/// signatures deterministic.
pub trait Clock: Send + Sync {
    /// Current time in milliseconds since the Unix epoch.
    fn now_millis(&self) -> u64;
}

/// Clock backed by the system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
    }
}

// =============================================================================
// Signer
// =============================================================================

/// A request signature and the timestamp it was computed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// Lowercase hex HMAC-SHA256 digest (64 characters).
    pub signature: String,
    /// Milliseconds since the Unix epoch covered by the signature.
    pub timestamp: u64,
}

/// Signs requests for the Data Streams API.
///
/// Stateless apart from the credentials and clock; safe to share across
/// tasks and sessions.
#[derive(Debug, Clone)]
pub struct RequestSigner<C = SystemClock> {
    credentials: Credentials,
    clock: C,
}

impl RequestSigner<SystemClock> {
    /// Create a signer using the system clock.
    #[must_use]
    pub const fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            clock: SystemClock,
        }
    }
}

impl<C: Clock> RequestSigner<C> {
    /// Create a signer with an explicit clock.
    #[must_use]
    pub const fn with_clock(credentials: Credentials, clock: C) -> Self {
        Self { credentials, clock }
    }

    /// Get the key identifier this signer authenticates as.
    #[must_use]
    pub fn api_key(&self) -> &str {
        self.credentials.api_key()
    }

    /// Sign a request at the current clock time.
    #[must_use]
    pub fn sign(&self, method: &str, path_with_query: &str, body: &[u8]) -> SignedRequest {
        self.sign_at(method, path_with_query, body, self.clock.now_millis())
    }

    /// Sign a request for a fixed timestamp.
    ///
    /// Pure: identical inputs always yield the identical signature.
    #[must_use]
    pub fn sign_at(
        &self,
        method: &str,
        path_with_query: &str,
        body: &[u8],
        timestamp: u64,
    ) -> SignedRequest {
        let body_hash = hex::encode(Sha256::digest(body));
        let message = format!("{method}\n{path_with_query}\n{body_hash}\n{timestamp}");

        #[allow(clippy::expect_used)] // HMAC accepts keys of any length
        let mut mac = HmacSha256::new_from_slice(self.credentials.api_secret().as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(message.as_bytes());

        SignedRequest {
            signature: hex::encode(mac.finalize().into_bytes()),
            timestamp,
        }
    }

    /// Build the three authentication headers for a request.
    #[must_use]
    pub fn auth_headers(
        &self,
        method: &str,
        path_with_query: &str,
        body: &[u8],
    ) -> [(&'static str, String); 3] {
        let signed = self.sign(method, path_with_query, body);
        [
            (AUTHORIZATION_HEADER, self.credentials.api_key().to_string()),
            (TIMESTAMP_HEADER, signed.timestamp.to_string()),
            (SIGNATURE_HEADER, signed.signature),
        ]
    }
}
