//! REST Client
//!
//! Thin, signed wrappers over the Data Streams REST endpoints. Every call
//! signs the exact method, path, and body it is about to transmit and
//! surfaces failures as typed errors; nothing is retried here.

use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

use crate::auth::{RequestSigner, SystemClock};
use crate::config::StreamsConfig;
use crate::messages::{
    Feed, FeedsResponse, ReportListResponse, ReportPage, ReportResponse, SingleReportResponse,
};
use crate::report::{self, ReportError};

/// Feed catalog endpoint.
pub const FEEDS_PATH: &str = "/api/v1/feeds";
/// Latest report endpoint.
pub const LATEST_REPORT_PATH: &str = "/api/v1/reports/latest";
/// Report-at-timestamp endpoint.
pub const REPORT_PATH: &str = "/api/v1/reports";
/// Bulk report endpoint.
pub const BULK_REPORTS_PATH: &str = "/api/v1/reports/bulk";
/// Report pagination endpoint.
pub const REPORTS_PAGE_PATH: &str = "/api/v1/reports/page";

// =============================================================================
// Error Type
// =============================================================================

/// Errors raised by REST calls.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Network or protocol failure, including response decoding.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("request failed with status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// A feed id failed validation before the request was sent.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// No feed ids were supplied for a bulk request.
    #[error("no feed ids provided")]
    EmptyFeedIds,
}

// =============================================================================
// Client
// =============================================================================

/// Signed REST client for the Data Streams API.
#[derive(Debug, Clone)]
pub struct StreamsClient {
    http: reqwest::Client,
    signer: RequestSigner<SystemClock>,
    base_url: String,
}

impl StreamsClient {
    /// Create a client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(config: &StreamsConfig) -> Result<Self, ClientError> {
        Self::with_base_url(config, format!("https://{}", config.rest_host))
    }

    /// Create a client against an explicit base URL (scheme + authority).
    ///
    /// # Errors
    ///
    /// Returns a transport error if the underlying HTTP client cannot be
    /// constructed.
    pub fn with_base_url(
        config: &StreamsConfig,
        base_url: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .danger_accept_invalid_certs(config.insecure_skip_verify)
            .build()?;
        Ok(Self {
            http,
            signer: RequestSigner::new(config.credentials.clone()),
            base_url: base_url.into(),
        })
    }

    /// List the feeds available to these credentials.
    ///
    /// # Errors
    ///
    /// Surfaces transport failures and non-success statuses.
    pub async fn feeds(&self) -> Result<Vec<Feed>, ClientError> {
        let response: FeedsResponse = self.get_json(FEEDS_PATH).await?;
        Ok(response.feeds)
    }

    /// Fetch the latest report for a feed.
    ///
    /// # Errors
    ///
    /// Rejects malformed feed ids before any network call; surfaces
    /// transport failures and non-success statuses.
    pub async fn latest_report(&self, feed_id: &str) -> Result<ReportResponse, ClientError> {
        report::validate_feed_id(feed_id)?;
        let path = format!("{LATEST_REPORT_PATH}?feedID={feed_id}");
        let response: SingleReportResponse = self.get_json(&path).await?;
        Ok(response.report)
    }

    /// Fetch the report for a feed at (or before) a timestamp.
    ///
    /// # Errors
    ///
    /// Rejects malformed feed ids before any network call; surfaces
    /// transport failures and non-success statuses.
    pub async fn report_at(
        &self,
        feed_id: &str,
        timestamp: u64,
    ) -> Result<ReportResponse, ClientError> {
        report::validate_feed_id(feed_id)?;
        let path = format!("{REPORT_PATH}?feedID={feed_id}&timestamp={timestamp}");
        let response: SingleReportResponse = self.get_json(&path).await?;
        Ok(response.report)
    }

    /// Fetch reports for several feeds at a single timestamp.
    ///
    /// # Errors
    ///
    /// Rejects an empty feed list and malformed feed ids before any network
    /// call; surfaces transport failures and non-success statuses.
    pub async fn bulk_reports(
        &self,
        feed_ids: &[String],
        timestamp: u64,
    ) -> Result<Vec<ReportResponse>, ClientError> {
        if feed_ids.is_empty() {
            return Err(ClientError::EmptyFeedIds);
        }
        for feed_id in feed_ids {
            report::validate_feed_id(feed_id)?;
        }
        let path = format!(
            "{BULK_REPORTS_PATH}?feedIDs={}&timestamp={timestamp}",
            feed_ids.join(",")
        );
        let response: ReportListResponse = self.get_json(&path).await?;
        Ok(response.reports)
    }

    /// Fetch one page of historical reports for a feed.
    ///
    /// # Errors
    ///
    /// Rejects malformed feed ids before any network call; surfaces
    /// transport failures and non-success statuses.
    pub async fn reports_page(
        &self,
        feed_id: &str,
        start_timestamp: u64,
        limit: Option<u32>,
    ) -> Result<ReportPage, ClientError> {
        report::validate_feed_id(feed_id)?;
        let mut path =
            format!("{REPORTS_PAGE_PATH}?feedID={feed_id}&startTimestamp={start_timestamp}");
        if let Some(limit) = limit {
            path.push_str(&format!("&limit={limit}"));
        }
        let response: ReportListResponse = self.get_json(&path).await?;
        Ok(ReportPage::from_reports(response.reports))
    }

    /// Issue a signed GET and parse the JSON response.
    async fn get_json<T: DeserializeOwned>(&self, path_with_query: &str) -> Result<T, ClientError> {
        let mut headers = HeaderMap::new();
        for (name, value) in self.signer.auth_headers("GET", path_with_query, b"") {
            if let Ok(value) = value.parse() {
                headers.insert(name, value);
            }
        }

        let url = format!("{}{}", self.base_url, path_with_query);
        tracing::debug!(url = %url, "sending signed request");
        let response = self.http.get(&url).headers(headers).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "request failed");
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}
