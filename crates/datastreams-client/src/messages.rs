//! Wire Message Types
//!
//! Serde types for the JSON payloads exchanged with the Data Streams REST
//! API and WebSocket stream. Field names mirror the service's camel-case
//! schema (`feedID`, `fullReport`, ...).

use serde::{Deserialize, Serialize};

use crate::report::{self, DecodedPrices, DecodedReport, ReportError};

// =============================================================================
// Feeds
// =============================================================================

/// A feed known to the catalog endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    /// Feed identifier (`0x`-prefixed hex string).
    #[serde(rename = "feedID")]
    pub feed_id: String,
}

impl Feed {
    /// Schema version encoded in this feed's identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::InvalidFeedId`] on a malformed identifier.
    pub fn schema_version(&self) -> Result<u16, ReportError> {
        report::schema_version(&self.feed_id)
    }
}

/// Response envelope of the feeds endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FeedsResponse {
    pub feeds: Vec<Feed>,
}

// =============================================================================
// Reports
// =============================================================================

/// A single report as returned by the REST API and the WebSocket stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportResponse {
    /// Feed identifier the report belongs to.
    #[serde(rename = "feedID")]
    pub feed_id: String,
    /// Hex-encoded full report envelope.
    #[serde(rename = "fullReport")]
    pub full_report: String,
    /// Timestamp the report becomes valid at (Unix seconds).
    #[serde(rename = "validFromTimestamp")]
    pub valid_from_timestamp: u64,
    /// Timestamp of the observations (Unix seconds).
    #[serde(rename = "observationsTimestamp")]
    pub observations_timestamp: u64,
}

impl ReportResponse {
    /// Schema version encoded in this report's feed identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::InvalidFeedId`] on a malformed identifier.
    pub fn schema_version(&self) -> Result<u16, ReportError> {
        report::schema_version(&self.feed_id)
    }

    /// Decode the full report, deriving the schema version from the feed id.
    ///
    /// # Errors
    ///
    /// Propagates any envelope or payload decode failure.
    pub fn decode(&self) -> Result<DecodedReport, ReportError> {
        report::decode_full_report(&self.full_report, Some(&self.feed_id), None)
    }

    /// Decode the report and extract its price fields as decimals.
    ///
    /// # Errors
    ///
    /// Propagates decode failures; requires a v3 report.
    pub fn decoded_prices(&self, decimals: u32) -> Result<DecodedPrices, ReportError> {
        self.decode()?.decoded_prices(decimals)
    }
}

/// Response envelope wrapping a single report.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SingleReportResponse {
    pub report: ReportResponse,
}

/// Response envelope wrapping a list of reports.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ReportListResponse {
    pub reports: Vec<ReportResponse>,
}

// =============================================================================
// Pagination
// =============================================================================

/// One page of historical reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPage {
    /// Reports in this page, oldest first.
    pub reports: Vec<ReportResponse>,
    /// Start timestamp for the next page, `0` when this page was empty.
    pub next_page_timestamp: u64,
}

impl ReportPage {
    /// Build a page from a list of reports, deriving the next-page cursor
    /// from the last report's observations timestamp.
    #[must_use]
    pub fn from_reports(reports: Vec<ReportResponse>) -> Self {
        let next_page_timestamp = reports
            .last()
            .map_or(0, |report| report.observations_timestamp + 1);
        Self {
            reports,
            next_page_timestamp,
        }
    }
}

// =============================================================================
// Stream Frames
// =============================================================================

/// One WebSocket frame: a report event nested under a `report` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamFrame {
    /// The report carried by this frame.
    pub report: ReportResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED_ID: &str = "0x00039d9e45394f473ab1f050a1b963e6b05351e52d71e507509ada0c95ed75b8";

    #[test]
    fn report_response_parses_service_field_names() {
        let json = format!(
            r#"{{"feedID":"{FEED_ID}","fullReport":"0xdead","validFromTimestamp":100,"observationsTimestamp":200}}"#
        );
        let report: ReportResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(report.feed_id, FEED_ID);
        assert_eq!(report.full_report, "0xdead");
        assert_eq!(report.valid_from_timestamp, 100);
        assert_eq!(report.observations_timestamp, 200);
    }

    #[test]
    fn stream_frame_unwraps_nested_report() {
        let json = format!(
            r#"{{"report":{{"feedID":"{FEED_ID}","fullReport":"0x00","validFromTimestamp":1,"observationsTimestamp":2}}}}"#
        );
        let frame: StreamFrame = serde_json::from_str(&json).unwrap();
        assert_eq!(frame.report.observations_timestamp, 2);
    }

    #[test]
    fn stream_frame_rejects_missing_report_key() {
        let json = format!(
            r#"{{"feedID":"{FEED_ID}","fullReport":"0x00","validFromTimestamp":1,"observationsTimestamp":2}}"#
        );
        assert!(serde_json::from_str::<StreamFrame>(&json).is_err());
    }

    #[test]
    fn feed_reports_its_schema_version() {
        let feed = Feed {
            feed_id: FEED_ID.to_string(),
        };
        assert_eq!(feed.schema_version().unwrap(), 3);
    }

    #[test]
    fn page_cursor_follows_last_report() {
        let page = ReportPage::from_reports(vec![ReportResponse {
            feed_id: FEED_ID.to_string(),
            full_report: "0x00".to_string(),
            valid_from_timestamp: 10,
            observations_timestamp: 20,
        }]);
        assert_eq!(page.next_page_timestamp, 21);
    }

    #[test]
    fn empty_page_has_zero_cursor() {
        let page = ReportPage::from_reports(Vec::new());
        assert_eq!(page.next_page_timestamp, 0);
    }
}
