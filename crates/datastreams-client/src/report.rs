//! Report Decoding
//!
//! Reports arrive as a hex-encoded ABI blob. The outer layer is the
//! envelope tuple
//!
//! ```text
//! (bytes32[3] reportContext, bytes reportBlob,
//!  bytes32[] rawRs, bytes32[] rawSs, bytes32 rawVs)
//! ```
//!
//! and the inner `reportBlob` layout is selected by a schema version
//! carried in the leading two bytes of the feed identifier. Only the v3
//! (crypto streams) layout is implemented:
//!
//! ```text
//! (bytes32 feedId, uint32 validFromTimestamp, uint32 observationsTimestamp,
//!  uint192 nativeFee, uint192 linkFee, uint32 expiresAt,
//!  int192 benchmarkPrice, int192 bid, int192 ask)
//! ```
//!
//! Prices are fixed-point integers scaled by `10^decimals` (18 by default).

use alloy_primitives::{
    B256, Bytes,
    aliases::{I192, U192},
};
use alloy_sol_types::SolValue;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Schema version of crypto-stream reports.
pub const V3_SCHEMA_VERSION: u16 = 3;

/// Default fixed-point scale for price fields.
pub const DEFAULT_DECIMALS: u32 = 18;

// =============================================================================
// Error Type
// =============================================================================

/// Errors raised while decoding reports.
#[derive(Debug, Clone, Error)]
pub enum ReportError {
    /// Feed identifier is not a `0x`-prefixed hex string of the right shape.
    #[error("invalid feed id: {0}")]
    InvalidFeedId(String),

    /// Report hex does not decode as the envelope tuple.
    #[error("malformed report envelope: {0}")]
    MalformedEnvelope(String),

    /// The requested payload layout is not implemented.
    #[error("schema version {0} is not supported (currently supported: v3)")]
    UnsupportedSchemaVersion(u16),

    /// Neither a feed id nor an explicit schema version was supplied.
    #[error("either a feed id or a schema version is required to decode a report")]
    AmbiguousSchema,

    /// Price extraction was requested on a non-v3 report.
    #[error("price extraction requires a v3 report, got schema version {0}")]
    InvalidSchemaForPriceExtraction(u16),
}

// =============================================================================
// Feed Identifiers
// =============================================================================

/// Extract the schema version from a feed identifier.
///
/// The version is the first two bytes after the `0x` prefix, parsed as a
/// big-endian unsigned integer; the rest of the identifier is not inspected.
///
/// # Errors
///
/// Returns [`ReportError::InvalidFeedId`] if the prefix is missing or the
/// version window is not hex.
pub fn schema_version(feed_id: &str) -> Result<u16, ReportError> {
    let hex_part = feed_id
        .strip_prefix("0x")
        .ok_or_else(|| ReportError::InvalidFeedId(feed_id.to_string()))?;
    let window = hex_part
        .get(..4)
        .ok_or_else(|| ReportError::InvalidFeedId(feed_id.to_string()))?;
    u16::from_str_radix(window, 16).map_err(|_| ReportError::InvalidFeedId(feed_id.to_string()))
}

/// Validate the full shape of a feed identifier: `0x` plus 64 hex characters.
///
/// Used by the REST and stream clients to reject malformed identifiers
/// before any network call.
///
/// # Errors
///
/// Returns [`ReportError::InvalidFeedId`] on a malformed identifier.
pub fn validate_feed_id(feed_id: &str) -> Result<(), ReportError> {
    let hex_part = feed_id
        .strip_prefix("0x")
        .ok_or_else(|| ReportError::InvalidFeedId(feed_id.to_string()))?;
    if hex_part.len() != 64 || !hex_part.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ReportError::InvalidFeedId(feed_id.to_string()));
    }
    Ok(())
}

// =============================================================================
// Envelope
// =============================================================================

/// The outer envelope of a report: context words, opaque payload, and the
/// raw signature components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEnvelope {
    /// Three context words (config digest, epoch/round, extra hash).
    pub report_context: [B256; 3],
    /// Opaque payload whose layout is selected by the schema version.
    pub report_blob: Bytes,
    /// Signature `r` components.
    pub raw_rs: Vec<B256>,
    /// Signature `s` components.
    pub raw_ss: Vec<B256>,
    /// Packed signature `v` components.
    pub raw_vs: B256,
}

type EnvelopeTuple = ([B256; 3], Bytes, Vec<B256>, Vec<B256>, B256);

/// Split a hex-encoded full report into its envelope parts.
///
/// The hex may carry a `0x` prefix or not; both parse identically.
///
/// # Errors
///
/// Returns [`ReportError::MalformedEnvelope`] on non-hex input or input
/// that does not decode as the envelope tuple.
pub fn decode_envelope(full_report_hex: &str) -> Result<ReportEnvelope, ReportError> {
    let stripped = full_report_hex
        .strip_prefix("0x")
        .unwrap_or(full_report_hex);
    let raw = hex::decode(stripped)
        .map_err(|err| ReportError::MalformedEnvelope(format!("invalid hex: {err}")))?;

    let (report_context, report_blob, raw_rs, raw_ss, raw_vs) =
        EnvelopeTuple::abi_decode_params(&raw)
            .map_err(|err| ReportError::MalformedEnvelope(err.to_string()))?;

    Ok(ReportEnvelope {
        report_context,
        report_blob,
        raw_rs,
        raw_ss,
        raw_vs,
    })
}

// =============================================================================
// Payload Schemas
// =============================================================================

/// Decoded v3 (crypto streams) report payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDataV3 {
    /// Feed identifier, re-emitted as a `0x`-prefixed hex string.
    pub feed_id: String,
    /// Earliest timestamp the report is valid for (Unix seconds).
    pub valid_from_timestamp: u32,
    /// Timestamp of the observations (Unix seconds).
    pub observations_timestamp: u32,
    /// Fee to verify the report on-chain, paid in the native token.
    pub native_fee: U192,
    /// Fee to verify the report on-chain, paid in LINK.
    pub link_fee: U192,
    /// Timestamp the report expires at (Unix seconds).
    pub expires_at: u32,
    /// Benchmark price, fixed-point.
    pub benchmark_price: I192,
    /// Best bid, fixed-point.
    pub bid: I192,
    /// Best ask, fixed-point.
    pub ask: I192,
}

/// Report payload, tagged by schema version.
///
/// Future schema versions slot in as additional variants, each with its own
/// decode arm in [`decode_payload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportData {
    /// Crypto streams payload.
    V3(ReportDataV3),
}

impl ReportData {
    /// Schema version of the decoded payload.
    #[must_use]
    pub const fn schema_version(&self) -> u16 {
        match self {
            Self::V3(_) => V3_SCHEMA_VERSION,
        }
    }
}

type V3Tuple = (B256, u32, u32, U192, U192, u32, I192, I192, I192);

/// Decode a report payload according to the given schema version.
///
/// # Errors
///
/// Returns [`ReportError::UnsupportedSchemaVersion`] for any version other
/// than 3, or [`ReportError::MalformedEnvelope`] if the payload bytes do
/// not match the v3 layout.
pub fn decode_payload(report_blob: &[u8], schema_version: u16) -> Result<ReportData, ReportError> {
    match schema_version {
        V3_SCHEMA_VERSION => {
            let (
                feed_id,
                valid_from_timestamp,
                observations_timestamp,
                native_fee,
                link_fee,
                expires_at,
                benchmark_price,
                bid,
                ask,
            ) = V3Tuple::abi_decode_params(report_blob)
                .map_err(|err| ReportError::MalformedEnvelope(err.to_string()))?;

            Ok(ReportData::V3(ReportDataV3 {
                feed_id: format!("0x{}", hex::encode(feed_id)),
                valid_from_timestamp,
                observations_timestamp,
                native_fee,
                link_fee,
                expires_at,
                benchmark_price,
                bid,
                ask,
            }))
        }
        other => Err(ReportError::UnsupportedSchemaVersion(other)),
    }
}

// =============================================================================
// Full Decode
// =============================================================================

/// A fully decoded report: envelope plus typed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedReport {
    /// The envelope parts.
    pub envelope: ReportEnvelope,
    /// The typed payload.
    pub data: ReportData,
    /// Schema version the payload was decoded with.
    pub schema_version: u16,
}

/// Decode a hex-encoded full report.
///
/// The schema version is taken from `schema_version` when supplied,
/// otherwise derived from `feed_id`.
///
/// # Errors
///
/// Returns [`ReportError::AmbiguousSchema`] when neither hint is supplied,
/// plus any envelope or payload decode failure.
pub fn decode_full_report(
    full_report_hex: &str,
    feed_id: Option<&str>,
    schema_version: Option<u16>,
) -> Result<DecodedReport, ReportError> {
    let version = match (schema_version, feed_id) {
        (Some(version), _) => version,
        (None, Some(id)) => self::schema_version(id)?,
        (None, None) => return Err(ReportError::AmbiguousSchema),
    };

    let envelope = decode_envelope(full_report_hex)?;
    let data = decode_payload(&envelope.report_blob, version)?;

    Ok(DecodedReport {
        envelope,
        data,
        schema_version: version,
    })
}

// =============================================================================
// Fixed-Point Conversion
// =============================================================================

/// Convert a fixed-point integer to a decimal value.
///
/// The raw value is interpreted as scaled by `10^decimals`; the magnitude
/// is reconstructed exactly from the integer limbs, with rounding only at
/// the final division. Negative raw values convert to negative decimals.
#[must_use]
pub fn to_decimal(raw: I192, decimals: u32) -> f64 {
    let magnitude = u192_to_f64(raw.unsigned_abs());
    let scale = 10f64.powi(i32::try_from(decimals).unwrap_or(i32::MAX));
    let value = magnitude / scale;
    if raw.is_negative() { -value } else { value }
}

#[allow(clippy::cast_precision_loss)]
fn u192_to_f64(value: U192) -> f64 {
    let limbs = value.as_limbs();
    limbs[2] as f64 * 2f64.powi(128) + limbs[1] as f64 * 2f64.powi(64) + limbs[0] as f64
}

// =============================================================================
// Derived Prices
// =============================================================================

/// Price fields of a v3 report converted to decimals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedPrices {
    /// Timestamp of the observations (Unix seconds), passed through.
    pub observations_timestamp: u32,
    /// Benchmark price.
    pub benchmark_price: f64,
    /// Best bid.
    pub bid: f64,
    /// Best ask.
    pub ask: f64,
    /// Midpoint of the converted bid and ask.
    pub mid_price: f64,
}

impl DecodedReport {
    /// Extract the price fields as decimals.
    ///
    /// The mid price is averaged from the already-converted bid and ask,
    /// not from the raw integers.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::InvalidSchemaForPriceExtraction`] unless the
    /// report was decoded with the v3 schema.
    pub fn decoded_prices(&self, decimals: u32) -> Result<DecodedPrices, ReportError> {
        if self.schema_version != V3_SCHEMA_VERSION {
            return Err(ReportError::InvalidSchemaForPriceExtraction(
                self.schema_version,
            ));
        }
        let ReportData::V3(data) = &self.data;

        let bid = to_decimal(data.bid, decimals);
        let ask = to_decimal(data.ask, decimals);
        Ok(DecodedPrices {
            observations_timestamp: data.observations_timestamp,
            benchmark_price: to_decimal(data.benchmark_price, decimals),
            bid,
            ask,
            mid_price: (bid + ask) / 2.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use test_case::test_case;

    use super::*;

    const FEED_ID: &str = "0x00039d9e45394f473ab1f050a1b963e6b05351e52d71e507509ada0c95ed75b8";

    // Envelope encoded with the reference ABI layout: context words
    // 0x0101..., 0x0202..., 0x0303..., a 288-byte v3 payload, two r and two
    // s components, and a packed v word.
    const FULL_REPORT_HEX: &str = concat!(
        "0101010101010101010101010101010101010101010101010101010101010101",
        "0202020202020202020202020202020202020202020202020202020202020202",
        "0303030303030303030303030303030303030303030303030303030303030303",
        "00000000000000000000000000000000000000000000000000000000000000e0",
        "0000000000000000000000000000000000000000000000000000000000000220",
        "0000000000000000000000000000000000000000000000000000000000000280",
        "0100000000000000000000000000000000000000000000000000000000000000",
        "0000000000000000000000000000000000000000000000000000000000000120",
        "00039d9e45394f473ab1f050a1b963e6b05351e52d71e507509ada0c95ed75b8",
        "0000000000000000000000000000000000000000000000000000000069557528",
        "0000000000000000000000000000000000000000000000000000000069557528",
        "0000000000000000000000000000000000000000000000000018de76816d8000",
        "0000000000000000000000000000000000000000000000004563918244f40000",
        "00000000000000000000000000000000000000000000000000000000695593a0",
        "00000000000000000000000000000000000000000000128fdc41b71dc6f5d380",
        "00000000000000000000000000000000000000000000128fdbab5fad6a8bde40",
        "00000000000000000000000000000000000000000000128fe35765f5650deb00",
        "0000000000000000000000000000000000000000000000000000000000000002",
        "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
        "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb",
        "0000000000000000000000000000000000000000000000000000000000000002",
        "cccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccc",
        "dddddddddddddddddddddddddddddddddddddddddddddddddddddddddddddddd",
    );

    const BENCHMARK_RAW: &str = "87656352262094430000000";
    const BID_RAW: &str = "87656309944707825000000";
    const ASK_RAW: &str = "87656862768468300000000";

    fn reference_v3_data() -> ReportDataV3 {
        ReportDataV3 {
            feed_id: FEED_ID.to_string(),
            valid_from_timestamp: 1_767_208_232,
            observations_timestamp: 1_767_208_232,
            native_fee: U192::from(7_000_000_000_000_000_u64),
            link_fee: U192::from(5_000_000_000_000_000_000_u64),
            expires_at: 1_767_216_032,
            benchmark_price: BENCHMARK_RAW.parse().unwrap(),
            bid: BID_RAW.parse().unwrap(),
            ask: ASK_RAW.parse().unwrap(),
        }
    }

    // -------------------------------------------------------------------------
    // Schema versions
    // -------------------------------------------------------------------------

    #[test_case("0x0001", 1)]
    #[test_case("0x0002", 2)]
    #[test_case("0x0003", 3)]
    #[test_case("0x0004", 4)]
    #[test_case("0x000d", 13)]
    #[test_case("0x000A", 10; "uppercase hex")]
    #[test_case("0x000a", 10; "lowercase hex")]
    fn schema_version_from_prefix(prefix: &str, expected: u16) {
        let feed_id = format!("{prefix}{}", "a".repeat(60));
        assert_eq!(schema_version(&feed_id).unwrap(), expected);
    }

    #[test]
    fn schema_version_requires_0x_prefix() {
        let feed_id = format!("0003{}", "a".repeat(60));
        assert!(matches!(
            schema_version(&feed_id),
            Err(ReportError::InvalidFeedId(_))
        ));
    }

    #[test]
    fn schema_version_rejects_non_hex_window() {
        let feed_id = format!("0x00gx{}", "a".repeat(60));
        assert!(matches!(
            schema_version(&feed_id),
            Err(ReportError::InvalidFeedId(_))
        ));
    }

    #[test]
    fn schema_version_rejects_truncated_input() {
        assert!(matches!(
            schema_version("0x00"),
            Err(ReportError::InvalidFeedId(_))
        ));
    }

    #[test]
    fn validate_accepts_well_formed_feed_id() {
        assert!(validate_feed_id(FEED_ID).is_ok());
    }

    #[test_case("00039d9e"; "missing prefix")]
    #[test_case("0x1234"; "too short")]
    #[test_case("0xzz039d9e45394f473ab1f050a1b963e6b05351e52d71e507509ada0c95ed75b8"; "non hex")]
    fn validate_rejects_malformed_feed_id(feed_id: &str) {
        assert!(matches!(
            validate_feed_id(feed_id),
            Err(ReportError::InvalidFeedId(_))
        ));
    }

    // -------------------------------------------------------------------------
    // Envelope
    // -------------------------------------------------------------------------

    #[test]
    fn envelope_splits_reference_report() {
        let envelope = decode_envelope(FULL_REPORT_HEX).unwrap();

        assert_eq!(envelope.report_context[0], B256::repeat_byte(0x01));
        assert_eq!(envelope.report_context[1], B256::repeat_byte(0x02));
        assert_eq!(envelope.report_context[2], B256::repeat_byte(0x03));
        assert_eq!(envelope.report_blob.len(), 288);
        assert_eq!(
            envelope.raw_rs,
            vec![B256::repeat_byte(0xaa), B256::repeat_byte(0xbb)]
        );
        assert_eq!(
            envelope.raw_ss,
            vec![B256::repeat_byte(0xcc), B256::repeat_byte(0xdd)]
        );
        assert_eq!(envelope.raw_vs[0], 0x01);
    }

    #[test]
    fn envelope_parses_with_and_without_prefix() {
        let with_prefix = decode_envelope(&format!("0x{FULL_REPORT_HEX}")).unwrap();
        let without_prefix = decode_envelope(FULL_REPORT_HEX).unwrap();
        assert_eq!(with_prefix, without_prefix);
    }

    #[test]
    fn envelope_rejects_non_hex_input() {
        assert!(matches!(
            decode_envelope("0xnot-hex-at-all"),
            Err(ReportError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn envelope_rejects_truncated_input() {
        let truncated = &FULL_REPORT_HEX[..FULL_REPORT_HEX.len() / 2];
        assert!(matches!(
            decode_envelope(truncated),
            Err(ReportError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn envelope_rejects_short_input() {
        assert!(matches!(
            decode_envelope("0x00"),
            Err(ReportError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn envelope_round_trips_through_abi_encoding() {
        let envelope = decode_envelope(FULL_REPORT_HEX).unwrap();
        let re_encoded: EnvelopeTuple = (
            envelope.report_context,
            envelope.report_blob.clone(),
            envelope.raw_rs.clone(),
            envelope.raw_ss.clone(),
            envelope.raw_vs,
        );
        assert_eq!(hex::encode(re_encoded.abi_encode_params()), FULL_REPORT_HEX);
    }

    // -------------------------------------------------------------------------
    // v3 payload
    // -------------------------------------------------------------------------

    #[test]
    fn v3_payload_decodes_reference_values() {
        let envelope = decode_envelope(FULL_REPORT_HEX).unwrap();
        let ReportData::V3(data) = decode_payload(&envelope.report_blob, 3).unwrap();
        assert_eq!(data, reference_v3_data());
    }

    #[test]
    fn v3_payload_round_trips_exact_integers() {
        let expected = reference_v3_data();
        let encoded: Vec<u8> = (
            FEED_ID.parse::<B256>().unwrap(),
            expected.valid_from_timestamp,
            expected.observations_timestamp,
            expected.native_fee,
            expected.link_fee,
            expected.expires_at,
            expected.benchmark_price,
            expected.bid,
            expected.ask,
        )
            .abi_encode_params();

        let ReportData::V3(decoded) = decode_payload(&encoded, 3).unwrap();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn v3_payload_preserves_negative_prices() {
        let encoded: Vec<u8> = (
            FEED_ID.parse::<B256>().unwrap(),
            0u32,
            0u32,
            U192::ZERO,
            U192::ZERO,
            0u32,
            "-1000000000000000000".parse::<I192>().unwrap(),
            "-2000000000000000000".parse::<I192>().unwrap(),
            I192::ZERO,
        )
            .abi_encode_params();

        let ReportData::V3(decoded) = decode_payload(&encoded, 3).unwrap();
        assert!(decoded.benchmark_price.is_negative());
        assert_eq!(to_decimal(decoded.benchmark_price, 18), -1.0);
        assert_eq!(to_decimal(decoded.bid, 18), -2.0);
    }

    #[test_case(1)]
    #[test_case(2)]
    #[test_case(4)]
    #[test_case(13)]
    fn unsupported_schema_versions_are_rejected(version: u16) {
        let envelope = decode_envelope(FULL_REPORT_HEX).unwrap();
        assert!(matches!(
            decode_payload(&envelope.report_blob, version),
            Err(ReportError::UnsupportedSchemaVersion(v)) if v == version
        ));
    }

    // -------------------------------------------------------------------------
    // Full decode
    // -------------------------------------------------------------------------

    #[test]
    fn full_decode_derives_version_from_feed_id() {
        let decoded = decode_full_report(FULL_REPORT_HEX, Some(FEED_ID), None).unwrap();
        assert_eq!(decoded.schema_version, 3);
        assert_eq!(decoded.data.schema_version(), 3);
    }

    #[test]
    fn full_decode_honors_explicit_version() {
        let decoded = decode_full_report(FULL_REPORT_HEX, None, Some(3)).unwrap();
        assert_eq!(decoded.schema_version, 3);
    }

    #[test]
    fn full_decode_without_hints_is_ambiguous() {
        assert!(matches!(
            decode_full_report(FULL_REPORT_HEX, None, None),
            Err(ReportError::AmbiguousSchema)
        ));
    }

    #[test]
    fn full_decode_rejects_unsupported_explicit_version() {
        assert!(matches!(
            decode_full_report(FULL_REPORT_HEX, None, Some(4)),
            Err(ReportError::UnsupportedSchemaVersion(4))
        ));
    }

    // -------------------------------------------------------------------------
    // Fixed-point conversion
    // -------------------------------------------------------------------------

    #[test]
    fn zero_converts_to_zero() {
        assert_eq!(to_decimal(I192::ZERO, 18), 0.0);
    }

    #[test]
    fn one_unit_converts_exactly() {
        assert_eq!(to_decimal("1000000000000000000".parse().unwrap(), 18), 1.0);
    }

    #[test]
    fn large_value_converts_within_tolerance() {
        let value = to_decimal(BENCHMARK_RAW.parse().unwrap(), 18);
        assert!((value - 87_656.35).abs() < 0.01);
    }

    #[test]
    fn negative_values_convert_to_negative_decimals() {
        assert_eq!(
            to_decimal("-1000000000000000000".parse().unwrap(), 18),
            -1.0
        );
    }

    #[test]
    fn custom_decimals_are_honored() {
        assert_eq!(to_decimal(I192::try_from(100_000_000_i64).unwrap(), 8), 1.0);
    }

    proptest! {
        #[test]
        fn conversion_tracks_small_integers(raw in -1_000_000_000i64..1_000_000_000i64) {
            let value = to_decimal(I192::try_from(raw).unwrap(), 9);
            #[allow(clippy::cast_precision_loss)]
            let expected = raw as f64 / 1e9;
            prop_assert!((value - expected).abs() <= 1e-9 * expected.abs().max(1.0));
        }
    }

    // -------------------------------------------------------------------------
    // Derived prices
    // -------------------------------------------------------------------------

    #[test]
    fn prices_match_reference_report() {
        let decoded = decode_full_report(FULL_REPORT_HEX, Some(FEED_ID), None).unwrap();
        let prices = decoded.decoded_prices(DEFAULT_DECIMALS).unwrap();

        assert_eq!(prices.observations_timestamp, 1_767_208_232);
        assert!((prices.benchmark_price - 87_656.35).abs() < 0.01);
        assert!((prices.bid - 87_656.31).abs() < 0.01);
        assert!((prices.ask - 87_656.86).abs() < 0.01);
        assert!((prices.mid_price - 87_656.59).abs() < 0.01);
    }

    #[test]
    fn mid_price_is_exactly_the_average_of_converted_sides() {
        let decoded = decode_full_report(FULL_REPORT_HEX, Some(FEED_ID), None).unwrap();
        let prices = decoded.decoded_prices(DEFAULT_DECIMALS).unwrap();
        assert_eq!(prices.mid_price, (prices.bid + prices.ask) / 2.0);
    }

    #[test]
    fn price_extraction_requires_v3() {
        let mut decoded = decode_full_report(FULL_REPORT_HEX, Some(FEED_ID), None).unwrap();
        decoded.schema_version = 4;
        assert!(matches!(
            decoded.decoded_prices(DEFAULT_DECIMALS),
            Err(ReportError::InvalidSchemaForPriceExtraction(4))
        ));
    }
}
