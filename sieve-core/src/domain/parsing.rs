// sieve-core/src/domain/parsing.rs

//! Lenient converters from loosely formatted raw cells into typed values.
//!
//! Every function here is total: malformed input yields `None`, never an error.
//! Deciding what a `None` means (quarantine, default, hard failure) belongs to
//! the callers in `domain::schema` and `domain::transform`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use sha1::{Digest, Sha1};
use std::borrow::Cow;
use std::sync::OnceLock;

/// Date formats tried by [`parse_date_lenient`], in priority order.
/// `YYYY/DD/MM` only wins when `YYYY/MM/DD` cannot parse (day > 12).
pub const LAUNCH_DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y/%d/%m"];

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Number of hex characters of the SHA-1 digest kept for derived ids (48 bits).
const DERIVED_ID_HEX_LEN: usize = 12;

fn re_decimal_comma() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d+),(\d+)").unwrap_or_else(|_| {
            // Hardcoded pattern, cannot fail.
            Regex::new("$^").unwrap_or_else(|_| unreachable!())
        })
    })
}

fn re_dimensions() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(\d+)\s*x\s*(\d+)\s*x\s*(\d+)\s*$")
            .unwrap_or_else(|_| Regex::new("$^").unwrap_or_else(|_| unreachable!()))
    })
}

/// Rewrites decimal commas (`"12,5"` -> `"12.5"`) and trims the result.
/// `None` passes through untouched.
pub fn normalize_decimal(value: Option<&str>) -> Option<Cow<'_, str>> {
    let value = value?;
    match re_decimal_comma().replace_all(value, "$1.$2") {
        Cow::Borrowed(s) => Some(Cow::Borrowed(s.trim())),
        Cow::Owned(s) => Some(Cow::Owned(s.trim().to_string())),
    }
}

/// Parses a float after decimal normalization. Null, empty, unparsable and
/// non-finite inputs all map to `None`.
pub fn parse_float_lenient(value: Option<&str>) -> Option<f64> {
    let raw = value.filter(|v| !v.is_empty())?;
    let normalized = normalize_decimal(Some(raw))?;
    normalized
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
}

/// Parses a calendar date using [`LAUNCH_DATE_FORMATS`]; first match wins.
/// The result is midnight of that day.
pub fn parse_date_lenient(value: Option<&str>) -> Option<NaiveDateTime> {
    let trimmed = value.map(str::trim).filter(|v| !v.is_empty())?;
    LAUNCH_DATE_FORMATS.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(trimmed, fmt)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    })
}

/// Parses an `LxWxH` millimetre triple (lowercase `x`, any whitespace around
/// the numbers). Partial triples and overflowing numbers yield `None`.
pub fn parse_dimensions(value: Option<&str>) -> Option<(i64, i64, i64)> {
    let caps = re_dimensions().captures(value?)?;
    let length = caps.get(1)?.as_str().parse().ok()?;
    let width = caps.get(2)?.as_str().parse().ok()?;
    let height = caps.get(3)?.as_str().parse().ok()?;
    Some((length, width, height))
}

/// Derives a surrogate product id from a sku: SHA-1 over the UTF-8 bytes,
/// first 12 hex characters read as an unsigned 48-bit integer.
///
/// The value is identical across runs and across implementations hashing the
/// same bytes, so ids stay stable for products that never receive one upstream.
pub fn derive_product_id(sku: &str) -> i64 {
    let digest = Sha1::digest(sku.as_bytes());
    let hex_digest = hex::encode(digest);
    // 12 hex chars fit in 48 bits, always below i64::MAX.
    i64::from_str_radix(&hex_digest[..DERIVED_ID_HEX_LEN], 16).unwrap_or_default()
}

/// Parses a timestamp cell: RFC 3339 (converted to UTC), naive ISO date-times
/// with `T` or space separator, or a bare `YYYY-MM-DD` (midnight).
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(with_offset.naive_utc());
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Parses a 64-bit integer cell. Float text with a zero fractional part
/// (`"5.0"`) is accepted, anything else fractional is not.
pub fn parse_integer(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if let Ok(int) = trimmed.parse::<i64>() {
        return Some(int);
    }
    let float = trimmed.parse::<f64>().ok()?;
    let in_range = float >= i64::MIN as f64 && float < i64::MAX as f64;
    (float.is_finite() && float.fract() == 0.0 && in_range).then_some(float as i64)
}
