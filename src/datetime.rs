//! Date/time helpers.
//!
//! The API is contractually UTC-only. Payload timestamps are ISO-8601 strings
//! and transport metadata (`Last-Modified`, `If-Modified-Since`) uses RFC 1123
//! HTTP dates. Both are normalized to timezone-naive UTC
//! [`NaiveDateTime`] values.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, TimeZone, Utc};
use std::time::SystemTime;

/// Extended layouts the date and time parts are normalized to.
const EXTENDED_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// A date/time value could not be parsed or rendered.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DateTimeError {
    /// The value is not an ISO-8601 date/time.
    #[error("not an ISO-8601 date/time")]
    InvalidIso8601,

    /// The value carries a non-zero UTC offset.
    #[error("expected a UTC date/time, found offset {0}")]
    NonUtc(FixedOffset),

    /// The value is not an RFC 1123 HTTP date.
    #[error("not an RFC 1123 date/time")]
    InvalidHttpDate,

    /// The value lies outside the range HTTP dates can express.
    #[error("{0} cannot be expressed as an HTTP date")]
    OutOfRange(NaiveDateTime),
}

/// Parses an ISO-8601 date/time into a naive UTC value.
///
/// Both the extended (`2012-01-01T15:32:23`) and basic (`20120101T153223`)
/// formats are accepted, with minute or second precision and optional
/// fractional seconds. The offset may be `Z`, `±HH`, `±HHMM` or `±HH:MM`.
/// Values without an offset are taken as UTC. A zero offset is stripped; any
/// other offset is rejected.
///
/// # Examples
///
/// ```
/// use iconfinder::datetime::parse_iso8601_utc;
///
/// let zulu = parse_iso8601_utc("2012-01-01T15:32:23Z").unwrap();
/// let naive = parse_iso8601_utc("2012-01-01T15:32:23").unwrap();
/// let basic = parse_iso8601_utc("20120101T153223+00").unwrap();
/// assert_eq!(zulu, naive);
/// assert_eq!(zulu, basic);
///
/// assert!(parse_iso8601_utc("2012-01-01T15:32:23+01:00").is_err());
/// ```
pub fn parse_iso8601_utc(value: &str) -> Result<NaiveDateTime, DateTimeError> {
    let (date, time) = value
        .trim()
        .split_once(|c: char| matches!(c, 'T' | 't' | ' '))
        .ok_or(DateTimeError::InvalidIso8601)?;
    let (time, offset) = split_offset(time)?;
    let naive = parse_naive(date, time)?;

    match offset {
        0 => Ok(naive),
        seconds => Err(DateTimeError::NonUtc(
            FixedOffset::east_opt(seconds).ok_or(DateTimeError::InvalidIso8601)?,
        )),
    }
}

/// Splits a trailing UTC offset off a time, returning it in seconds.
fn split_offset(time: &str) -> Result<(&str, i32), DateTimeError> {
    if let Some(time) = time.strip_suffix('Z').or_else(|| time.strip_suffix('z')) {
        return Ok((time, 0));
    }
    let Some(at) = time.rfind(|c: char| c == '+' || c == '-') else {
        return Ok((time, 0));
    };

    let (time, offset) = time.split_at(at);
    let sign = if offset.starts_with('-') { -1 } else { 1 };
    let body = &offset[1..];
    let (hours, minutes) = match body.len() {
        2 => (body, "00"),
        4 => body.split_at(2),
        5 if body.as_bytes()[2] == b':' => (&body[..2], &body[3..]),
        _ => return Err(DateTimeError::InvalidIso8601),
    };

    match (digits(hours), digits(minutes)) {
        (Some(hours), Some(minutes)) if hours < 24 && minutes < 60 => {
            Ok((time, sign * (hours * 3600 + minutes * 60)))
        }
        _ => Err(DateTimeError::InvalidIso8601),
    }
}

fn digits(text: &str) -> Option<i32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Parses the date and time parts, rewriting the basic format as extended.
fn parse_naive(date: &str, time: &str) -> Result<NaiveDateTime, DateTimeError> {
    let date = match date.len() {
        8 if digits(date).is_some() => format!("{}-{}-{}", &date[..4], &date[4..6], &date[6..]),
        _ => date.to_string(),
    };

    let time = time.replace(',', ".");
    let time = if time.contains(':') {
        time
    } else {
        let (whole, fraction) = time.split_at(time.find('.').unwrap_or(time.len()));
        match whole.len() {
            4 => format!("{}:{}{}", &whole[..2], &whole[2..], fraction),
            6 => format!("{}:{}:{}{}", &whole[..2], &whole[2..4], &whole[4..], fraction),
            _ => return Err(DateTimeError::InvalidIso8601),
        }
    };

    let text = format!("{date}T{time}");
    EXTENDED_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&text, format).ok())
        .ok_or(DateTimeError::InvalidIso8601)
}

/// Forces an aware date/time to naive UTC.
pub fn to_naive_utc<Tz: TimeZone>(value: &DateTime<Tz>) -> NaiveDateTime {
    value.naive_utc()
}

/// Renders a naive UTC value as an RFC 1123 HTTP date.
///
/// Sub-second precision is dropped. Values before the Unix epoch or past
/// year 9999 cannot be expressed.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use iconfinder::datetime::http_date;
///
/// let value = NaiveDate::from_ymd_opt(2012, 1, 1)
///     .unwrap()
///     .and_hms_opt(15, 32, 23)
///     .unwrap();
/// assert_eq!(http_date(value).unwrap(), "Sun, 01 Jan 2012 15:32:23 GMT");
/// ```
pub fn http_date(value: NaiveDateTime) -> Result<String, DateTimeError> {
    let utc = value.and_utc();
    if utc.timestamp() < 0 || utc.year() > 9999 {
        return Err(DateTimeError::OutOfRange(value));
    }
    Ok(httpdate::fmt_http_date(SystemTime::from(utc)))
}

/// Parses an HTTP date into a naive UTC value.
pub fn parse_http_date(value: &str) -> Result<NaiveDateTime, DateTimeError> {
    let system =
        httpdate::parse_http_date(value.trim()).map_err(|_| DateTimeError::InvalidHttpDate)?;
    Ok(DateTime::<Utc>::from(system).naive_utc())
}
