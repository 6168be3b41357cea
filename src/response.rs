//! Raw API responses.
//!
//! A [`Response`] is what the transport hands back for a status below 400:
//! status, headers, raw body and latency. Capabilities read the JSON payload
//! and the `Last-Modified` metadata from it.

use crate::{datetime, Error, Result};
use chrono::NaiveDateTime;
use http::header::LAST_MODIFIED;
use http::{HeaderMap, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// A successful (status < 400) HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// The raw response body as a string.
    ///
    /// Kept for debugging: it is the exact text the server sent.
    pub raw_body: String,

    /// Time from sending the request to receiving the full body.
    pub latency: Duration,
}

impl Response {
    /// Creates a new `Response`.
    pub fn new(status: StatusCode, headers: HeaderMap, raw_body: String, latency: Duration) -> Self {
        Self {
            status,
            headers,
            raw_body,
            latency,
        }
    }

    /// Returns a header value by name, if present and valid UTF-8.
    ///
    /// # Examples
    ///
    /// ```
    /// # use iconfinder::Response;
    /// # use http::{HeaderMap, StatusCode, HeaderValue};
    /// # use std::time::Duration;
    /// let mut headers = HeaderMap::new();
    /// headers.insert("content-type", HeaderValue::from_static("application/json"));
    ///
    /// let response = Response::new(StatusCode::OK, headers, String::new(), Duration::ZERO);
    ///
    /// assert_eq!(response.header("content-type"), Some("application/json"));
    /// ```
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Parses the body as JSON.
    pub fn json(&self) -> Result<Value> {
        serde_json::from_str(&self.raw_body).map_err(|e| {
            tracing::error!(
                error = %e,
                raw_response = %self.raw_body,
                "Failed to parse response body"
            );

            Error::DeserializationFailed {
                raw_response: self.raw_body.clone(),
                serde_error: e.to_string(),
                status: self.status,
            }
        })
    }

    /// Reads the `Last-Modified` header as a naive UTC value.
    ///
    /// Returns `Ok(None)` when the header is absent and an error when it is
    /// present but not an HTTP date.
    pub fn last_modified(&self) -> Result<Option<NaiveDateTime>> {
        let Some(value) = self.headers.get(LAST_MODIFIED) else {
            return Ok(None);
        };

        let malformed = || Error::MalformedHeader {
            name: "Last-Modified",
            value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
        };
        let text = value.to_str().map_err(|_| malformed())?;
        datetime::parse_http_date(text).map(Some).map_err(|_| malformed())
    }

    /// Returns `true` for `304 Not Modified`.
    pub fn is_not_modified(&self) -> bool {
        self.status == StatusCode::NOT_MODIFIED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use http::HeaderValue;
    use serde_json::json;

    fn response(headers: HeaderMap, body: &str) -> Response {
        Response::new(StatusCode::OK, headers, body.to_string(), Duration::from_millis(5))
    }

    #[test]
    fn test_json_body() {
        let response = response(HeaderMap::new(), r#"{"license_id": 5}"#);
        assert_eq!(response.json().unwrap(), json!({"license_id": 5}));
    }

    #[test]
    fn test_invalid_json_body() {
        let response = response(HeaderMap::new(), "invalid json");
        match response.json() {
            Err(Error::DeserializationFailed {
                raw_response,
                status,
                ..
            }) => {
                assert_eq!(raw_response, "invalid json");
                assert_eq!(status, StatusCode::OK);
            }
            other => panic!("Expected DeserializationFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_last_modified() {
        assert_eq!(response(HeaderMap::new(), "").last_modified().unwrap(), None);

        let mut headers = HeaderMap::new();
        headers.insert(
            LAST_MODIFIED,
            HeaderValue::from_static("Sun, 01 Jan 2012 15:32:23 GMT"),
        );
        let expected = NaiveDate::from_ymd_opt(2012, 1, 1)
            .unwrap()
            .and_hms_opt(15, 32, 23)
            .unwrap();
        assert_eq!(
            response(headers, "").last_modified().unwrap(),
            Some(expected)
        );
    }

    #[test]
    fn test_malformed_last_modified() {
        let mut headers = HeaderMap::new();
        headers.insert(LAST_MODIFIED, HeaderValue::from_static("yesterday"));
        match response(headers, "").last_modified() {
            Err(Error::MalformedHeader { name, value }) => {
                assert_eq!(name, "Last-Modified");
                assert_eq!(value, "yesterday");
            }
            other => panic!("Expected MalformedHeader, got {:?}", other),
        }
    }
}
