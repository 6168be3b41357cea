//! Error types for API calls and payload validation.
//!
//! Two taxonomies are kept apart:
//!
//! - [`Error`] is returned when the server reports a failure, or the transport
//!   itself fails. These are recoverable by the caller (retry on rate limit,
//!   surface "not found" to a user, ...).
//! - [`SchemaError`] is returned when a payload does not match the schema
//!   declared for an entity. It indicates a contract mismatch between client
//!   and server and is always fatal to the deserialize call.
//!
//! Capability methods surface schema failures as [`Error::Schema`] so a single
//! `Result` type comes back, while the inner [`SchemaError`] stays matchable.

use crate::rate_limit::RateLimitInfo;
use http::{HeaderMap, StatusCode};
use serde::Deserialize;
use serde_json::Value;

/// The main error type for API calls.
///
/// # Examples
///
/// ```no_run
/// use iconfinder::{Client, Error, License, Retrievable};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::new()?;
///
/// match License::get(&client, &5, None).await {
///     Ok(Some(license)) => println!("{}", license.name()),
///     Ok(None) => unreachable!("no conditional header was sent"),
///     Err(Error::NotFound { message }) => eprintln!("no such license: {message}"),
///     Err(e) if e.is_retryable() => eprintln!("try again later: {e}"),
///     Err(e) => return Err(e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A network-level error occurred (connection failed, DNS lookup failed, etc.).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The request timed out.
    #[error("Request timed out")]
    Timeout,

    /// The server rejected a request parameter (status 400 with an
    /// `invalid_<parameter>` error code).
    #[error("Invalid parameter {parameter}: {message}")]
    InvalidParameter {
        /// The error message reported by the server.
        message: String,
        /// The offending parameter, taken from the error code.
        parameter: String,
    },

    /// The server rejected the request (status 400).
    #[error("Bad request: {message}")]
    BadRequest {
        /// The error message reported by the server.
        message: String,
    },

    /// The client credentials were rejected (status 401).
    #[error("Bad credentials: {message}")]
    BadCredentials {
        /// The error message reported by the server.
        message: String,
    },

    /// Access to the resource was denied (status 403).
    #[error("Permission denied: {message}")]
    PermissionDenied {
        /// The error message reported by the server.
        message: String,
    },

    /// The credentials lack the scope needed for the resource (status 403 with
    /// the `insufficient_permissions` error code).
    ///
    /// This is a specialization of [`Error::PermissionDenied`];
    /// [`Error::is_permission_denied`] is `true` for both.
    #[error("Insufficient permissions: {message}")]
    InsufficientPermissions {
        /// The error message reported by the server.
        message: String,
    },

    /// The requested resource does not exist (status 404).
    #[error("Not found: {message}")]
    NotFound {
        /// The error message reported by the server.
        message: String,
    },

    /// The request rate limit was exceeded (status 429).
    #[error("Rate limit exceeded: {message}")]
    RateLimitExceeded {
        /// The error message reported by the server.
        message: String,
        /// Rate limit information parsed from the response headers, if any.
        rate_limit: Option<RateLimitInfo>,
    },

    /// The server failed internally (status 500).
    #[error("Internal server error: {message}")]
    InternalServer {
        /// The error message reported by the server.
        message: String,
    },

    /// The server answered with a status code this client does not expect
    /// for the call that was made.
    #[error("Unexpected response with status code {status}")]
    UnexpectedResponse {
        /// The HTTP status code.
        status: StatusCode,
    },

    /// A successful response body was not valid JSON.
    #[error("Failed to parse response body (status {status}): {serde_error}")]
    DeserializationFailed {
        /// The raw response body that failed to parse
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },

    /// A successful response body did not match the entity schema.
    #[error("Response does not match schema: {0}")]
    Schema(#[from] SchemaError),

    /// A response header carrying metadata was present but malformed.
    #[error("Malformed {name} header: {value:?}")]
    MalformedHeader {
        /// The header name.
        name: &'static str,
        /// The raw header value.
        value: String,
    },

    /// The caller passed an argument outside the accepted domain.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid configuration was provided.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// An invalid URL was provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Translates an error response (status >= 400) into an [`Error`].
    ///
    /// The body is expected to look like `{"code": "...", "message": "..."}`.
    /// A missing or malformed body falls back to a generic message per kind;
    /// this function never fails.
    pub fn from_response(status: StatusCode, headers: &HeaderMap, raw_body: &str) -> Self {
        let body: ErrorBody = serde_json::from_str(raw_body).unwrap_or_default();
        let message = |fallback: &str| {
            body.message
                .clone()
                .unwrap_or_else(|| fallback.to_string())
        };

        match status.as_u16() {
            400 => match body.code.as_deref().and_then(|code| code.strip_prefix("invalid_")) {
                Some(parameter) => Error::InvalidParameter {
                    message: message("invalid parameter"),
                    parameter: parameter.to_string(),
                },
                None => Error::BadRequest {
                    message: message("bad request"),
                },
            },
            401 => Error::BadCredentials {
                message: message("bad credentials"),
            },
            403 if body.code.as_deref() == Some("insufficient_permissions") => {
                Error::InsufficientPermissions {
                    message: message(
                        "insufficient permissions to access the requested resource",
                    ),
                }
            }
            403 => Error::PermissionDenied {
                message: message("permission to the requested resource was denied"),
            },
            404 => Error::NotFound {
                message: message("the requested resource was not found"),
            },
            429 => Error::RateLimitExceeded {
                message: message("request rate limit exceeded"),
                rate_limit: RateLimitInfo::from_headers(headers),
            },
            500 => Error::InternalServer {
                message: message("internal server error"),
            },
            _ => Error::UnexpectedResponse { status },
        }
    }

    /// Returns `true` if this error is potentially retryable.
    ///
    /// Network errors, timeouts, rate limiting and 5xx responses are
    /// considered retryable. Retrying is left to the caller.
    ///
    /// # Examples
    ///
    /// ```
    /// use iconfinder::Error;
    ///
    /// let err = Error::InternalServer { message: "oops".to_string() };
    /// assert!(err.is_retryable());
    ///
    /// let err = Error::NotFound { message: "gone".to_string() };
    /// assert!(!err.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Network(_) | Error::Timeout => true,
            Error::RateLimitExceeded { .. } | Error::InternalServer { .. } => true,
            Error::UnexpectedResponse { status } => status.is_server_error(),
            _ => false,
        }
    }

    /// Returns `true` for [`Error::PermissionDenied`] and its specialization
    /// [`Error::InsufficientPermissions`].
    pub fn is_permission_denied(&self) -> bool {
        matches!(
            self,
            Error::PermissionDenied { .. } | Error::InsufficientPermissions { .. }
        )
    }

    /// Returns `true` for [`Error::BadRequest`] and its specialization
    /// [`Error::InvalidParameter`].
    pub fn is_bad_request(&self) -> bool {
        matches!(self, Error::BadRequest { .. } | Error::InvalidParameter { .. })
    }

    /// Returns the HTTP status code if this error has one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::InvalidParameter { .. } | Error::BadRequest { .. } => {
                Some(StatusCode::BAD_REQUEST)
            }
            Error::BadCredentials { .. } => Some(StatusCode::UNAUTHORIZED),
            Error::PermissionDenied { .. } | Error::InsufficientPermissions { .. } => {
                Some(StatusCode::FORBIDDEN)
            }
            Error::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            Error::RateLimitExceeded { .. } => Some(StatusCode::TOO_MANY_REQUESTS),
            Error::InternalServer { .. } => Some(StatusCode::INTERNAL_SERVER_ERROR),
            Error::UnexpectedResponse { status } => Some(*status),
            Error::DeserializationFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the server-reported (or fallback) message of an API error.
    pub fn message(&self) -> Option<&str> {
        match self {
            Error::InvalidParameter { message, .. }
            | Error::BadRequest { message }
            | Error::BadCredentials { message }
            | Error::PermissionDenied { message }
            | Error::InsufficientPermissions { message }
            | Error::NotFound { message }
            | Error::RateLimitExceeded { message, .. }
            | Error::InternalServer { message } => Some(message),
            _ => None,
        }
    }

    /// Returns rate limit information if available.
    pub fn rate_limit_info(&self) -> Option<&RateLimitInfo> {
        match self {
            Error::RateLimitExceeded { rate_limit, .. } => rate_limit.as_ref(),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// A payload failed to match the schema declared for an entity.
///
/// Every variant names the offending field where there is one. Deserializing
/// stops at the first failure in schema declaration order.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// The payload handed to an entity was not a JSON object.
    #[error("expected {entity} payload to be a JSON object, but it is {actual}")]
    NotAnObject {
        /// The entity being deserialized.
        entity: &'static str,
        /// The JSON type that was found instead.
        actual: &'static str,
    },

    /// A required field was absent or `null`.
    #[error("expected field {field} to be present in payload")]
    MissingField {
        /// The field name.
        field: &'static str,
    },

    /// A present field had the wrong JSON type.
    #[error("expected field {field} to be {expected}, but it is {actual}")]
    TypeMismatch {
        /// The field name.
        field: &'static str,
        /// The expected kind.
        expected: &'static str,
        /// The JSON type that was found.
        actual: &'static str,
    },

    /// An enum field carried a token outside its wire-token table.
    #[error("field {field} has unknown value {value:?}")]
    InvalidEnumValue {
        /// The field name.
        field: &'static str,
        /// The rejected token.
        value: String,
    },

    /// A date/time field could not be parsed as ISO-8601.
    #[error("field {field} is not an ISO-8601 date/time: {value:?}")]
    InvalidDateTime {
        /// The field name.
        field: &'static str,
        /// The rejected value.
        value: String,
    },

    /// A date/time field carried a non-zero UTC offset.
    #[error("expected field {field} to be a UTC date/time: {value:?}")]
    NonUtcDateTime {
        /// The field name.
        field: &'static str,
        /// The rejected value.
        value: String,
    },

    /// None of the variants of a polymorphic field matched the payload.
    #[error("unable to determine model of field {field}: {value}")]
    UnresolvedPolymorphicType {
        /// The field name.
        field: &'static str,
        /// The unresolved JSON object.
        value: Value,
    },

    /// Code asked an entity payload for a field its schema does not declare.
    #[error("field {field} is not declared in the {entity} schema")]
    UndeclaredField {
        /// The entity whose schema was consulted.
        entity: &'static str,
        /// The field name.
        field: &'static str,
    },

    /// Code read a field into a native type its declared kind does not map to.
    #[error("field {field} is declared as {kind} and cannot be read as the requested type")]
    IncompatibleType {
        /// The field name.
        field: &'static str,
        /// The declared kind.
        kind: &'static str,
    },

    /// A listing page held more entities than its reported total.
    #[error("page holds {len} entities but {field} is {total_count}")]
    PageExceedsTotal {
        /// The total count field.
        field: &'static str,
        /// The number of entities on the page.
        len: usize,
        /// The reported total.
        total_count: u64,
    },
}

impl SchemaError {
    /// Builds a [`SchemaError::TypeMismatch`] for `value`.
    pub fn type_mismatch(field: &'static str, expected: &'static str, value: &Value) -> Self {
        SchemaError::TypeMismatch {
            field,
            expected,
            actual: json_type(value),
        }
    }

    /// Returns the name of the offending field, if the error has one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            SchemaError::NotAnObject { .. } => None,
            SchemaError::MissingField { field }
            | SchemaError::TypeMismatch { field, .. }
            | SchemaError::InvalidEnumValue { field, .. }
            | SchemaError::InvalidDateTime { field, .. }
            | SchemaError::NonUtcDateTime { field, .. }
            | SchemaError::UnresolvedPolymorphicType { field, .. }
            | SchemaError::UndeclaredField { field, .. }
            | SchemaError::IncompatibleType { field, .. }
            | SchemaError::PageExceedsTotal { field, .. } => Some(field),
        }
    }
}

/// Names the JSON type of `value` the way errors report it.
pub fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A specialized `Result` type for API calls.
///
/// This is a convenience alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
