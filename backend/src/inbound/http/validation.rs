//! Shared request parsing helpers for inbound HTTP adapters.
//!
//! Path segments and JSON bodies are parsed here rather than by Actix
//! extractors so that failures surface as domain [`Error`]s with the same
//! envelope as field validation, and so handlers control when parsing runs.

use serde::de::DeserializeOwned;
use serde_json::json;

use crate::domain::{Error, UserId};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidId,
    MissingBody,
    MalformedBody,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidId => "invalid_id",
            ErrorCode::MissingBody => "missing_body",
            ErrorCode::MalformedBody => "malformed_body",
        }
    }
}

/// Parse a `{userId}` path segment into a [`UserId`].
///
/// Non-numeric, zero, and negative identifiers are rejected with
/// `invalid_id`.
pub(crate) fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|value| UserId::new(value).ok())
        .ok_or_else(|| {
            Error::invalid_request("userId must be a positive integer").with_details(json!({
                "field": "userId",
                "value": raw,
                "code": ErrorCode::InvalidId.as_str(),
            }))
        })
}

/// Deserialize a JSON request body.
///
/// An empty body is reported as `missing_body`; syntax errors, type
/// mismatches, and unknown fields as `malformed_body`.
pub(crate) fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(
            Error::invalid_request("request body is required").with_details(json!({
                "code": ErrorCode::MissingBody.as_str(),
            })),
        );
    }

    serde_json::from_slice(body).map_err(|err| {
        Error::invalid_request("request body is not valid JSON for this operation").with_details(
            json!({
                "code": ErrorCode::MalformedBody.as_str(),
                "reason": err.to_string(),
            }),
        )
    })
}
