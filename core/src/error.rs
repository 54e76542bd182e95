//! Error types for the contract harness.
//!
//! # Design
//! Every failed expectation is an `ApiError` value returned through `?`, so a
//! scenario stops at the step that detected it. Each variant carries the
//! literal endpoint, expected value and actual value needed to diagnose a
//! failure without re-running it.

use crate::http::HttpMethod;
use crate::schema::Violation;
use crate::status::ExpectedStatus;

/// Errors raised by requests, validators and assertions.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No response was obtained (DNS, connect, timeout, broken body).
    #[error("transport failure for {endpoint}: {message}")]
    Transport { endpoint: String, message: String },

    /// The server answered with a status outside the expected set.
    #[error("{method} {endpoint}: expected status {expected}, got {actual} (body: {body})")]
    StatusMismatch {
        method: HttpMethod,
        endpoint: String,
        expected: ExpectedStatus,
        actual: u16,
        body: String,
    },

    /// The body failed a declarative schema; lists every violation.
    #[error("schema validation failed for {context}: {violations}")]
    Schema { context: String, violations: String },

    /// A named field is missing or malformed.
    #[error("field `{field}`: expected {expectation}, got {actual}")]
    Field {
        field: String,
        expectation: String,
        actual: String,
    },

    /// A foreign-key field does not point at the expected parent.
    #[error("relation `{field}`: expected {expected}, got {actual}")]
    Relation {
        field: String,
        expected: String,
        actual: String,
    },

    /// Any other failed expectation.
    #[error("assertion failed: {0}")]
    Assertion(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("deserialization failed for {endpoint}: {message}")]
    Deserialization { endpoint: String, message: String },

    #[error("fixture `{name}`: {message}")]
    Fixture { name: String, message: String },
}

impl ApiError {
    /// Build a schema error from a non-empty violation list.
    pub fn schema(context: impl Into<String>, violations: &[Violation]) -> Self {
        let rendered = serde_json::to_string(violations)
            .unwrap_or_else(|_| format!("{violations:?}"));
        ApiError::Schema {
            context: context.into(),
            violations: rendered,
        }
    }

    pub fn field(field: impl Into<String>, expectation: impl Into<String>, actual: impl Into<String>) -> Self {
        ApiError::Field {
            field: field.into(),
            expectation: expectation.into(),
            actual: actual.into(),
        }
    }
}
