//! Shared request helper and the base resource client.
//!
//! # Design
//! `Requester` owns the `Session` and a shared `Transport`. It is the only
//! place that builds requests, measures them and enforces the expected
//! status. Per-resource clients compose a `Requester` and implement
//! `ResourceClient`, whose default methods turn a fixed base path into the
//! generic CRUD surface. Path construction is plain concatenation of base
//! path, sub path and encoded query string.

use std::sync::Arc;
use std::time::Instant;

use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::http::{ApiResponse, HttpMethod, HttpRequest, Transport};
use crate::session::Session;
use crate::status::{self, ExpectedStatus};

/// Longest response body excerpt carried in a status-mismatch error.
const BODY_EXCERPT_CHARS: usize = 200;

/// Issues one request at a time and asserts its status.
#[derive(Clone)]
pub struct Requester {
    session: Session,
    transport: Arc<dyn Transport>,
}

impl Requester {
    pub fn new(session: Session, transport: Arc<dyn Transport>) -> Self {
        Self { session, transport }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Same transport, different session.
    pub fn with_session(&self, session: Session) -> Self {
        Self {
            session,
            transport: Arc::clone(&self.transport),
        }
    }

    /// Build the request for `endpoint` without executing it.
    pub fn build_request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<HttpRequest, ApiError> {
        let body = body
            .map(|value| serde_json::to_string(value).map_err(|e| ApiError::Serialization(e.to_string())))
            .transpose()?;
        Ok(HttpRequest {
            method,
            path: format!("{}{}", self.session.base_url(), endpoint),
            headers: self.session.request_headers(body.is_some()),
            body,
        })
    }

    pub fn send(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&Value>,
        expected: impl Into<ExpectedStatus>,
    ) -> Result<ApiResponse, ApiError> {
        self.send_with_headers(method, endpoint, body, &[], expected)
    }

    /// Send with extra per-call headers appended after the session headers.
    pub fn send_with_headers(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&Value>,
        extra_headers: &[(&str, &str)],
        expected: impl Into<ExpectedStatus>,
    ) -> Result<ApiResponse, ApiError> {
        let expected = expected.into();
        let mut request = self.build_request(method, endpoint, body)?;
        request
            .headers
            .extend(extra_headers.iter().map(|(k, v)| (k.to_string(), v.to_string())));

        info!(%method, endpoint, "sending request");
        let started = Instant::now();
        let raw = self.transport.execute(&request)?;
        let response = ApiResponse::from_http(method, endpoint, raw, started.elapsed());

        if !expected.matches(response.status) {
            warn!(%method, endpoint, %expected, actual = response.status, "unexpected status");
            return Err(ApiError::StatusMismatch {
                method,
                endpoint: endpoint.to_string(),
                expected,
                actual: response.status,
                body: excerpt(&response.body),
            });
        }

        info!(
            %method,
            endpoint,
            status = response.status,
            duration_ms = response.duration_ms() as u64,
            "status confirmed"
        );
        Ok(response)
    }

    /// Log in through `POST /auth/login` and return a session carrying the
    /// issued bearer token.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Session, ApiError> {
        let body = json!({ "username": username, "password": password });
        let response = self.send(HttpMethod::Post, "/auth/login", Some(&body), status::OK)?;
        let token = response
            .body
            .get("token")
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::field("token", "a string", excerpt(&response.body)))?;
        info!(username, "authenticated");
        Ok(self.session.clone().with_bearer_token(token))
    }
}

fn excerpt(body: &Value) -> String {
    let text = match body {
        Value::String(raw) => raw.clone(),
        other => other.to_string(),
    };
    text.chars().take(BODY_EXCERPT_CHARS).collect()
}

/// Encode query parameters as `?k=v&...`, or an empty string when there are
/// none.
pub fn encode_query(params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return String::new();
    }
    let encoded = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter())
        .finish();
    format!("?{encoded}")
}

/// Generic CRUD surface over a fixed base path such as `/posts`.
pub trait ResourceClient {
    fn requester(&self) -> &Requester;

    fn base_path(&self) -> &str;

    fn get(&self, sub_path: &str, expected: impl Into<ExpectedStatus>) -> Result<ApiResponse, ApiError> {
        let endpoint = format!("{}{}", self.base_path(), sub_path);
        self.requester().send(HttpMethod::Get, &endpoint, None, expected)
    }

    fn post(
        &self,
        body: &Value,
        sub_path: &str,
        expected: impl Into<ExpectedStatus>,
    ) -> Result<ApiResponse, ApiError> {
        let endpoint = format!("{}{}", self.base_path(), sub_path);
        self.requester().send(HttpMethod::Post, &endpoint, Some(body), expected)
    }

    fn put(&self, id: u64, body: &Value, expected: impl Into<ExpectedStatus>) -> Result<ApiResponse, ApiError> {
        let endpoint = format!("{}/{id}", self.base_path());
        self.requester().send(HttpMethod::Put, &endpoint, Some(body), expected)
    }

    fn patch(&self, id: u64, body: &Value, expected: impl Into<ExpectedStatus>) -> Result<ApiResponse, ApiError> {
        let endpoint = format!("{}/{id}", self.base_path());
        self.requester().send(HttpMethod::Patch, &endpoint, Some(body), expected)
    }

    fn delete(&self, id: u64, expected: impl Into<ExpectedStatus>) -> Result<ApiResponse, ApiError> {
        let endpoint = format!("{}/{id}", self.base_path());
        self.requester().send(HttpMethod::Delete, &endpoint, None, expected)
    }

    fn get_by_id(&self, id: u64, expected: impl Into<ExpectedStatus>) -> Result<ApiResponse, ApiError> {
        self.get(&format!("/{id}"), expected)
    }

    fn get_all(&self, query: &[(&str, &str)], expected: impl Into<ExpectedStatus>) -> Result<ApiResponse, ApiError> {
        self.get(&encode_query(query), expected)
    }
}
