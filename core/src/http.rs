//! HTTP transport types and the single-call request primitive.
//!
//! # Design
//! Requests and responses are described as plain data. `Requester` builds an
//! `HttpRequest`, hands it to a `Transport`, and interprets the returned
//! `HttpResponse`. A transport performs exactly one network call per
//! `execute` and never treats a status code as an error, so the caller
//! decides pass/fail. Swapping the transport lets unit tests run without a
//! network.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `path` is the absolute URL: session base URL followed by the endpoint.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data, as returned by a `Transport`.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Executes one HTTP round-trip.
///
/// Implementations must return `Ok` for every status code the server sends
/// back; only failures to obtain a response at all are errors.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Blocking transport backed by a ureq agent.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, req: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = req.path.as_str();
        let body = req.body.as_deref();

        let result = match req.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(url);
                for (name, value) in &req.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Delete => {
                let mut builder = self.agent.delete(url);
                for (name, value) in &req.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch => {
                let mut builder = match req.method {
                    HttpMethod::Post => self.agent.post(url),
                    HttpMethod::Put => self.agent.put(url),
                    _ => self.agent.patch(url),
                };
                for (name, value) in &req.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(|e| ApiError::Transport {
            endpoint: req.path.clone(),
            message: e.to_string(),
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport {
                endpoint: req.path.clone(),
                message: e.to_string(),
            })?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Response descriptor handed back to resource clients and flows.
///
/// `body` is the parsed JSON payload: `Null` for an empty body, a JSON string
/// holding the raw text when the payload is not JSON.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub method: HttpMethod,
    pub endpoint: String,
    pub status: u16,
    pub body: Value,
    pub headers: BTreeMap<String, String>,
    pub duration: Duration,
}

impl ApiResponse {
    pub(crate) fn from_http(
        method: HttpMethod,
        endpoint: &str,
        response: HttpResponse,
        duration: Duration,
    ) -> Self {
        let body = if response.body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&response.body).unwrap_or(Value::String(response.body))
        };
        let headers = response
            .headers
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();
        Self {
            method,
            endpoint: endpoint.to_string(),
            status: response.status,
            body,
            headers,
            duration,
        }
    }

    /// Look up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn duration_ms(&self) -> u128 {
        self.duration.as_millis()
    }

    /// Deserialize the body into a typed model.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_value(self.body.clone()).map_err(|e| ApiError::Deserialization {
            endpoint: self.endpoint.clone(),
            message: e.to_string(),
        })
    }

    /// The `id` of the returned resource, or of the first element when the
    /// body is an array.
    pub fn id(&self) -> Result<u64, ApiError> {
        let target = match &self.body {
            Value::Array(items) => items.first().ok_or_else(|| {
                ApiError::Assertion(format!("{}: empty array has no id", self.endpoint))
            })?,
            other => other,
        };
        target
            .get("id")
            .and_then(Value::as_u64)
            .ok_or_else(|| ApiError::Field {
                field: "id".to_string(),
                expectation: "a non-negative integer".to_string(),
                actual: target.get("id").map(Value::to_string).unwrap_or_else(|| "missing".to_string()),
            })
    }

    /// The body as an array, or a field error naming the endpoint.
    pub fn items(&self) -> Result<&Vec<Value>, ApiError> {
        self.body.as_array().ok_or_else(|| ApiError::Field {
            field: self.endpoint.clone(),
            expectation: "an array body".to_string(),
            actual: json_kind(&self.body).to_string(),
        })
    }
}

/// Name of a JSON value's type, as used in failure messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
