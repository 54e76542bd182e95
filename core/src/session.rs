//! Explicit request context: base URL, default headers and credentials.
//!
//! A `Session` is an immutable value. Authenticating produces a new session
//! carrying the token instead of mutating shared state, so two scenarios can
//! never observe each other's credentials.

/// Per-scenario request context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    base_url: String,
    headers: Vec<(String, String)>,
    bearer_token: Option<String>,
}

impl Session {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            headers: Vec::new(),
            bearer_token: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer_token.as_deref()
    }

    /// Add a header sent with every request of this session.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_bearer_token(mut self, token: &str) -> Self {
        self.bearer_token = Some(token.to_string());
        self
    }

    /// Headers for one request: defaults, session headers, then credentials.
    pub(crate) fn request_headers(&self, has_body: bool) -> Vec<(String, String)> {
        let mut headers = vec![("accept".to_string(), "application/json".to_string())];
        if has_body {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        headers.extend(self.headers.iter().cloned());
        if let Some(token) = &self.bearer_token {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        headers
    }
}
