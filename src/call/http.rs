//! HTTP call execution
//!
//! Sends exactly one request per invocation and returns the raw response body.

use crate::error::{CallError, Result};
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use std::collections::BTreeMap;
use url::Url;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and drops control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = match body.char_indices().nth(MAX_LOG_BODY_LENGTH) {
        Some((cut, _)) => format!("{}... [truncated, {} bytes total]", &body[..cut], body.len()),
        None => body.to_string(),
    };

    truncated.replace(|c: char| c.is_control(), "")
}

/// Whether `path`, ignoring any query or fragment, has `.` or `..` segments.
///
/// URL parsing resolves these before the request goes out, so the server sees
/// the normalized path instead.
fn has_dot_segments(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/').any(|segment| segment == "." || segment == "..")
}

/// HTTP client wrapper used by the call engine
#[derive(Clone)]
pub struct HttpExecutor {
    client: Client,
}

impl HttpExecutor {
    /// Create a new executor with its own HTTP client
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(format!("restcall/{}", crate::VERSION))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Wrap an already configured client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Perform one request against `endpoint + path`.
    ///
    /// The target is the plain concatenation of both strings, except that `.`
    /// and `..` path segments are resolved by URL parsing. A non-empty body
    /// gets `Content-Type: application/json`, and `headers` are applied last so
    /// they override it. Only status 200 counts as success; anything else is
    /// returned as [`CallError::Remote`] with the untouched response body.
    pub async fn execute(
        &self,
        endpoint: &str,
        path: &str,
        method: &str,
        body: &str,
        headers: &BTreeMap<String, String>,
    ) -> Result<String> {
        let target = format!("{}{}", endpoint, path);
        let method_name = if method.is_empty() { "GET" } else { method };

        let http_method = Method::from_bytes(method_name.as_bytes()).map_err(|e| {
            CallError::transport(method_name, &target, format!("invalid HTTP method: {}", e))
        })?;
        let url = Url::parse(&target).map_err(|e| {
            CallError::transport(method_name, &target, format!("malformed URL: {}", e))
        })?;
        if has_dot_segments(path) {
            tracing::warn!("Dot segments in {} are resolved to {}", target, url.path());
        }

        let mut header_map = HeaderMap::new();
        if !body.is_empty() {
            header_map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        for (name, value) in headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                CallError::transport(method_name, &target, format!("invalid header name '{}': {}", name, e))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                CallError::transport(method_name, &target, format!("invalid value for header '{}': {}", name, e))
            })?;
            header_map.insert(header_name, header_value);
        }

        tracing::debug!("{} {}", method_name, target);

        let mut request = self.client.request(http_method, url).headers(header_map);
        if !body.is_empty() {
            request = request.body(body.to_string());
        }

        let response = request
            .send()
            .await
            .map_err(|e| CallError::transport(method_name, &target, e))?;

        let status = response.status();
        let response_body = response
            .text()
            .await
            .map_err(|e| CallError::transport(method_name, &target, format!("failed to read response body: {}", e)))?;

        if status != StatusCode::OK {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&response_body));
            return Err(CallError::remote(
                method_name,
                &target,
                status.as_u16(),
                response_body,
            ));
        }

        Ok(response_body)
    }
}
