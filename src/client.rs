//! Presentation client for the status endpoint.
//!
//! Fetches `/api` once and renders whatever JSON comes back. Transport and
//! decode failures become an error document instead of an `Err`, so callers
//! always have something to display.

use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, error, instrument};

use crate::error::Result;

/// Message shown when the backend cannot be reached.
pub const CONNECT_ERROR_MESSAGE: &str = "Error connecting to backend";

/// Default request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for a running backend.
#[derive(Debug, Clone)]
pub struct StatusClient {
    http: Client,
    base_url: String,
}

impl StatusClient {
    /// Create a client for the backend at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client reusing an existing HTTP client.
    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    /// Backend base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch `/api`, returning the body as received or an error document.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn fetch_status(&self) -> Value {
        match self.try_fetch_status().await {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, "Error fetching data");
                json!({ "message": CONNECT_ERROR_MESSAGE, "error": e.to_string() })
            }
        }
    }

    async fn try_fetch_status(&self) -> Result<Value> {
        let url = format!("{}/api", self.base_url);
        debug!(%url, "Requesting backend status");

        let body = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        Ok(body)
    }
}

/// Render a status document for display.
pub fn render(document: &Value) -> String {
    let pretty = serde_json::to_string_pretty(document).unwrap_or_else(|_| document.to_string());
    format!("Backend Response:\n{pretty}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_drops_trailing_slash() {
        let client = StatusClient::new("http://localhost:3000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
    }

    #[tokio::test]
    async fn unreachable_backend_yields_error_document() {
        let client = StatusClient::new("http://127.0.0.1:1").unwrap();

        let doc = client.fetch_status().await;

        assert_eq!(doc["message"], CONNECT_ERROR_MESSAGE);
        assert!(doc["error"].as_str().is_some_and(|e| !e.is_empty()));
    }

    #[test]
    fn render_pretty_prints_under_heading() {
        let out = render(&json!({ "message": "Backend API is running!" }));

        assert!(out.starts_with("Backend Response:\n{"));
        assert!(out.contains("  \"message\": \"Backend API is running!\""));
    }
}
