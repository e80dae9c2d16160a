// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the streaming chat completions endpoint.

use aiqus_core::AiqusError;
use tracing::debug;

use crate::request::CompletionRequest;

/// Thin wrapper over a pooled [`reqwest::Client`] bound to one endpoint.
///
/// No request timeout is set; a stream may legitimately stay open for minutes.
/// Callers bound it through cancellation instead.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    client: reqwest::Client,
    url: String,
}

impl CompletionClient {
    /// Creates a client posting to `url` (the full `/chat/completions` URL).
    pub fn new(url: impl Into<String>) -> Result<Self, AiqusError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AiqusError::transport(format!("failed to build HTTP client: {e}"), e))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Sends `request` and returns the response once a success status arrived.
    ///
    /// The body is left unread so the caller can consume it incrementally.
    /// A non-success status becomes a transport error carrying the status and
    /// the response body text.
    pub async fn open_stream(
        &self,
        api_key: &str,
        request: &CompletionRequest,
    ) -> Result<reqwest::Response, AiqusError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| AiqusError::transport(format!("HTTP request failed: {e}"), e))?;

        let status = response.status();
        debug!(status = %status, model = %request.model, "streaming response received");

        if status.is_success() {
            return Ok(response);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!(status = %status, error = %e, "failed to read error response body");
                String::new()
            }
        };
        Err(AiqusError::Transport {
            message: format!("API returned {status}: {body}"),
            status: Some(status.as_u16()),
            source: None,
        })
    }
}
