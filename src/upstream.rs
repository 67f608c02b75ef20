use serde_json::Value;
use std::time::Duration;

use crate::models::{ChatTurn, CompletionRequest, CompletionResponse};

const GENERIC_UPSTREAM_ERROR: &str = "Upstream API error";

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
    // Could not reach the upstream at all
    #[error("upstream unreachable: {0}")]
    Unreachable(String),
    // Upstream answered with a non-success status
    #[error("upstream returned {status}: {message}")]
    Api {
        status: u16,
        message: String,
        details: Option<String>,
    },
    #[error("upstream response could not be parsed: {0}")]
    Parse(String),
}

// Completion API client, one POST per chat request, no retries
pub struct CompletionClient {
    http: reqwest::Client,
    url: String,
}

impl CompletionClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::ClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            url: url.to_string(),
        })
    }

    pub async fn complete(
        &self,
        api_key: &str,
        request: &CompletionRequest<'_>,
    ) -> Result<CompletionResponse, UpstreamError> {
        let res = self
            .http
            .post(&self.url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| UpstreamError::Unreachable(e.to_string()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| UpstreamError::Unreachable(e.to_string()))?;

        if !status.is_success() {
            let (message, details) = upstream_error_message(&body);
            return Err(UpstreamError::Api {
                status: status.as_u16(),
                message,
                details,
            });
        }

        serde_json::from_str(&body).map_err(|e| UpstreamError::Parse(e.to_string()))
    }
}

/// Pull a human-readable message out of an upstream error body.
///
/// Accepts `{"error": {"message": ".."}}`, `{"error": ".."}` and
/// `{"message": ".."}`. Anything else gets the generic message, with the raw
/// body returned as details when there is one.
pub fn upstream_error_message(body: &str) -> (String, Option<String>) {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let message = parsed.as_ref().and_then(|v| {
        v.pointer("/error/message")
            .or_else(|| v.get("error").filter(|e| e.is_string()))
            .or_else(|| v.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
    });

    match message {
        Some(m) if !m.trim().is_empty() => (m, None),
        _ => {
            let raw = body.trim();
            let details = (!raw.is_empty()).then(|| raw.to_string());
            (GENERIC_UPSTREAM_ERROR.to_string(), details)
        }
    }
}

// Conversation sent upstream: caller turns as-is, or [system, user]
pub fn build_messages(
    turns: Option<&[ChatTurn]>,
    system_prompt: &str,
    message: &str,
) -> Vec<ChatTurn> {
    match turns {
        Some(turns) if !turns.is_empty() => turns.to_vec(),
        _ => vec![
            ChatTurn::text("system", system_prompt),
            ChatTurn::text("user", message),
        ],
    }
}
