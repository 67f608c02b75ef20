use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::identity::{hash_identity, resolve_identity};
use crate::metrics::{
    CHAT_REQUESTS_TOTAL, QUOTA_DENIED, QUOTA_UNAVAILABLE, REQUEST_LATENCY, UPSTREAM_FAILURES,
};
use crate::models::{ChatReply, ChatRequest, CompletionRequest};
use crate::rate_limit::QuotaDecision;
use crate::state::AppState;
use crate::upstream::{UpstreamError, build_messages};

// CORS headers are added by the layer on the route
pub async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}

pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    CHAT_REQUESTS_TOTAL.inc();
    let _timer = REQUEST_LATENCY.start_timer();

    let Some(api_key) = state.chat.api_key.as_deref() else {
        tracing::error!("chat request rejected: no upstream API key configured");
        return Err(ApiError::Misconfigured(
            "Server misconfigured: missing API key".to_string(),
        ));
    };

    let Json(req) = payload
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e.body_text())))?;
    let message = req
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Message is required".to_string()))?;

    let hashed = hash_identity(
        &resolve_identity(req.user_id.as_deref(), &headers),
        state.chat.identity_salt.as_deref(),
    );
    let caller = &hashed[..12];

    match state.quota.check(&hashed).await {
        QuotaDecision::Allowed { count, reset_at } => {
            tracing::debug!(caller, count, %reset_at, "quota check passed");
        }
        QuotaDecision::Denied {
            retry_after,
            message,
        } => {
            QUOTA_DENIED.inc();
            tracing::info!(
                caller,
                retry_after_secs = retry_after.num_seconds(),
                "quota exceeded"
            );
            return Err(ApiError::QuotaExceeded {
                message,
                retry_after_secs: retry_after.num_seconds(),
            });
        }
        QuotaDecision::Unavailable(e) => {
            QUOTA_UNAVAILABLE.inc();
            tracing::warn!(
                caller,
                error = %e,
                "usage store unavailable, skipping quota enforcement"
            );
        }
    }

    let system_prompt = req
        .system_prompt
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or(&state.chat.default_system_prompt);
    let model = req
        .model
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(&state.chat.default_model);
    let messages = build_messages(req.messages.as_deref(), system_prompt, message);

    let request = CompletionRequest {
        model,
        messages: &messages,
        temperature: req.temperature.unwrap_or(state.chat.default_temperature),
    };

    let response = state
        .upstream
        .complete(api_key, &request)
        .await
        .map_err(|e| {
            let kind = match &e {
                UpstreamError::Api { .. } => "status",
                UpstreamError::Unreachable(_) => "unreachable",
                UpstreamError::Parse(_) => "parse",
                UpstreamError::ClientBuild(_) => "client",
            };
            UPSTREAM_FAILURES.with_label_values(&[kind]).inc();
            tracing::warn!(caller, model, error = %e, "completion call failed");
            ApiError::from(e)
        })?;

    Ok(Json(ChatReply {
        reply: response.reply_text(),
        model: response.model.clone().unwrap_or_else(|| model.to_string()),
        usage: response.usage,
    }))
}
