use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::upstream::UpstreamError;

pub const UPSTREAM_UNAVAILABLE: &str = "AI service unavailable. Please try again later.";

// Every failure the HTTP surface can answer with
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("{message}")]
    QuotaExceeded { message: String, retry_after_secs: i64 },
    #[error("{0}")]
    Misconfigured(String),
    #[error("{message}")]
    Upstream {
        status: StatusCode,
        message: String,
        details: Option<String>,
    },
    #[error("{}", UPSTREAM_UNAVAILABLE)]
    UpstreamUnavailable,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Misconfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upstream { status, .. } => *status,
            Self::UpstreamUnavailable => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Api {
                status,
                message,
                details,
            } => Self::Upstream {
                status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                message,
                details,
            },
            UpstreamError::Parse(details) => Self::Upstream {
                status: StatusCode::BAD_GATEWAY,
                message: "Upstream API returned an unreadable response".to_string(),
                details: Some(details),
            },
            UpstreamError::ClientBuild(e) => Self::Misconfigured(e),
            UpstreamError::Unreachable(_) => Self::UpstreamUnavailable,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error, details, retry_after) = match self {
            Self::QuotaExceeded {
                message,
                retry_after_secs,
            } => (message, None, Some(retry_after_secs)),
            Self::Upstream {
                message, details, ..
            } => (message, details, None),
            other => (other.to_string(), None, None),
        };

        let body = match details {
            Some(details) => json!({ "error": error, "details": details }),
            None => json!({ "error": error }),
        };
        let mut response = (status, Json(body)).into_response();
        if let Some(secs) = retry_after {
            if let Ok(value) = HeaderValue::from_str(&secs.max(1).to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}
