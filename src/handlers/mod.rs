mod ai_mode;
mod chat;
mod health;
mod metrics;

use crate::error::ApiError;

pub use ai_mode::ai_mode_handler;
pub use chat::{chat_handler, preflight_handler};
pub use health::health_handler;
pub use metrics::metrics_handler;

// Fallback for any method a route does not serve
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
