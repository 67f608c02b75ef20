use axum::{Json, extract::rejection::JsonRejection};
use serde_json::{Value, json};

use crate::error::ApiError;

// Stub mode: no model call, the body comes straight back
pub async fn ai_mode_handler(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(input) = payload
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e.body_text())))?;
    Ok(Json(json!({ "mode": "echo", "input": input })))
}
