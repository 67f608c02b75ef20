use axum::http::HeaderMap;
use sha2::{Digest, Sha256};

pub const ANONYMOUS: &str = "anonymous";

// Pick the caller identity: explicit id, then proxy headers, then "anonymous"
pub fn resolve_identity(user_id: Option<&str>, headers: &HeaderMap) -> String {
    if let Some(id) = user_id.map(str::trim).filter(|id| !id.is_empty()) {
        return id.to_string();
    }

    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|s| !s.is_empty())
        })
        .unwrap_or(ANONYMOUS)
        .to_string()
}

// One-way hash of the identity, this is the only form that reaches the store or the logs
pub fn hash_identity(identity: &str, salt: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    if let Some(salt) = salt {
        hasher.update(salt);
    }
    hasher.update(identity);
    format!("{:x}", hasher.finalize())
}
