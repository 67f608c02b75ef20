use std::sync::Arc;

use crate::config::{ChatConfig, QuotaConfig};
use crate::rate_limit::QuotaTracker;
use crate::store::{HttpBlobStore, MemoryStore, UsageStore};
use crate::upstream::{CompletionClient, UpstreamError};

// app's shared state
pub struct AppState {
    pub chat: ChatConfig,
    pub quota: QuotaTracker,
    pub upstream: CompletionClient,
}

impl AppState {
    pub fn new(chat: ChatConfig, quota: QuotaTracker) -> Result<Self, UpstreamError> {
        let upstream = CompletionClient::new(&chat.upstream_url, chat.upstream_timeout)?;
        Ok(Self {
            chat,
            quota,
            upstream,
        })
    }
}

// Pick the usage store. A store that cannot be built leaves quota enforcement off
pub fn build_quota_tracker(
    store_url: Option<&str>,
    store_token: Option<String>,
    config: QuotaConfig,
) -> QuotaTracker {
    let Some(url) = store_url.filter(|u| !u.trim().is_empty()) else {
        tracing::info!("no usage store url configured, counting quota in process");
        return QuotaTracker::new(Arc::new(MemoryStore::new()), config);
    };

    match HttpBlobStore::new(url, store_token) {
        Ok(store) => {
            tracing::info!(url, "using HTTP blob store for quota records");
            let store: Arc<dyn UsageStore> = Arc::new(store);
            QuotaTracker::new(store, config)
        }
        Err(e) => {
            tracing::warn!(error = %e, "usage store unavailable, quota will not be enforced");
            QuotaTracker::without_store(config)
        }
    }
}
