use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Histogram, register_counter, register_counter_vec, register_histogram,
};


lazy_static! {
    pub static ref CHAT_REQUESTS_TOTAL: Counter =
        register_counter!("chat_requests_total", "Total number of chat requests").unwrap();
    pub static ref QUOTA_DENIED: Counter = register_counter!(
        "chat_quota_denied_total",
        "Requests rejected for exceeding the quota"
    )
    .unwrap();
    pub static ref QUOTA_UNAVAILABLE: Counter = register_counter!(
        "chat_quota_unavailable_total",
        "Requests let through because the usage store failed"
    )
    .unwrap();
    pub static ref UPSTREAM_FAILURES: CounterVec = register_counter_vec!(
        "chat_upstream_failures_total",
        "Failed calls to the completion API",
        &["kind"]
    )
    .unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "chat_request_latency_seconds",
        "Chat request latency in seconds"
    )
    .unwrap();
}

// Touch every metric so /metrics lists them before the first request
pub fn register() {
    lazy_static::initialize(&CHAT_REQUESTS_TOTAL);
    lazy_static::initialize(&QUOTA_DENIED);
    lazy_static::initialize(&QUOTA_UNAVAILABLE);
    lazy_static::initialize(&UPSTREAM_FAILURES);
    lazy_static::initialize(&REQUEST_LATENCY);
}
