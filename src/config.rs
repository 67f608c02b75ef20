use chrono::Duration;
use clap::Parser;

pub const DEFAULT_SYSTEM_PROMPT: &str = concat!(
    "You are a helpful, concise assistant. ",
    "Answer clearly and keep replies short unless the user asks for detail."
);
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const MAX_WINDOW_DAYS: i64 = 3650;

// CLI argument structure, every flag can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "chat-quota-gateway")]
#[command(about = "Quota-enforcing proxy in front of an LLM chat completion API")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    // Chat completion endpoint
    #[arg(long, env = "LLM_API_URL", default_value = "https://api.openai.com/v1/chat/completions")]
    pub upstream_url: String,

    // Credential for the completion API. Without it the chat path answers 500
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    // Model used when the request does not name one
    #[arg(short, long, env = "LLM_MODEL", default_value = "gpt-4o-mini")]
    pub model: String,

    // System prompt used when the request does not carry one
    #[arg(long, env = "LLM_SYSTEM_PROMPT", default_value = DEFAULT_SYSTEM_PROMPT)]
    pub system_prompt: String,

    // Upstream request timeout in seconds
    #[arg(long, env = "LLM_TIMEOUT_SECS", default_value_t = 60)]
    pub upstream_timeout: u64,

    // Max requests per caller per window
    #[arg(long, env = "QUOTA_LIMIT", default_value_t = 20)]
    pub quota_limit: u32,

    // Quota window in days
    #[arg(
        long,
        env = "QUOTA_WINDOW_DAYS",
        default_value_t = 7,
        value_parser = clap::value_parser!(i64).range(1..=MAX_WINDOW_DAYS)
    )]
    pub quota_window_days: i64,

    // Blob store base url, in-process store when absent
    #[arg(long, env = "QUOTA_STORE_URL")]
    pub store_url: Option<String>,

    // Bearer token for the blob store
    #[arg(long, env = "QUOTA_STORE_TOKEN", hide_env_values = true)]
    pub store_token: Option<String>,

    // Prepended to caller identities before hashing
    #[arg(long, env = "IDENTITY_SALT", hide_env_values = true)]
    pub identity_salt: Option<String>,
}

/// Settings for the chat path: upstream endpoint, credential and request defaults.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub upstream_url: String,
    pub api_key: Option<String>,
    pub default_model: String,
    pub default_system_prompt: String,
    pub default_temperature: f64,
    pub upstream_timeout: std::time::Duration,
    pub identity_salt: Option<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            upstream_url: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: None,
            default_model: "gpt-4o-mini".to_string(),
            default_system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            default_temperature: DEFAULT_TEMPERATURE,
            upstream_timeout: std::time::Duration::from_secs(60),
            identity_salt: None,
        }
    }
}

/// Quota parameters. Defaults are 20 requests per 7 days.
#[derive(Debug, Clone, Copy)]
pub struct QuotaConfig {
    pub limit: u32,
    pub window: Duration,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            limit: 20,
            window: Duration::days(7),
        }
    }
}

impl Args {
    pub fn chat_config(&self) -> ChatConfig {
        ChatConfig {
            upstream_url: self.upstream_url.clone(),
            api_key: self.api_key.clone().filter(|k| !k.trim().is_empty()),
            default_model: self.model.clone(),
            default_system_prompt: self.system_prompt.clone(),
            default_temperature: DEFAULT_TEMPERATURE,
            upstream_timeout: std::time::Duration::from_secs(self.upstream_timeout),
            identity_salt: self.identity_salt.clone().filter(|s| !s.is_empty()),
        }
    }

    pub fn quota_config(&self) -> QuotaConfig {
        QuotaConfig {
            limit: self.quota_limit,
            window: Duration::days(self.quota_window_days.clamp(1, MAX_WINDOW_DAYS)),
        }
    }
}
