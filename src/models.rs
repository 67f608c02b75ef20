use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

// Inbound chat request body
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub messages: Option<Vec<ChatTurn>>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub user_id: Option<String>,
}

// One conversation turn, kept as the raw JSON the caller sent
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(transparent)]
pub struct ChatTurn(pub Value);

impl ChatTurn {
    pub fn text(role: &str, content: &str) -> Self {
        Self(json!({ "role": role, "content": content }))
    }
}

// Completion API request format
#[derive(Serialize, Debug)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatTurn],
    pub temperature: f64,
}

// Completion API response format, only the fields we read
#[derive(Deserialize, Debug, Default)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
    #[serde(default)]
    pub usage: Option<Value>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct CompletionChoice {
    #[serde(default)]
    pub message: Option<CompletionMessage>,
}

#[derive(Deserialize, Debug, Default)]
pub struct CompletionMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl CompletionResponse {
    /// Trimmed text of the first choice, empty when the upstream sent none.
    pub fn reply_text(&self) -> String {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
            .map(str::trim)
            .unwrap_or_default()
            .to_string()
    }
}

// Outbound success body
#[derive(Serialize, Deserialize, Debug)]
pub struct ChatReply {
    pub reply: String,
    pub usage: Option<Value>,
    pub model: String,
}
