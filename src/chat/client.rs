//! OpenAI-compatible chat completion: prompt assembly, request, reply parsing.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::shared::*;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("chat request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("chat server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("chat response missing choices[0].message.content")]
    MissingContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }
}

/// Live game facts appended to the system prompt. Anything that could not be
/// read is `None` and shows up as "unknown".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameStatus {
    pub money: Option<u32>,
    pub tool: Option<ToolKind>,
    pub seed: Option<CropKind>,
    pub day: Option<u32>,
    pub raining: Option<bool>,
}

impl GameStatus {
    pub fn snapshot(player: Option<&PlayerState>, day: Option<&DayCycle>) -> Self {
        Self {
            money: player.map(|p| p.money),
            tool: player.map(|p| p.selected_tool),
            seed: player.map(|p| p.selected_seed),
            day: day.map(|d| d.day),
            raining: day.map(|d| d.raining),
        }
    }
}

fn or_unknown<T>(value: Option<T>, render: impl FnOnce(T) -> String) -> String {
    value.map(render).unwrap_or_else(|| "unknown".to_string())
}

pub fn build_status_prompt(status: &GameStatus) -> String {
    format!(
        "\nCurrent status:\n- Money: {}\n- Tool: {}\n- Seed: {}\n- Day: {}\n- Raining: {}\n",
        or_unknown(status.money, |m| m.to_string()),
        or_unknown(status.tool, |t| t.display_name().to_string()),
        or_unknown(status.seed, |s| s.display_name().to_string()),
        or_unknown(status.day, |d| d.to_string()),
        or_unknown(status.raining, |r| (if r { "Yes" } else { "No" }).to_string()),
    )
}

/// System prompt with live status first, then the most recent history.
pub fn build_messages(config: &ChatConfig, history: &[ChatMessage], status: &GameStatus) -> Vec<ChatMessage> {
    let system = ChatMessage::new(
        Role::System,
        format!("{}{}", config.system_prompt, build_status_prompt(status)),
    );
    let recent = &history[history.len().saturating_sub(config.context_limit)..];
    std::iter::once(system).chain(recent.iter().cloned()).collect()
}

pub fn build_request_body(config: &ChatConfig, messages: &[ChatMessage]) -> Value {
    serde_json::json!({
        "model": config.model,
        "messages": messages,
        "temperature": config.temperature,
        "max_tokens": config.max_tokens,
        "stream": false
    })
}

pub fn extract_reply(json: &Value) -> Result<String, ChatError> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        .map(|s| s.trim().to_owned())
        .ok_or(ChatError::MissingContent)
}

/// Blocking POST. Call from a task pool thread, never from a system.
pub fn request_reply(config: &ChatConfig, body: &Value) -> Result<String, ChatError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    let response = client
        .post(&config.api_url)
        .header("Content-Type", "application/json")
        .json(body)
        .send()?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .unwrap_or_else(|_| "unable to read error body".to_owned());
        return Err(ChatError::Status { status: status.as_u16(), body });
    }

    let json: Value = response.json()?;
    extract_reply(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_prompt_lists_live_values() {
        let player = PlayerState::new_game(120, 5);
        let day = DayCycle { day: 3, raining: true, ..DayCycle::default() };
        let prompt = build_status_prompt(&GameStatus::snapshot(Some(&player), Some(&day)));
        assert!(prompt.contains("- Money: 120"));
        assert!(prompt.contains("- Tool: Hoe"));
        assert!(prompt.contains("- Seed: Corn"));
        assert!(prompt.contains("- Day: 3"));
        assert!(prompt.contains("- Raining: Yes"));
    }

    #[test]
    fn missing_status_renders_unknown() {
        let prompt = build_status_prompt(&GameStatus::default());
        assert_eq!(prompt.matches("unknown").count(), 5);
    }

    #[test]
    fn only_recent_history_is_sent() {
        let config = ChatConfig::default();
        let history: Vec<ChatMessage> = (0..20)
            .map(|i| ChatMessage::new(Role::User, format!("msg {i}")))
            .collect();
        let messages = build_messages(&config, &history, &GameStatus::default());
        assert_eq!(messages.len(), config.context_limit + 1);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.starts_with(&config.system_prompt));
        assert_eq!(messages[1].content, "msg 5");
        assert_eq!(messages.last().map(|m| m.content.as_str()), Some("msg 19"));
    }

    #[test]
    fn request_body_shape() {
        let config = ChatConfig::default();
        let messages = vec![ChatMessage::new(Role::User, "hi")];
        let body = build_request_body(&config, &messages);
        assert_eq!(body["model"], config.model);
        assert_eq!(body["max_tokens"], 120);
        assert_eq!(body["stream"], false);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hi");
    }

    #[test]
    fn reply_is_extracted_and_trimmed() {
        let json = serde_json::json!({
            "choices": [{ "message": { "content": "  Water your corn daily.\n" } }]
        });
        assert_eq!(extract_reply(&json).ok().as_deref(), Some("Water your corn daily."));
    }

    #[test]
    fn malformed_reply_is_an_error() {
        let json = serde_json::json!({ "error": "rate_limit" });
        assert!(matches!(extract_reply(&json), Err(ChatError::MissingContent)));
    }
}
