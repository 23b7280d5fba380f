use serde::{ Deserialize, Serialize };
use serde_json::Value as JsonValue;

use super::chat::HistoryTurn;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RelayRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<HistoryTurn>,
}

impl RelayRequest {
    /// Reads an inbound body leniently. Returns `None` when `message` is
    /// missing, not a string, or blank. History entries that are not
    /// `{role, content}` string pairs with a known role are dropped.
    pub fn from_json(body: &JsonValue) -> Option<Self> {
        let message = body.get("message")?.as_str()?.trim();
        if message.is_empty() {
            return None;
        }

        let history = body
            .get("history")
            .and_then(JsonValue::as_array)
            .map(|entries| entries.iter().filter_map(parse_history_entry).collect())
            .unwrap_or_default();

        Some(Self {
            message: message.to_string(),
            history,
        })
    }
}

fn parse_history_entry(entry: &JsonValue) -> Option<HistoryTurn> {
    let role = entry.get("role")?.as_str()?.parse().ok()?;
    let content = entry.get("content")?.as_str()?;
    Some(HistoryTurn {
        role,
        content: content.to_string(),
    })
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelayResponse {
    Message {
        message: String,
    },
    Error {
        error: String,
    },
}
