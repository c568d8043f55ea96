use crate::time::Timestamp;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Kind tag of a canonical message.
///
/// The four known kinds get their own variants; anything else is carried
/// verbatim in [`MessageKind::Unknown`] so counts and classification still see
/// the original tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum MessageKind {
    System,
    Assistant,
    User,
    Result,
    Unknown(String),
}

impl MessageKind {
    pub const UNKNOWN: &'static str = "Unknown";

    pub fn as_str(&self) -> &str {
        match self {
            Self::System => "SystemMessage",
            Self::Assistant => "AssistantMessage",
            Self::User => "UserMessage",
            Self::Result => "ResultMessage",
            Self::Unknown(tag) => tag,
        }
    }

    /// Coarse UI category used to style and filter the message list.
    ///
    /// Tested by substring in a fixed order so unrecognized tags such as
    /// `ToolCallMessage` or `mcp_event` still land in a sensible bucket.
    pub fn category(&self) -> Category {
        let name = self.as_str();
        if name.contains("User") {
            Category::User
        } else if name.contains("Assistant") {
            Category::Assistant
        } else if name.contains("Tool") || name.to_ascii_lowercase().contains("mcp") {
            Category::Tool
        } else if name.contains("Result") {
            Category::Result
        } else {
            Category::System
        }
    }
}

impl Default for MessageKind {
    fn default() -> Self {
        Self::Unknown(Self::UNKNOWN.to_string())
    }
}

impl From<&str> for MessageKind {
    fn from(tag: &str) -> Self {
        match tag {
            "SystemMessage" => Self::System,
            "AssistantMessage" => Self::Assistant,
            "UserMessage" => Self::User,
            "ResultMessage" => Self::Result,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl From<String> for MessageKind {
    fn from(tag: String) -> Self {
        match Self::from(tag.as_str()) {
            Self::Unknown(_) => Self::Unknown(tag),
            known => known,
        }
    }
}

impl From<MessageKind> for String {
    fn from(kind: MessageKind) -> Self {
        match kind {
            MessageKind::Unknown(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    System,
    User,
    Assistant,
    Tool,
    Result,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
            Self::Result => "result",
        }
    }
}

/// One normalized log entry. Every downstream stage works on these.
///
/// Serializes back to the legacy envelope shape
/// (`{"type": ..., "timestamp": ..., "data": {...}}`) plus any extra
/// top-level fields the source record carried.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalMessage {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub timestamp: Timestamp,
    pub data: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CanonicalMessage {
    pub fn new(kind: MessageKind, timestamp: Timestamp, data: Value) -> Self {
        Self {
            kind,
            timestamp,
            data,
            extra: Map::new(),
        }
    }

    /// Build a message from a legacy-format record.
    ///
    /// Lenient: a missing `type` becomes `Unknown`, a missing or non-string
    /// timestamp becomes empty, a missing `data` becomes `{}`. Non-object
    /// records yield an `Unknown` message with an empty payload.
    pub fn from_record(record: Value) -> Self {
        let Value::Object(mut fields) = record else {
            tracing::warn!("Legacy record is not a JSON object; treating as Unknown");
            return Self::new(
                MessageKind::default(),
                Timestamp::default(),
                Value::Object(Map::new()),
            );
        };

        let kind = match fields.shift_remove("type") {
            Some(Value::String(tag)) => MessageKind::from(tag),
            Some(other) => MessageKind::Unknown(other.to_string()),
            None => MessageKind::default(),
        };
        let timestamp = match fields.shift_remove("timestamp") {
            Some(Value::String(ts)) => Timestamp::from(ts),
            _ => Timestamp::default(),
        };
        let data = fields
            .shift_remove("data")
            .unwrap_or_else(|| Value::Object(Map::new()));

        Self {
            kind,
            timestamp,
            data,
            extra: fields,
        }
    }

    /// Look up a payload field. Non-object payloads have no fields.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}
