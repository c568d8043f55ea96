//! Per-message content parsing.
//!
//! [`parse_message`] turns a canonical message into a [`MessageView`] that the
//! report templates render directly. Parsing is total: anything that cannot
//! be understood degrades to [`ParsedContent::Fallback`] carrying the raw
//! text, so one odd message never stops a report.

mod legacy;
mod structured;

use crate::common::plain_string;
use runlog_core::{CanonicalMessage, MessageKind, ReportConfig};
use serde::Serialize;
use serde_json::Value;

/// Tunables for content parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentOptions {
    /// Tool results with at least this many newlines are flagged long.
    pub long_content_lines: usize,
}

impl Default for ContentOptions {
    fn default() -> Self {
        Self {
            long_content_lines: 5,
        }
    }
}

impl From<&ReportConfig> for ContentOptions {
    fn from(config: &ReportConfig) -> Self {
        Self {
            long_content_lines: config.content.long_content_lines,
        }
    }
}

/// Render-ready shape of one conversation content block.
///
/// Serialized externally tagged (`{"tool_use": {...}}`) so templates can
/// branch with `{{#with tool_use}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParsedContent {
    Text {
        text: String,
    },
    ToolUse {
        tool_name: String,
        /// Pretty-printed JSON, or the raw fragment when it would not parse.
        tool_input: String,
    },
    ToolResult {
        is_error: bool,
        result_text: String,
        result_format: ResultFormat,
        is_long_content: bool,
    },
    Fallback {
        fallback_text: String,
    },
}

impl ParsedContent {
    pub(crate) fn fallback(text: impl Into<String>) -> Self {
        Self::Fallback {
            fallback_text: text.into(),
        }
    }

    /// Tool name when this block is a tool invocation.
    pub fn tool_name(&self) -> Option<&str> {
        match self {
            Self::ToolUse { tool_name, .. } => Some(tool_name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultFormat {
    #[default]
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemDetails {
    pub model: String,
    pub cwd: String,
    pub tools: Vec<String>,
    pub mcp_servers: Vec<McpServer>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct McpServer {
    pub name: String,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultDetails {
    pub is_error: bool,
    pub duration_ms: u64,
    pub total_cost: f64,
    pub usage: UsageDetails,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UsageDetails {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read_input_tokens: u64,
    pub cache_creation_input_tokens: u64,
}

/// Parsed form of one canonical message, keyed by kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageView {
    System(SystemDetails),
    Assistant(ParsedContent),
    User(ParsedContent),
    Result(ResultDetails),
    /// Any other kind; carries the payload as compact JSON.
    Unknown { payload: String },
}

impl MessageView {
    /// Content block of a conversation message.
    pub fn content(&self) -> Option<&ParsedContent> {
        match self {
            Self::Assistant(content) | Self::User(content) => Some(content),
            _ => None,
        }
    }
}

/// Parse one message's payload according to its kind.
pub fn parse_message(msg: &CanonicalMessage, options: &ContentOptions) -> MessageView {
    match &msg.kind {
        MessageKind::System => MessageView::System(SystemDetails::from_payload(&msg.data)),
        MessageKind::Result => MessageView::Result(ResultDetails::from_payload(&msg.data)),
        MessageKind::Assistant => {
            MessageView::Assistant(parse_content(msg.field("content"), options))
        }
        MessageKind::User => MessageView::User(parse_content(msg.field("content"), options)),
        MessageKind::Unknown(_) => MessageView::Unknown {
            payload: msg.data.to_string(),
        },
    }
}

/// Parse an assistant/user `content` value.
///
/// Objects and arrays are modern content blocks; strings are legacy SDK
/// object reprs; anything else is shown as-is.
pub fn parse_content(content: Option<&Value>, options: &ContentOptions) -> ParsedContent {
    match content {
        None => ParsedContent::fallback(""),
        Some(value @ (Value::Object(_) | Value::Array(_))) => {
            structured::parse_block(value, options)
        }
        Some(Value::String(raw)) => legacy::parse_repr(raw, options),
        Some(other) => ParsedContent::fallback(plain_string(other)),
    }
}

impl SystemDetails {
    fn from_payload(data: &Value) -> Self {
        Self {
            model: text_or_unknown(data.get("model")),
            cwd: text_or_unknown(data.get("cwd")),
            tools: data
                .get("tools")
                .and_then(Value::as_array)
                .map(|tools| tools.iter().map(plain_string).collect())
                .unwrap_or_default(),
            mcp_servers: data
                .get("mcp_servers")
                .and_then(Value::as_array)
                .map(|servers| servers.iter().map(McpServer::from_value).collect())
                .unwrap_or_default(),
        }
    }
}

impl McpServer {
    /// Entries are usually `{"name", "status"}` objects; bare strings are names.
    fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self {
                name: map.get("name").map(plain_string).unwrap_or_default(),
                status: map.get("status").map(plain_string),
            },
            other => Self {
                name: plain_string(other),
                status: None,
            },
        }
    }
}

impl ResultDetails {
    fn from_payload(data: &Value) -> Self {
        let usage = data.get("usage");
        Self {
            is_error: data
                .get("is_error")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            duration_ms: data.get("duration_ms").map(counter).unwrap_or(0),
            total_cost: data
                .get("total_cost_usd")
                .and_then(Value::as_f64)
                .unwrap_or(0.0),
            usage: UsageDetails {
                input_tokens: usage_field(usage, "input_tokens"),
                output_tokens: usage_field(usage, "output_tokens"),
                cache_read_input_tokens: usage_field(usage, "cache_read_input_tokens"),
                cache_creation_input_tokens: usage_field(usage, "cache_creation_input_tokens"),
            },
        }
    }
}

fn text_or_unknown(value: Option<&Value>) -> String {
    value
        .map(plain_string)
        .unwrap_or_else(|| MessageKind::UNKNOWN.to_string())
}

fn usage_field(usage: Option<&Value>, key: &str) -> u64 {
    usage.and_then(|u| u.get(key)).map(counter).unwrap_or(0)
}

fn counter(value: &Value) -> u64 {
    value
        .as_u64()
        .or_else(|| value.as_f64().map(|f| f.max(0.0) as u64))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use runlog_core::Timestamp;
    use serde_json::json;

    fn msg(kind: &str, data: Value) -> CanonicalMessage {
        CanonicalMessage::new(MessageKind::from(kind), Timestamp::from("#1"), data)
    }

    #[test]
    fn system_defaults() {
        let view = parse_message(&msg("SystemMessage", json!({})), &ContentOptions::default());
        assert_eq!(
            view,
            MessageView::System(SystemDetails {
                model: "Unknown".into(),
                cwd: "Unknown".into(),
                tools: vec![],
                mcp_servers: vec![],
            })
        );
    }

    #[test]
    fn system_mcp_servers_accept_objects_and_names() {
        let view = parse_message(
            &msg(
                "SystemMessage",
                json!({"model": "m", "mcp_servers": [{"name": "fs", "status": "connected"}, "git"]}),
            ),
            &ContentOptions::default(),
        );
        let MessageView::System(details) = view else {
            panic!("expected system view");
        };
        assert_eq!(details.mcp_servers[0].name, "fs");
        assert_eq!(details.mcp_servers[0].status.as_deref(), Some("connected"));
        assert_eq!(details.mcp_servers[1].name, "git");
    }

    #[test]
    fn result_defaults_and_passthrough() {
        let view = parse_message(&msg("ResultMessage", json!({})), &ContentOptions::default());
        assert_eq!(
            view,
            MessageView::Result(ResultDetails {
                is_error: false,
                duration_ms: 0,
                total_cost: 0.0,
                usage: UsageDetails::default(),
            })
        );

        let view = parse_message(
            &msg(
                "ResultMessage",
                json!({"is_error": true, "duration_ms": 1500, "total_cost_usd": 0.25,
                       "usage": {"input_tokens": 100, "cache_read_input_tokens": 7}}),
            ),
            &ContentOptions::default(),
        );
        let MessageView::Result(details) = view else {
            panic!("expected result view");
        };
        assert!(details.is_error);
        assert_eq!(details.duration_ms, 1500);
        assert_eq!(details.total_cost, 0.25);
        assert_eq!(details.usage.input_tokens, 100);
        assert_eq!(details.usage.cache_read_input_tokens, 7);
        assert_eq!(details.usage.output_tokens, 0);
    }

    #[test]
    fn unknown_kind_carries_payload() {
        let view = parse_message(&msg("ToolCallMessage", json!({"a": 1})), &ContentOptions::default());
        assert_eq!(
            view,
            MessageView::Unknown {
                payload: r#"{"a":1}"#.into()
            }
        );
    }

    #[test]
    fn missing_and_scalar_content_fall_back() {
        let options = ContentOptions::default();
        assert_eq!(parse_content(None, &options), ParsedContent::fallback(""));
        assert_eq!(
            parse_content(Some(&json!(42)), &options),
            ParsedContent::fallback("42")
        );
        assert_eq!(
            parse_content(Some(&json!(null)), &options),
            ParsedContent::fallback("None")
        );
    }

    #[test]
    fn serializes_externally_tagged() {
        let value = serde_json::to_value(ParsedContent::ToolUse {
            tool_name: "Bash".into(),
            tool_input: "{}".into(),
        })
        .unwrap();
        assert_eq!(value, json!({"tool_use": {"tool_name": "Bash", "tool_input": "{}"}}));

        let value = serde_json::to_value(ParsedContent::ToolResult {
            is_error: false,
            result_text: "ok".into(),
            result_format: ResultFormat::Text,
            is_long_content: false,
        })
        .unwrap();
        assert_eq!(value["tool_result"]["result_format"], "text");
    }
}
