//! Streaming-log adapter.
//!
//! `--output-format stream-json` logs have lowercase record types, nest
//! conversation content under `message.content[]`, and carry no per-record
//! clock. Each record is rewritten into the canonical envelope; conversation
//! records fan out into one message per content block. Every emitted message
//! gets the next `#<n>` ordinal from a single counter shared by the whole log.

use crate::detect::LogFormat;
use crate::RecordAdapter;
use runlog_core::{CanonicalMessage, MessageKind, Timestamp};
use serde::Deserialize;
use serde_json::{json, Value};

pub struct StreamAdapter;

impl RecordAdapter for StreamAdapter {
    fn format(&self) -> LogFormat {
        LogFormat::Streaming
    }

    fn adapt(&self, records: Vec<Value>) -> Vec<CanonicalMessage> {
        adapt_stream_records(records)
    }
}

// ── Raw deserialization types ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum StreamRecord {
    #[serde(rename = "system")]
    System(StreamSystem),
    #[serde(rename = "assistant")]
    Assistant(StreamConversation),
    #[serde(rename = "user")]
    User(StreamConversation),
    #[serde(rename = "result")]
    Result(StreamResult),
    // stream_event, rate limit notices, etc.
    #[serde(other)]
    Unknown,
}

/// Fields are kept as raw values so whatever the CLI wrote survives into the
/// payload unchanged; only absent fields are defaulted.
#[derive(Debug, Deserialize)]
struct StreamSystem {
    #[serde(default = "unknown_text")]
    model: Value,
    #[serde(default = "unknown_text")]
    cwd: Value,
    #[serde(default = "empty_array")]
    tools: Value,
    #[serde(default = "empty_array")]
    mcp_servers: Value,
}

#[derive(Debug, Deserialize)]
struct StreamConversation {
    #[serde(default)]
    message: StreamMessageBody,
}

#[derive(Debug, Default, Deserialize)]
struct StreamMessageBody {
    #[serde(default)]
    content: StreamContent,
}

/// `message.content` is normally a block array; user prompts may be a bare
/// string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StreamContent {
    Blocks(Vec<Value>),
    Text(String),
    Other(Value),
}

impl Default for StreamContent {
    fn default() -> Self {
        Self::Blocks(Vec::new())
    }
}

impl StreamContent {
    fn into_blocks(self) -> Vec<Value> {
        match self {
            Self::Blocks(blocks) => blocks,
            Self::Text(text) => vec![Value::String(text)],
            Self::Other(Value::Null) => Vec::new(),
            Self::Other(other) => vec![other],
        }
    }
}

#[derive(Debug, Deserialize)]
struct StreamResult {
    #[serde(default = "false_value")]
    is_error: Value,
    #[serde(default = "zero_int")]
    duration_ms: Value,
    #[serde(default = "zero_float")]
    total_cost_usd: Value,
    #[serde(default = "empty_object")]
    usage: Value,
}

fn unknown_text() -> Value {
    Value::String(MessageKind::UNKNOWN.to_string())
}

fn empty_array() -> Value {
    json!([])
}

fn empty_object() -> Value {
    json!({})
}

fn false_value() -> Value {
    Value::Bool(false)
}

fn zero_int() -> Value {
    json!(0)
}

fn zero_float() -> Value {
    json!(0.0)
}

// ── Adaptation ──────────────────────────────────────────────────────────────

/// Monotonic `#<n>` source, starting at 1.
#[derive(Debug, Default)]
struct Sequence(u64);

impl Sequence {
    fn stamp(&mut self, kind: MessageKind, data: Value) -> CanonicalMessage {
        self.0 += 1;
        CanonicalMessage::new(kind, Timestamp::Sequence(self.0), data)
    }
}

/// Rewrite streaming records into canonical messages.
///
/// Records of unrecognized type are dropped, as are records whose known type
/// has fields of the wrong shape (e.g. `message` that is not an object).
pub fn adapt_stream_records(records: Vec<Value>) -> Vec<CanonicalMessage> {
    let mut seq = Sequence::default();
    let mut out = Vec::with_capacity(records.len());

    for (idx, record) in records.into_iter().enumerate() {
        let record: StreamRecord = match serde_json::from_value(record) {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Skipping streaming record {}: {}", idx + 1, e);
                continue;
            }
        };

        match record {
            StreamRecord::System(sys) => out.push(seq.stamp(
                MessageKind::System,
                json!({
                    "model": sys.model,
                    "cwd": sys.cwd,
                    "tools": sys.tools,
                    "mcp_servers": sys.mcp_servers,
                }),
            )),
            StreamRecord::Assistant(conv) => {
                for block in conv.message.content.into_blocks() {
                    out.push(seq.stamp(MessageKind::Assistant, json!({ "content": block })));
                }
            }
            StreamRecord::User(conv) => {
                for block in conv.message.content.into_blocks() {
                    out.push(seq.stamp(MessageKind::User, json!({ "content": block })));
                }
            }
            StreamRecord::Result(res) => out.push(seq.stamp(
                MessageKind::Result,
                json!({
                    "is_error": res.is_error,
                    "duration_ms": res.duration_ms,
                    "total_cost_usd": res.total_cost_usd,
                    "usage": res.usage,
                }),
            )),
            StreamRecord::Unknown => {
                tracing::debug!("Dropping streaming record {} of unrecognized type", idx + 1);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use runlog_core::testing::*;

    #[test]
    fn fans_out_blocks_with_shared_sequence() {
        let messages = adapt_stream_records(vec![
            stream_system("claude-sonnet", "/work", &["Bash"]),
            stream_assistant(vec![text_block("a"), tool_use_block("Bash", json!({"command": "ls"}))]),
            stream_user(vec![tool_result_block(json!("ok"), false)]),
            stream_result(1500, 0.02, json!({"input_tokens": 3})),
        ]);
        let stamps: Vec<String> = messages.iter().map(|m| m.timestamp.to_string()).collect();
        assert_eq!(stamps, vec!["#1", "#2", "#3", "#4", "#5"]);
        let kinds: Vec<&str> = messages.iter().map(|m| m.kind.as_str()).collect();
        assert_eq!(
            kinds,
            vec![
                "SystemMessage",
                "AssistantMessage",
                "AssistantMessage",
                "UserMessage",
                "ResultMessage"
            ]
        );
        assert_eq!(messages[2].data["content"]["name"], "Bash");
    }

    #[test]
    fn system_payload_keeps_four_fields() {
        let messages = adapt_stream_records(vec![stream_system("m", "/w", &["Read", "Edit"])]);
        assert_eq!(
            messages[0].data,
            json!({"model": "m", "cwd": "/w", "tools": ["Read", "Edit"], "mcp_servers": []})
        );
    }

    #[test]
    fn missing_fields_get_defaults() {
        let messages = adapt_stream_records(vec![
            json!({"type": "system"}),
            json!({"type": "result"}),
        ]);
        assert_eq!(
            messages[0].data,
            json!({"model": "Unknown", "cwd": "Unknown", "tools": [], "mcp_servers": []})
        );
        assert_eq!(
            messages[1].data,
            json!({"is_error": false, "duration_ms": 0, "total_cost_usd": 0.0, "usage": {}})
        );
    }

    #[test]
    fn result_duration_passes_through() {
        let messages = adapt_stream_records(vec![stream_result(1500, 0.1, json!({}))]);
        assert_eq!(messages[0].data["duration_ms"], json!(1500));
    }

    #[test]
    fn unknown_and_malformed_records_are_dropped() {
        let messages = adapt_stream_records(vec![
            json!({"type": "stream_event", "event": {}}),
            json!({"no_type": true}),
            json!({"type": "assistant", "message": "not an object"}),
            stream_assistant(vec![text_block("kept")]),
        ]);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].timestamp, Timestamp::Sequence(1));
    }

    #[test]
    fn empty_or_missing_content_emits_nothing() {
        let messages = adapt_stream_records(vec![
            stream_assistant(vec![]),
            json!({"type": "user"}),
            json!({"type": "user", "message": {}}),
        ]);
        assert!(messages.is_empty());
    }

    #[test]
    fn string_content_is_one_message() {
        let messages = adapt_stream_records(vec![json!({
            "type": "user",
            "message": {"role": "user", "content": "hello"}
        })]);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].data, json!({"content": "hello"}));
    }
}
