//! Record builders shared by tests across the workspace.

use serde_json::{json, Value};

/// Legacy envelope: `{"type", "timestamp", "data"}`.
pub fn legacy(kind: &str, timestamp: &str, data: Value) -> Value {
    json!({"type": kind, "timestamp": timestamp, "data": data})
}

/// Streaming `system` record.
pub fn stream_system(model: &str, cwd: &str, tools: &[&str]) -> Value {
    json!({
        "type": "system",
        "subtype": "init",
        "model": model,
        "cwd": cwd,
        "tools": tools,
        "mcp_servers": [],
    })
}

/// Streaming `assistant` record with the given content blocks.
pub fn stream_assistant(blocks: Vec<Value>) -> Value {
    json!({"type": "assistant", "message": {"role": "assistant", "content": blocks}})
}

/// Streaming `user` record with the given content blocks.
pub fn stream_user(blocks: Vec<Value>) -> Value {
    json!({"type": "user", "message": {"role": "user", "content": blocks}})
}

/// Streaming `result` record.
pub fn stream_result(duration_ms: u64, total_cost_usd: f64, usage: Value) -> Value {
    json!({
        "type": "result",
        "subtype": "success",
        "is_error": false,
        "duration_ms": duration_ms,
        "total_cost_usd": total_cost_usd,
        "usage": usage,
    })
}

pub fn text_block(text: &str) -> Value {
    json!({"type": "text", "text": text})
}

pub fn thinking_block(thinking: &str) -> Value {
    json!({"type": "thinking", "thinking": thinking})
}

pub fn tool_use_block(name: &str, input: Value) -> Value {
    json!({"type": "tool_use", "id": format!("toolu_{name}"), "name": name, "input": input})
}

pub fn tool_result_block(content: Value, is_error: bool) -> Value {
    json!({
        "type": "tool_result",
        "tool_use_id": "toolu_test",
        "content": content,
        "is_error": is_error,
    })
}

/// Serialize records as JSONL text, one per line.
pub fn to_jsonl(records: &[Value]) -> String {
    records
        .iter()
        .map(|r| format!("{r}\n"))
        .collect()
}
