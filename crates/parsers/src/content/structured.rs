use super::{ContentOptions, ParsedContent, ResultFormat};
use crate::common::{flatten_to_text, is_long_content, plain_string};
use crate::literal::Literal;
use runlog_core::MessageKind;
use serde_json::{Map, Value};

/// Parse a modern content block (`{"type": "text", ...}`) or block array.
/// Arrays contribute only their first block.
pub(super) fn parse_block(content: &Value, options: &ContentOptions) -> ParsedContent {
    match content {
        Value::Object(block) => match block.get("type").and_then(Value::as_str) {
            Some("text") => ParsedContent::Text {
                text: field_text(block, "text"),
            },
            Some("thinking") => ParsedContent::Text {
                text: field_text(block, "thinking"),
            },
            Some("tool_use") => ParsedContent::ToolUse {
                tool_name: block
                    .get("name")
                    .map(plain_string)
                    .unwrap_or_else(|| MessageKind::UNKNOWN.to_string()),
                tool_input: pretty_input(block.get("input")),
            },
            Some("tool_result") => tool_result(block, options),
            _ => ParsedContent::fallback(Literal::from(content).repr()),
        },
        Value::Array(blocks) => match blocks.first() {
            Some(first) => parse_block(first, options),
            None => ParsedContent::fallback("[]"),
        },
        other => ParsedContent::fallback(plain_string(other)),
    }
}

fn tool_result(block: &Map<String, Value>, options: &ContentOptions) -> ParsedContent {
    let result_text = match block.get("content") {
        Some(content) => flatten_to_text(&Literal::from(content)),
        None => String::new(),
    };
    ParsedContent::ToolResult {
        is_error: block
            .get("is_error")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        is_long_content: is_long_content(&result_text, options.long_content_lines),
        result_text,
        result_format: ResultFormat::Text,
    }
}

fn field_text(block: &Map<String, Value>, key: &str) -> String {
    block.get(key).map(plain_string).unwrap_or_default()
}

fn pretty_input(input: Option<&Value>) -> String {
    let empty = Value::Object(Map::new());
    let input = input.unwrap_or(&empty);
    serde_json::to_string_pretty(input).unwrap_or_else(|_| input.to_string())
}
