//! Scanners for legacy SDK object reprs such as
//! `TextBlock(text='...')`, `ToolUseBlock(id=..., name='...', input={...})` and
//! `ToolResultBlock(tool_use_id=..., content=[...], is_error=None)`.
//!
//! Each block shape gets its own small scanner. Quote scanning honours a
//! preceding backslash; bracket scanning is a plain depth count.

use super::{ContentOptions, ParsedContent, ResultFormat};
use crate::common::{
    flatten_to_text, is_long_content, strip_tool_use_error, unescape, REPR_ESCAPES,
    TOOL_USE_ERROR_OPEN, WHITESPACE_ESCAPES,
};
use crate::literal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockShape {
    Text,
    ToolUse,
    ToolResult,
}

const MARKERS: [(&str, BlockShape); 3] = [
    ("TextBlock", BlockShape::Text),
    ("ToolUseBlock", BlockShape::ToolUse),
    ("ToolResultBlock", BlockShape::ToolResult),
];

/// Parse a legacy repr string. The earliest block marker in `raw` picks the
/// scanner; no marker, or a scanner that cannot find its fields, yields the
/// raw string as fallback.
pub(super) fn parse_repr(raw: &str, options: &ContentOptions) -> ParsedContent {
    let shape = MARKERS
        .iter()
        .filter_map(|(marker, shape)| raw.find(marker).map(|at| (at, *shape)))
        .min_by_key(|(at, _)| *at)
        .map(|(_, shape)| shape);

    let parsed = match shape {
        Some(BlockShape::Text) => text_block(raw),
        Some(BlockShape::ToolUse) => tool_use_block(raw),
        Some(BlockShape::ToolResult) => Some(tool_result_block(raw, options)),
        None => None,
    };

    parsed.unwrap_or_else(|| {
        if let Some(shape) = shape {
            tracing::debug!("Could not scan {:?} repr; showing raw content", shape);
        }
        ParsedContent::fallback(raw)
    })
}

fn text_block(raw: &str) -> Option<ParsedContent> {
    let (start, quote) = match raw.find("text='") {
        Some(at) => (at + 6, b'\''),
        None => (raw.find("text=\"")? + 6, b'"'),
    };
    let end = match closing_quote_before_paren(raw, start, quote) {
        Some(end) => end,
        None => raw.rfind(if quote == b'\'' { "')" } else { "\")" })?,
    };
    let body = raw.get(start..end).unwrap_or("");
    Some(ParsedContent::Text {
        text: unescape(body, REPR_ESCAPES),
    })
}

/// First unescaped `quote` at or after `start` that is immediately followed
/// by `)`.
fn closing_quote_before_paren(raw: &str, start: usize, quote: u8) -> Option<usize> {
    let bytes = raw.as_bytes();
    (start..bytes.len()).find(|&pos| {
        bytes[pos] == quote
            && (pos == 0 || bytes[pos - 1] != b'\\')
            && bytes.get(pos + 1) == Some(&b')')
    })
}

fn tool_use_block(raw: &str) -> Option<ParsedContent> {
    let (start, quote) = match raw.find("name='") {
        Some(at) => (at + 6, '\''),
        None => (raw.find("name=\"")? + 6, '"'),
    };
    let end = start + raw[start..].find(quote)?;
    let tool_name = raw[start..end].to_string();

    let tool_input = match raw.find("input={") {
        Some(at) => {
            let open = at + 6;
            let close = raw.rfind('}')?;
            let fragment = raw.get(open..=close).unwrap_or("");
            evaluate_input(fragment)
        }
        None => String::new(),
    };

    Some(ParsedContent::ToolUse {
        tool_name,
        tool_input,
    })
}

/// Pretty JSON for an `input={...}` fragment, or the fragment unchanged when
/// it is not a plain literal.
fn evaluate_input(fragment: &str) -> String {
    let pretty = literal::parse(fragment)
        .and_then(|lit| lit.to_json())
        .map(|json| serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string()));
    match pretty {
        Ok(pretty) => pretty,
        Err(e) => {
            tracing::debug!("Tool input is not a plain literal ({}); keeping raw text", e);
            fragment.to_string()
        }
    }
}

fn tool_result_block(raw: &str, options: &ContentOptions) -> ParsedContent {
    let is_error = raw.contains("is_error=True") || raw.contains(TOOL_USE_ERROR_OPEN);

    let result_text = if let Some(at) = raw.find("content=[") {
        let start = at + 9;
        let inner = raw.get(start..bracket_list_end(raw, start)).unwrap_or("");
        match literal::parse_expression_list(inner) {
            Ok(lit) => flatten_to_text(&lit),
            Err(e) => {
                tracing::debug!("Tool result list is not a plain literal ({}); keeping raw text", e);
                unescape(inner, &WHITESPACE_ESCAPES[..2])
            }
        }
    } else if let Some(at) = raw.find("content='") {
        quoted_content(raw, at + 9, b'\'')
    } else if let Some(at) = raw.find("content=\"") {
        quoted_content(raw, at + 9, b'"')
    } else {
        raw.to_string()
    };

    let result_text = strip_tool_use_error(result_text);
    ParsedContent::ToolResult {
        is_error,
        is_long_content: is_long_content(&result_text, options.long_content_lines),
        result_text,
        result_format: ResultFormat::Text,
    }
}

/// Offset of the `]` closing a list opened just before `start`. An unclosed
/// list ends one character before the end of `raw`.
fn bracket_list_end(raw: &str, start: usize) -> usize {
    let mut depth = 1usize;
    for (offset, byte) in raw.as_bytes()[start..].iter().enumerate() {
        match byte {
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return start + offset;
                }
            }
            _ => {}
        }
    }
    raw.char_indices()
        .next_back()
        .map(|(last, _)| last)
        .unwrap_or(0)
}

/// Body of `content='...'` up to the first quote not preceded by a backslash,
/// with `\n` and `\t` unescaped.
fn quoted_content(raw: &str, start: usize, quote: u8) -> String {
    let bytes = raw.as_bytes();
    let end = (start..bytes.len())
        .find(|&pos| bytes[pos] == quote && bytes[pos - 1] != b'\\')
        .unwrap_or(bytes.len());
    unescape(&raw[start..end], &WHITESPACE_ESCAPES[..2])
}
