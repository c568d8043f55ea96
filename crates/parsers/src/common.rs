//! Text helpers shared by the structured and legacy content parsers.

use crate::literal::Literal;
use serde_json::Value;

pub(crate) const TOOL_USE_ERROR_OPEN: &str = "<tool_use_error>";
pub(crate) const TOOL_USE_ERROR_CLOSE: &str = "</tool_use_error>";

/// Escapes recognized inside legacy `text='...'` bodies.
pub(crate) const REPR_ESCAPES: &[(char, char)] = &[
    ('n', '\n'),
    ('t', '\t'),
    ('"', '"'),
    ('\'', '\''),
    ('\\', '\\'),
];

/// Whitespace escapes recognized in tool result text.
pub(crate) const WHITESPACE_ESCAPES: &[(char, char)] = &[('n', '\n'), ('t', '\t'), ('r', '\r')];

/// Single left-to-right pass replacing `\x` pairs listed in `table`.
/// Unlisted pairs are copied through untouched, backslash included.
pub(crate) fn unescape(text: &str, table: &[(char, char)]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&(_, replacement)) = chars
                .peek()
                .and_then(|next| table.iter().find(|(from, _)| from == next))
            {
                out.push(replacement);
                chars.next();
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Flatten tool result content to display text.
///
/// A non-empty list contributes its first element's `text` when that element
/// is a `text` block; a mapping contributes its `text` key; strings are used
/// as-is; anything else is shown as its repr. Literal `\n`, `\t` and `\r`
/// escape sequences in the outcome are then unescaped.
pub(crate) fn flatten_to_text(content: &Literal) -> String {
    let text = match content {
        Literal::List(items) if !items.is_empty() => match &items[0] {
            first @ Literal::Dict(_)
                if first.get("type") == Some(&Literal::Str("text".to_string())) =>
            {
                first
                    .get("text")
                    .map(Literal::to_plain_string)
                    .unwrap_or_default()
            }
            _ => content.repr(),
        },
        Literal::Dict(_) => content
            .get("text")
            .map(Literal::to_plain_string)
            .unwrap_or_else(|| content.repr()),
        Literal::Str(s) => s.clone(),
        other => other.repr(),
    };
    unescape(&text, WHITESPACE_ESCAPES)
}

/// A result is long once it spans `threshold` or more line breaks.
pub(crate) fn is_long_content(text: &str, threshold: usize) -> bool {
    text.matches('\n').count() >= threshold
}

/// Plain display string for a JSON value: strings verbatim, everything else in
/// repr form (`True`, `None`, `{'k': 'v'}`).
pub(crate) fn plain_string(value: &Value) -> String {
    Literal::from(value).to_plain_string()
}

/// Remove `<tool_use_error>` wrappers and trim, if the opening tag is present.
pub(crate) fn strip_tool_use_error(text: String) -> String {
    if !text.contains(TOOL_USE_ERROR_OPEN) {
        return text;
    }
    text.replace(TOOL_USE_ERROR_OPEN, "")
        .replace(TOOL_USE_ERROR_CLOSE, "")
        .trim()
        .to_string()
}
