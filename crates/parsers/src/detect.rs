use serde_json::Value;

/// Record-level `type` values that mark a streaming log.
pub const STREAMING_TYPES: [&str; 4] = ["system", "assistant", "user", "result"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// CLI `--output-format stream-json` records (`{"type":"assistant","message":{...}}`).
    Streaming,
    /// Pre-normalized `{"type":"AssistantMessage","timestamp":...,"data":{...}}` records.
    Legacy,
}

/// Decide the format from the first record alone.
///
/// Empty input, a non-object first record, or any other first `type` means
/// legacy.
pub fn detect_format(records: &[Value]) -> LogFormat {
    let first_type = records
        .first()
        .and_then(|r| r.get("type"))
        .and_then(Value::as_str);
    match first_type {
        Some(t) if STREAMING_TYPES.contains(&t) => LogFormat::Streaming,
        _ => LogFormat::Legacy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lowercase_record_types_are_streaming() {
        for t in STREAMING_TYPES {
            assert_eq!(detect_format(&[json!({"type": t})]), LogFormat::Streaming);
        }
    }

    #[test]
    fn everything_else_is_legacy() {
        assert_eq!(detect_format(&[]), LogFormat::Legacy);
        assert_eq!(
            detect_format(&[json!({"type": "SystemMessage"})]),
            LogFormat::Legacy
        );
        assert_eq!(detect_format(&[json!({"type": "System"})]), LogFormat::Legacy);
        assert_eq!(detect_format(&[json!({"data": {}})]), LogFormat::Legacy);
        assert_eq!(detect_format(&[json!("system")]), LogFormat::Legacy);
    }

    #[test]
    fn only_first_record_matters() {
        let records = [json!({"type": "SystemMessage"}), json!({"type": "system"})];
        assert_eq!(detect_format(&records), LogFormat::Legacy);
        let records = [json!({"type": "result"}), json!({"type": "SystemMessage"})];
        assert_eq!(detect_format(&records), LogFormat::Streaming);
    }
}
