pub mod content;
pub mod detect;
pub mod literal;
pub mod stream;

pub(crate) mod common;

pub use content::{parse_message, ContentOptions, MessageView, ParsedContent};
pub use detect::{detect_format, LogFormat};

use runlog_core::CanonicalMessage;
use serde_json::Value;

/// Trait for turning one log format's raw records into canonical messages
pub trait RecordAdapter: Send + Sync {
    /// Format this adapter handles
    fn format(&self) -> LogFormat;

    /// Convert every record, in order. Never fails: records that cannot be
    /// understood are dropped or degraded to `Unknown` messages.
    fn adapt(&self, records: Vec<Value>) -> Vec<CanonicalMessage>;
}

/// Pass-through for logs already in `{"type","timestamp","data"}` form.
pub struct LegacyAdapter;

impl RecordAdapter for LegacyAdapter {
    fn format(&self) -> LogFormat {
        LogFormat::Legacy
    }

    fn adapt(&self, records: Vec<Value>) -> Vec<CanonicalMessage> {
        records
            .into_iter()
            .map(CanonicalMessage::from_record)
            .collect()
    }
}

/// Get the adapter for a detected format
pub fn adapter_for(format: LogFormat) -> Box<dyn RecordAdapter> {
    match format {
        LogFormat::Streaming => Box::new(stream::StreamAdapter),
        LogFormat::Legacy => Box::new(LegacyAdapter),
    }
}

/// Detect the log format and normalize every record into canonical messages.
pub fn normalize(records: Vec<Value>) -> (LogFormat, Vec<CanonicalMessage>) {
    let format = detect_format(&records);
    let messages = adapter_for(format).adapt(records);
    tracing::debug!("Normalized {} messages from {:?} log", messages.len(), format);
    (format, messages)
}
