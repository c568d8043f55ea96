use crate::message::{CanonicalMessage, MessageKind};
use crate::time::Timestamp;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Token counters summed across every result message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenTotals {
    pub input: u64,
    pub output: u64,
    pub cache_read: u64,
    pub cache_write: u64,
}

impl TokenTotals {
    fn add_usage(&mut self, usage: Option<&Value>) {
        self.input += usage_counter(usage, "input_tokens");
        self.output += usage_counter(usage, "output_tokens");
        self.cache_read += usage_counter(usage, "cache_read_input_tokens");
        self.cache_write += usage_counter(usage, "cache_creation_input_tokens");
    }
}

/// Session-level summary computed once per report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStats {
    pub total_messages: usize,
    pub message_types: BTreeMap<String, usize>,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
    pub duration: Option<String>,
    pub model: String,
    pub total_cost: f64,
    pub total_tokens: TokenTotals,
    /// Distinct tool names in first-seen order. Filled by whoever parses
    /// message content; the aggregator itself never looks inside payloads.
    pub tools_used: Vec<String>,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self {
            total_messages: 0,
            message_types: BTreeMap::new(),
            start_time: None,
            end_time: None,
            duration: None,
            model: MessageKind::UNKNOWN.to_string(),
            total_cost: 0.0,
            total_tokens: TokenTotals::default(),
            tools_used: Vec::new(),
        }
    }
}

impl SessionStats {
    pub fn record_tool(&mut self, name: &str) {
        if !self.tools_used.iter().any(|t| t == name) {
            self.tools_used.push(name.to_string());
        }
    }
}

/// Running state threaded through the single pass in [`aggregate`].
#[derive(Debug, Default)]
struct Accumulator {
    stats: SessionStats,
    seen_system: bool,
    first_duration_ms: Option<f64>,
}

impl Accumulator {
    fn observe(mut self, msg: &CanonicalMessage) -> Self {
        self.stats.total_messages += 1;
        *self
            .stats
            .message_types
            .entry(msg.kind.as_str().to_string())
            .or_default() += 1;

        match msg.kind {
            MessageKind::System if !self.seen_system => {
                self.seen_system = true;
                self.stats.start_time = Some(msg.timestamp.clone());
                self.stats.model = msg
                    .field("model")
                    .map(value_to_plain_string)
                    .unwrap_or_else(|| MessageKind::UNKNOWN.to_string());
            }
            MessageKind::Result => {
                self.stats.end_time = Some(msg.timestamp.clone());
                self.stats.total_cost = msg
                    .field("total_cost_usd")
                    .and_then(Value::as_f64)
                    .unwrap_or(0.0);
                self.stats.total_tokens.add_usage(msg.field("usage"));
                if self.first_duration_ms.is_none() {
                    self.first_duration_ms = msg
                        .field("duration_ms")
                        .and_then(Value::as_f64)
                        .filter(|ms| *ms > 0.0);
                }
            }
            _ => {}
        }
        self
    }

    fn finish(self) -> SessionStats {
        let mut stats = self.stats;
        let seconds = wall_clock_seconds(stats.start_time.as_ref(), stats.end_time.as_ref())
            .or_else(|| self.first_duration_ms.map(|ms| ms / 1000.0));
        stats.duration = seconds.map(format_duration);
        stats
    }
}

/// Compute [`SessionStats`] in one pass over `messages`.
///
/// The first system message supplies the start time and model. Every result
/// message overwrites the end time and total cost and adds to the token
/// counters. Duration comes from real start/end instants when both exist,
/// otherwise from the first result message with a positive `duration_ms`.
pub fn aggregate(messages: &[CanonicalMessage]) -> SessionStats {
    messages
        .iter()
        .fold(Accumulator::default(), Accumulator::observe)
        .finish()
}

fn wall_clock_seconds(start: Option<&Timestamp>, end: Option<&Timestamp>) -> Option<f64> {
    let (start, end) = (start?, end?);
    if start.is_synthetic() || end.is_synthetic() {
        return None;
    }
    let seconds = start.instant()?.seconds_until(&end.instant()?);
    if seconds.is_none() {
        tracing::debug!("Start and end timestamps are not comparable; skipping wall-clock duration");
    }
    seconds
}

/// Human-readable duration: seconds under a minute, minutes under an hour,
/// hours otherwise, each with one decimal.
pub fn format_duration(seconds: f64) -> String {
    if seconds < 60.0 {
        format!("{seconds:.1}s")
    } else if seconds < 3600.0 {
        format!("{:.1}m", seconds / 60.0)
    } else {
        format!("{:.1}h", seconds / 3600.0)
    }
}

fn usage_counter(usage: Option<&Value>, key: &str) -> u64 {
    usage
        .and_then(|u| u.get(key))
        .and_then(|v| v.as_u64().or_else(|| v.as_f64().map(|f| f.max(0.0) as u64)))
        .unwrap_or(0)
}

fn value_to_plain_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
