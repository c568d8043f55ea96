pub mod config;
pub mod jsonl;
pub mod message;
pub mod stats;
pub mod time;

pub use config::ReportConfig;
pub use message::{CanonicalMessage, Category, MessageKind};
pub use stats::{aggregate, SessionStats, TokenTotals};
pub use time::{DisplayTimezone, Timestamp};

#[cfg(any(test, feature = "testing"))]
pub mod testing;
