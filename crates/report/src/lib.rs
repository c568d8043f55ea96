//! Agent run log to self-contained HTML report.
//!
//! ```no_run
//! use runlog_core::ReportConfig;
//! use std::path::Path;
//!
//! let path = runlog_report::generate(Path::new("run.jsonl"), None, &ReportConfig::default())?;
//! println!("Generated: {}", path.display());
//! # Ok::<(), runlog_report::ReportError>(())
//! ```

mod assets;
pub mod error;
pub mod render;
pub mod report;

pub use error::{ReportError, Result};
pub use render::Renderer;
pub use report::{assemble, generate, output_path, MessageContext, Report};
