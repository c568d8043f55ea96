use runlog_core::jsonl::JsonlError;
use std::path::PathBuf;

/// Errors that abort report generation.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ReportError {
    #[error("failed to read log: {0}")]
    Jsonl(#[from] JsonlError),

    #[error("invalid template: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("failed to render {template}: {source}")]
    Render {
        template: &'static str,
        source: handlebars::RenderError,
    },

    #[error("failed to serialize report data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write report {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ReportError>;
