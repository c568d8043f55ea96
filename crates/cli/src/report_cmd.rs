use anyhow::{Context, Result};
use runlog_core::ReportConfig;
use std::path::{Path, PathBuf};

/// Rejections raised before any generation work starts.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("File must be a .jsonl file, got: {0}")]
    NotJsonl(String),
}

pub fn check_input(input: &Path) -> Result<(), InputError> {
    if !input.exists() {
        return Err(InputError::NotFound(input.to_path_buf()));
    }
    match input.extension().and_then(|e| e.to_str()) {
        Some("jsonl") => Ok(()),
        other => Err(InputError::NotJsonl(
            other.map(|e| format!(".{e}")).unwrap_or_default(),
        )),
    }
}

pub fn run_report(input: &Path, output_dir: Option<&Path>, config: Option<&Path>) -> Result<()> {
    let config = ReportConfig::resolve(config).context("failed to load report settings")?;

    println!("Generating report for: {}", input.display());
    let path = runlog_report::generate(input, output_dir, &config)
        .with_context(|| format!("failed to build report for {}", input.display()))?;
    println!("Generated: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_input_rejects_missing_and_wrong_extension() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("absent.jsonl");
        assert!(matches!(check_input(&missing), Err(InputError::NotFound(_))));

        let txt = dir.path().join("log.txt");
        std::fs::write(&txt, "").unwrap();
        let err = check_input(&txt).unwrap_err();
        assert_eq!(err.to_string(), "File must be a .jsonl file, got: .txt");

        let bare = dir.path().join("log");
        std::fs::write(&bare, "").unwrap();
        assert!(matches!(check_input(&bare), Err(InputError::NotJsonl(ext)) if ext.is_empty()));

        let ok = dir.path().join("log.jsonl");
        std::fs::write(&ok, "").unwrap();
        assert!(check_input(&ok).is_ok());
    }
}
