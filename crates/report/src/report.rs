use crate::assets;
use crate::error::{ReportError, Result};
use crate::render::Renderer;
use runlog_core::jsonl::read_records_from_path;
use runlog_core::{aggregate, CanonicalMessage, Category, ReportConfig, SessionStats};
use runlog_parsers::{normalize, parse_message, ContentOptions, MessageView};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Everything the page template sees for one message.
#[derive(Debug, Clone, Serialize)]
pub struct MessageContext {
    #[serde(rename = "type")]
    pub kind: String,
    pub type_class: Category,
    pub formatted_time: String,
    pub rendered_content: String,
    /// Payload as indented JSON for the raw-data panel.
    pub raw_data: String,
    pub index: usize,
}

#[derive(Debug, Serialize)]
struct ReportContext<'a> {
    report_name: &'a str,
    stats: &'a SessionStats,
    messages: &'a [MessageContext],
    messages_json: String,
    base_css: &'static str,
    system_css: &'static str,
    assistant_css: &'static str,
    user_css: &'static str,
    result_css: &'static str,
    script_js: &'static str,
}

/// A rendered report and the data it was built from.
#[derive(Debug, Clone)]
pub struct Report {
    pub stats: SessionStats,
    pub messages: Vec<MessageContext>,
    pub html: String,
}

/// Build the report for already-normalized messages.
pub fn assemble(
    report_name: &str,
    messages: &[CanonicalMessage],
    config: &ReportConfig,
    renderer: &Renderer,
) -> Result<Report> {
    let options = ContentOptions::from(config);
    let views: Vec<MessageView> = messages
        .iter()
        .map(|msg| parse_message(msg, &options))
        .collect();

    let mut stats = aggregate(messages);
    for name in views
        .iter()
        .filter_map(|view| view.content().and_then(|c| c.tool_name()))
    {
        stats.record_tool(name);
    }

    let display = &config.display;
    let contexts = messages
        .iter()
        .zip(&views)
        .enumerate()
        .map(|(index, (msg, view))| {
            Ok(MessageContext {
                kind: msg.kind.to_string(),
                type_class: msg.kind.category(),
                formatted_time: msg.timestamp.display(display.timezone, &display.time_format),
                rendered_content: renderer.render_message(view, index)?,
                raw_data: serde_json::to_string_pretty(&msg.data)?,
                index,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let html = renderer.render_page(&ReportContext {
        report_name,
        stats: &stats,
        messages: &contexts,
        messages_json: script_safe_json(messages)?,
        base_css: assets::BASE_CSS,
        system_css: assets::SYSTEM_CSS,
        assistant_css: assets::ASSISTANT_CSS,
        user_css: assets::USER_CSS,
        result_css: assets::RESULT_CSS,
        script_js: assets::SCRIPT_JS,
    })?;

    debug!(
        "Assembled report {} ({} messages, {} bytes)",
        report_name,
        contexts.len(),
        html.len()
    );
    Ok(Report {
        stats,
        messages: contexts,
        html,
    })
}

/// Serialize for a `<script>` body. `<` is escaped so `</script>` inside log
/// content cannot close the element.
pub fn script_safe_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace('<', "\\u003c"))
}

/// `<output_dir>/<stem>.html` when a directory is given, else the input path
/// with its extension swapped for `.html`.
pub fn output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    match output_dir {
        Some(dir) => {
            let mut name = input
                .file_stem()
                .unwrap_or(input.as_os_str())
                .to_os_string();
            name.push(".html");
            dir.join(name)
        }
        None => input.with_extension("html"),
    }
}

/// Read `input`, build its report and write it next to the input or into
/// `output_dir` (created if missing). Returns the written path.
pub fn generate(
    input: &Path,
    output_dir: Option<&Path>,
    config: &ReportConfig,
) -> Result<PathBuf> {
    let records = read_records_from_path(input)?;
    let (format, messages) = normalize(records);
    info!(
        "Loaded {} messages ({:?} format) from {}",
        messages.len(),
        format,
        input.display()
    );

    let report_name = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let renderer = Renderer::new()?;
    let report = assemble(&report_name, &messages, config, &renderer)?;

    if let Some(dir) = output_dir {
        std::fs::create_dir_all(dir).map_err(|source| ReportError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    let path = output_path(input, output_dir);
    std::fs::write(&path, &report.html).map_err(|source| ReportError::Write {
        path: path.clone(),
        source,
    })?;
    info!("Wrote report to {}", path.display());
    Ok(path)
}
