//! Handlebars rendering of message components and the report page.
//!
//! Interpolated values are HTML-escaped (the handlebars default). The only
//! unescaped slots are pre-rendered component fragments, the embedded
//! assets and the script-safe `messages_json`.

use crate::assets;
use crate::error::{ReportError, Result};
use handlebars::Handlebars;
use runlog_parsers::MessageView;
use serde::Serialize;
use tracing::debug;

const BASE: &str = "base";

/// Data handed to a component template: the message index plus the parsed
/// view for that kind.
#[derive(Debug, Serialize)]
struct Component<'a, T: Serialize> {
    index: usize,
    data: &'a T,
}

#[derive(Debug)]
pub struct Renderer {
    handlebars: Handlebars<'static>,
}

impl Renderer {
    /// Compile the embedded templates and register helpers.
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        helpers::register_all(&mut handlebars);

        handlebars.register_partial("content_block", assets::CONTENT_BLOCK_PARTIAL)?;
        handlebars.register_template_string(BASE, assets::BASE_TEMPLATE)?;
        for (name, source) in assets::COMPONENT_TEMPLATES {
            handlebars.register_template_string(name, source)?;
        }

        debug!(
            "Renderer initialized with {} templates",
            assets::COMPONENT_TEMPLATES.len() + 1
        );
        Ok(Self { handlebars })
    }

    /// Render the HTML fragment for one message.
    pub fn render_message(&self, view: &MessageView, index: usize) -> Result<String> {
        match view {
            MessageView::System(details) => {
                self.render_component("components/system", index, details)
            }
            MessageView::Assistant(content) => {
                self.render_component("components/assistant", index, content)
            }
            MessageView::User(content) => {
                self.render_component("components/user", index, content)
            }
            MessageView::Result(details) => {
                self.render_component("components/result", index, details)
            }
            MessageView::Unknown { payload } => {
                self.render_component("components/unknown", index, payload)
            }
        }
    }

    /// Render the full document from an assembled report context.
    pub fn render_page<T: Serialize>(&self, context: &T) -> Result<String> {
        self.render(BASE, context)
    }

    fn render_component<T: Serialize>(
        &self,
        name: &'static str,
        index: usize,
        data: &T,
    ) -> Result<String> {
        self.render(name, &Component { index, data })
    }

    fn render<T: Serialize>(&self, template: &'static str, data: &T) -> Result<String> {
        self.handlebars
            .render(template, data)
            .map_err(|source| ReportError::Render { template, source })
    }
}

pub mod helpers {
    use handlebars::{Context, Handlebars, Helper, Output, RenderContext, RenderError};
    use runlog_core::stats::format_duration;

    /// Helper to format USD amounts with four decimals
    pub fn format_cost(
        h: &Helper,
        _: &Handlebars,
        _: &Context,
        _: &mut RenderContext,
        out: &mut dyn Output,
    ) -> Result<(), RenderError> {
        let amount = h
            .param(0)
            .ok_or_else(|| RenderError::new("Amount parameter required"))?
            .value()
            .as_f64()
            .unwrap_or(0.0);
        out.write(&format!("${amount:.4}"))?;
        Ok(())
    }

    /// Helper to format token counts with thousands separators
    pub fn format_number(
        h: &Helper,
        _: &Handlebars,
        _: &Context,
        _: &mut RenderContext,
        out: &mut dyn Output,
    ) -> Result<(), RenderError> {
        let value = h
            .param(0)
            .ok_or_else(|| RenderError::new("Number parameter required"))?
            .value();
        let formatted = match value.as_u64() {
            Some(n) => group_thousands(n),
            None => value.to_string(),
        };
        out.write(&formatted)?;
        Ok(())
    }

    /// Helper to show a millisecond count the way session durations are shown
    pub fn format_ms(
        h: &Helper,
        _: &Handlebars,
        _: &Context,
        _: &mut RenderContext,
        out: &mut dyn Output,
    ) -> Result<(), RenderError> {
        let ms = h
            .param(0)
            .ok_or_else(|| RenderError::new("Duration parameter required"))?
            .value()
            .as_f64()
            .unwrap_or(0.0);
        out.write(&format_duration(ms / 1000.0))?;
        Ok(())
    }

    pub(crate) fn group_thousands(n: u64) -> String {
        let digits = n.to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(c);
        }
        out
    }

    /// Register all helper functions
    pub fn register_all(handlebars: &mut Handlebars) {
        handlebars.register_helper("format_cost", Box::new(format_cost));
        handlebars.register_helper("format_number", Box::new(format_number));
        handlebars.register_helper("format_ms", Box::new(format_ms));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runlog_parsers::content::{ResultDetails, SystemDetails, UsageDetails};
    use runlog_parsers::ParsedContent;

    fn renderer() -> Renderer {
        Renderer::new().unwrap()
    }

    #[test]
    fn group_thousands_inserts_commas() {
        assert_eq!(helpers::group_thousands(0), "0");
        assert_eq!(helpers::group_thousands(999), "999");
        assert_eq!(helpers::group_thousands(1000), "1,000");
        assert_eq!(helpers::group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn assistant_text_is_escaped() {
        let html = renderer()
            .render_message(
                &MessageView::Assistant(ParsedContent::Text {
                    text: "<script>alert(1)</script>".into(),
                }),
                0,
            )
            .unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn tool_use_shows_name_and_input() {
        let html = renderer()
            .render_message(
                &MessageView::Assistant(ParsedContent::ToolUse {
                    tool_name: "Bash".into(),
                    tool_input: "{\n  \"command\": \"ls\"\n}".into(),
                }),
                3,
            )
            .unwrap();
        assert!(html.contains("Bash"));
        assert!(html.contains("&quot;command&quot;"));
        assert!(!html.contains("fallback-text"));
    }

    #[test]
    fn long_tool_result_is_collapsible() {
        let html = renderer()
            .render_message(
                &MessageView::User(ParsedContent::ToolResult {
                    is_error: true,
                    result_text: "1\n2\n3\n4\n5\n6".into(),
                    result_format: Default::default(),
                    is_long_content: true,
                }),
                7,
            )
            .unwrap();
        assert!(html.contains("tool-result-error"));
        assert!(html.contains("collapsed"));
        assert!(html.contains("data-index=\"7\""));
    }

    #[test]
    fn system_and_result_components() {
        let r = renderer();
        let html = r
            .render_message(
                &MessageView::System(SystemDetails {
                    model: "claude-3".into(),
                    cwd: "/repo".into(),
                    tools: vec!["Bash".into(), "Read".into()],
                    mcp_servers: vec![],
                }),
                0,
            )
            .unwrap();
        assert!(html.contains("claude-3"));
        assert!(html.contains("/repo"));
        assert!(html.contains("Read"));

        let html = r
            .render_message(
                &MessageView::Result(ResultDetails {
                    is_error: false,
                    duration_ms: 1500,
                    total_cost: 0.0123,
                    usage: UsageDetails {
                        input_tokens: 12345,
                        ..Default::default()
                    },
                }),
                1,
            )
            .unwrap();
        assert!(html.contains("$0.0123"));
        assert!(html.contains("12,345"));
        assert!(html.contains("1.5s"));
    }

    #[test]
    fn unknown_component_escapes_payload() {
        let html = renderer()
            .render_message(
                &MessageView::Unknown {
                    payload: r#"{"x":"<b>"}"#.into(),
                },
                2,
            )
            .unwrap();
        assert!(html.contains("unknown-message"));
        assert!(html.contains("&lt;b&gt;"));
    }
}
