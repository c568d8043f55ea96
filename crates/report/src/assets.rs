//! Templates, stylesheets and the client script, compiled into the binary so
//! a report never depends on files next to the executable.

pub(crate) const BASE_TEMPLATE: &str = include_str!("templates/base.hbs");

/// Shared body of the assistant and user components.
pub(crate) const CONTENT_BLOCK_PARTIAL: &str = include_str!("templates/components/content_block.hbs");

/// `(template name, source)` for every per-kind message component.
pub(crate) const COMPONENT_TEMPLATES: [(&str, &str); 5] = [
    (
        "components/system",
        include_str!("templates/components/system.hbs"),
    ),
    (
        "components/assistant",
        include_str!("templates/components/assistant.hbs"),
    ),
    (
        "components/user",
        include_str!("templates/components/user.hbs"),
    ),
    (
        "components/result",
        include_str!("templates/components/result.hbs"),
    ),
    (
        "components/unknown",
        include_str!("templates/components/unknown.hbs"),
    ),
];

pub(crate) const BASE_CSS: &str = include_str!("templates/styles/base.css");
pub(crate) const SYSTEM_CSS: &str = include_str!("templates/styles/system.css");
pub(crate) const ASSISTANT_CSS: &str = include_str!("templates/styles/assistant.css");
pub(crate) const USER_CSS: &str = include_str!("templates/styles/user.css");
pub(crate) const RESULT_CSS: &str = include_str!("templates/styles/result.css");

pub(crate) const SCRIPT_JS: &str = include_str!("templates/script.js");
