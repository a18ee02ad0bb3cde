//! Output rendering for resolved documents

use crate::stringify::{StringifyOptions, to_json, to_json_pretty, to_json5};
use crate::{Edition, Value};

/// How `check` prints a resolved document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    JsonPretty,
    /// JSON5 targeting the given edition
    Json5 { pretty: bool, edition: Edition },
}

impl OutputFormat {
    pub fn new(pretty: bool, json5: bool, edition: Edition) -> Self {
        match (json5, pretty) {
            (true, pretty) => OutputFormat::Json5 { pretty, edition },
            (false, true) => OutputFormat::JsonPretty,
            (false, false) => OutputFormat::Json,
        }
    }
}

/// Render a value in the requested format
pub fn render(value: &Value, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(value),
        OutputFormat::JsonPretty => to_json_pretty(value),
        OutputFormat::Json5 { pretty, edition } => {
            let options = StringifyOptions::default()
                .with_indent(if pretty { 2 } else { 0 })
                .with_edition(edition.year());
            to_json5(value, &options)
        }
    }
}
