// ABOUTME: Engine options accepted by the environment and how they map onto Handlebars
// ABOUTME: Unrecognized keys are kept verbatim and passed through untouched

use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EnvironmentOptions {
    /// Dev mode: a loaded template is re-read from disk each time it renders.
    pub debug: bool,

    /// Fail on missing variables instead of rendering them empty.
    pub strict_variables: bool,

    /// HTML-escape `{{expr}}` output.
    pub autoescape: bool,

    pub prevent_indent: bool,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Default for EnvironmentOptions {
    fn default() -> Self {
        Self {
            debug: false,
            strict_variables: false,
            autoescape: true,
            prevent_indent: false,
            extra: Map::new(),
        }
    }
}

impl EnvironmentOptions {
    pub fn apply(&self, handlebars: &mut Handlebars<'static>) {
        handlebars.set_dev_mode(self.debug);
        handlebars.set_strict_mode(self.strict_variables);
        handlebars.set_prevent_indent(self.prevent_indent);

        if self.autoescape {
            handlebars.register_escape_fn(handlebars::html_escape);
        } else {
            handlebars.register_escape_fn(handlebars::no_escape);
        }

        for key in self.extra.keys() {
            debug!("Engine option '{}' passed through unused", key);
        }
    }
}
