// ABOUTME: Debug helper for templates that dumps values as JSON
// ABOUTME: With no argument the whole render context is dumped

use handlebars::{
    Context, Handlebars, Helper, HelperDef, RenderContext, RenderError, ScopedJson,
};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::{parse_options, Extension};
use crate::error::ConfigurationError;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugOptions {
    pub pretty: bool,
}

impl Default for DebugOptions {
    fn default() -> Self {
        Self { pretty: true }
    }
}

pub struct DebugExtension {
    options: DebugOptions,
}

impl DebugExtension {
    pub const NAME: &'static str = "debug";

    pub fn new(options: DebugOptions) -> Self {
        Self { options }
    }

    pub fn from_options(options: Option<&JsonValue>) -> Result<Self, ConfigurationError> {
        Ok(Self::new(parse_options(Self::NAME, options)?))
    }
}

impl Extension for DebugExtension {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn register(&self, handlebars: &mut Handlebars<'static>) {
        handlebars.register_helper(
            "dump",
            Box::new(DumpHelper {
                pretty: self.options.pretty,
            }),
        );
    }
}

struct DumpHelper {
    pretty: bool,
}

impl HelperDef for DumpHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'reg, 'rc>, RenderError> {
        let value = h.param(0).map(|v| v.value()).unwrap_or_else(|| ctx.data());
        let dumped = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
        .map_err(|e| RenderError::new(format!("dump failed: {}", e)))?;
        Ok(ScopedJson::Derived(JsonValue::String(dumped)))
    }
}
