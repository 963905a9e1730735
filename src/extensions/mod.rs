// ABOUTME: Template engine extensions: named bundles of Handlebars helpers
// ABOUTME: Defines the Extension trait and shared helper plumbing for the built-in bundles

pub mod date;
pub mod debug;
pub mod encoding;
pub mod include;
pub mod text;

use handlebars::{Handlebars, Helper, JsonRender, RenderError};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::ConfigurationError;

pub use date::DateExtension;
pub use debug::DebugExtension;
pub use encoding::EncodingExtension;
pub use include::IncludeExtension;
pub use text::TextExtension;

pub trait Extension: Send + Sync {
    fn name(&self) -> &str;

    /// Install the extension's helpers.
    fn register(&self, handlebars: &mut Handlebars<'static>);
}

/// Deserialize extension options, falling back to defaults when none are given.
pub fn parse_options<T>(class: &str, options: Option<&JsonValue>) -> Result<T, ConfigurationError>
where
    T: DeserializeOwned + Default,
{
    match options {
        None | Some(JsonValue::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
            ConfigurationError::InvalidExtensionOptions {
                class: class.to_string(),
                reason: e.to_string(),
            }
        }),
    }
}

/// Parameter rendered as a string; numbers and booleans are accepted.
pub(crate) fn string_param(h: &Helper, index: usize, helper: &str) -> Result<String, RenderError> {
    h.param(index)
        .map(|v| match v.value() {
            JsonValue::String(s) => s.clone(),
            other => other.render(),
        })
        .ok_or_else(|| {
            RenderError::new(format!(
                "{} helper requires parameter {}",
                helper,
                index + 1
            ))
        })
}

pub(crate) fn usize_param(h: &Helper, index: usize) -> Option<usize> {
    h.param(index)
        .and_then(|v| v.value().as_u64())
        .map(|n| n as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Sample {
        #[serde(default)]
        width: usize,
    }

    #[test]
    fn test_parse_options_defaults() {
        let parsed: Sample = parse_options("sample", None).unwrap();
        assert_eq!(parsed, Sample::default());
        let parsed: Sample = parse_options("sample", Some(&JsonValue::Null)).unwrap();
        assert_eq!(parsed, Sample::default());
    }

    #[test]
    fn test_parse_options_invalid() {
        let result: Result<Sample, _> = parse_options("sample", Some(&json!({"width": "wide"})));
        match result {
            Err(ConfigurationError::InvalidExtensionOptions { class, .. }) => {
                assert_eq!(class, "sample")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
