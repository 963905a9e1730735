// ABOUTME: Text helpers for templates: case conversion, truncation and word wrapping
// ABOUTME: Helpers return values so their output is escaped like any other expression

use handlebars::{
    Context, Handlebars, Helper, HelperDef, RenderContext, RenderError, ScopedJson,
};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::{parse_options, string_param, usize_param, Extension};
use crate::error::ConfigurationError;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TextOptions {
    pub truncate_length: usize,
    pub truncate_suffix: String,
    pub wordwrap_width: usize,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            truncate_length: 30,
            truncate_suffix: "...".to_string(),
            wordwrap_width: 80,
        }
    }
}

pub struct TextExtension {
    options: TextOptions,
}

impl TextExtension {
    pub const NAME: &'static str = "text";

    pub fn new(options: TextOptions) -> Self {
        Self { options }
    }

    pub fn from_options(options: Option<&JsonValue>) -> Result<Self, ConfigurationError> {
        Ok(Self::new(parse_options(Self::NAME, options)?))
    }
}

impl Extension for TextExtension {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn register(&self, handlebars: &mut Handlebars<'static>) {
        handlebars.register_helper("upper", Box::new(CaseHelper::Upper));
        handlebars.register_helper("lower", Box::new(CaseHelper::Lower));
        handlebars.register_helper("capitalize", Box::new(CaseHelper::Capitalize));
        handlebars.register_helper(
            "truncate",
            Box::new(TruncateHelper {
                length: self.options.truncate_length,
                suffix: self.options.truncate_suffix.clone(),
            }),
        );
        handlebars.register_helper(
            "wordwrap",
            Box::new(WordwrapHelper {
                width: self.options.wordwrap_width,
            }),
        );
    }
}

#[derive(Debug, Clone, Copy)]
enum CaseHelper {
    Upper,
    Lower,
    Capitalize,
}

impl HelperDef for CaseHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'reg, 'rc>, RenderError> {
        let input = string_param(h, 0, self.helper_name())?;
        let output = match self {
            CaseHelper::Upper => input.to_uppercase(),
            CaseHelper::Lower => input.to_lowercase(),
            CaseHelper::Capitalize => capitalize(&input),
        };
        Ok(ScopedJson::Derived(JsonValue::String(output)))
    }
}

impl CaseHelper {
    fn helper_name(&self) -> &'static str {
        match self {
            CaseHelper::Upper => "upper",
            CaseHelper::Lower => "lower",
            CaseHelper::Capitalize => "capitalize",
        }
    }
}

fn capitalize(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

struct TruncateHelper {
    length: usize,
    suffix: String,
}

impl HelperDef for TruncateHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'reg, 'rc>, RenderError> {
        let input = string_param(h, 0, "truncate")?;
        let length = usize_param(h, 1).unwrap_or(self.length);
        Ok(ScopedJson::Derived(JsonValue::String(truncate(
            &input,
            length,
            &self.suffix,
        ))))
    }
}

fn truncate(input: &str, length: usize, suffix: &str) -> String {
    if input.chars().count() <= length {
        return input.to_string();
    }
    let mut truncated: String = input.chars().take(length).collect();
    truncated.push_str(suffix);
    truncated
}

struct WordwrapHelper {
    width: usize,
}

impl HelperDef for WordwrapHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'reg, 'rc>, RenderError> {
        let input = string_param(h, 0, "wordwrap")?;
        let width = usize_param(h, 1).unwrap_or(self.width).max(1);
        Ok(ScopedJson::Derived(JsonValue::String(wordwrap(&input, width))))
    }
}

/// Greedy wrap on whitespace; words longer than `width` stay whole.
fn wordwrap(input: &str, width: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in input.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };

        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines.join("\n")
}
