// ABOUTME: Date helpers: current time and formatting of timestamps passed to templates
// ABOUTME: Accepts RFC 3339 strings or unix seconds and formats them with chrono patterns

use chrono::{DateTime, TimeZone, Utc};
use handlebars::{
    Context, Handlebars, Helper, HelperDef, RenderContext, RenderError, ScopedJson,
};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::fmt::Write as _;

use super::{parse_options, Extension};
use crate::error::ConfigurationError;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DateOptions {
    pub format: String,
}

impl Default for DateOptions {
    fn default() -> Self {
        Self {
            format: "%Y-%m-%d %H:%M:%S".to_string(),
        }
    }
}

pub struct DateExtension {
    options: DateOptions,
}

impl DateExtension {
    pub const NAME: &'static str = "date";

    pub fn new(options: DateOptions) -> Self {
        Self { options }
    }

    pub fn from_options(options: Option<&JsonValue>) -> Result<Self, ConfigurationError> {
        Ok(Self::new(parse_options(Self::NAME, options)?))
    }
}

impl Extension for DateExtension {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn register(&self, handlebars: &mut Handlebars<'static>) {
        handlebars.register_helper(
            "now",
            Box::new(NowHelper {
                format: self.options.format.clone(),
            }),
        );
        handlebars.register_helper(
            "date",
            Box::new(DateHelper {
                format: self.options.format.clone(),
            }),
        );
    }
}

fn format_param<'a>(h: &'a Helper, index: usize, default: &'a str) -> &'a str {
    h.param(index)
        .and_then(|v| v.value().as_str())
        .unwrap_or(default)
}

fn format_datetime(value: &DateTime<Utc>, format: &str) -> Result<String, RenderError> {
    let mut formatted = String::new();
    write!(formatted, "{}", value.format(format))
        .map_err(|_| RenderError::new(format!("Invalid date format: {}", format)))?;
    Ok(formatted)
}

fn parse_datetime(value: &JsonValue) -> Result<DateTime<Utc>, RenderError> {
    match value {
        JsonValue::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| RenderError::new(format!("Invalid date '{}': {}", s, e))),
        JsonValue::Number(n) => n
            .as_i64()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .ok_or_else(|| RenderError::new(format!("Invalid timestamp: {}", n))),
        other => Err(RenderError::new(format!("Cannot format {} as a date", other))),
    }
}

struct NowHelper {
    format: String,
}

impl HelperDef for NowHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'reg, 'rc>, RenderError> {
        let format = format_param(h, 0, &self.format);
        let formatted = format_datetime(&Utc::now(), format)?;
        Ok(ScopedJson::Derived(JsonValue::String(formatted)))
    }
}

struct DateHelper {
    format: String,
}

impl HelperDef for DateHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'reg, 'rc>, RenderError> {
        let value = h
            .param(0)
            .map(|v| v.value())
            .ok_or_else(|| RenderError::new("date helper requires a date parameter"))?;
        let datetime = parse_datetime(value)?;
        let format = format_param(h, 1, &self.format);
        let formatted = format_datetime(&datetime, format)?;
        Ok(ScopedJson::Derived(JsonValue::String(formatted)))
    }
}
