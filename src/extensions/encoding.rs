// ABOUTME: Encoding helpers for templates: base64 and JSON serialization of values
// ABOUTME: Useful for data attributes and inline scripts in rendered views

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use handlebars::{
    Context, Handlebars, Helper, HelperDef, RenderContext, RenderError, ScopedJson,
};
use serde_json::Value as JsonValue;

use super::{string_param, Extension};

pub struct EncodingExtension;

impl EncodingExtension {
    pub const NAME: &'static str = "encoding";
}

impl Extension for EncodingExtension {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn register(&self, handlebars: &mut Handlebars<'static>) {
        handlebars.register_helper("base64_encode", Box::new(Base64EncodeHelper));
        handlebars.register_helper("base64_decode", Box::new(Base64DecodeHelper));
        handlebars.register_helper("json_encode", Box::new(JsonEncodeHelper));
    }
}

struct Base64EncodeHelper;

impl HelperDef for Base64EncodeHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'reg, 'rc>, RenderError> {
        let input = string_param(h, 0, "base64_encode")?;
        Ok(ScopedJson::Derived(JsonValue::String(
            BASE64.encode(input.as_bytes()),
        )))
    }
}

struct Base64DecodeHelper;

impl HelperDef for Base64DecodeHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'reg, 'rc>, RenderError> {
        let input = string_param(h, 0, "base64_decode")?;

        let decoded_bytes = BASE64
            .decode(input)
            .map_err(|e| RenderError::new(format!("Base64 decode error: {}", e)))?;

        let decoded_str = String::from_utf8(decoded_bytes)
            .map_err(|e| RenderError::new(format!("UTF-8 decode error: {}", e)))?;

        Ok(ScopedJson::Derived(JsonValue::String(decoded_str)))
    }
}

struct JsonEncodeHelper;

impl HelperDef for JsonEncodeHelper {
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
            .ok_or_else(|| RenderError::new("json_encode helper requires a value"))?;
        let encoded = serde_json::to_string(value)
            .map_err(|e| RenderError::new(format!("JSON encode error: {}", e)))?;
        Ok(ScopedJson::Derived(JsonValue::String(encoded)))
    }
}
