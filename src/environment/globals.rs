// ABOUTME: Values exposed to every template: the default globals bag and the host view context
// ABOUTME: Both serialize to plain JSON objects so templates read them like any variable

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::path::PathBuf;

use crate::error::Result;

/// Default globals object, bound as `app` when no globals class is configured.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlobalVariables {
    values: Map<String, JsonValue>,
}

impl GlobalVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Serialize) -> Result<()> {
        self.values.insert(key.into(), serde_json::to_value(value)?);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.values.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<JsonValue> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// State the host's view layer hands to templates, bound as `zf`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewContext {
    pub encoding: String,

    #[serde(default)]
    pub script_paths: Vec<PathBuf>,

    /// Variables assigned by controllers.
    #[serde(flatten)]
    vars: Map<String, JsonValue>,
}

impl Default for ViewContext {
    fn default() -> Self {
        Self {
            encoding: "UTF-8".to_string(),
            script_paths: Vec::new(),
            vars: Map::new(),
        }
    }
}

impl ViewContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    pub fn add_script_path(&mut self, path: impl Into<PathBuf>) {
        self.script_paths.push(path.into());
    }

    pub fn assign(&mut self, key: impl Into<String>, value: impl Serialize) -> Result<()> {
        self.vars.insert(key.into(), serde_json::to_value(value)?);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.vars.get(key)
    }

    pub fn vars(&self) -> &Map<String, JsonValue> {
        &self.vars
    }

    pub fn clear_vars(&mut self) {
        self.vars.clear();
    }
}
