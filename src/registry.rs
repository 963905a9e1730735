// ABOUTME: Registry of extension and globals constructors keyed by configured class name
// ABOUTME: Resolves ExtensionSpec/GlobalsSpec entries from configuration into live objects

use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

use crate::config::ExtensionSpec;
use crate::environment::GlobalVariables;
use crate::error::ConfigurationError;
use crate::extensions::{DateExtension, DebugExtension, EncodingExtension, Extension, TextExtension};

pub type ExtensionFactory = Box<
    dyn Fn(Option<&JsonValue>) -> Result<Box<dyn Extension>, ConfigurationError> + Send + Sync,
>;

pub type GlobalsFactory = Box<dyn Fn() -> Result<JsonValue, ConfigurationError> + Send + Sync>;

/// Class name under which [`GlobalVariables`] is registered.
pub const GLOBAL_VARIABLES_CLASS: &str = "global_variables";

pub struct ComponentRegistry {
    extensions: HashMap<String, ExtensionFactory>,
    globals: HashMap<String, GlobalsFactory>,
}

impl ComponentRegistry {
    /// Registry with nothing registered.
    pub fn empty() -> Self {
        Self {
            extensions: HashMap::new(),
            globals: HashMap::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();

        registry.register_extension(TextExtension::NAME, |options| {
            Ok(Box::new(TextExtension::from_options(options)?))
        });
        registry.register_extension(DateExtension::NAME, |options| {
            Ok(Box::new(DateExtension::from_options(options)?))
        });
        registry.register_extension(EncodingExtension::NAME, |_| Ok(Box::new(EncodingExtension)));
        registry.register_extension(DebugExtension::NAME, |options| {
            Ok(Box::new(DebugExtension::from_options(options)?))
        });

        registry.register_globals::<GlobalVariables>(GLOBAL_VARIABLES_CLASS);

        registry
    }

    pub fn register_extension<F>(&mut self, class: impl Into<String>, factory: F)
    where
        F: Fn(Option<&JsonValue>) -> Result<Box<dyn Extension>, ConfigurationError>
            + Send
            + Sync
            + 'static,
    {
        self.extensions.insert(class.into(), Box::new(factory));
    }

    /// Register a globals type built from its `Default` value.
    pub fn register_globals<T>(&mut self, class: impl Into<String>)
    where
        T: Serialize + Default + 'static,
    {
        let class = class.into();
        let name = class.clone();
        self.register_globals_with(class, move || {
            serde_json::to_value(T::default()).map_err(|e| ConfigurationError::InvalidGlobalName {
                name: name.clone(),
                reason: e.to_string(),
            })
        });
    }

    pub fn register_globals_with<F>(&mut self, class: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<JsonValue, ConfigurationError> + Send + Sync + 'static,
    {
        self.globals.insert(class.into(), Box::new(factory));
    }

    pub fn has_extension(&self, class: &str) -> bool {
        self.extensions.contains_key(class)
    }

    pub fn has_globals(&self, class: &str) -> bool {
        self.globals.contains_key(class)
    }

    pub fn create_extension(&self, spec: &ExtensionSpec) -> Result<Box<dyn Extension>, ConfigurationError> {
        let factory = self
            .extensions
            .get(&spec.class)
            .ok_or_else(|| ConfigurationError::UnknownExtension {
                class: spec.class.clone(),
            })?;
        factory(spec.options.as_ref())
    }

    pub fn create_globals(&self, class: &str) -> Result<JsonValue, ConfigurationError> {
        let factory = self
            .globals
            .get(class)
            .ok_or_else(|| ConfigurationError::UnknownGlobals {
                class: class.to_string(),
            })?;
        factory()
    }

    pub fn list_extensions(&self) -> Vec<&str> {
        let mut classes: Vec<&str> = self.extensions.keys().map(|k| k.as_str()).collect();
        classes.sort_unstable();
        classes
    }

    pub fn list_globals(&self) -> Vec<&str> {
        let mut classes: Vec<&str> = self.globals.keys().map(|k| k.as_str()).collect();
        classes.sort_unstable();
        classes
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
