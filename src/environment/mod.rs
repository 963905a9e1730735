// ABOUTME: The configured template environment: Handlebars registry, loader, globals and extensions
// ABOUTME: Builds itself from engine configuration and loads/renders templates by name

pub mod globals;
pub mod options;

use handlebars::Handlebars;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::{ConfigurationError, Result, ViewError};
use crate::extensions::{Extension, IncludeExtension};
use crate::loader::{FileLoader, SharedLoader};
use crate::registry::ComponentRegistry;

pub use globals::{GlobalVariables, ViewContext};
pub use options::EnvironmentOptions;

/// Global bound to the host view context.
pub const VIEW_GLOBAL: &str = "zf";

/// Global bound to [`GlobalVariables`] when no globals class is configured.
pub const DEFAULT_GLOBALS_NAME: &str = "app";

pub struct Environment {
    handlebars: Handlebars<'static>,
    loader: SharedLoader,
    globals: Map<String, JsonValue>,
    extensions: Vec<String>,
    options: EnvironmentOptions,
    view: ViewContext,
}

impl Environment {
    /// Bare environment: options applied and `include` available, nothing else registered.
    pub fn new(view: ViewContext, loader: FileLoader, options: EnvironmentOptions) -> Self {
        let mut handlebars = Handlebars::new();
        options.apply(&mut handlebars);

        let mut environment = Self {
            handlebars,
            loader: SharedLoader::new(loader),
            globals: Map::new(),
            extensions: Vec::new(),
            options,
            view,
        };

        let include = IncludeExtension::new(environment.loader.clone());
        environment.add_extension(Box::new(include));
        environment
    }

    /// Environment with configured extensions, the `zf` view global and the globals object.
    ///
    /// Nothing is registered from `config.extensions` unless every class resolves.
    pub fn build(
        view: ViewContext,
        loader: FileLoader,
        config: &EngineConfig,
        registry: &ComponentRegistry,
    ) -> Result<Self> {
        let mut environment = Self::new(view, loader, config.options.clone());

        let extensions = config
            .extensions
            .iter()
            .map(|spec| registry.create_extension(spec))
            .collect::<std::result::Result<Vec<_>, ConfigurationError>>()?;
        for extension in extensions {
            environment.add_extension(extension);
        }

        environment.bind_view()?;

        let selection = match &config.globals {
            Some(spec) => spec.selection()?,
            None => None,
        };
        match selection {
            Some((class, name)) => {
                let globals = registry.create_globals(class)?;
                environment.add_global(name, globals)?;
                debug!("Globals '{}' bound as '{}'", class, name);
            }
            None => {
                environment.add_global(DEFAULT_GLOBALS_NAME, GlobalVariables::new())?;
            }
        }

        info!(
            "Template environment ready with extensions: {}",
            environment.extensions.join(", ")
        );
        Ok(environment)
    }

    pub fn add_extension(&mut self, extension: Box<dyn Extension>) {
        extension.register(&mut self.handlebars);
        debug!("Registered extension '{}'", extension.name());
        self.extensions.push(extension.name().to_string());
    }

    pub fn has_extension(&self, name: &str) -> bool {
        self.extensions.iter().any(|ext| ext == name)
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn add_global(&mut self, name: &str, value: impl Serialize) -> Result<()> {
        if name.trim().is_empty() {
            return Err(ConfigurationError::InvalidGlobalName {
                name: name.to_string(),
                reason: "global names cannot be empty".to_string(),
            }
            .into());
        }
        self.globals
            .insert(name.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    pub fn global(&self, name: &str) -> Option<&JsonValue> {
        self.globals.get(name)
    }

    pub fn global_mut(&mut self, name: &str) -> Option<&mut JsonValue> {
        self.globals.get_mut(name)
    }

    pub fn globals(&self) -> &Map<String, JsonValue> {
        &self.globals
    }

    pub fn loader(&self) -> &SharedLoader {
        &self.loader
    }

    pub fn options(&self) -> &EnvironmentOptions {
        &self.options
    }

    pub fn view(&self) -> &ViewContext {
        &self.view
    }

    /// Replace the view context and rebind `zf`.
    pub fn set_view(&mut self, view: ViewContext) -> Result<()> {
        self.view = view;
        self.bind_view()
    }

    /// Assign a view variable, visible to templates as `zf.<key>`.
    pub fn assign(&mut self, key: impl Into<String>, value: impl Serialize) -> Result<()> {
        self.view.assign(key, value)?;
        self.bind_view()
    }

    fn bind_view(&mut self) -> Result<()> {
        let view = serde_json::to_value(&self.view)?;
        self.add_global(VIEW_GLOBAL, view)
    }

    /// Resolve `name` through the loader and compile it under that name.
    pub fn load_template(&mut self, name: &str) -> Result<CompiledTemplate<'_>> {
        let path = self.loader.find_template(name)?;
        // In dev mode Handlebars re-reads the file on every render of this handle.
        self.handlebars.register_template_file(name, &path)?;
        debug!("Loaded template '{}' from {}", name, path.display());

        Ok(CompiledTemplate {
            environment: &*self,
            name: name.to_string(),
            path,
        })
    }

    /// Globals overlaid with `vars`; `vars` wins on key collisions.
    fn context(&self, vars: JsonValue) -> Result<JsonValue> {
        let mut context = self.globals.clone();
        match vars {
            JsonValue::Null => {}
            JsonValue::Object(map) => context.extend(map),
            other => {
                return Err(ViewError::InvalidContext {
                    kind: json_kind(&other).to_string(),
                })
            }
        }
        Ok(JsonValue::Object(context))
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

/// A template compiled into its environment, ready to render.
pub struct CompiledTemplate<'env> {
    environment: &'env Environment,
    name: String,
    path: PathBuf,
}

impl CompiledTemplate<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn render<T: Serialize + ?Sized>(&self, vars: &T) -> Result<String> {
        let context = self.environment.context(serde_json::to_value(vars)?)?;
        Ok(self.environment.handlebars.render(&self.name, &context)?)
    }

    /// Stream the rendered template into `writer`.
    pub fn display<T: Serialize + ?Sized, W: Write>(&self, vars: &T, writer: W) -> Result<()> {
        let context = self.environment.context(serde_json::to_value(vars)?)?;
        self.environment
            .handlebars
            .render_to_write(&self.name, &context, writer)?;
        Ok(())
    }
}
