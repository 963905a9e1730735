// ABOUTME: View engine facade called by the host framework to initialize and render views
// ABOUTME: Wires module view directories, the file loader and the environment together

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::{EngineConfig, DEFAULT_VIEW_SUFFIX};
use crate::environment::{Environment, ViewContext};
use crate::error::{Result, ViewError};
use crate::loader::FileLoader;
use crate::registry::ComponentRegistry;
use crate::resolver::{resolve_view_directories, ModulePathMap};

/// Contract between the host's rendering pipeline and a view engine.
pub trait ViewEngine {
    fn init(&mut self, config: &EngineConfig) -> Result<()>;

    /// Render the view script at `template` (a full path).
    fn render(&mut self, template: &Path, vars: &JsonValue) -> Result<String>;

    fn render_to(&mut self, template: &Path, vars: &JsonValue, writer: &mut dyn Write) -> Result<()>;

    /// Suffix the host appends when mapping actions to view scripts.
    fn view_suffix(&self) -> &str;
}

/// What the host framework hands the engine at wiring time.
#[derive(Debug, Clone)]
pub struct HostBindings {
    pub controller_directories: IndexMap<String, PathBuf>,
    pub default_module: String,
    pub view: ViewContext,
}

impl Default for HostBindings {
    fn default() -> Self {
        Self {
            controller_directories: IndexMap::new(),
            default_module: "default".to_string(),
            view: ViewContext::new(),
        }
    }
}

impl HostBindings {
    pub fn new(default_module: impl Into<String>) -> Self {
        Self {
            default_module: default_module.into(),
            ..Default::default()
        }
    }

    pub fn with_module(mut self, module: impl Into<String>, controller_dir: impl Into<PathBuf>) -> Self {
        self.controller_directories
            .insert(module.into(), controller_dir.into());
        self
    }

    pub fn with_view(mut self, view: ViewContext) -> Self {
        self.view = view;
        self
    }
}

pub struct TemplateEngine {
    host: HostBindings,
    registry: ComponentRegistry,
    environment: Option<Environment>,
    view_suffix: String,
}

impl TemplateEngine {
    pub fn new(host: HostBindings) -> Self {
        Self::with_registry(host, ComponentRegistry::with_builtins())
    }

    pub fn with_registry(host: HostBindings, registry: ComponentRegistry) -> Self {
        Self {
            host,
            registry,
            environment: None,
            view_suffix: DEFAULT_VIEW_SUFFIX.to_string(),
        }
    }

    /// Register application extensions and globals before `init`.
    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    pub fn host(&self) -> &HostBindings {
        &self.host
    }

    pub fn view_directories(&self) -> ModulePathMap {
        resolve_view_directories(&self.host.controller_directories, &self.host.default_module)
    }

    pub fn set_environment(&mut self, environment: Environment) -> &mut Self {
        self.environment = Some(environment);
        self
    }

    pub fn environment(&self) -> Option<&Environment> {
        self.environment.as_ref()
    }

    pub fn environment_mut(&mut self) -> Option<&mut Environment> {
        self.environment.as_mut()
    }

    pub fn set_view_suffix(&mut self, suffix: impl Into<String>) {
        self.view_suffix = suffix.into();
    }

    fn split_template_path(template: &Path) -> Result<(PathBuf, String)> {
        let file_name = template
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| ViewError::InvalidTemplateName {
                name: template.display().to_string(),
                reason: "no UTF-8 file name".to_string(),
            })?;

        let directory = match template.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        Ok((directory, file_name.to_string()))
    }

    /// Make the template's directory searchable and return the name to load.
    fn prepare(&mut self, template: &Path) -> Result<(&mut Environment, String)> {
        let environment = self.environment.as_mut().ok_or(ViewError::NotInitialized)?;
        let (directory, file_name) = Self::split_template_path(template)?;

        environment.loader().add_path(&directory, None);
        debug!("Rendering {} from {}", file_name, directory.display());
        Ok((environment, file_name))
    }
}

impl ViewEngine for TemplateEngine {
    fn init(&mut self, config: &EngineConfig) -> Result<()> {
        let view_dirs = self.view_directories();
        debug!("Resolved view directories for {} modules", view_dirs.len());

        let loader = FileLoader::from_modules(&view_dirs);
        let environment =
            Environment::build(self.host.view.clone(), loader, config, &self.registry)?;

        if let Some(suffix) = &config.view_suffix {
            self.view_suffix = suffix.clone();
        }
        self.environment = Some(environment);

        info!("View engine initialized (suffix: {})", self.view_suffix);
        Ok(())
    }

    fn render(&mut self, template: &Path, vars: &JsonValue) -> Result<String> {
        let (environment, file_name) = self.prepare(template)?;
        environment.load_template(&file_name)?.render(vars)
    }

    fn render_to(&mut self, template: &Path, vars: &JsonValue, writer: &mut dyn Write) -> Result<()> {
        let (environment, file_name) = self.prepare(template)?;
        environment.load_template(&file_name)?.display(vars, writer)
    }

    fn view_suffix(&self) -> &str {
        &self.view_suffix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtensionSpec;
    use crate::resolver::MAIN_NAMESPACE;
    use serde_json::json;

    fn host() -> HostBindings {
        HostBindings::new("default")
            .with_module("default", "/app/default/controllers")
            .with_module("admin", "/app/admin/controllers")
    }

    #[test]
    fn test_split_template_path() {
        let (dir, file) =
            TemplateEngine::split_template_path(Path::new("/app/views/scripts/index.twig")).unwrap();
        assert_eq!(dir, PathBuf::from("/app/views/scripts"));
        assert_eq!(file, "index.twig");

        let (dir, file) = TemplateEngine::split_template_path(Path::new("index.twig")).unwrap();
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(file, "index.twig");

        assert!(TemplateEngine::split_template_path(Path::new("/")).is_err());
    }

    #[test]
    fn test_render_before_init() {
        let mut engine = TemplateEngine::new(host());
        assert!(matches!(
            engine.render(Path::new("/app/x.twig"), &json!({})),
            Err(ViewError::NotInitialized)
        ));
    }

    #[test]
    fn test_init_seeds_module_roots() {
        let mut engine = TemplateEngine::new(host());
        engine.init(&EngineConfig::default()).unwrap();

        let environment = engine.environment().unwrap();
        let loader = environment.loader().read();
        assert_eq!(
            loader.paths(Some(MAIN_NAMESPACE)),
            &[PathBuf::from("/app/default/views/scripts")]
        );
        assert_eq!(
            loader.paths(Some("admin")),
            &[PathBuf::from("/app/admin/views/scripts")]
        );
        assert!(loader.paths(Some("default")).is_empty());
    }

    #[test]
    fn test_init_applies_view_suffix() {
        let mut engine = TemplateEngine::new(host());
        assert_eq!(engine.view_suffix(), "twig");

        let config = EngineConfig {
            view_suffix: Some("hbs".to_string()),
            ..Default::default()
        };
        engine.init(&config).unwrap();
        assert_eq!(engine.view_suffix(), "hbs");
    }

    #[test]
    fn test_failed_init_keeps_previous_environment() {
        let mut engine = TemplateEngine::new(host());
        engine
            .init(&EngineConfig {
                extensions: vec![ExtensionSpec::new("text")],
                ..Default::default()
            })
            .unwrap();

        let broken = EngineConfig {
            extensions: vec![ExtensionSpec::new("debug"), ExtensionSpec::new("Nope")],
            ..Default::default()
        };
        assert!(engine.init(&broken).is_err());

        let environment = engine.environment().unwrap();
        assert!(environment.has_extension("text"));
        assert!(!environment.has_extension("debug"));
    }

    #[test]
    fn test_set_environment() {
        let mut engine = TemplateEngine::new(host());
        let environment = Environment::new(
            ViewContext::new(),
            FileLoader::new(),
            Default::default(),
        );
        engine.set_environment(environment);
        assert!(engine.environment().is_some());
    }
}
