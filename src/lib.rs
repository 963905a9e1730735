// ABOUTME: Main library module for the viewbridge view engine adapter
// ABOUTME: Exports the engine facade, environment, loader and configuration types

pub mod config;
pub mod engine;
pub mod environment;
pub mod error;
pub mod extensions;
pub mod loader;
pub mod logging;
pub mod registry;
pub mod resolver;

// Re-export commonly used types
pub use config::{Config, EngineConfig, ExtensionSpec, GlobalsSpec, DEFAULT_VIEW_SUFFIX};
pub use engine::{HostBindings, TemplateEngine, ViewEngine};
pub use environment::{CompiledTemplate, Environment, EnvironmentOptions, GlobalVariables, ViewContext};
pub use error::{ConfigurationError, Result, ViewError};
pub use extensions::Extension;
pub use loader::{FileLoader, SharedLoader, TemplateName};
pub use registry::ComponentRegistry;
pub use resolver::{resolve_view_directories, ModulePathMap, MAIN_NAMESPACE};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
