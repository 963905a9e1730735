// ABOUTME: Error types for view engine configuration, template lookup and rendering
// ABOUTME: Separates init-time configuration failures from render-time failures

use std::path::PathBuf;
use thiserror::Error;

/// Raised while building an environment from configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Extension class doesn't exist: {class}")]
    UnknownExtension { class: String },

    #[error("Class for globals doesn't exist: {class}")]
    UnknownGlobals { class: String },

    #[error("You must provide a name for globals (e.g. \"app\") when setting class '{class}'")]
    MissingGlobalsName { class: String },

    #[error("Invalid options for extension '{class}': {reason}")]
    InvalidExtensionOptions { class: String, reason: String },

    #[error("Invalid global name '{name}': {reason}")]
    InvalidGlobalName { name: String, reason: String },
}

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Unable to find template \"{name}\" (looked into: {})", format_searched(.searched))]
    TemplateNotFound { name: String, searched: Vec<PathBuf> },

    #[error("Invalid template name \"{name}\": {reason}")]
    InvalidTemplateName { name: String, reason: String },

    #[error("Template variables must be a map, got {kind}")]
    InvalidContext { kind: String },

    #[error("View engine is not initialized, call init() first")]
    NotInitialized,

    #[error("Template syntax error: {0}")]
    Syntax(#[from] handlebars::TemplateError),

    #[error("Template render error: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn format_searched(searched: &[PathBuf]) -> String {
    if searched.is_empty() {
        return "no search paths".to_string();
    }
    searched
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, ViewError>;
