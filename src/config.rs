// ABOUTME: Configuration for the view engine: engine options, extensions, globals and logging
// ABOUTME: Handles loading YAML configuration files and merging environment variable overrides

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::path::PathBuf;

use crate::environment::EnvironmentOptions;
use crate::error::ConfigurationError;

/// File suffix the host uses when mapping actions to view scripts.
pub const DEFAULT_VIEW_SUFFIX: &str = "twig";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Everything `init()` needs to build an environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub view_suffix: Option<String>,
    pub options: EnvironmentOptions,
    pub extensions: Vec<ExtensionSpec>,
    pub globals: Option<GlobalsSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionSpec {
    pub class: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<JsonValue>,
}

impl ExtensionSpec {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            options: None,
        }
    }

    pub fn with_options(mut self, options: JsonValue) -> Self {
        self.options = Some(options);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalsSpec {
    #[serde(default)]
    pub class: Option<String>,

    #[serde(default)]
    pub name: Option<String>,
}

impl GlobalsSpec {
    pub fn new(class: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            class: Some(class.into()),
            name: Some(name.into()),
        }
    }

    /// `(class, name)` when a globals class is configured; an empty class counts as unset.
    pub fn selection(&self) -> std::result::Result<Option<(&str, &str)>, ConfigurationError> {
        let class = match self.class.as_deref() {
            Some(class) if !class.is_empty() => class,
            _ => return Ok(None),
        };

        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => Ok(Some((class, name))),
            _ => Err(ConfigurationError::MissingGlobalsName {
                class: class.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file path or default locations
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::find_config_file(),
        };

        let mut config = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            Self::from_yaml_str(&contents)?
        } else {
            Config::default()
        };

        config.merge_env()?;
        Ok(config)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> PathBuf {
        let possible_paths = [
            "viewbridge.yaml",
            "viewbridge.yml",
            ".viewbridge.yaml",
            ".viewbridge.yml",
        ];

        possible_paths
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
            .unwrap_or_else(|| PathBuf::from("viewbridge.yaml"))
    }

    /// Merge environment variables into configuration
    fn merge_env(&mut self) -> Result<()> {
        if let Ok(suffix) = std::env::var("VIEWBRIDGE_VIEW_SUFFIX") {
            self.engine.view_suffix = Some(suffix);
        }
        if let Ok(strict) = std::env::var("VIEWBRIDGE_STRICT_VARIABLES") {
            self.engine.options.strict_variables = parse_flag("VIEWBRIDGE_STRICT_VARIABLES", &strict)?;
        }
        if let Ok(debug) = std::env::var("VIEWBRIDGE_DEBUG") {
            self.engine.options.debug = parse_flag("VIEWBRIDGE_DEBUG", &debug)?;
        }

        if let Ok(level) = std::env::var("VIEWBRIDGE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("VIEWBRIDGE_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    pub fn view_suffix(&self) -> &str {
        self.engine
            .view_suffix
            .as_deref()
            .unwrap_or(DEFAULT_VIEW_SUFFIX)
    }
}

fn parse_flag(var: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(anyhow::anyhow!(
            "Invalid boolean '{}' for {}. Expected true/false",
            other,
            var
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.view_suffix(), "twig");
        assert!(config.engine.extensions.is_empty());
        assert!(config.engine.globals.is_none());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
engine:
  view_suffix: hbs
  options:
    strict_variables: true
    cache: /var/cache/views
  extensions:
    - class: text
      options:
        truncate_length: 12
    - class: debug
  globals:
    class: global_variables
    name: site
logging:
  level: debug
  format: compact
"#;
        let config = Config::from_yaml_str(yaml).unwrap();

        assert_eq!(config.view_suffix(), "hbs");
        assert!(config.engine.options.strict_variables);
        assert_eq!(
            config.engine.options.extra.get("cache"),
            Some(&json!("/var/cache/views"))
        );
        assert_eq!(config.engine.extensions.len(), 2);
        assert_eq!(
            config.engine.extensions[0].options,
            Some(json!({"truncate_length": 12}))
        );
        assert_eq!(config.engine.extensions[1].options, None);
        assert_eq!(
            config.engine.globals,
            Some(GlobalsSpec::new("global_variables", "site"))
        );
        assert_eq!(config.logging.format, "compact");
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(Config::from_yaml_str("  \n").unwrap(), Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("viewbridge.yaml");
        fs::write(
            &config_path,
            "engine:\n  extensions:\n    - class: encoding\n",
        )
        .unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.engine.extensions, vec![ExtensionSpec::new("encoding")]);
    }

    #[test]
    fn test_load_missing_file_falls_back_to_defaults() {
        let temp_dir = tempdir().unwrap();
        let config = Config::load(Some(temp_dir.path().join("absent.yaml"))).unwrap();
        assert!(config.engine.extensions.is_empty());
    }

    #[test]
    fn test_globals_selection() {
        assert_eq!(GlobalsSpec::default().selection().unwrap(), None);

        let unnamed = GlobalsSpec {
            class: Some("global_variables".to_string()),
            name: None,
        };
        assert!(matches!(
            unnamed.selection(),
            Err(ConfigurationError::MissingGlobalsName { .. })
        ));

        let blank = GlobalsSpec::new("global_variables", "  ");
        assert!(blank.selection().is_err());

        let empty_class = GlobalsSpec {
            class: Some(String::new()),
            name: None,
        };
        assert_eq!(empty_class.selection().unwrap(), None);

        let valid = GlobalsSpec::new("global_variables", "site");
        assert_eq!(
            valid.selection().unwrap(),
            Some(("global_variables", "site"))
        );
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("X", "TRUE").unwrap());
        assert!(!parse_flag("X", "off").unwrap());
        assert!(parse_flag("X", "maybe").is_err());
    }
}
