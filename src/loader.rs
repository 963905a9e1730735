// ABOUTME: Filesystem template loader with ordered, namespaced search roots
// ABOUTME: Resolves names like "admin::users/list.twig" against the roots registered per module

use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::error::{Result, ViewError};
use crate::resolver::{ModulePathMap, MAIN_NAMESPACE};

/// Separates a namespace from the template path in a template name.
pub const NAMESPACE_SEPARATOR: &str = "::";

#[derive(Debug, Clone, Default)]
pub struct FileLoader {
    paths: IndexMap<String, Vec<PathBuf>>,
}

/// A template name split into its namespace and normalized relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateName {
    pub namespace: String,
    pub path: String,
}

impl TemplateName {
    pub fn parse(name: &str) -> Result<Self> {
        let (namespace, path) = match name.split_once(NAMESPACE_SEPARATOR) {
            Some((namespace, path)) => {
                if namespace.is_empty() {
                    return Err(invalid_name(name, "empty namespace"));
                }
                (namespace, path)
            }
            None => (MAIN_NAMESPACE, name),
        };

        Ok(Self {
            namespace: namespace.to_string(),
            path: normalize(name, path)?,
        })
    }
}

fn invalid_name(name: &str, reason: &str) -> ViewError {
    ViewError::InvalidTemplateName {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

/// Collapses separators and rejects paths that escape their root.
fn normalize(name: &str, path: &str) -> Result<String> {
    if path.contains('\0') {
        return Err(invalid_name(name, "contains a NUL byte"));
    }

    let unified = path.replace('\\', "/");
    let mut level: i32 = 0;
    let mut parts = Vec::new();
    for part in unified.split('/') {
        match part {
            "" | "." => continue,
            ".." => {
                level -= 1;
                if level < 0 {
                    return Err(invalid_name(name, "looks outside its search path"));
                }
                parts.push(part);
            }
            _ => {
                level += 1;
                parts.push(part);
            }
        }
    }

    if parts.is_empty() {
        return Err(invalid_name(name, "empty template path"));
    }
    Ok(parts.join("/"))
}

impl FileLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader seeded with one root per module, in map order.
    pub fn from_modules(modules: &ModulePathMap) -> Self {
        let mut loader = Self::new();
        for (module, path) in modules {
            loader.add_path(path, Some(module.as_str()));
        }
        loader
    }

    /// Append a search root. `None` targets the default namespace.
    pub fn add_path(&mut self, path: impl AsRef<Path>, namespace: Option<&str>) {
        self.insert_path(path.as_ref(), namespace, false);
    }

    /// Insert a search root ahead of the existing roots of the namespace.
    pub fn prepend_path(&mut self, path: impl AsRef<Path>, namespace: Option<&str>) {
        self.insert_path(path.as_ref(), namespace, true);
    }

    fn insert_path(&mut self, path: &Path, namespace: Option<&str>, front: bool) {
        let namespace = namespace.unwrap_or(MAIN_NAMESPACE);
        let roots = self.paths.entry(namespace.to_string()).or_default();
        if roots.iter().any(|root| root == path) {
            return;
        }

        if !path.is_dir() {
            debug!(
                "Template path {} for namespace '{}' is not a directory",
                path.display(),
                namespace
            );
        }

        if front {
            roots.insert(0, path.to_path_buf());
        } else {
            roots.push(path.to_path_buf());
        }
        debug!("Added template path {} to '{}'", path.display(), namespace);
    }

    pub fn paths(&self, namespace: Option<&str>) -> &[PathBuf] {
        self.paths
            .get(namespace.unwrap_or(MAIN_NAMESPACE))
            .map(|roots| roots.as_slice())
            .unwrap_or(&[])
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.paths.keys().map(|k| k.as_str())
    }

    /// Path of the first root that holds the template.
    pub fn find_template(&self, name: &str) -> Result<PathBuf> {
        let parsed = TemplateName::parse(name)?;
        let roots = self.paths(Some(parsed.namespace.as_str()));

        let mut searched = Vec::with_capacity(roots.len());
        for root in roots {
            let candidate = root.join(&parsed.path);
            if candidate.is_file() {
                return Ok(candidate);
            }
            searched.push(root.clone());
        }

        Err(ViewError::TemplateNotFound {
            name: name.to_string(),
            searched,
        })
    }

    pub fn get_source(&self, name: &str) -> Result<String> {
        let path = self.find_template(name)?;
        Ok(std::fs::read_to_string(path)?)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.find_template(name).is_ok()
    }
}

/// Loader handle shared between the environment and the `include` helper.
#[derive(Debug, Clone, Default)]
pub struct SharedLoader {
    inner: Arc<RwLock<FileLoader>>,
}

impl SharedLoader {
    pub fn new(loader: FileLoader) -> Self {
        Self {
            inner: Arc::new(RwLock::new(loader)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, FileLoader> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, FileLoader> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_path(&self, path: impl AsRef<Path>, namespace: Option<&str>) {
        self.write().add_path(path, namespace);
    }

    pub fn find_template(&self, name: &str) -> Result<PathBuf> {
        self.read().find_template(name)
    }

    pub fn get_source(&self, name: &str) -> Result<String> {
        self.read().get_source(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_plain_name() {
        let parsed = TemplateName::parse("index/index.twig").unwrap();
        assert_eq!(parsed.namespace, MAIN_NAMESPACE);
        assert_eq!(parsed.path, "index/index.twig");
    }

    #[test]
    fn test_parse_namespaced_name() {
        let parsed = TemplateName::parse("admin::users//list.twig").unwrap();
        assert_eq!(parsed.namespace, "admin");
        assert_eq!(parsed.path, "users/list.twig");
    }

    #[test]
    fn test_parse_normalizes_separators() {
        let parsed = TemplateName::parse("/partials\\nav.twig").unwrap();
        assert_eq!(parsed.path, "partials/nav.twig");

        let parsed = TemplateName::parse("a/../b.twig").unwrap();
        assert_eq!(parsed.path, "a/../b.twig");
    }

    #[test]
    fn test_parse_rejects_escaping_names() {
        assert!(matches!(
            TemplateName::parse("../secret.twig"),
            Err(ViewError::InvalidTemplateName { .. })
        ));
        assert!(TemplateName::parse("admin::a/../../b").is_err());
        assert!(TemplateName::parse("::index.twig").is_err());
        assert!(TemplateName::parse("").is_err());
    }

    #[test]
    fn test_earlier_roots_shadow_later_ones() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        fs::write(first.path().join("x.tpl"), "first").unwrap();
        fs::write(second.path().join("x.tpl"), "second").unwrap();

        let mut loader = FileLoader::new();
        loader.add_path(first.path(), None);
        loader.add_path(second.path(), None);

        assert_eq!(loader.get_source("x.tpl").unwrap(), "first");
    }

    #[test]
    fn test_prepend_path_wins() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        fs::write(first.path().join("x.tpl"), "first").unwrap();
        fs::write(second.path().join("x.tpl"), "second").unwrap();

        let mut loader = FileLoader::new();
        loader.add_path(first.path(), None);
        loader.prepend_path(second.path(), None);

        assert_eq!(loader.get_source("x.tpl").unwrap(), "second");
    }

    #[test]
    fn test_add_path_is_cumulative() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        fs::write(first.path().join("a.tpl"), "a").unwrap();
        fs::write(second.path().join("b.tpl"), "b").unwrap();

        let mut loader = FileLoader::new();
        loader.add_path(first.path(), None);
        loader.add_path(second.path(), None);
        loader.add_path(first.path(), None);

        assert_eq!(loader.paths(None).len(), 2);
        assert_eq!(loader.get_source("a.tpl").unwrap(), "a");
        assert_eq!(loader.get_source("b.tpl").unwrap(), "b");
    }

    #[test]
    fn test_namespaces_are_isolated() {
        let admin = tempdir().unwrap();
        fs::write(admin.path().join("list.twig"), "admin list").unwrap();

        let mut loader = FileLoader::new();
        loader.add_path(admin.path(), Some("admin"));

        assert_eq!(loader.get_source("admin::list.twig").unwrap(), "admin list");
        assert!(!loader.exists("list.twig"));
        assert!(!loader.exists("blog::list.twig"));
        assert_eq!(loader.namespaces().collect::<Vec<_>>(), vec!["admin"]);
    }

    #[test]
    fn test_not_found_reports_searched_roots() {
        let root = tempdir().unwrap();
        let mut loader = FileLoader::new();
        loader.add_path(root.path(), None);

        match loader.find_template("missing.twig") {
            Err(ViewError::TemplateNotFound { name, searched }) => {
                assert_eq!(name, "missing.twig");
                assert_eq!(searched, vec![root.path().to_path_buf()]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_missing_directory_is_accepted() {
        let mut loader = FileLoader::new();
        loader.add_path("/definitely/not/here", Some("ghost"));
        assert_eq!(loader.paths(Some("ghost")).len(), 1);
        assert!(!loader.exists("ghost::index.twig"));
    }

    #[test]
    fn test_shared_loader_sees_later_paths() {
        let root = tempdir().unwrap();
        fs::write(root.path().join("late.twig"), "late").unwrap();

        let shared = SharedLoader::default();
        let handle = shared.clone();
        shared.add_path(root.path(), None);

        assert_eq!(handle.get_source("late.twig").unwrap(), "late");
    }
}
