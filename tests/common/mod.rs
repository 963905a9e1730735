// ABOUTME: Common utilities and helpers for integration tests
// ABOUTME: Builds throwaway module trees (controllers + view scripts) in a temp directory

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use viewbridge::HostBindings;

/// An application tree laid out as `<root>/<module>/{controllers,views/scripts}`.
pub struct TestSite {
    pub temp_dir: TempDir,
    modules: Vec<String>,
}

impl TestSite {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
            modules: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn with_module(mut self, module: &str) -> Self {
        fs::create_dir_all(self.controller_dir(module)).expect("Failed to create controllers");
        fs::create_dir_all(self.view_dir(module)).expect("Failed to create view scripts");
        self.modules.push(module.to_string());
        self
    }

    pub fn controller_dir(&self, module: &str) -> PathBuf {
        self.path().join(module).join("controllers")
    }

    pub fn view_dir(&self, module: &str) -> PathBuf {
        self.path().join(module).join("views").join("scripts")
    }

    /// Write a view script under the module's view directory and return its full path.
    pub fn write_view(&self, module: &str, name: &str, content: &str) -> PathBuf {
        let path = self.view_dir(module).join(name);
        self.write_file(&path, content);
        path
    }

    /// Write a file anywhere below the site root.
    pub fn write_file(&self, path: &Path, content: &str) -> PathBuf {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(path, content).expect("Failed to write file");
        path.to_path_buf()
    }

    pub fn host(&self, default_module: &str) -> HostBindings {
        self.modules
            .iter()
            .fold(HostBindings::new(default_module), |host, module| {
                host.with_module(module.as_str(), self.controller_dir(module))
            })
    }
}
