// ABOUTME: Derives per-module view script directories from controller directories
// ABOUTME: Exposes the default module under the __main__ namespace so includes need no prefix

use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Namespace under which the default module's view scripts are exposed.
pub const MAIN_NAMESPACE: &str = "__main__";

/// Ordered module name -> view script directory.
pub type ModulePathMap = IndexMap<String, PathBuf>;

/// `<parent of controller dir>/views/scripts`
pub fn view_script_dir(controller_dir: &Path) -> PathBuf {
    let module_root = controller_dir.parent().unwrap_or(controller_dir);
    module_root.join("views").join("scripts")
}

/// Map every module to its view script directory, renaming the default module to
/// [`MAIN_NAMESPACE`].
pub fn resolve_view_directories(
    controller_dirs: &IndexMap<String, PathBuf>,
    default_module: &str,
) -> ModulePathMap {
    let mut view_dirs: ModulePathMap = controller_dirs
        .iter()
        .map(|(module, dir)| (module.clone(), view_script_dir(dir)))
        .collect();

    if let Some(main_dir) = view_dirs.shift_remove(default_module) {
        debug!(
            "Default module '{}' mapped to {} ({})",
            default_module,
            MAIN_NAMESPACE,
            main_dir.display()
        );
        view_dirs.insert(MAIN_NAMESPACE.to_string(), main_dir);
    }

    view_dirs
}
