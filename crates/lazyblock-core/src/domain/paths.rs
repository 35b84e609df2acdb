//! Path templates for block modules and stylesheets.
//!
//! Pure functions of `(mode, key, paths)`: the same inputs always give the
//! same path, and nothing here touches I/O.

use super::config::{AssetPaths, FilePrefix};
use super::AssetKey;

/// Module path for `key` under `mode`. `None` for an unknown prefix.
pub fn module_path(mode: &FilePrefix, key: &AssetKey, paths: &AssetPaths) -> Option<String> {
    match mode {
        FilePrefix::NodeModules => Some(format!(
            "{}/components/block-{key}/{key}{}",
            paths.library_root, paths.file_suffix_js
        )),
        FilePrefix::Assets => Some(format!(
            "{}/{}/{key}",
            paths.assets_root, paths.file_path
        )),
        FilePrefix::Dev => Some(format!(
            "{}/components/block-{key}/{key}{}",
            paths.dev_root, paths.file_suffix_js
        )),
        FilePrefix::Unknown(_) => None,
    }
}

/// Per-component stylesheet path for `key` under `mode`.
pub fn component_css_path(mode: &FilePrefix, key: &AssetKey, paths: &AssetPaths) -> Option<String> {
    match mode {
        FilePrefix::NodeModules => Some(format!(
            "{}/components/block-{key}{}",
            paths.library_root, paths.file_suffix_css
        )),
        FilePrefix::Assets => Some(format!(
            "{}/{}/{key}.css",
            paths.assets_root, paths.file_path_css
        )),
        FilePrefix::Dev => Some(format!(
            "{}/components/block-{key}{}",
            paths.dev_root, paths.file_suffix_css
        )),
        FilePrefix::Unknown(_) => None,
    }
}

/// The page-wide stylesheet used under the bundle policy.
pub fn bundle_css_path(paths: &AssetPaths) -> String {
    format!("{}/public/publicbundlecss.css", paths.library_root)
}
