//! Registry - asset key → loader descriptor
//!
//! Design:
//! - Built once at bootstrap from the configured key list.
//! - Read-only afterwards, shared by every activation without locks.
//! - No I/O at build time; each descriptor only holds a resolved path and the
//!   fetcher to call with it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::domain::paths::module_path;
use crate::domain::{AssetKey, Config, FetchError, FilePrefix, MarkerSelector};
use crate::ports::{BlockModule, ModuleFetcher};

/// Deferred fetch of one block module.
#[derive(Clone)]
pub struct ModuleLoader {
    path: String,
    fetcher: Arc<dyn ModuleFetcher>,
}

impl ModuleLoader {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Perform the fetch. Every call is a fresh request to the fetcher.
    pub async fn load(&self) -> Result<Arc<dyn BlockModule>, FetchError> {
        self.fetcher.fetch(&self.path).await
    }
}

impl fmt::Debug for ModuleLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleLoader")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct AssetDescriptor {
    key: AssetKey,
    module_loader: Option<ModuleLoader>,
    requires_css: bool,
}

impl AssetDescriptor {
    pub fn key(&self) -> &AssetKey {
        &self.key
    }

    /// `None` when the file prefix had no path template.
    pub fn module_loader(&self) -> Option<&ModuleLoader> {
        self.module_loader.as_ref()
    }

    pub fn requires_css(&self) -> bool {
        self.requires_css
    }
}

#[derive(Debug)]
pub struct Registry {
    mode: FilePrefix,
    descriptors: HashMap<AssetKey, AssetDescriptor>,
    order: Vec<AssetKey>,
}

impl Registry {
    /// Build one descriptor per key. Duplicate keys keep their first position.
    pub fn build(keys: &[AssetKey], config: &Config, fetcher: Arc<dyn ModuleFetcher>) -> Self {
        let mode = config.file_prefix.clone();
        let requires_css = config.css;
        let mut descriptors = HashMap::with_capacity(keys.len());
        let mut order = Vec::with_capacity(keys.len());

        for key in keys {
            if descriptors.contains_key(key) {
                tracing::debug!(%key, "duplicate asset key ignored");
                continue;
            }
            let module_loader = module_path(&mode, key, &config.paths).map(|path| ModuleLoader {
                path,
                fetcher: Arc::clone(&fetcher),
            });
            descriptors.insert(
                key.clone(),
                AssetDescriptor {
                    key: key.clone(),
                    module_loader,
                    requires_css,
                },
            );
            order.push(key.clone());
        }

        if let FilePrefix::Unknown(prefix) = &mode {
            tracing::warn!(%prefix, "unknown file prefix; blocks will not load");
        }

        Self {
            mode,
            descriptors,
            order,
        }
    }

    pub fn get(&self, key: &AssetKey) -> Option<&AssetDescriptor> {
        self.descriptors.get(key)
    }

    pub fn mode(&self) -> &FilePrefix {
        &self.mode
    }

    /// Registered keys in configuration order.
    pub fn keys(&self) -> &[AssetKey] {
        &self.order
    }

    /// Selector matching every node that carries a registered key.
    pub fn selector(&self, marker_attribute: &str) -> MarkerSelector {
        MarkerSelector::new(marker_attribute, self.order.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::{RecordingModule, StaticModuleFetcher};

    fn keys(ks: &[&str]) -> Vec<AssetKey> {
        ks.iter().map(|k| AssetKey::from(*k)).collect()
    }

    #[test]
    fn build_does_no_io() {
        let fetcher = Arc::new(StaticModuleFetcher::new());
        let registry = Registry::build(&keys(&["foo", "bar"]), &Config::default(), fetcher.clone());

        assert_eq!(registry.keys().len(), 2);
        assert!(fetcher.fetches().is_empty());
    }

    #[test]
    fn descriptors_follow_mode_and_css_switch() {
        let config = Config {
            file_prefix: FilePrefix::Assets,
            css: false,
            ..Config::default()
        };
        let registry = Registry::build(&keys(&["foo"]), &config, Arc::new(StaticModuleFetcher::new()));

        let d = registry.get(&AssetKey::new("foo")).unwrap();
        assert_eq!(d.key().as_str(), "foo");
        assert_eq!(d.module_loader().unwrap().path(), "Assets/js/blocks/foo");
        assert!(!d.requires_css());
    }

    #[test]
    fn unknown_mode_builds_descriptors_without_loaders() {
        let config = Config {
            file_prefix: FilePrefix::Unknown("cdn".into()),
            ..Config::default()
        };
        let registry = Registry::build(&keys(&["foo"]), &config, Arc::new(StaticModuleFetcher::new()));

        let d = registry.get(&AssetKey::new("foo")).unwrap();
        assert!(d.module_loader().is_none());
    }

    #[test]
    fn duplicate_keys_keep_first_position() {
        let registry = Registry::build(
            &keys(&["b", "a", "b"]),
            &Config::default(),
            Arc::new(StaticModuleFetcher::new()),
        );
        assert_eq!(registry.keys(), keys(&["b", "a"]).as_slice());
    }

    #[tokio::test]
    async fn loader_fetches_again_on_every_call() {
        let fetcher = Arc::new(
            StaticModuleFetcher::new().with_fallback(Arc::new(RecordingModule::new())),
        );
        let registry = Registry::build(&keys(&["foo"]), &Config::default(), fetcher.clone());
        let loader = registry
            .get(&AssetKey::new("foo"))
            .and_then(|d| d.module_loader())
            .unwrap();

        loader.load().await.ok().unwrap();
        loader.load().await.ok().unwrap();
        assert_eq!(fetcher.fetch_count(loader.path()), 2);
    }
}
