//! Loader configuration.
//!
//! One immutable `Config` is produced at bootstrap and shared by reference
//! with every component. Keys are camelCase so the page's options object can
//! be deserialized as-is.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::ConfigError;
use super::margin::RootMargin;
use super::node::MARKER_ATTRIBUTE;
use super::{AssetKey, NodeId};

/// Asset list used when the config names none.
pub const FALLBACK_ASSETS: &[&str] = &[
    "back-to-top-button",
    "group-container-v3",
    "standard-content-v3",
    "single-responsive-image-v3",
    "site-logo-container-v3",
];

/// Selects the module path template.
///
/// Unrecognized values are kept as `Unknown` rather than rejected: the
/// registry still builds, and nodes keyed to it fail at activation time.
/// Matching is exact: `"Assets"` is `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilePrefix {
    /// Packaged component library.
    NodeModules,
    /// Site-local assets directory.
    Assets,
    /// Local checkout of the component library.
    Dev,
    Unknown(String),
}

impl From<String> for FilePrefix {
    fn from(s: String) -> Self {
        match s.as_str() {
            "nodemodules" => FilePrefix::NodeModules,
            "assets" => FilePrefix::Assets,
            "dev" => FilePrefix::Dev,
            _ => FilePrefix::Unknown(s),
        }
    }
}

impl From<FilePrefix> for String {
    fn from(p: FilePrefix) -> Self {
        p.to_string()
    }
}

impl fmt::Display for FilePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilePrefix::NodeModules => f.write_str("nodemodules"),
            FilePrefix::Assets => f.write_str("assets"),
            FilePrefix::Dev => f.write_str("dev"),
            FilePrefix::Unknown(s) => f.write_str(s),
        }
    }
}

/// How block stylesheets are brought in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CssPolicy {
    /// One shared stylesheet for the whole page.
    Bundle,
    /// One stylesheet per asset key, unless already critical.
    Component,
    /// No stylesheet work.
    #[serde(alias = "false")]
    Skip,
}

/// Options for the viewport-intersection primitive, passed through verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WatcherConfig {
    pub root_margin: String,
    pub threshold: f64,
    /// Containing element; `None` means the viewport.
    pub root: Option<NodeId>,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            root_margin: "100% 0px 300px 0px".to_string(),
            threshold: 0.0,
            root: None,
        }
    }
}

impl WatcherConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }
        RootMargin::parse(&self.root_margin)?;
        Ok(())
    }
}

/// Path fragments fed to the module/stylesheet templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssetPaths {
    pub library_root: String,
    pub assets_root: String,
    pub dev_root: String,
    pub file_path: String,
    pub file_path_css: String,
    pub file_suffix_js: String,
    pub file_suffix_css: String,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            library_root: "NodeModules/@total_onion/onion-library".to_string(),
            assets_root: "Assets".to_string(),
            dev_root: "../onion-library".to_string(),
            file_path: "js/blocks".to_string(),
            file_path_css: "scss/blocks".to_string(),
            file_suffix_js: ".js".to_string(),
            file_suffix_css: ".scss".to_string(),
        }
    }
}

/// One entry of the asset list: either `"key"` or `{ "assetKey": "key" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssetEntry {
    Key(AssetKey),
    Object {
        #[serde(rename = "assetKey")]
        asset_key: AssetKey,
    },
}

impl AssetEntry {
    pub fn key(&self) -> &AssetKey {
        match self {
            AssetEntry::Key(key) => key,
            AssetEntry::Object { asset_key } => asset_key,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    #[serde(rename = "assetArray")]
    pub assets: Vec<AssetEntry>,
    pub file_prefix: FilePrefix,
    /// Master stylesheet switch; `false` skips CSS for every key.
    pub css: bool,
    pub css_loading_style: CssPolicy,
    /// `false` activates every node at bootstrap.
    pub lazy: bool,
    #[serde(flatten)]
    pub watcher: WatcherConfig,
    #[serde(flatten)]
    pub paths: AssetPaths,
    pub marker_attribute: String,
    /// Class added to a node once activated.
    pub activated_class: String,
    pub debug_log_messages: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assets: FALLBACK_ASSETS
                .iter()
                .map(|k| AssetEntry::Key(AssetKey::from(*k)))
                .collect(),
            file_prefix: FilePrefix::NodeModules,
            css: true,
            css_loading_style: CssPolicy::Bundle,
            lazy: true,
            watcher: WatcherConfig::default(),
            paths: AssetPaths::default(),
            marker_attribute: MARKER_ATTRIBUTE.to_string(),
            activated_class: "loaded".to_string(),
            debug_log_messages: false,
        }
    }
}

impl Config {
    /// Parse and validate a JSON options object. Missing fields take defaults.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.watcher.validate()
    }

    /// Configured keys in order.
    pub fn asset_keys(&self) -> Vec<AssetKey> {
        self.assets.iter().map(|e| e.key().clone()).collect()
    }

    pub fn with_assets<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<AssetKey>,
    {
        self.assets = keys.into_iter().map(|k| AssetEntry::Key(k.into())).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn empty_object_gets_defaults() {
        let config = Config::from_json_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.asset_keys().len(), FALLBACK_ASSETS.len());
        assert_eq!(config.watcher.root_margin, "100% 0px 300px 0px");
        assert!(config.css);
        assert_eq!(config.css_loading_style, CssPolicy::Bundle);
    }

    #[test]
    fn page_options_object_deserializes() {
        let json = r#"
        {
          "rootMargin": "0% 0% 0%",
          "threshold": 0.25,
          "assetArray": [{ "assetKey": "foo" }, "bar"],
          "css": true,
          "lazy": false,
          "cssLoadingStyle": "component",
          "filePrefix": "assets",
          "fileSuffixCss": ".css",
          "debugLogMessages": true
        }"#;
        let config = Config::from_json_str(json).unwrap();

        assert_eq!(config.asset_keys(), vec![AssetKey::from("foo"), AssetKey::from("bar")]);
        assert_eq!(config.file_prefix, FilePrefix::Assets);
        assert_eq!(config.css_loading_style, CssPolicy::Component);
        assert_eq!(config.watcher.threshold, 0.25);
        assert_eq!(config.paths.file_suffix_css, ".css");
        assert_eq!(config.paths.file_suffix_js, ".js");
        assert!(!config.lazy);
        assert!(config.debug_log_messages);
    }

    #[rstest]
    #[case("nodemodules", FilePrefix::NodeModules)]
    #[case("assets", FilePrefix::Assets)]
    #[case("Assets", FilePrefix::Unknown("Assets".to_string()))]
    #[case("DEV", FilePrefix::Unknown("DEV".to_string()))]
    #[case("dev", FilePrefix::Dev)]
    #[case("cdn", FilePrefix::Unknown("cdn".to_string()))]
    fn file_prefix_parses_known_and_unknown(#[case] raw: &str, #[case] want: FilePrefix) {
        let json = format!(r#"{{ "filePrefix": "{raw}" }}"#);
        let config = Config::from_json_str(&json).unwrap();
        assert_eq!(config.file_prefix, want);
    }

    #[test]
    fn skip_policy_accepts_false_alias() {
        let config = Config::from_json_str(r#"{ "cssLoadingStyle": "false" }"#).unwrap();
        assert_eq!(config.css_loading_style, CssPolicy::Skip);
    }

    #[rstest]
    #[case(r#"{ "threshold": 1.5 }"#)]
    #[case(r#"{ "threshold": -0.1 }"#)]
    #[case(r#"{ "rootMargin": "10em" }"#)]
    fn invalid_watcher_options_are_rejected(#[case] json: &str) {
        assert!(Config::from_json_str(json).is_err());
    }
}
