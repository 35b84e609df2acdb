//! CssLoader - ブロックに stylesheet が必要か判定して fetch
//!
//! # 学習ポイント
//! - `tokio::sync::OnceCell` による memoize（bundle はページで一度、component は key ごとに一度）
//! - `ensure_css` は失敗しない。読み込めなかった stylesheet はログに残し、ブロックはそのまま進む

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::OnceCell;

use crate::domain::paths::{bundle_css_path, component_css_path};
use crate::domain::{AssetKey, Config, CssPolicy};
use crate::ports::{CriticalCss, StylesheetFetcher};

/// What `ensure_css` did for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "decision")]
pub enum CssDecision {
    /// Policy says no stylesheet work.
    Skipped,
    /// The key's CSS is already in the critical set.
    Critical,
    /// Shared bundle settled; `loaded` is false if its fetch failed.
    Bundle { loaded: bool },
    /// Per-key stylesheet settled.
    Component { loaded: bool },
    /// No stylesheet path exists for the configured file prefix.
    NoPath,
}

pub struct CssLoader {
    config: Arc<Config>,
    critical: Arc<dyn CriticalCss>,
    fetcher: Arc<dyn StylesheetFetcher>,
    bundle: OnceCell<bool>,
    components: Mutex<HashMap<AssetKey, Arc<OnceCell<bool>>>>,
}

impl CssLoader {
    pub fn new(
        config: Arc<Config>,
        critical: Arc<dyn CriticalCss>,
        fetcher: Arc<dyn StylesheetFetcher>,
    ) -> Self {
        Self {
            config,
            critical,
            fetcher,
            bundle: OnceCell::new(),
            components: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve once it is safe to run `key`'s module under `policy`.
    pub async fn ensure_css(&self, key: &AssetKey, policy: CssPolicy) -> CssDecision {
        if self.critical.contains(key) {
            tracing::debug!(%key, "css already critical");
            return CssDecision::Critical;
        }

        match policy {
            CssPolicy::Skip => CssDecision::Skipped,
            CssPolicy::Bundle => {
                let loaded = *self
                    .bundle
                    .get_or_init(|| self.fetch(bundle_css_path(&self.config.paths)))
                    .await;
                CssDecision::Bundle { loaded }
            }
            CssPolicy::Component => {
                let Some(href) =
                    component_css_path(&self.config.file_prefix, key, &self.config.paths)
                else {
                    tracing::warn!(%key, prefix = %self.config.file_prefix, "no stylesheet path for file prefix");
                    return CssDecision::NoPath;
                };
                let cell = self.component_cell(key);
                let loaded = *cell.get_or_init(|| self.fetch(href)).await;
                CssDecision::Component { loaded }
            }
        }
    }

    fn component_cell(&self, key: &AssetKey) -> Arc<OnceCell<bool>> {
        let mut cells = self
            .components
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(cells.entry(key.clone()).or_default())
    }

    async fn fetch(&self, href: String) -> bool {
        tracing::debug!(%href, "loading stylesheet");
        match self.fetcher.fetch(&href).await {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(%href, %error, "stylesheet failed; continuing without it");
                false
            }
        }
    }
}
