//! LoaderBuilder - ローダーの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - Option な collaborator（viewport が無い = intersection primitive が無い）

use std::sync::Arc;

use crate::app::bootstrap::LazyLoader;
use crate::domain::{Config, ConfigError};
use crate::ports::{
    CriticalCss, CriticalCssSet, Document, ModuleFetcher, StylesheetFetcher, Viewport,
};

/// LoaderBuilder はローダーを構築
///
/// # 使用例
/// ```ignore
/// let loader = LoaderBuilder::new(config)
///     .document(document)
///     .viewport(viewport)
///     .modules(modules)
///     .stylesheets(stylesheets)
///     .build()?;
/// let session = loader.init().await;
/// ```
///
/// # Fail-fast 設計
/// - build() 時に config を検証
/// - document / modules / stylesheets が無ければ BuildError を返す
/// - viewport と critical_css は省略可能
pub struct LoaderBuilder {
    config: Config,
    document: Option<Arc<dyn Document>>,
    viewport: Option<Arc<dyn Viewport>>,
    modules: Option<Arc<dyn ModuleFetcher>>,
    stylesheets: Option<Arc<dyn StylesheetFetcher>>,
    critical_css: Option<Arc<dyn CriticalCss>>,
}

/// BuildError はローダー構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("missing collaborators: {0:?}. These must be provided before build().")]
    MissingCollaborators(Vec<&'static str>),

    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
}

impl LoaderBuilder {
    /// 新しい LoaderBuilder を作成
    pub fn new(config: Config) -> Self {
        Self {
            config,
            document: None,
            viewport: None,
            modules: None,
            stylesheets: None,
            critical_css: None,
        }
    }

    pub fn document(mut self, document: Arc<dyn Document>) -> Self {
        self.document = Some(document);
        self
    }

    pub fn viewport(mut self, viewport: Arc<dyn Viewport>) -> Self {
        self.viewport = Some(viewport);
        self
    }

    pub fn modules(mut self, modules: Arc<dyn ModuleFetcher>) -> Self {
        self.modules = Some(modules);
        self
    }

    pub fn stylesheets(mut self, stylesheets: Arc<dyn StylesheetFetcher>) -> Self {
        self.stylesheets = Some(stylesheets);
        self
    }

    pub fn critical_css(mut self, critical_css: Arc<dyn CriticalCss>) -> Self {
        self.critical_css = Some(critical_css);
        self
    }

    pub fn build(self) -> Result<LazyLoader, BuildError> {
        self.config.validate()?;

        let mut missing = Vec::new();
        if self.document.is_none() {
            missing.push("document");
        }
        if self.modules.is_none() {
            missing.push("modules");
        }
        if self.stylesheets.is_none() {
            missing.push("stylesheets");
        }

        match (self.document, self.modules, self.stylesheets) {
            (Some(document), Some(modules), Some(stylesheets)) => Ok(LazyLoader {
                config: Arc::new(self.config),
                document,
                viewport: self.viewport,
                modules,
                stylesheets,
                critical_css: self
                    .critical_css
                    .unwrap_or_else(|| Arc::new(CriticalCssSet::absent())),
            }),
            _ => Err(BuildError::MissingCollaborators(missing)),
        }
    }
}
