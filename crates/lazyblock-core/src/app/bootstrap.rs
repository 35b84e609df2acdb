//! Bootstrap - ページを scan してアクティベーションを開始
//!
//! # フロー
//! 1. 設定された key から Registry を構築
//! 2. Document から登録済み key を持つノードを取得
//! 3. `data-eager="true"` のノードは即座にアクティベート
//! 4. lazy が無効、または intersection primitive が無い場合は残りも即座にアクティベート
//! 5. それ以外は残りを [`VisibilityWatcher`] に渡す
//!
//! # 学習ポイント
//! - `tokio::spawn` した JoinHandle は drop しても abort されない（detach）
//! - config 検証以降の失敗はすべてノード単位。`init` 自体は失敗しない

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;

use crate::app::controller::ActivationController;
use crate::app::css_loader::CssLoader;
use crate::app::registry::Registry;
use crate::app::watcher::VisibilityWatcher;
use crate::domain::{CandidateNode, Config};
use crate::ports::{CriticalCss, Document, ModuleFetcher, StylesheetFetcher, Viewport};

/// Why bootstrap skipped the watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    LazyDisabled,
    ObserverUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "reason")]
pub enum LoadingMode {
    /// Non-eager nodes wait for visibility.
    Observing,
    /// Every node was activated during `init`.
    Immediate(FallbackReason),
}

/// What `init` found and decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitReport {
    pub candidates: usize,
    pub eager: usize,
    pub observed: usize,
    pub mode: LoadingMode,
}

/// The loader with all of its collaborators wired. Built by [`LoaderBuilder`].
///
/// [`LoaderBuilder`]: crate::app::builder::LoaderBuilder
pub struct LazyLoader {
    pub(crate) config: Arc<Config>,
    pub(crate) document: Arc<dyn Document>,
    pub(crate) viewport: Option<Arc<dyn Viewport>>,
    pub(crate) modules: Arc<dyn ModuleFetcher>,
    pub(crate) stylesheets: Arc<dyn StylesheetFetcher>,
    pub(crate) critical_css: Arc<dyn CriticalCss>,
}

impl LazyLoader {
    pub async fn init(&self) -> LoaderSession {
        let config = &self.config;
        tracing::debug!("lazy loader initialized");

        let registry = Arc::new(Registry::build(
            &config.asset_keys(),
            config,
            Arc::clone(&self.modules),
        ));
        let css = Arc::new(CssLoader::new(
            Arc::clone(config),
            Arc::clone(&self.critical_css),
            Arc::clone(&self.stylesheets),
        ));
        let controller = Arc::new(ActivationController::new(
            Arc::clone(config),
            Arc::clone(&registry),
            css,
            Arc::clone(&self.document),
        ));

        let selector = registry.selector(&config.marker_attribute);
        tracing::debug!(
            registered = registry.keys().len(),
            selector = %selector.to_css(),
            "querying document for blocks"
        );
        let candidates: Vec<CandidateNode> = self
            .document
            .query(&selector)
            .iter()
            .filter_map(|el| CandidateNode::from_element(el, &config.marker_attribute))
            .collect();
        let (eager, lazy): (Vec<_>, Vec<_>) = candidates.iter().cloned().partition(|n| n.eager);
        tracing::debug!(
            candidates = candidates.len(),
            eager = eager.len(),
            "scanned document for blocks"
        );

        // plain handles: dropping `init` early detaches these instead of aborting them
        let mut immediate = Vec::new();
        let eager_count = eager.len();
        for node in eager {
            spawn_activation(&mut immediate, &controller, node);
        }

        let watcher = if config.lazy {
            self.viewport.as_deref().and_then(|viewport| {
                VisibilityWatcher::start(viewport, &config.watcher, Arc::clone(&controller))
            })
        } else {
            None
        };

        let (mode, observed) = match &watcher {
            Some(watcher) => {
                tracing::debug!("running normal process");
                (LoadingMode::Observing, watcher.watch(lazy))
            }
            None => {
                let reason = if config.lazy {
                    FallbackReason::ObserverUnavailable
                } else {
                    FallbackReason::LazyDisabled
                };
                tracing::debug!(?reason, "running eager loading");
                for node in lazy {
                    spawn_activation(&mut immediate, &controller, node);
                }
                (LoadingMode::Immediate(reason), 0)
            }
        };

        for handle in immediate {
            if let Err(error) = handle.await {
                tracing::error!(%error, "activation task failed");
            }
        }

        LoaderSession {
            report: InitReport {
                candidates: candidates.len(),
                eager: eager_count,
                observed,
                mode,
            },
            candidates,
            controller,
            watcher,
        }
    }
}

fn spawn_activation(
    handles: &mut Vec<JoinHandle<()>>,
    controller: &Arc<ActivationController>,
    node: CandidateNode,
) {
    let controller = Arc::clone(controller);
    handles.push(tokio::spawn(async move {
        controller.activate(&node).await;
    }));
}

/// A running page: the controller, and the watcher if one was started.
pub struct LoaderSession {
    report: InitReport,
    candidates: Vec<CandidateNode>,
    controller: Arc<ActivationController>,
    watcher: Option<VisibilityWatcher>,
}

impl LoaderSession {
    pub fn report(&self) -> &InitReport {
        &self.report
    }

    pub fn candidates(&self) -> &[CandidateNode] {
        &self.candidates
    }

    pub fn controller(&self) -> &Arc<ActivationController> {
        &self.controller
    }

    pub fn watcher(&self) -> Option<&VisibilityWatcher> {
        self.watcher.as_ref()
    }

    /// Stop watching and wait for activations already started.
    pub async fn shutdown(self) {
        if let Some(watcher) = self.watcher {
            watcher.shutdown_and_join().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::builder::LoaderBuilder;
    use crate::domain::node::{EAGER_ATTRIBUTE, JSLOAD_ATTRIBUTE, MARKER_ATTRIBUTE};
    use crate::domain::{ActivationState, Element, FilePrefix, NodeId};
    use crate::impls::{
        InMemoryDocument, ManualViewport, RecordingModule, RecordingStylesheetFetcher,
        StaticModuleFetcher,
    };
    use rstest::rstest;
    use std::time::Duration;

    const FOO_PATH: &str = "NodeModules/@total_onion/onion-library/components/block-foo/foo.js";

    struct Page {
        loader: LazyLoader,
        document: Arc<InMemoryDocument>,
        viewport: Arc<ManualViewport>,
        modules: Arc<StaticModuleFetcher>,
        stylesheets: Arc<RecordingStylesheetFetcher>,
        module: Arc<RecordingModule>,
    }

    fn block(id: u64, key: &str) -> Element {
        Element::new(NodeId::new(id)).with_attribute(MARKER_ATTRIBUTE, key)
    }

    fn page(config: Config, elements: Vec<Element>, viewport: ManualViewport) -> Page {
        let module = Arc::new(RecordingModule::new());
        let document = Arc::new(InMemoryDocument::new(elements));
        let viewport = Arc::new(viewport);
        let modules = Arc::new(StaticModuleFetcher::new().with_module(FOO_PATH, module.clone()));
        let stylesheets = Arc::new(RecordingStylesheetFetcher::new());
        let loader = LoaderBuilder::new(config)
            .document(document.clone())
            .viewport(viewport.clone())
            .modules(modules.clone())
            .stylesheets(stylesheets.clone())
            .build()
            .unwrap();
        Page {
            loader,
            document,
            viewport,
            modules,
            stylesheets,
            module,
        }
    }

    fn foo_config() -> Config {
        Config::default().with_assets(["foo"])
    }

    #[tokio::test]
    async fn visible_block_activates_once() {
        let p = page(foo_config(), vec![block(1, "foo")], ManualViewport::new());
        let node = NodeId::new(1);
        assert!(p.modules.fetches().is_empty());

        let session = p.loader.init().await;
        assert_eq!(
            session.report(),
            &InitReport {
                candidates: 1,
                eager: 0,
                observed: 1,
                mode: LoadingMode::Observing,
            }
        );
        assert!(p.modules.fetches().is_empty());
        assert!(p.viewport.is_observed(node));

        p.viewport.scroll_into_view(&[node]);
        let controller = Arc::clone(session.controller());
        session.shutdown().await;

        assert_eq!(p.modules.fetches(), vec![FOO_PATH]);
        assert_eq!(p.stylesheets.fetched().len(), 1);
        let calls = p.module.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].node.id, node);
        assert!(!calls[0].css);
        assert!(p.document.has_class(node, "loaded"));
        assert_eq!(controller.state(node), ActivationState::Activated);
    }

    #[tokio::test]
    async fn jsload_false_still_marks_block() {
        let el = block(1, "foo").with_attribute(JSLOAD_ATTRIBUTE, "false");
        let p = page(foo_config(), vec![el], ManualViewport::new());

        let session = p.loader.init().await;
        p.viewport.scroll_into_view(&[NodeId::new(1)]);
        session.shutdown().await;

        assert_eq!(p.modules.fetch_count(FOO_PATH), 1);
        assert_eq!(p.module.call_count(), 0);
        assert!(p.document.has_class(NodeId::new(1), "loaded"));
    }

    #[tokio::test]
    async fn unknown_mode_initializes_and_fails_per_node() {
        let config = Config {
            file_prefix: FilePrefix::Unknown("cdn".into()),
            ..foo_config()
        };
        let p = page(config, vec![block(1, "foo")], ManualViewport::new());

        let session = p.loader.init().await;
        p.viewport.scroll_into_view(&[NodeId::new(1)]);
        let controller = Arc::clone(session.controller());
        session.shutdown().await;

        assert_eq!(controller.state(NodeId::new(1)), ActivationState::Failed);
        assert!(!p.document.has_class(NodeId::new(1), "loaded"));
        assert!(p.modules.fetches().is_empty());
    }

    #[tokio::test]
    async fn eager_blocks_activate_during_init_and_are_not_observed() {
        let eager = block(1, "foo").with_attribute(EAGER_ATTRIBUTE, "true");
        let p = page(foo_config(), vec![eager, block(2, "foo")], ManualViewport::new());

        let session = p.loader.init().await;
        assert_eq!(session.report().eager, 1);
        assert_eq!(session.report().observed, 1);
        assert_eq!(
            session.controller().state(NodeId::new(1)),
            ActivationState::Activated
        );
        assert!(!p.viewport.is_observed(NodeId::new(1)));
        assert!(p.viewport.is_observed(NodeId::new(2)));

        // node 1 is not observed, so only node 2 reaches the watcher
        p.viewport.scroll_into_view(&[NodeId::new(1), NodeId::new(2)]);
        session.shutdown().await;
        assert_eq!(p.module.call_count(), 2);
    }

    #[rstest]
    #[case(true, ManualViewport::unavailable(), FallbackReason::ObserverUnavailable)]
    #[case(false, ManualViewport::new(), FallbackReason::LazyDisabled)]
    #[tokio::test]
    async fn fallback_activates_everything_during_init(
        #[case] lazy: bool,
        #[case] viewport: ManualViewport,
        #[case] reason: FallbackReason,
    ) {
        let config = Config {
            lazy,
            ..foo_config()
        };
        let elements = vec![block(1, "foo"), block(2, "foo"), block(3, "foo")];
        let p = page(config, elements, viewport);

        let session = p.loader.init().await;
        assert_eq!(session.report().mode, LoadingMode::Immediate(reason));
        assert!(session.watcher().is_none());
        assert_eq!(p.viewport.observer_count(), 0);
        for id in 1..=3 {
            assert!(p.document.has_class(NodeId::new(id), "loaded"));
        }
        assert_eq!(session.controller().counts().activated, 3);
        assert_eq!(p.module.call_count(), 3);
    }

    #[tokio::test]
    async fn no_viewport_given_means_fallback() {
        let document = Arc::new(InMemoryDocument::new(vec![block(1, "foo")]));
        let module = Arc::new(RecordingModule::new());
        let loader = LoaderBuilder::new(foo_config())
            .document(document.clone())
            .modules(Arc::new(StaticModuleFetcher::new().with_fallback(module.clone())))
            .stylesheets(Arc::new(RecordingStylesheetFetcher::new()))
            .build()
            .unwrap();

        let session = loader.init().await;
        assert_eq!(
            session.report().mode,
            LoadingMode::Immediate(FallbackReason::ObserverUnavailable)
        );
        assert!(document.has_class(NodeId::new(1), "loaded"));
        assert_eq!(module.call_count(), 1);
    }

    #[tokio::test]
    async fn unregistered_markers_are_not_candidates() {
        let p = page(
            foo_config(),
            vec![block(1, "foo"), block(2, "bar"), Element::new(NodeId::new(3))],
            ManualViewport::new(),
        );

        let session = p.loader.init().await;
        let ids: Vec<_> = session.candidates().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![NodeId::new(1)]);
        assert!(!p.viewport.is_observed(NodeId::new(2)));
        session.shutdown().await;
    }

    #[tokio::test]
    async fn eager_activations_finish_when_init_is_dropped() {
        let module = Arc::new(RecordingModule::new());
        let document = Arc::new(InMemoryDocument::new(vec![
            block(1, "foo").with_attribute(EAGER_ATTRIBUTE, "true"),
        ]));
        let loader = LoaderBuilder::new(foo_config())
            .document(document.clone())
            .viewport(Arc::new(ManualViewport::new()))
            .modules(Arc::new(
                StaticModuleFetcher::new()
                    .with_module(FOO_PATH, module.clone())
                    .with_latency(Duration::from_millis(30)),
            ))
            .stylesheets(Arc::new(RecordingStylesheetFetcher::new()))
            .build()
            .unwrap();

        let res = tokio::time::timeout(Duration::from_millis(5), loader.init()).await;
        assert!(res.is_err());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(module.call_count(), 1);
        assert!(document.has_class(NodeId::new(1), "loaded"));
    }
}
