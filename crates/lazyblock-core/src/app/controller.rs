//! ActivationController - ノード単位の fetch → invoke → mark
//!
//! # フロー
//! 1. state lock の中でノードを claim（Unactivated → Pending）。それ以外なら即 return
//! 2. ノードの key で descriptor を引く
//! 3. module fetch と ensure_css を並行実行して join
//! 4. JS を opt-out していなければ module を invoke
//! 5. Activated にして activated class を付与。失敗なら Failed
//!
//! エラーは `activate` の外に出さない。ログに残して outcome として返す。

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::app::css_loader::{CssDecision, CssLoader};
use crate::app::registry::Registry;
use crate::app::status::ActivationCounts;
use crate::domain::{ActivationError, ActivationState, CandidateNode, Config, CssPolicy, NodeId};
use crate::ports::{BlockContext, Document};

/// Result of one `activate` call.
#[derive(Debug)]
pub enum ActivationOutcome {
    /// This call ran the activation. `invoked` is false for `data-jsload="false"`.
    Activated { invoked: bool, css: CssDecision },
    /// Another call already claimed the node; nothing was done.
    AlreadyClaimed(ActivationState),
    /// This call ran the activation and it failed.
    Failed(ActivationError),
}

pub struct ActivationController {
    config: Arc<Config>,
    registry: Arc<Registry>,
    css: Arc<CssLoader>,
    document: Arc<dyn Document>,
    states: Mutex<HashMap<NodeId, ActivationState>>,
}

impl ActivationController {
    pub fn new(
        config: Arc<Config>,
        registry: Arc<Registry>,
        css: Arc<CssLoader>,
        document: Arc<dyn Document>,
    ) -> Self {
        Self {
            config,
            registry,
            css,
            document,
            states: Mutex::new(HashMap::new()),
        }
    }

    pub async fn activate(&self, node: &CandidateNode) -> ActivationOutcome {
        if let Err(state) = self.claim(node.id) {
            tracing::trace!(node = %node.id, ?state, "already claimed");
            return ActivationOutcome::AlreadyClaimed(state);
        }

        match self.run(node).await {
            Ok((invoked, css)) => {
                self.settle(node.id, ActivationState::Activated);
                self.document.add_class(node.id, &self.config.activated_class);
                tracing::debug!(node = %node.id, key = %node.key, invoked, "block activated");
                ActivationOutcome::Activated { invoked, css }
            }
            Err(error) => {
                self.settle(node.id, ActivationState::Failed);
                tracing::warn!(
                    node = %error.node(),
                    key = %error.key(),
                    kind = ?error.kind(),
                    %error,
                    "block activation failed"
                );
                ActivationOutcome::Failed(error)
            }
        }
    }

    async fn run(&self, node: &CandidateNode) -> Result<(bool, CssDecision), ActivationError> {
        let descriptor =
            self.registry
                .get(&node.key)
                .ok_or_else(|| ActivationError::MissingDescriptor {
                    node: node.id,
                    key: node.key.clone(),
                })?;
        let loader = descriptor
            .module_loader()
            .ok_or_else(|| ActivationError::UnknownMode {
                node: node.id,
                key: node.key.clone(),
                mode: self.registry.mode().to_string(),
            })?;
        let policy = if descriptor.requires_css() {
            self.config.css_loading_style
        } else {
            CssPolicy::Skip
        };

        let (module, css) = tokio::join!(
            loader.load(),
            self.css.ensure_css(descriptor.key(), policy)
        );
        let module = module.map_err(|source| ActivationError::Fetch {
            node: node.id,
            key: node.key.clone(),
            source,
        })?;

        if !node.jsload {
            tracing::debug!(node = %node.id, key = %node.key, "skipping JS load for block");
            return Ok((false, css));
        }

        module
            .init(BlockContext {
                node: node.clone(),
                css: false,
            })
            .map_err(|source| ActivationError::Invocation {
                node: node.id,
                key: node.key.clone(),
                source,
            })?;
        Ok((true, css))
    }

    /// Unactivated -> Pending, atomically with the check.
    fn claim(&self, id: NodeId) -> Result<(), ActivationState> {
        let mut states = self.lock();
        let current = states
            .get(&id)
            .copied()
            .unwrap_or(ActivationState::Unactivated);
        if !current.is_claimable() {
            return Err(current);
        }
        states.insert(id, ActivationState::Pending);
        Ok(())
    }

    fn settle(&self, id: NodeId, state: ActivationState) {
        self.lock().insert(id, state);
    }

    pub fn state(&self, id: NodeId) -> ActivationState {
        self.lock()
            .get(&id)
            .copied()
            .unwrap_or(ActivationState::Unactivated)
    }

    pub fn counts(&self) -> ActivationCounts {
        let mut counts = ActivationCounts::default();
        for state in self.lock().values() {
            match state {
                ActivationState::Unactivated => {}
                ActivationState::Pending => counts.pending += 1,
                ActivationState::Activated => counts.activated += 1,
                ActivationState::Failed => counts.failed += 1,
            }
        }
        counts
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<NodeId, ActivationState>> {
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
