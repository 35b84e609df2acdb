//! StaticModuleFetcher - 事前に決まった module テーブル
//!
//! # 学習ポイント
//! - fetch はすべて記録され、path ごとのリクエスト回数を確認できる
//! - latency を指定すると fetch が実際に suspend する

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::domain::{FetchError, InvocationError};
use crate::ports::{BlockContext, BlockModule, ModuleFetcher};

#[derive(Default)]
pub struct StaticModuleFetcher {
    modules: HashMap<String, Arc<dyn BlockModule>>,
    fallback: Option<Arc<dyn BlockModule>>,
    latency: Option<Duration>,
    fetches: Mutex<Vec<String>>,
}

impl StaticModuleFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(mut self, path: impl Into<String>, module: Arc<dyn BlockModule>) -> Self {
        self.modules.insert(path.into(), module);
        self
    }

    /// Resolve every path not in the table to `module`.
    pub fn with_fallback(mut self, module: Arc<dyn BlockModule>) -> Self {
        self.fallback = Some(module);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Paths fetched so far, in request order.
    pub fn fetches(&self) -> Vec<String> {
        self.fetches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn fetch_count(&self, path: &str) -> usize {
        self.fetches().iter().filter(|p| *p == path).count()
    }
}

#[async_trait]
impl ModuleFetcher for StaticModuleFetcher {
    async fn fetch(&self, path: &str) -> Result<Arc<dyn BlockModule>, FetchError> {
        self.fetches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        self.modules
            .get(path)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| FetchError::new(path, "module not found"))
    }
}

/// A block module that records every invocation.
#[derive(Default)]
pub struct RecordingModule {
    calls: Mutex<Vec<BlockContext>>,
    failure: Option<String>,
}

impl RecordingModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// A module whose initializer fails with `message` (after recording the call).
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: Some(message.into()),
        }
    }

    pub fn calls(&self) -> Vec<BlockContext> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }
}

impl BlockModule for RecordingModule {
    fn init(&self, ctx: BlockContext) -> Result<(), InvocationError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ctx);
        match &self.failure {
            Some(message) => Err(InvocationError::new(message.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CandidateNode, NodeId};

    #[tokio::test]
    async fn fetch_resolves_known_paths_and_records_requests() {
        let module = Arc::new(RecordingModule::new());
        let fetcher = StaticModuleFetcher::new().with_module("blocks/foo.js", module.clone());

        let found = fetcher.fetch("blocks/foo.js").await.unwrap();
        found
            .init(BlockContext {
                node: CandidateNode::new(NodeId::new(1), "foo"),
                css: false,
            })
            .unwrap();
        assert_eq!(module.call_count(), 1);

        let err = fetcher.fetch("blocks/bar.js").await.err().unwrap();
        assert_eq!(err.path, "blocks/bar.js");
        assert_eq!(fetcher.fetches(), vec!["blocks/foo.js", "blocks/bar.js"]);
    }

    #[tokio::test]
    async fn fallback_module_answers_any_path() {
        let fetcher = StaticModuleFetcher::new().with_fallback(Arc::new(RecordingModule::new()));
        assert!(fetcher.fetch("anything").await.is_ok());
        assert_eq!(fetcher.fetch_count("anything"), 1);
    }

    #[test]
    fn failing_module_reports_invocation_error() {
        let module = RecordingModule::failing("boom");
        let err = module
            .init(BlockContext {
                node: CandidateNode::new(NodeId::new(1), "foo"),
                css: false,
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert_eq!(module.call_count(), 1);
    }
}
