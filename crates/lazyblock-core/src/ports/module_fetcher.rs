//! ModuleFetcher port - 動的 module 読み込みの抽象化
//!
//! path の解決は bundler/ホスト側の責務。ローダーは決定的な path を渡し、
//! block module を受け取るだけ。

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{CandidateNode, FetchError, InvocationError};

/// Argument passed to a block's initializer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockContext {
    pub node: CandidateNode,
    /// Whether the module should load its own stylesheet. The loader always
    /// passes `false` because CSS was already handled before invocation.
    pub css: bool,
}

/// A fetched block module: its default-exported initializer.
pub trait BlockModule: Send + Sync {
    fn init(&self, ctx: BlockContext) -> Result<(), InvocationError>;
}

/// ModuleFetcher resolves a module path to a block module.
///
/// # Thread Safety
/// - `Send + Sync`: activations for different nodes fetch concurrently.
#[async_trait]
pub trait ModuleFetcher: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<Arc<dyn BlockModule>, FetchError>;
}
