//! Document port - ブロックノードの読み取りと class の副作用
//!
//! アクティベーションの正本はローダー自身の node-state map。
//! この port で書く class は観測用のマーカーにすぎない。

use crate::domain::{Element, MarkerSelector, NodeId};

pub trait Document: Send + Sync {
    /// Elements matching `selector`, in document order.
    fn query(&self, selector: &MarkerSelector) -> Vec<Element>;

    /// Add `class` to the node's class list (no-op if already present).
    fn add_class(&self, node: NodeId, class: &str);
}
