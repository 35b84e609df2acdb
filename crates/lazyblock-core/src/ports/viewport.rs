//! Viewport port - viewport-intersection primitive の抽象化
//!
//! report は channel 上のバッチとして届く。primitive のコールバックが
//! entry のリストを伴ってイベントループ上で発火するのと同じ形。

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::domain::{NodeId, WatcherConfig};

/// One entry of an intersection report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntersectionEntry {
    pub target: NodeId,
    pub is_intersecting: bool,
    pub intersection_ratio: f64,
}

impl IntersectionEntry {
    pub fn visible(target: NodeId, intersection_ratio: f64) -> Self {
        Self {
            target,
            is_intersecting: true,
            intersection_ratio,
        }
    }

    pub fn hidden(target: NodeId) -> Self {
        Self {
            target,
            is_intersecting: false,
            intersection_ratio: 0.0,
        }
    }

    /// Does this entry count as "visible" for the given threshold?
    pub fn satisfies(&self, threshold: f64) -> bool {
        self.is_intersecting && self.intersection_ratio >= threshold
    }
}

pub type IntersectionReports = mpsc::UnboundedSender<Vec<IntersectionEntry>>;

/// A live observer created by a [`Viewport`].
pub trait IntersectionObserver: Send + Sync {
    fn observe(&self, node: NodeId);
    fn unobserve(&self, node: NodeId);
    fn disconnect(&self);
}

/// Viewport creates intersection observers.
///
/// Returns `None` when the runtime has no intersection primitive; callers
/// fall back to activating everything immediately.
pub trait Viewport: Send + Sync {
    fn create_observer(
        &self,
        options: &WatcherConfig,
        reports: IntersectionReports,
    ) -> Option<Arc<dyn IntersectionObserver>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(IntersectionEntry::visible(NodeId::new(1), 0.0), 0.0, true)]
    #[case(IntersectionEntry::visible(NodeId::new(1), 0.4), 0.5, false)]
    #[case(IntersectionEntry::visible(NodeId::new(1), 1.0), 1.0, true)]
    #[case(IntersectionEntry::hidden(NodeId::new(1)), 0.0, false)]
    fn entry_satisfies_threshold(
        #[case] entry: IntersectionEntry,
        #[case] threshold: f64,
        #[case] want: bool,
    ) {
        assert_eq!(entry.satisfies(threshold), want);
    }
}
