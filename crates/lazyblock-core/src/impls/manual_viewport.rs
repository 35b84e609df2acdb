//! ManualViewport - 手動で動かす intersection primitive
//!
//! # 学習ポイント
//! - 所有者が [`ManualViewport::report`] か [`ManualViewport::scroll_into_view`] を
//!   呼ぶまで何も「表示」されない
//! - 本物の primitive と同じく、observer は observe 中のノードの report しか受け取らない

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::{NodeId, WatcherConfig};
use crate::ports::{IntersectionEntry, IntersectionObserver, IntersectionReports, Viewport};

pub struct ManualViewport {
    available: bool,
    observers: Mutex<Vec<Arc<ManualObserver>>>,
}

impl ManualViewport {
    pub fn new() -> Self {
        Self {
            available: true,
            observers: Mutex::new(Vec::new()),
        }
    }

    /// A runtime without the intersection primitive.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Deliver one batch to every observer, filtered to the nodes it observes.
    pub fn report(&self, entries: &[IntersectionEntry]) {
        for observer in self.lock().iter() {
            observer.deliver(entries);
        }
    }

    /// Report `nodes` as fully visible.
    pub fn scroll_into_view(&self, nodes: &[NodeId]) {
        let entries: Vec<_> = nodes
            .iter()
            .map(|n| IntersectionEntry::visible(*n, 1.0))
            .collect();
        self.report(&entries);
    }

    /// Is any observer currently watching `node`?
    pub fn is_observed(&self, node: NodeId) -> bool {
        self.lock().iter().any(|o| o.observed().contains(&node))
    }

    /// Nodes currently observed across all observers.
    pub fn observed_nodes(&self) -> BTreeSet<NodeId> {
        self.lock().iter().flat_map(|o| o.observed()).collect()
    }

    pub fn observer_count(&self) -> usize {
        self.lock().len()
    }

    /// Options the most recent observer was created with.
    pub fn last_options(&self) -> Option<WatcherConfig> {
        self.lock().last().map(|o| o.options.clone())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<ManualObserver>>> {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ManualViewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport for ManualViewport {
    fn create_observer(
        &self,
        options: &WatcherConfig,
        reports: IntersectionReports,
    ) -> Option<Arc<dyn IntersectionObserver>> {
        if !self.available {
            return None;
        }
        let observer = Arc::new(ManualObserver {
            options: options.clone(),
            reports,
            observed: Mutex::new(BTreeSet::new()),
        });
        self.lock().push(Arc::clone(&observer));
        Some(observer)
    }
}

struct ManualObserver {
    options: WatcherConfig,
    reports: IntersectionReports,
    observed: Mutex<BTreeSet<NodeId>>,
}

impl ManualObserver {
    fn observed(&self) -> BTreeSet<NodeId> {
        self.observed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn deliver(&self, entries: &[IntersectionEntry]) {
        let observed = self.observed();
        let batch: Vec<_> = entries
            .iter()
            .filter(|e| observed.contains(&e.target))
            .copied()
            .collect();
        if !batch.is_empty() {
            // receiver gone means the watcher shut down
            let _ = self.reports.send(batch);
        }
    }
}

impl IntersectionObserver for ManualObserver {
    fn observe(&self, node: NodeId) {
        self.observed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(node);
    }

    fn unobserve(&self, node: NodeId) {
        self.observed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&node);
    }

    fn disconnect(&self) {
        self.observed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn unavailable_viewport_creates_no_observer() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let vp = ManualViewport::unavailable();
        assert!(vp.create_observer(&WatcherConfig::default(), tx).is_none());
        assert_eq!(vp.observer_count(), 0);
    }

    #[test]
    fn reports_only_reach_observed_nodes() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let vp = ManualViewport::new();
        let observer = vp.create_observer(&WatcherConfig::default(), tx).unwrap();
        observer.observe(NodeId::new(1));

        vp.scroll_into_view(&[NodeId::new(1), NodeId::new(2)]);
        let batch = rx.try_recv().unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].target, NodeId::new(1));

        observer.unobserve(NodeId::new(1));
        vp.scroll_into_view(&[NodeId::new(1)]);
        assert!(rx.try_recv().is_err());
        assert!(!vp.is_observed(NodeId::new(1)));
    }
}
