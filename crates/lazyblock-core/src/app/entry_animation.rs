//! EntryAnimation - ノードが完全に表示されるたびに class を付与
//!
//! lazy loader と違い unobserve しない。完全に交差するたびに class を付け直し、
//! 重複は `add_class` 側で吸収する。

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::domain::{NodeId, WatcherConfig};
use crate::ports::{Document, IntersectionObserver, Viewport};

pub const TRIGGER_CLASS: &str = "trigger-animation";

pub struct EntryAnimation {
    observer: Arc<dyn IntersectionObserver>,
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl EntryAnimation {
    /// Observer options: no margin, node must be fully visible.
    pub fn options() -> WatcherConfig {
        WatcherConfig {
            root_margin: "0px".to_string(),
            threshold: 1.0,
            root: None,
        }
    }

    /// `None` when the viewport has no intersection primitive.
    pub fn start(viewport: &dyn Viewport, document: Arc<dyn Document>) -> Option<Self> {
        let (reports_tx, mut reports_rx) = mpsc::unbounded_channel();
        let observer = viewport.create_observer(&Self::options(), reports_tx)?;
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let join = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    batch = reports_rx.recv() => {
                        let Some(entries) = batch else { break };
                        for entry in entries.iter().filter(|e| e.is_intersecting) {
                            document.add_class(entry.target, TRIGGER_CLASS);
                        }
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
        });

        Some(Self {
            observer,
            shutdown_tx,
            join,
        })
    }

    pub fn trigger(&self, node: NodeId) {
        self.observer.observe(node);
    }

    pub async fn shutdown_and_join(self) {
        let _ = self.shutdown_tx.send(true);
        self.observer.disconnect();
        if let Err(error) = self.join.await {
            tracing::error!(%error, "entry animation task failed");
        }
    }
}
