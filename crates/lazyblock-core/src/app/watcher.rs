//! VisibilityWatcher - 表示されたノードを controller に渡す
//!
//! # フロー
//! 1. Bootstrap 一回につき observer を一つ作成
//! 2. バックグラウンド task が report を受信
//! 3. threshold を満たしたノードは unobserve し、個別の task でアクティベート
//!
//! watcher を drop すると report の処理が止まる。開始済みのアクティベーションも
//! 待つ場合は `shutdown_and_join` を使う。

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};

use crate::app::controller::ActivationController;
use crate::domain::{CandidateNode, NodeId, WatcherConfig};
use crate::ports::{IntersectionEntry, IntersectionObserver, Viewport};

type Watched = Arc<Mutex<HashMap<NodeId, CandidateNode>>>;

pub struct VisibilityWatcher {
    observer: Arc<dyn IntersectionObserver>,
    watched: Watched,
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl VisibilityWatcher {
    /// Create the observer and start consuming its reports.
    ///
    /// `None` when the viewport has no intersection primitive.
    pub fn start(
        viewport: &dyn Viewport,
        options: &WatcherConfig,
        controller: Arc<ActivationController>,
    ) -> Option<Self> {
        let (reports_tx, reports_rx) = mpsc::unbounded_channel();
        let observer = viewport.create_observer(options, reports_tx)?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let watched: Watched = Arc::new(Mutex::new(HashMap::new()));

        let join = tokio::spawn(report_loop(
            reports_rx,
            shutdown_rx,
            Arc::clone(&observer),
            Arc::clone(&watched),
            options.threshold,
            controller,
        ));

        Some(Self {
            observer,
            watched,
            shutdown_tx,
            join,
        })
    }

    /// Observe every present node. Returns how many were registered.
    pub fn watch<I, N>(&self, nodes: I) -> usize
    where
        I: IntoIterator<Item = N>,
        N: Into<Option<CandidateNode>>,
    {
        let mut count = 0;
        for node in nodes {
            let node: Option<CandidateNode> = node.into();
            let Some(node) = node else { continue };
            let id = node.id;
            lock(&self.watched).insert(id, node);
            self.observer.observe(id);
            count += 1;
        }
        count
    }

    /// Nodes still waiting to become visible.
    pub fn pending(&self) -> usize {
        lock(&self.watched).len()
    }

    /// Stop handling reports and wait for in-flight activations.
    pub async fn shutdown_and_join(self) {
        // ignore send error: the loop may already be gone
        let _ = self.shutdown_tx.send(true);
        if let Err(error) = self.join.await {
            tracing::error!(%error, "visibility watcher task failed");
        }
    }
}

async fn report_loop(
    mut reports: mpsc::UnboundedReceiver<Vec<IntersectionEntry>>,
    mut shutdown_rx: watch::Receiver<bool>,
    observer: Arc<dyn IntersectionObserver>,
    watched: Watched,
    threshold: f64,
    controller: Arc<ActivationController>,
) {
    let mut in_flight = JoinSet::new();

    loop {
        // reports first: a batch delivered before shutdown is still honored
        tokio::select! {
            biased;
            batch = reports.recv() => {
                let Some(entries) = batch else { break };
                tracing::trace!(entries = entries.len(), "intersection report");
                for entry in entries.into_iter().filter(|e| e.satisfies(threshold)) {
                    let Some(node) = lock(&watched).remove(&entry.target) else {
                        continue;
                    };
                    observer.unobserve(node.id);
                    tracing::debug!(node = %node.id, key = %node.key, "unobserving visible block");

                    let controller = Arc::clone(&controller);
                    in_flight.spawn(async move {
                        controller.activate(&node).await;
                    });
                }
            }
            _ = shutdown_rx.changed() => break,
        }

        while let Some(res) = in_flight.try_join_next() {
            log_join(res);
        }
    }

    observer.disconnect();
    while let Some(res) = in_flight.join_next().await {
        log_join(res);
    }
}

fn log_join(res: Result<(), tokio::task::JoinError>) {
    if let Err(error) = res {
        tracing::error!(%error, "activation task failed");
    }
}

fn lock(watched: &Watched) -> MutexGuard<'_, HashMap<NodeId, CandidateNode>> {
    watched.lock().unwrap_or_else(PoisonError::into_inner)
}
