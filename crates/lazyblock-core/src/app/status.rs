//! Status - ページ全体のアクティベーション件数

use serde::{Deserialize, Serialize};

/// Per-state node counts. Nodes never touched are not counted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationCounts {
    pub pending: usize,
    pub activated: usize,
    pub failed: usize,
}
