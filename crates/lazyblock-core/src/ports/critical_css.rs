//! CriticalCss port - CSS がすでにページにある key の集合
//!
//! ローダー起動前に critical-CSS パイプラインが publish し、以降は読み取り専用。

use std::collections::HashSet;

use crate::domain::AssetKey;

pub trait CriticalCss: Send + Sync {
    fn contains(&self, key: &AssetKey) -> bool;
}

/// Process-wide critical-CSS set. `absent()` behaves as the empty set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CriticalCssSet {
    keys: Option<HashSet<AssetKey>>,
}

impl CriticalCssSet {
    /// No set was published.
    pub fn absent() -> Self {
        Self { keys: None }
    }

    pub fn new<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<AssetKey>,
    {
        Self {
            keys: Some(keys.into_iter().map(Into::into).collect()),
        }
    }

    pub fn is_published(&self) -> bool {
        self.keys.is_some()
    }
}

impl CriticalCss for CriticalCssSet {
    fn contains(&self, key: &AssetKey) -> bool {
        self.keys.as_ref().is_some_and(|keys| keys.contains(key))
    }
}
