//! Nodes - DOM elements as seen by the loader.
//!
//! The loader never holds a live DOM handle. A `Document` port hands out
//! [`Element`] snapshots keyed by a stable [`NodeId`], and the loader turns the
//! ones carrying a registered marker into [`CandidateNode`]s.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::AssetKey;

/// Attribute holding the asset key of a block.
pub const MARKER_ATTRIBUTE: &str = "data-assetkey";

/// Attribute forcing activation at bootstrap (`"true"`).
pub const EAGER_ATTRIBUTE: &str = "data-eager";

/// Attribute disabling module invocation (`"false"`).
pub const JSLOAD_ATTRIBUTE: &str = "data-jsload";

/// Stable identity of a DOM node for the lifetime of the page.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// Snapshot of an element's attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub id: NodeId,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl Element {
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Selector-equivalent of `[data-assetkey="a"],[data-assetkey="b"],...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerSelector {
    attribute: String,
    keys: Vec<AssetKey>,
}

impl MarkerSelector {
    pub fn new(attribute: impl Into<String>, keys: Vec<AssetKey>) -> Self {
        Self {
            attribute: attribute.into(),
            keys,
        }
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn keys(&self) -> &[AssetKey] {
        &self.keys
    }

    pub fn matches(&self, element: &Element) -> bool {
        element
            .attribute(&self.attribute)
            .is_some_and(|value| self.keys.iter().any(|k| k.as_str() == value))
    }

    /// CSS selector list for backends that query a real DOM.
    pub fn to_css(&self) -> String {
        self.keys
            .iter()
            .map(|k| format!("[{}=\"{}\"]", self.attribute, k))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// A block node discovered at scan time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateNode {
    pub id: NodeId,
    pub key: AssetKey,
    /// Activate at bootstrap without waiting for visibility.
    pub eager: bool,
    /// `false` only when the node says `data-jsload="false"`.
    pub jsload: bool,
}

impl CandidateNode {
    pub fn new(id: NodeId, key: impl Into<AssetKey>) -> Self {
        Self {
            id,
            key: key.into(),
            eager: false,
            jsload: true,
        }
    }

    pub fn without_js(mut self) -> Self {
        self.jsload = false;
        self
    }

    /// Read the marker and companion flags off an element.
    ///
    /// Returns `None` when the marker attribute is missing.
    pub fn from_element(element: &Element, marker_attribute: &str) -> Option<Self> {
        let key = element.attribute(marker_attribute)?;
        Some(Self {
            id: element.id,
            key: AssetKey::new(key),
            eager: element.attribute(EAGER_ATTRIBUTE) == Some("true"),
            jsload: element.attribute(JSLOAD_ATTRIBUTE) != Some("false"),
        })
    }
}
