//! AssetKey - the identifier a block carries in its marker attribute.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier for a block's behavior + style bundle.
///
/// The same key appears in three places: the configured asset list, the
/// `data-assetkey` attribute of every block node, and the module/stylesheet
/// path templates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetKey(String);

impl AssetKey {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for AssetKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AssetKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for AssetKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_key_serializes_as_plain_string() {
        let key = AssetKey::new("group-container-v3");
        let s = serde_json::to_string(&key).unwrap();
        assert_eq!(s, "\"group-container-v3\"");

        let keys: Vec<AssetKey> = serde_json::from_str(r#"["a", "b"]"#).unwrap();
        assert_eq!(keys, vec![AssetKey::from("a"), AssetKey::from("b")]);
    }
}
