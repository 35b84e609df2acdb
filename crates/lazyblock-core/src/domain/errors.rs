//! Errors - エラー型と分類
//!
//! アクティベーションの失敗はすべてノード単位。controller が捕捉し、
//! node と key を付けてログに残す。

use thiserror::Error;

use super::{AssetKey, NodeId};

/// ErrorKind classifies node-scoped failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown file prefix, or no descriptor for an observed key.
    Configuration,
    /// Module or stylesheet fetch rejected.
    Fetch,
    /// The block's initializer failed.
    Invocation,
}

/// A module or stylesheet could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to fetch `{path}`: {reason}")]
pub struct FetchError {
    pub path: String,
    pub reason: String,
}

impl FetchError {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// A block initializer reported a failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InvocationError(pub String);

impl InvocationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Why a node did not activate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActivationError {
    #[error("no loader registered for asset key `{key}` on {node}; are you missing an asset key?")]
    MissingDescriptor { node: NodeId, key: AssetKey },

    #[error("asset key `{key}` on {node} has no module loader for file prefix `{mode}`")]
    UnknownMode {
        node: NodeId,
        key: AssetKey,
        mode: String,
    },

    #[error("could not load module for `{key}` on {node}: {source}")]
    Fetch {
        node: NodeId,
        key: AssetKey,
        #[source]
        source: FetchError,
    },

    #[error("could not run block js for `{key}` on {node}: {source}")]
    Invocation {
        node: NodeId,
        key: AssetKey,
        #[source]
        source: InvocationError,
    },
}

impl ActivationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ActivationError::MissingDescriptor { .. } | ActivationError::UnknownMode { .. } => {
                ErrorKind::Configuration
            }
            ActivationError::Fetch { .. } => ErrorKind::Fetch,
            ActivationError::Invocation { .. } => ErrorKind::Invocation,
        }
    }

    pub fn node(&self) -> NodeId {
        match self {
            ActivationError::MissingDescriptor { node, .. }
            | ActivationError::UnknownMode { node, .. }
            | ActivationError::Fetch { node, .. }
            | ActivationError::Invocation { node, .. } => *node,
        }
    }

    pub fn key(&self) -> &AssetKey {
        match self {
            ActivationError::MissingDescriptor { key, .. }
            | ActivationError::UnknownMode { key, .. }
            | ActivationError::Fetch { key, .. }
            | ActivationError::Invocation { key, .. } => key,
        }
    }
}

/// Invalid configuration input.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("invalid root margin `{margin}`: {reason}")]
    InvalidRootMargin { margin: String, reason: String },
}
